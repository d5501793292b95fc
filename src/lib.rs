pub mod config;
pub mod error;
pub mod gallery;
pub mod models;
pub mod render;
pub mod search;
pub mod search_clients;
pub mod session;
pub mod upload;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;
