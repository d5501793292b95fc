use crate::error::AppError;
use crate::models::{HealthStatus, SearchResponse, TextSearchRequest};
use crate::upload::ImageFile;
use async_trait::async_trait;

#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search_text(&self, request: &TextSearchRequest) -> Result<SearchResponse, AppError>;
    async fn search_image(&self, file: &ImageFile) -> Result<SearchResponse, AppError>;
    async fn fetch_image(&self, image_url: &str) -> Result<Vec<u8>, AppError>;
    async fn health(&self) -> Result<HealthStatus, AppError>;
}
