use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use url::Url;

use crate::error::AppError;

pub const FALLBACK_API_BASE_URL: &str = "http://localhost:8000";

/// Base URL baked in at build time, falling back to the local backend.
pub fn default_api_base_url() -> &'static str {
    option_env!("API_BASE_URL").unwrap_or(FALLBACK_API_BASE_URL)
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub top_k: usize,
    pub log_level: String,
    pub request_timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url().to_string(),
            top_k: 10,
            log_level: "warn".to_string(),
            request_timeout_secs: None,
        }
    }
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let defaults = AppConfig::default();

        let s = Config::builder()
            .set_default("api_base_url", defaults.api_base_url)?
            .set_default("top_k", defaults.top_k as i64)?
            .set_default("log_level", defaults.log_level)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("IMAGE_SEARCH"))
            .set_override_option("api_base_url", std::env::var("API_BASE_URL").ok())?
            .build()?;

        s.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.base_url()?;
        if self.top_k < 1 {
            return Err(AppError::Validation("top_k must be greater than 0".into()));
        }
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, AppError> {
        Ok(Url::parse(&self.api_base_url)?)
    }
}
