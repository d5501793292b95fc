use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::{HealthStatus, SearchResponse, TextSearchRequest};
use crate::search::SearchBackend;
use crate::upload::ImageFile;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use std::time::Duration;

const TEXT_ENDPOINT: &str = "search-text";
const IMAGE_ENDPOINT: &str = "search-image";
const HEALTH_ENDPOINT: &str = "health";

/// Multipart field the backend reads the upload from.
pub const UPLOAD_FIELD: &str = "file";

/// Joins a server-relative path onto the base URL. Absolute URLs pass through.
pub fn resolve_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

pub struct HttpSearchBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSearchBackend {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let base_url = config.base_url()?;
        log::debug!("Creating search client for URL: {}", base_url);

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;
        log::trace!("Search client created successfully.");

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        resolve_url(&self.base_url, path)
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AppError> {
        let status = response.status();
        let body = response.bytes().await?;
        log::debug!("Backend answered {} ({} bytes)", status, body.len());

        if !status.is_success() {
            let err = AppError::from_failure_body(status.as_u16(), &body);
            log::warn!("Search request failed with {}: {}", status, err);
            return Err(err);
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn search_text(&self, request: &TextSearchRequest) -> Result<SearchResponse, AppError> {
        let url = self.endpoint(TEXT_ENDPOINT);
        log::info!("Text search for {:?} (top_k={})", request.query, request.top_k);

        let response = self.client.post(&url).json(request).send().await?;
        Self::read_json(response).await
    }

    async fn search_image(&self, file: &ImageFile) -> Result<SearchResponse, AppError> {
        let url = self.endpoint(IMAGE_ENDPOINT);
        log::info!("Image search with {} ({} bytes)", file.name, file.bytes.len());

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(file.mime.essence_str())?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self.client.post(&url).multipart(form).send().await?;
        Self::read_json(response).await
    }

    async fn fetch_image(&self, image_url: &str) -> Result<Vec<u8>, AppError> {
        let url = self.endpoint(image_url);
        log::trace!("Fetching result image {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Request {
                status: status.as_u16(),
                message: format!("Failed to fetch {}", url),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn health(&self) -> Result<HealthStatus, AppError> {
        let url = self.endpoint(HEALTH_ENDPOINT);
        log::debug!("Checking backend health at {}", url);

        let response = self.client.get(&url).send().await?;
        Self::read_json(response).await
    }
}
