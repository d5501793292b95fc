//! In-memory backend for unit tests.

use crate::error::AppError;
use crate::models::{HealthStatus, SearchResponse, SearchResult, TextSearchRequest};
use crate::search::SearchBackend;
use crate::upload::ImageFile;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn cat_response() -> SearchResponse {
    SearchResponse {
        results: vec![SearchResult {
            image_url: Some("img/1.png".into()),
            caption: Some("cat".into()),
            score: Some(0.98),
        }],
        query_time: 12.3,
    }
}

pub fn png(name: &str) -> ImageFile {
    ImageFile::new(name, mime::IMAGE_PNG, b"\x89PNG\r\n".to_vec())
}

/// Replays queued outcomes in order and counts every call.
#[derive(Default)]
pub struct FakeBackend {
    outcomes: Mutex<VecDeque<Result<SearchResponse, AppError>>>,
    images: Mutex<HashMap<String, Vec<u8>>>,
    pub text_calls: AtomicUsize,
    pub image_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub last_text: Mutex<Option<TextSearchRequest>>,
    pub last_upload: Mutex<Option<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, outcome: Result<SearchResponse, AppError>) -> Self {
        self.outcomes.lock().unwrap().push_back(outcome);
        self
    }

    pub fn with_image(self, url: &str, bytes: &[u8]) -> Self {
        self.images.lock().unwrap().insert(url.to_string(), bytes.to_vec());
        self
    }

    pub fn calls(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst) + self.image_calls.load(Ordering::SeqCst)
    }

    fn next(&self) -> Result<SearchResponse, AppError> {
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(cat_response()))
    }
}

#[async_trait]
impl SearchBackend for FakeBackend {
    async fn search_text(&self, request: &TextSearchRequest) -> Result<SearchResponse, AppError> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_text.lock().unwrap() = Some(request.clone());
        self.next()
    }

    async fn search_image(&self, file: &ImageFile) -> Result<SearchResponse, AppError> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_upload.lock().unwrap() = Some(file.name.clone());
        self.next()
    }

    async fn fetch_image(&self, image_url: &str) -> Result<Vec<u8>, AppError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.images
            .lock()
            .unwrap()
            .get(image_url)
            .cloned()
            .ok_or_else(|| AppError::Request {
                status: 404,
                message: format!("Failed to fetch {}", image_url),
            })
    }

    async fn health(&self) -> Result<HealthStatus, AppError> {
        Ok(HealthStatus {
            status: "ok".into(),
            model: Some("fake-clip".into()),
        })
    }
}
