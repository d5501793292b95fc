//! The search view state machine.
//!
//! `SearchView` owns the UI state and dispatches at most one of the two
//! search requests per trigger. Hosts that cannot hold `&mut SearchView`
//! across the network call use [`SearchView::begin_search`] and
//! [`SearchView::complete_search`]; every begin hands out a new ticket and
//! only the newest ticket's completion is applied.

use crate::error::{AppError, EMPTY_QUERY};
use crate::models::{SearchMode, SearchResponse, SearchResult, TextSearchRequest};
use crate::search::SearchBackend;
use crate::upload::ImageFile;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub mode: SearchMode,
    pub query_text: String,
    pub selected_file: Option<ImageFile>,
    pub loading: bool,
    pub error: Option<String>,
    pub results: Option<Vec<SearchResult>>,
    pub query_time_ms: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TriggerOutcome {
    Completed(SearchResponse),
    /// Image mode without a file: the host should show its file picker.
    FilePickerRequested,
}

#[derive(Debug, Clone)]
pub enum PendingRequest {
    Text(TextSearchRequest),
    Image(ImageFile),
}

impl PendingRequest {
    pub async fn send(&self, backend: &dyn SearchBackend) -> Result<SearchResponse, AppError> {
        match self {
            PendingRequest::Text(request) => backend.search_text(request).await,
            PendingRequest::Image(file) => backend.search_image(file).await,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PendingSearch {
    pub ticket: u64,
    pub request: PendingRequest,
}

pub struct SearchView {
    backend: Arc<dyn SearchBackend>,
    top_k: usize,
    state: UiState,
    latest_ticket: u64,
}

impl SearchView {
    pub fn new(backend: Arc<dyn SearchBackend>, top_k: usize) -> Self {
        Self {
            backend,
            top_k,
            state: UiState::default(),
            latest_ticket: 0,
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn backend(&self) -> Arc<dyn SearchBackend> {
        Arc::clone(&self.backend)
    }

    pub fn select_mode(&mut self, mode: SearchMode) {
        log::debug!("Switching search mode to {}", mode);
        if mode == SearchMode::Text {
            self.state.selected_file = None;
        }
        self.state.mode = mode;
    }

    pub fn set_query(&mut self, text: impl Into<String>) {
        self.state.query_text = text.into();
    }

    pub fn select_file(&mut self, file: ImageFile) {
        log::debug!("Selected file {}", file.name);
        self.state.selected_file = Some(file);
    }

    pub fn clear_file(&mut self) {
        self.state.selected_file = None;
    }

    pub async fn submit_text_query(&mut self, query: &str) -> Result<SearchResponse, AppError> {
        let pending = self.begin_text(query)?;
        self.run(pending).await
    }

    pub async fn submit_image_query(&mut self, file: ImageFile) -> Result<SearchResponse, AppError> {
        let pending = self.begin_image(file);
        self.run(pending).await
    }

    pub async fn trigger_search(&mut self) -> Result<TriggerOutcome, AppError> {
        match self.begin_search()? {
            Some(pending) => self.run(pending).await.map(TriggerOutcome::Completed),
            None => Ok(TriggerOutcome::FilePickerRequested),
        }
    }

    /// Validates the current input and marks the view as loading.
    /// `Ok(None)` means there is nothing to send and the picker should open.
    pub fn begin_search(&mut self) -> Result<Option<PendingSearch>, AppError> {
        match self.state.mode {
            SearchMode::Text => {
                let query = self.state.query_text.clone();
                self.begin_text(&query).map(Some)
            }
            SearchMode::Image => match self.state.selected_file.clone() {
                Some(file) => Ok(Some(self.begin_image(file))),
                None => {
                    log::debug!("No file selected, requesting file picker");
                    Ok(None)
                }
            },
        }
    }

    /// Applies a finished request. Returns false when a newer request has
    /// superseded `ticket`, in which case the state is left alone.
    pub fn complete_search(&mut self, ticket: u64, outcome: &Result<SearchResponse, AppError>) -> bool {
        if ticket != self.latest_ticket {
            log::debug!("Dropping stale response for ticket {} (latest {})", ticket, self.latest_ticket);
            return false;
        }

        self.state.loading = false;
        match outcome {
            Ok(response) => {
                log::debug!("Search {} returned {} results", ticket, response.results.len());
                self.state.error = None;
                self.state.results = Some(response.results.clone());
                self.state.query_time_ms = Some(response.query_time);
            }
            Err(err) => self.fail(err.to_string()),
        }
        true
    }

    fn begin_text(&mut self, query: &str) -> Result<PendingSearch, AppError> {
        if query.trim().is_empty() {
            let err = AppError::Validation(EMPTY_QUERY.into());
            // Supersedes anything in flight so its late completion is dropped.
            self.latest_ticket += 1;
            self.state.loading = false;
            self.fail(err.to_string());
            return Err(err);
        }
        Ok(self.start(PendingRequest::Text(TextSearchRequest {
            query: query.to_string(),
            top_k: self.top_k,
        })))
    }

    fn begin_image(&mut self, file: ImageFile) -> PendingSearch {
        self.start(PendingRequest::Image(file))
    }

    fn start(&mut self, request: PendingRequest) -> PendingSearch {
        self.latest_ticket += 1;
        self.state.loading = true;
        self.state.error = None;
        log::trace!("Search {} started", self.latest_ticket);
        PendingSearch {
            ticket: self.latest_ticket,
            request,
        }
    }

    async fn run(&mut self, pending: PendingSearch) -> Result<SearchResponse, AppError> {
        let backend = Arc::clone(&self.backend);
        let outcome = pending.request.send(backend.as_ref()).await;
        self.complete_search(pending.ticket, &outcome);
        outcome
    }

    fn fail(&mut self, message: String) {
        log::debug!("Search failed: {}", message);
        self.state.error = Some(message);
        self.state.results = None;
        self.state.query_time_ms = None;
    }
}
