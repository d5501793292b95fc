//! Interactive terminal session over a [`SearchView`].
//!
//! A typed path stands in for the browser's file picker: when a trigger in
//! image mode has no file, the next line read is taken as the picked file.

use crate::error::AppError;
use crate::models::SearchMode;
use crate::render;
use crate::upload::ImageFile;
use crate::view::SearchView;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub const HELP: &str = "\
Commands:
  /text            switch to text search
  /image           switch to image search
  /file <path>     select a JPEG or PNG image
  /clear           clear the selected image
  /search          run the search (an empty line does the same)
  /health          check the backend
  /state           show the current state
  /help            show this help
  /quit            leave
In text mode any other line is searched for directly.
";

pub const PICKER_PROMPT: &str = "Select an image (jpeg/png) path:";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Mode(SearchMode),
    File(String),
    ClearFile,
    Search,
    Health,
    State,
    Help,
    Quit,
    Query(String),
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(Command::Search);
    }
    if !trimmed.starts_with('/') {
        return Ok(Command::Query(line.trim_end_matches(['\r', '\n']).to_string()));
    }

    let (name, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (trimmed, ""),
    };
    match name {
        "/text" => Ok(Command::Mode(SearchMode::Text)),
        "/image" => Ok(Command::Mode(SearchMode::Image)),
        "/file" if arg.is_empty() => Err("usage: /file <path>".to_string()),
        "/file" => Ok(Command::File(arg.to_string())),
        "/clear" => Ok(Command::ClearFile),
        "/search" => Ok(Command::Search),
        "/health" => Ok(Command::Health),
        "/state" => Ok(Command::State),
        "/help" => Ok(Command::Help),
        "/quit" | "/exit" => Ok(Command::Quit),
        other => Err(format!("unknown command: {} (try /help)", other)),
    }
}

pub struct Session<W> {
    view: SearchView,
    base_url: String,
    out: W,
    awaiting_file: bool,
}

impl<W: AsyncWrite + Unpin> Session<W> {
    pub fn new(view: SearchView, base_url: impl Into<String>, out: W) -> Self {
        Self {
            view,
            base_url: base_url.into(),
            out,
            awaiting_file: false,
        }
    }

    pub fn view(&self) -> &SearchView {
        &self.view
    }

    fn current_mode(&self) -> SearchMode {
        self.view.state().mode
    }

    /// Reads lines until EOF or `/quit`. Search failures are shown and the
    /// session carries on; only I/O on the terminal itself ends it early.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<(), AppError> {
        let mut lines = input.lines();
        self.write(HELP).await?;
        loop {
            self.prompt().await?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            if !self.handle_line(&line).await? {
                break;
            }
        }
        log::debug!("Session ended");
        Ok(())
    }

    /// Returns false when the session should end.
    pub async fn handle_line(&mut self, line: &str) -> Result<bool, AppError> {
        if self.awaiting_file {
            self.awaiting_file = false;
            let path = line.trim();
            if path.is_empty() {
                self.write("No file selected\n").await?;
            } else {
                self.pick_file(path).await?;
            }
            return Ok(true);
        }

        let command = match parse_command(line) {
            Ok(c) => c,
            Err(msg) => {
                self.write(&format!("{}\n", msg)).await?;
                return Ok(true);
            }
        };

        match command {
            Command::Mode(mode) => {
                self.view.select_mode(mode);
                self.write(&format!("Mode: {}\n", mode)).await?;
            }
            Command::File(path) => self.pick_file(&path).await?,
            Command::ClearFile => {
                self.view.clear_file();
                self.write("Cleared selected file\n").await?;
            }
            Command::Search => self.search().await?,
            Command::Query(text) => match self.current_mode() {
                SearchMode::Text => {
                    self.view.set_query(text);
                    self.search().await?;
                }
                SearchMode::Image => {
                    self.write("Image mode: use /file <path> then /search, or /text to search by text\n")
                        .await?;
                }
            },
            Command::Health => self.health().await?,
            Command::State => self.show_state().await?,
            Command::Help => self.write(HELP).await?,
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    async fn search(&mut self) -> Result<(), AppError> {
        let pending = match self.view.begin_search() {
            Ok(Some(pending)) => pending,
            Ok(None) => {
                self.awaiting_file = true;
                return self.write(&format!("{}\n", PICKER_PROMPT)).await;
            }
            Err(_) => return self.show_results().await,
        };

        self.show_results().await?;
        let backend = self.view.backend();
        let outcome = pending.request.send(backend.as_ref()).await;
        self.view.complete_search(pending.ticket, &outcome);
        self.show_results().await
    }

    async fn pick_file(&mut self, path: &str) -> Result<(), AppError> {
        match ImageFile::open(path).await {
            Ok(file) => {
                let note = format!("Selected {}\n", file.name);
                if self.view.state().mode != SearchMode::Image {
                    self.view.select_mode(SearchMode::Image);
                }
                self.view.select_file(file);
                self.write(&note).await
            }
            Err(e) => self.write(&format!("Error: {}\n", e)).await,
        }
    }

    async fn health(&mut self) -> Result<(), AppError> {
        let backend = self.view.backend();
        let line = match backend.health().await {
            Ok(h) => match h.model {
                Some(model) => format!("Backend: {} (model: {})\n", h.status, model),
                None => format!("Backend: {}\n", h.status),
            },
            Err(e) => format!("Error: {}\n", e),
        };
        self.write(&line).await
    }

    async fn show_state(&mut self) -> Result<(), AppError> {
        let state = self.view.state();
        let file = state
            .selected_file
            .as_ref()
            .map(|f| f.name.clone())
            .unwrap_or_else(|| "none".to_string());
        let summary = format!(
            "Mode: {} | Query: {:?} | File: {}\n",
            state.mode, state.query_text, file
        );
        self.write(&summary).await?;
        self.show_results().await
    }

    async fn show_results(&mut self) -> Result<(), AppError> {
        let text = render::format_state(&self.base_url, self.view.state());
        self.write(&text).await
    }

    async fn prompt(&mut self) -> Result<(), AppError> {
        let prompt = if self.awaiting_file {
            "file> ".to_string()
        } else {
            format!("{}> ", self.view.state().mode)
        };
        self.write(&prompt).await
    }

    async fn write(&mut self, text: &str) -> Result<(), AppError> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.flush().await?;
        Ok(())
    }
}
