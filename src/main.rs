use anyhow::Result;
use clap::{Parser, Subcommand};
use image_search::config::AppConfig;
use image_search::error::AppError;
use image_search::gallery;
use image_search::models::SearchMode;
use image_search::render;
use image_search::search::SearchBackend;
use image_search::search_clients::http::HttpSearchBackend;
use image_search::session::Session;
use image_search::upload::ImageFile;
use image_search::view::SearchView;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "image_search", version, about = "Image Search: query a remote image-search backend by text or by image")]
struct Cli {
    /// Backend base URL (overrides API_BASE_URL and config files)
    #[arg(long, global = true)]
    api_base_url: Option<String>,

    /// Number of results to request for text searches
    #[arg(long, global = true)]
    top_k: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for images matching a text query
    Text {
        query: String,
        #[arg(long)]
        json: bool,
        /// Save result images into this directory
        #[arg(long)]
        download: Option<PathBuf>,
    },
    /// Search for images similar to a JPEG or PNG file
    Image {
        path: PathBuf,
        #[arg(long)]
        json: bool,
        /// Save result images into this directory
        #[arg(long)]
        download: Option<PathBuf>,
    },
    /// Check that the backend is up
    Health,
    /// Start an interactive search session
    Interactive,
}

enum Input {
    Text(String),
    Image(PathBuf),
}

async fn run_search(
    view: &mut SearchView,
    config: &AppConfig,
    input: Input,
    json: bool,
    download: Option<PathBuf>,
) -> Result<(), AppError> {
    match input {
        Input::Text(query) => {
            view.set_query(query.clone());
            view.submit_text_query(&query).await?;
        }
        Input::Image(path) => {
            let file = ImageFile::open(&path).await?;
            view.select_mode(SearchMode::Image);
            view.select_file(file.clone());
            view.submit_image_query(file).await?;
        }
    }

    let state = view.state();
    let results = state.results.clone().unwrap_or_default();
    if json {
        println!("{}", render::format_json(&config.api_base_url, &results, state.query_time_ms));
    } else {
        print!("{}", render::format_state(&config.api_base_url, state));
    }

    if let Some(dir) = download {
        let backend = view.backend();
        let written = gallery::download_images(backend.as_ref(), &results, &dir).await?;
        eprintln!("Saved {} images to {}", written.len(), dir.display());
    }
    Ok(())
}

async fn run_health(view: &SearchView) -> Result<(), AppError> {
    let health = view.backend().health().await?;
    match health.model {
        Some(model) => println!("{} (model: {})", health.status, model),
        None => println!("{}", health.status),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::new()?;
    if let Some(url) = cli.api_base_url {
        config.api_base_url = url;
    }
    if let Some(top_k) = cli.top_k {
        config.top_k = top_k;
    }

    // Initialize env_logger based on config.log_level
    env_logger::Builder::new()
        .filter_level(config.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    config.validate()?;
    info!("Using backend at {}", config.api_base_url);

    let backend: Arc<dyn SearchBackend> = Arc::new(HttpSearchBackend::new(&config)?);
    let mut view = SearchView::new(backend, config.top_k);

    let outcome = match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Interactive => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut session = Session::new(view, config.api_base_url.clone(), tokio::io::stdout());
            session.run(stdin).await?;
            return Ok(());
        }
        Commands::Health => run_health(&view).await,
        Commands::Text { query, json, download } => {
            run_search(&mut view, &config, Input::Text(query), json, download).await
        }
        Commands::Image { path, json, download } => {
            run_search(&mut view, &config, Input::Image(path), json, download).await
        }
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
