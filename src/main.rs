//! # Curation Engine
//!
//! A three-stage content-curation pipeline: find and rank news for a
//! free-text intent, extract the chosen pages in parallel into one text
//! document, and publish the finished article to a WordPress site.
//!
//! ## Usage
//!
//! ```sh
//! curation_engine serve
//! curation_engine search "brazil elections"
//! curation_engine extract https://a.example/1 https://b.example/2
//! curation_engine publish --title "..." --content-file post.html
//! ```
//!
//! ## Architecture
//!
//! 1. **Ranking**: completion model writes a query, SerpApi returns
//!    candidates, the model picks the best three ([`ranking`])
//! 2. **Extraction**: one Jina reader call per URL, all at once, joined
//!    regardless of failures ([`aggregate`])
//! 3. **Publishing**: single WordPress REST call ([`providers::wordpress`])
//!
//! Credentials and settings are resolved before any request is sent, and a
//! single HTTP client is shared by every provider for the process lifetime.

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod aggregate;
mod cli;
mod config;
mod error;
mod models;
mod providers;
mod ranking;
mod server;
mod utils;

use aggregate::Aggregator;
use cli::{Cli, Command};
use config::{Credentials, Settings};
use error::ConfigError;
use models::{PostStatus, PublishRequest};
use providers::jina::JinaReader;
use providers::openai::OpenAiCompletion;
use providers::serpapi::SerpApiNews;
use providers::wordpress::WordPressPublisher;
use providers::Publisher;
use ranking::Ranker;
use server::{build_router, AppState};
use utils::ensure_parent_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    // Logs go to stderr so command output on stdout stays machine-readable.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(config = ?args.config, "Parsed CLI arguments");

    let settings = Settings::load(args.config.as_deref())?;
    let credentials = Credentials::from_args(&args.credentials);

    // One client for the whole process; providers hold cheap clones.
    let http = reqwest::Client::builder()
        .user_agent(concat!("curation_engine/", env!("CARGO_PKG_VERSION")))
        .build()?;

    match args.command {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.server.bind.clone());
            serve(&http, &settings, &credentials, &bind).await
        }
        Command::Search { intent } => {
            let ranker = build_ranker(&http, &settings, &credentials)?;
            let selection = ranker.rank(&intent).await?;
            println!("{}", serde_json::to_string_pretty(&selection)?);
            Ok(())
        }
        Command::Extract { urls, output } => {
            let aggregator = build_aggregator(&http, &settings, &credentials);
            if let Some(path) = &output {
                ensure_parent_dir(path).await?;
            }
            let document = aggregator.extract_all(&urls).await;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, &document.text).await?;
                    info!(path = %path.display(), sources = document.sources, failures = document.failures, "Wrote extracted text");
                }
                None => print!("{}", document.text),
            }
            Ok(())
        }
        Command::Publish {
            title,
            content,
            content_file,
            status,
        } => {
            let publisher = build_publisher(&http, &settings, &credentials)?;
            let content = match (content, content_file) {
                (Some(content), _) => content,
                (None, Some(path)) => tokio::fs::read_to_string(&path).await?,
                (None, None) => return Err("either --content or --content-file is required".into()),
            };
            publish(&publisher, title, content, status).await
        }
    }
}

fn build_ranker(
    http: &reqwest::Client,
    settings: &Settings,
    credentials: &Credentials,
) -> Result<Ranker, ConfigError> {
    let completion = OpenAiCompletion::new(http.clone(), credentials.openai_api_key()?, &settings.completion);
    let search = SerpApiNews::new(http.clone(), credentials.serpapi_api_key()?, &settings.search);
    Ok(Ranker::new(Arc::new(completion), Arc::new(search)))
}

fn build_aggregator(http: &reqwest::Client, settings: &Settings, credentials: &Credentials) -> Aggregator {
    let reader = JinaReader::new(http.clone(), credentials.jina_api_key(), &settings.extraction);
    Aggregator::new(
        Arc::new(reader),
        Duration::from_secs(settings.extraction.timeout_secs),
    )
}

fn build_publisher(
    http: &reqwest::Client,
    settings: &Settings,
    credentials: &Credentials,
) -> Result<WordPressPublisher, ConfigError> {
    Ok(WordPressPublisher::new(
        http.clone(),
        credentials.wordpress_auth()?,
        credentials.wordpress_posts_url(&settings.publish)?,
        &settings.publish,
    ))
}

#[instrument(level = "info", skip_all, fields(%bind))]
async fn serve(
    http: &reqwest::Client,
    settings: &Settings,
    credentials: &Credentials,
    bind: &str,
) -> Result<(), Box<dyn Error>> {
    // Every credential the routes need is checked before the socket opens.
    let state = AppState {
        ranker: Arc::new(build_ranker(http, settings, credentials)?),
        aggregator: Arc::new(build_aggregator(http, settings, credentials)),
        publisher: Arc::new(build_publisher(http, settings, credentials)?),
        started_at: chrono::Utc::now(),
    };

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, "Curation engine listening");
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn publish(
    publisher: &dyn Publisher,
    title: String,
    content: String,
    status: PostStatus,
) -> Result<(), Box<dyn Error>> {
    let request = PublishRequest {
        title,
        content,
        status,
    };
    let post = publisher.publish(&request).await?;
    println!("{}", serde_json::json!({ "status": "success", "link": post.link }));
    Ok(())
}
