#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web dashboard API over an incident dataset.
//!
//! The dataset is loaded once at startup and shared read-only between
//! workers. Every request re-runs the filter and aggregation functions from
//! `casewatch_analytics` against it, so responses always reflect exactly the
//! query parameters that came with the request. Grounded questions are
//! answered through `POST /api/ai/ask` when an LLM provider is configured.

mod handlers;
pub mod interactive;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use casewatch_ai::providers::{LlmProvider, ProviderConfig, create_provider};
use casewatch_context::ContextBudget;
use casewatch_dataset_models::Dataset;
use casewatch_source::progress::null_progress;
use casewatch_source::registry::{DEFAULT_SOURCE_ID, find_source};
use casewatch_source::{SourceDefinition, SourceError};

/// Everything needed to start the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Source to load at startup.
    pub source: SourceDefinition,
    /// Limits on the context sent with each question.
    pub budget: ContextBudget,
    /// Address to bind.
    pub bind_addr: String,
    /// Port to bind.
    pub port: u16,
}

impl ServerConfig {
    /// Reads the configuration from the environment.
    ///
    /// * `CASEWATCH_SOURCE`: registered source id, or a path to a CSV file
    ///   (defaults to [`DEFAULT_SOURCE_ID`])
    /// * `CONTEXT_MAX_ROWS`, `CONTEXT_MAX_CHARS`: context budget overrides
    /// * `BIND_ADDR` (default `127.0.0.1`), `PORT` (default `8080`)
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if `CASEWATCH_SOURCE` names neither a
    /// registered source nor an existing file.
    pub fn from_env() -> Result<Self, SourceError> {
        let source_id =
            std::env::var("CASEWATCH_SOURCE").unwrap_or_else(|_| DEFAULT_SOURCE_ID.to_string());
        let source = resolve_source(&source_id)?;

        let mut budget = ContextBudget::default();
        if let Some(max_rows) = env_parse("CONTEXT_MAX_ROWS") {
            budget.max_rows = max_rows;
        }
        if let Some(max_chars) = env_parse("CONTEXT_MAX_CHARS") {
            budget.max_chars = max_chars;
        }

        Ok(Self {
            source,
            budget,
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env_parse("PORT").unwrap_or(8080),
        })
    }
}

/// Looks `id_or_path` up in the registry, falling back to treating it as a
/// file path.
///
/// # Errors
///
/// Returns [`SourceError::UnknownSource`] if it is neither.
pub fn resolve_source(id_or_path: &str) -> Result<SourceDefinition, SourceError> {
    match find_source(id_or_path) {
        Ok(source) => Ok(source),
        Err(SourceError::UnknownSource { .. }) if std::path::Path::new(id_or_path).is_file() => {
            Ok(SourceDefinition::from_path(id_or_path))
        }
        Err(e) => Err(e),
    }
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Option<T> {
    let value = std::env::var(var).ok()?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            log::warn!("Ignoring {var}={value:?}: not a valid number");
            None
        }
    }
}

/// Shared application state.
pub struct AppState {
    /// The loaded dataset. Never mutated after startup.
    pub dataset: Arc<Dataset>,
    /// Where the dataset came from.
    pub source: SourceDefinition,
    /// Limits on the context sent with each question.
    pub budget: ContextBudget,
    /// LLM backend for `/api/ai/ask`. `None` disables the endpoint.
    pub provider: Option<Box<dyn LlmProvider>>,
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/filters", web::get().to(handlers::filters))
            .route("/metrics", web::get().to(handlers::metrics))
            .route("/aggregates/years", web::get().to(handlers::year_aggregates))
            .route(
                "/aggregates/regions",
                web::get().to(handlers::region_aggregates),
            )
            .route("/records", web::get().to(handlers::records))
            .route("/ai/ask", web::post().to(handlers::ai_ask)),
    );
}

/// Starts the dashboard API server.
///
/// Loads the configured source, picks up an LLM provider from the
/// environment if one is configured, and starts the Actix-Web HTTP server.
/// The caller provides the async runtime (e.g. via `#[actix_web::main]`)
/// and initializes logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the source cannot be loaded, or if
/// the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    log::info!("Loading source {}...", config.source.id);
    let outcome = casewatch_source::load(&config.source, &null_progress())
        .await
        .map_err(std::io::Error::other)?;

    let provider = match ProviderConfig::from_env().and_then(|c| create_provider(&c)) {
        Ok(provider) => {
            log::info!("AI provider: {}", provider.name());
            Some(provider)
        }
        Err(e) => {
            log::warn!("AI questions disabled: {e}");
            None
        }
    };

    let state = web::Data::new(AppState {
        dataset: Arc::new(outcome.dataset),
        source: config.source,
        budget: config.budget,
        provider,
    });

    log::info!(
        "Starting server on {}:{} ({} records)",
        config.bind_addr,
        config.port,
        state.dataset.len()
    );

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}
