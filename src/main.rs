use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use salonbot::config::AppConfig;
use salonbot::handlers;
use salonbot::services::ai::openai::OpenAiProvider;
use salonbot::services::ai::LlmProvider;
use salonbot::services::dialogue::DialogueRouter;
use salonbot::services::knowledge::KnowledgeResponder;
use salonbot::services::sessions::SessionStore;
use salonbot::services::storage::sheets::{GoogleSheetsStore, ServiceAccountKey};
use salonbot::services::storage::LeadStore;
use salonbot::state::AppState;

const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()).to_lowercase()))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::from_env();

    if config.openai_api_key.is_empty() {
        tracing::warn!("OPENAI_API_KEY is not set, consultations will return the fallback answer");
    }
    tracing::info!("using OpenAI model {}", config.openai_model);
    let llm: Arc<dyn LlmProvider> = Arc::new(OpenAiProvider::new(
        config.openai_api_key.clone(),
        config.openai_model.clone(),
        config.openai_base_url.clone(),
        config.external_timeout(),
    )?);

    let key = ServiceAccountKey::from_file(&config.google_credentials_path)?;
    let store: Arc<dyn LeadStore> = Arc::new(GoogleSheetsStore::new(
        key,
        config.spreadsheet_id.clone(),
        config.sheet_range.clone(),
    )?);
    tracing::info!(range = %config.sheet_range, "leads go to Google Sheets");

    let sessions = Arc::new(SessionStore::new(chrono::Duration::minutes(
        config.session_ttl_minutes,
    )));
    tokio::spawn(sessions.clone().run_eviction(EVICTION_INTERVAL));

    let dialogue = DialogueRouter::new(
        sessions,
        KnowledgeResponder::new(llm, config.external_timeout()),
        store,
        config.external_timeout(),
    );

    let state = Arc::new(AppState { config, dialogue });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/webchat", post(handlers::webchat::webchat))
        .layer(cors_layer(&state.config)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let addr = format!("0.0.0.0:{}", state.config.port);
    tracing::info!("starting server on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .into_future();

    if state.config.telegram_bot_token.is_empty() {
        tracing::warn!("TELEGRAM_BOT_TOKEN is not set, running the web chat only");
        server.await?;
    } else {
        let bot = teloxide::Bot::new(&state.config.telegram_bot_token);
        run_until_first_exit(server, handlers::telegram::run_bot(bot, state.clone())).await?;
    }

    Ok(())
}

/// Runs both front-ends; whichever stops first stops the process.
async fn run_until_first_exit<W, B>(web: W, bot: B) -> anyhow::Result<()>
where
    W: Future<Output = std::io::Result<()>>,
    B: Future<Output = ()>,
{
    tokio::select! {
        result = web => {
            result.context("web server failed")?;
            tracing::warn!("web server stopped");
        }
        () = bot => tracing::info!("Telegram dispatcher stopped"),
    }
    Ok(())
}

fn cors_layer(config: &AppConfig) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match config.allowed_origins() {
        None => Ok(layer.allow_origin(Any)),
        Some(origins) => {
            let origins = origins
                .iter()
                .map(|o| o.parse::<HeaderValue>())
                .collect::<Result<Vec<_>, _>>()?;
            Ok(layer.allow_origin(origins))
        }
    }
}
