mod core;

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::core::AppServices;

pub use crate::core::config::{load_config, validate_config, ConfigError, FeedConfig};
pub use crate::core::feed::fetcher::{build_client, fetch_feed, fetch_feed_with_deadline, FetchError};
pub use crate::core::feed::parser::{parse_news_items, ParseError};
pub use crate::core::feed::serializer::{items_to_json, EncodingError};
pub use crate::core::feed::types::NewsItem;
pub use crate::core::news::{NewsError, NewsPipeline};

pub const NEWS_ROUTE: &str = "/news/google-news";
const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

struct SharedState {
    services: AppServices,
    pipeline: NewsPipeline,
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to build http client: {0}")]
    Client(#[from] FetchError),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn router(pipeline: NewsPipeline) -> Router {
    let state = Arc::new(SharedState {
        services: AppServices::default(),
        pipeline,
    });
    Router::new()
        .route("/health", get(app_health))
        .route(NEWS_ROUTE, get(google_news))
        .with_state(state)
}

async fn app_health(State(state): State<Arc<SharedState>>) -> Json<BTreeMap<String, String>> {
    Json(state.services.health_report())
}

async fn google_news(State(state): State<Arc<SharedState>>) -> Response {
    match state.pipeline.fetch_json().await {
        Ok(json) => ([(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], json).into_response(),
        Err(error) => {
            tracing::warn!(url = state.pipeline.feed_url(), error = %error, "news pipeline failed");
            let body = serde_json::json!({ "error": error.to_string() }).to_string();
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)],
                body,
            )
                .into_response()
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news_feed_lib=info,news_feed=info,warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

pub async fn run() -> Result<(), RunError> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let config = load_config()?;
    let pipeline = NewsPipeline::new(&config)?;
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        feed_url = %config.feed_url,
        timeout_secs = config.timeout_secs,
        "news feed service listening"
    );
    axum::serve(listener, router(pipeline)).await?;
    Ok(())
}
