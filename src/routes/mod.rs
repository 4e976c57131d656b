//! Route modules for the schedule server

pub mod geometry;
pub mod health;
pub mod ingest;
pub mod schedule;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/health", get(health::health_check))
        .nest("/api/v1/mwb", ingest::router())
        .nest("/api/v1/schedule", schedule::router())
        .nest("/api/v1/geometry", geometry::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::app;
    use crate::config::Config;
    use crate::db::memory_pool;
    use crate::ingest::{IngestError, SourceFetcher};
    use crate::state::AppState;

    /// Fetcher for tests that must never reach the network
    pub struct OfflineFetcher;

    #[async_trait]
    impl SourceFetcher for OfflineFetcher {
        async fn fetch_text(&self, url: &str) -> Result<String, IngestError> {
            Err(IngestError::Status {
                url: url.to_string(),
                status: 503,
            })
        }
    }

    pub async fn test_state() -> AppState {
        let mut config = Config::default();
        config.source.request_delay_ms = 0;
        AppState::new(config, memory_pool().await, Arc::new(OfflineFetcher))
    }

    /// Send one request and decode the JSON response
    pub async fn send(
        state: &AppState,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(json) => request.body(Body::from(json.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}
