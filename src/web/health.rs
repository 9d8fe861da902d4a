//! # Health Check Handler
//!
//! Kubernetes-compatible liveness endpoint backed by the watcher registry.
//!
//! The response bodies are a wire contract with fleet tooling: `200` with
//! `{"status":"OK"}` while every watcher is fresh, `500` with a body naming
//! the condition otherwise.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::warn;

use crate::monitoring::liveness::LivenessProbe;

/// Body returned by the liveness endpoint.
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
}

/// Liveness endpoint: GET /health
///
/// Answers 200 when every registered watcher polled recently, 500 when at
/// least one has gone stale. Staleness is a fact, not an error: the only
/// user-visible failure behavior is this status flip and its body.
pub async fn liveness_handler(
    State(probe): State<LivenessProbe>,
) -> (StatusCode, Json<HealthResponse>) {
    if probe.all_healthy() {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "OK".to_string(),
            }),
        )
    } else {
        warn!(stale = ?probe.stale_watchers(), "liveness check failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(HealthResponse {
                status: "one or more watchers are unhealthy".to_string(),
            }),
        )
    }
}

/// Router fragment the embedding agent merges into its HTTP server.
pub fn health_router(probe: LivenessProbe) -> Router {
    Router::new()
        .route("/health", get(liveness_handler))
        .with_state(probe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::monitoring::watcher::WatcherRegistry;

    async fn get_health(router: Router) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn healthy_fleet_answers_200_ok() {
        let registry = Arc::new(WatcherRegistry::new());
        registry.register("job_watcher").unwrap();
        registry.touch("job_watcher").unwrap();

        let router = health_router(LivenessProbe::new(registry));
        let (status, body) = get_health(router).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"status": "OK"}));
    }

    #[tokio::test]
    async fn empty_registry_answers_200() {
        let registry = Arc::new(WatcherRegistry::new());
        let router = health_router(LivenessProbe::new(registry));

        let (status, _body) = get_health(router).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn stale_watcher_answers_500_with_contract_body() {
        let registry = Arc::new(WatcherRegistry::new());
        registry.register("job_watcher").unwrap();
        registry
            .touch_at("job_watcher", Instant::now() - Duration::from_secs(360))
            .unwrap();

        let probe =
            LivenessProbe::with_threshold(Arc::clone(&registry), Duration::from_secs(300));
        let (status, body) = get_health(health_router(probe)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            serde_json::json!({"status": "one or more watchers are unhealthy"})
        );
    }
}
