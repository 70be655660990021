pub use crate::online_users::online_users_handler;

use crate::state::AppState;
use axum::{
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub async fn health_handler() -> impl IntoResponse {
    // Liveness only; the store is not probed.
    Json(json!({ "status": "ok" }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/users", any(online_users_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ErrorStatus;
    use crate::record::QueryResult;
    use crate::store::{RecordStore, SelectQuery, StoreError};
    use async_trait::async_trait;
    use axum::{body::Body, http::Request, http::StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    struct UnusedStore;

    #[async_trait]
    impl RecordStore for UnusedStore {
        async fn select(&self, _: &SelectQuery) -> Result<QueryResult<Vec<Value>>, StoreError> {
            panic!("health must not query the store");
        }
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let state = Arc::new(AppState::new(Arc::new(UnusedStore), ErrorStatus::Passthrough));
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = router(state).oneshot(req).await.expect("resp");
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = hyper::body::to_bytes(resp.into_body())
            .await
            .expect("bytes");
        let v: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(v, json!({ "status": "ok" }));
    }
}
