//! API route modules.
//!
//! Organizes routes by resource type.

pub mod accounts;
pub mod health;
pub mod logging;
pub mod sign;

use axum::Router;

use crate::api::server::AppState;

/// Create the main API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/accounts", accounts::router())
        .nest("/api/sign", sign::router())
        .nest("/api/logging", logging::router())
        .nest("/health", health::router())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, Response, StatusCode};
    use http_body_util::BodyExt;
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    use super::create_router;
    use crate::api::server::AppState;
    use crate::registry::AccountRegistry;

    pub fn empty_state() -> AppState {
        AppState::new(Arc::new(AccountRegistry::new(CancellationToken::new())))
    }

    pub async fn send(state: AppState, request: Request<Body>) -> Response<Body> {
        create_router(state).oneshot(request).await.unwrap()
    }

    pub async fn json_body(response: Response<Body>) -> (StatusCode, serde_json::Value) {
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }
}
