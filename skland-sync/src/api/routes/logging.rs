//! Runtime log filter routes.

use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::server::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateLogFilterRequest {
    pub filter: String,
}

#[derive(Debug, Serialize)]
pub struct LoggingConfigResponse {
    pub filter: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_logging_config).put(update_logging_config))
}

async fn get_logging_config(State(state): State<AppState>) -> ApiResult<Json<LoggingConfigResponse>> {
    let logging_config = state
        .logging_config
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Logging configuration not available"))?;

    Ok(Json(LoggingConfigResponse {
        filter: logging_config.get_filter(),
    }))
}

async fn update_logging_config(
    State(state): State<AppState>,
    Json(request): Json<UpdateLogFilterRequest>,
) -> ApiResult<Json<LoggingConfigResponse>> {
    let logging_config = state
        .logging_config
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Logging configuration not available"))?;

    logging_config
        .set_filter(&request.filter)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    Ok(Json(LoggingConfigResponse {
        filter: logging_config.get_filter(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::{EnvFilter, Registry, reload};

    use crate::api::routes::test_support::*;
    use crate::logging::LoggingConfig;

    #[tokio::test]
    async fn test_unavailable_without_subscriber() {
        let response = send(empty_state(), get("/api/logging")).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_update_filter() {
        let (layer, handle) =
            reload::Layer::<EnvFilter, Registry>::new(EnvFilter::new("skland_sync=info"));
        let _subscriber = tracing_subscriber::registry().with(layer);
        let state = empty_state().with_logging_config(Arc::new(LoggingConfig::new(handle)));

        let request = json_request("PUT", "/api/logging", json!({"filter": "skland_api=debug"}));
        let (status, body) = json_body(send(state.clone(), request).await).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["filter"].as_str().unwrap().contains("skland_api=debug"));

        let request = json_request("PUT", "/api/logging", json!({"filter": "skland_api=loud"}));
        let (status, body) = json_body(send(state, request).await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }
}
