//! Account query and control routes.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/api/accounts` | Accounts that have data |
//! | GET | `/api/accounts/{uid}` | Full account projection |
//! | GET | `/api/accounts/{uid}/sensors` | Evaluated sensors |
//! | GET | `/api/accounts/{uid}/status` | Coordinator health |
//! | POST | `/api/accounts/{uid}/refresh` | Poll now |
//! | POST | `/api/accounts/{uid}/token` | Re-authenticate with a new user token |

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use skland_api::metrics::unix_now;

use crate::api::error::{ApiError, ApiResult};
use crate::api::server::AppState;
use crate::coordinator::CoordinatorStatus;
use crate::projection::{AccountData, AccountListResponse};
use crate::sensors::SensorReading;

#[derive(Debug, Deserialize)]
pub struct ReconfigureRequest {
    pub token: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_accounts))
        .route("/{uid}", get(get_account))
        .route("/{uid}/sensors", get(get_sensors))
        .route("/{uid}/status", get(get_status))
        .route("/{uid}/refresh", post(refresh_account))
        .route("/{uid}/token", post(reconfigure_account))
}

async fn list_accounts(State(state): State<AppState>) -> Json<AccountListResponse> {
    Json(AccountListResponse {
        accounts: state.registry.list_accounts(),
    })
}

async fn get_account(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> ApiResult<Json<AccountData>> {
    Ok(Json(state.registry.account_data(&uid, unix_now())?))
}

async fn get_sensors(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> ApiResult<Json<Vec<SensorReading>>> {
    Ok(Json(state.registry.sensors(&uid, unix_now())?))
}

async fn get_status(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> ApiResult<Json<CoordinatorStatus>> {
    Ok(Json(state.registry.status(&uid)?))
}

async fn refresh_account(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> ApiResult<StatusCode> {
    state.registry.refresh(&uid).await?;
    Ok(StatusCode::ACCEPTED)
}

/// Replace the user token and return the resulting health.
async fn reconfigure_account(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Json(request): Json<ReconfigureRequest>,
) -> ApiResult<Json<CoordinatorStatus>> {
    let token = request.token.trim();
    if token.is_empty() {
        return Err(ApiError::validation("token must not be empty"));
    }

    state.registry.reconfigure(&uid, token.to_string()).await?;
    Ok(Json(state.registry.status(&uid)?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::routes::test_support::*;

    #[tokio::test]
    async fn test_empty_list() {
        let (status, body) = json_body(send(empty_state(), get("/api/accounts")).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"accounts": []}));
    }

    #[tokio::test]
    async fn test_unknown_account_is_404() {
        for uri in [
            "/api/accounts/404",
            "/api/accounts/404/sensors",
            "/api/accounts/404/status",
        ] {
            let (status, body) = json_body(send(empty_state(), get(uri)).await).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body["code"], "NOT_FOUND");
        }
    }

    #[tokio::test]
    async fn test_refresh_unknown_account() {
        let request = json_request("POST", "/api/accounts/404/refresh", json!({}));
        let response = send(empty_state(), request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_blank_token_rejected() {
        let request = json_request("POST", "/api/accounts/404/token", json!({"token": "  "}));
        let (status, body) = json_body(send(empty_state(), request).await).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}
