//! Manual sign-in route.

use axum::{Json, Router, body::Bytes, extract::State, routing::post};
use serde::Deserialize;

use crate::api::error::{ApiError, ApiResult};
use crate::api::server::AppState;
use crate::registry::SignInOutcome;

/// Optional body of `POST /api/sign`; omit it to sign every account.
#[derive(Debug, Default, Deserialize)]
pub struct SignRequest {
    pub uid: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(sign_in))
}

async fn sign_in(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<Vec<SignInOutcome>>> {
    let request: SignRequest = if body.iter().all(u8::is_ascii_whitespace) {
        SignRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(format!("invalid request body: {e}")))?
    };
    let uid = request.uid.as_deref().filter(|u| !u.is_empty());
    Ok(Json(state.registry.sign_in(uid).await?))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;

    use crate::api::routes::test_support::*;

    #[tokio::test]
    async fn test_sign_all_with_no_accounts() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/sign")
            .body(Body::empty())
            .unwrap();
        let (status, body) = json_body(send(empty_state(), request).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_sign_unknown_uid() {
        let request = json_request("POST", "/api/sign", json!({"uid": "404"}));
        let response = send(empty_state(), request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
