//! Signed request transport.
//!
//! Every game request is signed with the current credential and the
//! application-level `code` of the response is classified into success,
//! [`SklandError::Unauthorized`] or [`SklandError::RequestFailed`].

use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use reqwest::{Client, Method, header::CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::constants::{CODE_CRED_INVALID, CODE_TOKEN_EXPIRED};
use crate::credential::Credential;
use crate::error::{Result, SklandError};
use crate::sign::sign_request;

pub struct SignedTransport {
    client: Client,
    credential: RwLock<Arc<Credential>>,
}

impl SignedTransport {
    pub fn new(client: Client, credential: Credential) -> Self {
        Self {
            client,
            credential: RwLock::new(Arc::new(credential)),
        }
    }

    /// Snapshot of the credential used for the next request.
    pub fn credential(&self) -> Arc<Credential> {
        self.credential.read().clone()
    }

    /// Swap in a new credential. Requests already signed keep the old one.
    pub fn replace_credential(&self, credential: Credential) {
        *self.credential.write() = Arc::new(credential);
    }

    pub async fn get(&self, url: &str) -> Result<Value> {
        self.request(Method::GET, url, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<Value> {
        let body_json = serde_json::to_string(body)
            .map_err(|e| SklandError::RequestFailed(format!("failed to encode body: {e}")))?;
        self.request(Method::POST, url, Some(body_json)).await
    }

    /// Issue a signed request and classify the response envelope.
    #[instrument(skip_all, fields(method = %method, url = %url))]
    pub async fn request(&self, method: Method, url: &str, body: Option<String>) -> Result<Value> {
        let parsed = Url::parse(url)?;
        let credential = self.credential();
        let timestamp = Utc::now().timestamp() - 1;
        let headers = sign_request(&method, &parsed, body.as_deref(), &credential, timestamp);

        let mut builder = self.client.request(method.clone(), parsed);
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        if method == Method::POST {
            builder = builder.header(CONTENT_TYPE, "application/json");
            if let Some(body) = body {
                builder = builder.body(body);
            }
        }

        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "Network error during signed request");
            SklandError::network(e)
        })?;
        let status = response.status();
        let payload: Value = response.json().await.map_err(|e| {
            SklandError::RequestFailed(format!("invalid response body (HTTP {status}): {e}"))
        })?;

        debug!(%status, "Signed request completed");
        classify_response(payload)
    }
}

/// Map the application-level `code` of a response envelope to a result.
///
/// A missing `code` is treated as success.
pub fn classify_response(payload: Value) -> Result<Value> {
    let code = payload.get("code").and_then(Value::as_i64).unwrap_or(0);
    if code == 0 {
        return Ok(payload);
    }

    let message = payload
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);

    match code {
        CODE_TOKEN_EXPIRED => Err(SklandError::Unauthorized(
            message.unwrap_or_else(|| "token expired".to_string()),
        )),
        CODE_CRED_INVALID => Err(SklandError::Unauthorized(
            message.unwrap_or_else(|| "credential invalid".to_string()),
        )),
        _ => Err(SklandError::RequestFailed(
            message.unwrap_or_else(|| format!("request failed with code {code}")),
        )),
    }
}
