//! Credential lifecycle: user token -> grant code -> credential, and token refresh.
//!
//! None of these calls are retried here; every failure maps to
//! [`SklandError::Auth`] and the caller decides what to do next.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::constants::{AUTH_TIMEOUT, SKLAND_APP_CODE, generate_cred_url, grant_url, refresh_url};
use crate::credential::Credential;
use crate::error::{Result, SklandError};
use crate::http::create_client_builder;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GrantRequest<'a> {
    app_code: &'a str,
    token: &'a str,
    #[serde(rename = "type")]
    kind: i32,
}

#[derive(Serialize)]
struct CredRequest<'a> {
    code: &'a str,
    kind: i32,
}

/// Grant endpoint envelope, which uses `status`/`msg` instead of `code`/`message`.
#[derive(Debug, Deserialize)]
struct GrantResponse {
    status: Option<i64>,
    msg: Option<String>,
    data: Option<GrantData>,
}

#[derive(Debug, Deserialize)]
struct GrantData {
    code: String,
}

#[derive(Debug, Deserialize)]
struct ZonaiResponse<T> {
    code: Option<i64>,
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredData {
    cred: String,
    token: String,
    #[serde(default)]
    user_id: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RefreshData {
    token: String,
}

/// Unauthenticated client for the credential exchange endpoints.
#[derive(Clone)]
pub struct SklandAuth {
    client: Client,
}

impl SklandAuth {
    pub fn new() -> Result<Self> {
        let client = create_client_builder(Some(AUTH_TIMEOUT))
            .build()
            .map_err(|e| SklandError::Auth(format!("failed to build http client: {e}")))?;
        Ok(Self { client })
    }

    /// Exchange a user token for a one-time grant code.
    #[instrument(skip_all)]
    pub async fn get_grant_code(&self, user_token: &str) -> Result<String> {
        let body = GrantRequest {
            app_code: SKLAND_APP_CODE,
            token: user_token,
            kind: 0,
        };
        let response: GrantResponse = self
            .client
            .post(grant_url())
            .header("Accept-Encoding", "gzip")
            .header("Connection", "close")
            .json(&body)
            .timeout(AUTH_TIMEOUT)
            .send()
            .await
            .map_err(network_error)?
            .json()
            .await
            .map_err(decode_error)?;

        if response.status != Some(0) {
            let msg = response.msg.unwrap_or_else(|| "未知错误".to_string());
            return Err(SklandError::Auth(format!("获取认证代码失败: {msg}")));
        }
        response
            .data
            .map(|d| d.code)
            .ok_or_else(|| SklandError::Auth("grant response carried no code".to_string()))
    }

    /// Exchange a grant code for a session credential.
    #[instrument(skip_all)]
    pub async fn get_cred(&self, grant_code: &str) -> Result<Credential> {
        let body = CredRequest {
            code: grant_code,
            kind: 1,
        };
        let response: ZonaiResponse<CredData> = self
            .client
            .post(generate_cred_url())
            .header("Accept-Encoding", "gzip")
            .header("Connection", "close")
            .json(&body)
            .timeout(AUTH_TIMEOUT)
            .send()
            .await
            .map_err(network_error)?
            .json()
            .await
            .map_err(decode_error)?;

        let data = zonai_data(response, "获取凭证失败")?;
        let user_id = match data.user_id {
            Some(Value::String(id)) => Some(id),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };
        Ok(Credential::new(data.cred, data.token).with_user_id(user_id))
    }

    /// Fetch a fresh signing token for an existing `cred`.
    #[instrument(skip_all)]
    pub async fn refresh_token(&self, cred: &str) -> Result<String> {
        let response: ZonaiResponse<RefreshData> = self
            .client
            .get(refresh_url())
            .header("cred", cred)
            .header("Accept-Encoding", "gzip")
            .header("Connection", "close")
            .timeout(AUTH_TIMEOUT)
            .send()
            .await
            .map_err(network_error)?
            .json()
            .await
            .map_err(decode_error)?;

        let data = zonai_data(response, "刷新 token 失败")?;
        debug!("Signing token refreshed");
        Ok(data.token)
    }

    /// Full bootstrap: user token to grant code to credential.
    #[instrument(skip_all)]
    pub async fn authenticate(&self, user_token: &str) -> Result<Credential> {
        debug!("Starting authentication");
        let grant_code = self.get_grant_code(user_token).await?;
        let credential = self.get_cred(&grant_code).await?;
        debug!(user_id = ?credential.user_id, "Authentication completed");
        Ok(credential)
    }
}

fn zonai_data<T>(response: ZonaiResponse<T>, context: &str) -> Result<T> {
    if response.code != Some(0) {
        let msg = response.message.unwrap_or_else(|| "未知错误".to_string());
        return Err(SklandError::Auth(format!("{context}: {msg}")));
    }
    response
        .data
        .ok_or_else(|| SklandError::Auth(format!("{context}: empty data")))
}

fn network_error(err: reqwest::Error) -> SklandError {
    SklandError::Auth(format!("网络请求失败: {err}"))
}

fn decode_error(err: reqwest::Error) -> SklandError {
    SklandError::Auth(format!("invalid auth response: {err}"))
}
