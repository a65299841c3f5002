//! Request signing for the Skland game API.
//!
//! The server recomputes the signature from the request it receives, so the
//! canonical header JSON, the path and the query component must match
//! byte-for-byte what is sent on the wire.
//!
//! ```text
//! secret    = path + query_component + timestamp + header_json
//! hex       = hex(HMAC-SHA256(key = token, secret))
//! signature = hex(MD5(hex))
//! ```

use md5::{Digest, Md5};
use reqwest::Method;
use ring::hmac;
use serde::Serialize;
use url::Url;

use crate::constants::USER_AGENT;
use crate::credential::Credential;

/// Canonical header object; field order is part of the signature.
#[derive(Debug, Serialize)]
struct SignHeader<'a> {
    platform: &'a str,
    timestamp: String,
    #[serde(rename = "dId")]
    d_id: &'a str,
    #[serde(rename = "vName")]
    v_name: &'a str,
}

impl SignHeader<'_> {
    fn new(timestamp: i64) -> Self {
        Self {
            platform: "",
            timestamp: timestamp.to_string(),
            d_id: "",
            v_name: "",
        }
    }

    fn to_json(&self) -> String {
        // Only string fields: serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Compute the request signature for an already-split request.
pub fn signature(path: &str, query_component: &str, timestamp: i64, token: &str) -> String {
    let header_json = SignHeader::new(timestamp).to_json();
    let secret = format!("{path}{query_component}{timestamp}{header_json}");

    let key = hmac::Key::new(hmac::HMAC_SHA256, token.as_bytes());
    let tag = hmac::sign(&key, secret.as_bytes());
    let hex_digest = hex::encode(tag.as_ref());

    let md5_hash = Md5::digest(hex_digest.as_bytes());
    format!("{md5_hash:x}")
}

/// Build the full header set for a signed request.
///
/// `body_json` must be the exact compact JSON that will be sent for POST
/// requests. `timestamp` is the value placed in the headers (callers use
/// `now - 1`).
pub fn sign_request(
    method: &Method,
    url: &Url,
    body_json: Option<&str>,
    credential: &Credential,
    timestamp: i64,
) -> Vec<(&'static str, String)> {
    let query_component = if *method == Method::POST {
        body_json.unwrap_or_default()
    } else {
        url.query().unwrap_or_default()
    };

    let sign = signature(url.path(), query_component, timestamp, &credential.token);

    vec![
        ("cred", credential.cred.clone()),
        ("User-Agent", USER_AGENT.to_string()),
        ("Accept-Encoding", "gzip".to_string()),
        ("Connection", "close".to_string()),
        ("sign", sign),
        ("platform", String::new()),
        ("timestamp", timestamp.to_string()),
        ("dId", String::new()),
        ("vName", String::new()),
    ]
}
