use thiserror::Error;

pub type Result<T> = std::result::Result<T, SklandError>;

#[derive(Debug, Error)]
pub enum SklandError {
    /// The current credential was rejected (codes 10000 / 10002).
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Any other non-zero application code, or a transport-level failure.
    #[error("request failed: {0}")]
    RequestFailed(String),
    /// Grant/credential exchange or token refresh failed.
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("unexpected response shape: {0}")]
    Parse(String),
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl SklandError {
    /// Whether the upstream rejected the session itself.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    pub(crate) fn network(err: reqwest::Error) -> Self {
        Self::RequestFailed(format!("network error: {err}"))
    }
}
