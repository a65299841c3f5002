use thiserror::Error;

/// Outcome of a failed poll.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    /// Refresh and re-authentication both failed; a new user token is needed.
    #[error("authentication failed, reconfiguration required: {0}")]
    TerminalAuthFailure(String),

    /// Network or application failure; the next tick retries.
    #[error("request failed: {0}")]
    RequestFailed(String),
}

impl PollError {
    pub fn requires_reconfiguration(&self) -> bool {
        matches!(self, Self::TerminalAuthFailure(_))
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RequestFailed(_))
    }
}

impl From<skland_api::SklandError> for PollError {
    fn from(err: skland_api::SklandError) -> Self {
        match err {
            skland_api::SklandError::RequestFailed(message) => Self::RequestFailed(message),
            other => Self::RequestFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let terminal = PollError::TerminalAuthFailure("bad token".into());
        assert!(terminal.requires_reconfiguration());
        assert!(!terminal.is_transient());

        let transient: PollError =
            skland_api::SklandError::RequestFailed("timeout".into()).into();
        assert!(transient.is_transient());
        assert_eq!(transient.to_string(), "request failed: timeout");
    }
}
