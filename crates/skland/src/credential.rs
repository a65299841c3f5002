use std::fmt;

use serde::{Deserialize, Serialize};

/// A Skland session: `cred` identifies it, `token` is the signing secret.
///
/// Treated as an immutable value: refreshes produce a new `Credential`
/// rather than mutating an existing one.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub cred: String,
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Credential {
    pub fn new(cred: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            cred: cred.into(),
            token: token.into(),
            user_id: None,
        }
    }

    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    /// Same session with a freshly issued signing token.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            cred: self.cred.clone(),
            token: token.into(),
            user_id: self.user_id.clone(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("cred", &"<redacted>")
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_token_keeps_session() {
        let cred = Credential::new("cred-1", "old").with_user_id(Some("42".into()));
        let refreshed = cred.with_token("new");
        assert_eq!(refreshed.cred, "cred-1");
        assert_eq!(refreshed.token, "new");
        assert_eq!(refreshed.user_id.as_deref(), Some("42"));
        assert_eq!(cred.token, "old");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let cred = Credential::new("very-secret-cred", "very-secret-token");
        let rendered = format!("{cred:?}");
        assert!(!rendered.contains("very-secret"));
    }

    #[test]
    fn test_user_id_optional_in_json() {
        let cred: Credential = serde_json::from_str(r#"{"cred":"c","token":"t"}"#).unwrap();
        assert!(cred.user_id.is_none());
        assert_eq!(serde_json::to_string(&cred).unwrap(), r#"{"cred":"c","token":"t"}"#);
    }
}
