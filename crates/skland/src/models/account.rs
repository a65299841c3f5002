use serde::{Deserialize, Serialize};

/// A game character bound to the Skland account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingCharacter {
    pub uid: String,
    pub nickname: String,
    /// Channel id, sent as `gameId` when signing in.
    pub channel_master_id: String,
    pub channel_name: String,
    pub is_official: bool,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
    pub name: String,
    pub count: i64,
}

/// Outcome of a daily attendance sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInResult {
    pub success: bool,
    pub message: String,
    pub awards: Vec<Award>,
}

impl SignInResult {
    pub const ALREADY_SIGNED_MESSAGE: &'static str = "今日已签到";

    pub fn signed(awards: Vec<Award>) -> Self {
        let message = if awards.is_empty() {
            "签到成功！".to_string()
        } else {
            let text = awards
                .iter()
                .map(|a| format!("{} x{}", a.name, a.count))
                .collect::<Vec<_>>()
                .join(", ");
            format!("签到成功！获得: {text}")
        };
        Self {
            success: true,
            message,
            awards,
        }
    }

    pub fn already_signed() -> Self {
        Self {
            success: true,
            message: Self::ALREADY_SIGNED_MESSAGE.to_string(),
            awards: Vec::new(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            awards: Vec::new(),
        }
    }
}
