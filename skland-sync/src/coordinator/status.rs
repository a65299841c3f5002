use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::PollError;

/// Where the coordinator is in its poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorState {
    #[default]
    Idle,
    Fetching,
    AuthRecovering,
    Success,
    Failed,
}

impl std::fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::AuthRecovering => "auth_recovering",
            Self::Success => "success",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Published health of one account.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CoordinatorStatus {
    pub state: CoordinatorState,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
    /// Set by a terminal auth failure, cleared by a successful poll.
    pub requires_reconfiguration: bool,
}

impl CoordinatorStatus {
    pub(crate) fn record_success(&mut self, at: DateTime<Utc>) {
        self.state = CoordinatorState::Success;
        self.last_success = Some(at);
        self.last_error = None;
        self.consecutive_failures = 0;
        self.requires_reconfiguration = false;
    }

    pub(crate) fn record_failure(&mut self, error: &PollError) {
        self.state = CoordinatorState::Failed;
        self.last_error = Some(error.to_string());
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        if error.requires_reconfiguration() {
            self.requires_reconfiguration = true;
        }
    }
}
