//! Messages accepted by an account actor.

use skland_api::SignInResult;
use tokio::sync::oneshot;

use crate::coordinator::PollError;

#[derive(Debug)]
pub enum AccountMessage {
    /// Poll now and restart the interval.
    Refresh,
    /// Run the daily attendance and reply with the outcome.
    SignIn {
        reply: oneshot::Sender<SignInResult>,
    },
    /// Re-authenticate with a new user token, then poll.
    Reconfigure {
        user_token: String,
        reply: oneshot::Sender<Result<(), PollError>>,
    },
    Stop,
}

impl AccountMessage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Refresh => "refresh",
            Self::SignIn { .. } => "sign_in",
            Self::Reconfigure { .. } => "reconfigure",
            Self::Stop => "stop",
        }
    }
}
