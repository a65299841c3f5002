//! Account coordination.
//!
//! One [`AccountCoordinator`] owns the session of one game character: it
//! polls player info, walks the recovery ladder when the session is
//! rejected, persists replaced credentials, and publishes the latest
//! snapshot and health through watch channels.

mod api;
mod error;
mod service;
mod status;

pub use api::{AuthApi, PlayerApi};
pub use error::PollError;
pub use service::{AccountCoordinator, AccountIdentity};
pub use status::{CoordinatorState, CoordinatorStatus};
