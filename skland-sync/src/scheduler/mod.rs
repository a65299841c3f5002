//! Account scheduling.
//!
//! Each configured account runs as an [`AccountActor`]: a task that owns
//! its poll timer and handles commands (refresh, sign-in, reconfigure)
//! from a bounded mailbox. The actor decides when to poll; the
//! [`AccountCoordinator`](crate::coordinator::AccountCoordinator) decides
//! how.

mod account_actor;
mod handle;
mod messages;

pub use account_actor::{AccountActor, ActorExit};
pub use handle::{AccountHandle, DEFAULT_MAILBOX_CAPACITY, DEFAULT_SEND_TIMEOUT, SendError};
pub use messages::AccountMessage;
