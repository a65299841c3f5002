//! Credential persistence.
//!
//! - [`CredentialStore`]: persistence callback invoked whenever a session is replaced
//! - [`JsonCredentialStore`]: file-backed store used by the binary

mod error;
mod store;

pub use error::CredentialError;
pub use store::{CredentialStore, JsonCredentialStore};
