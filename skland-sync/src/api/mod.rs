//! HTTP query surface.
//!
//! Read-only account projections plus the manual actions (refresh,
//! sign-in, token replacement) over axum.

pub mod error;
pub mod routes;
pub mod server;

pub use error::{ApiError, ApiResult};
pub use server::{ApiServer, ApiServerConfig, AppState};
