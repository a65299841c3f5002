//! skland-sync library crate.
//!
//! Keeps Skland sessions alive for a set of Arknights accounts, polls
//! their player state on a fixed interval and exposes read-only
//! projections over HTTP.
//!
//! - [`coordinator`]: per-account poll and credential recovery
//! - [`scheduler`]: one actor per account driving the coordinator
//! - [`registry`]: process-wide account lookup for queries and actions
//! - [`projection`] / [`sensors`]: views evaluated at read time
//! - [`api`]: axum query surface

pub mod api;
pub mod app;
pub mod config;
pub mod coordinator;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod projection;
pub mod registry;
pub mod scheduler;
pub mod sensors;

pub use error::{Error, Result};
