//! Client library for the Skland companion service.
//!
//! - [`transport`]: signed request transport and response classification
//! - [`auth`]: credential lifecycle (grant exchange, credential generation, token refresh)
//! - [`client`]: game endpoints (binding list, player info, attendance)
//! - [`models`]: player snapshots parsed from the upstream payloads
//! - [`metrics`]: pure "value right now" projections over those snapshots

pub mod auth;
pub mod client;
pub mod constants;
pub mod credential;
pub mod error;
pub mod http;
pub mod metrics;
pub mod models;
pub mod sign;
pub mod transport;

pub use auth::SklandAuth;
pub use client::SklandClient;
pub use credential::Credential;
pub use error::{Result, SklandError};
pub use models::{
    AssistChar, BindingCharacter, BuildingSnapshot, CampaignInfo, EnergySnapshot, PlayerStatus,
    RoutineInfo, SignInResult, TowerInfo,
};
pub use transport::SignedTransport;
