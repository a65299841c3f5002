use std::sync::OnceLock;
use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use tracing::debug;

use crate::constants::{REQUEST_TIMEOUT, USER_AGENT};

/// Install the process-wide rustls crypto provider once.
pub fn install_rustls_provider() {
    static PROVIDER_INSTALLED: OnceLock<()> = OnceLock::new();
    PROVIDER_INSTALLED.get_or_init(|| {
        if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
            // Another crate installed one first.
            debug!(existing_provider = ?e, "rustls CryptoProvider already installed");
        }
    });
}

/// A `reqwest::ClientBuilder` preconfigured for the Skland endpoints.
pub fn create_client_builder(timeout: Option<Duration>) -> ClientBuilder {
    install_rustls_provider();

    Client::builder()
        .user_agent(USER_AGENT)
        .gzip(true)
        .timeout(timeout.unwrap_or(REQUEST_TIMEOUT))
}

/// Build a client with the default request timeout.
pub fn default_client() -> reqwest::Result<Client> {
    create_client_builder(None).build()
}
