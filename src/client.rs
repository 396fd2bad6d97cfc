//! Outbound HTTP client shared by the segment source and the catalog

use crate::config::HttpConfig;
use crate::error::Result;
use reqwest::Client;
use std::time::Duration;

/// Build the upstream client from configuration
pub fn build_client(config: &HttpConfig) -> Result<Client> {
    let mut builder = Client::builder().user_agent(config.user_agent.clone());

    if let Some(timeout) = request_timeout(config) {
        builder = builder.timeout(timeout);
    }

    Ok(builder.build()?)
}

/// Total per-request timeout, if one is configured
fn request_timeout(config: &HttpConfig) -> Option<Duration> {
    (config.timeout_seconds > 0).then(|| Duration::from_secs(config.timeout_seconds))
}
