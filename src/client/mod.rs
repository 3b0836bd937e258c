//! Authenticated client for the Altitude API.
//!
//! [`AltitudeClient::connect`] acquires a token before anything else, so an
//! `AltitudeClient` always holds one. The per-resource operations live in
//! the submodules as inherent methods on the client.

pub mod auth;
pub mod dto;
pub mod gateway;

mod domain_mapping;
mod logging_endpoints;
mod mte_config;
mod rules_mapping;

use tracing::info;

pub use auth::Token;
pub use gateway::{HttpGateway, RawResponse};

use crate::config::Credentials;
use crate::error::ProviderError;

/// A connected Altitude API client.
#[derive(Debug)]
pub struct AltitudeClient {
    gateway: HttpGateway,
}

impl AltitudeClient {
    /// Build the HTTP client and acquire a token. Fails without a token.
    pub async fn connect(credentials: &Credentials) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ProviderError::gateway("HTTP Error", format!("Unable to build the http client: {}", e))
            })?;

        let token = auth::acquire(&http, credentials).await?;
        info!(base_url = %credentials.base_url, "connected to Altitude");

        Ok(Self::from_gateway(HttpGateway::new(
            http,
            credentials.base_url.clone(),
            token,
        )))
    }

    /// Wrap an existing gateway.
    pub fn from_gateway(gateway: HttpGateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &HttpGateway {
        &self.gateway
    }
}

/// `?domain=` query for the mapping endpoints.
fn domain_query(base: &str, domain: &str) -> String {
    format!("{}?domain={}", base, urlencoding::encode(domain))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::Duration;

    use wiremock::MockServer;

    use super::{AltitudeClient, HttpGateway, Token};

    pub(crate) fn gateway_for(server: &MockServer) -> HttpGateway {
        HttpGateway::new(
            reqwest::Client::new(),
            server.uri(),
            Token::new("test-token", "Bearer", Duration::from_secs(3600)),
        )
    }

    pub(crate) fn client_for(server: &MockServer) -> AltitudeClient {
        AltitudeClient::from_gateway(gateway_for(server))
    }
}
