//! OAuth2 client-credentials token acquisition.

use std::fmt;
use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Credentials;
use crate::error::ProviderError;

#[derive(Serialize)]
struct TokenRequest<'a> {
    audience: &'a str,
    grant_type: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    token_type: String,
    expires_in: u64,
}

/// A bearer token. Never refreshed; see [`Token::is_expired`].
pub struct Token {
    access_token: SecretString,
    token_type: String,
    expires_in: Duration,
    acquired_at: Instant,
}

impl Token {
    pub(crate) fn new(access_token: impl Into<String>, token_type: impl Into<String>, expires_in: Duration) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            token_type: token_type.into(),
            expires_in,
            acquired_at: Instant::now(),
        }
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    pub fn expires_in(&self) -> Duration {
        self.expires_in
    }

    /// Whether the lifetime reported by the issuer has elapsed.
    pub fn is_expired(&self) -> bool {
        self.acquired_at.elapsed() >= self.expires_in
    }

    pub(crate) fn secret(&self) -> &str {
        self.access_token.expose_secret()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Exchange client credentials for a token with a single POST to the issuer.
pub async fn acquire(http: &reqwest::Client, credentials: &Credentials) -> Result<Token, ProviderError> {
    let url = credentials.token_url();
    debug!(url = %url, client_id = %credentials.client_id, "requesting access token");

    let body = TokenRequest {
        audience: &credentials.audience,
        grant_type: "client_credentials",
        client_id: &credentials.client_id,
        client_secret: credentials.client_secret.expose_secret(),
    };

    let response = http
        .post(&url)
        .header(CONTENT_TYPE, "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| {
            ProviderError::auth(
                "HTTP Error",
                format!("There has been an error with the http request, received error: {}", e),
            )
        })?;

    let status = response.status();
    let text = response.text().await.map_err(|e| {
        ProviderError::auth("Body Read Error", format!("Unable to read token response body: {}", e))
    })?;

    if status != StatusCode::OK {
        return Err(ProviderError::auth(
            "Unexpected API Response",
            format!(
                "The Altitude Auth Request returned a non-200 response of {} with body {}.",
                status, text
            ),
        ));
    }

    let parsed: TokenResponse = serde_json::from_str(&text).map_err(|e| {
        ProviderError::auth(
            "Body Read Error",
            format!("Unable to parse JSON body from Altitude auth response: {}", e),
        )
    })?;

    info!(token_type = %parsed.token_type, expires_in = parsed.expires_in, "acquired access token");
    Ok(Token::new(
        parsed.access_token,
        parsed.token_type,
        Duration::from_secs(parsed.expires_in),
    ))
}
