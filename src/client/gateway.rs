//! Authenticated request dispatch against the Altitude API.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::auth::Token;
use crate::error::ProviderError;

/// Status and body of a completed request. Status interpretation is left to
/// the per-resource operations.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    /// The error for a status the calling operation does not expect.
    pub fn unexpected(&self, expected: StatusCode) -> ProviderError {
        ProviderError::UnexpectedResponse {
            status: self.status.as_u16(),
            detail: format!(
                "The Altitude API Request returned a non-{} response of {} with body {}.",
                expected.as_u16(),
                self.status,
                self.body
            ),
        }
    }

    /// Parse the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ProviderError> {
        serde_json::from_str(&self.body).map_err(|e| {
            ProviderError::InvalidBody(format!(
                "Unable to parse JSON body from Altitude response: {}",
                e
            ))
        })
    }

    /// The body as an opaque scalar: a JSON string literal is unquoted,
    /// anything else is trimmed and taken verbatim.
    pub fn opaque(&self) -> String {
        let trimmed = self.body.trim();
        serde_json::from_str::<String>(trimmed).unwrap_or_else(|_| trimmed.to_string())
    }
}

/// Sends requests with the bearer token of its client. Holds one pooled
/// `reqwest::Client` for its whole lifetime.
#[derive(Debug)]
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
    token: Token,
}

impl HttpGateway {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, token: Token) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Issue one request. `path` must begin with `/`; no request is made
    /// otherwise.
    pub async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<RawResponse, ProviderError>
    where
        B: Serialize + ?Sized,
    {
        if !path.starts_with('/') {
            return Err(ProviderError::gateway(
                "Incorrect Path Format",
                format!("The path {} should be specified with a prefixed slash.", path),
            ));
        }

        if self.token.is_expired() {
            warn!(
                expires_in = ?self.token.expires_in(),
                "access token has outlived its lifetime, the request may be rejected"
            );
        }

        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .http
            .request(method.clone(), &url)
            .bearer_auth(self.token.secret());

        if method == Method::POST || method == Method::PUT || method == Method::GET {
            request = request.header(CONTENT_TYPE, "application/json");
        }
        if let Some(body) = body {
            request = request.body(serde_json::to_vec(body)?);
        }

        let response = request.send().await.map_err(ProviderError::transport)?;
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ProviderError::InvalidBody(format!("Unable to read body from Altitude response: {}", e))
        })?;

        debug!(%method, path, status = status.as_u16(), "altitude request completed");
        Ok(RawResponse { status, body })
    }

    pub async fn get(&self, path: &str) -> Result<RawResponse, ProviderError> {
        self.send::<()>(Method::GET, path, None).await
    }

    pub async fn delete(&self, path: &str) -> Result<RawResponse, ProviderError> {
        self.send::<()>(Method::DELETE, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<RawResponse, ProviderError> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<RawResponse, ProviderError> {
        self.send(Method::PUT, path, Some(body)).await
    }
}
