//! Error types for the Altitude provider.

use thiserror::Error;

use crate::schema::Diagnostic;

/// Errors that can occur while talking to the Altitude platform or
/// servicing a provider lifecycle call.
///
/// Every variant carries a short summary and a longer detail string so the
/// host can render them as a diagnostic without further formatting.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The OAuth2 token could not be acquired.
    #[error("{summary}: {detail}")]
    Auth {
        /// Short human-readable summary.
        summary: String,
        /// Detail of the failure.
        detail: String,
    },

    /// The request could not be built or dispatched.
    #[error("{summary}: {detail}")]
    Gateway {
        /// Short human-readable summary.
        summary: String,
        /// Detail of the failure.
        detail: String,
        /// The transport error, if any.
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The platform already holds an entity for this key (HTTP 409).
    #[error("{summary}: {detail}")]
    Conflict {
        /// Short human-readable summary.
        summary: String,
        /// Detail of the conflict.
        detail: String,
    },

    /// The entity does not exist on the platform (HTTP 404).
    #[error("{summary}: {detail}")]
    NotFound {
        /// Short human-readable summary.
        summary: String,
        /// Detail naming the missing entity.
        detail: String,
    },

    /// The platform answered with a status the operation does not expect.
    #[error("Unexpected API Response: {detail}")]
    UnexpectedResponse {
        /// The HTTP status code.
        status: u16,
        /// Status line and response body, verbatim.
        detail: String,
    },

    /// The response body could not be read or parsed.
    #[error("Body Read Error: {0}")]
    InvalidBody(String),

    /// A validation error occurred before any request was made.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A configuration error occurred.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource or data source type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProviderError {
    /// Build an [`ProviderError::Auth`].
    pub fn auth(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Auth {
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    /// Build a [`ProviderError::Gateway`] with no transport cause.
    pub fn gateway(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Gateway {
            summary: summary.into(),
            detail: detail.into(),
            source: None,
        }
    }

    /// Build a [`ProviderError::Conflict`].
    pub fn conflict(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Conflict {
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    /// Build a [`ProviderError::NotFound`].
    pub fn not_found(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::NotFound {
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    /// Wrap a transport failure from the HTTP client.
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        Self::Gateway {
            summary: "HTTP Error".to_string(),
            detail: format!(
                "There has been an error with the http request, received error: {}",
                err
            ),
            source: Some(err),
        }
    }

    /// Get the short summary of the error.
    pub fn summary(&self) -> &str {
        match self {
            Self::Auth { summary, .. }
            | Self::Gateway { summary, .. }
            | Self::Conflict { summary, .. }
            | Self::NotFound { summary, .. } => summary,
            Self::UnexpectedResponse { .. } => "Unexpected API Response",
            Self::InvalidBody(_) => "Body Read Error",
            Self::Validation(_) => "Validation Error",
            Self::Configuration(_) => "Configuration Error",
            Self::UnknownResource(_) => "Unknown Resource Type",
            Self::Serialization(_) => "Serialization Error",
        }
    }

    /// Get the detail of the error.
    pub fn detail(&self) -> String {
        match self {
            Self::Auth { detail, .. }
            | Self::Gateway { detail, .. }
            | Self::Conflict { detail, .. }
            | Self::NotFound { detail, .. }
            | Self::UnexpectedResponse { detail, .. } => detail.clone(),
            Self::InvalidBody(msg)
            | Self::Validation(msg)
            | Self::Configuration(msg)
            | Self::UnknownResource(msg) => msg.clone(),
            Self::Serialization(err) => err.to_string(),
        }
    }

    /// Whether the platform reported the entity as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Render the error as an error diagnostic for the host.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.summary()).with_detail(self.detail())
    }
}
