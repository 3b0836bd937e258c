//! Provider configuration and credential resolution.

use std::fmt;

use secrecy::SecretString;
use serde::Deserialize;

use crate::schema::Diagnostic;

/// Default Altitude API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.platform.thgaltitude.com";

/// Default OAuth2 issuer that mints client-credentials tokens.
pub const DEFAULT_ISSUER: &str = "https://thgaltitude.eu.auth0.com";

pub const ENV_CLIENT_ID: &str = "ALTITUDE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "ALTITUDE_CLIENT_SECRET";
pub const ENV_AUDIENCE: &str = "ALTITUDE_AUDIENCE";

/// The provider block as written by the user. Unset and empty values fall
/// back to the environment or to defaults.
#[derive(Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("audience", &self.audience)
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl ProviderConfig {
    /// Parse the host's provider block. A `null` block is an empty config.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value)
    }
}

/// Everything needed to obtain a token and address the API.
#[derive(Debug)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: SecretString,
    pub audience: String,
    pub issuer: String,
    pub base_url: String,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

impl Credentials {
    /// Merge `config` with values looked up through `env`, reporting every
    /// missing value at once.
    pub fn resolve<F>(config: &ProviderConfig, env: F) -> Result<Self, Vec<Diagnostic>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |configured: &Option<String>, var: &str| {
            non_empty(configured).or_else(|| non_empty(&env(var)))
        };

        let client_id = lookup(&config.client_id, ENV_CLIENT_ID);
        let client_secret = lookup(&config.client_secret, ENV_CLIENT_SECRET);
        let audience = lookup(&config.audience, ENV_AUDIENCE);

        let mut diagnostics = Vec::new();
        for (attribute, var, value) in [
            ("client_id", ENV_CLIENT_ID, &client_id),
            ("client_secret", ENV_CLIENT_SECRET, &client_secret),
            ("audience", ENV_AUDIENCE, &audience),
        ] {
            if value.is_none() {
                diagnostics.push(
                    Diagnostic::error(format!("Missing Altitude {}", attribute.replace('_', " ")))
                        .with_detail(format!(
                            "Set the {} value in the provider block or the {} environment variable.",
                            attribute, var
                        ))
                        .with_attribute(attribute),
                );
            }
        }

        match (client_id, client_secret, audience) {
            (Some(client_id), Some(client_secret), Some(audience)) => Ok(Self {
                client_id,
                client_secret: SecretString::from(client_secret),
                audience,
                issuer: non_empty(&config.issuer).unwrap_or_else(|| DEFAULT_ISSUER.to_string()),
                base_url: non_empty(&config.base_url)
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            }),
            _ => Err(diagnostics),
        }
    }

    /// Resolve against the process environment.
    pub fn from_env(config: &ProviderConfig) -> Result<Self, Vec<Diagnostic>> {
        Self::resolve(config, |var| std::env::var(var).ok())
    }

    /// The issuer's token endpoint.
    pub fn token_url(&self) -> String {
        format!("{}/oauth/token", self.issuer.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serde_json::json;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_config_wins_over_env() {
        let config = ProviderConfig::from_value(json!({
            "client_id": "from-config",
            "client_secret": "s3cret",
            "audience": "https://api.platform.thgaltitude.com"
        }))
        .unwrap();

        let creds = Credentials::resolve(&config, env_of(&[(ENV_CLIENT_ID, "from-env")])).unwrap();
        assert_eq!(creds.client_id, "from-config");
        assert_eq!(creds.client_secret.expose_secret(), "s3cret");
        assert_eq!(creds.base_url, DEFAULT_BASE_URL);
        assert_eq!(creds.token_url(), "https://thgaltitude.eu.auth0.com/oauth/token");
    }

    #[test]
    fn test_env_fallback_for_empty_values() {
        let config = ProviderConfig::from_value(json!({
            "client_id": "",
            "base_url": "http://localhost:9000",
            "issuer": "http://localhost:9001/"
        }))
        .unwrap();

        let creds = Credentials::resolve(
            &config,
            env_of(&[
                (ENV_CLIENT_ID, "env-id"),
                (ENV_CLIENT_SECRET, "env-secret"),
                (ENV_AUDIENCE, "env-audience"),
            ]),
        )
        .unwrap();
        assert_eq!(creds.client_id, "env-id");
        assert_eq!(creds.audience, "env-audience");
        assert_eq!(creds.base_url, "http://localhost:9000");
        assert_eq!(creds.token_url(), "http://localhost:9001/oauth/token");
    }

    #[test]
    fn test_missing_values_reported_together() {
        let config = ProviderConfig::from_value(json!(null)).unwrap();
        let diagnostics = Credentials::resolve(&config, env_of(&[(ENV_AUDIENCE, "aud")]))
            .unwrap_err();

        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.is_error()));
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("client_id"));
        assert_eq!(diagnostics[1].attribute.as_deref(), Some("client_secret"));
        assert!(diagnostics[1]
            .detail
            .as_deref()
            .unwrap()
            .contains(ENV_CLIENT_SECRET));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(ProviderConfig::from_value(json!({"region": "eu"})).is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = ProviderConfig {
            client_secret: Some("s3cret".to_string()),
            ..Default::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("REDACTED"));
    }
}
