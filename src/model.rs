//! Domain models for Altitude resources, in the shape the host stores as state.
//!
//! Optional settings are `Option`s so that "never set" survives a trip to the
//! platform and back. Rule lists are the exception: an empty list and an
//! absent one are the same value. The wire mapping lives in
//! [`crate::client::dto`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ProviderError;

/// Point of presence through which traffic is shielded before reaching origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShieldLocation {
    /// London, United Kingdom.
    London,
    /// Manchester, United Kingdom.
    Manchester,
    /// Frankfurt, Germany.
    Frankfurt,
    /// Madrid, Spain.
    Madrid,
    /// New York City, United States.
    #[serde(rename = "New York City")]
    NewYorkCity,
    /// Los Angeles, United States.
    #[serde(rename = "Los Angeles")]
    LosAngeles,
    /// Toronto, Canada.
    Toronto,
    /// Johannesburg, South Africa.
    Johannesburg,
    /// Seoul, South Korea.
    Seoul,
    /// Sydney, Australia.
    Sydney,
    /// Tokyo, Japan.
    Tokyo,
    /// Hong Kong.
    #[serde(rename = "Hong Kong")]
    HongKong,
    /// Mumbai, India.
    Mumbai,
    /// Singapore.
    Singapore,
}

impl ShieldLocation {
    /// Every shield location the platform accepts.
    pub const ALL: [ShieldLocation; 14] = [
        ShieldLocation::London,
        ShieldLocation::Manchester,
        ShieldLocation::Frankfurt,
        ShieldLocation::Madrid,
        ShieldLocation::NewYorkCity,
        ShieldLocation::LosAngeles,
        ShieldLocation::Toronto,
        ShieldLocation::Johannesburg,
        ShieldLocation::Seoul,
        ShieldLocation::Sydney,
        ShieldLocation::Tokyo,
        ShieldLocation::HongKong,
        ShieldLocation::Mumbai,
        ShieldLocation::Singapore,
    ];

    /// The label used in configuration and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::London => "London",
            Self::Manchester => "Manchester",
            Self::Frankfurt => "Frankfurt",
            Self::Madrid => "Madrid",
            Self::NewYorkCity => "New York City",
            Self::LosAngeles => "Los Angeles",
            Self::Toronto => "Toronto",
            Self::Johannesburg => "Johannesburg",
            Self::Seoul => "Seoul",
            Self::Sydney => "Sydney",
            Self::Tokyo => "Tokyo",
            Self::HongKong => "Hong Kong",
            Self::Mumbai => "Mumbai",
            Self::Singapore => "Singapore",
        }
    }
}

impl fmt::Display for ShieldLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShieldLocation {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|location| location.as_str() == s)
            .ok_or_else(|| {
                let labels: Vec<&str> = Self::ALL.iter().map(|l| l.as_str()).collect();
                ProviderError::Validation(format!(
                    "'{}' is not a shield location, expected one of: {}",
                    s,
                    labels.join(", ")
                ))
            })
    }
}

/// A route from a host and path prefix to an environment's origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub host: String,
    pub path: String,
    pub enable_ssl: bool,
    pub preserve_path_prefix: bool,
    pub append_path_prefix: Option<String>,
    pub shield_location: Option<ShieldLocation>,
}

/// Basic auth credentials guarding every route of an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// Request headers and cookies that make up a cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheKeys {
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub cookies: Vec<String>,
}

/// Glob matchers selecting the paths a cache rule applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRules {
    #[serde(default)]
    pub any_match: Vec<String>,
    #[serde(default)]
    pub none_match: Vec<String>,
}

/// A caching rule. At least one of `keys` or `ttl_seconds` must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRule {
    pub keys: Option<CacheKeys>,
    pub ttl_seconds: Option<i64>,
    pub path_rules: Option<PathRules>,
}

impl CacheRule {
    /// Whether the rule carries a cache key or a TTL.
    pub fn has_effect(&self) -> bool {
        self.keys.is_some() || self.ttl_seconds.is_some()
    }
}

/// Sets `new_header` to `match_value` when `matching_header` matches
/// `pattern`, and to `no_match_value` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalHeader {
    pub matching_header: String,
    pub pattern: String,
    pub new_header: String,
    pub match_value: String,
    pub no_match_value: String,
}

/// The MTE configuration of one environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MteConfig {
    pub routes: Vec<Route>,
    pub basic_auth: Option<BasicAuth>,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub cache: Vec<CacheRule>,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub conditional_headers: Vec<ConditionalHeader>,
}

/// Reads `null` as an empty list, so absent, `null` and `[]` all decode alike.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// State of the `altitude_mte_config` resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MteConfigState {
    /// Environment the config belongs to; changing it replaces the resource.
    pub environment_id: String,
    pub config: MteConfig,
}

/// State of the `altitude_mte_domain_mapping` resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainMappingState {
    pub environment_id: String,
    /// The mapped domain; changing it replaces the resource.
    pub domain: String,
    /// Opaque token assigned by the platform.
    #[serde(default)]
    pub domain_mapping: Option<String>,
}

/// State of the `altitude_mte_rules_mapping` resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesMappingState {
    /// The domain the rules apply to; changing it replaces the resource.
    pub domain: String,
    /// Identifier of a rule group created through the platform API.
    pub rules_id: String,
}

/// A BigQuery column populated from a request header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingHeader {
    pub column_name: String,
    pub header_name: String,
    pub default_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonSensitiveLoggingConfig {
    pub dataset: String,
    pub project_id: String,
    pub table: String,
    pub email: String,
    pub headers: Vec<LoggingHeader>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitiveLoggingConfig {
    pub secret_key: String,
}

/// Logging endpoint settings, split so the secret can be marked sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingEndpointConfig {
    pub non_sensitive: NonSensitiveLoggingConfig,
    pub sensitive: Option<SensitiveLoggingConfig>,
}

/// An access logging endpoint configured on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingEndpoint {
    #[serde(rename = "type")]
    pub endpoint_type: String,
    pub environment_id: String,
    pub config: LoggingEndpointConfig,
}

/// State of the `altitude_mte_logging_endpoints` data source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingEndpoints {
    pub endpoints: Vec<LoggingEndpoint>,
}
