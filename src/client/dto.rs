//! Wire representations of Altitude entities and their mapping to the
//! domain models in [`crate::model`].
//!
//! Unset optional fields are omitted rather than sent as `null`. Lists of
//! rules and matchers are omitted when empty, and decode absent as empty.

use serde::{Deserialize, Serialize};

use crate::model::{
    null_as_empty, BasicAuth, CacheKeys, CacheRule, ConditionalHeader, LoggingEndpoint, LoggingEndpointConfig,
    LoggingEndpoints, LoggingHeader, MteConfig, NonSensitiveLoggingConfig, PathRules, Route,
    SensitiveLoggingConfig, ShieldLocation,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MteConfigDto {
    #[serde(default)]
    pub routes: Vec<RouteDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_auth: Option<BasicAuthDto>,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub cache: Vec<CacheDto>,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub conditional_headers: Vec<ConditionalHeaderDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDto {
    pub host: String,
    pub path: String,
    pub enable_ssl: bool,
    pub preserve_path_prefix: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub append_path_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shield_location: Option<ShieldLocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicAuthDto {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<CacheKeyDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_rules: Option<MatcherDto>,
}

/// Cache key parts; the wire uses singular names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheKeyDto {
    #[serde(default)]
    pub header: Vec<String>,
    #[serde(default)]
    pub cookie: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatcherDto {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_match: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub none_match: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalHeaderDto {
    pub matching_header: String,
    pub pattern: String,
    pub new_header: String,
    pub match_value: String,
    pub no_match_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainMappingDto {
    pub environment_id: String,
    pub domain: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesMappingDto {
    pub domain: String,
    pub rules_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingEndpointsDto {
    #[serde(default)]
    pub endpoints: Vec<LoggingEndpointDto>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingEndpointDto {
    #[serde(rename = "type")]
    pub endpoint_type: String,
    pub environment_id: String,
    pub config: LoggingConfigDto,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfigDto {
    #[serde(default)]
    pub dataset: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub table: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub headers: Vec<LoggingHeaderDto>,
    #[serde(default)]
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingHeaderDto {
    pub column_name: String,
    pub header_name: String,
    #[serde(default)]
    pub default_value: String,
}

// Encode: domain -> wire

impl From<&MteConfig> for MteConfigDto {
    fn from(config: &MteConfig) -> Self {
        Self {
            routes: config.routes.iter().map(RouteDto::from).collect(),
            basic_auth: config.basic_auth.as_ref().map(|auth| BasicAuthDto {
                username: auth.username.clone(),
                password: auth.password.clone(),
            }),
            cache: config.cache.iter().map(CacheDto::from).collect(),
            conditional_headers: config
                .conditional_headers
                .iter()
                .map(ConditionalHeaderDto::from)
                .collect(),
        }
    }
}

impl From<&Route> for RouteDto {
    fn from(route: &Route) -> Self {
        Self {
            host: route.host.clone(),
            path: route.path.clone(),
            enable_ssl: route.enable_ssl,
            preserve_path_prefix: route.preserve_path_prefix,
            append_path_prefix: route.append_path_prefix.clone(),
            shield_location: route.shield_location,
        }
    }
}

impl From<&CacheRule> for CacheDto {
    fn from(rule: &CacheRule) -> Self {
        Self {
            keys: rule.keys.as_ref().map(|keys| CacheKeyDto {
                header: keys.headers.clone(),
                cookie: keys.cookies.clone(),
            }),
            ttl_seconds: rule.ttl_seconds,
            path_rules: rule.path_rules.as_ref().map(|rules| MatcherDto {
                any_match: rules.any_match.clone(),
                none_match: rules.none_match.clone(),
            }),
        }
    }
}

impl From<&ConditionalHeader> for ConditionalHeaderDto {
    fn from(header: &ConditionalHeader) -> Self {
        Self {
            matching_header: header.matching_header.clone(),
            pattern: header.pattern.clone(),
            new_header: header.new_header.clone(),
            match_value: header.match_value.clone(),
            no_match_value: header.no_match_value.clone(),
        }
    }
}

// Decode: wire -> domain

impl From<MteConfigDto> for MteConfig {
    fn from(dto: MteConfigDto) -> Self {
        Self {
            routes: dto.routes.into_iter().map(Route::from).collect(),
            basic_auth: dto.basic_auth.map(|auth| BasicAuth {
                username: auth.username,
                password: auth.password,
            }),
            cache: dto.cache.into_iter().map(CacheRule::from).collect(),
            conditional_headers: dto
                .conditional_headers
                .into_iter()
                .map(ConditionalHeader::from)
                .collect(),
        }
    }
}

impl From<RouteDto> for Route {
    fn from(dto: RouteDto) -> Self {
        Self {
            host: dto.host,
            path: dto.path,
            enable_ssl: dto.enable_ssl,
            preserve_path_prefix: dto.preserve_path_prefix,
            append_path_prefix: dto.append_path_prefix,
            shield_location: dto.shield_location,
        }
    }
}

impl From<CacheDto> for CacheRule {
    fn from(dto: CacheDto) -> Self {
        Self {
            keys: dto.keys.map(|keys| CacheKeys {
                headers: keys.header,
                cookies: keys.cookie,
            }),
            ttl_seconds: dto.ttl_seconds,
            path_rules: dto.path_rules.map(|rules| PathRules {
                any_match: rules.any_match,
                none_match: rules.none_match,
            }),
        }
    }
}

impl From<ConditionalHeaderDto> for ConditionalHeader {
    fn from(dto: ConditionalHeaderDto) -> Self {
        Self {
            matching_header: dto.matching_header,
            pattern: dto.pattern,
            new_header: dto.new_header,
            match_value: dto.match_value,
            no_match_value: dto.no_match_value,
        }
    }
}

impl From<LoggingEndpointsDto> for LoggingEndpoints {
    fn from(dto: LoggingEndpointsDto) -> Self {
        Self {
            endpoints: dto.endpoints.into_iter().map(LoggingEndpoint::from).collect(),
        }
    }
}

impl From<LoggingEndpointDto> for LoggingEndpoint {
    fn from(dto: LoggingEndpointDto) -> Self {
        let config = dto.config;
        let sensitive = config
            .secret_key
            .filter(|key| !key.is_empty())
            .map(|secret_key| SensitiveLoggingConfig { secret_key });

        Self {
            endpoint_type: dto.endpoint_type,
            environment_id: dto.environment_id,
            config: LoggingEndpointConfig {
                non_sensitive: NonSensitiveLoggingConfig {
                    dataset: config.dataset,
                    project_id: config.project_id,
                    table: config.table,
                    email: config.email,
                    headers: config
                        .headers
                        .into_iter()
                        .map(|h| LoggingHeader {
                            column_name: h.column_name,
                            header_name: h.header_name,
                            default_value: h.default_value,
                        })
                        .collect(),
                },
                sensitive,
            },
        }
    }
}
