use reqwest::StatusCode;
use tracing::debug;

use super::dto::MteConfigDto;
use super::{AltitudeClient, RawResponse};
use crate::error::ProviderError;
use crate::model::MteConfig;
use crate::validation::check_mte_config;

// Writes go through v1, reads and deletes through v2.
fn write_path(environment_id: &str) -> String {
    format!("/v1/environment/{}/mte/altitude-config", environment_id)
}

fn read_path(environment_id: &str) -> String {
    format!("/v2/environment/{}/mte/altitude-config", environment_id)
}

fn not_found(environment_id: &str) -> ProviderError {
    ProviderError::not_found(
        "Environment ID not found",
        format!(
            "The Environment {} does not have associated config.",
            environment_id
        ),
    )
}

/// The config the platform echoed back, or the submitted one when the body
/// is empty or not a config.
fn echoed_or_submitted(response: &RawResponse, submitted: &MteConfig) -> MteConfig {
    if response.body.trim().is_empty() {
        return submitted.clone();
    }
    match response.json::<MteConfigDto>() {
        Ok(dto) => MteConfig::from(dto),
        Err(err) => {
            debug!(error = %err, "response is not a config, keeping the submitted one");
            submitted.clone()
        },
    }
}

impl AltitudeClient {
    pub async fn create_mte_config(
        &self,
        environment_id: &str,
        config: &MteConfig,
    ) -> Result<MteConfig, ProviderError> {
        check_mte_config(config)?;
        let response = self
            .gateway
            .post(&write_path(environment_id), &MteConfigDto::from(config))
            .await?;

        match response.status {
            StatusCode::CREATED => Ok(echoed_or_submitted(&response, config)),
            StatusCode::CONFLICT => Err(ProviderError::conflict(
                "Environment ID Conflict",
                "This environment already has an associated config block.",
            )),
            _ => Err(response.unexpected(StatusCode::CREATED)),
        }
    }

    pub async fn read_mte_config(&self, environment_id: &str) -> Result<MteConfig, ProviderError> {
        let response = self.gateway.get(&read_path(environment_id)).await?;

        match response.status {
            StatusCode::OK => Ok(MteConfig::from(response.json::<MteConfigDto>()?)),
            StatusCode::NOT_FOUND => Err(not_found(environment_id)),
            _ => Err(response.unexpected(StatusCode::OK)),
        }
    }

    /// Replace the config. The platform answers 201, not 200.
    pub async fn update_mte_config(
        &self,
        environment_id: &str,
        config: &MteConfig,
    ) -> Result<MteConfig, ProviderError> {
        check_mte_config(config)?;
        let response = self
            .gateway
            .put(&write_path(environment_id), &MteConfigDto::from(config))
            .await?;

        match response.status {
            StatusCode::CREATED => Ok(echoed_or_submitted(&response, config)),
            _ => Err(response.unexpected(StatusCode::CREATED)),
        }
    }

    pub async fn delete_mte_config(&self, environment_id: &str) -> Result<(), ProviderError> {
        let response = self.gateway.delete(&read_path(environment_id)).await?;

        match response.status {
            StatusCode::NO_CONTENT => Ok(()),
            StatusCode::NOT_FOUND => Err(not_found(environment_id)),
            _ => Err(response.unexpected(StatusCode::NO_CONTENT)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::client_for;
    use crate::model::{BasicAuth, CacheRule, Route, ShieldLocation};
    use serde_json::json;
    use wiremock::matchers::{any, body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const WRITE_PATH: &str = "/v1/environment/env-1/mte/altitude-config";
    const READ_PATH: &str = "/v2/environment/env-1/mte/altitude-config";

    fn config() -> MteConfig {
        MteConfig {
            routes: vec![Route {
                host: "origin.example.com".to_string(),
                path: "/".to_string(),
                enable_ssl: true,
                preserve_path_prefix: true,
                append_path_prefix: Some("/en".to_string()),
                shield_location: Some(ShieldLocation::London),
            }],
            basic_auth: None,
            cache: vec![CacheRule {
                ttl_seconds: Some(120),
                ..Default::default()
            }],
            conditional_headers: vec![],
        }
    }

    fn wire() -> serde_json::Value {
        json!({
            "routes": [{
                "host": "origin.example.com",
                "path": "/",
                "enableSsl": true,
                "preservePathPrefix": true,
                "appendPathPrefix": "/en",
                "shieldLocation": "London"
            }],
            "cache": [{"ttlSeconds": 120}]
        })
    }

    #[tokio::test]
    async fn test_create_posts_wire_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(WRITE_PATH))
            .and(header("Authorization", "Bearer test-token"))
            .and(body_json(wire()))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let created = client_for(&server)
            .create_mte_config("env-1", &config())
            .await
            .unwrap();
        assert_eq!(created, config());
    }

    #[tokio::test]
    async fn test_create_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(WRITE_PATH))
            .respond_with(ResponseTemplate::new(409))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_mte_config("env-1", &config())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Conflict { .. }));
        assert!(err.detail().contains("already has an associated config"));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_cache_rule_before_request() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let mut invalid = config();
        invalid.cache = vec![CacheRule::default()];
        let err = client_for(&server)
            .create_mte_config("env-1", &invalid)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
    }

    #[tokio::test]
    async fn test_read_decodes_config() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(READ_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(wire()))
            .expect(1)
            .mount(&server)
            .await;

        let read = client_for(&server).read_mte_config("env-1").await.unwrap();
        assert_eq!(read, config());
        assert!(read.basic_auth.is_none());
        assert!(read.conditional_headers.is_empty());
    }

    #[tokio::test]
    async fn test_read_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(READ_PATH))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server).read_mte_config("env-1").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.detail().contains("env-1"));
    }

    #[tokio::test]
    async fn test_read_garbage_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(READ_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).read_mte_config("env-1").await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidBody(_)));
    }

    #[tokio::test]
    async fn test_update_expects_201() {
        let server = MockServer::start().await;
        let mut updated = config();
        updated.basic_auth = Some(BasicAuth {
            username: "user".to_string(),
            password: "pass".to_string(),
        });
        let mut updated_wire = wire();
        updated_wire["basicAuth"] = json!({"username": "user", "password": "pass"});

        Mock::given(method("PUT"))
            .and(path(WRITE_PATH))
            .and(body_json(updated_wire.clone()))
            .respond_with(ResponseTemplate::new(201).set_body_json(updated_wire))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server)
            .update_mte_config("env-1", &updated)
            .await
            .unwrap();
        assert_eq!(result, updated);
    }

    #[tokio::test]
    async fn test_update_200_is_unexpected() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(WRITE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("fine"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .update_mte_config("env-1", &config())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnexpectedResponse { status: 200, .. }));
        assert!(err.detail().contains("fine"));
    }

    #[tokio::test]
    async fn test_delete_ignores_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(READ_PATH))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).delete_mte_config("env-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(READ_PATH))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .delete_mte_config("env-1")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
