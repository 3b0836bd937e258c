use reqwest::StatusCode;

use super::dto::DomainMappingDto;
use super::{domain_query, AltitudeClient};
use crate::error::ProviderError;

const PATH: &str = "/v1/mte/domain-mapping";

fn not_found(domain: &str) -> ProviderError {
    ProviderError::not_found(
        "Domain not found",
        format!("The Domain {} does not have associated config.", domain),
    )
}

impl AltitudeClient {
    /// Map `domain` to an environment. Returns the platform's opaque
    /// mapping token.
    pub async fn create_domain_mapping(
        &self,
        environment_id: &str,
        domain: &str,
    ) -> Result<String, ProviderError> {
        let body = DomainMappingDto {
            environment_id: environment_id.to_string(),
            domain: domain.to_string(),
        };
        let response = self.gateway.post(PATH, &body).await?;

        match response.status {
            StatusCode::CREATED => Ok(response.opaque()),
            StatusCode::CONFLICT => Err(ProviderError::conflict(
                "Domain Conflict",
                "This domain already has an associated config block.",
            )),
            _ => Err(response.unexpected(StatusCode::CREATED)),
        }
    }

    /// The platform's opaque mapping token for `domain`.
    pub async fn read_domain_mapping(&self, domain: &str) -> Result<String, ProviderError> {
        let response = self.gateway.get(&domain_query(PATH, domain)).await?;

        match response.status {
            StatusCode::OK => Ok(response.opaque()),
            StatusCode::NOT_FOUND => Err(not_found(domain)),
            _ => Err(response.unexpected(StatusCode::OK)),
        }
    }

    pub async fn update_domain_mapping(
        &self,
        environment_id: &str,
        domain: &str,
    ) -> Result<String, ProviderError> {
        let body = DomainMappingDto {
            environment_id: environment_id.to_string(),
            domain: domain.to_string(),
        };
        let response = self.gateway.put(PATH, &body).await?;

        match response.status {
            StatusCode::CREATED => Ok(response.opaque()),
            _ => Err(response.unexpected(StatusCode::CREATED)),
        }
    }

    pub async fn delete_domain_mapping(&self, domain: &str) -> Result<(), ProviderError> {
        let response = self.gateway.delete(&domain_query(PATH, domain)).await?;

        match response.status {
            StatusCode::NO_CONTENT => Ok(()),
            StatusCode::NOT_FOUND => Err(not_found(domain)),
            _ => Err(response.unexpected(StatusCode::NO_CONTENT)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::client_for;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_create_returns_body_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(PATH))
            .and(body_json(json!({"environmentId": "env-1", "domain": "shop.example.com"})))
            .respond_with(ResponseTemplate::new(201).set_body_string("dm-7f3a"))
            .expect(1)
            .mount(&server)
            .await;

        let token = client_for(&server)
            .create_domain_mapping("env-1", "shop.example.com")
            .await
            .unwrap();
        assert_eq!(token, "dm-7f3a");
    }

    #[tokio::test]
    async fn test_create_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(PATH))
            .respond_with(ResponseTemplate::new(409))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_domain_mapping("env-1", "shop.example.com")
            .await
            .unwrap_err();
        assert_eq!(err.summary(), "Domain Conflict");
        assert!(err.detail().contains("already has an associated config"));
    }

    #[tokio::test]
    async fn test_read_unquotes_json_string() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PATH))
            .and(query_param("domain", "shop.example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_string("\"dm-7f3a\""))
            .expect(1)
            .mount(&server)
            .await;

        let token = client_for(&server)
            .read_domain_mapping("shop.example.com")
            .await
            .unwrap();
        assert_eq!(token, "dm-7f3a");
    }

    #[tokio::test]
    async fn test_read_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PATH))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .read_domain_mapping("gone.example.com")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(err.detail().contains("gone.example.com"));
    }

    #[tokio::test]
    async fn test_update_puts_and_expects_201() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(PATH))
            .and(body_json(json!({"environmentId": "env-2", "domain": "shop.example.com"})))
            .respond_with(ResponseTemplate::new(201).set_body_string("dm-8b21"))
            .expect(1)
            .mount(&server)
            .await;

        let token = client_for(&server)
            .update_domain_mapping("env-2", "shop.example.com")
            .await
            .unwrap();
        assert_eq!(token, "dm-8b21");
    }

    #[tokio::test]
    async fn test_delete_by_query() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(PATH))
            .and(query_param("domain", "shop.example.com"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .delete_domain_mapping("shop.example.com")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .delete_domain_mapping("shop.example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnexpectedResponse { status: 500, .. }));
    }
}
