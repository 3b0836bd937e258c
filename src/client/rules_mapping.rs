use reqwest::StatusCode;

use super::dto::RulesMappingDto;
use super::{domain_query, AltitudeClient};
use crate::error::ProviderError;

const PATH: &str = "/v1/mte/rules-mapping";

fn not_found(domain: &str) -> ProviderError {
    ProviderError::not_found(
        "Domain not found",
        format!("The Domain {} does not have an associated rule group.", domain),
    )
}

impl AltitudeClient {
    /// Attach the rule group `rules_id` to `domain`.
    pub async fn create_rules_mapping(&self, domain: &str, rules_id: &str) -> Result<(), ProviderError> {
        let body = RulesMappingDto {
            domain: domain.to_string(),
            rules_id: rules_id.to_string(),
        };
        let response = self.gateway.post(PATH, &body).await?;

        match response.status {
            StatusCode::CREATED => Ok(()),
            StatusCode::CONFLICT => Err(ProviderError::conflict(
                "Domain Conflict",
                "This domain already has an associated rule group.",
            )),
            _ => Err(response.unexpected(StatusCode::CREATED)),
        }
    }

    /// The rule group id attached to `domain`.
    pub async fn read_rules_mapping(&self, domain: &str) -> Result<String, ProviderError> {
        let response = self.gateway.get(&domain_query(PATH, domain)).await?;

        match response.status {
            StatusCode::OK => Ok(response.opaque()),
            StatusCode::NOT_FOUND => Err(not_found(domain)),
            _ => Err(response.unexpected(StatusCode::OK)),
        }
    }

    pub async fn update_rules_mapping(&self, domain: &str, rules_id: &str) -> Result<(), ProviderError> {
        let body = RulesMappingDto {
            domain: domain.to_string(),
            rules_id: rules_id.to_string(),
        };
        let response = self.gateway.put(PATH, &body).await?;

        match response.status {
            StatusCode::CREATED => Ok(()),
            _ => Err(response.unexpected(StatusCode::CREATED)),
        }
    }

    pub async fn delete_rules_mapping(&self, domain: &str) -> Result<(), ProviderError> {
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
    async fn test_create_posts_rules_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(PATH))
            .and(body_json(json!({"domain": "shop.example.com", "rulesId": "rg-1"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .create_rules_mapping("shop.example.com", "rg-1")
            .await
            .unwrap();
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
            .create_rules_mapping("shop.example.com", "rg-1")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Conflict { .. }));
        assert!(err.detail().contains("rule group"));
    }

    #[tokio::test]
    async fn test_read_returns_body_as_rules_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PATH))
            .and(query_param("domain", "shop.example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_string("rg-1\n"))
            .expect(1)
            .mount(&server)
            .await;

        let rules_id = client_for(&server)
            .read_rules_mapping("shop.example.com")
            .await
            .unwrap();
        assert_eq!(rules_id, "rg-1");
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
            .read_rules_mapping("shop.example.com")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(err.detail().contains("rule group"));
    }

    #[tokio::test]
    async fn test_update_puts_and_expects_201() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(PATH))
            .and(body_json(json!({"domain": "shop.example.com", "rulesId": "rg-2"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .update_rules_mapping("shop.example.com", "rg-2")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(PATH))
            .and(query_param("domain", "shop.example.com"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .delete_rules_mapping("shop.example.com")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
