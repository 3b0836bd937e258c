use std::sync::Arc;

use async_trait::async_trait;

use super::{Resource, DOMAIN_MAPPING};
use crate::client::AltitudeClient;
use crate::error::ProviderError;
use crate::model::DomainMappingState;
use crate::schema::{Attribute, Diagnostic, Schema};
use crate::validation::validate_key;

/// `altitude_mte_domain_mapping`: routes a domain to an environment.
pub struct DomainMappingResource {
    client: Arc<AltitudeClient>,
}

#[async_trait]
impl Resource for DomainMappingResource {
    type State = DomainMappingState;

    const TYPE_NAME: &'static str = DOMAIN_MAPPING;
    const KEY: &'static str = "domain";

    fn from_client(client: Arc<AltitudeClient>) -> Self {
        Self { client }
    }

    fn schema() -> Schema {
        Schema::v0()
            .with_description("Maps a domain to an Altitude environment")
            .with_attribute(
                "environment_id",
                Attribute::required_string().with_description("The environment to serve the domain from"),
            )
            .with_attribute(
                "domain",
                Attribute::required_string()
                    .with_description("The domain to map")
                    .with_force_new(),
            )
            .with_attribute(
                "domain_mapping",
                Attribute::computed_string().with_description("Mapping reference returned by the platform"),
            )
    }

    fn key(state: &DomainMappingState) -> &str {
        &state.domain
    }

    fn validate(state: &DomainMappingState) -> Vec<Diagnostic> {
        let mut diagnostics = validate_key(Self::KEY, &state.domain);
        diagnostics.extend(validate_key("environment_id", &state.environment_id));
        diagnostics
    }

    async fn create(&self, planned: &DomainMappingState) -> Result<DomainMappingState, ProviderError> {
        let token = self
            .client
            .create_domain_mapping(&planned.environment_id, &planned.domain)
            .await?;
        Ok(DomainMappingState {
            domain_mapping: Some(token),
            ..planned.clone()
        })
    }

    async fn read(&self, current: &DomainMappingState) -> Result<DomainMappingState, ProviderError> {
        let token = self.client.read_domain_mapping(&current.domain).await?;
        Ok(DomainMappingState {
            domain_mapping: Some(token),
            ..current.clone()
        })
    }

    async fn update(
        &self,
        _prior: &DomainMappingState,
        planned: &DomainMappingState,
    ) -> Result<DomainMappingState, ProviderError> {
        let token = self
            .client
            .update_domain_mapping(&planned.environment_id, &planned.domain)
            .await?;
        Ok(DomainMappingState {
            domain_mapping: Some(token),
            ..planned.clone()
        })
    }

    async fn delete(&self, current: &DomainMappingState) -> Result<(), ProviderError> {
        self.client.delete_domain_mapping(&current.domain).await
    }

    /// A domain lookup only returns the mapping token, so `environment_id`
    /// stays empty until the next apply fills it from configuration.
    async fn import(&self, domain: &str) -> Result<DomainMappingState, ProviderError> {
        let token = self.client.read_domain_mapping(domain).await?;
        Ok(DomainMappingState {
            environment_id: String::new(),
            domain: domain.to_string(),
            domain_mapping: Some(token),
        })
    }
}
