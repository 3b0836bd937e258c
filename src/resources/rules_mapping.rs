use std::sync::Arc;

use async_trait::async_trait;

use super::{Resource, RULES_MAPPING};
use crate::client::AltitudeClient;
use crate::error::ProviderError;
use crate::model::RulesMappingState;
use crate::schema::{Attribute, Schema};

/// `altitude_mte_rules_mapping`: attaches a rule group to a domain.
pub struct RulesMappingResource {
    client: Arc<AltitudeClient>,
}

#[async_trait]
impl Resource for RulesMappingResource {
    type State = RulesMappingState;

    const TYPE_NAME: &'static str = RULES_MAPPING;
    const KEY: &'static str = "domain";

    fn from_client(client: Arc<AltitudeClient>) -> Self {
        Self { client }
    }

    fn schema() -> Schema {
        Schema::v0()
            .with_description("Attaches a rule group to a domain")
            .with_attribute(
                "domain",
                Attribute::required_string()
                    .with_description("The domain the rules apply to")
                    .with_force_new(),
            )
            .with_attribute(
                "rules_id",
                Attribute::required_string().with_description("Id of a rule group created through the Altitude API"),
            )
    }

    fn key(state: &RulesMappingState) -> &str {
        &state.domain
    }

    async fn create(&self, planned: &RulesMappingState) -> Result<RulesMappingState, ProviderError> {
        self.client
            .create_rules_mapping(&planned.domain, &planned.rules_id)
            .await?;
        Ok(planned.clone())
    }

    async fn read(&self, current: &RulesMappingState) -> Result<RulesMappingState, ProviderError> {
        self.import(&current.domain).await
    }

    async fn update(
        &self,
        _prior: &RulesMappingState,
        planned: &RulesMappingState,
    ) -> Result<RulesMappingState, ProviderError> {
        self.client
            .update_rules_mapping(&planned.domain, &planned.rules_id)
            .await?;
        Ok(planned.clone())
    }

    async fn delete(&self, current: &RulesMappingState) -> Result<(), ProviderError> {
        self.client.delete_rules_mapping(&current.domain).await
    }

    async fn import(&self, domain: &str) -> Result<RulesMappingState, ProviderError> {
        let rules_id = self.client.read_rules_mapping(domain).await?;
        Ok(RulesMappingState {
            domain: domain.to_string(),
            rules_id,
        })
    }
}
