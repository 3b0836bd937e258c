use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{Resource, MTE_CONFIG};
use crate::client::AltitudeClient;
use crate::error::ProviderError;
use crate::model::{MteConfigState, ShieldLocation};
use crate::schema::{Attribute, Block, Diagnostic, NestedBlock, Schema};
use crate::validation::{validate_key, validate_mte_config, validate_shield_locations};

/// `altitude_mte_config`: the MTE configuration of one environment.
pub struct MteConfigResource {
    client: Arc<AltitudeClient>,
}

fn route_block() -> Block {
    let locations: Vec<&str> = ShieldLocation::ALL.iter().map(|l| l.as_str()).collect();

    Block::new()
        .with_description("Routes traffic for a host and path prefix to the environment")
        .with_attribute("host", Attribute::required_string())
        .with_attribute("path", Attribute::required_string())
        .with_attribute("enable_ssl", Attribute::required_bool())
        .with_attribute("preserve_path_prefix", Attribute::required_bool())
        .with_attribute("append_path_prefix", Attribute::optional_string())
        .with_attribute(
            "shield_location",
            Attribute::optional_string()
                .with_description(format!("One of: {}", locations.join(", "))),
        )
}

fn cache_block() -> Block {
    Block::new()
        .with_description("A cache rule; keys or ttl_seconds must be set")
        .with_attribute("ttl_seconds", Attribute::optional_int64())
        .with_block(
            "keys",
            NestedBlock::single(
                Block::new()
                    .with_attribute("headers", Attribute::optional_string_list())
                    .with_attribute("cookies", Attribute::optional_string_list()),
            ),
        )
        .with_block(
            "path_rules",
            NestedBlock::single(
                Block::new()
                    .with_attribute("any_match", Attribute::optional_string_list())
                    .with_attribute("none_match", Attribute::optional_string_list()),
            ),
        )
}

fn conditional_header_block() -> Block {
    Block::new()
        .with_attribute("matching_header", Attribute::required_string())
        .with_attribute("pattern", Attribute::required_string())
        .with_attribute("new_header", Attribute::required_string())
        .with_attribute("match_value", Attribute::required_string())
        .with_attribute("no_match_value", Attribute::required_string())
}

#[async_trait]
impl Resource for MteConfigResource {
    type State = MteConfigState;

    const TYPE_NAME: &'static str = MTE_CONFIG;
    const KEY: &'static str = "environment_id";

    fn from_client(client: Arc<AltitudeClient>) -> Self {
        Self { client }
    }

    fn schema() -> Schema {
        let config = Block::new()
            .with_block("routes", NestedBlock::list(route_block()))
            .with_block(
                "basic_auth",
                NestedBlock::single(
                    Block::new()
                        .with_attribute("username", Attribute::required_string())
                        .with_attribute("password", Attribute::required_string().sensitive()),
                ),
            )
            .with_block("cache", NestedBlock::list(cache_block()))
            .with_block("conditional_headers", NestedBlock::list(conditional_header_block()));

        Schema::v0()
            .with_description("MTE configuration for an Altitude environment")
            .with_attribute(
                "environment_id",
                Attribute::required_string()
                    .with_description("The environment the config belongs to")
                    .with_force_new(),
            )
            .with_block("config", NestedBlock::single(config).with_min_items(1))
    }

    fn key(state: &MteConfigState) -> &str {
        &state.environment_id
    }

    fn validate_raw(config: &Value) -> Vec<Diagnostic> {
        config
            .get("config")
            .map(validate_shield_locations)
            .unwrap_or_default()
    }

    fn validate(state: &MteConfigState) -> Vec<Diagnostic> {
        let mut diagnostics = validate_key(Self::KEY, &state.environment_id);
        diagnostics.extend(validate_mte_config(&state.config));
        diagnostics
    }

    async fn create(&self, planned: &MteConfigState) -> Result<MteConfigState, ProviderError> {
        let config = self
            .client
            .create_mte_config(&planned.environment_id, &planned.config)
            .await?;
        Ok(MteConfigState {
            environment_id: planned.environment_id.clone(),
            config,
        })
    }

    async fn read(&self, current: &MteConfigState) -> Result<MteConfigState, ProviderError> {
        self.import(&current.environment_id).await
    }

    async fn update(
        &self,
        _prior: &MteConfigState,
        planned: &MteConfigState,
    ) -> Result<MteConfigState, ProviderError> {
        let config = self
            .client
            .update_mte_config(&planned.environment_id, &planned.config)
            .await?;
        Ok(MteConfigState {
            environment_id: planned.environment_id.clone(),
            config,
        })
    }

    async fn delete(&self, current: &MteConfigState) -> Result<(), ProviderError> {
        self.client.delete_mte_config(&current.environment_id).await
    }

    async fn import(&self, environment_id: &str) -> Result<MteConfigState, ProviderError> {
        let config = self.client.read_mte_config(environment_id).await?;
        Ok(MteConfigState {
            environment_id: environment_id.to_string(),
            config,
        })
    }
}
