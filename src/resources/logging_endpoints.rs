use std::sync::Arc;

use crate::client::AltitudeClient;
use crate::error::ProviderError;
use crate::model::LoggingEndpoints;
use crate::schema::{Attribute, Block, NestedBlock, Schema};

/// `altitude_mte_logging_endpoints`: read-only view of the configured
/// access logging endpoints.
pub struct LoggingEndpointsDataSource {
    client: Arc<AltitudeClient>,
}

impl LoggingEndpointsDataSource {
    pub fn new(client: Arc<AltitudeClient>) -> Self {
        Self { client }
    }

    pub fn schema() -> Schema {
        let header = Block::new()
            .with_attribute("column_name", Attribute::computed_string())
            .with_attribute("header_name", Attribute::computed_string())
            .with_attribute("default_value", Attribute::computed_string());

        let non_sensitive = Block::new()
            .with_attribute("dataset", Attribute::computed_string())
            .with_attribute("project_id", Attribute::computed_string())
            .with_attribute("table", Attribute::computed_string())
            .with_attribute("email", Attribute::computed_string())
            .with_block("headers", NestedBlock::list(header));

        let sensitive = Block::new().with_attribute("secret_key", Attribute::computed_string().sensitive());

        let endpoint = Block::new()
            .with_attribute("type", Attribute::computed_string())
            .with_attribute("environment_id", Attribute::computed_string())
            .with_block(
                "config",
                NestedBlock::single(
                    Block::new()
                        .with_block("non_sensitive", NestedBlock::single(non_sensitive))
                        .with_block("sensitive", NestedBlock::single(sensitive)),
                ),
            );

        Schema::v0()
            .with_description("Access logging endpoints configured on the platform")
            .with_block("endpoints", NestedBlock::list(endpoint))
    }

    pub async fn read(&self) -> Result<LoggingEndpoints, ProviderError> {
        self.client.read_logging_endpoints().await
    }
}
