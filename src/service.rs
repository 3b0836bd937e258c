//! The lifecycle contract between the plugin host and a provider.
//!
//! The host drives a provider through schema discovery, configuration,
//! planning and the CRUD callbacks below, exchanging JSON documents shaped
//! by the provider's [`ProviderSchema`].

use serde_json::Value;

use crate::error::ProviderError;
use crate::schema::{Diagnostic, ProviderSchema};
use crate::types::{ImportedResource, PlanResult, ProviderMetadata, ServerCapabilities};

/// Trait that provider implementations must implement.
///
/// # Example
///
/// ```ignore
/// use altitude_provider::{ProviderService, ProviderError, PlanResult};
/// use altitude_provider::schema::{Attribute, Diagnostic, ProviderSchema, Schema};
///
/// struct EchoProvider;
///
/// #[async_trait::async_trait]
/// impl ProviderService for EchoProvider {
///     fn schema(&self) -> ProviderSchema {
///         ProviderSchema::new()
///             .with_resource("echo", Schema::v0()
///                 .with_attribute("value", Attribute::required_string()))
///     }
///
///     async fn configure(&self, config: serde_json::Value) -> Result<Vec<Diagnostic>, ProviderError> {
///         Ok(vec![])
///     }
///
///     // ... implement plan and the CRUD methods
/// }
/// ```
#[async_trait::async_trait]
pub trait ProviderService: Send + Sync + 'static {
    // =========================================================================
    // Schema & Metadata
    // =========================================================================

    /// Return the provider's schema including all resources and data sources.
    fn schema(&self) -> ProviderSchema;

    /// Return provider metadata, derived from the schema by default.
    fn metadata(&self) -> ProviderMetadata {
        let schema = self.schema();
        let mut resources: Vec<String> = schema.resources.keys().cloned().collect();
        let mut data_sources: Vec<String> = schema.data_sources.keys().cloned().collect();
        resources.sort();
        data_sources.sort();
        ProviderMetadata {
            resources,
            data_sources,
            capabilities: self.capabilities(),
        }
    }

    /// Optional behaviours the provider supports. None by default.
    fn capabilities(&self) -> ServerCapabilities {
        ServerCapabilities::default()
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Validate the provider configuration before configuring.
    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = config;
        Ok(vec![])
    }

    /// Configure the provider with credentials and settings.
    /// Returns diagnostics (errors and warnings).
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Stop the provider gracefully.
    async fn stop(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Validate a resource's configuration before planning.
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = (resource_type, config);
        Ok(vec![])
    }

    /// Plan changes for a resource. `proposed_state` is `null` when the
    /// resource is being destroyed.
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError>;

    /// Create a new resource.
    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError>;

    /// Read the current state of a resource. `null` means it no longer exists.
    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError>;

    /// Update an existing resource in place.
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Delete a resource.
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError>;

    /// Import existing infrastructure into management.
    async fn import_resource(
        &self,
        resource_type: &str,
        _id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        Err(ProviderError::UnknownResource(format!(
            "Import not supported for resource type: {}",
            resource_type
        )))
    }

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    /// Validate a data source's configuration.
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = (data_source_type, config);
        Ok(vec![])
    }

    /// Read data from the platform.
    async fn read_data_source(
        &self,
        data_source_type: &str,
        _config: Value,
    ) -> Result<Value, ProviderError> {
        Err(ProviderError::UnknownResource(data_source_type.to_string()))
    }
}
