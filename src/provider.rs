//! The Altitude provider: schema, configuration and dispatch of lifecycle
//! calls to the typed resource handlers.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{error, info, instrument};

use crate::client::AltitudeClient;
use crate::config::{Credentials, ProviderConfig};
use crate::error::ProviderError;
use crate::resources::{
    self, DomainMappingResource, LoggingEndpointsDataSource, MteConfigResource, Resource,
    RulesMappingResource, DOMAIN_MAPPING, LOGGING_ENDPOINTS, MTE_CONFIG, RULES_MAPPING,
};
use crate::schema::{Attribute, Diagnostic, ProviderSchema, Schema};
use crate::service::ProviderService;
use crate::types::{ImportedResource, PlanResult, ServerCapabilities};
use crate::validation;

/// Run `$body` with `$handler` bound to the resource type named by
/// `$resource_type`.
macro_rules! for_resource {
    ($resource_type:expr, $handler:ident => $body:expr) => {
        match $resource_type {
            MTE_CONFIG => {
                type $handler = MteConfigResource;
                $body
            },
            DOMAIN_MAPPING => {
                type $handler = DomainMappingResource;
                $body
            },
            RULES_MAPPING => {
                type $handler = RulesMappingResource;
                $body
            },
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    };
}

/// Provider for the Altitude platform.
///
/// Holds the connected client once [`ProviderService::configure`] has run.
/// Every call that needs the API before then fails with
/// [`ProviderError::Configuration`].
#[derive(Default)]
pub struct AltitudeProvider {
    client: RwLock<Option<Arc<AltitudeClient>>>,
}

impl AltitudeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider that is already configured with `client`.
    pub fn with_client(client: AltitudeClient) -> Self {
        Self {
            client: RwLock::new(Some(Arc::new(client))),
        }
    }

    async fn client(&self) -> Result<Arc<AltitudeClient>, ProviderError> {
        self.client.read().await.clone().ok_or_else(|| {
            ProviderError::Configuration(
                "the provider has not been configured with Altitude credentials".to_string(),
            )
        })
    }

    async fn handler<R: Resource>(&self) -> Result<R, ProviderError> {
        Ok(R::from_client(self.client().await?))
    }

    fn provider_schema() -> Schema {
        Schema::v0()
            .with_attribute(
                "base_url",
                Attribute::optional_string().with_description("Altitude API base URL"),
            )
            .with_attribute(
                "client_id",
                Attribute::optional_string().with_description("OAuth2 client id, or ALTITUDE_CLIENT_ID"),
            )
            .with_attribute(
                "client_secret",
                Attribute::optional_string()
                    .with_description("OAuth2 client secret, or ALTITUDE_CLIENT_SECRET")
                    .sensitive(),
            )
            .with_attribute(
                "audience",
                Attribute::optional_string().with_description("Token audience, or ALTITUDE_AUDIENCE"),
            )
            .with_attribute(
                "issuer",
                Attribute::optional_string().with_description("OAuth2 issuer that mints tokens"),
            )
    }
}

fn parse_config(config: Value) -> Result<ProviderConfig, Vec<Diagnostic>> {
    ProviderConfig::from_value(config).map_err(|e| {
        vec![Diagnostic::error("Invalid provider configuration").with_detail(e.to_string())]
    })
}

#[async_trait::async_trait]
impl ProviderService for AltitudeProvider {
    fn schema(&self) -> ProviderSchema {
        ProviderSchema::new()
            .with_provider_config(Self::provider_schema())
            .with_resource(MTE_CONFIG, MteConfigResource::schema())
            .with_resource(DOMAIN_MAPPING, DomainMappingResource::schema())
            .with_resource(RULES_MAPPING, RulesMappingResource::schema())
            .with_data_source(LOGGING_ENDPOINTS, LoggingEndpointsDataSource::schema())
    }

    fn capabilities(&self) -> ServerCapabilities {
        ServerCapabilities { plan_destroy: true }
    }

    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let mut diagnostics = validation::validate(&Self::provider_schema(), &config);
        if let Err(errors) = parse_config(config) {
            diagnostics.extend(errors);
        }
        Ok(diagnostics)
    }

    #[instrument(skip_all)]
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let config = match parse_config(config) {
            Ok(config) => config,
            Err(diagnostics) => return Ok(diagnostics),
        };
        let credentials = match Credentials::from_env(&config) {
            Ok(credentials) => credentials,
            Err(diagnostics) => return Ok(diagnostics),
        };

        match AltitudeClient::connect(&credentials).await {
            Ok(client) => {
                *self.client.write().await = Some(Arc::new(client));
                info!(client_id = %credentials.client_id, "provider configured");
                Ok(vec![])
            },
            Err(err) => {
                error!(error = %err, "unable to connect to Altitude");
                Ok(vec![err.to_diagnostic()])
            },
        }
    }

    async fn stop(&self) -> Result<(), ProviderError> {
        *self.client.write().await = None;
        info!("provider stopped");
        Ok(())
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        for_resource!(resource_type, R => Ok(resources::validate_config::<R>(&config)))
    }

    #[instrument(skip(self, prior_state, proposed_state, _config))]
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        _config: Value,
    ) -> Result<PlanResult, ProviderError> {
        for_resource!(resource_type, R => resources::plan::<R>(prior_state, proposed_state))
    }

    #[instrument(skip(self, planned_state))]
    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        info!("creating resource");
        for_resource!(resource_type, R => {
            resources::create(&self.handler::<R>().await?, planned_state).await
        })
    }

    #[instrument(skip(self, current_state))]
    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError> {
        for_resource!(resource_type, R => {
            resources::read(&self.handler::<R>().await?, current_state).await
        })
    }

    #[instrument(skip(self, prior_state, planned_state))]
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        info!("updating resource");
        for_resource!(resource_type, R => {
            resources::update(&self.handler::<R>().await?, prior_state, planned_state).await
        })
    }

    #[instrument(skip(self, current_state))]
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        info!("deleting resource");
        for_resource!(resource_type, R => {
            resources::delete(&self.handler::<R>().await?, current_state).await
        })
    }

    #[instrument(skip(self))]
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        for_resource!(resource_type, R => {
            Ok(vec![resources::import(&self.handler::<R>().await?, id).await?])
        })
    }

    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        _config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        match data_source_type {
            LOGGING_ENDPOINTS => Ok(vec![]),
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }

    #[instrument(skip(self, _config))]
    async fn read_data_source(&self, data_source_type: &str, _config: Value) -> Result<Value, ProviderError> {
        match data_source_type {
            LOGGING_ENDPOINTS => {
                let endpoints = LoggingEndpointsDataSource::new(self.client().await?).read().await?;
                Ok(serde_json::to_value(endpoints)?)
            },
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }
}
