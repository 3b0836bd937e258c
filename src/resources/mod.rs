//! Typed resource handlers.
//!
//! Each Altitude resource implements [`Resource`] over its own state type.
//! The free functions in this module do the JSON plumbing shared by all of
//! them: decoding host state, validation, plan diffs, and the not-found
//! handling of read and delete.

mod domain_mapping;
mod logging_endpoints;
mod mte_config;
mod rules_mapping;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

pub use domain_mapping::DomainMappingResource;
pub use logging_endpoints::LoggingEndpointsDataSource;
pub use mte_config::MteConfigResource;
pub use rules_mapping::RulesMappingResource;

use crate::client::AltitudeClient;
use crate::error::ProviderError;
use crate::schema::{Diagnostic, Schema};
use crate::types::{AttributeChange, ImportedResource, PlanResult};
use crate::validation::{self, validate_key};

pub const MTE_CONFIG: &str = "altitude_mte_config";
pub const DOMAIN_MAPPING: &str = "altitude_mte_domain_mapping";
pub const RULES_MAPPING: &str = "altitude_mte_rules_mapping";
pub const LOGGING_ENDPOINTS: &str = "altitude_mte_logging_endpoints";

/// A managed Altitude entity.
#[async_trait]
pub trait Resource: Send + Sync + Sized {
    /// The state stored by the host.
    type State: Serialize + DeserializeOwned + Clone + PartialEq + Send + Sync;

    /// Resource type name as seen by the host.
    const TYPE_NAME: &'static str;

    /// Name of the attribute that identifies the entity on the platform.
    const KEY: &'static str;

    fn from_client(client: Arc<AltitudeClient>) -> Self;

    fn schema() -> Schema;

    fn key(state: &Self::State) -> &str;

    /// Checks on the raw config that must run before it is decoded.
    fn validate_raw(config: &Value) -> Vec<Diagnostic> {
        let _ = config;
        Vec::new()
    }

    /// Checks on decoded state.
    fn validate(state: &Self::State) -> Vec<Diagnostic> {
        validate_key(Self::KEY, Self::key(state))
    }

    async fn create(&self, planned: &Self::State) -> Result<Self::State, ProviderError>;

    async fn read(&self, current: &Self::State) -> Result<Self::State, ProviderError>;

    async fn update(&self, prior: &Self::State, planned: &Self::State) -> Result<Self::State, ProviderError>;

    async fn delete(&self, current: &Self::State) -> Result<(), ProviderError>;

    /// Build state for an entity that already exists, given its key.
    async fn import(&self, id: &str) -> Result<Self::State, ProviderError>;
}

pub fn decode<R: Resource>(value: Value) -> Result<R::State, ProviderError> {
    serde_json::from_value(value)
        .map_err(|e| ProviderError::Validation(format!("invalid {} state: {}", R::TYPE_NAME, e)))
}

pub fn encode<R: Resource>(state: &R::State) -> Result<Value, ProviderError> {
    Ok(serde_json::to_value(state)?)
}

/// Schema checks, then raw checks, then typed checks. Each layer only runs
/// when the previous one found nothing.
pub fn validate_config<R: Resource>(config: &Value) -> Vec<Diagnostic> {
    let diagnostics = validation::validate(&R::schema(), config);
    if !diagnostics.is_empty() {
        return diagnostics;
    }

    let diagnostics = R::validate_raw(config);
    if !diagnostics.is_empty() {
        return diagnostics;
    }

    match decode::<R>(config.clone()) {
        Ok(state) => R::validate(&state),
        Err(err) => vec![err.to_diagnostic()],
    }
}

fn change(name: &str, before: &Value, after: &Value) -> AttributeChange {
    match (before.is_null(), after.is_null()) {
        (true, _) => AttributeChange::added(name, after.clone()),
        (false, true) => AttributeChange::removed(name, before.clone()),
        (false, false) => AttributeChange::modified(name, before.clone(), after.clone()),
    }
}

fn sorted_keys(value: &Value) -> Vec<&String> {
    let mut keys: Vec<&String> = value
        .as_object()
        .map(|map| map.keys().collect())
        .unwrap_or_default();
    keys.sort();
    keys
}

/// Diff the proposed state against prior state at top-level attribute
/// granularity.
pub fn plan<R: Resource>(prior: Option<Value>, proposed: Value) -> Result<PlanResult, ProviderError> {
    if proposed.is_null() {
        let changes: Vec<AttributeChange> = prior
            .as_ref()
            .map(|prior| {
                sorted_keys(prior)
                    .into_iter()
                    .filter(|name| !prior[name.as_str()].is_null())
                    .map(|name| AttributeChange::removed(name.as_str(), prior[name.as_str()].clone()))
                    .collect()
            })
            .unwrap_or_default();
        return Ok(PlanResult::with_changes(Value::Null, changes, false));
    }

    validation::into_result(validate_config::<R>(&proposed))?;
    let mut planned = encode::<R>(&decode::<R>(proposed)?)?;

    let Some(prior) = prior else {
        let changes: Vec<AttributeChange> = sorted_keys(&planned)
            .into_iter()
            .filter(|name| !planned[name.as_str()].is_null())
            .map(|name| AttributeChange::added(name.as_str(), planned[name.as_str()].clone()))
            .collect();
        return Ok(PlanResult::with_changes(planned, changes, false));
    };
    let prior = encode::<R>(&decode::<R>(prior)?)?;

    let schema = R::schema();
    let computed = schema.computed_attributes();
    let force_new = schema.force_new_attributes();

    let mut changes = Vec::new();
    let mut requires_replace = false;
    for name in sorted_keys(&planned) {
        if computed.contains(&name.as_str()) {
            continue;
        }
        let before = &prior[name.as_str()];
        let after = &planned[name.as_str()];
        if before != after {
            requires_replace |= force_new.contains(&name.as_str());
            changes.push(change(name, before, after));
        }
    }

    if let Value::Object(map) = &mut planned {
        for name in &computed {
            let carried = if requires_replace {
                Value::Null
            } else {
                prior[*name].clone()
            };
            map.insert(name.to_string(), carried);
        }
    }

    debug!(
        resource_type = R::TYPE_NAME,
        changes = changes.len(),
        requires_replace,
        "planned"
    );

    if changes.is_empty() {
        Ok(PlanResult::no_change(planned))
    } else {
        Ok(PlanResult::with_changes(planned, changes, requires_replace))
    }
}

pub async fn create<R: Resource>(resource: &R, planned: Value) -> Result<Value, ProviderError> {
    let planned = decode::<R>(planned)?;
    validation::into_result(R::validate(&planned))?;
    encode::<R>(&resource.create(&planned).await?)
}

/// Read the entity back. `None` when the platform no longer has it.
pub async fn refresh<R: Resource>(resource: &R, current: &R::State) -> Result<Option<R::State>, ProviderError> {
    match resource.read(current).await {
        Ok(state) => Ok(Some(state)),
        Err(err) if err.is_not_found() => {
            warn!(
                resource_type = R::TYPE_NAME,
                key = R::key(current),
                "resource no longer exists on the platform"
            );
            Ok(None)
        },
        Err(err) => Err(err),
    }
}

/// [`refresh`] over host JSON; a vanished entity reads as `null`.
pub async fn read<R: Resource>(resource: &R, current: Value) -> Result<Value, ProviderError> {
    let current = decode::<R>(current)?;
    match refresh(resource, &current).await? {
        Some(state) => encode::<R>(&state),
        None => Ok(Value::Null),
    }
}

/// Update in place. Refuses a changed key: that is a replacement.
pub async fn update<R: Resource>(resource: &R, prior: Value, planned: Value) -> Result<Value, ProviderError> {
    let prior = decode::<R>(prior)?;
    let planned = decode::<R>(planned)?;

    if R::key(&prior) != R::key(&planned) {
        return Err(ProviderError::Validation(format!(
            "{} cannot change from '{}' to '{}' in place, the resource must be replaced",
            R::KEY,
            R::key(&prior),
            R::key(&planned)
        )));
    }

    validation::into_result(R::validate(&planned))?;
    encode::<R>(&resource.update(&prior, &planned).await?)
}

/// Delete the entity. An entity that is already gone counts as deleted.
pub async fn delete<R: Resource>(resource: &R, current: Value) -> Result<(), ProviderError> {
    let current = decode::<R>(current)?;
    match resource.delete(&current).await {
        Err(err) if err.is_not_found() => {
            warn!(
                resource_type = R::TYPE_NAME,
                key = R::key(&current),
                "resource already absent on the platform"
            );
            Ok(())
        },
        other => other,
    }
}

pub async fn import<R: Resource>(resource: &R, id: &str) -> Result<ImportedResource, ProviderError> {
    validation::into_result(validate_key(R::KEY, id))?;
    let state = resource.import(id).await?;
    Ok(ImportedResource::new(R::TYPE_NAME, encode::<R>(&state)?))
}
