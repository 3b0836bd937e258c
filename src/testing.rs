//! Testing utilities for provider implementations.
//!
//! [`ProviderTester`] drives a [`ProviderService`] the way the host does,
//! without any transport in between.
//!
//! # Example
//!
//! ```ignore
//! use altitude_provider::testing::ProviderTester;
//! use altitude_provider::AltitudeProvider;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_rules_mapping() {
//!     let tester = ProviderTester::new(AltitudeProvider::with_client(client));
//!
//!     let state = tester
//!         .apply("altitude_mte_rules_mapping", None, json!({
//!             "domain": "shop.example.com",
//!             "rules_id": "rg-1"
//!         }))
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(state["rules_id"], "rg-1");
//! }
//! ```

use crate::error::ProviderError;
use crate::schema::{Diagnostic, DiagnosticSeverity, ProviderSchema};
use crate::service::ProviderService;
use crate::types::{ImportedResource, PlanResult};
use serde_json::Value;

/// A test harness wrapping a [`ProviderService`].
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    /// Create a new tester for the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Get a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    // =========================================================================
    // Schema & Metadata
    // =========================================================================

    /// Get the provider's schema.
    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Get the list of resource type names.
    pub fn resource_types(&self) -> Vec<String> {
        self.provider.metadata().resources
    }

    /// Get the list of data source type names.
    pub fn data_source_types(&self) -> Vec<String> {
        self.provider.metadata().data_sources
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Validate provider configuration.
    ///
    /// Returns `Ok(())` if validation passes (no error diagnostics).
    /// Returns `Err` with the diagnostics if there are errors.
    pub async fn validate_provider_config(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.validate_provider_config(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Configure the provider.
    ///
    /// Returns `Ok(())` if configuration succeeds.
    /// Returns `Err` with the diagnostics if there are errors.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Stop the provider.
    pub async fn stop(&self) -> Result<(), ProviderError> {
        self.provider.stop().await
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Validate a resource configuration.
    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Plan a resource creation (no prior state).
    pub async fn plan_create(
        &self,
        resource_type: &str,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, None, proposed_state.clone(), proposed_state)
            .await
    }

    /// Plan a resource update.
    pub async fn plan_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(
                resource_type,
                Some(prior_state),
                proposed_state.clone(),
                proposed_state,
            )
            .await
    }

    /// Plan a resource deletion.
    pub async fn plan_delete(
        &self,
        resource_type: &str,
        prior_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), Value::Null, Value::Null)
            .await
    }

    /// Full plan operation with explicit config.
    pub async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, prior_state, proposed_state, config)
            .await
    }

    /// Create a new resource.
    pub async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.create(resource_type, planned_state).await
    }

    /// Read the current state of a resource.
    pub async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.read(resource_type, current_state).await
    }

    /// Update an existing resource.
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .update(resource_type, prior_state, planned_state)
            .await
    }

    /// Delete a resource.
    pub async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        self.provider.delete(resource_type, current_state).await
    }

    /// Import an existing resource.
    pub async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        self.provider.import_resource(resource_type, id).await
    }

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    /// Validate a data source configuration.
    pub async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_data_source_config(data_source_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Read data from a data source.
    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .read_data_source(data_source_type, config)
            .await
    }

    // =========================================================================
    // Lifecycle Helpers
    // =========================================================================

    /// Plan, create, then read back.
    pub async fn lifecycle_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let plan = self.plan_create(resource_type, config).await?;
        let created = self.create(resource_type, plan.planned_state).await?;
        self.read(resource_type, created).await
    }

    /// Plan a destroy, then delete.
    pub async fn lifecycle_delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        self.plan_delete(resource_type, current_state.clone()).await?;
        self.delete(resource_type, current_state).await
    }

    /// Plan `config` against `prior_state` and carry the plan out the way the
    /// host would: create when there is no prior state, delete then create
    /// when the plan requires replacement, update when something changed,
    /// and nothing otherwise.
    pub async fn apply(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let plan = self
            .plan(resource_type, prior_state.clone(), config.clone(), config)
            .await?;

        match prior_state {
            None => self.create(resource_type, plan.planned_state).await,
            Some(prior) if plan.requires_replace => {
                self.delete(resource_type, prior).await?;
                self.create(resource_type, plan.planned_state).await
            },
            Some(_) if plan.changes.is_empty() => Ok(plan.planned_state),
            Some(prior) => self.update(resource_type, prior, plan.planned_state).await,
        }
    }
}

/// Error type for test operations that may fail with diagnostics.
#[derive(Debug)]
pub enum TestError {
    /// The operation failed with diagnostics.
    Diagnostics(Vec<Diagnostic>),
    /// The operation failed with a provider error.
    Provider(ProviderError),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "Operation failed with {} diagnostic(s):", diags.len())?;
                for diag in diags {
                    write!(f, "  [{:?}] {}", diag.severity, diag.summary)?;
                    if let Some(detail) = &diag.detail {
                        write!(f, ": {}", detail)?;
                    }
                    if let Some(attr) = &diag.attribute {
                        write!(f, " (at {})", attr)?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            }
            TestError::Provider(e) => write!(f, "Provider error: {}", e),
        }
    }
}

impl std::error::Error for TestError {}

impl From<ProviderError> for TestError {
    fn from(e: ProviderError) -> Self {
        TestError::Provider(e)
    }
}

/// Check diagnostics and return an error if there are any errors.
fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics
        .into_iter()
        .filter(|d| matches!(d.severity, DiagnosticSeverity::Error))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

// =========================================================================
// Assertion Helpers
// =========================================================================

/// Assert that a plan result indicates the resource will be created.
///
/// # Panics
///
/// Panics if the plan has no changes or requires replacement.
pub fn assert_plan_creates(plan: &PlanResult) {
    assert!(
        !plan.changes.is_empty(),
        "Expected plan to have changes for create, but got no changes"
    );
    assert!(
        !plan.requires_replace,
        "Expected plan to create, not replace"
    );
}

/// Assert that a plan result indicates no changes.
///
/// # Panics
///
/// Panics if the plan has any changes.
pub fn assert_plan_no_changes(plan: &PlanResult) {
    assert!(
        plan.changes.is_empty(),
        "Expected no changes, but got {} change(s): {:?}",
        plan.changes.len(),
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that a plan result indicates changes are needed.
///
/// # Panics
///
/// Panics if the plan has no changes.
pub fn assert_plan_has_changes(plan: &PlanResult) {
    assert!(
        !plan.changes.is_empty(),
        "Expected plan to have changes, but got no changes"
    );
}

/// Assert that a plan requires resource replacement.
///
/// # Panics
///
/// Panics if the plan does not require replacement.
pub fn assert_plan_replaces(plan: &PlanResult) {
    assert!(
        plan.requires_replace,
        "Expected plan to require replacement, but it does not"
    );
}

/// Assert that a plan does not require resource replacement.
///
/// # Panics
///
/// Panics if the plan requires replacement.
pub fn assert_plan_updates_in_place(plan: &PlanResult) {
    assert!(
        !plan.requires_replace,
        "Expected plan to update in place, but it requires replacement"
    );
}

/// Assert that a plan has a change for a specific attribute path.
///
/// # Panics
///
/// Panics if the plan does not have a change for the given path.
pub fn assert_plan_changes_attribute(plan: &PlanResult, path: &str) {
    let has_change = plan.changes.iter().any(|c| c.path == path);
    assert!(
        has_change,
        "Expected plan to change attribute '{}', but it was not changed. Changed attributes: {:?}",
        path,
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that a plan does not have a change for a specific attribute path.
///
/// # Panics
///
/// Panics if the plan has a change for the given path.
pub fn assert_plan_does_not_change_attribute(plan: &PlanResult, path: &str) {
    let has_change = plan.changes.iter().any(|c| c.path == path);
    assert!(
        !has_change,
        "Expected plan to not change attribute '{}', but it was changed",
        path
    );
}

/// Assert that diagnostics contain no errors.
///
/// # Panics
///
/// Panics if there are any error diagnostics.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics
        .iter()
        .filter(|d| matches!(d.severity, DiagnosticSeverity::Error))
        .collect();

    assert!(
        errors.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        errors.len(),
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain at least one error.
///
/// # Panics
///
/// Panics if there are no error diagnostics.
pub fn assert_has_errors(diagnostics: &[Diagnostic]) {
    let has_errors = diagnostics
        .iter()
        .any(|d| matches!(d.severity, DiagnosticSeverity::Error));

    assert!(has_errors, "Expected at least one error, but got none");
}

/// Assert that diagnostics contain an error with the given summary substring.
///
/// # Panics
///
/// Panics if no error diagnostic contains the given substring.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    let has_matching_error = diagnostics
        .iter()
        .any(|d| matches!(d.severity, DiagnosticSeverity::Error) && d.summary.contains(substring));

    assert!(
        has_matching_error,
        "Expected an error containing '{}', but no matching error found. Errors: {:?}",
        substring,
        diagnostics
            .iter()
            .filter(|d| matches!(d.severity, DiagnosticSeverity::Error))
            .map(|d| &d.summary)
            .collect::<Vec<_>>()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, Schema};
    use crate::types::AttributeChange;
    use serde_json::json;
    use std::sync::Mutex;

    /// Keyed by `domain`; records every mutating call.
    #[derive(Default)]
    struct RecordingProvider {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingProvider {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl ProviderService for RecordingProvider {
        fn schema(&self) -> ProviderSchema {
            ProviderSchema::new().with_resource(
                "mapping",
                Schema::v0()
                    .with_attribute("domain", Attribute::required_string().with_force_new())
                    .with_attribute("target", Attribute::required_string()),
            )
        }

        async fn configure(&self, _config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
            Ok(vec![])
        }

        async fn plan(
            &self,
            _resource_type: &str,
            prior_state: Option<Value>,
            proposed_state: Value,
            _config: Value,
        ) -> Result<PlanResult, ProviderError> {
            let Some(prior) = prior_state else {
                return Ok(PlanResult::with_changes(
                    proposed_state.clone(),
                    vec![AttributeChange::added("domain", proposed_state["domain"].clone())],
                    false,
                ));
            };

            let mut changes = Vec::new();
            for name in ["domain", "target"] {
                if prior[name] != proposed_state[name] {
                    changes.push(AttributeChange::modified(
                        name,
                        prior[name].clone(),
                        proposed_state[name].clone(),
                    ));
                }
            }
            let replace = prior["domain"] != proposed_state["domain"];
            if changes.is_empty() {
                Ok(PlanResult::no_change(prior))
            } else {
                Ok(PlanResult::with_changes(proposed_state, changes, replace))
            }
        }

        async fn create(&self, _resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
            self.record(format!("create {}", planned_state["domain"]));
            Ok(planned_state)
        }

        async fn read(&self, _resource_type: &str, current_state: Value) -> Result<Value, ProviderError> {
            Ok(current_state)
        }

        async fn update(
            &self,
            _resource_type: &str,
            _prior_state: Value,
            planned_state: Value,
        ) -> Result<Value, ProviderError> {
            self.record(format!("update {}", planned_state["domain"]));
            Ok(planned_state)
        }

        async fn delete(&self, _resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
            self.record(format!("delete {}", current_state["domain"]));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_tester_schema_and_types() {
        let tester = ProviderTester::new(RecordingProvider::default());
        assert!(tester.schema().resources.contains_key("mapping"));
        assert_eq!(tester.resource_types(), vec!["mapping".to_string()]);
        assert!(tester.data_source_types().is_empty());
        tester.configure(json!({})).await.unwrap();
    }

    #[tokio::test]
    async fn test_apply_without_prior_creates() {
        let tester = ProviderTester::new(RecordingProvider::default());
        let state = tester
            .apply("mapping", None, json!({"domain": "a.com", "target": "env-1"}))
            .await
            .unwrap();
        assert_eq!(state["target"], "env-1");
        assert_eq!(tester.provider().calls(), vec!["create \"a.com\""]);
    }

    #[tokio::test]
    async fn test_apply_replacement_deletes_then_creates() {
        let tester = ProviderTester::new(RecordingProvider::default());
        tester
            .apply(
                "mapping",
                Some(json!({"domain": "a.com", "target": "env-1"})),
                json!({"domain": "b.com", "target": "env-1"}),
            )
            .await
            .unwrap();
        assert_eq!(
            tester.provider().calls(),
            vec!["delete \"a.com\"", "create \"b.com\""]
        );
    }

    #[tokio::test]
    async fn test_apply_in_place_and_noop() {
        let tester = ProviderTester::new(RecordingProvider::default());
        let prior = json!({"domain": "a.com", "target": "env-1"});

        tester
            .apply("mapping", Some(prior.clone()), json!({"domain": "a.com", "target": "env-2"}))
            .await
            .unwrap();
        let state = tester.apply("mapping", Some(prior.clone()), prior.clone()).await.unwrap();

        assert_eq!(state, prior);
        assert_eq!(tester.provider().calls(), vec!["update \"a.com\""]);
    }

    #[tokio::test]
    async fn test_plan_assertions() {
        let tester = ProviderTester::new(RecordingProvider::default());

        let plan = tester
            .plan_create("mapping", json!({"domain": "a.com", "target": "env-1"}))
            .await
            .unwrap();
        assert_plan_creates(&plan);

        let plan = tester
            .plan_update(
                "mapping",
                json!({"domain": "a.com", "target": "env-1"}),
                json!({"domain": "a.com", "target": "env-2"}),
            )
            .await
            .unwrap();
        assert_plan_has_changes(&plan);
        assert_plan_updates_in_place(&plan);
        assert_plan_changes_attribute(&plan, "target");
        assert_plan_does_not_change_attribute(&plan, "domain");
    }

    #[tokio::test]
    async fn test_lifecycle_helpers() {
        let tester = ProviderTester::new(RecordingProvider::default());
        let state = tester
            .lifecycle_create("mapping", json!({"domain": "a.com", "target": "env-1"}))
            .await
            .unwrap();
        tester.lifecycle_delete("mapping", state).await.unwrap();
        assert_eq!(
            tester.provider().calls(),
            vec!["create \"a.com\"", "delete \"a.com\""]
        );
    }

    #[test]
    fn test_assert_no_errors() {
        assert_no_errors(&[Diagnostic::warning("Just a warning")]);
    }

    #[test]
    #[should_panic(expected = "Expected no errors")]
    fn test_assert_no_errors_fails() {
        assert_no_errors(&[Diagnostic::error("An error")]);
    }

    #[test]
    fn test_assert_error_contains() {
        let diagnostics = vec![Diagnostic::error("Invalid shield location")];
        assert_has_errors(&diagnostics);
        assert_error_contains(&diagnostics, "shield");
    }

    #[test]
    fn test_test_error_display() {
        let err = TestError::Diagnostics(vec![
            Diagnostic::error("Missing Altitude client id").with_attribute("client_id"),
            Diagnostic::error("Invalid cache rule").with_detail("A cache rule must set keys or ttl_seconds."),
        ]);

        let display = format!("{}", err);
        assert!(display.contains("client_id"));
        assert!(display.contains("Invalid cache rule"));
        assert!(display.contains("ttl_seconds"));
    }
}
