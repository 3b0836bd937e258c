//! Configuration validation.
//!
//! Two layers run before anything reaches the network:
//!
//! - [`validate`] checks a JSON document against a [`Schema`]: required
//!   attributes, attribute types and nested block cardinality.
//! - The Altitude checks ([`validate_shield_locations`],
//!   [`validate_mte_config`]) cover rules a schema cannot express.
//!
//! # Example
//!
//! ```
//! use altitude_provider::schema::{Schema, Attribute};
//! use altitude_provider::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("domain", Attribute::required_string())
//!     .with_attribute("rules_id", Attribute::required_string());
//!
//! assert!(validate(&schema, &json!({"domain": "a.com", "rules_id": "rg-1"})).is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"domain": "a.com", "rules_id": 7}));
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].attribute, Some("rules_id".to_string()));
//! ```

use serde_json::Value;

use crate::error::ProviderError;
use crate::model::{MteConfig, ShieldLocation};
use crate::schema::{Attribute, AttributeType, Block, BlockNestingMode, Diagnostic, NestedBlock, Schema};

/// Validate a JSON value against a schema.
///
/// Returns a list of diagnostics for any validation errors found.
/// An empty list means the value is valid.
///
/// # Validation Rules
///
/// - Required attributes must be present and non-null
/// - Optional attributes may be absent or null
/// - Computed attributes are skipped (provider sets these)
/// - Attribute types must match the schema
/// - Nested blocks are validated recursively with min/max item constraints
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    validate_block(&schema.block, value, "", &mut diagnostics);
    diagnostics
}

/// Like [`validate`], returning `Err` with the diagnostics when invalid.
pub fn validate_result(schema: &Schema, value: &Value) -> Result<(), Vec<Diagnostic>> {
    let diagnostics = validate(schema, value);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

fn validate_block(block: &Block, value: &Value, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let obj = match value {
        Value::Object(map) => map,
        Value::Null => return,
        _ => {
            let diag = Diagnostic::error("Expected object")
                .with_detail(format!("Got {}", value_type_name(value)));
            diagnostics.push(if path.is_empty() {
                diag
            } else {
                diag.with_attribute(path)
            });
            return;
        },
    };

    for (name, attr) in &block.attributes {
        let attr_path = join_path(path, name);
        validate_attribute(attr, obj.get(name), &attr_path, diagnostics);
    }

    for (name, nested) in &block.blocks {
        let block_path = join_path(path, name);
        validate_nested_block(nested, obj.get(name), &block_path, diagnostics);
    }
}

fn validate_attribute(
    attr: &Attribute,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    // Computed-only attributes are set by the provider.
    if attr.flags.computed && !attr.flags.optional && !attr.flags.required {
        return;
    }

    match value {
        None | Some(Value::Null) => {
            if attr.flags.required {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required attribute '{}'", path))
                        .with_detail("This attribute is required and must be provided")
                        .with_attribute(path),
                );
            }
        },
        Some(v) => validate_attribute_type(&attr.attr_type, v, path, diagnostics),
    }
}

fn validate_attribute_type(
    attr_type: &AttributeType,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match attr_type {
        AttributeType::String => {
            if !value.is_string() {
                diagnostics.push(type_error(path, "string", value));
            }
        },
        AttributeType::Int64 => {
            if value.as_i64().is_none() {
                diagnostics.push(type_error(path, "int64", value));
            }
        },
        AttributeType::Bool => {
            if !value.is_boolean() {
                diagnostics.push(type_error(path, "bool", value));
            }
        },
        AttributeType::List(element_type) => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    let item_path = format!("{}.{}", path, i);
                    validate_attribute_type(element_type, item, &item_path, diagnostics);
                }
            },
            None => diagnostics.push(type_error(path, "list", value)),
        },
    }
}

fn validate_nested_block(
    nested: &NestedBlock,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match (nested.nesting_mode, value) {
        (_, None | Some(Value::Null)) => {
            if nested.min_items > 0 {
                diagnostics.push(
                    Diagnostic::error(format!(
                        "Block '{}' requires at least {} item(s)",
                        path, nested.min_items
                    ))
                    .with_attribute(path),
                );
            }
        },
        (BlockNestingMode::Single, Some(v)) => validate_block(&nested.block, v, path, diagnostics),
        (BlockNestingMode::List, Some(Value::Array(items))) => {
            let len = items.len() as u32;

            if len < nested.min_items {
                diagnostics.push(
                    Diagnostic::error(format!(
                        "Block '{}' requires at least {} item(s), got {}",
                        path, nested.min_items, len
                    ))
                    .with_attribute(path),
                );
            }

            // 0 means unlimited
            if nested.max_items > 0 && len > nested.max_items {
                diagnostics.push(
                    Diagnostic::error(format!(
                        "Block '{}' allows at most {} item(s), got {}",
                        path, nested.max_items, len
                    ))
                    .with_attribute(path),
                );
            }

            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{}.{}", path, i);
                validate_block(&nested.block, item, &item_path, diagnostics);
            }
        },
        (BlockNestingMode::List, Some(v)) => {
            diagnostics.push(
                Diagnostic::error(format!("Expected list for block '{}'", path))
                    .with_detail(format!("Got {}", value_type_name(v)))
                    .with_attribute(path),
            );
        },
    }
}

/// Report every route whose `shield_location` is not a known location.
///
/// `config` is the `config` block of an MTE config resource.
pub fn validate_shield_locations(config: &Value) -> Vec<Diagnostic> {
    let Some(routes) = config.get("routes").and_then(Value::as_array) else {
        return Vec::new();
    };

    routes
        .iter()
        .enumerate()
        .filter_map(|(i, route)| {
            let label = route.get("shield_location")?.as_str()?;
            let err = label.parse::<ShieldLocation>().err()?;
            Some(
                Diagnostic::error("Invalid shield location")
                    .with_detail(err.detail())
                    .with_attribute(format!("config.routes.{}.shield_location", i)),
            )
        })
        .collect()
}

/// Rules on a decoded MTE config that the schema cannot express.
pub fn validate_mte_config(config: &MteConfig) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (i, rule) in config.cache.iter().enumerate() {
        if !rule.has_effect() {
            diagnostics.push(
                Diagnostic::error("Invalid cache rule")
                    .with_detail("A cache rule must set keys or ttl_seconds.")
                    .with_attribute(format!("config.cache.{}", i)),
            );
        }
    }

    diagnostics
}

/// [`validate_mte_config`] as a hard error, for use right before a request.
pub fn check_mte_config(config: &MteConfig) -> Result<(), ProviderError> {
    into_result(validate_mte_config(config))
}

/// A key attribute is interpolated into a URL and must not be blank.
pub fn validate_key(attribute: &str, value: &str) -> Vec<Diagnostic> {
    if value.trim().is_empty() {
        vec![Diagnostic::error(format!("Empty {}", attribute))
            .with_detail(format!("{} must not be empty.", attribute))
            .with_attribute(attribute)]
    } else {
        Vec::new()
    }
}

/// Collapse error diagnostics into a single [`ProviderError::Validation`].
pub fn into_result(diagnostics: Vec<Diagnostic>) -> Result<(), ProviderError> {
    let messages: Vec<String> = diagnostics
        .iter()
        .filter(|d| d.is_error())
        .map(|d| match (&d.attribute, &d.detail) {
            (Some(attr), Some(detail)) => format!("{}: {} {}", attr, d.summary, detail),
            (Some(attr), None) => format!("{}: {}", attr, d.summary),
            (None, Some(detail)) => format!("{} {}", d.summary, detail),
            (None, None) => d.summary.clone(),
        })
        .collect();

    if messages.is_empty() {
        Ok(())
    } else {
        Err(ProviderError::Validation(messages.join("; ")))
    }
}

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_error(path: &str, expected: &str, got: &Value) -> Diagnostic {
    Diagnostic::error(format!("Invalid type for attribute '{}'", path))
        .with_detail(format!("Expected {}, got {}", expected, value_type_name(got)))
        .with_attribute(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CacheKeys, CacheRule};
    use serde_json::json;

    fn route_block() -> NestedBlock {
        NestedBlock::list(
            Block::new()
                .with_attribute("host", Attribute::required_string())
                .with_attribute("enable_ssl", Attribute::required_bool())
                .with_attribute("shield_location", Attribute::optional_string()),
        )
        .with_min_items(1)
    }

    #[test]
    fn test_validate_required_string() {
        let schema = Schema::v0().with_attribute("domain", Attribute::required_string());

        assert!(validate(&schema, &json!({"domain": "a.com"})).is_empty());

        let diagnostics = validate(&schema, &json!({}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("domain".to_string()));

        assert_eq!(validate(&schema, &json!({"domain": null})).len(), 1);

        let diagnostics = validate(&schema, &json!({"domain": 123}));
        assert!(diagnostics[0].summary.contains("Invalid type"));
    }

    #[test]
    fn test_validate_optional_and_computed() {
        let schema = Schema::v0()
            .with_attribute("ttl_seconds", Attribute::optional_int64())
            .with_attribute("domain_mapping", Attribute::computed_string());

        assert!(validate(&schema, &json!({})).is_empty());
        assert!(validate(&schema, &json!({"ttl_seconds": null, "domain_mapping": 5})).is_empty());
        assert_eq!(validate(&schema, &json!({"ttl_seconds": 1.5})).len(), 1);
    }

    #[test]
    fn test_validate_string_list() {
        let schema = Schema::v0().with_attribute("any_match", Attribute::optional_string_list());

        assert!(validate(&schema, &json!({"any_match": ["/a/*", "/b"]})).is_empty());

        let diagnostics = validate(&schema, &json!({"any_match": ["/a", 2]}));
        assert_eq!(diagnostics[0].attribute, Some("any_match.1".to_string()));

        assert_eq!(validate(&schema, &json!({"any_match": "/a"})).len(), 1);
    }

    #[test]
    fn test_validate_nested_list_paths() {
        let schema = Schema::v0().with_block(
            "config",
            NestedBlock::single(Block::new().with_block("routes", route_block())).with_min_items(1),
        );

        let diagnostics = validate(
            &schema,
            &json!({"config": {"routes": [
                {"host": "a.com", "enable_ssl": true},
                {"host": "b.com", "enable_ssl": "yes"}
            ]}}),
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("config.routes.1.enable_ssl".to_string()));

        let diagnostics = validate(&schema, &json!({"config": {"routes": []}}));
        assert!(diagnostics[0].summary.contains("at least 1"));

        let diagnostics = validate(&schema, &json!({}));
        assert_eq!(diagnostics[0].attribute, Some("config".to_string()));

        let diagnostics = validate(&schema, &json!({"config": {"routes": {}}}));
        assert!(diagnostics[0].summary.contains("Expected list"));
    }

    #[test]
    fn test_validate_root_not_object() {
        let schema = Schema::v0().with_attribute("domain", Attribute::required_string());
        let diagnostics = validate(&schema, &json!("a.com"));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].attribute.is_none());
        assert!(validate_result(&schema, &json!([])).is_err());
    }

    #[test]
    fn test_shield_locations() {
        let config = json!({"routes": [
            {"shield_location": "London"},
            {"shield_location": null},
            {},
            {"shield_location": "Paris"}
        ]});
        let diagnostics = validate_shield_locations(&config);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].attribute,
            Some("config.routes.3.shield_location".to_string())
        );
        assert!(diagnostics[0].detail.as_deref().unwrap().contains("Paris"));
    }

    #[test]
    fn test_cache_rule_needs_keys_or_ttl() {
        let config = MteConfig {
            cache: vec![
                CacheRule {
                    ttl_seconds: Some(60),
                    ..Default::default()
                },
                CacheRule::default(),
                CacheRule {
                    keys: Some(CacheKeys::default()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let diagnostics = validate_mte_config(&config);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("config.cache.1".to_string()));

        let err = check_mte_config(&config).unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
        assert!(err.detail().contains("keys or ttl_seconds"));
    }

    #[test]
    fn test_ttl_is_passed_through_unchecked() {
        let config = MteConfig {
            cache: vec![CacheRule {
                ttl_seconds: Some(-1),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(validate_mte_config(&config).is_empty());
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("domain", "a.com").is_empty());
        assert_eq!(validate_key("domain", "  ").len(), 1);
        assert!(into_result(validate_key("environment_id", "")).is_err());
        assert!(into_result(vec![Diagnostic::warning("note")]).is_ok());
    }
}
