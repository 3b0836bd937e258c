//! Altitude Provider
//!
//! An infrastructure-as-code provider for the Altitude edge platform. It
//! manages MTE configuration, domain mappings and rules mappings, and reads
//! the configured logging endpoints.
//!
//! # Overview
//!
//! - **Client** ([`client`]): OAuth2 client-credentials token acquisition and
//!   authenticated requests against the Altitude API
//! - **Models** ([`model`]): typed resource state, mapped to the wire format
//!   in [`client::dto`]
//! - **Resources** ([`resources`]): typed handlers with shared plan, read and
//!   delete semantics
//! - **Provider** ([`AltitudeProvider`]): the [`ProviderService`]
//!   implementation the plugin host drives
//! - **Testing** ([`testing`]): a harness that drives a provider like the host
//!
//! # Quick Start
//!
//! ```ignore
//! use altitude_provider::testing::ProviderTester;
//! use altitude_provider::{init_logging, AltitudeProvider};
//! use serde_json::json;
//!
//! init_logging();
//!
//! let tester = ProviderTester::new(AltitudeProvider::new());
//! tester.configure(json!({
//!     "client_id": "...",
//!     "client_secret": "...",
//!     "audience": "https://api.platform.thgaltitude.com"
//! })).await?;
//!
//! let state = tester.apply("altitude_mte_rules_mapping", None, json!({
//!     "domain": "shop.example.com",
//!     "rules_id": "rg-1"
//! })).await?;
//! ```
//!
//! # Configuration
//!
//! `client_id`, `client_secret` and `audience` fall back to the
//! `ALTITUDE_CLIENT_ID`, `ALTITUDE_CLIENT_SECRET` and `ALTITUDE_AUDIENCE`
//! environment variables. `base_url` and `issuer` default to the production
//! Altitude endpoints.

#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod service;
pub mod testing;
pub mod types;
pub mod validation;

pub use client::AltitudeClient;
pub use config::{Credentials, ProviderConfig};
pub use error::ProviderError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::AltitudeProvider;
pub use schema::ProviderSchema;
pub use service::ProviderService;
pub use types::{AttributeChange, ImportedResource, PlanResult, ProviderMetadata, ServerCapabilities};
pub use validation::{validate, validate_result};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
