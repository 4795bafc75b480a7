//! Configuration module for the marketplace system.
//!
//! This module provides structures and utilities for managing marketplace
//! configuration. It supports loading configuration from TOML files and
//! provides validation to ensure all required configuration values are
//! properly set before any service starts.

use market_types::OrderStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the marketplace.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to this marketplace instance.
	pub marketplace: MarketplaceConfig,
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
	/// Policy knobs for the delivery assignment manager.
	#[serde(default)]
	pub assignment: AssignmentConfig,
	/// Demo identities and seeding.
	#[serde(default)]
	pub demo: DemoConfig,
}

/// Configuration specific to this marketplace instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketplaceConfig {
	/// Unique identifier for this marketplace instance.
	pub id: String,
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default)]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	8080
}

/// Policy knobs for the delivery assignment manager.
///
/// The assignment-to-order status map sends `accepted` to a configurable
/// order status. The historical behavior maps it to `confirmed`, which
/// skips `preparing`/`ready`; whether that bypass is intended is an open
/// product question, so the mapping is policy rather than a constant.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssignmentConfig {
	/// Order status implied by an assignment reaching `accepted`.
	#[serde(default = "default_accepted_order_status")]
	pub accepted_order_status: OrderStatus,
}

impl Default for AssignmentConfig {
	fn default() -> Self {
		Self {
			accepted_order_status: default_accepted_order_status(),
		}
	}
}

fn default_accepted_order_status() -> OrderStatus {
	OrderStatus::Confirmed
}

/// Demo identities and seeding.
///
/// Stands in for real authentication: requests that do not carry actor
/// headers act as these fixed identities, and `seed` populates the
/// directory tables at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DemoConfig {
	/// Whether to seed demo directory data at startup.
	#[serde(default)]
	pub seed: bool,
	/// Demo customer identity.
	#[serde(default = "default_demo_customer_id")]
	pub customer_id: String,
	/// Demo vendor identity.
	#[serde(default = "default_demo_vendor_id")]
	pub vendor_id: String,
	/// Demo delivery person identities.
	#[serde(default = "default_demo_delivery_person_ids")]
	pub delivery_person_ids: Vec<String>,
}

impl Default for DemoConfig {
	fn default() -> Self {
		Self {
			seed: false,
			customer_id: default_demo_customer_id(),
			vendor_id: default_demo_vendor_id(),
			delivery_person_ids: default_demo_delivery_person_ids(),
		}
	}
}

fn default_demo_customer_id() -> String {
	"11111111-1111-4111-8111-111111111111".to_string()
}

fn default_demo_vendor_id() -> String {
	"22222222-2222-4222-8222-222222222222".to_string()
}

fn default_demo_delivery_person_ids() -> Vec<String> {
	vec![
		"33333333-3333-4333-8333-333333333333".to_string(),
		"44444444-4444-4444-8444-444444444444".to_string(),
	]
}

impl Config {
	/// Loads configuration from a TOML file.
	pub fn from_file(path: &str) -> Result<Self, ConfigError> {
		let contents = std::fs::read_to_string(path)?;
		Self::from_toml_str(&contents)
	}

	/// Loads configuration from a TOML file without blocking the runtime.
	pub async fn from_file_async(path: &str) -> Result<Self, ConfigError> {
		let contents = tokio::fs::read_to_string(path).await?;
		Self::from_toml_str(&contents)
	}

	/// Parses and validates configuration from a TOML string.
	pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
		let config: Config = toml::from_str(contents)?;
		config.validate()?;
		Ok(config)
	}

	/// Validates cross-field constraints that serde cannot express.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.marketplace.id.trim().is_empty() {
			return Err(ConfigError::Validation(
				"marketplace.id must not be empty".to_string(),
			));
		}

		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"storage.primary '{}' has no matching [storage.implementations.{}] section",
				self.storage.primary, self.storage.primary
			)));
		}

		Ok(())
	}
}
