//! Main entry point for the marketplace service.
//!
//! This binary wires the storage backend, the core engine and the HTTP
//! API together: it parses command-line arguments, initializes logging,
//! loads and validates configuration, optionally seeds the demo
//! directory, and serves the API until interrupted.

use clap::Parser;
use market_config::Config;
use market_core::{EngineBuilder, MarketEngine};
use market_storage::StorageFactory;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod server;

/// Command-line arguments for the marketplace service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the marketplace service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the engine over the configured storage backend
/// 5. Serves the HTTP API until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_target(true)
		.init();

	tracing::info!("Started marketplace service");

	// Load configuration
	let config_path = args
		.config
		.to_str()
		.ok_or("configuration path is not valid UTF-8")?;
	let config = Config::from_file_async(config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.marketplace.id);

	let engine = Arc::new(build_engine(config.clone())?);

	if config.demo.seed {
		engine.seed_demo_data().await?;
	}

	spawn_feed_logger(&engine);

	let api_enabled = config.api.as_ref().is_some_and(|api| api.enabled);
	if api_enabled {
		let api_config = config.api.as_ref().unwrap().clone();
		server::start_server(api_config, engine).await?;
	} else {
		tracing::warn!("API server disabled in configuration, nothing to serve");
	}

	tracing::info!("Stopped marketplace service");
	Ok(())
}

/// Builds the engine with all registered storage implementations.
fn build_engine(config: Config) -> Result<MarketEngine, market_core::EngineError> {
	let storage_factories: HashMap<String, StorageFactory> =
		market_storage::get_all_implementations()
			.into_iter()
			.map(|(name, factory)| (name.to_string(), factory))
			.collect();

	EngineBuilder::new(config).build(storage_factories)
}

/// Drains the change-notification feed into the debug log.
///
/// Stands in for the real-time transport of the original design; each
/// notice is a refetch signal keyed by entity id.
fn spawn_feed_logger(engine: &Arc<MarketEngine>) {
	let mut receiver = engine.event_bus().subscribe();
	tokio::spawn(async move {
		while let Ok(event) = receiver.recv().await {
			tracing::debug!(?event, "Change notice");
		}
	});
}

#[cfg(test)]
mod tests {
	use super::*;

	const CONFIG: &str = r#"
[marketplace]
id = "market-test"

[storage]
primary = "memory"

[storage.implementations.memory]

[api]
enabled = true
port = 9090
"#;

	#[test]
	fn test_args_default_values() {
		let args = Args {
			config: PathBuf::from("config.toml"),
			log_level: "info".to_string(),
		};

		assert_eq!(args.config, PathBuf::from("config.toml"));
		assert_eq!(args.log_level, "info");
	}

	#[test]
	fn test_build_engine_with_minimal_config() {
		let config = Config::from_toml_str(CONFIG).unwrap();
		let engine = build_engine(config).unwrap();
		assert_eq!(engine.config().marketplace.id, "market-test");
	}

	#[tokio::test]
	async fn test_build_engine_with_file_backend() {
		let dir = tempfile::tempdir().unwrap();
		let config_text = format!(
			r#"
[marketplace]
id = "market-file-test"

[storage]
primary = "file"

[storage.implementations.file]
storage_path = "{}"
"#,
			dir.path().display()
		);

		let config = Config::from_toml_str(&config_text).unwrap();
		let engine = build_engine(config).unwrap();
		engine.seed_demo_data().await.unwrap();

		// Seeded rows survive an engine rebuild over the same directory.
		let config = Config::from_toml_str(&config_text).unwrap();
		let engine = build_engine(config).unwrap();
		let vendor_id = engine.config().demo.vendor_id.clone();
		assert!(engine
			.storage()
			.exists("vendors", &vendor_id)
			.await
			.unwrap());
	}
}
