// rebalancer-config/src/lib.rs

use async_trait::async_trait;
use rebalancer_types::{InternalPool, PoolConfigSource, RebalancerConfig};
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

/// Configuration loader with environment variable substitution
#[derive(Default)]
pub struct ConfigLoader {
	file_path: Option<String>,
	env_prefix: String,
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "REBALANCER_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_string_lossy().to_string());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub async fn load(&self) -> Result<RebalancerConfig, ConfigError> {
		let mut config = if let Some(file_path) = &self.file_path {
			self.load_from_file(file_path).await?
		} else {
			return Err(ConfigError::FileNotFound(
				"No configuration file specified".to_string(),
			));
		};

		self.apply_env_overrides(&mut config)?;
		self.validate_config(&config)?;

		info!(pools = config.pools.len(), "loaded rebalancer configuration");
		Ok(config)
	}

	async fn load_from_file(&self, file_path: &str) -> Result<RebalancerConfig, ConfigError> {
		let content = tokio::fs::read_to_string(file_path).await?;

		let substituted_content = self.substitute_env_vars(&content)?;

		let config: RebalancerConfig = toml::from_str(&substituted_content)
			.map_err(|e| ConfigError::ParseError(e.to_string()))?;

		Ok(config)
	}

	fn substitute_env_vars(&self, content: &str) -> Result<String, ConfigError> {
		let mut result = content.to_string();

		// Find and replace ${VAR_NAME} patterns
		let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();

		for cap in re.captures_iter(content) {
			let full_match = &cap[0];
			let var_name = &cap[1];

			let env_value = env::var(var_name)
				.map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

			result = result.replace(full_match, &env_value);
		}

		Ok(result)
	}

	fn apply_env_overrides(&self, config: &mut RebalancerConfig) -> Result<(), ConfigError> {
		if let Ok(hub_chain) = env::var(format!("{}HUB_CHAIN", self.env_prefix)) {
			config.simulator.hub_chain = hub_chain;
		}

		if let Ok(timeout) = env::var(format!("{}ATTESTATION_TIMEOUT", self.env_prefix)) {
			config.policy.attestation_timeout_seconds = timeout.parse().map_err(|e| {
				ConfigError::ValidationError(format!("Invalid attestation timeout: {}", e))
			})?;
		}

		if let Ok(limit) = env::var(format!("{}HISTORY_LIMIT", self.env_prefix)) {
			config.tracker.history_limit = limit.parse().map_err(|e| {
				ConfigError::ValidationError(format!("Invalid history limit: {}", e))
			})?;
		}

		Ok(())
	}

	fn validate_config(&self, config: &RebalancerConfig) -> Result<(), ConfigError> {
		if config.scoring.weights.sum() <= 0.0 {
			return Err(ConfigError::ValidationError(
				"Scoring weights must sum to a positive value".to_string(),
			));
		}

		if config.scoring.slippage_cap <= 0.0 || config.scoring.gas_cap <= 0.0 {
			return Err(ConfigError::ValidationError(
				"Normalization caps must be positive".to_string(),
			));
		}

		if !(0.0..=1.0).contains(&config.policy.min_success_rate) {
			return Err(ConfigError::ValidationError(
				"Minimum success rate must be within [0, 1]".to_string(),
			));
		}

		if config.tracker.history_limit == 0 {
			return Err(ConfigError::ValidationError(
				"History limit must be at least 1".to_string(),
			));
		}

		for pool in &config.pools {
			if pool.reserve < 0.0 {
				return Err(ConfigError::ValidationError(format!(
					"Pool {} has a negative reserve",
					pool.id
				)));
			}
			if !(0.0..1.0).contains(&pool.fee) {
				return Err(ConfigError::ValidationError(format!(
					"Pool {} fee must be within [0, 1)",
					pool.id
				)));
			}
		}

		Ok(())
	}
}

/// Pool source backed by a configuration file; `refresh` on the registry
/// re-reads the file through this loader.
pub struct FilePoolSource {
	loader: ConfigLoader,
}

impl FilePoolSource {
	pub fn new<P: AsRef<Path>>(path: P) -> Self {
		Self {
			loader: ConfigLoader::new().with_file(path),
		}
	}
}

#[async_trait]
impl PoolConfigSource for FilePoolSource {
	async fn load_pools(&self) -> anyhow::Result<Vec<InternalPool>> {
		let config = self.loader.load().await?;
		Ok(config.pools)
	}
}
