//! Configuration loading from a TOML file and environment variables.
//!
//! [`TaurusConfig`] is built once at process start and handed by reference to
//! every component that needs a setting. Nothing reads configuration through
//! globals.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TaurusConfig {
    pub logging: LoggingConfig,
    pub broker: BrokerConfig,
    pub model_swapper: ModelSwapperConfig,
    pub metric_listener: MetricListenerConfig,
    pub dynamodb: DynamoDbConfig,
    pub metric_streamer: MetricStreamerConfig,
    pub non_metric_data: NonMetricDataConfig,
    pub repository: RepositoryConfig,
    pub checkpoints: CheckpointConfig,
    pub reset: ResetConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

/// RabbitMQ management API connection settings.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BrokerConfig {
    pub management_url: String,
    pub vhost: String,
    pub user: String,
    pub password: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ModelSwapperConfig {
    pub results_queue: String,
    pub scheduler_notification_queue: String,
    /// Model input queues are named `{prefix}{model_id}`.
    pub model_input_queue_prefix: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MetricListenerConfig {
    pub queue_name: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DynamoDbConfig {
    pub input_queue_name: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MetricStreamerConfig {
    pub results_exchange_name: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NonMetricDataConfig {
    pub exchange_name: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RepositoryConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CheckpointConfig {
    pub root_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ResetConfig {
    pub prompt_timeout_secs: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            management_url: "http://localhost:15672".into(),
            vhost: "/".into(),
            user: "guest".into(),
            password: "guest".into(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for ModelSwapperConfig {
    fn default() -> Self {
        Self {
            results_queue: "taurus.mswapper.results".into(),
            scheduler_notification_queue: "taurus.mswapper.scheduler.notification".into(),
            model_input_queue_prefix: "taurus.mswapper.model.input.".into(),
        }
    }
}

impl Default for MetricListenerConfig {
    fn default() -> Self {
        Self {
            queue_name: "taurus.metric.custom.data".into(),
        }
    }
}

impl Default for DynamoDbConfig {
    fn default() -> Self {
        Self {
            input_queue_name: "taurus.dynamodb".into(),
        }
    }
}

impl Default for MetricStreamerConfig {
    fn default() -> Self {
        Self {
            results_exchange_name: "taurus.model.results".into(),
        }
    }
}

impl Default for NonMetricDataConfig {
    fn default() -> Self {
        Self {
            exchange_name: "taurus.data.non-metric".into(),
        }
    }
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        let db_path = default_taurus_dir()
            .join("repository.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        let root_dir = default_taurus_dir()
            .join("checkpoints")
            .to_string_lossy()
            .into_owned();
        Self { root_dir }
    }
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            prompt_timeout_secs: 30,
        }
    }
}

/// Returns `~/.taurus/`, or `./.taurus/` when no home directory is known.
pub fn default_taurus_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".taurus")
}

/// Returns the default config file path: `~/.taurus/config.toml`
pub fn default_config_path() -> PathBuf {
    default_taurus_dir().join("config.toml")
}

impl TaurusConfig {
    /// Load config from the default TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            TaurusConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TAURUS_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("TAURUS_DB") {
            self.repository.db_path = val;
        }
        if let Ok(val) = std::env::var("TAURUS_CHECKPOINT_DIR") {
            self.checkpoints.root_dir = val;
        }
        if let Ok(val) = std::env::var("RABBITMQ_MANAGEMENT_URL") {
            self.broker.management_url = val;
        }
        if let Ok(val) = std::env::var("RABBITMQ_VHOST") {
            self.broker.vhost = val;
        }
        if let Ok(val) = std::env::var("RABBITMQ_USER") {
            self.broker.user = val;
        }
        if let Ok(val) = std::env::var("RABBITMQ_PASSWORD") {
            self.broker.password = val;
        }
    }

    /// Resolve the repository database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.repository.db_path)
    }

    /// Resolve the checkpoint root directory, expanding `~` if needed.
    pub fn resolved_checkpoint_dir(&self) -> PathBuf {
        expand_tilde(&self.checkpoints.root_dir)
    }

    pub fn prompt_timeout(&self) -> Duration {
        Duration::from_secs(self.reset.prompt_timeout_secs)
    }
}

impl BrokerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
