//! Configuration types for the certwatch service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub websites: Vec<String>,
    /// Per-probe timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default)]
    pub thresholds: ThresholdSet,
    /// Maximum number of probes in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub webhook: Option<WebhookConfig>,
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            websites: Vec::new(),
            timeout: default_timeout(),
            thresholds: ThresholdSet::default(),
            concurrency: default_concurrency(),
            webhook: None,
            output_file: default_output_file(),
        }
    }
}

impl Config {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Check the invariants serde cannot express
    pub fn validate(&self) -> crate::Result<()> {
        self.thresholds.validate()?;

        if self.timeout == 0 {
            return Err(crate::CertwatchError::Config(
                "timeout must be at least 1 second".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(crate::CertwatchError::Config(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if let Some(webhook) = &self.webhook {
            if webhook.enabled && webhook.url.trim().is_empty() {
                return Err(crate::CertwatchError::Config(
                    "webhook is enabled but has no url".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Day cutoffs used to derive a certificate status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdSet {
    #[serde(default = "default_critical_days")]
    pub critical: u32,
    #[serde(default = "default_warning_days")]
    pub warning: u32,
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self {
            critical: default_critical_days(),
            warning: default_warning_days(),
        }
    }
}

impl ThresholdSet {
    pub fn new(critical: u32, warning: u32) -> crate::Result<Self> {
        let thresholds = Self { critical, warning };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.critical > self.warning {
            return Err(crate::CertwatchError::Config(format!(
                "critical threshold ({} days) must not exceed warning threshold ({} days)",
                self.critical, self.warning
            )));
        }
        Ok(())
    }
}

/// Outbound webhook alert settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_true")]
    pub send_on_critical: bool,
    #[serde(default)]
    pub send_on_warning: bool,
}

fn default_timeout() -> u64 {
    10
}

fn default_concurrency() -> usize {
    5
}

fn default_critical_days() -> u32 {
    7
}

fn default_warning_days() -> u32 {
    30
}

fn default_true() -> bool {
    true
}

fn default_output_file() -> PathBuf {
    PathBuf::from("cert_results.json")
}

/// Load and validate configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::CertwatchError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    config.validate()?;
    tracing::info!("Configuration loaded from {:?}", path);
    Ok(config)
}
