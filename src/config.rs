//! CLI configuration
//!
//! One YAML file carries the engine settings; environment variables can
//! override the two tolerances that are tuned most often.

use std::time::Duration;

use anyhow::{Context, Result};
use element_fingerprint::FingerprintConfig;
use element_locator::{Relocator, RelocatorConfig};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cli::output::OutputFormat;

pub const ENV_BOUNDS_TOLERANCE: &str = "UITREE_BOUNDS_TOLERANCE";
pub const ENV_TEXT_SIMILARITY: &str = "UITREE_TEXT_SIMILARITY";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UitreeConfig {
    pub relocator: RelocatorConfig,
    pub fingerprint: FingerprintConfig,

    /// Lifetime of parsed snapshot trees in the resolve cache
    pub cache_ttl_secs: u64,

    /// Used when `--output` is not given
    pub output: OutputFormat,
}

impl Default for UitreeConfig {
    fn default() -> Self {
        Self {
            relocator: RelocatorConfig::default(),
            fingerprint: FingerprintConfig::default(),
            cache_ttl_secs: 300,
            output: OutputFormat::Human,
        }
    }
}

impl UitreeConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("Failed to parse config file")
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Apply `UITREE_*` overrides; unparseable values are skipped.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_BOUNDS_TOLERANCE) {
            match raw.trim().parse::<u32>() {
                Ok(value) => self.relocator.bounds_tolerance = value,
                Err(err) => warn!(var = ENV_BOUNDS_TOLERANCE, %raw, %err, "ignoring override"),
            }
        }
        if let Some(raw) = lookup(ENV_TEXT_SIMILARITY) {
            match raw.trim().parse::<f64>() {
                Ok(value) => self.relocator.text_similarity = value,
                Err(err) => warn!(var = ENV_TEXT_SIMILARITY, %raw, %err, "ignoring override"),
            }
        }
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Validated relocator for these settings.
    pub fn relocator(&self) -> Result<Relocator> {
        Relocator::with_fingerprint(self.relocator.clone(), self.fingerprint.clone())
            .context("Invalid relocator configuration")
    }
}
