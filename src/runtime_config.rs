// =============================================================================
// Runtime Configuration — simulation run settings with atomic save
// =============================================================================
//
// Controls how a run is driven (how many transactions, which seed, where
// output goes, whether the HTTP API is served). The scoring weights and risk
// thresholds are deliberately absent: they are fixed constants of the scorer.
//
// All fields carry `#[serde(default)]` so that a partial or empty file loads
// cleanly, and persistence uses an atomic tmp + rename.
//
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::signals::DEFAULT_RECENT_COUNT;

/// Default location of the config file, relative to the working directory.
pub const CONFIG_PATH: &str = "scorer_config.json";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_sample_count() -> usize {
    100
}

fn default_recent_count() -> usize {
    DEFAULT_RECENT_COUNT
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Settings for one scorer run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Number of synthetic transactions to score at startup.
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,

    /// How many of the most recent signals to log after the run.
    #[serde(default = "default_recent_count")]
    pub recent_count: usize,

    /// Fixed RNG seed for reproducible runs. `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Where to write the pretty-printed signal export, if anywhere.
    #[serde(default)]
    pub export_path: Option<PathBuf>,

    /// Where to write the HTML report table, if anywhere.
    #[serde(default)]
    pub html_report_path: Option<PathBuf>,

    /// Keep running and serve the scorer over HTTP after the initial run.
    #[serde(default)]
    pub serve: bool,

    /// Listen address for the HTTP API.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            sample_count: default_sample_count(),
            recent_count: default_recent_count(),
            seed: None,
            export_path: None,
            html_report_path: None,
            serve: false,
            bind_addr: default_bind_addr(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            sample_count = config.sample_count,
            serve = config.serve,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }

    /// Apply `AURORA_*` overrides from `lookup` (normally `std::env::var`).
    ///
    /// Unparseable values are ignored and reported back by variable name.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Vec<&'static str>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut rejected = Vec::new();

        if let Some(raw) = lookup("AURORA_SAMPLE_COUNT") {
            match raw.trim().parse() {
                Ok(n) => self.sample_count = n,
                Err(_) => rejected.push("AURORA_SAMPLE_COUNT"),
            }
        }
        if let Some(raw) = lookup("AURORA_SEED") {
            match raw.trim().parse() {
                Ok(seed) => self.seed = Some(seed),
                Err(_) => rejected.push("AURORA_SEED"),
            }
        }
        if let Some(raw) = lookup("AURORA_SERVE") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.serve = true,
                "0" | "false" | "no" | "off" => self.serve = false,
                _ => rejected.push("AURORA_SERVE"),
            }
        }
        if let Some(raw) = lookup("AURORA_BIND_ADDR") {
            let addr = raw.trim();
            if addr.is_empty() {
                rejected.push("AURORA_BIND_ADDR");
            } else {
                self.bind_addr = addr.to_string();
            }
        }

        rejected
    }
}
