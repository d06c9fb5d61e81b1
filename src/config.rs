//! TOML configuration for opforge.
//!
//! Layered like the rest of the toolchain: explicit path, then the
//! `OPFORGE_CONFIG` environment variable, then the system location, then
//! compiled-in defaults.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::accel::DEFAULT_MAX_LRN_WINDOW;
use crate::spec::OperatorSpec;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "OPFORGE_CONFIG";

const SYSTEM_CONFIG_PATH: &str = "/etc/opforge/opforge.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpforgeConfig {
    #[serde(default)]
    pub accelerator: AcceleratorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl OpforgeConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "loaded opforge configuration");
        Ok(config)
    }

    /// Try to load configuration from, in order:
    /// 1. The path specified by the `OPFORGE_CONFIG` environment variable.
    /// 2. `/etc/opforge/opforge.toml`.
    /// 3. Fall back to compiled-in defaults.
    pub fn load_or_default() -> Self {
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let path = Path::new(&env_path);
            match Self::load(path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "OPFORGE_CONFIG set but file could not be loaded, trying fallback"
                    );
                }
            }
        }

        let system_path = Path::new(SYSTEM_CONFIG_PATH);
        if system_path.exists() {
            match Self::load(system_path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %system_path.display(),
                        error = %e,
                        "system config file exists but could not be loaded, using defaults"
                    );
                }
            }
        }

        debug!("no config file found, using compiled-in defaults");
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Accelerator
// ---------------------------------------------------------------------------

/// Runtime facts and overrides for the accelerated engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceleratorConfig {
    /// Use the accelerated engine when it is compiled in.
    pub enabled: bool,
    /// Linked library version, for diagnostics.
    pub version: Option<String>,
    /// Largest LRN window the accelerated kernel accepts.
    pub max_lrn_window: u32,
    pub dilated_convolution: bool,
    pub multi_output_pooling: bool,
    pub max_pooling_in_place: bool,
}

impl Default for AcceleratorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            version: None,
            max_lrn_window: DEFAULT_MAX_LRN_WINDOW,
            dilated_convolution: false,
            multi_output_pooling: false,
            max_pooling_in_place: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum tracing level (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Layer manifests
// ---------------------------------------------------------------------------

/// A list of operator specs, one `[[layer]]` table each.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayerManifest {
    #[serde(default, rename = "layer")]
    pub layers: Vec<OperatorSpec>,
}

impl LayerManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read layer manifest: {}", path.display()))?;
        let manifest: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse layer manifest: {}", path.display()))?;
        debug!(path = %path.display(), layers = manifest.layers.len(), "loaded layer manifest");
        Ok(manifest)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
