//! Configuration loading and parsing

use crate::solver;
use anyhow::{Context, Result};
use callback_bridge::BridgeConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub callback: CallbackConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Which callback the listener registers
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CallbackConfig {
    /// Search for an arithmetic expression over the numbers equal to `target`
    Solver {
        #[serde(default = "default_target")]
        target: i64,
    },
    /// Print the numbers back
    Echo,
    /// C ABI function loaded from a dynamic library
    Native {
        library: PathBuf,
        #[serde(default = "default_native_function")]
        function: String,
    },
}

impl Default for CallbackConfig {
    fn default() -> Self {
        CallbackConfig::Solver {
            target: default_target(),
        }
    }
}

pub fn default_target() -> i64 {
    24
}

pub fn default_native_function() -> String {
    "on_numbers".to_string()
}

impl AppConfig {
    /// Check settings that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.bridge.arity == 0 {
            anyhow::bail!("bridge.arity must be at least 1");
        }
        if self.bridge.quit_command.trim().is_empty() {
            anyhow::bail!("bridge.quit_command is empty");
        }
        if let CallbackConfig::Solver { .. } = self.callback {
            if self.bridge.arity > solver::MAX_NUMBERS {
                anyhow::bail!(
                    "bridge.arity {} is too large for the solver callback (at most {}); use the echo or native callback",
                    self.bridge.arity,
                    solver::MAX_NUMBERS
                );
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Print the run summary as JSON when the listener stops
    #[serde(default)]
    pub json_summary: bool,
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    if let Err(e) = config.validate() {
        anyhow::bail!("Invalid config {:?}: {}", path, e);
    }

    Ok(config)
}
