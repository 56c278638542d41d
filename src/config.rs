//! Configuration loading helpers.

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::module::L2ForwardConfig;

/// Why a module configuration could not be assembled.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config file: {0}")]
    Read(#[from] std::io::Error),
    /// The config file is not well-formed TOML.
    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),
    /// An `L2FWD__` override carried a value its field cannot hold.
    #[error("{key} cannot be set to {value:?}: expected an unsigned integer")]
    BadValue {
        /// Environment variable holding the override.
        key: String,
        /// The rejected raw text.
        value: String,
    },
    /// An `L2FWD__` override names no known field.
    #[error("no such config field: {0}")]
    UnknownField(String),
}

/// Top-level configuration schema.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct L2fwdConfig {
    /// Forwarding-module configuration.
    pub module: Option<ModuleConfigSpec>,
}

impl L2fwdConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Load configuration from the `L2FWD_CONFIG` env var (if set),
    /// then apply `L2FWD__section__field` overrides.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let config_path = env::var("L2FWD_CONFIG").ok();
        let mut config = match config_path {
            Some(path) => Self::load_from_path(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment overrides in-place.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        for (key, value) in env::vars() {
            if !key.starts_with("L2FWD__") {
                continue;
            }
            let path = key["L2FWD__".len()..].to_ascii_lowercase();
            let parts: Vec<&str> = path.split("__").collect();
            let value = value.trim().to_string();

            match parts.as_slice() {
                ["module", "size"] => {
                    self.module_mut().size = Some(parse_u64(&key, &value)?);
                }
                ["module", "bucket"] => {
                    self.module_mut().bucket = Some(parse_u64(&key, &value)?);
                }
                _ => return Err(ConfigError::UnknownField(key)),
            }
        }

        Ok(())
    }

    /// Build an `L2ForwardConfig` using defaults plus overrides.
    pub fn to_l2_forward_config(&self) -> L2ForwardConfig {
        let mut config = L2ForwardConfig::default();
        if let Some(module) = &self.module {
            module.apply_to(&mut config);
        }
        config
    }

    fn module_mut(&mut self) -> &mut ModuleConfigSpec {
        if self.module.is_none() {
            self.module = Some(ModuleConfigSpec::default());
        }
        self.module.as_mut().expect("module config")
    }
}

/// Forwarding-module configuration overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModuleConfigSpec {
    /// Number of bucket rows; power of two.
    pub size: Option<u64>,
    /// Slots per bucket row; power of two.
    pub bucket: Option<u64>,
}

impl ModuleConfigSpec {
    fn apply_to(&self, config: &mut L2ForwardConfig) {
        if let Some(value) = self.size {
            config.size = value;
        }
        if let Some(value) = self.bucket {
            config.bucket = value;
        }
    }
}

/// Every overridable field is an unsigned count, so one parser covers them.
fn parse_u64(key: &str, raw: &str) -> Result<u64, ConfigError> {
    match raw.parse() {
        Ok(n) => Ok(n),
        Err(_) => Err(ConfigError::BadValue {
            key: key.into(),
            value: raw.into(),
        }),
    }
}
