//! Configuration parsing and validation.
//!
//! There is no ambient or process-wide default configuration: a config value
//! is built here (from TOML or `Default`) and passed explicitly to the
//! constructors that need it.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::{CourierError, Result};

/// Pipe transport settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct PipeConfig {
    /// Platform-local pipe name; sender and receiver must agree on it.
    #[serde(default = "default_pipe_name")]
    pub name: String,
    /// Connect attempt timeout in milliseconds. Near-zero: with no listener
    /// present the attempt fails fast and the message is dropped.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Value for the `OriginatingSystem` header when the caller sets none.
    #[serde(default = "default_origin_system")]
    pub origin_system: String,
}

fn default_pipe_name() -> String {
    "pipe-courier".into()
}

fn default_connect_timeout_ms() -> u64 {
    50
}

fn default_origin_system() -> String {
    "pipe-courier".into()
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            name: default_pipe_name(),
            connect_timeout_ms: default_connect_timeout_ms(),
            origin_system: default_origin_system(),
        }
    }
}

/// Dispatch and routing settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct DispatchConfig {
    /// Header key carrying the message-type tag the handler registry routes on.
    #[serde(default = "default_type_header")]
    pub type_header: String,
}

fn default_type_header() -> String {
    "MessageType".into()
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            type_header: default_type_header(),
        }
    }
}

/// Top-level configuration parsed from `config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct CourierConfig {
    /// Pipe transport settings.
    #[serde(default)]
    pub pipe: PipeConfig,
    /// Dispatch and routing settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

impl CourierConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `CourierError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| CourierError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `CourierError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.pipe.name.is_empty() {
            return Err(CourierError::Config("pipe.name must not be empty".into()));
        }
        if self.pipe.origin_system.is_empty() {
            return Err(CourierError::Config(
                "pipe.origin_system must not be empty".into(),
            ));
        }
        if self.dispatch.type_header.is_empty() {
            return Err(CourierError::Config(
                "dispatch.type_header must not be empty".into(),
            ));
        }
        Ok(())
    }
}
