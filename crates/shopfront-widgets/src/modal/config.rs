#![forbid(unsafe_code)]

//! Modal defaults.
//!
//! A storefront usually wants every dialog to fade for the same time and use
//! the same button labels, so those defaults live in one [`ModalConfig`] that
//! hosts are built from. With the `config` feature the config can be loaded
//! from TOML:
//!
//! ```toml
//! transition_ms = 200
//! confirm_text = "Continue"
//! backdrop_opacity = 0.5
//! ```
//!
//! Missing keys keep their defaults; unknown keys are rejected.

use std::time::Duration;

use thiserror::Error;

/// Errors from loading or validating a [`ModalConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The document is not valid TOML or does not match the schema.
    #[cfg(feature = "config")]
    #[error("invalid modal config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Reading the config file failed.
    #[cfg(feature = "config")]
    #[error("failed to read modal config {}: {source}", path.display())]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    /// An opacity outside `[0.0, 1.0]`.
    #[error("{field} must be within 0.0..=1.0, got {value}")]
    OpacityOutOfRange { field: &'static str, value: f32 },
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "config",
    derive(serde::Deserialize, serde::Serialize),
    serde(default, deny_unknown_fields)
)]
pub struct ModalConfig {
    /// Exit animation length in milliseconds.
    pub transition_ms: u64,
    pub confirm_text: String,
    pub cancel_text: String,
    /// Backdrop opacity while the modal is shown.
    pub backdrop_opacity: f32,
    /// Backdrop opacity while the modal animates out.
    pub exit_backdrop_opacity: f32,
    pub close_on_backdrop: bool,
    pub close_on_escape: bool,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            transition_ms: 300,
            confirm_text: "OK".to_string(),
            cancel_text: "Cancel".to_string(),
            backdrop_opacity: 0.6,
            exit_backdrop_opacity: 0.0,
            close_on_backdrop: true,
            close_on_escape: true,
        }
    }
}

impl ModalConfig {
    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("backdrop_opacity", self.backdrop_opacity),
            ("exit_backdrop_opacity", self.exit_backdrop_opacity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OpacityOutOfRange { field, value });
            }
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    #[cfg(feature = "config")]
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        tracing::debug!(
            transition_ms = config.transition_ms,
            "modal config loaded"
        );
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    #[cfg(feature = "config")]
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}
