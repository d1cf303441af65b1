//! Editor configuration
//!
//! Plain data read by the editing commands: indentation settings and the
//! chunk size used when streaming the buffer. Loadable from YAML or JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::text::chunks::DEFAULT_CHUNK_LINES;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Width of one indentation level
    pub indent_size: usize,
    /// Indent with spaces instead of a tab character
    pub tabs_to_spaces: bool,
    /// Lines per chunk for `iter_chunks` / `iter_lines`
    pub chunk_lines: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            indent_size: 4,
            tabs_to_spaces: true,
            chunk_lines: DEFAULT_CHUNK_LINES,
        }
    }
}

impl EditorConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()
    }

    /// Load from a file; `.json` files are read as JSON, anything else as YAML
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.indent_size == 0 {
            return Err(ConfigError::Invalid("indent_size must be at least 1".to_string()));
        }
        if self.chunk_lines == 0 {
            return Err(ConfigError::Invalid("chunk_lines must be at least 1".to_string()));
        }
        Ok(self)
    }
}
