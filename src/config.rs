use crate::error::ConfigError;
use crate::fec::{validate_parameters, FieldKind};
use serde::Deserialize;
use std::path::Path;

/// Codec parameters shared by both ends of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    pub field: FieldKind,
    pub symbols: usize,
    pub symbol_size: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            field: FieldKind::Binary8,
            symbols: 32,
            symbol_size: 1040,
        }
    }
}

impl CodecConfig {
    /// Load the `[codec]` table from a TOML string. A missing table or
    /// missing keys fall back to the defaults.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        #[derive(Deserialize)]
        struct Root {
            #[serde(default)]
            codec: CodecConfig,
        }

        let root: Root = toml::from_str(s)?;
        Ok(root.codec)
    }

    /// Load configuration from a file path.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_parameters(self.field, self.symbols, self.symbol_size)?;
        Ok(())
    }

    pub fn block_size(&self) -> usize {
        self.symbols * self.symbol_size
    }
}
