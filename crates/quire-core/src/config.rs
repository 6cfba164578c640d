//! Workspace configuration for quire
//!
//! Configuration is stored in `.quire/config.toml` under the workspace root.
//! A missing file yields defaults; every field is optional.

pub mod types;

use std::fs;
use std::path::Path;

use crate::error::{QuireError, Result};

pub use types::{
    BackendKind, CompressionConfig, CompressionStrategy, IndexConfig, ModelConfig, QuireConfig,
};

impl QuireConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: QuireConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| QuireError::Other(format!("failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.index.chunk_size == 0 {
            return Err(QuireError::invalid_value("index.chunk_size", 0));
        }
        if self.index.chunk_overlap >= self.index.chunk_size {
            return Err(QuireError::invalid_value(
                "index.chunk_overlap",
                format!(
                    "{} (must be smaller than chunk_size {})",
                    self.index.chunk_overlap, self.index.chunk_size
                ),
            ));
        }
        Ok(())
    }
}
