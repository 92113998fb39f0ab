//! Configuration for the adaptor

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Network adapted when none is configured.
pub const DEFAULT_NETWORK: &str = "USDA-ARS";

/// Extension of ISMN "header and values" data files.
pub const DEFAULT_EXTENSION: &str = "stm";

/// Main configuration for an adaptation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdaptorConfig {
    /// Network directory inside the database whose files are adapted
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// File extension of candidate files, without the leading dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Descend into entries whose name starts with a dot
    #[serde(default)]
    pub include_hidden: bool,

    /// Follow symbolic links while walking station folders
    #[serde(default)]
    pub follow_symlinks: bool,
}

fn default_pattern() -> String {
    DEFAULT_NETWORK.to_string()
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

impl Default for AdaptorConfig {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
            extension: default_extension(),
            include_hidden: false,
            follow_symlinks: false,
        }
    }
}

impl AdaptorConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AdaptorConfig = toml::from_str(&content)
            .map_err(|e| crate::AdaptorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::AdaptorError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values that would make the network path escape the database.
    pub fn validate(&self) -> crate::Result<()> {
        if self.pattern.trim().is_empty() {
            return Err(crate::AdaptorError::Config(
                "network pattern must not be empty".to_string(),
            ));
        }
        if self.pattern.contains(['/', '\\']) || self.pattern == ".." {
            return Err(crate::AdaptorError::Config(format!(
                "network pattern '{}' must be a single directory name",
                self.pattern
            )));
        }
        if self.extension.trim_start_matches('.').is_empty() {
            return Err(crate::AdaptorError::Config(
                "file extension must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The suffix candidate file names must end with, e.g. `.stm`.
    pub fn suffix(&self) -> String {
        format!(".{}", self.extension.trim_start_matches('.'))
    }
}
