//! Configuration for opening the graph store.
//!
//! Stored as YAML, e.g. `.snapgraph/config.yaml`:
//!
//! ```yaml
//! database: .snapgraph/graph.db
//! busy-timeout-ms: 5000
//! wal: true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default location of the database, relative to the working directory.
pub const DEFAULT_DATABASE: &str = ".snapgraph/graph.db";

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_FILE: &str = ".snapgraph/config.yaml";

/// Default time to wait on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Store configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct GraphConfig {
    /// Path to the `SQLite` database file
    pub database: PathBuf,

    /// How long a statement waits on a locked database, in milliseconds
    pub busy_timeout_ms: u64,

    /// Use write-ahead logging
    pub wal: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            wal: true,
        }
    }
}

impl GraphConfig {
    /// Default configuration pointing at `database`.
    #[must_use]
    pub fn with_database(database: impl Into<PathBuf>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file, falling back to defaults if it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match std::fs::metadata(path) {
            Ok(_) => Self::load(path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Save configuration as YAML.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check that the configuration can be used to open a store.
    pub fn validate(&self) -> Result<()> {
        if self.database.as_os_str().is_empty() {
            return Err(Error::Config("database path must not be empty".to_string()));
        }
        Ok(())
    }

    /// Busy timeout as a `Duration`.
    #[must_use]
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}
