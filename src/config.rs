//! Store configuration

use std::path::{Path, PathBuf};

use quiver_core::EngineConfig;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Directory `create` persists into unless configured otherwise
pub const DEFAULT_SNAPSHOT_DIR: &str = "vector_store";

/// Everything needed to build a [`crate::VectorStore`] besides the dimension.
///
/// Loadable from JSON; missing fields take their defaults:
///
/// ```json
/// { "snapshot_dir": "data/store", "engine": { "metric": "l2", "m": 16 } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Where `create(.., persist = true)` writes its snapshot
    pub snapshot_dir: PathBuf,
    pub engine: EngineConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: PathBuf::from(DEFAULT_SNAPSHOT_DIR),
            engine: EngineConfig::default(),
        }
    }
}

impl StoreConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| StoreError::persistence(path, e))?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            StoreError::Configuration(format!("{}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = dir.into();
        self
    }

    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.snapshot_dir.as_os_str().is_empty() {
            return Err(StoreError::Configuration(
                "snapshot_dir must not be empty".into(),
            ));
        }
        self.engine.validate()?;
        Ok(())
    }
}
