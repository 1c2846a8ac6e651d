//! Engine construction parameters

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::metric::Metric;

/// Parameters fixed when an index engine is created.
///
/// Defaults favour recall over build speed: `m = 128`,
/// `ef_construction = ef_search = 1500`, room for 10 000 elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of elements the engine will accept
    pub max_elements: usize,
    /// Max neighbors per layer (layer 0 keeps `2 * m`)
    pub m: usize,
    /// Beam width while building the graph
    pub ef_construction: usize,
    /// Beam width while querying
    pub ef_search: usize,
    pub metric: Metric,
    /// Seed for layer assignment. `None` draws one at construction.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_elements: 10_000,
            m: 128,
            ef_construction: 1500,
            ef_search: 1500,
            metric: Metric::Cosine,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn with_max_elements(mut self, max_elements: usize) -> Self {
        self.max_elements = max_elements;
        self
    }

    pub fn with_m(mut self, m: usize) -> Self {
        self.m = m;
        self
    }

    pub fn with_ef_construction(mut self, ef_construction: usize) -> Self {
        self.ef_construction = ef_construction;
        self
    }

    pub fn with_ef_search(mut self, ef_search: usize) -> Self {
        self.ef_search = ef_search;
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Set the metric from its textual name (`cosine`, `l2`, `ip`, ...).
    pub fn with_metric_name(mut self, name: &str) -> Result<Self, EngineError> {
        self.metric = name.parse()?;
        Ok(self)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_elements == 0 {
            return Err(EngineError::InvalidConfig(
                "max_elements must be positive".into(),
            ));
        }
        // ml = 1 / ln(m) is undefined for m < 2
        if self.m < 2 {
            return Err(EngineError::InvalidConfig(format!(
                "m must be at least 2, got {}",
                self.m
            )));
        }
        if self.ef_construction == 0 {
            return Err(EngineError::InvalidConfig(
                "ef_construction must be positive".into(),
            ));
        }
        if self.ef_search == 0 {
            return Err(EngineError::InvalidConfig(
                "ef_search must be positive".into(),
            ));
        }
        Ok(())
    }
}
