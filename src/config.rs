//! Harness configuration
//!
//! Loaded from an optional TOML file; CLI flags override individual fields.
//!
//! ```toml
//! # scc-fuzz.toml
//! node_count = 100000
//! degree_bound = 6
//! seed = 42
//! iterations = 50
//! parallel = true
//! reference = "kosaraju"
//! artifact_dir = "scc-failures"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::errors::{ConfigError, GraphError};
use crate::reference::ReferenceKind;

/// Settings for one differential fuzzing session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Nodes per generated graph (`N`)
    pub node_count: usize,
    /// Exclusive out-degree bound (`k`)
    pub degree_bound: usize,
    /// Base seed; iteration `i` uses `seed + i`
    pub seed: u64,
    /// Number of graphs to generate and compare
    pub iterations: u64,
    /// Sweep iterations across rayon workers
    pub parallel: bool,
    pub reference: ReferenceKind,
    /// Where reproductions are written, one subdirectory per failing seed
    pub artifact_dir: PathBuf,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            node_count: 10_000,
            degree_bound: 5,
            seed: 0,
            iterations: 1,
            parallel: false,
            reference: ReferenceKind::Kosaraju,
            artifact_dir: PathBuf::from("scc-failures"),
        }
    }
}

impl HarnessConfig {
    /// Read a TOML config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<HarnessConfig, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: HarnessConfig = toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded harness config from {}", path.display());
        Ok(config)
    }

    /// Reject settings that cannot produce a single comparison.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.iterations == 0 {
            return Err(GraphError::InvalidParameter(
                "iterations must be at least 1".to_string(),
            ));
        }
        if self.node_count > 0 && self.degree_bound > self.node_count + 1 {
            return Err(GraphError::InvalidParameter(format!(
                "degree_bound {} exceeds node_count + 1 = {}",
                self.degree_bound,
                self.node_count + 1
            )));
        }
        Ok(())
    }

    /// Seed used for iteration `i`.
    pub fn seed_for(&self, iteration: u64) -> u64 {
        self.seed.wrapping_add(iteration)
    }
}
