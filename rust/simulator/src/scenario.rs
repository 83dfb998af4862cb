//! TOML scenario format for simulation runs.
//!
//! A scenario names a run, optionally fixes its seed, and carries the nested
//! parameter mapping under `[params.<category>]` tables:
//!
//! ```toml
//! name = "null_hypothesis"
//! seed = 7
//!
//! [params.word]
//! concept = 500
//! task = [0, 10, 20]
//!
//! [params.n]
//! participant = 10
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use wiscs_types::NestedParams;

use crate::error::{SimError, SimResult};
use crate::generator::DataGenerator;

/// A simulation scenario loaded from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Seed for reproducible runs. `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Nested parameters, validated when a generator is built.
    pub params: NestedParams,
}

impl Scenario {
    /// Load a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Scenario`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SimError::Scenario(format!("read {}: {e}", path.display())))?;
        Self::parse(&content)
    }

    /// Parse a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Scenario`] if parsing fails.
    pub fn parse(s: &str) -> SimResult<Self> {
        toml::from_str(s).map_err(|e| SimError::Scenario(format!("parse TOML: {e}")))
    }

    /// Build a generator for this scenario.
    ///
    /// `seed` overrides the scenario's own seed.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Param`] if the parameters are invalid.
    pub fn generator(&self, seed: Option<u64>) -> SimResult<DataGenerator> {
        let generator = DataGenerator::new(&self.params)?;
        Ok(match seed.or(self.seed) {
            Some(seed) => generator.with_seed(seed),
            None => generator,
        })
    }
}
