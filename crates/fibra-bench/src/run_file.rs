//! TOML run files for the `fibra run` command.
//!
//! ```toml
//! scenario = "aster"
//! steps = 10
//!
//! [steric]
//! stiffness_push = 250.0
//! parallel = true
//! ```

use serde::{Deserialize, Serialize};

use fibra_steric::StericConfig;
use fibra_types::{FibraError, FibraResult};

use crate::scenarios::{Scenario, ScenarioKind};

/// A scenario selection plus overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunFile {
    /// Scenario name, as in [`ScenarioKind::name`].
    pub scenario: String,
    /// Passes to run; the scenario default when absent.
    #[serde(default)]
    pub steps: Option<u32>,
    /// Jitter seed; the scenario default when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Replaces the scenario's steric configuration when present.
    #[serde(default)]
    pub steric: Option<StericConfig>,
}

impl RunFile {
    /// Parses a run file from TOML text.
    pub fn from_toml(text: &str) -> FibraResult<Self> {
        toml::from_str(text).map_err(|e| FibraError::Serialization(e.to_string()))
    }

    /// Reads and parses a run file.
    pub fn load(path: &str) -> FibraResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Builds the scenario this file describes.
    pub fn scenario(&self) -> FibraResult<Scenario> {
        let kind = ScenarioKind::from_name(&self.scenario).ok_or_else(|| {
            let names: Vec<&str> = ScenarioKind::all().iter().map(|k| k.name()).collect();
            FibraError::InvalidConfig(format!(
                "unknown scenario '{}' (available: {})",
                self.scenario,
                names.join(", ")
            ))
        })?;

        let mut scenario = Scenario::from_kind(kind)?;
        if let Some(steps) = self.steps {
            scenario = scenario.with_steps(steps);
        }
        if let Some(seed) = self.seed {
            scenario = scenario.with_seed(seed);
        }
        if let Some(config) = &self.steric {
            config.validate()?;
            config.params()?;
            scenario = scenario.with_config(config.clone());
        }
        Ok(scenario)
    }
}
