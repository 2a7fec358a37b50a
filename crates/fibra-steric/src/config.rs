//! Steric engine configuration.
//!
//! Global parameters of the steric pass: the two stiffness regimes,
//! grid sizing limits and the pane layout.

use serde::{Deserialize, Serialize};

use fibra_types::constants::{DEFAULT_MAX_CELLS, DEFAULT_PANE_COUNT, MAX_PANES};
use fibra_types::{FibraError, FibraResult};

use crate::link::Regime;

/// Configuration for the steric engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StericConfig {
    /// Stiffness of repulsive links between overlapping primitives. Required.
    pub stiffness_push: Option<f32>,

    /// Stiffness of attractive links between primitives within extended range.
    pub stiffness_pull: f32,

    /// User override of the minimum grid cell width.
    ///
    /// The engine never uses a width below the estimated contact range,
    /// and may enlarge it to respect `max_cells`.
    pub max_range: Option<f32>,

    /// Hard cap on the number of grid cells.
    pub max_cells: usize,

    /// Number of independent interaction panes (1–8).
    pub pane_count: u8,

    /// Pairs of distinct panes whose objects also interact with each other.
    pub pane_pairs: Vec<[u8; 2]>,

    /// Traverse cells on the rayon thread pool.
    pub parallel: bool,

    /// Verify at insertion that every primitive fits the grid resolution.
    pub check_range: bool,
}

/// The two stiffness values used during emission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StericParams {
    /// Stiffness for overlapping pairs.
    pub push: f32,
    /// Stiffness for pairs within extended range.
    pub pull: f32,
}

impl Default for StericConfig {
    fn default() -> Self {
        Self {
            stiffness_push: None,
            stiffness_pull: 0.0,
            max_range: None,
            max_cells: DEFAULT_MAX_CELLS,
            pane_count: DEFAULT_PANE_COUNT,
            pane_pairs: Vec::new(),
            parallel: false,
            check_range: false,
        }
    }
}

impl StericConfig {
    /// Creates a config with the given push and pull stiffness.
    pub fn with_stiffness(push: f32, pull: f32) -> Self {
        Self {
            stiffness_push: Some(push),
            stiffness_pull: pull,
            ..Default::default()
        }
    }

    /// Builder: sets the user minimum cell width.
    pub fn with_max_range(mut self, range: f32) -> Self {
        self.max_range = Some(range);
        self
    }

    /// Builder: sets the cell cap.
    pub fn with_max_cells(mut self, max_cells: usize) -> Self {
        self.max_cells = max_cells;
        self
    }

    /// Builder: sets the number of panes.
    pub fn with_panes(mut self, pane_count: u8) -> Self {
        self.pane_count = pane_count;
        self
    }

    /// Builder: lets objects of `p1` and `p2` see each other.
    pub fn with_pane_pair(mut self, p1: u8, p2: u8) -> Self {
        self.pane_pairs.push([p1, p2]);
        self
    }

    /// Builder: enables or disables parallel traversal.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Checks every field; errors are configuration errors.
    pub fn validate(&self) -> FibraResult<()> {
        self.params()?;
        if let Some(range) = self.max_range {
            if !(range.is_finite() && range > 0.0) {
                return Err(FibraError::InvalidConfig(format!(
                    "steric max_range must be positive (got {range})"
                )));
            }
        }
        if self.max_cells == 0 {
            return Err(FibraError::InvalidConfig(
                "steric max_cells must be at least 1".into(),
            ));
        }
        if self.pane_count == 0 || self.pane_count > MAX_PANES {
            return Err(FibraError::InvalidConfig(format!(
                "steric pane_count must be within 1..={MAX_PANES} (got {})",
                self.pane_count
            )));
        }
        for (i, &[p1, p2]) in self.pane_pairs.iter().enumerate() {
            if self.pane_pairs[..i]
                .iter()
                .any(|&[q1, q2]| (q1, q2) == (p1, p2) || (q1, q2) == (p2, p1))
            {
                return Err(FibraError::InvalidConfig(format!(
                    "steric pane pair [{p1}, {p2}] is listed twice"
                )));
            }
            if p1 == p2 {
                return Err(FibraError::InvalidConfig(format!(
                    "steric pane pair [{p1}, {p2}] must name two different panes"
                )));
            }
            for p in [p1, p2] {
                if p == 0 || p > self.pane_count {
                    return Err(FibraError::InvalidConfig(format!(
                        "steric pane {p} is out-of-range (pane_count = {})",
                        self.pane_count
                    )));
                }
            }
        }
        Ok(())
    }

    /// Extracts the stiffness pair, failing if push stiffness is unset.
    pub fn params(&self) -> FibraResult<StericParams> {
        let push = self.stiffness_push.ok_or_else(|| {
            FibraError::InvalidConfig("steric stiffness_push must be defined".into())
        })?;
        let params = StericParams {
            push,
            pull: self.stiffness_pull,
        };
        params.validate()?;
        Ok(params)
    }
}

impl StericParams {
    /// Stiffness for the given regime.
    #[inline]
    pub fn stiffness(&self, regime: Regime) -> f32 {
        match regime {
            Regime::Push => self.push,
            Regime::Pull => self.pull,
        }
    }

    /// Both stiffnesses must be finite and non-negative.
    pub fn validate(&self) -> FibraResult<()> {
        for (name, k) in [("stiffness_push", self.push), ("stiffness_pull", self.pull)] {
            if !(k.is_finite() && k >= 0.0) {
                return Err(FibraError::InvalidConfig(format!(
                    "steric {name} must be a non-negative number (got {k})"
                )));
            }
        }
        Ok(())
    }
}
