//! Property records shared by objects of the same type.
//!
//! The `steric` field is a pane bitmask: bit `p - 1` set means the
//! object takes part in pane `p`. Zero disables steric interactions.

use serde::{Deserialize, Serialize};

use fibra_types::{FibraError, FibraResult};

/// Properties shared by a family of filaments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiberProp {
    /// Human-readable name.
    pub name: String,
    /// Pane bitmask (0 = no steric interaction).
    #[serde(default)]
    pub steric: u8,
    /// Equilibrium radius of the filament backbone.
    #[serde(default)]
    pub steric_radius: f32,
    /// Extra distance beyond the radius over which weak attraction acts.
    #[serde(default)]
    pub steric_range: f32,
    /// Target segment length.
    pub segmentation: f32,
}

/// Properties shared by a family of beads, spheres or solids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyProp {
    /// Human-readable name.
    pub name: String,
    /// Pane bitmask (0 = no steric interaction).
    #[serde(default)]
    pub steric: u8,
    /// Extra distance beyond the radius over which weak attraction acts.
    #[serde(default)]
    pub steric_range: f32,
}

impl FiberProp {
    /// Creates a filament property with steric interactions in pane 1.
    pub fn new(name: impl Into<String>, segmentation: f32, steric_radius: f32) -> Self {
        Self {
            name: name.into(),
            steric: 1,
            steric_radius,
            steric_range: 0.0,
            segmentation,
        }
    }

    /// Sets the extra attraction range.
    pub fn with_range(mut self, range: f32) -> Self {
        self.steric_range = range;
        self
    }

    /// Sets the pane bitmask.
    pub fn with_panes(mut self, mask: u8) -> Self {
        self.steric = mask;
        self
    }

    /// Returns true if the filaments take part in at least one pane.
    #[inline]
    pub fn has_steric(&self) -> bool {
        self.steric != 0
    }

    /// Checks that lengths are finite and non-negative.
    pub fn validate(&self) -> FibraResult<()> {
        if !(self.segmentation.is_finite() && self.segmentation > 0.0) {
            return Err(FibraError::InvalidConfig(format!(
                "{}:segmentation must be positive",
                self.name
            )));
        }
        check_length(&self.name, "steric_radius", self.steric_radius)?;
        check_length(&self.name, "steric_range", self.steric_range)
    }
}

impl BodyProp {
    /// Creates a body property with steric interactions in pane 1.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steric: 1,
            steric_range: 0.0,
        }
    }

    /// Sets the extra attraction range.
    pub fn with_range(mut self, range: f32) -> Self {
        self.steric_range = range;
        self
    }

    /// Sets the pane bitmask.
    pub fn with_panes(mut self, mask: u8) -> Self {
        self.steric = mask;
        self
    }

    /// Returns true if the bodies take part in at least one pane.
    #[inline]
    pub fn has_steric(&self) -> bool {
        self.steric != 0
    }

    /// Checks that the range is finite and non-negative.
    pub fn validate(&self) -> FibraResult<()> {
        check_length(&self.name, "steric_range", self.steric_range)
    }
}

fn check_length(owner: &str, field: &str, value: f32) -> FibraResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(FibraError::InvalidConfig(format!(
            "{owner}:{field} must be a non-negative number (got {value})"
        )))
    }
}
