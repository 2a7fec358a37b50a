//! Simulation domain: an axis-aligned box, optionally periodic per axis.
//!
//! Only the first `dim` axes are meaningful. Positions still use `Vec3`;
//! components beyond `dim` are ignored by the grid and expected to be zero.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use fibra_types::constants::REAL_EPSILON;
use fibra_types::{FibraError, FibraResult};

use crate::modulo::Modulo;

/// Axis-aligned simulation domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    /// Lower corner.
    pub inf: Vec3,
    /// Upper corner.
    pub sup: Vec3,
    /// Wrap-around flag per axis.
    pub periodic: [bool; 3],
    /// Spatial dimension (1, 2 or 3).
    pub dim: u8,
}

impl Domain {
    /// Creates a non-periodic box.
    pub fn new(inf: Vec3, sup: Vec3, dim: u8) -> Self {
        Self {
            inf,
            sup,
            periodic: [false; 3],
            dim,
        }
    }

    /// Creates a box centred on the origin with the given half-widths.
    pub fn centered(half: Vec3, dim: u8) -> Self {
        Self::new(-half, half, dim)
    }

    /// Creates a box periodic along every active axis.
    pub fn periodic_box(inf: Vec3, sup: Vec3, dim: u8) -> Self {
        let mut domain = Self::new(inf, sup, dim);
        for d in 0..usize::from(dim.min(3)) {
            domain.periodic[d] = true;
        }
        domain
    }

    /// Sets the periodicity of one axis.
    pub fn with_periodic(mut self, axis: usize, periodic: bool) -> Self {
        if axis < 3 {
            self.periodic[axis] = periodic;
        }
        self
    }

    /// Number of active axes as `usize`.
    #[inline]
    pub fn dims(&self) -> usize {
        usize::from(self.dim.min(3))
    }

    /// Returns true if `axis` is active and wraps around.
    #[inline]
    pub fn is_periodic(&self, axis: usize) -> bool {
        axis < self.dims() && self.periodic[axis]
    }

    /// Size of the box along each axis.
    pub fn extent(&self) -> Vec3 {
        self.sup - self.inf
    }

    /// Folding operator for this domain's periodic axes.
    pub fn modulo(&self) -> Modulo {
        let mut periods = [None; 3];
        for (d, period) in periods.iter_mut().enumerate().take(self.dims()) {
            if self.periodic[d] {
                *period = Some(self.sup[d] - self.inf[d]);
            }
        }
        Modulo::new(periods)
    }

    /// Checks the dimension and the bounds of every active axis.
    ///
    /// Active axes need a positive extent; axes beyond `dim` are not checked.
    pub fn validate(&self) -> FibraResult<()> {
        if !(1..=3).contains(&self.dim) {
            return Err(FibraError::InvalidConfig(format!(
                "space dimension must be 1, 2 or 3 (got {})",
                self.dim
            )));
        }
        for d in 0..self.dims() {
            let (lo, hi) = (self.inf[d], self.sup[d]);
            if !lo.is_finite() || !hi.is_finite() {
                return Err(FibraError::InvalidConfig(format!(
                    "space boundaries along axis {d} are not finite"
                )));
            }
            if hi < lo {
                return Err(FibraError::InvalidConfig(format!(
                    "invalid space boundaries along axis {d}: [{lo}, {hi}]"
                )));
            }
            if hi - lo <= REAL_EPSILON {
                let what = if self.periodic[d] { "period" } else { "extent" };
                return Err(FibraError::InvalidConfig(format!(
                    "axis {d} has a degenerate {what} ({})",
                    hi - lo
                )));
            }
        }
        Ok(())
    }
}
