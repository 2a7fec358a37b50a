//! Minimum-image convention for periodic boundaries.

use glam::Vec3;

/// Folds displacement vectors along periodic axes.
///
/// A displacement `v` between two positions is replaced by the shortest
/// equivalent vector across the wrap, i.e. each periodic component is
/// brought into `[-L/2, L/2]` where `L` is the period of that axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Modulo {
    period: [f32; 3],
    active: [bool; 3],
}

impl Modulo {
    /// A modulo with no periodic axis (folding is the identity).
    pub fn none() -> Self {
        Self::default()
    }

    /// Builds a modulo from optional per-axis periods.
    pub fn new(periods: [Option<f32>; 3]) -> Self {
        let mut modulo = Self::default();
        for (d, p) in periods.iter().enumerate() {
            if let Some(p) = *p {
                if p > 0.0 {
                    modulo.period[d] = p;
                    modulo.active[d] = true;
                }
            }
        }
        modulo
    }

    /// Returns true if any axis is periodic.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.iter().any(|&a| a)
    }

    /// Returns true if `axis` is periodic.
    #[inline]
    pub fn is_periodic(&self, axis: usize) -> bool {
        axis < 3 && self.active[axis]
    }

    /// Period of `axis`, if it wraps.
    pub fn period(&self, axis: usize) -> Option<f32> {
        self.is_periodic(axis).then(|| self.period[axis])
    }

    /// Returns the minimum-image equivalent of displacement `v`.
    #[inline]
    pub fn fold(&self, mut v: Vec3) -> Vec3 {
        for d in 0..3 {
            if self.active[d] {
                let p = self.period[d];
                v[d] -= p * (v[d] / p).round();
            }
        }
        v
    }
}
