//! Movable objects.
//!
//! Objects own their vertex positions; the steric engine only ever
//! refers to them by [`BodyId`] and vertex/segment index.

use serde::{Deserialize, Serialize};

use fibra_math::{Segment, Vec3};
use fibra_types::constants::REAL_EPSILON;
use fibra_types::{BodyId, FibraError, FibraResult, GroupId, PropId};

/// A piecewise-linear filament.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fiber {
    /// Handle assigned by the scene.
    pub id: BodyId,
    /// Index into the scene's filament properties.
    pub prop: PropId,
    /// Composite assembly this filament belongs to.
    pub group: Option<GroupId>,
    /// Vertex positions, from minus end to plus end.
    pub points: Vec<Vec3>,
}

/// A single point-like particle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bead {
    pub id: BodyId,
    pub prop: PropId,
    pub group: Option<GroupId>,
    pub position: Vec3,
    pub radius: f32,
}

/// A spherical body. Only its centre takes part in steric interactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sphere {
    pub id: BodyId,
    pub prop: PropId,
    pub group: Option<GroupId>,
    pub center: Vec3,
    pub radius: f32,
}

/// A rigid cloud of points; points with a positive radius are steric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solid {
    pub id: BodyId,
    pub prop: PropId,
    pub group: Option<GroupId>,
    pub points: Vec<Vec3>,
    pub radii: Vec<f32>,
}

impl Fiber {
    /// Number of vertices.
    #[inline]
    pub fn nb_points(&self) -> usize {
        self.points.len()
    }

    /// Number of segments (`nb_points - 1`).
    #[inline]
    pub fn nb_segments(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Segment `n`, joining vertices `n` and `n + 1`.
    #[inline]
    pub fn segment(&self, n: usize) -> Segment {
        Segment::new(self.points[n], self.points[n + 1])
    }

    /// Length of the longest segment.
    pub fn segmentation(&self) -> f32 {
        self.points
            .windows(2)
            .map(|w| w[0].distance(w[1]))
            .fold(0.0, f32::max)
    }

    /// Total contour length.
    pub fn length(&self) -> f32 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    /// Checks that the filament has at least one non-degenerate segment
    /// and only finite coordinates.
    pub fn validate(&self) -> FibraResult<()> {
        if self.points.len() < 2 {
            return Err(FibraError::InvalidGeometry(format!(
                "fiber {} has {} vertices (need at least 2)",
                self.id.0,
                self.points.len()
            )));
        }
        if let Some(i) = self.points.iter().position(|p| !p.is_finite()) {
            return Err(FibraError::InvalidGeometry(format!(
                "fiber {} vertex {i} is not finite",
                self.id.0
            )));
        }
        for n in 0..self.nb_segments() {
            if self.points[n].distance(self.points[n + 1]) <= REAL_EPSILON {
                return Err(FibraError::InvalidGeometry(format!(
                    "fiber {} segment {n} has zero length",
                    self.id.0
                )));
            }
        }
        Ok(())
    }
}

impl Solid {
    /// Number of points.
    #[inline]
    pub fn nb_points(&self) -> usize {
        self.points.len()
    }

    /// Checks that every point has a matching finite, non-negative radius.
    pub fn validate(&self) -> FibraResult<()> {
        if self.points.len() != self.radii.len() {
            return Err(FibraError::InvalidGeometry(format!(
                "solid {} has {} points but {} radii",
                self.id.0,
                self.points.len(),
                self.radii.len()
            )));
        }
        if self.radii.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(FibraError::InvalidGeometry(format!(
                "solid {} has a negative or non-finite radius",
                self.id.0
            )));
        }
        Ok(())
    }
}

pub(crate) fn check_radius(kind: &str, radius: f32) -> FibraResult<()> {
    if radius.is_finite() && radius >= 0.0 {
        Ok(())
    } else {
        Err(FibraError::InvalidGeometry(format!(
            "{kind} radius must be non-negative (got {radius})"
        )))
    }
}
