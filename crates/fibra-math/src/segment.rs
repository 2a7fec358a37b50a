//! Straight segment geometry: projections and closest approach.
//!
//! Abscissas are measured in length units from the first endpoint,
//! so a point projects inside the segment when `0 <= abscissa <= len`.
//! Displacements between *different* objects are folded with the
//! supplied [`Modulo`]; the segment itself is never folded.

use glam::Vec3;

use fibra_types::constants::REAL_EPSILON;

use crate::modulo::Modulo;

/// A straight segment between two positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// First endpoint.
    pub p1: Vec3,
    /// Second endpoint.
    pub p2: Vec3,
    len: f32,
    dir: Vec3,
}

/// Result of projecting a point on the line carrying a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Signed distance along the segment, from `p1`.
    pub abscissa: f32,
    /// Squared distance between the point and the line.
    pub dist_sqr: f32,
}

/// Closest approach between the lines carrying two segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Approach {
    /// Abscissa of the closest point on the first segment.
    pub a: f32,
    /// Abscissa of the closest point on the second segment.
    pub b: f32,
    /// Squared distance between the two closest points.
    pub dist_sqr: f32,
}

impl Segment {
    /// Creates a segment from its endpoints.
    pub fn new(p1: Vec3, p2: Vec3) -> Self {
        let diff = p2 - p1;
        let len = diff.length();
        let dir = if len > REAL_EPSILON { diff / len } else { Vec3::ZERO };
        Self { p1, p2, len, dir }
    }

    /// Vector from `p1` to `p2`.
    #[inline]
    pub fn diff(&self) -> Vec3 {
        self.p2 - self.p1
    }

    /// Length of the segment.
    #[inline]
    pub fn len(&self) -> f32 {
        self.len
    }

    /// Returns true if the segment is shorter than `REAL_EPSILON`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len <= REAL_EPSILON
    }

    /// Unit direction from `p1` to `p2` (zero for a degenerate segment).
    #[inline]
    pub fn dir(&self) -> Vec3 {
        self.dir
    }

    /// Midpoint.
    #[inline]
    pub fn center(&self) -> Vec3 {
        0.5 * (self.p1 + self.p2)
    }

    /// Position at abscissa `abs` along the segment.
    #[inline]
    pub fn at(&self, abs: f32) -> Vec3 {
        self.p1 + self.dir * abs
    }

    /// Returns true if `abs` lies within `[0, len]`.
    #[inline]
    pub fn within(&self, abs: f32) -> bool {
        (0.0..=self.len).contains(&abs)
    }

    /// Projects `w` on the infinite line carrying the segment.
    pub fn project(&self, w: Vec3, modulo: &Modulo) -> Projection {
        let vab = modulo.fold(w - self.p1);
        let abscissa = vab.dot(self.dir);
        let dist_sqr = (vab.length_squared() - abscissa * abscissa).max(0.0);
        Projection { abscissa, dist_sqr }
    }

    /// Closest approach between the lines carrying `self` and `other`.
    ///
    /// Returns `None` for parallel (or degenerate) segments, whose
    /// contacts are fully described by endpoint projections.
    pub fn closest_approach(&self, other: &Segment, modulo: &Modulo) -> Option<Approach> {
        let u = self.dir;
        let v = other.dir;
        let c = u.dot(v);
        let denom = 1.0 - c * c;
        if denom <= REAL_EPSILON || self.is_empty() || other.is_empty() {
            return None;
        }
        let w0 = modulo.fold(self.p1 - other.p1);
        let uw = u.dot(w0);
        let vw = v.dot(w0);
        let a = (c * vw - uw) / denom;
        let b = vw + c * a;
        let gap = w0 + u * a - v * b;
        Some(Approach {
            a,
            b,
            dist_sqr: gap.length_squared(),
        })
    }
}
