//! Per-cell, per-pane storage of steric primitives.
//!
//! Records are rebuilt from scratch every pass. Slots are flat
//! (`cell * pane_count + pane - 1`) and remember whether they were
//! touched, so clearing costs scale with the number of records rather
//! than the number of cells. Slot vectors keep their capacity.

use glam::Vec3;

use fibra_types::{BodyId, FibraError, FibraResult, GroupId};

use crate::link::PointRef;

/// A spherical steric primitive (bead, sphere centre, solid vertex).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointRecord {
    /// Vertex handle used when emitting links.
    pub point: PointRef,
    /// Composite assembly the owner belongs to, if any.
    pub group: Option<GroupId>,
    /// Every pane the primitive is inserted into (bit `p - 1` for pane `p`).
    /// The insertion pane is added to it by the store.
    pub panes: u8,
    /// Position at insertion time.
    pub pos: Vec3,
    /// Contact radius.
    pub radius: f32,
    /// Extended reach (`radius` plus attraction range).
    pub range: f32,
}

/// A filament segment. Its geometry is read back from the filament
/// when the pair is tested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentRecord {
    /// Owning filament.
    pub fiber: BodyId,
    /// Segment index along the filament.
    pub segment: u32,
    /// Composite assembly the filament belongs to, if any.
    pub group: Option<GroupId>,
    /// Every pane the segment is inserted into, as for [`PointRecord::panes`].
    pub panes: u8,
    /// Contact radius.
    pub radius: f32,
    /// Extended reach (`radius` plus attraction range).
    pub range: f32,
}

impl SegmentRecord {
    /// Total order used to break symmetric tip–tip ties.
    #[inline]
    pub fn key(&self) -> (BodyId, u32) {
        (self.fiber, self.segment)
    }
}

/// Mask bit of pane `p` (1-based).
#[inline]
pub(crate) fn pane_bit(pane: u8) -> u8 {
    match pane {
        0 => 0,
        p => 1u8.checked_shl(u32::from(p - 1)).unwrap_or(0),
    }
}

/// Checks that a radius/range pair is usable.
pub(crate) fn check_reach(radius: f32, range: f32) -> FibraResult<()> {
    if !(radius.is_finite() && radius >= 0.0) {
        return Err(FibraError::InvalidConfig(format!(
            "steric radius must be a non-negative number (got {radius})"
        )));
    }
    if !(range.is_finite() && range >= radius) {
        return Err(FibraError::InvalidConfig(format!(
            "steric range ({range}) must be at least the radius ({radius})"
        )));
    }
    Ok(())
}

/// Storage for the primitives of one pass.
#[derive(Debug, Clone, Default)]
pub struct CellStore {
    pane_count: usize,
    cell_count: usize,
    points: Vec<Vec<PointRecord>>,
    segments: Vec<Vec<SegmentRecord>>,
    touched: Vec<usize>,
    nb_points: usize,
    nb_segments: usize,
}

impl CellStore {
    /// Creates storage for `cell_count` cells and `pane_count` panes.
    pub fn new(cell_count: usize, pane_count: u8) -> Self {
        let mut store = Self::default();
        store.reshape(cell_count, pane_count);
        store
    }

    /// Resizes to a new grid, dropping every record.
    pub fn reshape(&mut self, cell_count: usize, pane_count: u8) {
        let panes = usize::from(pane_count);
        let slots = cell_count * panes;
        self.clear();
        self.pane_count = panes;
        self.cell_count = cell_count;
        self.points.resize_with(slots, Vec::new);
        self.segments.resize_with(slots, Vec::new);
    }

    /// Number of panes.
    #[inline]
    pub fn pane_count(&self) -> usize {
        self.pane_count
    }

    /// Number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// Total point records.
    #[inline]
    pub fn point_count(&self) -> usize {
        self.nb_points
    }

    /// Total segment records.
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.nb_segments
    }

    /// Flat slot of `(cell, pane)`, validating the pane.
    fn slot(&self, cell: usize, pane: u8) -> FibraResult<usize> {
        let p = usize::from(pane);
        if p == 0 || p > self.pane_count {
            return Err(FibraError::InvalidConfig(format!(
                "steric pane {pane} is out-of-range (pane_count = {})",
                self.pane_count
            )));
        }
        if cell >= self.cell_count {
            return Err(FibraError::InvariantViolation(format!(
                "cell {cell} is outside a grid of {} cells",
                self.cell_count
            )));
        }
        Ok(cell * self.pane_count + p - 1)
    }

    fn touch(&mut self, slot: usize) {
        if self.points[slot].is_empty() && self.segments[slot].is_empty() {
            self.touched.push(slot);
        }
    }

    /// Appends a point record to `(cell, pane)`.
    pub fn push_point(&mut self, cell: usize, pane: u8, mut rec: PointRecord) -> FibraResult<()> {
        let slot = self.slot(cell, pane)?;
        rec.panes |= pane_bit(pane);
        self.touch(slot);
        self.points[slot].push(rec);
        self.nb_points += 1;
        Ok(())
    }

    /// Appends a segment record to `(cell, pane)`.
    pub fn push_segment(&mut self, cell: usize, pane: u8, mut rec: SegmentRecord) -> FibraResult<()> {
        let slot = self.slot(cell, pane)?;
        rec.panes |= pane_bit(pane);
        self.touch(slot);
        self.segments[slot].push(rec);
        self.nb_segments += 1;
        Ok(())
    }

    /// Point records of `(cell, pane)`; empty for an invalid pane.
    #[inline]
    pub fn points(&self, cell: usize, pane: u8) -> &[PointRecord] {
        match self.slot(cell, pane) {
            Ok(slot) => &self.points[slot],
            Err(_) => &[],
        }
    }

    /// Segment records of `(cell, pane)`; empty for an invalid pane.
    #[inline]
    pub fn segments(&self, cell: usize, pane: u8) -> &[SegmentRecord] {
        match self.slot(cell, pane) {
            Ok(slot) => &self.segments[slot],
            Err(_) => &[],
        }
    }

    /// Returns true if no record is stored.
    pub fn is_empty(&self) -> bool {
        self.touched.is_empty()
    }

    /// Drops every record, keeping allocations.
    pub fn clear(&mut self) {
        for slot in self.touched.drain(..) {
            self.points[slot].clear();
            self.segments[slot].clear();
        }
        self.nb_points = 0;
        self.nb_segments = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(body: u32) -> PointRecord {
        PointRecord {
            point: PointRef {
                body: BodyId(body),
                index: 0,
            },
            group: None,
            panes: 0,
            pos: Vec3::ZERO,
            radius: 0.5,
            range: 0.5,
        }
    }

    #[test]
    fn panes_are_separate_lists() {
        let mut store = CellStore::new(4, 2);
        store.push_point(1, 1, point(0)).unwrap();
        store.push_point(1, 2, point(1)).unwrap();
        store.push_point(1, 2, point(2)).unwrap();
        assert_eq!(store.points(1, 1).len(), 1);
        assert_eq!(store.points(1, 2).len(), 2);
        assert_eq!(store.point_count(), 3);
        assert_eq!(store.points(1, 2)[0].panes, 0b10);
    }

    #[test]
    fn pane_bits() {
        assert_eq!(pane_bit(1), 0b1);
        assert_eq!(pane_bit(8), 0b1000_0000);
        assert_eq!(pane_bit(0), 0);
        assert_eq!(pane_bit(9), 0);
    }

    #[test]
    fn out_of_range_pane_is_config_error() {
        let mut store = CellStore::new(4, 2);
        assert!(matches!(store.push_point(0, 0, point(0)), Err(FibraError::InvalidConfig(_))));
        assert!(matches!(store.push_point(0, 3, point(0)), Err(FibraError::InvalidConfig(_))));
    }

    #[test]
    fn clear_empties_touched_slots_only() {
        let mut store = CellStore::new(8, 1);
        store.push_point(3, 1, point(0)).unwrap();
        store.push_point(5, 1, point(1)).unwrap();
        assert_eq!(store.touched.len(), 2);
        store.clear();
        assert!(store.is_empty());
        assert!(store.points(3, 1).is_empty());
        assert!(store.points[3].capacity() > 0);
        assert_eq!(store.point_count(), 0);
    }

    #[test]
    fn reshape_shrinks_and_grows() {
        let mut store = CellStore::new(8, 2);
        store.push_point(7, 2, point(0)).unwrap();
        store.reshape(2, 1);
        assert_eq!(store.points.len(), 2);
        assert!(store.points(1, 1).is_empty());
        store.reshape(10, 3);
        assert_eq!(store.points.len(), 30);
    }

    #[test]
    fn reach_must_cover_radius() {
        assert!(check_reach(0.5, 0.5).is_ok());
        assert!(check_reach(0.5, 0.4).is_err());
        assert!(check_reach(-1.0, 1.0).is_err());
    }
}
