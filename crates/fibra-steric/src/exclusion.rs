//! Structural exclusion of primitive pairs.
//!
//! Pairs that belong to the same rigid or connected structure never
//! receive a steric link: two vertices of one body, a point and a
//! segment of one assembly, and a segment with itself or its direct
//! neighbours along the same filament.

use crate::registry::{PointRecord, SegmentRecord};

/// Two point records of the same body.
#[inline]
pub fn points_adjacent(a: &PointRecord, b: &PointRecord) -> bool {
    a.point.body == b.point.body
}

/// A point and a segment of the same body or the same assembly.
#[inline]
pub fn point_segment_adjacent(a: &PointRecord, b: &SegmentRecord) -> bool {
    if a.point.body == b.fiber {
        return true;
    }
    matches!((a.group, b.group), (Some(x), Some(y)) if x == y)
}

/// The same segment, or consecutive segments of one filament.
#[inline]
pub fn segments_adjacent(a: &SegmentRecord, b: &SegmentRecord) -> bool {
    a.fiber == b.fiber && a.segment.abs_diff(b.segment) <= 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::PointRef;
    use fibra_types::{BodyId, GroupId};
    use glam::Vec3;

    fn point(body: u32, index: u32, group: Option<u32>) -> PointRecord {
        PointRecord {
            point: PointRef {
                body: BodyId(body),
                index,
            },
            group: group.map(GroupId),
            panes: 0,
            pos: Vec3::ZERO,
            radius: 0.1,
            range: 0.1,
        }
    }

    fn segment(fiber: u32, segment: u32, group: Option<u32>) -> SegmentRecord {
        SegmentRecord {
            fiber: BodyId(fiber),
            segment,
            group: group.map(GroupId),
            panes: 0,
            radius: 0.1,
            range: 0.1,
        }
    }

    #[test]
    fn vertices_of_one_body() {
        assert!(points_adjacent(&point(1, 0, None), &point(1, 3, None)));
        assert!(!points_adjacent(&point(1, 0, Some(2)), &point(4, 0, Some(2))));
    }

    #[test]
    fn point_and_segment_need_shared_group() {
        assert!(point_segment_adjacent(&point(1, 0, Some(7)), &segment(2, 0, Some(7))));
        assert!(!point_segment_adjacent(&point(1, 0, Some(7)), &segment(2, 0, Some(8))));
        assert!(!point_segment_adjacent(&point(1, 0, None), &segment(2, 0, None)));
        assert!(!point_segment_adjacent(&point(1, 0, Some(7)), &segment(2, 0, None)));
    }

    #[test]
    fn neighbouring_segments() {
        assert!(segments_adjacent(&segment(3, 4, None), &segment(3, 4, None)));
        assert!(segments_adjacent(&segment(3, 4, None), &segment(3, 5, None)));
        assert!(segments_adjacent(&segment(3, 5, None), &segment(3, 4, None)));
        assert!(!segments_adjacent(&segment(3, 4, None), &segment(3, 6, None)));
        assert!(!segments_adjacent(&segment(3, 4, None), &segment(5, 4, None)));
    }
}
