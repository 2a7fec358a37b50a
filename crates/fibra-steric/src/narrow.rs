//! Narrow-phase proximity tests.
//!
//! A point is a sphere of `radius`; a segment is the set of positions
//! within `radius` of it. Two primitives receive a link when their
//! distance is below the *reach* of the pair:
//!
//! - `len = ra + rb` is the contact distance and the link rest length
//! - `reach = max(range_a + rb, ra + range_b)` extends it for attraction
//!
//! Links with `dist < len` use the push stiffness, the others the pull
//! stiffness.
//!
//! Each segment claims the half-open abscissa interval `[0, len)`; the
//! last segment of a filament also claims its end. A position level with
//! an interior joint therefore belongs to exactly one segment. Positions
//! before the start of a segment are handled at the joint with the
//! previous segment, or as a tip when the segment is first.

use glam::Vec3;

use fibra_math::{Domain, Modulo, Segment};
use fibra_types::constants::REAL_EPSILON;
use fibra_types::BodyId;

use crate::config::StericParams;
use crate::link::{Anchor, Interpolation, LinkSink, PointRef, Regime};
use crate::registry::{PointRecord, SegmentRecord};

/// Read access to the current vertex positions of filaments.
///
/// Segment records store no geometry; the narrow phase reads it here.
pub trait FiberSource {
    /// Number of vertices of `fiber` (0 if unknown).
    fn vertex_count(&self, fiber: BodyId) -> usize;

    /// Position of vertex `index` of `fiber`.
    fn vertex(&self, fiber: BodyId, index: usize) -> Option<Vec3>;
}

/// A segment record with its geometry resolved for one pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FatSegment {
    pub rec: SegmentRecord,
    pub seg: Segment,
    /// Vector along the previous segment; `None` at the minus end.
    prev: Option<Vec3>,
    last: bool,
}

impl FatSegment {
    /// Reads the endpoints of `rec` from `source`.
    pub fn resolve<F: FiberSource + ?Sized>(rec: &SegmentRecord, source: &F) -> Option<Self> {
        let n = rec.segment as usize;
        let count = source.vertex_count(rec.fiber);
        if n + 1 >= count {
            return None;
        }
        let p1 = source.vertex(rec.fiber, n)?;
        let p2 = source.vertex(rec.fiber, n + 1)?;
        let prev = if n > 0 {
            Some(p1 - source.vertex(rec.fiber, n - 1)?)
        } else {
            None
        };
        Some(Self {
            rec: *rec,
            seg: Segment::new(p1, p2),
            prev,
            last: n + 2 == count,
        })
    }

    #[inline]
    fn is_first(&self) -> bool {
        self.prev.is_none()
    }

    #[inline]
    fn is_last(&self) -> bool {
        self.last
    }

    /// Whether the position at abscissa `abs` belongs to this segment.
    #[inline]
    fn claims(&self, abs: f32) -> bool {
        abs >= 0.0 && (abs < self.seg.len() || (self.last && abs <= self.seg.len()))
    }

    #[inline]
    fn vertex1(&self) -> PointRef {
        PointRef {
            body: self.rec.fiber,
            index: self.rec.segment,
        }
    }

    #[inline]
    fn vertex2(&self) -> PointRef {
        PointRef {
            body: self.rec.fiber,
            index: self.rec.segment + 1,
        }
    }

    fn tip(&self, point: PointRef, pos: Vec3) -> PointRecord {
        PointRecord {
            point,
            group: self.rec.group,
            panes: self.rec.panes,
            pos,
            radius: self.rec.radius,
            range: self.rec.range,
        }
    }

    fn interpolate(&self, abs: f32) -> Interpolation {
        let len = self.seg.len();
        let coef = if len > REAL_EPSILON {
            (abs / len).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Interpolation {
            fiber: self.rec.fiber,
            segment: self.rec.segment,
            coef,
        }
    }
}

/// Pair and link counters of one traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Tally {
    pub tested: usize,
    pub excluded: usize,
    pub push: usize,
    pub pull: usize,
}

impl Tally {
    pub fn merge(&mut self, other: Tally) {
        self.tested += other.tested;
        self.excluded += other.excluded;
        self.push += other.push;
        self.pull += other.pull;
    }
}

/// Forwards links to a sink with the stiffness of their regime.
pub(crate) struct LinkOut<'s, S: ?Sized> {
    sink: &'s mut S,
    params: StericParams,
    pub tally: Tally,
}

impl<'s, S: LinkSink + ?Sized> LinkOut<'s, S> {
    pub fn new(sink: &'s mut S, params: StericParams) -> Self {
        Self {
            sink,
            params,
            tally: Tally::default(),
        }
    }

    fn count(&mut self, regime: Regime) {
        match regime {
            Regime::Push => self.tally.push += 1,
            Regime::Pull => self.tally.pull += 1,
        }
    }

    fn long(&mut self, a: PointRef, b: PointRef, len: f32, regime: Regime) {
        self.count(regime);
        self.sink
            .add_long_link(a, b, len, self.params.stiffness(regime));
    }

    fn sliding(&mut self, a: Interpolation, b: Anchor, len: f32, regime: Regime) {
        self.count(regime);
        self.sink
            .add_sliding_link(a, b, len, self.params.stiffness(regime));
    }
}

#[inline]
fn regime(dist_sqr: f32, len: f32) -> Regime {
    if dist_sqr < len * len {
        Regime::Push
    } else {
        Regime::Pull
    }
}

#[inline]
fn pair_reach(ra: f32, range_a: f32, rb: f32, range_b: f32) -> f32 {
    (range_a + rb).max(ra + range_b)
}

/// Proximity tests for one domain.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Narrow {
    modulo: Modulo,
    crossings: bool,
}

impl Narrow {
    pub fn new(domain: &Domain) -> Self {
        Self {
            modulo: domain.modulo(),
            crossings: domain.dims() == 3,
        }
    }

    /// Sphere against sphere.
    pub fn point_point<S: LinkSink + ?Sized>(
        &self,
        a: &PointRecord,
        b: &PointRecord,
        out: &mut LinkOut<'_, S>,
    ) {
        let len = a.radius + b.radius;
        let reach = pair_reach(a.radius, a.range, b.radius, b.range);
        let d2 = self.modulo.fold(b.pos - a.pos).length_squared();
        if d2 < reach * reach {
            out.long(a.point, b.point, len, regime(d2, len));
        }
    }

    /// Sphere against a segment of a filament.
    pub fn point_segment<S: LinkSink + ?Sized>(
        &self,
        a: &PointRecord,
        b: &FatSegment,
        out: &mut LinkOut<'_, S>,
    ) {
        let len = a.radius + b.rec.radius;
        let reach = pair_reach(a.radius, a.range, b.rec.radius, b.rec.range);
        let proj = b.seg.project(a.pos, &self.modulo);

        if proj.abscissa >= 0.0 {
            if b.claims(proj.abscissa) {
                if proj.dist_sqr < reach * reach {
                    out.sliding(
                        b.interpolate(proj.abscissa),
                        Anchor::Vertex(a.point),
                        len,
                        regime(proj.dist_sqr, len),
                    );
                }
            } else if b.is_last() {
                self.point_point(a, &b.tip(b.vertex2(), b.seg.p2), out);
            }
        } else if let Some(prev) = b.prev {
            let vab = self.modulo.fold(a.pos - b.seg.p1);
            if vab.dot(prev) >= 0.0 {
                let d2 = vab.length_squared();
                if d2 < reach * reach {
                    out.long(a.point, b.vertex1(), len, regime(d2, len));
                }
            }
        } else {
            self.point_point(a, &b.tip(b.vertex1(), b.seg.p1), out);
        }
    }

    /// First vertex of `bb` against segment `aa`.
    fn vertex1_segment<S: LinkSink + ?Sized>(
        &self,
        aa: &FatSegment,
        bb: &FatSegment,
        out: &mut LinkOut<'_, S>,
    ) {
        let len = aa.rec.radius + bb.rec.radius;
        let reach = aa.rec.range + bb.rec.radius;
        let proj = aa.seg.project(bb.seg.p1, &self.modulo);

        if aa.claims(proj.abscissa) {
            if proj.dist_sqr < reach * reach {
                out.sliding(
                    aa.interpolate(proj.abscissa),
                    Anchor::Vertex(bb.vertex1()),
                    len,
                    regime(proj.dist_sqr, len),
                );
            }
        } else if proj.abscissa < 0.0 {
            let vab = self.modulo.fold(bb.seg.p1 - aa.seg.p1);
            match aa.prev {
                None => {
                    // minus tips: tested once, from the smaller record
                    if bb.is_first() && bb.rec.key() < aa.rec.key() && vab.dot(bb.seg.diff()) >= 0.0 {
                        self.tip_tip(aa, aa.vertex1(), bb, bb.vertex1(), vab, len, out);
                    }
                }
                Some(prev) => {
                    let d2 = vab.length_squared();
                    if vab.dot(prev) >= 0.0 && d2 < reach * reach {
                        out.long(aa.vertex1(), bb.vertex1(), len, regime(d2, len));
                    }
                }
            }
        }
    }

    /// Last vertex of `bb` (the plus tip of its filament) against segment `aa`.
    fn vertex2_segment<S: LinkSink + ?Sized>(
        &self,
        aa: &FatSegment,
        bb: &FatSegment,
        out: &mut LinkOut<'_, S>,
    ) {
        let len = aa.rec.radius + bb.rec.radius;
        let reach = aa.rec.range + bb.rec.radius;
        let proj = aa.seg.project(bb.seg.p2, &self.modulo);

        if aa.claims(proj.abscissa) {
            if proj.dist_sqr < reach * reach {
                out.sliding(
                    aa.interpolate(proj.abscissa),
                    Anchor::Vertex(bb.vertex2()),
                    len,
                    regime(proj.dist_sqr, len),
                );
            }
        } else if proj.abscissa < 0.0 {
            let vab = self.modulo.fold(bb.seg.p2 - aa.seg.p1);
            match aa.prev {
                None => {
                    if vab.dot(bb.seg.diff()) <= 0.0 {
                        self.tip_tip(aa, aa.vertex1(), bb, bb.vertex2(), vab, len, out);
                    }
                }
                Some(prev) => {
                    let d2 = vab.length_squared();
                    if vab.dot(prev) >= 0.0 && d2 < reach * reach {
                        out.long(aa.vertex1(), bb.vertex2(), len, regime(d2, len));
                    }
                }
            }
        } else if aa.is_last() && bb.rec.key() < aa.rec.key() {
            // plus tips: tested once, from the smaller record
            let vab = self.modulo.fold(bb.seg.p2 - aa.seg.p2);
            if vab.dot(bb.seg.diff()) <= 0.0 {
                self.tip_tip(aa, aa.vertex2(), bb, bb.vertex2(), vab, len, out);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn tip_tip<S: LinkSink + ?Sized>(
        &self,
        aa: &FatSegment,
        a: PointRef,
        bb: &FatSegment,
        b: PointRef,
        vab: Vec3,
        len: f32,
        out: &mut LinkOut<'_, S>,
    ) {
        let reach = pair_reach(aa.rec.radius, aa.rec.range, bb.rec.radius, bb.rec.range);
        let d2 = vab.length_squared();
        if d2 < reach * reach {
            out.long(a, b, len, regime(d2, len));
        }
    }

    /// Segment against segment: every vertex against the other segment,
    /// then in 3D the closest approach of the two lines.
    ///
    /// The pair is put in key order first, so the links do not depend on
    /// which cell each segment was binned in.
    pub fn segment_segment<S: LinkSink + ?Sized>(
        &self,
        aa: &FatSegment,
        bb: &FatSegment,
        out: &mut LinkOut<'_, S>,
    ) {
        let (aa, bb) = if bb.rec.key() < aa.rec.key() { (bb, aa) } else { (aa, bb) };
        self.vertex1_segment(aa, bb, out);
        if aa.is_last() {
            self.vertex2_segment(bb, aa, out);
        }
        self.vertex1_segment(bb, aa, out);
        if bb.is_last() {
            self.vertex2_segment(aa, bb, out);
        }

        if self.crossings {
            if let Some(ap) = aa.seg.closest_approach(&bb.seg, &self.modulo) {
                let len = aa.rec.radius + bb.rec.radius;
                let reach = pair_reach(aa.rec.radius, aa.rec.range, bb.rec.radius, bb.rec.range);
                if ap.dist_sqr < reach * reach && aa.claims(ap.a) && bb.claims(ap.b) {
                    out.sliding(
                        aa.interpolate(ap.a),
                        Anchor::Along(bb.interpolate(ap.b)),
                        len,
                        regime(ap.dist_sqr, len),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::{LinkBuffer, StericLink};

    struct Fibers(Vec<Vec<Vec3>>);

    impl FiberSource for Fibers {
        fn vertex_count(&self, fiber: BodyId) -> usize {
            self.0.get(fiber.index()).map_or(0, Vec::len)
        }

        fn vertex(&self, fiber: BodyId, index: usize) -> Option<Vec3> {
            self.0.get(fiber.index())?.get(index).copied()
        }
    }

    const PARAMS: StericParams = StericParams { push: 100.0, pull: 1.0 };

    fn narrow_2d() -> Narrow {
        Narrow::new(&Domain::centered(Vec3::new(50.0, 50.0, 0.0), 2))
    }

    fn seg(source: &Fibers, fiber: u32, segment: u32) -> FatSegment {
        let rec = SegmentRecord {
            fiber: BodyId(fiber),
            segment,
            group: None,
            panes: 0,
            radius: 0.5,
            range: 0.5,
        };
        FatSegment::resolve(&rec, source).unwrap()
    }

    fn bead(body: u32, pos: Vec3) -> PointRecord {
        PointRecord {
            point: PointRef {
                body: BodyId(body),
                index: 0,
            },
            group: None,
            panes: 0,
            pos,
            radius: 0.5,
            range: 0.5,
        }
    }

    #[test]
    fn resolve_marks_first_and_last() {
        let source = Fibers(vec![vec![Vec3::ZERO, Vec3::X, Vec3::X * 2.0]]);
        let first = seg(&source, 0, 0);
        let last = seg(&source, 0, 1);
        assert!(first.is_first() && !first.is_last());
        assert!(!last.is_first() && last.is_last());
        let missing = SegmentRecord {
            fiber: BodyId(0),
            segment: 2,
            group: None,
            panes: 0,
            radius: 0.5,
            range: 0.5,
        };
        assert!(FatSegment::resolve(&missing, &source).is_none());
    }

    #[test]
    fn joint_position_claimed_by_one_segment() {
        let source = Fibers(vec![vec![Vec3::ZERO, Vec3::X, Vec3::X * 2.0]]);
        let s0 = seg(&source, 0, 0);
        let s1 = seg(&source, 0, 1);
        assert!(!s0.claims(1.0));
        assert!(s1.claims(0.0));
        assert!(s1.claims(1.0));
    }

    #[test]
    fn point_beyond_plus_end_meets_tip() {
        let source = Fibers(vec![vec![Vec3::ZERO, Vec3::X]]);
        let s = seg(&source, 0, 0);
        let mut buf = LinkBuffer::new();
        let mut out = LinkOut::new(&mut buf, PARAMS);
        narrow_2d().point_segment(&bead(5, Vec3::new(1.5, 0.2, 0.0)), &s, &mut out);
        assert_eq!(out.tally.push, 1);
        match buf.links()[0] {
            StericLink::Long { a, b, .. } => {
                assert_eq!(a.body, BodyId(5));
                assert_eq!(b, PointRef { body: BodyId(0), index: 1 });
            }
            other => panic!("unexpected link {other:?}"),
        }
    }

    #[test]
    fn point_behind_joint_uses_the_vertex() {
        // V-shaped filament, point sitting outside the bend
        let source = Fibers(vec![vec![Vec3::new(-1.0, -1.0, 0.0), Vec3::ZERO, Vec3::new(1.0, -1.0, 0.0)]]);
        let s1 = seg(&source, 0, 1);
        let mut buf = LinkBuffer::new();
        let mut out = LinkOut::new(&mut buf, PARAMS);
        narrow_2d().point_segment(&bead(5, Vec3::new(0.0, 0.6, 0.0)), &s1, &mut out);
        assert_eq!(buf.len(), 1);
        assert!(matches!(buf.links()[0], StericLink::Long { b, .. } if b.index == 1));
    }

    #[test]
    fn parallel_filaments_link_once_per_vertex() {
        let source = Fibers(vec![
            vec![Vec3::ZERO, Vec3::X],
            vec![Vec3::new(0.0, 0.8, 0.0), Vec3::new(1.0, 0.8, 0.0)],
        ]);
        let a = seg(&source, 0, 0);
        let b = seg(&source, 1, 0);
        let mut buf = LinkBuffer::new();
        let mut out = LinkOut::new(&mut buf, PARAMS);
        narrow_2d().segment_segment(&a, &b, &mut out);
        // each of the four vertices projects onto the other segment
        assert_eq!(out.tally.push, 4);
        assert_eq!(buf.len(), 4);
    }

    #[test]
    fn crossing_segments_in_3d() {
        let source = Fibers(vec![
            vec![Vec3::new(-2.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)],
            vec![Vec3::new(0.0, -2.0, 0.5), Vec3::new(0.0, 2.0, 0.5)],
        ]);
        let narrow = Narrow::new(&Domain::centered(Vec3::splat(10.0), 3));
        let mut buf = LinkBuffer::new();
        let mut out = LinkOut::new(&mut buf, PARAMS);
        narrow.segment_segment(&seg(&source, 0, 0), &seg(&source, 1, 0), &mut out);
        assert_eq!(buf.len(), 1);
        match buf.links()[0] {
            StericLink::Sliding { a, b: Anchor::Along(b), len, .. } => {
                assert!((a.coef - 0.5).abs() < 1e-5);
                assert!((b.coef - 0.5).abs() < 1e-5);
                assert!((len - 1.0).abs() < 1e-6);
            }
            other => panic!("unexpected link {other:?}"),
        }
    }

    #[test]
    fn facing_minus_tips_link_once() {
        let source = Fibers(vec![
            vec![Vec3::new(0.3, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)],
            vec![Vec3::new(-0.3, 0.0, 0.0), Vec3::new(-2.0, 0.0, 0.0)],
        ]);
        let a = seg(&source, 0, 0);
        let b = seg(&source, 1, 0);
        let mut buf = LinkBuffer::new();
        let mut out = LinkOut::new(&mut buf, PARAMS);
        narrow_2d().segment_segment(&a, &b, &mut out);
        assert_eq!(buf.len(), 1);
        assert!(matches!(
            buf.links()[0],
            StericLink::Long { a, b, .. } if a.index == 0 && b.index == 0
        ));
    }

    #[test]
    fn tally_merge_adds_fields() {
        let mut t = Tally { tested: 1, excluded: 2, push: 3, pull: 4 };
        t.merge(Tally { tested: 1, excluded: 1, push: 1, pull: 1 });
        assert_eq!(t, Tally { tested: 2, excluded: 3, push: 4, pull: 5 });
    }
}
