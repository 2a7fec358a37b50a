//! Pair enumeration over the populated grid.
//!
//! For every cell, the primitives of the cell are tested against each
//! other and against those of its forward neighbours (the cell's region
//! minus itself). Each unordered pair of primitives in the same or in
//! adjacent cells is thus visited exactly once per pane.
//!
//! Pane pairs add a cross pass: objects of the first pane meet objects
//! of the second pane in the same cell and forward neighbours, then
//! objects of the second pane meet those of the first in forward
//! neighbours only.
//!
//! An object may sit in several panes. A pair of objects is owned by the
//! lowest pane their masks share, or failing that by the first pane pair
//! that joins them; every other job skips it, so the pair is tested once.

use std::ops::Range;

use rayon::prelude::*;

use crate::config::StericParams;
use crate::exclusion::{point_segment_adjacent, points_adjacent, segments_adjacent};
use crate::grid::SpatialGrid;
use crate::link::{LinkBuffer, LinkSink};
use crate::narrow::{FatSegment, FiberSource, LinkOut, Narrow, Tally};
use crate::registry::{pane_bit, CellStore, PointRecord, SegmentRecord};

/// One sweep of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PaneJob {
    /// Objects of one pane among themselves.
    Within(u8),
    /// Objects of two different panes against each other.
    Across(u8, u8),
}

impl PaneJob {
    /// Every pane on its own, followed by the configured pane pairs.
    pub fn plan(pane_count: u8, pairs: &[[u8; 2]]) -> Vec<PaneJob> {
        (1..=pane_count)
            .map(PaneJob::Within)
            .chain(pairs.iter().map(|&[a, b]| PaneJob::Across(a, b)))
            .collect()
    }

    /// Whether this pane pair joins objects with masks `a` and `b`.
    fn joins(self, a: u8, b: u8) -> bool {
        match self {
            PaneJob::Within(_) => false,
            PaneJob::Across(p1, p2) => {
                let (b1, b2) = (pane_bit(p1), pane_bit(p2));
                (a & b1 != 0 && b & b2 != 0) || (a & b2 != 0 && b & b1 != 0)
            }
        }
    }
}

#[derive(Default)]
struct Scratch {
    base: Vec<FatSegment>,
    side: Vec<FatSegment>,
}

fn resolve<F: FiberSource + ?Sized>(recs: &[SegmentRecord], source: &F, into: &mut Vec<FatSegment>) {
    into.clear();
    into.extend(recs.iter().filter_map(|r| FatSegment::resolve(r, source)));
}

/// Read-only view of everything a traversal needs.
pub(crate) struct Traversal<'a, F: ?Sized> {
    pub grid: &'a SpatialGrid,
    pub store: &'a CellStore,
    pub source: &'a F,
    pub narrow: Narrow,
    pub jobs: &'a [PaneJob],
}

impl<'a, F: FiberSource + ?Sized> Traversal<'a, F> {
    /// Whether `job` is the one that tests objects with masks `a` and `b`.
    #[inline]
    fn owns(&self, job: PaneJob, a: u8, b: u8) -> bool {
        match job {
            PaneJob::Within(pane) => {
                let shared = a & b;
                shared != 0 && shared.trailing_zeros() + 1 == u32::from(pane)
            }
            PaneJob::Across(..) => {
                a & b == 0 && self.jobs.iter().copied().find(|j| j.joins(a, b)) == Some(job)
            }
        }
    }

    /// Runs every job on each cell of `cells`, in cell order.
    pub fn run<S: LinkSink + ?Sized>(&self, cells: Range<usize>, out: &mut LinkOut<'_, S>) {
        let mut scratch = Scratch::default();
        for cell in cells {
            for &job in self.jobs {
                match job {
                    PaneJob::Within(pane) => self.within_pane(cell, pane, out, &mut scratch),
                    PaneJob::Across(p1, p2) => self.across_panes(cell, p1, p2, out, &mut scratch),
                }
            }
        }
    }

    fn within_pane<S: LinkSink + ?Sized>(
        &self,
        cell: usize,
        pane: u8,
        out: &mut LinkOut<'_, S>,
        scratch: &mut Scratch,
    ) {
        let points = self.store.points(cell, pane);
        let segments = self.store.segments(cell, pane);
        if points.is_empty() && segments.is_empty() {
            return;
        }
        let job = PaneJob::Within(pane);
        resolve(segments, self.source, &mut scratch.base);
        self.intra(job, points, &scratch.base, out);

        for n in self.grid.forward_neighbours(cell) {
            let side_points = self.store.points(n, pane);
            let side_segments = self.store.segments(n, pane);
            if side_points.is_empty() && side_segments.is_empty() {
                continue;
            }
            resolve(side_segments, self.source, &mut scratch.side);
            self.cross(job, points, &scratch.base, side_points, &scratch.side, out);
        }
    }

    fn across_panes<S: LinkSink + ?Sized>(
        &self,
        cell: usize,
        p1: u8,
        p2: u8,
        out: &mut LinkOut<'_, S>,
        scratch: &mut Scratch,
    ) {
        let job = PaneJob::Across(p1, p2);
        let points = self.store.points(cell, p1);
        let segments = self.store.segments(cell, p1);
        if !(points.is_empty() && segments.is_empty()) {
            resolve(segments, self.source, &mut scratch.base);
            for n in std::iter::once(cell).chain(self.grid.forward_neighbours(cell)) {
                resolve(self.store.segments(n, p2), self.source, &mut scratch.side);
                self.cross(job, points, &scratch.base, self.store.points(n, p2), &scratch.side, out);
            }
        }

        let points = self.store.points(cell, p2);
        let segments = self.store.segments(cell, p2);
        if !(points.is_empty() && segments.is_empty()) {
            resolve(segments, self.source, &mut scratch.base);
            for n in self.grid.forward_neighbours(cell) {
                resolve(self.store.segments(n, p1), self.source, &mut scratch.side);
                self.cross(job, points, &scratch.base, self.store.points(n, p1), &scratch.side, out);
            }
        }
    }

    /// Every pair within one list.
    fn intra<S: LinkSink + ?Sized>(
        &self,
        job: PaneJob,
        points: &[PointRecord],
        segments: &[FatSegment],
        out: &mut LinkOut<'_, S>,
    ) {
        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                self.pair_pp(job, a, b, out);
            }
            for s in segments {
                self.pair_ps(job, a, s, out);
            }
        }
        for (i, aa) in segments.iter().enumerate() {
            for bb in &segments[i + 1..] {
                self.pair_ss(job, aa, bb, out);
            }
        }
    }

    /// Every pair across two lists.
    fn cross<S: LinkSink + ?Sized>(
        &self,
        job: PaneJob,
        points1: &[PointRecord],
        segments1: &[FatSegment],
        points2: &[PointRecord],
        segments2: &[FatSegment],
        out: &mut LinkOut<'_, S>,
    ) {
        for a in points1 {
            for b in points2 {
                self.pair_pp(job, a, b, out);
            }
            for s in segments2 {
                self.pair_ps(job, a, s, out);
            }
        }
        for s in segments1 {
            for b in points2 {
                self.pair_ps(job, b, s, out);
            }
            for bb in segments2 {
                self.pair_ss(job, s, bb, out);
            }
        }
    }

    #[inline]
    fn pair_pp<S: LinkSink + ?Sized>(
        &self,
        job: PaneJob,
        a: &PointRecord,
        b: &PointRecord,
        out: &mut LinkOut<'_, S>,
    ) {
        if !self.owns(job, a.panes, b.panes) {
            return;
        }
        if points_adjacent(a, b) {
            out.tally.excluded += 1;
        } else {
            out.tally.tested += 1;
            self.narrow.point_point(a, b, out);
        }
    }

    #[inline]
    fn pair_ps<S: LinkSink + ?Sized>(
        &self,
        job: PaneJob,
        a: &PointRecord,
        s: &FatSegment,
        out: &mut LinkOut<'_, S>,
    ) {
        if !self.owns(job, a.panes, s.rec.panes) {
            return;
        }
        if point_segment_adjacent(a, &s.rec) {
            out.tally.excluded += 1;
        } else {
            out.tally.tested += 1;
            self.narrow.point_segment(a, s, out);
        }
    }

    #[inline]
    fn pair_ss<S: LinkSink + ?Sized>(
        &self,
        job: PaneJob,
        aa: &FatSegment,
        bb: &FatSegment,
        out: &mut LinkOut<'_, S>,
    ) {
        if !self.owns(job, aa.rec.panes, bb.rec.panes) {
            return;
        }
        if segments_adjacent(&aa.rec, &bb.rec) {
            out.tally.excluded += 1;
        } else {
            out.tally.tested += 1;
            self.narrow.segment_segment(aa, bb, out);
        }
    }
}

impl<'a, F: FiberSource + Sync + ?Sized> Traversal<'a, F> {
    /// Splits the cells into chunks traversed on the rayon pool.
    ///
    /// Each worker fills its own [`LinkBuffer`]; buffers are replayed
    /// into `sink` in chunk order, so the output does not depend on
    /// scheduling.
    pub fn run_parallel<S: LinkSink + ?Sized>(&self, params: StericParams, sink: &mut S) -> Tally {
        let cells = self.grid.cell_count();
        let chunk = (cells / (4 * rayon::current_num_threads().max(1))).max(64);
        let chunks: Vec<Range<usize>> = (0..cells)
            .step_by(chunk)
            .map(|lo| lo..(lo + chunk).min(cells))
            .collect();

        let parts: Vec<(LinkBuffer, Tally)> = chunks
            .into_par_iter()
            .map(|range| {
                let mut buffer = LinkBuffer::new();
                let tally = {
                    let mut out = LinkOut::new(&mut buffer, params);
                    self.run(range, &mut out);
                    out.tally
                };
                (buffer, tally)
            })
            .collect();

        let mut total = Tally::default();
        for (buffer, tally) in &parts {
            buffer.replay_into(sink);
            total.merge(*tally);
        }
        total
    }
}
