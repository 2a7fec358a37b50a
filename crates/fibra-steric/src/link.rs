//! Steric links: the output of a detection pass.
//!
//! The engine talks to the mechanics solver through [`LinkSink`], which
//! accepts exactly two shapes of spring. Endpoints are plain handles
//! (body id + vertex index, or body id + segment + coefficient); the
//! engine keeps nothing after handing a link over.

use serde::{Deserialize, Serialize};

use fibra_types::BodyId;

/// A vertex of a movable body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PointRef {
    /// Owning body.
    pub body: BodyId,
    /// Vertex index within the body.
    pub index: u32,
}

/// A position interpolated along a filament segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interpolation {
    /// Owning filament.
    pub fiber: BodyId,
    /// Segment index (joins vertices `segment` and `segment + 1`).
    pub segment: u32,
    /// Fraction of the way from vertex `segment` to `segment + 1`, in `[0, 1]`.
    pub coef: f32,
}

/// Second endpoint of a sliding link.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Anchor {
    /// A vertex (bead, sphere centre, solid point or filament vertex).
    Vertex(PointRef),
    /// Another interpolated position (3D segment crossing).
    Along(Interpolation),
}

/// Which side of the two-regime potential a link belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regime {
    /// Primitives overlap: repulsive link.
    Push,
    /// Primitives are within extended range but apart: weak attraction.
    Pull,
}

/// A single emitted link, as recorded by [`LinkBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StericLink {
    /// Spring between two vertices.
    Long {
        a: PointRef,
        b: PointRef,
        len: f32,
        stiffness: f32,
    },
    /// Spring between a position along a segment and an anchor.
    Sliding {
        a: Interpolation,
        b: Anchor,
        len: f32,
        stiffness: f32,
    },
}

/// Receiver of steric links (the mechanics solver, or a buffer).
pub trait LinkSink {
    /// Pins vertices `a` and `b` at separation `len` with stiffness `stiffness`.
    fn add_long_link(&mut self, a: PointRef, b: PointRef, len: f32, stiffness: f32);

    /// Pins interpolated position `a` and anchor `b` at separation `len`.
    fn add_sliding_link(&mut self, a: Interpolation, b: Anchor, len: f32, stiffness: f32);
}

impl Interpolation {
    /// Vertex-equivalent of this interpolation's first vertex.
    #[inline]
    pub fn first_vertex(&self) -> PointRef {
        PointRef {
            body: self.fiber,
            index: self.segment,
        }
    }
}

impl Anchor {
    /// Body owning the anchor.
    pub fn body(&self) -> BodyId {
        match self {
            Anchor::Vertex(p) => p.body,
            Anchor::Along(i) => i.fiber,
        }
    }
}

impl StericLink {
    /// The two bodies joined by the link, in emission order.
    pub fn bodies(&self) -> (BodyId, BodyId) {
        match self {
            StericLink::Long { a, b, .. } => (a.body, b.body),
            StericLink::Sliding { a, b, .. } => (a.fiber, b.body()),
        }
    }

    /// Rest length of the link.
    pub fn len(&self) -> f32 {
        match *self {
            StericLink::Long { len, .. } | StericLink::Sliding { len, .. } => len,
        }
    }

    /// Stiffness of the link.
    pub fn stiffness(&self) -> f32 {
        match *self {
            StericLink::Long { stiffness, .. } | StericLink::Sliding { stiffness, .. } => stiffness,
        }
    }
}

/// A sink that records links in emission order.
///
/// Used as the per-worker buffer of the parallel traversal and by tests.
#[derive(Debug, Clone, Default)]
pub struct LinkBuffer {
    links: Vec<StericLink>,
}

impl LinkBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Recorded links.
    pub fn links(&self) -> &[StericLink] {
        &self.links
    }

    /// Drops every link, keeping the allocation.
    pub fn clear(&mut self) {
        self.links.clear();
    }

    /// Forwards every recorded link to `sink`, in order.
    pub fn replay_into<S: LinkSink + ?Sized>(&self, sink: &mut S) {
        for link in &self.links {
            match *link {
                StericLink::Long {
                    a,
                    b,
                    len,
                    stiffness,
                } => sink.add_long_link(a, b, len, stiffness),
                StericLink::Sliding {
                    a,
                    b,
                    len,
                    stiffness,
                } => sink.add_sliding_link(a, b, len, stiffness),
            }
        }
    }

    /// Consumes the buffer.
    pub fn into_links(self) -> Vec<StericLink> {
        self.links
    }
}

impl LinkSink for LinkBuffer {
    fn add_long_link(&mut self, a: PointRef, b: PointRef, len: f32, stiffness: f32) {
        self.links.push(StericLink::Long {
            a,
            b,
            len,
            stiffness,
        });
    }

    fn add_sliding_link(&mut self, a: Interpolation, b: Anchor, len: f32, stiffness: f32) {
        self.links.push(StericLink::Sliding {
            a,
            b,
            len,
            stiffness,
        });
    }
}
