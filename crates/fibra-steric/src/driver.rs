//! Scene-level steric step.
//!
//! Estimates the contact range from the object properties, keeps the
//! engine's grid in shape, inserts every steric-enabled primitive of
//! the scene and emits the links.

use tracing::warn;

use fibra_model::{BodyProp, Scene};
use fibra_types::constants::{MAX_PANES, REAL_EPSILON, SEGMENTATION_SLACK};
use fibra_types::{BodyId, FibraResult, GroupId};
use glam::Vec3;

use crate::config::StericConfig;
use crate::engine::{PassReport, StericEngine};
use crate::link::{LinkSink, PointRef};
use crate::narrow::FiberSource;
use crate::registry::{PointRecord, SegmentRecord};

impl FiberSource for Scene {
    fn vertex_count(&self, fiber: BodyId) -> usize {
        self.fiber(fiber).map_or(0, |f| f.nb_points())
    }

    fn vertex(&self, fiber: BodyId, index: usize) -> Option<Vec3> {
        self.fiber(fiber)?.points.get(index).copied()
    }
}

/// Panes set in a steric mask (bit `p - 1` selects pane `p`).
fn panes(mask: u8) -> impl Iterator<Item = u8> {
    (1..=MAX_PANES).filter(move |p| mask & (1 << (p - 1)) != 0)
}

/// Runs steric passes over a [`Scene`].
pub struct StericDriver {
    engine: StericEngine,
    warned_range: bool,
    warned_empty: bool,
}

impl StericDriver {
    pub fn new(config: StericConfig) -> FibraResult<Self> {
        Ok(Self {
            engine: StericEngine::new(config)?,
            warned_range: false,
            warned_empty: false,
        })
    }

    /// Underlying engine.
    pub fn engine(&self) -> &StericEngine {
        &self.engine
    }

    /// Mutable access to the engine (e.g. to invalidate its grid).
    pub fn engine_mut(&mut self) -> &mut StericEngine {
        &mut self.engine
    }

    /// Smallest cell width that keeps every contact between adjacent cells.
    ///
    /// Twice the largest reach (`radius + steric_range`) over every steric
    /// filament property, sphere, bead and solid point, plus the longest
    /// allowed segment (target segmentation with slack, or the longest
    /// actual segment). Returns 0 when nothing is steric.
    pub fn estimate_required_range(scene: &Scene) -> f32 {
        let mut segment = 0.0f32;
        let mut reach = 0.0f32;
        for prop in scene.fiber_props.iter().filter(|p| p.has_steric()) {
            segment = segment.max(SEGMENTATION_SLACK * prop.segmentation);
            reach = reach.max(prop.steric_radius + prop.steric_range);
        }
        for fiber in &scene.fibers {
            if scene.fiber_prop(fiber).is_some_and(|p| p.has_steric()) {
                segment = segment.max(fiber.segmentation());
            }
        }

        let body_steric = move |prop| scene.body_prop(prop).filter(|p| p.has_steric());
        for sphere in &scene.spheres {
            if let Some(p) = body_steric(sphere.prop) {
                reach = reach.max(sphere.radius + p.steric_range);
            }
        }
        for bead in &scene.beads {
            if let Some(p) = body_steric(bead.prop) {
                reach = reach.max(bead.radius + p.steric_range);
            }
        }
        for solid in &scene.solids {
            if let Some(p) = body_steric(solid.prop) {
                for &r in solid.radii.iter().filter(|&&r| r > REAL_EPSILON) {
                    reach = reach.max(r + p.steric_range);
                }
            }
        }
        segment + 2.0 * reach
    }

    /// Returns true if any object of the scene takes part in steric passes.
    pub fn has_steric_objects(scene: &Scene) -> bool {
        let fibers = scene
            .fibers
            .iter()
            .any(|f| scene.fiber_prop(f).is_some_and(|p| p.has_steric()));
        let steric = |prop| scene.body_prop(prop).is_some_and(|p| p.has_steric());
        fibers
            || scene.beads.iter().any(|b| steric(b.prop))
            || scene.spheres.iter().any(|s| steric(s.prop))
            || scene
                .solids
                .iter()
                .any(|s| steric(s.prop) && s.radii.iter().any(|&r| r > REAL_EPSILON))
    }

    /// One full pass: validate, size, populate, emit.
    pub fn step<S: LinkSink + ?Sized>(&mut self, scene: &Scene, sink: &mut S) -> FibraResult<PassReport> {
        let params = self.engine.config().params()?;
        scene.validate()?;

        if !Self::has_steric_objects(scene) {
            if !self.warned_empty {
                warn!("steric interactions are enabled but no object is steric");
                self.warned_empty = true;
            }
            return Ok(PassReport::default());
        }

        let required = self.required_range(scene);
        self.engine.begin_pass(&scene.domain, required)?;
        self.populate(scene)?;
        self.engine.emit(scene, sink, &params)
    }

    fn required_range(&mut self, scene: &Scene) -> f32 {
        let range = Self::estimate_required_range(scene);
        if range < REAL_EPSILON && !self.warned_range {
            warn!("steric range could not be estimated; set max_range explicitly");
            self.warned_range = true;
        }
        range
    }

    /// Inserts every steric primitive of `scene` into the engine.
    fn populate(&mut self, scene: &Scene) -> FibraResult<()> {
        for fiber in &scene.fibers {
            let Some(prop) = scene.fiber_prop(fiber).filter(|p| p.has_steric()) else {
                continue;
            };
            let radius = prop.steric_radius;
            let range = radius + prop.steric_range;
            for n in 0..fiber.nb_segments() {
                let rec = SegmentRecord {
                    fiber: fiber.id,
                    segment: n as u32,
                    group: fiber.group,
                    panes: prop.steric,
                    radius,
                    range,
                };
                let geometry = fiber.segment(n);
                for pane in panes(prop.steric) {
                    self.engine.insert_segment(pane, rec, &geometry)?;
                }
            }
        }

        for sphere in &scene.spheres {
            if let Some(prop) = scene.body_prop(sphere.prop).filter(|p| p.has_steric()) {
                self.insert_round(round_record(prop, sphere.id, 0, sphere.group, sphere.center, sphere.radius))?;
            }
        }
        for bead in &scene.beads {
            if let Some(prop) = scene.body_prop(bead.prop).filter(|p| p.has_steric()) {
                self.insert_round(round_record(prop, bead.id, 0, bead.group, bead.position, bead.radius))?;
            }
        }
        for solid in &scene.solids {
            if let Some(prop) = scene.body_prop(solid.prop).filter(|p| p.has_steric()) {
                for (i, (&pos, &radius)) in solid.points.iter().zip(&solid.radii).enumerate() {
                    if radius > REAL_EPSILON {
                        self.insert_round(round_record(prop, solid.id, i as u32, solid.group, pos, radius))?;
                    }
                }
            }
        }
        Ok(())
    }

    fn insert_round(&mut self, rec: PointRecord) -> FibraResult<()> {
        for pane in panes(rec.panes) {
            self.engine.insert_point(pane, rec)?;
        }
        Ok(())
    }
}

fn round_record(
    prop: &BodyProp,
    body: BodyId,
    index: u32,
    group: Option<GroupId>,
    pos: Vec3,
    radius: f32,
) -> PointRecord {
    PointRecord {
        point: PointRef { body, index },
        group,
        panes: prop.steric,
        pos,
        radius,
        range: radius + prop.steric_range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use fibra_math::Domain;
    use fibra_model::generators::straight_fiber;
    use fibra_model::FiberProp;
    use proptest::prelude::*;

    use crate::config::StericParams;
    use crate::exclusion::{point_segment_adjacent, points_adjacent, segments_adjacent};
    use crate::link::{LinkBuffer, StericLink};
    use crate::narrow::{FatSegment, LinkOut, Narrow};
    use crate::registry::CellStore;

    const SIZE: f32 = 9.0;

    fn stiffness() -> StericConfig {
        StericConfig::with_stiffness(100.0, 2.0)
    }

    /// Links as comparable strings, with vertex pairs in body order.
    fn canonical(links: &[StericLink]) -> Vec<String> {
        let mut out: Vec<String> = links
            .iter()
            .map(|link| match *link {
                StericLink::Long { a, b, len, stiffness } if b < a => {
                    format!("{:?}", StericLink::Long { a: b, b: a, len, stiffness })
                }
                _ => format!("{link:?}"),
            })
            .collect();
        out.sort();
        out
    }

    /// Every stored primitive against every other, ignoring the grid.
    fn all_pairs(scene: &Scene, store: &CellStore, params: StericParams) -> Vec<String> {
        let mut points = Vec::new();
        let mut segments = Vec::new();
        for cell in 0..store.cell_count() {
            points.extend_from_slice(store.points(cell, 1));
            segments.extend(
                store
                    .segments(cell, 1)
                    .iter()
                    .filter_map(|rec| FatSegment::resolve(rec, scene)),
            );
        }

        let narrow = Narrow::new(&scene.domain);
        let mut buf = LinkBuffer::new();
        {
            let mut out = LinkOut::new(&mut buf, params);
            for (i, a) in points.iter().enumerate() {
                for b in &points[i + 1..] {
                    if !points_adjacent(a, b) {
                        narrow.point_point(a, b, &mut out);
                    }
                }
                for s in &segments {
                    if !point_segment_adjacent(a, &s.rec) {
                        narrow.point_segment(a, s, &mut out);
                    }
                }
            }
            for (i, aa) in segments.iter().enumerate() {
                for bb in &segments[i + 1..] {
                    if !segments_adjacent(&aa.rec, &bb.rec) {
                        narrow.segment_segment(aa, bb, &mut out);
                    }
                }
            }
        }
        canonical(buf.links())
    }

    type RawFiber = ((f32, f32, f32), (f32, f32), usize, f32);
    type RawBead = ((f32, f32, f32), bool, f32);

    fn arb_fibers() -> impl Strategy<Value = Vec<RawFiber>> {
        prop::collection::vec(
            (
                (2.0f32..7.0, 2.0f32..7.0, 2.0f32..7.0),
                (0.0f32..std::f32::consts::PI, 0.0f32..std::f32::consts::TAU),
                1usize..4,
                0.3f32..0.6,
            ),
            1..14,
        )
    }

    fn arb_beads() -> impl Strategy<Value = Vec<RawBead>> {
        prop::collection::vec(
            ((0.0f32..SIZE, 0.0f32..SIZE, 0.0f32..SIZE), any::<bool>(), 0.1f32..0.5),
            0..30,
        )
    }

    fn build_scene(domain: Domain, fibers: &[RawFiber], beads: &[RawBead]) -> Scene {
        let mut scene = Scene::new(domain);
        let actin = scene
            .add_fiber_prop(FiberProp::new("actin", 0.6, 0.15).with_range(0.1))
            .unwrap();
        let small = scene
            .add_body_prop(BodyProp::new("small").with_range(0.5))
            .unwrap();
        let large = scene.add_body_prop(BodyProp::new("large")).unwrap();

        for &((x, y, z), (theta, phi), n, seg) in fibers {
            let dir = Vec3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos());
            let points = straight_fiber(Vec3::new(x, y, z), dir, seg * n as f32, n);
            scene.add_fiber(actin, points, None).unwrap();
        }
        for &((x, y, z), is_small, r) in beads {
            let (prop, radius) = if is_small { (small, 0.5 * r) } else { (large, r) };
            scene.add_bead(prop, Vec3::new(x, y, z), radius, None).unwrap();
        }
        scene
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn grid_links_match_all_pairs(
            fibers in arb_fibers(),
            beads in arb_beads(),
            periodic in any::<bool>(),
        ) {
            let domain = if periodic {
                Domain::periodic_box(Vec3::ZERO, Vec3::splat(SIZE), 3)
            } else {
                Domain::new(Vec3::ZERO, Vec3::splat(SIZE), 3)
            };
            let scene = build_scene(domain, &fibers, &beads);

            let mut driver = StericDriver::new(stiffness()).unwrap();
            let mut buf = LinkBuffer::new();
            let report = driver.step(&scene, &mut buf).unwrap();
            prop_assert_eq!(report.links(), buf.len());

            let params = stiffness().params().unwrap();
            let expected = all_pairs(&scene, driver.engine().store(), params);
            prop_assert_eq!(canonical(buf.links()), expected);
        }
    }

    #[test]
    fn pane_mask_bits() {
        assert_eq!(panes(0).count(), 0);
        assert_eq!(panes(1).collect::<Vec<_>>(), vec![1]);
        assert_eq!(panes(0b1010_0000).collect::<Vec<_>>(), vec![6, 8]);
    }
}
