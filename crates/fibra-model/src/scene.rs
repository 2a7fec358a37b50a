//! The collection of objects simulated together in one domain.
//!
//! The scene hands out [`BodyId`]s in insertion order across all object
//! types, so a body id is enough to find any object again.

use serde::{Deserialize, Serialize};

use fibra_math::{Domain, Vec3};
use fibra_types::{BodyId, FibraError, FibraResult, GroupId, PropId};

use crate::objects::{check_radius, Bead, Fiber, Solid, Sphere};
use crate::props::{BodyProp, FiberProp};

/// Which collection a [`BodyId`] points into, and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Fiber(usize),
    Bead(usize),
    Sphere(usize),
    Solid(usize),
}

/// All objects of a simulation, plus their property tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// Simulation space.
    pub domain: Domain,
    /// Filament property table.
    pub fiber_props: Vec<FiberProp>,
    /// Bead/sphere/solid property table.
    pub body_props: Vec<BodyProp>,
    pub fibers: Vec<Fiber>,
    pub beads: Vec<Bead>,
    pub spheres: Vec<Sphere>,
    pub solids: Vec<Solid>,
    bodies: Vec<BodyKind>,
}

impl Scene {
    /// Creates an empty scene in `domain`.
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            fiber_props: Vec::new(),
            body_props: Vec::new(),
            fibers: Vec::new(),
            beads: Vec::new(),
            spheres: Vec::new(),
            solids: Vec::new(),
            bodies: Vec::new(),
        }
    }

    /// Registers a filament property.
    pub fn add_fiber_prop(&mut self, prop: FiberProp) -> FibraResult<PropId> {
        prop.validate()?;
        self.fiber_props.push(prop);
        prop_id(self.fiber_props.len() - 1)
    }

    /// Registers a bead/sphere/solid property.
    pub fn add_body_prop(&mut self, prop: BodyProp) -> FibraResult<PropId> {
        prop.validate()?;
        self.body_props.push(prop);
        prop_id(self.body_props.len() - 1)
    }

    /// Adds a filament through the given vertices.
    pub fn add_fiber(
        &mut self,
        prop: PropId,
        points: Vec<Vec3>,
        group: Option<GroupId>,
    ) -> FibraResult<BodyId> {
        self.check_fiber_prop(prop)?;
        let id = self.next_id()?;
        let fiber = Fiber {
            id,
            prop,
            group,
            points,
        };
        fiber.validate()?;
        self.bodies.push(BodyKind::Fiber(self.fibers.len()));
        self.fibers.push(fiber);
        Ok(id)
    }

    /// Adds a bead.
    pub fn add_bead(
        &mut self,
        prop: PropId,
        position: Vec3,
        radius: f32,
        group: Option<GroupId>,
    ) -> FibraResult<BodyId> {
        self.check_body_prop(prop)?;
        check_radius("bead", radius)?;
        let id = self.next_id()?;
        self.bodies.push(BodyKind::Bead(self.beads.len()));
        self.beads.push(Bead {
            id,
            prop,
            group,
            position,
            radius,
        });
        Ok(id)
    }

    /// Adds a sphere.
    pub fn add_sphere(
        &mut self,
        prop: PropId,
        center: Vec3,
        radius: f32,
        group: Option<GroupId>,
    ) -> FibraResult<BodyId> {
        self.check_body_prop(prop)?;
        check_radius("sphere", radius)?;
        let id = self.next_id()?;
        self.bodies.push(BodyKind::Sphere(self.spheres.len()));
        self.spheres.push(Sphere {
            id,
            prop,
            group,
            center,
            radius,
        });
        Ok(id)
    }

    /// Adds a solid made of `points` with matching `radii`.
    pub fn add_solid(
        &mut self,
        prop: PropId,
        points: Vec<Vec3>,
        radii: Vec<f32>,
        group: Option<GroupId>,
    ) -> FibraResult<BodyId> {
        self.check_body_prop(prop)?;
        let id = self.next_id()?;
        let solid = Solid {
            id,
            prop,
            group,
            points,
            radii,
        };
        solid.validate()?;
        self.bodies.push(BodyKind::Solid(self.solids.len()));
        self.solids.push(solid);
        Ok(id)
    }

    /// Total number of bodies of all kinds.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Where the body `id` is stored.
    pub fn body_kind(&self, id: BodyId) -> Option<BodyKind> {
        self.bodies.get(id.index()).copied()
    }

    /// Looks up a filament by handle.
    pub fn fiber(&self, id: BodyId) -> Option<&Fiber> {
        match self.body_kind(id)? {
            BodyKind::Fiber(i) => self.fibers.get(i),
            _ => None,
        }
    }

    /// Property of filament `fiber`.
    pub fn fiber_prop(&self, fiber: &Fiber) -> Option<&FiberProp> {
        self.fiber_props.get(fiber.prop.index())
    }

    /// Property with index `prop` in the body table.
    pub fn body_prop(&self, prop: PropId) -> Option<&BodyProp> {
        self.body_props.get(prop.index())
    }

    /// Applies `f` to every movable position of the scene.
    ///
    /// Used by drivers and benchmarks to displace objects between passes.
    pub fn for_each_position_mut(&mut self, mut f: impl FnMut(&mut Vec3)) {
        for fiber in &mut self.fibers {
            fiber.points.iter_mut().for_each(&mut f);
        }
        for bead in &mut self.beads {
            f(&mut bead.position);
        }
        for sphere in &mut self.spheres {
            f(&mut sphere.center);
        }
        for solid in &mut self.solids {
            solid.points.iter_mut().for_each(&mut f);
        }
    }

    /// Validates the domain, every property, every object, and that body
    /// ids and the id table agree both ways.
    pub fn validate(&self) -> FibraResult<()> {
        self.domain.validate()?;
        self.check_ids()?;
        for prop in &self.fiber_props {
            prop.validate()?;
        }
        for prop in &self.body_props {
            prop.validate()?;
        }
        for fiber in &self.fibers {
            self.check_fiber_prop(fiber.prop)?;
            fiber.validate()?;
        }
        for bead in &self.beads {
            self.check_body_prop(bead.prop)?;
            check_radius("bead", bead.radius)?;
        }
        for sphere in &self.spheres {
            self.check_body_prop(sphere.prop)?;
            check_radius("sphere", sphere.radius)?;
        }
        for solid in &self.solids {
            self.check_body_prop(solid.prop)?;
            solid.validate()?;
        }
        Ok(())
    }

    fn check_ids(&self) -> FibraResult<()> {
        let objects = self.fibers.len() + self.beads.len() + self.spheres.len() + self.solids.len();
        if objects != self.bodies.len() {
            return Err(FibraError::InvalidConfig(format!(
                "scene holds {objects} objects but {} body ids",
                self.bodies.len()
            )));
        }
        // with equal counts, every entry resolving to its own id makes the map a bijection
        for (i, kind) in self.bodies.iter().enumerate() {
            let id = match *kind {
                BodyKind::Fiber(k) => self.fibers.get(k).map(|f| f.id),
                BodyKind::Bead(k) => self.beads.get(k).map(|b| b.id),
                BodyKind::Sphere(k) => self.spheres.get(k).map(|s| s.id),
                BodyKind::Solid(k) => self.solids.get(k).map(|s| s.id),
            };
            if id.map(|id| id.index()) != Some(i) {
                return Err(FibraError::InvalidConfig(format!(
                    "body id {i} does not resolve to an object carrying it ({kind:?})"
                )));
            }
        }
        Ok(())
    }

    fn next_id(&self) -> FibraResult<BodyId> {
        u32::try_from(self.bodies.len())
            .map(BodyId)
            .map_err(|_| FibraError::InvalidConfig("too many bodies in scene".into()))
    }

    fn check_fiber_prop(&self, prop: PropId) -> FibraResult<()> {
        if prop.index() < self.fiber_props.len() {
            Ok(())
        } else {
            Err(FibraError::InvalidConfig(format!(
                "unknown fiber property {}",
                prop.0
            )))
        }
    }

    fn check_body_prop(&self, prop: PropId) -> FibraResult<()> {
        if prop.index() < self.body_props.len() {
            Ok(())
        } else {
            Err(FibraError::InvalidConfig(format!(
                "unknown body property {}",
                prop.0
            )))
        }
    }
}

fn prop_id(index: usize) -> FibraResult<PropId> {
    u16::try_from(index)
        .map(PropId)
        .map_err(|_| FibraError::InvalidConfig("too many properties".into()))
}
