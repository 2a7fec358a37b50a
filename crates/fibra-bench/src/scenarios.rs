//! Benchmark scenarios: procedural scene + steric config for each case.
//!
//! Three canonical scenarios for regression testing:
//! 1. **Bead suspension**: dense beads in a fully periodic box
//! 2. **Fiber network**: random straight filaments in a closed 3D box
//! 3. **Aster**: filaments radiating from a solid core among beads (2D)

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use fibra_math::{Domain, Vec3};
use fibra_model::generators::{ring, segment_count, straight_fiber};
use fibra_model::{BodyProp, FiberProp, Scene};
use fibra_steric::StericConfig;
use fibra_types::{FibraResult, GroupId};

/// Which benchmark scenario to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioKind {
    /// Beads in a periodic box.
    BeadSuspension,
    /// Random filaments in a closed box.
    FiberNetwork,
    /// Radial filaments around a core, with beads.
    Aster,
}

impl ScenarioKind {
    /// Returns all scenario kinds.
    pub fn all() -> &'static [ScenarioKind] {
        &[
            ScenarioKind::BeadSuspension,
            ScenarioKind::FiberNetwork,
            ScenarioKind::Aster,
        ]
    }

    /// Returns a human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::BeadSuspension => "bead_suspension",
            ScenarioKind::FiberNetwork => "fiber_network",
            ScenarioKind::Aster => "aster",
        }
    }

    /// Looks a scenario up by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.name() == name)
    }
}

/// A fully specified benchmark scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Scenario type.
    pub kind: ScenarioKind,
    /// Objects and domain.
    pub scene: Scene,
    /// Steric engine configuration.
    pub config: StericConfig,
    /// Number of passes to run.
    pub steps: u32,
    /// Largest per-axis displacement applied to every position between passes.
    pub jitter: f32,
    /// Seed for the jitter applied between passes.
    pub seed: u64,
}

const DEFAULT_SEED: u64 = 0x5eed;

fn random_point(rng: &mut StdRng, domain: &Domain, margin: f32) -> Vec3 {
    let mut p = Vec3::ZERO;
    for d in 0..domain.dims() {
        let lo = domain.inf[d] + margin;
        let hi = (domain.sup[d] - margin).max(lo + f32::EPSILON);
        p[d] = rng.gen_range(lo..hi);
    }
    p
}

fn random_direction(rng: &mut StdRng, dim: usize) -> Vec3 {
    loop {
        let mut v = Vec3::ZERO;
        for d in 0..dim {
            v[d] = rng.gen_range(-1.0f32..1.0);
        }
        let n = v.length_squared();
        if n > 1e-4 && n <= 1.0 {
            return v / n.sqrt();
        }
    }
}

impl Scenario {
    /// Bead suspension.
    ///
    /// 2000 beads of radius 0.3 (range 0.1) in a periodic 20³ box.
    pub fn bead_suspension() -> FibraResult<Self> {
        let domain = Domain::periodic_box(Vec3::ZERO, Vec3::splat(20.0), 3);
        let mut scene = Scene::new(domain);
        let prop = scene.add_body_prop(BodyProp::new("bead").with_range(0.1))?;
        let mut rng = StdRng::seed_from_u64(DEFAULT_SEED);
        for _ in 0..2000 {
            let pos = random_point(&mut rng, &domain, 0.0);
            scene.add_bead(prop, pos, 0.3, None)?;
        }

        Ok(Self {
            kind: ScenarioKind::BeadSuspension,
            scene,
            config: StericConfig::with_stiffness(200.0, 10.0),
            steps: 50,
            jitter: 0.05,
            seed: DEFAULT_SEED,
        })
    }

    /// Fiber network.
    ///
    /// 150 straight filaments of length 5 (segmentation 0.5) placed at
    /// random in a closed 16³ box.
    pub fn fiber_network() -> FibraResult<Self> {
        let domain = Domain::centered(Vec3::splat(8.0), 3);
        let mut scene = Scene::new(domain);
        let segmentation = 0.5;
        let length = 5.0;
        let prop = scene.add_fiber_prop(FiberProp::new("actin", segmentation, 0.05).with_range(0.02))?;
        let mut rng = StdRng::seed_from_u64(DEFAULT_SEED + 1);
        for _ in 0..150 {
            let start = random_point(&mut rng, &domain, 1.0);
            let dir = random_direction(&mut rng, 3);
            let points = straight_fiber(start, dir, length, segment_count(length, segmentation));
            scene.add_fiber(prop, points, None)?;
        }

        Ok(Self {
            kind: ScenarioKind::FiberNetwork,
            scene,
            config: StericConfig::with_stiffness(500.0, 0.0),
            steps: 30,
            jitter: 0.02,
            seed: DEFAULT_SEED + 1,
        })
    }

    /// Aster.
    ///
    /// A ring-shaped solid core with 48 radial filaments attached to it
    /// (same group, so core and filaments ignore each other), surrounded
    /// by 300 beads, in a closed 2D box.
    pub fn aster() -> FibraResult<Self> {
        let domain = Domain::centered(Vec3::new(12.0, 12.0, 0.0), 2);
        let mut scene = Scene::new(domain);
        let segmentation = 0.5;
        let length = 8.0;
        let fiber_prop = scene.add_fiber_prop(FiberProp::new("microtubule", segmentation, 0.05).with_range(0.05))?;
        let core_prop = scene.add_body_prop(BodyProp::new("core"))?;
        let bead_prop = scene.add_body_prop(BodyProp::new("vesicle").with_range(0.05))?;
        let aster = Some(GroupId(0));

        let core = ring(Vec3::ZERO, 0.8, 12);
        let radii = vec![0.3; core.len()];
        scene.add_solid(core_prop, core, radii, aster)?;

        for anchor in ring(Vec3::ZERO, 1.2, 48) {
            let points = straight_fiber(anchor, anchor, length, segment_count(length, segmentation));
            scene.add_fiber(fiber_prop, points, aster)?;
        }

        let mut rng = StdRng::seed_from_u64(DEFAULT_SEED + 2);
        let mut placed = 0;
        while placed < 300 {
            let pos = random_point(&mut rng, &domain, 0.5);
            if pos.length() > 2.0 {
                scene.add_bead(bead_prop, pos, 0.2, None)?;
                placed += 1;
            }
        }

        Ok(Self {
            kind: ScenarioKind::Aster,
            scene,
            config: StericConfig::with_stiffness(300.0, 5.0),
            steps: 40,
            jitter: 0.02,
            seed: DEFAULT_SEED + 2,
        })
    }

    /// Create a scenario by kind.
    pub fn from_kind(kind: ScenarioKind) -> FibraResult<Self> {
        match kind {
            ScenarioKind::BeadSuspension => Self::bead_suspension(),
            ScenarioKind::FiberNetwork => Self::fiber_network(),
            ScenarioKind::Aster => Self::aster(),
        }
    }

    /// Builder: overrides the number of passes.
    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    /// Builder: replaces the steric configuration.
    pub fn with_config(mut self, config: StericConfig) -> Self {
        self.config = config;
        self
    }

    /// Builder: overrides the jitter seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder: toggles parallel traversal.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }
}
