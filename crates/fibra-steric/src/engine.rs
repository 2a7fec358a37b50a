//! The steric engine: grid ownership, per-pass registry and emission.
//!
//! A pass goes through three calls:
//!
//! ```text
//! begin_pass(domain, range)   Idle|Built -> Built      (grid (re)built if needed, registry cleared)
//! insert_point / insert_segment           -> Populated
//! emit(source, sink, params)  Populated  -> Emitting -> Built
//! ```
//!
//! The grid survives across passes. It is rebuilt only when the domain
//! changes, when the required range exceeds the operative width, or
//! after [`StericEngine::invalidate_grid`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use fibra_math::{Domain, Segment};
use fibra_types::constants::{GRID_SUMMARY_THRESHOLD, REAL_EPSILON};
use fibra_types::{FibraError, FibraResult};

use crate::config::{StericConfig, StericParams};
use crate::emitter::{PaneJob, Traversal};
use crate::grid::SpatialGrid;
use crate::narrow::{FiberSource, LinkOut, Narrow, Tally};
use crate::link::LinkSink;
use crate::registry::{check_reach, CellStore, PointRecord, SegmentRecord};
use crate::sizing::size_grid;

/// Lifecycle state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnginePhase {
    /// No grid yet.
    Idle,
    /// Grid ready, registry empty.
    Built,
    /// Registry holds at least one primitive.
    Populated,
    /// Links are being emitted.
    Emitting,
}

/// Summary of one steric pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassReport {
    /// Point records inserted.
    pub points: usize,
    /// Segment records inserted.
    pub segments: usize,
    /// Candidate pairs that reached a narrow-phase test.
    pub pairs_tested: usize,
    /// Candidate pairs dropped by structural exclusion.
    pub pairs_excluded: usize,
    /// Links emitted with the push stiffness.
    pub push_links: usize,
    /// Links emitted with the pull stiffness.
    pub pull_links: usize,
    /// Number of grid cells.
    pub cells: usize,
    /// Cells along each axis.
    pub grid_dims: [usize; 3],
    /// User-configured minimum cell width, if any.
    pub configured_range: Option<f32>,
    /// Operative minimum cell width.
    pub operative_range: f32,
    /// Whether the grid was rebuilt at the start of this pass.
    pub grid_rebuilt: bool,
    /// Whether the operative width was raised above the configured or
    /// persisted one, or coarsened to fit the cell cap.
    pub range_adjusted: bool,
}

impl PassReport {
    /// Total links emitted.
    pub fn links(&self) -> usize {
        self.push_links + self.pull_links
    }
}

/// Owns the grid and registry; runs detection passes.
pub struct StericEngine {
    config: StericConfig,
    jobs: Vec<PaneJob>,
    grid: Option<SpatialGrid>,
    domain: Option<Domain>,
    operative_range: Option<f32>,
    store: CellStore,
    phase: EnginePhase,
    rebuilt: bool,
    adjusted: bool,
}

impl StericEngine {
    /// Creates an idle engine. The configuration is validated here.
    pub fn new(config: StericConfig) -> FibraResult<Self> {
        config.validate()?;
        let jobs = PaneJob::plan(config.pane_count, &config.pane_pairs);
        Ok(Self {
            config,
            jobs,
            grid: None,
            domain: None,
            operative_range: None,
            store: CellStore::default(),
            phase: EnginePhase::Idle,
            rebuilt: false,
            adjusted: false,
        })
    }

    pub fn config(&self) -> &StericConfig {
        &self.config
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    /// Current grid, if one was built.
    pub fn grid(&self) -> Option<&SpatialGrid> {
        self.grid.as_ref()
    }

    /// Width the current grid was sized with.
    pub fn operative_range(&self) -> Option<f32> {
        self.operative_range
    }

    /// Primitives currently registered.
    pub fn store(&self) -> &CellStore {
        &self.store
    }

    /// Forces a rebuild at the next [`begin_pass`](Self::begin_pass).
    pub fn invalidate_grid(&mut self) {
        self.grid = None;
        self.domain = None;
        self.store.clear();
        self.phase = EnginePhase::Idle;
    }

    /// Builds or rebuilds the grid if `domain` or `required_range` demand it.
    ///
    /// Returns whether a new grid was built. The operative width is
    /// persisted and acts as a floor for later rebuilds.
    pub fn ensure_grid(&mut self, domain: &Domain, required_range: f32) -> FibraResult<bool> {
        if let (Some(_), Some(current), Some(range)) = (&self.grid, &self.domain, self.operative_range) {
            if current == domain && required_range <= range + REAL_EPSILON {
                return Ok(false);
            }
        }

        let floor = self.operative_range.or(self.config.max_range);
        let sizing = size_grid(domain, required_range, floor, self.config.max_cells)?;

        // without a floor, only coarsening counts as an adjustment
        self.adjusted = sizing.width > floor.unwrap_or(required_range) + REAL_EPSILON;
        if self.adjusted && (self.config.max_range.is_some() || sizing.coarsening_steps > 0) {
            info!(
                "adjusting steric max range = {:.4} (required {:.4}, {} coarsening steps)",
                sizing.width, required_range, sizing.coarsening_steps
            );
        } else {
            debug!("steric max range = {:.4} (required {:.4})", sizing.width, required_range);
        }

        let grid = SpatialGrid::new(sizing.geometry)?;
        if grid.cell_count() > GRID_SUMMARY_THRESHOLD {
            info!("{}", grid.summary());
        } else {
            debug!("{}", grid.summary());
        }

        self.store.reshape(grid.cell_count(), self.config.pane_count);
        self.grid = Some(grid);
        self.domain = Some(*domain);
        self.operative_range = Some(sizing.width);
        self.phase = EnginePhase::Built;
        Ok(true)
    }

    /// Starts a pass: makes sure the grid fits and clears the registry.
    pub fn begin_pass(&mut self, domain: &Domain, required_range: f32) -> FibraResult<()> {
        if self.phase == EnginePhase::Emitting {
            return Err(FibraError::InvariantViolation(
                "cannot begin a steric pass while emitting".into(),
            ));
        }
        self.rebuilt = self.ensure_grid(domain, required_range)?;
        if !self.rebuilt {
            self.adjusted = false;
        }
        self.store.clear();
        self.phase = EnginePhase::Built;
        Ok(())
    }

    fn insertion_grid(&self) -> FibraResult<&SpatialGrid> {
        match (self.phase, &self.grid) {
            (EnginePhase::Built | EnginePhase::Populated, Some(grid)) => Ok(grid),
            _ => Err(FibraError::InvariantViolation(format!(
                "steric insertion requires a built grid (phase {:?})",
                self.phase
            ))),
        }
    }

    fn check_fits(&self, grid: &SpatialGrid, extent: f32) -> FibraResult<()> {
        let width = grid.geometry().min_cell_width();
        if self.config.check_range && extent > width + REAL_EPSILON {
            return Err(FibraError::InvalidConfig(format!(
                "steric object of extent {extent:.4} exceeds the grid cell width {width:.4}"
            )));
        }
        Ok(())
    }

    /// Registers a spherical primitive in `pane`.
    pub fn insert_point(&mut self, pane: u8, rec: PointRecord) -> FibraResult<()> {
        check_reach(rec.radius, rec.range)?;
        let grid = self.insertion_grid()?;
        self.check_fits(grid, 2.0 * rec.range)?;
        let cell = grid.cell_of(rec.pos);
        self.store.push_point(cell, pane, rec)?;
        self.phase = EnginePhase::Populated;
        Ok(())
    }

    /// Registers a filament segment in `pane`, binned by its midpoint.
    pub fn insert_segment(&mut self, pane: u8, rec: SegmentRecord, geometry: &Segment) -> FibraResult<()> {
        check_reach(rec.radius, rec.range)?;
        let grid = self.insertion_grid()?;
        let len = geometry.len();
        self.check_fits(grid, (len * len + 4.0 * rec.range * rec.range).sqrt())?;
        let cell = grid.cell_of(geometry.center());
        self.store.push_segment(cell, pane, rec)?;
        self.phase = EnginePhase::Populated;
        Ok(())
    }

    /// Emits a link for every close pair into `sink`.
    ///
    /// The registry is left intact; the next [`begin_pass`](Self::begin_pass)
    /// clears it.
    pub fn emit<F, S>(&mut self, source: &F, sink: &mut S, params: &StericParams) -> FibraResult<PassReport>
    where
        F: FiberSource + Sync + ?Sized,
        S: LinkSink + ?Sized,
    {
        params.validate()?;
        let (grid, domain) = match (self.phase, &self.grid, &self.domain) {
            (EnginePhase::Built | EnginePhase::Populated, Some(grid), Some(domain)) => (grid, domain),
            _ => {
                return Err(FibraError::InvariantViolation(format!(
                    "steric emission requires a populated grid (phase {:?})",
                    self.phase
                )))
            }
        };

        self.phase = EnginePhase::Emitting;
        let traversal = Traversal {
            grid,
            store: &self.store,
            source,
            narrow: Narrow::new(domain),
            jobs: &self.jobs,
        };

        let tally = if self.config.parallel {
            traversal.run_parallel(*params, sink)
        } else {
            let mut out = LinkOut::new(sink, *params);
            traversal.run(0..grid.cell_count(), &mut out);
            out.tally
        };

        let report = self.report(tally);
        debug!(
            points = report.points,
            segments = report.segments,
            tested = report.pairs_tested,
            links = report.links(),
            "steric pass"
        );
        self.phase = EnginePhase::Built;
        Ok(report)
    }

    fn report(&self, tally: Tally) -> PassReport {
        PassReport {
            points: self.store.point_count(),
            segments: self.store.segment_count(),
            pairs_tested: tally.tested,
            pairs_excluded: tally.excluded,
            push_links: tally.push,
            pull_links: tally.pull,
            cells: self.grid.as_ref().map_or(0, SpatialGrid::cell_count),
            grid_dims: self.grid.as_ref().map_or([0; 3], |g| g.geometry().dimensions()),
            configured_range: self.config.max_range,
            operative_range: self.operative_range.unwrap_or(0.0),
            grid_rebuilt: self.rebuilt,
            range_adjusted: self.adjusted,
        }
    }
}
