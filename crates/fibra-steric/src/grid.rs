//! Uniform spatial grid for steric broad-phase.
//!
//! The grid spans the simulation domain with cells at least as wide as
//! the largest contact distance, so any two primitives in contact sit
//! in the same cell or in face/edge/corner-adjacent cells.
//!
//! Along a periodic axis the cells tile the period exactly and indices
//! wrap. Along a non-periodic axis the grid adds one margin cell on
//! each side and clamps positions outside it to the border cells.
//!
//! Each cell also owns a *region*: the list of its neighbours with a
//! strictly larger index, stored as signed offsets. Walking the region
//! of every cell visits each unordered pair of adjacent cells exactly
//! once, which is what makes the pair enumeration duplicate-free.

use std::fmt::Write as _;

use glam::Vec3;

use fibra_math::Domain;
use fibra_types::constants::REAL_EPSILON;
use fibra_types::{FibraError, FibraResult};

/// Dimensions of a uniform grid, without the neighbour table.
///
/// Cheap to compute; the sizing loop builds several before committing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    dim: usize,
    inf: [f32; 3],
    sup: [f32; 3],
    n_cells: [usize; 3],
    delta: [f32; 3],
    inv_delta: [f32; 3],
    periodic: [bool; 3],
}

impl GridGeometry {
    /// Fits a grid with cells at least `min_width` wide to `domain`.
    ///
    /// Periodic axis: `floor(extent / min_width)` cells (at least one)
    /// spanning exactly one period. Non-periodic axis:
    /// `ceil(extent / min_width) + 2` cells of width `min_width`,
    /// centred on the domain. Axes beyond `domain.dim` get a single cell.
    pub fn fit(domain: &Domain, min_width: f32) -> FibraResult<Self> {
        domain.validate()?;
        if !(min_width.is_finite() && min_width > REAL_EPSILON) {
            return Err(FibraError::InvalidConfig(format!(
                "steric grid cell width must be positive (got {min_width})"
            )));
        }

        let dim = domain.dims();
        let mut geom = Self {
            dim,
            inf: [0.0; 3],
            sup: [0.0; 3],
            n_cells: [1; 3],
            delta: [1.0; 3],
            inv_delta: [0.0; 3],
            periodic: [false; 3],
        };

        for d in 0..dim {
            let (lo, hi) = (domain.inf[d], domain.sup[d]);
            let n = (hi - lo) / min_width;
            if domain.periodic[d] {
                let cells = (n.floor() as usize).max(1);
                geom.periodic[d] = true;
                geom.n_cells[d] = cells;
                geom.inf[d] = lo;
                geom.sup[d] = hi;
                geom.delta[d] = (hi - lo) / cells as f32;
            } else {
                let cells = (n.ceil() as usize).saturating_add(2);
                let mid = 0.5 * (lo + hi);
                let half = 0.5 * cells as f32 * min_width;
                geom.n_cells[d] = cells;
                geom.inf[d] = mid - half;
                geom.sup[d] = mid + half;
                geom.delta[d] = min_width;
            }
            geom.inv_delta[d] = 1.0 / geom.delta[d];
        }
        Ok(geom)
    }

    /// Smallest cell count any grid over `domain` can have.
    pub fn minimum_cell_count(domain: &Domain) -> usize {
        (0..domain.dims())
            .map(|d| if domain.periodic[d] { 1 } else { 3 })
            .product()
    }

    /// Spatial dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of cells along each axis.
    #[inline]
    pub fn dimensions(&self) -> [usize; 3] {
        self.n_cells
    }

    /// Width of the cells along each axis.
    #[inline]
    pub fn cell_widths(&self) -> [f32; 3] {
        self.delta
    }

    /// Lower corner of the grid.
    pub fn inf(&self) -> Vec3 {
        Vec3::from_array(self.inf)
    }

    /// Upper corner of the grid.
    pub fn sup(&self) -> Vec3 {
        Vec3::from_array(self.sup)
    }

    /// Whether `axis` wraps around.
    #[inline]
    pub fn is_periodic(&self, axis: usize) -> bool {
        axis < 3 && self.periodic[axis]
    }

    /// Total number of cells (saturating).
    pub fn cell_count(&self) -> usize {
        self.n_cells
            .iter()
            .fold(1usize, |acc, &n| acc.saturating_mul(n))
    }

    /// Narrowest cell width over the axes that actually partition space.
    ///
    /// A periodic axis with a single cell never separates two objects,
    /// so it does not limit the contact distance.
    pub fn min_cell_width(&self) -> f32 {
        (0..self.dim)
            .filter(|&d| !(self.periodic[d] && self.n_cells[d] == 1))
            .map(|d| self.delta[d])
            .fold(f32::INFINITY, f32::min)
    }

    /// Cell coordinate of `x` along axis `d`.
    #[inline]
    fn axis_coord(&self, d: usize, x: f32) -> usize {
        let n = self.n_cells[d];
        if n == 1 {
            return 0;
        }
        let c = ((x - self.inf[d]) * self.inv_delta[d]).floor();
        if self.periodic[d] {
            (c as i64).rem_euclid(n as i64) as usize
        } else if c <= 0.0 {
            0
        } else {
            (c as usize).min(n - 1)
        }
    }

    /// Linear index of the cell containing `pos`.
    ///
    /// Periodic axes wrap; other axes clamp to the border cells.
    pub fn cell_of(&self, pos: Vec3) -> usize {
        let cx = self.axis_coord(0, pos.x);
        let cy = self.axis_coord(1, pos.y);
        let cz = self.axis_coord(2, pos.z);
        self.linear_index([cx, cy, cz])
    }

    /// Linear index from per-axis coordinates (x fastest).
    #[inline]
    pub fn linear_index(&self, c: [usize; 3]) -> usize {
        c[0] + self.n_cells[0] * (c[1] + self.n_cells[1] * c[2])
    }

    /// Per-axis coordinates of cell `index`.
    pub fn coordinates(&self, index: usize) -> [usize; 3] {
        let [nx, ny, _] = self.n_cells;
        [index % nx, (index / nx) % ny, index / (nx * ny)]
    }

    /// One-line description used in logs.
    pub fn summary(&self) -> String {
        let mut s = format!("steric grid {}D:", self.dim);
        for d in 0..self.dim {
            let sep = if d == 0 { " " } else { " x " };
            let _ = write!(s, "{sep}{}", self.n_cells[d]);
        }
        let _ = write!(s, " = {} cells, width", self.cell_count());
        for d in 0..self.dim {
            let _ = write!(s, " {:.4}", self.delta[d]);
            if self.periodic[d] {
                s.push_str("(p)");
            }
        }
        s
    }
}

/// Forward-neighbour table in compressed-row layout.
///
/// Row `c` starts with offset `0` (the cell itself) followed by the
/// offsets to every distinct neighbour with an index greater than `c`.
#[derive(Debug, Clone, Default)]
pub struct RegionTable {
    start: Vec<u32>,
    offsets: Vec<i32>,
}

impl RegionTable {
    /// Enumerates the 3^dim stencil of every cell.
    pub fn build(geom: &GridGeometry) -> FibraResult<Self> {
        let cells = geom.cell_count();
        let too_large = || {
            FibraError::InvalidConfig(format!(
                "steric grid with {cells} cells is too large for a region table"
            ))
        };
        let _ = i32::try_from(cells).map_err(|_| too_large())?;

        let stencil = stencil(geom.dim);
        let mut start = Vec::with_capacity(cells + 1);
        let mut offsets = Vec::with_capacity(cells * (stencil.len() / 2 + 1));
        let mut forward: Vec<usize> = Vec::with_capacity(stencil.len());

        for c in 0..cells {
            start.push(u32::try_from(offsets.len()).map_err(|_| too_large())?);
            offsets.push(0);

            forward.clear();
            let coord = geom.coordinates(c);
            for step in &stencil {
                if let Some(n) = neighbour(geom, coord, *step) {
                    if n > c && !forward.contains(&n) {
                        forward.push(n);
                    }
                }
            }
            forward.sort_unstable();
            offsets.extend(forward.iter().map(|&n| (n - c) as i32));
        }
        start.push(u32::try_from(offsets.len()).map_err(|_| too_large())?);

        Ok(Self { start, offsets })
    }

    /// Offsets of region `cell`; the first entry is always `0`.
    #[inline]
    pub fn offsets(&self, cell: usize) -> &[i32] {
        let lo = self.start[cell] as usize;
        let hi = self.start[cell + 1] as usize;
        &self.offsets[lo..hi]
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.start.len().saturating_sub(1)
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Every non-zero step of the 3^dim stencil.
fn stencil(dim: usize) -> Vec<[i64; 3]> {
    let span = |d: usize| if d < dim { -1..=1 } else { 0..=0 };
    let mut steps = Vec::with_capacity(27);
    for dz in span(2) {
        for dy in span(1) {
            for dx in span(0) {
                if (dx, dy, dz) != (0, 0, 0) {
                    steps.push([dx, dy, dz]);
                }
            }
        }
    }
    steps
}

/// Cell reached from `coord` by `step`, or `None` past a non-periodic edge.
fn neighbour(geom: &GridGeometry, coord: [usize; 3], step: [i64; 3]) -> Option<usize> {
    let mut out = [0usize; 3];
    for d in 0..3 {
        let n = geom.n_cells[d] as i64;
        let x = coord[d] as i64 + step[d];
        out[d] = if geom.periodic[d] {
            x.rem_euclid(n) as usize
        } else if (0..n).contains(&x) {
            x as usize
        } else {
            return None;
        };
    }
    Some(geom.linear_index(out))
}

/// A grid with its region table, ready for registry use.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    geometry: GridGeometry,
    regions: RegionTable,
}

impl SpatialGrid {
    /// Builds the region table for `geometry`.
    pub fn new(geometry: GridGeometry) -> FibraResult<Self> {
        let regions = RegionTable::build(&geometry)?;
        Ok(Self { geometry, regions })
    }

    /// Grid dimensions.
    #[inline]
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Forward-neighbour table.
    #[inline]
    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    /// Total number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.regions.len()
    }

    /// Linear index of the cell containing `pos`.
    #[inline]
    pub fn cell_of(&self, pos: Vec3) -> usize {
        self.geometry.cell_of(pos)
    }

    /// Absolute indices of the forward neighbours of `cell` (self excluded).
    pub fn forward_neighbours(&self, cell: usize) -> impl Iterator<Item = usize> + '_ {
        self.regions.offsets(cell)[1..]
            .iter()
            .map(move |&o| (cell as i64 + i64::from(o)) as usize)
    }

    /// One-line description used in logs.
    pub fn summary(&self) -> String {
        self.geometry.summary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn unordered_pairs(grid: &SpatialGrid) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for c in 0..grid.cell_count() {
            for n in grid.forward_neighbours(c) {
                pairs.push((c.min(n), c.max(n)));
            }
        }
        pairs
    }

    #[test]
    fn region_starts_with_self() {
        let domain = Domain::centered(Vec3::splat(5.0), 3);
        let grid = SpatialGrid::new(GridGeometry::fit(&domain, 1.0).unwrap()).unwrap();
        for c in 0..grid.cell_count() {
            assert_eq!(grid.regions().offsets(c)[0], 0);
        }
    }

    #[test]
    fn interior_cell_has_thirteen_forward_neighbours() {
        let domain = Domain::centered(Vec3::splat(5.0), 3);
        let geom = GridGeometry::fit(&domain, 1.0).unwrap();
        let grid = SpatialGrid::new(geom).unwrap();
        let centre = geom.linear_index([5, 5, 5]);
        assert_eq!(grid.forward_neighbours(centre).count(), 13);
    }

    #[test]
    fn adjacent_cell_pairs_appear_once() {
        for &(n, periodic) in &[(4.0, false), (4.0, true), (1.0, true), (2.0, true)] {
            let inf = Vec3::ZERO;
            let sup = Vec3::splat(n);
            let domain = if periodic {
                Domain::periodic_box(inf, sup, 3)
            } else {
                Domain::new(inf, sup, 3)
            };
            let grid = SpatialGrid::new(GridGeometry::fit(&domain, 1.0).unwrap()).unwrap();
            let pairs = unordered_pairs(&grid);
            let unique: HashSet<_> = pairs.iter().copied().collect();
            assert_eq!(pairs.len(), unique.len(), "duplicate pair (n={n}, periodic={periodic})");
            assert!(pairs.iter().all(|(a, b)| a < b));
        }
    }

    #[test]
    fn periodic_regions_cover_every_stencil_neighbour() {
        let domain = Domain::periodic_box(Vec3::ZERO, Vec3::new(4.0, 3.0, 0.0), 2);
        let geom = GridGeometry::fit(&domain, 1.0).unwrap();
        let grid = SpatialGrid::new(geom).unwrap();
        let pairs: HashSet<_> = unordered_pairs(&grid).into_iter().collect();

        for c in 0..grid.cell_count() {
            let coord = geom.coordinates(c);
            for step in stencil(2) {
                let n = neighbour(&geom, coord, step).unwrap();
                if n != c {
                    assert!(pairs.contains(&(c.min(n), c.max(n))));
                }
            }
        }
    }

    #[test]
    fn one_dimensional_grid() {
        let domain = Domain::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0), 1);
        let geom = GridGeometry::fit(&domain, 2.0).unwrap();
        assert_eq!(geom.dimensions(), [7, 1, 1]);
        let grid = SpatialGrid::new(geom).unwrap();
        assert_eq!(grid.forward_neighbours(0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(grid.forward_neighbours(6).count(), 0);
    }

    #[test]
    fn coordinates_round_trip() {
        let domain = Domain::centered(Vec3::new(3.0, 2.0, 1.0), 3);
        let geom = GridGeometry::fit(&domain, 0.7).unwrap();
        for c in 0..geom.cell_count() {
            assert_eq!(geom.linear_index(geom.coordinates(c)), c);
        }
    }

    #[test]
    fn axis_coordinate_wraps_and_clamps() {
        let domain = Domain::new(Vec3::ZERO, Vec3::new(10.0, 10.0, 0.0), 2).with_periodic(0, true);
        let geom = GridGeometry::fit(&domain, 1.0).unwrap();
        assert_eq!(geom.axis_coord(0, -0.5), 9);
        assert_eq!(geom.axis_coord(0, 10.5), 0);
        assert_eq!(geom.axis_coord(1, -100.0), 0);
        assert_eq!(geom.axis_coord(1, 100.0), geom.dimensions()[1] - 1);
    }

    #[test]
    fn summary_names_every_axis() {
        let domain = Domain::centered(Vec3::splat(1.0), 3);
        let geom = GridGeometry::fit(&domain, 1.0).unwrap();
        assert_eq!(geom.summary(), "steric grid 3D: 4 x 4 x 4 = 64 cells, width 1.0000 1.0000 1.0000");
    }
}
