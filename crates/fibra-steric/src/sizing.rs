//! Grid sizing: choose a cell width that is wide enough and cheap enough.
//!
//! Starting from `max(user width, required range)`, the width is
//! multiplied by √2 until the grid fits the cell cap. Coarsening stops
//! being possible once every non-periodic axis has its minimum of three
//! cells and every periodic axis a single one, so a cap below that
//! floor is a configuration error.

use fibra_math::Domain;
use fibra_types::constants::REAL_EPSILON;
use fibra_types::{FibraError, FibraResult};

use crate::grid::GridGeometry;

/// Upper bound on coarsening steps (a factor of 2^64 on the width).
const MAX_COARSENING_STEPS: usize = 128;

/// Outcome of [`size_grid`].
#[derive(Debug, Clone, Copy)]
pub struct GridSizing {
    /// Operative minimum cell width.
    pub width: f32,
    /// Grid fitted with that width.
    pub geometry: GridGeometry,
    /// Number of √2 steps taken to respect the cell cap.
    pub coarsening_steps: usize,
}

/// Picks the cell width and grid for `domain`.
///
/// `required` is the estimated contact range, `floor` the user (or
/// previously persisted) width; the larger wins.
pub fn size_grid(
    domain: &Domain,
    required: f32,
    floor: Option<f32>,
    max_cells: usize,
) -> FibraResult<GridSizing> {
    domain.validate()?;

    let mut width = floor.unwrap_or(0.0).max(required);
    if !(width.is_finite() && width > REAL_EPSILON) {
        return Err(FibraError::InvalidConfig(format!(
            "steric max_range must be defined and positive (got {width})"
        )));
    }

    let minimum = GridGeometry::minimum_cell_count(domain);
    if max_cells < minimum {
        return Err(FibraError::InvalidConfig(format!(
            "steric max_cells = {max_cells} is below the smallest possible grid ({minimum} cells)"
        )));
    }

    for steps in 0..MAX_COARSENING_STEPS {
        let geometry = GridGeometry::fit(domain, width)?;
        if geometry.cell_count() <= max_cells {
            return Ok(GridSizing {
                width,
                geometry,
                coarsening_steps: steps,
            });
        }
        width *= std::f32::consts::SQRT_2;
    }

    Err(FibraError::InvalidConfig(format!(
        "could not fit a steric grid under {max_cells} cells"
    )))
}
