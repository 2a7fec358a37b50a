//! Engine-wide defaults and numerical thresholds.

/// Smallest length treated as non-zero (segment lengths, cell widths, ranges).
pub const REAL_EPSILON: f32 = 1.0e-6;

/// Hard cap on the number of cells of the steric grid (2^17).
pub const DEFAULT_MAX_CELLS: usize = 1 << 17;

/// Number of interaction panes compiled into the registry by default.
pub const DEFAULT_PANE_COUNT: u8 = 1;

/// Largest pane count accepted by the configuration (one bit per pane in a `u8` mask).
pub const MAX_PANES: u8 = 8;

/// Factor applied to a filament's target segmentation to bound its longest segment.
///
/// Filaments re-segment themselves so that actual segments never exceed
/// 4/3 of the target; 1.4 leaves a small margin on top of that.
pub const SEGMENTATION_SLACK: f32 = 1.4;

/// Grids above this many cells are summarised in the log when built.
pub const GRID_SUMMARY_THRESHOLD: usize = 4096;
