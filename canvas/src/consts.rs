//! Shared numeric constants for the canvas crate.

// ── Viewport ────────────────────────────────────────────────────

/// Smallest allowed zoom. At 1.0 the surface exactly fills the canvas.
pub const MIN_SCALE: f64 = 1.0;

/// Largest allowed zoom.
pub const MAX_SCALE: f64 = 10.0;

/// Scale multiplier for one wheel notch towards the user (zoom in).
pub const ZOOM_IN_FACTOR: f64 = 1.1;

/// Scale multiplier for one wheel notch away from the user (zoom out).
pub const ZOOM_OUT_FACTOR: f64 = 0.9;

// ── Grid ────────────────────────────────────────────────────────

/// Screen pixels per grid cell at scale 1.0.
pub const CELL_SIZE: f64 = 2.0;

/// Calibration offset added after rounding a screen point to the grid.
///
/// Ties the discrete grid to the point-sprite origin; click accuracy depends
/// on this exact value.
pub const GRID_OFFSET: f64 = 1.8;

/// A click lands on a pixel when both axes are strictly closer than this.
pub const HIT_TOLERANCE: f64 = 2.0;

// ── Selection ───────────────────────────────────────────────────

/// Maximum staged pixels for a non-privileged user.
pub const SELECTION_QUOTA: usize = 10;

// ── Rendering ───────────────────────────────────────────────────

/// Point sprite size in device pixels at scale 1.0.
pub const POINT_SIZE_PX: f64 = 4.0;

/// Pending paint color before the user picks one.
pub const DEFAULT_PAINT_COLOR: &str = "#000000";
