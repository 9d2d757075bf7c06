//! Viewport controller: pan/zoom state and screen ↔ grid conversions.
//!
//! The camera maps grid space onto a fixed-size render surface. Zoom is
//! bounded to [`MIN_SCALE`, `MAX_SCALE`] and panning is clamped so the
//! zoomed surface always covers the canvas: translation stays within
//! `[-width * (zoom - 1), 0]` horizontally and the same for height.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::consts::{CELL_SIZE, GRID_OFFSET, MAX_SCALE, MIN_SCALE, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};

/// A point in screen, world, or grid space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size of the render surface in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

impl Surface {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width: width.max(1.0), height: height.max(1.0) }
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self { width: 1.0, height: 1.0 }
    }
}

/// Camera state for pan/zoom over the pixel grid.
///
/// `pan_x` / `pan_y` are in device pixels and never positive.
/// `zoom` is a scale factor (1.0 = no zoom).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Convert a screen-space point to unrounded world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point { x: (screen.x - self.pan_x) / self.zoom, y: (screen.y - self.pan_y) / self.zoom }
    }

    /// Convert a world-space point to screen coordinates.
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point { x: world.x * self.zoom + self.pan_x, y: world.y * self.zoom + self.pan_y }
    }

    /// Convert a screen-space point to the grid coordinate used for hit tests.
    ///
    /// `round((screen - pan) / (zoom * CELL_SIZE)) + GRID_OFFSET` per axis.
    #[must_use]
    pub fn screen_to_grid(&self, screen: Point) -> Point {
        let world = self.screen_to_world(screen);
        Point { x: (world.x / CELL_SIZE).round() + GRID_OFFSET, y: (world.y / CELL_SIZE).round() + GRID_OFFSET }
    }

    /// Inverse of [`Camera::screen_to_grid`], without the rounding step.
    #[must_use]
    pub fn grid_to_screen(&self, grid: Point) -> Point {
        self.world_to_screen(Point { x: (grid.x - GRID_OFFSET) * CELL_SIZE, y: (grid.y - GRID_OFFSET) * CELL_SIZE })
    }

    /// Allowed translation range `(min_x, max_x, min_y, max_y)` at the current zoom.
    #[must_use]
    pub fn pan_bounds(&self, surface: Surface) -> (f64, f64, f64, f64) {
        (-surface.width * (self.zoom - 1.0), 0.0, -surface.height * (self.zoom - 1.0), 0.0)
    }

    /// Pull the translation back inside [`Camera::pan_bounds`].
    pub fn clamp_pan(&mut self, surface: Surface) {
        let (min_x, max_x, min_y, max_y) = self.pan_bounds(surface);
        self.pan_x = self.pan_x.clamp(min_x, max_x);
        self.pan_y = self.pan_y.clamp(min_y, max_y);
    }

    /// Zoom one wheel notch around `cursor`, keeping the point under it fixed.
    ///
    /// A positive `wheel_dy` zooms out. Returns `true` if the camera changed.
    #[allow(clippy::float_cmp)]
    pub fn zoom_at(&mut self, cursor: Point, wheel_dy: f64, surface: Surface) -> bool {
        let factor = if wheel_dy > 0.0 { ZOOM_OUT_FACTOR } else { ZOOM_IN_FACTOR };
        let new_zoom = (self.zoom * factor).clamp(MIN_SCALE, MAX_SCALE);
        if new_zoom == self.zoom {
            return false;
        }
        let before = *self;
        let ratio = new_zoom / self.zoom;

        self.pan_x = cursor.x - (cursor.x - self.pan_x) * ratio;
        self.pan_y = cursor.y - (cursor.y - self.pan_y) * ratio;
        self.zoom = new_zoom;
        self.clamp_pan(surface);

        *self != before
    }

    /// Accumulate a drag delta into the translation. Returns `true` if the camera changed.
    pub fn pan_by(&mut self, dx: f64, dy: f64, surface: Surface) -> bool {
        let before = *self;
        self.pan_x += dx;
        self.pan_y += dy;
        self.clamp_pan(surface);
        *self != before
    }

    /// Return to zoom 1.0 with no translation.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
