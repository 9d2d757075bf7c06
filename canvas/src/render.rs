//! Render pipeline: turns store, selection, pending color, and camera into
//! the flat vertex buffers consumed by the point shader.
//!
//! Buffers are rebuilt wholesale on every recompute. Selected pixels are
//! emitted with the pending color so the user sees a preview of the paint
//! before it is committed. Nothing here touches the browser; [`crate::gl`]
//! uploads the result.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::camera::{Camera, Surface};
use crate::color::hex_to_unit;
use crate::consts::{CELL_SIZE, POINT_SIZE_PX};
use crate::doc::PixelStore;
use crate::selection::SelectionSet;

/// Per-pixel vertex data: 2 position floats and 3 color floats per pixel,
/// in matching order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderBuffers {
    /// Grid `x, y` per pixel.
    pub positions: Vec<f32>,
    /// `r, g, b` in `[0, 1]` per pixel.
    pub colors: Vec<f32>,
}

impl RenderBuffers {
    /// Build buffers for every pixel in `store`, previewing `pending_color` on
    /// pixels staged in `selection`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn build(store: &PixelStore, selection: &SelectionSet, pending_color: &str) -> Self {
        let pending = hex_to_unit(pending_color);
        let mut positions = Vec::with_capacity(store.len() * 2);
        let mut colors = Vec::with_capacity(store.len() * 3);

        for pixel in store.pixels() {
            positions.push(pixel.position.x as f32);
            positions.push(pixel.position.y as f32);

            let rgb = if selection.contains(&pixel.id) { pending } else { hex_to_unit(&pixel.color) };
            colors.extend_from_slice(&rgb);
        }

        Self { positions, colors }
    }

    /// Number of pixels (vertices) in the buffers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len() / 2
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Uniforms for one draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawParams {
    /// Surface size in device pixels.
    pub resolution: [f32; 2],
    /// Camera translation in device pixels.
    pub translation: [f32; 2],
    /// Camera zoom.
    pub scale: f32,
    /// Point sprite size, proportional to zoom.
    pub point_size: f32,
}

impl DrawParams {
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(camera: &Camera, surface: Surface) -> Self {
        Self {
            resolution: [surface.width as f32, surface.height as f32],
            translation: [camera.pan_x as f32, camera.pan_y as f32],
            scale: camera.zoom as f32,
            point_size: (POINT_SIZE_PX * camera.zoom) as f32,
        }
    }
}

/// Map a grid position to normalized device coordinates, exactly as the
/// vertex shader does: scale, translate, normalize, flip y.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_clip_space(position: [f32; 2], params: &DrawParams) -> [f32; 2] {
    let cell = CELL_SIZE as f32;
    let px = position[0] * params.scale * cell + params.translation[0];
    let py = position[1] * params.scale * cell + params.translation[1];
    let cx = (px / params.resolution[0]) * 2.0 - 1.0;
    let cy = (py / params.resolution[1]) * 2.0 - 1.0;
    [cx, -cy]
}

/// Everything one draw call needs.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub buffers: RenderBuffers,
    pub params: DrawParams,
}

impl RenderFrame {
    #[must_use]
    pub fn build(
        store: &PixelStore,
        selection: &SelectionSet,
        pending_color: &str,
        camera: &Camera,
        surface: Surface,
    ) -> Self {
        Self {
            buffers: RenderBuffers::build(store, selection, pending_color),
            params: DrawParams::new(camera, surface),
        }
    }
}

/// Surface size for the painted extent: twice the span on each axis.
#[must_use]
pub fn surface_for_extent(store: &PixelStore) -> Option<Surface> {
    let (lo, hi) = store.extent()?;
    let width = (f64::from(hi.x) - f64::from(lo.x)) * CELL_SIZE;
    let height = (f64::from(hi.y) - f64::from(lo.y)) * CELL_SIZE;
    Some(Surface::new(width, height))
}
