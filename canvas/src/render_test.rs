#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{GridPos, Pixel};

const EPSILON: f32 = 1e-6;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn px(id: &str, x: i32, y: i32, color: &str) -> Pixel {
    Pixel { id: id.to_owned(), position: GridPos::new(x, y), color: color.to_owned() }
}

fn five_pixel_store() -> PixelStore {
    let mut store = PixelStore::new();
    store.replace_all(vec![
        px("P1", 0, 0, "#ff0000"),
        px("P2", 1, 0, "#00ff00"),
        px("P3", 2, 0, "#0000ff"),
        px("P4", 3, 0, "#ffffff"),
        px("P5", 4, 0, "#000000"),
    ]);
    store
}

fn color_of(buffers: &RenderBuffers, index: usize) -> [f32; 3] {
    [buffers.colors[index * 3], buffers.colors[index * 3 + 1], buffers.colors[index * 3 + 2]]
}

// =============================================================
// RenderBuffers
// =============================================================

#[test]
fn empty_store_yields_empty_buffers() {
    let buffers = RenderBuffers::build(&PixelStore::new(), &SelectionSet::default(), "#000000");
    assert!(buffers.is_empty());
    assert_eq!(buffers.len(), 0);
}

#[test]
fn buffer_sizes_match_pixel_count() {
    let store = five_pixel_store();
    let buffers = RenderBuffers::build(&store, &SelectionSet::default(), "#000000");
    assert_eq!(buffers.positions.len(), 2 * store.len());
    assert_eq!(buffers.colors.len(), 3 * store.len());
    assert_eq!(buffers.len(), store.len());
}

#[test]
fn positions_follow_store_order() {
    let store = five_pixel_store();
    let buffers = RenderBuffers::build(&store, &SelectionSet::default(), "#000000");
    assert_eq!(buffers.positions, vec![0.0, 0.0, 1.0, 0.0, 2.0, 0.0, 3.0, 0.0, 4.0, 0.0]);
}

#[test]
fn colors_are_unit_fractions_of_stored_hex() {
    let mut store = PixelStore::new();
    store.replace_all(vec![px("a", 0, 0, "#07c983")]);
    let buffers = RenderBuffers::build(&store, &SelectionSet::default(), "#000000");
    let [r, g, b] = color_of(&buffers, 0);
    assert!(approx_eq(r, 7.0 / 255.0));
    assert!(approx_eq(g, 201.0 / 255.0));
    assert!(approx_eq(b, 131.0 / 255.0));
}

#[test]
fn selected_pixels_preview_pending_color() {
    let store = five_pixel_store();
    let mut selection = SelectionSet::default();
    selection.toggle_or_add("P2");
    let buffers = RenderBuffers::build(&store, &selection, "#ffff00");
    assert_eq!(color_of(&buffers, 0), [1.0, 0.0, 0.0]);
    assert_eq!(color_of(&buffers, 1), [1.0, 1.0, 0.0]);
    assert_eq!(color_of(&buffers, 2), [0.0, 0.0, 1.0]);
}

#[test]
fn build_is_idempotent() {
    let store = five_pixel_store();
    let mut selection = SelectionSet::default();
    selection.toggle_or_add("P4");
    let a = RenderBuffers::build(&store, &selection, "#123456");
    let b = RenderBuffers::build(&store, &selection, "#123456");
    assert_eq!(a, b);
}

#[test]
fn push_update_is_reflected_only_on_the_updated_pixel() {
    let mut store = five_pixel_store();
    let selection = SelectionSet::default();
    let before = RenderBuffers::build(&store, &selection, "#000000");

    store.merge(vec![px("P3", 2, 0, "#07c983")]);
    let after = RenderBuffers::build(&store, &selection, "#000000");

    for index in [0, 1, 3, 4] {
        assert_eq!(color_of(&before, index), color_of(&after, index));
    }
    let [r, g, b] = color_of(&after, 2);
    assert!(approx_eq(r, 7.0 / 255.0));
    assert!(approx_eq(g, 201.0 / 255.0));
    assert!(approx_eq(b, 131.0 / 255.0));
    assert_eq!(before.positions, after.positions);
}

// =============================================================
// DrawParams / clip space
// =============================================================

#[test]
fn draw_params_follow_camera() {
    let cam = Camera { pan_x: -12.0, pan_y: -6.0, zoom: 2.5 };
    let params = DrawParams::new(&cam, Surface::new(200.0, 100.0));
    assert_eq!(params.resolution, [200.0, 100.0]);
    assert_eq!(params.translation, [-12.0, -6.0]);
    assert_eq!(params.scale, 2.5);
    assert_eq!(params.point_size, 10.0);
}

#[test]
fn clip_space_maps_surface_corners_with_flipped_y() {
    let params = DrawParams::new(&Camera::default(), Surface::new(100.0, 100.0));
    let origin = to_clip_space([0.0, 0.0], &params);
    assert!(approx_eq(origin[0], -1.0) && approx_eq(origin[1], 1.0));
    let center = to_clip_space([25.0, 25.0], &params);
    assert!(approx_eq(center[0], 0.0) && approx_eq(center[1], 0.0));
    let far = to_clip_space([50.0, 50.0], &params);
    assert!(approx_eq(far[0], 1.0) && approx_eq(far[1], -1.0));
}

#[test]
fn clip_space_applies_scale_then_translation() {
    let cam = Camera { pan_x: -50.0, pan_y: 0.0, zoom: 2.0 };
    let params = DrawParams::new(&cam, Surface::new(100.0, 100.0));
    // 25 * 2 * 2 - 50 = 50 → centre of a 100px surface.
    let p = to_clip_space([25.0, 0.0], &params);
    assert!(approx_eq(p[0], 0.0));
}

// =============================================================
// RenderFrame / surface sizing
// =============================================================

#[test]
fn frame_bundles_buffers_and_params() {
    let store = five_pixel_store();
    let cam = Camera::default();
    let frame = RenderFrame::build(&store, &SelectionSet::default(), "#000000", &cam, Surface::new(8.0, 1.0));
    assert_eq!(frame.buffers.len(), 5);
    assert_eq!(frame.params.resolution, [8.0, 1.0]);
}

#[test]
fn surface_doubles_painted_extent() {
    let mut store = PixelStore::new();
    store.replace_all(vec![px("a", 10, 20, "#000000"), px("b", 60, 45, "#000000")]);
    assert_eq!(surface_for_extent(&store), Some(Surface::new(100.0, 50.0)));
}

#[test]
fn surface_spanning_full_coordinate_range() {
    let mut store = PixelStore::new();
    store.replace_all(vec![px("lo", i32::MIN, 0, "#000000"), px("hi", i32::MAX, 0, "#000000")]);
    let surface = surface_for_extent(&store).unwrap();
    let span = f64::from(i32::MAX) - f64::from(i32::MIN);
    assert_eq!(surface.width, span * CELL_SIZE);
    assert_eq!(surface.height, 1.0);
}

#[test]
fn surface_for_single_pixel_is_at_least_one_pixel() {
    let mut store = PixelStore::new();
    store.replace_all(vec![px("a", 3, 3, "#000000")]);
    assert_eq!(surface_for_extent(&store), Some(Surface::new(1.0, 1.0)));
}

#[test]
fn surface_for_empty_store_is_none() {
    assert_eq!(surface_for_extent(&PixelStore::new()), None);
}
