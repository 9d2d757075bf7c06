#![allow(clippy::float_cmp)]

use super::*;

fn px(id: &str, x: i32, y: i32, color: &str) -> Pixel {
    Pixel { id: id.to_owned(), position: GridPos::new(x, y), color: color.to_owned() }
}

fn ids(store: &PixelStore) -> Vec<&str> {
    store.pixels().iter().map(|p| p.id.as_str()).collect()
}

// =============================================================
// Pixel serde
// =============================================================

#[test]
fn pixel_serde_roundtrip() {
    let pixel = px("p1", 3, -4, "#07c983");
    let json = serde_json::to_string(&pixel).unwrap();
    let back: Pixel = serde_json::from_str(&json).unwrap();
    assert_eq!(back, pixel);
}

#[test]
fn grid_pos_serializes_as_xy_object() {
    let json = serde_json::to_value(GridPos::new(7, 9)).unwrap();
    assert_eq!(json, serde_json::json!({ "x": 7, "y": 9 }));
}

// =============================================================
// Load state
// =============================================================

#[test]
fn new_store_is_not_loaded() {
    let store = PixelStore::new();
    assert_eq!(store.load_state(), &LoadState::NotLoaded);
    assert!(!store.is_loaded());
    assert!(store.is_empty());
}

#[test]
fn empty_snapshot_counts_as_loaded() {
    let mut store = PixelStore::new();
    store.replace_all(Vec::new());
    assert!(store.is_loaded());
    assert!(store.is_empty());
}

#[test]
fn failed_fetch_is_distinguishable_from_empty_board() {
    let mut store = PixelStore::new();
    store.mark_failed("connection refused");
    assert_eq!(store.load_state(), &LoadState::Failed("connection refused".to_owned()));
    assert!(!store.is_loaded());
    assert!(store.is_empty());
}

#[test]
fn failure_after_successful_load_keeps_loaded_state() {
    let mut store = PixelStore::new();
    store.replace_all(vec![px("a", 0, 0, "#000000")]);
    store.mark_failed("refresh failed");
    assert!(store.is_loaded());
    assert_eq!(store.len(), 1);
}

#[test]
fn snapshot_after_failure_recovers() {
    let mut store = PixelStore::new();
    store.mark_failed("timeout");
    store.replace_all(vec![px("a", 0, 0, "#000000")]);
    assert!(store.is_loaded());
}

// =============================================================
// replace_all
// =============================================================

#[test]
fn replace_all_discards_previous_contents() {
    let mut store = PixelStore::new();
    store.replace_all(vec![px("a", 0, 0, "#000000"), px("b", 1, 1, "#000000")]);
    store.replace_all(vec![px("c", 2, 2, "#ffffff")]);
    assert_eq!(ids(&store), vec!["c"]);
    assert!(store.get("a").is_none());
}

#[test]
fn replace_all_collapses_duplicate_ids() {
    let mut store = PixelStore::new();
    store.replace_all(vec![px("a", 0, 0, "#000000"), px("a", 0, 0, "#ff0000")]);
    assert_eq!(store.len(), 1);
    assert_eq!(store.get("a").unwrap().color, "#ff0000");
}

// =============================================================
// merge
// =============================================================

#[test]
fn merge_replaces_existing_entry_in_place() {
    let mut store = PixelStore::new();
    store.replace_all(vec![px("a", 0, 0, "#000000"), px("b", 1, 1, "#000000")]);
    let changed = store.merge(vec![px("a", 0, 0, "#ff0000")]);
    assert_eq!(changed, 1);
    assert_eq!(ids(&store), vec!["a", "b"]);
    assert_eq!(store.get("a").unwrap().color, "#ff0000");
}

#[test]
fn merge_inserts_unknown_ids() {
    let mut store = PixelStore::new();
    store.replace_all(vec![px("a", 0, 0, "#000000")]);
    store.merge(vec![px("z", 9, 9, "#00ff00")]);
    assert_eq!(ids(&store), vec!["a", "z"]);
}

#[test]
fn merge_is_idempotent() {
    let mut store = PixelStore::new();
    store.replace_all(vec![px("a", 0, 0, "#000000"), px("b", 1, 1, "#000000")]);
    let update = vec![px("b", 1, 1, "#123456"), px("c", 2, 2, "#abcdef")];

    store.merge(update.clone());
    let once: Vec<Pixel> = store.pixels().to_vec();
    let changed = store.merge(update);

    assert_eq!(changed, 0);
    assert_eq!(store.pixels(), once.as_slice());
}

#[test]
fn merge_last_write_wins_within_one_batch() {
    let mut store = PixelStore::new();
    store.merge(vec![px("a", 0, 0, "#111111"), px("a", 0, 0, "#222222")]);
    assert_eq!(store.get("a").unwrap().color, "#222222");
}

#[test]
fn merge_before_snapshot_does_not_mark_loaded() {
    let mut store = PixelStore::new();
    store.merge(vec![px("a", 0, 0, "#000000")]);
    assert_eq!(store.len(), 1);
    assert!(!store.is_loaded());
}

// =============================================================
// recolor
// =============================================================

#[test]
fn recolor_updates_only_listed_ids() {
    let mut store = PixelStore::new();
    store.replace_all(vec![px("a", 0, 0, "#000000"), px("b", 1, 1, "#000000")]);
    let changed = store.recolor(&["b".to_owned(), "missing".to_owned()], "#ff00ff");
    assert_eq!(changed, 1);
    assert_eq!(store.get("a").unwrap().color, "#000000");
    assert_eq!(store.get("b").unwrap().color, "#ff00ff");
}

// =============================================================
// Queries
// =============================================================

#[test]
fn find_near_uses_strict_tolerance() {
    let mut store = PixelStore::new();
    store.replace_all(vec![px("a", 10, 10, "#000000")]);
    assert_eq!(store.find_near(Point::new(11.8, 8.2), 2.0).map(|p| p.id.as_str()), Some("a"));
    assert!(store.find_near(Point::new(12.0, 10.0), 2.0).is_none());
}

#[test]
fn find_near_returns_first_in_store_order() {
    let mut store = PixelStore::new();
    store.replace_all(vec![px("a", 10, 10, "#000000"), px("b", 11, 11, "#000000")]);
    assert_eq!(store.find_near(Point::new(10.8, 10.8), 2.0).map(|p| p.id.as_str()), Some("a"));
}

#[test]
fn ids_in_rect_is_inclusive() {
    let mut store = PixelStore::new();
    store.replace_all(vec![
        px("p00", 0, 0, "#000000"),
        px("p11", 1, 1, "#000000"),
        px("p22", 2, 2, "#000000"),
        px("p55", 5, 5, "#000000"),
    ]);
    let selected = store.ids_in_rect(Point::new(0.0, 0.0), Point::new(2.0, 2.0));
    assert_eq!(selected, vec!["p00", "p11", "p22"]);
}

#[test]
fn ids_in_rect_accepts_reversed_corners() {
    let mut store = PixelStore::new();
    store.replace_all(vec![px("a", 3, 1, "#000000"), px("b", 4, 4, "#000000")]);
    let selected = store.ids_in_rect(Point::new(5.0, 0.0), Point::new(3.0, 2.0));
    assert_eq!(selected, vec!["a"]);
}

#[test]
fn extent_of_empty_store_is_none() {
    assert!(PixelStore::new().extent().is_none());
}

#[test]
fn extent_spans_all_pixels() {
    let mut store = PixelStore::new();
    store.replace_all(vec![px("a", 3, 10, "#000000"), px("b", -2, 4, "#000000"), px("c", 8, 6, "#000000")]);
    assert_eq!(store.extent(), Some((GridPos::new(-2, 4), GridPos::new(8, 10))));
}
