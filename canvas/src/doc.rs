//! Document model: painted pixels and the in-memory pixel store.
//!
//! Pixels arrive from the network twice: once as a bulk snapshot when the
//! board opens, then as incremental pushes whenever someone paints. The store
//! keeps them in insertion order behind an id index so that merges are
//! last-write-wins per id and render output is deterministic.
//!
//! The store also remembers whether the bulk snapshot ever arrived. An empty
//! store that was never loaded must not be presented as an empty board.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::camera::Point;

/// Opaque unique identifier for a pixel, assigned by the backend.
pub type PixelId = String;

/// Integer position on the logical grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    #[must_use]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A painted pixel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pixel {
    /// Backend-assigned identifier.
    pub id: PixelId,
    /// Grid position.
    pub position: GridPos,
    /// Color as `#rrggbb`.
    pub color: String,
}

/// Whether the bulk snapshot has been applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// No snapshot yet. Pushes may already have been merged.
    #[default]
    NotLoaded,
    /// A snapshot was applied, possibly with zero pixels.
    Loaded,
    /// The snapshot fetch failed with the given reason.
    Failed(String),
}

/// In-memory store of painted pixels.
#[derive(Debug, Default)]
pub struct PixelStore {
    pixels: Vec<Pixel>,
    index: HashMap<PixelId, usize>,
    state: LoadState,
}

impl PixelStore {
    /// Create an empty, not-yet-loaded store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all pixels with a bulk snapshot and mark the store loaded.
    ///
    /// Duplicate ids inside the snapshot collapse to the last occurrence.
    pub fn replace_all(&mut self, pixels: Vec<Pixel>) {
        self.pixels.clear();
        self.index.clear();
        self.upsert_all(pixels);
        self.state = LoadState::Loaded;
    }

    /// Merge incremental updates. An update with a known id fully replaces
    /// the stored pixel; an unknown id is appended. Returns how many entries
    /// actually changed.
    pub fn merge(&mut self, updates: Vec<Pixel>) -> usize {
        self.upsert_all(updates)
    }

    /// Record a failed snapshot fetch. Contents are left as they were.
    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        if self.state != LoadState::Loaded {
            self.state = LoadState::Failed(reason.into());
        }
    }

    /// Repaint the given ids locally. Unknown ids are ignored.
    /// Returns how many pixels changed color.
    pub fn recolor(&mut self, ids: &[PixelId], color: &str) -> usize {
        let mut changed = 0;
        for id in ids {
            let Some(&slot) = self.index.get(id) else {
                continue;
            };
            let pixel = &mut self.pixels[slot];
            if pixel.color != color {
                pixel.color = color.to_owned();
                changed += 1;
            }
        }
        changed
    }

    fn upsert_all(&mut self, pixels: Vec<Pixel>) -> usize {
        let mut changed = 0;
        for pixel in pixels {
            if let Some(&slot) = self.index.get(&pixel.id) {
                if self.pixels[slot] != pixel {
                    self.pixels[slot] = pixel;
                    changed += 1;
                }
            } else {
                self.index.insert(pixel.id.clone(), self.pixels.len());
                self.pixels.push(pixel);
                changed += 1;
            }
        }
        changed
    }

    /// Current load state.
    #[must_use]
    pub fn load_state(&self) -> &LoadState {
        &self.state
    }

    /// Returns `true` once a snapshot has been applied.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    /// Look up a pixel by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Pixel> {
        self.index.get(id).map(|&slot| &self.pixels[slot])
    }

    /// All pixels in insertion order.
    #[must_use]
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// First pixel whose position is strictly closer than `tolerance` to
    /// `grid` on both axes.
    #[must_use]
    pub fn find_near(&self, grid: Point, tolerance: f64) -> Option<&Pixel> {
        self.pixels.iter().find(|p| {
            (f64::from(p.position.x) - grid.x).abs() < tolerance && (f64::from(p.position.y) - grid.y).abs() < tolerance
        })
    }

    /// Ids of every pixel inside the inclusive rectangle spanned by `a` and `b`.
    #[must_use]
    pub fn ids_in_rect(&self, a: Point, b: Point) -> Vec<PixelId> {
        let (min_x, max_x) = (a.x.min(b.x), a.x.max(b.x));
        let (min_y, max_y) = (a.y.min(b.y), a.y.max(b.y));
        self.pixels
            .iter()
            .filter(|p| {
                let (x, y) = (f64::from(p.position.x), f64::from(p.position.y));
                x >= min_x && x <= max_x && y >= min_y && y <= max_y
            })
            .map(|p| p.id.clone())
            .collect()
    }

    /// Minimum and maximum grid positions, or `None` when empty.
    #[must_use]
    pub fn extent(&self) -> Option<(GridPos, GridPos)> {
        let first = self.pixels.first()?.position;
        let extent = self.pixels.iter().fold((first, first), |(lo, hi), p| {
            (
                GridPos::new(lo.x.min(p.position.x), lo.y.min(p.position.y)),
                GridPos::new(hi.x.max(p.position.x), hi.y.max(p.position.y)),
            )
        });
        Some(extent)
    }

    /// Number of pixels currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Returns `true` if the store holds no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}
