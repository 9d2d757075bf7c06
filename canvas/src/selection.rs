//! Selection set: the pixels staged for the next paint action.
//!
//! Regular users may stage at most [`SELECTION_QUOTA`] pixels. The privileged
//! actor (the fee recipient) is exempt and may also drag out a rectangular
//! area that replaces the whole selection.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use crate::camera::Point;
use crate::consts::SELECTION_QUOTA;
use crate::doc::{PixelId, PixelStore};

/// Ordered set of staged pixel ids.
#[derive(Debug, Clone)]
pub struct SelectionSet {
    ids: Vec<PixelId>,
    quota: usize,
    privileged: bool,
    area_origin: Option<Point>,
}

impl Default for SelectionSet {
    fn default() -> Self {
        Self::new(SELECTION_QUOTA)
    }
}

impl SelectionSet {
    /// Create an empty, non-privileged selection with the given quota.
    #[must_use]
    pub fn new(quota: usize) -> Self {
        Self { ids: Vec::new(), quota, privileged: false, area_origin: None }
    }

    /// Grant or revoke quota exemption. Revoking stops any area gesture.
    pub fn set_privileged(&mut self, privileged: bool) {
        self.privileged = privileged;
        if !privileged {
            self.area_origin = None;
        }
    }

    #[must_use]
    pub fn is_privileged(&self) -> bool {
        self.privileged
    }

    #[must_use]
    pub fn quota(&self) -> usize {
        self.quota
    }

    /// Stage `id`. Returns `true` if it was added.
    ///
    /// Already-staged ids are left alone; non-privileged users stop at the quota.
    pub fn toggle_or_add(&mut self, id: &str) -> bool {
        if self.contains(id) || self.at_quota() {
            return false;
        }
        self.ids.push(id.to_owned());
        true
    }

    /// Begin a rectangular area gesture at `origin` (grid space).
    /// Returns `false` for non-privileged users.
    pub fn start_area(&mut self, origin: Point) -> bool {
        if !self.privileged {
            return false;
        }
        self.area_origin = Some(origin);
        true
    }

    /// Replace the selection with every pixel inside the rectangle from the
    /// gesture origin to `current`. Returns `true` if the selection changed.
    pub fn update_area(&mut self, current: Point, store: &PixelStore) -> bool {
        let Some(origin) = self.area_origin else {
            return false;
        };
        let ids = store.ids_in_rect(origin, current);
        if ids == self.ids {
            return false;
        }
        self.ids = ids;
        true
    }

    /// Stop the area gesture, keeping whatever it selected.
    pub fn end_area(&mut self) {
        self.area_origin = None;
    }

    /// Returns `true` while an area gesture is in progress.
    #[must_use]
    pub fn is_area_active(&self) -> bool {
        self.area_origin.is_some()
    }

    /// Clear everything.
    pub fn reset(&mut self) {
        self.ids.clear();
        self.area_origin = None;
    }

    /// Escape-key behavior: always stops the area gesture, and clears the
    /// selection only for the privileged actor. Returns `true` if the
    /// selection was cleared.
    pub fn cancel(&mut self) -> bool {
        self.area_origin = None;
        if self.privileged && !self.ids.is_empty() {
            self.ids.clear();
            return true;
        }
        false
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|s| s == id)
    }

    /// Staged ids in the order they were added.
    #[must_use]
    pub fn ids(&self) -> &[PixelId] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns `true` when a non-privileged user cannot stage another pixel.
    #[must_use]
    pub fn at_quota(&self) -> bool {
        !self.privileged && self.ids.len() >= self.quota
    }

    /// Remaining staging slots, or `None` when unbounded.
    #[must_use]
    pub fn remaining(&self) -> Option<usize> {
        (!self.privileged).then(|| self.quota.saturating_sub(self.ids.len()))
    }
}
