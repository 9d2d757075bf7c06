use wasm_bindgen::JsValue;
use web_sys::HtmlCanvasElement;

use crate::camera::{Camera, Point, Surface};
use crate::color::normalize_hex;
use crate::consts::HIT_TOLERANCE;
use crate::doc::{LoadState, Pixel, PixelId, PixelStore};
use crate::gl::GlRenderer;
use crate::input::{Button, InputState, Key, Mode, Modifiers, UiState, WheelDelta};
use crate::render::{RenderFrame, surface_for_extent};
use crate::selection::SelectionSet;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The frame is stale; call `render` on the next animation tick.
    RenderNeeded,
    /// The staged selection changed size.
    SelectionChanged { count: usize },
    /// A regular user tried to stage past the quota.
    SelectionQuotaReached { quota: usize },
    /// Change the CSS cursor over the canvas.
    SetCursor(String),
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub store: PixelStore,
    pub camera: Camera,
    pub selection: SelectionSet,
    pub ui: UiState,
    pub input: InputState,
    pub surface: Surface,
    frame: Option<RenderFrame>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            store: PixelStore::new(),
            camera: Camera::default(),
            selection: SelectionSet::default(),
            ui: UiState::default(),
            input: InputState::default(),
            surface: Surface::default(),
            frame: None,
        }
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Data inputs ---

    /// Hydrate the store from the bulk snapshot and size the surface to it.
    pub fn load_snapshot(&mut self, pixels: Vec<Pixel>) -> Vec<Action> {
        self.store.replace_all(pixels);
        self.fit_surface();
        self.invalidate()
    }

    /// Record that the bulk snapshot could not be fetched.
    pub fn mark_load_failed(&mut self, reason: impl Into<String>) -> Vec<Action> {
        self.store.mark_failed(reason);
        self.invalidate()
    }

    /// Apply a pushed batch of pixel updates in arrival order.
    pub fn apply_update(&mut self, pixels: Vec<Pixel>) -> Vec<Action> {
        if self.store.merge(pixels) == 0 {
            return Vec::new();
        }
        self.fit_surface();
        self.invalidate()
    }

    /// Optimistically repaint pixels after a confirmed submission.
    pub fn apply_local_paint(&mut self, ids: &[PixelId], color: &str) -> Vec<Action> {
        if self.store.recolor(ids, color) == 0 {
            return Vec::new();
        }
        self.invalidate()
    }

    /// Override the surface size (e.g. from the host's layout).
    pub fn set_surface(&mut self, width: f64, height: f64) -> Vec<Action> {
        self.surface = Surface::new(width, height);
        self.camera.clamp_pan(self.surface);
        self.invalidate()
    }

    fn fit_surface(&mut self) {
        if let Some(surface) = surface_for_extent(&self.store) {
            self.surface = surface;
            self.camera.clamp_pan(surface);
        }
    }

    // --- UI state ---

    /// Switch between drawing and navigating. Any gesture in progress is dropped.
    pub fn set_mode(&mut self, mode: Mode) -> Vec<Action> {
        if self.ui.mode == mode {
            return Vec::new();
        }
        self.ui.mode = mode;
        self.input = InputState::Idle;
        self.selection.end_area();
        vec![Action::SetCursor(mode.cursor().to_owned())]
    }

    /// Set the pending paint color. Returns no actions if `raw` is not a hex color.
    pub fn set_color(&mut self, raw: &str) -> Vec<Action> {
        let Some(color) = normalize_hex(raw) else {
            return Vec::new();
        };
        if color == self.ui.color {
            return Vec::new();
        }
        self.ui.color = color;
        if self.selection.is_empty() {
            return Vec::new();
        }
        self.invalidate()
    }

    /// Grant or revoke the fee-recipient privileges.
    pub fn set_privileged(&mut self, privileged: bool) {
        self.selection.set_privileged(privileged);
    }

    /// Selecting pixels requires a connected wallet.
    pub fn set_wallet_connected(&mut self, connected: bool) {
        self.ui.wallet_connected = connected;
    }

    /// Drop every staged pixel.
    pub fn reset_selection(&mut self) -> Vec<Action> {
        if self.selection.is_empty() {
            self.selection.end_area();
            return Vec::new();
        }
        self.selection.reset();
        self.selection_changed()
    }

    /// Return the camera to zoom 1.0 at the origin.
    pub fn reset_view(&mut self) -> Vec<Action> {
        self.camera.reset();
        self.invalidate()
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        match self.ui.mode {
            Mode::Navigate => {
                self.input = InputState::Panning { last_screen: screen_pt };
                vec![Action::SetCursor("grabbing".to_owned())]
            }
            Mode::Draw => self.select_at(screen_pt, modifiers),
        }
    }

    fn select_at(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        if !self.ui.wallet_connected {
            return Vec::new();
        }
        let grid = self.camera.screen_to_grid(screen_pt);

        // The selection is only replaced once the pointer moves.
        if modifiers.shift && self.selection.start_area(grid) {
            return Vec::new();
        }

        let Some(id) = self.store.find_near(grid, HIT_TOLERANCE).map(|p| p.id.clone()) else {
            return Vec::new();
        };
        if self.selection.contains(&id) {
            return Vec::new();
        }
        if self.selection.toggle_or_add(&id) {
            return self.selection_changed();
        }
        vec![Action::SelectionQuotaReached { quota: self.selection.quota() }]
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        if let InputState::Panning { last_screen } = self.input {
            self.input = InputState::Panning { last_screen: screen_pt };
            let (dx, dy) = (screen_pt.x - last_screen.x, screen_pt.y - last_screen.y);
            if self.camera.pan_by(dx, dy, self.surface) {
                return self.invalidate();
            }
            return Vec::new();
        }

        if self.ui.mode == Mode::Draw && self.selection.is_area_active() {
            let grid = self.camera.screen_to_grid(screen_pt);
            if self.selection.update_area(grid, &self.store) {
                return self.selection_changed();
            }
        }
        Vec::new()
    }

    pub fn on_pointer_up(&mut self, _screen_pt: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        self.selection.end_area();
        match std::mem::take(&mut self.input) {
            InputState::Panning { .. } => vec![Action::SetCursor(self.ui.mode.cursor().to_owned())],
            InputState::Idle => Vec::new(),
        }
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        if self.ui.mode != Mode::Navigate || delta.dy == 0.0 {
            return Vec::new();
        }
        if self.camera.zoom_at(screen_pt, delta.dy, self.surface) {
            return self.invalidate();
        }
        Vec::new()
    }

    pub fn on_key_down(&mut self, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        if key.is_escape() && self.selection.cancel() {
            return self.selection_changed();
        }
        Vec::new()
    }

    // --- Render ---

    /// The current frame, rebuilt only if an input changed since the last call.
    pub fn frame(&mut self) -> &RenderFrame {
        let frame = self.frame.take().unwrap_or_else(|| {
            RenderFrame::build(&self.store, &self.selection, &self.ui.color, &self.camera, self.surface)
        });
        self.frame.insert(frame)
    }

    /// Returns `true` if the next [`EngineCore::frame`] call will rebuild.
    #[must_use]
    pub fn needs_render(&self) -> bool {
        self.frame.is_none()
    }

    fn invalidate(&mut self) -> Vec<Action> {
        self.frame = None;
        vec![Action::RenderNeeded]
    }

    fn selection_changed(&mut self) -> Vec<Action> {
        let mut actions = vec![Action::SelectionChanged { count: self.selection.len() }];
        actions.extend(self.invalidate());
        actions
    }

    // --- Queries ---

    /// Ids staged for the next paint, in selection order.
    #[must_use]
    pub fn selected_ids(&self) -> &[PixelId] {
        self.selection.ids()
    }

    /// The pending paint color.
    #[must_use]
    pub fn color(&self) -> &str {
        &self.ui.color
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn load_state(&self) -> &LoadState {
        self.store.load_state()
    }

    #[must_use]
    pub fn pixel(&self, id: &str) -> Option<&Pixel> {
        self.store.get(id)
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    renderer: GlRenderer,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a WebGL context cannot be created for `canvas`.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let renderer = GlRenderer::new(&canvas)?;
        Ok(Self { canvas, renderer, core: EngineCore::new() })
    }

    // --- Delegated data inputs ---

    pub fn load_snapshot(&mut self, pixels: Vec<Pixel>) -> Vec<Action> {
        self.core.load_snapshot(pixels)
    }

    pub fn mark_load_failed(&mut self, reason: impl Into<String>) -> Vec<Action> {
        self.core.mark_load_failed(reason)
    }

    pub fn apply_update(&mut self, pixels: Vec<Pixel>) -> Vec<Action> {
        self.core.apply_update(pixels)
    }

    pub fn apply_local_paint(&mut self, ids: &[PixelId], color: &str) -> Vec<Action> {
        self.core.apply_local_paint(ids, color)
    }

    pub fn set_mode(&mut self, mode: Mode) -> Vec<Action> {
        self.core.set_mode(mode)
    }

    pub fn set_color(&mut self, raw: &str) -> Vec<Action> {
        self.core.set_color(raw)
    }

    pub fn reset_selection(&mut self) -> Vec<Action> {
        self.core.reset_selection()
    }

    pub fn reset_view(&mut self) -> Vec<Action> {
        self.core.reset_view()
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt, button, modifiers)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt, modifiers)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt, button, modifiers)
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_wheel(screen_pt, delta, modifiers)
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    // --- Render ---

    /// Resize the backing store to the surface and draw the current frame.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a WebGL call fails.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn render(&mut self) -> Result<(), JsValue> {
        let surface = self.core.surface;
        self.canvas.set_width(surface.width as u32);
        self.canvas.set_height(surface.height as u32);
        let frame = self.core.frame();
        self.renderer.draw(frame)
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn selected_ids(&self) -> &[PixelId] {
        self.core.selected_ids()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.core.camera()
    }

    #[must_use]
    pub fn load_state(&self) -> &LoadState {
        self.core.load_state()
    }
}
