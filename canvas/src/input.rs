//! Input model: interaction mode, modifier keys, mouse buttons, and the
//! gesture state machine.
//!
//! `Mode` decides how pointer events are interpreted: in `Draw` they stage
//! pixels, in `Navigate` they pan and zoom. `InputState` is the gesture being
//! tracked between pointer-down and pointer-up. The privileged area gesture is
//! tracked by the selection set itself.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::consts::DEFAULT_PAINT_COLOR;

/// How pointer events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Clicking stages pixels for painting (default).
    #[default]
    Draw,
    /// Dragging pans and the wheel zooms.
    Navigate,
}

impl Mode {
    /// CSS cursor shown over the canvas in this mode.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::Draw => "crosshair",
            Self::Navigate => "grab",
        }
    }
}

/// Modifier keys held during an event. Shift starts the privileged area gesture.
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key as reported by the browser (e.g. `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape"
    }
}

/// Vertical wheel / trackpad scroll, in pixels (positive = down = zoom out).
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    pub dy: f64,
}

/// Persistent UI state read by the render pipeline and input handlers.
#[derive(Debug, Clone)]
pub struct UiState {
    /// Active interaction mode.
    pub mode: Mode,
    /// Color previewed on staged pixels and submitted on paint, `#rrggbb`.
    pub color: String,
    /// Pixels can only be staged while a wallet is connected.
    pub wallet_connected: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self { mode: Mode::Draw, color: DEFAULT_PAINT_COLOR.to_owned(), wallet_connected: false }
    }
}

/// Pointer gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Navigate-mode drag.
    Panning {
        /// Screen-space position of the previous pointer event, used to compute pan delta.
        last_screen: Point,
    },
}
