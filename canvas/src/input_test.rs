use super::*;

// =============================================================
// Mode
// =============================================================

#[test]
fn mode_default_is_draw() {
    assert_eq!(Mode::default(), Mode::Draw);
}

#[test]
fn mode_cursor_matches_interaction() {
    assert_eq!(Mode::Draw.cursor(), "crosshair");
    assert_eq!(Mode::Navigate.cursor(), "grab");
}

// =============================================================
// Modifiers / Key
// =============================================================

#[test]
fn modifiers_default_all_false() {
    let m = Modifiers::default();
    assert!(!m.shift);
}

#[test]
fn key_escape_detection() {
    assert!(Key("Escape".to_owned()).is_escape());
    assert!(!Key("Esc".to_owned()).is_escape());
    assert!(!Key("Enter".to_owned()).is_escape());
}

// =============================================================
// UiState / InputState
// =============================================================

#[test]
fn ui_state_defaults() {
    let ui = UiState::default();
    assert_eq!(ui.mode, Mode::Draw);
    assert_eq!(ui.color, "#000000");
    assert!(!ui.wallet_connected);
}

#[test]
fn input_state_default_is_idle() {
    assert_eq!(InputState::default(), InputState::Idle);
}

#[test]
fn panning_state_carries_last_point() {
    let state = InputState::Panning { last_screen: Point::new(4.0, 5.0) };
    let InputState::Panning { last_screen } = state else {
        panic!("expected panning");
    };
    assert_eq!(last_screen, Point::new(4.0, 5.0));
}
