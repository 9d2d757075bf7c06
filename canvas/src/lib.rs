//! Pixel canvas engine for the collaborative pixel board.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! painted-pixel store, the pan/zoom camera, the staged selection, and the
//! WebGL point renderer. The host layer wires DOM events to the engine and
//! turns the resulting [`engine::Action`]s into UI updates; wallet, contract,
//! and backend traffic live outside this crate.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Pixel store with snapshot/merge semantics |
//! | [`selection`] | Staged pixel ids, quota, privileged area gesture |
//! | [`camera`] | Pan/zoom camera and screen/grid conversions |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`render`] | Vertex buffers and draw parameters for one frame |
//! | [`gl`] | WebGL program and draw call |
//! | [`color`] | Hex color parsing |
//! | [`consts`] | Shared numeric constants (zoom limits, grid calibration, quota) |

pub mod camera;
pub mod color;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod gl;
pub mod input;
pub mod render;
pub mod selection;
