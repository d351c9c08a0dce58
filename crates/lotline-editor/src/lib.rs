//! Lotline Editor - The plan-view interaction controller
//!
//! Drives all direct manipulation of the model from pointer and keyboard
//! input: dragging, edge/corner resizing, selection, keyboard nudging and
//! rotation, deletion, palette drops, and canvas panning. Panning moves
//! only the view offset; element positions are never touched by it.

mod controller;

pub use controller::{
    EditorConfig, EditorController, EditorKey, GestureState, ResizeDirection, MIN_STREET_LENGTH,
    MIN_STREET_WIDTH, NUDGE_STEP,
};
