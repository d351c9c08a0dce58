//! Lotline Viewer - lot layout editor and 3D preview
//!
//! Hosts the 2D plan-view editor and the wgpu 3D projection of the lot,
//! with egui panels for placing elements, changing spot status, and
//! saving and loading layouts.

pub mod app;
pub mod panels;
pub mod plan_view;

pub use app::{run, ViewerApp, ViewerMode};
