//! Lotline Core - Foundational types for the lotline toolkit
//!
//! This crate provides the types that all other lotline crates depend on:
//! - `ElementId` - Stable element identifiers
//! - `Vec2`, `Vec3`, `Bounds`, `Color` - Spatial types
//! - The geometry kernel (rotated corners, bounds, grid snapping, rotation steps)
//! - Error types and Result alias

mod error;
mod geometry;
mod id;
mod types;

pub use error::{LotError, Result};
pub use geometry::{
    compute_bounds, normalize_angle, rotate_by, rotated_corners, snap_to_grid, Footprint,
    BOUNDS_MARGIN, DEFAULT_GRID_SIZE, DEFAULT_LAYOUT_HEIGHT, DEFAULT_LAYOUT_WIDTH,
    MIN_ELEMENT_LENGTH, MIN_ELEMENT_WIDTH, ROTATION_STEP,
};
pub use id::ElementId;
pub use types::{Bounds, Color, Vec2, Vec3};
