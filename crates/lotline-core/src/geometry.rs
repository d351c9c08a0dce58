//! Geometry kernel: rotated footprints, layout bounds, grid snapping

use crate::types::{Bounds, Vec2};

/// Default snapping grid pitch, in layout units
pub const DEFAULT_GRID_SIZE: f32 = 50.0;

/// Margin added around element extremes when computing layout bounds
pub const BOUNDS_MARGIN: f32 = 50.0;

/// Fallback layout dimensions used when the model is empty
pub const DEFAULT_LAYOUT_WIDTH: f32 = 1000.0;
pub const DEFAULT_LAYOUT_HEIGHT: f32 = 800.0;

/// One rotation keypress worth of angle, in radians (15 degrees)
pub const ROTATION_STEP: f32 = 15.0 * std::f32::consts::PI / 180.0;

/// Smallest width an element can reach, whether by resizing or from a
/// file carrying invalid dimensions
pub const MIN_ELEMENT_WIDTH: f32 = 50.0;
/// Smallest length an element can reach
pub const MIN_ELEMENT_LENGTH: f32 = 100.0;

/// The rotated rectangular footprint of a placeable element
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Footprint {
    pub center: Vec2,
    pub width: f32,
    pub height: f32,
    /// Rotation about the center, in radians
    pub rotation: f32,
}

impl Footprint {
    pub const fn new(center: Vec2, width: f32, height: f32, rotation: f32) -> Self {
        Self {
            center,
            width,
            height,
            rotation,
        }
    }
}

/// World-space corners of a rotated rectangle, counter-clockwise from the
/// (-w/2, -h/2) corner.
pub fn rotated_corners(footprint: &Footprint) -> [Vec2; 4] {
    let hw = footprint.width / 2.0;
    let hh = footprint.height / 2.0;
    let (sin, cos) = footprint.rotation.sin_cos();

    let corner = |dx: f32, dy: f32| {
        Vec2::new(
            footprint.center.x + dx * cos - dy * sin,
            footprint.center.y + dx * sin + dy * cos,
        )
    };

    [
        corner(-hw, -hh),
        corner(hw, -hh),
        corner(hw, hh),
        corner(-hw, hh),
    ]
}

/// Axis-aligned bounds of all element footprints, inflated by
/// [`BOUNDS_MARGIN`] on every side.
///
/// With no elements there is nothing to frame, so the raw layout rectangle
/// is returned instead (no margin).
pub fn compute_bounds(
    footprints: impl IntoIterator<Item = Footprint>,
    layout_width: f32,
    layout_height: f32,
) -> Bounds {
    let mut iter = footprints.into_iter();

    let first = match iter.next() {
        Some(fp) => fp,
        None => {
            return Bounds::new(Vec2::ZERO, Vec2::new(layout_width, layout_height));
        }
    };

    let corners = rotated_corners(&first);
    let mut bounds = Bounds::new(corners[0], corners[0]);
    for c in &corners[1..] {
        bounds.expand_to(*c);
    }

    for fp in iter {
        for c in rotated_corners(&fp) {
            bounds.expand_to(c);
        }
    }

    bounds.inflate(BOUNDS_MARGIN)
}

/// Snap a coordinate to the nearest multiple of `grid`.
///
/// Idempotent: snapping an already-snapped value returns it unchanged.
/// A non-positive grid disables snapping.
pub fn snap_to_grid(value: f32, grid: f32) -> f32 {
    if grid <= 0.0 {
        return value;
    }
    (value / grid).round() * grid
}

/// Advance a rotation by whole 15-degree steps (negative for the other way)
pub fn rotate_by(rotation: f32, steps: i32) -> f32 {
    rotation + steps as f32 * ROTATION_STEP
}

/// Wrap an angle into [0, 2π)
pub fn normalize_angle(angle: f32) -> f32 {
    let tau = std::f32::consts::TAU;
    let wrapped = angle % tau;
    if wrapped < 0.0 {
        wrapped + tau
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn test_corners_axis_aligned() {
        let fp = Footprint::new(Vec2::new(100.0, 200.0), 60.0, 120.0, 0.0);
        let corners = rotated_corners(&fp);
        assert_eq!(corners[0], Vec2::new(70.0, 140.0));
        assert_eq!(corners[1], Vec2::new(130.0, 140.0));
        assert_eq!(corners[2], Vec2::new(130.0, 260.0));
        assert_eq!(corners[3], Vec2::new(70.0, 260.0));
    }

    #[test]
    fn test_corners_quarter_turn_swaps_extents() {
        let fp = Footprint::new(
            Vec2::new(0.0, 0.0),
            60.0,
            120.0,
            std::f32::consts::FRAC_PI_2,
        );
        let corners = rotated_corners(&fp);
        let max_x = corners.iter().map(|c| c.x).fold(f32::MIN, f32::max);
        let max_y = corners.iter().map(|c| c.y).fold(f32::MIN, f32::max);
        assert!(approx(max_x, 60.0));
        assert!(approx(max_y, 30.0));
    }

    #[test]
    fn test_bounds_exact_for_axis_aligned() {
        let fps = vec![
            Footprint::new(Vec2::new(50.0, 100.0), 60.0, 120.0, 0.0),
            Footprint::new(Vec2::new(400.0, 300.0), 80.0, 300.0, 0.0),
        ];
        let b = compute_bounds(fps, 1000.0, 800.0);
        // Extremes are (20, 40) and (440, 450), margin 50 on each side.
        assert!(approx(b.min.x, -30.0));
        assert!(approx(b.min.y, -10.0));
        assert!(approx(b.max.x, 490.0));
        assert!(approx(b.max.y, 500.0));
    }

    #[test]
    fn test_bounds_empty_falls_back_to_layout() {
        let b = compute_bounds(std::iter::empty(), 1000.0, 800.0);
        assert_eq!(b.min, Vec2::ZERO);
        assert_eq!(b.max, Vec2::new(1000.0, 800.0));
        assert!(approx(b.size(), 1000.0));
    }

    #[test]
    fn test_snap_idempotent() {
        let snapped = snap_to_grid(73.0, 50.0);
        assert_eq!(snapped, 50.0);
        assert_eq!(snap_to_grid(snapped, 50.0), snapped);
        assert_eq!(snap_to_grid(76.0, 50.0), 100.0);
        assert_eq!(snap_to_grid(-73.0, 50.0), -50.0);
    }

    #[test]
    fn test_snap_zero_grid_is_identity() {
        assert_eq!(snap_to_grid(73.0, 0.0), 73.0);
    }

    #[test]
    fn test_rotate_round_trip() {
        let start = 0.3;
        let rotated = rotate_by(start, 1);
        assert!(approx(rotated - start, ROTATION_STEP));
        assert!(approx(rotate_by(rotated, -1), start));
    }

    #[test]
    fn test_normalize_angle() {
        assert!(approx(normalize_angle(-ROTATION_STEP), std::f32::consts::TAU - ROTATION_STEP));
        assert!(approx(normalize_angle(std::f32::consts::TAU + 0.1), 0.1));
    }
}
