//! Mouse picking via ray-AABB intersection
//!
//! Unprojects screen coordinates through the camera's inverse
//! view-projection matrix and tests against spot bounding boxes, for the
//! hover highlight and reservation clicks.

use crate::camera::Camera;
use crate::scene::SPOT_HEIGHT;
use lotline_core::{rotated_corners, ElementId};
use lotline_model::LotModel;

/// A ray in 3D space
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: [f32; 3],
    pub direction: [f32; 3],
}

/// Axis-aligned bounding box in world space
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

/// A spot with its world-space AABB for picking
#[derive(Debug, Clone)]
pub struct PickTarget {
    pub spot_id: ElementId,
    pub aabb: Aabb,
}

impl Ray {
    /// Create a ray from screen coordinates using the camera's inverse VP
    /// matrix. Coordinates and viewport dimensions are in physical pixels.
    pub fn from_screen(
        screen_x: f32,
        screen_y: f32,
        viewport_width: f32,
        viewport_height: f32,
        camera: &Camera,
    ) -> Self {
        let inv_vp = camera.inverse_view_projection_matrix();

        // Convert to NDC [-1, 1]
        let ndc_x = 2.0 * screen_x / viewport_width - 1.0;
        let ndc_y = 1.0 - 2.0 * screen_y / viewport_height; // Y flipped

        let near_clip = [ndc_x, ndc_y, -1.0, 1.0];
        let far_clip = [ndc_x, ndc_y, 1.0, 1.0];

        let near_world = mul_mat4_vec4(&inv_vp, near_clip);
        let far_world = mul_mat4_vec4(&inv_vp, far_clip);

        let near_w = near_world[3];
        let far_w = far_world[3];

        let origin = [
            near_world[0] / near_w,
            near_world[1] / near_w,
            near_world[2] / near_w,
        ];
        let far_pt = [
            far_world[0] / far_w,
            far_world[1] / far_w,
            far_world[2] / far_w,
        ];

        let dir = [
            far_pt[0] - origin[0],
            far_pt[1] - origin[1],
            far_pt[2] - origin[2],
        ];
        let len = (dir[0] * dir[0] + dir[1] * dir[1] + dir[2] * dir[2]).sqrt();
        let direction = if len > 1e-8 {
            [dir[0] / len, dir[1] / len, dir[2] / len]
        } else {
            [0.0, 0.0, -1.0]
        };

        Self { origin, direction }
    }
}

impl Aabb {
    pub fn from_min_max(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }
}

/// Ray-AABB intersection using the slab method (Kay/Kajiya).
/// Returns the distance along the ray to the nearest hit, or None.
pub fn ray_intersect(ray: &Ray, aabb: &Aabb) -> Option<f32> {
    let mut tmin = f32::NEG_INFINITY;
    let mut tmax = f32::INFINITY;

    for i in 0..3 {
        if ray.direction[i].abs() < 1e-8 {
            // Ray is parallel to this slab
            if ray.origin[i] < aabb.min[i] || ray.origin[i] > aabb.max[i] {
                return None;
            }
        } else {
            let inv_d = 1.0 / ray.direction[i];
            let mut t1 = (aabb.min[i] - ray.origin[i]) * inv_d;
            let mut t2 = (aabb.max[i] - ray.origin[i]) * inv_d;

            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }

            tmin = tmin.max(t1);
            tmax = tmax.min(t2);

            if tmin > tmax {
                return None;
            }
        }
    }

    if tmax < 0.0 {
        None // AABB is behind the ray
    } else {
        Some(tmin.max(0.0))
    }
}

/// Build pick targets for every parking spot in the model. Only spots
/// participate in hover and reservation picking.
pub fn build_pick_targets(model: &LotModel) -> Vec<PickTarget> {
    model
        .iter()
        .filter(|e| e.is_spot())
        .map(|e| {
            let corners = rotated_corners(&e.footprint());
            let mut min = [f32::MAX, 0.0, f32::MAX];
            let mut max = [f32::MIN, SPOT_HEIGHT, f32::MIN];
            for c in corners {
                min[0] = min[0].min(c.x);
                min[2] = min[2].min(c.y);
                max[0] = max[0].max(c.x);
                max[2] = max[2].max(c.y);
            }
            PickTarget {
                spot_id: e.id,
                aabb: Aabb::from_min_max(min, max),
            }
        })
        .collect()
}

/// Pick the nearest spot at the given screen coordinates.
pub fn pick_spot(
    screen_x: f32,
    screen_y: f32,
    viewport_width: f32,
    viewport_height: f32,
    camera: &Camera,
    targets: &[PickTarget],
) -> Option<(ElementId, f32)> {
    let ray = Ray::from_screen(screen_x, screen_y, viewport_width, viewport_height, camera);

    let mut best: Option<(ElementId, f32)> = None;

    for target in targets {
        if let Some(dist) = ray_intersect(&ray, &target.aabb) {
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((target.spot_id, dist));
            }
        }
    }

    best
}

/// Multiply a 4x4 column-major matrix by a 4D vector
fn mul_mat4_vec4(m: &[[f32; 4]; 4], v: [f32; 4]) -> [f32; 4] {
    [
        m[0][0] * v[0] + m[1][0] * v[1] + m[2][0] * v[2] + m[3][0] * v[3],
        m[0][1] * v[0] + m[1][1] * v[1] + m[2][1] * v[2] + m[3][1] * v[3],
        m[0][2] * v[0] + m[1][2] * v[1] + m[2][2] * v[2] + m[3][2] * v[3],
        m[0][3] * v[0] + m[1][3] * v[1] + m[2][3] * v[2] + m[3][3] * v[3],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotline_core::{Bounds, Vec2};
    use lotline_model::{Element, ElementKind};

    #[test]
    fn test_ray_hits_box_ahead() {
        let ray = Ray {
            origin: [0.0, 10.0, 0.0],
            direction: [0.0, -1.0, 0.0],
        };
        let aabb = Aabb::from_min_max([-1.0, 0.0, -1.0], [1.0, 3.0, 1.0]);
        let dist = ray_intersect(&ray, &aabb).unwrap();
        assert!((dist - 7.0).abs() < 1e-5);
    }

    #[test]
    fn test_ray_misses_box_behind() {
        let ray = Ray {
            origin: [0.0, 10.0, 0.0],
            direction: [0.0, 1.0, 0.0],
        };
        let aabb = Aabb::from_min_max([-1.0, 0.0, -1.0], [1.0, 3.0, 1.0]);
        assert!(ray_intersect(&ray, &aabb).is_none());
    }

    #[test]
    fn test_only_spots_are_pickable() {
        let mut model = LotModel::new();
        model.add(Element::new(ElementKind::street(), 0.0, 0.0));
        let spot = model.add(Element::new(ElementKind::spot(), 100.0, 100.0));

        let targets = build_pick_targets(&model);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].spot_id, spot);
    }

    #[test]
    fn test_screen_center_ray_picks_centered_spot() {
        let mut model = LotModel::new();
        let spot = model.add(Element::new(ElementKind::spot(), 500.0, 400.0));

        let mut camera = Camera::new();
        camera.aspect = 1.0;
        camera.frame_bounds(Bounds::new(Vec2::ZERO, Vec2::new(1000.0, 800.0)));
        // Aim straight down the view axis at the spot
        camera.target = lotline_core::Vec3::new(500.0, 0.0, 400.0);
        camera.update_orbit();

        let targets = build_pick_targets(&model);
        let hit = pick_spot(400.0, 400.0, 800.0, 800.0, &camera, &targets);
        assert_eq!(hit.map(|(id, _)| id), Some(spot));
    }

    #[test]
    fn test_nearest_spot_wins() {
        let mut model = LotModel::new();
        let near = model.add(Element::new(ElementKind::spot(), 0.0, 0.0));
        let far = model.add(Element::new(ElementKind::spot(), 0.0, 0.0));
        let _ = far;

        let targets = vec![
            PickTarget {
                spot_id: near,
                aabb: Aabb::from_min_max([-1.0, 0.0, -1.0], [1.0, 3.0, 1.0]),
            },
            PickTarget {
                spot_id: far,
                aabb: Aabb::from_min_max([-1.0, -20.0, -1.0], [1.0, -10.0, 1.0]),
            },
        ];
        let ray_down = Ray {
            origin: [0.0, 10.0, 0.0],
            direction: [0.0, -1.0, 0.0],
        };
        let mut best = None;
        for t in &targets {
            if let Some(d) = ray_intersect(&ray_down, &t.aabb) {
                if best.map_or(true, |(_, bd)| d < bd) {
                    best = Some((t.spot_id, d));
                }
            }
        }
        assert_eq!(best.map(|(id, _)| id), Some(near));
    }
}
