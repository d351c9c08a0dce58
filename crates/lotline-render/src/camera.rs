//! 3D camera with lot auto-framing and orbit controls

use lotline_core::{Bounds, Vec3};

/// Vertical field of view used for framing, in degrees
pub const FRAMING_FOV: f32 = 60.0;

/// Eye offset factors relative to the framing distance: the camera sits
/// above and behind the lot center, looking down at it.
const EYE_HEIGHT_FACTOR: f32 = 0.8;
const EYE_BACK_FACTOR: f32 = 0.5;

/// A perspective camera orbiting the lot center.
///
/// `frame_bounds` positions it so the whole lot fits the view; orbit,
/// pan, and zoom adjust from there without re-framing.
pub struct Camera {
    /// Camera position
    pub position: Vec3,
    /// Target point the camera looks at (the lot center)
    pub target: Vec3,
    /// Up vector
    pub up: Vec3,
    /// Field of view in degrees
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,

    // Orbit control state
    /// Distance from target
    pub distance: f32,
    /// Horizontal angle in radians
    pub yaw: f32,
    /// Vertical angle in radians
    pub pitch: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 800.0, 500.0),
            target: Vec3::ZERO,
            up: Vec3::UP,
            fov: FRAMING_FOV,
            near: 0.1,
            far: 10000.0,
            aspect: 16.0 / 9.0,
            distance: 1000.0,
            yaw: 0.0,
            pitch: std::f32::consts::FRAC_PI_3,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get camera position as an array for GPU upload
    pub fn position_array(&self) -> [f32; 3] {
        [self.position.x, self.position.y, self.position.z]
    }

    /// Frame the camera on the given layout bounds.
    ///
    /// The framing distance is chosen so the larger lot extent spans the
    /// vertical field of view: `d = (size / 2) / tan(fov / 2)`. The eye
    /// then sits at `(center.x, 0.8 d, center.z + 0.5 d)` looking at the
    /// center of the lot.
    pub fn frame_bounds(&mut self, bounds: Bounds) {
        let center = bounds.center();
        let size = bounds.size();
        let framing_distance = (size / 2.0) / (FRAMING_FOV.to_radians() / 2.0).tan();

        self.target = Vec3::from_plane(center, 0.0);
        self.yaw = 0.0;
        self.pitch = EYE_HEIGHT_FACTOR.atan2(EYE_BACK_FACTOR);
        self.distance = framing_distance * (EYE_HEIGHT_FACTOR.hypot(EYE_BACK_FACTOR));
        self.far = (framing_distance * 10.0).max(10000.0);
        self.update_orbit();
    }

    /// Update position based on orbit parameters
    pub fn update_orbit(&mut self) {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();

        self.position = Vec3::new(self.target.x + x, self.target.y + y, self.target.z + z);
    }

    /// Orbit horizontally (rotate around the lot)
    pub fn orbit_horizontal(&mut self, delta: f32) {
        self.yaw += delta;
        self.update_orbit();
    }

    /// Orbit vertically (tilt up/down)
    pub fn orbit_vertical(&mut self, delta: f32) {
        self.pitch += delta;
        // Keep above the ground plane and away from the pole
        self.pitch = self.pitch.clamp(0.05, 1.56);
        self.update_orbit();
    }

    /// Zoom in/out
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance - delta).clamp(10.0, 50000.0);
        self.update_orbit();
    }

    /// Pan the camera (move target)
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = (self.target - self.position).normalized();
        let right = forward.cross(&self.up).normalized();
        let up = right.cross(&forward);

        self.target = self.target + right * dx + up * dy;
        self.update_orbit();
    }

    /// Get the view matrix (4x4, column-major)
    pub fn view_matrix(&self) -> [[f32; 4]; 4] {
        let f = (self.target - self.position).normalized();
        let s = f.cross(&self.up).normalized();
        let u = s.cross(&f);

        [
            [s.x, u.x, -f.x, 0.0],
            [s.y, u.y, -f.y, 0.0],
            [s.z, u.z, -f.z, 0.0],
            [
                -s.dot(&self.position),
                -u.dot(&self.position),
                f.dot(&self.position),
                1.0,
            ],
        ]
    }

    /// Get the perspective projection matrix (4x4, column-major)
    pub fn projection_matrix(&self) -> [[f32; 4]; 4] {
        let fov_rad = self.fov.to_radians();
        let f = 1.0 / (fov_rad / 2.0).tan();

        let depth = self.far - self.near;

        [
            [f / self.aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, -(self.far + self.near) / depth, -1.0],
            [0.0, 0.0, -(2.0 * self.far * self.near) / depth, 0.0],
        ]
    }

    /// Get combined view-projection matrix
    pub fn view_projection_matrix(&self) -> [[f32; 4]; 4] {
        let view = self.view_matrix();
        let proj = self.projection_matrix();
        mat4_mul(&proj, &view)
    }

    /// Get inverse of the combined view-projection matrix (for unprojecting)
    pub fn inverse_view_projection_matrix(&self) -> [[f32; 4]; 4] {
        let vp = self.view_projection_matrix();
        mat4_inverse(&vp)
    }
}

pub(crate) fn mat4_mul(a: &[[f32; 4]; 4], b: &[[f32; 4]; 4]) -> [[f32; 4]; 4] {
    let mut result = [[0.0; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                result[i][j] += a[k][j] * b[i][k];
            }
        }
    }
    result
}

/// Compute the inverse of a 4x4 column-major matrix using cofactor expansion
pub(crate) fn mat4_inverse(m: &[[f32; 4]; 4]) -> [[f32; 4]; 4] {
    let s = |col: usize, row: usize| -> f32 { m[col][row] };

    let c00 = s(2, 2) * s(3, 3) - s(3, 2) * s(2, 3);
    let c02 = s(1, 2) * s(3, 3) - s(3, 2) * s(1, 3);
    let c03 = s(1, 2) * s(2, 3) - s(2, 2) * s(1, 3);

    let c04 = s(2, 1) * s(3, 3) - s(3, 1) * s(2, 3);
    let c06 = s(1, 1) * s(3, 3) - s(3, 1) * s(1, 3);
    let c07 = s(1, 1) * s(2, 3) - s(2, 1) * s(1, 3);

    let c08 = s(2, 1) * s(3, 2) - s(3, 1) * s(2, 2);
    let c10 = s(1, 1) * s(3, 2) - s(3, 1) * s(1, 2);
    let c11 = s(1, 1) * s(2, 2) - s(2, 1) * s(1, 2);

    let c12 = s(2, 0) * s(3, 3) - s(3, 0) * s(2, 3);
    let c14 = s(1, 0) * s(3, 3) - s(3, 0) * s(1, 3);
    let c15 = s(1, 0) * s(2, 3) - s(2, 0) * s(1, 3);

    let c16 = s(2, 0) * s(3, 2) - s(3, 0) * s(2, 2);
    let c18 = s(1, 0) * s(3, 2) - s(3, 0) * s(1, 2);
    let c19 = s(1, 0) * s(2, 2) - s(2, 0) * s(1, 2);

    let c20 = s(2, 0) * s(3, 1) - s(3, 0) * s(2, 1);
    let c22 = s(1, 0) * s(3, 1) - s(3, 0) * s(1, 1);
    let c23 = s(1, 0) * s(2, 1) - s(2, 0) * s(1, 1);

    let f0 = [c00, c00, c02, c03];
    let f1 = [c04, c04, c06, c07];
    let f2 = [c08, c08, c10, c11];
    let f3 = [c12, c12, c14, c15];
    let f4 = [c16, c16, c18, c19];
    let f5 = [c20, c20, c22, c23];

    let v0 = [s(1, 0), s(0, 0), s(0, 0), s(0, 0)];
    let v1 = [s(1, 1), s(0, 1), s(0, 1), s(0, 1)];
    let v2 = [s(1, 2), s(0, 2), s(0, 2), s(0, 2)];
    let v3 = [s(1, 3), s(0, 3), s(0, 3), s(0, 3)];

    let mut inv = [[0.0f32; 4]; 4];
    let sign_a = [1.0, -1.0, 1.0, -1.0];
    let sign_b = [-1.0, 1.0, -1.0, 1.0];

    for i in 0..4 {
        inv[0][i] = sign_a[i] * (v1[i] * f0[i] - v2[i] * f1[i] + v3[i] * f2[i]);
        inv[1][i] = sign_b[i] * (v0[i] * f0[i] - v2[i] * f3[i] + v3[i] * f4[i]);
        inv[2][i] = sign_a[i] * (v0[i] * f1[i] - v1[i] * f3[i] + v3[i] * f5[i]);
        inv[3][i] = sign_b[i] * (v0[i] * f2[i] - v1[i] * f4[i] + v2[i] * f5[i]);
    }

    let det = s(0, 0) * inv[0][0] + s(1, 0) * inv[0][1] + s(2, 0) * inv[0][2] + s(3, 0) * inv[0][3];

    if det.abs() < 1e-10 {
        return [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
    }

    let inv_det = 1.0 / det;
    for col in &mut inv {
        for val in col.iter_mut() {
            *val *= inv_det;
        }
    }
    inv
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotline_core::Vec2;

    const EPS: f32 = 0.5;

    #[test]
    fn test_frame_bounds_distance() {
        // A 1000-wide lot at fov 60: d = 500 / tan(30°) ≈ 866
        let mut camera = Camera::new();
        camera.frame_bounds(Bounds::new(Vec2::ZERO, Vec2::new(1000.0, 800.0)));

        let d = 500.0 / (30.0f32).to_radians().tan();
        assert!((camera.position.x - 500.0).abs() < EPS);
        assert!((camera.position.y - d * 0.8).abs() < EPS);
        assert!((camera.position.z - (400.0 + d * 0.5)).abs() < EPS);
        assert_eq!(camera.target, Vec3::new(500.0, 0.0, 400.0));
    }

    #[test]
    fn test_frame_uses_larger_extent() {
        let mut wide = Camera::new();
        wide.frame_bounds(Bounds::new(Vec2::ZERO, Vec2::new(2000.0, 100.0)));
        let mut tall = Camera::new();
        tall.frame_bounds(Bounds::new(Vec2::ZERO, Vec2::new(100.0, 2000.0)));
        assert!((wide.distance - tall.distance).abs() < EPS);
    }

    #[test]
    fn test_orbit_keeps_distance() {
        let mut camera = Camera::new();
        camera.frame_bounds(Bounds::new(Vec2::ZERO, Vec2::new(1000.0, 800.0)));
        let before = (camera.position - camera.target).length();
        camera.orbit_horizontal(1.2);
        camera.orbit_vertical(-0.2);
        let after = (camera.position - camera.target).length();
        assert!((before - after).abs() < EPS);
    }

    #[test]
    fn test_inverse_round_trips() {
        let camera = Camera::new();
        let vp = camera.view_projection_matrix();
        let inv = camera.inverse_view_projection_matrix();
        let ident = mat4_mul(&vp, &inv);
        for (i, col) in ident.iter().enumerate() {
            for (j, v) in col.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((v - expected).abs() < 1e-2, "ident[{i}][{j}] = {v}");
            }
        }
    }
}
