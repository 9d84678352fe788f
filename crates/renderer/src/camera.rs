//! Orbit camera around the image plane.
//!
//! Matrices are column-major (`m[column][row]`) to match GLSL `mat4` in a
//! std140 block, with wgpu's `[0, 1]` clip depth.

use std::f32::consts::FRAC_PI_2;

pub type Mat4 = [[f32; 4]; 4];

pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

pub const NEAR_PLANE: f32 = 0.001;
pub const FAR_PLANE: f32 = 100.0;

const ORBIT_RADIANS_PER_PIXEL: f32 = 0.005;
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;
const MIN_DISTANCE: f32 = 0.05;
const MAX_DISTANCE: f32 = 20.0;
const ZOOM_STEP: f32 = 0.9;

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    yaw: f32,
    pitch: f32,
    distance: f32,
    fov_y: f32,
    aspect: f32,
}

impl OrbitCamera {
    /// Camera on the +z axis looking at the origin.
    pub fn new(fov_degrees: f32, distance: f32, aspect: f32) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: distance.clamp(MIN_DISTANCE, MAX_DISTANCE),
            fov_y: fov_degrees.to_radians(),
            aspect: sanitize_aspect(aspect),
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = sanitize_aspect(width as f32 / height.max(1) as f32);
    }

    /// Rotates by a pointer drag measured in pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * ORBIT_RADIANS_PER_PIXEL;
        self.pitch = (self.pitch + dy * ORBIT_RADIANS_PER_PIXEL).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Positive steps move closer.
    pub fn zoom(&mut self, steps: f32) {
        self.distance = (self.distance * ZOOM_STEP.powf(steps)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn eye(&self) -> [f32; 3] {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        [
            self.distance * cos_pitch * sin_yaw,
            self.distance * sin_pitch,
            self.distance * cos_pitch * cos_yaw,
        ]
    }

    pub fn view_matrix(&self) -> Mat4 {
        look_at(self.eye(), [0.0, 0.0, 0.0], [0.0, 1.0, 0.0])
    }

    pub fn projection_matrix(&self) -> Mat4 {
        perspective(self.fov_y, self.aspect, NEAR_PLANE, FAR_PLANE)
    }
}

fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}

/// Right-handed perspective projection with depth mapped to `[0, 1]`.
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let h = 1.0 / (fov_y * 0.5).tan();
    let w = h / aspect;
    let r = far / (near - far);
    [
        [w, 0.0, 0.0, 0.0],
        [0.0, h, 0.0, 0.0],
        [0.0, 0.0, r, -1.0],
        [0.0, 0.0, r * near, 0.0],
    ]
}

/// Right-handed view matrix.
pub fn look_at(eye: [f32; 3], target: [f32; 3], up: [f32; 3]) -> Mat4 {
    let f = normalize(sub(target, eye));
    let s = normalize(cross(f, up));
    let u = cross(s, f);
    [
        [s[0], u[0], -f[0], 0.0],
        [s[1], u[1], -f[1], 0.0],
        [s[2], u[2], -f[2], 0.0],
        [-dot(s, eye), -dot(u, eye), dot(f, eye), 1.0],
    ]
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = dot(v, v).sqrt();
    if len <= f32::EPSILON {
        return v;
    }
    [v[0] / len, v[1] / len, v[2] / len]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform(m: &Mat4, v: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0; 4];
        for (row, value) in out.iter_mut().enumerate() {
            *value = (0..4).map(|col| m[col][row] * v[col]).sum();
        }
        out
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn default_view_puts_origin_in_front() {
        let camera = OrbitCamera::new(70.0, 1.0, 16.0 / 9.0);
        let eye = transform(&camera.view_matrix(), [0.0, 0.0, 0.0, 1.0]);
        assert!(approx(eye[0], 0.0));
        assert!(approx(eye[1], 0.0));
        assert!(approx(eye[2], -1.0));
    }

    #[test]
    fn projection_maps_near_and_far_to_unit_depth() {
        let projection = perspective(70f32.to_radians(), 1.0, NEAR_PLANE, FAR_PLANE);
        let near = transform(&projection, [0.0, 0.0, -NEAR_PLANE, 1.0]);
        let far = transform(&projection, [0.0, 0.0, -FAR_PLANE, 1.0]);
        assert!(approx(near[2] / near[3], 0.0));
        assert!(approx(far[2] / far[3], 1.0));
    }

    #[test]
    fn points_closer_to_camera_have_smaller_depth() {
        let camera = OrbitCamera::new(70.0, 1.0, 1.0);
        let mvp = |z: f32| {
            let eye = transform(&camera.view_matrix(), [0.0, 0.0, z, 1.0]);
            let clip = transform(&camera.projection_matrix(), eye);
            clip[2] / clip[3]
        };
        assert!(mvp(0.2) < mvp(0.0));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = OrbitCamera::new(70.0, 1.0, 1.0);
        camera.orbit(0.0, 10_000.0);
        assert!(camera.pitch() < FRAC_PI_2);
        camera.orbit(0.0, -20_000.0);
        assert!(camera.pitch() > -FRAC_PI_2);
    }

    #[test]
    fn zoom_moves_closer_and_stays_bounded() {
        let mut camera = OrbitCamera::new(70.0, 1.0, 1.0);
        camera.zoom(1.0);
        assert!(approx(camera.distance(), 0.9));
        camera.zoom(1_000.0);
        assert!(approx(camera.distance(), MIN_DISTANCE));
        camera.zoom(-1_000.0);
        assert!(approx(camera.distance(), MAX_DISTANCE));
    }

    #[test]
    fn orbit_keeps_distance() {
        let mut camera = OrbitCamera::new(70.0, 1.5, 1.0);
        camera.orbit(120.0, -40.0);
        let eye = camera.eye();
        assert!(approx(dot(eye, eye).sqrt(), 1.5));
    }
}
