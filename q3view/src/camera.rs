use glam::{Mat4, Vec3};
use math::{Plane, frustum_planes, swizzle};
use render_trait::Camera;

const NEAR: f32 = 4.0;
const FAR: f32 = 16384.0;

/// A free flying camera. Angles are in Quake's Z-up frame; when the level was
/// swizzled to Y-up the derived vectors are swizzled to match.
pub struct FlyCamera {
    position: Vec3,
    /// Radians, 0 looks down +X
    yaw: f32,
    pitch: f32,
    fov: f32,
    aspect: f32,
    y_up: bool,
    planes: [Plane; 6],
}

impl FlyCamera {
    pub fn new(position: Vec3, yaw_deg: f32, pitch_deg: f32, fov_deg: f32, y_up: bool) -> Self {
        let mut camera = Self {
            position,
            yaw: yaw_deg.to_radians(),
            pitch: pitch_deg.to_radians(),
            fov: fov_deg.to_radians(),
            aspect: 4.0 / 3.0,
            y_up,
            planes: [Plane::new(Vec3::ZERO, 0.0); 6],
        };
        camera.update_planes();
        camera
    }

    fn to_world(&self, v: Vec3) -> Vec3 {
        if self.y_up { swizzle(v) } else { v }
    }

    pub fn forward(&self) -> Vec3 {
        self.to_world(Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
        ))
    }

    fn up(&self) -> Vec3 {
        self.to_world(Vec3::Z)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), self.up())
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, self.aspect, NEAR, FAR)
    }

    fn update_planes(&mut self) {
        self.planes = frustum_planes(self.projection_matrix() * self.view_matrix());
    }

    /// Move along the view direction
    pub fn advance(&mut self, distance: f32) {
        self.position += self.forward() * distance;
        self.update_planes();
    }

    pub fn turn(&mut self, yaw_deg: f32) {
        self.yaw += yaw_deg.to_radians();
        self.update_planes();
    }
}

impl Camera for FlyCamera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn planes(&self) -> [Plane; 6] {
        self.planes
    }
}
