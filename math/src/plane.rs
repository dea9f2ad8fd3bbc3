use crate::Aabb;
use glam::{Mat4, Vec3, Vec4};

/// Where a point or box sits relative to a plane. "Front" is the side the
/// normal points to, which for frustum planes is the inside of the volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Entirely on the positive side
    Front,
    /// Entirely on the negative side
    Back,
    /// Crosses the plane
    Straddle,
}

/// A plane as `normal · p - dist = 0`.
///
/// This is the convention of the BSP file's plane lump, and frustum planes are
/// converted to it so that one classification routine serves both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub dist: f32,
}

impl Plane {
    pub const fn new(normal: Vec3, dist: f32) -> Self {
        Self { normal, dist }
    }

    /// Build from the `ax + by + cz + d` form, normalising the result.
    /// Degenerate (zero length) normals are left as they are.
    pub fn from_coefficients(v: Vec4) -> Self {
        let normal = v.truncate();
        let len = normal.length();
        if len < f32::EPSILON {
            return Self {
                normal,
                dist: -v.w,
            };
        }
        Self {
            normal: normal / len,
            dist: -v.w / len,
        }
    }

    /// Signed distance of `point` from the plane
    #[inline]
    pub fn distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.dist
    }

    /// Determine which side of the plane the point is on. Points on the plane
    /// count as front, which is what the BSP descent expects.
    #[inline]
    pub fn point_on_side(&self, point: Vec3) -> PlaneSide {
        if self.distance(point) >= 0.0 {
            PlaneSide::Front
        } else {
            PlaneSide::Back
        }
    }

    /// Classify a box by testing only the two corners that are extreme along
    /// the normal: the one furthest in front and the one furthest behind.
    pub fn box_on_side(&self, bbox: &Aabb) -> PlaneSide {
        let mut front = bbox.max;
        let mut back = bbox.min;
        for i in 0..3 {
            if self.normal[i] < 0.0 {
                front[i] = bbox.min[i];
                back[i] = bbox.max[i];
            }
        }

        if self.distance(back) >= 0.0 {
            PlaneSide::Front
        } else if self.distance(front) < 0.0 {
            PlaneSide::Back
        } else {
            PlaneSide::Straddle
        }
    }
}

/// Extract the six frustum planes (left, right, bottom, top, near, far) from a
/// clip matrix (`projection * view`). Normals point into the volume.
pub fn frustum_planes(clip: Mat4) -> [Plane; 6] {
    let r0 = clip.row(0);
    let r1 = clip.row(1);
    let r2 = clip.row(2);
    let r3 = clip.row(3);

    [
        Plane::from_coefficients(r3 + r0),
        Plane::from_coefficients(r3 - r0),
        Plane::from_coefficients(r3 + r1),
        Plane::from_coefficients(r3 - r1),
        Plane::from_coefficients(r3 + r2),
        Plane::from_coefficients(r3 - r2),
    ]
}

#[cfg(test)]
mod tests {
    use crate::{frustum_planes, Aabb, Plane, PlaneSide};
    use glam::{Mat4, Vec3, Vec4};

    fn unit_box_at(center: Vec3) -> Aabb {
        Aabb::new(center - Vec3::ONE, center + Vec3::ONE)
    }

    #[test]
    fn point_on_plane_is_front() {
        let p = Plane::new(Vec3::Z, 10.0);
        assert_eq!(p.point_on_side(Vec3::new(0.0, 0.0, 10.0)), PlaneSide::Front);
        assert_eq!(p.point_on_side(Vec3::new(5.0, 5.0, 9.9)), PlaneSide::Back);
    }

    #[test]
    fn classify_boxes() {
        let p = Plane::new(Vec3::X, 0.0);
        assert_eq!(p.box_on_side(&unit_box_at(Vec3::new(5.0, 0.0, 0.0))), PlaneSide::Front);
        assert_eq!(p.box_on_side(&unit_box_at(Vec3::new(-5.0, 0.0, 0.0))), PlaneSide::Back);
        assert_eq!(p.box_on_side(&unit_box_at(Vec3::ZERO)), PlaneSide::Straddle);

        // A negative normal must pick the opposite corners
        let n = Plane::new(-Vec3::X, 0.0);
        assert_eq!(n.box_on_side(&unit_box_at(Vec3::new(-5.0, 0.0, 0.0))), PlaneSide::Front);
        assert_eq!(n.box_on_side(&unit_box_at(Vec3::new(5.0, 0.0, 0.0))), PlaneSide::Back);
    }

    #[test]
    fn coefficients_are_normalised() {
        let p = Plane::from_coefficients(Vec4::new(0.0, 2.0, 0.0, -4.0));
        assert!((p.normal - Vec3::Y).length() < 1e-6);
        assert!((p.dist - 2.0).abs() < 1e-6);
        assert!(p.distance(Vec3::new(0.0, 2.0, 0.0)).abs() < 1e-6);
    }

    #[test]
    fn frustum_contains_what_the_camera_looks_at() {
        let proj = Mat4::perspective_rh_gl(std::f32::consts::FRAC_PI_2, 1.0, 1.0, 100.0);
        let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        let planes = frustum_planes(proj * view);

        let ahead = unit_box_at(Vec3::new(0.0, 0.0, -10.0));
        assert!(planes.iter().all(|p| p.box_on_side(&ahead) == PlaneSide::Front));

        let behind = unit_box_at(Vec3::new(0.0, 0.0, 10.0));
        assert!(planes.iter().any(|p| p.box_on_side(&behind) == PlaneSide::Back));
    }
}
