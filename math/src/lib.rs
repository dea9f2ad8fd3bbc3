//! Small geometric helpers shared by the loader, the visibility pipeline and
//! the viewer: planes in the `normal · p - dist` convention used by the BSP
//! format, axis aligned boxes, and the box-vs-plane classification that
//! drives frustum culling.

mod aabb;
mod plane;

pub use aabb::*;
pub use glam;
pub use plane::*;

use glam::{IVec3, Vec3};

/// Rotate Quake's Z-up axes into Y-up: `(x, y, z) -> (y, z, x)`
#[inline]
pub const fn swizzle(v: Vec3) -> Vec3 {
    Vec3::new(v.y, v.z, v.x)
}

/// Integer variant of [`swizzle`], used for the integer bounding boxes of the
/// tree records
#[inline]
pub const fn swizzle_i(v: IVec3) -> IVec3 {
    IVec3::new(v.y, v.z, v.x)
}
