//! The seams between the level pipeline and whatever presents it. The level
//! knows nothing about windows, GPUs or image formats; it asks a `Camera`
//! where it is, a `TextureResolver` for texture handles, and hands geometry
//! to a `RenderBackend`.

use bsp::BspVertex;
use math::Plane;
use math::glam::Vec3;

/// Opaque handle to a texture owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureHandle(pub u32);

impl TextureHandle {
    /// Well known handle the backend must provide, used when a texture can't
    /// be found
    pub const PLACEHOLDER: TextureHandle = TextureHandle(0);
}

impl Default for TextureHandle {
    fn default() -> Self {
        Self::PLACEHOLDER
    }
}

pub trait Camera {
    /// World space eye position
    fn position(&self) -> Vec3;

    /// The six frustum planes with normals facing in to the frustum, in the
    /// order left, right, bottom, top, near, far
    fn planes(&self) -> [Plane; 6];
}

pub trait TextureResolver {
    /// Look up a texture by its BSP name (no extension). `None` degrades to
    /// `TextureHandle::PLACEHOLDER`.
    fn resolve(&mut self, name: &str) -> Option<TextureHandle>;
}

pub trait RenderBackend {
    fn bind_texture(&mut self, texture: TextureHandle);

    /// Index in to the level's lightmap list
    fn bind_lightmap(&mut self, lightmap: u32);

    /// Triangle list. Indices are relative to the start of `vertices`.
    fn draw_indexed_triangles(&mut self, vertices: &[BspVertex], indices: &[u32]);

    /// One triangle strip. Indices are relative to the start of `vertices`.
    fn draw_triangle_strip(&mut self, vertices: &[BspVertex], indices: &[u32]);
}
