//! Synthetic levels and a recording backend shared by the pipeline tests.

mod pvs_tests;

use std::collections::HashMap;

use glam::{IVec3, Vec3};
use math::Plane;

use bsp::{
    BspDocument, BspFace, BspLeaf, BspLightmap, BspNode, BspTexture, BspVertex, VisibilityTable,
};
use render_trait::{Camera, RenderBackend, TextureHandle, TextureResolver};

use crate::Level;

/// Three leaves, one cluster each:
///
/// ```text,ignore
///            root (x = 0)
///           /            \
///     leaf 0 (x >= 0)    node 1 (y = 0)
///                        /            \
///               leaf 1 (y >= 0)    leaf 2 (y < 0)
/// ```
///
/// Cluster 0 sees itself and cluster 1, the others only see themselves.
/// Faces 0, 1 and 2 belong to one leaf each, face 3 is listed by leaves 0
/// and 1.
pub(crate) fn three_leaf_doc() -> BspDocument {
    let mut visibility = VisibilityTable::with_clusters(3);
    visibility.set_self_visible();
    visibility.set_visible(0, 1);

    let leaf = |cluster: i32, mins: IVec3, maxs: IVec3, first: i32, count: i32| BspLeaf {
        cluster,
        mins,
        maxs,
        first_leaf_face: first,
        num_leaf_faces: count,
        ..Default::default()
    };
    let polygon = |texture: i32, lightmap: i32| BspFace {
        texture,
        face_type: 1,
        num_vertices: 3,
        num_mesh_indices: 3,
        lightmap,
        ..Default::default()
    };

    BspDocument {
        textures: vec![
            BspTexture::new("textures/test/a", 0, 1),
            BspTexture::new("textures/test/b", 0, 1),
        ],
        planes: vec![Plane::new(Vec3::X, 0.0), Plane::new(Vec3::Y, 0.0)],
        nodes: vec![
            BspNode {
                plane: 0,
                children: [-1, 1],
                mins: IVec3::splat(-64),
                maxs: IVec3::splat(64),
            },
            BspNode {
                plane: 1,
                children: [-2, -3],
                mins: IVec3::new(-64, -64, -64),
                maxs: IVec3::new(0, 64, 64),
            },
        ],
        leaves: vec![
            leaf(0, IVec3::new(0, -64, -64), IVec3::new(64, 64, 64), 0, 2),
            leaf(1, IVec3::new(-64, 0, -64), IVec3::new(0, 64, 64), 2, 2),
            leaf(2, IVec3::new(-64, -64, -64), IVec3::new(0, 0, 64), 4, 1),
        ],
        leaf_faces: vec![0, 3, 1, 3, 2],
        vertices: vec![
            BspVertex {
                position: Vec3::new(0.0, 0.0, 0.0),
                ..Default::default()
            },
            BspVertex {
                position: Vec3::new(1.0, 0.0, 0.0),
                ..Default::default()
            },
            BspVertex {
                position: Vec3::new(0.0, 1.0, 0.0),
                ..Default::default()
            },
        ],
        mesh_indices: vec![0, 1, 2],
        faces: vec![polygon(1, 0), polygon(0, -1), polygon(0, -1), polygon(1, 0)],
        lightmaps: vec![BspLightmap::filled([128, 128, 128])],
        visibility,
        ..Default::default()
    }
}

pub(crate) fn three_leaf_level() -> Level {
    Level::new(three_leaf_doc()).unwrap()
}

/// Inside leaf 0
pub(crate) const IN_LEAF_0: Vec3 = Vec3::new(32.0, 0.0, 0.0);
/// Inside leaf 1
pub(crate) const IN_LEAF_1: Vec3 = Vec3::new(-32.0, 32.0, 0.0);
/// Inside leaf 2
pub(crate) const IN_LEAF_2: Vec3 = Vec3::new(-32.0, -32.0, 0.0);

/// An axis aligned frustum from `-half` to `half` on every axis
pub(crate) fn box_frustum(half: f32) -> [Plane; 6] {
    [
        Plane::new(Vec3::X, -half),
        Plane::new(Vec3::NEG_X, -half),
        Plane::new(Vec3::Y, -half),
        Plane::new(Vec3::NEG_Y, -half),
        Plane::new(Vec3::Z, -half),
        Plane::new(Vec3::NEG_Z, -half),
    ]
}

pub(crate) struct TestCamera {
    pub position: Vec3,
    pub planes: [Plane; 6],
}

impl TestCamera {
    /// Sees the whole test level
    pub fn wide(position: Vec3) -> Self {
        Self {
            position,
            planes: box_frustum(1000.0),
        }
    }
}

impl Camera for TestCamera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn planes(&self) -> [Plane; 6] {
        self.planes
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Texture(TextureHandle),
    Lightmap(u32),
    Triangles { vertices: usize, indices: Vec<u32> },
    Strip { vertices: usize, indices: usize },
}

#[derive(Default)]
pub(crate) struct RecordingBackend {
    pub calls: Vec<Call>,
}

impl RenderBackend for RecordingBackend {
    fn bind_texture(&mut self, texture: TextureHandle) {
        self.calls.push(Call::Texture(texture));
    }

    fn bind_lightmap(&mut self, lightmap: u32) {
        self.calls.push(Call::Lightmap(lightmap));
    }

    fn draw_indexed_triangles(&mut self, vertices: &[BspVertex], indices: &[u32]) {
        self.calls.push(Call::Triangles {
            vertices: vertices.len(),
            indices: indices.to_vec(),
        });
    }

    fn draw_triangle_strip(&mut self, vertices: &[BspVertex], indices: &[u32]) {
        self.calls.push(Call::Strip {
            vertices: vertices.len(),
            indices: indices.len(),
        });
    }
}

pub(crate) struct MapResolver(pub HashMap<&'static str, TextureHandle>);

impl TextureResolver for MapResolver {
    fn resolve(&mut self, name: &str) -> Option<TextureHandle> {
        self.0.get(name).copied()
    }
}
