//! Quadratic Bézier patches. A patch face is a `w x h` grid of control
//! vertices (both odd) which is drawn as `((w-1)/2) x ((h-1)/2)` 3x3
//! sub-patches, each tessellated in to a vertex grid and a set of triangle
//! strips.

use std::collections::HashMap;

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use log::trace;

use bsp::{BspFace, BspVertex};

/// Subdivisions per sub-patch edge when nothing else is configured
pub const DEFAULT_TESS_LEVEL: u32 = 8;

/// One tessellated 3x3 sub-patch: `(L+1)^2` vertices and `L` strips of
/// `2(L+1)` indices, every strip joining two neighbouring vertex rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchMesh {
    level: u32,
    vertices: Vec<BspVertex>,
    indices: Vec<u32>,
}

impl PatchMesh {
    pub const fn level(&self) -> u32 {
        self.level
    }

    pub fn vertices(&self) -> &[BspVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn strips(&self) -> impl Iterator<Item = &[u32]> {
        self.indices.chunks_exact(2 * (self.level as usize + 1))
    }

    /// Triangles produced by drawing every strip
    pub const fn triangle_count(&self) -> u32 {
        2 * self.level * self.level
    }
}

#[inline]
fn bezier_weights(t: f32) -> [f32; 3] {
    let s = 1.0 - t;
    [s * s, 2.0 * s * t, t * t]
}

/// Tessellate nine row-major control vertices at `level` subdivisions, which
/// is clamped to at least 1. Each control row is first collapsed to one point
/// for the row parameter, then those three points are evaluated along the
/// column parameter.
pub fn tessellate(controls: &[BspVertex; 9], level: u32) -> PatchMesh {
    let level = level.max(1);
    let l1 = level as usize + 1;
    let step = level as f32;

    let mut vertices = vec![BspVertex::default(); l1 * l1];
    for i in 0..l1 {
        let wa = bezier_weights(i as f32 / step);
        let temp = [0, 3, 6].map(|k| {
            BspVertex::blend3([&controls[k], &controls[k + 1], &controls[k + 2]], wa)
        });
        for j in 0..l1 {
            let wb = bezier_weights(j as f32 / step);
            vertices[i * l1 + j] = BspVertex::blend3([&temp[0], &temp[1], &temp[2]], wb);
        }
    }

    let mut indices = vec![0u32; level as usize * l1 * 2];
    for row in 0..level as usize {
        for col in 0..l1 {
            let at = (row * l1 + col) * 2;
            indices[at] = ((row + 1) * l1 + col) as u32;
            indices[at + 1] = (row * l1 + col) as u32;
        }
    }

    PatchMesh {
        level,
        vertices,
        indices,
    }
}

/// Split a patch face in to its 3x3 sub-patches and tessellate each
pub fn tessellate_face(face: &BspFace, vertices: &[BspVertex], level: u32) -> Vec<PatchMesh> {
    #[cfg(feature = "hprof")]
    profile!("tessellate_face");
    let width = face.patch_size.x as usize;
    let height = face.patch_size.y as usize;
    let first = face.first_vertex as usize;
    let wide = (width - 1) / 2;
    let high = (height - 1) / 2;

    let mut meshes = Vec::with_capacity(wide * high);
    for y in 0..high {
        for x in 0..wide {
            let offset = first + 2 * y * width + 2 * x;
            let controls: [BspVertex; 9] =
                std::array::from_fn(|i| vertices[offset + (i / 3) * width + i % 3]);
            meshes.push(tessellate(&controls, level));
        }
    }
    meshes
}

/// Tessellated patch faces kept for the life of a level. Keyed by face and
/// level since the output depends on nothing else.
#[derive(Debug, Default)]
pub struct PatchCache {
    meshes: HashMap<(usize, u32), Vec<PatchMesh>>,
}

impl PatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(
        &mut self,
        face_index: usize,
        face: &BspFace,
        vertices: &[BspVertex],
        level: u32,
    ) -> &[PatchMesh] {
        let level = level.max(1);
        self.meshes.entry((face_index, level)).or_insert_with(|| {
            trace!("Tessellating patch face {} at level {}", face_index, level);
            tessellate_face(face, vertices, level)
        })
    }

    /// Number of cached faces
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn clear(&mut self) {
        self.meshes.clear();
    }
}
