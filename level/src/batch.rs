#[cfg(feature = "hprof")]
use coarse_prof::profile;
use log::trace;

use bsp::{BspDocument, FaceKind};
use render_trait::{RenderBackend, TextureHandle};

use crate::patch::PatchCache;
use crate::stats::FrameStats;

/// A visible face paired with the state it needs bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawItem {
    pub texture: TextureHandle,
    pub lightmap: Option<u32>,
    pub face: usize,
}

/// Pair faces with their texture and lightmap and stable sort by both, so
/// faces sharing state end up next to each other in collection order.
pub fn sort_faces(
    faces: &[usize],
    doc: &BspDocument,
    textures: &[TextureHandle],
) -> Vec<DrawItem> {
    let mut items: Vec<DrawItem> = faces
        .iter()
        .map(|&face| {
            let raw = &doc.faces[face];
            DrawItem {
                texture: textures
                    .get(raw.texture as usize)
                    .copied()
                    .unwrap_or(TextureHandle::PLACEHOLDER),
                lightmap: raw.lightmap(),
                face,
            }
        })
        .collect();
    items.sort_by_key(|item| (item.texture, item.lightmap));
    items
}

/// Sort the faces then draw them, binding a texture or lightmap only when it
/// differs from the one before. Faces without a lightmap leave the current
/// one bound.
pub fn draw_faces(
    faces: &[usize],
    doc: &BspDocument,
    textures: &[TextureHandle],
    patches: &mut PatchCache,
    tess_level: u32,
    backend: &mut impl RenderBackend,
    stats: &mut FrameStats,
) {
    #[cfg(feature = "hprof")]
    profile!("draw_faces");
    let mut bound_texture = None;
    let mut bound_lightmap = None;

    for item in sort_faces(faces, doc, textures) {
        if bound_texture != Some(item.texture) {
            backend.bind_texture(item.texture);
            bound_texture = Some(item.texture);
            stats.texture_binds += 1;
        }
        if let Some(lightmap) = item.lightmap {
            if bound_lightmap != Some(lightmap) {
                backend.bind_lightmap(lightmap);
                bound_lightmap = Some(lightmap);
                stats.lightmap_binds += 1;
            }
        }

        let face = &doc.faces[item.face];
        match face.kind() {
            Some(FaceKind::Polygon | FaceKind::Mesh) => {
                let first = face.first_vertex as usize;
                let vertices = &doc.vertices[first..first + face.num_vertices as usize];
                let first = face.first_mesh_index as usize;
                let indices = &doc.mesh_indices[first..first + face.num_mesh_indices as usize];
                backend.draw_indexed_triangles(vertices, indices);
                stats.draw_calls += 1;
                stats.polygons += indices.len() as u32 / 3;
            }
            Some(FaceKind::Patch) => {
                for mesh in patches.get_or_build(item.face, face, &doc.vertices, tess_level) {
                    for strip in mesh.strips() {
                        backend.draw_triangle_strip(mesh.vertices(), strip);
                        stats.draw_calls += 1;
                    }
                    stats.polygons += mesh.triangle_count();
                }
                stats.patches += 1;
            }
            Some(FaceKind::Billboard) | None => {
                trace!("Skipping billboard face {}", item.face);
            }
        }
    }
}
