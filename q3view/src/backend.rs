use level::bsp::BspVertex;
use log::warn;
use render_trait::{RenderBackend, TextureHandle};

/// Stands in for a GPU: counts what would have been submitted, checks every
/// index lands inside the vertex slice it came with and that state is never
/// bound twice in a row.
#[derive(Debug, Default)]
pub struct CountingBackend {
    texture: Option<TextureHandle>,
    lightmap: Option<u32>,
    pub redundant_binds: u64,
    pub triangles: u64,
    pub strips: u64,
    pub vertices: u64,
    pub indices: u64,
    pub bad_indices: u64,
}

impl CountingBackend {
    fn check(&mut self, vertices: &[BspVertex], indices: &[u32]) {
        let bad = indices
            .iter()
            .filter(|&&i| i as usize >= vertices.len())
            .count() as u64;
        if bad > 0 {
            warn!(
                "{} of {} indices out of range for {} vertices",
                bad,
                indices.len(),
                vertices.len()
            );
            self.bad_indices += bad;
        }
        self.vertices += vertices.len() as u64;
        self.indices += indices.len() as u64;
    }
}

impl RenderBackend for CountingBackend {
    fn bind_texture(&mut self, texture: TextureHandle) {
        if self.texture == Some(texture) {
            self.redundant_binds += 1;
        }
        self.texture = Some(texture);
    }

    fn bind_lightmap(&mut self, lightmap: u32) {
        if self.lightmap == Some(lightmap) {
            self.redundant_binds += 1;
        }
        self.lightmap = Some(lightmap);
    }

    fn draw_indexed_triangles(&mut self, vertices: &[BspVertex], indices: &[u32]) {
        self.check(vertices, indices);
        self.triangles += indices.len() as u64 / 3;
    }

    fn draw_triangle_strip(&mut self, vertices: &[BspVertex], indices: &[u32]) {
        self.check(vertices, indices);
        self.strips += 1;
        self.triangles += indices.len().saturating_sub(2) as u64;
    }
}
