use std::io::Cursor;

use criterion::*;

use bsp::glam::{IVec3, Vec3};
use bsp::{
    BspDocument, BspFace, BspLeaf, BspNode, BspTexture, BspVertex, BspWriter, VisibilityTable,
};
use math::Plane;

/// A balanced tree over `depth` levels with a quad per leaf, about the shape
/// of a small arena map
fn synthetic_level(depth: u32) -> Vec<u8> {
    let leaf_count = 1usize << depth;
    let node_count = leaf_count - 1;
    let mut doc = BspDocument {
        textures: vec![BspTexture::new("textures/bench/floor", 0, 1)],
        visibility: VisibilityTable::with_clusters(leaf_count),
        ..Default::default()
    };
    doc.visibility.set_self_visible();

    for i in 0..node_count {
        doc.planes.push(Plane::new(Vec3::X, i as f32));
        let child = |c: usize| -> i32 {
            if c < node_count {
                c as i32
            } else {
                -((c - node_count) as i32) - 1
            }
        };
        doc.nodes.push(BspNode {
            plane: i as i32,
            children: [child(2 * i + 1), child(2 * i + 2)],
            mins: IVec3::splat(-4096),
            maxs: IVec3::splat(4096),
        });
    }

    for i in 0..leaf_count {
        doc.leaves.push(BspLeaf {
            cluster: i as i32,
            mins: IVec3::splat(-64),
            maxs: IVec3::splat(64),
            first_leaf_face: i as i32,
            num_leaf_faces: 1,
            ..Default::default()
        });
        doc.leaf_faces.push(i as u32);
        doc.faces.push(BspFace {
            face_type: 1,
            first_vertex: (i * 4) as i32,
            num_vertices: 4,
            num_mesh_indices: 6,
            lightmap: -1,
            ..Default::default()
        });
        doc.vertices.extend([BspVertex::default(); 4]);
    }
    doc.mesh_indices = vec![0, 1, 2, 0, 2, 3];
    BspWriter::write(&doc)
}

fn bench(c: &mut Criterion) {
    let small = synthetic_level(8);
    let large = synthetic_level(14);

    let mut group = c.benchmark_group("BSP loading");
    group.bench_function("Load 256 leaf level", |b| {
        b.iter(|| BspDocument::load(Cursor::new(black_box(&small))).unwrap())
    });
    group.bench_function("Load 16k leaf level", |b| {
        b.iter(|| BspDocument::load(Cursor::new(black_box(&large))).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench,);
criterion_main!(benches);
