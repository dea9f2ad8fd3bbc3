use std::io::{Read, Seek};

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use glam::IVec3;
use log::{debug, info};
use math::{swizzle, swizzle_i, Plane};

use crate::entities::{parse_entities, Entity};
use crate::error::LoadError;
use crate::lumps::{BspFace, BspLeaf, BspLightmap, BspNode, BspTexture, BspVertex, FaceKind};
use crate::reader::{BspReader, LumpIndex};
use crate::visibility::VisibilityTable;

/// Options applied while loading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Rotate Quake's Z-up coordinates in to Y-up
    pub swizzle_axes: bool,
}

/// Every lump the level pipeline uses, decoded and validated. Immutable once
/// loaded.
#[derive(Debug, Clone, Default)]
pub struct BspDocument {
    pub entities: String,
    pub textures: Vec<BspTexture>,
    pub planes: Vec<Plane>,
    pub nodes: Vec<BspNode>,
    pub leaves: Vec<BspLeaf>,
    pub leaf_faces: Vec<u32>,
    pub vertices: Vec<BspVertex>,
    pub mesh_indices: Vec<u32>,
    pub faces: Vec<BspFace>,
    pub lightmaps: Vec<BspLightmap>,
    pub visibility: VisibilityTable,
}

impl BspDocument {
    pub fn load<R: Read + Seek>(stream: R) -> Result<Self, LoadError> {
        Self::load_with(stream, LoadOptions::default())
    }

    pub fn load_with<R: Read + Seek>(stream: R, options: LoadOptions) -> Result<Self, LoadError> {
        #[cfg(feature = "hprof")]
        profile!("bsp_document_load");
        let mut reader = BspReader::new(stream)?;

        let entities = reader.read_lump_bytes(LumpIndex::Entities)?;
        let entities = String::from_utf8_lossy(&entities)
            .trim_end_matches('\u{0}')
            .to_owned();

        let mut doc = Self {
            entities,
            textures: reader.read_lump(LumpIndex::Textures)?,
            planes: reader.read_lump(LumpIndex::Planes)?,
            nodes: reader.read_lump(LumpIndex::Nodes)?,
            leaves: reader.read_lump(LumpIndex::Leaves)?,
            leaf_faces: reader.read_lump(LumpIndex::LeafFaces)?,
            vertices: reader.read_lump(LumpIndex::Vertices)?,
            mesh_indices: reader.read_lump(LumpIndex::MeshIndices)?,
            faces: reader.read_lump(LumpIndex::Faces)?,
            lightmaps: reader.read_lump(LumpIndex::Lightmaps)?,
            visibility: VisibilityTable::from_lump_bytes(
                &reader.read_lump_bytes(LumpIndex::Visibility)?,
            )?,
        };

        doc.validate()?;
        if options.swizzle_axes {
            doc.swizzle_axes();
        }

        info!(
            "Loaded BSP: {} nodes, {} leaves, {} faces, {} vertices, {} textures, {} lightmaps, {} clusters",
            doc.nodes.len(),
            doc.leaves.len(),
            doc.faces.len(),
            doc.vertices.len(),
            doc.textures.len(),
            doc.lightmaps.len(),
            doc.visibility.cluster_count()
        );
        Ok(doc)
    }

    pub fn entity_list(&self) -> Vec<Entity> {
        parse_entities(&self.entities)
    }

    /// Check every cross-table reference once so that nothing downstream has
    /// to. The node check also guarantees the tree is acyclic: the format
    /// emits nodes in pre-order, so a child node always has a larger index
    /// than its parent, and every child is referenced exactly once.
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.leaves.is_empty() {
            return Err(LoadError::CorruptLump {
                lump: LumpIndex::Leaves,
                reason: "a level needs at least one leaf".to_owned(),
            });
        }

        let mut node_referenced = vec![false; self.nodes.len()];
        let mut leaf_referenced = vec![false; self.leaves.len()];
        for (i, node) in self.nodes.iter().enumerate() {
            check_index(LumpIndex::Nodes, i, node.plane as i64, self.planes.len())?;
            for &child in &node.children {
                let seen = if child >= 0 {
                    if child as usize <= i {
                        return Err(LoadError::InvalidReference {
                            lump: LumpIndex::Nodes,
                            record: i,
                            value: child as i64,
                            limit: self.nodes.len(),
                        });
                    }
                    check_index(LumpIndex::Nodes, i, child as i64, self.nodes.len())?;
                    &mut node_referenced[child as usize]
                } else {
                    let leaf = -(child as i64) - 1;
                    check_index(LumpIndex::Nodes, i, leaf, self.leaves.len())?;
                    &mut leaf_referenced[leaf as usize]
                };
                if *seen {
                    return Err(LoadError::CorruptLump {
                        lump: LumpIndex::Nodes,
                        reason: format!("child {} of node {} has two parents", child, i),
                    });
                }
                *seen = true;
            }
        }

        for (i, leaf) in self.leaves.iter().enumerate() {
            check_range(
                LumpIndex::Leaves,
                i,
                leaf.first_leaf_face,
                leaf.num_leaf_faces,
                self.leaf_faces.len(),
            )?;
            if !self.visibility.is_empty() {
                check_index(
                    LumpIndex::Leaves,
                    i,
                    leaf.cluster.max(0) as i64,
                    self.visibility.cluster_count(),
                )?;
            }
        }

        for (i, &face) in self.leaf_faces.iter().enumerate() {
            check_index(LumpIndex::LeafFaces, i, face as i64, self.faces.len())?;
        }

        for (i, face) in self.faces.iter().enumerate() {
            self.validate_face(i, face)?;
        }

        debug!("BSP references validated");
        Ok(())
    }

    fn validate_face(&self, i: usize, face: &BspFace) -> Result<(), LoadError> {
        let Some(kind) = face.kind() else {
            return Err(LoadError::CorruptLump {
                lump: LumpIndex::Faces,
                reason: format!("face {} has unknown type {}", i, face.face_type),
            });
        };

        check_index(LumpIndex::Faces, i, face.texture as i64, self.textures.len())?;
        if face.lightmap >= 0 {
            check_index(LumpIndex::Faces, i, face.lightmap as i64, self.lightmaps.len())?;
        }
        check_range(
            LumpIndex::Faces,
            i,
            face.first_vertex,
            face.num_vertices,
            self.vertices.len(),
        )?;

        match kind {
            FaceKind::Polygon | FaceKind::Mesh => {
                check_range(
                    LumpIndex::Faces,
                    i,
                    face.first_mesh_index,
                    face.num_mesh_indices,
                    self.mesh_indices.len(),
                )?;
                let start = face.first_mesh_index as usize;
                let end = start + face.num_mesh_indices as usize;
                for &index in &self.mesh_indices[start..end] {
                    check_index(
                        LumpIndex::MeshIndices,
                        i,
                        index as i64,
                        face.num_vertices as usize,
                    )?;
                }
            }
            FaceKind::Patch => {
                let (w, h) = (face.patch_size.x, face.patch_size.y);
                if w < 3
                    || h < 3
                    || w % 2 == 0
                    || h % 2 == 0
                    || w as i64 * h as i64 > face.num_vertices as i64
                {
                    return Err(LoadError::CorruptLump {
                        lump: LumpIndex::Faces,
                        reason: format!(
                            "patch face {} has a {}x{} grid over {} vertices",
                            i, w, h, face.num_vertices
                        ),
                    });
                }
            }
            FaceKind::Billboard => {}
        }
        Ok(())
    }

    /// Rotate every position, normal and bound from Z-up to Y-up. Plane
    /// distances are unchanged by a rotation.
    pub fn swizzle_axes(&mut self) {
        for plane in &mut self.planes {
            plane.normal = swizzle(plane.normal);
        }
        for node in &mut self.nodes {
            (node.mins, node.maxs) = swizzle_bounds(node.mins, node.maxs);
        }
        for leaf in &mut self.leaves {
            (leaf.mins, leaf.maxs) = swizzle_bounds(leaf.mins, leaf.maxs);
        }
        for vertex in &mut self.vertices {
            vertex.position = swizzle(vertex.position);
            vertex.normal = swizzle(vertex.normal);
        }
        for face in &mut self.faces {
            face.normal = swizzle(face.normal);
            face.lightmap_origin = swizzle(face.lightmap_origin);
            face.lightmap_vecs = [swizzle(face.lightmap_vecs[0]), swizzle(face.lightmap_vecs[1])];
        }
    }
}

fn swizzle_bounds(mins: IVec3, maxs: IVec3) -> (IVec3, IVec3) {
    let (a, b) = (swizzle_i(mins), swizzle_i(maxs));
    (a.min(b), a.max(b))
}

fn check_index(lump: LumpIndex, record: usize, value: i64, limit: usize) -> Result<(), LoadError> {
    if value < 0 || value as usize >= limit {
        return Err(LoadError::InvalidReference {
            lump,
            record,
            value,
            limit,
        });
    }
    Ok(())
}

fn check_range(
    lump: LumpIndex,
    record: usize,
    first: i32,
    count: i32,
    limit: usize,
) -> Result<(), LoadError> {
    let end = first as i64 + count as i64;
    if first < 0 || count < 0 || end as usize > limit {
        return Err(LoadError::InvalidReference {
            lump,
            record,
            value: end,
            limit,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use glam::{IVec2, IVec3, Vec3};
    use math::Plane;

    use crate::lumps::{BspFace, BspLeaf, BspNode, BspTexture, BspVertex};
    use crate::{BspDocument, BspWriter, LoadError, LoadOptions, LumpIndex, VisibilityTable};

    /// One node splitting on x = 0 with a leaf either side, one face each
    fn two_leaf_doc() -> BspDocument {
        let mut doc = BspDocument {
            entities: "{\n\"classname\" \"worldspawn\"\n}\n".to_owned(),
            textures: vec![BspTexture::new("textures/a", 0, 1)],
            planes: vec![Plane::new(Vec3::X, 0.0)],
            nodes: vec![BspNode {
                plane: 0,
                children: [-1, -2],
                mins: IVec3::new(-64, -64, -64),
                maxs: IVec3::new(64, 64, 64),
            }],
            leaves: vec![
                BspLeaf {
                    cluster: 0,
                    mins: IVec3::new(0, -64, -64),
                    maxs: IVec3::new(64, 64, 64),
                    first_leaf_face: 0,
                    num_leaf_faces: 1,
                    ..Default::default()
                },
                BspLeaf {
                    cluster: 1,
                    mins: IVec3::new(-64, -64, -64),
                    maxs: IVec3::new(0, 64, 64),
                    first_leaf_face: 1,
                    num_leaf_faces: 1,
                    ..Default::default()
                },
            ],
            leaf_faces: vec![0, 1],
            vertices: vec![BspVertex::default(); 3],
            mesh_indices: vec![0, 1, 2],
            visibility: VisibilityTable::with_clusters(2),
            ..Default::default()
        };
        let face = BspFace {
            face_type: 1,
            num_vertices: 3,
            num_mesh_indices: 3,
            lightmap: -1,
            ..Default::default()
        };
        doc.faces = vec![face, face];
        doc
    }

    fn load(doc: &BspDocument) -> Result<BspDocument, LoadError> {
        BspDocument::load(Cursor::new(BspWriter::write(doc)))
    }

    #[test]
    fn load_written_document() {
        let doc = load(&two_leaf_doc()).unwrap();
        assert_eq!(doc.nodes.len(), 1);
        assert_eq!(doc.leaves.len(), 2);
        assert_eq!(doc.faces.len(), 2);
        assert_eq!(doc.textures[0].name, "textures/a");
        assert_eq!(doc.visibility.cluster_count(), 2);
        assert_eq!(doc.entity_list()[0].classname(), Some("worldspawn"));
    }

    #[test]
    fn child_out_of_range() {
        let mut doc = two_leaf_doc();
        doc.nodes[0].children[1] = -3;
        assert!(matches!(
            load(&doc),
            Err(LoadError::InvalidReference {
                lump: LumpIndex::Nodes,
                value: 2,
                ..
            })
        ));
    }

    #[test]
    fn shared_child_is_corrupt() {
        let mut doc = two_leaf_doc();
        doc.nodes[0].children = [-1, -1];
        assert!(matches!(load(&doc), Err(LoadError::CorruptLump { .. })));
    }

    #[test]
    fn backwards_child_is_rejected() {
        let mut doc = two_leaf_doc();
        doc.nodes[0].children[0] = 0;
        assert!(matches!(load(&doc), Err(LoadError::InvalidReference { .. })));
    }

    #[test]
    fn leaf_face_range_checked() {
        let mut doc = two_leaf_doc();
        doc.leaves[1].num_leaf_faces = 2;
        assert!(matches!(
            load(&doc),
            Err(LoadError::InvalidReference {
                lump: LumpIndex::Leaves,
                record: 1,
                ..
            })
        ));
    }

    #[test]
    fn mesh_index_past_face_vertices() {
        let mut doc = two_leaf_doc();
        doc.mesh_indices[2] = 3;
        assert!(matches!(
            load(&doc),
            Err(LoadError::InvalidReference {
                lump: LumpIndex::MeshIndices,
                ..
            })
        ));
    }

    #[test]
    fn bad_patch_grid() {
        let mut doc = two_leaf_doc();
        doc.faces[0].face_type = 2;
        doc.faces[0].patch_size = IVec2::new(2, 3);
        assert!(matches!(load(&doc), Err(LoadError::CorruptLump { .. })));
    }

    #[test]
    fn huge_patch_grid_is_corrupt() {
        let mut doc = two_leaf_doc();
        doc.faces[0].face_type = 2;
        doc.faces[0].patch_size = IVec2::new(65537, 65537);
        assert!(matches!(
            doc.validate(),
            Err(LoadError::CorruptLump {
                lump: LumpIndex::Faces,
                ..
            })
        ));
    }

    #[test]
    fn cluster_outside_vis_table() {
        let mut doc = two_leaf_doc();
        doc.leaves[0].cluster = 2;
        assert!(load(&doc).is_err());

        // Always-visible leaves are fine
        doc.leaves[0].cluster = -1;
        assert!(load(&doc).is_ok());
    }

    #[test]
    fn swizzle_on_load() {
        let mut doc = two_leaf_doc();
        doc.vertices[0].position = Vec3::new(1.0, 2.0, 3.0);
        let bytes = BspWriter::write(&doc);
        let loaded = BspDocument::load_with(
            Cursor::new(bytes),
            LoadOptions { swizzle_axes: true },
        )
        .unwrap();
        assert_eq!(loaded.vertices[0].position, Vec3::new(2.0, 3.0, 1.0));
        assert_eq!(loaded.planes[0].normal, Vec3::Z);
        assert_eq!(loaded.leaves[0].mins, IVec3::new(-64, -64, 0));
        assert_eq!(loaded.leaves[0].maxs, IVec3::new(64, 64, 64));
    }
}
