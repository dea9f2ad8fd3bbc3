//! Serialise a `BspDocument` back to the on-disk layout. Lumps the document
//! does not carry are written as empty entries. Used to build fixtures and
//! by tools that want to rewrite a level.

use crate::document::BspDocument;
use crate::lumps::Lump;
use crate::reader::{BSP_MAGIC, BSP_VERSION, HEADER_SIZE, LumpIndex};

pub struct BspWriter;

impl BspWriter {
    pub fn write(doc: &BspDocument) -> Vec<u8> {
        let mut out = vec![0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&BSP_MAGIC);
        out[4..8].copy_from_slice(&BSP_VERSION.to_le_bytes());

        for index in LumpIndex::ALL {
            // Lumps start on 4 byte boundaries
            while out.len() % 4 != 0 {
                out.push(0);
            }
            let start = out.len();
            match index {
                LumpIndex::Entities => {
                    if !doc.entities.is_empty() {
                        out.extend_from_slice(doc.entities.as_bytes());
                        out.push(0);
                    }
                }
                LumpIndex::Textures => write_records(&mut out, &doc.textures),
                LumpIndex::Planes => write_records(&mut out, &doc.planes),
                LumpIndex::Nodes => write_records(&mut out, &doc.nodes),
                LumpIndex::Leaves => write_records(&mut out, &doc.leaves),
                LumpIndex::LeafFaces => write_records(&mut out, &doc.leaf_faces),
                LumpIndex::Vertices => write_records(&mut out, &doc.vertices),
                LumpIndex::MeshIndices => write_records(&mut out, &doc.mesh_indices),
                LumpIndex::Faces => write_records(&mut out, &doc.faces),
                LumpIndex::Lightmaps => write_records(&mut out, &doc.lightmaps),
                LumpIndex::Visibility => doc.visibility.write_le_bytes(&mut out),
                _ => {}
            }

            let entry = 8 + index as usize * 8;
            out[entry..entry + 4].copy_from_slice(&(start as u32).to_le_bytes());
            let length = (out.len() - start) as u32;
            out[entry + 4..entry + 8].copy_from_slice(&length.to_le_bytes());
        }
        out
    }
}

fn write_records<T: Lump>(out: &mut Vec<u8>, records: &[T]) {
    out.reserve(records.len() * T::SIZE);
    for record in records {
        record.write_le_bytes(out);
    }
}
