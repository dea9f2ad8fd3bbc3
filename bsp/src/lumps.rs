//  Structures, in BSP lump order
//  - [X] Entities (see `entities`)
//  - [X] Texture
//  - [X] Plane
//  - [X] Node
//  - [X] Leaf
//  - [X] LeafFace
//  - [ ] LeafBrush
//  - [ ] Model
//  - [ ] Brush
//  - [ ] BrushSide
//  - [X] Vertex
//  - [X] MeshIndex
//  - [ ] Effect
//  - [X] Face
//  - [X] Lightmap
//  - [ ] LightVolume
//  - [X] Visibility (see `visibility`)

use glam::{IVec2, IVec3, Vec2, Vec3};
use math::{Aabb, Plane};

/// A fixed size record stored in a lump. All fields are little-endian.
pub trait Lump: Sized {
    /// Size of one record in the file
    const SIZE: usize;

    /// Decode one record. `data` is exactly `SIZE` bytes long.
    fn from_le_bytes(data: &[u8]) -> Self;

    /// Append the encoded record to `out`
    fn write_le_bytes(&self, out: &mut Vec<u8>);
}

#[inline]
pub(crate) fn read_4_bytes(data: &[u8], offset: usize) -> u32 {
    (data[offset + 3] as u32) << 24
        | (data[offset + 2] as u32) << 16
        | (data[offset + 1] as u32) << 8
        | (data[offset] as u32)
}

#[inline]
pub(crate) fn read_i32(data: &[u8], offset: usize) -> i32 {
    read_4_bytes(data, offset) as i32
}

#[inline]
fn read_f32(data: &[u8], offset: usize) -> f32 {
    f32::from_bits(read_4_bytes(data, offset))
}

fn read_vec2(data: &[u8], offset: usize) -> Vec2 {
    Vec2::new(read_f32(data, offset), read_f32(data, offset + 4))
}

fn read_vec3(data: &[u8], offset: usize) -> Vec3 {
    Vec3::new(
        read_f32(data, offset),
        read_f32(data, offset + 4),
        read_f32(data, offset + 8),
    )
}

fn read_ivec2(data: &[u8], offset: usize) -> IVec2 {
    IVec2::new(read_i32(data, offset), read_i32(data, offset + 4))
}

fn read_ivec3(data: &[u8], offset: usize) -> IVec3 {
    IVec3::new(
        read_i32(data, offset),
        read_i32(data, offset + 4),
        read_i32(data, offset + 8),
    )
}

fn write_f32s(out: &mut Vec<u8>, values: &[f32]) {
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

fn write_i32s(out: &mut Vec<u8>, values: &[i32]) {
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

/// Leaf-face and mesh-index entries are bare 32 bit integers
impl Lump for u32 {
    const SIZE: usize = 4;

    fn from_le_bytes(data: &[u8]) -> Self {
        read_4_bytes(data, 0)
    }

    fn write_le_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

/// A surface description. The name is the shader or texture path without
/// extension, e.g. `textures/base_wall/concrete`.
///
/// | Field Size | Data Type     | Content                       |
/// |------------|---------------|-------------------------------|
/// |  0x00-0x3f | 64 ASCII char | Name, NUL padded              |
/// |  0x40-0x43 |    i32        | Surface flags                 |
/// |  0x44-0x47 |    i32        | Content flags                 |
///
/// Each `BspTexture` record is 72 bytes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BspTexture {
    pub name: String,
    pub flags: i32,
    pub contents: i32,
}

impl BspTexture {
    const NAME_LEN: usize = 64;

    pub fn new(name: &str, flags: i32, contents: i32) -> Self {
        Self {
            name: name.to_owned(),
            flags,
            contents,
        }
    }
}

impl Lump for BspTexture {
    const SIZE: usize = 72;

    fn from_le_bytes(data: &[u8]) -> Self {
        let name = &data[..Self::NAME_LEN];
        let end = name.iter().position(|&b| b == 0).unwrap_or(Self::NAME_LEN);
        Self {
            name: String::from_utf8_lossy(&name[..end]).into_owned(),
            flags: read_i32(data, 64),
            contents: read_i32(data, 68),
        }
    }

    fn write_le_bytes(&self, out: &mut Vec<u8>) {
        let mut name = [0u8; Self::NAME_LEN];
        let bytes = self.name.as_bytes();
        let len = bytes.len().min(Self::NAME_LEN - 1);
        name[..len].copy_from_slice(&bytes[..len]);
        out.extend_from_slice(&name);
        write_i32s(out, &[self.flags, self.contents]);
    }
}

/// Planes are read straight in to `math::Plane`, the format already uses the
/// `normal · p - dist` convention.
///
/// | Field Size | Data Type | Content  |
/// |------------|-----------|----------|
/// |  0x00-0x0b | 3 x f32   | Normal   |
/// |  0x0c-0x0f |    f32    | Distance |
impl Lump for Plane {
    const SIZE: usize = 16;

    fn from_le_bytes(data: &[u8]) -> Self {
        Plane::new(read_vec3(data, 0), read_f32(data, 12))
    }

    fn write_le_bytes(&self, out: &mut Vec<u8>) {
        write_f32s(
            out,
            &[self.normal.x, self.normal.y, self.normal.z, self.dist],
        );
    }
}

/// An internal node of the tree.
///
/// | Field Size | Data Type | Content                                  |
/// |------------|-----------|------------------------------------------|
/// |  0x00-0x03 |    i32    | Plane index                              |
/// |  0x04-0x0b | 2 x i32   | Children: front then back, see below     |
/// |  0x0c-0x17 | 3 x i32   | Bounding box minimum                     |
/// |  0x18-0x23 | 3 x i32   | Bounding box maximum                     |
///
/// A child value `>= 0` is a node index, a negative value `c` is the leaf
/// `-c - 1`.
///
/// Each `BspNode` record is 36 bytes
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BspNode {
    pub plane: i32,
    pub children: [i32; 2],
    pub mins: IVec3,
    pub maxs: IVec3,
}

impl BspNode {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_ints(self.mins, self.maxs)
    }
}

impl Lump for BspNode {
    const SIZE: usize = 36;

    fn from_le_bytes(data: &[u8]) -> Self {
        Self {
            plane: read_i32(data, 0),
            children: [read_i32(data, 4), read_i32(data, 8)],
            mins: read_ivec3(data, 12),
            maxs: read_ivec3(data, 24),
        }
    }

    fn write_le_bytes(&self, out: &mut Vec<u8>) {
        write_i32s(out, &[self.plane, self.children[0], self.children[1]]);
        write_i32s(out, &self.mins.to_array());
        write_i32s(out, &self.maxs.to_array());
    }
}

/// A leaf of the tree: a convex region, its visibility cluster and the faces
/// that touch it.
///
/// | Field Size | Data Type | Content                                   |
/// |------------|-----------|-------------------------------------------|
/// |  0x00-0x03 |    i32    | Cluster, -1 for always visible            |
/// |  0x04-0x07 |    i32    | Area portal area                          |
/// |  0x08-0x13 | 3 x i32   | Bounding box minimum                      |
/// |  0x14-0x1f | 3 x i32   | Bounding box maximum                      |
/// |  0x20-0x23 |    i32    | First leaf-face                           |
/// |  0x24-0x27 |    i32    | Number of leaf-faces                      |
/// |  0x28-0x2b |    i32    | First leaf-brush                          |
/// |  0x2c-0x2f |    i32    | Number of leaf-brushes                    |
///
/// Each `BspLeaf` record is 48 bytes
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BspLeaf {
    pub cluster: i32,
    pub area: i32,
    pub mins: IVec3,
    pub maxs: IVec3,
    pub first_leaf_face: i32,
    pub num_leaf_faces: i32,
    pub first_leaf_brush: i32,
    pub num_leaf_brushes: i32,
}

impl BspLeaf {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_ints(self.mins, self.maxs)
    }
}

impl Lump for BspLeaf {
    const SIZE: usize = 48;

    fn from_le_bytes(data: &[u8]) -> Self {
        Self {
            cluster: read_i32(data, 0),
            area: read_i32(data, 4),
            mins: read_ivec3(data, 8),
            maxs: read_ivec3(data, 20),
            first_leaf_face: read_i32(data, 32),
            num_leaf_faces: read_i32(data, 36),
            first_leaf_brush: read_i32(data, 40),
            num_leaf_brushes: read_i32(data, 44),
        }
    }

    fn write_le_bytes(&self, out: &mut Vec<u8>) {
        write_i32s(out, &[self.cluster, self.area]);
        write_i32s(out, &self.mins.to_array());
        write_i32s(out, &self.maxs.to_array());
        write_i32s(
            out,
            &[
                self.first_leaf_face,
                self.num_leaf_faces,
                self.first_leaf_brush,
                self.num_leaf_brushes,
            ],
        );
    }
}

/// | Field Size | Data Type | Content          |
/// |------------|-----------|------------------|
/// |  0x00-0x0b | 3 x f32   | Position         |
/// |  0x0c-0x13 | 2 x f32   | Surface UV       |
/// |  0x14-0x1b | 2 x f32   | Lightmap UV      |
/// |  0x1c-0x27 | 3 x f32   | Normal           |
/// |  0x28-0x2b | 4 x u8    | RGBA colour      |
///
/// Each `BspVertex` record is 44 bytes
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BspVertex {
    pub position: Vec3,
    pub surface_uv: Vec2,
    pub lightmap_uv: Vec2,
    pub normal: Vec3,
    pub color: [u8; 4],
}

impl BspVertex {
    /// Weighted sum of three vertices, the building block of the quadratic
    /// Bézier evaluation. Colour is blended per channel and rounded.
    pub fn blend3(v: [&BspVertex; 3], w: [f32; 3]) -> BspVertex {
        let mut color = [0u8; 4];
        for (c, out) in color.iter_mut().enumerate() {
            let sum = v[0].color[c] as f32 * w[0]
                + v[1].color[c] as f32 * w[1]
                + v[2].color[c] as f32 * w[2];
            *out = sum.round().clamp(0.0, 255.0) as u8;
        }

        BspVertex {
            position: v[0].position * w[0] + v[1].position * w[1] + v[2].position * w[2],
            surface_uv: v[0].surface_uv * w[0] + v[1].surface_uv * w[1] + v[2].surface_uv * w[2],
            lightmap_uv: v[0].lightmap_uv * w[0]
                + v[1].lightmap_uv * w[1]
                + v[2].lightmap_uv * w[2],
            normal: v[0].normal * w[0] + v[1].normal * w[1] + v[2].normal * w[2],
            color,
        }
    }
}

impl Lump for BspVertex {
    const SIZE: usize = 44;

    fn from_le_bytes(data: &[u8]) -> Self {
        Self {
            position: read_vec3(data, 0),
            surface_uv: read_vec2(data, 12),
            lightmap_uv: read_vec2(data, 20),
            normal: read_vec3(data, 28),
            color: [data[40], data[41], data[42], data[43]],
        }
    }

    fn write_le_bytes(&self, out: &mut Vec<u8>) {
        write_f32s(out, &self.position.to_array());
        write_f32s(out, &self.surface_uv.to_array());
        write_f32s(out, &self.lightmap_uv.to_array());
        write_f32s(out, &self.normal.to_array());
        out.extend_from_slice(&self.color);
    }
}

/// What kind of surface a face is, which decides how it gets drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FaceKind {
    /// Convex polygon, drawn with its mesh indices
    #[default]
    Polygon,
    /// Grid of 3x3 quadratic Bézier control points, tessellated at runtime
    Patch,
    /// Triangle soup, drawn with its mesh indices
    Mesh,
    /// Camera facing sprite, not drawn by the level
    Billboard,
}

impl FaceKind {
    pub const fn from_raw(kind: i32) -> Option<Self> {
        match kind {
            1 => Some(FaceKind::Polygon),
            2 => Some(FaceKind::Patch),
            3 => Some(FaceKind::Mesh),
            4 => Some(FaceKind::Billboard),
            _ => None,
        }
    }

    pub const fn to_raw(self) -> i32 {
        match self {
            FaceKind::Polygon => 1,
            FaceKind::Patch => 2,
            FaceKind::Mesh => 3,
            FaceKind::Billboard => 4,
        }
    }
}

/// A drawable surface
///
/// | Field Size | Data Type | Content                                     |
/// |------------|-----------|---------------------------------------------|
/// |  0x00-0x03 |    i32    | Texture index                               |
/// |  0x04-0x07 |    i32    | Effect index, -1 for none                   |
/// |  0x08-0x0b |    i32    | Face type: 1 polygon, 2 patch, 3 mesh, 4 billboard |
/// |  0x0c-0x0f |    i32    | First vertex                                |
/// |  0x10-0x13 |    i32    | Number of vertices                          |
/// |  0x14-0x17 |    i32    | First mesh index                            |
/// |  0x18-0x1b |    i32    | Number of mesh indices                      |
/// |  0x1c-0x1f |    i32    | Lightmap index, -1 for none                 |
/// |  0x20-0x27 | 2 x i32   | Lightmap corner in the lightmap block       |
/// |  0x28-0x2f | 2 x i32   | Lightmap size                               |
/// |  0x30-0x3b | 3 x f32   | Lightmap origin in world space              |
/// |  0x3c-0x53 | 6 x f32   | Lightmap S and T world space vectors        |
/// |  0x54-0x5f | 3 x f32   | Surface normal                              |
/// |  0x60-0x67 | 2 x i32   | Patch control grid width and height         |
///
/// Each `BspFace` record is 104 bytes
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BspFace {
    pub texture: i32,
    pub effect: i32,
    /// Raw face type, see `kind()`
    pub face_type: i32,
    pub first_vertex: i32,
    pub num_vertices: i32,
    pub first_mesh_index: i32,
    pub num_mesh_indices: i32,
    pub lightmap: i32,
    pub lightmap_corner: IVec2,
    pub lightmap_size: IVec2,
    pub lightmap_origin: Vec3,
    pub lightmap_vecs: [Vec3; 2],
    pub normal: Vec3,
    pub patch_size: IVec2,
}

impl BspFace {
    /// `None` only for face types the loader would have rejected
    pub const fn kind(&self) -> Option<FaceKind> {
        FaceKind::from_raw(self.face_type)
    }

    pub const fn lightmap(&self) -> Option<u32> {
        if self.lightmap < 0 {
            None
        } else {
            Some(self.lightmap as u32)
        }
    }
}

impl Lump for BspFace {
    const SIZE: usize = 104;

    fn from_le_bytes(data: &[u8]) -> Self {
        Self {
            texture: read_i32(data, 0),
            effect: read_i32(data, 4),
            face_type: read_i32(data, 8),
            first_vertex: read_i32(data, 12),
            num_vertices: read_i32(data, 16),
            first_mesh_index: read_i32(data, 20),
            num_mesh_indices: read_i32(data, 24),
            lightmap: read_i32(data, 28),
            lightmap_corner: read_ivec2(data, 32),
            lightmap_size: read_ivec2(data, 40),
            lightmap_origin: read_vec3(data, 48),
            lightmap_vecs: [read_vec3(data, 60), read_vec3(data, 72)],
            normal: read_vec3(data, 84),
            patch_size: read_ivec2(data, 96),
        }
    }

    fn write_le_bytes(&self, out: &mut Vec<u8>) {
        write_i32s(
            out,
            &[
                self.texture,
                self.effect,
                self.face_type,
                self.first_vertex,
                self.num_vertices,
                self.first_mesh_index,
                self.num_mesh_indices,
                self.lightmap,
            ],
        );
        write_i32s(out, &self.lightmap_corner.to_array());
        write_i32s(out, &self.lightmap_size.to_array());
        write_f32s(out, &self.lightmap_origin.to_array());
        write_f32s(out, &self.lightmap_vecs[0].to_array());
        write_f32s(out, &self.lightmap_vecs[1].to_array());
        write_f32s(out, &self.normal.to_array());
        write_i32s(out, &self.patch_size.to_array());
    }
}

/// A baked 128x128 RGB lightmap block
#[derive(Clone, PartialEq)]
pub struct BspLightmap {
    pub data: Vec<u8>,
}

impl BspLightmap {
    pub const DIM: usize = 128;

    /// A block of a single colour, mostly useful for tests and tools
    pub fn filled(rgb: [u8; 3]) -> Self {
        Self {
            data: rgb.repeat(Self::DIM * Self::DIM),
        }
    }
}

impl std::fmt::Debug for BspLightmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BspLightmap({} bytes)", self.data.len())
    }
}

impl Lump for BspLightmap {
    const SIZE: usize = Self::DIM * Self::DIM * 3;

    fn from_le_bytes(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    fn write_le_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.data);
    }
}
