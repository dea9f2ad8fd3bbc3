use std::io::{self, Read, Seek, SeekFrom};
use std::{fmt, str};

use log::debug;

use crate::error::LoadError;
use crate::iterators::LumpIter;
use crate::lumps::{read_4_bytes, Lump};

pub const BSP_MAGIC: [u8; 4] = *b"IBSP";
pub const BSP_VERSION: u32 = 0x2e;
/// Magic + version + the lump directory
pub const HEADER_SIZE: usize = 8 + LumpIndex::COUNT * 8;

/// Used as an index in to the lump directory of the header. The order is
/// fixed by the file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LumpIndex {
    /// Text block of `{ "key" "value" }` entity definitions
    Entities = 0,
    /// Surface names, flags and content flags
    Textures,
    /// Split planes used by the nodes, and by brushes for collision
    Planes,
    /// The internal nodes of the BSP tree
    Nodes,
    /// The leaves of the BSP tree, each a convex region of space
    Leaves,
    /// Indirection table from leaves to faces. Many leaves may list the same face
    LeafFaces,
    LeafBrushes,
    Models,
    Brushes,
    BrushSides,
    /// Vertices of every face
    Vertices,
    /// Triangle indices, relative to a face's first vertex
    MeshIndices,
    Effects,
    /// The drawable surfaces
    Faces,
    /// 128x128 RGB lightmap blocks
    Lightmaps,
    LightVolumes,
    /// Cluster-to-cluster visibility bit matrix
    Visibility,
}

impl LumpIndex {
    pub const COUNT: usize = 17;

    pub const ALL: [LumpIndex; Self::COUNT] = [
        LumpIndex::Entities,
        LumpIndex::Textures,
        LumpIndex::Planes,
        LumpIndex::Nodes,
        LumpIndex::Leaves,
        LumpIndex::LeafFaces,
        LumpIndex::LeafBrushes,
        LumpIndex::Models,
        LumpIndex::Brushes,
        LumpIndex::BrushSides,
        LumpIndex::Vertices,
        LumpIndex::MeshIndices,
        LumpIndex::Effects,
        LumpIndex::Faces,
        LumpIndex::Lightmaps,
        LumpIndex::LightVolumes,
        LumpIndex::Visibility,
    ];

    const fn name(&self) -> &'static str {
        match self {
            LumpIndex::Entities => "ENTITIES",
            LumpIndex::Textures => "TEXTURES",
            LumpIndex::Planes => "PLANES",
            LumpIndex::Nodes => "NODES",
            LumpIndex::Leaves => "LEAFS",
            LumpIndex::LeafFaces => "LEAFFACES",
            LumpIndex::LeafBrushes => "LEAFBRUSHES",
            LumpIndex::Models => "MODELS",
            LumpIndex::Brushes => "BRUSHES",
            LumpIndex::BrushSides => "BRUSHSIDES",
            LumpIndex::Vertices => "VERTEXES",
            LumpIndex::MeshIndices => "MESHVERTS",
            LumpIndex::Effects => "EFFECTS",
            LumpIndex::Faces => "FACES",
            LumpIndex::Lightmaps => "LIGHTMAPS",
            LumpIndex::LightVolumes => "LIGHTVOLS",
            LumpIndex::Visibility => "VISDATA",
        }
    }
}

impl fmt::Display for LumpIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Contains the details for a lump of data: where it starts and the size of it
///
/// The directory entry structure in the BSP is as follows:
///
/// | Field Size | Data Type    | Content                                         |
/// |------------|--------------|-------------------------------------------------|
/// | 0x00-0x03  | unsigned int | Offset to the start of the lump data in the BSP |
/// | 0x04-0x07  | unsigned int | The size of the lump in bytes                   |
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LumpInfo {
    pub offset: u32,
    pub length: u32,
}

/// Header which tells us the BSP type and where the data is
///
/// | Field Size | Data Type    | Content                                  |
/// |------------|--------------|------------------------------------------|
/// | 0x00-0x03  | 4 ASCII char | *Must* be an ASCII string "IBSP"         |
/// | 0x04-0x07  | unsigned int | Format version, 0x2e for Quake3          |
/// | 0x08-0x8f  | 17 entries   | `LumpInfo` directory, see `LumpIndex`    |
pub struct BspHeader {
    pub magic: [u8; 4],
    pub version: u32,
    pub lumps: [LumpInfo; LumpIndex::COUNT],
}

impl BspHeader {
    fn parse(data: &[u8]) -> Result<Self, LoadError> {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&data[0..4]);
        if magic != BSP_MAGIC {
            return Err(LoadError::BadMagic(magic));
        }

        let version = read_4_bytes(data, 4);
        if version != BSP_VERSION {
            return Err(LoadError::UnsupportedVersion(version));
        }

        let mut lumps = [LumpInfo::default(); LumpIndex::COUNT];
        for (i, lump) in lumps.iter_mut().enumerate() {
            let offset = 8 + i * 8;
            lump.offset = read_4_bytes(data, offset);
            lump.length = read_4_bytes(data, offset + 4);
        }

        Ok(Self {
            magic,
            version,
            lumps,
        })
    }

    pub fn lump(&self, index: LumpIndex) -> LumpInfo {
        self.lumps[index as usize]
    }
}

impl fmt::Debug for BspHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "\nBspHeader {{\n  magic: {},\n  version: {:#x},\n  lumps: {:?},\n}}",
            str::from_utf8(&self.magic).unwrap_or("????"),
            self.version,
            self.lumps
        )
    }
}

/// Reads lumps out of any seekable byte stream. The header is validated when
/// the reader is created, lumps are read on request.
pub struct BspReader<R> {
    stream: R,
    /// Total bytes in the stream, lumps must end inside it
    stream_len: u64,
    header: BspHeader,
}

impl<R: Read + Seek> BspReader<R> {
    /// Read and check the header. Fails with `BadMagic` or
    /// `UnsupportedVersion` if this is not a Quake3 BSP.
    pub fn new(mut stream: R) -> Result<Self, LoadError> {
        let mut data = [0u8; HEADER_SIZE];
        read_exact_at(&mut stream, 0, &mut data)?;
        let header = BspHeader::parse(&data)?;
        debug!("{:?}", header);
        let stream_len = stream.seek(SeekFrom::End(0))?;
        Ok(Self {
            stream,
            stream_len,
            header,
        })
    }

    pub fn header(&self) -> &BspHeader {
        &self.header
    }

    /// Read the raw bytes of a lump. Either the whole declared length is read
    /// or an error is returned. A lump running past the end of the stream is
    /// rejected before anything is allocated for it.
    pub fn read_lump_bytes(&mut self, index: LumpIndex) -> Result<Vec<u8>, LoadError> {
        let info = self.header.lump(index);
        if info.offset as u64 + info.length as u64 > self.stream_len {
            return Err(LoadError::TruncatedFile {
                offset: info.offset as u64,
                wanted: info.length as usize,
            });
        }
        let mut data = vec![0u8; info.length as usize];
        read_exact_at(&mut self.stream, info.offset as u64, &mut data)?;
        Ok(data)
    }

    /// Read every record of a lump. The lump length must be a whole multiple
    /// of the record size.
    pub fn read_lump<T: Lump>(&mut self, index: LumpIndex) -> Result<Vec<T>, LoadError> {
        let info = self.header.lump(index);
        if info.length as usize % T::SIZE != 0 {
            return Err(LoadError::CorruptLump {
                lump: index,
                reason: format!(
                    "length {} is not a multiple of the {} byte record",
                    info.length,
                    T::SIZE
                ),
            });
        }

        let data = self.read_lump_bytes(index)?;
        Ok(LumpIter::<T>::new(&data).collect())
    }
}

fn read_exact_at<R: Read + Seek>(
    stream: &mut R,
    offset: u64,
    buf: &mut [u8],
) -> Result<(), LoadError> {
    stream.seek(SeekFrom::Start(offset))?;
    stream.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => LoadError::TruncatedFile {
            offset,
            wanted: buf.len(),
        },
        _ => LoadError::Io(e),
    })
}
