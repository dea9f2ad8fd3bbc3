use std::error::Error;
use std::{fmt, io};

use crate::reader::LumpIndex;

/// Everything that can go wrong while loading a level. All of these are fatal
/// to the load, the caller decides whether to abort or skip the level.
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be opened or read for a reason other than ending early
    Io(io::Error),
    /// The first four bytes were not `IBSP`
    BadMagic([u8; 4]),
    /// The header version is not the Quake3 one
    UnsupportedVersion(u32),
    /// The stream ended before `wanted` bytes could be read at `offset`
    TruncatedFile { offset: u64, wanted: usize },
    /// A lump length or payload does not fit its record layout
    CorruptLump { lump: LumpIndex, reason: String },
    /// A record points outside of the table it indexes
    InvalidReference {
        lump: LumpIndex,
        record: usize,
        value: i64,
        limit: usize,
    },
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "could not read level: {}", e),
            LoadError::BadMagic(m) => write!(f, "not a BSP file, magic was {:?}", m),
            LoadError::UnsupportedVersion(v) => {
                write!(f, "unsupported BSP version {:#x}", v)
            }
            LoadError::TruncatedFile { offset, wanted } => {
                write!(f, "file ended early reading {} bytes at {}", wanted, offset)
            }
            LoadError::CorruptLump { lump, reason } => {
                write!(f, "corrupt {} lump: {}", lump, reason)
            }
            LoadError::InvalidReference {
                lump,
                record,
                value,
                limit,
            } => write!(
                f,
                "{} record {} references {}, valid range is 0..{}",
                lump, record, value, limit
            ),
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> Self {
        LoadError::Io(e)
    }
}
