//! This crate contains the structures and tools for processing Quake3 `.bsp`
//! level files: the header, the lump directory, and the typed records each
//! lump holds.
//!
//! The structure of a BSP is this:
//!
//! ```text,ignore
//!                        <───── 32 bits ──────>
//!                        ┌────────────────────┐
//!             ┌──── 0x00 |  ASCII "IBSP"      | 0x03
//!     Header ─┤     0x04 |  Version (0x2e)    | 0x07
//!             |          | ────────────────── |
//!             |     0x08 | ┌────────────────┐ |
//!             |          | |  Lump Offset   |──────┐
//!  Directory ─┤          | |  Lump Length   | |    |
//!  17 entries |          | └────────────────┘ |    |
//!             |          |         .          |    |
//!             └──── 0x8F |         .          |    |
//!             ┌───────── | ┌────────────────┐<─────┘
//!             |          | |  Record 0      | |
//!     Lumps ──┤          | |  Record 1      | |
//!             |          | |       .        | |
//!             |          | └────────────────┘ |
//!             └───────── └────────────────────┘
//! ```
//!
//! Every lump except entities and visibility is an array of fixed size
//! records, so the record count is always `length / record size`.

pub use glam;

/// The BSP header, lump directory and the generic lump reader
pub mod reader;

/// A Lump is a chunk of data that starts at an offset in the BSP, and ends
/// at a location that is `sizeof<record-in-lump> * num-of-entries`
///
/// The lump module contains the records the lumps are decoded in to.
pub mod lumps;

mod document;
pub mod entities;
mod error;
mod iterators;
pub mod visibility;
pub mod writer;

pub use document::{BspDocument, LoadOptions};
pub use error::LoadError;
pub use iterators::LumpIter;
pub use lumps::*;
pub use reader::{BspHeader, BspReader, LumpIndex, LumpInfo, BSP_MAGIC, BSP_VERSION};
pub use visibility::VisibilityTable;
pub use writer::BspWriter;
