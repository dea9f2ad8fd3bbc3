//! A loaded Quake3 level and the per-frame visibility pipeline run over it:
//!
//! 1. `pvs` finds the camera's cluster and stamps every node with a
//!    potentially visible descendant
//! 2. `cull` walks the stamped nodes against the view frustum and collects
//!    each visible face once
//! 3. `batch` sorts the faces by texture and lightmap and hands them to the
//!    backend, tessellating patches through `patch` on the way

mod batch;
mod cull;
mod level;
mod patch;
mod pvs;
mod stats;
mod tree;

#[cfg(test)]
mod tests;

pub use batch::{DrawItem, draw_faces, sort_faces};
pub use bsp::{self, BspDocument, LoadError, LoadOptions};
pub use cull::{ALL_PLANES, FaceCollector, cull_box};
pub use level::{Level, load_level, load_level_with, render};
pub use patch::{DEFAULT_TESS_LEVEL, PatchCache, PatchMesh, tessellate, tessellate_face};
pub use pvs::VisState;
pub use stats::FrameStats;
pub use tree::{NodeKind, ROOT, Tree, TreeNode};
