use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use glam::Vec3;
use log::{info, trace, warn};
use math::Plane;

use bsp::entities::{Entity, spawn_point};
use bsp::{BspDocument, BspLightmap, LoadError, LoadOptions};
use render_trait::{Camera, RenderBackend, TextureHandle, TextureResolver};

use crate::batch::draw_faces;
use crate::cull::FaceCollector;
use crate::patch::{DEFAULT_TESS_LEVEL, PatchCache};
use crate::pvs::VisState;
use crate::stats::FrameStats;
use crate::tree::Tree;

/// A loaded level. The document is immutable, the rest is the per-frame
/// state the pipeline keeps between frames: node epoch stamps, the cached
/// camera cluster, the seen bitmap and the tessellated patches.
pub struct Level {
    doc: BspDocument,
    tree: Tree,
    vis: VisState,
    collector: FaceCollector,
    patches: PatchCache,
    /// Handle per texture record, filled by `preload_textures`
    textures: Vec<TextureHandle>,
    tess_level: u32,
}

impl Level {
    /// Build the tree and per-frame state. The document is validated first
    /// so the pipeline can index without checks.
    pub fn new(doc: BspDocument) -> Result<Self, LoadError> {
        doc.validate()?;
        let tree = Tree::build(&doc);
        let collector = FaceCollector::new(doc.faces.len());
        Ok(Self {
            tree,
            collector,
            vis: VisState::new(),
            patches: PatchCache::new(),
            textures: Vec::new(),
            tess_level: DEFAULT_TESS_LEVEL,
            doc,
        })
    }

    pub fn document(&self) -> &BspDocument {
        &self.doc
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn vis_state(&self) -> &VisState {
        &self.vis
    }

    pub fn patch_cache(&self) -> &PatchCache {
        &self.patches
    }

    /// Baked lightmaps, in the order `RenderBackend::bind_lightmap` refers to
    /// them
    pub fn lightmaps(&self) -> &[BspLightmap] {
        &self.doc.lightmaps
    }

    pub fn entities(&self) -> Vec<Entity> {
        self.doc.entity_list()
    }

    /// Position and yaw of the first player spawn, if the map has one
    pub fn spawn_point(&self) -> Option<(Vec3, f32)> {
        spawn_point(&self.entities())
    }

    pub const fn tess_level(&self) -> u32 {
        self.tess_level
    }

    /// Subdivisions per patch edge, clamped to at least 1. Patches already
    /// tessellated at another level stay cached.
    pub fn set_tess_level(&mut self, level: u32) {
        self.tess_level = level.max(1);
    }

    pub fn texture_handles(&self) -> &[TextureHandle] {
        &self.textures
    }

    /// Resolve every texture the level uses. Misses are logged and replaced by
    /// the placeholder. Returns the number of misses.
    pub fn preload_textures(&mut self, resolver: &mut impl TextureResolver) -> usize {
        #[cfg(feature = "hprof")]
        profile!("preload_textures");
        let mut misses = 0;
        self.textures = self
            .doc
            .textures
            .iter()
            .map(|texture| {
                resolver.resolve(&texture.name).unwrap_or_else(|| {
                    warn!("Missing texture {}, using placeholder", texture.name);
                    misses += 1;
                    TextureHandle::PLACEHOLDER
                })
            })
            .collect();
        info!(
            "Resolved {} of {} textures",
            self.textures.len() - misses,
            self.textures.len()
        );
        misses
    }

    /// Leaf index of the leaf containing `position`
    pub fn find_leaf(&self, position: Vec3) -> usize {
        self.tree.find_leaf(position)
    }

    /// See `VisState::compute_possible_visible`
    pub fn compute_possible_visible(&mut self, position: Vec3) -> bool {
        self.vis
            .compute_possible_visible(&mut self.tree, &self.doc.visibility, position)
    }

    /// Faces in potentially visible leaves that pass the frustum, each once
    pub fn collect_visible_faces(
        &mut self,
        planes: &[Plane; 6],
        stats: &mut FrameStats,
    ) -> &[usize] {
        self.collector.collect(
            &self.tree,
            &self.doc.leaf_faces,
            planes,
            self.vis.epoch(),
            stats,
        )
    }
}

pub fn load_level(path: impl AsRef<Path>) -> Result<Level, LoadError> {
    load_level_with(path, LoadOptions::default())
}

pub fn load_level_with(path: impl AsRef<Path>, options: LoadOptions) -> Result<Level, LoadError> {
    let path = path.as_ref();
    info!("Loading level {:?}", path);
    let file = File::open(path)?;
    let doc = BspDocument::load_with(BufReader::new(file), options)?;
    Level::new(doc)
}

/// Run the whole pipeline for one frame: update the PVS if the camera changed
/// cluster, collect the faces inside the frustum, then draw them in texture
/// and lightmap order.
pub fn render(
    level: &mut Level,
    camera: &impl Camera,
    backend: &mut impl RenderBackend,
) -> FrameStats {
    #[cfg(feature = "hprof")]
    profile!("render_level");
    let mut stats = FrameStats {
        pvs_rebuilt: level.compute_possible_visible(camera.position()),
        ..FrameStats::default()
    };

    let Level {
        doc,
        tree,
        vis,
        collector,
        patches,
        textures,
        tess_level,
    } = level;
    let planes = camera.planes();
    let faces = collector.collect(tree, &doc.leaf_faces, &planes, vis.epoch(), &mut stats);
    draw_faces(faces, doc, textures, patches, *tess_level, backend, &mut stats);

    trace!("{}", stats);
    stats
}
