use std::collections::HashMap;
use std::path::PathBuf;

use log::debug;
use render_trait::{TextureHandle, TextureResolver};

/// Image formats Quake3 textures ship in, in lookup order
const EXTENSIONS: [&str; 3] = ["jpg", "tga", "png"];

/// Resolves BSP texture names against files under a directory. Nothing is
/// decoded, a texture is "found" when a file with a known extension exists.
pub struct DirResolver {
    root: Option<PathBuf>,
    handles: HashMap<String, TextureHandle>,
    next: u32,
}

impl DirResolver {
    /// With no root every lookup misses
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root,
            handles: HashMap::new(),
            next: TextureHandle::PLACEHOLDER.0 + 1,
        }
    }

    fn find_file(&self, name: &str) -> Option<PathBuf> {
        let root = self.root.as_ref()?;
        EXTENSIONS
            .iter()
            .map(|ext| root.join(format!("{}.{}", name, ext)))
            .find(|path| path.is_file())
    }

    pub fn resolved(&self) -> usize {
        self.handles.len()
    }
}

impl TextureResolver for DirResolver {
    fn resolve(&mut self, name: &str) -> Option<TextureHandle> {
        if let Some(handle) = self.handles.get(name) {
            return Some(*handle);
        }
        let path = self.find_file(name)?;
        let handle = TextureHandle(self.next);
        self.next += 1;
        debug!("Texture {} -> {:?} as {:?}", name, path, handle);
        self.handles.insert(name.to_owned(), handle);
        Some(handle)
    }
}
