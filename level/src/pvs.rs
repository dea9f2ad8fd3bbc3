#[cfg(feature = "hprof")]
use coarse_prof::profile;
use glam::Vec3;
use log::debug;

use bsp::VisibilityTable;

use crate::tree::{NodeKind, Tree};

/// Tracks which cluster the camera was last in and the epoch nodes are
/// stamped with. A node is potentially visible when its stamp equals
/// `epoch()`, so nothing needs clearing when the camera changes cluster.
#[derive(Debug, Clone, Default)]
pub struct VisState {
    camera_cluster: Option<i32>,
    epoch: u32,
    recomputations: u64,
}

impl VisState {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn epoch(&self) -> u32 {
        self.epoch
    }

    pub const fn camera_cluster(&self) -> Option<i32> {
        self.camera_cluster
    }

    /// How many times the visible set was actually rebuilt
    pub const fn recomputations(&self) -> u64 {
        self.recomputations
    }

    /// Stamp every node that has a leaf potentially visible from the cluster
    /// containing `position`. Does nothing and returns `false` when the camera
    /// is still in the cluster of the previous call.
    pub fn compute_possible_visible(
        &mut self,
        tree: &mut Tree,
        vis: &VisibilityTable,
        position: Vec3,
    ) -> bool {
        #[cfg(feature = "hprof")]
        profile!("compute_possible_visible");
        let camera_leaf = tree.find_leaf(position);
        let cluster = tree.leaf_cluster(camera_leaf);
        if self.camera_cluster == Some(cluster) {
            return false;
        }

        self.camera_cluster = Some(cluster);
        self.advance_epoch(tree);
        self.recomputations += 1;
        debug!(
            "Camera moved in to cluster {} (leaf {}), epoch {}",
            cluster, camera_leaf, self.epoch
        );

        let epoch = self.epoch;
        let leaf_start = tree.leaf_start();
        let nodes = tree.nodes_mut();
        for slot in leaf_start..nodes.len() {
            let NodeKind::Leaf {
                cluster: leaf_cluster,
                ..
            } = nodes[slot].kind
            else {
                continue;
            };
            if !vis.is_cluster_visible(cluster, leaf_cluster) {
                continue;
            }

            nodes[slot].vis_epoch = epoch;
            let mut parent = nodes[slot].parent;
            while let Some(p) = parent {
                if nodes[p].vis_epoch == epoch {
                    break;
                }
                nodes[p].vis_epoch = epoch;
                parent = nodes[p].parent;
            }
        }
        true
    }

    fn advance_epoch(&mut self, tree: &mut Tree) {
        self.epoch = self.epoch.wrapping_add(1);
        if self.epoch == 0 {
            // Wrapped: stale stamps could now match, so reset them all
            for node in tree.nodes_mut() {
                node.vis_epoch = 0;
            }
            self.epoch = 1;
        }
    }
}
