#[cfg(feature = "hprof")]
use coarse_prof::profile;
use glam::Vec3;
use math::{Aabb, Plane, PlaneSide};

use bsp::BspDocument;

/// Arena index of the root. With no internal nodes the root is the only leaf.
pub const ROOT: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    Split {
        /// Index in to `Tree::planes`
        plane: usize,
        /// Front then back, as arena indices
        children: [usize; 2],
    },
    Leaf {
        /// `-1` for leaves that are always visible
        cluster: i32,
        area: i32,
        /// Range in to the leaf-face table
        first_face: usize,
        face_count: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeNode {
    pub bounds: Aabb,
    pub parent: Option<usize>,
    pub kind: NodeKind,
    /// The `VisState` epoch this node was last found potentially visible in
    pub(crate) vis_epoch: u32,
}

impl TreeNode {
    pub const fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub const fn vis_epoch(&self) -> u32 {
        self.vis_epoch
    }
}

/// All nodes and leaves of the BSP in one allocation. Internal nodes occupy
/// `[0, leaf_start)` and leaves `[leaf_start, len)`, links between them are
/// arena indices.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<TreeNode>,
    planes: Vec<Plane>,
    leaf_start: usize,
}

impl Tree {
    /// Build the arena from a validated document. Children in the file are
    /// `p >= 0` for node `p` and `p < 0` for leaf `-p - 1`.
    pub fn build(doc: &BspDocument) -> Self {
        #[cfg(feature = "hprof")]
        profile!("tree_build");
        let leaf_start = doc.nodes.len();
        let mut nodes = Vec::with_capacity(doc.nodes.len() + doc.leaves.len());

        for node in &doc.nodes {
            let children = node.children.map(|c| {
                if c >= 0 {
                    c as usize
                } else {
                    leaf_start + (-(c + 1)) as usize
                }
            });
            nodes.push(TreeNode {
                bounds: node.bounds(),
                parent: None,
                kind: NodeKind::Split {
                    plane: node.plane as usize,
                    children,
                },
                vis_epoch: 0,
            });
        }

        for leaf in &doc.leaves {
            nodes.push(TreeNode {
                bounds: leaf.bounds(),
                parent: None,
                kind: NodeKind::Leaf {
                    cluster: leaf.cluster,
                    area: leaf.area,
                    first_face: leaf.first_leaf_face as usize,
                    face_count: leaf.num_leaf_faces as usize,
                },
                vis_epoch: 0,
            });
        }

        for i in 0..leaf_start {
            if let NodeKind::Split { children, .. } = nodes[i].kind {
                for child in children {
                    nodes[child].parent = Some(i);
                }
            }
        }

        Self {
            nodes,
            planes: doc.planes.clone(),
            leaf_start,
        }
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> &TreeNode {
        &self.nodes[index]
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [TreeNode] {
        &mut self.nodes
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    pub const fn leaf_start(&self) -> usize {
        self.leaf_start
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.len() - self.leaf_start
    }

    /// Arena index of leaf `leaf`
    pub const fn leaf_slot(&self, leaf: usize) -> usize {
        self.leaf_start + leaf
    }

    /// Cluster of leaf `leaf`
    pub fn leaf_cluster(&self, leaf: usize) -> i32 {
        match self.nodes[self.leaf_slot(leaf)].kind {
            NodeKind::Leaf { cluster, .. } => cluster,
            NodeKind::Split { .. } => -1,
        }
    }

    /// Descend from the root to the leaf containing `position`. Points on a
    /// split plane go to the front. Returns the leaf index, not the arena
    /// slot.
    pub fn find_leaf(&self, position: Vec3) -> usize {
        let mut index = ROOT;
        while let NodeKind::Split { plane, children } = self.nodes[index].kind {
            index = match self.planes[plane].point_on_side(position) {
                PlaneSide::Front => children[0],
                _ => children[1],
            };
        }
        index - self.leaf_start
    }
}

#[cfg(test)]
mod tests {
    use glam::{IVec3, Vec3};
    use math::Plane;

    use bsp::{BspDocument, BspLeaf, BspNode};

    use crate::tree::{NodeKind, ROOT, Tree};

    /// Root splits on x = 0, its back child splits on y = 0
    fn doc() -> BspDocument {
        BspDocument {
            planes: vec![Plane::new(Vec3::X, 0.0), Plane::new(Vec3::Y, 0.0)],
            nodes: vec![
                BspNode {
                    plane: 0,
                    children: [-1, 1],
                    ..Default::default()
                },
                BspNode {
                    plane: 1,
                    children: [-2, -3],
                    ..Default::default()
                },
            ],
            leaves: (0..3)
                .map(|i| BspLeaf {
                    cluster: i,
                    mins: IVec3::splat(-8),
                    maxs: IVec3::splat(8),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn arena_layout() {
        let tree = Tree::build(&doc());
        assert_eq!(tree.nodes().len(), 5);
        assert_eq!(tree.leaf_start(), 2);
        assert_eq!(tree.leaf_count(), 3);

        assert_eq!(
            tree.node(ROOT).kind,
            NodeKind::Split {
                plane: 0,
                children: [2, 1]
            }
        );
        assert_eq!(tree.node(ROOT).parent, None);
        assert_eq!(tree.node(1).parent, Some(0));
        assert_eq!(tree.node(2).parent, Some(0));
        assert_eq!(tree.node(3).parent, Some(1));
        assert_eq!(tree.node(4).parent, Some(1));
        assert!(tree.node(4).is_leaf());
        assert_eq!(tree.leaf_cluster(2), 2);
    }

    #[test]
    fn find_leaf_descends_by_side() {
        let tree = Tree::build(&doc());
        assert_eq!(tree.find_leaf(Vec3::new(5.0, 0.0, 0.0)), 0);
        // On the plane counts as front
        assert_eq!(tree.find_leaf(Vec3::new(0.0, -3.0, 0.0)), 0);
        assert_eq!(tree.find_leaf(Vec3::new(-5.0, 3.0, 0.0)), 1);
        assert_eq!(tree.find_leaf(Vec3::new(-5.0, -3.0, 0.0)), 2);
    }

    #[test]
    fn lone_leaf_is_the_root() {
        let doc = BspDocument {
            leaves: vec![BspLeaf::default()],
            ..Default::default()
        };
        let tree = Tree::build(&doc);
        assert_eq!(tree.leaf_start(), 0);
        assert!(tree.node(ROOT).is_leaf());
        assert_eq!(tree.find_leaf(Vec3::splat(1000.0)), 0);
    }
}
