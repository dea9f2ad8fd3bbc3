use bsp::{BspDocument, VisibilityTable};

use crate::tests::{IN_LEAF_0, IN_LEAF_1, IN_LEAF_2, three_leaf_doc, three_leaf_level};
use crate::{Level, ROOT};

#[test]
fn find_leaf_in_each_region() {
    let level = three_leaf_level();
    assert_eq!(level.find_leaf(IN_LEAF_0), 0);
    assert_eq!(level.find_leaf(IN_LEAF_1), 1);
    assert_eq!(level.find_leaf(IN_LEAF_2), 2);
}

#[test]
fn same_cluster_is_computed_once() {
    let mut level = three_leaf_level();
    assert!(level.compute_possible_visible(IN_LEAF_0));
    for i in 0..10 {
        // Moving about inside the leaf doesn't change the cluster
        let nudge = glam::Vec3::new(i as f32, i as f32, 0.0);
        assert!(!level.compute_possible_visible(IN_LEAF_0 + nudge));
    }
    assert_eq!(level.vis_state().recomputations(), 1);
    assert_eq!(level.vis_state().epoch(), 1);
    assert_eq!(level.vis_state().camera_cluster(), Some(0));

    assert!(level.compute_possible_visible(IN_LEAF_2));
    assert!(level.compute_possible_visible(IN_LEAF_0));
    assert_eq!(level.vis_state().recomputations(), 3);
}

#[test]
fn stamps_visible_leaves_and_their_ancestors() {
    let mut level = three_leaf_level();
    level.compute_possible_visible(IN_LEAF_0);
    let epoch = level.vis_state().epoch();
    let tree = level.tree();

    assert_eq!(tree.node(ROOT).vis_epoch(), epoch);
    assert_eq!(tree.node(1).vis_epoch(), epoch);
    assert_eq!(tree.node(tree.leaf_slot(0)).vis_epoch(), epoch);
    assert_eq!(tree.node(tree.leaf_slot(1)).vis_epoch(), epoch);
    assert_ne!(tree.node(tree.leaf_slot(2)).vis_epoch(), epoch);
}

#[test]
fn subtree_without_visible_leaves_is_left_behind() {
    let mut level = three_leaf_level();
    // Cluster 2 sees only itself, which still needs node 1 and the root
    level.compute_possible_visible(IN_LEAF_2);
    let epoch = level.vis_state().epoch();
    let tree = level.tree();
    assert_eq!(tree.node(ROOT).vis_epoch(), epoch);
    assert_eq!(tree.node(1).vis_epoch(), epoch);
    assert_ne!(tree.node(tree.leaf_slot(0)).vis_epoch(), epoch);
    assert_ne!(tree.node(tree.leaf_slot(1)).vis_epoch(), epoch);
    assert_eq!(tree.node(tree.leaf_slot(2)).vis_epoch(), epoch);
}

#[test]
fn negative_cluster_is_always_visible() {
    let mut doc = three_leaf_doc();
    doc.leaves[1].cluster = -1;
    let mut level = Level::new(doc).unwrap();
    level.compute_possible_visible(IN_LEAF_2);
    let epoch = level.vis_state().epoch();
    let slot = level.tree().leaf_slot(1);
    assert_eq!(level.tree().node(slot).vis_epoch(), epoch);
}

#[test]
fn no_vis_data_sees_everything() {
    let doc = BspDocument {
        visibility: VisibilityTable::default(),
        ..three_leaf_doc()
    };
    let mut level = Level::new(doc).unwrap();
    level.compute_possible_visible(IN_LEAF_2);
    let epoch = level.vis_state().epoch();
    assert!(level.tree().nodes().iter().all(|n| n.vis_epoch() == epoch));
}
