#[cfg(feature = "hprof")]
use coarse_prof::profile;
use math::{Aabb, Plane, PlaneSide};

use crate::stats::FrameStats;
use crate::tree::{NodeKind, ROOT, Tree};

/// One bit per frustum plane, all still to be tested
pub const ALL_PLANES: u8 = 0b11_1111;

/// Test `bounds` against the planes whose bit is set in `mask`. Returns `None`
/// when the box is entirely behind one of them, otherwise the mask with the
/// bits cleared for planes the box is entirely in front of. Descendants of a
/// box in front of a plane are also in front of it, so they skip that test.
#[inline]
pub fn cull_box(bounds: &Aabb, planes: &[Plane; 6], mask: u8) -> Option<u8> {
    cull_box_counted(bounds, planes, mask, &mut 0)
}

fn cull_box_counted(
    bounds: &Aabb,
    planes: &[Plane; 6],
    mut mask: u8,
    tests: &mut u32,
) -> Option<u8> {
    for (i, plane) in planes.iter().enumerate() {
        let bit = 1 << i;
        if mask & bit == 0 {
            continue;
        }
        *tests += 1;
        match plane.box_on_side(bounds) {
            PlaneSide::Back => return None,
            PlaneSide::Front => mask &= !bit,
            PlaneSide::Straddle => {}
        }
    }
    Some(mask)
}

/// Gathers the faces of every leaf that is both potentially visible and
/// inside the frustum. The seen bitmap makes sure a face shared by several
/// leaves is listed once per frame.
#[derive(Debug, Clone, Default)]
pub struct FaceCollector {
    seen: Vec<bool>,
    faces: Vec<usize>,
}

impl FaceCollector {
    pub fn new(face_count: usize) -> Self {
        Self {
            seen: vec![false; face_count],
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Faces collected so far this frame, in traversal order
    pub fn faces(&self) -> &[usize] {
        &self.faces
    }

    /// Forget the previous frame. Only faces collected last frame can be
    /// marked seen.
    pub fn begin_frame(&mut self) {
        for &face in &self.faces {
            self.seen[face] = false;
        }
        self.faces.clear();
    }

    /// Walk the tree from the root. Nodes whose stamp is not `epoch` hold
    /// nothing potentially visible and are skipped with their subtree.
    pub fn collect(
        &mut self,
        tree: &Tree,
        leaf_faces: &[u32],
        planes: &[Plane; 6],
        epoch: u32,
        stats: &mut FrameStats,
    ) -> &[usize] {
        #[cfg(feature = "hprof")]
        profile!("collect_visible_faces");
        self.begin_frame();
        if !tree.nodes().is_empty() {
            self.collect_r(tree, leaf_faces, planes, epoch, ROOT, ALL_PLANES, stats);
        }
        stats.visible_faces = self.faces.len() as u32;
        &self.faces
    }

    #[allow(clippy::too_many_arguments)]
    fn collect_r(
        &mut self,
        tree: &Tree,
        leaf_faces: &[u32],
        planes: &[Plane; 6],
        epoch: u32,
        index: usize,
        mask: u8,
        stats: &mut FrameStats,
    ) {
        let node = tree.node(index);
        if node.vis_epoch != epoch {
            return;
        }

        let Some(mask) = cull_box_counted(&node.bounds, planes, mask, &mut stats.plane_tests)
        else {
            return;
        };

        match node.kind {
            NodeKind::Leaf {
                first_face,
                face_count,
                ..
            } => {
                for &face in &leaf_faces[first_face..first_face + face_count] {
                    let face = face as usize;
                    if !self.seen[face] {
                        self.seen[face] = true;
                        self.faces.push(face);
                    }
                }
            }
            NodeKind::Split { children, .. } => {
                for child in children {
                    self.collect_r(tree, leaf_faces, planes, epoch, child, mask, stats);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use math::{Aabb, Plane};

    use crate::cull::{ALL_PLANES, FaceCollector, cull_box};
    use crate::pvs::VisState;
    use crate::stats::FrameStats;
    use crate::tests::{IN_LEAF_0, IN_LEAF_2, box_frustum, three_leaf_doc};
    use crate::tree::Tree;

    /// An axis aligned box frustum from -10 to 10 on every axis
    fn cube_planes() -> [Plane; 6] {
        [
            Plane::new(Vec3::X, -10.0),
            Plane::new(Vec3::NEG_X, -10.0),
            Plane::new(Vec3::Y, -10.0),
            Plane::new(Vec3::NEG_Y, -10.0),
            Plane::new(Vec3::Z, -10.0),
            Plane::new(Vec3::NEG_Z, -10.0),
        ]
    }

    #[test]
    fn inside_box_clears_every_bit() {
        let bounds = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        assert_eq!(cull_box(&bounds, &cube_planes(), ALL_PLANES), Some(0));
    }

    #[test]
    fn outside_box_is_pruned() {
        let bounds = Aabb::new(Vec3::new(11.0, -1.0, -1.0), Vec3::new(12.0, 1.0, 1.0));
        assert_eq!(cull_box(&bounds, &cube_planes(), ALL_PLANES), None);
    }

    #[test]
    fn straddling_keeps_the_bit() {
        // Crosses x = 10 only, so only the -X facing plane stays active
        let bounds = Aabb::new(Vec3::new(5.0, -1.0, -1.0), Vec3::new(15.0, 1.0, 1.0));
        assert_eq!(cull_box(&bounds, &cube_planes(), ALL_PLANES), Some(0b00_0010));
    }

    #[test]
    fn cleared_planes_are_not_tested() {
        // Outside the +X plane, but that plane's bit is already clear
        let bounds = Aabb::new(Vec3::new(-14.0, -1.0, -1.0), Vec3::new(-12.0, 1.0, 1.0));
        assert_eq!(cull_box(&bounds, &cube_planes(), ALL_PLANES), None);
        assert_eq!(cull_box(&bounds, &cube_planes(), 0b11_1110), Some(0));
    }

    #[test]
    fn begin_frame_clears_every_seen_face() {
        let doc = three_leaf_doc();
        let mut tree = Tree::build(&doc);
        let mut vis = VisState::new();
        let mut collector = FaceCollector::new(doc.faces.len());
        let mut stats = FrameStats::default();
        let planes = box_frustum(1000.0);

        vis.compute_possible_visible(&mut tree, &doc.visibility, IN_LEAF_0);
        collector.collect(&tree, &doc.leaf_faces, &planes, vis.epoch(), &mut stats);
        assert_eq!(collector.seen, vec![true, true, false, true]);

        collector.begin_frame();
        assert!(collector.seen.iter().all(|seen| !seen));
        assert!(collector.faces().is_empty());

        vis.compute_possible_visible(&mut tree, &doc.visibility, IN_LEAF_2);
        let faces = collector.collect(&tree, &doc.leaf_faces, &planes, vis.epoch(), &mut stats);
        assert_eq!(faces, &[2]);
        assert_eq!(collector.seen, vec![false, false, true, false]);
    }
}
