use std::fmt;
use std::ops::AddAssign;

/// Counters for one rendered frame, returned by `render`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// Triangles handed to the backend
    pub polygons: u32,
    pub draw_calls: u32,
    pub texture_binds: u32,
    pub lightmap_binds: u32,
    /// Patch faces drawn, not sub-patches
    pub patches: u32,
    pub visible_faces: u32,
    /// Box against plane classifications done by the frustum cull
    pub plane_tests: u32,
    /// Whether the camera changed cluster and the PVS was rebuilt
    pub pvs_rebuilt: bool,
}

impl FrameStats {
    /// Texture plus lightmap state changes
    pub const fn binds(&self) -> u32 {
        self.texture_binds + self.lightmap_binds
    }
}

impl AddAssign for FrameStats {
    fn add_assign(&mut self, rhs: Self) {
        self.polygons += rhs.polygons;
        self.draw_calls += rhs.draw_calls;
        self.texture_binds += rhs.texture_binds;
        self.lightmap_binds += rhs.lightmap_binds;
        self.patches += rhs.patches;
        self.visible_faces += rhs.visible_faces;
        self.plane_tests += rhs.plane_tests;
        self.pvs_rebuilt |= rhs.pvs_rebuilt;
    }
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "faces: {}, polygons: {}, draws: {}, binds: {}/{}, patches: {}",
            self.visible_faces,
            self.polygons,
            self.draw_calls,
            self.texture_binds,
            self.lightmap_binds,
            self.patches
        )
    }
}
