use glam::{Mat4, Vec3};
use relief_data::RegionCode;

use crate::extrude::MeshData;

/// Opaque handle of a solid in a [`Scene`](crate::Scene). Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SolidHandle(pub(crate) u64);

/// Local-space axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

/// One extruded region block.
#[derive(Debug, Clone)]
pub struct Solid {
    /// Owning region. Untagged solids are ignored by picking.
    pub region: Option<RegionCode>,
    pub mesh: MeshData,
    /// Linear RGB.
    pub color: [f32; 3],
    pub height: f32,
    /// Local → world.
    pub transform: Mat4,
    pub bounds: Option<Aabb>,
}

impl Solid {
    pub fn new(
        region: Option<RegionCode>,
        mesh: MeshData,
        color: [f32; 3],
        height: f32,
        transform: Mat4,
    ) -> Self {
        let bounds = mesh.bounds().map(|(min, max)| Aabb { min, max });
        Self {
            region,
            mesh,
            color,
            height,
            transform,
            bounds,
        }
    }
}
