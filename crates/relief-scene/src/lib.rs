pub mod camera;
pub mod extrude;
pub mod manager;
pub mod pick;
pub mod scene;
pub mod solid;

#[cfg(test)]
mod fixtures;

pub use camera::Camera;
pub use extrude::{extrude, MeshData};
pub use manager::{SceneEntry, SceneError, SceneManager, SceneState};
pub use pick::{overlay_for, pick_ray, PickHit, PickingMode, PickingService, PointerState, Ray};
pub use scene::Scene;
pub use solid::{Aabb, Solid, SolidHandle};
