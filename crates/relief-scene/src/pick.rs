//! Pointer picking: which region is under the cursor.
//!
//! Rays are tested against each tagged solid in its local frame (bounding
//! box first, then every triangle). The nearest hit wins; ties go to the
//! solid added first.

use glam::{Mat4, Vec3};
pub use relief_core::config::PickingMode;
use relief_core::format::overlay_text;
use relief_core::Year;
use relief_data::{CensusDataset, RegionCode};

use crate::camera::Camera;
use crate::scene::Scene;
use crate::solid::{Aabb, SolidHandle};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length, or zero for a degenerate ray.
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
        }
    }
}

/// Latest pointer position in normalized device coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub ndc_x: f32,
    pub ndc_y: f32,
}

impl PointerState {
    /// Convert a position in CSS pixels relative to the canvas.
    pub fn from_client(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            ndc_x: (x / width) * 2.0 - 1.0,
            ndc_y: -(y / height) * 2.0 + 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    pub handle: SolidHandle,
    pub region: RegionCode,
    pub distance: f32,
}

/// Nearest tagged solid hit by `ray`.
pub fn pick_ray(scene: &Scene, ray: Ray) -> Option<PickHit> {
    if ray.dir == Vec3::ZERO {
        return None;
    }

    let mut best: Option<PickHit> = None;
    for (handle, solid) in scene.iter() {
        let Some(region) = &solid.region else {
            continue;
        };
        let Some(bounds) = solid.bounds else {
            continue;
        };

        // The local ray keeps the world parameterization, so `t` stays a
        // world distance.
        let to_local = solid.transform.inverse();
        let origin = to_local.transform_point3(ray.origin);
        let dir = to_local.transform_vector3(ray.dir);

        let limit = best.as_ref().map_or(f32::INFINITY, |b| b.distance);
        match ray_aabb_hit_t(origin, dir, bounds) {
            Some(t) if t < limit => {}
            _ => continue,
        }

        let nearest = solid
            .mesh
            .triangles()
            .filter_map(|[a, b, c]| ray_triangle_t(origin, dir, a, b, c))
            .fold(None, |acc: Option<f32>, t| Some(acc.map_or(t, |a| a.min(t))));

        if let Some(t) = nearest {
            if t < limit {
                best = Some(PickHit {
                    handle,
                    region: region.clone(),
                    distance: t,
                });
            }
        }
    }
    best
}

/// Slab test; entry distance, clamped to zero when starting inside.
fn ray_aabb_hit_t(origin: Vec3, dir: Vec3, bounds: Aabb) -> Option<f32> {
    let mut t_min = 0.0f32;
    let mut t_max = f32::INFINITY;
    for axis in 0..3 {
        let (o, d) = (origin[axis], dir[axis]);
        let (min, max) = (bounds.min[axis], bounds.max[axis]);
        if d.abs() < 1e-12 {
            if o < min || o > max {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let mut t1 = (min - o) * inv;
        let mut t2 = (max - o) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_max < t_min {
            return None;
        }
    }
    Some(t_min)
}

/// Möller–Trumbore, double-sided.
fn ray_triangle_t(origin: Vec3, dir: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    let e1 = b - a;
    let e2 = c - a;
    let p = dir.cross(e2);
    let det = e1.dot(p);
    if det.abs() < f32::EPSILON {
        return None;
    }
    let inv = 1.0 / det;
    let s = origin - a;
    let u = s.dot(p) * inv;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = dir.dot(q) * inv;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = e2.dot(q) * inv;
    (t > 1e-6).then_some(t)
}

/// Resolves the pointer to a region once per frame and keeps the overlay text.
#[derive(Debug, Default)]
pub struct PickingService {
    mode: PickingMode,
    pointer: Option<PointerState>,
    dirty: bool,
    /// Camera matrix of the last recompute.
    last_view_proj: Option<Mat4>,
    overlay: String,
}

impl PickingService {
    pub fn new(mode: PickingMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn pointer_moved(&mut self, pointer: PointerState) {
        self.pointer = Some(pointer);
        self.dirty = true;
    }

    pub fn pointer_left(&mut self) {
        self.pointer = None;
        self.dirty = true;
    }

    /// Force the next recompute, e.g. after the displayed year changed.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Current overlay line; empty when nothing is under the pointer.
    pub fn overlay(&self) -> &str {
        &self.overlay
    }

    /// The frame step: cast a ray through the latest pointer position and
    /// update the overlay. Returns the overlay text.
    ///
    /// In [`PickingMode::OnPointerMove`] the lookup is skipped while the
    /// pointer, the camera and the scene are all unchanged.
    pub fn recompute(
        &mut self,
        camera: &Camera,
        scene: &Scene,
        dataset: &CensusDataset,
        year: Option<Year>,
    ) -> &str {
        let view_proj = camera.view_proj();
        let camera_moved = self.last_view_proj != Some(view_proj);
        if self.mode == PickingMode::OnPointerMove && !self.dirty && !camera_moved {
            return &self.overlay;
        }
        self.dirty = false;
        self.last_view_proj = Some(view_proj);

        let hit = self
            .pointer
            .and_then(|p| pick_ray(scene, camera.ray_from_ndc(p.ndc_x, p.ndc_y)));
        self.overlay = match (hit, year) {
            (Some(hit), Some(year)) => overlay_for(&hit, dataset, year).unwrap_or_default(),
            _ => String::new(),
        };
        &self.overlay
    }
}

/// `"<name>: <population>"` for a hit, if the region has data for `year`.
pub fn overlay_for(hit: &PickHit, dataset: &CensusDataset, year: Year) -> Option<String> {
    let record = dataset.region(&hit.region)?;
    let population = record.population(year)?;
    Some(overlay_text(record.name(), population))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extrude::MeshData;
    use crate::fixtures;
    use crate::manager::SceneManager;
    use crate::solid::Solid;
    use relief_core::config::CameraParams;

    /// Camera 50 units above the flat map, looking down at the origin.
    fn overhead_camera() -> Camera {
        let params = CameraParams {
            position: [0.0, 0.0, 50.0],
            ..CameraParams::default()
        };
        Camera::new(&params, 1.0)
    }

    fn populated(year: Year) -> (Scene, CensusDataset) {
        let dataset = fixtures::dataset();
        let mut scene = Scene::new();
        let mut manager = SceneManager::new(&fixtures::flat_config());
        manager.select_year(&mut scene, &dataset, year).expect("select");
        (scene, dataset)
    }

    #[test]
    fn test_hit_on_bucharest_shows_overlay() {
        let (scene, dataset) = populated(2011);
        let mut picking = PickingService::new(PickingMode::EveryFrame);
        picking.pointer_moved(PointerState {
            ndc_x: 0.0,
            ndc_y: 0.0,
        });
        let text = picking.recompute(&overhead_camera(), &scene, &dataset, Some(2011));
        assert_eq!(text, "Bucharest: 1,883,425");
    }

    #[test]
    fn test_miss_clears_overlay() {
        let (scene, dataset) = populated(2011);
        let camera = overhead_camera();
        let mut picking = PickingService::new(PickingMode::EveryFrame);

        picking.pointer_moved(PointerState {
            ndc_x: 0.0,
            ndc_y: 0.0,
        });
        picking.recompute(&camera, &scene, &dataset, Some(2011));
        assert!(!picking.overlay().is_empty());

        picking.pointer_moved(PointerState {
            ndc_x: -0.95,
            ndc_y: 0.95,
        });
        assert_eq!(picking.recompute(&camera, &scene, &dataset, Some(2011)), "");
    }

    #[test]
    fn test_no_pointer_means_no_overlay() {
        let (scene, dataset) = populated(2011);
        let mut picking = PickingService::default();
        assert_eq!(
            picking.recompute(&overhead_camera(), &scene, &dataset, Some(2011)),
            ""
        );
    }

    #[test]
    fn test_nearest_solid_wins() {
        let (mut scene, dataset) = populated(2011);
        let camera = overhead_camera();
        let b = fixtures::ids().validate("B").cloned().expect("B");
        let cj = fixtures::ids().validate("CJ").cloned().expect("CJ");

        // A thin CJ-tagged plate floating above Bucharest.
        let plate = Solid::new(
            Some(cj.clone()),
            crate::extrude::extrude(
                dataset.region(&b).expect("B").contour(),
                1.0,
            ),
            [1.0; 3],
            1.0,
            Mat4::from_translation(Vec3::new(0.0, 0.0, 20.0)),
        );
        scene.add(plate);

        let hit = pick_ray(&scene, camera.ray_from_ndc(0.0, 0.0)).expect("hit");
        assert_eq!(hit.region, cj);
        assert!((hit.distance - 29.0).abs() < 1e-3);
    }

    #[test]
    fn test_untagged_solid_is_not_a_hit() {
        let mut scene = Scene::new();
        let dataset = fixtures::dataset();
        let b = fixtures::ids().validate("B").cloned().expect("B");
        let mesh: MeshData =
            crate::extrude::extrude(dataset.region(&b).expect("B").contour(), 5.0);
        scene.add(Solid::new(None, mesh, [1.0; 3], 5.0, Mat4::IDENTITY));

        let ray = overhead_camera().ray_from_ndc(0.0, 0.0);
        assert!(pick_ray(&scene, ray).is_none());
    }

    #[test]
    fn test_on_pointer_move_mode_skips_idle_frames() {
        let (scene, dataset) = populated(2011);
        let camera = overhead_camera();
        let mut picking = PickingService::new(PickingMode::OnPointerMove);
        picking.pointer_moved(PointerState {
            ndc_x: 0.0,
            ndc_y: 0.0,
        });
        assert_eq!(
            picking.recompute(&camera, &scene, &dataset, Some(2011)),
            "Bucharest: 1,883,425"
        );

        // Same pointer, different year: nothing changes until invalidated.
        assert_eq!(
            picking.recompute(&camera, &scene, &dataset, Some(2002)),
            "Bucharest: 1,883,425"
        );
        picking.invalidate();
        assert_eq!(
            picking.recompute(&camera, &scene, &dataset, Some(2002)),
            "Bucharest: 1,926,334"
        );
    }

    #[test]
    fn test_on_pointer_move_mode_follows_camera() {
        let (scene, dataset) = populated(2011);
        let mut camera = overhead_camera();
        let mut picking = PickingService::new(PickingMode::OnPointerMove);
        picking.pointer_moved(PointerState {
            ndc_x: 0.0,
            ndc_y: 0.0,
        });
        assert_eq!(
            picking.recompute(&camera, &scene, &dataset, Some(2011)),
            "Bucharest: 1,883,425"
        );

        // The pointer stays put while the view slides away from the map.
        camera.position = Vec3::new(500.0, 500.0, 50.0);
        camera.target = Vec3::new(500.0, 500.0, 0.0);
        assert!(pick_ray(&scene, camera.ray_from_ndc(0.0, 0.0)).is_none());
        assert_eq!(picking.recompute(&camera, &scene, &dataset, Some(2011)), "");
    }

    #[test]
    fn test_pointer_state_from_client() {
        let p = PointerState::from_client(0.0, 0.0, 800.0, 600.0);
        assert_eq!((p.ndc_x, p.ndc_y), (-1.0, 1.0));
        let p = PointerState::from_client(400.0, 300.0, 800.0, 600.0);
        assert_eq!((p.ndc_x, p.ndc_y), (0.0, 0.0));
    }
}
