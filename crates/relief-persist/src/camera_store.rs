//! Camera viewpoint persistence.
//!
//! Each persisted attribute is written as a JSON number array under
//! `camera.<attribute>`: `position` and `up` as `[x, y, z]`, the legacy
//! `quaternion` as `[x, y, z, w]`.

use glam::{Quat, Vec3};
use relief_core::config::CameraAttribute;
use relief_core::constants::CAMERA_KEY_PREFIX;
use relief_scene::Camera;

use crate::error::PersistError;
use crate::store::KeyValueStore;

/// Misspelled key written by older sessions; read as a fallback for the quaternion.
pub const LEGACY_QUATERNION_KEY: &str = "camera.quarternion";

pub fn attribute_key(attribute: CameraAttribute) -> String {
    format!("{CAMERA_KEY_PREFIX}{}", attribute.name())
}

pub struct CameraStateStore<S> {
    store: S,
    attributes: Vec<CameraAttribute>,
}

impl<S: KeyValueStore> CameraStateStore<S> {
    pub fn new(store: S, attributes: &[CameraAttribute]) -> Self {
        Self {
            store,
            attributes: attributes.to_vec(),
        }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Write every persisted attribute of `camera`.
    pub fn save(&mut self, camera: &Camera) -> Result<(), PersistError> {
        for &attribute in &self.attributes {
            let values: Vec<f32> = match attribute {
                CameraAttribute::Position => camera.position.to_array().to_vec(),
                CameraAttribute::Up => camera.up.to_array().to_vec(),
                CameraAttribute::Quaternion => camera.quaternion().to_array().to_vec(),
            };
            let json = serde_json::to_string(&values)?;
            self.store.set(&attribute_key(attribute), &json)?;
        }
        log::info!("Camera saved ({} attributes)", self.attributes.len());
        Ok(())
    }

    /// Apply every stored attribute to `camera`. Absent or malformed values
    /// leave the camera untouched. Returns how many attributes were applied.
    pub fn restore(&self, camera: &mut Camera) -> usize {
        let mut applied = 0;
        for &attribute in &self.attributes {
            let key = attribute_key(attribute);
            let raw = match attribute {
                CameraAttribute::Quaternion => self
                    .store
                    .get(&key)
                    .or_else(|| self.store.get(LEGACY_QUATERNION_KEY)),
                _ => self.store.get(&key),
            };
            let Some(raw) = raw else {
                log::debug!("No stored value for {key}");
                continue;
            };
            let Some(values) = parse_numbers(&raw) else {
                log::debug!("Ignoring malformed {key}: {raw}");
                continue;
            };

            let ok = match (attribute, values.as_slice()) {
                (CameraAttribute::Position, &[x, y, z]) => {
                    restore_position(camera, Vec3::new(x, y, z))
                }
                (CameraAttribute::Up, &[x, y, z]) if Vec3::new(x, y, z) != Vec3::ZERO => {
                    camera.up = Vec3::new(x, y, z);
                    true
                }
                (CameraAttribute::Quaternion, &[x, y, z, w]) => {
                    let q = Quat::from_xyzw(x, y, z, w);
                    if q.length_squared() > 0.0 {
                        camera.set_quaternion(q);
                        true
                    } else {
                        false
                    }
                }
                _ => false,
            };
            if ok {
                applied += 1;
            } else {
                log::debug!("Ignoring unusable {key}: {raw}");
            }
        }
        applied
    }
}

/// Move the eye to `position`, clamped to the allowed distance range. An eye
/// on the target has no view direction and is refused.
fn restore_position(camera: &mut Camera, position: Vec3) -> bool {
    let offset = position - camera.target;
    if offset.length_squared() <= f32::EPSILON {
        return false;
    }
    let distance = offset.length();
    let clamped = distance.clamp(camera.min_distance, camera.max_distance);
    camera.position = if clamped == distance {
        position
    } else {
        camera.target + offset * (clamped / distance)
    };
    true
}

fn parse_numbers(raw: &str) -> Option<Vec<f32>> {
    let values: Vec<f32> = serde_json::from_str(raw).ok()?;
    values.iter().all(|v| v.is_finite()).then_some(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use relief_core::config::CameraParams;

    const DEFAULT_ATTRIBUTES: [CameraAttribute; 2] =
        [CameraAttribute::Position, CameraAttribute::Up];

    fn camera() -> Camera {
        Camera::new(&CameraParams::default(), 1.5)
    }

    #[test]
    fn test_save_then_restore_round_trip() {
        let mut cam = camera();
        cam.orbit(0.7, -0.3);
        cam.zoom(0.5);

        let mut store = CameraStateStore::new(MemoryStore::new(), &DEFAULT_ATTRIBUTES);
        store.save(&cam).expect("save");

        let restored_store = CameraStateStore::new(store.into_inner(), &DEFAULT_ATTRIBUTES);
        let mut fresh = camera();
        assert_eq!(restored_store.restore(&mut fresh), 2);
        assert!((fresh.position - cam.position).length() < 1e-5);
        assert!((fresh.up - cam.up).length() < 1e-5);
    }

    #[test]
    fn test_values_are_json_arrays_under_prefixed_keys() {
        let mut inner = MemoryStore::new();
        let mut store = CameraStateStore::new(&mut inner, &DEFAULT_ATTRIBUTES);
        store.save(&camera()).expect("save");
        assert_eq!(inner.get("camera.position").as_deref(), Some("[0.0,45.0,0.0]"));
        assert_eq!(inner.get("camera.up").as_deref(), Some("[0.0,1.0,0.0]"));
        assert_eq!(inner.len(), 2);
    }

    #[test]
    fn test_restore_from_empty_store_keeps_defaults() {
        let store = CameraStateStore::new(MemoryStore::new(), &DEFAULT_ATTRIBUTES);
        let mut cam = camera();
        assert_eq!(store.restore(&mut cam), 0);
        assert_eq!(cam, camera());
    }

    #[test]
    fn test_malformed_values_are_ignored() {
        let mut inner = MemoryStore::new();
        inner.set("camera.position", "not json").expect("set");
        inner.set("camera.up", "[1, 2]").expect("set");
        let store = CameraStateStore::new(inner, &DEFAULT_ATTRIBUTES);
        let mut cam = camera();
        assert_eq!(store.restore(&mut cam), 0);
        assert_eq!(cam, camera());
    }

    #[test]
    fn test_zero_up_is_ignored() {
        let mut inner = MemoryStore::new();
        inner.set("camera.up", "[0, 0, 0]").expect("set");
        inner.set("camera.position", "[0, 20, 0]").expect("set");
        let store = CameraStateStore::new(inner, &DEFAULT_ATTRIBUTES);
        let mut cam = camera();
        assert_eq!(store.restore(&mut cam), 1);
        assert_eq!(cam.position, Vec3::new(0.0, 20.0, 0.0));
        assert_eq!(cam.up, Vec3::Y);
    }

    #[test]
    fn test_position_on_target_is_ignored() {
        let mut inner = MemoryStore::new();
        inner.set("camera.position", "[0, 0, 0]").expect("set");
        let store = CameraStateStore::new(inner, &DEFAULT_ATTRIBUTES);
        let mut cam = camera();
        assert_eq!(store.restore(&mut cam), 0);
        assert_eq!(cam, camera());
        assert!(cam.view().is_finite());
        assert_ne!(cam.ray_from_ndc(0.0, 0.0).dir, Vec3::ZERO);
    }

    #[test]
    fn test_restored_distance_is_clamped() {
        let mut inner = MemoryStore::new();
        inner.set("camera.position", "[0, 1, 0]").expect("set");
        let store = CameraStateStore::new(inner, &[CameraAttribute::Position]);
        let mut cam = camera();
        assert_eq!(store.restore(&mut cam), 1);
        assert!((cam.position - Vec3::new(0.0, 10.0, 0.0)).length() < 1e-5);

        let mut inner = MemoryStore::new();
        inner.set("camera.position", "[300, 0, 400]").expect("set");
        let store = CameraStateStore::new(inner, &[CameraAttribute::Position]);
        let mut cam = camera();
        assert_eq!(store.restore(&mut cam), 1);
        assert!((cam.distance() - 50.0).abs() < 1e-4);
        assert!((cam.position - Vec3::new(30.0, 0.0, 40.0)).length() < 1e-4);
    }

    #[test]
    fn test_legacy_quaternion_key() {
        let mut source = camera();
        source.orbit(0.4, 0.2);
        let q = source.quaternion().to_array();

        let mut inner = MemoryStore::new();
        inner
            .set(LEGACY_QUATERNION_KEY, &serde_json::to_string(&q).expect("json"))
            .expect("set");
        let store = CameraStateStore::new(inner, &[CameraAttribute::Quaternion]);
        let mut cam = camera();
        assert_eq!(store.restore(&mut cam), 1);
        assert!((cam.position - source.position).length() < 1e-3);
        assert!((cam.up - source.up).length() < 1e-3);
    }

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, key: &str, _value: &str) -> Result<(), PersistError> {
            Err(PersistError::Store {
                key: key.to_string(),
                message: "quota exceeded".into(),
            })
        }
    }

    #[test]
    fn test_store_failure_is_reported() {
        let mut store = CameraStateStore::new(ReadOnlyStore, &DEFAULT_ATTRIBUTES);
        assert!(matches!(
            store.save(&camera()),
            Err(PersistError::Store { .. })
        ));
    }
}
