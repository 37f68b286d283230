use std::collections::BTreeMap;

use crate::solid::{Solid, SolidHandle};

/// The set of solids currently displayed.
#[derive(Debug, Default)]
pub struct Scene {
    solids: BTreeMap<SolidHandle, Solid>,
    next_handle: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, solid: Solid) -> SolidHandle {
        let handle = SolidHandle(self.next_handle);
        self.next_handle += 1;
        self.solids.insert(handle, solid);
        handle
    }

    pub fn remove(&mut self, handle: SolidHandle) -> Option<Solid> {
        self.solids.remove(&handle)
    }

    pub fn contains(&self, handle: SolidHandle) -> bool {
        self.solids.contains_key(&handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SolidHandle, &Solid)> {
        self.solids.iter().map(|(h, s)| (*h, s))
    }

    pub fn handles(&self) -> impl Iterator<Item = SolidHandle> + '_ {
        self.solids.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.solids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extrude::MeshData;
    use glam::Mat4;

    fn empty_solid() -> Solid {
        Solid::new(None, MeshData::default(), [1.0; 3], 0.0, Mat4::IDENTITY)
    }

    #[test]
    fn test_handles_are_never_reused() {
        let mut scene = Scene::new();
        let a = scene.add(empty_solid());
        assert!(scene.remove(a).is_some());
        let b = scene.add(empty_solid());
        assert_ne!(a, b);
        assert!(!scene.contains(a));
        assert!(scene.contains(b));
        assert_eq!(scene.len(), 1);
    }
}
