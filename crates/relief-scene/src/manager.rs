//! Per-year lifecycle of the region solids.

use glam::{Mat4, Vec3};
use relief_core::config::{ColorParams, PlacementParams, VisualParams};
use relief_core::{MapConfig, Year};
use relief_data::{CensusDataset, RegionCode};
use thiserror::Error;

use crate::extrude::extrude;
use crate::scene::Scene;
use crate::solid::{Solid, SolidHandle};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("year {0} is not in the dataset")]
    UnknownYear(Year),
    #[error("region {region} has no population for {year}")]
    MissingPopulation { region: RegionCode, year: Year },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    Empty,
    Populated(Year),
}

/// What was built for one region in the displayed year.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneEntry {
    pub region: RegionCode,
    pub handle: SolidHandle,
    pub height: f32,
    pub color: [f32; 3],
}

/// Map-wide rotation and translation, applied before the per-solid offset.
pub fn placement_transform(params: &PlacementParams) -> Mat4 {
    Mat4::from_rotation_x(params.rotate_x)
        * Mat4::from_rotation_z(params.rotate_z)
        * Mat4::from_translation(Vec3::new(params.translate_x, params.translate_y, 0.0))
}

/// Owns the solids of the displayed year. Every year change destroys all
/// of them and builds a fresh set, one per region.
#[derive(Debug)]
pub struct SceneManager {
    visual: VisualParams,
    color: ColorParams,
    placement: Mat4,
    entries: Vec<SceneEntry>,
    state: SceneState,
}

impl SceneManager {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            visual: config.visual,
            color: config.color,
            placement: placement_transform(&config.placement),
            entries: Vec::new(),
            state: SceneState::Empty,
        }
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn current_year(&self) -> Option<Year> {
        match self.state {
            SceneState::Empty => None,
            SceneState::Populated(year) => Some(year),
        }
    }

    pub fn entries(&self) -> &[SceneEntry] {
        &self.entries
    }

    /// Rebuild the scene for `year`.
    ///
    /// The year and every population are checked before anything is
    /// removed, so an error leaves the scene as it was. Returns the number
    /// of solids now displayed.
    pub fn select_year(
        &mut self,
        scene: &mut Scene,
        dataset: &CensusDataset,
        year: Year,
    ) -> Result<usize, SceneError> {
        if !dataset.has_year(year) {
            return Err(SceneError::UnknownYear(year));
        }

        let encoder = dataset.encoder(&self.visual);
        let mut planned = Vec::with_capacity(dataset.len());
        for record in dataset.regions() {
            let population =
                record
                    .population(year)
                    .ok_or_else(|| SceneError::MissingPopulation {
                        region: record.id().clone(),
                        year,
                    })?;
            let height = encoder.extrusion(population);
            let color = encoder.color(population, &self.color);
            planned.push((record, height, color));
        }

        self.clear(scene);

        for (record, height, color) in planned {
            let mesh = extrude(record.contour(), height);
            let transform =
                self.placement * Mat4::from_translation(Vec3::new(0.0, 0.0, -height / 2.0));
            let handle = scene.add(Solid::new(
                Some(record.id().clone()),
                mesh,
                color,
                height,
                transform,
            ));
            self.entries.push(SceneEntry {
                region: record.id().clone(),
                handle,
                height,
                color,
            });
        }

        self.state = SceneState::Populated(year);
        log::info!("Year {year}: {} solids", self.entries.len());
        Ok(self.entries.len())
    }

    /// Remove every solid this manager added.
    pub fn clear(&mut self, scene: &mut Scene) {
        for entry in self.entries.drain(..) {
            scene.remove(entry.handle);
        }
        self.state = SceneState::Empty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use std::collections::HashSet;

    #[test]
    fn test_select_year_builds_one_solid_per_region() {
        let dataset = fixtures::dataset();
        let mut scene = Scene::new();
        let mut manager = SceneManager::new(&MapConfig::default());
        assert_eq!(manager.state(), SceneState::Empty);

        let count = manager
            .select_year(&mut scene, &dataset, 2011)
            .expect("select");
        assert_eq!(count, dataset.len());
        assert_eq!(scene.len(), dataset.len());
        assert_eq!(manager.state(), SceneState::Populated(2011));

        let tags: HashSet<_> = scene
            .iter()
            .map(|(_, s)| s.region.clone().expect("tagged"))
            .collect();
        assert_eq!(tags.len(), dataset.len());
        for tag in &tags {
            assert!(dataset.region(tag).is_some());
        }
    }

    #[test]
    fn test_year_change_replaces_every_solid() {
        let dataset = fixtures::dataset();
        let mut scene = Scene::new();
        let mut manager = SceneManager::new(&MapConfig::default());

        manager.select_year(&mut scene, &dataset, 2002).expect("2002");
        let old: Vec<SolidHandle> = scene.handles().collect();
        manager.select_year(&mut scene, &dataset, 2011).expect("2011");

        assert_eq!(scene.len(), dataset.len());
        for handle in old {
            assert!(!scene.contains(handle));
        }
    }

    #[test]
    fn test_reselecting_same_year_still_rebuilds() {
        let dataset = fixtures::dataset();
        let mut scene = Scene::new();
        let mut manager = SceneManager::new(&MapConfig::default());

        manager.select_year(&mut scene, &dataset, 2011).expect("first");
        let old: Vec<SolidHandle> = scene.handles().collect();
        manager.select_year(&mut scene, &dataset, 2011).expect("second");
        assert!(old.iter().all(|h| !scene.contains(*h)));
    }

    #[test]
    fn test_heights_follow_population() {
        let dataset = fixtures::dataset();
        let mut scene = Scene::new();
        let config = MapConfig::default();
        let mut manager = SceneManager::new(&config);
        manager.select_year(&mut scene, &dataset, 2002).expect("select");

        let height_of = |code: &str| {
            manager
                .entries()
                .iter()
                .find(|e| e.region.as_str() == code)
                .map(|e| e.height)
                .expect("entry")
        };
        // Bucharest 2002 is the dataset maximum.
        assert!((height_of("B") - config.visual.max_extrusion).abs() < 1e-5);
        assert!(height_of("CJ") < height_of("B"));
        assert!(height_of("CJ") > 0.0);
    }

    #[test]
    fn test_solids_are_centered_on_base_plane() {
        let dataset = fixtures::dataset();
        let mut scene = Scene::new();
        let mut manager = SceneManager::new(&fixtures::flat_config());
        manager.select_year(&mut scene, &dataset, 2002).expect("select");

        for (_, solid) in scene.iter() {
            let bounds = solid.bounds.expect("bounds");
            let bottom = solid.transform.transform_point3(bounds.min).z;
            let top = solid.transform.transform_point3(bounds.max).z;
            assert!((bottom + solid.height / 2.0).abs() < 1e-5);
            assert!((top - solid.height / 2.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_unknown_year_leaves_scene_untouched() {
        let dataset = fixtures::dataset();
        let mut scene = Scene::new();
        let mut manager = SceneManager::new(&MapConfig::default());
        manager.select_year(&mut scene, &dataset, 2011).expect("select");
        let before: Vec<SolidHandle> = scene.handles().collect();

        assert_eq!(
            manager.select_year(&mut scene, &dataset, 1992),
            Err(SceneError::UnknownYear(1992))
        );
        assert_eq!(scene.handles().collect::<Vec<_>>(), before);
        assert_eq!(manager.state(), SceneState::Populated(2011));
    }

    #[test]
    fn test_clear_empties_scene() {
        let dataset = fixtures::dataset();
        let mut scene = Scene::new();
        let mut manager = SceneManager::new(&MapConfig::default());
        manager.select_year(&mut scene, &dataset, 2011).expect("select");
        manager.clear(&mut scene);
        assert!(scene.is_empty());
        assert!(manager.entries().is_empty());
        assert_eq!(manager.current_year(), None);
    }

    #[test]
    fn test_placement_matches_rotation_then_translation() {
        let params = PlacementParams {
            rotate_x: std::f32::consts::FRAC_PI_2,
            rotate_z: 0.0,
            translate_x: 0.0,
            translate_y: -10.0,
        };
        let m = placement_transform(&params);
        // Local +y is world +z after a quarter turn about x.
        let p = m.transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(0.0, 0.0, -10.0)).length() < 1e-5);
    }
}
