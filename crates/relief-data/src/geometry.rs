//! Projected, region-tagged contours.

use geo::{MapCoords, MultiPolygon, Polygon};
use relief_core::config::ProjectionParams;
use thiserror::Error;

use crate::ids::{IdTable, RegionCode};
use crate::projection::Mercator;
use crate::topology::Feature;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("boundary feature '{0}' has no region id")]
    MissingId(String),
    #[error("boundary feature has unknown region id '{0}'")]
    UnknownRegion(String),
}

/// Flat 2D boundary in map space: one or more polygons with optional holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour(MultiPolygon<f64>);

impl Contour {
    pub fn new(polygons: MultiPolygon<f64>) -> Self {
        Self(polygons)
    }

    pub fn polygons(&self) -> &MultiPolygon<f64> {
        &self.0
    }

    pub fn hole_count(&self) -> usize {
        self.0.iter().map(|p| p.interiors().len()).sum()
    }
}

/// A contour together with the region it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionContour {
    pub region: RegionCode,
    /// Display name carried by the boundary feature, if any.
    pub name: Option<String>,
    pub contour: Contour,
}

/// Projects lon/lat boundary features and tags them with validated region codes.
pub struct GeometryAdapter<'a> {
    ids: &'a IdTable,
    projection: Mercator,
    hole_corrections: &'a [String],
}

impl<'a> GeometryAdapter<'a> {
    pub fn new(ids: &'a IdTable, projection: &ProjectionParams, hole_corrections: &'a [String]) -> Self {
        Self {
            ids,
            projection: Mercator::new(projection),
            hole_corrections,
        }
    }

    pub fn adapt(&self, feature: &Feature) -> Result<RegionContour, GeometryError> {
        let raw = feature.id.as_deref().ok_or_else(|| {
            GeometryError::MissingId(feature.name.clone().unwrap_or_default())
        })?;
        let region = self
            .ids
            .validate(raw)
            .cloned()
            .ok_or_else(|| GeometryError::UnknownRegion(raw.to_string()))?;

        let mut projected = feature.geometry.map_coords(|c| self.projection.project(c));
        if self.hole_corrections.iter().any(|code| code == region.as_str()) {
            let holes: usize = projected.iter().map(|p| p.interiors().len()).sum();
            if holes > 0 {
                log::debug!("Dropping {holes} enclave hole(s) from region {region}");
            }
            projected = drop_holes(projected);
        }

        Ok(RegionContour {
            region,
            name: feature.name.clone(),
            contour: Contour(projected),
        })
    }

    pub fn adapt_all(&self, features: &[Feature]) -> Result<Vec<RegionContour>, GeometryError> {
        features.iter().map(|f| self.adapt(f)).collect()
    }
}

fn drop_holes(polygons: MultiPolygon<f64>) -> MultiPolygon<f64> {
    polygons
        .into_iter()
        .map(|p| {
            let (exterior, _) = p.into_inner();
            Polygon::new(exterior, Vec::new())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Coord};

    fn ring_with_hole() -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon!(
            exterior: [(x: 25.0, y: 44.0), (x: 27.0, y: 44.0), (x: 27.0, y: 45.0), (x: 25.0, y: 45.0)],
            interiors: [[(x: 25.5, y: 44.2), (x: 26.0, y: 44.2), (x: 26.0, y: 44.6)]],
        )])
    }

    fn feature(id: Option<&str>) -> Feature {
        Feature {
            id: id.map(str::to_string),
            name: Some("Ilfov".into()),
            geometry: ring_with_hole(),
        }
    }

    #[test]
    fn test_tags_with_validated_code() {
        let ids = IdTable::from_pairs([("Ilfov", "IF")]);
        let adapter = GeometryAdapter::new(&ids, &ProjectionParams::default(), &[]);
        let contour = adapter.adapt(&feature(Some("IF"))).expect("adapt");
        assert_eq!(contour.region.as_str(), "IF");
        assert_eq!(contour.name.as_deref(), Some("Ilfov"));
        assert_eq!(contour.contour.hole_count(), 1);
    }

    #[test]
    fn test_coordinates_are_projected() {
        let ids = IdTable::from_pairs([("Ilfov", "IF")]);
        let params = ProjectionParams::default();
        let adapter = GeometryAdapter::new(&ids, &params, &[]);
        let contour = adapter.adapt(&feature(Some("IF"))).expect("adapt");
        let first = contour.contour.polygons().0[0].exterior().0[0];
        let expected = Mercator::new(&params).project(Coord { x: 25.0, y: 44.0 });
        assert!((first.x - expected.x).abs() < 1e-9);
        assert!((first.y - expected.y).abs() < 1e-9);
    }

    #[test]
    fn test_hole_correction_drops_interiors() {
        let ids = IdTable::from_pairs([("Ilfov", "IF")]);
        let corrections = vec!["IF".to_string()];
        let adapter = GeometryAdapter::new(&ids, &ProjectionParams::default(), &corrections);
        let contour = adapter.adapt(&feature(Some("IF"))).expect("adapt");
        assert_eq!(contour.contour.hole_count(), 0);
    }

    #[test]
    fn test_missing_and_unknown_ids() {
        let ids = IdTable::from_pairs([("Ilfov", "IF")]);
        let adapter = GeometryAdapter::new(&ids, &ProjectionParams::default(), &[]);
        assert_eq!(
            adapter.adapt(&feature(None)),
            Err(GeometryError::MissingId("Ilfov".into()))
        );
        assert_eq!(
            adapter.adapt(&feature(Some("XX"))),
            Err(GeometryError::UnknownRegion("XX".into()))
        );
    }
}
