use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_HUE_DEGREES, DEFAULT_MAX_EXTRUSION, DEFAULT_SATURATION};
use crate::error::ReliefError;

/// Parameters of the population → height encoding. Not derived from data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualParams {
    /// Height given to the most populated region.
    pub max_extrusion: f32,
}

impl Default for VisualParams {
    fn default() -> Self {
        Self {
            max_extrusion: DEFAULT_MAX_EXTRUSION,
        }
    }
}

/// HSL parameters; lightness comes from the luminance encoding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorParams {
    pub hue_degrees: f32,
    pub saturation: f32,
}

impl Default for ColorParams {
    fn default() -> Self {
        Self {
            hue_degrees: DEFAULT_HUE_DEGREES,
            saturation: DEFAULT_SATURATION,
        }
    }
}

/// Mercator projection of lon/lat boundaries onto the flat map plane.
///
/// `center` is `[lon, lat]` in degrees and lands on `translate`.
/// Projected y grows downward, like screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionParams {
    pub center: [f64; 2],
    pub scale: f64,
    pub translate: [f64; 2],
}

impl Default for ProjectionParams {
    fn default() -> Self {
        // The placement translation below was tuned against this exact center,
        // so the pair has to change together.
        Self {
            center: [45.944_285_8, 25.009_430_3],
            scale: 150.0,
            translate: [480.0, 250.0],
        }
    }
}

/// Fixed rotation + translation applied to every solid to center the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementParams {
    /// Rotation about X, radians. Applied first.
    pub rotate_x: f32,
    /// Rotation about the already-rotated Z axis, radians.
    pub rotate_z: f32,
    /// Translation along the rotated X axis.
    pub translate_x: f32,
    /// Translation along the rotated Y axis.
    pub translate_y: f32,
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self {
            rotate_x: std::f32::consts::FRAC_PI_2,
            rotate_z: -1.60,
            translate_x: -425.0,
            translate_y: -183.0,
        }
    }
}

/// Camera attributes that can be persisted across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraAttribute {
    Position,
    Up,
    /// Only persisted by older sessions; orientation is re-derived every frame.
    Quaternion,
}

impl CameraAttribute {
    /// Attribute name used in the persisted key.
    pub fn name(self) -> &'static str {
        match self {
            CameraAttribute::Position => "position",
            CameraAttribute::Up => "up",
            CameraAttribute::Quaternion => "quaternion",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraParams {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub up: [f32; 3],
    pub target: [f32; 3],
    pub min_distance: f32,
    pub max_distance: f32,
    pub persisted: Vec<CameraAttribute>,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 10_000.0,
            position: [0.0, 45.0, 0.0],
            up: [0.0, 1.0, 0.0],
            target: [0.0, 0.0, 0.0],
            min_distance: 10.0,
            max_distance: 50.0,
            persisted: vec![CameraAttribute::Position, CameraAttribute::Up],
        }
    }
}

/// Where the three required inputs are fetched from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceParams {
    pub topology: String,
    /// Object inside the topology holding the region boundaries.
    pub topology_object: String,
    pub ids: String,
    pub census: String,
}

impl Default for SourceParams {
    fn default() -> Self {
        Self {
            topology: "data/romania-topo.json".into(),
            topology_object: "romania-counties-geojson".into(),
            ids: "data/judete-id.json".into(),
            census: "data/recensaminte.csv".into(),
        }
    }
}

/// When the region under the pointer is looked up again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PickingMode {
    /// Every rendered frame, whether or not anything changed.
    #[default]
    EveryFrame,
    /// Only after the pointer, the camera or the scene changed.
    OnPointerMove,
}

/// Complete viewer configuration, usually read from `data/map.ron`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub visual: VisualParams,
    pub color: ColorParams,
    pub projection: ProjectionParams,
    pub placement: PlacementParams,
    pub camera: CameraParams,
    pub sources: SourceParams,
    pub picking: PickingMode,
    /// Region codes whose enclave holes are dropped after projection.
    pub hole_corrections: Vec<String>,
}

impl MapConfig {
    /// Parse a config from a RON string. Missing fields take their defaults.
    pub fn from_ron_str(ron_str: &str) -> Result<Self, ReliefError> {
        let options = ron::Options::default();
        let config: Self = options
            .from_str(ron_str)
            .map_err(|e| ReliefError::ConfigParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ReliefError> {
        let max_extrusion = self.visual.max_extrusion;
        if !(max_extrusion.is_finite() && max_extrusion > 0.0) {
            return Err(ReliefError::ConfigParseError(format!(
                "visual.max_extrusion must be a positive number, got {max_extrusion}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipped_config_parses() {
        let config = MapConfig::from_ron_str(include_str!("../../../data/map.ron"))
            .expect("shipped config should parse");
        assert_eq!(config.visual.max_extrusion, 10.0);
        assert_eq!(config.sources.topology_object, "romania-counties-geojson");
        assert_eq!(
            config.camera.persisted,
            vec![CameraAttribute::Position, CameraAttribute::Up]
        );
        assert_eq!(config.hole_corrections, vec!["IF".to_string()]);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = MapConfig::from_ron_str("(visual: (max_extrusion: 4.0))").expect("parse");
        assert_eq!(config.visual.max_extrusion, 4.0);
        assert_eq!(config.color, ColorParams::default());
        assert_eq!(config.camera.position, [0.0, 45.0, 0.0]);
    }

    #[test]
    fn test_malformed_config_rejected() {
        let result = MapConfig::from_ron_str("(visual: [oops");
        assert!(matches!(result, Err(ReliefError::ConfigParseError(_))));
    }

    #[test]
    fn test_non_positive_max_extrusion_rejected() {
        for bad in ["0.0", "-3.0"] {
            let result = MapConfig::from_ron_str(&format!("(visual: (max_extrusion: {bad}))"));
            assert!(
                matches!(result, Err(ReliefError::ConfigParseError(_))),
                "max_extrusion {bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_picking_mode_from_config() {
        let config = MapConfig::from_ron_str("(picking: OnPointerMove)").expect("parse");
        assert_eq!(config.picking, PickingMode::OnPointerMove);
        assert_eq!(MapConfig::default().picking, PickingMode::EveryFrame);
    }

    #[test]
    fn test_attribute_names() {
        assert_eq!(CameraAttribute::Position.name(), "position");
        assert_eq!(CameraAttribute::Up.name(), "up");
        assert_eq!(CameraAttribute::Quaternion.name(), "quaternion");
    }
}
