//! TopoJSON decoding: shared arcs → per-feature lon/lat multipolygons.

use std::collections::HashMap;

use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("failed to parse topology: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a Topology, found type '{0}'")]
    NotTopology(String),
    #[error("topology has no object named '{0}'")]
    MissingObject(String),
    #[error("arc index {0} out of range")]
    ArcOutOfRange(i64),
}

/// Quantization transform of a quantized topology.
#[derive(Debug, Clone, Copy, Deserialize)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum GeometryObject {
    GeometryCollection {
        geometries: Vec<GeometryObject>,
    },
    Polygon {
        arcs: Vec<Vec<i64>>,
        #[serde(default)]
        id: Option<serde_json::Value>,
        #[serde(default)]
        properties: Option<serde_json::Map<String, serde_json::Value>>,
    },
    MultiPolygon {
        arcs: Vec<Vec<Vec<i64>>>,
        #[serde(default)]
        id: Option<serde_json::Value>,
        #[serde(default)]
        properties: Option<serde_json::Map<String, serde_json::Value>>,
    },
    /// Points and lines carry no area; they are skipped.
    #[serde(other)]
    Other,
}

/// A topology as read from the topology file.
#[derive(Debug, Clone, Deserialize)]
pub struct Topology {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    transform: Option<Transform>,
    arcs: Vec<Vec<Vec<f64>>>,
    objects: HashMap<String, GeometryObject>,
}

/// One area feature extracted from a topology object, still in lon/lat.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Raw region code as written in the file; not validated yet.
    pub id: Option<String>,
    /// `properties.name`, the display name.
    pub name: Option<String>,
    pub geometry: MultiPolygon<f64>,
}

impl Topology {
    pub fn from_json(value: serde_json::Value) -> Result<Self, TopologyError> {
        let topology: Topology = serde_json::from_value(value)?;
        if topology.kind != "Topology" {
            return Err(TopologyError::NotTopology(topology.kind));
        }
        Ok(topology)
    }

    /// Extract every area feature of `object`, flattening geometry collections.
    pub fn features(&self, object: &str) -> Result<Vec<Feature>, TopologyError> {
        let root = self
            .objects
            .get(object)
            .ok_or_else(|| TopologyError::MissingObject(object.to_string()))?;
        let arcs = self.decode_arcs();
        let mut out = Vec::new();
        collect_features(root, &arcs, &mut out)?;
        Ok(out)
    }

    /// Absolute coordinates of every arc, undoing delta encoding and quantization.
    fn decode_arcs(&self) -> Vec<Vec<Coord<f64>>> {
        self.arcs
            .iter()
            .map(|arc| {
                let (mut x, mut y) = (0.0, 0.0);
                arc.iter()
                    .filter(|p| p.len() >= 2)
                    .map(|p| match self.transform {
                        Some(t) => {
                            x += p[0];
                            y += p[1];
                            Coord {
                                x: x * t.scale[0] + t.translate[0],
                                y: y * t.scale[1] + t.translate[1],
                            }
                        }
                        None => Coord { x: p[0], y: p[1] },
                    })
                    .collect()
            })
            .collect()
    }
}

fn collect_features(
    object: &GeometryObject,
    arcs: &[Vec<Coord<f64>>],
    out: &mut Vec<Feature>,
) -> Result<(), TopologyError> {
    match object {
        GeometryObject::GeometryCollection { geometries } => {
            for child in geometries {
                collect_features(child, arcs, out)?;
            }
        }
        GeometryObject::Polygon {
            arcs: rings,
            id,
            properties,
        } => {
            let polygon = polygon(rings, arcs)?;
            out.push(feature(id, properties, MultiPolygon::new(vec![polygon])));
        }
        GeometryObject::MultiPolygon {
            arcs: polygons,
            id,
            properties,
        } => {
            let polygons = polygons
                .iter()
                .map(|rings| polygon(rings, arcs))
                .collect::<Result<Vec<_>, _>>()?;
            out.push(feature(id, properties, MultiPolygon::new(polygons)));
        }
        GeometryObject::Other => {}
    }
    Ok(())
}

fn feature(
    id: &Option<serde_json::Value>,
    properties: &Option<serde_json::Map<String, serde_json::Value>>,
    geometry: MultiPolygon<f64>,
) -> Feature {
    let id = id.as_ref().and_then(|v| match v {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    });
    let name = properties
        .as_ref()
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .map(str::to_string);
    Feature { id, name, geometry }
}

/// First ring is the exterior, the rest are holes.
fn polygon(rings: &[Vec<i64>], arcs: &[Vec<Coord<f64>>]) -> Result<Polygon<f64>, TopologyError> {
    let mut rings = rings
        .iter()
        .map(|indices| ring(indices, arcs))
        .collect::<Result<Vec<_>, _>>()?;
    if rings.is_empty() {
        return Ok(Polygon::new(LineString::new(Vec::new()), Vec::new()));
    }
    let exterior = rings.remove(0);
    Ok(Polygon::new(exterior, rings))
}

/// Stitch arcs into one ring. Consecutive arcs share their joining point,
/// which is kept once. A negative index `i` means arc `!i`, reversed.
fn ring(indices: &[i64], arcs: &[Vec<Coord<f64>>]) -> Result<LineString<f64>, TopologyError> {
    let mut points: Vec<Coord<f64>> = Vec::new();
    for &index in indices {
        let (arc_index, reversed) = if index < 0 {
            ((!index) as usize, true)
        } else {
            (index as usize, false)
        };
        let arc = arcs
            .get(arc_index)
            .ok_or(TopologyError::ArcOutOfRange(index))?;
        if !points.is_empty() {
            points.pop();
        }
        if reversed {
            points.extend(arc.iter().rev().copied());
        } else {
            points.extend(arc.iter().copied());
        }
    }
    Ok(LineString::new(points))
}
