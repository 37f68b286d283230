//! Extrusion kernel: flat contour → closed prism mesh.
//!
//! Local frame: the contour lies in the XY plane, the prism spans
//! `z ∈ [0, height]`. Vertices are not shared between faces so every face
//! carries its own flat normal.

use earcutr::earcut;
use geo::{Coord, LineString, Polygon};
use glam::Vec3;
use relief_data::Contour;

/// Triangle mesh with per-vertex normals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertices of every triangle, in index order.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                Vec3::from(self.positions[tri[0] as usize]),
                Vec3::from(self.positions[tri[1] as usize]),
                Vec3::from(self.positions[tri[2] as usize]),
            ]
        })
    }

    /// Axis-aligned bounds of all vertices, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.positions.iter().map(|p| Vec3::from(*p));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position.to_array());
        self.normals.push(normal.to_array());
        index
    }
}

/// Build the prism of `contour` with the given height.
pub fn extrude(contour: &Contour, height: f32) -> MeshData {
    let mut mesh = MeshData::default();
    for polygon in contour.polygons() {
        extrude_polygon(&mut mesh, polygon, height);
    }
    mesh
}

fn extrude_polygon(mesh: &mut MeshData, polygon: &Polygon<f64>, height: f32) {
    let exterior = open_ring(polygon.exterior());
    if exterior.len() < 3 {
        return;
    }
    let holes: Vec<Vec<Coord<f64>>> = polygon
        .interiors()
        .iter()
        .map(open_ring)
        .filter(|ring| ring.len() >= 3)
        .collect();

    add_caps(mesh, &exterior, &holes, height);
    add_walls(mesh, &exterior, false, height);
    for hole in &holes {
        add_walls(mesh, hole, true, height);
    }
}

/// Ring points without the closing duplicate.
fn open_ring(ring: &LineString<f64>) -> Vec<Coord<f64>> {
    let mut points = ring.0.clone();
    if points.len() >= 2 && points.first() == points.last() {
        points.pop();
    }
    points
}

fn add_caps(mesh: &mut MeshData, exterior: &[Coord<f64>], holes: &[Vec<Coord<f64>>], height: f32) {
    let mut flat: Vec<f64> = Vec::with_capacity(2 * exterior.len());
    let mut hole_indices = Vec::with_capacity(holes.len());
    let mut points: Vec<Coord<f64>> = exterior.to_vec();
    for hole in holes {
        hole_indices.push(points.len());
        points.extend_from_slice(hole);
    }
    for p in &points {
        flat.push(p.x);
        flat.push(p.y);
    }

    let triangles = match earcut(&flat, &hole_indices, 2) {
        Ok(ix) => ix,
        Err(e) => {
            log::warn!("Cap triangulation failed: {e:?}");
            return;
        }
    };

    for (z, normal) in [(0.0, Vec3::NEG_Z), (height, Vec3::Z)] {
        let base = mesh.positions.len() as u32;
        for p in &points {
            mesh.push_vertex(Vec3::new(p.x as f32, p.y as f32, z), normal);
        }
        mesh.indices
            .extend(triangles.iter().map(|&i| base + i as u32));
    }
}

/// Twice the signed area; positive for counter-clockwise rings.
fn signed_area2(ring: &[Coord<f64>]) -> f64 {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum()
}

fn add_walls(mesh: &mut MeshData, ring: &[Coord<f64>], is_hole: bool, height: f32) {
    // Outward for the solid: away from the exterior, into a hole.
    let mut orientation = if signed_area2(ring) >= 0.0 { 1.0 } else { -1.0 };
    if is_hole {
        orientation = -orientation;
    }

    let n = ring.len();
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        let (dx, dy) = ((b.x - a.x) as f32, (b.y - a.y) as f32);
        let normal = (Vec3::new(dy, -dx, 0.0) * orientation).normalize_or_zero();

        let a0 = mesh.push_vertex(Vec3::new(a.x as f32, a.y as f32, 0.0), normal);
        let b0 = mesh.push_vertex(Vec3::new(b.x as f32, b.y as f32, 0.0), normal);
        let b1 = mesh.push_vertex(Vec3::new(b.x as f32, b.y as f32, height), normal);
        let a1 = mesh.push_vertex(Vec3::new(a.x as f32, a.y as f32, height), normal);
        mesh.indices.extend_from_slice(&[a0, b0, b1, a0, b1, a1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn square(size: f64) -> Contour {
        Contour::new(MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: size, y: 0.0),
            (x: size, y: size),
            (x: 0.0, y: size),
        ]]))
    }

    #[test]
    fn test_square_prism_counts() {
        let mesh = extrude(&square(2.0), 3.0);
        // 2 caps of 2 triangles, 4 walls of 2 triangles.
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.vertex_count(), 4 * 2 + 4 * 4);
        assert_eq!(mesh.normals.len(), mesh.positions.len());
    }

    #[test]
    fn test_bounds_span_height() {
        let mesh = extrude(&square(2.0), 3.0);
        let (min, max) = mesh.bounds().expect("non-empty");
        assert_eq!(min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Vec3::new(2.0, 2.0, 3.0));
    }

    #[test]
    fn test_wall_normals_point_outward() {
        let mesh = extrude(&square(2.0), 1.0);
        let center = Vec3::new(1.0, 1.0, 0.5);
        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            let (p, n) = (Vec3::from(*p), Vec3::from(*n));
            if n.z.abs() < 1e-6 {
                assert!((p - center).dot(n) > 0.0, "wall normal {n} at {p} points inward");
            }
        }
    }

    #[test]
    fn test_hole_walls_face_the_hole() {
        let contour = Contour::new(MultiPolygon::new(vec![polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0)],
            interiors: [[(x: 4.0, y: 4.0), (x: 6.0, y: 4.0), (x: 6.0, y: 6.0), (x: 4.0, y: 6.0)]],
        )]));
        let mesh = extrude(&contour, 1.0);
        let hole_center = Vec3::new(5.0, 5.0, 0.5);
        let mut hole_walls = 0;
        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            let (p, n) = (Vec3::from(*p), Vec3::from(*n));
            let inside_hole = (4.0..=6.0).contains(&p.x) && (4.0..=6.0).contains(&p.y);
            if n.z.abs() < 1e-6 && inside_hole {
                assert!((hole_center - p).dot(n) > 0.0);
                hole_walls += 1;
            }
        }
        assert_eq!(hole_walls, 16);
    }

    #[test]
    fn test_degenerate_ring_is_skipped() {
        let contour = Contour::new(MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
        ]]));
        let mesh = extrude(&contour, 1.0);
        assert_eq!(mesh.triangle_count(), 0);
        assert!(mesh.bounds().is_none());
    }
}
