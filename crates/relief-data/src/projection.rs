//! Spherical Mercator onto the planar map space.

use geo::Coord;
use relief_core::config::ProjectionParams;

/// Mercator projection with a configurable center, scale and translation.
///
/// `project(center) == translate`; x grows eastwards and y grows southwards,
/// like screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mercator {
    scale: f64,
    translate: [f64; 2],
    center: [f64; 2],
}

fn mercator_y(phi: f64) -> f64 {
    (std::f64::consts::FRAC_PI_4 + phi / 2.0).tan().ln()
}

impl Mercator {
    pub fn new(params: &ProjectionParams) -> Self {
        let lambda0 = params.center[0].to_radians();
        let phi0 = params.center[1].to_radians();
        Self {
            scale: params.scale,
            translate: params.translate,
            center: [lambda0, mercator_y(phi0)],
        }
    }

    /// Project a lon/lat pair given in degrees.
    pub fn project(&self, lon_lat: Coord<f64>) -> Coord<f64> {
        let lambda = lon_lat.x.to_radians();
        let phi = lon_lat.y.to_radians();
        Coord {
            x: self.translate[0] + self.scale * (lambda - self.center[0]),
            y: self.translate[1] - self.scale * (mercator_y(phi) - self.center[1]),
        }
    }
}
