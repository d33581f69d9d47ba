use crate::{core::constants::PATH_RADIUS, data::geojson::Geometry};

/// Point at `angle` radians on a circle of `radius` around the origin,
/// as a GeoJSON `[x, y]` position.
pub fn point_on_circle(angle: f64, radius: f64) -> [f64; 2] {
    let (sin, cos) = angle.sin_cos();
    [cos * radius, sin * radius]
}

/// Circular path with a fixed radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CirclePath {
    radius: f64,
}

impl CirclePath {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn position(&self, angle: f64) -> [f64; 2] {
        point_on_circle(angle, self.radius)
    }

    pub fn geometry(&self, angle: f64) -> Geometry {
        Geometry::Point {
            coordinates: self.position(angle),
        }
    }
}

impl Default for CirclePath {
    fn default() -> Self {
        Self::new(PATH_RADIUS)
    }
}
