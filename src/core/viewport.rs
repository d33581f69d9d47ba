use crate::core::{
    constants::{MAX_ZOOM, MIN_ZOOM, TILE_SIZE},
    geo::{LatLng, Point},
};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Manages the current view of the map: center, zoom, bearing and screen dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// Map rotation in degrees, clockwise from north, in (-180, 180]
    pub bearing: f64,
    /// The size of the viewport in pixels
    pub size: Point,
    /// The minimum allowed zoom level
    pub min_zoom: f64,
    /// The maximum allowed zoom level
    pub max_zoom: f64,
}

impl Viewport {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            bearing: 0.0,
            size,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }

    pub fn set_center(&mut self, center: LatLng) {
        self.center = LatLng::new(LatLng::clamp_lat(center.lat), LatLng::wrap_lng(center.lng));
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    pub fn set_bearing(&mut self, bearing: f64) {
        self.bearing = Self::wrap_bearing(bearing);
    }

    fn wrap_bearing(bearing: f64) -> f64 {
        let wrapped = bearing % 360.0;
        if wrapped > 180.0 {
            wrapped - 360.0
        } else if wrapped <= -180.0 {
            wrapped + 360.0
        } else {
            wrapped
        }
    }

    /// World size in pixels at the current zoom
    pub fn scale(&self) -> f64 {
        TILE_SIZE * 2_f64.powf(self.zoom)
    }

    /// Projects a coordinate to world pixel space at the current zoom
    pub fn project(&self, lat_lng: &LatLng) -> Point {
        let scale = self.scale();
        let lat = LatLng::clamp_lat(lat_lng.lat).to_radians();
        let x = (lat_lng.lng + 180.0) / 360.0 * scale;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * scale;
        Point::new(x, y)
    }

    /// Inverse of [`Viewport::project`]
    pub fn unproject(&self, world: &Point) -> LatLng {
        let scale = self.scale();
        let lng = world.x / scale * 360.0 - 180.0;
        let n = PI - 2.0 * PI * world.y / scale;
        let lat = n.sinh().atan().to_degrees();
        LatLng::new(lat, lng)
    }

    fn half_size(&self) -> Point {
        self.size.multiply(0.5)
    }

    /// Converts a coordinate to a pixel position inside the viewport
    pub fn lat_lng_to_pixel(&self, lat_lng: &LatLng) -> Point {
        let offset = self.project(lat_lng).subtract(&self.project(&self.center));
        offset
            .rotate(-self.bearing.to_radians())
            .add(&self.half_size())
    }

    /// Converts a pixel position inside the viewport to a coordinate
    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        let offset = pixel
            .subtract(&self.half_size())
            .rotate(self.bearing.to_radians());
        self.unproject(&self.project(&self.center).add(&offset))
    }

    /// Moves the view so content follows a drag of `delta` pixels
    pub fn pan(&mut self, delta: Point) {
        let world_delta = delta.rotate(self.bearing.to_radians());
        let center = self.project(&self.center).subtract(&world_delta);
        let center = self.unproject(&center);
        self.set_center(center);
    }

    /// Zooms while keeping `focus_point` (viewport pixels) fixed on screen
    pub fn zoom_to(&mut self, zoom: f64, focus_point: Option<Point>) {
        let Some(focus) = focus_point else {
            self.set_zoom(zoom);
            return;
        };
        let anchor = self.pixel_to_lat_lng(&focus);
        self.set_zoom(zoom);
        let drift = self.lat_lng_to_pixel(&anchor).subtract(&focus);
        self.pan(drift.multiply(-1.0));
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::new(0.0, 0.0), 1.0, Point::new(800.0, 600.0))
    }
}
