use crate::data::geojson::FeatureCollection;

/// A named GeoJSON source held by the map.
///
/// Layers reference sources by id; replacing the data bumps `version` so
/// views know to redraw.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoJsonSource {
    data: FeatureCollection,
    version: u64,
}

impl GeoJsonSource {
    pub fn new(data: FeatureCollection) -> Self {
        Self { data, version: 0 }
    }

    pub fn data(&self) -> &FeatureCollection {
        &self.data
    }

    /// Replaces the whole collection
    pub fn set_data(&mut self, data: FeatureCollection) {
        self.data = data;
        self.version += 1;
    }

    /// Number of `set_data` calls since the source was added
    pub fn version(&self) -> u64 {
        self.version
    }
}
