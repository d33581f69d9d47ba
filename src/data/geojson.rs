use crate::core::geo::LatLng;
use serde::{Deserialize, Deserializer, Serialize};

/// GeoJSON geometry types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: [f64; 2],
    },
    MultiPoint {
        coordinates: Vec<[f64; 2]>,
    },
    LineString {
        coordinates: Vec<[f64; 2]>,
    },
    MultiLineString {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
}

impl Geometry {
    pub fn point(lng: f64, lat: f64) -> Self {
        Geometry::Point {
            coordinates: [lng, lat],
        }
    }

    /// GeoJSON type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::MultiPoint { .. } => "MultiPoint",
            Geometry::LineString { .. } => "LineString",
            Geometry::MultiLineString { .. } => "MultiLineString",
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
        }
    }

    /// Every position in the geometry, flattened
    pub fn positions(&self) -> Vec<[f64; 2]> {
        match self {
            Geometry::Point { coordinates } => vec![*coordinates],
            Geometry::MultiPoint { coordinates } | Geometry::LineString { coordinates } => {
                coordinates.clone()
            }
            Geometry::MultiLineString { coordinates } | Geometry::Polygon { coordinates } => {
                coordinates.iter().flatten().copied().collect()
            }
            Geometry::MultiPolygon { coordinates } => {
                coordinates.iter().flatten().flatten().copied().collect()
            }
        }
    }

    /// Positions a circle layer draws: the point-like vertices of the geometry
    pub fn circle_positions(&self) -> Vec<LatLng> {
        self.positions()
            .into_iter()
            .map(LatLng::from_position)
            .collect()
    }
}

/// GeoJSON feature with geometry and properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    pub geometry: Geometry,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// `"properties": null` is valid GeoJSON
fn null_as_empty<'de, D>(deserializer: D) -> Result<serde_json::Map<String, serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: None,
            geometry,
            properties: serde_json::Map::new(),
        }
    }
}

/// A GeoJSON FeatureCollection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn from_str(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// The animated marker's data: a collection holding exactly one point
/// feature with empty properties.
///
/// The inner collection is only reachable read-only, so the one-point shape
/// cannot be broken from outside.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedFeatureCollection {
    collection: FeatureCollection,
}

impl AnimatedFeatureCollection {
    pub fn new(position: [f64; 2]) -> Self {
        Self {
            collection: FeatureCollection::new(vec![Feature::new(Geometry::Point {
                coordinates: position,
            })]),
        }
    }

    /// Overwrites the single feature's geometry in place
    pub fn set_point(&mut self, position: [f64; 2]) {
        self.collection.features[0].geometry = Geometry::Point {
            coordinates: position,
        };
    }

    pub fn point(&self) -> [f64; 2] {
        match &self.collection.features[0].geometry {
            Geometry::Point { coordinates } => *coordinates,
            other => unreachable!("animated feature holds a {}", other.type_name()),
        }
    }

    pub fn as_collection(&self) -> &FeatureCollection {
        &self.collection
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl From<AnimatedFeatureCollection> for FeatureCollection {
    fn from(animated: AnimatedFeatureCollection) -> Self {
        animated.collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_animated_collection_serializes_as_geojson() {
        let animated = AnimatedFeatureCollection::new([20.0, 0.0]);
        let value = serde_json::to_value(animated.as_collection()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [20.0, 0.0] },
                    "properties": {}
                }]
            })
        );
    }

    #[test]
    fn test_set_point_keeps_single_feature() {
        let mut animated = AnimatedFeatureCollection::new([20.0, 0.0]);
        for i in 0..10 {
            animated.set_point([i as f64, -(i as f64)]);
            assert_eq!(animated.len(), 1);
        }
        assert_eq!(animated.point(), [9.0, -9.0]);
        assert!(animated.as_collection().features[0].properties.is_empty());
    }

    #[test]
    fn test_parse_feature_collection() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "geometry": { "type": "LineString", "coordinates": [[0, 0], [1, 1]] }, "properties": { "name": "a" } },
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [3, 4] } }
            ]
        }"#;
        let collection = FeatureCollection::from_str(json).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.features[0].geometry.type_name(), "LineString");
        assert_eq!(collection.features[1].geometry, Geometry::point(3.0, 4.0));
        assert!(collection.features[1].properties.is_empty());
    }

    #[test]
    fn test_null_properties_accepted() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [20, 0] }, "properties": null }
            ]
        }"#;
        let collection = FeatureCollection::from_str(json).unwrap();
        assert_eq!(collection.features[0].geometry, Geometry::point(20.0, 0.0));
        assert!(collection.features[0].properties.is_empty());
    }

    #[test]
    fn test_polygon_positions_flattened() {
        let polygon = Geometry::Polygon {
            coordinates: vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
        };
        assert_eq!(polygon.positions().len(), 4);
        assert_eq!(polygon.circle_positions()[2], LatLng::new(1.0, 1.0));
    }
}
