pub mod geojson;

pub use geojson::{AnimatedFeatureCollection, Feature, FeatureCollection, Geometry};
