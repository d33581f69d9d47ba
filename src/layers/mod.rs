pub mod circle;
pub mod manager;
pub mod source;

pub use circle::{CircleLayer, CirclePaint, Color};
pub use manager::LayerManager;
pub use source::GeoJsonSource;
