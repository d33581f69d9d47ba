pub mod circle;
pub mod driver;

pub use circle::{point_on_circle, CirclePath};
pub use driver::{MarkerAnimation, SourceSink};
