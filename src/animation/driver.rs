use crate::{
    animation::circle::CirclePath,
    core::config::MarkerConfig,
    data::geojson::{AnimatedFeatureCollection, FeatureCollection},
    Result,
};

/// Anything that accepts replacement data for a named source
pub trait SourceSink {
    fn set_source_data(&mut self, source_id: &str, data: &FeatureCollection) -> Result<()>;
}

/// Owned state of the marker animation.
///
/// Each [`tick`](MarkerAnimation::tick) moves the single point to
/// `angle = timestamp / speed_divisor` and hands the whole collection to the
/// sink.
#[derive(Debug, Clone)]
pub struct MarkerAnimation {
    source_id: String,
    path: CirclePath,
    speed_divisor: f64,
    collection: AnimatedFeatureCollection,
    frames: u64,
}

impl MarkerAnimation {
    pub fn new(source_id: impl Into<String>, path: CirclePath, speed_divisor: f64) -> Self {
        Self {
            source_id: source_id.into(),
            path,
            speed_divisor,
            collection: AnimatedFeatureCollection::new(path.position(0.0)),
            frames: 0,
        }
    }

    pub fn from_config(config: &MarkerConfig) -> Self {
        Self::new(
            config.source_id.clone(),
            CirclePath::new(config.path_radius),
            config.speed_divisor,
        )
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn angle_at(&self, timestamp_ms: f64) -> f64 {
        timestamp_ms / self.speed_divisor
    }

    /// Advances the marker to `timestamp_ms` and pushes the collection
    pub fn tick<S: SourceSink + ?Sized>(&mut self, timestamp_ms: f64, sink: &mut S) -> Result<()> {
        let angle = self.angle_at(timestamp_ms);
        self.collection.set_point(self.path.position(angle));
        self.frames += 1;
        log::trace!(
            "frame {} at {:.1}ms: angle {:.3} -> {:?}",
            self.frames,
            timestamp_ms,
            angle,
            self.collection.point()
        );
        sink.set_source_data(&self.source_id, self.collection.as_collection())
    }

    pub fn collection(&self) -> &AnimatedFeatureCollection {
        &self.collection
    }

    /// Number of ticks so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
