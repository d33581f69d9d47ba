//! Prelude module for common map-vi types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use map_vi::prelude::*;`

pub use crate::core::{
    config::{AppConfig, ControlsConfig, MapOptions, MarkerConfig},
    geo::{LatLng, Point},
    map::{LoadState, Map, RenderedFeature},
    viewport::Viewport,
};

pub use crate::animation::{point_on_circle, CirclePath, MarkerAnimation, SourceSink};

pub use crate::data::geojson::{AnimatedFeatureCollection, Feature, FeatureCollection, Geometry};

pub use crate::layers::{CircleLayer, CirclePaint, Color, GeoJsonSource, LayerManager};

pub use crate::input::{EventManager, MapEvent};

pub use crate::runtime::{start_frame_loop, AnimationHandle, FrameScheduler, ManualFrameScheduler};

#[cfg(feature = "tokio-runtime")]
pub use crate::runtime::run_interval_frames;

pub use crate::ui::controls::{
    CompassControl, Control, ControlAction, ControlContext, ControlId, ControlPosition,
    InspectControl, LanguageControl, RulerControl, RulerUnits, StyleDefinition, StylesControl,
    ZoomControl,
};

#[cfg(feature = "egui")]
pub use crate::ui::widget::{MapView, MapViewExt};

pub use crate::{Error as MapError, Result};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
