//! # map-vi
//!
//! A small map demo: a map view with a handful of controls (ruler, style
//! switcher, compass, zoom, language, inspector) and one point marker that
//! travels around a circle, updated once per display frame.
//!
//! The crate carries a headless model of the rendering engine ([`Map`]), an
//! egui view of it (feature `egui`) and a browser binding that drives
//! `mapbox-gl` through `wasm-bindgen` (feature `wasm`). The animation driver
//! and the overlay setup are shared between all of them.

pub mod animation;
pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod runtime;
pub mod setup;
pub mod ui;
#[cfg(feature = "wasm")]
pub mod web;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::{AppConfig, MapOptions, MarkerConfig},
    geo::{LatLng, Point},
    map::Map,
    viewport::Viewport,
};

pub use animation::{
    circle::{point_on_circle, CirclePath},
    driver::{MarkerAnimation, SourceSink},
};

pub use data::geojson::{AnimatedFeatureCollection, Feature, FeatureCollection, Geometry};

pub use layers::{circle::CircleLayer, source::GeoJsonSource};

pub use runtime::{
    start_frame_loop, start_frame_loop_with_handle, AnimationHandle, FrameScheduler,
    ManualFrameScheduler,
};

pub use ui::controls::{
    CompassControl, Control, ControlPosition, InspectControl, LanguageControl, RulerControl,
    StylesControl, ZoomControl,
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Source already exists: {0}")]
    SourceExists(String),

    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("Source {source_id} is still used by layer {layer_id}")]
    SourceInUse { source_id: String, layer_id: String },

    #[error("Layer already exists: {0}")]
    LayerExists(String),

    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Control not found: {0}")]
    ControlNotFound(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid style: {0}")]
    InvalidStyle(String),

    #[error("No access token configured; set MAPBOX_ACCESS_TOKEN")]
    MissingAccessToken,

    #[error("JavaScript error: {0}")]
    Js(String),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Installs `env_logger`, honouring `RUST_LOG` and defaulting to `info`.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
