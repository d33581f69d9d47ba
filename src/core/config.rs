//! Configuration for the demo: map bootstrap options, the animated marker and
//! the control set.
//!
//! Every field has a default matching the stock demo, so an empty JSON object
//! is a valid configuration. [`AppConfig::from_env`] is the usual entry point
//! for binaries.

use crate::{
    core::{constants, geo::LatLng},
    ui::controls::{RulerUnits, StyleDefinition},
    Error, Result,
};
use serde::{Deserialize, Serialize};

/// Options used to construct the map view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    /// Id of the host element the view binds to
    pub container: String,
    /// Basemap style reference
    pub style: String,
    /// Starting center, `[lng, lat]`
    pub center: [f64; 2],
    pub zoom: f64,
    /// Rendering engine credentials. Only the browser backend requires it.
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
}

impl MapOptions {
    pub fn center_lat_lng(&self) -> LatLng {
        LatLng::from_position(self.center)
    }

    /// Returns the access token or fails when none was configured
    pub fn require_access_token(&self) -> Result<&str> {
        self.access_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .ok_or(Error::MissingAccessToken)
    }
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            container: constants::DEFAULT_CONTAINER.to_string(),
            style: constants::DEFAULT_STYLE_URL.to_string(),
            center: constants::DEFAULT_CENTER,
            zoom: constants::DEFAULT_ZOOM,
            access_token: None,
        }
    }
}

/// The animated point and how it is drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub source_id: String,
    pub layer_id: String,
    /// Radius of the circular path around `[0, 0]`
    pub path_radius: f64,
    /// `angle = timestamp_ms / speed_divisor`
    pub speed_divisor: f64,
    /// Rendered circle radius in pixels
    pub circle_radius: f64,
    pub circle_color: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            source_id: constants::POINT_SOURCE_ID.to_string(),
            layer_id: constants::POINT_LAYER_ID.to_string(),
            path_radius: constants::PATH_RADIUS,
            speed_divisor: constants::SPEED_DIVISOR,
            circle_radius: constants::CIRCLE_RADIUS,
            circle_color: constants::CIRCLE_COLOR.to_string(),
        }
    }
}

/// Literal options handed to the controls at setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub ruler_units: RulerUnits,
    pub styles: Vec<StyleDefinition>,
    /// Language the language control starts with; `None` detects it
    pub initial_language: Option<String>,
    /// Language switched to right after the control is added
    pub language: Option<String>,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            ruler_units: RulerUnits::Kilometers,
            styles: StyleDefinition::demo_styles(),
            initial_language: Some("en".to_string()),
            language: Some("mul".to_string()),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub map: MapOptions,
    pub marker: MarkerConfig,
    pub controls: ControlsConfig,
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `MAP_VI_CONFIG` if set, otherwise the defaults, then applies
    /// `MAPBOX_ACCESS_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var(constants::CONFIG_PATH_ENV) {
            Ok(path) => {
                log::info!("Loading configuration from {}", path);
                let json = std::fs::read_to_string(&path)?;
                Self::from_json_str(&json)?
            }
            Err(_) => Self::default(),
        };

        if let Ok(token) = std::env::var(constants::ACCESS_TOKEN_ENV) {
            config.map.access_token = Some(token);
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.marker.speed_divisor.is_finite() || self.marker.speed_divisor == 0.0 {
            return Err(Error::InvalidConfig(
                "marker.speed_divisor must be a finite, non-zero number".to_string(),
            ));
        }
        let radius_ok = |r: f64| r.is_finite() && r >= 0.0;
        if !radius_ok(self.marker.path_radius) || !radius_ok(self.marker.circle_radius) {
            return Err(Error::InvalidConfig(
                "marker radii must be finite and non-negative".to_string(),
            ));
        }
        crate::layers::circle::Color::parse(&self.marker.circle_color)?;
        if self.controls.styles.is_empty() {
            return Err(Error::InvalidConfig(
                "controls.styles needs at least one entry".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_demo() {
        let config = AppConfig::default();
        assert_eq!(config.map.container, "map");
        assert_eq!(config.map.style, "mapbox://styles/mapbox/streets-v12");
        assert_eq!(config.map.center, [72.887850, 21.238422]);
        assert_eq!(config.map.zoom, 12.0);
        assert_eq!(config.marker.path_radius, 20.0);
        assert_eq!(config.marker.speed_divisor, 1000.0);
        assert_eq!(config.marker.circle_radius, 10.0);
        assert_eq!(config.marker.circle_color, "#007cbf");
        assert_eq!(config.controls.styles.len(), 4);
        assert_eq!(config.controls.language.as_deref(), Some("mul"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            AppConfig::from_json_str(r#"{ "marker": { "speed_divisor": 2000 }, "map": { "zoom": 3 } }"#)
                .unwrap();
        assert_eq!(config.marker.speed_divisor, 2000.0);
        assert_eq!(config.marker.path_radius, 20.0);
        assert_eq!(config.map.zoom, 3.0);
        assert_eq!(config.map.container, "map");
    }

    #[test]
    fn test_zero_speed_divisor_rejected() {
        let err = AppConfig::from_json_str(r#"{ "marker": { "speed_divisor": 0 } }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_negative_radii_rejected() {
        for json in [
            r#"{ "marker": { "path_radius": -20 } }"#,
            r#"{ "marker": { "circle_radius": -1 } }"#,
        ] {
            let err = AppConfig::from_json_str(json).unwrap_err();
            assert!(matches!(err, Error::InvalidConfig(_)), "{}", json);
        }
        assert!(AppConfig::from_json_str(r#"{ "marker": { "path_radius": 0 } }"#).is_ok());
    }

    #[test]
    fn test_bad_color_rejected() {
        let err =
            AppConfig::from_json_str(r##"{ "marker": { "circle_color": "#zzz" } }"##).unwrap_err();
        assert!(matches!(err, Error::InvalidColor(_)));
    }

    #[test]
    fn test_missing_access_token() {
        let options = MapOptions::default();
        assert!(matches!(
            options.require_access_token(),
            Err(Error::MissingAccessToken)
        ));

        let options = MapOptions {
            access_token: Some("pk.test".to_string()),
            ..Default::default()
        };
        assert_eq!(options.require_access_token().unwrap(), "pk.test");
    }
}
