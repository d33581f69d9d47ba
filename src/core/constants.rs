//! Demo-wide defaults in one place.
//! Config structs fall back to these when a field is not supplied.

/// Container element the map view binds to.
pub const DEFAULT_CONTAINER: &str = "map";

/// Starting basemap style.
pub const DEFAULT_STYLE_URL: &str = "mapbox://styles/mapbox/streets-v12";

/// Starting center as a GeoJSON `[lng, lat]` position.
pub const DEFAULT_CENTER: [f64; 2] = [72.887850, 21.238422];

/// Starting zoom level.
pub const DEFAULT_ZOOM: f64 = 12.0;

/// Zoom range accepted by the viewport.
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 22.0;

/// Square tile size used for Web Mercator pixel math.
pub const TILE_SIZE: f64 = 512.0;

/// Id shared by the animated point source and its circle layer.
pub const POINT_SOURCE_ID: &str = "point";
pub const POINT_LAYER_ID: &str = "point";

/// Radius of the marker's circular path, in degrees around `[0, 0]`.
pub const PATH_RADIUS: f64 = 20.0;

/// Frame timestamp (ms) is divided by this to get the angle in radians.
/// Larger values rotate slower.
pub const SPEED_DIVISOR: f64 = 1000.0;

/// Circle layer paint.
pub const CIRCLE_RADIUS: f64 = 10.0;
pub const CIRCLE_COLOR: &str = "#007cbf";

/// Languages the language control can switch the map labels to.
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "ar", "de", "en", "es", "fr", "it", "ja", "ko", "mul", "pt", "ru", "zh-Hans", "zh-Hant",
];

/// Environment variable holding the rendering engine access token.
pub const ACCESS_TOKEN_ENV: &str = "MAPBOX_ACCESS_TOKEN";

/// Environment variable pointing at a JSON config file.
pub const CONFIG_PATH_ENV: &str = "MAP_VI_CONFIG";
