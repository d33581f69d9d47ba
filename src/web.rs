//! Browser build: drives `mapbox-gl` and `mapbox-gl-controls` from Rust.
//!
//! The setup and the marker animation are the same as for the headless
//! [`Map`](crate::Map); only the sink (a real `mapboxgl.Map`) and the frame
//! scheduler (`requestAnimationFrame`) differ.

use crate::{
    animation::driver::{MarkerAnimation, SourceSink},
    core::config::{AppConfig, ControlsConfig},
    data::geojson::FeatureCollection,
    runtime::{start_frame_loop_with_handle, AnimationHandle, FrameCallback, FrameScheduler},
    setup, Error, Result,
};
use serde::Serialize;
use std::{cell::RefCell, rc::Rc};
use wasm_bindgen::{prelude::*, JsCast};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);

    #[wasm_bindgen(js_namespace = mapboxgl, js_name = Map)]
    type MapboxMap;

    #[wasm_bindgen(constructor, js_namespace = mapboxgl, js_class = Map)]
    fn new(options: &JsValue) -> MapboxMap;

    #[wasm_bindgen(method)]
    fn on(this: &MapboxMap, event: &str, listener: &js_sys::Function);

    #[wasm_bindgen(method, catch, js_name = addSource)]
    fn add_source(this: &MapboxMap, id: &str, source: &JsValue) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = addLayer)]
    fn add_layer(this: &MapboxMap, layer: &JsValue) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = getSource)]
    fn get_source(this: &MapboxMap, id: &str) -> Option<GeoJsonSourceJs>;

    #[wasm_bindgen(method, js_name = addControl)]
    fn add_control(this: &MapboxMap, control: &JsValue, position: Option<&str>);

    #[wasm_bindgen(js_name = GeoJSONSource)]
    type GeoJsonSourceJs;

    #[wasm_bindgen(method, js_name = setData)]
    fn set_data(this: &GeoJsonSourceJs, data: &JsValue);
}

#[wasm_bindgen(module = "mapbox-gl-controls")]
extern "C" {
    #[wasm_bindgen(js_name = RulerControl)]
    type JsRulerControl;
    #[wasm_bindgen(constructor, js_class = RulerControl)]
    fn new(options: &JsValue) -> JsRulerControl;

    #[wasm_bindgen(js_name = StylesControl)]
    type JsStylesControl;
    #[wasm_bindgen(constructor, js_class = StylesControl)]
    fn new(options: &JsValue) -> JsStylesControl;

    #[wasm_bindgen(js_name = CompassControl)]
    type JsCompassControl;
    #[wasm_bindgen(constructor, js_class = CompassControl)]
    fn new() -> JsCompassControl;

    #[wasm_bindgen(js_name = ZoomControl)]
    type JsZoomControl;
    #[wasm_bindgen(constructor, js_class = ZoomControl)]
    fn new() -> JsZoomControl;

    #[wasm_bindgen(js_name = LanguageControl)]
    type JsLanguageControl;
    #[wasm_bindgen(constructor, js_class = LanguageControl)]
    fn new(options: &JsValue) -> JsLanguageControl;
    #[wasm_bindgen(method, js_name = setLanguage)]
    fn set_language(this: &JsLanguageControl, language: &str);

    #[wasm_bindgen(js_name = InspectControl)]
    type JsInspectControl;
    #[wasm_bindgen(constructor, js_class = InspectControl)]
    fn new() -> JsInspectControl;
}

macro_rules! console_log {
    ($($t:tt)*) => (log(&format_args!($($t)*).to_string()))
}

/// Forwards the `log` facade to the browser console
struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            console_log!("[{}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Main WASM entry point
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }
}

fn js_error(value: JsValue) -> Error {
    Error::Js(
        value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value)),
    )
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue> {
    let json = serde_json::to_string(value)?;
    js_sys::JSON::parse(&json).map_err(js_error)
}

fn set_property(target: &JsValue, key: &str, value: &JsValue) -> Result<()> {
    js_sys::Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(js_error)
}

/// A `mapboxgl.Map` seen as a [`SourceSink`]
pub struct WebMap {
    inner: MapboxMap,
}

impl WebMap {
    /// Sets `mapboxgl.accessToken` and creates the map in the configured container
    pub fn new(config: &AppConfig) -> Result<Self> {
        let token = config.map.require_access_token()?;
        let mapboxgl = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("mapboxgl"))
            .map_err(js_error)?;
        if mapboxgl.is_undefined() {
            return Err(Error::Js("mapboxgl is not loaded".to_string()));
        }
        set_property(&mapboxgl, "accessToken", &JsValue::from_str(token))?;

        let options = to_js(&config.map)?;
        Ok(Self {
            inner: MapboxMap::new(&options),
        })
    }

    pub fn on(&self, event: &str, listener: &js_sys::Function) {
        self.inner.on(event, listener);
    }

    /// Point source, circle layer and controls, as in [`setup::install`]
    pub fn install(&self, config: &AppConfig) -> Result<MarkerAnimation> {
        let animation = MarkerAnimation::from_config(&config.marker);

        let mut source = serde_json::Map::new();
        source.insert("type".to_string(), "geojson".into());
        source.insert(
            "data".to_string(),
            serde_json::to_value(animation.collection().as_collection())?,
        );
        self.inner
            .add_source(&config.marker.source_id, &to_js(&source)?)
            .map_err(js_error)?;

        let layer = setup::circle_layer(&config.marker)?;
        self.inner
            .add_layer(&to_js(&layer.to_json())?)
            .map_err(js_error)?;

        self.install_controls(&config.controls)?;
        Ok(animation)
    }

    fn install_controls(&self, config: &ControlsConfig) -> Result<()> {
        let ruler_options = to_js(&serde_json::json!({ "units": config.ruler_units.as_str() }))?;
        let abbreviation = config.ruler_units.abbreviation();
        let label_format = Closure::wrap(
            Box::new(move |n: f64| format!("{:.2} {}", n, abbreviation)) as Box<dyn Fn(f64) -> String>,
        );
        set_property(&ruler_options, "labelFormat", &label_format.into_js_value())?;
        self.inner
            .add_control(JsRulerControl::new(&ruler_options).as_ref(), Some("top-right"));

        let styles_options = to_js(&serde_json::json!({ "styles": config.styles }))?;
        let on_change = Closure::wrap(Box::new(|style: JsValue| {
            web_sys::console::log_1(&style);
        }) as Box<dyn Fn(JsValue)>);
        set_property(&styles_options, "onChange", &on_change.into_js_value())?;
        self.inner
            .add_control(JsStylesControl::new(&styles_options).as_ref(), Some("top-left"));

        self.inner
            .add_control(JsCompassControl::new().as_ref(), Some("top-right"));
        self.inner
            .add_control(JsZoomControl::new().as_ref(), Some("top-right"));

        let language_options = match &config.initial_language {
            Some(language) => to_js(&serde_json::json!({ "language": language }))?,
            None => js_sys::Object::new().into(),
        };
        let language = JsLanguageControl::new(&language_options);
        self.inner.add_control(language.as_ref(), None);
        if let Some(code) = &config.language {
            language.set_language(code);
        }

        self.inner
            .add_control(JsInspectControl::new().as_ref(), Some("bottom-right"));
        log::info!("mapbox-gl controls registered");
        Ok(())
    }
}

impl SourceSink for WebMap {
    fn set_source_data(&mut self, source_id: &str, data: &FeatureCollection) -> Result<()> {
        let source = self
            .inner
            .get_source(source_id)
            .ok_or_else(|| Error::SourceNotFound(source_id.to_string()))?;
        source.set_data(&to_js(data)?);
        Ok(())
    }
}

/// [`FrameScheduler`] backed by `window.requestAnimationFrame`
pub struct WebFrameScheduler {
    window: web_sys::Window,
}

impl WebFrameScheduler {
    pub fn new() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| Error::Js("no window".to_string()))?;
        Ok(Self { window })
    }
}

impl FrameScheduler for WebFrameScheduler {
    fn request_frame(&self, callback: FrameCallback) {
        let closure = Closure::once_into_js(move |timestamp: f64| callback(timestamp));
        if let Err(e) = self
            .window
            .request_animation_frame(closure.unchecked_ref())
        {
            log::error!("requestAnimationFrame failed: {:?}", e);
        }
    }
}

/// Handle returned to JavaScript by [`run`]
#[wasm_bindgen]
pub struct MapApp {
    handle: AnimationHandle,
}

#[wasm_bindgen]
impl MapApp {
    /// Stops the marker animation
    pub fn stop(&self) {
        self.handle.cancel();
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        !self.handle.is_cancelled()
    }
}

fn parse_config(json: Option<&str>) -> std::result::Result<AppConfig, JsValue> {
    let mut config = match json {
        Some(json) => AppConfig::from_json_str(json),
        None => Ok(AppConfig::default()),
    }
    .map_err(|e| JsValue::from_str(&e.to_string()))?;
    if config.map.access_token.is_none() {
        config.map.access_token = option_env!("MAPBOX_ACCESS_TOKEN").map(str::to_string);
    }
    Ok(config)
}

/// Builds the map, installs everything on `load` and starts the animation
pub fn run(config: AppConfig) -> Result<MapApp> {
    let map = Rc::new(RefCell::new(WebMap::new(&config)?));
    let scheduler = Rc::new(WebFrameScheduler::new()?);
    let handle = AnimationHandle::new();

    let on_load = {
        let map = map.clone();
        let handle = handle.clone();
        Closure::once_into_js(move || {
            let mut animation = match map.borrow().install(&config) {
                Ok(animation) => animation,
                Err(e) => {
                    log::error!("Map setup failed: {}", e);
                    return;
                }
            };
            log::info!("Map loaded; starting marker animation");
            start_frame_loop_with_handle(scheduler, handle, move |timestamp| {
                if let Err(e) = animation.tick(timestamp, &mut *map.borrow_mut()) {
                    log::warn!("Frame at {:.0}ms not applied: {}", timestamp, e);
                }
            });
        })
    };
    map.borrow().on("load", on_load.unchecked_ref());

    Ok(MapApp { handle })
}

/// JavaScript entry point: `run(configJson?)`
#[wasm_bindgen(js_name = run)]
pub fn run_js(config_json: Option<String>) -> std::result::Result<MapApp, JsValue> {
    let config = parse_config(config_json.as_deref())?;
    run(config).map_err(|e| JsValue::from_str(&e.to_string()))
}
