use crate::{
    animation::driver::SourceSink,
    core::{
        config::MapOptions,
        constants::SUPPORTED_LANGUAGES,
        geo::{LatLng, Point},
        viewport::Viewport,
    },
    data::geojson::{Feature, FeatureCollection},
    input::{EventManager, MapEvent},
    layers::{circle::CircleLayer, manager::LayerManager, source::GeoJsonSource},
    prelude::HashMap,
    ui::controls::{Control, ControlAction, ControlContext, ControlId, ControlManager, ControlPosition},
    Error, Result,
};
use rstar::{primitives::GeomWithData, RTree};

/// Runs once, the first time the style finishes loading
pub type LoadHook = Box<dyn FnOnce(&mut Map) -> Result<()> + Send>;

/// Runs every time a style finishes loading
pub type StyleLoadHook = Box<dyn FnMut(&mut Map) -> Result<()> + Send>;

/// Where the map is in its load lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Waiting for the first style
    Loading,
    /// Loaded once; a new style was requested and is not ready yet
    StyleLoading,
    Loaded,
}

/// A feature hit by [`Map::query_rendered_features`]
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFeature {
    pub layer_id: String,
    pub source_id: String,
    pub feature: Feature,
    /// Screen distance from the query point, in pixels
    pub distance: f64,
}

/// Headless model of the rendering engine.
///
/// Holds the style reference, GeoJSON sources, circle layers, controls and
/// view, and runs the load lifecycle. Views (egui, tests) read it; nothing
/// here draws.
pub struct Map {
    pub viewport: Viewport,
    options: MapOptions,
    style: String,
    state: LoadState,
    sources: HashMap<String, GeoJsonSource>,
    layer_manager: LayerManager,
    controls: ControlManager,
    event_manager: EventManager,
    load_hooks: Vec<LoadHook>,
    style_load_hooks: Vec<StyleLoadHook>,
    language: Option<String>,
    inspect_mode: bool,
    repaint_requested: bool,
}

impl Map {
    pub fn new(options: MapOptions) -> Self {
        Self::with_size(options, Point::new(800.0, 600.0))
    }

    pub fn with_size(options: MapOptions, size: Point) -> Self {
        let viewport = Viewport::new(options.center_lat_lng(), options.zoom, size);
        log::info!(
            "Map bound to #{} at {:?}, zoom {}, style {}",
            options.container,
            options.center,
            options.zoom,
            options.style
        );

        Self {
            viewport,
            style: options.style.clone(),
            options,
            state: LoadState::Loading,
            sources: HashMap::default(),
            layer_manager: LayerManager::new(),
            controls: ControlManager::new(),
            event_manager: EventManager::new(),
            load_hooks: Vec::new(),
            style_load_hooks: Vec::new(),
            language: None,
            inspect_mode: false,
            repaint_requested: true,
        }
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn load_state(&self) -> LoadState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    // --- lifecycle ----------------------------------------------------------

    /// Registers a hook for the first load; runs immediately if already loaded
    pub fn once_load<F>(&mut self, hook: F) -> Result<()>
    where
        F: FnOnce(&mut Map) -> Result<()> + Send + 'static,
    {
        if self.state == LoadState::Loading {
            self.load_hooks.push(Box::new(hook));
            Ok(())
        } else {
            hook(self)
        }
    }

    /// Registers a hook for every later style load
    pub fn on_style_load<F>(&mut self, hook: F)
    where
        F: FnMut(&mut Map) -> Result<()> + Send + 'static,
    {
        self.style_load_hooks.push(Box::new(hook));
    }

    /// Signals that the current style and its resources are ready.
    ///
    /// Emits `style.load` and runs the style hooks; on the first call also
    /// emits `load` and runs the load hooks. Every hook runs even if an
    /// earlier one fails; the first error is returned.
    pub fn complete_style_load(&mut self) -> Result<()> {
        let first_load = self.state == LoadState::Loading;
        if self.state == LoadState::Loaded {
            log::debug!("Redundant style load signal for {}", self.style);
        }
        self.state = LoadState::Loaded;
        self.repaint_requested = true;

        let mut first_error = None;

        self.event_manager.emit(MapEvent::StyleLoad {
            style: self.style.clone(),
        });
        let mut hooks = std::mem::take(&mut self.style_load_hooks);
        for hook in hooks.iter_mut() {
            if let Err(e) = hook(self) {
                log::error!("style.load hook failed: {}", e);
                first_error.get_or_insert(e);
            }
        }
        hooks.append(&mut self.style_load_hooks);
        self.style_load_hooks = hooks;

        if first_load {
            log::info!("Map loaded with style {}", self.style);
            self.event_manager.emit(MapEvent::Load);
            for hook in std::mem::take(&mut self.load_hooks) {
                if let Err(e) = hook(self) {
                    log::error!("load hook failed: {}", e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Switches the basemap. Sources and layers belong to the old style and
    /// are dropped; the map waits for [`Map::complete_style_load`] again.
    pub fn set_style(&mut self, style: &str) -> Result<()> {
        if style.trim().is_empty() {
            return Err(Error::InvalidStyle("empty style reference".to_string()));
        }
        if style == self.style {
            return Ok(());
        }

        log::info!("Switching style {} -> {}", self.style, style);
        self.style = style.to_string();
        self.sources.clear();
        self.layer_manager.clear();
        if self.state == LoadState::Loaded {
            self.state = LoadState::StyleLoading;
        }
        self.event_manager.emit(MapEvent::StyleChange {
            style: style.to_string(),
        });
        self.map_changed();
        Ok(())
    }

    // --- events -------------------------------------------------------------

    pub fn on<F>(&mut self, event_type: &str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.event_manager.on(event_type, callback);
    }

    pub fn process_events(&mut self) -> Vec<MapEvent> {
        self.event_manager.process_events()
    }

    /// Number of events waiting for [`Map::process_events`]
    pub fn pending_events(&self) -> usize {
        self.event_manager.pending_events()
    }

    /// True once after anything visible changed
    pub fn take_repaint_request(&mut self) -> bool {
        std::mem::take(&mut self.repaint_requested)
    }

    // --- sources ------------------------------------------------------------

    pub fn add_source(&mut self, id: &str, data: FeatureCollection) -> Result<()> {
        if self.sources.contains_key(id) {
            return Err(Error::SourceExists(id.to_string()));
        }
        self.sources
            .insert(id.to_string(), GeoJsonSource::new(data));
        self.event_manager.emit(MapEvent::SourceAdd {
            source_id: id.to_string(),
        });
        self.repaint_requested = true;
        log::debug!("Added source {}", id);
        Ok(())
    }

    pub fn get_source(&self, id: &str) -> Option<&GeoJsonSource> {
        self.sources.get(id)
    }

    pub fn get_source_mut(&mut self, id: &str) -> Option<&mut GeoJsonSource> {
        self.sources.get_mut(id)
    }

    pub fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    pub fn source_ids(&self) -> Vec<&str> {
        self.sources.keys().map(String::as_str).collect()
    }

    pub fn remove_source(&mut self, id: &str) -> Result<GeoJsonSource> {
        if let Some(layer) = self.layer_manager.layer_using_source(id) {
            return Err(Error::SourceInUse {
                source_id: id.to_string(),
                layer_id: layer.id.clone(),
            });
        }
        let source = self
            .sources
            .remove(id)
            .ok_or_else(|| Error::SourceNotFound(id.to_string()))?;
        self.event_manager.emit(MapEvent::SourceRemove {
            source_id: id.to_string(),
        });
        self.repaint_requested = true;
        Ok(source)
    }

    // --- layers -------------------------------------------------------------

    pub fn add_layer(&mut self, layer: CircleLayer) -> Result<()> {
        if !self.sources.contains_key(&layer.source) {
            return Err(Error::SourceNotFound(layer.source));
        }
        let layer_id = layer.id.clone();
        self.layer_manager.add_layer(layer)?;
        self.event_manager.emit(MapEvent::LayerAdd {
            layer_id: layer_id.clone(),
        });
        self.repaint_requested = true;
        log::debug!("Added layer {}", layer_id);
        Ok(())
    }

    pub fn remove_layer(&mut self, layer_id: &str) -> Result<()> {
        self.layer_manager.remove_layer(layer_id)?;
        self.event_manager.emit(MapEvent::LayerRemove {
            layer_id: layer_id.to_string(),
        });
        self.repaint_requested = true;
        Ok(())
    }

    pub fn get_layer(&self, layer_id: &str) -> Option<&CircleLayer> {
        self.layer_manager.get_layer(layer_id)
    }

    /// Layers in render order
    pub fn layers(&self) -> impl Iterator<Item = &CircleLayer> + '_ {
        self.layer_manager.layers()
    }

    // --- controls -----------------------------------------------------------

    /// Adds a control at `position`, or at its default corner
    pub fn add_control<C: Control>(
        &mut self,
        control: C,
        position: impl Into<Option<ControlPosition>>,
    ) -> Result<ControlId> {
        let position = position
            .into()
            .unwrap_or_else(|| control.default_position());
        let name = control.name().to_string();
        let ctx = self.control_context();
        let id = self.controls.add(Box::new(control), position, &ctx);
        log::info!("Added {} control at {}", name, position);
        self.event_manager
            .emit(MapEvent::ControlAdd { name, position });
        self.flush_control_actions()?;
        Ok(id)
    }

    pub fn remove_control(&mut self, id: ControlId) -> Result<()> {
        let control = self.controls.remove(id)?;
        self.event_manager.emit(MapEvent::ControlRemove {
            name: control.name().to_string(),
        });
        let mut control = control;
        let actions = control.take_actions();
        self.apply_actions(actions)
    }

    pub fn controls(&self) -> &ControlManager {
        &self.controls
    }

    /// Controls anchored at `position`, in insertion order
    pub fn controls_at(&self, position: ControlPosition) -> Vec<ControlId> {
        self.controls.at(position)
    }

    /// Runs `f` on the control with `id`, then applies whatever it queued
    pub fn with_control_mut<C, R>(&mut self, id: ControlId, f: impl FnOnce(&mut C) -> R) -> Result<R>
    where
        C: Control,
    {
        let control = self
            .controls
            .get_mut(id)
            .and_then(|control| control.as_any_mut().downcast_mut::<C>())
            .ok_or_else(|| Error::ControlNotFound(id.to_string()))?;
        let result = f(control);
        self.flush_control_actions()?;
        Ok(result)
    }

    /// Draws the control with `id` and applies whatever it queued
    #[cfg(feature = "egui")]
    pub fn control_ui(&mut self, id: ControlId, ui: &mut egui::Ui) -> Result<()> {
        let ctx = self.control_context();
        if let Some(control) = self.controls.get_mut(id) {
            control.ui(ui, &ctx);
        }
        self.flush_control_actions()
    }

    /// Typed lookup of the first control of type `C`
    pub fn find_control<C: Control>(&self) -> Option<(ControlId, &C)> {
        self.controls.find::<C>()
    }

    pub fn find_control_mut<C: Control>(&mut self) -> Option<(ControlId, &mut C)> {
        self.controls.find_mut::<C>()
    }

    pub fn control_context(&self) -> ControlContext {
        ControlContext {
            center: self.viewport.center,
            zoom: self.viewport.zoom,
            min_zoom: self.viewport.min_zoom,
            max_zoom: self.viewport.max_zoom,
            bearing: self.viewport.bearing,
            style: self.style.clone(),
            language: self.language.clone(),
            inspect_mode: self.inspect_mode,
        }
    }

    fn flush_control_actions(&mut self) -> Result<()> {
        let actions = self.controls.take_actions();
        self.apply_actions(actions)
    }

    fn apply_actions(&mut self, actions: Vec<ControlAction>) -> Result<()> {
        let mut first_error = None;
        for action in actions {
            if let Err(e) = self.apply_action(action) {
                log::warn!("Control action failed: {}", e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn apply_action(&mut self, action: ControlAction) -> Result<()> {
        match action {
            ControlAction::SetStyle(style) => self.set_style(&style),
            ControlAction::ZoomBy(delta) => {
                self.zoom_by(delta);
                Ok(())
            }
            ControlAction::ResetNorth => {
                self.reset_north();
                Ok(())
            }
            ControlAction::SetLanguage(language) => self.set_language(&language),
            ControlAction::SetInspectMode(enabled) => {
                self.set_inspect_mode(enabled);
                Ok(())
            }
        }
    }

    /// Lets controls resync after a state change and schedules a redraw
    fn map_changed(&mut self) {
        let ctx = self.control_context();
        self.controls.notify_map_change(&ctx);
        self.repaint_requested = true;
    }

    // --- view ---------------------------------------------------------------

    fn view_changed(&mut self) {
        self.event_manager.emit(MapEvent::ViewChanged {
            center: self.viewport.center,
            zoom: self.viewport.zoom,
            bearing: self.viewport.bearing,
        });
        self.map_changed();
    }

    pub fn set_center(&mut self, center: LatLng) {
        self.viewport.set_center(center);
        self.view_changed();
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.viewport.set_zoom(zoom);
        self.view_changed();
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.set_zoom(self.viewport.zoom + delta);
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by(1.0);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(-1.0);
    }

    /// Zooms around a pixel position, keeping it fixed on screen
    pub fn zoom_around(&mut self, zoom: f64, focus: Point) {
        self.viewport.zoom_to(zoom, Some(focus));
        self.view_changed();
    }

    pub fn pan_by(&mut self, delta: Point) {
        self.viewport.pan(delta);
        self.view_changed();
    }

    pub fn set_bearing(&mut self, bearing: f64) {
        self.viewport.set_bearing(bearing);
        self.view_changed();
    }

    pub fn reset_north(&mut self) {
        self.set_bearing(0.0);
    }

    pub fn resize(&mut self, size: Point) {
        if self.viewport.size != size {
            self.viewport.set_size(size);
            self.repaint_requested = true;
        }
    }

    // --- language / inspect -------------------------------------------------

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn set_language(&mut self, language: &str) -> Result<()> {
        if !SUPPORTED_LANGUAGES.contains(&language) {
            return Err(Error::UnsupportedLanguage(language.to_string()));
        }
        if self.language.as_deref() != Some(language) {
            log::info!("Map language set to {}", language);
            self.language = Some(language.to_string());
            self.event_manager.emit(MapEvent::LanguageChange {
                language: language.to_string(),
            });
            self.map_changed();
        }
        Ok(())
    }

    pub fn inspect_mode(&self) -> bool {
        self.inspect_mode
    }

    pub fn set_inspect_mode(&mut self, enabled: bool) {
        if self.inspect_mode != enabled {
            self.inspect_mode = enabled;
            self.event_manager
                .emit(MapEvent::InspectModeChange { enabled });
            self.map_changed();
        }
    }

    /// Features drawn within `tolerance` pixels of `pixel` (plus the circle
    /// radius), top-most layer first, nearest first within a layer.
    pub fn query_rendered_features(&self, pixel: Point, tolerance: f64) -> Vec<RenderedFeature> {
        let mut hits = Vec::new();
        let layers: Vec<_> = self.layers().collect();

        for layer in layers.into_iter().rev() {
            let Some(source) = self.sources.get(&layer.source) else {
                continue;
            };
            let features = &source.data().features;
            let projected: Vec<GeomWithData<[f64; 2], usize>> = features
                .iter()
                .enumerate()
                .flat_map(|(index, feature)| {
                    feature
                        .geometry
                        .circle_positions()
                        .into_iter()
                        .map(move |lat_lng| (index, lat_lng))
                })
                .map(|(index, lat_lng)| {
                    let p = self.viewport.lat_lng_to_pixel(&lat_lng);
                    GeomWithData::new([p.x, p.y], index)
                })
                .collect();
            let tree = RTree::bulk_load(projected);

            let reach = tolerance + layer.paint.radius;
            let mut layer_hits: Vec<(usize, f64)> = Vec::new();
            for hit in tree.locate_within_distance([pixel.x, pixel.y], reach * reach) {
                let [x, y] = *hit.geom();
                let distance = Point::new(x, y).distance_to(&pixel);
                match layer_hits.iter_mut().find(|(index, _)| *index == hit.data) {
                    Some(existing) => existing.1 = existing.1.min(distance),
                    None => layer_hits.push((hit.data, distance)),
                }
            }
            layer_hits.sort_by(|a, b| a.1.total_cmp(&b.1));

            hits.extend(layer_hits.into_iter().map(|(index, distance)| RenderedFeature {
                layer_id: layer.id.clone(),
                source_id: layer.source.clone(),
                feature: features[index].clone(),
                distance,
            }));
        }

        hits
    }
}

impl SourceSink for Map {
    fn set_source_data(&mut self, source_id: &str, data: &FeatureCollection) -> Result<()> {
        let source = self
            .sources
            .get_mut(source_id)
            .ok_or_else(|| Error::SourceNotFound(source_id.to_string()))?;
        source.set_data(data.clone());
        let version = source.version();
        self.event_manager.emit(MapEvent::SourceData {
            source_id: source_id.to_string(),
            version,
        });
        self.repaint_requested = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::geojson::Geometry,
        layers::circle::{CirclePaint, Color},
        ui::controls::{InspectControl, LanguageControl, ZoomControl},
    };
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn map() -> Map {
        Map::new(MapOptions::default())
    }

    fn circle(id: &str, source: &str) -> CircleLayer {
        CircleLayer::new(
            id,
            source,
            CirclePaint {
                radius: 10.0,
                color: Color::rgb(0, 0x7c, 0xbf),
            },
        )
    }

    fn points(positions: &[[f64; 2]]) -> FeatureCollection {
        FeatureCollection::new(
            positions
                .iter()
                .map(|p| Feature::new(Geometry::Point { coordinates: *p }))
                .collect(),
        )
    }

    #[test]
    fn test_map_creation() {
        let map = map();
        assert_eq!(map.viewport().center, LatLng::new(21.238422, 72.887850));
        assert_eq!(map.viewport().zoom, 12.0);
        assert_eq!(map.style(), "mapbox://styles/mapbox/streets-v12");
        assert_eq!(map.load_state(), LoadState::Loading);
    }

    #[test]
    fn test_load_hooks_run_once() {
        let mut map = map();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        map.once_load(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();

        map.complete_style_load().unwrap();
        map.complete_style_load().unwrap();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(map.is_loaded());
        let loads = map
            .process_events()
            .into_iter()
            .filter(|e| *e == MapEvent::Load)
            .count();
        assert_eq!(loads, 1);
    }

    #[test]
    fn test_once_load_after_load_runs_immediately() {
        let mut map = map();
        map.complete_style_load().unwrap();
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = ran.clone();
        map.once_load(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_source_and_layer_rules() {
        let mut map = map();
        assert!(matches!(
            map.add_layer(circle("point", "point")),
            Err(Error::SourceNotFound(_))
        ));

        map.add_source("point", points(&[[20.0, 0.0]])).unwrap();
        assert!(matches!(
            map.add_source("point", FeatureCollection::default()),
            Err(Error::SourceExists(_))
        ));

        map.add_layer(circle("point", "point")).unwrap();
        assert!(matches!(
            map.add_layer(circle("point", "point")),
            Err(Error::LayerExists(_))
        ));
        assert!(matches!(
            map.remove_source("point"),
            Err(Error::SourceInUse { .. })
        ));

        map.remove_layer("point").unwrap();
        map.remove_source("point").unwrap();
        assert!(!map.has_source("point"));
    }

    #[test]
    fn test_set_source_data_bumps_version_and_requests_repaint() {
        let mut map = map();
        map.add_source("point", points(&[[20.0, 0.0]])).unwrap();
        map.take_repaint_request();

        map.set_source_data("point", &points(&[[0.0, 20.0]])).unwrap();
        assert!(map.take_repaint_request());
        assert!(!map.take_repaint_request());
        assert_eq!(map.get_source("point").unwrap().version(), 1);

        assert!(matches!(
            map.set_source_data("missing", &FeatureCollection::default()),
            Err(Error::SourceNotFound(_))
        ));
    }

    #[test]
    fn test_set_style_drops_sources_and_layers() {
        let mut map = map();
        map.complete_style_load().unwrap();
        map.add_source("point", points(&[[20.0, 0.0]])).unwrap();
        map.add_layer(circle("point", "point")).unwrap();

        map.set_style("mapbox://styles/mapbox/satellite-v9").unwrap();
        assert_eq!(map.load_state(), LoadState::StyleLoading);
        assert!(map.source_ids().is_empty());
        assert_eq!(map.layers().count(), 0);

        map.complete_style_load().unwrap();
        assert!(map.is_loaded());
        assert!(matches!(map.set_style("  "), Err(Error::InvalidStyle(_))));
    }

    #[test]
    fn test_style_load_hooks_rerun_on_style_switch() {
        let mut map = map();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        map.on_style_load(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        map.complete_style_load().unwrap();
        map.set_style("mapbox://styles/mapbox/navigation-night-v1").unwrap();
        map.complete_style_load().unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_control_actions_apply_to_map() {
        let mut map = map();
        let zoom = map.add_control(ZoomControl::new(), None).unwrap();
        assert_eq!(map.controls().position_of(zoom), Some(ControlPosition::TopRight));

        map.with_control_mut::<ZoomControl, _>(zoom, |c| c.zoom_in())
            .unwrap();
        assert_eq!(map.viewport().zoom, 13.0);

        let language = map
            .add_control(LanguageControl::new(Some("en")), None)
            .unwrap();
        assert_eq!(map.language(), Some("en"));
        map.with_control_mut::<LanguageControl, _>(language, |c| c.set_language("mul"))
            .unwrap()
            .unwrap();
        assert_eq!(map.language(), Some("mul"));

        assert!(matches!(
            map.with_control_mut::<InspectControl, _>(language, |c| c.toggle()),
            Err(Error::ControlNotFound(_))
        ));
    }

    #[test]
    fn test_inspect_mode_and_query() {
        let mut map = Map::with_size(
            MapOptions {
                center: [0.0, 0.0],
                zoom: 2.0,
                ..Default::default()
            },
            Point::new(800.0, 600.0),
        );
        let inspect = map
            .add_control(InspectControl::new(), ControlPosition::BottomRight)
            .unwrap();
        map.with_control_mut::<InspectControl, _>(inspect, |c| c.toggle())
            .unwrap();
        assert!(map.inspect_mode());
        assert!(map.find_control::<InspectControl>().unwrap().1.is_enabled());

        map.add_source("point", points(&[[0.0, 0.0], [20.0, 0.0]])).unwrap();
        map.add_layer(circle("point", "point")).unwrap();

        let hits = map.query_rendered_features(Point::new(403.0, 300.0), 2.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].layer_id, "point");
        assert_eq!(hits[0].feature.geometry, Geometry::point(0.0, 0.0));
        assert!((hits[0].distance - 3.0).abs() < 1e-6);

        assert!(map
            .query_rendered_features(Point::new(10.0, 10.0), 2.0)
            .is_empty());
    }

    #[test]
    fn test_bearing_reset() {
        let mut map = map();
        map.set_bearing(45.0);
        assert_eq!(map.viewport().bearing, 45.0);
        map.reset_north();
        assert_eq!(map.viewport().bearing, 0.0);
    }

    #[test]
    fn test_unsupported_language_rejected() {
        let mut map = map();
        assert!(matches!(
            map.set_language("klingon"),
            Err(Error::UnsupportedLanguage(_))
        ));
        assert_eq!(map.language(), None);
    }
}
