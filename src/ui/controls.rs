//! Map controls: ruler, style switcher, compass, zoom, language and inspector.
//!
//! Controls never hold a reference to the map. They read a
//! [`ControlContext`] snapshot and queue [`ControlAction`]s, which the map
//! drains and applies after every interaction.

use crate::{
    core::{constants::SUPPORTED_LANGUAGES, geo::LatLng},
    Error, Result,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

/// Screen corner a control is anchored to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlPosition {
    TopLeft,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ControlPosition {
    pub const ALL: [ControlPosition; 4] = [
        ControlPosition::TopLeft,
        ControlPosition::TopRight,
        ControlPosition::BottomLeft,
        ControlPosition::BottomRight,
    ];

    /// Anchor name understood by the rendering engine
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlPosition::TopLeft => "top-left",
            ControlPosition::TopRight => "top-right",
            ControlPosition::BottomLeft => "bottom-left",
            ControlPosition::BottomRight => "bottom-right",
        }
    }
}

impl fmt::Display for ControlPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle returned by `Map::add_control`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId(pub(crate) u64);

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "control#{}", self.0)
    }
}

/// Changes a control asks the map to make
#[derive(Debug, Clone, PartialEq)]
pub enum ControlAction {
    SetStyle(String),
    ZoomBy(f64),
    ResetNorth,
    SetLanguage(String),
    SetInspectMode(bool),
}

/// Read-only view of the map state handed to controls
#[derive(Debug, Clone, PartialEq)]
pub struct ControlContext {
    pub center: LatLng,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub bearing: f64,
    pub style: String,
    pub language: Option<String>,
    pub inspect_mode: bool,
}

/// Common behavior of every map control
pub trait Control: Any + Send + Sync {
    fn name(&self) -> &str;

    fn default_position(&self) -> ControlPosition {
        ControlPosition::TopRight
    }

    /// Called once when the control is added to a map
    fn on_add(&mut self, _ctx: &ControlContext) {}

    fn on_remove(&mut self) {}

    /// Called after the map state changed
    fn on_map_change(&mut self, _ctx: &ControlContext) {}

    /// Drains the actions queued since the last call
    fn take_actions(&mut self) -> Vec<ControlAction> {
        Vec::new()
    }

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Draws the control's widget
    #[cfg(feature = "egui")]
    fn ui(&mut self, ui: &mut egui::Ui, ctx: &ControlContext);
}

macro_rules! impl_control_any {
    () => {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn take_actions(&mut self) -> Vec<ControlAction> {
            std::mem::take(&mut self.actions)
        }
    };
}

// --- Ruler ------------------------------------------------------------------

/// Distance units for the ruler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RulerUnits {
    Meters,
    #[default]
    Kilometers,
    Miles,
    Feet,
}

impl RulerUnits {
    pub fn from_meters(&self, meters: f64) -> f64 {
        match self {
            RulerUnits::Meters => meters,
            RulerUnits::Kilometers => meters / 1000.0,
            RulerUnits::Miles => meters / 1609.344,
            RulerUnits::Feet => meters / 0.3048,
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            RulerUnits::Meters => "m",
            RulerUnits::Kilometers => "km",
            RulerUnits::Miles => "mi",
            RulerUnits::Feet => "ft",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RulerUnits::Meters => "meters",
            RulerUnits::Kilometers => "kilometers",
            RulerUnits::Miles => "miles",
            RulerUnits::Feet => "feet",
        }
    }
}

pub type LabelFormat = Box<dyn Fn(f64) -> String + Send + Sync>;

/// Measures the path through a series of clicked points
pub struct RulerControl {
    units: RulerUnits,
    label_format: LabelFormat,
    active: bool,
    points: Vec<LatLng>,
    actions: Vec<ControlAction>,
}

impl RulerControl {
    pub fn new(units: RulerUnits) -> Self {
        let abbreviation = units.abbreviation();
        Self {
            units,
            label_format: Box::new(move |n| format!("{:.2} {}", n, abbreviation)),
            active: false,
            points: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn with_label_format<F>(mut self, format: F) -> Self
    where
        F: Fn(f64) -> String + Send + Sync + 'static,
    {
        self.label_format = Box::new(format);
        self
    }

    pub fn units(&self) -> RulerUnits {
        self.units
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Stops measuring and forgets the points
    pub fn deactivate(&mut self) {
        self.active = false;
        self.points.clear();
    }

    pub fn toggle(&mut self) {
        if self.active {
            self.deactivate();
        } else {
            self.activate();
        }
    }

    /// Appends a point while measuring; returns false when inactive
    pub fn add_point(&mut self, point: LatLng) -> bool {
        if self.active {
            self.points.push(point);
        }
        self.active
    }

    pub fn points(&self) -> &[LatLng] {
        &self.points
    }

    /// Running distance at every point, in the ruler's units
    pub fn cumulative_distances(&self) -> Vec<f64> {
        let mut total = 0.0;
        let mut distances = Vec::with_capacity(self.points.len());
        for (i, point) in self.points.iter().enumerate() {
            if i > 0 {
                total += self.points[i - 1].distance_to(point);
            }
            distances.push(self.units.from_meters(total));
        }
        distances
    }

    pub fn total_distance(&self) -> f64 {
        self.cumulative_distances().last().copied().unwrap_or(0.0)
    }

    pub fn format(&self, value: f64) -> String {
        (self.label_format)(value)
    }

    /// One label per point with the distance walked so far
    pub fn labels(&self) -> Vec<String> {
        self.cumulative_distances()
            .into_iter()
            .map(|d| self.format(d))
            .collect()
    }
}

impl Control for RulerControl {
    impl_control_any!();

    fn name(&self) -> &str {
        "ruler"
    }

    fn on_remove(&mut self) {
        self.deactivate();
    }

    #[cfg(feature = "egui")]
    fn ui(&mut self, ui: &mut egui::Ui, _ctx: &ControlContext) {
        let mut active = self.active;
        if ui.toggle_value(&mut active, "📏 Ruler").changed() {
            self.toggle();
        }
        if self.active && self.points.len() > 1 {
            ui.label(self.format(self.total_distance()));
        }
    }
}

// --- Styles -----------------------------------------------------------------

/// One entry of the style switcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDefinition {
    pub label: String,
    pub style_name: String,
    pub style_url: String,
}

impl StyleDefinition {
    pub fn new(label: &str, style_name: &str, style_url: &str) -> Self {
        Self {
            label: label.to_string(),
            style_name: style_name.to_string(),
            style_url: style_url.to_string(),
        }
    }

    /// Streets, Satellite, Night Mode and Day Mode
    pub fn demo_styles() -> Vec<StyleDefinition> {
        DEMO_STYLES.clone()
    }
}

static DEMO_STYLES: Lazy<Vec<StyleDefinition>> = Lazy::new(|| {
    vec![
        StyleDefinition::new(
            "Streets",
            "Mapbox Streets",
            "mapbox://styles/mapbox/streets-v9",
        ),
        StyleDefinition::new(
            "Satellite",
            "Satellite",
            "mapbox://styles/mapbox/satellite-v9",
        ),
        StyleDefinition::new(
            "Night Mode",
            "Mapbox Navigation Night",
            "mapbox://styles/mapbox/navigation-night-v1",
        ),
        StyleDefinition::new(
            "Day Mode",
            "Mapbox Navigation Day",
            "mapbox://styles/mapbox/navigation-day-v1",
        ),
    ]
});

pub type StyleChangeCallback = Box<dyn Fn(&StyleDefinition) + Send + Sync>;

/// Switches the basemap between a fixed list of styles
pub struct StylesControl {
    styles: Vec<StyleDefinition>,
    on_change: Option<StyleChangeCallback>,
    active: Option<usize>,
    actions: Vec<ControlAction>,
}

impl StylesControl {
    pub fn new(styles: Vec<StyleDefinition>) -> Self {
        Self {
            styles,
            on_change: None,
            active: None,
            actions: Vec::new(),
        }
    }

    pub fn with_on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&StyleDefinition) + Send + Sync + 'static,
    {
        self.on_change = Some(Box::new(callback));
        self
    }

    pub fn styles(&self) -> &[StyleDefinition] {
        &self.styles
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Requests the style at `index` and reports it to `on_change`
    pub fn select(&mut self, index: usize) -> Result<()> {
        let style = self
            .styles
            .get(index)
            .ok_or_else(|| Error::InvalidStyle(format!("no style at index {}", index)))?;
        self.active = Some(index);
        self.actions.push(ControlAction::SetStyle(style.style_url.clone()));
        if let Some(callback) = &self.on_change {
            callback(style);
        }
        Ok(())
    }

    fn sync_active(&mut self, style_url: &str) {
        self.active = self.styles.iter().position(|s| s.style_url == style_url);
    }
}

impl Control for StylesControl {
    impl_control_any!();

    fn name(&self) -> &str {
        "styles"
    }

    fn on_add(&mut self, ctx: &ControlContext) {
        self.sync_active(&ctx.style);
    }

    fn on_map_change(&mut self, ctx: &ControlContext) {
        self.sync_active(&ctx.style);
    }

    #[cfg(feature = "egui")]
    fn ui(&mut self, ui: &mut egui::Ui, _ctx: &ControlContext) {
        ui.horizontal(|ui| {
            for index in 0..self.styles.len() {
                let selected = self.active == Some(index);
                let label = self.styles[index].label.clone();
                if ui.selectable_label(selected, label).clicked() && !selected {
                    if let Err(e) = self.select(index) {
                        log::warn!("Style selection failed: {}", e);
                    }
                }
            }
        });
    }
}

// --- Compass ----------------------------------------------------------------

/// Shows the bearing and resets it to north on click
#[derive(Default)]
pub struct CompassControl {
    bearing: f64,
    actions: Vec<ControlAction>,
}

impl CompassControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.actions.push(ControlAction::ResetNorth);
    }

    /// Needle rotation in degrees: opposite to the map bearing
    pub fn needle_rotation(&self) -> f64 {
        -self.bearing
    }
}

impl Control for CompassControl {
    impl_control_any!();

    fn name(&self) -> &str {
        "compass"
    }

    fn on_add(&mut self, ctx: &ControlContext) {
        self.bearing = ctx.bearing;
    }

    fn on_map_change(&mut self, ctx: &ControlContext) {
        self.bearing = ctx.bearing;
    }

    #[cfg(feature = "egui")]
    fn ui(&mut self, ui: &mut egui::Ui, _ctx: &ControlContext) {
        let text = format!("🧭 N {:+.0}°", self.needle_rotation());
        if ui.button(text).on_hover_text("Reset bearing to north").clicked() {
            self.reset();
        }
    }
}

// --- Zoom -------------------------------------------------------------------

/// Zoom in / zoom out buttons
#[derive(Default)]
pub struct ZoomControl {
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
    actions: Vec<ControlAction>,
}

impl ZoomControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom_in(&mut self) {
        self.actions.push(ControlAction::ZoomBy(1.0));
    }

    pub fn zoom_out(&mut self) {
        self.actions.push(ControlAction::ZoomBy(-1.0));
    }

    pub fn can_zoom_in(&self) -> bool {
        self.zoom < self.max_zoom
    }

    pub fn can_zoom_out(&self) -> bool {
        self.zoom > self.min_zoom
    }

    fn sync(&mut self, ctx: &ControlContext) {
        self.zoom = ctx.zoom;
        self.min_zoom = ctx.min_zoom;
        self.max_zoom = ctx.max_zoom;
    }
}

impl Control for ZoomControl {
    impl_control_any!();

    fn name(&self) -> &str {
        "zoom"
    }

    fn on_add(&mut self, ctx: &ControlContext) {
        self.sync(ctx);
    }

    fn on_map_change(&mut self, ctx: &ControlContext) {
        self.sync(ctx);
    }

    #[cfg(feature = "egui")]
    fn ui(&mut self, ui: &mut egui::Ui, _ctx: &ControlContext) {
        ui.vertical(|ui| {
            if ui
                .add_enabled(self.can_zoom_in(), egui::Button::new("+"))
                .clicked()
            {
                self.zoom_in();
            }
            if ui
                .add_enabled(self.can_zoom_out(), egui::Button::new("−"))
                .clicked()
            {
                self.zoom_out();
            }
        });
    }
}

// --- Language ---------------------------------------------------------------

/// Switches the language used for map labels
pub struct LanguageControl {
    language: Option<String>,
    supported_languages: Vec<String>,
    actions: Vec<ControlAction>,
}

impl LanguageControl {
    /// `None` picks the language from the environment when added
    pub fn new(language: Option<&str>) -> Self {
        Self {
            language: language.map(str::to_string),
            supported_languages: SUPPORTED_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            actions: Vec::new(),
        }
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn supported_languages(&self) -> &[String] {
        &self.supported_languages
    }

    pub fn set_language(&mut self, language: &str) -> Result<()> {
        if !self.supported_languages.iter().any(|l| l == language) {
            return Err(Error::UnsupportedLanguage(language.to_string()));
        }
        self.language = Some(language.to_string());
        self.actions
            .push(ControlAction::SetLanguage(language.to_string()));
        Ok(())
    }

    /// First supported language found in `LC_ALL`, `LC_MESSAGES` or `LANG`,
    /// falling back to English.
    pub fn detect_language(&self) -> String {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .filter_map(|value| self.match_locale(&value))
            .next()
            .unwrap_or_else(|| "en".to_string())
    }

    /// Maps a locale such as `de_DE.UTF-8` onto a supported language code
    pub fn match_locale(&self, locale: &str) -> Option<String> {
        let code = locale
            .split(['.', '@'])
            .next()
            .unwrap_or_default()
            .replace('_', "-");
        if let Some(exact) = self.supported_languages.iter().find(|l| **l == code) {
            return Some(exact.clone());
        }
        let primary = code.split('-').next().unwrap_or_default();
        self.supported_languages
            .iter()
            .find(|l| l.as_str() == primary)
            .cloned()
    }
}

impl Control for LanguageControl {
    impl_control_any!();

    fn name(&self) -> &str {
        "language"
    }

    fn on_add(&mut self, _ctx: &ControlContext) {
        let language = match self.language.clone() {
            Some(language) => language,
            None => self.detect_language(),
        };
        if let Err(e) = self.set_language(&language) {
            log::warn!("Language control could not apply {}: {}", language, e);
        }
    }

    #[cfg(feature = "egui")]
    fn ui(&mut self, ui: &mut egui::Ui, _ctx: &ControlContext) {
        let current = self.language.clone().unwrap_or_default();
        let mut choice = None;
        egui::ComboBox::from_id_source("map_vi_language")
            .selected_text(format!("🌐 {}", current))
            .show_ui(ui, |ui| {
                for code in &self.supported_languages {
                    if ui.selectable_label(*code == current, code.as_str()).clicked() {
                        choice = Some(code.clone());
                    }
                }
            });
        if let Some(code) = choice {
            if let Err(e) = self.set_language(&code) {
                log::warn!("{}", e);
            }
        }
    }
}

// --- Inspect ----------------------------------------------------------------

/// Toggles feature inspection on hover
#[derive(Default)]
pub struct InspectControl {
    enabled: bool,
    actions: Vec<ControlAction>,
}

impl InspectControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn toggle(&mut self) {
        self.actions
            .push(ControlAction::SetInspectMode(!self.enabled));
    }
}

impl Control for InspectControl {
    impl_control_any!();

    fn name(&self) -> &str {
        "inspect"
    }

    fn on_add(&mut self, ctx: &ControlContext) {
        self.enabled = ctx.inspect_mode;
    }

    fn on_map_change(&mut self, ctx: &ControlContext) {
        self.enabled = ctx.inspect_mode;
    }

    fn on_remove(&mut self) {
        if self.enabled {
            self.actions.push(ControlAction::SetInspectMode(false));
        }
    }

    #[cfg(feature = "egui")]
    fn ui(&mut self, ui: &mut egui::Ui, _ctx: &ControlContext) {
        let mut enabled = self.enabled;
        if ui.toggle_value(&mut enabled, "🔍 Inspect").changed() {
            self.toggle();
        }
    }
}

// --- Manager ----------------------------------------------------------------

struct ControlEntry {
    id: ControlId,
    position: ControlPosition,
    control: Box<dyn Control>,
}

/// Control manager that handles all map controls
#[derive(Default)]
pub struct ControlManager {
    entries: Vec<ControlEntry>,
    next_id: u64,
}

impl ControlManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        mut control: Box<dyn Control>,
        position: ControlPosition,
        ctx: &ControlContext,
    ) -> ControlId {
        let id = ControlId(self.next_id);
        self.next_id += 1;
        control.on_add(ctx);
        self.entries.push(ControlEntry {
            id,
            position,
            control,
        });
        id
    }

    pub fn remove(&mut self, id: ControlId) -> Result<Box<dyn Control>> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| Error::ControlNotFound(id.to_string()))?;
        let mut entry = self.entries.remove(index);
        entry.control.on_remove();
        Ok(entry.control)
    }

    pub fn get(&self, id: ControlId) -> Option<&dyn Control> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.control.as_ref())
    }

    pub fn get_mut(&mut self, id: ControlId) -> Option<&mut dyn Control> {
        self.entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .map(|entry| entry.control.as_mut())
    }

    pub fn position_of(&self, id: ControlId) -> Option<ControlPosition> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.position)
    }

    /// First control of type `C`, in insertion order
    pub fn find<C: Control>(&self) -> Option<(ControlId, &C)> {
        self.entries.iter().find_map(|entry| {
            entry
                .control
                .as_any()
                .downcast_ref::<C>()
                .map(|control| (entry.id, control))
        })
    }

    pub fn find_mut<C: Control>(&mut self) -> Option<(ControlId, &mut C)> {
        self.entries.iter_mut().find_map(|entry| {
            let id = entry.id;
            entry
                .control
                .as_any_mut()
                .downcast_mut::<C>()
                .map(|control| (id, control))
        })
    }

    /// Controls anchored at `position`, in insertion order
    pub fn at(&self, position: ControlPosition) -> Vec<ControlId> {
        self.entries
            .iter()
            .filter(|entry| entry.position == position)
            .map(|entry| entry.id)
            .collect()
    }

    pub fn take_actions(&mut self) -> Vec<ControlAction> {
        self.entries
            .iter_mut()
            .flat_map(|entry| entry.control.take_actions())
            .collect()
    }

    pub fn notify_map_change(&mut self, ctx: &ControlContext) {
        for entry in &mut self.entries {
            entry.control.on_map_change(ctx);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|entry| entry.control.name())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn context() -> ControlContext {
        ControlContext {
            center: LatLng::new(0.0, 0.0),
            zoom: 12.0,
            min_zoom: 0.0,
            max_zoom: 22.0,
            bearing: 30.0,
            style: "mapbox://styles/mapbox/satellite-v9".to_string(),
            language: None,
            inspect_mode: false,
        }
    }

    #[test]
    fn test_ruler_measures_equator_degree() {
        let mut ruler = RulerControl::new(RulerUnits::Kilometers)
            .with_label_format(|n| format!("{:.2} km", n));
        assert!(!ruler.add_point(LatLng::new(0.0, 0.0)));

        ruler.activate();
        assert!(ruler.add_point(LatLng::new(0.0, 0.0)));
        assert!(ruler.add_point(LatLng::new(0.0, 1.0)));

        assert!((ruler.total_distance() - 111.195).abs() < 0.01);
        assert_eq!(ruler.labels(), vec!["0.00 km", "111.20 km"]);

        ruler.toggle();
        assert!(!ruler.is_active());
        assert!(ruler.points().is_empty());
    }

    #[test]
    fn test_ruler_miles_default_label() {
        let mut ruler = RulerControl::new(RulerUnits::Miles);
        ruler.activate();
        ruler.add_point(LatLng::new(0.0, 0.0));
        ruler.add_point(LatLng::new(0.0, 1.0));
        assert_eq!(ruler.labels()[1], "69.09 mi");
    }

    #[test]
    fn test_styles_select_emits_action_and_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut control = StylesControl::new(StyleDefinition::demo_styles())
            .with_on_change(move |style| sink.lock().unwrap().push(style.label.clone()));

        control.on_add(&context());
        assert_eq!(control.active_index(), Some(1));

        control.select(2).unwrap();
        assert_eq!(
            control.take_actions(),
            vec![ControlAction::SetStyle(
                "mapbox://styles/mapbox/navigation-night-v1".to_string()
            )]
        );
        assert_eq!(*seen.lock().unwrap(), vec!["Night Mode".to_string()]);
        assert!(control.take_actions().is_empty());
        assert!(matches!(control.select(9), Err(Error::InvalidStyle(_))));
    }

    #[test]
    fn test_compass_and_zoom_actions() {
        let mut compass = CompassControl::new();
        compass.on_add(&context());
        assert_eq!(compass.needle_rotation(), -30.0);
        compass.reset();
        assert_eq!(compass.take_actions(), vec![ControlAction::ResetNorth]);

        let mut zoom = ZoomControl::new();
        zoom.on_add(&context());
        zoom.zoom_in();
        zoom.zoom_out();
        assert_eq!(
            zoom.take_actions(),
            vec![ControlAction::ZoomBy(1.0), ControlAction::ZoomBy(-1.0)]
        );
        assert!(zoom.can_zoom_in());
    }

    #[test]
    fn test_language_validation() {
        let mut control = LanguageControl::new(Some("en"));
        control.on_add(&context());
        assert_eq!(
            control.take_actions(),
            vec![ControlAction::SetLanguage("en".to_string())]
        );

        control.set_language("mul").unwrap();
        assert_eq!(control.language(), Some("mul"));
        assert!(matches!(
            control.set_language("xx"),
            Err(Error::UnsupportedLanguage(code)) if code == "xx"
        ));
        assert_eq!(control.language(), Some("mul"));
    }

    #[test]
    fn test_language_locale_matching() {
        let control = LanguageControl::new(None);
        assert_eq!(control.match_locale("de_DE.UTF-8").as_deref(), Some("de"));
        assert_eq!(control.match_locale("zh_Hant").as_deref(), Some("zh-Hant"));
        assert_eq!(control.match_locale("C"), None);
    }

    #[test]
    fn test_manager_positions_and_lookup() {
        let ctx = context();
        let mut manager = ControlManager::new();
        let ruler = manager.add(
            Box::new(RulerControl::new(RulerUnits::Kilometers)),
            ControlPosition::TopRight,
            &ctx,
        );
        let inspect = manager.add(
            Box::new(InspectControl::new()),
            ControlPosition::BottomRight,
            &ctx,
        );

        assert_eq!(manager.at(ControlPosition::TopRight), vec![ruler]);
        assert_eq!(manager.at(ControlPosition::BottomRight), vec![inspect]);
        assert_eq!(manager.names(), vec!["ruler", "inspect"]);
        assert_eq!(manager.find::<InspectControl>().map(|(id, _)| id), Some(inspect));

        manager.remove(ruler).unwrap();
        assert!(matches!(manager.remove(ruler), Err(Error::ControlNotFound(_))));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_position_strings() {
        assert_eq!(ControlPosition::default(), ControlPosition::TopRight);
        assert_eq!(ControlPosition::BottomRight.as_str(), "bottom-right");
        assert_eq!(
            serde_json::to_string(&ControlPosition::TopLeft).unwrap(),
            "\"top-left\""
        );
    }
}
