use crate::{core::geo::LatLng, ui::controls::ControlPosition};

/// Map event types that can be emitted by the map
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// First style load finished; fires once per map
    Load,
    /// A style finished loading (initial load and every style switch)
    StyleLoad { style: String },
    /// A new style was requested; sources and layers were dropped
    StyleChange { style: String },
    /// Map view has changed (center, zoom, or bearing)
    ViewChanged {
        center: LatLng,
        zoom: f64,
        bearing: f64,
    },
    SourceAdd { source_id: String },
    SourceRemove { source_id: String },
    /// Source data was replaced
    SourceData { source_id: String, version: u64 },
    /// Layer was added to the map
    LayerAdd { layer_id: String },
    /// Layer was removed from the map
    LayerRemove { layer_id: String },
    ControlAdd {
        name: String,
        position: ControlPosition,
    },
    ControlRemove { name: String },
    LanguageChange { language: String },
    InspectModeChange { enabled: bool },
}

impl MapEvent {
    /// Name listeners subscribe to
    pub fn event_type(&self) -> &'static str {
        match self {
            MapEvent::Load => "load",
            MapEvent::StyleLoad { .. } => "style.load",
            MapEvent::StyleChange { .. } => "stylechange",
            MapEvent::ViewChanged { .. } => "viewchanged",
            MapEvent::SourceAdd { .. } => "sourceadd",
            MapEvent::SourceRemove { .. } => "sourceremove",
            MapEvent::SourceData { .. } => "sourcedata",
            MapEvent::LayerAdd { .. } => "layeradd",
            MapEvent::LayerRemove { .. } => "layerremove",
            MapEvent::ControlAdd { .. } => "controladd",
            MapEvent::ControlRemove { .. } => "controlremove",
            MapEvent::LanguageChange { .. } => "languagechange",
            MapEvent::InspectModeChange { .. } => "inspectmodechange",
        }
    }
}
