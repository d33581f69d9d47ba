pub mod controls;

#[cfg(feature = "egui")]
pub mod widget;

pub use controls::{
    CompassControl, Control, ControlAction, ControlContext, ControlId, ControlManager,
    ControlPosition, InspectControl, LanguageControl, RulerControl, RulerUnits, StyleDefinition,
    StylesControl, ZoomControl,
};

#[cfg(feature = "egui")]
pub use widget::{MapView, MapViewExt};
