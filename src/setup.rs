//! One-time map setup: the animated point source, its circle layer and the
//! six controls, plus the glue that drives the marker from a frame loop.

use crate::{
    animation::driver::{MarkerAnimation, SourceSink},
    core::{
        config::{AppConfig, ControlsConfig, MarkerConfig},
        map::Map,
    },
    layers::circle::{CircleLayer, CirclePaint, Color},
    runtime::{start_frame_loop, AnimationHandle, FrameScheduler},
    ui::controls::{
        CompassControl, ControlId, ControlPosition, InspectControl, LanguageControl, RulerControl,
        StylesControl, ZoomControl,
    },
    Result,
};
use std::{cell::RefCell, rc::Rc};

/// Ids of the controls registered by [`install`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstalledControls {
    pub ruler: ControlId,
    pub styles: ControlId,
    pub compass: ControlId,
    pub zoom: ControlId,
    pub language: ControlId,
    pub inspect: ControlId,
}

/// Registers the source, layer and controls on a loaded map and returns the
/// animation state for the frame loop.
pub fn install(map: &mut Map, config: &AppConfig) -> Result<MarkerAnimation> {
    let animation = install_overlays(map, &config.marker)?;
    let controls = install_controls(map, &config.controls)?;
    log::info!(
        "Setup complete: source {}, layer {}, {} controls ({:?})",
        config.marker.source_id,
        config.marker.layer_id,
        map.controls().len(),
        controls
    );
    Ok(animation)
}

/// Adds the point source at angle 0 and the circle layer drawing it
pub fn install_overlays(map: &mut Map, marker: &MarkerConfig) -> Result<MarkerAnimation> {
    let animation = MarkerAnimation::from_config(marker);
    map.add_source(
        &marker.source_id,
        animation.collection().as_collection().clone(),
    )?;
    map.add_layer(circle_layer(marker)?)?;
    Ok(animation)
}

pub fn circle_layer(marker: &MarkerConfig) -> Result<CircleLayer> {
    Ok(CircleLayer::new(
        marker.layer_id.clone(),
        marker.source_id.clone(),
        CirclePaint {
            radius: marker.circle_radius,
            color: Color::parse(&marker.circle_color)?,
        },
    ))
}

pub fn install_controls(map: &mut Map, config: &ControlsConfig) -> Result<InstalledControls> {
    let abbreviation = config.ruler_units.abbreviation();
    let ruler = map.add_control(
        RulerControl::new(config.ruler_units)
            .with_label_format(move |n| format!("{:.2} {}", n, abbreviation)),
        ControlPosition::TopRight,
    )?;

    let styles = map.add_control(
        StylesControl::new(config.styles.clone()).with_on_change(|style| {
            log::info!("Style changed to {} ({})", style.label, style.style_url);
        }),
        ControlPosition::TopLeft,
    )?;

    let compass = map.add_control(CompassControl::new(), ControlPosition::TopRight)?;
    let zoom = map.add_control(ZoomControl::new(), ControlPosition::TopRight)?;

    let language = map.add_control(
        LanguageControl::new(config.initial_language.as_deref()),
        None,
    )?;
    if let Some(code) = config.language.as_deref() {
        map.with_control_mut::<LanguageControl, _>(language, |control| {
            control.set_language(code)
        })??;
    }

    let inspect = map.add_control(InspectControl::new(), ControlPosition::BottomRight)?;

    Ok(InstalledControls {
        ruler,
        styles,
        compass,
        zoom,
        language,
        inspect,
    })
}

/// Runs [`install`] from the map's one-shot load hook and hands the
/// animation to `on_ready`. A `style.load` hook puts the source and layer
/// back after every style switch; the controls stay as they are.
pub fn install_on_load<F>(map: &mut Map, config: AppConfig, on_ready: F) -> Result<()>
where
    F: FnOnce(MarkerAnimation) + Send + 'static,
{
    map.once_load(move |map| {
        let animation = install(map, &config)?;
        let marker = config.marker.clone();
        map.on_style_load(move |map| restore_overlays(map, &marker));
        on_ready(animation);
        Ok(())
    })
}

/// Re-adds whatever part of the overlay a style switch dropped
pub fn restore_overlays(map: &mut Map, marker: &MarkerConfig) -> Result<()> {
    if !map.has_source(&marker.source_id) {
        log::debug!("Restoring source {} after style load", marker.source_id);
        let animation = MarkerAnimation::from_config(marker);
        map.add_source(
            &marker.source_id,
            animation.collection().as_collection().clone(),
        )?;
    }
    if map.get_layer(&marker.layer_id).is_none() {
        map.add_layer(circle_layer(marker)?)?;
    }
    Ok(())
}

/// Starts the frame loop that moves the marker on `sink`.
///
/// A failed update (the source is gone while a style loads) is logged and
/// the loop keeps going.
pub fn animate<M, S>(sink: Rc<RefCell<M>>, scheduler: Rc<S>, mut animation: MarkerAnimation) -> AnimationHandle
where
    M: SourceSink + 'static,
    S: FrameScheduler + ?Sized + 'static,
{
    start_frame_loop(scheduler, move |timestamp| {
        if let Err(e) = animation.tick(timestamp, &mut *sink.borrow_mut()) {
            log::warn!("Frame at {:.0}ms not applied: {}", timestamp, e);
        }
    })
}

/// Moves the marker on a map that no view drains, then delivers the map's
/// queued events so the queue stays empty between frames.
pub fn headless_frame(map: &mut Map, animation: &mut MarkerAnimation, timestamp: f64) -> Result<()> {
    let result = animation.tick(timestamp, map);
    for event in map.process_events() {
        log::trace!("map event: {}", event.event_type());
    }
    result
}
