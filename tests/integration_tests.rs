#![cfg(feature = "egui")]

use map_vi::{
    core::map::LoadState,
    setup,
    ui::{controls::StylesControl, widget::MapViewExt},
    AnimationHandle, AppConfig, Geometry, ManualFrameScheduler, Map, MapOptions,
};
use std::{
    cell::RefCell,
    rc::Rc,
    sync::{Arc, Mutex},
};

/// End-to-end runs of the demo: load, setup, frame loop and the egui view
#[cfg(test)]
mod integration_tests {
    use super::*;
    use egui::{Context, Event, Rect, Vec2};

    fn point_of(map: &Map) -> [f64; 2] {
        let source = map.get_source("point").expect("point source");
        match source.data().features[0].geometry {
            Geometry::Point { coordinates } => coordinates,
            _ => panic!("expected a point"),
        }
    }

    /// Map with the one-shot setup wired and the animation started on load
    fn running_demo() -> (Rc<RefCell<Map>>, Rc<ManualFrameScheduler>, AnimationHandle) {
        let ready = Arc::new(Mutex::new(None));
        let slot = ready.clone();
        let mut map = Map::new(MapOptions::default());
        setup::install_on_load(&mut map, AppConfig::default(), move |animation| {
            *slot.lock().unwrap() = Some(animation);
        })
        .unwrap();
        map.complete_style_load().unwrap();

        let map = Rc::new(RefCell::new(map));
        let scheduler = Rc::new(ManualFrameScheduler::new());
        let animation = ready.lock().unwrap().take().expect("setup ran on load");
        let handle = setup::animate(map.clone(), scheduler.clone(), animation);
        (map, scheduler, handle)
    }

    fn render(ctx: &Context, input: egui::RawInput, map: &mut Map) -> Rect {
        let mut rect = Rect::NOTHING;
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                rect = ui.map_view(map).rect;
            });
        });
        rect
    }

    #[tokio::test]
    async fn test_marker_follows_frame_timestamps() {
        println!("[TEST] marker follows frame timestamps");
        let (map, scheduler, _handle) = running_demo();

        // first frame ran synchronously at t = 0
        assert_eq!(map.borrow().get_source("point").unwrap().version(), 1);
        let [x, y] = point_of(&map.borrow());
        assert!((x - 20.0).abs() < 1e-12 && y.abs() < 1e-12);

        for t in [1000.0, 2000.0] {
            scheduler.run_frame(t);
        }
        let map = map.borrow();
        assert_eq!(map.get_source("point").unwrap().version(), 3);
        let [x, y] = point_of(&map);
        assert!((x - 20.0 * 2f64.cos()).abs() < 1e-12);
        assert!((y - 20.0 * 2f64.sin()).abs() < 1e-12);
        assert!(((x * x + y * y).sqrt() - 20.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_setup_runs_once_across_loads() {
        let (map, _scheduler, _handle) = running_demo();
        let mut map = map.borrow_mut();
        map.complete_style_load().unwrap();

        assert_eq!(map.source_ids(), vec!["point"]);
        assert_eq!(map.layers().count(), 1);
        assert_eq!(map.controls().len(), 6);
        assert_eq!(map.language(), Some("mul"));
    }

    #[tokio::test]
    async fn test_style_switch_keeps_animation_alive() {
        println!("[TEST] style switch during animation");
        let (map, scheduler, _handle) = running_demo();

        {
            let mut map = map.borrow_mut();
            let id = map.find_control::<StylesControl>().unwrap().0;
            map.with_control_mut::<StylesControl, _>(id, |styles| styles.select(2))
                .unwrap()
                .unwrap();
            assert_eq!(map.load_state(), LoadState::StyleLoading);
            assert!(map.get_source("point").is_none());
        }

        // source is gone until the style loads; the loop keeps going
        scheduler.run_frame(500.0);
        assert_eq!(scheduler.pending(), 1);

        map.borrow_mut().complete_style_load().unwrap();
        scheduler.run_frame(1500.0);

        let map = map.borrow();
        assert_eq!(map.style(), "mapbox://styles/mapbox/navigation-night-v1");
        assert_eq!(map.controls().len(), 6);
        let [x, y] = point_of(&map);
        assert!((x - 20.0 * 1.5f64.cos()).abs() < 1e-12);
        assert!((y - 20.0 * 1.5f64.sin()).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_cancelled_animation_stops_updating() {
        let (map, scheduler, handle) = running_demo();
        scheduler.run_frame(16.0);
        handle.cancel();
        scheduler.run_frame(33.0);
        scheduler.run_frame(50.0);

        assert_eq!(map.borrow().get_source("point").unwrap().version(), 2);
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test]
    async fn test_view_renders_running_demo() {
        println!("[TEST] egui view of the running demo");
        let ctx = Context::default();
        let (map, scheduler, _handle) = running_demo();

        let rect = render(&ctx, egui::RawInput::default(), &mut map.borrow_mut());
        assert!(rect.width() > 0.0);
        assert!(rect.height() > 0.0);

        scheduler.run_frame(250.0);
        render(&ctx, egui::RawInput::default(), &mut map.borrow_mut());
        assert_eq!(map.borrow().controls().len(), 6);
    }

    #[tokio::test]
    async fn test_drag_and_scroll_keep_view_valid() {
        let ctx = Context::default();
        let mut map = Map::new(MapOptions::default());
        map.complete_style_load().unwrap();
        setup::install(&mut map, &AppConfig::default()).unwrap();

        let rect = render(&ctx, egui::RawInput::default(), &mut map);
        let start = rect.center();
        let end = start + Vec2::new(60.0, 40.0);

        let mut input = egui::RawInput::default();
        input.events.push(Event::PointerMoved(start));
        input.events.push(Event::PointerButton {
            pos: start,
            button: egui::PointerButton::Primary,
            pressed: true,
            modifiers: egui::Modifiers::NONE,
        });
        render(&ctx, input, &mut map);

        let mut input = egui::RawInput::default();
        input.events.push(Event::PointerMoved(end));
        render(&ctx, input, &mut map);

        let mut input = egui::RawInput::default();
        input.events.push(Event::PointerButton {
            pos: end,
            button: egui::PointerButton::Primary,
            pressed: false,
            modifiers: egui::Modifiers::NONE,
        });
        render(&ctx, input, &mut map);

        let mut input = egui::RawInput::default();
        input.events.push(Event::MouseWheel {
            unit: egui::MouseWheelUnit::Line,
            delta: Vec2::new(0.0, 1.0),
            modifiers: egui::Modifiers::NONE,
        });
        input.events.push(Event::PointerMoved(rect.center()));
        render(&ctx, input, &mut map);

        let viewport = map.viewport();
        assert!(viewport.zoom >= viewport.min_zoom && viewport.zoom <= viewport.max_zoom);
        assert!(viewport.center.is_valid());
    }
}
