use crate::{
    core::{geo::Point, map::Map},
    data::geojson::Feature,
    ui::controls::{ControlPosition, RulerControl},
};
use egui::{Align, Align2, Color32, FontId, Layout, Pos2, Rect, Response, Sense, Stroke, Ui, Vec2, Widget};

/// egui view of a [`Map`].
///
/// Paints the style background, the circle layers and the ruler, shows the
/// controls in their corners and turns pointer input into map calls.
///
/// ```rust,ignore
/// ui.map_view(&mut map);
/// ui.add(MapView::new(&mut map).controls(false));
/// ```
pub struct MapView<'a> {
    map: &'a mut Map,
    interactive: bool,
    show_controls: bool,
    /// Extra pick radius for the inspector, in pixels
    inspect_tolerance: f64,
    zoom_sensitivity: f64,
}

impl<'a> MapView<'a> {
    pub fn new(map: &'a mut Map) -> Self {
        Self {
            map,
            interactive: true,
            show_controls: true,
            inspect_tolerance: 3.0,
            zoom_sensitivity: 0.002,
        }
    }

    /// Set whether the map reacts to drag and scroll (default: true)
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Set whether the controls are drawn (default: true)
    pub fn controls(mut self, show: bool) -> Self {
        self.show_controls = show;
        self
    }

    pub fn inspect_tolerance(mut self, pixels: f64) -> Self {
        self.inspect_tolerance = pixels;
        self
    }

    fn handle_input(&mut self, ui: &Ui, rect: Rect, response: &Response) {
        if response.dragged() {
            let delta = response.drag_delta();
            if delta.length_sq() > 0.0 {
                self.map.pan_by(Point::new(delta.x as f64, delta.y as f64));
            }
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll.abs() > 0.1 {
                let focus = response
                    .hover_pos()
                    .map(|pos| to_map_pixel(rect, pos))
                    .unwrap_or_else(|| self.map.viewport().size.multiply(0.5));
                let zoom = self.map.viewport().zoom + scroll as f64 * self.zoom_sensitivity;
                self.map.zoom_around(zoom, focus);
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let lat_lng = self
                    .map
                    .viewport()
                    .pixel_to_lat_lng(&to_map_pixel(rect, pos));
                if let Some((_, ruler)) = self.map.find_control_mut::<RulerControl>() {
                    if ruler.add_point(lat_lng) {
                        log::debug!("Ruler point at {:.5}, {:.5}", lat_lng.lat, lat_lng.lng);
                    }
                }
            }
        }
    }

    fn paint_layers(&self, ui: &Ui, rect: Rect) {
        let painter = ui.painter_at(rect);
        let viewport = self.map.viewport();

        for layer in self.map.layers() {
            let Some(source) = self.map.get_source(&layer.source) else {
                continue;
            };
            let color: Color32 = layer.paint.color.into();
            for feature in &source.data().features {
                for lat_lng in feature.geometry.circle_positions() {
                    let pos = to_screen(rect, viewport.lat_lng_to_pixel(&lat_lng));
                    painter.circle_filled(pos, layer.paint.radius as f32, color);
                }
            }
        }
    }

    fn paint_ruler(&self, ui: &Ui, rect: Rect) {
        let Some((_, ruler)) = self.map.find_control::<RulerControl>() else {
            return;
        };
        if !ruler.is_active() || ruler.points().is_empty() {
            return;
        }

        let painter = ui.painter_at(rect);
        let viewport = self.map.viewport();
        let stroke = Stroke::new(2.0, Color32::from_rgb(0x26, 0x3d, 0x5a));
        let screen: Vec<Pos2> = ruler
            .points()
            .iter()
            .map(|p| to_screen(rect, viewport.lat_lng_to_pixel(p)))
            .collect();

        for pair in screen.windows(2) {
            painter.line_segment([pair[0], pair[1]], stroke);
        }
        for (pos, label) in screen.iter().zip(ruler.labels()) {
            painter.circle(*pos, 4.0, Color32::WHITE, stroke);
            painter.text(
                *pos + Vec2::new(8.0, -8.0),
                Align2::LEFT_BOTTOM,
                label,
                FontId::proportional(12.0),
                Color32::BLACK,
            );
        }
    }

    fn paint_status(&self, ui: &Ui, rect: Rect) {
        let viewport = self.map.viewport();
        let text = format!(
            "{:.5}, {:.5}  z{:.2}  {}  {}",
            viewport.center.lat,
            viewport.center.lng,
            viewport.zoom,
            self.map.language().unwrap_or("-"),
            self.map.style(),
        );
        ui.painter_at(rect).text(
            rect.left_bottom() + Vec2::new(6.0, -6.0),
            Align2::LEFT_BOTTOM,
            text,
            FontId::proportional(10.0),
            Color32::from_gray(90),
        );
    }

    fn controls_ui(&mut self, ui: &mut Ui, rect: Rect) {
        let inner = rect.shrink(10.0);
        for position in ControlPosition::ALL {
            let ids = self.map.controls_at(position);
            if ids.is_empty() {
                continue;
            }
            let (layout, corner) = match position {
                ControlPosition::TopLeft => (Layout::top_down(Align::Min), inner),
                ControlPosition::TopRight => (Layout::top_down(Align::Max), inner),
                ControlPosition::BottomLeft => (Layout::bottom_up(Align::Min), inner),
                ControlPosition::BottomRight => (Layout::bottom_up(Align::Max), inner),
            };
            let mut child = ui.child_ui(corner, layout);
            for id in ids {
                egui::Frame::popup(child.style()).show(&mut child, |ui| {
                    if let Err(e) = self.map.control_ui(id, ui) {
                        log::warn!("Control {} failed: {}", id, e);
                    }
                });
            }
        }
    }

    fn inspect_popup(&self, rect: Rect, response: Response) -> Response {
        if !self.map.inspect_mode() {
            return response;
        }
        let Some(pos) = response.hover_pos() else {
            return response;
        };
        let hits = self
            .map
            .query_rendered_features(to_map_pixel(rect, pos), self.inspect_tolerance);
        if hits.is_empty() {
            return response;
        }

        response.on_hover_ui_at_pointer(|ui| {
            for hit in &hits {
                ui.strong(format!("{} ({})", hit.layer_id, hit.source_id));
                ui.label(describe_feature(&hit.feature));
                ui.separator();
            }
        })
    }
}

impl<'a> Widget for MapView<'a> {
    fn ui(mut self, ui: &mut Ui) -> Response {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        self.map
            .resize(Point::new(rect.width() as f64, rect.height() as f64));

        if self.interactive {
            self.handle_input(ui, rect, &response);
        }

        ui.painter()
            .rect_filled(rect, 0.0, style_background(self.map.style()));
        self.paint_layers(ui, rect);
        self.paint_ruler(ui, rect);
        self.paint_status(ui, rect);

        if self.show_controls {
            self.controls_ui(ui, rect);
        }

        let response = self.inspect_popup(rect, response);

        for event in self.map.process_events() {
            log::trace!("map event: {}", event.event_type());
        }
        if self.map.take_repaint_request() {
            ui.ctx().request_repaint();
        }

        response
    }
}

pub trait MapViewExt {
    fn map_view(&mut self, map: &mut Map) -> Response;
}

impl MapViewExt for Ui {
    fn map_view(&mut self, map: &mut Map) -> Response {
        self.add(MapView::new(map))
    }
}

/// Flat background standing in for the basemap tiles
pub fn style_background(style: &str) -> Color32 {
    if style.contains("satellite") {
        Color32::from_rgb(0x2f, 0x3b, 0x2c)
    } else if style.contains("night") {
        Color32::from_rgb(0x1b, 0x22, 0x33)
    } else if style.contains("navigation-day") {
        Color32::from_rgb(0xf4, 0xf3, 0xef)
    } else {
        Color32::from_rgb(0xe9, 0xe5, 0xdc)
    }
}

fn to_map_pixel(rect: Rect, pos: Pos2) -> Point {
    Point::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64)
}

fn to_screen(rect: Rect, pixel: Point) -> Pos2 {
    rect.min + Vec2::new(pixel.x as f32, pixel.y as f32)
}

fn describe_feature(feature: &Feature) -> String {
    let mut lines = vec![feature.geometry.type_name().to_string()];
    for [lng, lat] in feature.geometry.positions().into_iter().take(4) {
        lines.push(format!("{:.5}, {:.5}", lng, lat));
    }
    for (key, value) in &feature.properties {
        lines.push(format!("{}: {}", key, value));
    }
    lines.join("\n")
}
