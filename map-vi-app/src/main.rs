use anyhow::Context as _;
use map_vi::{
    core::map::LoadState,
    runtime::run_interval_frames,
    setup,
    ui::widget::MapViewExt,
    AnimationHandle, AppConfig, ManualFrameScheduler, Map, MarkerAnimation,
};
use std::{
    cell::RefCell,
    rc::Rc,
    sync::{Arc, Mutex},
    time::Duration,
};

/// Frame rate of the headless loop
const HEADLESS_FPS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Window,
    /// Runs until Ctrl-C, or for the given number of seconds
    Headless(Option<f64>),
}

fn parse_mode(args: impl Iterator<Item = String>) -> anyhow::Result<Mode> {
    let mut mode = Mode::Window;
    for arg in args {
        if arg == "--headless" {
            mode = Mode::Headless(None);
        } else if let Some(seconds) = arg.strip_prefix("--headless=") {
            let seconds: f64 = seconds
                .parse()
                .with_context(|| format!("invalid --headless duration: {}", seconds))?;
            if !seconds.is_finite() || seconds < 0.0 {
                anyhow::bail!("--headless duration must be a non-negative number of seconds");
            }
            mode = Mode::Headless(Some(seconds));
        } else {
            anyhow::bail!("unknown argument: {}", arg);
        }
    }
    Ok(mode)
}

/// Map viewer for the animated-marker demo
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    map_vi::init_logging();

    let mode = parse_mode(std::env::args().skip(1))?;
    let config = AppConfig::from_env().context("loading configuration")?;

    match mode {
        Mode::Headless(seconds) => run_headless(config, seconds).await,
        Mode::Window => {
            let options = eframe::NativeOptions {
                viewport: egui::ViewportBuilder::default()
                    .with_inner_size([1200.0, 800.0])
                    .with_title("Map-vi"),
                ..Default::default()
            };

            eframe::run_native(
                "map-vi-app",
                options,
                Box::new(move |cc| Box::new(MapViApp::new(cc, config))),
            )
            .map_err(|e| anyhow::anyhow!("viewer failed: {}", e))
        }
    }
}

async fn run_headless(config: AppConfig, seconds: Option<f64>) -> anyhow::Result<()> {
    let mut map = Map::new(config.map.clone());
    map.complete_style_load()?;
    let mut animation = setup::install(&mut map, &config)?;

    let handle = AnimationHandle::new();
    let on_ctrl_c = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Ctrl-C received");
            on_ctrl_c.cancel();
        }
    });
    if let Some(seconds) = seconds {
        let on_timeout = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs_f64(seconds)).await;
            on_timeout.cancel();
        });
    }

    log::info!("Running headless at {} fps", HEADLESS_FPS);
    let frames = run_interval_frames(HEADLESS_FPS, handle, |timestamp| {
        match setup::headless_frame(&mut map, &mut animation, timestamp) {
            Ok(()) => {
                let [x, y] = animation.collection().point();
                log::debug!("t={:.0}ms point=[{:.4}, {:.4}]", timestamp, x, y);
            }
            Err(e) => log::warn!("Frame at {:.0}ms not applied: {}", timestamp, e),
        }
    })
    .await;

    log::info!("Marker moved {} times", frames);
    Ok(())
}

/// The main application struct
struct MapViApp {
    map: Rc<RefCell<Map>>,
    scheduler: Rc<ManualFrameScheduler>,
    /// Filled by the map's load hook
    ready: Arc<Mutex<Option<MarkerAnimation>>>,
    animation: Option<AnimationHandle>,
    show_debug_panel: bool,
}

impl MapViApp {
    fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let ready = Arc::new(Mutex::new(None));
        let mut map = Map::new(config.map.clone());

        let slot = ready.clone();
        let installed = setup::install_on_load(&mut map, config, move |animation| {
            if let Ok(mut slot) = slot.lock() {
                *slot = Some(animation);
            }
        });
        if let Err(e) = installed {
            log::error!("Setup failed: {}", e);
        }

        Self {
            map: Rc::new(RefCell::new(map)),
            scheduler: Rc::new(ManualFrameScheduler::new()),
            ready,
            animation: None,
            show_debug_panel: false,
        }
    }

    /// The viewer has no remote resources, so a requested style is ready on
    /// the next frame.
    fn finish_style_load(&mut self) {
        let mut map = self.map.borrow_mut();
        if map.load_state() != LoadState::Loaded {
            if let Err(e) = map.complete_style_load() {
                log::error!("Style load failed: {}", e);
            }
        }
    }

    fn start_animation(&mut self) {
        if self.animation.is_some() {
            return;
        }
        let animation = self.ready.lock().ok().and_then(|mut slot| slot.take());
        if let Some(animation) = animation {
            log::info!("Starting marker animation");
            self.animation = Some(setup::animate(
                self.map.clone(),
                self.scheduler.clone(),
                animation,
            ));
        }
    }

    fn debug_panel(&self, ui: &mut egui::Ui) {
        let map = self.map.borrow();
        ui.heading("Map");
        ui.separator();
        ui.label(format!("Style: {}", map.style()));
        ui.label(format!("Language: {}", map.language().unwrap_or("-")));
        ui.label(format!("Inspect mode: {}", map.inspect_mode()));
        ui.separator();
        ui.label(format!("Sources: {}", map.source_ids().join(", ")));
        for layer in map.layers() {
            ui.label(format!("Layer {} ({})", layer.id, layer.source));
        }
        ui.label(format!("Controls: {}", map.controls().names().join(", ")));
        if let Some(source) = map.get_source("point") {
            ui.label(format!("Point updates: {}", source.version()));
        }
    }
}

impl eframe::App for MapViApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.finish_style_load();
        self.start_animation();

        let now_ms = ctx.input(|i| i.time) * 1000.0;
        self.scheduler.run_frame(now_ms);

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.show_debug_panel, "Debug Panel");
                });
                ui.separator();
                let running = self
                    .animation
                    .as_ref()
                    .map_or(false, |handle| !handle.is_cancelled());
                if running && ui.button("⏹ Stop animation").clicked() {
                    if let Some(handle) = &self.animation {
                        handle.cancel();
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let map = self.map.borrow();
                    let viewport = map.viewport();
                    ui.label(format!(
                        "Center: {:.4}, {:.4} | Zoom: {:.2} | Bearing: {:.0}°",
                        viewport.center.lat, viewport.center.lng, viewport.zoom, viewport.bearing
                    ));
                });
            });
        });

        if self.show_debug_panel {
            egui::SidePanel::left("debug_panel")
                .resizable(true)
                .show(ctx, |ui| self.debug_panel(ui));
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                ui.map_view(&mut self.map.borrow_mut());
            });

        if self
            .animation
            .as_ref()
            .map_or(false, |handle| !handle.is_cancelled())
        {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_mode(args(&[])).unwrap(), Mode::Window);
        assert_eq!(
            parse_mode(args(&["--headless"])).unwrap(),
            Mode::Headless(None)
        );
        assert_eq!(
            parse_mode(args(&["--headless=2.5"])).unwrap(),
            Mode::Headless(Some(2.5))
        );
        assert!(parse_mode(args(&["--headless=soon"])).is_err());
        assert!(parse_mode(args(&["--headless=-1"])).is_err());
        assert!(parse_mode(args(&["--headless=inf"])).is_err());
        assert!(parse_mode(args(&["--headless=nan"])).is_err());
        assert_eq!(
            parse_mode(args(&["--headless=0"])).unwrap(),
            Mode::Headless(Some(0.0))
        );
        assert!(parse_mode(args(&["--fast"])).is_err());
    }

    #[tokio::test]
    async fn test_headless_run_stops_after_duration() {
        run_headless(AppConfig::default(), Some(0.05)).await.unwrap();
    }
}
