#![warn(clippy::all)]

//! PinMap - An interactive map of historical events.
//!
//! Events for one calendar day are drawn as pins on a flat world map or a
//! rotating globe. Hovering previews an event, selecting one flies the
//! camera to it and highlights it among its dimmed peers.

mod data;
mod geo;
mod map;
mod state;
mod ui;

use eframe::egui;
use geo::{GeoLayerSet, GeoLayerType};
use map::MapView;
use state::{AppState, MapSettings};
use web_time::Instant;

// Native entry point
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    env_logger::init();

    let native_options = eframe::NativeOptions::default();

    eframe::run_native(
        "PinMap",
        native_options,
        Box::new(|cc| Ok(Box::new(PinMapApp::new(cc)))),
    )
}

// WASM entry point - main is not called on wasm32
#[cfg(target_arch = "wasm32")]
fn main() {}

/// Entry point for the WASM application.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub async fn start() {
    use eframe::wasm_bindgen::JsCast as _;

    // Redirect `log` messages to `console.log`:
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document to mount into");
            return;
        };

        let Some(canvas) = document
            .get_element_by_id("app_canvas")
            .and_then(|e| e.dyn_into::<web_sys::HtmlCanvasElement>().ok())
        else {
            log::error!("app_canvas is missing or not a canvas element");
            return;
        };

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(PinMapApp::new(cc)))),
            )
            .await;

        // Remove the loading text once the app has loaded:
        if let Some(loading_text) = document.get_element_by_id("loading_text") {
            match start_result {
                Ok(_) => {
                    loading_text.remove();
                }
                Err(e) => {
                    loading_text.set_inner_html(
                        "<p>The app has crashed. See the developer console for details.</p>",
                    );
                    log::error!("Failed to start eframe: {e:?}");
                }
            }
        }
    });
}

/// Main application state and logic.
pub struct PinMapApp {
    /// Host state: selection, mode and status
    state: AppState,

    /// Camera, markers and per-frame layout
    view: MapView,

    /// Base map outlines drawn under the markers
    base_map: GeoLayerSet,
}

impl PinMapApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        install_fonts(&cc.egui_ctx);

        let settings = MapSettings::load();
        log::info!(
            "Starting in {:?} mode (reduced motion: {})",
            settings.mode,
            settings.reduced_motion
        );

        let now = Instant::now();
        // Replaced by the canvas rect on the first frame
        let viewport = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(1024.0, 640.0));
        let mut view = MapView::new(settings.mode, viewport, settings.reduced_motion, now);
        let mut state = AppState::new(settings);

        match data::load_events(state.settings.events_path.as_deref()) {
            Ok(dataset) => {
                let markers = dataset.to_markers();
                state.status_message = format!("{} event(s)", markers.len());
                view.set_markers(markers, now);
                state.dataset = Some(dataset);
            }
            Err(e) => {
                log::error!("{}", e);
                state.status_message = "No events loaded".to_string();
            }
        }

        let base_map = load_base_map(&state.settings);

        // Restore a shared selection
        let url = state::url_state::parse_from_url();
        state.selected = url.event.map(data::MarkerId::new);

        Self {
            state,
            view,
            base_map,
        }
    }
}

/// Registers the icon font used by the map controls.
fn install_fonts(ctx: &egui::Context) {
    let mut fonts = egui::FontDefinitions::default();
    egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
    ctx.set_fonts(fonts);
}

#[cfg(not(target_arch = "wasm32"))]
fn load_base_map(settings: &MapSettings) -> GeoLayerSet {
    let mut layers = GeoLayerSet::new();
    let sources = [
        (GeoLayerType::Land, settings.land_path.as_deref()),
        (GeoLayerType::Borders, settings.borders_path.as_deref()),
    ];
    for (layer_type, path) in sources {
        let Some(path) = path else {
            continue;
        };
        if let Err(e) = layers.load_layer_from_path(layer_type, path) {
            log::warn!("Skipping {:?} layer: {}", layer_type, e);
        }
    }
    layers
}

#[cfg(target_arch = "wasm32")]
fn load_base_map(_settings: &MapSettings) -> GeoLayerSet {
    GeoLayerSet::new()
}

impl eframe::App for PinMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let previous_mode = self.state.mode;
        let previous_selection = self.state.selected.clone();

        ui::render_top_bar(ctx, &mut self.state);

        // Switching projection rebuilds the camera and clears the selection
        if self.state.mode != self.view.mode() {
            self.view.set_mode(self.state.mode);
            self.state.selected = None;
        }

        ui::render_canvas(ctx, &mut self.state, &mut self.view, &self.base_map);

        if self.state.mode != previous_mode || self.state.selected != previous_selection {
            if let Some(id) = &self.state.selected {
                log::debug!("Selected event {}", id);
            }
            state::url_state::push_to_url(
                self.state.mode,
                self.state.selected.as_ref().map(|id| id.as_str()),
            );
        }
    }
}
