//! Top bar UI: app title, day, projection mode and status.

use super::colors::ui as ui_colors;
use crate::geo::ProjectionMode;
use crate::state::AppState;
use eframe::egui::{self, Color32, RichText};

pub fn render_top_bar(ctx: &egui::Context, state: &mut AppState) {
    egui::TopBottomPanel::top("top_bar")
        .exact_height(36.0)
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                // App title
                ui.label(
                    RichText::new("PinMap")
                        .strong()
                        .size(16.0)
                        .color(Color32::WHITE),
                );

                let day = state.day_label();
                if !day.is_empty() {
                    ui.label(RichText::new(day).size(13.0).color(ui_colors::ACTIVE));
                }

                ui.separator();

                for mode in ProjectionMode::all() {
                    let icon = match mode {
                        ProjectionMode::Flat => egui_phosphor::regular::MAP_TRIFOLD,
                        ProjectionMode::Sphere => egui_phosphor::regular::GLOBE_HEMISPHERE_WEST,
                    };
                    ui.selectable_value(
                        &mut state.mode,
                        *mode,
                        format!("{} {}", icon, mode.label()),
                    );
                }

                ui.separator();

                // Selected event, otherwise the status text
                match state.selected_summary() {
                    Some(summary) => {
                        ui.label(RichText::new(summary).size(13.0).color(Color32::WHITE));
                    }
                    None => {
                        ui.label(
                            RichText::new(&state.status_message)
                                .size(13.0)
                                .color(ui_colors::LABEL),
                        );
                    }
                }
            });
        });
}
