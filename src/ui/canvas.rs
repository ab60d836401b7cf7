//! Central canvas UI: base map, markers, tooltip and zoom controls.

use super::colors::{canvas, pins, tooltip, ui as ui_colors};
use crate::geo::{render_base_map, render_world_backdrop, GeoLayerSet};
use crate::map::{tooltip::position, MapView, MarkerLayout, MarkerRole};
use crate::state::AppState;
use eframe::egui::{
    self, Align2, Color32, FontId, Key, Modifiers, Painter, Pos2, Rect, RichText, Sense, Stroke,
    StrokeKind, Vec2,
};
use web_time::Instant;

const TOOLTIP_PADDING: Vec2 = Vec2::new(8.0, 6.0);
const TOOLTIP_WRAP_WIDTH: f32 = 260.0;
/// How far the pulsing ring grows beyond the marker radius.
const RING_GROWTH: f32 = 10.0;

/// Render the map canvas and feed input into the view.
pub fn render_canvas(
    ctx: &egui::Context,
    state: &mut AppState,
    view: &mut MapView,
    base_map: &GeoLayerSet,
) {
    egui::CentralPanel::default()
        .frame(egui::Frame::NONE.fill(canvas::BACKGROUND))
        .show(ctx, |ui| {
            let available_size = ui.available_size();

            // Allocate the full available space for the canvas
            let (response, painter) = ui.allocate_painter(available_size, Sense::click_and_drag());
            let rect = response.rect;
            let now = Instant::now();

            view.set_viewport(rect);
            handle_canvas_interaction(ui, &response, state, view);
            handle_keyboard(ui, state, view);
            view.sync_selection(state.selected.as_ref(), now);
            view.redraw(now);

            render_world_backdrop(&painter, view.projection(), view.camera());
            render_base_map(&painter, base_map, view.projection(), view.camera());
            draw_markers(&painter, view);
            draw_tooltip(&painter, view, rect);
            draw_pointer_location(&painter, view, rect);
            draw_controls(ui, rect, view, now);

            if view.is_animating(now) {
                ctx.request_repaint();
            }
        });
}

fn handle_canvas_interaction(
    ui: &egui::Ui,
    response: &egui::Response,
    state: &mut AppState,
    view: &mut MapView,
) {
    // Drag pans the flat map or rotates the globe
    if response.drag_started() {
        if let Some(pos) = response.interact_pointer_pos() {
            view.begin_drag(pos);
        }
    } else if response.dragged() {
        if let Some(pos) = response.interact_pointer_pos() {
            view.continue_drag(pos);
        }
    }
    if response.drag_stopped() {
        view.end_drag();
    }

    view.pointer_moved(response.hover_pos());

    if response.hovered() {
        let scroll_delta = ui.input(|i| i.raw_scroll_delta);
        view.scroll(scroll_delta.y, response.hover_pos());
    }

    if response.clicked() {
        if let Some(id) = response
            .interact_pointer_pos()
            .and_then(|pos| view.pointer_click(pos))
        {
            state.toggle_selection(id);
        }
    }
}

fn handle_keyboard(ui: &egui::Ui, state: &mut AppState, view: &mut MapView) {
    let (previous, next, activate, escape) = ui.input_mut(|i| {
        (
            i.consume_key(Modifiers::SHIFT, Key::Tab),
            i.consume_key(Modifiers::NONE, Key::Tab),
            i.consume_key(Modifiers::NONE, Key::Enter)
                || i.consume_key(Modifiers::NONE, Key::Space),
            i.consume_key(Modifiers::NONE, Key::Escape),
        )
    });

    if previous {
        view.focus_previous();
    } else if next {
        view.focus_next();
    }
    if activate {
        if let Some(id) = view.activate_focused() {
            state.toggle_selection(id);
        }
    }
    if escape {
        if state.selected.is_some() {
            state.selected = None;
        } else {
            view.clear_focus();
        }
    }
}

fn draw_markers(painter: &Painter, view: &MapView) {
    let focused = view.focused();
    let visible = || view.layouts().iter().filter(|l| l.visible);

    // Selected marker last so it sits on top of its neighbours
    for layout in visible().filter(|l| l.role != MarkerRole::Selected) {
        draw_marker(painter, layout, focused == Some(layout.index));
    }
    for layout in visible().filter(|l| l.role == MarkerRole::Selected) {
        draw_marker(painter, layout, focused == Some(layout.index));
    }
}

fn draw_marker(painter: &Painter, layout: &MarkerLayout, focused: bool) {
    let style = &layout.style;
    let alpha = style.opacity.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }

    if let Some(phase) = style.ring_phase {
        let ring_radius = style.radius + 3.0 + phase * RING_GROWTH;
        let ring_alpha = alpha * (1.0 - phase) * 0.8;
        painter.circle_stroke(
            layout.screen,
            ring_radius,
            Stroke::new(2.0, pins::RING.gamma_multiply(ring_alpha)),
        );
    }

    let fill = style.fill.gamma_multiply(alpha);
    painter.circle_filled(layout.screen, style.radius, fill);
    painter.circle_stroke(
        layout.screen,
        style.radius,
        Stroke::new(1.0, pins::STROKE.gamma_multiply(alpha)),
    );

    if focused {
        painter.circle_stroke(
            layout.screen,
            style.radius + 3.0,
            Stroke::new(1.5, pins::FOCUS),
        );
    }
}

fn draw_tooltip(painter: &Painter, view: &MapView, viewport: Rect) {
    let Some(tip) = view.tooltip() else {
        return;
    };

    let galley = painter.layout(
        tip.content.clone(),
        FontId::proportional(12.0),
        tooltip::TEXT,
        TOOLTIP_WRAP_WIDTH,
    );
    let size = galley.size() + TOOLTIP_PADDING * 2.0;
    let top_left = position(tip.anchor_screen, size, viewport);
    let frame = Rect::from_min_size(top_left, size);

    painter.rect_filled(frame, 4.0, tooltip::BACKGROUND);
    let border = Stroke::new(1.0, tooltip::BORDER);
    painter.rect_stroke(frame, 4.0, border, StrokeKind::Inside);
    painter.galley(top_left + TOOLTIP_PADDING, galley, tooltip::TEXT);
}

/// Lon/lat readout under the cursor, on projections that can invert.
fn draw_pointer_location(painter: &Painter, view: &MapView, rect: Rect) {
    let Some(point) = view.pointer_location() else {
        return;
    };
    let text = format!(
        "{:.2}° {}, {:.2}° {}",
        point.y.abs(),
        if point.y >= 0.0 { "N" } else { "S" },
        point.x.abs(),
        if point.x >= 0.0 { "E" } else { "W" }
    );
    painter.text(
        rect.left_bottom() + Vec2::new(10.0, -10.0),
        Align2::LEFT_BOTTOM,
        text,
        FontId::monospace(11.0),
        ui_colors::LABEL,
    );
}

fn draw_controls(ui: &mut egui::Ui, rect: Rect, view: &mut MapView, now: Instant) {
    let size = Vec2::new(36.0, 110.0);
    let controls_rect = Rect::from_min_size(
        Pos2::new(rect.right() - size.x - 10.0, rect.top() + 10.0),
        size,
    );
    let icon = |glyph: &str| RichText::new(glyph).size(18.0).color(Color32::WHITE);

    ui.scope_builder(egui::UiBuilder::new().max_rect(controls_rect), |ui| {
        ui.vertical(|ui| {
            let mut controls = view.controls(now);
            if ui
                .button(icon(egui_phosphor::regular::MAGNIFYING_GLASS_PLUS))
                .on_hover_text("Zoom in")
                .clicked()
            {
                controls.zoom_in();
            }
            if ui
                .button(icon(egui_phosphor::regular::MAGNIFYING_GLASS_MINUS))
                .on_hover_text("Zoom out")
                .clicked()
            {
                controls.zoom_out();
            }
            if ui
                .button(icon(egui_phosphor::regular::ARROW_COUNTER_CLOCKWISE))
                .on_hover_text("Reset view")
                .clicked()
            {
                controls.reset_view();
            }
        });
    });
}
