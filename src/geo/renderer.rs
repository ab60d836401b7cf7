//! Base map rendering.
//!
//! Draws the world outline and re-projects every layer line through the
//! active projection each frame.

use super::layer::{GeoLayer, GeoLayerSet};
use super::projection::{MapProjection, Projection, WorldPoint};
use crate::map::CameraState;
use crate::ui::colors::canvas;
use eframe::egui::{Painter, Pos2, Rect, Shape, Stroke};
use geo_types::Coord;

/// Fills the ocean inside the world outline and strokes the outline.
pub fn render_world_backdrop(painter: &Painter, projection: &MapProjection, camera: &CameraState) {
    let stroke = Stroke::new(1.0, canvas::OUTLINE);
    match camera {
        CameraState::Sphere(sphere) => {
            let center = projection.viewport().center();
            let radius = sphere.scale as f32;
            painter.circle_filled(center, radius, canvas::OCEAN);
            painter.circle_stroke(center, radius, stroke);
        }
        CameraState::Flat(_) => {
            let outline = flat_outline(projection, camera);
            if outline.len() >= 3 {
                painter.add(Shape::convex_polygon(outline, canvas::OCEAN, stroke));
            }
        }
    }
}

/// The flat world ellipse: the east edge top to bottom, then the west edge back up.
fn flat_outline(projection: &MapProjection, camera: &CameraState) -> Vec<Pos2> {
    let east = (0..=90).map(|i| Coord {
        x: 180.0,
        y: 90.0 - i as f64 * 2.0,
    });
    let west = (0..=90).map(|i| Coord {
        x: -180.0,
        y: -90.0 + i as f64 * 2.0,
    });
    east.chain(west)
        .filter_map(|c| projection.project(c, camera))
        .collect()
}

/// Renders all visible base map layers, back to front.
pub fn render_base_map(
    painter: &Painter,
    layers: &GeoLayerSet,
    projection: &MapProjection,
    camera: &CameraState,
) {
    let clip = painter.clip_rect();
    for layer in layers.iter().filter(|l| l.visible) {
        render_layer(painter, layer, projection, camera, clip);
    }
}

fn render_layer(
    painter: &Painter,
    layer: &GeoLayer,
    projection: &MapProjection,
    camera: &CameraState,
    clip: Rect,
) {
    let width = layer.layer_type.default_line_width();
    let stroke = Stroke::new(width, layer.effective_color());
    // Longer jumps are wraps across the map edge, not real segments.
    let max_jump = projection.viewport().width().max(projection.viewport().height())
        * camera.normalized_scale() as f32
        * 0.5;

    for feature in &layer.features {
        for line in feature.lines() {
            render_line_string(painter, line, projection, camera, stroke, clip, max_jump);
        }
    }
}

/// Strokes a projected polyline, breaking it at back-face points.
fn render_line_string(
    painter: &Painter,
    coords: &[WorldPoint],
    projection: &MapProjection,
    camera: &CameraState,
    stroke: Stroke,
    clip: Rect,
    max_jump: f32,
) {
    if coords.len() < 2 {
        return;
    }

    let mut previous: Option<Pos2> = None;
    for coord in coords {
        let current = projection.project_clipped(*coord, camera);
        if let (Some(p1), Some(p2)) = (previous, current) {
            let dist_sq = p1.distance_sq(p2);
            // Skip sub-pixel segments and wraps
            if dist_sq > 0.5
                && dist_sq < max_jump * max_jump
                && clip.intersects(Rect::from_two_pos(p1, p2))
            {
                painter.line_segment([p1, p2], stroke);
            }
        }
        // Keep the last drawn endpoint so runs of tiny segments still accumulate.
        previous = match (previous, current) {
            (Some(p1), Some(p2)) if p1.distance_sq(p2) <= 0.5 => Some(p1),
            _ => current,
        };
    }
}
