//! Per-marker screen layout: position, visibility, counter-scale, entrance
//! fade and the style descriptor the drawing surface consumes.
//!
//! Layouts are rebuilt every redraw into a buffer owned by the view. Markers
//! whose position cannot be projected get no layout at all; markers on the
//! far side of the globe get one with `visible == false` and are excluded
//! from hit-testing, hover and focus.

use super::camera::CameraState;
use super::easing::Easing;
use crate::data::{Marker, MarkerVariant};
use crate::geo::{MapProjection, Projection};
use crate::ui::colors::pins;
use eframe::egui::{Color32, Pos2};
use web_time::{Duration, Instant};

pub const MARKER_RADIUS: f32 = 5.0;
pub const SELECTED_RADIUS: f32 = 8.0;
pub const DIMMED_OPACITY: f32 = 0.35;
/// Extra pointer tolerance around a marker's radius.
pub const HIT_SLOP: f32 = 4.0;
/// Period of the selected marker's pulsing ring.
pub const RING_PERIOD: Duration = Duration::from_millis(1600);

const ENTRANCE_STAGGER: Duration = Duration::from_millis(30);
const ENTRANCE_FADE: Duration = Duration::from_millis(400);

/// How the selection machine wants a marker drawn.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MarkerRole {
    #[default]
    Default,
    Selected,
    Dimmed,
}

/// Pure rendering descriptor for one marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub radius: f32,
    pub fill: Color32,
    /// Ring animation phase in [0, 1); `None` when no ring is drawn.
    pub ring_phase: Option<f32>,
    pub opacity: f32,
}

/// Derived geometry and style of one marker for the current redraw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerLayout {
    /// Index into the view's marker list.
    pub index: usize,
    pub screen: Pos2,
    pub visible: bool,
    /// Inverse of the camera zoom relative to the mode's baseline.
    pub counter_scale: f32,
    pub entrance_opacity: f32,
    pub role: MarkerRole,
    pub style: MarkerStyle,
}

/// Staggered fade-in of a freshly loaded marker set.
#[derive(Debug, Clone, Copy)]
pub struct EntranceAnimation {
    started: Instant,
    enabled: bool,
}

impl EntranceAnimation {
    pub fn new(started: Instant, reduced_motion: bool) -> Self {
        Self {
            started,
            enabled: !reduced_motion,
        }
    }

    /// Opacity of the marker at `index`, ramping after a per-index delay.
    pub fn opacity(&self, index: usize, now: Instant) -> f32 {
        if !self.enabled {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        let Some(into_fade) = elapsed.checked_sub(stagger_delay(index)) else {
            return 0.0;
        };
        let t = into_fade.as_secs_f64() / ENTRANCE_FADE.as_secs_f64();
        Easing::CubicOut.apply(t) as f32
    }

    /// Whether any marker among the first `count` is still fading in.
    pub fn is_running(&self, count: usize, now: Instant) -> bool {
        if !self.enabled || count == 0 {
            return false;
        }
        let last_start = stagger_delay(count.saturating_sub(1));
        now.saturating_duration_since(self.started) < last_start + ENTRANCE_FADE
    }
}

fn stagger_delay(index: usize) -> Duration {
    let index = u32::try_from(index).unwrap_or(u32::MAX);
    ENTRANCE_STAGGER.saturating_mul(index)
}

/// Recomputes geometry for every marker into `out`, reusing its allocation.
///
/// Roles are reset to [`MarkerRole::Default`]; call [`apply_roles`] after.
pub fn layout_markers(
    markers: &[Marker],
    projection: &MapProjection,
    camera: &CameraState,
    entrance: &EntranceAnimation,
    now: Instant,
    out: &mut Vec<MarkerLayout>,
) {
    out.clear();
    let counter_scale = (1.0 / camera.normalized_scale()) as f32;

    for (index, marker) in markers.iter().enumerate() {
        let Some(screen) = projection.project(marker.position, camera) else {
            continue;
        };
        let entrance_opacity = entrance.opacity(index, now);
        out.push(MarkerLayout {
            index,
            screen,
            visible: projection.is_front_facing(marker.position, camera),
            counter_scale,
            entrance_opacity,
            role: MarkerRole::Default,
            style: style_for(marker.variant, MarkerRole::Default, entrance_opacity, None),
        });
    }
}

/// Assigns each layout its role and rebuilds its style.
///
/// `elapsed` drives the ring pulse; `None` draws a static ring.
pub fn apply_roles(
    layouts: &mut [MarkerLayout],
    markers: &[Marker],
    role_of: impl Fn(&Marker) -> MarkerRole,
    elapsed: Option<Duration>,
) {
    for layout in layouts.iter_mut() {
        let Some(marker) = markers.get(layout.index) else {
            continue;
        };
        layout.role = role_of(marker);
        layout.style = style_for(
            marker.variant,
            layout.role,
            layout.entrance_opacity,
            elapsed,
        );
    }
}

/// Style descriptor for a marker.
pub fn style_for(
    variant: MarkerVariant,
    role: MarkerRole,
    entrance_opacity: f32,
    elapsed: Option<Duration>,
) -> MarkerStyle {
    let variant_fill = match variant {
        MarkerVariant::Primary => pins::PRIMARY,
        MarkerVariant::Secondary => pins::SECONDARY,
    };
    match role {
        MarkerRole::Default => MarkerStyle {
            radius: MARKER_RADIUS,
            fill: variant_fill,
            ring_phase: None,
            opacity: entrance_opacity,
        },
        MarkerRole::Selected => MarkerStyle {
            radius: SELECTED_RADIUS,
            fill: pins::SELECTED,
            ring_phase: Some(elapsed.map_or(0.0, ring_phase)),
            opacity: entrance_opacity,
        },
        MarkerRole::Dimmed => MarkerStyle {
            radius: MARKER_RADIUS,
            fill: variant_fill,
            ring_phase: None,
            opacity: entrance_opacity * DIMMED_OPACITY,
        },
    }
}

/// Phase of the pulsing ring, `(t mod period) / period`.
pub fn ring_phase(elapsed: Duration) -> f32 {
    let period = RING_PERIOD.as_secs_f64();
    (elapsed.as_secs_f64().rem_euclid(period) / period) as f32
}

/// Nearest visible marker within its radius plus [`HIT_SLOP`] of `pointer`.
///
/// Returns the position in `layouts`.
pub fn hit_test(layouts: &[MarkerLayout], pointer: Pos2) -> Option<usize> {
    layouts
        .iter()
        .enumerate()
        .filter(|(_, l)| l.visible)
        .map(|(slot, l)| (slot, l.screen.distance(pointer), l.style.radius + HIT_SLOP))
        .filter(|(_, distance, reach)| distance <= reach)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(slot, _, _)| slot)
}
