//! Render orchestration for one mounted map view.
//!
//! [`MapView`] owns the authoritative camera, the marker list and all derived
//! per-frame geometry. The host forwards input to it and calls
//! [`MapView::redraw`] once per frame before drawing.

use super::camera::{zoomed, CameraController, CameraState};
use super::easing::Easing;
use super::layout::{
    apply_roles, hit_test, layout_markers, EntranceAnimation, MarkerLayout, MarkerRole,
};
use super::selection::{SelectionMachine, SelectionPhase};
use super::tooltip::Tooltip;
use crate::data::{Marker, MarkerId};
use crate::geo::{MapProjection, Projection, ProjectionMode, WorldPoint};
use eframe::egui::{Pos2, Rect};
use web_time::{Duration, Instant};

/// Zoom factor applied by the zoom buttons.
pub const BUTTON_ZOOM_FACTOR: f64 = 1.5;
pub const BUTTON_ZOOM_DURATION: Duration = Duration::from_millis(250);
pub const RESET_DURATION: Duration = Duration::from_millis(750);
/// Wheel zoom rate per scroll point.
const WHEEL_ZOOM_RATE: f64 = 0.002;

pub struct MapView {
    projection: MapProjection,
    camera: CameraController,
    markers: Vec<Marker>,
    selection: SelectionMachine,
    /// Host selection the machine refused; not retried until it changes.
    rejected: Option<MarkerId>,
    /// Per-frame layout buffer, reused across redraws.
    layouts: Vec<MarkerLayout>,
    entrance: EntranceAnimation,
    mounted: Instant,
    reduced_motion: bool,
    pointer: Option<Pos2>,
    /// Marker index holding keyboard focus.
    focused: Option<usize>,
    tooltip: Option<Tooltip>,
}

impl MapView {
    pub fn new(mode: ProjectionMode, viewport: Rect, reduced_motion: bool, now: Instant) -> Self {
        Self {
            projection: MapProjection::for_mode(mode, viewport),
            camera: CameraController::for_mode(mode),
            markers: Vec::new(),
            selection: SelectionMachine::new(),
            rejected: None,
            layouts: Vec::new(),
            entrance: EntranceAnimation::new(now, reduced_motion),
            mounted: now,
            reduced_motion,
            pointer: None,
            focused: None,
            tooltip: None,
        }
    }

    pub fn mode(&self) -> ProjectionMode {
        self.projection.mode()
    }

    pub fn projection(&self) -> &MapProjection {
        &self.projection
    }

    pub fn camera(&self) -> &CameraState {
        self.camera.state()
    }

    /// Layouts computed by the last redraw.
    pub fn layouts(&self) -> &[MarkerLayout] {
        &self.layouts
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    #[allow(dead_code)]
    pub fn selection(&self) -> &SelectionMachine {
        &self.selection
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    pub fn viewport(&self) -> Rect {
        self.projection.viewport()
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        if viewport != self.projection.viewport() {
            self.projection = MapProjection::for_mode(self.mode(), viewport);
        }
    }

    /// Switches projection strategy. Rebuilds the camera and drops selection.
    pub fn set_mode(&mut self, mode: ProjectionMode) {
        if mode == self.mode() {
            return;
        }
        log::info!("Switching projection to {:?}", mode);
        self.projection = MapProjection::for_mode(mode, self.projection.viewport());
        self.camera.set_state(CameraState::default_for(mode));
        self.selection.reset();
        self.rejected = None;
        self.focused = None;
        self.tooltip = None;
    }

    /// Replaces the marker set wholesale and restarts the entrance fade.
    pub fn set_markers(&mut self, markers: Vec<Marker>, now: Instant) {
        log::info!("Loaded {} marker(s)", markers.len());
        self.markers = markers;
        self.entrance = EntranceAnimation::new(now, self.reduced_motion);
        self.selection.retain(&self.markers, &mut self.camera, now);
        self.rejected = None;
        self.focused = None;
        self.tooltip = None;
    }

    /// Applies the host's selection. `None` deselects.
    pub fn sync_selection(&mut self, selected: Option<&MarkerId>, now: Instant) {
        if selected == self.selection.selected() {
            self.rejected = None;
            return;
        }
        match selected {
            Some(id) if self.rejected.as_ref() == Some(id) => {}
            Some(id) => {
                self.selection
                    .select(id, &self.markers, &self.projection, &mut self.camera, now);
                self.rejected = (self.selection.selected() != Some(id)).then(|| id.clone());
            }
            None => {
                self.rejected = None;
                self.selection.deselect(&mut self.camera, now);
            }
        }
    }

    // ------------------------------------------------------------------
    // Gestures
    // ------------------------------------------------------------------

    pub fn begin_drag(&mut self, pointer: Pos2) {
        self.camera.begin_drag(pointer);
    }

    pub fn continue_drag(&mut self, pointer: Pos2) {
        self.camera.continue_drag(pointer);
    }

    pub fn end_drag(&mut self) {
        self.camera.end_drag();
    }

    pub fn is_dragging(&self) -> bool {
        self.camera.is_dragging()
    }

    pub fn zoom_by(&mut self, factor: f64, anchor: Option<Pos2>) {
        let viewport = self.projection.viewport();
        self.camera.zoom_by(factor, anchor, viewport);
    }

    /// Wheel zoom; positive `scroll_y` zooms in.
    pub fn scroll(&mut self, scroll_y: f32, anchor: Option<Pos2>) {
        if scroll_y != 0.0 {
            self.zoom_by((scroll_y as f64 * WHEEL_ZOOM_RATE).exp(), anchor);
        }
    }

    // ------------------------------------------------------------------
    // Pointer and keyboard
    // ------------------------------------------------------------------

    pub fn pointer_moved(&mut self, pointer: Option<Pos2>) {
        self.pointer = pointer;
    }

    /// World position under the pointer, where the projection can invert it.
    pub fn pointer_location(&self) -> Option<WorldPoint> {
        let pointer = self.pointer?;
        self.projection.unproject(pointer, self.camera.state())
    }

    /// Marker under `pointer` in the last redraw, if any.
    pub fn pointer_click(&self, pointer: Pos2) -> Option<MarkerId> {
        hit_test(&self.layouts, pointer)
            .and_then(|slot| self.markers.get(self.layouts[slot].index))
            .map(|m| m.id.clone())
    }

    pub fn focus_next(&mut self) {
        self.move_focus(true);
    }

    pub fn focus_previous(&mut self) {
        self.move_focus(false);
    }

    pub fn clear_focus(&mut self) {
        self.focused = None;
    }

    /// Id of the focused marker, for the host to act on.
    pub fn activate_focused(&self) -> Option<MarkerId> {
        let index = self.focused?;
        self.layouts
            .iter()
            .find(|l| l.index == index && l.visible)
            .and_then(|_| self.markers.get(index))
            .map(|m| m.id.clone())
    }

    fn move_focus(&mut self, forward: bool) {
        let visible: Vec<usize> = self
            .layouts
            .iter()
            .filter(|l| l.visible)
            .map(|l| l.index)
            .collect();
        if visible.is_empty() {
            self.focused = None;
            return;
        }
        let current = self
            .focused
            .and_then(|index| visible.iter().position(|&i| i == index));
        let next = match (current, forward) {
            (Some(pos), true) => (pos + 1) % visible.len(),
            (Some(pos), false) => (pos + visible.len() - 1) % visible.len(),
            (None, true) => 0,
            (None, false) => visible.len() - 1,
        };
        self.focused = Some(visible[next]);
    }

    // ------------------------------------------------------------------
    // Frame
    // ------------------------------------------------------------------

    /// Recomputes all derived geometry for the frame at `now`.
    pub fn redraw(&mut self, now: Instant) -> &[MarkerLayout] {
        self.camera.tick(now);

        layout_markers(
            &self.markers,
            &self.projection,
            self.camera.state(),
            &self.entrance,
            now,
            &mut self.layouts,
        );

        self.selection.tick(
            now,
            &self.markers,
            &self.layouts,
            &self.projection,
            self.camera.state(),
        );

        let elapsed = (!self.reduced_motion).then(|| now.saturating_duration_since(self.mounted));
        let selection = &self.selection;
        apply_roles(
            &mut self.layouts,
            &self.markers,
            |marker| selection.role_of(&marker.id),
            elapsed,
        );

        self.update_focus();
        self.update_tooltip();
        &self.layouts
    }

    /// Whether another frame is needed to finish a running animation.
    pub fn is_animating(&self, now: Instant) -> bool {
        let pulsing = !self.reduced_motion
            && self.selection.phase() == SelectionPhase::Highlighted
            && self.layouts.iter().any(|l| l.role == MarkerRole::Selected);
        self.camera.is_animating()
            || self.selection.is_animating()
            || self.entrance.is_running(self.markers.len(), now)
            || pulsing
    }

    pub fn controls(&mut self, now: Instant) -> MapControls<'_> {
        MapControls { view: self, now }
    }

    fn update_focus(&mut self) {
        if let Some(index) = self.focused {
            let still_visible = self.layouts.iter().any(|l| l.index == index && l.visible);
            if !still_visible {
                self.focused = None;
            }
        }
    }

    fn update_tooltip(&mut self) {
        let hovered = self
            .pointer
            .and_then(|pointer| hit_test(&self.layouts, pointer))
            .map(|slot| self.layouts[slot]);
        let focused = || {
            self.focused
                .and_then(|index| self.layouts.iter().find(|l| l.index == index && l.visible))
                .copied()
        };

        let Some(anchor) = hovered.or_else(focused) else {
            self.tooltip = None;
            return;
        };
        let Some(marker) = self.markers.get(anchor.index) else {
            self.tooltip = None;
            return;
        };

        match self.tooltip.as_mut() {
            Some(tooltip) if tooltip.anchor_index == anchor.index => {
                tooltip.anchor_screen = anchor.screen;
            }
            _ => {
                self.tooltip = Some(Tooltip {
                    anchor: marker.id.clone(),
                    anchor_index: anchor.index,
                    anchor_screen: anchor.screen,
                    content: marker.tooltip_text(),
                });
            }
        }
    }
}

/// Explicit zoom and reset commands for on-screen controls.
pub struct MapControls<'a> {
    view: &'a mut MapView,
    now: Instant,
}

impl MapControls<'_> {
    pub fn zoom_in(&mut self) {
        self.zoom(BUTTON_ZOOM_FACTOR);
    }

    pub fn zoom_out(&mut self) {
        self.zoom(1.0 / BUTTON_ZOOM_FACTOR);
    }

    /// Animates back to the mode's default camera.
    pub fn reset_view(&mut self) {
        let target = CameraState::default_for(self.view.mode());
        let duration = self.duration(RESET_DURATION);
        self.view
            .camera
            .animate_to(target, duration, Easing::CubicInOut, self.now);
    }

    fn zoom(&mut self, factor: f64) {
        let viewport = self.view.viewport();
        let target = zoomed(self.view.camera.state(), factor, None, viewport);
        let duration = self.duration(BUTTON_ZOOM_DURATION);
        self.view
            .camera
            .animate_to(target, duration, Easing::CubicOut, self.now);
    }

    fn duration(&self, duration: Duration) -> Duration {
        if self.view.reduced_motion {
            Duration::ZERO
        } else {
            duration
        }
    }
}

impl std::fmt::Debug for MapView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapView")
            .field("mode", &self.mode())
            .field("camera", self.camera.state())
            .field("markers", &self.markers.len())
            .field("selection", &self.selection.phase())
            .finish()
    }
}
