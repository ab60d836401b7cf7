//! Selection state machine.
//!
//! ```text
//! Idle ──select──► AnimatingIn ──750 ms──► Highlighted
//!  ▲                  │    ▲                   │
//!  │               deselect └──select(other)───┤
//!  │                  ▼                        │
//!  └──750 ms── AnimatingOut ◄────deselect──────┘
//! ```
//!
//! Selecting saves the camera (once per selection session) and flies to a
//! framing of the marker. The highlight is applied only when the flight
//! lands, using the marker positions of that frame.

use super::camera::{CameraController, CameraState, FlatCamera, SphereCamera};
use super::easing::Easing;
use super::layout::{MarkerLayout, MarkerRole};
use crate::data::{Marker, MarkerId};
use crate::geo::{MapProjection, Projection, ProjectionMode, WorldPoint};
use web_time::{Duration, Instant};

/// Duration of the fly-in and fly-out transitions.
pub const SELECT_DURATION: Duration = Duration::from_millis(750);
pub const SELECT_EASING: Easing = Easing::CubicInOut;
/// Flat camera scale when framing a marker.
pub const FLAT_SELECT_SCALE: f64 = 3.5;
/// Globe zoom relative to the baseline radius when framing a marker.
pub const SPHERE_SELECT_ZOOM: f64 = 1.4;
/// Screen distance under which two markers count as the same spot.
pub const COINCIDENCE_TOLERANCE: f32 = 1.0;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    #[default]
    Idle,
    AnimatingIn,
    Highlighted,
    AnimatingOut,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SelectionState {
    pub selected: Option<MarkerId>,
    /// Camera to return to on deselect.
    pub saved_camera: Option<CameraState>,
    pub phase: SelectionPhase,
    /// When the running phase ends.
    pub deadline: Option<Instant>,
    /// Marker drawn as selected; all others are dimmed while set.
    pub highlighted: Option<MarkerId>,
}

/// Camera that centers `point` at the selection zoom.
///
/// `None` when the point is malformed or the projection and camera disagree
/// on the mode.
pub fn framing_camera(
    point: WorldPoint,
    projection: &MapProjection,
    current: &CameraState,
) -> Option<CameraState> {
    projection.project(point, current)?;
    match (projection, current) {
        (MapProjection::Flat(flat), CameraState::Flat(_)) => {
            let offset = flat.base_offset(point)?;
            Some(CameraState::Flat(FlatCamera {
                translate_x: -FLAT_SELECT_SCALE * offset.x as f64,
                translate_y: -FLAT_SELECT_SCALE * offset.y as f64,
                scale: FLAT_SELECT_SCALE,
            }))
        }
        (MapProjection::Sphere(_), CameraState::Sphere(_)) => {
            Some(CameraState::Sphere(SphereCamera {
                lambda: -point.x,
                phi: -point.y,
                gamma: 0.0,
                scale: SPHERE_SELECT_ZOOM * ProjectionMode::Sphere.baseline_scale(),
            }))
        }
        _ => None,
    }
}

#[derive(Debug, Default, Clone)]
pub struct SelectionMachine {
    state: SelectionState,
}

impl SelectionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn phase(&self) -> SelectionPhase {
        self.state.phase
    }

    pub fn selected(&self) -> Option<&MarkerId> {
        self.state.selected.as_ref()
    }

    /// True while a transition is pending.
    pub fn is_animating(&self) -> bool {
        matches!(
            self.state.phase,
            SelectionPhase::AnimatingIn | SelectionPhase::AnimatingOut
        )
    }

    /// Starts flying to the marker `id`. Returns false when nothing changed.
    pub fn select(
        &mut self,
        id: &MarkerId,
        markers: &[Marker],
        projection: &MapProjection,
        camera: &mut CameraController,
        now: Instant,
    ) -> bool {
        let already_selected = self.state.selected.as_ref() == Some(id)
            && matches!(
                self.state.phase,
                SelectionPhase::AnimatingIn | SelectionPhase::Highlighted
            );
        if already_selected {
            return false;
        }

        let Some(marker) = markers.iter().find(|m| &m.id == id) else {
            log::debug!("Ignoring selection of unknown marker {}", id);
            return false;
        };
        let Some(target) = framing_camera(marker.position, projection, camera.state()) else {
            log::debug!("Ignoring selection of unprojectable marker {}", id);
            return false;
        };

        if self.state.saved_camera.is_none() {
            self.state.saved_camera = Some(*camera.state());
        }
        camera.animate_to(target, SELECT_DURATION, SELECT_EASING, now);

        log::info!(
            "Selecting marker {} ({:?} -> AnimatingIn)",
            id,
            self.state.phase
        );
        self.state.selected = Some(id.clone());
        self.state.highlighted = None;
        self.state.phase = SelectionPhase::AnimatingIn;
        self.state.deadline = Some(now + SELECT_DURATION);
        true
    }

    /// Flies back to the saved camera. Returns false when nothing was selected.
    pub fn deselect(&mut self, camera: &mut CameraController, now: Instant) -> bool {
        if !matches!(
            self.state.phase,
            SelectionPhase::AnimatingIn | SelectionPhase::Highlighted
        ) {
            return false;
        }
        if let Some(saved) = self.state.saved_camera {
            camera.animate_to(saved, SELECT_DURATION, SELECT_EASING, now);
        }
        log::info!(
            "Deselecting marker ({:?} -> AnimatingOut)",
            self.state.phase
        );
        self.state.selected = None;
        self.state.highlighted = None;
        self.state.phase = SelectionPhase::AnimatingOut;
        self.state.deadline = Some(now + SELECT_DURATION);
        true
    }

    /// Advances timed phases. Returns true when the phase changed.
    ///
    /// `layouts` must be the layouts of the current frame; they decide which
    /// marker is highlighted when several sit on the selected spot.
    pub fn tick(
        &mut self,
        now: Instant,
        markers: &[Marker],
        layouts: &[MarkerLayout],
        projection: &MapProjection,
        camera: &CameraState,
    ) -> bool {
        let due = self.state.deadline.is_some_and(|deadline| now >= deadline);
        if !due {
            return false;
        }
        match self.state.phase {
            SelectionPhase::AnimatingIn => {
                let highlighted = self
                    .state
                    .selected
                    .as_ref()
                    .map(|id| resolve_highlight(id, markers, layouts, projection, camera));
                log::debug!("Selection landed, highlighting {:?}", highlighted);
                self.state.highlighted = highlighted;
                self.state.phase = SelectionPhase::Highlighted;
                self.state.deadline = None;
                true
            }
            SelectionPhase::AnimatingOut => {
                self.state.phase = SelectionPhase::Idle;
                self.state.saved_camera = None;
                self.state.deadline = None;
                true
            }
            SelectionPhase::Idle | SelectionPhase::Highlighted => {
                self.state.deadline = None;
                false
            }
        }
    }

    /// Drops all selection state without animating.
    pub fn reset(&mut self) {
        self.state = SelectionState::default();
    }

    /// Remaps the highlight after the marker list changed; deselects when
    /// the selected marker is gone.
    pub fn retain(&mut self, markers: &[Marker], camera: &mut CameraController, now: Instant) {
        let Some(selected) = self.state.selected.clone() else {
            return;
        };
        if !markers.iter().any(|m| m.id == selected) {
            log::info!("Selected marker {} left the dataset", selected);
            self.deselect(camera, now);
            return;
        }
        if let Some(highlighted) = &self.state.highlighted {
            if !markers.iter().any(|m| &m.id == highlighted) {
                self.state.highlighted = Some(selected);
            }
        }
    }

    pub fn role_of(&self, id: &MarkerId) -> MarkerRole {
        match &self.state.highlighted {
            Some(highlighted) if highlighted == id => MarkerRole::Selected,
            Some(_) => MarkerRole::Dimmed,
            None => MarkerRole::Default,
        }
    }
}

/// Picks the marker to highlight: the first visible marker, in marker
/// order, drawn on the target's spot.
fn resolve_highlight(
    target: &MarkerId,
    markers: &[Marker],
    layouts: &[MarkerLayout],
    projection: &MapProjection,
    camera: &CameraState,
) -> MarkerId {
    let target_screen = markers
        .iter()
        .find(|m| &m.id == target)
        .and_then(|m| projection.project(m.position, camera));
    let Some(target_screen) = target_screen else {
        return target.clone();
    };

    layouts
        .iter()
        .filter(|l| l.visible && l.screen.distance(target_screen) <= COINCIDENCE_TOLERANCE)
        .find_map(|l| markers.get(l.index))
        .map_or_else(|| target.clone(), |m| m.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::layout::{layout_markers, EntranceAnimation};
    use eframe::egui::{Pos2, Rect, Vec2};

    fn viewport() -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(960.0, 500.0))
    }

    fn markers() -> Vec<Marker> {
        vec![
            Marker::new("paris", 2.35, 48.86),
            Marker::new("richmond", -77.43, 37.54),
            Marker::new("origin", 0.0, 0.0),
        ]
    }

    struct Fixture {
        markers: Vec<Marker>,
        projection: MapProjection,
        camera: CameraController,
        machine: SelectionMachine,
        layouts: Vec<MarkerLayout>,
        start: Instant,
    }

    impl Fixture {
        fn new(mode: ProjectionMode) -> Self {
            Self {
                markers: markers(),
                projection: MapProjection::for_mode(mode, viewport()),
                camera: CameraController::for_mode(mode),
                machine: SelectionMachine::new(),
                layouts: Vec::new(),
                start: Instant::now(),
            }
        }

        fn at(&self, ms: u64) -> Instant {
            self.start + Duration::from_millis(ms)
        }

        fn select(&mut self, id: &str, ms: u64) -> bool {
            let now = self.at(ms);
            self.machine.select(
                &MarkerId::from(id),
                &self.markers,
                &self.projection,
                &mut self.camera,
                now,
            )
        }

        fn deselect(&mut self, ms: u64) -> bool {
            let now = self.at(ms);
            self.machine.deselect(&mut self.camera, now)
        }

        fn frame(&mut self, ms: u64) {
            let now = self.at(ms);
            self.camera.tick(now);
            let entrance = EntranceAnimation::new(self.start, true);
            layout_markers(
                &self.markers,
                &self.projection,
                self.camera.state(),
                &entrance,
                now,
                &mut self.layouts,
            );
            self.machine.tick(
                now,
                &self.markers,
                &self.layouts,
                &self.projection,
                self.camera.state(),
            );
        }
    }

    #[test]
    fn test_sphere_select_flies_to_marker() {
        let mut f = Fixture::new(ProjectionMode::Sphere);
        assert!(f.select("paris", 0));
        assert_eq!(f.machine.phase(), SelectionPhase::AnimatingIn);
        assert!(f.machine.state().highlighted.is_none());

        f.frame(750);
        match f.camera.state() {
            CameraState::Sphere(c) => {
                assert!((c.lambda + 2.35).abs() < 1e-9);
                assert!((c.phi + 48.86).abs() < 1e-9);
                assert!((c.scale - 350.0).abs() < 1e-9);
            }
            CameraState::Flat(_) => panic!("expected sphere camera"),
        }
        assert_eq!(f.machine.phase(), SelectionPhase::Highlighted);
        assert_eq!(
            f.machine.role_of(&MarkerId::from("paris")),
            MarkerRole::Selected
        );
        assert_eq!(
            f.machine.role_of(&MarkerId::from("richmond")),
            MarkerRole::Dimmed
        );
    }

    #[test]
    fn test_flat_select_of_centered_marker() {
        let mut f = Fixture::new(ProjectionMode::Flat);
        assert!(f.select("origin", 0));
        f.frame(750);
        assert_eq!(
            *f.camera.state(),
            CameraState::Flat(FlatCamera {
                translate_x: 0.0,
                translate_y: 0.0,
                scale: 3.5,
            })
        );
        let origin = f.layouts.iter().find(|l| l.index == 2).unwrap();
        assert!((origin.screen.x - 480.0).abs() < 1e-3);
        assert!((origin.screen.y - 250.0).abs() < 1e-3);
    }

    #[test]
    fn test_flat_select_centers_marker() {
        let mut f = Fixture::new(ProjectionMode::Flat);
        assert!(f.select("richmond", 0));
        f.frame(750);
        let richmond = f.layouts.iter().find(|l| l.index == 1).unwrap();
        assert!((richmond.screen.x - 480.0).abs() < 1e-2);
        assert!((richmond.screen.y - 250.0).abs() < 1e-2);
    }

    #[test]
    fn test_select_same_id_is_idempotent() {
        let mut f = Fixture::new(ProjectionMode::Sphere);
        assert!(f.select("paris", 0));
        let before = f.machine.state().clone();
        let transition = *f.camera.transition().unwrap();
        assert!(!f.select("paris", 100));
        assert_eq!(*f.machine.state(), before);
        assert_eq!(f.camera.transition().unwrap().started, transition.started);

        f.frame(750);
        assert!(!f.select("paris", 800));
        assert_eq!(f.machine.phase(), SelectionPhase::Highlighted);
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let mut f = Fixture::new(ProjectionMode::Sphere);
        let camera = *f.camera.state();
        assert!(!f.select("atlantis", 0));
        assert_eq!(f.machine.phase(), SelectionPhase::Idle);
        assert_eq!(*f.camera.state(), camera);
        assert!(!f.camera.is_animating());
    }

    #[test]
    fn test_invalid_position_is_noop() {
        let mut f = Fixture::new(ProjectionMode::Flat);
        f.markers.push(Marker::new("broken", f64::NAN, 0.0));
        assert!(!f.select("broken", 0));
        assert_eq!(f.machine.phase(), SelectionPhase::Idle);
        assert!(f.machine.state().saved_camera.is_none());
    }

    #[test]
    fn test_deselect_before_completion_returns_to_saved_camera() {
        let mut f = Fixture::new(ProjectionMode::Sphere);
        let original = *f.camera.state();
        f.select("paris", 0);
        f.frame(300);
        assert!(f.deselect(300));
        assert_eq!(f.machine.phase(), SelectionPhase::AnimatingOut);
        assert_eq!(
            f.machine.role_of(&MarkerId::from("richmond")),
            MarkerRole::Default
        );

        f.frame(1050);
        assert_eq!(f.machine.phase(), SelectionPhase::Idle);
        assert_eq!(*f.camera.state(), original);
        assert!(f.machine.state().saved_camera.is_none());
    }

    #[test]
    fn test_switching_selection_keeps_saved_camera() {
        let mut f = Fixture::new(ProjectionMode::Sphere);
        let original = *f.camera.state();
        f.select("paris", 0);
        f.frame(750);
        assert!(f.select("richmond", 800));
        assert_eq!(f.machine.phase(), SelectionPhase::AnimatingIn);
        assert!(f.machine.state().highlighted.is_none());
        assert_eq!(f.machine.state().saved_camera, Some(original));

        f.frame(1550);
        assert_eq!(
            f.machine.role_of(&MarkerId::from("richmond")),
            MarkerRole::Selected
        );
        f.deselect(1600);
        f.frame(2350);
        assert_eq!(*f.camera.state(), original);
    }

    #[test]
    fn test_reselect_during_fly_out_keeps_first_saved_camera() {
        let mut f = Fixture::new(ProjectionMode::Flat);
        let original = *f.camera.state();
        f.select("paris", 0);
        f.frame(750);
        f.deselect(800);
        f.frame(900);
        assert!(f.select("richmond", 900));
        assert_eq!(f.machine.state().saved_camera, Some(original));
    }

    #[test]
    fn test_deselect_when_idle_is_noop() {
        let mut f = Fixture::new(ProjectionMode::Flat);
        assert!(!f.deselect(0));
        assert_eq!(f.machine.phase(), SelectionPhase::Idle);
    }

    #[test]
    fn test_coincident_marker_takes_highlight_in_order() {
        let mut f = Fixture::new(ProjectionMode::Flat);
        // Same spot, listed before the target.
        f.markers.insert(0, Marker::new("twin", -77.43, 37.54));
        f.select("richmond", 0);
        f.frame(750);
        assert_eq!(f.machine.selected(), Some(&MarkerId::from("richmond")));
        assert_eq!(
            f.machine.role_of(&MarkerId::from("twin")),
            MarkerRole::Selected
        );
        assert_eq!(
            f.machine.role_of(&MarkerId::from("richmond")),
            MarkerRole::Dimmed
        );
        assert_eq!(
            f.machine.role_of(&MarkerId::from("paris")),
            MarkerRole::Dimmed
        );
    }

    #[test]
    fn test_coincident_marker_after_target_stays_dimmed() {
        let mut f = Fixture::new(ProjectionMode::Flat);
        f.markers.push(Marker::new("twin", -77.43, 37.54));
        f.select("richmond", 0);
        f.frame(750);
        assert_eq!(
            f.machine.role_of(&MarkerId::from("richmond")),
            MarkerRole::Selected
        );
        assert_eq!(
            f.machine.role_of(&MarkerId::from("twin")),
            MarkerRole::Dimmed
        );
    }

    #[test]
    fn test_retain_deselects_missing_marker() {
        let mut f = Fixture::new(ProjectionMode::Flat);
        f.select("paris", 0);
        f.frame(750);
        f.markers.retain(|m| m.id.as_str() != "paris");
        let now = f.at(800);
        f.machine.retain(&f.markers, &mut f.camera, now);
        assert_eq!(f.machine.phase(), SelectionPhase::AnimatingOut);
        assert!(f.machine.selected().is_none());
    }
}
