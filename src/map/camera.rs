//! Camera state and the gesture/animation controller that mutates it.
//!
//! The camera is a single owned value. Gestures and transitions replace it
//! wholesale and every new value passes through [`CameraState::clamped`], so
//! scale never leaves the mode's bounds, not even on intermediate frames.

use super::easing::{lerp, Easing};
use crate::geo::{wrap_longitude, ProjectionMode};
use eframe::egui::{Pos2, Rect, Vec2};
use web_time::{Duration, Instant};

/// Degrees of rotation per pixel of pointer movement on the globe.
pub const DRAG_SENSITIVITY: f64 = 0.4;

/// Rotation the globe starts at: North America roughly centered.
const DEFAULT_LAMBDA: f64 = 102.0;
const DEFAULT_PHI: f64 = -23.0;

/// Pan and zoom of the flat map. `scale` is a zoom multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatCamera {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl Default for FlatCamera {
    fn default() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            scale: ProjectionMode::Flat.baseline_scale(),
        }
    }
}

/// Rotation and radius of the globe, angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereCamera {
    pub lambda: f64,
    pub phi: f64,
    pub gamma: f64,
    /// Globe radius in pixels.
    pub scale: f64,
}

impl Default for SphereCamera {
    fn default() -> Self {
        Self {
            lambda: DEFAULT_LAMBDA,
            phi: DEFAULT_PHI,
            gamma: 0.0,
            scale: ProjectionMode::Sphere.baseline_scale(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraState {
    Flat(FlatCamera),
    Sphere(SphereCamera),
}

impl CameraState {
    /// The camera a freshly mounted view of `mode` starts with.
    pub fn default_for(mode: ProjectionMode) -> Self {
        match mode {
            ProjectionMode::Flat => CameraState::Flat(FlatCamera::default()),
            ProjectionMode::Sphere => CameraState::Sphere(SphereCamera::default()),
        }
    }

    pub fn mode(&self) -> ProjectionMode {
        match self {
            CameraState::Flat(_) => ProjectionMode::Flat,
            CameraState::Sphere(_) => ProjectionMode::Sphere,
        }
    }

    pub fn scale(&self) -> f64 {
        match self {
            CameraState::Flat(c) => c.scale,
            CameraState::Sphere(c) => c.scale,
        }
    }

    /// Scale relative to the mode's baseline (1.0 at the default zoom).
    pub fn normalized_scale(&self) -> f64 {
        self.scale() / self.mode().baseline_scale()
    }

    /// Copy with scale and latitude rotation forced into range.
    pub fn clamped(self) -> Self {
        let mode = self.mode();
        match self {
            CameraState::Flat(mut c) => {
                c.scale = mode.clamp_scale(c.scale);
                CameraState::Flat(c)
            }
            CameraState::Sphere(mut c) => {
                c.scale = mode.clamp_scale(c.scale);
                c.phi = if c.phi.is_nan() {
                    0.0
                } else {
                    c.phi.clamp(-90.0, 90.0)
                };
                CameraState::Sphere(c)
            }
        }
    }

    /// Field-wise linear interpolation. Cameras of different modes snap to `to`.
    pub fn lerp(&self, to: &CameraState, t: f64) -> CameraState {
        let mixed = match (self, to) {
            (Self::Flat(a), Self::Flat(b)) => Self::Flat(FlatCamera {
                translate_x: lerp(a.translate_x, b.translate_x, t),
                translate_y: lerp(a.translate_y, b.translate_y, t),
                scale: lerp(a.scale, b.scale, t),
            }),
            (Self::Sphere(a), Self::Sphere(b)) => Self::Sphere(SphereCamera {
                lambda: lerp(a.lambda, b.lambda, t),
                phi: lerp(a.phi, b.phi, t),
                gamma: lerp(a.gamma, b.gamma, t),
                scale: lerp(a.scale, b.scale, t),
            }),
            _ => *to,
        };
        mixed.clamped()
    }
}

/// Returns `state` zoomed by `factor`.
///
/// On the flat map the screen point `anchor` keeps the world point beneath
/// it; without an anchor, or on the globe, zoom is about the viewport center.
pub fn zoomed(
    state: &CameraState,
    factor: f64,
    anchor: Option<Pos2>,
    viewport: Rect,
) -> CameraState {
    if !factor.is_finite() || factor <= 0.0 {
        return *state;
    }
    match *state {
        CameraState::Flat(c) => {
            let scale = ProjectionMode::Flat.clamp_scale(c.scale * factor);
            let ratio = scale / c.scale;
            let rel = anchor.map_or(Vec2::ZERO, |a| a - viewport.center());
            CameraState::Flat(FlatCamera {
                translate_x: rel.x as f64 * (1.0 - ratio) + c.translate_x * ratio,
                translate_y: rel.y as f64 * (1.0 - ratio) + c.translate_y * ratio,
                scale,
            })
        }
        CameraState::Sphere(mut c) => {
            c.scale *= factor;
            CameraState::Sphere(c).clamped()
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct DragGesture {
    origin: Pos2,
    last: Pos2,
    base: CameraState,
}

/// A timed camera interpolation sampled by [`CameraController::tick`].
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub from: CameraState,
    pub to: CameraState,
    pub started: Instant,
    pub duration: Duration,
    pub easing: Easing,
}

impl Transition {
    /// Linear progress in [0, 1] at `now`.
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started).as_secs_f64();
        (elapsed / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn sample(&self, now: Instant) -> CameraState {
        let t = self.easing.apply(self.progress(now));
        self.from.lerp(&self.to, t)
    }
}

/// Owns the camera of one view and interprets gestures and transitions.
#[derive(Debug, Clone)]
pub struct CameraController {
    state: CameraState,
    drag: Option<DragGesture>,
    transition: Option<Transition>,
}

impl CameraController {
    pub fn new(state: CameraState) -> Self {
        Self {
            state: state.clamped(),
            drag: None,
            transition: None,
        }
    }

    pub fn for_mode(mode: ProjectionMode) -> Self {
        Self::new(CameraState::default_for(mode))
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    /// Replaces the camera outright, dropping any gesture or transition.
    pub fn set_state(&mut self, state: CameraState) {
        self.state = state.clamped();
        self.drag = None;
        self.transition = None;
    }

    pub fn begin_drag(&mut self, pointer: Pos2) {
        self.transition = None;
        self.drag = Some(DragGesture {
            origin: pointer,
            last: pointer,
            base: self.state,
        });
    }

    /// Recomputes the camera from the drag base and the total pointer delta.
    pub fn continue_drag(&mut self, pointer: Pos2) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        drag.last = pointer;
        let drag = *drag;
        let delta = pointer - drag.origin;
        let (dx, dy) = (delta.x as f64, delta.y as f64);
        let next = match drag.base {
            CameraState::Flat(c) => CameraState::Flat(FlatCamera {
                translate_x: c.translate_x + dx,
                translate_y: c.translate_y + dy,
                scale: c.scale,
            }),
            CameraState::Sphere(c) => CameraState::Sphere(SphereCamera {
                lambda: wrap_longitude(c.lambda + dx * DRAG_SENSITIVITY),
                phi: c.phi - dy * DRAG_SENSITIVITY,
                ..c
            }),
        };
        self.state = next.clamped();
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Multiplies the scale by `factor`, keeping `anchor` fixed on the flat map.
    pub fn zoom_by(&mut self, factor: f64, anchor: Option<Pos2>, viewport: Rect) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.transition = None;
        self.state = zoomed(&self.state, factor, anchor, viewport);
        if let Some(drag) = self.drag.as_mut() {
            // Rebase an in-flight drag on the zoomed camera.
            drag.base = self.state;
            drag.origin = drag.last;
        }
    }

    /// Starts a transition from the current camera to `target`.
    ///
    /// Supersedes any running transition. A zero duration, or a target of
    /// another mode, snaps immediately.
    pub fn animate_to(
        &mut self,
        target: CameraState,
        duration: Duration,
        easing: Easing,
        now: Instant,
    ) {
        let target = target.clamped();
        self.drag = None;
        if duration.is_zero() || target.mode() != self.state.mode() {
            self.state = target;
            self.transition = None;
            return;
        }
        self.transition = Some(Transition {
            from: self.state,
            to: target,
            started: now,
            duration,
            easing,
        });
    }

    /// Samples the running transition. Returns true while one is still in flight.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(transition) = self.transition else {
            return false;
        };
        if transition.progress(now) >= 1.0 {
            self.state = transition.to;
            self.transition = None;
            false
        } else {
            self.state = transition.sample(now);
            true
        }
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    #[allow(dead_code)]
    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }
}
