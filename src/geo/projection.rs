//! Map projection and coordinate transformation.
//!
//! Converts geographic coordinates (lon/lat) to screen coordinates for the
//! canvas. Two strategies sit behind the [`Projection`] trait: a flat
//! Mollweide world map and an orthographic globe. [`MapProjection`] picks
//! between them so callers never branch on the active mode.

use crate::map::{CameraState, FlatCamera, SphereCamera};
use eframe::egui::{Pos2, Rect, Vec2};
use geo_types::Coord;
use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, SQRT_2};

/// A longitude/latitude pair in degrees (`x` = longitude, `y` = latitude).
pub type WorldPoint = Coord<f64>;

/// Fraction of the viewport the flat world ellipse fills at scale 1.
const FLAT_FIT: f64 = 0.95;

/// Which projection strategy a view uses.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionMode {
    /// Elliptical whole-world map.
    #[default]
    Flat,
    /// Rotating orthographic globe.
    Sphere,
}

impl ProjectionMode {
    pub fn label(&self) -> &'static str {
        match self {
            ProjectionMode::Flat => "Map",
            ProjectionMode::Sphere => "Globe",
        }
    }

    pub fn all() -> &'static [ProjectionMode] {
        &[ProjectionMode::Flat, ProjectionMode::Sphere]
    }

    /// Inclusive `(min, max)` camera scale for this mode.
    ///
    /// Flat scale is a zoom multiplier; sphere scale is the globe radius in pixels.
    pub fn scale_bounds(&self) -> (f64, f64) {
        match self {
            ProjectionMode::Flat => (1.0, 8.0),
            ProjectionMode::Sphere => (140.0, 1400.0),
        }
    }

    /// Camera scale at which markers are drawn at their nominal size.
    pub fn baseline_scale(&self) -> f64 {
        match self {
            ProjectionMode::Flat => 1.0,
            ProjectionMode::Sphere => 250.0,
        }
    }

    /// Clamps a scale into this mode's bounds. NaN collapses to the minimum.
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        let (min, max) = self.scale_bounds();
        if scale.is_nan() {
            min
        } else {
            scale.clamp(min, max)
        }
    }
}

/// Uniform interface over the projection strategies.
pub trait Projection {
    /// Projects a world point to the screen, or `None` when the point is
    /// malformed or the camera belongs to the other mode.
    fn project(&self, point: WorldPoint, camera: &CameraState) -> Option<Pos2>;

    /// Inverse of [`Projection::project`], where the strategy defines one.
    fn unproject(&self, screen: Pos2, camera: &CameraState) -> Option<WorldPoint>;

    /// Whether the point lies on the visible side of the projection.
    fn is_front_facing(&self, point: WorldPoint, camera: &CameraState) -> bool;

    /// Like [`Projection::project`] but also rejects back-face points.
    fn project_clipped(&self, point: WorldPoint, camera: &CameraState) -> Option<Pos2> {
        if self.is_front_facing(point, camera) {
            self.project(point, camera)
        } else {
            None
        }
    }
}

/// Returns true if the coordinate is finite and within lon/lat range.
pub fn is_valid_world_point(point: WorldPoint) -> bool {
    point.x.is_finite()
        && point.y.is_finite()
        && (-180.0..=180.0).contains(&point.x)
        && (-90.0..=90.0).contains(&point.y)
}

/// Wraps a longitude into [-180, 180).
pub fn wrap_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Great-circle angle between two world points, in radians (haversine).
pub fn angular_distance(a: WorldPoint, b: WorldPoint) -> f64 {
    let (lat_a, lat_b) = (a.y.to_radians(), b.y.to_radians());
    let d_lat = lat_b - lat_a;
    let d_lon = (b.x - a.x).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * h.sqrt().clamp(0.0, 1.0).asin()
}

// ============================================================================
// Flat strategy (Mollweide)
// ============================================================================

/// Equal-area elliptical world projection with a camera affine on top.
///
/// The raw projection is fitted to the viewport once; the camera then maps
/// `screen = center + translate + scale * (base - center)`.
#[derive(Debug, Clone)]
pub struct FlatProjection {
    viewport: Rect,
    /// Pixels per raw projection unit at camera scale 1.
    base_scale: f64,
}

impl FlatProjection {
    pub fn new(viewport: Rect) -> Self {
        let width = viewport.width() as f64;
        let height = viewport.height() as f64;
        let base_scale = (width / (4.0 * SQRT_2)).min(height / (2.0 * SQRT_2)) * FLAT_FIT;
        Self {
            viewport,
            base_scale: base_scale.max(f64::EPSILON),
        }
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Offset of a point from the viewport center at the identity camera.
    pub fn base_offset(&self, point: WorldPoint) -> Option<Vec2> {
        if !is_valid_world_point(point) {
            return None;
        }
        let (x, y) = mollweide(point.x.to_radians(), point.y.to_radians());
        Some(Vec2::new(
            (x * self.base_scale) as f32,
            (-y * self.base_scale) as f32,
        ))
    }

    fn project_flat(&self, point: WorldPoint, camera: &FlatCamera) -> Option<Pos2> {
        if !is_valid_world_point(point) {
            return None;
        }
        let (x, y) = mollweide(point.x.to_radians(), point.y.to_radians());
        let center = self.viewport.center();
        let k = camera.scale * self.base_scale;
        Some(Pos2::new(
            (center.x as f64 + camera.translate_x + k * x) as f32,
            (center.y as f64 + camera.translate_y - k * y) as f32,
        ))
    }

    fn unproject_flat(&self, screen: Pos2, camera: &FlatCamera) -> Option<WorldPoint> {
        let center = self.viewport.center();
        let k = camera.scale * self.base_scale;
        let x = (screen.x as f64 - center.x as f64 - camera.translate_x) / k;
        let y = -(screen.y as f64 - center.y as f64 - camera.translate_y) / k;
        let (lon, lat) = mollweide_inverse(x, y)?;
        Some(Coord {
            x: lon.to_degrees(),
            y: lat.to_degrees(),
        })
    }
}

/// Solves `2θ + sin 2θ = π sin φ` for the auxiliary angle θ.
fn mollweide_theta(lat: f64) -> f64 {
    if lat.abs() >= FRAC_PI_2 - 1e-12 {
        return lat.signum() * FRAC_PI_2;
    }
    let target = PI * lat.sin();
    let mut two_theta = lat;
    for _ in 0..30 {
        let delta = (two_theta + two_theta.sin() - target) / (1.0 + two_theta.cos());
        two_theta -= delta;
        if delta.abs() < 1e-12 {
            break;
        }
    }
    two_theta / 2.0
}

fn mollweide(lon: f64, lat: f64) -> (f64, f64) {
    let theta = mollweide_theta(lat);
    (2.0 * SQRT_2 / PI * lon * theta.cos(), SQRT_2 * theta.sin())
}

fn mollweide_inverse(x: f64, y: f64) -> Option<(f64, f64)> {
    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    let sin_theta = y / SQRT_2;
    if sin_theta.abs() > 1.0 {
        return None;
    }
    let theta = sin_theta.asin();
    let cos_theta = theta.cos();
    let lon = if cos_theta.abs() < 1e-12 {
        0.0
    } else {
        PI * x / (2.0 * SQRT_2 * cos_theta)
    };
    if lon.abs() > PI + 1e-9 {
        return None;
    }
    let sin_lat = (2.0 * theta + (2.0 * theta).sin()) / PI;
    let lat = sin_lat.clamp(-1.0, 1.0).asin();
    Some((lon.clamp(-PI, PI), lat))
}

impl Projection for FlatProjection {
    fn project(&self, point: WorldPoint, camera: &CameraState) -> Option<Pos2> {
        match camera {
            CameraState::Flat(flat) => self.project_flat(point, flat),
            CameraState::Sphere(_) => None,
        }
    }

    fn unproject(&self, screen: Pos2, camera: &CameraState) -> Option<WorldPoint> {
        match camera {
            CameraState::Flat(flat) => self.unproject_flat(screen, flat),
            CameraState::Sphere(_) => None,
        }
    }

    fn is_front_facing(&self, _point: WorldPoint, _camera: &CameraState) -> bool {
        true
    }
}

// ============================================================================
// Sphere strategy (orthographic)
// ============================================================================

/// Orthographic globe parameterized by a `[lambda, phi, gamma]` rotation.
///
/// Rotation follows the usual web-mapping convention: the point facing the
/// viewer is `(-lambda, -phi)`.
#[derive(Debug, Clone)]
pub struct OrthographicProjection {
    viewport: Rect,
}

impl OrthographicProjection {
    pub fn new(viewport: Rect) -> Self {
        Self { viewport }
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// The world point at the center of the visible hemisphere.
    pub fn sub_point(camera: &SphereCamera) -> WorldPoint {
        Coord {
            x: wrap_longitude(-camera.lambda),
            y: -camera.phi,
        }
    }

    fn rotation(camera: &SphereCamera) -> DMat3 {
        DMat3::from_rotation_x(camera.gamma.to_radians())
            * DMat3::from_rotation_y(-camera.phi.to_radians())
            * DMat3::from_rotation_z(camera.lambda.to_radians())
    }

    fn project_sphere(&self, point: WorldPoint, camera: &SphereCamera) -> Option<Pos2> {
        if !is_valid_world_point(point) {
            return None;
        }
        let rotated = Self::rotation(camera) * lonlat_to_vec3(point);
        let center = self.viewport.center();
        Some(Pos2::new(
            (center.x as f64 + camera.scale * rotated.y) as f32,
            (center.y as f64 - camera.scale * rotated.z) as f32,
        ))
    }
}

impl Projection for OrthographicProjection {
    fn project(&self, point: WorldPoint, camera: &CameraState) -> Option<Pos2> {
        match camera {
            CameraState::Sphere(sphere) => self.project_sphere(point, sphere),
            CameraState::Flat(_) => None,
        }
    }

    fn unproject(&self, _screen: Pos2, _camera: &CameraState) -> Option<WorldPoint> {
        None
    }

    fn is_front_facing(&self, point: WorldPoint, camera: &CameraState) -> bool {
        match camera {
            CameraState::Sphere(sphere) => {
                is_valid_world_point(point)
                    && angular_distance(point, Self::sub_point(sphere)) < FRAC_PI_2
            }
            CameraState::Flat(_) => true,
        }
    }
}

/// Converts lon/lat (degrees) to a unit sphere vector.
#[inline]
pub fn lonlat_to_vec3(point: WorldPoint) -> DVec3 {
    let lon = point.x.to_radians();
    let lat = point.y.to_radians();
    DVec3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
}

// ============================================================================
// Strategy dispatch
// ============================================================================

/// The projection strategy of one mounted view.
#[derive(Debug, Clone)]
pub enum MapProjection {
    Flat(FlatProjection),
    Sphere(OrthographicProjection),
}

impl MapProjection {
    pub fn for_mode(mode: ProjectionMode, viewport: Rect) -> Self {
        match mode {
            ProjectionMode::Flat => MapProjection::Flat(FlatProjection::new(viewport)),
            ProjectionMode::Sphere => MapProjection::Sphere(OrthographicProjection::new(viewport)),
        }
    }

    pub fn mode(&self) -> ProjectionMode {
        match self {
            MapProjection::Flat(_) => ProjectionMode::Flat,
            MapProjection::Sphere(_) => ProjectionMode::Sphere,
        }
    }

    pub fn viewport(&self) -> Rect {
        match self {
            MapProjection::Flat(p) => p.viewport(),
            MapProjection::Sphere(p) => p.viewport(),
        }
    }

    fn strategy(&self) -> &dyn Projection {
        match self {
            MapProjection::Flat(p) => p,
            MapProjection::Sphere(p) => p,
        }
    }
}

impl Projection for MapProjection {
    fn project(&self, point: WorldPoint, camera: &CameraState) -> Option<Pos2> {
        self.strategy().project(point, camera)
    }

    fn unproject(&self, screen: Pos2, camera: &CameraState) -> Option<WorldPoint> {
        self.strategy().unproject(screen, camera)
    }

    fn is_front_facing(&self, point: WorldPoint, camera: &CameraState) -> bool {
        self.strategy().is_front_facing(point, camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(960.0, 500.0))
    }

    fn flat(translate_x: f64, translate_y: f64, scale: f64) -> CameraState {
        CameraState::Flat(FlatCamera {
            translate_x,
            translate_y,
            scale,
        })
    }

    fn sphere(lambda: f64, phi: f64) -> CameraState {
        CameraState::Sphere(SphereCamera {
            lambda,
            phi,
            gamma: 0.0,
            scale: 250.0,
        })
    }

    #[test]
    fn test_flat_origin_maps_to_viewport_center() {
        let projection = FlatProjection::new(viewport());
        let pos = projection
            .project(Coord { x: 0.0, y: 0.0 }, &flat(0.0, 0.0, 1.0))
            .unwrap();
        assert!((pos.x - 480.0).abs() < 1e-4);
        assert!((pos.y - 250.0).abs() < 1e-4);
    }

    #[test]
    fn test_flat_north_is_up() {
        let projection = FlatProjection::new(viewport());
        let camera = flat(0.0, 0.0, 1.0);
        let north = projection.project(Coord { x: 0.0, y: 60.0 }, &camera).unwrap();
        let east = projection.project(Coord { x: 90.0, y: 0.0 }, &camera).unwrap();
        assert!(north.y < 250.0);
        assert!(east.x > 480.0);
    }

    #[test]
    fn test_flat_round_trip() {
        let projection = FlatProjection::new(viewport());
        let cameras = [
            flat(0.0, 0.0, 1.0),
            flat(120.0, -45.0, 2.5),
            flat(-600.0, 300.0, 8.0),
        ];
        for camera in &cameras {
            for lon in (-175..=175).step_by(25) {
                for lat in (-85..=85).step_by(17) {
                    let point = Coord {
                        x: lon as f64,
                        y: lat as f64,
                    };
                    let screen = projection.project(point, camera).unwrap();
                    let back = projection.unproject(screen, camera).unwrap();
                    assert!(
                        (back.x - point.x).abs() < 1e-2 && (back.y - point.y).abs() < 1e-2,
                        "round trip of {:?} gave {:?}",
                        point,
                        back
                    );
                }
            }
        }
    }

    #[test]
    fn test_flat_unproject_outside_ellipse() {
        let projection = FlatProjection::new(viewport());
        assert!(projection
            .unproject(Pos2::new(2.0, 2.0), &flat(0.0, 0.0, 1.0))
            .is_none());
    }

    #[test]
    fn test_invalid_points_do_not_project() {
        let flat_projection = MapProjection::for_mode(ProjectionMode::Flat, viewport());
        let globe = MapProjection::for_mode(ProjectionMode::Sphere, viewport());
        let flat_camera = flat(0.0, 0.0, 1.0);
        for point in [
            Coord { x: 200.0, y: 0.0 },
            Coord { x: 0.0, y: -91.0 },
            Coord {
                x: f64::NAN,
                y: 0.0,
            },
        ] {
            assert!(flat_projection.project(point, &flat_camera).is_none());
            assert!(globe.project(point, &sphere(0.0, 0.0)).is_none());
            assert!(!globe.is_front_facing(point, &sphere(0.0, 0.0)));
        }
    }

    #[test]
    fn test_mismatched_camera_does_not_project() {
        let projection = MapProjection::for_mode(ProjectionMode::Flat, viewport());
        assert!(projection
            .project(Coord { x: 0.0, y: 0.0 }, &sphere(0.0, 0.0))
            .is_none());
    }

    #[test]
    fn test_sphere_sub_point_projects_to_center() {
        let projection = OrthographicProjection::new(viewport());
        let camera = sphere(102.0, -23.0);
        let pos = projection
            .project(Coord { x: -102.0, y: 23.0 }, &camera)
            .unwrap();
        assert!((pos.x - 480.0).abs() < 1e-3);
        assert!((pos.y - 250.0).abs() < 1e-3);
    }

    #[test]
    fn test_sphere_front_facing_scenario() {
        let projection = OrthographicProjection::new(viewport());
        let paris = Coord { x: 2.35, y: 48.86 };
        let richmond = Coord {
            x: -77.43,
            y: 37.54,
        };

        // The default camera faces (-102, 23); both cities sit within 90° of it.
        let default_camera = sphere(102.0, -23.0);
        assert!(projection.is_front_facing(richmond, &default_camera));
        assert!(projection.is_front_facing(paris, &default_camera));
        let origin = Coord { x: 0.0, y: 0.0 };
        assert!(!projection.is_front_facing(origin, &default_camera));

        // Turned further west only Richmond stays on the visible hemisphere.
        let west = sphere(120.0, -10.0);
        assert!(projection.is_front_facing(richmond, &west));
        assert!(!projection.is_front_facing(paris, &west));
    }

    #[test]
    fn test_front_facing_matches_rotated_depth() {
        let projection = OrthographicProjection::new(viewport());
        let camera = SphereCamera {
            lambda: 37.0,
            phi: 21.0,
            gamma: 0.0,
            scale: 250.0,
        };
        let state = CameraState::Sphere(camera);
        let rotation = OrthographicProjection::rotation(&camera);
        for lon in (-180..180).step_by(15) {
            for lat in (-80..=80).step_by(20) {
                let point = Coord {
                    x: lon as f64,
                    y: lat as f64,
                };
                let depth = (rotation * lonlat_to_vec3(point)).x;
                if depth.abs() > 1e-6 {
                    assert_eq!(projection.is_front_facing(point, &state), depth > 0.0);
                }
            }
        }
    }

    #[test]
    fn test_flat_is_always_front_facing() {
        let projection = FlatProjection::new(viewport());
        let corner = Coord { x: 179.0, y: -89.0 };
        assert!(projection.is_front_facing(corner, &flat(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_wrap_longitude() {
        assert!((wrap_longitude(190.0) + 170.0).abs() < 1e-9);
        assert!((wrap_longitude(-190.0) - 170.0).abs() < 1e-9);
        assert!((wrap_longitude(720.5) - 0.5).abs() < 1e-9);
        assert!((wrap_longitude(180.0) + 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_angular_distance() {
        let a = Coord { x: 0.0, y: 0.0 };
        let b = Coord { x: 90.0, y: 0.0 };
        assert!((angular_distance(a, b) - FRAC_PI_2).abs() < 1e-9);
        assert!(angular_distance(a, a).abs() < 1e-12);
    }
}
