//! Camera, marker layout and selection engine for the interactive map.
//!
//! Data flow per frame:
//! gesture → [`CameraController`] → [`MapView::redraw`] (projection + layout
//! + selection + tooltip) → drawing surface.

pub mod camera;
pub mod easing;
pub mod layout;
pub mod selection;
pub mod tooltip;
pub mod view;

pub use camera::{CameraState, FlatCamera, SphereCamera};
pub use layout::{MarkerLayout, MarkerRole};
pub use view::MapView;
