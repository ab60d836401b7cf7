//! Geographic projection and base map layers.
//!
//! `projection` turns lon/lat into screen space for the flat and globe
//! modes; `layer` and `renderer` load and draw the outlines underneath the
//! markers.

mod layer;
mod projection;
mod renderer;

pub use layer::{GeoLayerSet, GeoLayerType};
pub use projection::{
    is_valid_world_point, wrap_longitude, MapProjection, Projection, ProjectionMode, WorldPoint,
};
pub use renderer::{render_base_map, render_world_backdrop};
