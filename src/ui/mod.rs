//! UI modules for the PinMap application.
//!
//! - Top bar: Title, day, projection mode and status
//! - Central canvas: Base map, markers, tooltip and zoom controls

mod canvas;
pub mod colors;
mod top_bar;

pub use canvas::render_canvas;
pub use top_bar::render_top_bar;
