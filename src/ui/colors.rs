//! Centralized color constants for the UI.
//!
//! Both the drawing code and the marker style descriptors read from here.

use eframe::egui::Color32;

/// General UI colors for labels and values.
pub mod ui {
    use super::Color32;

    /// Muted gray for labels.
    pub const LABEL: Color32 = Color32::from_rgb(120, 120, 130);
    /// Emphasized color for active states.
    pub const ACTIVE: Color32 = Color32::from_rgb(100, 180, 255);
}

/// Colors for the map canvas and base map geometry.
pub mod canvas {
    use super::Color32;

    /// Area around the world outline.
    pub const BACKGROUND: Color32 = Color32::from_rgb(20, 20, 35);
    /// Ocean fill inside the world outline.
    pub const OCEAN: Color32 = Color32::from_rgb(28, 36, 58);
    /// World outline / globe limb.
    pub const OUTLINE: Color32 = Color32::from_rgb(70, 90, 130);
    /// Coastlines.
    pub const LAND: Color32 = Color32::from_rgb(150, 160, 185);
    /// Country borders.
    pub const BORDERS: Color32 = Color32::from_rgb(90, 100, 125);
    /// Meridians and parallels.
    pub const GRATICULE: Color32 = Color32::from_rgba_premultiplied(40, 50, 70, 120);
}

/// Marker fills per variant and role.
pub mod pins {
    use super::Color32;

    pub const PRIMARY: Color32 = Color32::from_rgb(255, 180, 80);
    pub const SECONDARY: Color32 = Color32::from_rgb(170, 130, 255);
    /// Fill of the selected marker regardless of variant.
    pub const SELECTED: Color32 = Color32::from_rgb(255, 90, 90);
    /// Glow ring around the selected marker.
    pub const RING: Color32 = Color32::from_rgb(255, 120, 120);
    pub const STROKE: Color32 = Color32::from_rgb(20, 20, 30);
    /// Keyboard focus outline.
    pub const FOCUS: Color32 = Color32::from_rgb(240, 240, 255);
}

/// Hover preview.
pub mod tooltip {
    use super::Color32;

    pub const BACKGROUND: Color32 = Color32::from_rgba_premultiplied(15, 15, 25, 235);
    pub const BORDER: Color32 = Color32::from_rgb(80, 80, 110);
    pub const TEXT: Color32 = Color32::from_rgb(225, 225, 240);
}
