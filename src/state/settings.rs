//! Map settings: initial projection, motion preference and data sources.
//!
//! Native builds read a JSON file named by `PINMAP_SETTINGS`; the web build
//! reads URL parameters and the `prefers-reduced-motion` media query. Any
//! failure falls back to defaults with a logged warning.

use super::url_state::UrlParams;
use crate::geo::ProjectionMode;
use serde::{Deserialize, Serialize};

/// Environment variable naming the settings file on native builds.
pub const SETTINGS_ENV: &str = "PINMAP_SETTINGS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    /// Projection the view is mounted with.
    pub mode: ProjectionMode,
    /// Disables entrance fades, ring pulses and button zoom animation.
    pub reduced_motion: bool,
    /// Event dataset JSON; the bundled sample day when unset.
    pub events_path: Option<String>,
    /// Coastline outlines (`.shp` or GeoJSON).
    pub land_path: Option<String>,
    /// Country border outlines (`.shp` or GeoJSON).
    pub borders_path: Option<String>,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            mode: ProjectionMode::Sphere,
            reduced_motion: false,
            events_path: None,
            land_path: None,
            borders_path: None,
        }
    }
}

impl MapSettings {
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to parse settings: {}", e))
    }

    /// Overrides fields present in the URL.
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    pub fn apply_url(&mut self, params: &UrlParams) {
        if let Some(mode) = params.mode {
            self.mode = mode;
        }
        if let Some(reduced) = params.reduced_motion {
            self.reduced_motion = reduced;
        }
    }

    /// Load settings from the file named by `PINMAP_SETTINGS`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(SETTINGS_ENV) else {
            return Self::default();
        };

        let json = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("Failed to read settings file {}: {}", path, e);
                return Self::default();
            }
        };

        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path);
                settings
            }
            Err(e) => {
                log::warn!("{}", e);
                Self::default()
            }
        }
    }

    /// Load settings from the page URL and the browser's motion preference.
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let mut settings = Self {
            reduced_motion: prefers_reduced_motion(),
            ..Self::default()
        };
        settings.apply_url(&super::url_state::parse_from_url());
        settings
    }
}

#[cfg(target_arch = "wasm32")]
fn prefers_reduced_motion() -> bool {
    let query = "(prefers-reduced-motion: reduce)";
    web_sys::window()
        .and_then(|w| w.match_media(query).ok().flatten())
        .is_some_and(|m| m.matches())
}
