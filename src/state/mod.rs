//! Application state management.
//!
//! The host side of the map: which event is selected, what is shown in the
//! top bar and how the view was configured. The map engine itself lives in
//! `crate::map` and only learns about selection through `sync_selection`.

pub mod settings;
pub mod url_state;

use crate::data::{EventListResponse, MarkerId};
use crate::geo::ProjectionMode;
pub use settings::MapSettings;

/// Root application state.
#[derive(Debug, Default)]
pub struct AppState {
    pub settings: MapSettings,

    /// Projection chosen in the top bar
    pub mode: ProjectionMode,

    /// Event the user selected, owned by the host and pushed to the view
    pub selected: Option<MarkerId>,

    /// Loaded dataset, kept for the detail line in the top bar
    pub dataset: Option<EventListResponse>,

    /// Application status message displayed in top bar
    pub status_message: String,
}

impl AppState {
    pub fn new(settings: MapSettings) -> Self {
        Self {
            mode: settings.mode,
            settings,
            status_message: "Ready".to_string(),
            ..Default::default()
        }
    }

    /// Human readable day of the loaded dataset.
    pub fn day_label(&self) -> String {
        self.dataset
            .as_ref()
            .map(|d| d.day_label())
            .unwrap_or_default()
    }

    /// Toggles `id`: selecting the selected event clears the selection.
    pub fn toggle_selection(&mut self, id: MarkerId) {
        if self.selected.as_ref() == Some(&id) {
            self.selected = None;
        } else {
            self.selected = Some(id);
        }
    }

    /// Title line for the selected event.
    pub fn selected_summary(&self) -> Option<String> {
        let id = self.selected.as_ref()?;
        let event = self.dataset.as_ref()?.find(id)?;
        Some(format!(
            "{} · {}",
            crate::data::format_year(event.year),
            event.title
        ))
    }
}
