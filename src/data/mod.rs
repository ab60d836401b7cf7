//! Marker data: the engine-facing marker model and the event dataset it is
//! built from.
//!
//! ## Types
//! - `MarkerId`: Stable identifier shared with the host's selection
//! - `Marker`: One pin on the map (position, variant, preview text)
//! - `EventListResponse`: The `/events` payload for one calendar day

pub mod events;

use crate::geo::WorldPoint;
use std::fmt;

pub use events::{load_events, EventListResponse};

/// Stable identifier of a marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub String);

impl MarkerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MarkerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Visual family of a marker.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MarkerVariant {
    /// Sourced events.
    #[default]
    Primary,
    /// Generated or speculative events.
    Secondary,
}

/// A geolocated pin.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    pub position: WorldPoint,
    pub variant: MarkerVariant,
    pub title: String,
    pub year: i32,
    pub place: Option<String>,
}

impl Marker {
    pub fn new(id: impl Into<String>, lon: f64, lat: f64) -> Self {
        Self {
            id: MarkerId::new(id),
            position: WorldPoint { x: lon, y: lat },
            variant: MarkerVariant::Primary,
            title: String::new(),
            year: 0,
            place: None,
        }
    }

    /// Hover preview text: year and title, then the place on its own line.
    pub fn tooltip_text(&self) -> String {
        let headline = if self.title.is_empty() {
            self.id.to_string()
        } else {
            format!("{} · {}", format_year(self.year), self.title)
        };
        match &self.place {
            Some(place) if !place.is_empty() => format!("{}\n{}", headline, place),
            _ => headline,
        }
    }
}

/// Formats a year, using BCE for years before 1.
pub fn format_year(year: i32) -> String {
    if year < 1 {
        format!("{} BCE", (1 - year as i64))
    } else {
        year.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tooltip_text() {
        let mut marker = Marker::new("evt-1", 2.35, 48.86);
        assert_eq!(marker.tooltip_text(), "evt-1");

        marker.title = "Storming of the Bastille".to_string();
        marker.year = 1789;
        assert_eq!(marker.tooltip_text(), "1789 · Storming of the Bastille");

        marker.place = Some("Paris, France".to_string());
        assert_eq!(
            marker.tooltip_text(),
            "1789 · Storming of the Bastille\nParis, France"
        );
    }

    #[test]
    fn test_format_year() {
        assert_eq!(format_year(1969), "1969");
        assert_eq!(format_year(0), "1 BCE");
        assert_eq!(format_year(-43), "44 BCE");
    }

    #[test]
    fn test_marker_id_display() {
        let id = MarkerId::from("abc");
        assert_eq!(id.to_string(), "abc");
        assert_eq!(id.as_str(), "abc");
    }
}
