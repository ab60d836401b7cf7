//! Historical event dataset, as served by the events API.
//!
//! A dataset is the list of events for one calendar day (`MM-DD`). It is
//! converted wholesale into [`Marker`]s; events whose coordinates are not a
//! valid lon/lat pair are skipped with a warning.

use super::{Marker, MarkerId, MarkerVariant};
use crate::geo::{is_valid_world_point, WorldPoint};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sample dataset bundled into the binary.
const SAMPLE_EVENTS: &str = include_str!("../../assets/events/07-04.json");

/// Response body of `GET /events`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventListResponse {
    /// `MM-DD`, or `all` when unfiltered.
    pub date: String,
    pub count: usize,
    pub events: Vec<HistoricalEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalEvent {
    pub id: String,
    pub iso_date: String,
    pub source: EventSource,
    pub title: String,
    pub description: String,
    pub year: i32,
    #[serde(default)]
    pub categories: Vec<String>,
    pub location: GeoLocation,
    #[serde(default)]
    pub media: Option<serde_json::Value>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSource {
    #[serde(rename = "type")]
    pub kind: SourceKind,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(default)]
    pub plausibility_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Wikipedia,
    AiGenerated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoLocation {
    /// `[lng, lat]` in degrees.
    pub coordinates: [f64; 2],
    pub confidence: Confidence,
    pub geocoder: Geocoder,
    pub place_name: String,
    #[serde(default)]
    pub modern_equivalent: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
    Estimated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Geocoder {
    Nominatim,
    AzureMaps,
    AiInferred,
    Curated,
}

impl HistoricalEvent {
    pub fn position(&self) -> WorldPoint {
        let [lng, lat] = self.location.coordinates;
        WorldPoint { x: lng, y: lat }
    }

    pub fn variant(&self) -> MarkerVariant {
        match self.source.kind {
            SourceKind::Wikipedia => MarkerVariant::Primary,
            SourceKind::AiGenerated => MarkerVariant::Secondary,
        }
    }

    /// Place shown under the title, preferring the modern name.
    pub fn display_place(&self) -> &str {
        self.location
            .modern_equivalent
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.location.place_name)
    }

    pub fn to_marker(&self) -> Option<Marker> {
        let position = self.position();
        if !is_valid_world_point(position) {
            return None;
        }
        Some(Marker {
            variant: self.variant(),
            title: self.title.clone(),
            year: self.year,
            place: Some(self.display_place().to_string()),
            ..Marker::new(self.id.clone(), position.x, position.y)
        })
    }
}

impl EventListResponse {
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to parse events: {}", e))
    }

    /// The bundled sample day.
    pub fn sample() -> Result<Self, String> {
        Self::from_json(SAMPLE_EVENTS)
    }

    /// Converts every event with valid coordinates into a marker.
    pub fn to_markers(&self) -> Vec<Marker> {
        self.events
            .iter()
            .filter_map(|event| {
                let marker = event.to_marker();
                if marker.is_none() {
                    log::warn!(
                        "Skipping event {} with invalid coordinates {:?}",
                        event.id,
                        event.location.coordinates
                    );
                }
                marker
            })
            .collect()
    }

    pub fn find(&self, id: &MarkerId) -> Option<&HistoricalEvent> {
        self.events.iter().find(|e| e.id == id.as_str())
    }

    /// Human readable day, e.g. `July 4` for `07-04`.
    pub fn day_label(&self) -> String {
        day_label(&self.date)
    }
}

/// Formats an `MM-DD` key as a month and day; other keys pass through.
pub fn day_label(date: &str) -> String {
    // Leap year so 02-29 parses.
    NaiveDate::parse_from_str(&format!("2000-{}", date), "%Y-%m-%d")
        .map(|d| d.format("%B %-d").to_string())
        .unwrap_or_else(|_| match date {
            "all" => "All days".to_string(),
            other => other.to_string(),
        })
}

/// Loads the dataset from `path`, or the bundled sample when `path` is `None`.
#[cfg(not(target_arch = "wasm32"))]
pub fn load_events(path: Option<&str>) -> Result<EventListResponse, String> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read events file {}: {}", path, e))?;
            EventListResponse::from_json(&json)
        }
        None => EventListResponse::sample(),
    }
}

/// On the web only the bundled sample is available.
#[cfg(target_arch = "wasm32")]
pub fn load_events(_path: Option<&str>) -> Result<EventListResponse, String> {
    EventListResponse::sample()
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
        "date": "07-04",
        "count": 2,
        "events": [
            {
                "id": "evt_001",
                "iso_date": "07-04",
                "source": {"type": "wikipedia", "source_url": "https://en.wikipedia.org/"},
                "title": "Declaration of Independence adopted",
                "description": "Adopted by the Continental Congress.",
                "year": 1776,
                "categories": ["politics"],
                "location": {
                    "type": "Point",
                    "coordinates": [-75.1498, 39.9496],
                    "confidence": "high",
                    "geocoder": "curated",
                    "place_name": "Independence Hall, Philadelphia",
                    "modern_equivalent": "Philadelphia, PA, USA"
                },
                "media": null,
                "created_at": "2025-01-01T00:00:00Z"
            },
            {
                "id": "evt_bad",
                "iso_date": "07-04",
                "source": {"type": "ai_generated", "plausibility_score": 0.4},
                "title": "Somewhere impossible",
                "description": "",
                "year": 2099,
                "categories": [],
                "location": {
                    "coordinates": [250.0, 12.0],
                    "confidence": "estimated",
                    "geocoder": "ai_inferred",
                    "place_name": "Nowhere"
                },
                "created_at": "2025-01-01T00:00:00Z"
            }
        ]
    }"#;

    #[test]
    fn test_parse_and_convert() {
        let response = EventListResponse::from_json(JSON).unwrap();
        assert_eq!(response.count, 2);
        assert_eq!(response.events[1].source.kind, SourceKind::AiGenerated);
        assert_eq!(response.events[1].location.geocoder, Geocoder::AiInferred);

        let markers = response.to_markers();
        assert_eq!(markers.len(), 1);
        let marker = &markers[0];
        assert_eq!(marker.id.as_str(), "evt_001");
        assert_eq!(marker.variant, MarkerVariant::Primary);
        assert_eq!(marker.position.x, -75.1498);
        assert_eq!(marker.position.y, 39.9496);
        assert_eq!(marker.place.as_deref(), Some("Philadelphia, PA, USA"));
    }

    #[test]
    fn test_parse_error_is_descriptive() {
        let err = EventListResponse::from_json("{\"date\": 4}").unwrap_err();
        assert!(err.starts_with("Failed to parse events"));
    }

    #[test]
    fn test_day_label() {
        assert_eq!(day_label("07-04"), "July 4");
        assert_eq!(day_label("02-29"), "February 29");
        assert_eq!(day_label("all"), "All days");
        assert_eq!(day_label("13-40"), "13-40");
    }

    #[test]
    fn test_bundled_sample_parses() {
        let sample = EventListResponse::sample().unwrap();
        assert_eq!(sample.date, "07-04");
        assert_eq!(sample.count, sample.events.len());
        let markers = sample.to_markers();
        assert_eq!(markers.len(), sample.events.len());
        assert!(markers
            .iter()
            .any(|m| m.variant == MarkerVariant::Secondary));
    }
}
