//! URL state encoding/decoding for shareable URLs.
//!
//! Encodes the projection mode and the selected event in the query string
//! (`?mode=globe&event=evt_001`) so reloading restores the view.

use crate::geo::ProjectionMode;

/// Parsed URL parameters.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UrlParams {
    pub mode: Option<ProjectionMode>,
    pub reduced_motion: Option<bool>,
    pub event: Option<String>,
}

/// Parses a query string, with or without the leading `?`.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub fn parse_query(query: &str) -> UrlParams {
    let mut params = UrlParams::default();
    let query = query.trim_start_matches('?');

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let mut kv = pair.splitn(2, '=');
        let key = kv.next().unwrap_or("");
        let value = kv.next().unwrap_or("");
        match key {
            "mode" => params.mode = parse_mode(value),
            "reduced_motion" | "reduce_motion" => params.reduced_motion = parse_bool(value),
            "event" if !value.is_empty() => match urlencoding::decode(value) {
                Ok(id) => params.event = Some(id.into_owned()),
                Err(e) => log::warn!("Ignoring malformed event id {:?}: {}", value, e),
            },
            _ => {}
        }
    }

    params
}

/// Builds the query string for the given view. Event ids are percent-encoded.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub fn encode_query(mode: ProjectionMode, event: Option<&str>) -> String {
    let mode = match mode {
        ProjectionMode::Flat => "map",
        ProjectionMode::Sphere => "globe",
    };
    match event {
        Some(id) => format!("?mode={}&event={}", mode, urlencoding::encode(id)),
        None => format!("?mode={}", mode),
    }
}

fn parse_mode(value: &str) -> Option<ProjectionMode> {
    match value.to_ascii_lowercase().as_str() {
        "flat" | "map" => Some(ProjectionMode::Flat),
        "sphere" | "globe" => Some(ProjectionMode::Sphere),
        _ => None,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "" | "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Parse URL query parameters from the current browser URL.
#[cfg(target_arch = "wasm32")]
pub fn parse_from_url() -> UrlParams {
    let search = web_sys::window().and_then(|w| w.location().search().ok());
    match search {
        Some(search) => parse_query(&search),
        None => UrlParams::default(),
    }
}

/// No-op stub for native builds.
#[cfg(not(target_arch = "wasm32"))]
pub fn parse_from_url() -> UrlParams {
    UrlParams::default()
}

/// Push current state to the URL query string using `replaceState`.
#[cfg(target_arch = "wasm32")]
pub fn push_to_url(mode: ProjectionMode, event: Option<&str>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Ok(history) = window.history() else {
        return;
    };
    let query = encode_query(mode, event);
    if let Err(e) = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&query)) {
        log::warn!("Failed to update URL: {:?}", e);
    }
}

/// No-op stub for native builds.
#[cfg(not(target_arch = "wasm32"))]
pub fn push_to_url(_mode: ProjectionMode, _event: Option<&str>) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query() {
        let params = parse_query("?mode=globe&event=evt_001&reduced_motion=1&other=x");
        assert_eq!(params.mode, Some(ProjectionMode::Sphere));
        assert_eq!(params.event.as_deref(), Some("evt_001"));
        assert_eq!(params.reduced_motion, Some(true));
    }

    #[test]
    fn test_parse_empty_and_unknown() {
        assert_eq!(parse_query(""), UrlParams::default());
        let params = parse_query("mode=cube&reduced_motion=maybe&event=");
        assert_eq!(params, UrlParams::default());
    }

    #[test]
    fn test_encode_round_trips() {
        let query = encode_query(ProjectionMode::Flat, Some("evt_7"));
        assert_eq!(query, "?mode=map&event=evt_7");
        let params = parse_query(&query);
        assert_eq!(params.mode, Some(ProjectionMode::Flat));
        assert_eq!(params.event.as_deref(), Some("evt_7"));
    }

    #[test]
    fn test_event_id_with_reserved_characters() {
        let id = "battle of x&y=1 #2";
        let query = encode_query(ProjectionMode::Sphere, Some(id));
        assert_eq!(query, "?mode=globe&event=battle%20of%20x%26y%3D1%20%232");
        let params = parse_query(&query);
        assert_eq!(params.mode, Some(ProjectionMode::Sphere));
        assert_eq!(params.event.as_deref(), Some(id));
    }

    #[test]
    fn test_malformed_event_id_is_ignored() {
        let params = parse_query("?event=%FF%FE");
        assert_eq!(params.event, None);
    }
}
