//! Base map geometry: coastlines, borders and the graticule.
//!
//! Geometry is stored in world coordinates and re-projected every redraw, so
//! the same layers serve both projection modes.

use super::projection::{is_valid_world_point, WorldPoint};
use crate::ui::colors::canvas;
use eframe::egui::Color32;
use geo_types::Coord;
use geojson::{Feature, GeoJson, Geometry, Value};
use std::io::Cursor;

/// Type of base map layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoLayerType {
    Graticule,
    Land,
    Borders,
}

impl GeoLayerType {
    /// Returns the default color for this layer type.
    pub fn default_color(&self) -> Color32 {
        match self {
            GeoLayerType::Graticule => canvas::GRATICULE,
            GeoLayerType::Land => canvas::LAND,
            GeoLayerType::Borders => canvas::BORDERS,
        }
    }

    /// Returns the default line width for this layer type.
    pub fn default_line_width(&self) -> f32 {
        match self {
            GeoLayerType::Graticule => 0.6,
            GeoLayerType::Land => 1.0,
            GeoLayerType::Borders => 0.6,
        }
    }
}

/// A drawable outline.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoFeature {
    /// A series of connected line segments.
    LineString(Vec<WorldPoint>),
    /// A closed ring with optional holes, drawn as outlines.
    Polygon {
        exterior: Vec<WorldPoint>,
        holes: Vec<Vec<WorldPoint>>,
    },
}

impl GeoFeature {
    /// Every polyline of the feature, rings included.
    pub fn lines(&self) -> Box<dyn Iterator<Item = &[WorldPoint]> + '_> {
        match self {
            GeoFeature::LineString(line) => Box::new(std::iter::once(line.as_slice())),
            GeoFeature::Polygon { exterior, holes } => Box::new(
                std::iter::once(exterior.as_slice()).chain(holes.iter().map(|h| h.as_slice())),
            ),
        }
    }
}

/// A base map layer containing multiple features.
#[derive(Debug, Clone)]
pub struct GeoLayer {
    pub layer_type: GeoLayerType,
    pub features: Vec<GeoFeature>,
    /// Override color (None = use default)
    pub color: Option<Color32>,
    pub visible: bool,
}

impl GeoLayer {
    /// Creates a new empty layer of the specified type.
    pub fn new(layer_type: GeoLayerType) -> Self {
        Self {
            layer_type,
            features: Vec::new(),
            color: None,
            visible: true,
        }
    }

    /// Returns the effective color for this layer.
    pub fn effective_color(&self) -> Color32 {
        self.color
            .unwrap_or_else(|| self.layer_type.default_color())
    }

    /// Meridians and parallels every `step` degrees, sampled every 2 degrees.
    pub fn graticule(step: f64) -> Self {
        let mut layer = Self::new(GeoLayerType::Graticule);
        if !(step.is_finite() && step > 0.0) {
            return layer;
        }
        let samples = |from: f64, to: f64| {
            let n = ((to - from) / 2.0).ceil() as usize;
            (0..=n).map(move |i| (from + i as f64 * 2.0).min(to))
        };

        let mut lon = -180.0;
        while lon < 180.0 {
            let line = samples(-90.0, 90.0)
                .map(|lat| Coord { x: lon, y: lat })
                .collect();
            layer.features.push(GeoFeature::LineString(line));
            lon += step;
        }

        let mut lat = -90.0 + step;
        while lat < 90.0 {
            let line = samples(-180.0, 180.0)
                .map(|lon| Coord { x: lon, y: lat })
                .collect();
            layer.features.push(GeoFeature::LineString(line));
            lat += step;
        }
        layer
    }

    /// Loads features from shapefile bytes (.shp only; attributes are not used).
    pub fn load_from_shapefile(&mut self, shp_bytes: &[u8]) -> Result<(), String> {
        let shp_cursor = Cursor::new(shp_bytes);
        let mut shape_reader = shapefile::ShapeReader::new(shp_cursor)
            .map_err(|e| format!("Failed to read shapefile: {}", e))?;

        for result in shape_reader.iter_shapes() {
            let shape: shapefile::Shape =
                result.map_err(|e| format!("Failed to read shape: {}", e))?;
            self.push_shape(&shape);
        }

        Ok(())
    }

    fn push_shape(&mut self, shape: &shapefile::Shape) {
        let to_coords = |points: &[shapefile::Point]| -> Vec<WorldPoint> {
            points.iter().map(|p| Coord { x: p.x, y: p.y }).collect()
        };
        match shape {
            shapefile::Shape::Polyline(pl) => {
                for part in pl.parts() {
                    self.push_line(to_coords(part));
                }
            }
            shapefile::Shape::Polygon(poly) => {
                // Holes follow the outer ring they belong to.
                let mut exterior: Option<Vec<WorldPoint>> = None;
                let mut holes = Vec::new();
                for ring in poly.rings() {
                    let coords = to_coords(ring.points());
                    match ring {
                        shapefile::PolygonRing::Outer(_) => {
                            if let Some(previous) = exterior.replace(coords) {
                                self.push_polygon(previous, std::mem::take(&mut holes));
                            }
                        }
                        shapefile::PolygonRing::Inner(_) => holes.push(coords),
                    }
                }
                if let Some(exterior) = exterior {
                    self.push_polygon(exterior, holes);
                }
            }
            _ => {}
        }
    }

    /// Loads features from GeoJSON data. Point geometries are ignored.
    pub fn load_from_geojson(&mut self, geojson_str: &str) -> Result<(), String> {
        let geojson: GeoJson = geojson_str
            .parse()
            .map_err(|e| format!("Failed to parse GeoJSON: {}", e))?;

        match geojson {
            GeoJson::FeatureCollection(fc) => {
                for feature in &fc.features {
                    self.push_feature(feature);
                }
            }
            GeoJson::Feature(f) => self.push_feature(&f),
            GeoJson::Geometry(g) => self.push_geometry(&g),
        }

        Ok(())
    }

    fn push_feature(&mut self, feature: &Feature) {
        if let Some(geometry) = &feature.geometry {
            self.push_geometry(geometry);
        }
    }

    fn push_geometry(&mut self, geometry: &Geometry) {
        let to_coords = |positions: &[Vec<f64>]| -> Vec<WorldPoint> {
            positions
                .iter()
                .filter(|c| c.len() >= 2)
                .map(|c| Coord { x: c[0], y: c[1] })
                .collect()
        };
        match &geometry.value {
            Value::LineString(coords) => self.push_line(to_coords(coords)),
            Value::MultiLineString(lines) => {
                for line in lines {
                    self.push_line(to_coords(line));
                }
            }
            Value::Polygon(rings) => self.push_rings(rings.iter().map(|r| to_coords(r))),
            Value::MultiPolygon(polygons) => {
                for rings in polygons {
                    self.push_rings(rings.iter().map(|r| to_coords(r)));
                }
            }
            Value::GeometryCollection(geometries) => {
                for g in geometries {
                    self.push_geometry(g);
                }
            }
            Value::Point(_) | Value::MultiPoint(_) => {}
        }
    }

    fn push_rings(&mut self, mut rings: impl Iterator<Item = Vec<WorldPoint>>) {
        if let Some(exterior) = rings.next() {
            self.push_polygon(exterior, rings.collect());
        }
    }

    fn push_line(&mut self, line: Vec<WorldPoint>) {
        for part in split_invalid(line) {
            self.features.push(GeoFeature::LineString(part));
        }
    }

    fn push_polygon(&mut self, exterior: Vec<WorldPoint>, holes: Vec<Vec<WorldPoint>>) {
        if exterior.iter().all(|c| is_valid_world_point(*c)) {
            let holes = holes
                .into_iter()
                .filter(|h| h.len() >= 2 && h.iter().all(|c| is_valid_world_point(*c)))
                .collect();
            if exterior.len() >= 2 {
                self.features.push(GeoFeature::Polygon { exterior, holes });
            }
        } else {
            // Degrade a malformed ring to its valid runs.
            self.push_line(exterior);
            for hole in holes {
                self.push_line(hole);
            }
        }
    }
}

/// Splits a polyline at invalid coordinates, dropping runs shorter than two points.
fn split_invalid(line: Vec<WorldPoint>) -> Vec<Vec<WorldPoint>> {
    let mut parts = Vec::new();
    let mut current = Vec::new();
    for coord in line {
        if is_valid_world_point(coord) {
            current.push(coord);
        } else if current.len() >= 2 {
            parts.push(std::mem::take(&mut current));
        } else {
            current.clear();
        }
    }
    if current.len() >= 2 {
        parts.push(current);
    }
    parts
}

/// Collection of all base map layers.
#[derive(Debug, Clone)]
pub struct GeoLayerSet {
    pub graticule: Option<GeoLayer>,
    pub land: Option<GeoLayer>,
    pub borders: Option<GeoLayer>,
}

impl Default for GeoLayerSet {
    fn default() -> Self {
        Self {
            graticule: Some(GeoLayer::graticule(30.0)),
            land: None,
            borders: None,
        }
    }
}

impl GeoLayerSet {
    /// Creates a layer set holding only the graticule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an iterator over all loaded layers, in draw order.
    pub fn iter(&self) -> impl Iterator<Item = &GeoLayer> {
        [
            self.graticule.as_ref(),
            self.borders.as_ref(),
            self.land.as_ref(),
        ]
        .into_iter()
        .flatten()
    }

    /// Loads a layer from GeoJSON string.
    pub fn load_layer(
        &mut self,
        layer_type: GeoLayerType,
        geojson_str: &str,
    ) -> Result<(), String> {
        let mut layer = GeoLayer::new(layer_type);
        layer.load_from_geojson(geojson_str)?;
        log::info!(
            "Loaded {:?} layer with {} feature(s)",
            layer_type,
            layer.features.len()
        );
        self.set_layer(layer_type, layer);
        Ok(())
    }

    /// Loads a layer from shapefile bytes.
    pub fn load_layer_from_shapefile(
        &mut self,
        layer_type: GeoLayerType,
        shp_bytes: &[u8],
    ) -> Result<(), String> {
        let mut layer = GeoLayer::new(layer_type);
        layer.load_from_shapefile(shp_bytes)?;
        log::info!(
            "Loaded {:?} layer with {} feature(s) from shapefile",
            layer_type,
            layer.features.len()
        );
        self.set_layer(layer_type, layer);
        Ok(())
    }

    /// Reads a `.shp` or GeoJSON file from disk based on its extension.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_layer_from_path(
        &mut self,
        layer_type: GeoLayerType,
        path: &str,
    ) -> Result<(), String> {
        let bytes = std::fs::read(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
        if path.to_ascii_lowercase().ends_with(".shp") {
            self.load_layer_from_shapefile(layer_type, &bytes)
        } else {
            let text = String::from_utf8(bytes)
                .map_err(|e| format!("{} is not valid UTF-8: {}", path, e))?;
            self.load_layer(layer_type, &text)
        }
    }

    fn set_layer(&mut self, layer_type: GeoLayerType, layer: GeoLayer) {
        match layer_type {
            GeoLayerType::Graticule => self.graticule = Some(layer),
            GeoLayerType::Land => self.land = Some(layer),
            GeoLayerType::Borders => self.borders = Some(layer),
        }
    }
}
