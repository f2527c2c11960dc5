//! Route document parsing.
//!
//! Two external documents describe a playback route: a GeoJSON LineString
//! (the displayed route geometry, whose endpoints anchor the start arrow and
//! the waypoint beam) and a pre-interpolated path of intermediate points at
//! uniform time spacing. Interpolation itself happens upstream; this module
//! only parses.

use crate::path::PathPoint;
use geo_types::Coord;
use geojson::{GeoJson, Geometry, Value};
use serde::Deserialize;

/// Parses a GeoJSON route into its LineString coordinates.
///
/// Accepts a bare geometry, a feature, or a feature collection (first
/// LineString feature wins).
pub fn parse_route_geojson(contents: &str) -> Result<Vec<Coord<f64>>, String> {
    let geojson: GeoJson = contents
        .parse()
        .map_err(|e| format!("failed to parse route GeoJSON: {}", e))?;

    let geometry = match geojson {
        GeoJson::Geometry(geometry) => Some(geometry),
        GeoJson::Feature(feature) => feature.geometry,
        GeoJson::FeatureCollection(fc) => fc
            .features
            .into_iter()
            .filter_map(|feature| feature.geometry)
            .find(|geometry| matches!(geometry.value, Value::LineString(_))),
    };

    match geometry {
        Some(Geometry {
            value: Value::LineString(positions),
            ..
        }) => positions.iter().map(|p| coord_from_position(p)).collect(),
        Some(other) => Err(format!(
            "route geometry must be a LineString, got {}",
            other.value.type_name()
        )),
        None => Err("route document contains no LineString geometry".to_string()),
    }
}

/// The pre-interpolated path document: `{"coordinates": [[lon, lat], ...]}`.
#[derive(Debug, Deserialize)]
struct InterpolatedPathDoc {
    coordinates: Vec<Vec<f64>>,
}

/// Parses a pre-interpolated path document into playback points.
///
/// Each position is `[lon, lat]` or `[lon, lat, altitude]`.
pub fn parse_interpolated_path(contents: &str) -> Result<Vec<PathPoint>, String> {
    let doc: InterpolatedPathDoc = serde_json::from_str(contents)
        .map_err(|e| format!("failed to parse interpolated path: {}", e))?;

    doc.coordinates
        .iter()
        .map(|position| {
            let coord = coord_from_position(position)?;
            Ok(PathPoint {
                coord,
                altitude: position.get(2).copied().unwrap_or(0.0),
            })
        })
        .collect()
}

fn coord_from_position(position: &[f64]) -> Result<Coord<f64>, String> {
    match position {
        [lng, lat, ..] => Ok(Coord { x: *lng, y: *lat }),
        _ => Err(format!(
            "position has {} components, expected at least 2",
            position.len()
        )),
    }
}
