//! Placement of real-world-meter geometry in projection space.
//!
//! Builds the fixed local-to-world matrix for an object anchored at a
//! geographic position with author-specified meter offsets, rotations, and
//! scale. The matrix is computed once per placed object, never per frame.

use super::mercator::MercatorCoord;
use geo_types::Coord;
use glam::{DMat4, DVec3};
use serde::{Deserialize, Serialize};

/// A fixed geographic position acting as the local origin for one object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeographicAnchor {
    /// Geographic position (`x` = lon, `y` = lat, degrees).
    pub coord: Coord<f64>,
    /// Altitude above the surface in meters.
    pub altitude: f64,
}

impl GeographicAnchor {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self {
            coord: Coord { x: lng, y: lat },
            altitude: 0.0,
        }
    }

    pub fn with_altitude(lng: f64, lat: f64, altitude: f64) -> Self {
        Self {
            coord: Coord { x: lng, y: lat },
            altitude,
        }
    }
}

/// An object's placement relative to its anchor, in real-world meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalOffset {
    /// Translation from the anchor per axis, in meters.
    pub translation_m: [f64; 3],
    /// Rotation around X, Y, Z in radians, applied intrinsically X then Y
    /// then Z in the pre-scaled local frame.
    pub rotation_rad: [f64; 3],
    /// Uniform scale multiplier on top of the meter conversion.
    pub scale: f64,
}

impl Default for LocalOffset {
    fn default() -> Self {
        Self {
            translation_m: [0.0; 3],
            rotation_rad: [0.0; 3],
            scale: 1.0,
        }
    }
}

impl LocalOffset {
    pub fn with_translation(translation_m: [f64; 3]) -> Self {
        Self {
            translation_m,
            ..Default::default()
        }
    }
}

/// Computes the local-to-world matrix for `anchor` + `offset`.
///
/// The model is authored in meters with +Z up; the projection space has a
/// flipped vertical axis, corrected by negating the Y scale. Composition is
/// `T * S(s, -s, s) * Rx * Ry * Rz`. Rotations act before scaling;
/// swapping the order would visibly skew tapered geometry.
///
/// NaN/out-of-range geographic input propagates NaN components.
pub fn placement_matrix(anchor: &GeographicAnchor, offset: &LocalOffset) -> DMat4 {
    let mc = MercatorCoord::from_lng_lat(anchor.coord, anchor.altitude);
    let units_per_meter = mc.units_per_meter();

    let translate = DVec3::new(
        mc.x + offset.translation_m[0] * units_per_meter,
        mc.y + offset.translation_m[1] * units_per_meter,
        mc.z + offset.translation_m[2] * units_per_meter,
    );
    let scale = units_per_meter * offset.scale;

    DMat4::from_translation(translate)
        * DMat4::from_scale(DVec3::new(scale, -scale, scale))
        * DMat4::from_rotation_x(offset.rotation_rad[0])
        * DMat4::from_rotation_y(offset.rotation_rad[1])
        * DMat4::from_rotation_z(offset.rotation_rad[2])
}
