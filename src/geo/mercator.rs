//! Web-Mercator coordinate conversion.
//!
//! Converts geographic coordinates (lon/lat/altitude) into the normalized
//! projection space used by tiled basemap renderers: x and y span [0, 1]
//! across the full world, z carries altitude in the same units.

use geo_types::Coord;
use std::f64::consts::PI;

/// Mean earth radius in meters (spherical model used by Web-Mercator tiling).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Earth circumference at the equator in meters.
pub const EARTH_CIRCUMFERENCE_M: f64 = 2.0 * PI * EARTH_RADIUS_M;

/// Circumference of the parallel at `lat` degrees, in meters.
///
/// Shrinks from the full equatorial circumference at lat 0 toward zero at the
/// poles. All meter<->projection-unit conversion is anchored on this value.
pub fn circumference_at_latitude(lat: f64) -> f64 {
    EARTH_CIRCUMFERENCE_M * lat.to_radians().cos()
}

/// Normalized Mercator x for a longitude in degrees.
pub fn mercator_x_from_lng(lng: f64) -> f64 {
    (180.0 + lng) / 360.0
}

/// Normalized Mercator y for a latitude in degrees.
///
/// y grows southward: the north pole maps toward 0 and the south pole
/// toward 1, matching the flipped vertical axis of tiled basemaps.
pub fn mercator_y_from_lat(lat: f64) -> f64 {
    (180.0 - (180.0 / PI) * ((PI / 4.0 + lat.to_radians() / 2.0).tan()).ln()) / 360.0
}

/// Normalized Mercator z for an altitude in meters above the given latitude.
pub fn mercator_z_from_altitude(altitude: f64, lat: f64) -> f64 {
    altitude / circumference_at_latitude(lat)
}

/// Latitude in degrees for a normalized Mercator y.
pub fn lat_from_mercator_y(y: f64) -> f64 {
    (360.0 / PI) * ((180.0 - y * 360.0) * PI / 180.0).exp().atan() - 90.0
}

/// Longitude in degrees for a normalized Mercator x.
pub fn lng_from_mercator_x(x: f64) -> f64 {
    x * 360.0 - 180.0
}

/// A position in normalized Mercator projection space.
///
/// Invalid geographic input (NaN, |lat| >= 90) propagates NaN components
/// rather than erroring; callers validate upstream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MercatorCoord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl MercatorCoord {
    /// Projects a geographic coordinate (`x` = lon, `y` = lat, degrees) and an
    /// altitude in meters.
    pub fn from_lng_lat(coord: Coord<f64>, altitude: f64) -> Self {
        Self {
            x: mercator_x_from_lng(coord.x),
            y: mercator_y_from_lat(coord.y),
            z: mercator_z_from_altitude(altitude, coord.y),
        }
    }

    /// Recovers the geographic coordinate (lon/lat in degrees).
    pub fn lng_lat(&self) -> Coord<f64> {
        Coord {
            x: lng_from_mercator_x(self.x),
            y: lat_from_mercator_y(self.y),
        }
    }

    /// Projection units spanned by one real-world meter at this position.
    ///
    /// This is the factor meter offsets are multiplied by when placing
    /// geometry. It is latitude-dependent, never a global constant.
    pub fn units_per_meter(&self) -> f64 {
        mercator_z_from_altitude(1.0, lat_from_mercator_y(self.y))
    }

    /// Real-world meters spanned by one projection unit at this position.
    ///
    /// Reciprocal of [`units_per_meter`](Self::units_per_meter); strictly
    /// decreases as the position moves toward either pole.
    pub fn meters_per_unit(&self) -> f64 {
        circumference_at_latitude(lat_from_mercator_y(self.y))
    }
}
