//! Geographic coordinate conversion and object placement.
//!
//! This module converts geographic anchors into the host basemap's normalized
//! Mercator projection space and builds the fixed local-to-world matrices
//! that place meter-denominated geometry at those anchors.

mod mercator;
mod placement;

pub use mercator::{
    circumference_at_latitude, lat_from_mercator_y, lng_from_mercator_x, mercator_x_from_lng,
    mercator_y_from_lat, mercator_z_from_altitude, MercatorCoord, EARTH_CIRCUMFERENCE_M,
    EARTH_RADIUS_M,
};
pub use placement::{placement_matrix, GeographicAnchor, LocalOffset};
