//! # Geographic Utilities
//!
//! Distance helpers for 3D track points.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two track points |
//! | [`polyline_length`] | Total horizontal length of a track in meters |
//! | [`LocalProjection`] | Equirectangular projection to meters around a reference latitude |
//!
//! ## Example
//!
//! ```rust
//! use track_layers::{TrackPoint, geo_utils};
//!
//! let track = vec![
//!     TrackPoint::new(8.6196, 47.4551, 410.0),
//!     TrackPoint::new(8.6210, 47.4560, 415.0),
//!     TrackPoint::new(8.6225, 47.4571, 423.0),
//! ];
//!
//! let length = geo_utils::polyline_length(&track);
//! println!("Track length: {:.0}m", length);
//! ```
//!
//! ## Coordinate System
//!
//! All functions expect WGS84 longitude/latitude in degrees. Elevation is ignored:
//! distances are measured along the Earth's surface.

use geo::{Point, Haversine, Distance};
use crate::TrackPoint;

/// Meters per degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE: f64 = 111_320.0;

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two track points using the Haversine formula.
///
/// Returns the distance in meters along the Earth's surface (spherical Earth with
/// radius 6,371 km). Elevation does not contribute.
///
/// # Example
///
/// ```rust
/// use track_layers::{TrackPoint, geo_utils};
///
/// let zurich = TrackPoint::new(8.5417, 47.3769, 408.0);
/// let st_moritz = TrackPoint::new(9.8355, 46.4908, 1822.0);
///
/// let distance = geo_utils::haversine_distance(&zurich, &st_moritz);
/// assert!((distance - 140_000.0).abs() < 5_000.0);
/// ```
#[inline]
pub fn haversine_distance(p1: &TrackPoint, p2: &TrackPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2)
}

/// Calculate the total length of a polyline in meters.
///
/// Sums the haversine distance between consecutive points. Empty or single-point
/// tracks return 0.0.
pub fn polyline_length(points: &[TrackPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

// =============================================================================
// Local Projection
// =============================================================================

/// Flat projection of lon/lat into meters around a reference latitude.
///
/// Longitude is scaled by `cos(ref_lat)` so that planar distances approximate ground
/// distances near the reference. Good enough for hit-testing at track scale; do not use
/// it across hundreds of kilometers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalProjection {
    lng_meters_per_deg: f64,
}

impl LocalProjection {
    pub fn new(ref_lat: f64) -> Self {
        Self {
            lng_meters_per_deg: METERS_PER_DEGREE * ref_lat.to_radians().cos(),
        }
    }

    /// Project a lon/lat pair into `[x, y]` meters.
    #[inline]
    pub fn project(&self, longitude: f64, latitude: f64) -> [f64; 2] {
        [longitude * self.lng_meters_per_deg, latitude * METERS_PER_DEGREE]
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
