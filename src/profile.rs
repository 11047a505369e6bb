//! Elevation profile data.
//!
//! Turns a track into the distance/elevation series an elevation chart plots,
//! along with the usual summary figures (total distance, gain, loss, extremes).
//! Distances are cumulative great-circle distances, so they match what the map shows
//! regardless of how steep the track is.

use crate::geo_utils::haversine_distance;
use crate::TrackPoint;

/// One point of the profile chart.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct ProfileSample {
    /// Distance from the start of the track in meters
    pub distance: f64,
    /// Elevation in meters
    pub elevation: f64,
}

/// Elevation profile of a track.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct ElevationProfile {
    /// One sample per track point, in track order
    pub samples: Vec<ProfileSample>,
    pub total_distance: f64,
    /// Sum of all positive elevation changes
    pub elevation_gain: f64,
    /// Sum of all negative elevation changes, as a positive number
    pub elevation_loss: f64,
    pub min_elevation: f64,
    pub max_elevation: f64,
}

impl ElevationProfile {
    /// Build the profile of a track.
    ///
    /// Returns `None` for tracks with fewer than 2 points, which have no profile to draw.
    ///
    /// # Example
    /// ```
    /// use track_layers::{TrackPoint, ElevationProfile};
    ///
    /// let points = vec![
    ///     TrackPoint::new(8.000, 47.000, 400.0),
    ///     TrackPoint::new(8.000, 47.001, 450.0),
    ///     TrackPoint::new(8.000, 47.002, 420.0),
    /// ];
    /// let profile = ElevationProfile::from_points(&points).unwrap();
    /// assert_eq!(profile.elevation_gain, 50.0);
    /// assert_eq!(profile.elevation_loss, 30.0);
    /// ```
    pub fn from_points(points: &[TrackPoint]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }

        let mut samples = Vec::with_capacity(points.len());
        let mut distance = 0.0;
        let mut gain = 0.0;
        let mut loss = 0.0;
        let mut min_elevation = f64::INFINITY;
        let mut max_elevation = f64::NEG_INFINITY;

        for (i, p) in points.iter().enumerate() {
            if i > 0 {
                let prev = &points[i - 1];
                distance += haversine_distance(prev, p);

                let delta = p.elevation - prev.elevation;
                if delta > 0.0 {
                    gain += delta;
                } else {
                    loss -= delta;
                }
            }

            min_elevation = min_elevation.min(p.elevation);
            max_elevation = max_elevation.max(p.elevation);
            samples.push(ProfileSample { distance, elevation: p.elevation });
        }

        Some(Self {
            samples,
            total_distance: distance,
            elevation_gain: gain,
            elevation_loss: loss,
            min_elevation,
            max_elevation,
        })
    }

    /// Elevation at a distance along the track, linearly interpolated between samples.
    ///
    /// Distances outside the track clamp to the first or last sample. Returns `None` for a
    /// non-finite distance.
    pub fn elevation_at(&self, distance: f64) -> Option<f64> {
        if !distance.is_finite() {
            return None;
        }
        let first = self.samples.first()?;
        let last = self.samples.last()?;
        if distance <= first.distance {
            return Some(first.elevation);
        }
        if distance >= last.distance {
            return Some(last.elevation);
        }

        // First sample at or beyond the requested distance
        let idx = self.samples.partition_point(|s| s.distance < distance);
        // NaN sample distances break the ordering; bail out instead of indexing past either end
        let a = self.samples.get(idx.checked_sub(1)?)?;
        let b = self.samples.get(idx)?;
        let span = b.distance - a.distance;
        if span <= 0.0 {
            return Some(b.elevation);
        }
        let t = (distance - a.distance) / span;
        Some(a.elevation + t * (b.elevation - a.elevation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_utils::polyline_length;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn climb_and_descent() -> Vec<TrackPoint> {
        vec![
            TrackPoint::new(9.790, 46.315, 1800.0),
            TrackPoint::new(9.790, 46.316, 1850.0),
            TrackPoint::new(9.790, 46.317, 1900.0),
            TrackPoint::new(9.790, 46.318, 1870.0),
            TrackPoint::new(9.790, 46.319, 1880.0),
        ]
    }

    #[test]
    fn test_profile_too_short() {
        assert!(ElevationProfile::from_points(&[]).is_none());
        assert!(ElevationProfile::from_points(&[TrackPoint::new(9.79, 46.31, 1800.0)]).is_none());
    }

    #[test]
    fn test_profile_statistics() {
        let points = climb_and_descent();
        let profile = ElevationProfile::from_points(&points).unwrap();

        assert_eq!(profile.samples.len(), 5);
        assert_eq!(profile.elevation_gain, 110.0);
        assert_eq!(profile.elevation_loss, 30.0);
        assert_eq!(profile.min_elevation, 1800.0);
        assert_eq!(profile.max_elevation, 1900.0);
        assert!(approx_eq(profile.total_distance, polyline_length(&points), 1e-6));
    }

    #[test]
    fn test_profile_distances_increase() {
        let profile = ElevationProfile::from_points(&climb_and_descent()).unwrap();
        assert_eq!(profile.samples[0].distance, 0.0);
        assert!(profile.samples.windows(2).all(|w| w[1].distance > w[0].distance));
    }

    #[test]
    fn test_elevation_at() {
        let profile = ElevationProfile::from_points(&climb_and_descent()).unwrap();
        let mid = (profile.samples[0].distance + profile.samples[1].distance) / 2.0;

        assert!(approx_eq(profile.elevation_at(mid).unwrap(), 1825.0, 1e-6));
        assert_eq!(profile.elevation_at(-10.0), Some(1800.0));
        assert_eq!(profile.elevation_at(1e9), Some(1880.0));
    }

    #[test]
    fn test_elevation_at_nan() {
        let points = [
            TrackPoint::new(8.0, 47.0, 400.0),
            TrackPoint::new(8.0, 47.001, 450.0),
        ];
        let profile = ElevationProfile::from_points(&points).unwrap();
        assert_eq!(profile.elevation_at(f64::NAN), None);
        assert_eq!(profile.elevation_at(f64::INFINITY), None);

        // A NaN coordinate poisons every distance after it
        let poisoned = [
            TrackPoint::new(8.0, 47.0, 400.0),
            TrackPoint::new(f64::NAN, 47.001, 450.0),
            TrackPoint::new(8.0, 47.002, 420.0),
        ];
        let profile = ElevationProfile::from_points(&poisoned).unwrap();
        for d in [-1.0, 0.0, 50.0, 150.0, 1e9] {
            let _ = profile.elevation_at(d);
        }
    }
}
