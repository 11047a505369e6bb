//! Error type shared by every pipeline operation.

use thiserror::Error;

/// Failures raised while deriving layers from a track.
///
/// All variants except [`TrackError::Fetch`] are input validation failures raised
/// before any work is done, so no partial result ever accompanies an error.
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error))]
#[cfg_attr(feature = "ffi", uniffi(flat_error))]
pub enum TrackError {
    /// The track has no points where at least one is required.
    #[error("track has no points")]
    EmptyTrack,

    /// A stride, height, or other numeric argument is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Heart-rate samples do not line up one-to-one with the track points.
    #[error("heart-rate series has {heart_rate} samples but track has {points} points")]
    LengthMismatch { points: u64, heart_rate: u64 },

    /// The input document is not a usable togeojson track.
    #[cfg(feature = "geojson")]
    #[error("invalid GeoJSON: {0}")]
    InvalidGeoJson(String),

    /// The track document could not be downloaded.
    #[cfg(feature = "http")]
    #[error("fetch failed: {0}")]
    Fetch(String),
}

pub type Result<T> = std::result::Result<T, TrackError>;

/// Reject a heart-rate series that is not exactly as long as the track.
pub(crate) fn check_heart_rate_len(points: usize, heart_rate: usize) -> Result<()> {
    if points != heart_rate {
        return Err(TrackError::LengthMismatch {
            points: points as u64,
            heart_rate: heart_rate as u64,
        });
    }
    Ok(())
}
