//! # Track Layers
//!
//! Derive renderable map layers from GPS tracks.
//!
//! Given a track (ordered longitude/latitude/elevation points plus optional per-point
//! heart-rate samples), this library produces SDK-agnostic records for a 3D map renderer:
//! - The full-resolution path
//! - Decimated two-point segments carrying an averaged heart rate
//! - Start and end points
//! - An optional "wall" ribbon hanging below the track for emphasis
//! - Elevation profile data
//!
//! ## Features
//!
//! - **`geojson`** (default) - Read togeojson documents, write layers as GeoJSON
//! - **`parallel`** - Derive layers for many tracks at once with rayon
//! - **`http`** - Fetch track documents over HTTP
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use track_layers::{TrackPoint, Track, PipelineConfig, RenderMode, derive_layers};
//!
//! let points = vec![
//!     TrackPoint::new(8.6196, 47.4551, 410.0),
//!     TrackPoint::new(8.6210, 47.4560, 415.0),
//!     TrackPoint::new(8.6225, 47.4571, 423.0),
//!     TrackPoint::new(8.6240, 47.4580, 431.0),
//!     TrackPoint::new(8.6252, 47.4592, 436.0),
//! ];
//! let heart_rate = vec![120.0, 124.0, 131.0, 138.0, 142.0];
//!
//! let track = Track::new(points, Some(heart_rate)).unwrap();
//! let config = PipelineConfig { render_mode: RenderMode::WallProjection, ..PipelineConfig::default() };
//!
//! let layers = derive_layers(&track, &config).unwrap();
//! assert_eq!(layers.heart_rate_segments.as_ref().map(Vec::len), Some(2));
//! assert!(layers.wall.is_some());
//! ```

use log::debug;

pub mod error;
pub use error::{Result, TrackError};

pub mod geo_utils;

// Elevation profile series and summary statistics
pub mod profile;
pub use profile::{ElevationProfile, ProfileSample};

// Nearest-segment lookup for click handling
pub mod pick;
pub use pick::SegmentIndex;

// GeoJSON input/output boundary
#[cfg(feature = "geojson")]
pub mod geojson;

#[cfg(feature = "geojson")]
pub use geojson::LayerCollections;

// HTTP module for track fetching
#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::TrackFetcher;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("TrackLayersRust")
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A 3D track sample: WGS84 longitude/latitude in degrees and elevation in meters.
///
/// Field order follows GeoJSON positions (`[lon, lat, ele]`).
///
/// # Example
/// ```
/// use track_layers::TrackPoint;
/// let point = TrackPoint::new(9.7908, 46.3151, 2100.0); // Engadin
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct TrackPoint {
    pub longitude: f64,
    pub latitude: f64,
    pub elevation: f64,
}

impl TrackPoint {
    /// Create a new track point.
    pub fn new(longitude: f64, latitude: f64, elevation: f64) -> Self {
        Self { longitude, latitude, elevation }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.elevation.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// The same horizontal position moved down by `height` meters.
    #[inline]
    pub fn lowered(&self, height: f64) -> Self {
        Self { elevation: self.elevation - height, ..*self }
    }
}

/// An ordered track with an optional parallel heart-rate series.
///
/// When heart-rate data is present, sample `i` belongs to point `i` and the series is
/// exactly as long as the track; [`Track::new`] refuses anything else.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    points: Vec<TrackPoint>,
    heart_rate: Option<Vec<f64>>,
}

impl Track {
    /// Create a track, validating heart-rate alignment.
    ///
    /// # Example
    /// ```
    /// use track_layers::{Track, TrackPoint, TrackError};
    ///
    /// let points = vec![TrackPoint::new(8.0, 47.0, 400.0), TrackPoint::new(8.1, 47.1, 420.0)];
    /// assert!(Track::new(points.clone(), Some(vec![120.0, 125.0])).is_ok());
    ///
    /// let err = Track::new(points, Some(vec![120.0])).unwrap_err();
    /// assert_eq!(err, TrackError::LengthMismatch { points: 2, heart_rate: 1 });
    /// ```
    pub fn new(points: Vec<TrackPoint>, heart_rate: Option<Vec<f64>>) -> Result<Self> {
        if let Some(ref hr) = heart_rate {
            error::check_heart_rate_len(points.len(), hr.len())?;
        }
        Ok(Self { points, heart_rate })
    }

    /// Create a track without sensor data.
    pub fn from_points(points: Vec<TrackPoint>) -> Self {
        Self { points, heart_rate: None }
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn heart_rate(&self) -> Option<&[f64]> {
        self.heart_rate.as_deref()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Horizontal length of the track in meters.
    pub fn length(&self) -> f64 {
        geo_utils::polyline_length(&self.points)
    }

    /// Distance/elevation series for the profile chart.
    pub fn elevation_profile(&self) -> Option<ElevationProfile> {
        ElevationProfile::from_points(&self.points)
    }
}

/// A two-point sub-section of a track, used for per-section styling such as heart-rate color.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Segment {
    /// Index of the left endpoint in the source track (not a dense numbering)
    pub id: u32,
    pub start: TrackPoint,
    pub end: TrackPoint,
    /// Mean of the two endpoints' heart-rate samples, when the track has them
    pub avg_heart_rate: Option<f64>,
}

/// Which end of the track an [`Endpoint`] marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum EndpointKind {
    Start,
    End,
}

impl EndpointKind {
    /// Attribute value used for this kind in rendered layers.
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointKind::Start => "start",
            EndpointKind::End => "end",
        }
    }
}

impl std::fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Start or arrival marker of a track.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Endpoint {
    pub kind: EndpointKind,
    pub point: TrackPoint,
}

/// Vertical ribbon hanging below a track.
///
/// `top[i]` is track point `i`; `bottom[i]` sits at the same longitude/latitude,
/// `height` meters lower.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct WallGeometry {
    pub top: Vec<TrackPoint>,
    pub bottom: Vec<TrackPoint>,
    pub height: f64,
}

impl WallGeometry {
    /// One quad per consecutive pair of track points, wound
    /// `[top[i], top[i+1], bottom[i+1], bottom[i]]`.
    pub fn faces(&self) -> impl Iterator<Item = [TrackPoint; 4]> + '_ {
        self.top
            .windows(2)
            .zip(self.bottom.windows(2))
            .map(|(t, b)| [t[0], t[1], b[1], b[0]])
    }
}

/// Which geometry variant to hand to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum RenderMode {
    /// Plain line along the track
    #[default]
    Simple,
    /// Line plus a translucent wall extruded downward
    WallProjection,
}

impl RenderMode {
    /// Map the "enable wall projection" checkbox state to a mode.
    pub fn from_wall_projection(enabled: bool) -> Self {
        if enabled {
            RenderMode::WallProjection
        } else {
            RenderMode::Simple
        }
    }

    pub fn has_wall(&self) -> bool {
        matches!(self, RenderMode::WallProjection)
    }
}

/// Configuration for layer derivation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct PipelineConfig {
    /// Index distance between the two points of a heart-rate segment.
    /// Every second point keeps the segment layer light. Default: 2
    pub segment_stride: u32,

    /// Vertical extent of the wall ribbon in meters.
    /// Default: 2000.0 (reaches the ground from typical paragliding altitudes)
    pub wall_height: f64,

    /// Whether to build the wall. Default: Simple
    pub render_mode: RenderMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            segment_stride: 2,
            wall_height: 2000.0,
            render_mode: RenderMode::Simple,
        }
    }
}

impl PipelineConfig {
    /// Bike ride: plain line with heart-rate segments.
    pub fn cycling() -> Self {
        Self::default()
    }

    /// Paragliding flight: wall projection on.
    pub fn paragliding() -> Self {
        Self {
            render_mode: RenderMode::WallProjection,
            ..Self::default()
        }
    }

    /// Check the values `derive_layers` will use.
    pub fn validate(&self) -> Result<()> {
        if self.segment_stride == 0 {
            return Err(TrackError::InvalidArgument(
                "segment_stride must be at least 1".to_string(),
            ));
        }
        if self.render_mode.has_wall() {
            check_wall_height(self.wall_height)?;
        }
        Ok(())
    }
}

/// Every layer derived from one track.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct TrackLayers {
    /// Full-resolution path
    pub path: Vec<TrackPoint>,
    /// Decimated segments; `None` when the track carries no heart-rate data
    pub heart_rate_segments: Option<Vec<Segment>>,
    pub start: Endpoint,
    pub end: Endpoint,
    /// Present only in [`RenderMode::WallProjection`]
    pub wall: Option<WallGeometry>,
    pub render_mode: RenderMode,
}

impl TrackLayers {
    /// Recompute the layers after the wall projection toggle changed.
    pub fn with_render_mode(track: &Track, mode: RenderMode, config: &PipelineConfig) -> Result<Self> {
        let config = PipelineConfig {
            render_mode: mode,
            ..config.clone()
        };
        derive_layers(track, &config)
    }

    /// Both endpoints, start first.
    pub fn endpoints(&self) -> (Endpoint, Endpoint) {
        (self.start, self.end)
    }
}

// ============================================================================
// Core Functions
// ============================================================================

/// Split a track into two-point segments spaced `stride` indices apart.
///
/// Segments start at index 0 and advance by `stride`, stopping once the right endpoint
/// would run past the last point. A trailing point that cannot close a full segment
/// is dropped. Each segment's `id` is its left endpoint's index, and its
/// `avg_heart_rate` is the mean of the samples at both endpoints.
///
/// Fails with [`TrackError::InvalidArgument`] when `stride` is 0 or a segment would start
/// past index `u32::MAX`, and with
/// [`TrackError::LengthMismatch`] when the heart-rate series is misaligned.
///
/// # Example
/// ```
/// use track_layers::{TrackPoint, decimate_segments};
///
/// let points: Vec<TrackPoint> = (0..7)
///     .map(|i| TrackPoint::new(8.0 + i as f64 * 0.001, 47.0, 400.0))
///     .collect();
/// let hr = [100.0, 101.0, 110.0, 111.0, 120.0, 121.0, 130.0];
///
/// let segments = decimate_segments(&points, Some(&hr), 2).unwrap();
/// let ids: Vec<u32> = segments.iter().map(|s| s.id).collect();
/// assert_eq!(ids, vec![0, 2, 4]);
/// assert_eq!(segments[1].avg_heart_rate, Some(115.0));
/// ```
pub fn decimate_segments(
    points: &[TrackPoint],
    heart_rate: Option<&[f64]>,
    stride: usize,
) -> Result<Vec<Segment>> {
    if stride == 0 {
        return Err(TrackError::InvalidArgument(
            "segment stride must be at least 1".to_string(),
        ));
    }
    if let Some(hr) = heart_rate {
        error::check_heart_rate_len(points.len(), hr.len())?;
    }
    if points.len() < 2 {
        return Ok(Vec::new());
    }

    // Left endpoints i with i + stride <= len - 1
    let last_start = points.len().saturating_sub(stride);

    (0..last_start)
        .step_by(stride)
        .map(|i| {
            Ok(Segment {
                id: segment_id(i)?,
                start: points[i],
                end: points[i + stride],
                avg_heart_rate: heart_rate.map(|hr| (hr[i] + hr[i + stride]) / 2.0),
            })
        })
        .collect()
}

/// Segment ids are `u32` at the FFI boundary; longer tracks are rejected.
fn segment_id(index: usize) -> Result<u32> {
    u32::try_from(index).map_err(|_| {
        TrackError::InvalidArgument(format!("point index {} does not fit a segment id", index))
    })
}

/// Return the first point as the start marker and the last as the end marker.
///
/// A single-point track yields the same point twice. Fails with
/// [`TrackError::EmptyTrack`] when there are no points.
pub fn extract_endpoints(points: &[TrackPoint]) -> Result<(Endpoint, Endpoint)> {
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(TrackError::EmptyTrack),
    };

    Ok((
        Endpoint { kind: EndpointKind::Start, point: first },
        Endpoint { kind: EndpointKind::End, point: last },
    ))
}

/// Build a ribbon whose top edge is the track and whose bottom edge is the track
/// moved down by `height` meters.
///
/// Fails with [`TrackError::InvalidArgument`] unless `height` is a finite positive number.
///
/// # Example
/// ```
/// use track_layers::{TrackPoint, build_wall_geometry};
///
/// let points = vec![TrackPoint::new(9.79, 46.31, 2500.0), TrackPoint::new(9.80, 46.32, 2450.0)];
/// let wall = build_wall_geometry(&points, 100.0).unwrap();
/// assert_eq!(wall.top, points);
/// assert_eq!(wall.bottom[1].elevation, 2350.0);
/// ```
pub fn build_wall_geometry(points: &[TrackPoint], height: f64) -> Result<WallGeometry> {
    check_wall_height(height)?;

    Ok(WallGeometry {
        top: points.to_vec(),
        bottom: points.iter().map(|p| p.lowered(height)).collect(),
        height,
    })
}

/// Derive every layer for a track.
///
/// Heart-rate segments are produced only when the track carries heart-rate data;
/// the wall only in [`RenderMode::WallProjection`]. The config is validated first,
/// so a failure never leaves a half-built result.
pub fn derive_layers(track: &Track, config: &PipelineConfig) -> Result<TrackLayers> {
    config.validate()?;
    let (start, end) = extract_endpoints(track.points())?;

    let heart_rate_segments = match track.heart_rate() {
        Some(hr) => Some(decimate_segments(
            track.points(),
            Some(hr),
            config.segment_stride as usize,
        )?),
        None => None,
    };

    let wall = if config.render_mode.has_wall() {
        Some(build_wall_geometry(track.points(), config.wall_height)?)
    } else {
        None
    };

    debug!(
        "[TrackLayers] Derived layers: {} points, {:.0}m, {} segments, wall={}",
        track.len(),
        track.length(),
        heart_rate_segments.as_ref().map_or(0, Vec::len),
        wall.is_some()
    );

    Ok(TrackLayers {
        path: track.points().to_vec(),
        heart_rate_segments,
        start,
        end,
        wall,
        render_mode: config.render_mode,
    })
}

/// Derive layers for several tracks in parallel.
///
/// Results come back in input order; one bad track does not affect the others.
#[cfg(feature = "parallel")]
pub fn derive_layers_batch(tracks: &[Track], config: &PipelineConfig) -> Vec<Result<TrackLayers>> {
    use rayon::prelude::*;

    tracks
        .par_iter()
        .map(|track| derive_layers(track, config))
        .collect()
}

fn check_wall_height(height: f64) -> Result<()> {
    if !(height.is_finite() && height > 0.0) {
        return Err(TrackError::InvalidArgument(format!(
            "wall height must be positive, got {}",
            height
        )));
    }
    Ok(())
}

// ============================================================================
// FFI Exports (only when feature enabled)
// ============================================================================

#[cfg(feature = "ffi")]
mod ffi {
    use super::*;
    use log::info;

    /// Split a track into heart-rate segments.
    #[uniffi::export]
    pub fn ffi_decimate_segments(
        points: Vec<TrackPoint>,
        heart_rate: Option<Vec<f64>>,
        stride: u32,
    ) -> std::result::Result<Vec<Segment>, TrackError> {
        init_logging();
        info!("[TrackLayersRust] decimate_segments called with {} points, stride {}", points.len(), stride);
        decimate_segments(&points, heart_rate.as_deref(), stride as usize)
    }

    /// Start and end markers, start first.
    #[uniffi::export]
    pub fn ffi_extract_endpoints(points: Vec<TrackPoint>) -> std::result::Result<Vec<Endpoint>, TrackError> {
        init_logging();
        let (start, end) = extract_endpoints(&points)?;
        Ok(vec![start, end])
    }

    /// Wall ribbon below a track.
    #[uniffi::export]
    pub fn ffi_build_wall_geometry(
        points: Vec<TrackPoint>,
        height: f64,
    ) -> std::result::Result<WallGeometry, TrackError> {
        init_logging();
        build_wall_geometry(&points, height)
    }

    /// Derive every layer for a track.
    #[uniffi::export]
    pub fn ffi_derive_layers(
        points: Vec<TrackPoint>,
        heart_rate: Option<Vec<f64>>,
        config: PipelineConfig,
    ) -> std::result::Result<TrackLayers, TrackError> {
        init_logging();
        info!("[TrackLayersRust] derive_layers called with {} points ({:?})", points.len(), config.render_mode);
        let track = Track::new(points, heart_rate)?;
        derive_layers(&track, &config)
    }

    /// Derive layers straight from a togeojson document.
    #[cfg(feature = "geojson")]
    #[uniffi::export]
    pub fn ffi_derive_layers_from_geojson(
        document: String,
        config: PipelineConfig,
    ) -> std::result::Result<TrackLayers, TrackError> {
        init_logging();
        let track = Track::from_geojson(&document)?;
        info!("[TrackLayersRust] Parsed GeoJSON track: {} points, heart rate: {}", track.len(), track.heart_rate().is_some());
        derive_layers(&track, &config)
    }

    /// Download a togeojson document and derive its layers.
    #[cfg(feature = "http")]
    #[uniffi::export]
    pub fn ffi_fetch_layers(url: String, config: PipelineConfig) -> std::result::Result<TrackLayers, TrackError> {
        init_logging();
        let track = crate::http::fetch_track_sync(&url)?;
        derive_layers(&track, &config)
    }

    /// Elevation profile series for a track.
    #[uniffi::export]
    pub fn ffi_elevation_profile(points: Vec<TrackPoint>) -> Option<ElevationProfile> {
        init_logging();
        ElevationProfile::from_points(&points)
    }

    /// Get default configuration.
    #[uniffi::export]
    pub fn default_config() -> PipelineConfig {
        init_logging();
        info!("[TrackLayersRust] default_config called - Rust is active!");
        PipelineConfig::default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points(n: usize) -> Vec<TrackPoint> {
        (0..n)
            .map(|i| TrackPoint::new(8.6196 + i as f64 * 0.001, 47.4551 + i as f64 * 0.0005, 410.0 + i as f64 * 5.0))
            .collect()
    }

    fn sample_heart_rate(n: usize) -> Vec<f64> {
        (0..n).map(|i| 120.0 + (i * i) as f64).collect()
    }

    #[test]
    fn test_track_point_validation() {
        assert!(TrackPoint::new(8.6196, 47.4551, 410.0).is_valid());
        assert!(!TrackPoint::new(0.0, 91.0, 0.0).is_valid());
        assert!(!TrackPoint::new(181.0, 0.0, 0.0).is_valid());
        assert!(!TrackPoint::new(0.0, 0.0, f64::NAN).is_valid());
    }

    #[test]
    fn test_decimate_seven_points() {
        let points = sample_points(7);
        let segments = decimate_segments(&points, None, 2).unwrap();

        let ids: Vec<u32> = segments.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![0, 2, 4]);
        assert_eq!(segments[2].start, points[4]);
        assert_eq!(segments[2].end, points[6]);
        assert!(segments.iter().all(|s| s.avg_heart_rate.is_none()));
    }

    #[test]
    fn test_decimate_segment_count() {
        for n in 2..20 {
            let segments = decimate_segments(&sample_points(n), None, 2).unwrap();
            assert_eq!(segments.len(), (n - 1) / 2, "n = {}", n);
        }
    }

    #[test]
    fn test_decimate_drops_trailing_point() {
        // Even length at stride 2: the last point cannot close a segment
        let points = sample_points(6);
        let segments = decimate_segments(&points, None, 2).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments.last().unwrap().end, points[4]);
    }

    #[test]
    fn test_decimate_averages_heart_rate() {
        let points = sample_points(9);
        let hr = sample_heart_rate(9);
        let segments = decimate_segments(&points, Some(&hr), 2).unwrap();

        assert_eq!(segments.len(), 4);
        for s in &segments {
            let i = s.id as usize;
            assert_eq!(s.avg_heart_rate, Some((hr[i] + hr[i + 2]) / 2.0));
        }
    }

    #[test]
    fn test_decimate_stride_one() {
        let points = sample_points(4);
        let segments = decimate_segments(&points, None, 1).unwrap();
        let ids: Vec<u32> = segments.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_decimate_stride_longer_than_track() {
        let segments = decimate_segments(&sample_points(3), None, 5).unwrap();
        assert!(segments.is_empty());
    }

    #[test]
    fn test_decimate_single_point() {
        assert!(decimate_segments(&sample_points(1), None, 2).unwrap().is_empty());
        assert!(decimate_segments(&[], None, 2).unwrap().is_empty());
    }

    #[test]
    fn test_decimate_zero_stride() {
        let result = decimate_segments(&sample_points(5), None, 0);
        assert!(matches!(result, Err(TrackError::InvalidArgument(_))));
    }

    #[test]
    fn test_segment_id_range() {
        assert_eq!(segment_id(0), Ok(0));
        assert_eq!(segment_id(u32::MAX as usize), Ok(u32::MAX));
        #[cfg(target_pointer_width = "64")]
        assert!(matches!(
            segment_id(u32::MAX as usize + 1),
            Err(TrackError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_decimate_length_mismatch() {
        let points = sample_points(5);
        let hr = sample_heart_rate(4);
        assert_eq!(
            decimate_segments(&points, Some(&hr), 2),
            Err(TrackError::LengthMismatch { points: 5, heart_rate: 4 })
        );
    }

    #[test]
    fn test_endpoints() {
        let points = sample_points(5);
        let (start, end) = extract_endpoints(&points).unwrap();
        assert_eq!(start.kind, EndpointKind::Start);
        assert_eq!(start.point, points[0]);
        assert_eq!(end.kind, EndpointKind::End);
        assert_eq!(end.point, points[4]);
    }

    #[test]
    fn test_endpoints_single_point() {
        let points = sample_points(1);
        let (start, end) = extract_endpoints(&points).unwrap();
        assert_eq!(start.point, points[0]);
        assert_eq!(end.point, points[0]);
    }

    #[test]
    fn test_endpoints_empty() {
        assert_eq!(extract_endpoints(&[]), Err(TrackError::EmptyTrack));
    }

    #[test]
    fn test_wall_geometry() {
        let points = sample_points(3);
        let wall = build_wall_geometry(&points, 100.0).unwrap();

        assert_eq!(wall.top, points);
        assert_eq!(wall.bottom.len(), 3);
        for (b, p) in wall.bottom.iter().zip(&points) {
            assert_eq!(b.longitude, p.longitude);
            assert_eq!(b.latitude, p.latitude);
            assert_eq!(b.elevation, p.elevation - 100.0);
        }

        let faces: Vec<[TrackPoint; 4]> = wall.faces().collect();
        assert_eq!(faces.len(), 2);
        assert_eq!(faces[0], [points[0], points[1], wall.bottom[1], wall.bottom[0]]);
    }

    #[test]
    fn test_wall_rejects_bad_height() {
        let points = sample_points(3);
        for height in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                build_wall_geometry(&points, height),
                Err(TrackError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_track_rejects_misaligned_heart_rate() {
        let result = Track::new(sample_points(5), Some(sample_heart_rate(4)));
        assert_eq!(result, Err(TrackError::LengthMismatch { points: 5, heart_rate: 4 }));
    }

    #[test]
    fn test_derive_layers_simple() {
        let track = Track::new(sample_points(7), Some(sample_heart_rate(7))).unwrap();
        let layers = derive_layers(&track, &PipelineConfig::cycling()).unwrap();

        assert_eq!(layers.path.len(), 7);
        assert_eq!(layers.heart_rate_segments.as_ref().map(Vec::len), Some(3));
        assert_eq!(layers.start.point, track.points()[0]);
        assert_eq!(layers.end.point, track.points()[6]);
        assert!(layers.wall.is_none());
        assert_eq!(layers.render_mode, RenderMode::Simple);
    }

    #[test]
    fn test_derive_layers_wall_projection() {
        let track = Track::from_points(sample_points(4));
        let layers = derive_layers(&track, &PipelineConfig::paragliding()).unwrap();

        assert!(layers.heart_rate_segments.is_none());
        let wall = layers.wall.unwrap();
        assert_eq!(wall.height, 2000.0);
        assert_eq!(wall.bottom[0].elevation, track.points()[0].elevation - 2000.0);
    }

    #[test]
    fn test_render_mode_default() {
        assert_eq!(RenderMode::default(), RenderMode::Simple);
        assert_eq!(PipelineConfig::default().render_mode, RenderMode::Simple);
        assert!(!RenderMode::default().has_wall());
    }

    #[test]
    fn test_toggle_wall_projection() {
        let track = Track::from_points(sample_points(4));
        let config = PipelineConfig::default();

        let on = TrackLayers::with_render_mode(&track, RenderMode::from_wall_projection(true), &config).unwrap();
        assert!(on.wall.is_some());

        let off = TrackLayers::with_render_mode(&track, RenderMode::from_wall_projection(false), &config).unwrap();
        assert!(off.wall.is_none());
        assert_eq!(on.path, off.path);
    }

    #[test]
    fn test_derive_layers_errors() {
        let empty = Track::from_points(Vec::new());
        assert_eq!(derive_layers(&empty, &PipelineConfig::default()), Err(TrackError::EmptyTrack));

        let track = Track::from_points(sample_points(3));
        let config = PipelineConfig { segment_stride: 0, ..PipelineConfig::default() };
        assert!(matches!(derive_layers(&track, &config), Err(TrackError::InvalidArgument(_))));

        let config = PipelineConfig { wall_height: -1.0, ..PipelineConfig::paragliding() };
        assert!(matches!(derive_layers(&track, &config), Err(TrackError::InvalidArgument(_))));

        // Wall height is irrelevant without the wall
        let config = PipelineConfig { wall_height: -1.0, ..PipelineConfig::cycling() };
        assert!(derive_layers(&track, &config).is_ok());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_derive_layers_batch() {
        let tracks = vec![
            Track::new(sample_points(5), Some(sample_heart_rate(5))).unwrap(),
            Track::from_points(Vec::new()),
            Track::from_points(sample_points(3)),
        ];

        let results = derive_layers_batch(&tracks, &PipelineConfig::default());
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().heart_rate_segments.as_ref().map(Vec::len), Some(2));
        assert_eq!(results[1], Err(TrackError::EmptyTrack));
        assert_eq!(results[2].as_ref().unwrap().path.len(), 3);
    }
}
