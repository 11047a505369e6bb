//! GeoJSON boundary.
//!
//! Tracks arrive as the GeoJSON that togeojson produces from a GPX file: a FeatureCollection
//! whose first feature holds the track geometry, with per-point sensor readings under
//! `properties.coordinateProperties`. Derived layers leave as FeatureCollections whose
//! attribute names match what the map layers are configured with (`ObjectID`, `heartRate`,
//! `type`).

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{Result, Segment, Endpoint, Track, TrackError, TrackLayers, TrackPoint, WallGeometry};

// ============================================================================
// Input
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Document {
    FeatureCollection { features: Vec<Feature> },
    Feature(Feature),
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<Properties>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    LineString { coordinates: Vec<Vec<f64>> },
    MultiLineString { coordinates: Vec<Vec<Vec<f64>>> },
}

#[derive(Debug, Deserialize)]
struct Properties {
    #[serde(rename = "coordinateProperties", default)]
    coordinate_properties: Option<CoordinateProperties>,
}

#[derive(Debug, Deserialize)]
struct CoordinateProperties {
    #[serde(default)]
    heart: Option<HeartSeries>,
}

/// Flat for a LineString, one array per line for a MultiLineString.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HeartSeries {
    Flat(Vec<Option<f64>>),
    Nested(Vec<Vec<Option<f64>>>),
}

impl HeartSeries {
    fn flatten(self) -> Vec<Option<f64>> {
        match self {
            HeartSeries::Flat(values) => values,
            HeartSeries::Nested(lines) => lines.into_iter().flatten().collect(),
        }
    }
}

impl Track {
    /// Read a track from a togeojson document.
    ///
    /// Accepts a FeatureCollection (the first feature is used) or a bare Feature, with a
    /// LineString or MultiLineString geometry; MultiLineString parts are joined in order.
    /// Positions without an elevation get 0.0; positions outside WGS84 ranges are rejected
    /// rather than skipped, so heart-rate samples stay aligned. A heart-rate series with gaps is dropped
    /// entirely, since the samples must line up with the points one-to-one.
    ///
    /// # Example
    /// ```
    /// use track_layers::Track;
    ///
    /// let doc = r#"{
    ///     "type": "FeatureCollection",
    ///     "features": [{
    ///         "type": "Feature",
    ///         "geometry": {
    ///             "type": "LineString",
    ///             "coordinates": [[8.6196, 47.4551, 410.0], [8.6210, 47.4560, 415.0]]
    ///         },
    ///         "properties": { "coordinateProperties": { "heart": [121, 124] } }
    ///     }]
    /// }"#;
    ///
    /// let track = Track::from_geojson(doc).unwrap();
    /// assert_eq!(track.len(), 2);
    /// assert_eq!(track.heart_rate(), Some(&[121.0, 124.0][..]));
    /// ```
    pub fn from_geojson(document: &str) -> Result<Self> {
        let doc: Document = serde_json::from_str(document)
            .map_err(|e| TrackError::InvalidGeoJson(e.to_string()))?;
        Self::from_document(doc)
    }

    /// Same as [`Track::from_geojson`] for raw bytes (e.g. an HTTP body).
    pub fn from_geojson_slice(document: &[u8]) -> Result<Self> {
        let doc: Document = serde_json::from_slice(document)
            .map_err(|e| TrackError::InvalidGeoJson(e.to_string()))?;
        Self::from_document(doc)
    }

    fn from_document(doc: Document) -> Result<Self> {
        let feature = match doc {
            Document::FeatureCollection { features } => features
                .into_iter()
                .next()
                .ok_or_else(|| TrackError::InvalidGeoJson("feature collection is empty".to_string()))?,
            Document::Feature(feature) => feature,
        };

        let positions = match feature.geometry {
            Some(Geometry::LineString { coordinates }) => coordinates,
            Some(Geometry::MultiLineString { coordinates }) => coordinates.into_iter().flatten().collect(),
            None => return Err(TrackError::InvalidGeoJson("feature has no geometry".to_string())),
        };

        let points = positions
            .iter()
            .map(|p| to_track_point(p))
            .collect::<Result<Vec<TrackPoint>>>()?;

        let heart = feature
            .properties
            .and_then(|p| p.coordinate_properties)
            .and_then(|c| c.heart)
            .map(HeartSeries::flatten);

        let heart_rate = match heart {
            Some(samples) if samples.iter().all(Option::is_some) => {
                Some(samples.into_iter().flatten().collect::<Vec<f64>>())
            }
            Some(samples) => {
                let missing = samples.iter().filter(|s| s.is_none()).count();
                warn!(
                    "[TrackLayers] Dropping heart-rate series: {} of {} samples missing",
                    missing,
                    samples.len()
                );
                None
            }
            None => None,
        };

        debug!(
            "[TrackLayers] Parsed GeoJSON track: {} points, heart rate: {}",
            points.len(),
            heart_rate.is_some()
        );

        Track::new(points, heart_rate)
    }
}

fn to_track_point(position: &[f64]) -> Result<TrackPoint> {
    let point = match position {
        [lon, lat] => TrackPoint::new(*lon, *lat, 0.0),
        [lon, lat, ele, ..] => TrackPoint::new(*lon, *lat, *ele),
        _ => {
            return Err(TrackError::InvalidGeoJson(format!(
                "position needs at least 2 values, got {}",
                position.len()
            )))
        }
    };

    // Dropping the point would shift the heart-rate samples, so reject instead
    if !point.is_valid() {
        return Err(TrackError::InvalidGeoJson(format!(
            "position out of range: {:?}",
            position
        )));
    }
    Ok(point)
}

// ============================================================================
// Output
// ============================================================================

/// Derived layers as GeoJSON FeatureCollections, one per map layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerCollections {
    /// The full track as a single LineString feature
    pub path: Value,
    /// One LineString per segment with `ObjectID` and `heartRate`
    pub heart_rate: Option<Value>,
    /// Start (`ObjectID` 1) and end (`ObjectID` 2) points with `type`
    pub endpoints: Value,
    /// One Polygon per wall face
    pub wall: Option<Value>,
}

impl TrackLayers {
    pub fn to_feature_collections(&self) -> LayerCollections {
        LayerCollections {
            path: feature_collection(vec![json!({
                "type": "Feature",
                "geometry": {
                    "type": "LineString",
                    "coordinates": self.path.iter().map(position).collect::<Vec<_>>(),
                },
                "properties": {},
            })]),
            heart_rate: self
                .heart_rate_segments
                .as_ref()
                .map(|segments| feature_collection(segments.iter().map(segment_feature).collect())),
            endpoints: feature_collection(vec![
                endpoint_feature(&self.start, 1),
                endpoint_feature(&self.end, 2),
            ]),
            wall: self.wall.as_ref().map(wall_collection),
        }
    }
}

fn position(p: &TrackPoint) -> Value {
    json!([p.longitude, p.latitude, p.elevation])
}

fn feature_collection(features: Vec<Value>) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

fn segment_feature(segment: &Segment) -> Value {
    json!({
        "type": "Feature",
        "geometry": {
            "type": "LineString",
            "coordinates": [position(&segment.start), position(&segment.end)],
        },
        "properties": {
            "ObjectID": segment.id,
            "heartRate": segment.avg_heart_rate,
        },
    })
}

fn endpoint_feature(endpoint: &Endpoint, object_id: u32) -> Value {
    json!({
        "type": "Feature",
        "geometry": {
            "type": "Point",
            "coordinates": position(&endpoint.point),
        },
        "properties": {
            "ObjectID": object_id,
            "type": endpoint.kind.as_str(),
        },
    })
}

fn wall_collection(wall: &WallGeometry) -> Value {
    let features = wall
        .faces()
        .enumerate()
        .map(|(i, [a, b, c, d])| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[position(&a), position(&b), position(&c), position(&d), position(&a)]],
                },
                "properties": { "ObjectID": i },
            })
        })
        .collect();
    feature_collection(features)
}
