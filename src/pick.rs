//! Nearest-segment lookup.
//!
//! When the user clicks the map, the renderer needs the segment under the cursor to show
//! its heart rate. Segments are indexed in an R-tree after projecting them to meters around
//! the track's latitude, so distance queries come back in meters.

use rstar::primitives::{GeomWithData, Line};
use rstar::{PointDistance, RTree};

use crate::geo_utils::LocalProjection;
use crate::Segment;

type IndexedLine = GeomWithData<Line<[f64; 2]>, usize>;

/// Spatial index over a set of segments.
pub struct SegmentIndex {
    segments: Vec<Segment>,
    projection: LocalProjection,
    tree: RTree<IndexedLine>,
}

impl SegmentIndex {
    /// Index a set of segments.
    ///
    /// The projection is centered on the first segment's latitude; an empty set gives an
    /// empty index.
    pub fn new(segments: Vec<Segment>) -> Self {
        let ref_lat = segments.first().map_or(0.0, |s| s.start.latitude);
        let projection = LocalProjection::new(ref_lat);

        let lines: Vec<IndexedLine> = segments
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let a = projection.project(s.start.longitude, s.start.latitude);
                let b = projection.project(s.end.longitude, s.end.latitude);
                GeomWithData::new(Line::new(a, b), i)
            })
            .collect();

        Self {
            segments,
            projection,
            tree: RTree::bulk_load(lines),
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segment closest to a location, with its distance in meters.
    pub fn nearest(&self, longitude: f64, latitude: f64) -> Option<(&Segment, f64)> {
        let query = self.projection.project(longitude, latitude);
        let hit = self.tree.nearest_neighbor(&query)?;
        let distance = hit.distance_2(&query).sqrt();
        Some((&self.segments[hit.data], distance))
    }

    /// The segment closest to a location, if it lies within `max_distance` meters.
    ///
    /// # Example
    /// ```
    /// use track_layers::{TrackPoint, SegmentIndex, decimate_segments};
    ///
    /// let points: Vec<TrackPoint> = (0..5)
    ///     .map(|i| TrackPoint::new(8.60 + i as f64 * 0.01, 47.45, 400.0))
    ///     .collect();
    /// let hr = [120.0, 125.0, 130.0, 135.0, 140.0];
    /// let index = SegmentIndex::new(decimate_segments(&points, Some(&hr), 2).unwrap());
    ///
    /// let hit = index.pick(8.635, 47.4501, 50.0).unwrap();
    /// assert_eq!(hit.id, 2);
    /// assert!(index.pick(8.635, 47.46, 50.0).is_none());
    /// ```
    pub fn pick(&self, longitude: f64, latitude: f64, max_distance: f64) -> Option<&Segment> {
        self.nearest(longitude, latitude)
            .filter(|(_, distance)| *distance <= max_distance)
            .map(|(segment, _)| segment)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}
