//! Derive map layers from a small bike ride.
//!
//! Run with: cargo run --example derive_layers

use track_layers::{derive_layers, PipelineConfig, RenderMode, SegmentIndex, Track, TrackLayers, TrackPoint};

fn main() {
    // A short ride north of Zurich with a heart-rate strap
    let points: Vec<TrackPoint> = (0..11)
        .map(|i| {
            let t = i as f64;
            TrackPoint::new(8.6196 + t * 0.0012, 47.4551 - t * 0.0008, 410.0 + t * t * 0.9)
        })
        .collect();
    let heart_rate: Vec<f64> = (0..11).map(|i| 118.0 + i as f64 * 6.5).collect();

    let track = Track::new(points, Some(heart_rate)).expect("heart rate matches points");
    let config = PipelineConfig::cycling();

    println!("Track Layers Example\n");
    println!("Config: stride={}, wall_height={}m, mode={:?}\n",
        config.segment_stride, config.wall_height, config.render_mode);

    let layers = derive_layers(&track, &config).expect("valid track");

    println!("1. Path: {} points, {:.0}m", layers.path.len(), track.length());
    println!("2. Endpoints: {} {:?} / {} {:?}",
        layers.start.kind, layers.start.point, layers.end.kind, layers.end.point);

    if let Some(ref segments) = layers.heart_rate_segments {
        println!("3. Heart-rate segments:");
        for s in segments {
            println!("   #{:<2} {:.1} bpm", s.id, s.avg_heart_rate.unwrap_or_default());
        }

        // Simulate a click next to the middle of the ride
        let index = SegmentIndex::new(segments.clone());
        let mid = track.points()[5];
        match index.pick(mid.longitude + 0.0001, mid.latitude, 50.0) {
            Some(s) => println!("   Click near point 5 -> segment #{} ({:.1} bpm)", s.id, s.avg_heart_rate.unwrap_or_default()),
            None => println!("   Click near point 5 -> nothing"),
        }
    }

    if let Some(profile) = track.elevation_profile() {
        println!("4. Profile: {:.0}m, +{:.0}m / -{:.0}m, {:.0}-{:.0}m",
            profile.total_distance, profile.elevation_gain, profile.elevation_loss,
            profile.min_elevation, profile.max_elevation);
    }

    // Toggle the wall on, as the checkbox would
    let walled = TrackLayers::with_render_mode(&track, RenderMode::from_wall_projection(true), &config)
        .expect("valid config");
    if let Some(ref wall) = walled.wall {
        println!("5. Wall: {} faces, {}m tall", wall.faces().count(), wall.height);
    }

    let collections = walled.to_feature_collections();
    println!("\nEndpoints layer:\n{}", serde_json::to_string_pretty(&collections.endpoints).unwrap_or_default());
}
