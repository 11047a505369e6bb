//! Derive layers for many tracks at once.
//!
//! Run with: cargo run --example batch_layers --features parallel

use std::time::Instant;
use track_layers::{derive_layers_batch, PipelineConfig, Track, TrackPoint};

fn main() {
    println!("Batch Layer Derivation Example\n");

    let mut tracks = Vec::new();

    // Rides with heart rate, flights without
    for i in 0..200 {
        let len = 500 + i * 10;
        let points = synthetic_track(8.6 + i as f64 * 0.01, 47.45, 400.0, len);
        if i % 2 == 0 {
            let hr: Vec<f64> = (0..len).map(|j| 110.0 + (j % 80) as f64).collect();
            tracks.push(Track::new(points, Some(hr)).expect("aligned"));
        } else {
            tracks.push(Track::from_points(points));
        }
    }
    // One broken track to show per-track errors
    tracks.push(Track::from_points(Vec::new()));

    let config = PipelineConfig::paragliding();
    let start = Instant::now();
    let results = derive_layers_batch(&tracks, &config);
    let elapsed = start.elapsed();

    let ok = results.iter().filter(|r| r.is_ok()).count();
    let segments: usize = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .filter_map(|l| l.heart_rate_segments.as_ref())
        .map(Vec::len)
        .sum();

    println!("Derived {}/{} tracks in {:?}", ok, tracks.len(), elapsed);
    println!("Heart-rate segments: {}", segments);
    for (i, r) in results.iter().enumerate() {
        if let Err(e) = r {
            println!("Track {} failed: {}", i, e);
        }
    }
}

fn synthetic_track(lon: f64, lat: f64, ele: f64, len: usize) -> Vec<TrackPoint> {
    (0..len)
        .map(|j| {
            let t = j as f64;
            TrackPoint::new(lon + t * 0.0001, lat + (t * 0.05).sin() * 0.001, ele + (t * 0.02).cos() * 50.0)
        })
        .collect()
}
