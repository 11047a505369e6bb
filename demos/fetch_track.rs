//! Fetch togeojson tracks over HTTP and derive their layers.
//!
//! Run with: cargo run --example fetch_track --features http -- <url> [<url>...]

use std::env;
use track_layers::{derive_layers, PipelineConfig, TrackFetcher};

#[tokio::main]
async fn main() {
    let urls: Vec<String> = env::args().skip(1).collect();
    if urls.is_empty() {
        eprintln!("usage: fetch_track <url> [<url>...]");
        std::process::exit(1);
    }

    let fetcher = match TrackFetcher::new() {
        Ok(f) => f,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let config = PipelineConfig::default();
    for (url, result) in urls.iter().zip(fetcher.fetch_tracks(urls.clone()).await) {
        match result.and_then(|track| derive_layers(&track, &config)) {
            Ok(layers) => println!(
                "{}: {} points, {} heart-rate segments",
                url,
                layers.path.len(),
                layers.heart_rate_segments.as_ref().map_or(0, Vec::len)
            ),
            Err(e) => println!("{}: {}", url, e),
        }
    }
}
