//! HTTP client for track documents.
//!
//! Fetches togeojson documents and parses them into [`Track`]s:
//! - Connection pooling shared across requests
//! - Concurrent fetching with bounded concurrency
//! - Automatic retry with exponential backoff on connection errors and 429

use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use reqwest::{Client, StatusCode};

use crate::{Result, Track, TrackError};

const MAX_CONCURRENCY: usize = 8;
const MAX_RETRIES: u32 = 3;

/// Backoff before retry number `attempt` (1-based): 400ms, 800ms, 1.6s.
fn retry_delay(attempt: u32) -> Duration {
    Duration::from_millis(200 * (1 << attempt.min(4)))
}

/// Connection and timeout failures may succeed on retry; anything else (bad URL,
/// builder errors, redirect loops) will not.
fn is_transient(e: &reqwest::Error) -> bool {
    !e.is_builder() && (e.is_connect() || e.is_timeout())
}

/// Fetches and parses track documents.
pub struct TrackFetcher {
    client: Client,
}

impl TrackFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(MAX_CONCURRENCY)
            .pool_idle_timeout(Duration::from_secs(60))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TrackError::Fetch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Download one togeojson document and parse it.
    ///
    /// Connection errors, timeouts and 429 responses are retried up to `MAX_RETRIES` times; any
    /// other non-success status fails straight away.
    pub async fn fetch_track(&self, url: &str) -> Result<Track> {
        let mut retries = 0;
        let req_start = Instant::now();

        loop {
            match self.client.get(url).send().await {
                Ok(resp) => {
                    let status = resp.status();

                    if status == StatusCode::TOO_MANY_REQUESTS && retries < MAX_RETRIES {
                        retries += 1;
                        let wait = retry_delay(retries);
                        warn!("[Fetch {}] 429 Too Many Requests, retry {} with {:?} backoff", url, retries, wait);
                        tokio::time::sleep(wait).await;
                        continue;
                    }

                    if !status.is_success() {
                        return Err(TrackError::Fetch(format!("HTTP {} for {}", status, url)));
                    }

                    let bytes = resp
                        .bytes()
                        .await
                        .map_err(|e| TrackError::Fetch(format!("Body download error: {}", e)))?;

                    let track = Track::from_geojson_slice(&bytes)?;

                    info!(
                        "[Fetch {}] {:.1}KB, {} points, heart rate: {}, in {:?}",
                        url,
                        bytes.len() as f64 / 1024.0,
                        track.len(),
                        track.heart_rate().is_some(),
                        req_start.elapsed()
                    );

                    return Ok(track);
                }
                Err(e) => {
                    if !is_transient(&e) {
                        return Err(TrackError::Fetch(format!("Request error: {}", e)));
                    }

                    retries += 1;
                    if retries > MAX_RETRIES {
                        return Err(TrackError::Fetch(format!("Request error: {}", e)));
                    }

                    let wait = retry_delay(retries);
                    warn!("[Fetch {}] Error: {}, retry {} after {:?}", url, e, retries, wait);
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// Fetch several tracks concurrently. Results keep the order of `urls`.
    pub async fn fetch_tracks(&self, urls: Vec<String>) -> Vec<Result<Track>> {
        let total = urls.len();
        let start = Instant::now();
        debug!("[TrackFetcher] Fetching {} tracks (max concurrent: {})", total, MAX_CONCURRENCY);

        let results: Vec<Result<Track>> = stream::iter(urls)
            .map(|url| async move { self.fetch_track(&url).await })
            .buffered(MAX_CONCURRENCY)
            .collect()
            .await;

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        info!(
            "[TrackFetcher] DONE: {}/{} tracks in {:.2}s",
            success_count,
            total,
            start.elapsed().as_secs_f64()
        );

        results
    }
}

/// Synchronous wrapper for FFI - runs the async code on a tokio runtime
#[cfg(feature = "ffi")]
pub fn fetch_track_sync(url: &str) -> Result<Track> {
    use tokio::runtime::Builder;

    let rt = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| TrackError::Fetch(format!("Runtime error: {}", e)))?;

    let fetcher = TrackFetcher::new()?;
    rt.block_on(fetcher.fetch_track(url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_doubles() {
        assert_eq!(retry_delay(1), Duration::from_millis(400));
        assert_eq!(retry_delay(2), Duration::from_millis(800));
        assert_eq!(retry_delay(3), Duration::from_millis(1600));
        // Capped
        assert_eq!(retry_delay(10), retry_delay(4));
    }

    #[tokio::test]
    async fn test_unreachable_host_fails() {
        let fetcher = TrackFetcher::new().unwrap();
        // Nothing listens on the discard port
        let result = fetcher.fetch_track("http://127.0.0.1:9/track.geojson").await;
        assert!(matches!(result, Err(TrackError::Fetch(_))));
    }

    #[tokio::test]
    async fn test_fetch_tracks_keeps_order() {
        let fetcher = TrackFetcher::new().unwrap();
        let urls = vec![
            "http://127.0.0.1:9/a.geojson".to_string(),
            "not a url".to_string(),
        ];
        let results = fetcher.fetch_tracks(urls).await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| matches!(r, Err(TrackError::Fetch(_)))));
    }

    #[tokio::test]
    async fn test_invalid_url_fails_without_retry() {
        let fetcher = TrackFetcher::new().unwrap();
        let start = Instant::now();
        let result = fetcher.fetch_track("not a url").await;
        assert!(matches!(result, Err(TrackError::Fetch(_))));
        // First backoff alone would be 400ms
        assert!(start.elapsed() < Duration::from_millis(300), "took {:?}", start.elapsed());
    }
}
