//! Counters for Web API traffic
//!
//! - `spotify_api_requests_total` (counter): label `status`
//! - `spotify_api_rate_limited_total` (counter)
//! - `spotify_api_network_errors_total` (counter)
//! - `spotify_api_pages_fetched_total` (counter)
//!
//! These are no-ops until the binary installs a recorder.

pub fn record_request(status: u16) {
    metrics::counter!("spotify_api_requests_total", "status" => status.to_string()).increment(1);
    if status == 429 {
        metrics::counter!("spotify_api_rate_limited_total").increment(1);
    }
}

pub fn record_network_error() {
    metrics::counter!("spotify_api_network_errors_total").increment(1);
}

pub fn record_page() {
    metrics::counter!("spotify_api_pages_fetched_total").increment(1);
}
