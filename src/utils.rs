//! Small helpers shared across modules.
//!
//! - Greeting selection from the local hour
//! - String capitalisation and truncation for logging
//! - The single HTTP GET helper every fetcher goes through

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

/// Timeout for feed and weather requests.
pub const LONG_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout for article pages and novelty endpoints.
pub const SHORT_TIMEOUT: Duration = Duration::from_secs(5);

/// Greeting for the given hour of the day (0-23).
///
/// - **Morning**: 05:00 - 11:59
/// - **Afternoon**: 12:00 - 17:59
/// - **Evening**: everything else
pub fn greeting_for_hour(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Good morning",
        12..=17 => "Good afternoon",
        _ => "Good evening",
    }
}

/// Uppercase the first character and lowercase the rest.
///
/// ```ignore
/// assert_eq!(capitalize("light RAIN"), "Light rain");
/// ```
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
    }
}

/// Truncate a string for logging purposes.
///
/// Cuts on a character boundary at or below `max` bytes and appends
/// `"…(+N bytes)"`.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// GET `url` and return the body as text.
///
/// Non-2xx statuses are turned into errors. Each call carries its own timeout,
/// and a timeout surfaces as an ordinary `reqwest::Error`.
///
/// The URL is not recorded on the span; weather URLs carry the API key.
#[instrument(level = "debug", skip_all, fields(timeout_secs = timeout.as_secs()))]
pub async fn fetch_text(client: &Client, url: &str, timeout: Duration) -> Result<String, reqwest::Error> {
    let response = client.get(url).timeout(timeout).send().await?.error_for_status()?;
    let body = response.text().await?;
    debug!(bytes = body.len(), "Fetched body");
    Ok(body)
}
