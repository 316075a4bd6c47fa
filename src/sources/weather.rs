//! One-day forecast from the OpenWeatherMap One Call API 3.0.
//!
//! Only the first `daily` entry is used. Metric units are requested from the
//! provider, so values are passed through unconverted.

use crate::models::WeatherSummary;
use crate::utils::{LONG_TIMEOUT, fetch_text, truncate_for_log};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, instrument, warn};
use url::Url;

pub const WEATHER_API_URL: &str = "https://api.openweathermap.org/data/3.0/onecall";

/// Why a forecast response could not be turned into a [`WeatherSummary`].
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("invalid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("'daily' weather data not found")]
    MissingDaily,

    #[error("missing key in daily entry: {0}")]
    MissingKey(#[source] serde_json::Error),

    #[error("daily entry has an empty 'weather' list")]
    NoConditions,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    daily: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct DailyEntry {
    weather: Vec<Condition>,
    temp: Temperatures,
    feels_like: FeelsLike,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct Temperatures {
    max: f64,
    min: f64,
}

#[derive(Debug, Deserialize)]
struct FeelsLike {
    day: f64,
}

/// Build the request URL for a coordinate pair against `endpoint`.
pub fn forecast_url(endpoint: &str, lat: f64, lon: f64, api_key: &str) -> Result<Url, url::ParseError> {
    let (lat, lon) = (lat.to_string(), lon.to_string());
    Url::parse_with_params(
        endpoint,
        &[
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("exclude", "minutely,hourly,alerts"),
            ("units", "metric"),
            ("appid", api_key),
        ],
    )
}

/// Decode a forecast response body.
///
/// A `daily` value that is absent, null, not an array or an empty array is
/// [`WeatherError::MissingDaily`].
pub fn parse_forecast(body: &str) -> Result<WeatherSummary, WeatherError> {
    let response: ForecastResponse = serde_json::from_str(body).map_err(WeatherError::Json)?;
    let first = match response.daily {
        Some(serde_json::Value::Array(days)) => days.into_iter().next(),
        _ => None,
    }
    .ok_or(WeatherError::MissingDaily)?;
    let today: DailyEntry = serde_json::from_value(first).map_err(WeatherError::MissingKey)?;
    let condition = today.weather.into_iter().next().ok_or(WeatherError::NoConditions)?;

    Ok(WeatherSummary {
        description: condition.description,
        max_temp: today.temp.max,
        min_temp: today.temp.min,
        feels_like: today.feels_like.day,
    })
}

/// Decode a forecast body, logging and swallowing any problem.
///
/// A missing `daily` array is a warning; anything else is an error.
pub fn summarize_weather(body: &str, lat: f64, lon: f64) -> Option<WeatherSummary> {
    match parse_forecast(body) {
        Ok(summary) => Some(summary),
        Err(e @ WeatherError::MissingDaily) => {
            warn!(lat, lon, error = %e, data = %truncate_for_log(body, 300), "Weather data unusable");
            None
        }
        Err(e @ WeatherError::Json(_)) => {
            error!(error = %e, "Error decoding JSON from weather API");
            None
        }
        Err(e) => {
            error!(error = %e, data = %truncate_for_log(body, 300), "Error parsing weather data");
            None
        }
    }
}

/// Fetch today's forecast for a coordinate pair.
///
/// # Arguments
///
/// * `client` - Shared HTTP client
/// * `endpoint` - One Call base URL, normally [`WEATHER_API_URL`]
/// * `lat`, `lon` - Location in decimal degrees
/// * `api_key` - OpenWeatherMap key; never logged
///
/// # Returns
///
/// The first daily entry as a [`WeatherSummary`], or `None` on any failure.
/// The cause is logged: a missing `daily` array as a warning, everything
/// else as an error.
#[instrument(level = "info", skip(client, endpoint, api_key))]
pub async fn fetch_weather(
    client: &Client,
    endpoint: &str,
    lat: f64,
    lon: f64,
    api_key: &str,
) -> Option<WeatherSummary> {
    let url = match forecast_url(endpoint, lat, lon, api_key) {
        Ok(url) => url,
        Err(e) => {
            error!(error = %e, "Could not build weather URL");
            return None;
        }
    };

    // The query string carries the API key, so only the coordinates are logged.
    debug!(lat, lon, "Fetching weather");
    match fetch_text(client, url.as_str(), LONG_TIMEOUT).await {
        Ok(body) => summarize_weather(&body, lat, lon),
        Err(e) => {
            error!(error = %e.without_url(), "Error fetching weather");
            None
        }
    }
}
