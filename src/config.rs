//! Run configuration, known locations and the feed table.
//!
//! Everything in here is resolved once in `main` from the parsed [`Cli`](crate::cli::Cli)
//! and then passed by reference into the pipeline. No other module reads
//! environment variables or command-line arguments.

use crate::sources::{novelty, weather};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Value shipped in sample setups; treated the same as a missing key.
pub const API_KEY_PLACEHOLDER: &str = "YOUR_OPENWEATHERMAP_API_KEY";

/// Fatal configuration problems. Any of these aborts the run before a single
/// request is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "OpenWeatherMap API key is not set; set OPENWEATHERMAP_API_KEY or pass --api-key"
    )]
    MissingApiKey,

    #[error("unknown location '{key}'; choose from {known:?}")]
    UnknownLocation { key: String, known: Vec<&'static str> },

    #[error("invalid numeric value for {field}: '{value}'")]
    InvalidCoordinate { field: &'static str, value: String },

    #[error("failed to read feeds file: {0}")]
    FeedsFile(#[from] std::io::Error),

    #[error("failed to parse feeds file: {0}")]
    FeedsYaml(#[from] serde_yaml::Error),
}

/// Flat set of toggles read once at startup.
#[derive(Clone)]
pub struct BriefingConfig {
    pub debug: bool,
    /// How many deduplicated news items end up in the briefing.
    pub num_news_items: usize,
    pub show_full_story_preview: bool,
    /// Paragraphs per article preview.
    pub story_paragraphs: usize,
    pub show_continue_link: bool,
    pub conversational: bool,
    pub enable_fact: bool,
    pub enable_joke: bool,
    pub enable_on_this_day: bool,
    pub api_key: String,
    pub endpoints: Endpoints,
}

/// Base URLs of the remote APIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub weather: String,
    pub fact: String,
    pub joke: String,
    pub on_this_day: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            weather: weather::WEATHER_API_URL.to_string(),
            fact: novelty::FACT_API_URL.to_string(),
            joke: novelty::JOKE_API_URL.to_string(),
            on_this_day: novelty::ON_THIS_DAY_API_URL.to_string(),
        }
    }
}

impl BriefingConfig {
    /// Number of entries read from each feed. Leaves headroom for deduplication.
    pub fn per_source_limit(&self) -> usize {
        self.num_news_items.max(10) * 2
    }
}

impl Default for BriefingConfig {
    fn default() -> Self {
        Self {
            debug: false,
            num_news_items: 10,
            show_full_story_preview: false,
            story_paragraphs: 2,
            show_continue_link: true,
            conversational: false,
            enable_fact: false,
            enable_joke: false,
            enable_on_this_day: false,
            api_key: String::new(),
            endpoints: Endpoints::default(),
        }
    }
}

// Hand-written so the API key never reaches the logs.
impl fmt::Debug for BriefingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BriefingConfig")
            .field("debug", &self.debug)
            .field("num_news_items", &self.num_news_items)
            .field("show_full_story_preview", &self.show_full_story_preview)
            .field("story_paragraphs", &self.story_paragraphs)
            .field("show_continue_link", &self.show_continue_link)
            .field("conversational", &self.conversational)
            .field("enable_fact", &self.enable_fact)
            .field("enable_joke", &self.enable_joke)
            .field("enable_on_this_day", &self.enable_on_this_day)
            .field("api_key", &if self.api_key.is_empty() { "NOT SET" } else { "***SET***" })
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

/// Accept a key only if it is present, non-empty and not the placeholder.
pub fn validate_api_key(key: Option<&str>) -> Result<String, ConfigError> {
    match key.map(str::trim) {
        Some(k) if !k.is_empty() && k != API_KEY_PLACEHOLDER => Ok(k.to_string()),
        _ => Err(ConfigError::MissingApiKey),
    }
}

/// A named place with coordinates used for the forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Selectable locations, keyed by lowercase selector. The first entry is the default.
pub const LOCATIONS: &[(&str, &str, f64, f64)] = &[
    ("halstead", "Halstead, Essex", 51.9451, 0.6411),
    ("braintree", "Braintree, Essex", 51.878, 0.550),
    ("london", "London", 51.5074, -0.1278),
    ("birmingham", "Birmingham", 52.4862, -1.8904),
    ("manchester", "Manchester", 53.4808, -2.2426),
    ("liverpool", "Liverpool", 53.4084, -2.9916),
];

impl Location {
    /// Look up a location from [`LOCATIONS`] by selector, case-insensitively.
    pub fn from_key(key: &str) -> Result<Self, ConfigError> {
        let wanted = key.trim().to_lowercase();
        LOCATIONS
            .iter()
            .find(|(k, ..)| *k == wanted)
            .map(|(_, name, latitude, longitude)| Location {
                name: name.to_string(),
                latitude: *latitude,
                longitude: *longitude,
            })
            .ok_or_else(|| ConfigError::UnknownLocation {
                key: key.to_string(),
                known: LOCATIONS.iter().map(|(k, ..)| *k).collect(),
            })
    }
}

/// Raw location override values, as they arrive from the environment or flags.
#[derive(Debug, Default, Clone)]
pub struct LocationOverride {
    pub name: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

/// Pick the location for this run.
///
/// A complete override (name, latitude and longitude all non-empty) wins.
/// A partial override is reported and ignored. Otherwise `selector` is looked
/// up in [`LOCATIONS`], defaulting to the first entry.
///
/// # Errors
///
/// [`ConfigError::InvalidCoordinate`] if an override coordinate is not a number,
/// [`ConfigError::UnknownLocation`] if the selector is not in the table.
#[instrument(level = "debug", skip_all)]
pub fn resolve_location(
    overrides: &LocationOverride,
    selector: Option<&str>,
) -> Result<Location, ConfigError> {
    match (
        non_empty(&overrides.name),
        non_empty(&overrides.latitude),
        non_empty(&overrides.longitude),
    ) {
        (Some(name), Some(lat), Some(lon)) => {
            let location = Location {
                name: name.to_string(),
                latitude: parse_coordinate("LOCATION_LATITUDE", lat)?,
                longitude: parse_coordinate("LOCATION_LONGITUDE", lon)?,
            };
            debug!(?location, "Using custom location override");
            Ok(location)
        }
        (None, None, None) => Location::from_key(selector.unwrap_or(LOCATIONS[0].0)),
        _ => {
            warn!(
                "Partial custom location set; set LOCATION_NAME, LOCATION_LATITUDE and \
                 LOCATION_LONGITUDE together, or none of them"
            );
            Location::from_key(selector.unwrap_or(LOCATIONS[0].0))
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

fn parse_coordinate(field: &'static str, value: &str) -> Result<f64, ConfigError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ConfigError::InvalidCoordinate {
            field,
            value: value.to_string(),
        })
}

/// One syndication feed to read.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedSource {
    pub url: String,
    pub source: String,
}

/// Feeds read when no feeds file is given, in fetch order.
pub const DEFAULT_FEEDS: &[(&str, &str)] = &[
    ("https://feeds.bbci.co.uk/news/rss.xml", "BBC News"),
    ("https://feeds.bbci.co.uk/news/england/rss.xml", "BBC England"),
    ("https://feeds.bbci.co.uk/news/world/rss.xml", "BBC World"),
    ("https://feeds.bbci.co.uk/news/england/essex/rss.xml", "BBC Essex"),
    ("https://feeds.skynews.com/feeds/rss/home.xml", "Sky News"),
    ("https://feeds.skynews.com/feeds/rss/uk.xml", "Sky News UK"),
    ("https://feeds.skynews.com/feeds/rss/world.xml", "Sky News World"),
];

pub fn default_feeds() -> Vec<FeedSource> {
    DEFAULT_FEEDS
        .iter()
        .map(|(url, source)| FeedSource {
            url: url.to_string(),
            source: source.to_string(),
        })
        .collect()
}

/// Parse a YAML feed list: a sequence of `{url, source}` mappings.
pub fn parse_feeds_yaml(yaml: &str) -> Result<Vec<FeedSource>, ConfigError> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Read the feed list from `path`, or fall back to [`DEFAULT_FEEDS`].
#[instrument(level = "debug")]
pub async fn load_feeds(path: Option<&Path>) -> Result<Vec<FeedSource>, ConfigError> {
    match path {
        Some(path) => {
            let yaml = tokio::fs::read_to_string(path).await?;
            let feeds = parse_feeds_yaml(&yaml)?;
            debug!(count = feeds.len(), path = %path.display(), "Loaded feeds file");
            Ok(feeds)
        }
        None => Ok(default_feeds()),
    }
}
