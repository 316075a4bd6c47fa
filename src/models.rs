//! Data models shared by the fetchers, the pipeline and the formatters.
//!
//! - [`NewsItem`]: one normalized entry from a syndication feed
//! - [`WeatherSummary`]: the first daily entry of a forecast response
//! - [`BriefingData`]: everything collected during one run, handed to the formatters
//!
//! None of these outlive a single invocation. They are built once and never
//! mutated afterwards.

use serde::Serialize;

/// Placeholder used when a feed entry has no usable title.
pub const NO_TITLE: &str = "No Title";
/// Placeholder used when a feed entry has no usable description.
pub const NO_DESCRIPTION: &str = "No Description";

/// A single news entry read from an RSS or Atom feed.
///
/// # Fields
///
/// * `title` - Entry title, or [`NO_TITLE`]
/// * `description` - Feed-provided summary, or [`NO_DESCRIPTION`]
/// * `link` - Article URL when the feed provided one
/// * `source` - Human-readable label of the feed (e.g. "BBC World")
/// * `preview` - Extracted article paragraphs; empty when previews are off or extraction found nothing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsItem {
    pub title: String,
    pub description: String,
    pub link: Option<String>,
    pub source: String,
    pub preview: String,
}

impl NewsItem {
    /// The link as it should be shown to a reader. Missing links render as `#`.
    pub fn display_link(&self) -> &str {
        self.link.as_deref().unwrap_or("#")
    }
}

/// Today's forecast, in metric units as returned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSummary {
    /// Free-text condition, e.g. "light rain".
    pub description: String,
    /// Maximum temperature in °C.
    pub max_temp: f64,
    /// Minimum temperature in °C.
    pub min_temp: f64,
    /// Daytime "feels like" temperature in °C.
    pub feels_like: f64,
}

/// All data collected for one briefing.
///
/// Every optional field is `None` either because the section is disabled or
/// because its fetch failed; the formatter tells the two apart using the
/// configuration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BriefingData {
    /// Display name of the resolved location.
    pub location_name: String,
    pub weather: Option<WeatherSummary>,
    /// Deduplicated news, already truncated to the requested count.
    pub news: Vec<NewsItem>,
    pub fact: Option<String>,
    pub joke: Option<String>,
    /// Rendered as `"<year>: <description>"`.
    pub on_this_day: Option<String>,
}
