//! Command-line interface definitions.
//!
//! Every option can also be set through the environment variable named next
//! to it, which is how scheduled runs usually configure the tool. Boolean
//! values accept `true`/`false` in any case, as well as `yes`/`no`, `on`/`off`
//! and `1`/`0`.

use crate::config::{BriefingConfig, ConfigError, Endpoints, Location, LocationOverride, resolve_location, validate_api_key};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Command-line arguments for the daily briefing.
///
/// # Examples
///
/// ```sh
/// # Default location (Halstead), key from the environment
/// OPENWEATHERMAP_API_KEY=... daily_briefing
///
/// # London, conversational output with a joke
/// CONVERSATIONAL_MODE=True ENABLE_RANDOM_JOKE=True daily_briefing london
///
/// # Custom coordinates
/// LOCATION_NAME=Home LOCATION_LATITUDE=51.1 LOCATION_LONGITUDE=-0.2 daily_briefing
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Location selector (halstead, braintree, london, birmingham, manchester, liverpool)
    pub location: Option<String>,

    /// Enable debug logging
    #[arg(long, env = "DEBUG", default_value_t = false, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub debug: bool,

    /// Number of news items to output
    #[arg(long, env = "NUM_NEWS_ITEMS", default_value_t = 10)]
    pub num_news_items: usize,

    /// Fetch and include a preview of each story
    #[arg(long, env = "SHOW_FULL_STORY_PREVIEW", default_value_t = false, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub show_full_story_preview: bool,

    /// Paragraphs per story preview
    #[arg(long, env = "SHOW_FULL_STORY_PARAGRAPHS", default_value_t = 2)]
    pub show_full_story_paragraphs: usize,

    /// Show the "continue reading" link after a preview
    #[arg(long, env = "SHOW_CONTINUE_LINK", default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub show_continue_link: bool,

    /// Speech-friendly output for text-to-speech
    #[arg(long, env = "CONVERSATIONAL_MODE", default_value_t = false, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub conversational_mode: bool,

    /// Include a random fact
    #[arg(long, env = "ENABLE_RANDOM_FACT", default_value_t = false, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub enable_random_fact: bool,

    /// Include a random joke
    #[arg(long, env = "ENABLE_RANDOM_JOKE", default_value_t = false, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub enable_random_joke: bool,

    /// Include an "on this day in history" event
    #[arg(long, env = "ENABLE_ONTHISDAY", default_value_t = false, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub enable_onthisday: bool,

    /// OpenWeatherMap API key
    #[arg(long, env = "OPENWEATHERMAP_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Custom location name (needs latitude and longitude too)
    #[arg(long, env = "LOCATION_NAME")]
    pub location_name: Option<String>,

    /// Custom location latitude
    #[arg(long, env = "LOCATION_LATITUDE", allow_hyphen_values = true)]
    pub location_latitude: Option<String>,

    /// Custom location longitude
    #[arg(long, env = "LOCATION_LONGITUDE", allow_hyphen_values = true)]
    pub location_longitude: Option<String>,

    /// YAML file listing feeds as `{url, source}` entries; replaces the built-in list
    #[arg(long, env = "FEEDS_FILE")]
    pub feeds_file: Option<PathBuf>,

    /// Also write the collected data as JSON to this path
    #[arg(long, env = "JSON_OUTPUT")]
    pub json_output: Option<PathBuf>,
}

impl Cli {
    /// Validate the arguments and turn them into the run configuration and location.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from key validation or location resolution.
    pub fn resolve(&self) -> Result<(BriefingConfig, Location), ConfigError> {
        let location = resolve_location(
            &LocationOverride {
                name: self.location_name.clone(),
                latitude: self.location_latitude.clone(),
                longitude: self.location_longitude.clone(),
            },
            self.location.as_deref(),
        )?;
        let api_key = validate_api_key(self.api_key.as_deref())?;

        let config = BriefingConfig {
            debug: self.debug,
            num_news_items: self.num_news_items,
            show_full_story_preview: self.show_full_story_preview,
            story_paragraphs: self.show_full_story_paragraphs,
            show_continue_link: self.show_continue_link,
            conversational: self.conversational_mode,
            enable_fact: self.enable_random_fact,
            enable_joke: self.enable_random_joke,
            enable_on_this_day: self.enable_onthisday,
            api_key,
            endpoints: Endpoints::default(),
        };
        Ok((config, location))
    }
}
