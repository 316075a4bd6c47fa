//! The collection pipeline: feeds → dedup → truncate, then weather and novelties.
//!
//! Every fetch runs sequentially, one request at a time, so diagnostic output
//! always appears in the same order.

use crate::config::{BriefingConfig, FeedSource, Location};
use crate::models::{BriefingData, NewsItem};
use crate::sources::{feeds, novelty, weather};
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use reqwest::Client;
use tracing::{info, instrument};

/// Drop items whose (title, description) pair was already seen.
///
/// Comparison is on trimmed, lowercased text. The first occurrence wins and
/// order is preserved.
pub fn deduplicate(items: Vec<NewsItem>) -> Vec<NewsItem> {
    items
        .into_iter()
        .unique_by(|item| {
            (
                item.title.trim().to_lowercase(),
                item.description.trim().to_lowercase(),
            )
        })
        .collect()
}

/// Read every feed in order, deduplicate, and keep the first
/// `config.num_news_items` items.
#[instrument(level = "info", skip_all, fields(sources = sources.len()))]
pub async fn collect_news(client: &Client, sources: &[FeedSource], config: &BriefingConfig) -> Vec<NewsItem> {
    let all: Vec<NewsItem> = stream::iter(sources)
        .then(|feed| feeds::fetch_feed(client, &feed.url, &feed.source, config))
        .concat()
        .await;

    let fetched = all.len();
    let mut unique = deduplicate(all);
    let unique_count = unique.len();
    unique.truncate(config.num_news_items);
    info!(fetched, unique = unique_count, kept = unique.len(), "Collected news");
    unique
}

/// Gather everything needed for one briefing.
///
/// Disabled novelty sections are not fetched at all.
#[instrument(level = "info", skip_all, fields(location = %location.name))]
pub async fn assemble(
    client: &Client,
    config: &BriefingConfig,
    location: &Location,
    sources: &[FeedSource],
    today: NaiveDate,
) -> BriefingData {
    let news = collect_news(client, sources, config).await;
    let endpoints = &config.endpoints;
    let weather = weather::fetch_weather(
        client,
        &endpoints.weather,
        location.latitude,
        location.longitude,
        &config.api_key,
    )
    .await;

    let fact = if config.enable_fact {
        novelty::fetch_random_fact(client, &endpoints.fact).await
    } else {
        None
    };
    let joke = if config.enable_joke {
        novelty::fetch_random_joke(client, &endpoints.joke).await
    } else {
        None
    };
    let on_this_day = if config.enable_on_this_day {
        novelty::fetch_on_this_day_event(client, &endpoints.on_this_day, today).await
    } else {
        None
    };

    BriefingData {
        location_name: location.name.clone(),
        weather,
        news,
        fact,
        joke,
        on_this_day,
    }
}
