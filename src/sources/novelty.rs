//! Optional novelty sections: a random fact, a joke, and an "on this day" event.
//!
//! Each fetcher is a single GET with a short timeout. Every failure is logged
//! and becomes `None`.

use crate::utils::{SHORT_TIMEOUT, fetch_text};
use chrono::{Datelike, NaiveDate};
use rand::Rng;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fmt;
use tracing::{debug, error, instrument};

pub const FACT_API_URL: &str = "https://uselessfacts.jsph.pl/api/v2/facts/random";
pub const JOKE_API_URL: &str = "https://v2.jokeapi.dev/joke/Any";
/// Categories of jokes never requested.
pub const JOKE_BLACKLIST: &str = "racist,sexist,explicit";
pub const ON_THIS_DAY_API_URL: &str = "https://byabbe.se/on-this-day";

#[derive(Debug, Deserialize)]
struct FactResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JokeResponse {
    joke: Option<String>,
}

// Events are decoded one by one so a single odd entry doesn't sink the list.
#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    events: Vec<serde_json::Value>,
}

impl EventsResponse {
    fn into_events(self) -> Vec<HistoricalEvent> {
        self.events
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect()
    }
}

/// One entry of the historical events list.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoricalEvent {
    #[serde(default)]
    pub year: Option<Year>,
    #[serde(default)]
    pub description: Option<String>,
}

/// The provider sends years as strings ("1066", "44 BC") but numbers are accepted too.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Year {
    Number(i64),
    Text(String),
}

impl Year {
    /// Year 0 and blank strings don't count as a year.
    fn is_empty(&self) -> bool {
        match self {
            Year::Number(n) => *n == 0,
            Year::Text(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Year::Number(n) => write!(f, "{n}"),
            Year::Text(s) => f.write_str(s.trim()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// GET a JSON document and decode it; logs under `what` on failure.
async fn fetch_json<T: DeserializeOwned>(client: &Client, url: &str, what: &str) -> Option<T> {
    debug!(url, "Fetching {what}");
    let body = match fetch_text(client, url, SHORT_TIMEOUT).await {
        Ok(body) => body,
        Err(e) => {
            error!(error = %e, "Error fetching {what}");
            return None;
        }
    };
    match serde_json::from_str(&body) {
        Ok(value) => Some(value),
        Err(e) => {
            error!(error = %e, "Error decoding JSON from {what} API");
            None
        }
    }
}

/// A random trivia fact from `endpoint` (normally [`FACT_API_URL`]).
#[instrument(level = "info", skip_all)]
pub async fn fetch_random_fact(client: &Client, endpoint: &str) -> Option<String> {
    let response: FactResponse = fetch_json(client, endpoint, "random fact").await?;
    non_empty(response.text)
}

pub fn joke_url(endpoint: &str) -> Result<url::Url, url::ParseError> {
    url::Url::parse_with_params(
        endpoint,
        &[("blacklistFlags", JOKE_BLACKLIST), ("type", "single")],
    )
}

/// A random single-line joke, with blacklisted categories filtered out by the provider.
#[instrument(level = "info", skip_all)]
pub async fn fetch_random_joke(client: &Client, endpoint: &str) -> Option<String> {
    let url = match joke_url(endpoint) {
        Ok(url) => url,
        Err(e) => {
            error!(error = %e, "Could not build joke URL");
            return None;
        }
    };
    let response: JokeResponse = fetch_json(client, url.as_str(), "random joke").await?;
    non_empty(response.joke)
}

pub fn on_this_day_url(endpoint: &str, date: NaiveDate) -> String {
    format!("{}/{}/{}/events.json", endpoint.trim_end_matches('/'), date.month(), date.day())
}

/// Pick one event having both a year and a description.
///
/// `choose` receives the number of qualifying events (always at least one)
/// and returns the index to use; an out-of-range index yields `None`.
pub fn select_event<F>(events: &[HistoricalEvent], choose: F) -> Option<String>
where
    F: FnOnce(usize) -> usize,
{
    let valid: Vec<(&Year, &str)> = events
        .iter()
        .filter_map(|e| match (&e.year, e.description.as_deref()) {
            (Some(year), Some(desc)) if !year.is_empty() && !desc.trim().is_empty() => {
                Some((year, desc.trim()))
            }
            _ => None,
        })
        .collect();

    if valid.is_empty() {
        return None;
    }
    valid
        .get(choose(valid.len()))
        .map(|(year, desc)| format!("{year}: {desc}"))
}

/// A random historical event for `date`'s month and day, rendered as `"<year>: <description>"`.
#[instrument(level = "info", skip(client, endpoint))]
pub async fn fetch_on_this_day_event(client: &Client, endpoint: &str, date: NaiveDate) -> Option<String> {
    let url = on_this_day_url(endpoint, date);
    let response: EventsResponse = fetch_json(client, &url, "'On this day' event").await?;
    select_event(&response.into_events(), |n| rand::rng().random_range(0..n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::serve;
    use tracing_test::traced_test;

    const EVENTS: &str = r#"{
        "wikipedia": "https://wikipedia.org/wiki/October_19",
        "date": "October 19",
        "events": [
            {"year": "1781", "description": "Cornwallis surrenders at Yorktown.", "wikipedia": []},
            {"year": "", "description": "Undated entry"},
            {"description": "No year at all"},
            {"year": "1987", "description": "  "},
            {"year": 2001, "description": "Numeric year entry"}
        ]
    }"#;

    fn events() -> Vec<HistoricalEvent> {
        serde_json::from_str::<EventsResponse>(EVENTS).unwrap().into_events()
    }

    #[test]
    fn test_select_event_filters_incomplete_entries() {
        let mut seen = 0;
        let picked = select_event(&events(), |n| {
            seen = n;
            0
        });
        assert_eq!(seen, 2);
        assert_eq!(picked.as_deref(), Some("1781: Cornwallis surrenders at Yorktown."));
    }

    #[test]
    fn test_select_event_uses_chosen_index() {
        let picked = select_event(&events(), |n| n - 1);
        assert_eq!(picked.as_deref(), Some("2001: Numeric year entry"));
    }

    #[test]
    fn test_select_event_none_qualifying() {
        let only_bad = vec![HistoricalEvent {
            year: None,
            description: Some("x".to_string()),
        }];
        assert_eq!(select_event(&only_bad, |_| panic!("chooser must not be called")), None);
        assert_eq!(select_event(&[], |_| 0), None);
    }

    #[test]
    fn test_select_event_random_chooser_stays_in_range() {
        for _ in 0..20 {
            assert!(select_event(&events(), |n| rand::rng().random_range(0..n)).is_some());
        }
    }

    #[test]
    fn test_on_this_day_url() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(
            on_this_day_url(ON_THIS_DAY_API_URL, date),
            "https://byabbe.se/on-this-day/10/19/events.json"
        );
    }

    #[test]
    fn test_joke_url() {
        let url = joke_url(JOKE_API_URL).unwrap();
        assert_eq!(url.path(), "/joke/Any");
        assert_eq!(url.query(), Some("blacklistFlags=racist%2Csexist%2Cexplicit&type=single"));
    }

    #[test]
    fn test_fact_and_joke_shapes() {
        let fact: FactResponse = serde_json::from_str(r#"{"id": "1", "text": "Bananas are berries."}"#).unwrap();
        assert_eq!(non_empty(fact.text).as_deref(), Some("Bananas are berries."));

        let joke: JokeResponse = serde_json::from_str(r#"{"error": false, "type": "single"}"#).unwrap();
        assert_eq!(non_empty(joke.joke), None);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_none() {
        let client = Client::new();
        let fact: Option<FactResponse> = fetch_json(&client, "not a url", "random fact").await;
        assert!(fact.is_none());
    }

    #[test]
    fn test_year_zero_is_not_a_year() {
        let events = vec![
            HistoricalEvent {
                year: Some(Year::Number(0)),
                description: Some("Year zero".to_string()),
            },
            HistoricalEvent {
                year: Some(Year::Number(-44)),
                description: Some("Caesar assassinated".to_string()),
            },
        ];
        assert_eq!(select_event(&events, |_| 0).as_deref(), Some("-44: Caesar assassinated"));
    }

    #[test]
    fn test_odd_event_does_not_sink_the_list() {
        let body = r#"{"events": [
            {"year": "1805", "description": 42},
            {"year": true, "description": "Boolean year"},
            "not an object",
            {"year": "1805", "description": "Battle of Ulm ends."}
        ]}"#;
        let events = serde_json::from_str::<EventsResponse>(body).unwrap().into_events();
        assert_eq!(events.len(), 1);
        assert_eq!(select_event(&events, |_| 0).as_deref(), Some("1805: Battle of Ulm ends."));
    }

    #[tokio::test]
    async fn test_fetch_random_fact_over_http() {
        let endpoint = serve(200, "application/json", r#"{"id": "7", "text": "Octopuses have three hearts."}"#).await;
        let fact = fetch_random_fact(&Client::new(), &endpoint).await;
        assert_eq!(fact.as_deref(), Some("Octopuses have three hearts."));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_fetch_random_fact_server_error_is_none() {
        let endpoint = serve(500, "text/plain", "down").await;
        assert!(fetch_random_fact(&Client::new(), &endpoint).await.is_none());
        assert!(logs_contain("Error fetching random fact"));
    }

    #[tokio::test]
    async fn test_fetch_random_joke_over_http() {
        let endpoint = serve(200, "application/json", r#"{"error": false, "type": "single", "joke": "I used to be a banker, but I lost interest."}"#).await;
        let joke = fetch_random_joke(&Client::new(), &endpoint).await;
        assert_eq!(joke.as_deref(), Some("I used to be a banker, but I lost interest."));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_fetch_random_joke_bad_json_is_none() {
        let endpoint = serve(200, "application/json", "<html>rate limited</html>").await;
        assert!(fetch_random_joke(&Client::new(), &endpoint).await.is_none());
        assert!(logs_contain("Error decoding JSON from random joke API"));
    }

    #[tokio::test]
    async fn test_fetch_on_this_day_over_http() {
        let endpoint = serve(200, "application/json", EVENTS).await;
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let event = fetch_on_this_day_event(&Client::new(), &endpoint, date).await.unwrap();
        assert!(
            event == "1781: Cornwallis surrenders at Yorktown." || event == "2001: Numeric year entry",
            "unexpected event {event}"
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn test_fetch_on_this_day_not_found_is_none() {
        let endpoint = serve(404, "text/plain", "no such day").await;
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert!(fetch_on_this_day_event(&Client::new(), &endpoint, date).await.is_none());
        assert!(logs_contain("Error fetching 'On this day' event"));
    }
}
