//! Plain-text rendering of a [`BriefingData`].
//!
//! Two styles, picked by [`BriefingConfig::conversational`]:
//!
//! - **Structured**: Markdown-like headings, numbered headlines and bracketed
//!   "continue reading" links.
//! - **Conversational**: a time-of-day greeting and sentence-form transitions,
//!   meant to be read aloud by a text-to-speech engine.
//!
//! Every enabled section is always printed. When its data is missing, a fixed
//! "currently unavailable" line takes its place.

use crate::config::BriefingConfig;
use crate::models::{BriefingData, NewsItem, WeatherSummary};
use crate::utils::{capitalize, greeting_for_hour};
use chrono::{NaiveDateTime, Timelike};

/// Whole degrees, rounding halves to even.
fn degrees(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Render the full briefing.
///
/// Pure: `now` supplies both the date line and the greeting hour.
pub fn render_briefing(data: &BriefingData, config: &BriefingConfig, now: NaiveDateTime) -> String {
    let mut lines: Vec<String> = Vec::new();
    let conversational = config.conversational;
    let today = now.format("%A, %d %B %Y");

    if conversational {
        lines.push(format!(
            "{}! This is your daily briefing for {today}.",
            greeting_for_hour(now.hour())
        ));
    } else {
        lines.push(format!("# Daily Briefing - {today}"));
    }
    lines.push(String::new());

    push_weather(&mut lines, data.weather.as_ref(), &data.location_name, conversational);
    push_news(&mut lines, &data.news, config);

    if config.enable_fact {
        let heading = if conversational {
            "Did you know this fact?"
        } else {
            "## Fact of the Day"
        };
        push_section(&mut lines, heading, data.fact.as_deref(), "Fact of the day");
    }
    if config.enable_joke {
        let heading = if conversational {
            "Here's a joke to start your day:"
        } else {
            "## Joke of the Day"
        };
        push_section(&mut lines, heading, data.joke.as_deref(), "Joke of the day");
    }
    if config.enable_on_this_day {
        let heading = if conversational {
            "And finally, on this day in history:"
        } else {
            "## On This Day in History"
        };
        push_section(&mut lines, heading, data.on_this_day.as_deref(), "On this day in history");
    }

    lines.join("\n")
}

fn push_weather(lines: &mut Vec<String>, weather: Option<&WeatherSummary>, location_name: &str, conversational: bool) {
    if conversational {
        lines.push(format!("Here's the weather for {location_name}:"));
    } else {
        lines.push(format!("## Weather for {location_name}"));
    }

    match weather {
        Some(w) => {
            lines.push(format!("Today's forecast: {}", capitalize(&w.description)));
            lines.push(format!(
                "The maximum temperature expected is {}°C, with a minimum of {}°C.",
                degrees(w.max_temp),
                degrees(w.min_temp)
            ));
            lines.push(format!("It will feel like {}°C.", degrees(w.feels_like)));
        }
        None => lines.push("Weather forecast currently unavailable.".to_string()),
    }
    lines.push(String::new());
}

fn push_news(lines: &mut Vec<String>, news: &[NewsItem], config: &BriefingConfig) {
    if config.conversational {
        lines.push("The top news headlines for you are:".to_string());
    } else {
        lines.push("## Top News Headlines".to_string());
    }
    lines.push(String::new());

    if news.is_empty() {
        lines.push("No news headlines available.".to_string());
        lines.push(String::new());
        return;
    }

    for (i, item) in news.iter().enumerate() {
        let number = i + 1;
        let show_preview = config.show_full_story_preview && !item.preview.is_empty();

        if config.conversational {
            lines.push(format!("Headline number {number} from {}: {}.", item.source, item.title));
            lines.push(format!("Summary: {}.", item.description));
            if show_preview {
                lines.push("Here's a preview of the story:".to_string());
                lines.push(item.preview.clone());
                if config.show_continue_link {
                    lines.push(format!("You can continue reading more at the link: {}", item.display_link()));
                }
            }
        } else {
            lines.push(format!("### {number}. {} ({})", item.title, item.source));
            lines.push(item.description.clone());
            if show_preview {
                lines.push(item.preview.clone());
                if config.show_continue_link {
                    lines.push(format!("[Continue reading at {}]", item.display_link()));
                }
            }
        }
        lines.push(String::new());
    }
}

/// Heading, then either the content or "<label> currently unavailable.", then a blank line.
fn push_section(lines: &mut Vec<String>, heading: &str, content: Option<&str>, label: &str) {
    lines.push(heading.to_string());
    match content {
        Some(text) => lines.push(text.to_string()),
        None => lines.push(format!("{label} currently unavailable.")),
    }
    lines.push(String::new());
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap()
    }

    fn news_item(n: usize, preview: &str, link: Option<&str>) -> NewsItem {
        NewsItem {
            title: format!("Headline {n}"),
            description: format!("Summary {n}"),
            link: link.map(str::to_string),
            source: "BBC News".to_string(),
            preview: preview.to_string(),
        }
    }

    fn sample() -> BriefingData {
        BriefingData {
            location_name: "London".to_string(),
            weather: Some(WeatherSummary {
                description: "light rain".to_string(),
                max_temp: 14.5,
                min_temp: 8.6,
                feels_like: 12.4,
            }),
            news: vec![
                news_item(1, "First paragraph.\n\nSecond paragraph.", Some("https://bbc.co.uk/1")),
                news_item(2, "", None),
            ],
            fact: Some("Bananas are berries.".to_string()),
            joke: None,
            on_this_day: Some("1781: Cornwallis surrenders at Yorktown.".to_string()),
        }
    }

    #[test]
    fn test_structured_layout() {
        let config = BriefingConfig {
            show_full_story_preview: true,
            ..BriefingConfig::default()
        };
        let out = render_briefing(&sample(), &config, at(8));
        let expected = "\
# Daily Briefing - Monday, 19 October 2026

## Weather for London
Today's forecast: Light rain
The maximum temperature expected is 14°C, with a minimum of 9°C.
It will feel like 12°C.

## Top News Headlines

### 1. Headline 1 (BBC News)
Summary 1
First paragraph.

Second paragraph.
[Continue reading at https://bbc.co.uk/1]

### 2. Headline 2 (BBC News)
Summary 2
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_conversational_afternoon_greeting() {
        let config = BriefingConfig {
            conversational: true,
            ..BriefingConfig::default()
        };
        let out = render_briefing(&sample(), &config, at(14));
        assert!(out.starts_with("Good afternoon! This is your daily briefing for Monday, 19 October 2026."));
        assert!(out.contains("Here's the weather for London:"));
        assert!(out.contains("The top news headlines for you are:"));
        assert!(out.contains("Headline number 1 from BBC News: Headline 1."));
        assert!(out.contains("Summary: Summary 1."));
        // Previews are off, so neither the preview nor its link appear.
        assert!(!out.contains("Here's a preview of the story:"));
        assert!(!out.contains("https://bbc.co.uk/1"));
    }

    #[test]
    fn test_conversational_preview_and_link() {
        let config = BriefingConfig {
            conversational: true,
            show_full_story_preview: true,
            ..BriefingConfig::default()
        };
        let out = render_briefing(&sample(), &config, at(20));
        assert!(out.starts_with("Good evening!"));
        assert!(out.contains(
            "Here's a preview of the story:\nFirst paragraph.\n\nSecond paragraph.\n\
             You can continue reading more at the link: https://bbc.co.uk/1\n"
        ));
    }

    #[test]
    fn test_continue_link_can_be_hidden() {
        let config = BriefingConfig {
            show_full_story_preview: true,
            show_continue_link: false,
            ..BriefingConfig::default()
        };
        let out = render_briefing(&sample(), &config, at(9));
        assert!(out.contains("Second paragraph."));
        assert!(!out.contains("Continue reading"));
    }

    #[test]
    fn test_missing_data_renders_unavailable_lines() {
        let config = BriefingConfig {
            enable_fact: true,
            enable_joke: true,
            enable_on_this_day: true,
            ..BriefingConfig::default()
        };
        let data = BriefingData {
            location_name: "Halstead, Essex".to_string(),
            ..BriefingData::default()
        };
        let out = render_briefing(&data, &config, at(6));
        assert!(out.contains("## Weather for Halstead, Essex\nWeather forecast currently unavailable.\n"));
        assert!(out.contains("## Top News Headlines\n\nNo news headlines available.\n"));
        assert!(out.contains("## Fact of the Day\nFact of the day currently unavailable.\n"));
        assert!(out.contains("## Joke of the Day\nJoke of the day currently unavailable.\n"));
        assert!(out.ends_with("## On This Day in History\nOn this day in history currently unavailable.\n"));
    }

    #[test]
    fn test_enabled_sections_in_order() {
        let config = BriefingConfig {
            conversational: true,
            enable_fact: true,
            enable_joke: true,
            enable_on_this_day: true,
            ..BriefingConfig::default()
        };
        let out = render_briefing(&sample(), &config, at(10));
        let fact = out.find("Did you know this fact?\nBananas are berries.").unwrap();
        let joke = out.find("Here's a joke to start your day:\nJoke of the day currently unavailable.").unwrap();
        let event = out
            .find("And finally, on this day in history:\n1781: Cornwallis surrenders at Yorktown.")
            .unwrap();
        assert!(fact < joke && joke < event);
    }

    #[test]
    fn test_disabled_sections_are_omitted() {
        let out = render_briefing(&sample(), &BriefingConfig::default(), at(10));
        assert!(!out.contains("Fact of the Day"));
        assert!(!out.contains("Bananas"));
        assert!(!out.contains("On This Day"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let config = BriefingConfig {
            enable_fact: true,
            ..BriefingConfig::default()
        };
        let a = render_briefing(&sample(), &config, at(12));
        let b = render_briefing(&sample(), &config, at(12));
        assert_eq!(a, b);
    }

    #[test]
    fn test_degrees_round_half_to_even() {
        assert_eq!(degrees(2.5), 2);
        assert_eq!(degrees(3.5), 4);
        assert_eq!(degrees(-0.4), 0);
        assert_eq!(degrees(-1.5), -2);
        assert_eq!(degrees(12.51), 13);
    }
}
