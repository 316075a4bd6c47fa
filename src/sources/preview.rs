//! Best-effort article preview extraction.
//!
//! Finds the main content container of an article page and returns its first
//! few substantial paragraphs. Containers are tried in the order of
//! [`CONTENT_CONTAINERS`]; the first one present in the page wins, and the
//! whole document is used when none match. Supporting a new site layout means
//! adding a selector to that table.
//!
//! Pages with unusual markup simply produce an empty preview.

use crate::utils::{SHORT_TIMEOUT, fetch_text};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, error, instrument};

/// Content container selectors, most specific first.
pub const CONTENT_CONTAINERS: &[&str] = &[
    "div.sdc-article-body",
    "div.story-body__inner",
    "div.article__content",
    "div.article-body",
    "article",
    "main",
];

/// Paragraphs at or under this many characters are captions, bylines and the like.
pub const MIN_PARAGRAPH_CHARS: usize = 100;

/// Paragraphs nested in these elements are page chrome, not article text.
const CHROME_ELEMENTS: &[&str] = &["header", "footer", "nav"];

static CONTAINER_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    CONTENT_CONTAINERS
        .iter()
        .filter_map(|css| Selector::parse(css).ok())
        .collect()
});

static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").expect("valid selector"));

/// Fetch `article_url` and extract up to `paragraphs` paragraphs from it.
///
/// Returns an empty string on any network error or when nothing qualifies.
#[instrument(level = "debug", skip(client))]
pub async fn fetch_preview(client: &Client, article_url: &str, paragraphs: usize) -> String {
    debug!("Fetching article preview");
    match fetch_text(client, article_url, SHORT_TIMEOUT).await {
        Ok(html) => extract_preview(&html, paragraphs),
        Err(e) => {
            error!(url = article_url, error = %e, "Error fetching article content");
            String::new()
        }
    }
}

/// Extract up to `paragraphs` substantial paragraphs from an HTML page,
/// joined by a blank line.
pub fn extract_preview(html: &str, paragraphs: usize) -> String {
    let document = Html::parse_document(html);
    let scope = content_scope(&document);

    let kept: Vec<String> = scope
        .select(&PARAGRAPH)
        .filter(|p| !inside_page_chrome(p))
        .map(paragraph_text)
        .filter(|text| text.chars().count() > MIN_PARAGRAPH_CHARS)
        .take(paragraphs)
        .collect();

    debug!(kept = kept.len(), "Extracted preview paragraphs");
    kept.join("\n\n")
}

/// First matching content container, or the document root.
fn content_scope(document: &Html) -> ElementRef<'_> {
    CONTAINER_SELECTORS
        .iter()
        .find_map(|selector| document.select(selector).next())
        .unwrap_or_else(|| document.root_element())
}

fn inside_page_chrome(element: &ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| CHROME_ELEMENTS.contains(&ancestor.value().name()))
}

/// Text of a paragraph with whitespace runs collapsed.
fn paragraph_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(|chunk| chunk.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}
