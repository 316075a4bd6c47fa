//! Syndication feed fetcher.
//!
//! Reads one RSS 2.0 or Atom document and normalizes its entries into
//! [`NewsItem`]s. The root element decides the format:
//!
//! | Root | Entries | Description | Link |
//! |------|---------|-------------|------|
//! | `<rss>` | `channel/item` | `description` | `link` text |
//! | `<feed>` | `entry` | `summary`, else `content` | `href` of the alternate `link` |
//!
//! Any failure (network, HTTP status, malformed XML, unknown root) is logged
//! and turns into an empty list for that source.

use crate::config::BriefingConfig;
use crate::models::{NO_DESCRIPTION, NO_TITLE, NewsItem};
use crate::sources::preview;
use crate::utils::{LONG_TIMEOUT, fetch_text};
use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

/// Ways a feed document can fail to yield entries.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("document ended before all elements were closed")]
    Unterminated,

    #[error("no 'channel' or 'feed' element found")]
    UnknownFormat,
}

/// An entry as read from the feed, before placeholders and previews are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Rss,
    Atom,
}

impl Format {
    /// Nesting depth of entry elements, counting the root as 1.
    fn entry_depth(self) -> usize {
        match self {
            Format::Rss => 3,
            Format::Atom => 2,
        }
    }

    fn entry_tag(self) -> &'static str {
        match self {
            Format::Rss => "item",
            Format::Atom => "entry",
        }
    }

    fn field(self, tag: &str) -> Option<Field> {
        match (self, tag) {
            (_, "title") => Some(Field::Title),
            (Format::Rss, "description") | (Format::Atom, "summary") => Some(Field::Description),
            (Format::Atom, "content") => Some(Field::Content),
            (_, "link") => Some(Field::Link),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Description,
    Content,
    Link,
}

#[derive(Debug)]
struct AtomLink {
    href: Option<String>,
    rel: Option<String>,
}

/// Child elements of one entry, first occurrence of each.
#[derive(Debug, Default)]
struct RawEntry {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    link: Option<String>,
    atom_links: Vec<AtomLink>,
}

impl RawEntry {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Title => &mut self.title,
            Field::Description => &mut self.description,
            Field::Content => &mut self.content,
            Field::Link => &mut self.link,
        }
    }

    fn has(&self, field: Field) -> bool {
        match field {
            Field::Title => self.title.is_some(),
            Field::Description => self.description.is_some(),
            Field::Content => self.content.is_some(),
            Field::Link => self.link.is_some(),
        }
    }

    fn alternate_link(&self) -> Option<String> {
        self.atom_links
            .iter()
            .find(|l| l.rel.as_deref().is_none_or(|rel| rel == "alternate"))
            .or_else(|| self.atom_links.first())
            .and_then(|l| l.href.clone())
    }

    fn finish(self, format: Format) -> FeedEntry {
        let link = match format {
            Format::Rss => self.link,
            Format::Atom => self.alternate_link(),
        };
        FeedEntry {
            title: self.title,
            description: self.description.or(self.content),
            link,
        }
    }
}

/// Streaming reader state for one document.
///
/// Only elements in the root element's namespace prefix are considered, so
/// `media:description`, `atom:link` or `dc:title` next to the plain fields of
/// an RSS item are skipped instead of shadowing them.
struct FeedParser {
    format: Format,
    prefix: Option<Vec<u8>>,
    depth: usize,
    channel_seen: bool,
    in_channel: bool,
    current: Option<RawEntry>,
    capture: Option<(Field, String)>,
    entries: Vec<FeedEntry>,
}

impl FeedParser {
    /// Start parsing at the root element; `None` when it is neither `rss` nor `feed`.
    fn for_root(root: &BytesStart<'_>) -> Option<Self> {
        let name = root.name();
        let format = match name.local_name().into_inner() {
            b"rss" => Format::Rss,
            b"feed" => Format::Atom,
            _ => return None,
        };
        Some(Self {
            format,
            prefix: name.prefix().map(|p| p.into_inner().to_vec()),
            depth: 1,
            channel_seen: false,
            in_channel: false,
            current: None,
            capture: None,
            entries: Vec::new(),
        })
    }

    /// Local part of `name` when it shares the root's prefix.
    fn own_tag<'n>(&self, name: QName<'n>) -> Option<&'n str> {
        if name.prefix().map(|p| p.into_inner()) != self.prefix.as_deref() {
            return None;
        }
        std::str::from_utf8(name.local_name().into_inner()).ok()
    }

    fn handle(&mut self, event: Event<'_>) -> quick_xml::Result<()> {
        match event {
            Event::Start(e) => {
                self.depth += 1;
                self.open(&e)?;
            }
            Event::Empty(e) => {
                self.depth += 1;
                self.open(&e)?;
                self.close();
            }
            Event::End(_) => self.close(),
            Event::Text(e) => self.push_text(&e.decode()?),
            Event::CData(e) => self.push_text(&e.decode()?),
            Event::GeneralRef(e) => {
                if let Some(ch) = e.resolve_char_ref()? {
                    self.push_text(ch.encode_utf8(&mut [0; 4]));
                } else if let Some(text) = resolve_predefined_entity(&e.decode()?) {
                    self.push_text(text);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn open(&mut self, e: &BytesStart<'_>) -> quick_xml::Result<()> {
        let Some(tag) = self.own_tag(e.name()) else {
            return Ok(());
        };
        let format = self.format;
        let entry_depth = format.entry_depth();

        if format == Format::Rss && self.depth == 2 && tag == "channel" && !self.channel_seen {
            self.channel_seen = true;
            self.in_channel = true;
        } else if self.depth == entry_depth
            && tag == format.entry_tag()
            && (format == Format::Atom || self.in_channel)
        {
            self.current = Some(RawEntry::default());
        } else if self.depth == entry_depth + 1
            && let Some(entry) = self.current.as_mut()
        {
            match format.field(tag) {
                Some(Field::Link) if format == Format::Atom => entry.atom_links.push(AtomLink {
                    href: attribute(e, "href")?,
                    rel: attribute(e, "rel")?,
                }),
                Some(field) if !entry.has(field) => {
                    self.capture = Some((field, String::new()));
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn close(&mut self) {
        let entry_depth = self.format.entry_depth();
        if self.depth == entry_depth + 1 {
            if let (Some((field, text)), Some(entry)) = (self.capture.take(), self.current.as_mut()) {
                *entry.slot(field) = Some(text);
            }
        } else if self.depth == entry_depth {
            if let Some(entry) = self.current.take() {
                self.entries.push(entry.finish(self.format));
            }
        } else if self.depth == 2 && self.format == Format::Rss {
            self.in_channel = false;
        }
        self.depth = self.depth.saturating_sub(1);
    }

    // Nested markup inside a field (Atom xhtml text) contributes its text too.
    fn push_text(&mut self, text: &str) {
        if let Some((_, buffer)) = self.capture.as_mut() {
            buffer.push_str(text);
        }
    }

    fn finish(self) -> Result<Vec<FeedEntry>, FeedError> {
        if self.depth > 0 {
            return Err(FeedError::Unterminated);
        }
        if self.format == Format::Rss && !self.channel_seen {
            return Err(FeedError::UnknownFormat);
        }
        Ok(self.entries)
    }
}

fn attribute(e: &BytesStart<'_>, name: &str) -> quick_xml::Result<Option<String>> {
    match e.try_get_attribute(name)? {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

/// Parse a feed document into raw entries, in document order.
///
/// RSS entries are the `item` children of the first `channel`; Atom entries
/// are the `entry` children of `feed`. Within an entry the first `title`,
/// `description` (RSS) or `summary`/`content` (Atom) and `link` win.
///
/// # Errors
///
/// [`FeedError::UnknownFormat`] when the root is neither `rss` nor `feed`, or
/// an RSS document has no `channel`; [`FeedError::Xml`] /
/// [`FeedError::Unterminated`] when the document is malformed.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, FeedError> {
    let mut reader = Reader::from_str(xml);

    let mut parser = loop {
        match reader.read_event()? {
            Event::Start(e) => break FeedParser::for_root(&e).ok_or(FeedError::UnknownFormat)?,
            Event::Empty(e) => {
                let mut parser = FeedParser::for_root(&e).ok_or(FeedError::UnknownFormat)?;
                parser.close();
                return parser.finish();
            }
            Event::Eof => return Err(FeedError::UnknownFormat),
            _ => {}
        }
    };

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            event => parser.handle(event)?,
        }
    }
    parser.finish()
}

fn cleaned(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Fetch one feed and turn up to [`BriefingConfig::per_source_limit`] entries
/// into [`NewsItem`]s labelled with `source_name`.
///
/// When previews are enabled, each item with a link gets its article preview
/// fetched right away; otherwise the preview stays empty and no page is requested.
///
/// # Arguments
///
/// * `client` - Shared HTTP client
/// * `feed_url` - RSS or Atom document to read
/// * `source_name` - Label stamped on every item from this feed
/// * `config` - Supplies the per-source cap and the preview settings
///
/// # Returns
///
/// The feed's items in document order, or an empty list if the request,
/// the XML, or the document shape fails. The cause is logged.
#[instrument(level = "info", skip(client, config))]
pub async fn fetch_feed(
    client: &Client,
    feed_url: &str,
    source_name: &str,
    config: &BriefingConfig,
) -> Vec<NewsItem> {
    debug!("Fetching feed");
    let body = match fetch_text(client, feed_url, LONG_TIMEOUT).await {
        Ok(body) => body,
        Err(e) => {
            error!(source = source_name, url = feed_url, error = %e, "Error fetching news");
            return Vec::new();
        }
    };

    let entries = match parse_feed(&body) {
        Ok(entries) => entries,
        Err(FeedError::UnknownFormat) => {
            warn!(source = source_name, url = feed_url, "No 'channel' or 'feed' element found in response");
            return Vec::new();
        }
        Err(e) => {
            error!(source = source_name, url = feed_url, error = %e, "Error parsing feed XML");
            return Vec::new();
        }
    };

    if entries.is_empty() {
        warn!(source = source_name, url = feed_url, "No entries found in feed");
        return Vec::new();
    }

    let items = into_news_items(client, entries, source_name, config).await;
    info!(source = source_name, count = items.len(), "Fetched feed items");
    items
}

/// Apply the per-source cap, placeholders and (optionally) previews to raw entries.
async fn into_news_items(
    client: &Client,
    entries: Vec<FeedEntry>,
    source_name: &str,
    config: &BriefingConfig,
) -> Vec<NewsItem> {
    let mut items = Vec::new();
    for entry in entries.into_iter().take(config.per_source_limit()) {
        let link = cleaned(entry.link);
        let preview = match &link {
            Some(url) if config.show_full_story_preview => {
                preview::fetch_preview(client, url, config.story_paragraphs).await
            }
            _ => String::new(),
        };
        items.push(NewsItem {
            title: cleaned(entry.title).unwrap_or_else(|| NO_TITLE.to_string()),
            description: cleaned(entry.description).unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            link,
            source: source_name.to_string(),
            preview,
        });
    }
    items
}
