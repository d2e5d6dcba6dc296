//! RSS/Atom feed parsing into news articles

use crate::errors::{MonitorError, Result};
use crate::report::NewsArticle;
use chrono::{DateTime, Utc};
use regex::Regex;
use roxmltree::{Document, Node, ParsingOptions};
use std::sync::OnceLock;

/// Parse up to `limit` articles from an RSS or Atom document.
///
/// Items are collected uniformly whether the channel holds one `<item>` or
/// many, so sparsely covered companies still yield their single headline.
pub fn parse_articles(xml: &str, limit: usize) -> Result<Vec<NewsArticle>> {
    // RSS 0.91 feeds still ship a Netscape DOCTYPE.
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(xml, options)
        .map_err(|e| MonitorError::FeedParse(e.to_string()))?;

    let articles = doc
        .descendants()
        .filter(|node| node.has_tag_name("item") || node.has_tag_name("entry"))
        .take(limit)
        .map(|node| article_from_node(&node))
        .collect();

    Ok(articles)
}

fn article_from_node(node: &Node<'_, '_>) -> NewsArticle {
    let raw_title = child_text_any(node, &["title"], None).unwrap_or_default();
    let url = child_text_any(node, &["link"], Some("href")).unwrap_or_default();
    let date = child_text_any(node, &["pubDate", "published", "updated"], None)
        .map(|raw| normalize_date(&raw))
        .unwrap_or_default();

    let source = child_text_any(node, &["source"], None)
        .or_else(|| source_from_title(&raw_title))
        .unwrap_or_default();

    NewsArticle {
        title: strip_publisher_suffix(&raw_title),
        url,
        date,
        source,
    }
}

fn publisher_suffix_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+-\s+[^-]+$").expect("publisher suffix pattern"))
}

/// Drop a trailing `" - Publisher"` from a headline
pub fn strip_publisher_suffix(title: &str) -> String {
    publisher_suffix_regex()
        .replace(title.trim(), "")
        .trim_end()
        .to_string()
}

/// Publisher named after the last `" - "` of a headline, if any
pub fn source_from_title(title: &str) -> Option<String> {
    let (_, tail) = title.rsplit_once(" - ")?;
    let tail = tail.trim();
    if tail.is_empty() {
        None
    } else {
        Some(tail.to_string())
    }
}

/// Reduce a feed timestamp to a `YYYY-MM-DD` UTC date, or `""` if unparsable
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc).format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// First non-blank value among the named children. When `attribute` is
/// given it is preferred over the element text (Atom `<link href>`).
fn child_text_any(node: &Node<'_, '_>, names: &[&str], attribute: Option<&str>) -> Option<String> {
    node.children()
        .filter(|child| child.is_element())
        .filter(|child| {
            names
                .iter()
                .any(|name| child.tag_name().name().eq_ignore_ascii_case(name))
        })
        .find_map(|child| {
            attribute
                .and_then(|attr| child.attribute(attr))
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .or_else(|| child.text().map(str::trim).filter(|text| !text.is_empty()))
        })
        .map(str::to_string)
}
