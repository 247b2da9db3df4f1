//! Chapter and description extraction from page HTML.
//!
//! Pages are authored HTML, not XML, so the reader runs with end-name checks
//! disabled and tolerates unmatched end tags. A parse error stops extraction
//! and keeps whatever was collected up to that point; a formatting slip in
//! one page never fails the page itself.

use std::borrow::Cow;
use std::sync::LazyLock;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use regex::Regex;

/// Class marking chapter anchors.
const CHAPTER_CLASS: &str = "chapter";

/// Class marking the description element.
const DESCRIPTION_CLASS: &str = "page-description";

/// Elements that never have an end tag in HTML.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// A complete character reference starting right after `&`.
static REFERENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[A-Za-z][A-Za-z0-9]*|#[0-9]+|#[xX][0-9A-Fa-f]+);").unwrap());

/// Data extracted from a page body.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageExtract {
    /// `href` of every chapter anchor, in document order.
    pub chapters: Vec<String>,
    /// Normalised text of the first description element, or empty.
    pub description: String,
}

/// Extract chapters and description from page HTML.
#[must_use]
pub fn extract_page(html: &str) -> PageExtract {
    let html = escape_bare_ampersands(html);
    let mut reader = Reader::from_str(&html);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut extract = PageExtract::default();
    let mut depth: usize = 0;
    // Depth at which the description element was opened
    let mut capture: Option<usize> = None;
    let mut description_done = false;
    let mut text = String::new();

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(error = %e, "Malformed page HTML, keeping partial extract");
                break;
            }
        };

        match event {
            Event::Start(e) => {
                let tag = tag_name(&e);
                let classes = attr(&e, b"class").unwrap_or_default();
                if tag == "a" && has_class(&classes, CHAPTER_CLASS) {
                    push_chapter(&mut extract, &e);
                }
                let is_void = VOID_ELEMENTS.contains(&tag.as_str());
                if !description_done && capture.is_none() && has_class(&classes, DESCRIPTION_CLASS)
                {
                    if is_void {
                        description_done = true;
                    } else {
                        capture = Some(depth);
                    }
                }
                if !is_void {
                    depth += 1;
                }
            }
            Event::Empty(e) => {
                let tag = tag_name(&e);
                let classes = attr(&e, b"class").unwrap_or_default();
                if tag == "a" && has_class(&classes, CHAPTER_CLASS) {
                    push_chapter(&mut extract, &e);
                }
                if !description_done && capture.is_none() && has_class(&classes, DESCRIPTION_CLASS)
                {
                    description_done = true;
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if capture == Some(depth) {
                    capture = None;
                    description_done = true;
                }
            }
            Event::Text(e) if capture.is_some() => {
                text.push_str(&reader.decoder().decode(&e).unwrap_or_default());
            }
            Event::CData(e) if capture.is_some() => {
                text.push_str(&String::from_utf8_lossy(&e));
            }
            Event::GeneralRef(e) if capture.is_some() => {
                let entity = reader.decoder().decode(&e).unwrap_or_default();
                text.push_str(&decode_entity(&entity));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    extract.description = normalize_description(&text);
    extract
}

/// Escape every `&` that does not open a character reference.
///
/// HTML allows a bare `&` in text ("Q&A"), XML does not.
fn escape_bare_ampersands(html: &str) -> Cow<'_, str> {
    let bare = |(i, _): &(usize, &str)| !REFERENCE_RE.is_match(&html[i + 1..]);
    if !html.match_indices('&').any(|m| bare(&m)) {
        return Cow::Borrowed(html);
    }

    let mut escaped = String::with_capacity(html.len() + 16);
    let mut last = 0;
    for m in html.match_indices('&').filter(|m| bare(m)) {
        escaped.push_str(&html[last..m.0]);
        escaped.push_str("&amp;");
        last = m.0 + 1;
    }
    escaped.push_str(&html[last..]);
    Cow::Owned(escaped)
}

/// Replace escaped newlines, collapse whitespace runs and trim.
fn normalize_description(raw: &str) -> String {
    let unescaped = raw.replace("\\n", " ");
    WHITESPACE_RE
        .replace_all(&unescaped, " ")
        .trim()
        .to_owned()
}

fn push_chapter(extract: &mut PageExtract, e: &BytesStart<'_>) {
    if let Some(href) = attr(e, b"href") {
        extract.chapters.push(href);
    }
}

fn tag_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase()
}

/// Value of an attribute. HTML-style unquoted and valueless attributes are
/// accepted.
fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.html_attributes()
        .flatten()
        .find(|a| a.key.as_ref().eq_ignore_ascii_case(key))
        .map(|a| {
            a.unescape_value().map_or_else(
                |_| String::from_utf8_lossy(&a.value).into_owned(),
                Cow::into_owned,
            )
        })
}

fn has_class(classes: &str, class: &str) -> bool {
    classes.split_ascii_whitespace().any(|c| c == class)
}

/// Decode an entity reference to text. Unknown entities are kept verbatim.
fn decode_entity(entity: &str) -> Cow<'static, str> {
    match entity {
        "lt" => Cow::Borrowed("<"),
        "gt" => Cow::Borrowed(">"),
        "amp" => Cow::Borrowed("&"),
        "apos" => Cow::Borrowed("'"),
        "quot" => Cow::Borrowed("\""),
        "nbsp" => Cow::Borrowed(" "),
        s if s.starts_with('#') => {
            let code = if let Some(hex) = s.strip_prefix("#x").or_else(|| s.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32).map_or_else(
                || Cow::Owned(format!("&{entity};")),
                |c| Cow::Owned(c.to_string()),
            )
        }
        _ => Cow::Owned(format!("&{entity};")),
    }
}
