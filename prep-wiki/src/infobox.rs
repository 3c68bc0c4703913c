//! Infobox extraction from encyclopedia article pages.
//!
//! An infobox is the structured summary panel on an article, rendered as a
//! table of label/value rows. [`WikiClient::infobox`] fetches the page for a
//! subject and hands the body to [`parse_infobox`], which walks the first
//! matching table and emits rows in document order.

use std::sync::LazyLock;
use std::time::Duration;

use prep_http::{HttpClient, HttpError, RequestOpts};
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org/wiki/";

// Some wikis reject the default client identifier outright, so we always
// present a browser-like User-Agent and an explicit language preference.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// Company articles tag their infobox `ib-company`; the plain `vcard` form
// covers every other subject kind. First match wins.
static TABLE_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("table.infobox.vcard, table.infobox.ib-company.vcard")
        .expect("static selector")
});
static TR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("static selector"));
static TH_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").expect("static selector"));
static TD_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("static selector"));
static IMG_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr td.infobox-image img").expect("static selector"));

#[derive(Debug, Error)]
pub enum WikiError {
    /// Transport failure or non-success HTTP status while retrieving the page.
    #[error("failed to fetch page for '{subject}': {reason}")]
    Fetch { subject: String, reason: String },

    /// Page retrieved, but it carries no matching infobox table.
    #[error("no infobox found for '{0}'")]
    NoInfobox(String),
}

/// One label/value row, in the order it appears in the source table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactRow {
    pub label: String,
    pub value: String,
}

/// Extraction result: ordered fact rows plus an optional image URL.
///
/// The image URL is always absolute; protocol-relative sources are
/// normalized to `https:`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Infobox {
    pub rows: Vec<FactRow>,
    pub image: Option<String>,
}

/// Client for fetching article pages and extracting their infobox.
#[derive(Clone)]
pub struct WikiClient {
    http: HttpClient,
    user_agent: HeaderValue,
    accept_language: HeaderValue,
    timeout: Duration,
}

impl WikiClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL).expect("default wiki base url")
    }

    /// Anchor the client to a different article base (mirrors, mock servers).
    pub fn with_base_url(base_url: &str) -> Result<Self, HttpError> {
        let http = HttpClient::new(base_url)?.with_timeout(DEFAULT_TIMEOUT);
        Ok(Self {
            http,
            user_agent: HeaderValue::from_static(DEFAULT_USER_AGENT),
            accept_language: HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Result<Self, HttpError> {
        self.user_agent = HeaderValue::from_str(user_agent)
            .map_err(|e| HttpError::Build(format!("invalid User-Agent: {e}")))?;
        Ok(self)
    }

    pub fn with_accept_language(mut self, accept_language: &str) -> Result<Self, HttpError> {
        self.accept_language = HeaderValue::from_str(accept_language)
            .map_err(|e| HttpError::Build(format!("invalid Accept-Language: {e}")))?;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch the subject's article page and extract its infobox.
    ///
    /// One outbound read, never retried. A page that loads but has no
    /// matching fact table is [`WikiError::NoInfobox`]; a table with zero
    /// valid rows is a success with empty `rows`.
    pub async fn infobox(&self, subject: &str) -> Result<Infobox, WikiError> {
        let path = page_slug(subject);

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, self.user_agent.clone());
        headers.insert(ACCEPT_LANGUAGE, self.accept_language.clone());

        tracing::info!(target: "wiki", subject = %subject, slug = %path, "wiki.infobox.fetch");

        let html = self
            .http
            .get_text(
                &path,
                RequestOpts {
                    headers: Some(headers),
                    timeout: Some(self.timeout),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| WikiError::Fetch {
                subject: subject.to_string(),
                reason: e.to_string(),
            })?;

        match parse_infobox(&html) {
            Some(infobox) => {
                tracing::info!(
                    target: "wiki",
                    subject = %subject,
                    rows = infobox.rows.len(),
                    has_image = infobox.image.is_some(),
                    "wiki.infobox.extracted"
                );
                Ok(infobox)
            }
            None => Err(WikiError::NoInfobox(subject.to_string())),
        }
    }
}

impl Default for WikiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn a free-text subject into an article path segment: spaces become
/// underscores, everything outside the unreserved set is percent-encoded.
/// `/` is kept so subjects like "AC/DC" resolve to their canonical path.
pub fn page_slug(subject: &str) -> String {
    let underscored = subject.trim().replace(' ', "_");
    let mut out = String::with_capacity(underscored.len());
    for b in underscored.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

/// Locate the first matching fact table and extract its rows and image.
///
/// Returns `None` when the document has no matching table at all; the
/// distinction between "no table" and "table with no valid rows" is the
/// caller's error boundary.
pub fn parse_infobox(html: &str) -> Option<Infobox> {
    let doc = Html::parse_document(html);
    let table = doc.select(&TABLE_SEL).next()?;

    let mut rows = Vec::new();
    for tr in table.select(&TR_SEL) {
        let Some(th) = tr.select(&TH_SEL).next() else {
            continue;
        };
        let Some(td) = tr.select(&TD_SEL).next() else {
            continue;
        };

        let label = cell_text(th);
        let value = cell_text(td);
        if label.is_empty() || value.is_empty() {
            continue;
        }
        rows.push(FactRow { label, value });
    }

    let image = table
        .select(&IMG_SEL)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(normalize_image_src);

    Some(Infobox { rows, image })
}

/// Visible text of a cell: every text-bearing descendant outside `<sup>`
/// subtrees, whitespace-normalized and joined with single spaces.
fn cell_text(cell: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    collect_text(cell, &mut parts);
    parts.join(" ")
}

fn collect_text(el: ElementRef<'_>, out: &mut Vec<String>) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if !normalized.is_empty() {
                out.push(normalized);
            }
        } else if let Some(child_el) = ElementRef::wrap(child) {
            // footnote markers
            if child_el.value().name() == "sup" {
                continue;
            }
            collect_text(child_el, out);
        }
    }
}

fn normalize_image_src(src: &str) -> String {
    match src.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => src.to_string(),
    }
}
