//! Text normalisation for values lifted out of portal markup.
//!
//! Every string that lands in a [`DocumentRecord`](crate::DocumentRecord) goes
//! through [`clean_text`]; every link goes through [`resolve_url_against`].
//!
//! # Portal conventions
//!
//! - Dates are written `DD/MM/YYYY` and are read by fixed-width pattern, never
//!   by locale-aware parsing: `05/03/2024` is 5 March 2024.
//! - Links are either absolute (`https://...`) or rooted at the portal origin
//!   (`/Resultado/Ato/123.pdf`).
//! - The full-text link's filename is the act's document number
//!   (`/Resultado/Ato/ren20241000.pdf` → `ren20241000`).

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use url::Url;

/// Origin of the document-library portal. Relative links resolve against it.
pub const PORTAL_ORIGIN: &str = "https://biblioteca.aneel.gov.br";

static RE_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{2})/(\d{2})/(\d{4})\b").unwrap());

/// Collapse every run of whitespace (including newlines and NBSP) to one space and trim.
///
/// Input is text taken from the parsed document, where the HTML parser has
/// already decoded character references. `&amp;lt;` in the markup stays `&lt;`.
pub fn clean_text(s: &str) -> String {
    s.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Like [`clean_text`], but `None` for values that are blank after cleaning.
pub fn clean_optional(s: &str) -> Option<String> {
    let cleaned = clean_text(s);
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Parse the first `DD/MM/YYYY` occurrence in `s`.
///
/// Returns `None` when no such pattern exists or when it does not name a real
/// calendar day (`31/02/2024`).
pub fn find_date(s: &str) -> Option<NaiveDate> {
    RE_DATE.captures_iter(s).find_map(|caps| {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

/// Resolve a link found in portal markup into an absolute URL.
///
/// - `http`-prefixed links pass through unchanged.
/// - `/path` links are appended to `origin`.
/// - Fragment-only, `javascript:` and `mailto:` links are unresolvable.
pub fn resolve_url_against(origin: &str, href: &str) -> Option<String> {
    let href = href.trim();
    let lower = href.to_ascii_lowercase();
    if href.is_empty()
        || href.starts_with('#')
        || lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
    {
        return None;
    }
    if lower.starts_with("http") {
        return Some(href.to_string());
    }

    let origin = origin.trim_end_matches('/');
    if let Some(rest) = href.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    if href.starts_with('/') {
        return Some(format!("{origin}{href}"));
    }

    // Page-relative ("Ato/123.pdf"): let the URL parser do the joining.
    let base = Url::parse(&format!("{origin}/")).ok()?;
    base.join(href).ok().map(String::from)
}

/// Filename stem of a document URL, used as the act's document number.
pub fn document_number(url: &str) -> Option<String> {
    let file = match Url::parse(url) {
        Ok(parsed) => parsed.path_segments()?.next_back()?.to_string(),
        Err(_) => {
            let path = url.split(['?', '#']).next().unwrap_or_default();
            path.rsplit('/').next()?.to_string()
        }
    };
    let stem = match file.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => file.as_str(),
    };
    (!stem.is_empty()).then(|| stem.to_string())
}
