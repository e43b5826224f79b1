//! Within-run policies: duplicate removal and keyword relevance.
//!
//! Neither is persisted. Relevance only orders and labels the notification.

use std::collections::HashSet;

use crate::model::DocumentRecord;
use crate::text::clean_text;

/// Drop later records whose normalised, lowercased title was already seen.
///
/// Records with an empty title are keyed by `full_text_url` instead. Order is kept.
pub fn dedup_by_title(records: Vec<DocumentRecord>) -> Vec<DocumentRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|rec| {
            let title = clean_text(&rec.title).to_lowercase();
            let key = if title.is_empty() {
                format!("url:{}", rec.full_text_url)
            } else {
                format!("title:{title}")
            };
            seen.insert(key)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Relevance {
    High,
    Medium,
    Low,
}

impl Relevance {
    pub fn label(self) -> &'static str {
        match self {
            Relevance::High => "ALTA",
            Relevance::Medium => "MÉDIA",
            Relevance::Low => "BAIXA",
        }
    }
}

/// Keyword lists scored against a record's title, summary and subject.
///
/// An empty policy rates everything [`Relevance::Low`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelevancePolicy {
    high: Vec<String>,
    medium: Vec<String>,
}

impl RelevancePolicy {
    pub fn new<I, S>(high: I, medium: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        fn prepare<S: AsRef<str>>(words: impl IntoIterator<Item = S>) -> Vec<String> {
            words
                .into_iter()
                .map(|w| clean_text(w.as_ref()).to_lowercase())
                .filter(|w| !w.is_empty())
                .collect()
        }
        Self {
            high: prepare(high),
            medium: prepare(medium),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.high.is_empty() && self.medium.is_empty()
    }

    pub fn score(&self, rec: &DocumentRecord) -> Relevance {
        let haystack = [
            Some(rec.title.as_str()),
            rec.summary.as_deref(),
            rec.subject.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

        if self.high.iter().any(|k| haystack.contains(k.as_str())) {
            Relevance::High
        } else if self.medium.iter().any(|k| haystack.contains(k.as_str())) {
            Relevance::Medium
        } else {
            Relevance::Low
        }
    }

    /// Records paired with their score, most relevant first; page order within a tier.
    pub fn rank<'a>(&self, records: &'a [DocumentRecord]) -> Vec<(Relevance, &'a DocumentRecord)> {
        let mut ranked: Vec<_> = records.iter().map(|r| (self.score(r), r)).collect();
        ranked.sort_by_key(|(rel, _)| *rel);
        ranked
    }
}
