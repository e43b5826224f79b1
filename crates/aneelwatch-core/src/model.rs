//! Shared types for one aneelwatch run: the query, the extracted records, and the
//! persisted run result.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One legislative or regulatory act extracted from a results page.
///
/// Created only by the [`Extractor`](crate::Extractor). `full_text_url` is always
/// present; candidates without one never become a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub title: String,
    pub signing_date: Option<NaiveDate>,
    pub publication_date: Option<NaiveDate>,
    /// The act's abstract ("ementa").
    pub summary: Option<String>,
    pub subject: Option<String>,
    pub full_text_url: String,
    pub technical_note_url: Option<String>,
    /// Filename stem of `full_text_url`.
    pub document_number: Option<String>,
    /// Query term that produced this record.
    pub search_term: String,
    /// Date parameter of the query, not a date read from the page.
    pub search_date: NaiveDate,
}

impl DocumentRecord {
    /// A record with only the required fields set.
    pub fn new(
        title: impl Into<String>,
        full_text_url: impl Into<String>,
        search_term: impl Into<String>,
        search_date: NaiveDate,
    ) -> Self {
        Self {
            title: title.into(),
            signing_date: None,
            publication_date: None,
            summary: None,
            subject: None,
            full_text_url: full_text_url.into(),
            technical_note_url: None,
            document_number: None,
            search_term: search_term.into(),
            search_date,
        }
    }
}

/// How the portal's date filter is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateFilterMode {
    EqualTo,
    Between,
}

/// Input to one search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub term: String,
    pub date_filter_mode: DateFilterMode,
    pub date_from: NaiveDate,
    pub date_to: Option<NaiveDate>,
    /// 1-based results page.
    #[serde(default = "first_page")]
    pub page: u32,
}

fn first_page() -> u32 {
    1
}

impl SearchQuery {
    /// Acts dated exactly `date`.
    pub fn on(term: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            term: term.into(),
            date_filter_mode: DateFilterMode::EqualTo,
            date_from: date,
            date_to: None,
            page: 1,
        }
    }

    /// Acts dated in `from..=to`.
    pub fn between(term: impl Into<String>, from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            term: term.into(),
            date_filter_mode: DateFilterMode::Between,
            date_from: from,
            date_to: Some(to),
            page: 1,
        }
    }

    /// Same query, different results page.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// The date recorded as provenance on every record this query yields.
    pub fn search_date(&self) -> NaiveDate {
        self.date_from
    }
}

/// Output of one full execution, written verbatim to the results file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub execution_timestamp: DateTime<Utc>,
    pub total_documents: usize,
    pub documents: Vec<DocumentRecord>,
}

impl RunResult {
    /// Stamp `documents` with the current time.
    pub fn new(documents: Vec<DocumentRecord>) -> Self {
        Self::with_timestamp(Utc::now(), documents)
    }

    pub fn with_timestamp(execution_timestamp: DateTime<Utc>, documents: Vec<DocumentRecord>) -> Self {
        Self {
            execution_timestamp,
            total_documents: documents.len(),
            documents,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
