//! Core of aneelwatch: document records, result-page extraction, search request
//! building, and the pure policies (dedup, relevance, summary text) applied to a run.

mod error;
pub mod extract;
pub mod model;
pub mod query;
pub mod relevance;
pub mod shape;
pub mod summary;
pub mod text;

pub use error::ExtractError;
pub use extract::Extractor;
pub use model::{DateFilterMode, DocumentRecord, RunResult, SearchQuery};
pub use query::{FormLayout, SearchRequest, SessionContext};
pub use relevance::{Relevance, RelevancePolicy, dedup_by_title};
pub use shape::PageShape;
pub use text::PORTAL_ORIGIN;
