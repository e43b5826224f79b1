//! Fetch layer: the collaborator that turns a [`SearchQuery`] into results-page content.

use aneelwatch_core::SearchQuery;
use async_trait::async_trait;

mod error;
pub use error::SyncError;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::PortalClient;

/// Anything that can execute a search and hand back the rendered results page.
///
/// Timeouts and retries belong to the implementation, not the caller.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, query: &SearchQuery) -> Result<String, SyncError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    struct Canned(&'static str);

    #[async_trait]
    impl PageFetcher for Canned {
        async fn fetch(&self, query: &SearchQuery) -> Result<String, SyncError> {
            if query.term.is_empty() {
                return Err(SyncError::Other("empty term".into()));
            }
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn fetcher_is_object_safe() {
        let fetcher: Box<dyn PageFetcher> = Box::new(Canned("<html></html>"));
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(fetcher.fetch(&SearchQuery::on("x", date)).await.unwrap(), "<html></html>");
        assert!(fetcher.fetch(&SearchQuery::on("", date)).await.is_err());
    }
}
