//! HTTP client for the document-library portal's advanced search.

use std::time::Duration;

use aneelwatch_core::{FormLayout, SearchQuery, SearchRequest, SessionContext};
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::{PageFetcher, SyncError};

const USER_AGENT: &str = concat!("aneelwatch/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Cookie-keeping HTTP client that replays the search form.
///
/// Each [`fetch`](PageFetcher::fetch) opens the form, harvests its state fields
/// into a [`SessionContext`], then posts the query with those fields.
pub struct PortalClient {
    client: reqwest::Client,
    base_url: String,
    layout: FormLayout,
}

impl PortalClient {
    /// Create a client for the portal at `base_url`.
    ///
    /// `base_url` should be like `https://biblioteca.aneel.gov.br` (no trailing slash).
    pub fn new(base_url: String) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .cookie_store(true)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            layout: FormLayout::default(),
        })
    }

    /// Use a different form layout (field names) than the current default.
    pub fn with_layout(mut self, layout: FormLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Load the search form and collect its hidden state fields.
    pub async fn open_session(&self) -> Result<SessionContext, SyncError> {
        let url = self.url_for(&self.layout.form_path);
        info!(url = %url, "opening search form");
        let html = Self::read_body(self.client.get(&url).send().await?).await?;
        let session = SessionContext::from_page(&html);
        if session.is_empty() {
            warn!("search form carried no hidden fields; submitting without session state");
        } else {
            debug!(fields = session.fields().len(), "harvested session fields");
        }
        Ok(session)
    }

    /// Submit a built request and return the results page.
    pub async fn submit(&self, request: &SearchRequest) -> Result<String, SyncError> {
        let url = self.url_for(&request.path);
        info!(url = %url, params = request.params.len(), "submitting search");
        let resp = self.client.post(&url).form(&request.params).send().await?;
        let body = Self::read_body(resp).await?;
        info!(bytes = body.len(), "received results page");
        Ok(body)
    }

    async fn read_body(resp: reqwest::Response) -> Result<String, SyncError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.text().await?)
    }
}

#[async_trait]
impl PageFetcher for PortalClient {
    async fn fetch(&self, query: &SearchQuery) -> Result<String, SyncError> {
        let session = self.open_session().await?;
        let request = SearchRequest::build(query, &self.layout, &session);
        self.submit(&request).await
    }
}
