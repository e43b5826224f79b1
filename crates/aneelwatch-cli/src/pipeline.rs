//! One run: search every term → extract → dedup → persist → notify.

use std::time::Instant;

use aneelwatch_core::{DocumentRecord, ExtractError, Extractor, RunResult, SearchQuery, dedup_by_title};
use aneelwatch_notify::{Delivery, Notifier};
use aneelwatch_store::{PageDumper, ResultsFile};
use aneelwatch_sync::PageFetcher;
use anyhow::Context;
use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

/// What to search for in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub terms: Vec<String>,
    pub date_from: NaiveDate,
    pub date_to: Option<NaiveDate>,
    pub max_pages: u32,
}

impl RunPlan {
    /// First-page query for `term`.
    pub fn query(&self, term: &str) -> SearchQuery {
        match self.date_to {
            Some(to) => SearchQuery::between(term, self.date_from, to),
            None => SearchQuery::on(term, self.date_from),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunStats {
    pub pages_fetched: usize,
    pub failed_terms: usize,
    pub extracted: usize,
    pub kept: usize,
    pub elapsed_secs: f64,
}

pub struct RunOutcome {
    pub result: RunResult,
    pub stats: RunStats,
    pub delivery: Delivery,
}

/// Collaborators a run needs.
pub struct Pipeline<'a> {
    pub fetcher: &'a dyn PageFetcher,
    pub extractor: &'a Extractor,
    pub results: &'a ResultsFile,
    pub notifier: &'a Notifier,
    pub dumper: Option<&'a PageDumper>,
}

impl Pipeline<'_> {
    /// Execute `plan` end to end.
    ///
    /// A failing term is logged and skipped. The run fails only if every term
    /// failed (nothing is written then) or the results file cannot be written.
    pub async fn run(&self, plan: &RunPlan) -> anyhow::Result<RunOutcome> {
        let start = Instant::now();
        let mut stats = RunStats::default();
        let mut all = Vec::new();

        for term in &plan.terms {
            match self.search_term(plan, term, &mut stats).await {
                Ok(records) => all.extend(records),
                Err(e) => {
                    error!(term = %term, error = format!("{e:#}"), "search failed");
                    stats.failed_terms += 1;
                }
            }
        }

        if !plan.terms.is_empty() && stats.failed_terms == plan.terms.len() {
            anyhow::bail!("all {} search(es) failed; results file left untouched", plan.terms.len());
        }

        stats.extracted = all.len();
        let documents = dedup_by_title(all);
        stats.kept = documents.len();
        let result = RunResult::new(documents);

        self.results
            .write(&result)
            .with_context(|| format!("writing {}", self.results.path().display()))?;

        let delivery = self.notifier.notify(&result, plan.date_from).await;

        stats.elapsed_secs = start.elapsed().as_secs_f64();
        info!(
            extracted = stats.extracted,
            kept = stats.kept,
            pages = stats.pages_fetched,
            failed_terms = stats.failed_terms,
            ?delivery,
            "run complete"
        );
        Ok(RunOutcome {
            result,
            stats,
            delivery,
        })
    }

    /// Walk result pages for one term until an empty page or `max_pages`.
    ///
    /// Only page 1 can fail the term. A later page that cannot be fetched or
    /// read ends the walk and keeps the records already gathered.
    async fn search_term(
        &self,
        plan: &RunPlan,
        term: &str,
        stats: &mut RunStats,
    ) -> anyhow::Result<Vec<DocumentRecord>> {
        let mut records = Vec::new();
        for page in 1..=plan.max_pages {
            let query = plan.query(term).with_page(page);
            let content = match self.fetcher.fetch(&query).await {
                Ok(content) => content,
                Err(e) if page > 1 => {
                    warn!(term, page, error = %e, "page fetch failed; keeping earlier pages");
                    break;
                }
                Err(e) => return Err(e).with_context(|| format!("fetching page {page}")),
            };
            stats.pages_fetched += 1;

            if let Some(dumper) = self.dumper
                && let Err(e) = dumper.dump(term, page, &content)
            {
                warn!(error = %e, "could not save debug page");
            }

            let found = match self.extractor.extract_for(&content, &query) {
                Ok(found) => found,
                Err(ExtractError::Empty) if page > 1 => {
                    debug!(term, page, "blank page; end of results");
                    break;
                }
                Err(e) if page > 1 => {
                    warn!(term, page, error = %e, "unreadable page; keeping earlier pages");
                    break;
                }
                Err(e) => return Err(e).with_context(|| format!("extracting page {page}")),
            };
            if found.is_empty() {
                break;
            }
            records.extend(found);
        }
        info!(term, count = records.len(), "term searched");
        Ok(records)
    }
}
