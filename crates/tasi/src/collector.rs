use std::fmt::Display;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream;

use crate::scraper::{PageSource, ScraperError};
use crate::types::{MemberRecord, MemberTable};

pub const NO_LINKS_MESSAGE: &str = "No member links found on the page.";
pub const NO_RECORDS_MESSAGE: &str = "No data scraped.";

#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("Error scraping data: {0}")]
    Listing(#[source] ScraperError),
}

/// A detail page that was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailWarning {
    pub url: String,
    pub message: String,
}

impl Display for DetailWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error fetching details from {}: {}", self.url, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    NoData(String),
    Table(MemberTable),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeReport {
    pub outcome: ScrapeOutcome,
    pub links_found: usize,
    pub warnings: Vec<DetailWarning>,
}

impl ScrapeReport {
    fn no_data(message: impl Into<String>, links_found: usize, warnings: Vec<DetailWarning>) -> Self {
        Self {
            outcome: ScrapeOutcome::NoData(message.into()),
            links_found,
            warnings,
        }
    }

    pub fn table(&self) -> Option<&MemberTable> {
        match &self.outcome {
            ScrapeOutcome::Table(table) => Some(table),
            ScrapeOutcome::NoData(_) => None,
        }
    }

    pub fn into_table(self) -> Option<MemberTable> {
        match self.outcome {
            ScrapeOutcome::Table(table) => Some(table),
            ScrapeOutcome::NoData(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub done: usize,
    pub failed: usize,
    pub total: usize,
}

type ProgressFn = Arc<dyn Fn(Progress) + Send + Sync>;

/// Drives one scrape: the listing once, then every detail page.
#[derive(Clone)]
pub struct Collector {
    concurrency: usize,
    progress: Option<ProgressFn>,
}

impl Default for Collector {
    fn default() -> Self {
        Self {
            concurrency: 1,
            progress: None,
        }
    }
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector")
            .field("concurrency", &self.concurrency)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detail pages in flight at once. Results keep listing order either way.
    pub fn concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    pub fn on_progress(mut self, f: impl Fn(Progress) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(f));
        self
    }

    pub async fn run<S: PageSource>(&self, source: &S) -> Result<ScrapeReport, CollectError> {
        let refs = match source.fetch_member_refs().await {
            Ok(refs) => refs,
            Err(ScraperError::ParseError(e)) => {
                log::warn!("{e}");
                return Ok(ScrapeReport::no_data(e.to_string(), 0, Vec::new()));
            }
            Err(e) => {
                log::error!("Error scraping data: {e}");
                return Err(CollectError::Listing(e));
            }
        };

        if refs.is_empty() {
            log::warn!("{NO_LINKS_MESSAGE}");
            return Ok(ScrapeReport::no_data(NO_LINKS_MESSAGE, 0, Vec::new()));
        }

        let total = refs.len();
        log::info!("Found {} member link(s)", total);

        let urls: Vec<String> = refs.iter().map(|r| source.detail_url(r)).collect();
        let mut results = stream::iter(urls)
            .map(|url| async move {
                let result = source.fetch_member_record(&url).await;
                (url, result)
            })
            .buffered(self.concurrency);

        let mut records: Vec<MemberRecord> = Vec::with_capacity(total);
        let mut warnings = Vec::new();
        let mut done = 0;

        while let Some((url, result)) = results.next().await {
            done += 1;
            match result {
                Ok(record) => records.push(record),
                Err(e) => {
                    let warning = DetailWarning {
                        url,
                        message: e.to_string(),
                    };
                    log::warn!("{warning}");
                    warnings.push(warning);
                }
            }

            if let Some(progress) = &self.progress {
                progress(Progress {
                    done,
                    failed: warnings.len(),
                    total,
                });
            }
        }

        if records.is_empty() {
            log::warn!("{NO_RECORDS_MESSAGE}");
            return Ok(ScrapeReport::no_data(NO_RECORDS_MESSAGE, total, warnings));
        }

        log::info!(
            "Scraped {} of {} member(s), {} skipped",
            records.len(),
            total,
            warnings.len()
        );

        Ok(ScrapeReport {
            outcome: ScrapeOutcome::Table(MemberTable::new(records)),
            links_found: total,
            warnings,
        })
    }
}
