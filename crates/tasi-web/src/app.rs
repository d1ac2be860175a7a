use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tasi::export::to_csv_string;
use tasi::{CSV_FILE_NAME, Collector, MemberTable, PageSource, ScrapeOutcome};
use tokio::sync::RwLock;

use crate::page::{self, Status};

#[derive(Debug, Default)]
struct ProgressCounters {
    running: AtomicBool,
    done: AtomicUsize,
    failed: AtomicUsize,
    total: AtomicUsize,
}

/// Clears the running flag when the scrape finishes or its request is dropped.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressView {
    pub running: bool,
    pub done: usize,
    pub failed: usize,
    pub total: usize,
}

/// Latest scrape result shared by every request. Replaced on each run.
#[derive(Debug, Default)]
pub struct LastRun {
    pub status: Option<Status>,
    pub table: Option<MemberTable>,
}

#[derive(Debug)]
pub struct AppState<S> {
    source: S,
    last_run: RwLock<LastRun>,
    progress: Arc<ProgressCounters>,
}

impl<S: PageSource> AppState<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            last_run: RwLock::new(LastRun::default()),
            progress: Arc::new(ProgressCounters::default()),
        }
    }

    pub async fn set_last_run(&self, last_run: LastRun) {
        *self.last_run.write().await = last_run;
    }

    fn progress(&self) -> ProgressView {
        ProgressView {
            running: self.progress.running.load(Ordering::SeqCst),
            done: self.progress.done.load(Ordering::SeqCst),
            failed: self.progress.failed.load(Ordering::SeqCst),
            total: self.progress.total.load(Ordering::SeqCst),
        }
    }

    async fn run_scrape(&self) -> LastRun {
        let counters = self.progress.clone();
        let collector = Collector::new().on_progress(move |p| {
            counters.done.store(p.done, Ordering::SeqCst);
            counters.failed.store(p.failed, Ordering::SeqCst);
            counters.total.store(p.total, Ordering::SeqCst);
        });

        match collector.run(&self.source).await {
            Ok(report) => {
                let warnings = report.warnings.iter().map(ToString::to_string).collect();
                match report.outcome {
                    ScrapeOutcome::Table(table) => LastRun {
                        status: Some(Status::Success {
                            message: "Scraping completed!".to_string(),
                            warnings,
                        }),
                        table: Some(table),
                    },
                    ScrapeOutcome::NoData(message) => LastRun {
                        status: Some(Status::Error { message, warnings }),
                        table: None,
                    },
                }
            }
            Err(e) => LastRun {
                status: Some(Status::Error {
                    message: e.to_string(),
                    warnings: Vec::new(),
                }),
                table: None,
            },
        }
    }
}

pub fn router<S>(state: Arc<AppState<S>>) -> Router
where
    S: PageSource + Send + 'static,
{
    Router::new()
        .route("/", get(index::<S>))
        .route("/scrape", post(scrape::<S>))
        .route("/progress", get(progress::<S>))
        .route("/download", get(download::<S>))
        .with_state(state)
}

async fn index<S: PageSource + Send + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Html<String> {
    let last_run = state.last_run.read().await;
    Html(page::render(&last_run))
}

async fn scrape<S: PageSource + Send + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Response {
    if state.progress.running.swap(true, Ordering::SeqCst) {
        log::warn!("Scrape requested while another one is running");
        let busy = LastRun {
            status: Some(Status::Error {
                message: "A scrape is already running. Please wait for it to finish.".to_string(),
                warnings: Vec::new(),
            }),
            table: None,
        };
        return (StatusCode::CONFLICT, Html(page::render(&busy))).into_response();
    }
    let running = RunningGuard(&state.progress.running);

    state.progress.done.store(0, Ordering::SeqCst);
    state.progress.failed.store(0, Ordering::SeqCst);
    state.progress.total.store(0, Ordering::SeqCst);

    log::info!("Scraping data... This may take a while.");
    let last_run = state.run_scrape().await;
    drop(running);

    let html = page::render(&last_run);
    state.set_last_run(last_run).await;
    Html(html).into_response()
}

async fn progress<S: PageSource + Send + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<ProgressView> {
    Json(state.progress())
}

async fn download<S: PageSource + Send + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Response {
    let last_run = state.last_run.read().await;
    let Some(table) = &last_run.table else {
        return (StatusCode::NOT_FOUND, "No data scraped yet.").into_response();
    };

    match to_csv_string(table) {
        Ok(csv) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", CSV_FILE_NAME),
                ),
            ],
            csv,
        )
            .into_response(),
        Err(e) => {
            log::error!("CSV export failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
