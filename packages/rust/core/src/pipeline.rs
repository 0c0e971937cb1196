//! The two execution paths, decoupled by the snapshot artifact.
//!
//! `ingest` is the offline path: harvest every configured source, then
//! atomically replace the snapshot. `ask` is the online path: read the
//! snapshot, build the bounded context, generate one answer. The online path
//! never invokes the crawler and works with an absent, empty, or stale
//! snapshot.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument};

use askbase_crawler::SourceCrawler;
use askbase_shared::{AskbaseError, CrawlConfig, Result};
use askbase_snapshot::SnapshotStore;

use crate::answer::AnswerGenerator;
use crate::context::{ContextBudget, build_context};

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting ingest status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the ingest run completes.
    fn done(&self, report: &IngestReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _report: &IngestReport) {}
}

// ---------------------------------------------------------------------------
// Ingest (offline path)
// ---------------------------------------------------------------------------

/// Configuration for one ingest run.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Ordered source list to visit.
    pub sources: Vec<String>,
    /// Crawl settings.
    pub crawl: CrawlConfig,
    /// Snapshot artifact path.
    pub snapshot_path: PathBuf,
}

/// Result of one ingest run.
#[derive(Debug)]
pub struct IngestReport {
    /// Number of sources fetched successfully.
    pub fetched: usize,
    /// Failed sources as `(source, cause)` pairs.
    pub failures: Vec<(String, String)>,
    /// Where the snapshot was written.
    pub snapshot_path: PathBuf,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Run one ingest: harvest all sources, write the snapshot.
///
/// Per-source failures are reported, not fatal — a run where every source
/// failed still writes an empty snapshot, deliberately signaling "no data"
/// to the query path. The only fatal outcomes are an empty source list and
/// an unwritable snapshot artifact.
#[instrument(skip_all, fields(sources = config.sources.len()))]
pub async fn ingest(
    config: &IngestConfig,
    progress: &dyn ProgressReporter,
) -> Result<IngestReport> {
    let start = Instant::now();

    if config.sources.is_empty() {
        return Err(AskbaseError::config(
            "no sources configured; add [sources] urls to askbase.toml",
        ));
    }

    let crawler = SourceCrawler::new(config.crawl.clone())?;

    progress.phase("Fetching sources");
    let crawl = crawler.harvest(&config.sources).await;

    progress.phase("Writing snapshot");
    let store = SnapshotStore::new(&config.snapshot_path);
    store.write(&crawl.records)?;

    let report = IngestReport {
        fetched: crawl.records.len(),
        failures: crawl.failures,
        snapshot_path: config.snapshot_path.clone(),
        elapsed: start.elapsed(),
    };

    info!(
        fetched = report.fetched,
        failed = report.failures.len(),
        path = %report.snapshot_path.display(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "ingest completed"
    );

    progress.done(&report);
    Ok(report)
}

// ---------------------------------------------------------------------------
// Ask (online path)
// ---------------------------------------------------------------------------

/// Configuration for the query path.
#[derive(Debug, Clone)]
pub struct AskConfig {
    /// Snapshot artifact path.
    pub snapshot_path: PathBuf,
    /// Context budgeting parameters.
    pub budget: ContextBudget,
}

/// Answer one question grounded in the current snapshot.
///
/// Reading the snapshot and building the context are pure computations; the
/// snapshot is read fresh per query, so concurrent queries and a concurrent
/// wholesale snapshot replacement cannot interfere.
#[instrument(skip_all, fields(question_chars = question.chars().count()))]
pub async fn ask(
    question: &str,
    config: &AskConfig,
    generator: &AnswerGenerator,
) -> Result<String> {
    if question.trim().is_empty() {
        return Err(AskbaseError::config("question must not be empty"));
    }

    let records = SnapshotStore::new(&config.snapshot_path).read();
    let context = build_context(&records, &config.budget);

    info!(
        records = records.len(),
        context_chars = context.chars().count(),
        "bounded context assembled"
    );

    generator.answer(question, &context).await
}
