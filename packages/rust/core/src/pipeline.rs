//! One scrape-diff-notify run: fetch → parse → filter by novelty → notify → persist.

use std::time::{Duration, Instant};

use tracing::{debug, error, info, instrument, warn};

use jobwatch_notify::{Notifier, format_alert, format_failure};
use jobwatch_scrape::{JobTable, PageFetcher};
use jobwatch_shared::{JobRecord, JobWatchError, Result, RunConfig};
use jobwatch_storage::NoveltyStore;

/// Per-run switches.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Report new postings without sending or persisting anything.
    pub dry_run: bool,
}

/// Collaborators for a run. Created once at startup and dropped when the run ends.
pub struct PipelineDeps<'a> {
    pub fetcher: &'a PageFetcher,
    pub table: &'a JobTable,
    pub store: &'a dyn NoveltyStore,
    pub notifier: &'a dyn Notifier,
}

/// What happened to a single posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Operator notified and link stored.
    Notified,
    /// Link was stored by an earlier run.
    AlreadySeen,
    /// New posting found during a dry run.
    WouldNotify,
    /// The existence check failed; the posting was left alone.
    StorageSkipped { error: String },
    /// Sending failed; the link was not stored and will be retried next run.
    DeliveryFailed { error: String },
    /// Operator notified but storing the link failed; may be re-sent next run.
    NotifiedNotPersisted { error: String },
}

impl RecordOutcome {
    /// Whether an error was logged for this posting.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::StorageSkipped { .. }
                | Self::DeliveryFailed { .. }
                | Self::NotifiedNotPersisted { .. }
        )
    }
}

/// A posting together with its outcome.
#[derive(Debug, Clone)]
pub struct ProcessedRecord {
    pub job: JobRecord,
    pub outcome: RecordOutcome,
}

/// Result of a run that got past fetch and parse.
#[derive(Debug)]
pub struct RunSummary {
    /// Postings in document order.
    pub records: Vec<ProcessedRecord>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

impl RunSummary {
    fn count(&self, pred: impl Fn(&RecordOutcome) -> bool) -> usize {
        self.records.iter().filter(|r| pred(&r.outcome)).count()
    }

    /// Postings the operator was told about in this run.
    pub fn notified(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                RecordOutcome::Notified | RecordOutcome::NotifiedNotPersisted { .. }
            )
        })
    }

    /// Postings skipped because an earlier run stored them.
    pub fn already_seen(&self) -> usize {
        self.count(|o| *o == RecordOutcome::AlreadySeen)
    }

    /// New postings reported by a dry run.
    pub fn would_notify(&self) -> usize {
        self.count(|o| *o == RecordOutcome::WouldNotify)
    }

    /// Postings with a storage or delivery error.
    pub fn errors(&self) -> usize {
        self.count(RecordOutcome::is_error)
    }
}

/// Run the pipeline once.
///
/// 1. Fetch the listing page (single attempt)
/// 2. Parse the listing table
/// 3. For each posting: check the store, notify if new, then store it
///
/// Fetch and parse failures abort the run: the operator gets one failure
/// notice (best effort) and the error is returned. Failures while handling a
/// single posting are logged, recorded in the summary, and the run moves on.
#[instrument(skip_all, fields(url = %config.source_url, dry_run = options.dry_run))]
pub async fn run_once(
    config: &RunConfig,
    options: &RunOptions,
    deps: &PipelineDeps<'_>,
) -> Result<RunSummary> {
    let start = Instant::now();
    info!("starting run");

    let jobs = match fetch_jobs(config, deps).await {
        Ok(jobs) => jobs,
        Err(e) => {
            error!(error = %e, "run aborted");
            if !options.dry_run {
                report_failure(&e, config, deps.notifier).await;
            }
            return Err(e);
        }
    };

    debug!(candidates = jobs.len(), "parsed listing table");

    let mut records = Vec::with_capacity(jobs.len());
    for job in jobs {
        let outcome = process_record(&job, config, options, deps).await;
        records.push(ProcessedRecord { job, outcome });
    }

    let summary = RunSummary {
        records,
        elapsed: start.elapsed(),
    };

    info!(
        candidates = summary.records.len(),
        notified = summary.notified(),
        already_seen = summary.already_seen(),
        would_notify = summary.would_notify(),
        errors = summary.errors(),
        duration_ms = summary.elapsed.as_millis(),
        "run completed"
    );

    Ok(summary)
}

async fn fetch_jobs(config: &RunConfig, deps: &PipelineDeps<'_>) -> Result<Vec<JobRecord>> {
    let body = deps.fetcher.fetch(&config.source_url).await?;
    deps.table.extract(&body)
}

async fn report_failure(err: &JobWatchError, config: &RunConfig, notifier: &dyn Notifier) {
    if let Err(notify_err) = notifier.send(&config.chat_id, &format_failure(err)).await {
        warn!(error = %notify_err, "failed to send failure notice");
    }
}

async fn process_record(
    job: &JobRecord,
    config: &RunConfig,
    options: &RunOptions,
    deps: &PipelineDeps<'_>,
) -> RecordOutcome {
    let link = job.document_link.as_str();

    match deps.store.exists(link).await {
        Ok(true) => {
            debug!(title = %job.title, link, "already notified, skipping");
            return RecordOutcome::AlreadySeen;
        }
        Ok(false) => {}
        Err(e) => {
            warn!(title = %job.title, link, error = %e, "existence check failed, skipping");
            return RecordOutcome::StorageSkipped {
                error: e.to_string(),
            };
        }
    }

    if options.dry_run {
        info!(title = %job.title, link, "new posting (dry run)");
        return RecordOutcome::WouldNotify;
    }

    // Store only after a successful send: a lost send is retried next run,
    // a lost store write at worst repeats the message.
    if let Err(e) = deps.notifier.send(&config.chat_id, &format_alert(job)).await {
        warn!(title = %job.title, link, error = %e, "notification failed, will retry next run");
        return RecordOutcome::DeliveryFailed {
            error: e.to_string(),
        };
    }

    match deps.store.record(job).await {
        Ok(()) => {
            info!(title = %job.title, link, "job alert sent");
            RecordOutcome::Notified
        }
        Err(e) => {
            error!(title = %job.title, link, error = %e, "notified but not stored, may repeat next run");
            RecordOutcome::NotifiedNotPersisted {
                error: e.to_string(),
            }
        }
    }
}
