//! Background download jobs.
//!
//! A job resolves a ticker, scrapes every statement and writes the workbook.
//! It runs on the blocking thread pool because browser automation is
//! synchronous. Only one job runs at a time; its status is published on a
//! `watch` channel that any number of frontends can follow.

use chrono::Local;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use findata_alphaspread::scrape_listing;
use findata_core::{
    BrowserSession, FinDataError, JobResult, JobStatus, ProgressObserver, Result, ScrapeConfig,
};
use findata_directory::{CompanyDirectory, generate_candidates};
use findata_export::{SpreadsheetWriter, export};

use crate::timer::StageTimer;

/// What to download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobRequest {
    /// Ticker as the user selected it.
    pub ticker: String,
    /// Site exchange slug; looked up in the directory when `None`.
    pub exchange: Option<String>,
    /// Company name used to find alternate listings; looked up when `None`.
    pub company_name: Option<String>,
    /// Directory the workbook is written to.
    pub output_dir: PathBuf,
}

impl JobRequest {
    /// Request for `ticker`, written to `output_dir`.
    #[must_use]
    pub fn new(ticker: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            ticker: ticker.into(),
            exchange: None,
            company_name: None,
            output_dir: output_dir.into(),
        }
    }

    /// Sets the exchange slug.
    #[must_use]
    pub fn with_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.exchange = Some(exchange.into());
        self
    }

    /// Sets the company name.
    #[must_use]
    pub fn with_company_name(mut self, company_name: impl Into<String>) -> Self {
        self.company_name = Some(company_name.into());
        self
    }
}

/// A finished job.
#[derive(Clone, Debug)]
pub struct JobOutcome {
    /// The written workbook.
    pub output_path: PathBuf,
    /// Everything that was scraped.
    pub result: JobResult,
}

/// Forwards progress milestones into the job's status channel.
#[derive(Clone, Debug)]
pub struct StatusHandle {
    sender: Arc<watch::Sender<JobStatus>>,
}

impl StatusHandle {
    fn update(&self, f: impl FnOnce(&mut JobStatus)) {
        self.sender.send_modify(f);
    }
}

impl ProgressObserver for StatusHandle {
    fn progress(&self, message: &str, percent: u8) {
        debug!(percent, message, "Progress");
        self.update(|status| status.advance(message, percent));
    }
}

/// Clears the running flag when the job ends, however it ends.
///
/// A job that panics is also reported as failed.
struct RunningGuard {
    running: Arc<AtomicBool>,
    status: StatusHandle,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        if std::thread::panicking() {
            error!("Job panicked");
            self.status
                .update(|status| status.fail("The job stopped unexpectedly"));
        }
        self.running.store(false, Ordering::Release);
    }
}

type Connect<B> = dyn Fn() -> Result<B> + Send + Sync;

/// Starts download jobs, one at a time.
pub struct JobLauncher<B: BrowserSession> {
    connect: Arc<Connect<B>>,
    directory: Arc<CompanyDirectory>,
    writer: Arc<dyn SpreadsheetWriter>,
    config: Arc<ScrapeConfig>,
    running: Arc<AtomicBool>,
    status: Arc<watch::Sender<JobStatus>>,
}

impl<B: BrowserSession + 'static> fmt::Debug for JobLauncher<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobLauncher")
            .field("directory", &self.directory.len())
            .field("writer", &self.writer.name())
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl<B: BrowserSession + 'static> JobLauncher<B> {
    /// Creates a launcher.
    ///
    /// `connect` opens a fresh browser session for each job.
    #[must_use]
    pub fn new(
        connect: impl Fn() -> Result<B> + Send + Sync + 'static,
        directory: Arc<CompanyDirectory>,
        writer: Arc<dyn SpreadsheetWriter>,
    ) -> Self {
        let (status, _) = watch::channel(JobStatus::idle());
        Self {
            connect: Arc::new(connect),
            directory,
            writer,
            config: Arc::new(ScrapeConfig::default()),
            running: Arc::new(AtomicBool::new(false)),
            status: Arc::new(status),
        }
    }

    /// Uses `config` for jobs launched from now on.
    #[must_use]
    pub fn with_config(mut self, config: ScrapeConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// Follows status changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<JobStatus> {
        self.status.subscribe()
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> JobStatus {
        self.status.borrow().clone()
    }

    /// Returns true while a job runs.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Starts a job on the blocking pool.
    ///
    /// Must be called from within a Tokio runtime. The final status, success
    /// or failure, is published before the returned handle resolves.
    ///
    /// # Errors
    ///
    /// Returns [`FinDataError::JobAlreadyRunning`] if a job is in progress and
    /// [`FinDataError::InvalidParameter`] for an empty ticker.
    pub fn launch(&self, request: JobRequest) -> Result<JoinHandle<Result<JobOutcome>>> {
        if request.ticker.trim().is_empty() {
            return Err(FinDataError::InvalidParameter(
                "Ticker must not be empty".to_string(),
            ));
        }
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(FinDataError::JobAlreadyRunning);
        }

        info!(ticker = %request.ticker, "Starting job");
        self.status
            .send_replace(JobStatus::started(&request.ticker.to_uppercase()));

        let status = StatusHandle {
            sender: Arc::clone(&self.status),
        };
        let guard = RunningGuard {
            running: Arc::clone(&self.running),
            status: status.clone(),
        };
        let job = Job {
            connect: Arc::clone(&self.connect),
            directory: Arc::clone(&self.directory),
            writer: Arc::clone(&self.writer),
            config: Arc::clone(&self.config),
            status,
        };

        Ok(tokio::task::spawn_blocking(move || {
            let outcome = job.run(&request);
            match &outcome {
                Ok(done) => {
                    let sheets = done.result.tables.len() + usize::from(!done.result.breakdown.is_empty());
                    job.status
                        .progress(&format!("Done! Saved {sheets} sheets."), 100);
                    job.status
                        .update(|status| status.complete(done.output_path.clone()));
                }
                Err(e) => {
                    error!(ticker = %request.ticker, error = %e, "Job failed");
                    job.status.update(|status| status.fail(e.to_string()));
                }
            }
            drop(guard);
            outcome
        }))
    }
}

/// Everything one job needs, moved onto the worker thread.
struct Job<B> {
    connect: Arc<Connect<B>>,
    directory: Arc<CompanyDirectory>,
    writer: Arc<dyn SpreadsheetWriter>,
    config: Arc<ScrapeConfig>,
    status: StatusHandle,
}

impl<B: BrowserSession> Job<B> {
    #[instrument(skip_all, fields(ticker = %request.ticker))]
    fn run(&self, request: &JobRequest) -> Result<JobOutcome> {
        let mut timer = StageTimer::new();
        let ticker = request.ticker.trim();
        let entry = self.directory.lookup(ticker);

        let exchange = request
            .exchange
            .clone()
            .or_else(|| entry.map(|e| e.site_exchange.clone()))
            .unwrap_or_else(|| self.config.default_exchange.clone());
        let company_name = request
            .company_name
            .clone()
            .or_else(|| entry.map(|e| e.name.clone()))
            .unwrap_or_default();

        let candidates =
            generate_candidates(ticker, &company_name, self.directory.alternates(), &exchange);

        self.status.progress("Setting up browser...", 5);
        let session = timer.time("browser", || (self.connect)())?;

        let result = timer.time("scrape", || {
            scrape_listing(&session, ticker, &candidates, &self.config, &self.status)
        })?;
        drop(session);

        self.status.progress("Saving with formatting...", 90);
        let output_path = timer.time("export", || {
            export(
                self.writer.as_ref(),
                &result,
                &request.output_dir,
                Local::now().naive_local(),
            )
        })?;

        timer.log_summary();
        debug!(summary = %timer.summary(), "Performance summary");
        Ok(JobOutcome {
            output_path,
            result,
        })
    }
}
