//! Job status reporting.
//!
//! A job is the only writer of its [`JobStatus`]; frontends only read it.
//! Pipeline stages report milestones through the [`ProgressObserver`] trait
//! so they do not depend on how the status travels to the frontend.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::PathBuf;

/// Snapshot of a job's progress, as shown to the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    /// Human readable status line.
    pub message: String,
    /// Progress from 0 to 100.
    pub progress_percent: u8,
    /// True while the job runs.
    pub is_running: bool,
    /// The written spreadsheet, once the job succeeded.
    pub output_path: Option<PathBuf>,
    /// Error message, if the job failed.
    pub error: Option<String>,
}

impl Default for JobStatus {
    fn default() -> Self {
        Self::idle()
    }
}

impl JobStatus {
    /// Status before any job ran.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            message: "Ready".to_string(),
            progress_percent: 0,
            is_running: false,
            output_path: None,
            error: None,
        }
    }

    /// Status of a freshly started job.
    #[must_use]
    pub fn started(ticker: &str) -> Self {
        Self {
            message: format!("Starting download for {ticker}..."),
            progress_percent: 0,
            is_running: true,
            output_path: None,
            error: None,
        }
    }

    /// Records a milestone; progress never moves backwards and is capped at 100.
    pub fn advance(&mut self, message: impl Into<String>, percent: u8) {
        self.message = message.into();
        self.progress_percent = self.progress_percent.max(percent.min(100));
    }

    /// Marks the job as finished successfully.
    pub fn complete(&mut self, output_path: PathBuf) {
        self.message = "Complete!".to_string();
        self.progress_percent = 100;
        self.is_running = false;
        self.output_path = Some(output_path);
        self.error = None;
    }

    /// Marks the job as failed.
    pub fn fail(&mut self, error: impl Into<String>) {
        let error = error.into();
        self.message = format!("Error: {error}");
        self.progress_percent = 0;
        self.is_running = false;
        self.output_path = None;
        self.error = Some(error);
    }
}

/// Receives progress milestones from pipeline stages.
pub trait ProgressObserver: Send + Sync + Debug {
    /// Reports a milestone with its progress percentage.
    fn progress(&self, message: &str, percent: u8);
}

/// Observer that drops every milestone.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn progress(&self, _message: &str, _percent: u8) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_monotonic() {
        let mut status = JobStatus::started("AAPL");
        status.advance("Resolving", 10);
        status.advance("Late message", 5);
        assert_eq!(status.progress_percent, 10);
        assert_eq!(status.message, "Late message");
        status.advance("Overflow", 250);
        assert_eq!(status.progress_percent, 100);
    }

    #[test]
    fn test_failure_clears_output() {
        let mut status = JobStatus::started("AAPL");
        status.fail("No financial data could be extracted");
        assert!(!status.is_running);
        assert!(status.output_path.is_none());
        assert_eq!(
            status.error.as_deref(),
            Some("No financial data could be extracted")
        );
        assert!(status.message.starts_with("Error: "));
    }

    #[test]
    fn test_completion() {
        let mut status = JobStatus::started("AAPL");
        status.complete(PathBuf::from("/tmp/AAPL.xlsx"));
        assert_eq!(status.progress_percent, 100);
        assert!(!status.is_running);
        assert_eq!(status.output_path, Some(PathBuf::from("/tmp/AAPL.xlsx")));
    }
}
