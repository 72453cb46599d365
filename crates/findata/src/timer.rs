//! Per-stage wall clock timing of a job.

use std::fmt::Write;
use std::time::{Duration, Instant};
use tracing::info;

/// Records how long each stage of a job took.
#[derive(Debug)]
pub struct StageTimer {
    started: Instant,
    stages: Vec<(&'static str, Duration)>,
}

impl Default for StageTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl StageTimer {
    /// Starts the overall clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            stages: Vec::new(),
        }
    }

    /// Runs `f` as stage `name`.
    pub fn time<T>(&mut self, name: &'static str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.record(name, start.elapsed());
        out
    }

    /// Adds `elapsed` to stage `name`.
    pub fn record(&mut self, name: &'static str, elapsed: Duration) {
        match self.stages.iter_mut().find(|(n, _)| *n == name) {
            Some((_, total)) => *total += elapsed,
            None => self.stages.push((name, elapsed)),
        }
    }

    /// Time spent in stage `name`.
    #[must_use]
    pub fn stage(&self, name: &str) -> Option<Duration> {
        self.stages.iter().find(|(n, _)| *n == name).map(|(_, d)| *d)
    }

    /// One line per stage, preceded by the total.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = format!("Total time: {:.2}s", self.started.elapsed().as_secs_f64());
        for (name, elapsed) in &self.stages {
            let _ = write!(out, "\n  {name}: {:.2}s", elapsed.as_secs_f64());
        }
        out
    }

    /// Logs every stage at info level.
    pub fn log_summary(&self) {
        for (name, elapsed) in &self.stages {
            info!(stage = name, seconds = elapsed.as_secs_f64(), "Stage timing");
        }
        info!(
            seconds = self.started.elapsed().as_secs_f64(),
            "Job finished"
        );
    }
}
