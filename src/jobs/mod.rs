//! Batch geocoding jobs
//!
//! Sequential drivers that fill in missing coordinates:
//! - `zip`: cities, via one listing's postal code
//! - `address`: listings, via their stored street address
//!
//! Both take a snapshot of eligible records at start, make one request at a
//! time with a fixed pause between requests, and persist each success before
//! moving on. A failed lookup is counted and logged, never fatal. A store error
//! ends the run; whatever was already written stays written.

pub mod address;
pub mod zip;

pub use address::geocode_listings;
pub use zip::geocode_cities;

use crate::config::GeocodingConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Pacing and scope for a job run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobOptions {
    /// Pause between consecutive geocoding requests
    pub delay: Duration,
    /// Log progress every N processed records (0 disables)
    pub progress_every: usize,
    /// Process at most this many records from the snapshot
    pub limit: Option<usize>,
}

impl JobOptions {
    /// Options for the zip job from config
    pub fn zip(config: &GeocodingConfig) -> Self {
        Self {
            delay: config.zip_delay(),
            progress_every: config.progress_every,
            limit: None,
        }
    }

    /// Options for the address job from config (delay never below the provider floor)
    pub fn address(config: &GeocodingConfig) -> Self {
        Self {
            delay: config.address_delay(),
            progress_every: config.progress_every,
            limit: None,
        }
    }

    /// Restrict the run to the first `limit` records
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }
}

/// Outcome of a job run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobReport {
    /// Job name ("zip" or "address")
    pub job: String,
    /// Geocoder backend used
    pub backend: String,
    /// Records a request was made for
    pub processed: usize,
    /// Requests that produced coordinates that were stored
    pub succeeded: usize,
    /// Requests that produced nothing
    pub failed: usize,
    /// Eligible records that could not be attempted (no zip to try)
    pub skipped: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl JobReport {
    fn start(job: &str, backend: &str) -> Self {
        let now = Utc::now();
        Self {
            job: job.to_string(),
            backend: backend.to_string(),
            processed: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            started_at: now,
            finished_at: now,
        }
    }

    fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        info!(
            "{} geocoding finished: {} processed, {} succeeded, {} failed, {} skipped",
            self.job, self.processed, self.succeeded, self.failed, self.skipped
        );
        self
    }

    /// Fraction of processed records that succeeded (0 when nothing ran)
    pub fn success_rate(&self) -> f64 {
        if self.processed == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.processed as f64
        }
    }
}

/// Sleeps between requests, never before the first one
#[derive(Debug)]
struct Pacer {
    delay: Duration,
    started: bool,
}

impl Pacer {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            started: false,
        }
    }

    async fn wait(&mut self) {
        if self.started && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.started = true;
    }
}

/// A periodic progress snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
struct Progress {
    processed: usize,
    total: usize,
    success_rate: f64,
    /// Records still to go times the pause between requests
    remaining: Duration,
}

/// Snapshot due after this record, if `processed` landed on the interval
fn progress(report: &JobReport, total: usize, options: &JobOptions) -> Option<Progress> {
    let every = options.progress_every;
    if every == 0 || report.processed == 0 || report.processed % every != 0 {
        return None;
    }

    let left = total.saturating_sub(report.processed + report.skipped) as u64;
    let per_request = u64::try_from(options.delay.as_millis()).unwrap_or(u64::MAX);

    Some(Progress {
        processed: report.processed,
        total,
        success_rate: report.success_rate(),
        remaining: Duration::from_millis(per_request.saturating_mul(left)),
    })
}

/// Log a progress line every `options.progress_every` records
fn log_progress(report: &JobReport, total: usize, options: &JobOptions) {
    let Some(p) = progress(report, total, options) else {
        return;
    };
    info!(
        "{} geocoding progress: {}/{} processed, {:.1}% success, ~{} remaining",
        report.job,
        p.processed,
        p.total,
        p.success_rate * 100.0,
        format_duration(p.remaining)
    );
}

/// Render a duration as "1h02m03s" / "2m03s" / "3s"
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}h{:02}m{:02}s", h, m, s)
    } else if m > 0 {
        format!("{}m{:02}s", m, s)
    } else {
        format!("{}s", s)
    }
}
