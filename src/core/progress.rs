//! Progress sinks and batch progress tracking

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

use super::config::{DEFAULT_PROGRESS_BAR_LENGTH, PROGRESS_CHARS, PROGRESS_TEMPLATE};

/// Receiver of fractional batch progress in `[0, 1]`
///
/// Implementations may clamp out-of-range input. Any presentation (terminal bar,
/// log line, structured event) plugs in through this single setter.
pub trait ProgressSink: Send + Sync {
    fn set_progress(&self, fraction: f64);
}

/// Sink that discards every update
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn set_progress(&self, _fraction: f64) {}
}

/// Sink that emits each update as a debug log line
#[derive(Debug, Clone)]
pub struct LogProgress {
    pub label: String,
}

impl ProgressSink for LogProgress {
    fn set_progress(&self, fraction: f64) {
        tracing::debug!(label = %self.label, "progress {:.1}%", clamp_fraction(fraction) * 100.0);
    }
}

impl ProgressSink for ProgressBar {
    fn set_progress(&self, fraction: f64) {
        let length = self.length().unwrap_or(DEFAULT_PROGRESS_BAR_LENGTH);
        self.set_position((clamp_fraction(fraction) * length as f64).round() as u64);
    }
}

fn clamp_fraction(fraction: f64) -> f64 {
    if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    }
}

/// Tracks completed work units for one batch and forwards them to a sink
///
/// Updates are serialized under a lock so the sink only ever sees a
/// non-decreasing sequence, even when targets complete concurrently. When all
/// units are accounted for the sink receives exactly `1.0`.
pub struct BatchProgress<'a> {
    sink: &'a dyn ProgressSink,
    total_units: u64,
    completed: Mutex<u64>,
}

impl<'a> BatchProgress<'a> {
    /// `targets` targets, each worth `units_per_target` steps
    pub fn new(sink: &'a dyn ProgressSink, targets: usize, units_per_target: u64) -> Self {
        Self {
            sink,
            total_units: targets as u64 * units_per_target.max(1),
            completed: Mutex::new(0),
        }
    }

    /// Records `units` finished steps and reports the new fraction
    pub fn advance(&self, units: u64) {
        let mut completed = match self.completed.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *completed = (*completed + units).min(self.total_units);
        self.sink.set_progress(self.fraction(*completed));
    }

    /// Reports completion; a batch with no targets still ends at `1.0`
    pub fn finish(&self) {
        let mut completed = match self.completed.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *completed = self.total_units;
        self.sink.set_progress(1.0);
    }

    fn fraction(&self, completed: u64) -> f64 {
        if completed >= self.total_units {
            1.0
        } else {
            completed as f64 / self.total_units as f64
        }
    }
}

/// Creates a batch-level progress bar with the application's visual styling
pub fn create_progress_bar(prefix: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new(DEFAULT_PROGRESS_BAR_LENGTH);
    pb.set_style(create_progress_style()?);
    pb.set_prefix(prefix.to_string());
    Ok(pb)
}

/// Creates a progress bar style configuration
pub(crate) fn create_progress_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)?
        .progress_chars(PROGRESS_CHARS))
}
