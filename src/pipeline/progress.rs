//! Live progress for one ingestion run.

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[cfg(feature = "colorized_output")]
use console::style;
use log::warn;

/// Counters shared between the workers and the reporter.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    total: AtomicU64,
    completed: AtomicU64,
}

impl ProgressTracker {
    /// Create a tracker expecting `total` files.
    pub fn new(total: u64) -> Self {
        Self {
            total: AtomicU64::new(total),
            completed: AtomicU64::new(0),
        }
    }

    /// Number of files in the run
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Acquire)
    }

    /// Number of files handled so far, whatever their outcome
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    /// Count one more handled file.
    pub fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::AcqRel);
    }

    /// Mark the run as finished, e.g. after it was aborted.
    pub fn mark_all_completed(&self) {
        self.completed.fetch_max(self.total(), Ordering::AcqRel);
    }

    /// Completion in percent; an empty run is complete.
    pub fn percent(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 100.0;
        }
        self.completed() as f64 / total as f64 * 100.0
    }

    /// Whether every file has been handled
    pub fn is_done(&self) -> bool {
        self.completed() >= self.total()
    }
}

fn render(percent: f64) -> String {
    #[cfg(feature = "colorized_output")]
    {
        format!(
            "Progress: {}",
            style(format!("{percent:.2}%")).for_stderr().cyan()
        )
    }
    #[cfg(not(feature = "colorized_output"))]
    {
        format!("Progress: {percent:.2}%")
    }
}

/// Background thread redrawing a single progress line until the run completes.
pub struct ProgressReporter {
    handle: JoinHandle<()>,
}

impl ProgressReporter {
    /// Redraw interval.
    pub const INTERVAL: Duration = Duration::from_millis(100);

    /// Start reporting `tracker` to `sink`.
    ///
    /// The thread is named `"emharvest-progress"`.
    pub fn spawn<W>(tracker: Arc<ProgressTracker>, mut sink: W) -> std::io::Result<Self>
    where
        W: Write + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name("emharvest-progress".to_string())
            .spawn(move || loop {
                let done = tracker.is_done();
                // A closed terminal must not take the run down with it.
                let _ = write!(sink, "\r{}", render(tracker.percent()));
                let _ = sink.flush();
                if done {
                    let _ = writeln!(sink);
                    break;
                }
                thread::sleep(Self::INTERVAL);
            })?;
        Ok(Self { handle })
    }

    /// Wait for the final redraw.
    pub fn join(self) {
        if self.handle.join().is_err() {
            warn!("Progress reporter thread panicked");
        }
    }
}
