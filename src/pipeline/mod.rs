//! # Concurrent Ingestion
//!
//! Every candidate file is parsed exactly once by a fixed pool of worker
//! threads:
//!
//! ```text
//! ┌──────────────┐  closed queue   ┌──────────────────┐  results (cap = N)  ┌───────────┐
//! │ N file paths │ ──────────────▶ │ 16 workers       │ ──────────────────▶ │ collector │
//! └──────────────┘                 │ .xml  → flatten  │                     └───────────┘
//!                                  │ .mdoc → parse    │
//!                                  └────────┬─────────┘
//!                                           │ +1 per file
//!                                           ▼
//!                                   ProgressTracker ◀── ProgressReporter
//! ```
//!
//! The queue is filled and closed before the workers start, and the result
//! channel is sized to the file count so workers never block on it. Results
//! are put back into input order before they are returned, so a run over the
//! same files always merges identically. A file that fails to read or parse
//! is logged and left out; it never stops its siblings.

use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, error, warn};

use crate::field::FlatRecord;
use crate::{mdoc, xml};

pub use error::PipelineError;
pub use progress::{ProgressReporter, ProgressTracker};

mod error;
mod progress;


/// Size of the worker pool.
pub const WORKER_COUNT: usize = 16;

/// Metadata file formats the pipeline dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// EPU acquisition XML
    Xml,
    /// SerialEM / Tomo5 mdoc
    Mdoc,
}

impl FileKind {
    /// Kind by file extension (case-sensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("xml") => Some(FileKind::Xml),
            Some("mdoc") => Some(FileKind::Mdoc),
            _ => None,
        }
    }
}

/// A flattened XML document and where it came from.
#[derive(Debug, Clone)]
pub struct XmlRecord {
    /// Source file, kept for archiving
    pub path: PathBuf,
    /// Flattened content
    pub record: FlatRecord,
}

/// Everything one run produced, in input order.
#[derive(Debug, Default)]
pub struct IngestionOutcome {
    /// Records from XML files
    pub xml: Vec<XmlRecord>,
    /// Records from mdoc files
    pub mdoc: Vec<FlatRecord>,
    /// Files that could not be read or parsed
    pub failed: usize,
    /// Files with nothing to ingest or an unsupported extension
    pub skipped: usize,
}

impl IngestionOutcome {
    /// Whether no record at all was produced
    pub fn is_empty(&self) -> bool {
        self.xml.is_empty() && self.mdoc.is_empty()
    }
}

enum FileOutcome {
    Xml(XmlRecord),
    Mdoc(FlatRecord),
    Skipped,
    Failed,
}

fn process_file(path: PathBuf) -> FileOutcome {
    match FileKind::from_path(&path) {
        Some(FileKind::Xml) => match xml::flatten_file(&path) {
            Ok(Some(record)) => FileOutcome::Xml(XmlRecord { path, record }),
            Ok(None) => FileOutcome::Skipped,
            Err(e) => {
                error!("Import of {} failed: {}", path.display(), e);
                FileOutcome::Failed
            }
        },
        Some(FileKind::Mdoc) => match mdoc::parse_mdoc_file(&path) {
            Ok(record) => FileOutcome::Mdoc(record),
            Err(e) => {
                error!("Import of {} failed: {}", path.display(), e);
                FileOutcome::Failed
            }
        },
        None => {
            warn!("Unknown file type: {}", path.display());
            FileOutcome::Skipped
        }
    }
}

fn run_worker(
    jobs: Receiver<(usize, PathBuf)>,
    results: Sender<(usize, FileOutcome)>,
    progress: &ProgressTracker,
) {
    for (index, path) in jobs.iter() {
        let outcome = process_file(path);
        // The receiver outlives every worker, so this cannot fail.
        let _ = results.send((index, outcome));
        progress.record_completed();
    }
}

/// Parse every file in `paths` on [`WORKER_COUNT`] threads.
///
/// `progress` is advanced once per file whatever the outcome. Only failing
/// to start the workers is an error.
pub fn ingest(
    paths: Vec<PathBuf>,
    progress: &ProgressTracker,
) -> Result<IngestionOutcome, PipelineError> {
    let capacity = paths.len().max(1);
    let (job_sender, job_receiver) = bounded::<(usize, PathBuf)>(capacity);
    for job in paths.into_iter().enumerate() {
        job_sender
            .send(job)
            .map_err(|e| PipelineError::QueueClosed(e.into_inner().1))?;
    }
    drop(job_sender);

    let (result_sender, result_receiver) = bounded::<(usize, FileOutcome)>(capacity);

    thread::scope(|scope| {
        for index in 0..WORKER_COUNT {
            let jobs = job_receiver.clone();
            let results = result_sender.clone();
            thread::Builder::new()
                .name(format!("emharvest-worker-{index}"))
                .spawn_scoped(scope, move || run_worker(jobs, results, progress))
                .map_err(PipelineError::WorkerSpawn)?;
        }
        Ok::<(), PipelineError>(())
    })?;
    drop(result_sender);

    let mut results: Vec<(usize, FileOutcome)> = result_receiver.iter().collect();
    results.sort_unstable_by_key(|(index, _)| *index);

    let mut outcome = IngestionOutcome::default();
    for (_, result) in results {
        match result {
            FileOutcome::Xml(record) => outcome.xml.push(record),
            FileOutcome::Mdoc(record) => outcome.mdoc.push(record),
            FileOutcome::Skipped => outcome.skipped += 1,
            FileOutcome::Failed => outcome.failed += 1,
        }
    }

    debug!(
        "Ingested {} XML and {} mdoc records ({} failed, {} skipped)",
        outcome.xml.len(),
        outcome.mdoc.len(),
        outcome.failed,
        outcome.skipped
    );
    Ok(outcome)
}
