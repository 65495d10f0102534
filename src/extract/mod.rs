//! # Extraction Runs
//!
//! One run turns a dataset directory into the aggregated JSON record:
//!
//! 1. validate the root directory;
//! 2. find metadata folders below it (and below its mirror, if configured);
//! 3. collect candidate `.xml`/`.mdoc` files;
//! 4. parse them on the worker pool with live progress;
//! 5. optionally archive the XML sources;
//! 6. merge XML and mdoc records and encode the result as JSON;
//! 7. optionally write the full record to `<dataset>_full.json`.
//!
//! Only steps 1, 2, 4 (worker start-up) and 6 can fail the run. Per-file
//! problems, archiving and the full-record dump are logged and skipped.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{error, info, warn};

use crate::archive::{zip_files, DEFAULT_ARCHIVE_NAME};
use crate::convert::to_json_pretty;
use crate::discovery::{collect_candidate_files, find_data_folders};
use crate::field::FlatRecord;
use crate::merge::merge_dataset;
use crate::pipeline::{ingest, ProgressReporter, ProgressTracker};

pub use error::ExtractError;

mod error;

#[cfg(test)]
mod tests;

/// Fallback output name when the dataset root has no usable name.
pub const FALLBACK_FULL_METADATA_NAME: &str = "Dataset_out.json";

/// Settings for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Dataset root directory
    pub root: PathBuf,
    /// Extra folder-name regex, OR-ed with the default pattern
    pub folder_filter: Option<String>,
    /// Folder where the microscope PC mirrors its metadata, one subfolder per dataset
    pub mirror_folder: Option<PathBuf>,
    /// Write a zip archive of all XML sources
    pub create_zip: bool,
    /// Write the full merged record next to the other outputs
    pub write_full_metadata: bool,
    /// Directory receiving the archive and the full record
    pub output_dir: PathBuf,
    /// Draw a progress line on stderr
    pub show_progress: bool,
}

impl ExtractOptions {
    /// Options for `root` with all optional outputs disabled.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            folder_filter: None,
            mirror_folder: None,
            create_zip: false,
            write_full_metadata: false,
            output_dir: PathBuf::from("."),
            show_progress: false,
        }
    }
}

/// Last component of the absolute dataset path.
pub fn dataset_name(root: &Path) -> Option<String> {
    let absolute = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    absolute
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

fn discover_files(
    options: &ExtractOptions,
    name: Option<&str>,
) -> Result<Vec<PathBuf>, ExtractError> {
    let filter = options.folder_filter.as_deref();
    let mut folders = find_data_folders(&options.root, filter)?;

    match (&options.mirror_folder, name) {
        (Some(mirror), Some(name)) => {
            let mirrored = mirror.join(name);
            let found =
                find_data_folders(&mirrored, filter).map_err(|source| ExtractError::Mirror {
                    path: mirrored.clone(),
                    source,
                })?;
            folders.extend(found);
        }
        (Some(_), None) => warn!("Dataset root has no name, skipping the mirror folder"),
        (None, _) => {}
    }

    folders.push(options.root.clone());
    Ok(collect_candidate_files(&folders))
}

/// Run the extraction and return the merged record as pretty JSON.
pub fn read_metadata(options: &ExtractOptions) -> Result<Vec<u8>, ExtractError> {
    let root = &options.root;
    let root_info =
        fs::metadata(root).map_err(|_| ExtractError::MissingRoot(root.clone()))?;
    if !root_info.is_dir() {
        return Err(ExtractError::NotADirectory(root.clone()));
    }

    let name = dataset_name(root);
    let files = discover_files(options, name.as_deref())?;
    info!("Total number of files to process: {}", files.len());

    let tracker = Arc::new(ProgressTracker::new(files.len() as u64));
    let reporter = if options.show_progress {
        ProgressReporter::spawn(Arc::clone(&tracker), io::stderr())
            .map_err(|e| warn!("Progress display unavailable: {e}"))
            .ok()
    } else {
        None
    };

    let ingested = ingest(files, &tracker);
    if ingested.is_err() {
        tracker.mark_all_completed();
    }
    if let Some(reporter) = reporter {
        reporter.join();
    }
    let outcome = ingested?;
    if outcome.failed > 0 {
        warn!("{} files could not be imported", outcome.failed);
    }

    let (xml_paths, xml_records): (Vec<PathBuf>, Vec<FlatRecord>) = outcome
        .xml
        .into_iter()
        .map(|xml| (xml.path, xml.record))
        .unzip();

    if options.create_zip && !xml_paths.is_empty() {
        let destination = options.output_dir.join(DEFAULT_ARCHIVE_NAME);
        if let Err(e) = zip_files(&xml_paths, &destination) {
            error!("Failed to archive XML files: {e}");
        }
    }

    let merged =
        merge_dataset(&xml_records, &outcome.mdoc).ok_or(ExtractError::NothingExtracted)?;
    let json = to_json_pretty(&merged)?;

    if options.write_full_metadata {
        let file_name = name
            .map(|name| format!("{name}_full.json"))
            .unwrap_or_else(|| FALLBACK_FULL_METADATA_NAME.to_string());
        let path = options.output_dir.join(file_name);
        match fs::write(&path, &json) {
            Ok(()) => info!("Extracted full data has been written to {}", path.display()),
            Err(e) => error!("Error writing {}: {e}", path.display()),
        }
    }

    Ok(json)
}
