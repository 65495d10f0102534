//! Locating metadata folders and candidate files below a dataset root.
//!
//! EPU writes its per-movie XML into folders named `Data` (and batch
//! manifests into `Batch`); SerialEM/Tomo5 leave mdocs next to the frames.
//! Sites with other naming conventions can extend the folder pattern.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use regex::Regex;
use walkdir::WalkDir;

use crate::pipeline::FileKind;

/// Folder names EPU uses for metadata.
pub const DEFAULT_FOLDER_PATTERN: &str = "Data|Batch";

/// Errors that abort discovery
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// The caller-supplied folder pattern is not a valid regex
    #[error("Invalid folder filter: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The directory tree could not be walked
    #[error("Folder search failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Compile the folder pattern, extended by `extra` when given.
pub fn folder_pattern(extra: Option<&str>) -> Result<Regex, DiscoveryError> {
    let pattern = match extra {
        Some(extra) if !extra.is_empty() => format!("{DEFAULT_FOLDER_PATTERN}|{extra}"),
        _ => DEFAULT_FOLDER_PATTERN.to_string(),
    };
    Ok(Regex::new(&pattern)?)
}

/// All directories below (and including) `root` whose name matches the pattern.
pub fn find_data_folders(root: &Path, extra: Option<&str>) -> Result<Vec<PathBuf>, DiscoveryError> {
    let pattern = folder_pattern(extra)?;
    let mut folders = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if pattern.is_match(&entry.file_name().to_string_lossy()) {
            folders.push(entry.into_path());
        }
    }

    debug!(
        "Found {} metadata folders below {}",
        folders.len(),
        root.display()
    );
    Ok(folders)
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Non-hidden `.xml`/`.mdoc` files directly inside each folder.
///
/// Each folder is listed once; unreadable folders are logged and skipped.
pub fn collect_candidate_files(folders: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for folder in folders {
        if !seen.insert(folder.as_path()) {
            continue;
        }
        let entries = match fs::read_dir(folder) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Could not list {}: {}", folder.display(), e);
                continue;
            }
        };

        let mut found: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().map(|t| !t.is_dir()).unwrap_or(false))
            .filter(|entry| !is_hidden(&entry.file_name().to_string_lossy()))
            .map(|entry| entry.path())
            .filter(|path| FileKind::from_path(path).is_some())
            .collect();
        found.sort();
        files.extend(found);
    }
    files
}
