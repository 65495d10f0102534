//! Zip archive of the source XML files of a run.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use log::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// File name of the archive written next to the outputs.
pub const DEFAULT_ARCHIVE_NAME: &str = "xmls.zip";

/// Errors that can occur while writing the archive
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// I/O error reading a source or writing the archive
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Error from the ZIP library
    #[error("ZIP error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// A source path has no file name to use as entry name
    #[error("Not a file path: {}", .0.display())]
    InvalidSource(PathBuf),
}

/// Write `files` into a single Deflate-compressed archive at `destination`.
///
/// Entries are named by the source file name only.
pub fn zip_files(files: &[PathBuf], destination: &Path) -> Result<(), ArchiveError> {
    let archive = File::create(destination)?;
    let mut zip_writer = ZipWriter::new(BufWriter::new(archive));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for file in files {
        let name = file
            .file_name()
            .ok_or_else(|| ArchiveError::InvalidSource(file.clone()))?
            .to_string_lossy();
        zip_writer.start_file(name.as_ref(), options)?;
        let mut source = File::open(file)?;
        io::copy(&mut source, &mut zip_writer)?;
    }

    zip_writer.finish()?;
    info!(
        "Archived {} files to {}",
        files.len(),
        destination.display()
    );
    Ok(())
}
