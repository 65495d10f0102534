use std::path::PathBuf;

use crate::discovery::DiscoveryError;
use crate::pipeline::PipelineError;

/// Errors that abort an extraction run
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The dataset root does not exist
    #[error("Directory '{}' does not exist", .0.display())]
    MissingRoot(PathBuf),

    /// The dataset root is not a directory
    #[error("'{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// Searching the dataset root failed
    #[error("Folder search failed - is this the correct directory? {0}")]
    Discovery(#[from] DiscoveryError),

    /// Searching the mirrored metadata folder failed
    #[error("Mirrored metadata folder '{}' could not be searched: {source}", .path.display())]
    Mirror {
        /// Mirror folder for this dataset
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: DiscoveryError,
    },

    /// The ingestion workers could not be started
    #[error("Ingestion failed: {0}")]
    Pipeline(#[from] PipelineError),

    /// No file yielded a record
    #[error("Nothing was read out - no usable .xml or .mdoc files found")]
    NothingExtracted,

    /// The merged record could not be encoded
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}
