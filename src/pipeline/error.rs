use std::path::PathBuf;

/// Errors that stop an ingestion run before it starts
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A worker thread could not be started
    #[error("Failed to spawn ingestion worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// The work queue rejected a path
    #[error("Work queue closed before {} was queued", .0.display())]
    QueueClosed(PathBuf),
}
