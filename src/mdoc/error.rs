/// Errors that can occur while reading an mdoc file
#[derive(Debug, thiserror::Error)]
pub enum MdocError {
    /// I/O error opening or reading the file
    #[error("Failed to read mdoc file: {0}")]
    IoError(#[from] std::io::Error),
}
