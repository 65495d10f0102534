/// Errors that can occur while flattening an XML document
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// I/O error reading the document
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing XML
    #[error("XML parsing error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// UTF-8 encoding error in an element name or text
    #[error("UTF-8 encoding error: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),

    /// The document contains no root element
    #[error("Document has no root element")]
    EmptyDocument,

    /// Elements are nested deeper than the parser accepts
    #[error("Element nesting exceeds {0} levels")]
    TooDeep(usize),

    /// The document ended before an element was closed
    #[error("Unclosed element at end of document: {0}")]
    UnclosedElement(String),
}
