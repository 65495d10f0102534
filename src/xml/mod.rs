//! # EPU XML Flattening
//!
//! Reduces one acquisition XML document (as written by EPU next to every
//! movie) to a [`FlatRecord`].
//!
//! Every element without child elements and with non-blank text contributes
//! `dotted.path.of.local.names → trimmed text`. Elements that have children
//! never contribute their own text, even with mixed content.
//!
//! Documents rooted at `MicroscopeImage` additionally get a schema-aware pass:
//!
//! ```text
//! <MicroscopeImage>
//!   <name>FoilHole_123_Data_456</name>       → MicroscopeImage.Name
//!   <uniqueID>8f1c...</uniqueID>             → MicroscopeImage.UniqueID
//!   <CustomData>
//!     <KeyValueOfstringanyType>
//!       <Key>AppliedDefocus</Key>            → AppliedDefocus = -1.5E-06
//!       <Value>-1.5E-06</Value>
//!     </KeyValueOfstringanyType>
//!   </CustomData>
//! </MicroscopeImage>
//! ```

use std::path::Path;

use log::debug;

use crate::field::FlatRecord;

pub use error::XmlError;

mod error;
mod tree;

#[cfg(test)]
mod tests;

use tree::{parse_document, Element};

/// Path fragment of batch-position manifests, which carry nothing to ingest.
pub const SKIPPED_DOCUMENT_MARKER: &str = "BatchPositionsList";

const IMAGE_ROOT: &str = "MicroscopeImage";

/// Flatten the XML file at `path`.
///
/// Returns `Ok(None)` for batch-position manifests.
pub fn flatten_file<P: AsRef<Path>>(path: P) -> Result<Option<FlatRecord>, XmlError> {
    let path = path.as_ref();
    if path.to_string_lossy().contains(SKIPPED_DOCUMENT_MARKER) {
        debug!("Skipping batch position manifest {}", path.display());
        return Ok(None);
    }

    let bytes = std::fs::read(path)?;
    flatten_bytes(&bytes).map(Some)
}

/// Flatten an in-memory XML document.
pub fn flatten_bytes(bytes: &[u8]) -> Result<FlatRecord, XmlError> {
    let root = parse_document(bytes)?;

    let mut record = FlatRecord::new();
    collect_leaves(&root, "", &mut record);
    if root.name == IMAGE_ROOT {
        extract_image_fields(&root, &mut record);
    }
    Ok(record)
}

fn collect_leaves(element: &Element, parent: &str, record: &mut FlatRecord) {
    let path = if parent.is_empty() {
        element.name.clone()
    } else {
        format!("{parent}.{}", element.name)
    };

    let text = element.text.trim();
    if element.children.is_empty() && !text.is_empty() {
        record.insert(path.clone(), text.to_string());
    }
    for child in &element.children {
        collect_leaves(child, &path, record);
    }
}

/// Name, unique ID and the custom key/value block of a `MicroscopeImage`.
fn extract_image_fields(root: &Element, record: &mut FlatRecord) {
    let text_of = |name: &str| {
        root.child(name)
            .map(|e| e.text.trim().to_string())
            .unwrap_or_default()
    };
    record.insert(format!("{IMAGE_ROOT}.Name"), text_of("name"));
    record.insert(format!("{IMAGE_ROOT}.UniqueID"), text_of("uniqueID"));

    let pairs = root
        .children_named("CustomData")
        .flat_map(|block| block.children_named("KeyValueOfstringanyType"));
    for pair in pairs {
        let key = pair.child("Key").map(|e| e.text.trim()).unwrap_or_default();
        if key.is_empty() {
            continue;
        }
        let value = pair.child("Value").map(|e| e.text.trim()).unwrap_or_default();
        record.insert(key.to_string(), value.to_string());
    }
}
