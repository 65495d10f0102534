//! # Schema Conversion Seam
//!
//! The aggregated dataset record is handed, as JSON bytes, to a schema
//! converter together with a few instrument constants that no metadata file
//! carries. The ontology-aware converter lives outside this crate and plugs in
//! through [`SchemaConverter`]. [`PassthroughConverter`] is the default: it
//! annotates the record with the constants and writes it out unchanged
//! otherwise.

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::field::FlatRecord;

/// Key for the spherical aberration constant.
pub const CS_KEY: &str = "CS";

/// Key for the gain reference orientation hint.
pub const GAIN_FLIP_ROTATE_KEY: &str = "GainRefFlipRotate";

/// Instrument constants supplied by the caller or the user configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentConstants {
    /// Spherical aberration (mm)
    pub cs: String,
    /// How the gain reference must be flipped/rotated on import
    pub gain_flip_rotate: String,
}

/// Errors that can occur during conversion
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The dataset is not a JSON object of strings
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// I/O error writing the output
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Converts an aggregated dataset record into a target schema.
pub trait SchemaConverter {
    /// Convert `dataset` (JSON object bytes), writing to `output` when given.
    fn convert(
        &self,
        dataset: &[u8],
        constants: &InstrumentConstants,
        output: Option<&Path>,
    ) -> Result<Vec<u8>, ConvertError>;
}

/// Adds the instrument constants and passes everything else through.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughConverter;

impl SchemaConverter for PassthroughConverter {
    fn convert(
        &self,
        dataset: &[u8],
        constants: &InstrumentConstants,
        output: Option<&Path>,
    ) -> Result<Vec<u8>, ConvertError> {
        let mut record: FlatRecord = serde_json::from_slice(dataset)?;
        if !constants.cs.is_empty() {
            record.insert(CS_KEY.to_string(), constants.cs.clone());
        }
        if !constants.gain_flip_rotate.is_empty() {
            record.insert(
                GAIN_FLIP_ROTATE_KEY.to_string(),
                constants.gain_flip_rotate.clone(),
            );
        }

        let converted = to_json_pretty(&record)?;
        if let Some(path) = output {
            fs::write(path, &converted)?;
            info!("Converted metadata written to {}", path.display());
        }
        Ok(converted)
    }
}

/// Encode a record as a JSON object with four-space indentation.
pub fn to_json_pretty(record: &FlatRecord) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    record.serialize(&mut serializer)?;
    Ok(out)
}
