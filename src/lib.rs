//! # emharvest - Cryo-EM Acquisition Metadata Harvester
//!
//! `emharvest` collects the acquisition metadata a cryo-EM session leaves
//! behind and condenses it into one flat, dataset-level JSON record that a
//! schema converter can map onto a community standard.
//!
//! ## Key Features
//!
//! - **Two input dialects**: EPU per-movie XML documents and SerialEM/Tomo5
//!   `.mdoc` text logs are both reduced to flat `key → value` records.
//!
//! - **Generic XML flattening**: every leaf element becomes a dotted path
//!   (`MicroscopeImage.microscopeData.gun.AccelerationVoltage`), independent of
//!   the document's schema; EPU's `CustomData` key/value block is lifted to
//!   top-level keys.
//!
//! - **Context-aware mdoc parsing**: camera selection, image dimensions,
//!   energy filter use, tilt geometry, EM/imaging mode and acquisition
//!   software are inferred from otherwise free-form lines.
//!
//! - **Range-aware merging**: values that stay the same across a dataset are
//!   kept as-is; numeric, two-component and timestamp values that vary are
//!   summarized as `_min`/`_max`, `_x_min`..`_y_max` and `_start`/`_end`.
//!
//! - **Concurrent ingestion**: files are parsed on a fixed worker pool with a
//!   live progress line; a broken file is logged and skipped.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use emharvest::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut options = ExtractOptions::new("/data/grid_01");
//!     options.write_full_metadata = true;
//!
//!     let dataset = read_metadata(&options)?;
//!
//!     let constants = InstrumentConstants {
//!         cs: "2.7".to_string(),
//!         gain_flip_rotate: String::new(),
//!     };
//!     PassthroughConverter.convert(&dataset, &constants, Some("grid_01.json".as_ref()))?;
//!     Ok(())
//! }
//! ```
//!
//! ## Working With Single Files
//!
//! ```rust
//! use emharvest::mdoc::parse_mdoc_str;
//! use emharvest::merge::merge_records;
//!
//! let first = parse_mdoc_str("[ZValue = 0]\nTiltAngle = -30\nVoltage = 300\n");
//! let second = parse_mdoc_str("[ZValue = 0]\nTiltAngle = 30\nVoltage = 300\n");
//!
//! let merged = merge_records(&[first, second]);
//! assert_eq!(merged["Voltage"], "300");
//! assert_eq!(merged["NumberOfMovies"], "2");
//! assert!(merged.contains_key("TiltAngle_min"));
//! ```
//!
//! ## Modules
//!
//! - [`field`]: value classification and range bookkeeping shared by the parsers
//! - [`xml`]: XML flattening
//! - [`mdoc`]: mdoc parsing and inference
//! - [`merge`]: dataset-level merge
//! - [`pipeline`]: worker pool and progress reporting
//! - [`discovery`]: metadata folder and file discovery
//! - [`archive`]: zip archive of XML sources
//! - [`extract`]: one complete extraction run
//! - [`convert`]: schema converter seam

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod archive;
pub mod convert;
pub mod discovery;
pub mod extract;
pub mod field;
pub mod mdoc;
pub mod merge;
pub mod pipeline;
pub mod xml;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::archive::{zip_files, ArchiveError, DEFAULT_ARCHIVE_NAME};
    pub use crate::convert::{
        to_json_pretty, ConvertError, InstrumentConstants, PassthroughConverter, SchemaConverter,
    };
    pub use crate::discovery::{collect_candidate_files, find_data_folders, DiscoveryError};
    pub use crate::extract::{read_metadata, ExtractError, ExtractOptions};
    pub use crate::field::{FieldValue, FlatRecord};
    pub use crate::mdoc::{parse_mdoc, parse_mdoc_file, parse_mdoc_str, MdocError};
    pub use crate::merge::{merge_dataset, merge_records};
    pub use crate::pipeline::{
        ingest, IngestionOutcome, PipelineError, ProgressReporter, ProgressTracker, XmlRecord,
    };
    pub use crate::xml::{flatten_bytes, flatten_file, XmlError};
}
