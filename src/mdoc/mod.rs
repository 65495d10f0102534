//! # mdoc Parsing
//!
//! SerialEM and Tomo5 write one `.mdoc` per tilt series (or per movie): a
//! header followed by one `[ZValue = n]` section per image, every line a
//! free-form `key = value` pair.
//!
//! ```text
//! PixelSpacing = 1.35
//! ImageSize = 4096 4096
//! [T = SerialEM: Digitized on EMBL Krios   Tilt axis angle = 84.9, binning = 1]
//!
//! [ZValue = 0]
//! TiltAngle = -0.002
//! StagePosition = 12.34 -56.78
//! DateTime = 05-Mar-24  10:15:00
//! ```
//!
//! The parser reduces such a file to a single [`FlatRecord`]:
//!
//! - the first occurrence of a key is stored verbatim;
//! - numeric keys that change between sections become `key_min`/`key_max`;
//! - shift and stage-position pairs become `key_x_min` .. `key_y_max`;
//! - the camera in use, image dimensions, tilt axis, tilt count and increment,
//!   acquisition software, imaging mode and EM mode are inferred;
//! - base keys superseded by a range are removed before returning.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::field::{strip_superseded, FlatRecord};

pub use error::MdocError;

mod error;
mod inference;
mod scanner;

#[cfg(test)]
mod tests;

use scanner::MdocScanner;

/// Field names the parser reads or derives.
pub mod keys {
    /// Title line key carrying the software banner
    pub const TITLE: &str = "[T";
    /// Section header key, one per image
    pub const ZVALUE_SECTION: &str = "[ZValue";
    /// Canonical tilt axis key
    pub const TILT_AXIS_ANGLE: &str = "TiltAxisAngle";
    /// Per-section tilt angle
    pub const TILT_ANGLE: &str = "TiltAngle";
    /// Index into the camera list
    pub const CAMERA_INDEX: &str = "CameraIndex";
    /// First camera in the list
    pub const CAMERA_0: &str = "Camera0";
    /// Second camera in the list
    pub const CAMERA_1: &str = "Camera1";
    /// Camera resolved from the index
    pub const CAMERA_USED: &str = "CameraUsed";
    /// `"x y"` image size
    pub const IMAGE_SIZE: &str = "ImageSize";
    /// Image width derived from the image size
    pub const IMAGE_DIMENSIONS_X: &str = "ImageDimensions_X";
    /// Image height derived from the image size
    pub const IMAGE_DIMENSIONS_Y: &str = "ImageDimensions_Y";
    /// `"slit loss"` energy filter settings
    pub const FILTER_SLIT_AND_LOSS: &str = "FilterSlitAndLoss";
    /// Set to `true` when a positive slit width was seen
    pub const ENERGY_FILTER_USED: &str = "EnergyFilterUsed";
    /// Slit width of the energy filter
    pub const ENERGY_FILTER_SLIT_WIDTH: &str = "EnergyFilterSlitWidth";
    /// Number of `[ZValue` sections
    pub const NUMBER_OF_TILTS: &str = "NumberOfTilts";
    /// Mean tilt step over the series
    pub const TILT_INCREMENT: &str = "Tilt_increment";
    /// Explicit software version
    pub const VERSION: &str = "Version";
    /// Inferred acquisition software
    pub const SOFTWARE: &str = "Software";
    /// Dark-field flag
    pub const DARK_FIELD: &str = "DarkField";
    /// Magnification index
    pub const MAG_INDEX: &str = "MagIndex";
    /// Raw EM mode code
    pub const EM_MODE_CODE: &str = "EMmode";
    /// Inferred EM mode (TEM/EFTEM/STEM)
    pub const EM_MODE: &str = "EMMode";
    /// Inferred imaging mode
    pub const IMAGING: &str = "Imaging";
}

/// Parse the mdoc file at `path`.
pub fn parse_mdoc_file<P: AsRef<Path>>(path: P) -> Result<FlatRecord, MdocError> {
    let file = File::open(path.as_ref())?;
    parse_mdoc(BufReader::new(file))
}

/// Parse mdoc content already in memory.
pub fn parse_mdoc_str(content: &str) -> FlatRecord {
    // Reading from a byte slice cannot fail.
    parse_mdoc(content.as_bytes()).unwrap_or_default()
}

/// Parse mdoc content from any buffered reader.
///
/// Lines are decoded lossily; a trailing `\r` is ignored.
pub fn parse_mdoc<R: BufRead>(reader: R) -> Result<FlatRecord, MdocError> {
    let mut scanner = MdocScanner::new();
    for line in reader.split(b'\n') {
        let line = line?;
        let text = String::from_utf8_lossy(&line);
        scanner.feed_line(text.trim_end_matches('\r'));
    }

    let tilt_count = scanner.tilt_count();
    let mut record = scanner.into_record();
    inference::resolve_tilt_geometry(&mut record, tilt_count);
    inference::resolve_software(&mut record);
    inference::resolve_imaging(&mut record);
    strip_superseded(&mut record);
    Ok(record)
}
