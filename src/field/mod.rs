//! # Field Classification
//!
//! Every parser in this crate produces a [`FlatRecord`]: a flat mapping from a
//! field name (a dotted XML path or a raw mdoc key) to its textual value. The
//! strings stay untyped; the downstream schema converter
//! consumes them as-is.
//!
//! Wherever a value has to be *compared* (range inference inside one mdoc file,
//! or aggregation across files) it is first classified into a [`FieldValue`]:
//!
//! | Variant        | Recognized when                                             |
//! |----------------|-------------------------------------------------------------|
//! | `Timestamp`    | key contains `DateTime` and one of the known formats parses |
//! | `Numeric`      | trimmed text parses as `f64`                                |
//! | `SpatialTuple` | key is shift/position-like and value is `"x y"`             |
//! | `Scalar`       | anything else                                               |
//!
//! Derived range keys (`_min`/`_max`, `_x_min`.., `_start`/`_end`) are written
//! back as strings by the helpers in [`range`].

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat};

pub mod range;


pub use range::{strip_superseded, widen_numeric, widen_time, widen_tuple, RANGE_SUFFIXES};

/// One file's metadata (or the merged dataset) as flat string pairs.
pub type FlatRecord = BTreeMap<String, String>;

/// Key fragment marking a timestamp-valued field.
pub const TIMESTAMP_KEY_MARKER: &str = "DateTime";

/// Key fragments marking fields that hold a two-component `"x y"` value.
pub const TUPLE_KEY_MARKERS: [&str; 3] = ["Beamshift", "ImageShift", "StagePosition"];

/// Naive microscope-log timestamp layouts, tried in order. Interpreted as UTC.
pub const NAIVE_TIMESTAMP_FORMATS: [&str; 3] = [
    "%d-%b-%y  %H:%M:%S",
    "%d-%b-%Y  %H:%M:%S",
    "%Y-%b-%d  %H:%M:%S",
];

/// Typed view of a single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Opaque text; divergence is not summarized.
    Scalar(String),
    /// A plain floating point number.
    Numeric(f64),
    /// A two-component spatial value such as a stage position.
    SpatialTuple {
        /// First component
        x: f64,
        /// Second component
        y: f64,
    },
    /// A point in time.
    Timestamp(DateTime<FixedOffset>),
}

impl FieldValue {
    /// Classify `raw` in the context of its field name.
    pub fn classify(key: &str, raw: &str) -> Self {
        if is_timestamp_key(key) {
            if let Some(ts) = parse_timestamp(raw) {
                return FieldValue::Timestamp(ts);
            }
        }
        if let Some(value) = parse_number(raw) {
            return FieldValue::Numeric(value);
        }
        if is_tuple_key(key) {
            if let Some((x, y)) = parse_pair(raw) {
                return FieldValue::SpatialTuple { x, y };
            }
        }
        FieldValue::Scalar(raw.to_string())
    }

    /// Numeric payload, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Numeric(v) => Some(*v),
            _ => None,
        }
    }
}

/// Whether the key denotes a date/time field.
pub fn is_timestamp_key(key: &str) -> bool {
    key.contains(TIMESTAMP_KEY_MARKER)
}

/// Whether the key denotes a beam shift, image shift or stage position.
pub fn is_tuple_key(key: &str) -> bool {
    TUPLE_KEY_MARKERS.iter().any(|marker| key.contains(marker))
}

/// Parse trimmed text as a 64-bit float.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

/// Parse the first two whitespace-separated tokens as numbers.
pub fn parse_pair(raw: &str) -> Option<(f64, f64)> {
    let mut tokens = raw.split_whitespace();
    let x = tokens.next()?.parse::<f64>().ok()?;
    let y = tokens.next()?.parse::<f64>().ok()?;
    Some((x, y))
}

/// Format a derived number in fixed notation with 16 fractional digits.
pub fn format_number(value: f64) -> String {
    format!("{value:.16}")
}

/// Parse a timestamp in any of the supported layouts.
///
/// The legacy microscope layouts carry no offset and are taken as UTC;
/// anything else must be RFC 3339.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = raw.trim();
    for layout in NAIVE_TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, layout) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    DateTime::parse_from_rfc3339(trimmed).ok()
}

/// Canonical textual form for `_start`/`_end` bounds.
pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}
