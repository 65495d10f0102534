//! # Dataset-Level Merge
//!
//! Folds the per-file records of one kind (all XML or all mdoc) into a single
//! summary record.
//!
//! For every key the first value seen is kept. When a later record disagrees:
//!
//! - timestamp fields (`*DateTime*`) widen `key_start`/`key_end`, normalized to
//!   RFC 3339;
//! - numeric fields widen `key_min`/`key_max`;
//! - anything else keeps the first value and records no range.
//!
//! Keys superseded by a range are removed, then `NumberOfMovies` and
//! `DoseAverage` are added.

use log::debug;

use crate::field::{
    format_number, parse_number, strip_superseded, widen_numeric, widen_time, FieldValue,
    FlatRecord,
};


/// Number of records merged.
pub const NUMBER_OF_MOVIES: &str = "NumberOfMovies";

/// Summed dose divided by the number of records.
pub const DOSE_AVERAGE: &str = "DoseAverage";

/// Key fragments marking a per-exposure dose.
pub const DOSE_KEY_MARKERS: [&str; 2] = ["DoseOnCamera", "ExposureDose"];

fn is_dose_key(key: &str) -> bool {
    DOSE_KEY_MARKERS.iter().any(|marker| key.contains(marker))
}

/// Merge records of one kind into a dataset summary.
///
/// `DoseAverage` is only written for a non-empty input.
pub fn merge_records(records: &[FlatRecord]) -> FlatRecord {
    let mut merged = FlatRecord::new();
    let mut dose_sum = 0.0;

    for record in records {
        for (key, value) in record {
            if is_dose_key(key) {
                if let Some(dose) = parse_number(value) {
                    dose_sum += dose;
                }
            }

            let Some(stored) = merged.get(key) else {
                merged.insert(key.clone(), value.clone());
                continue;
            };
            if stored == value {
                continue;
            }

            match (
                FieldValue::classify(key, stored),
                FieldValue::classify(key, value),
            ) {
                (FieldValue::Timestamp(previous), FieldValue::Timestamp(observed)) => {
                    widen_time(&mut merged, key, previous, observed);
                }
                (FieldValue::Numeric(previous), FieldValue::Numeric(observed)) => {
                    widen_numeric(&mut merged, key, previous, observed);
                }
                _ => debug!("Ignoring non-numeric divergence on {key}"),
            }
        }
    }

    strip_superseded(&mut merged);
    merged.insert(NUMBER_OF_MOVIES.to_string(), records.len().to_string());
    if !records.is_empty() {
        let average = dose_sum / records.len() as f64;
        merged.insert(DOSE_AVERAGE.to_string(), format_number(average));
    }
    merged
}

/// Merge XML and mdoc records into the final dataset record.
///
/// Each kind is merged separately; mdoc results are laid over the XML ones.
/// Returns `None` when there is nothing to merge.
pub fn merge_dataset(xml: &[FlatRecord], mdoc: &[FlatRecord]) -> Option<FlatRecord> {
    match (xml.is_empty(), mdoc.is_empty()) {
        (true, true) => None,
        (false, true) => Some(merge_records(xml)),
        (true, false) => Some(merge_records(mdoc)),
        (false, false) => {
            let mut merged = merge_records(xml);
            merged.extend(merge_records(mdoc));
            strip_superseded(&mut merged);
            Some(merged)
        }
    }
}
