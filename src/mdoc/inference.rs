//! Dataset facts that an mdoc never states directly.

use log::debug;

use crate::field::{format_number, parse_number, FlatRecord};

use super::keys;

fn parse_code(record: &FlatRecord, key: &str) -> Option<i64> {
    record.get(key).and_then(|v| v.trim().parse::<i64>().ok())
}

/// Write `NumberOfTilts` and, when the tilt range resolved, `Tilt_increment`.
pub(crate) fn resolve_tilt_geometry(record: &mut FlatRecord, tilt_count: u64) {
    record.insert(
        keys::NUMBER_OF_TILTS.to_string(),
        format_number(tilt_count as f64),
    );

    if tilt_count == 0 || !record.contains_key(keys::TILT_ANGLE) {
        return;
    }
    let bound = |suffix: &str| {
        record
            .get(&format!("{}{suffix}", keys::TILT_ANGLE))
            .and_then(|v| parse_number(v))
    };
    match (bound("_min"), bound("_max")) {
        (Some(min), Some(max)) => {
            let increment = (max - min).abs() / tilt_count as f64;
            record.insert(keys::TILT_INCREMENT.to_string(), format_number(increment));
        }
        _ => debug!("Tilt angle never varied, no increment derived"),
    }
}

/// Acquisition software from the title line, overridden by an explicit version.
pub(crate) fn resolve_software(record: &mut FlatRecord) {
    let from_title = record.get(keys::TITLE).and_then(|title| {
        if title.to_lowercase().contains("tomography") {
            Some("Tomo5")
        } else if title.contains("SerialEM") {
            Some("SerialEM")
        } else {
            None
        }
    });
    if let Some(software) = from_title {
        record.insert(keys::SOFTWARE.to_string(), software.to_string());
    }

    if let Some(version) = record.get(keys::VERSION).cloned() {
        record.insert(keys::SOFTWARE.to_string(), version);
    }
}

/// Imaging and EM mode from the dark-field flag, magnification index and mode code.
pub(crate) fn resolve_imaging(record: &mut FlatRecord) {
    let dark_field = parse_code(record, keys::DARK_FIELD);
    if dark_field == Some(1) {
        record.insert(keys::IMAGING.to_string(), "Darkfield".to_string());
    }

    let mag_index = parse_code(record, keys::MAG_INDEX);
    if mag_index.is_some_and(|m| m > 0) && dark_field.unwrap_or(0) == 0 {
        record.insert(keys::IMAGING.to_string(), "Brightfield".to_string());
    }

    match parse_code(record, keys::EM_MODE_CODE) {
        Some(0) => set(record, keys::EM_MODE, "TEM"),
        Some(1) => set(record, keys::EM_MODE, "EFTEM"),
        Some(2) => set(record, keys::EM_MODE, "STEM"),
        Some(3) => set(record, keys::IMAGING, "Diffraction"),
        _ => {}
    }
}

fn set(record: &mut FlatRecord, key: &str, value: &str) {
    record.insert(key.to_string(), value.to_string());
}
