use crate::field::{
    is_tuple_key, parse_number, widen_numeric, widen_tuple, FieldValue, FlatRecord,
};

use super::keys;

/// Split a `key = value` line at the first `=`; both sides trimmed and non-empty.
pub(crate) fn split_line(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let (key, value) = (key.trim(), value.trim());
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Tilt axis embedded in a title line, under either software's spelling.
///
/// Tomo5: `[T = TiltAxisAngle = 84.9  Binning = 1 ...]`
/// SerialEM: `[T = SerialEM: ...  Tilt axis angle = 84.9, binning = 1 ...]`
fn embedded_tilt_axis(line: &str, value: &str) -> Option<String> {
    let angle = if line.contains("TiltAxisAngle") {
        let after = value.split('=').nth(1)?;
        after.split("  ").next().unwrap_or(after)
    } else if line.contains("Tilt axis angle") {
        value.split(',').next()?.split('=').nth(1)?
    } else {
        return None;
    };
    Some(angle.trim().to_string())
}

/// Line-by-line state of one mdoc file.
#[derive(Debug, Default)]
pub(crate) struct MdocScanner {
    record: FlatRecord,
    tilt_count: u64,
}

impl MdocScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed_line(&mut self, line: &str) {
        let Some((key, value)) = split_line(line) else {
            return;
        };

        if let Some(angle) = embedded_tilt_axis(line, value) {
            self.set(keys::TILT_AXIS_ANGLE, angle);
        }

        if line.contains(keys::CAMERA_INDEX) {
            let candidate = match value {
                "0" => Some(keys::CAMERA_0),
                "1" => Some(keys::CAMERA_1),
                _ => None,
            };
            if let Some(candidate) = candidate {
                // Empty when the camera list has not been seen yet.
                let camera = self.record.get(candidate).cloned().unwrap_or_default();
                self.set(keys::CAMERA_USED, camera);
            }
        }

        if line.contains(keys::IMAGE_SIZE) {
            let mut dims = value.split_whitespace();
            if let (Some(x), Some(y)) = (dims.next(), dims.next()) {
                self.set(keys::IMAGE_DIMENSIONS_X, x.to_string());
                self.set(keys::IMAGE_DIMENSIONS_Y, y.to_string());
            }
        }

        if key == keys::ZVALUE_SECTION {
            self.tilt_count += 1;
        }

        match self.record.get(key) {
            None => {
                self.set(key, value.to_string());
                let kind = FieldValue::classify(key, value);
                if matches!(kind, FieldValue::SpatialTuple { .. }) {
                    widen_tuple(&mut self.record, key, value);
                }
                self.note_energy_filter(key, value);
            }
            Some(stored) if stored == value => self.note_energy_filter(key, value),
            Some(stored) => match FieldValue::classify(key, stored) {
                FieldValue::Numeric(previous) => {
                    if let Some(observed) = parse_number(value) {
                        widen_numeric(&mut self.record, key, previous, observed);
                    }
                }
                _ if is_tuple_key(key) => {
                    widen_tuple(&mut self.record, key, value);
                }
                _ => {}
            },
        }
    }

    /// Total number of `[ZValue = n]` sections seen.
    pub fn tilt_count(&self) -> u64 {
        self.tilt_count
    }

    pub fn into_record(self) -> FlatRecord {
        self.record
    }

    fn set(&mut self, key: &str, value: String) {
        self.record.insert(key.to_string(), value);
    }

    fn note_energy_filter(&mut self, key: &str, value: &str) {
        if !key.contains(keys::FILTER_SLIT_AND_LOSS) {
            return;
        }
        let Some(width) = value.split_whitespace().next() else {
            return;
        };
        if parse_number(width).is_some_and(|w| w > 0.0) {
            self.set(keys::ENERGY_FILTER_USED, "true".to_string());
            self.set(keys::ENERGY_FILTER_SLIT_WIDTH, width.to_string());
        }
    }
}
