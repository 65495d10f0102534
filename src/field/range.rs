//! Range bookkeeping shared by the mdoc parser and the merge engine.
//!
//! Once a field diverges, its base key is superseded by derived bound keys.
//! All helpers fold new observations against the bounds already stored, so
//! any number of observations converges to the true span regardless of order.

use chrono::{DateTime, FixedOffset};

use super::{format_number, format_timestamp, parse_number, parse_timestamp, FlatRecord};

/// Every suffix that marks a derived range key.
pub const RANGE_SUFFIXES: [&str; 8] = [
    "_min", "_max", "_x_min", "_x_max", "_y_min", "_y_max", "_start", "_end",
];

fn derived(key: &str, suffix: &str) -> String {
    format!("{key}{suffix}")
}

/// Widen `key_min`/`key_max` with `observed`.
///
/// `previous` is the scalar value held before the first divergence and only
/// matters while no bound exists yet.
pub fn widen_numeric(record: &mut FlatRecord, key: &str, previous: f64, observed: f64) {
    let min_key = derived(key, "_min");
    let max_key = derived(key, "_max");

    let low = match record.get(&min_key).and_then(|v| parse_number(v)) {
        Some(current) => current.min(observed),
        None => previous.min(observed),
    };
    let high = match record.get(&max_key).and_then(|v| parse_number(v)) {
        Some(current) => current.max(observed),
        None => previous.max(observed),
    };

    record.insert(min_key, format_number(low));
    record.insert(max_key, format_number(high));
}

/// Seed or widen the four component bounds of a `"x y"` field.
///
/// The first observation is stored verbatim; later ones are folded in
/// numerically. Returns `false` when `raw` does not hold two components.
pub fn widen_tuple(record: &mut FlatRecord, key: &str, raw: &str) -> bool {
    let mut tokens = raw.split_whitespace();
    let (Some(x_raw), Some(y_raw)) = (tokens.next(), tokens.next()) else {
        return false;
    };

    let keys = [
        derived(key, "_x_min"),
        derived(key, "_x_max"),
        derived(key, "_y_min"),
        derived(key, "_y_max"),
    ];

    if keys.iter().all(|k| !record.contains_key(k)) {
        let [x_min, x_max, y_min, y_max] = keys;
        record.insert(x_min, x_raw.to_string());
        record.insert(x_max, x_raw.to_string());
        record.insert(y_min, y_raw.to_string());
        record.insert(y_max, y_raw.to_string());
        return true;
    }

    let (Some(x), Some(y)) = (parse_number(x_raw), parse_number(y_raw)) else {
        return false;
    };
    let stored = |k: &str, fallback: f64| {
        let current = record.get(k).and_then(|v| parse_number(v));
        current.unwrap_or(fallback)
    };

    let [x_min, x_max, y_min, y_max] = keys;
    let widened = [
        (stored(&x_min, x).min(x), x_min),
        (stored(&x_max, x).max(x), x_max),
        (stored(&y_min, y).min(y), y_min),
        (stored(&y_max, y).max(y), y_max),
    ];
    for (value, k) in widened {
        record.insert(k, format_number(value));
    }
    true
}

/// Widen `key_start`/`key_end` with the pair `previous`/`observed`.
pub fn widen_time(
    record: &mut FlatRecord,
    key: &str,
    previous: DateTime<FixedOffset>,
    observed: DateTime<FixedOffset>,
) {
    let start_key = derived(key, "_start");
    let end_key = derived(key, "_end");

    let start = match record.get(&start_key).and_then(|v| parse_timestamp(v)) {
        Some(current) => current.min(observed),
        None => previous.min(observed),
    };
    let end = match record.get(&end_key).and_then(|v| parse_timestamp(v)) {
        Some(current) => current.max(observed),
        None => previous.max(observed),
    };

    record.insert(start_key, format_timestamp(&start));
    record.insert(end_key, format_timestamp(&end));
}

/// Remove every base key that has a derived range counterpart.
pub fn strip_superseded(record: &mut FlatRecord) {
    let superseded: Vec<String> = record
        .keys()
        .filter(|key| {
            RANGE_SUFFIXES
                .iter()
                .any(|suffix| record.contains_key(&derived(key, suffix)))
        })
        .cloned()
        .collect();

    for key in superseded {
        record.remove(&key);
    }
}
