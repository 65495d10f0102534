#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Both parsers must reject malformed input without panicking.
    let flattened = emharvest::xml::flatten_bytes(data);

    let text = String::from_utf8_lossy(data);
    let parsed = emharvest::mdoc::parse_mdoc_str(&text);

    // Merging whatever came out must not panic either.
    let mut records = vec![parsed];
    if let Ok(record) = flattened {
        records.push(record);
    }
    let _ = emharvest::merge::merge_records(&records);
});
