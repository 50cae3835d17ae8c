//! Normalization applied to raw records before upload.

use crate::index::Record;
use serde_json::Value;

const NULL_SENTINEL: &str = "NULL";

/// Replace every `"NULL"` string value (any ASCII case) with JSON null, in place.
///
/// Returns the number of fields rewritten. Non-string values, including nested arrays and
/// objects, are left untouched.
pub fn clean_record(record: &mut Record) -> usize {
    let mut rewritten = 0;
    for value in record.values_mut() {
        if is_null_sentinel(value) {
            *value = Value::Null;
            rewritten += 1;
        }
    }
    rewritten
}

/// Clean a whole collection, preserving length and order.
pub fn clean_records(mut records: Vec<Record>) -> (Vec<Record>, usize) {
    let rewritten = records.iter_mut().map(clean_record).sum();
    (records, rewritten)
}

fn is_null_sentinel(value: &Value) -> bool {
    matches!(value, Value::String(text) if text.eq_ignore_ascii_case(NULL_SENTINEL))
}
