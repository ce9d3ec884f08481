// src/projection.rs
use crate::record::Record;
use crate::selection::FieldSelection;

/// Pick the requested fields out of a record, in selection order.
///
/// Absent fields become empty cells and repeated names repeat the column, so
/// the output always has exactly `fields.len()` cells.
pub fn project(record: &Record<'_>, fields: &FieldSelection) -> Vec<String> {
    fields
        .iter()
        .map(|name| record.get(name).unwrap_or_default().to_string())
        .collect()
}
