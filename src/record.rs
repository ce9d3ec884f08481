// src/record.rs
use indexmap::IndexMap;

/// A decoded log record: field name -> value, borrowed from the tokenized row.
///
/// Keys keep the position of their first occurrence; a repeated key
/// overwrites the earlier value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record<'a> {
    fields: IndexMap<&'a str, &'a str>,
}

impl<'a> Record<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.fields.get(name).copied()
    }

    pub fn insert(&mut self, key: &'a str, value: &'a str) {
        self.fields.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in first-seen order
    pub fn keys(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.fields.keys().copied()
    }
}

/// A cell that matched a requested field prefix but could not be split.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cell {cell:?} matches field '{field}' but contains no {separator:?}")]
pub struct DecodeFailure {
    pub cell: String,
    pub field: String,
    pub separator: String,
}

/// Split every non-empty cell on the first `separator`.
///
/// Cells without the separator are ignored.
pub fn decode<'a, I>(row: I, separator: &str) -> Record<'a>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut record = Record::new();
    for cell in row {
        if cell.is_empty() {
            continue;
        }
        if let Some((key, value)) = cell.split_once(separator) {
            record.insert(key, value);
        }
    }
    record
}

/// Like [`decode`], but only looks at cells starting with one of `candidates`.
///
/// A matching cell that has no separator means the line is not shaped the way
/// the caller expects, and is reported as a [`DecodeFailure`].
pub fn decode_restricted<'a, I, S>(
    row: I,
    separator: &str,
    candidates: &[S],
) -> Result<Record<'a>, DecodeFailure>
where
    I: IntoIterator<Item = &'a str>,
    S: AsRef<str>,
{
    let mut record = Record::new();
    for cell in row {
        if cell.is_empty() {
            continue;
        }
        let Some(field) = candidates
            .iter()
            .map(AsRef::as_ref)
            .find(|prefix| cell.starts_with(prefix))
        else {
            continue;
        };

        match cell.split_once(separator) {
            Some((key, value)) => record.insert(key, value),
            None => {
                return Err(DecodeFailure {
                    cell: cell.to_string(),
                    field: field.to_string(),
                    separator: separator.to_string(),
                })
            }
        }
    }
    Ok(record)
}
