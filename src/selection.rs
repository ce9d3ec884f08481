// src/selection.rs
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{PickError, Result};

/// Only this many lines of a field-list file are read
pub const MAX_FIELD_FILE_LINES: usize = 1000;

/// Ordered list of requested field names. Order is output column order;
/// duplicates are kept on purpose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSelection {
    names: Vec<String>,
}

impl FieldSelection {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Parse an inline list like `srcip,dstip,action`
    pub fn parse_list(list: &str) -> Self {
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Read one field name per line from `path`.
    ///
    /// Trailing whitespace is trimmed and blank lines are ignored. A missing
    /// file is `SourceNotFound`; a file with no names is a configuration error.
    pub fn from_field_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PickError::SourceNotFound(path.to_path_buf()),
            _ => PickError::Io(e),
        })?;
        let selection = Self::from_reader(BufReader::new(file))?;
        if selection.is_empty() {
            return Err(PickError::config(format!(
                "field file '{}' is empty",
                path.display()
            )));
        }
        Ok(selection)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut names = Vec::new();
        for line in reader.lines().take(MAX_FIELD_FILE_LINES) {
            let line = line?;
            let name = line.trim_end();
            if !name.is_empty() {
                names.push(name.to_string());
            }
        }
        Ok(Self { names })
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for FieldSelection {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}
