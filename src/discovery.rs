// src/discovery.rs
use std::io::Read;
use std::path::PathBuf;

use csv::{ByteRecord, ReaderBuilder};
use indexmap::IndexSet;
use tracing::{debug, warn};

use crate::error::{PickError, Result};
use crate::input::{self, Resolved, Rewind};
use crate::pipeline::stream::lossy_cells;
use crate::record::decode;

/// Rows sampled from the top of a file when nothing else is configured
pub const DEFAULT_SAMPLE_SIZE: usize = 99;

/// Field names seen in a sample, first-seen order, no duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldCandidates {
    names: IndexSet<String>,
}

impl FieldCandidates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the name was already known; its position is kept
    pub fn insert(&mut self, name: &str) -> bool {
        if self.names.contains(name) {
            return false;
        }
        self.names.insert(name.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Zero-based
    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get_index(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for FieldCandidates {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        let mut candidates = Self::new();
        for name in iter {
            candidates.insert(name);
        }
        candidates
    }
}

/// Sample up to `sample_size` rows from the start of `reader`.
///
/// Readers that cannot seek yield nothing, so no rows are lost for the main
/// pass. Otherwise the read position is put back where it was.
pub fn discover<R: Rewind>(
    reader: &mut R,
    separator: &str,
    sample_size: usize,
) -> Result<FieldCandidates> {
    if !reader.supports_seek() {
        debug!("input cannot be rewound, skipping field discovery");
        return Ok(FieldCandidates::new());
    }

    let position = reader.position()?;
    reader.seek_to(0)?;
    let sampled = sample(&mut *reader, separator, sample_size);
    reader.seek_to(position)?;
    sampled
}

fn sample<R: Read>(reader: R, separator: &str, sample_size: usize) -> Result<FieldCandidates> {
    let mut rows = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut row = ByteRecord::new();
    let mut candidates = FieldCandidates::new();

    for _ in 0..sample_size {
        if !rows.read_byte_record(&mut row)? {
            break;
        }
        let cells = lossy_cells(&row);
        for name in decode(cells.iter().map(|c| &**c), separator).keys() {
            candidates.insert(name);
        }
    }
    Ok(candidates)
}

/// Discover fields from the first regular file matched by the first pattern.
///
/// Stdin cannot be sampled, so it is a configuration error here; a pattern
/// matching no usable file is `SourceNotFound`.
pub fn discover_first<S: AsRef<str>>(
    patterns: &[S],
    separator: &str,
    sample_size: usize,
) -> Result<FieldCandidates> {
    let Some(first) = patterns.first().map(AsRef::as_ref) else {
        return Err(stdin_needs_fields());
    };

    for entry in input::resolve_patterns(&[first])? {
        let source = match entry {
            Resolved::Source(source) if !source.supports_seek() => {
                return Err(stdin_needs_fields())
            }
            Resolved::Source(source) => source,
            Resolved::Skipped(reason) => {
                warn!("{}", reason);
                continue;
            }
        };
        let mut reader = match source.open() {
            Ok(reader) => reader,
            Err(e @ PickError::SourceSkipped { .. }) => {
                warn!("{}", e);
                continue;
            }
            Err(e) => return Err(e),
        };
        debug!("sampling fields from {}", source.name());
        return discover(&mut reader, separator, sample_size);
    }

    Err(PickError::SourceNotFound(PathBuf::from(first)))
}

fn stdin_needs_fields() -> PickError {
    PickError::config("reading from stdin requires -f/--field-file or -k/--fields")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    const SCENARIO: &str = "srcip=1.2.3.4,dstip=5.6.7.8\nsrcip=9.9.9.9,action=deny\n";

    struct Forward(Cursor<Vec<u8>>);

    impl Read for Forward {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.0.read(buf)
        }
    }

    impl Rewind for Forward {
        fn supports_seek(&self) -> bool {
            false
        }
        fn position(&mut self) -> std::io::Result<u64> {
            unreachable!()
        }
        fn seek_to(&mut self, _position: u64) -> std::io::Result<()> {
            unreachable!()
        }
    }

    #[test]
    fn test_first_seen_order() {
        let mut reader = Cursor::new(SCENARIO);
        let candidates = discover(&mut reader, "=", DEFAULT_SAMPLE_SIZE).unwrap();
        let names: Vec<_> = candidates.iter().collect();
        assert_eq!(names, vec!["srcip", "dstip", "action"]);
    }

    #[test]
    fn test_sample_size_bounds_rows() {
        let mut reader = Cursor::new(SCENARIO);
        let candidates = discover(&mut reader, "=", 1).unwrap();
        let names: Vec<_> = candidates.iter().collect();
        assert_eq!(names, vec!["srcip", "dstip"]);
    }

    #[test]
    fn test_position_is_restored() {
        let mut reader = Cursor::new(SCENARIO);
        reader.set_position(5);
        discover(&mut reader, "=", DEFAULT_SAMPLE_SIZE).unwrap();
        assert_eq!(reader.position(), 5);

        let mut rest = String::new();
        reader.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, &SCENARIO[5..]);
    }

    #[test]
    fn test_unseekable_input_is_left_alone() {
        let mut reader = Forward(Cursor::new(SCENARIO.as_bytes().to_vec()));
        let candidates = discover(&mut reader, "=", DEFAULT_SAMPLE_SIZE).unwrap();
        assert!(candidates.is_empty());

        let mut all = String::new();
        reader.read_to_string(&mut all).unwrap();
        assert_eq!(all, SCENARIO);
    }

    #[test]
    fn test_invalid_utf8_row_still_yields_names() {
        let mut reader = Cursor::new(b"n=1\nn=\xff,m=2\n".to_vec());
        let candidates = discover(&mut reader, "=", DEFAULT_SAMPLE_SIZE).unwrap();
        let names: Vec<_> = candidates.iter().collect();
        assert_eq!(names, vec!["n", "m"]);
    }

    #[test]
    fn test_candidates_dedupe_keeps_first_position() {
        let candidates: FieldCandidates = ["b", "a", "b", "c", "a"].into_iter().collect();
        let names: Vec<_> = candidates.iter().collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(candidates.get(2), Some("c"));
        assert_eq!(candidates.get(3), None);
    }

    #[test]
    fn test_discover_first_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("a.log")).unwrap();
        std::fs::write(dir.path().join("b.log"), "user=alice,msg=hi\n").unwrap();

        let pattern = format!("{}/*.log", dir.path().display());
        let candidates = discover_first(&[pattern], "=", DEFAULT_SAMPLE_SIZE).unwrap();
        let names: Vec<_> = candidates.iter().collect();
        assert_eq!(names, vec!["user", "msg"]);
    }

    #[test]
    fn test_discover_first_without_match() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.log", dir.path().display());
        let err = discover_first(&[pattern], "=", DEFAULT_SAMPLE_SIZE).unwrap_err();
        assert!(matches!(err, PickError::SourceNotFound(_)));
    }

    #[test]
    fn test_discover_first_rejects_stdin() {
        let err = discover_first(&["-"], "=", DEFAULT_SAMPLE_SIZE).unwrap_err();
        assert!(matches!(err, PickError::Configuration(_)));
        let err = discover_first::<&str>(&[], "=", DEFAULT_SAMPLE_SIZE).unwrap_err();
        assert!(matches!(err, PickError::Configuration(_)));
    }
}
