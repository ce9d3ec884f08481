// src/input.rs
use std::fs::{self, File};
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use tracing::{debug, warn};

use crate::error::{PickError, Result};

/// Positional argument meaning "read from standard input"
pub const STDIN_MARKER: &str = "-";

/// Where rows come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    Plain(PathBuf),
    /// Transparently decompressed (`*.gz`)
    Gzip(PathBuf),
}

impl InputSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.as_os_str() == STDIN_MARKER {
            return InputSource::Stdin;
        }
        match path.extension() {
            Some(ext) if ext == "gz" => InputSource::Gzip(path),
            _ => InputSource::Plain(path),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            InputSource::Stdin => None,
            InputSource::Plain(path) | InputSource::Gzip(path) => Some(path),
        }
    }

    /// Human readable name used in diagnostics
    pub fn name(&self) -> String {
        match self.path() {
            Some(path) => path.display().to_string(),
            None => "<stdin>".to_string(),
        }
    }

    /// Whether the source can be rewound after a discovery pass
    pub fn supports_seek(&self) -> bool {
        !matches!(self, InputSource::Stdin)
    }

    /// Open the source for reading.
    ///
    /// A path that turned into a directory or vanished since it was matched
    /// comes back as `SourceSkipped` so the caller can continue.
    pub fn open(&self) -> Result<LogReader> {
        let path = match self {
            InputSource::Stdin => {
                return Ok(LogReader {
                    inner: ReaderKind::Stdin(io::stdin()),
                })
            }
            InputSource::Plain(path) | InputSource::Gzip(path) => path,
        };

        check_regular_file(path)?;
        let file = File::open(path).map_err(|e| classify_open_error(path, e))?;
        let inner = match self {
            InputSource::Gzip(_) => ReaderKind::Gzip {
                path: path.clone(),
                decoder: MultiGzDecoder::new(BufReader::new(file)),
                consumed: 0,
            },
            _ => ReaderKind::Plain(BufReader::new(file)),
        };
        Ok(LogReader { inner })
    }
}

fn check_regular_file(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path).map_err(|e| classify_open_error(path, e))?;
    if metadata.is_dir() {
        return Err(PickError::SourceSkipped {
            path: path.to_path_buf(),
            reason: "is a directory".to_string(),
        });
    }
    if !metadata.is_file() {
        return Err(PickError::SourceSkipped {
            path: path.to_path_buf(),
            reason: "not a regular file".to_string(),
        });
    }
    Ok(())
}

fn classify_open_error(path: &Path, err: io::Error) -> PickError {
    match err.kind() {
        io::ErrorKind::NotFound => PickError::SourceSkipped {
            path: path.to_path_buf(),
            reason: "no longer exists".to_string(),
        },
        _ => PickError::Io(err),
    }
}

/// Result of expanding one input pattern entry
#[derive(Debug)]
pub enum Resolved {
    Source(InputSource),
    /// Matched but unusable; carries a `PickError::SourceSkipped`
    Skipped(PickError),
}

/// Expand positional input patterns into sources, in argument order.
///
/// No patterns means stdin. Each pattern goes through `glob` (with `**`
/// recursion); matches are sorted by the glob crate. Directories and
/// unreadable entries are reported as `Resolved::Skipped`.
pub fn resolve_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Resolved>> {
    if patterns.is_empty() {
        return Ok(vec![Resolved::Source(InputSource::Stdin)]);
    }

    let mut resolved = Vec::new();
    for pattern in patterns.iter().map(AsRef::as_ref) {
        if pattern == STDIN_MARKER {
            resolved.push(Resolved::Source(InputSource::Stdin));
            continue;
        }

        let paths = glob::glob(pattern).map_err(|e| {
            PickError::config(format!("invalid file pattern '{}': {}", pattern, e))
        })?;

        let before = resolved.len();
        for entry in paths {
            match entry {
                Ok(path) => resolved.push(resolve_path(path)),
                Err(e) => resolved.push(Resolved::Skipped(PickError::SourceSkipped {
                    path: e.path().to_path_buf(),
                    reason: e.error().to_string(),
                })),
            }
        }
        if resolved.len() == before {
            warn!("no files match '{}'", pattern);
        } else {
            debug!("pattern '{}' matched {} entries", pattern, resolved.len() - before);
        }
    }
    Ok(resolved)
}

fn resolve_path(path: PathBuf) -> Resolved {
    if path.is_dir() {
        Resolved::Skipped(PickError::SourceSkipped {
            path,
            reason: "is a directory".to_string(),
        })
    } else if !path.is_file() {
        Resolved::Skipped(PickError::SourceSkipped {
            path,
            reason: "not a regular file".to_string(),
        })
    } else {
        Resolved::Source(InputSource::from_path(path))
    }
}

/// A reader whose position can be saved and restored, when the underlying
/// input allows it.
pub trait Rewind: Read {
    fn supports_seek(&self) -> bool;
    fn position(&mut self) -> io::Result<u64>;
    fn seek_to(&mut self, position: u64) -> io::Result<()>;
}

/// Open handle on an [`InputSource`]. Dropping it closes the file; stdin is
/// left open.
pub struct LogReader {
    inner: ReaderKind,
}

enum ReaderKind {
    Stdin(io::Stdin),
    Plain(BufReader<File>),
    Gzip {
        path: PathBuf,
        decoder: MultiGzDecoder<BufReader<File>>,
        /// Decompressed bytes handed out so far
        consumed: u64,
    },
}

impl Read for LogReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.inner {
            ReaderKind::Stdin(stdin) => stdin.read(buf),
            ReaderKind::Plain(reader) => reader.read(buf),
            ReaderKind::Gzip {
                decoder, consumed, ..
            } => {
                let n = decoder.read(buf)?;
                *consumed += n as u64;
                Ok(n)
            }
        }
    }
}

fn unsupported() -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, "standard input cannot be rewound")
}

impl Rewind for LogReader {
    fn supports_seek(&self) -> bool {
        !matches!(self.inner, ReaderKind::Stdin(_))
    }

    fn position(&mut self) -> io::Result<u64> {
        match &mut self.inner {
            ReaderKind::Stdin(_) => Err(unsupported()),
            ReaderKind::Plain(reader) => reader.stream_position(),
            ReaderKind::Gzip { consumed, .. } => Ok(*consumed),
        }
    }

    fn seek_to(&mut self, position: u64) -> io::Result<()> {
        match &mut self.inner {
            ReaderKind::Stdin(_) => Err(unsupported()),
            ReaderKind::Plain(reader) => reader.seek(SeekFrom::Start(position)).map(|_| ()),
            ReaderKind::Gzip {
                path,
                decoder,
                consumed,
            } => {
                // gzip streams only go forward: start over and skip ahead
                let mut fresh = MultiGzDecoder::new(BufReader::new(File::open(&*path)?));
                let skipped = io::copy(&mut (&mut fresh).take(position), &mut io::sink())?;
                *decoder = fresh;
                *consumed = skipped;
                Ok(())
            }
        }
    }
}

impl<T: AsRef<[u8]>> Rewind for Cursor<T> {
    fn supports_seek(&self) -> bool {
        true
    }

    fn position(&mut self) -> io::Result<u64> {
        Ok(Cursor::position(self))
    }

    fn seek_to(&mut self, position: u64) -> io::Result<()> {
        self.set_position(position);
        Ok(())
    }
}
