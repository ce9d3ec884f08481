// src/output.rs
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::Result;
use crate::input::InputSource;

/// Appended to a source path to name its output file
pub const OUTPUT_SUFFIX_FORMAT: &str = "-%Y%m%d-%H%M%S.csv";

/// Where projected rows go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// One table on the shared output stream, one header for the whole run
    #[default]
    Stdout,
    /// A fresh `<source>-YYYYMMDD-HHMMSS.csv` file per source
    PerSource,
}

pub fn timestamp_suffix(now: DateTime<Local>) -> String {
    now.format(OUTPUT_SUFFIX_FORMAT).to_string()
}

/// Output file for `source`; stdin writes `stdin<suffix>` in the working directory.
pub fn output_path(source: &InputSource, suffix: &str) -> PathBuf {
    let mut name = match source.path() {
        Some(path) => path.as_os_str().to_owned(),
        None => "stdin".into(),
    };
    name.push(suffix);
    PathBuf::from(name)
}

/// CSV writer for a stream: minimal quoting, LF line endings
pub fn stream_writer<W: Write>(output: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(output)
}

/// CSV writer for a per-source file: minimal quoting, CRLF line endings
pub fn file_writer(path: &Path) -> Result<csv::Writer<File>> {
    let file = File::create(path)?;
    Ok(WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::CRLF)
        .from_writer(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_suffix_format() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(timestamp_suffix(now), "-20240309-070501.csv");
    }

    #[test]
    fn test_output_path_keeps_full_source_name() {
        let source = InputSource::from_path("/var/log/fw.log.gz");
        assert_eq!(
            output_path(&source, "-20240309-070501.csv"),
            PathBuf::from("/var/log/fw.log.gz-20240309-070501.csv")
        );
        assert_eq!(
            output_path(&InputSource::Stdin, "-x.csv"),
            PathBuf::from("stdin-x.csv")
        );
    }

    #[test]
    fn test_stream_writer_quotes_minimally() {
        let mut writer = stream_writer(Vec::new());
        writer.write_record(["a", "b,c", ""]).unwrap();
        writer.write_record(["say \"hi\"", "x", "y"]).unwrap();
        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(out, "a,\"b,c\",\n\"say \"\"hi\"\"\",x,y\n");
    }
}
