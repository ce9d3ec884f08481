// src/pipeline/stream.rs
use std::borrow::Cow;
use std::io::{Read, Write};
use std::time::Instant;

use chrono::Local;
use csv::{ByteRecord, ReaderBuilder};
use tracing::{debug, info, warn};

use crate::error::{PickError, Result};
use crate::input::{InputSource, Resolved};
use crate::output::{self, OutputMode};
use crate::pipeline::config::{DecodeMode, PickConfig};
use crate::pipeline::context::ProcessingStats;
use crate::projection::project;
use crate::record::{decode, decode_restricted};
use crate::selection::FieldSelection;

/// Drives decode + project over every source of a run
pub struct StreamDriver {
    config: PickConfig,
    stats: ProcessingStats,
    /// Shared by every per-source output file of this run
    suffix: String,
}

impl StreamDriver {
    pub fn new(config: PickConfig) -> Self {
        Self::with_suffix(config, output::timestamp_suffix(Local::now()))
    }

    pub fn with_suffix(config: PickConfig, suffix: String) -> Self {
        StreamDriver {
            config,
            stats: ProcessingStats::default(),
            suffix,
        }
    }

    /// Project `fields` out of every source.
    ///
    /// In `Stdout` mode rows go to `out` under a single header written
    /// before anything else. In `PerSource` mode `out` is untouched and
    /// each source gets its own file with its own header. Skipped sources are
    /// logged and counted; every other error ends the run.
    pub fn run<W: Write>(
        &mut self,
        sources: Vec<Resolved>,
        fields: &FieldSelection,
        out: W,
    ) -> Result<ProcessingStats> {
        self.config.validate()?;
        if fields.is_empty() {
            return Err(PickError::config("specified fields are empty"));
        }

        let start_time = Instant::now();
        self.stats = ProcessingStats::default();

        let mut shared = match self.config.output_mode {
            OutputMode::Stdout => {
                let mut writer = output::stream_writer(out);
                writer.write_record(fields.iter())?;
                Some(writer)
            }
            OutputMode::PerSource => None,
        };

        for entry in sources {
            let source = match entry {
                Resolved::Source(source) => source,
                Resolved::Skipped(reason) => {
                    self.skip(&reason);
                    continue;
                }
            };

            let name = source.name();
            info!("Read: {}", name);
            let reader = match source.open() {
                Ok(reader) => reader,
                Err(e @ PickError::SourceSkipped { .. }) => {
                    self.skip(&e);
                    continue;
                }
                Err(e) => return Err(e.in_source(&name)),
            };

            match shared.as_mut() {
                Some(writer) => self.process_source(reader, &name, fields, writer),
                None => self.process_to_file(reader, &source, fields),
            }
            .map_err(|e| e.in_source(&name))?;
            self.stats.sources_read += 1;
        }

        if let Some(mut writer) = shared {
            writer.flush()?;
        }

        self.stats.processing_time = start_time.elapsed();
        debug!(
            "Processing complete: {} sources read, {} skipped, {} rows read, {} written in {:?}",
            self.stats.sources_read,
            self.stats.sources_skipped,
            self.stats.rows_read,
            self.stats.rows_written,
            self.stats.processing_time
        );
        Ok(self.stats.clone())
    }

    fn skip(&mut self, reason: &PickError) {
        warn!("{}", reason);
        self.stats.sources_skipped += 1;
    }

    fn process_to_file<R: Read>(
        &mut self,
        reader: R,
        source: &InputSource,
        fields: &FieldSelection,
    ) -> Result<()> {
        let path = output::output_path(source, &self.suffix);
        let mut writer = output::file_writer(&path)?;
        writer.write_record(fields.iter())?;
        self.process_source(reader, &source.name(), fields, &mut writer)?;
        writer.flush()?;
        info!("Wrote: {}", path.display());
        Ok(())
    }

    /// Decode and project one source into `writer`, honoring the row limit.
    ///
    /// Cells are decoded as UTF-8 lossily; invalid bytes become U+FFFD
    /// instead of failing the row.
    pub fn process_source<R: Read, W: Write>(
        &mut self,
        reader: R,
        name: &str,
        fields: &FieldSelection,
        writer: &mut csv::Writer<W>,
    ) -> Result<()> {
        let mut rows = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut row = ByteRecord::new();
        let mut row_number: u64 = 0;
        let limit = self.config.limit as u64;

        while rows.read_byte_record(&mut row)? {
            row_number += 1;
            self.stats.rows_read += 1;

            let cells = lossy_cells(&row);
            let record = match self.config.decode_mode {
                DecodeMode::Lenient => decode(cells.iter().map(|c| &**c), &self.config.separator),
                DecodeMode::Strict => decode_restricted(
                    cells.iter().map(|c| &**c),
                    &self.config.separator,
                    fields.as_slice(),
                )
                .map_err(|failure| PickError::Decode {
                    source_name: name.to_string(),
                    row: row_number,
                    failure,
                })?,
            };

            writer.write_record(project(&record, fields))?;
            self.stats.rows_written += 1;

            if limit > 0 && row_number >= limit {
                debug!("{}: stopping after {} rows", name, limit);
                break;
            }
        }
        Ok(())
    }

    pub fn get_stats(&self) -> &ProcessingStats {
        &self.stats
    }
}

/// Row cells as text, with invalid UTF-8 replaced
pub(crate) fn lossy_cells(row: &ByteRecord) -> Vec<Cow<'_, str>> {
    row.iter().map(String::from_utf8_lossy).collect()
}
