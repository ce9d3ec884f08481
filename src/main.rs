use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use is_terminal::IsTerminal;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use fortipick::{
    discover_first, resolve_patterns, DecodeMode, FieldPicker, FieldSelection, OutputMode,
    PickConfig, PickError, PromptPicker, StreamDriver, DEFAULT_SAMPLE_SIZE,
};

#[derive(Parser)]
#[command(name = "fortipick")]
#[command(
    about = "Output specified fields from CSV log files (format: \"field1=value\",\"field2=value\",...)"
)]
#[command(version)]
struct Args {
    /// Log files (wildcards and .gz accepted; "-" or nothing reads stdin)
    #[arg(value_name = "FILE")]
    files: Vec<String>,

    /// Field list file, one field name per line
    #[arg(short = 'f', long = "field-file", value_name = "FIELD_FILE")]
    field_file: Option<PathBuf>,

    /// Comma separated field names, e.g. "srcip,dstip,action"
    #[arg(short = 'k', long = "fields", value_name = "LIST")]
    fields: Option<String>,

    /// Separator between field name and value
    #[arg(short = 'F', long = "separator", value_name = "SEP", default_value = "=")]
    separator: String,

    /// Output at most NUM rows per input file (0 = all)
    #[arg(short = 'l', long = "lines", value_name = "NUM", default_value_t = 0)]
    lines: usize,

    /// Output to CSV files (FILE-yyyymmdd-hhmmss.csv) instead of stdout
    #[arg(short = 'o', long = "csv")]
    csv: bool,

    /// Fail when a cell starting with a requested field name has no separator
    #[arg(long)]
    strict: bool,

    /// Print the field names found in the first file and exit
    #[arg(long)]
    list_fields: bool,

    /// Rows sampled when discovering field names
    #[arg(long, value_name = "N", default_value_t = DEFAULT_SAMPLE_SIZE)]
    sample: usize,

    /// Debug mode - show processing details
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn validate(&self) -> Result<(), String> {
        match (&self.field_file, &self.fields, self.list_fields) {
            (Some(_), Some(_), _) => Err("Cannot use both --field-file and --fields".to_string()),
            (Some(_), None, true) | (None, Some(_), true) => {
                Err("--list-fields cannot be combined with an explicit field selection".to_string())
            }
            _ => Ok(()),
        }
    }

    fn config(&self) -> PickConfig {
        PickConfig {
            separator: self.separator.clone(),
            limit: self.lines,
            decode_mode: if self.strict {
                DecodeMode::Strict
            } else {
                DecodeMode::Lenient
            },
            output_mode: if self.csv {
                OutputMode::PerSource
            } else {
                OutputMode::Stdout
            },
            sample_size: self.sample,
        }
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    if let Err(e) = args.validate() {
        error!("{}", e);
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_broken_pipe(&e) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<PickError>())
        .any(PickError::is_broken_pipe)
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = args.config();
    config.validate()?;

    let explicit = match (&args.field_file, &args.fields) {
        (Some(path), _) => Some(
            FieldSelection::from_field_file(path)
                .with_context(|| format!("Failed to read field file '{}'", path.display()))?,
        ),
        (None, Some(list)) => Some(FieldSelection::parse_list(list)),
        (None, None) => None,
    };

    let selection = match explicit {
        Some(selection) => selection,
        None => match choose_fields(&args, &config)? {
            Some(selection) => selection,
            None => return Ok(()),
        },
    };
    if selection.is_empty() {
        return Err(PickError::config("specified fields are empty").into());
    }

    let sources = resolve_patterns(&args.files)?;
    let mut driver = StreamDriver::new(config);
    let stats = driver.run(sources, &selection, io::stdout().lock())?;

    if args.debug {
        debug!("Final statistics:");
        debug!("  Sources read: {}", stats.sources_read);
        debug!("  Sources skipped: {}", stats.sources_skipped);
        debug!("  Rows read: {}", stats.rows_read);
        debug!("  Rows written: {}", stats.rows_written);
        debug!("  Processing time: {:?}", stats.processing_time);
        if let Some(rate) = stats.rate() {
            debug!("  Processing rate: {:.0} rows/second", rate);
        }
    }

    Ok(())
}

/// Discover candidates from the first input file and let the user choose.
///
/// `None` means there is nothing left to do (fields were listed, or the user
/// aborted the picker).
fn choose_fields(args: &Args, config: &PickConfig) -> anyhow::Result<Option<FieldSelection>> {
    let candidates = discover_first(&args.files, &config.separator, config.sample_size)?;

    if args.list_fields {
        let mut out = io::stdout().lock();
        for name in candidates.iter() {
            writeln!(out, "{}", name).map_err(PickError::Io)?;
        }
        out.flush().map_err(PickError::Io)?;
        return Ok(None);
    }

    if candidates.is_empty() {
        return Err(PickError::config(format!(
            "no fields found in '{}'",
            args.files.first().map(String::as_str).unwrap_or_default()
        ))
        .into());
    }

    if !io::stdin().is_terminal() {
        return Err(PickError::config(
            "no field selection given: use -f/--field-file or -k/--fields, or run from a terminal",
        )
        .into());
    }

    let mut picker = PromptPicker::new(io::stdin().lock(), io::stderr());
    let selection = picker.pick(&candidates)?;
    if selection.is_empty() {
        info!("No fields selected, nothing to do");
        return Ok(None);
    }
    Ok(Some(selection))
}
