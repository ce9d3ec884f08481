// src/lib.rs
pub mod discovery;
pub mod error;
pub mod input;
pub mod output;
pub mod picker;
pub mod pipeline;
pub mod projection;
pub mod record;
pub mod selection;

pub use error::*;

pub use discovery::{discover, discover_first, FieldCandidates, DEFAULT_SAMPLE_SIZE};
pub use input::{resolve_patterns, InputSource, LogReader, Resolved, Rewind};
pub use output::OutputMode;
pub use picker::{FieldPicker, PromptPicker};
pub use pipeline::config::{DecodeMode, PickConfig};
pub use pipeline::context::ProcessingStats;
pub use pipeline::stream::StreamDriver;
pub use projection::project;
pub use record::{decode, decode_restricted, DecodeFailure, Record};
pub use selection::FieldSelection;
