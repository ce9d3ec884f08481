use crate::discovery::DEFAULT_SAMPLE_SIZE;
use crate::error::{PickError, Result};
use crate::output::OutputMode;

/// Configuration for one pick run
#[derive(Debug, Clone)]
pub struct PickConfig {
    /// Splits `key<SEP>value` cells; must not be empty
    pub separator: String,
    /// Rows read per source; 0 = unbounded
    pub limit: usize,
    pub decode_mode: DecodeMode,
    pub output_mode: OutputMode,
    /// Rows sampled by field discovery
    pub sample_size: usize,
}

impl Default for PickConfig {
    fn default() -> Self {
        PickConfig {
            separator: "=".to_string(),
            limit: 0,
            decode_mode: DecodeMode::Lenient,
            output_mode: OutputMode::Stdout,
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

impl PickConfig {
    pub fn validate(&self) -> Result<()> {
        if self.separator.is_empty() {
            return Err(PickError::config("separator must not be empty"));
        }
        Ok(())
    }
}

/// How cells are turned into fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    /// Split every cell that has a separator, ignore the rest
    Lenient,
    /// Only split cells that start with a requested field name, and fail the
    /// run when such a cell cannot be split
    Strict,
}
