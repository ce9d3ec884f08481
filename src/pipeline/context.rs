use std::time::Duration;

/// Runtime statistics for one run
#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    pub sources_read: usize,
    pub sources_skipped: usize,
    pub rows_read: usize,
    pub rows_written: usize,
    pub processing_time: Duration,
}

impl ProcessingStats {
    /// Rows per second, if anything was read
    pub fn rate(&self) -> Option<f64> {
        let secs = self.processing_time.as_secs_f64();
        (self.rows_read > 0 && secs > 0.0).then(|| self.rows_read as f64 / secs)
    }
}
