use crate::concurrency::Strategy;

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct RankOptions {
    pub top_k: usize,                       // entries per result
    pub strategy: Strategy,
    pub progress: bool,                     // show byte progress bar
    pub progress_label: Option<String>,     // optional label for progress bar
    pub low_memory_threshold: Option<f64>,  // throttle reads under this available-RAM fraction

    // IO tuning
    pub read_buffer_bytes: usize,           // BufReader capacity
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            top_k: 10,
            strategy: Strategy::Sequential,
            progress: false,
            progress_label: None,
            low_memory_threshold: Some(0.10),
            read_buffer_bytes: 256 * 1024,
        }
    }
}

impl RankOptions {
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }
    pub fn with_low_memory_threshold(mut self, threshold: Option<f64>) -> Self {
        self.low_memory_threshold = threshold.map(|t| t.clamp(0.0, 1.0));
        self
    }
    pub fn with_io_read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer_bytes = bytes.max(8 * 1024);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_clamp_inputs() {
        let o = RankOptions::default()
            .with_io_read_buffer(10)
            .with_low_memory_threshold(Some(3.0))
            .with_top_k(5);
        assert_eq!(o.read_buffer_bytes, 8 * 1024);
        assert_eq!(o.low_memory_threshold, Some(1.0));
        assert_eq!(o.top_k, 5);
        assert_eq!(o.strategy, Strategy::Sequential);
    }
}
