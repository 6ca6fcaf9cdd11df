//! Byte-based progress reporting for a single input file.

use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;

/// Byte progress over one input. Disabled instances are no-ops, so callers
/// never branch on whether progress is enabled.
#[derive(Clone)]
pub struct ByteProgress {
    pb: Option<ProgressBar>,
}

impl ByteProgress {
    pub fn disabled() -> Self {
        Self { pb: None }
    }

    /// Bar sized from the file's length on disk (0 if metadata is unavailable).
    pub fn for_file(path: &Path, label: Option<&str>) -> Self {
        let total = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} {msg} {bytes:>10}/{total_bytes:<10} [{bar:.cyan/blue}] {percent:>3}%  \
             {bytes_per_sec}  elapsed: {elapsed_precise}  eta: {eta_precise}",
        ) {
            pb.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
        }
        if let Some(msg) = label {
            pb.set_message(msg.to_string());
        }
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { pb: Some(pb) }
    }

    #[inline]
    pub fn inc(&self, bytes: u64) {
        if let Some(pb) = &self.pb {
            pb.inc(bytes);
        }
    }

    pub fn finish(&self, msg: &str) {
        if let Some(pb) = &self.pb {
            pb.finish_with_message(msg.to_string());
        }
    }
}
