//! Single-pass line source over an NDJSON file.

use crate::error::{RankError, Result};
use crate::mem::MemoryWatch;
use crate::progress::ByteProgress;
use crate::util::open_with_backoff;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

const THROTTLE_EVERY_LINES: u64 = 1024;

/// Buffered NDJSON reader. Lines come out once, in file order; the reader
/// never rewinds. Uses open-with-backoff for Windows-friendliness.
pub struct NdjsonReader {
    path: PathBuf,
    rdr: BufReader<File>,
    progress: ByteProgress,
    mem: Option<MemoryWatch>,
    line_no: u64,
}

impl NdjsonReader {
    /// Open `path`. Failure here is `SourceUnavailable`; nothing has been read yet.
    pub fn open(path: &Path, buf_bytes: usize) -> Result<Self> {
        let f = open_with_backoff(path, 16, 50).map_err(|source| RankError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            rdr: BufReader::with_capacity(buf_bytes.max(8 * 1024), f),
            progress: ByteProgress::disabled(),
            mem: None,
            line_no: 0,
        })
    }

    pub fn with_progress(mut self, progress: ByteProgress) -> Self {
        self.progress = progress;
        self
    }

    /// Back off (checked every `THROTTLE_EVERY_LINES` lines) while available
    /// memory is under `threshold`.
    pub fn with_memory_threshold(mut self, threshold: Option<f64>) -> Self {
        self.mem = threshold.map(MemoryWatch::new);
        self
    }

    /// 1-based number of the line most recently returned.
    pub fn line_no(&self) -> u64 {
        self.line_no
    }

    /// Read the next line's raw bytes into `buf`. Returns the number of bytes
    /// read (0 on EOF). Strips trailing `\r?\n`. No UTF-8 check happens here;
    /// a line that is not valid UTF-8 is rejected when it is parsed.
    pub fn read_line(&mut self, buf: &mut Vec<u8>) -> Result<usize> {
        if self.line_no % THROTTLE_EVERY_LINES == 0 {
            if let Some(mem) = self.mem.as_mut() {
                mem.throttle_if_low();
            }
        }
        buf.clear();
        let n = self
            .rdr
            .read_until(b'\n', buf)
            .map_err(|e| RankError::io(&self.path, e))?;
        if n == 0 {
            return Ok(0);
        }
        self.line_no += 1;
        self.progress.inc(n as u64);
        if buf.ends_with(b"\n") {
            buf.pop();
            if buf.ends_with(b"\r") {
                buf.pop();
            }
        }
        Ok(n)
    }

    /// Up to `max_lines` owned lines, or `None` once the file is exhausted.
    pub fn next_chunk(&mut self, max_lines: usize) -> Result<Option<Vec<Vec<u8>>>> {
        let max_lines = max_lines.max(1);
        let mut chunk = Vec::with_capacity(max_lines);
        let mut buf = Vec::new();
        while chunk.len() < max_lines {
            if self.read_line(&mut buf)? == 0 {
                break;
            }
            chunk.push(std::mem::take(&mut buf));
        }
        Ok(if chunk.is_empty() { None } else { Some(chunk) })
    }

    pub fn finish(&self) {
        self.progress.finish("done");
    }
}
