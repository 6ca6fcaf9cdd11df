use crate::concurrency::{self, RunStats, Strategy};
use crate::config::RankOptions;
use crate::counting::Accumulator;
use crate::error::Result;
use crate::key_extractor::{DailyAuthorKeys, EmojiKeys, KeyExtractor, MentionKeys};
use crate::ndjson::NdjsonReader;
use crate::progress::ByteProgress;
use crate::topk::{top_k_days, top_k_flat, DayLeader};
use crate::util::init_tracing_once;
use std::path::Path;

/// Entry point: configure once, then run any of the analyses over a file.
/// Every analysis is a single fresh pass; nothing is cached between calls.
#[derive(Clone, Debug, Default)]
pub struct PostRank {
    pub(crate) opts: RankOptions,
}

impl PostRank {
    pub fn new() -> Self {
        Self { opts: RankOptions::default() }
    }

    pub fn with_options(opts: RankOptions) -> Self {
        Self { opts }
    }

    // -------- Builder methods --------
    pub fn top_k(mut self, k: usize) -> Self { self.opts = self.opts.with_top_k(k); self }
    pub fn strategy(mut self, strategy: Strategy) -> Self { self.opts = self.opts.with_strategy(strategy); self }
    pub fn sequential(self) -> Self { self.strategy(Strategy::Sequential) }
    pub fn concurrent(self, workers: usize, chunk_lines: usize) -> Self { self.strategy(Strategy::Concurrent { workers, chunk_lines }) }
    pub fn partitioned(self, workers: usize, chunk_lines: usize) -> Self { self.strategy(Strategy::Partitioned { workers, chunk_lines }) }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_progress_label(label); self }
    pub fn low_memory_threshold(mut self, threshold: Option<f64>) -> Self { self.opts = self.opts.with_low_memory_threshold(threshold); self }
    pub fn io_read_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_io_read_buffer(bytes); self }

    pub fn options(&self) -> &RankOptions {
        &self.opts
    }

    // -------- Analyses --------

    /// The busiest days, each with its most active author, busiest first.
    pub fn top_days(&self, path: &Path) -> Result<Vec<(String, String)>> {
        Ok(self
            .top_day_leaders(path)?
            .into_iter()
            .map(|l| (l.day, l.user))
            .collect())
    }

    /// Like `top_days`, keeping the per-day and per-author counts.
    pub fn top_day_leaders(&self, path: &Path) -> Result<Vec<DayLeader>> {
        let (acc, _) = self.accumulate(path, &DailyAuthorKeys)?;
        Ok(top_k_days(&acc, self.opts.top_k))
    }

    /// Most frequent emoji with their occurrence counts.
    pub fn top_emojis(&self, path: &Path) -> Result<Vec<(String, u64)>> {
        let (acc, _) = self.accumulate(path, &EmojiKeys)?;
        Ok(top_k_flat(&acc, self.opts.top_k))
    }

    /// Most referenced usernames: one per authored post plus one per `@mention`.
    pub fn top_mentions(&self, path: &Path) -> Result<Vec<(String, u64)>> {
        let (acc, _) = self.accumulate(path, &MentionKeys)?;
        Ok(top_k_flat(&acc, self.opts.top_k))
    }

    /// One pass over `path` with any extractor; returns the merged accumulator.
    pub fn accumulate<E: KeyExtractor>(&self, path: &Path, extractor: &E) -> Result<(E::Acc, RunStats)> {
        init_tracing_once();

        let progress = if self.opts.progress {
            ByteProgress::for_file(path, self.opts.progress_label.as_deref())
        } else {
            ByteProgress::disabled()
        };
        let reader = NdjsonReader::open(path, self.opts.read_buffer_bytes)?
            .with_progress(progress)
            .with_memory_threshold(self.opts.low_memory_threshold);

        tracing::info!(path = %path.display(), strategy = ?self.opts.strategy, "counting");
        let (acc, stats) = concurrency::accumulate(reader, extractor, self.opts.strategy)?;
        tracing::info!(
            lines = stats.lines,
            records = stats.records,
            skipped = stats.skipped,
            distinct_keys = acc.distinct_keys(),
            "pass complete"
        );
        if stats.skipped > 0 {
            tracing::warn!("Skipped {} malformed or incomplete lines.", stats.skipped);
        }
        Ok((acc, stats))
    }
}
