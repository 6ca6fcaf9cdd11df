//! Execution strategies for one counting pass: sequential, a streamed
//! producer/worker pool, or a materialized rayon fold. All three produce the
//! same accumulator contents for the same input.

use crate::counting::Accumulator;
use crate::error::{RankError, RecordError, Result};
use crate::key_extractor::KeyExtractor;
use crate::ndjson::NdjsonReader;
use crate::record::parse_post_slice;
use crate::util::resolve_workers;
use parking_lot::Mutex;
use rayon::prelude::*;
use std::sync::mpsc::{sync_channel, Receiver};
use std::sync::Arc;

/// How a pass is scheduled. `workers == 0` means available parallelism.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    /// One accumulator, updated line by line in file order.
    #[default]
    Sequential,
    /// A single reader hands chunks of `chunk_lines` lines to a fixed pool of
    /// workers over a bounded channel; each chunk goes to exactly one worker.
    /// Memory stays bounded by the channel capacity.
    Concurrent { workers: usize, chunk_lines: usize },
    /// The whole input is split into disjoint chunks before any worker starts,
    /// then folded on a dedicated rayon pool.
    Partitioned { workers: usize, chunk_lines: usize },
}

/// Line accounting for one pass.
/// `lines` includes blank lines, which are neither records nor skipped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub lines: u64,
    pub records: u64,
    pub skipped: u64,
}

impl RunStats {
    pub fn merge(&mut self, other: RunStats) {
        self.lines += other.lines;
        self.records += other.records;
        self.skipped += other.skipped;
    }
}

/// A run of consecutive lines; `first_line` is the 1-based number of `lines[0]`.
struct Batch {
    first_line: u64,
    lines: Vec<Vec<u8>>,
}

/// Parse one line and feed its keys into `acc`. Bad lines only bump `skipped`.
fn ingest_line<E: KeyExtractor>(
    extractor: &E,
    line: &[u8],
    line_no: u64,
    acc: &mut E::Acc,
    stats: &mut RunStats,
) {
    stats.lines += 1;
    if line.iter().all(u8::is_ascii_whitespace) {
        return;
    }
    let res: std::result::Result<(), RecordError> =
        parse_post_slice(line).and_then(|rec| extractor.extract_into(&rec, acc));
    match res {
        Ok(()) => stats.records += 1,
        Err(e) => {
            stats.skipped += 1;
            tracing::debug!(line = line_no, error = %e, "skipping line");
        }
    }
}

fn ingest_batch<E: KeyExtractor>(extractor: &E, batch: &Batch, acc: &mut E::Acc, stats: &mut RunStats) {
    for (i, line) in batch.lines.iter().enumerate() {
        ingest_line(extractor, line, batch.first_line + i as u64, acc, stats);
    }
}

fn next_batch(reader: &mut NdjsonReader, chunk_lines: usize) -> Result<Option<Batch>> {
    Ok(reader.next_chunk(chunk_lines)?.map(|lines| Batch {
        first_line: reader.line_no() + 1 - lines.len() as u64,
        lines,
    }))
}

/// Run one full pass over `reader` with the chosen strategy.
pub fn accumulate<E: KeyExtractor>(
    mut reader: NdjsonReader,
    extractor: &E,
    strategy: Strategy,
) -> Result<(E::Acc, RunStats)> {
    let out = match strategy {
        Strategy::Sequential => run_sequential(&mut reader, extractor),
        Strategy::Concurrent { workers, chunk_lines } => {
            run_concurrent(&mut reader, extractor, resolve_workers(workers), chunk_lines.max(1))
        }
        Strategy::Partitioned { workers, chunk_lines } => {
            run_partitioned(&mut reader, extractor, resolve_workers(workers), chunk_lines.max(1))
        }
    };
    reader.finish();
    out
}

fn run_sequential<E: KeyExtractor>(reader: &mut NdjsonReader, extractor: &E) -> Result<(E::Acc, RunStats)> {
    tracing::debug!("sequential pass");
    let mut acc = E::Acc::default();
    let mut stats = RunStats::default();
    let mut buf = Vec::with_capacity(16 * 1024);
    while reader.read_line(&mut buf)? > 0 {
        ingest_line(extractor, &buf, reader.line_no(), &mut acc, &mut stats);
    }
    Ok((acc, stats))
}

fn run_concurrent<E: KeyExtractor>(
    reader: &mut NdjsonReader,
    extractor: &E,
    workers: usize,
    chunk_lines: usize,
) -> Result<(E::Acc, RunStats)> {
    tracing::debug!(workers, chunk_lines, "concurrent pass");
    let (tx, rx) = sync_channel::<Batch>(workers * 2);
    // Only workers hold the receiver: if they all die, sends fail instead of blocking.
    let rx: Arc<Mutex<Receiver<Batch>>> = Arc::new(Mutex::new(rx));

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let rx = Arc::clone(&rx);
                s.spawn(move || {
                    let mut acc = E::Acc::default();
                    let mut stats = RunStats::default();
                    loop {
                        // Hold the lock only for the hand-off, not while counting.
                        let next = rx.lock().recv();
                        match next {
                            Ok(batch) => ingest_batch(extractor, &batch, &mut acc, &mut stats),
                            Err(_) => break,
                        }
                    }
                    (acc, stats)
                })
            })
            .collect();
        drop(rx);

        let mut produced: Result<()> = Ok(());
        loop {
            match next_batch(reader, chunk_lines) {
                Ok(Some(batch)) => {
                    if tx.send(batch).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    produced = Err(e);
                    break;
                }
            }
        }
        drop(tx);

        // Merge barrier: every partial is owned by exactly one worker until join.
        let mut total = E::Acc::default();
        let mut stats = RunStats::default();
        let mut panicked = None;
        for (id, h) in handles.into_iter().enumerate() {
            match h.join() {
                Ok((acc, st)) => {
                    total.merge(acc);
                    stats.merge(st);
                }
                Err(_) => {
                    tracing::error!(worker = id, "worker panicked");
                    panicked.get_or_insert(id);
                }
            }
        }
        if let Some(id) = panicked {
            return Err(RankError::WorkerPanicked(id));
        }
        produced?;
        Ok((total, stats))
    })
}

fn run_partitioned<E: KeyExtractor>(
    reader: &mut NdjsonReader,
    extractor: &E,
    workers: usize,
    chunk_lines: usize,
) -> Result<(E::Acc, RunStats)> {
    let mut batches = Vec::new();
    while let Some(batch) = next_batch(reader, chunk_lines)? {
        batches.push(batch);
    }
    tracing::debug!(workers, chunk_lines, batches = batches.len(), "partitioned pass");

    let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;
    let out = pool.install(|| {
        batches
            .par_iter()
            .map(|batch| {
                let mut acc = E::Acc::default();
                let mut stats = RunStats::default();
                ingest_batch(extractor, batch, &mut acc, &mut stats);
                (acc, stats)
            })
            .reduce(
                || (E::Acc::default(), RunStats::default()),
                |(mut acc, mut stats), (other, other_stats)| {
                    acc.merge(other);
                    stats.merge(other_stats);
                    (acc, stats)
                },
            )
    });
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counting::FlatCounts;
    use crate::key_extractor::{DailyAuthorKeys, MentionKeys};
    use std::io::Write;
    use std::path::PathBuf;

    fn fixture(lines: &[String]) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.jsonl");
        let mut f = std::fs::File::create(&path).unwrap();
        for l in lines {
            writeln!(f, "{l}").unwrap();
        }
        (dir, path)
    }

    fn posts(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| {
                serde_json::json!({
                    "date": format!("2021-02-{:02}T08:00:00+00:00", 1 + i % 5),
                    "user": {"username": format!("u{}", i % 7)},
                    "content": format!("hi @u{} and @u{}", i % 3, i % 11),
                })
                .to_string()
            })
            .collect()
    }

    fn run<E: KeyExtractor>(path: &PathBuf, ex: &E, strategy: Strategy) -> (E::Acc, RunStats) {
        accumulate(NdjsonReader::open(path, 0).unwrap(), ex, strategy).unwrap()
    }

    #[test]
    fn strategies_agree_on_flat_counts() {
        let mut lines = posts(200);
        lines.insert(17, "{broken".to_string());
        lines.insert(50, String::new());
        let (_dir, path) = fixture(&lines);

        let (seq, seq_stats): (FlatCounts, _) = run(&path, &MentionKeys, Strategy::Sequential);
        for workers in [1, 2, 3, 8] {
            for chunk_lines in [1, 7, 64, 1000] {
                let (conc, conc_stats) = run(&path, &MentionKeys, Strategy::Concurrent { workers, chunk_lines });
                assert_eq!(conc, seq, "concurrent workers={workers} chunk={chunk_lines}");
                assert_eq!(conc_stats, seq_stats);
                let (part, part_stats) = run(&path, &MentionKeys, Strategy::Partitioned { workers, chunk_lines });
                assert_eq!(part, seq, "partitioned workers={workers} chunk={chunk_lines}");
                assert_eq!(part_stats, seq_stats);
            }
        }
        assert_eq!(seq_stats, RunStats { lines: 202, records: 200, skipped: 1 });
    }

    #[test]
    fn strategies_agree_on_nested_counts() {
        let (_dir, path) = fixture(&posts(120));
        let (seq, _) = run(&path, &DailyAuthorKeys, Strategy::Sequential);
        let (conc, _) = run(&path, &DailyAuthorKeys, Strategy::Concurrent { workers: 4, chunk_lines: 5 });
        let (part, _) = run(&path, &DailyAuthorKeys, Strategy::Partitioned { workers: 0, chunk_lines: 9 });
        assert!(seq.is_consistent());
        assert_eq!(conc, seq);
        assert_eq!(part, seq);
    }

    #[test]
    fn invalid_utf8_lines_are_skipped_not_mangled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.jsonl");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"{\"user\":{\"username\":\"al\xffice\"},\"content\":\"@bob\"}\n").unwrap();
        f.write_all(b"{\"user\":{\"username\":\"carol\"}}\n").unwrap();
        drop(f);

        for strategy in [
            Strategy::Sequential,
            Strategy::Concurrent { workers: 2, chunk_lines: 1 },
            Strategy::Partitioned { workers: 2, chunk_lines: 1 },
        ] {
            let (acc, stats) = run(&path, &MentionKeys, strategy);
            assert_eq!(stats, RunStats { lines: 2, records: 1, skipped: 1 });
            assert_eq!(acc.get("carol"), 1);
            assert_eq!(acc.get("bob"), 0);
            assert_eq!(acc.distinct_keys(), 1);
        }
    }

    #[test]
    fn empty_input_yields_empty_accumulator() {
        let (_dir, path) = fixture(&[]);
        for strategy in [
            Strategy::Sequential,
            Strategy::Concurrent { workers: 2, chunk_lines: 4 },
            Strategy::Partitioned { workers: 2, chunk_lines: 4 },
        ] {
            let (acc, stats) = run(&path, &MentionKeys, strategy);
            assert!(acc.is_empty());
            assert_eq!(stats, RunStats::default());
        }
    }
}
