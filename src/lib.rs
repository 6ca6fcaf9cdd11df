mod config;
mod error;
mod record;
mod text;
mod ndjson;
mod progress;
mod mem;
mod util;

mod counting;
mod key_extractor;
mod concurrency;
mod topk;
mod pipeline;

pub use crate::config::RankOptions;
pub use crate::error::{RankError, RecordError, Result};
pub use crate::pipeline::PostRank;

// Record model and the text collaborators used by the extractors.
pub use crate::record::{day_prefix, parse_post, parse_post_slice, PostRecord, PostUser};
pub use crate::text::{emojis, mentions};

// Accumulators, extractors and the reducer, for callers composing their own runs.
pub use crate::counting::{Accumulator, CountMap, FlatCounts, NestedCounts};
pub use crate::key_extractor::{Analysis, DailyAuthorKeys, EmojiKeys, KeyExtractor, MentionKeys};
pub use crate::topk::{top_k_days, top_k_flat, DayLeader};

// Execution strategies and the raw single-pass driver.
pub use crate::concurrency::{accumulate, RunStats, Strategy};
pub use crate::ndjson::NdjsonReader;
pub use crate::progress::ByteProgress;

pub use crate::util::init_tracing_once;
