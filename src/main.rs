use anyhow::{Context, Result};
use postrank::{init_tracing_once, Analysis, PostRank};
use std::path::PathBuf;

const DEFAULT_INPUT: &str = "./farmers-protest-tweets-2021-2-4.json";
const CHUNK_LINES: usize = 4096;

/// usage: postrank [INPUT] [days|emojis|mentions] [WORKERS]
/// WORKERS = 1 runs sequentially, 0 uses every core.
fn main() -> Result<()> {
    init_tracing_once();
    let mut args = std::env::args().skip(1);
    let input = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_INPUT.to_string()));
    let analyses = match args.next() {
        Some(a) => vec![a.parse::<Analysis>().map_err(anyhow::Error::msg)?],
        None => vec![Analysis::Days, Analysis::Emojis, Analysis::Mentions],
    };
    let workers: usize = match args.next() {
        Some(w) => w.parse().with_context(|| format!("invalid worker count `{w}`"))?,
        None => 0,
    };

    let base = PostRank::new().progress(true);
    let rank = if workers == 1 { base.sequential() } else { base.concurrent(workers, CHUNK_LINES) };

    for analysis in analyses {
        let rank = rank.clone().progress_label(analysis.to_string());
        println!("== top {analysis} ==");
        match analysis {
            Analysis::Days => {
                for (day, user) in rank.top_days(&input).with_context(|| format!("{analysis} over {}", input.display()))? {
                    println!("{day}\t{user}");
                }
            }
            Analysis::Emojis => {
                for (emoji, n) in rank.top_emojis(&input).with_context(|| format!("{analysis} over {}", input.display()))? {
                    println!("{emoji}\t{n}");
                }
            }
            Analysis::Mentions => {
                for (user, n) in rank.top_mentions(&input).with_context(|| format!("{analysis} over {}", input.display()))? {
                    println!("{user}\t{n}");
                }
            }
        }
    }
    Ok(())
}
