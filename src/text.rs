//! Token extraction from post text: emoji code points and `@name` mentions.

use regex::Regex;
use std::sync::OnceLock;

// Emoticons, misc symbols & pictographs, transport, alchemical,
// supplemental symbols, and the BMP misc-symbols/dingbats/arrows block.
const EMOJI_PATTERN: &str = r"[\x{1F600}-\x{1F64F}\x{1F300}-\x{1F5FF}\x{1F680}-\x{1F6FF}\x{1F700}-\x{1F77F}\x{1F900}-\x{1F9FF}\x{2600}-\x{2B55}]";
const MENTION_PATTERN: &str = r"@(\w+)";

fn emoji_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMOJI_PATTERN).expect("emoji pattern compiles"))
}

fn mention_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(MENTION_PATTERN).expect("mention pattern compiles"))
}

/// Every emoji occurrence in `content`, one item per code point, in order.
pub fn emojis(content: &str) -> impl Iterator<Item = &str> + '_ {
    emoji_re().find_iter(content).map(|m| m.as_str())
}

/// Every mentioned name (without the `@`), in order, repeats included.
pub fn mentions(content: &str) -> impl Iterator<Item = &str> + '_ {
    mention_re()
        .captures_iter(content)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
}
