#![allow(dead_code)]

use serde_json::json;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write raw lines (one per row, `\n`-terminated) to `dir/name`.
pub fn write_lines(dir: &Path, name: &str, lines: &[String]) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    let mut f = File::create(&path).unwrap();
    for l in lines {
        writeln!(&mut f, "{}", l).unwrap();
    }
    path
}

/// One post line in the input shape: `date`, `user.username`, `content`.
pub fn post(date: &str, user: &str, content: &str) -> String {
    json!({
        "url": "https://example.com/status/1",
        "date": date,
        "content": content,
        "user": { "username": user, "followersCount": 12 },
        "replyCount": 0,
        "likeCount": 1
    })
    .to_string()
}

/// A small but varied corpus:
/// - 4 days with distinct totals (02-04: 5, 02-05: 3, 02-03: 2, 02-06: 1)
/// - emoji with repeats inside single posts
/// - mentions with repeats, plus authors who are also mentioned
pub fn corpus_lines() -> Vec<String> {
    vec![
        post("2021-02-04T01:00:00+00:00", "alice", "farm bill 🙏🙏 @bob"),
        post("2021-02-04T02:00:00+00:00", "alice", "again @carol 😀"),
        post("2021-02-04T03:00:00+00:00", "bob", "🙏 @alice @alice"),
        post("2021-02-04T04:00:00+00:00", "carol", "no emoji here"),
        post("2021-02-04T05:00:00+00:00", "alice", "🎉 @dave"),
        post("2021-02-05T01:00:00+00:00", "dave", "😀😀 @alice"),
        post("2021-02-05T02:00:00+00:00", "erin", "☀ morning"),
        post("2021-02-05T03:00:00+00:00", "dave", "@erin 🙏"),
        post("2021-02-03T09:00:00+00:00", "zed", "first"),
        post("2021-02-03T10:00:00+00:00", "amy", "second"),
        post("2021-02-06T00:00:00+00:00", "bob", "last 🎉"),
    ]
}

/// Deterministic synthetic corpus of `n` posts over 9 days and 13 users.
pub fn synthetic_lines(n: usize) -> Vec<String> {
    let emoji = ["😀", "🙏", "🎉", "☀", "🚜", "🤝"];
    (0..n)
        .map(|i| {
            let content = format!(
                "post {i} {} {} @u{} @u{}",
                emoji[i % emoji.len()],
                emoji[(i * 7) % emoji.len()],
                (i * 5) % 13,
                (i * 3) % 17
            );
            post(
                &format!("2021-02-{:02}T{:02}:00:00+00:00", 1 + (i * 31) % 9, i % 24),
                &format!("u{}", (i * 11) % 13),
                &content,
            )
        })
        .collect()
}
