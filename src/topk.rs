//! Top-K reduction over finished accumulators.
//!
//! Ordering is count descending; equal counts fall back to ascending
//! byte-wise key order, so the same input always ranks identically
//! regardless of hash order or how the pass was scheduled.

use crate::counting::{CountMap, FlatCounts, NestedCounts};
use std::cmp::Ordering;
use time::macros::format_description;
use time::Date;

/// Busiest-day entry: the day, its most active author, and the counts used
/// to rank them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayLeader {
    pub day: String,
    pub user: String,
    /// All posts on `day`; this is what days are ranked by.
    pub posts: u64,
    /// Posts on `day` by `user`.
    pub user_posts: u64,
}

impl DayLeader {
    /// `day` as a calendar date, if it is a well-formed `YYYY-MM-DD`.
    pub fn calendar_date(&self) -> Option<Date> {
        Date::parse(&self.day, format_description!("[year]-[month]-[day]")).ok()
    }
}

#[inline]
fn rank(a: (&str, u64), b: (&str, u64)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0))
}

/// Sort `items` by `rank` and keep the first `k`, without fully sorting
/// the tail when there are many more keys than `k`.
fn select_top<T>(mut items: Vec<T>, k: usize, key: impl Fn(&T) -> (&str, u64)) -> Vec<T> {
    if k == 0 {
        return Vec::new();
    }
    let cmp = |a: &T, b: &T| rank(key(a), key(b));
    if items.len() > k {
        items.select_nth_unstable_by(k - 1, cmp);
        items.truncate(k);
    }
    items.sort_unstable_by(cmp);
    items
}

/// The `k` most frequent keys, highest count first.
/// Returns `min(k, distinct keys)` entries.
pub fn top_k_flat(counts: &FlatCounts, k: usize) -> Vec<(String, u64)> {
    let items: Vec<(&str, u64)> = counts.iter().collect();
    select_top(items, k, |&(key, n)| (key, n))
        .into_iter()
        .map(|(key, n)| (key.to_owned(), n))
        .collect()
}

/// Highest nested count; ties go to the smallest username.
fn day_winner(users: &CountMap) -> Option<(&str, u64)> {
    users
        .iter()
        .map(|(u, n)| (u.as_str(), *n))
        .min_by(|a, b| rank(*a, *b))
}

/// The `k` days with the most posts, each paired with its most active author.
pub fn top_k_days(counts: &NestedCounts, k: usize) -> Vec<DayLeader> {
    let candidates: Vec<(&str, u64, &str, u64)> = counts
        .days()
        .filter_map(|(day, total, users)| day_winner(users).map(|(user, n)| (day, total, user, n)))
        .collect();
    select_top(candidates, k, |&(day, total, _, _)| (day, total))
        .into_iter()
        .map(|(day, posts, user, user_posts)| DayLeader {
            day: day.to_owned(),
            user: user.to_owned(),
            posts,
            user_posts,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counting::Accumulator;

    fn flat(keys: &[&str]) -> FlatCounts {
        let mut acc = FlatCounts::default();
        for &k in keys {
            acc.increment(k);
        }
        acc
    }

    #[test]
    fn orders_by_count_then_key() {
        let acc = flat(&["b", "a", "c", "c", "b", "d", "d"]);
        let top = top_k_flat(&acc, 10);
        assert_eq!(
            top,
            vec![
                ("b".to_string(), 2),
                ("c".to_string(), 2),
                ("d".to_string(), 2),
                ("a".to_string(), 1),
            ]
        );
    }

    #[test]
    fn truncates_to_k_and_keeps_tie_rule() {
        let keys: Vec<String> = (0..50).map(|i| format!("k{i:02}")).collect();
        let mut acc = FlatCounts::default();
        for k in &keys {
            acc.increment(k);
        }
        acc.increment("k49");

        let top = top_k_flat(&acc, 3);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0], ("k49".to_string(), 2));
        assert_eq!(top[1], ("k00".to_string(), 1));
        assert_eq!(top[2], ("k01".to_string(), 1));
    }

    #[test]
    fn zero_k_and_empty_input() {
        assert!(top_k_flat(&flat(&["a"]), 0).is_empty());
        assert!(top_k_flat(&FlatCounts::default(), 10).is_empty());
        assert!(top_k_days(&NestedCounts::default(), 10).is_empty());
    }

    #[test]
    fn days_rank_by_total_and_pick_winner() {
        let mut acc = NestedCounts::default();
        for (d, u) in [
            ("2021-02-04", "x"),
            ("2021-02-04", "x"),
            ("2021-02-04", "y"),
            ("2021-02-05", "z"),
            ("2021-02-03", "b"),
            ("2021-02-03", "a"),
        ] {
            acc.increment((d, u));
        }
        let top = top_k_days(&acc, 10);
        let pairs: Vec<(&str, &str)> = top.iter().map(|l| (l.day.as_str(), l.user.as_str())).collect();
        // 02-03 has two single-post users: "a" wins the tie.
        assert_eq!(pairs, vec![("2021-02-04", "x"), ("2021-02-03", "a"), ("2021-02-05", "z")]);
        assert_eq!(top[0].posts, 3);
        assert_eq!(top[0].user_posts, 2);
        assert_eq!(top[0].calendar_date().unwrap().to_string(), "2021-02-04");
    }

    #[test]
    fn malformed_day_has_no_calendar_date() {
        let leader = DayLeader { day: "yesterday".into(), user: "u".into(), posts: 1, user_posts: 1 };
        assert!(leader.calendar_date().is_none());
    }
}
