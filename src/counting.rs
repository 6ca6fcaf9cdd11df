//! Frequency accumulators: a flat key→count table and the nested
//! day→(user→count) table with per-day totals. Both merge by key-wise sum.

use ahash::RandomState;
use std::collections::HashMap;

pub type CountMap = HashMap<String, u64, RandomState>;

/// Counting state built during one pass. Implementations must make `merge`
/// associative and commutative, with `Default` as the identity.
pub trait Accumulator: Default + Send {
    /// Borrowed key shape accepted by `increment`.
    type Key<'a>;

    fn increment(&mut self, key: Self::Key<'_>);
    fn merge(&mut self, other: Self);
    fn distinct_keys(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.distinct_keys() == 0
    }
}

/// Flat `key -> count`. Absent keys count 0; present keys are always >= 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatCounts {
    counts: CountMap,
}

impl FlatCounts {
    pub fn get(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

impl Accumulator for FlatCounts {
    type Key<'a> = &'a str;

    #[inline]
    fn increment(&mut self, key: Self::Key<'_>) {
        bump(&mut self.counts, key);
    }

    fn merge(&mut self, other: Self) {
        if self.counts.len() < other.counts.len() {
            let mine = std::mem::replace(&mut self.counts, other.counts);
            merge_maps(&mut self.counts, mine);
        } else {
            merge_maps(&mut self.counts, other.counts);
        }
    }

    fn distinct_keys(&self) -> usize {
        self.counts.len()
    }
}

// Avoids allocating for keys already present.
#[inline]
fn bump(map: &mut CountMap, key: &str) {
    if let Some(c) = map.get_mut(key) {
        *c += 1;
    } else {
        map.insert(key.to_owned(), 1);
    }
}

fn merge_maps(total: &mut CountMap, part: CountMap) {
    for (k, v) in part {
        *total.entry(k).or_insert(0) += v;
    }
}

/// Per-day user counts plus the per-day total.
///
/// Invariant: `totals[d] == nested[d].values().sum()` for every day `d`.
/// Both sides only change together, through `increment` and `merge`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NestedCounts {
    nested: HashMap<String, CountMap, RandomState>,
    totals: CountMap,
}

impl NestedCounts {
    pub fn total(&self, day: &str) -> u64 {
        self.totals.get(day).copied().unwrap_or(0)
    }

    pub fn user_count(&self, day: &str, user: &str) -> u64 {
        self.nested
            .get(day)
            .and_then(|m| m.get(user))
            .copied()
            .unwrap_or(0)
    }

    /// `(day, total, users)` for every day present.
    pub fn days(&self) -> impl Iterator<Item = (&str, u64, &CountMap)> {
        self.nested.iter().map(|(day, users)| {
            let total = self.totals.get(day).copied().unwrap_or(0);
            (day.as_str(), total, users)
        })
    }

    /// Recompute every day's total from its nested counts and compare.
    pub fn is_consistent(&self) -> bool {
        self.nested.len() == self.totals.len()
            && self
                .nested
                .iter()
                .all(|(day, users)| self.totals.get(day).copied() == Some(users.values().sum()))
    }
}

impl Accumulator for NestedCounts {
    type Key<'a> = (&'a str, &'a str);

    fn increment(&mut self, (day, user): Self::Key<'_>) {
        if let Some(users) = self.nested.get_mut(day) {
            bump(users, user);
        } else {
            let mut users = CountMap::default();
            users.insert(user.to_owned(), 1);
            self.nested.insert(day.to_owned(), users);
        }
        bump(&mut self.totals, day);
    }

    fn merge(&mut self, other: Self) {
        for (day, users) in other.nested {
            match self.nested.get_mut(&day) {
                Some(mine) => merge_maps(mine, users),
                None => {
                    self.nested.insert(day, users);
                }
            }
        }
        merge_maps(&mut self.totals, other.totals);
        debug_assert!(self.is_consistent(), "day totals drifted from user counts");
    }

    fn distinct_keys(&self) -> usize {
        self.nested.len()
    }
}
