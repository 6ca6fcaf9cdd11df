use crate::counting::{Accumulator, FlatCounts, NestedCounts};
use crate::error::RecordError;
use crate::record::PostRecord;
use crate::text;
use std::fmt;
use std::str::FromStr;

/// Turns one record into the keys it contributes, feeding them into the
/// accumulator shape this extractor is bound to.
///
/// A record missing a field the analysis needs is rejected with
/// `RecordError::MissingField` before any key is emitted, so a skipped
/// record never leaves partial counts behind.
pub trait KeyExtractor: Sync {
    type Acc: Accumulator;

    fn extract_into(&self, rec: &PostRecord, acc: &mut Self::Acc) -> Result<(), RecordError>;
}

/// `(day, author)`: exactly one key per record.
#[derive(Clone, Copy, Debug, Default)]
pub struct DailyAuthorKeys;

/// One key per emoji occurrence in `content`.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmojiKeys;

/// The author once, plus one key per `@name` in `content`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MentionKeys;

impl KeyExtractor for DailyAuthorKeys {
    type Acc = NestedCounts;

    fn extract_into(&self, rec: &PostRecord, acc: &mut NestedCounts) -> Result<(), RecordError> {
        let day = rec.day().ok_or(RecordError::MissingField("date"))?;
        let user = rec.username().ok_or(RecordError::MissingField("user.username"))?;
        acc.increment((day, user));
        Ok(())
    }
}

impl KeyExtractor for EmojiKeys {
    type Acc = FlatCounts;

    fn extract_into(&self, rec: &PostRecord, acc: &mut FlatCounts) -> Result<(), RecordError> {
        let content = rec.content.as_deref().ok_or(RecordError::MissingField("content"))?;
        for emoji in text::emojis(content) {
            acc.increment(emoji);
        }
        Ok(())
    }
}

impl KeyExtractor for MentionKeys {
    type Acc = FlatCounts;

    fn extract_into(&self, rec: &PostRecord, acc: &mut FlatCounts) -> Result<(), RecordError> {
        let author = rec.username().ok_or(RecordError::MissingField("user.username"))?;
        acc.increment(author);
        // A post without text still counts for its author.
        if let Some(content) = rec.content.as_deref() {
            for name in text::mentions(content) {
                acc.increment(name);
            }
        }
        Ok(())
    }
}

/// The three analyses, by name. Used by the binary to pick one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Analysis {
    Days,
    Emojis,
    Mentions,
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Analysis::Days => "days",
            Analysis::Emojis => "emojis",
            Analysis::Mentions => "mentions",
        };
        f.write_str(s)
    }
}

impl FromStr for Analysis {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "days" | "dates" | "q1" => Ok(Analysis::Days),
            "emojis" | "emoji" | "q2" => Ok(Analysis::Emojis),
            "mentions" | "users" | "q3" => Ok(Analysis::Mentions),
            other => Err(format!("unknown analysis `{other}` (expected days, emojis or mentions)")),
        }
    }
}
