use crate::error::RecordError;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Line-level schema for one post. Extra fields are ignored by serde.
/// Every field is optional here and a value of the wrong JSON type reads as
/// absent; each analysis decides which fields it needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,    // ISO-8601, first 10 chars are the day
    #[serde(default, deserialize_with = "lenient_user")]
    pub user: Option<PostUser>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostUser {
    #[serde(default, deserialize_with = "lenient_string")]
    pub username: Option<String>,
}

impl PostRecord {
    /// Author name; an empty name counts as no author.
    #[inline]
    pub fn username(&self) -> Option<&str> {
        self.user
            .as_ref()
            .and_then(|u| u.username.as_deref())
            .filter(|u| !u.is_empty())
    }

    /// Calendar-day prefix of `date`, taken verbatim (no timezone handling).
    pub fn day(&self) -> Option<&str> {
        self.date.as_deref().map(day_prefix)
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_user<'de, D: Deserializer<'de>>(de: D) -> Result<Option<PostUser>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Object(mut map) => Some(PostUser {
            username: match map.remove("username") {
                Some(Value::String(s)) => Some(s),
                _ => None,
            },
        }),
        _ => None,
    })
}

/// First 10 characters of a timestamp, or the whole string if shorter.
pub fn day_prefix(ts: &str) -> &str {
    match ts.char_indices().nth(10) {
        Some((idx, _)) => &ts[..idx],
        None => ts,
    }
}

/// Parse a JSON line into `PostRecord` using serde_json.
/// Only a JSON object is a post; arrays and scalars are rejected.
#[inline]
pub fn parse_post(line: &str) -> Result<PostRecord, RecordError> {
    match line.trim_start().as_bytes().first() {
        Some(b'{') => Ok(serde_json::from_str(line)?),
        Some(_) => Err(RecordError::NotAnObject),
        None => Err(RecordError::Empty),
    }
}

/// Like [`parse_post`] over raw bytes; invalid UTF-8 is a line error.
#[inline]
pub fn parse_post_slice(line: &[u8]) -> Result<PostRecord, RecordError> {
    parse_post(std::str::from_utf8(line)?)
}
