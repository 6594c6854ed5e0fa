//! # Typed identifiers
//!
//! Every record lives under its ID in one flat key space, so IDs double as
//! type tags: posts start with `p`, comments with `c`, machine-minted
//! communities with `co`. [`ItemRef`] resolves that convention once at the
//! boundary so operations match on a variant instead of re-inspecting strings.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{EntityKind, ForumError, Result};

pub const POST_PREFIX: &str = "p";
pub const COMMENT_PREFIX: &str = "c";
pub const COMMUNITY_PREFIX: &str = "co";

/// Millisecond-precision UTC layout used on the wire (`2006-01-02T15:04:05.000Z`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// A reference to a post or a comment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemRef {
    Post(String),
    Comment(String),
}

impl ItemRef {
    /// Classifies an ID by prefix. `co…` is a community, never a comment.
    pub fn parse(id: &str) -> Result<Self> {
        if id.starts_with(POST_PREFIX) {
            Ok(ItemRef::Post(id.to_string()))
        } else if id.starts_with(COMMENT_PREFIX) && !id.starts_with(COMMUNITY_PREFIX) {
            Ok(ItemRef::Comment(id.to_string()))
        } else {
            Err(ForumError::InvalidArgument(format!(
                "{id:?} is neither a post nor a comment ID"
            )))
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ItemRef::Post(id) | ItemRef::Comment(id) => id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            ItemRef::Post(_) => EntityKind::Post,
            ItemRef::Comment(_) => EntityKind::Comment,
        }
    }

    pub fn is_post(&self) -> bool {
        matches!(self, ItemRef::Post(_))
    }
}

impl FromStr for ItemRef {
    type Err = ForumError;

    fn from_str(s: &str) -> Result<Self> {
        ItemRef::parse(s)
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Checks that `id` carries the prefix for `kind` before a record is created.
pub fn ensure_prefix(kind: EntityKind, id: &str) -> Result<()> {
    let ok = match kind {
        EntityKind::Post => matches!(ItemRef::parse(id), Ok(ItemRef::Post(_))),
        EntityKind::Comment => matches!(ItemRef::parse(id), Ok(ItemRef::Comment(_))),
        // Users and communities are never resolved by prefix.
        EntityKind::User | EntityKind::Community => !id.is_empty() && id != crate::models::METADATA_KEY,
        EntityKind::MetaData => id == crate::models::METADATA_KEY,
    };
    if ok {
        Ok(())
    } else {
        Err(ForumError::InvalidArgument(format!("{id:?} is not a valid {kind} ID")))
    }
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ForumError::InvalidArgument(format!("bad timestamp {raw:?}: {e}")))
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Serde adapter that stores timestamps in [`TIMESTAMP_FORMAT`] and reads
/// any RFC 3339 form, including records written without milliseconds.
pub mod ledger_time {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(*at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(de::Error::custom)
    }
}

/// Mints `<prefix><timestamp>_<uuid v7>`, the ID shape the gateway hands to
/// create operations.
pub fn mint_id(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{prefix}{}_{}", format_timestamp(at), Uuid::now_v7())
}
