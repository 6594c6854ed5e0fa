//! # ForumError
//!
//! Centralized error handling for the chainforum ecosystem.
//! Every contract operation fails with one of these; the gateway rolls the
//! surrounding ledger transaction back on any of them.

use std::fmt;

use thiserror::Error;

/// The kinds of record stored on the ledger. Used to label lookups in errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Community,
    Post,
    Comment,
    MetaData,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::User => "User",
            EntityKind::Community => "Community",
            EntityKind::Post => "Post",
            EntityKind::Comment => "Comment",
            EntityKind::MetaData => "MetaData",
        };
        f.write_str(name)
    }
}

/// The primary error type for all chainforum operations.
#[derive(Error, Debug)]
pub enum ForumError {
    /// Referenced User/Community/Post/Comment is absent from the ledger.
    #[error("{kind} with ID {id} doesn't exist")]
    NotFound { kind: EntityKind, id: String },

    /// A create call hit an ID that is already occupied.
    #[error("{kind} with ID {id} already exists")]
    AlreadyExists { kind: EntityKind, id: String },

    /// Application-level authorization failure (not author, not moderator,
    /// not a community member).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A moderator tried to cast a second hide/show vote on the same item.
    #[error("user {user} already voted on {item}")]
    AlreadyVoted { item: String, user: String },

    /// Malformed input (bad ID prefix, unparsable timestamp).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The underlying store failed to read a key.
    #[error("failed to read {key} from ledger: {source}")]
    Read {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// The underlying store failed to write a key.
    #[error("failed to write {key} to ledger: {source}")]
    Write {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// A stored record could not be (de)serialized.
    #[error("malformed record at {key}: {source}")]
    Codec {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// No transaction could be opened on the ledger.
    #[error("ledger unavailable: {0}")]
    Unavailable(#[source] anyhow::Error),

    /// The ledger refused to commit the transaction (conflict or I/O).
    #[error("transaction failed to commit: {0}")]
    Commit(#[source] anyhow::Error),

    /// Several independent reads of a fan-out failed.
    #[error("{} of the fan-out reads failed; first: {}", .0.len(), .0.first().map(|e| e.to_string()).unwrap_or_default())]
    Aggregate(Vec<ForumError>),
}

impl ForumError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        ForumError::NotFound { kind, id: id.into() }
    }

    pub fn already_exists(kind: EntityKind, id: impl Into<String>) -> Self {
        ForumError::AlreadyExists { kind, id: id.into() }
    }
}

/// A specialized Result type for chainforum logic.
pub type Result<T> = std::result::Result<T, ForumError>;
