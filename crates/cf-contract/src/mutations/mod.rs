//! # Mutation Operations
//!
//! Transactional state transitions. Each operation reads what it needs,
//! validates, and only then writes; a failure part-way leaves the transaction
//! to be discarded by the caller.

pub mod community;
pub mod content;
pub mod election;
pub mod moderation;
pub mod voting;
