//! chainforum/crates/cf-core/src/lib.rs
//!
//! The entity schemas, typed identifiers and ledger port definitions shared by
//! every chainforum crate.

pub mod error;
pub mod ids;
pub mod models;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use ids::*;
pub use models::*;
pub use traits::*;
