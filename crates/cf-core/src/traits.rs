//! # Core Traits (Ports)
//!
//! The ledger is an external collaborator. A plugin implements these traits to
//! hand the contract an atomic, transaction-scoped key-value view.

use async_trait::async_trait;

/// The per-transaction view of world state every contract operation runs
/// against. Reads observe the transaction's own earlier writes.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait StateStub: Send + Sync {
    /// Returns `None` when the key has never been written.
    async fn get_state(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;

    /// Full-record overwrite of `key`.
    async fn put_state(&self, key: &str, value: Vec<u8>) -> anyhow::Result<()>;
}

/// An open ledger transaction. Dropping it without `commit` discards every
/// write made through it.
#[async_trait]
pub trait LedgerTxn: StateStub {
    /// The transaction viewed as a plain stub, for handing to the contract.
    fn stub(&self) -> &dyn StateStub;

    async fn commit(self: Box<Self>) -> anyhow::Result<()>;
}

/// Transaction factory for a ledger backend.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn begin(&self) -> anyhow::Result<Box<dyn LedgerTxn>>;
}
