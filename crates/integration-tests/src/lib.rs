//! Shared fixtures for the cross-crate scenario tests.

use std::sync::Arc;

use cf_contract::Gateway;
use cf_core::models::{Community, Post, User};
use cf_core::traits::{Ledger, StateStub};
use cf_ledger_memory::MemoryLedger;

pub const T0: &str = "2024-01-01T00:00:00.000Z";

/// Timestamp `minute` minutes after [`T0`].
pub fn at(minute: u32) -> String {
    format!("2024-01-01T{:02}:{:02}:00.000Z", minute / 60, minute % 60)
}

/// A gateway over a fresh in-memory ledger, plus a handle on that ledger
/// for inspecting committed state.
pub fn fresh() -> (Gateway, MemoryLedger) {
    let ledger = MemoryLedger::new();
    (Gateway::new(Arc::new(ledger.clone())), ledger)
}

/// `u1` (alice) creates `co1`; `u2` (bob) has joined; `u3` (carol) has not.
pub async fn forum() -> (Gateway, MemoryLedger) {
    let (gateway, ledger) = fresh();
    gateway.create_user("u1", "alice", "alice@example.com").await.unwrap();
    gateway.create_user("u2", "bob", "bob@example.com").await.unwrap();
    gateway.create_user("u3", "carol", "carol@example.com").await.unwrap();
    gateway
        .create_community("co1", T0, "rust", "All things Rust", "u1")
        .await
        .unwrap();
    gateway.join_community("co1", "u2").await.unwrap();
    (gateway, ledger)
}

/// Decodes a committed record straight from the ledger.
pub fn committed<T: serde::de::DeserializeOwned>(ledger: &MemoryLedger, key: &str) -> Option<T> {
    ledger
        .committed(key)
        .map(|bytes| serde_json::from_slice(&bytes).unwrap())
}

pub fn user(ledger: &MemoryLedger, id: &str) -> User {
    committed(ledger, id).unwrap()
}

pub fn community(ledger: &MemoryLedger, id: &str) -> Community {
    committed(ledger, id).unwrap()
}

pub fn post(ledger: &MemoryLedger, id: &str) -> Post {
    committed(ledger, id).unwrap()
}

/// Commits a raw record outside the contract, for setting up states the
/// operations themselves never produce.
pub async fn overwrite<T: serde::Serialize>(ledger: &MemoryLedger, key: &str, record: &T) {
    let txn = ledger.begin().await.unwrap();
    txn.put_state(key, serde_json::to_vec(record).unwrap()).await.unwrap();
    txn.commit().await.unwrap();
}
