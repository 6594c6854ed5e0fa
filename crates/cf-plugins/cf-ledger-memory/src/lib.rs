//! # cf-ledger-memory
//!
//! An in-process implementation of the `Ledger` port. Committed state is a
//! versioned key-value map; each transaction buffers its writes and records the
//! version of every key it read. Commit re-checks those versions under a
//! single lock and refuses to apply the write set if any of them moved, so two
//! conflicting transactions can never both commit. Reads share that lock, so a
//! reader sees either all of a commit's writes or none of them.

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use cf_core::traits::{Ledger, LedgerTxn, StateStub};
use dashmap::DashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Versioned {
    version: u64,
    value: Vec<u8>,
}

#[derive(Default)]
struct WorldState {
    keys: DashMap<String, Versioned>,
    /// Held exclusively while a write set is applied.
    commit_lock: RwLock<()>,
}

impl WorldState {
    fn version_of(&self, key: &str) -> u64 {
        self.keys.get(key).map(|v| v.version).unwrap_or(0)
    }
}

/// Cheap to clone; clones share the same world state.
#[derive(Clone, Default)]
pub struct MemoryLedger {
    state: Arc<WorldState>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads committed state directly, outside any transaction.
    pub fn committed(&self, key: &str) -> Option<Vec<u8>> {
        self.state.keys.get(key).map(|v| v.value.clone())
    }

    /// Number of keys that have ever been committed.
    pub fn len(&self) -> usize {
        self.state.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.keys.is_empty()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn begin(&self) -> anyhow::Result<Box<dyn LedgerTxn>> {
        Ok(Box::new(MemoryTxn {
            state: Arc::clone(&self.state),
            reads: DashMap::new(),
            writes: DashMap::new(),
        }))
    }
}

pub struct MemoryTxn {
    state: Arc<WorldState>,
    /// Version observed at first read; 0 means "absent".
    reads: DashMap<String, u64>,
    writes: DashMap<String, Vec<u8>>,
}

#[async_trait]
impl StateStub for MemoryTxn {
    async fn get_state(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        if let Some(pending) = self.writes.get(key) {
            return Ok(Some(pending.clone()));
        }
        let current = {
            let _guard = self.state.commit_lock.read().await;
            self.state.keys.get(key).map(|v| v.value().clone())
        };
        let version = current.as_ref().map(|v| v.version).unwrap_or(0);
        self.reads.entry(key.to_string()).or_insert(version);
        Ok(current.map(|v| v.value))
    }

    async fn put_state(&self, key: &str, value: Vec<u8>) -> anyhow::Result<()> {
        if key.is_empty() {
            return Err(anyhow!("empty key"));
        }
        self.writes.insert(key.to_string(), value);
        Ok(())
    }
}

#[async_trait]
impl LedgerTxn for MemoryTxn {
    fn stub(&self) -> &dyn StateStub {
        self
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        let MemoryTxn { state, reads, writes } = *self;
        let _guard = state.commit_lock.write().await;

        for read in reads.iter() {
            let now = state.version_of(read.key());
            if now != *read.value() {
                return Err(anyhow!(
                    "read conflict on key {}: read version {}, committed version {}",
                    read.key(),
                    read.value(),
                    now
                ));
            }
        }

        let count = writes.len();
        for (key, value) in writes.into_iter() {
            let version = state.version_of(&key) + 1;
            state.keys.insert(key, Versioned { version, value });
        }
        log::debug!("memory ledger committed {} key(s)", count);
        Ok(())
    }
}
