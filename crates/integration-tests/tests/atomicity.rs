use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use cf_contract::{Gateway, SmartContract};
use cf_core::error::{EntityKind, ForumError};
use cf_core::traits::{Ledger, LedgerTxn, MockStateStub, StateStub};
use cf_ledger_memory::MemoryLedger;
use cf_ledger_sqlite::SqliteLedger;
use integration_tests::{community, forum, fresh, user, T0};

#[tokio::test]
async fn missing_references_write_nothing() {
    let (gateway, ledger) = forum().await;

    assert!(matches!(
        gateway.create_post("p1", T0, "co1", "t", "c", "ghost").await,
        Err(ForumError::NotFound { kind: EntityKind::User, .. })
    ));
    assert!(matches!(
        gateway.create_comment("c1", T0, "p404", "x", "u1").await,
        Err(ForumError::NotFound { kind: EntityKind::Post, .. })
    ));
    gateway.create_post("p2", T0, "co1", "t", "c", "u1").await.unwrap();
    let before = ledger.len();
    assert!(matches!(
        gateway.create_comment("c2", T0, "p2", "x", "ghost").await,
        Err(ForumError::NotFound { kind: EntityKind::User, .. })
    ));
    assert!(ledger.committed("c2").is_none());
    assert!(integration_tests::post(&ledger, "p2").comments.is_empty());
    assert!(matches!(
        gateway.create_community("co2", T0, "x", "", "ghost").await,
        Err(ForumError::NotFound { kind: EntityKind::User, .. })
    ));

    assert_eq!(ledger.len(), before);
    assert!(ledger.committed("p1").is_none());
    assert!(ledger.committed("co2").is_none());
    assert_eq!(community(&ledger, "co1").posts, vec!["p2".to_string()]);
}

/// Wraps a memory transaction and fails every write to one key.
struct FailingTxn {
    inner: Box<dyn LedgerTxn>,
    poisoned: &'static str,
}

#[async_trait]
impl StateStub for FailingTxn {
    async fn get_state(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        self.inner.get_state(key).await
    }

    async fn put_state(&self, key: &str, value: Vec<u8>) -> anyhow::Result<()> {
        if key == self.poisoned {
            return Err(anyhow!("disk full"));
        }
        self.inner.put_state(key, value).await
    }
}

#[async_trait]
impl LedgerTxn for FailingTxn {
    fn stub(&self) -> &dyn StateStub {
        self
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        self.inner.commit().await
    }
}

struct FailingLedger {
    inner: MemoryLedger,
    poisoned: &'static str,
}

#[async_trait]
impl Ledger for FailingLedger {
    async fn begin(&self) -> anyhow::Result<Box<dyn LedgerTxn>> {
        Ok(Box::new(FailingTxn { inner: self.inner.begin().await?, poisoned: self.poisoned }))
    }
}

#[tokio::test]
async fn write_failure_mid_operation_rolls_back_earlier_writes() {
    let (setup, ledger) = forum().await;
    setup.create_post("p1", T0, "co1", "t", "c", "u2").await.unwrap();

    // The vote writes the author (u2) before the post; the post write fails.
    let gateway = Gateway::new(Arc::new(FailingLedger { inner: ledger.clone(), poisoned: "p1" }));
    let err = gateway.up_vote("p1", "u1").await.unwrap_err();
    assert!(matches!(err, ForumError::Write { ref key, .. } if key == "p1"));

    assert_eq!(user(&ledger, "u2").reputation, 0);
    assert_eq!(integration_tests::post(&ledger, "p1").state.score, 0);
}

#[tokio::test]
async fn conflicting_transactions_cannot_both_commit() {
    let (_gateway, ledger) = forum().await;
    let contract = SmartContract::new();

    let first = ledger.begin().await.unwrap();
    let second = ledger.begin().await.unwrap();
    contract.join_community(first.stub(), "co1", "u3").await.unwrap();
    contract.unjoin_community(second.stub(), "co1", "u2").await.unwrap();

    first.commit().await.unwrap();
    assert!(second.commit().await.is_err());

    let members = community(&ledger, "co1").users;
    assert!(members.contains(&"u2".to_string()));
    assert!(members.contains(&"u3".to_string()));
}

#[tokio::test]
async fn read_failures_surface_as_errors() {
    let mut stub = MockStateStub::new();
    stub.expect_get_state().returning(|_| Err(anyhow!("peer unavailable")));
    let contract = SmartContract::new();

    let err = contract.get_user_feed(&stub, "u1", 0).await.unwrap_err();
    assert!(matches!(err, ForumError::Read { ref key, .. } if key == "u1"));
}

#[tokio::test]
async fn sqlite_ledger_runs_the_contract() {
    let gateway = Gateway::new(Arc::new(SqliteLedger::new("sqlite::memory:").await.unwrap()));
    gateway.create_user("u1", "alice", "a@x").await.unwrap();
    gateway.create_community("co1", T0, "rust", "", "u1").await.unwrap();
    gateway.create_post("p1", T0, "co1", "t", "c", "u1").await.unwrap();

    assert!(gateway.create_post("p1", T0, "co1", "t", "c", "u1").await.is_err());
    let posts = gateway.get_community_posts("co1", 0, "u1").await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].community_name, "rust");
}

#[tokio::test]
async fn fresh_ledger_has_no_communities() {
    let (gateway, ledger) = fresh();
    assert!(gateway.list_communities().await.unwrap().is_empty());
    assert!(ledger.is_empty());
}
