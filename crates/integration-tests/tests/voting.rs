use cf_core::error::{EntityKind, ForumError};
use integration_tests::{forum, post, user, T0};

#[tokio::test]
async fn vote_switch_scenario() {
    let (gateway, ledger) = forum().await;
    gateway.create_post("p1", T0, "co1", "Hello", "first", "u2").await.unwrap();
    assert_eq!(post(&ledger, "p1").state.score, 0);

    assert!(gateway.up_vote("p1", "u1").await.unwrap());
    assert_eq!(post(&ledger, "p1").state.score, 1);
    assert_eq!(user(&ledger, "u2").reputation, 1);

    assert!(!gateway.up_vote("p1", "u1").await.unwrap());
    assert_eq!(post(&ledger, "p1").state.score, 1);

    assert!(gateway.down_vote("p1", "u1").await.unwrap());
    let p1 = post(&ledger, "p1");
    assert_eq!(p1.state.score, -1);
    assert_eq!(user(&ledger, "u2").reputation, -1);
    assert!(p1.state.up_vote.is_empty());
    assert_eq!(p1.state.down_vote, vec!["u1".to_string()]);
}

#[tokio::test]
async fn undo_restores_score_and_reputation() {
    let (gateway, ledger) = forum().await;
    gateway.create_post("p1", T0, "co1", "t", "c", "u2").await.unwrap();

    gateway.up_vote("p1", "u3").await.unwrap();
    gateway.undo_up_vote("p1", "u3").await.unwrap();
    assert_eq!(post(&ledger, "p1").state.score, 0);
    assert_eq!(user(&ledger, "u2").reputation, 0);

    gateway.down_vote("p1", "u3").await.unwrap();
    gateway.undo_down_vote("p1", "u3").await.unwrap();
    assert_eq!(post(&ledger, "p1").state.score, 0);
    assert_eq!(user(&ledger, "u2").reputation, 0);
}

#[tokio::test]
async fn voter_never_in_both_lists() {
    let (gateway, ledger) = forum().await;
    gateway.create_post("p1", T0, "co1", "t", "c", "u1").await.unwrap();

    let sequence = [
        ("up", "u2"),
        ("down", "u2"),
        ("up", "u3"),
        ("up", "u2"),
        ("down", "u3"),
        ("undo_down", "u3"),
        ("down", "u2"),
    ];
    for (action, voter) in sequence {
        match action {
            "up" => gateway.up_vote("p1", voter).await.unwrap(),
            "down" => gateway.down_vote("p1", voter).await.unwrap(),
            _ => gateway.undo_down_vote("p1", voter).await.unwrap(),
        };
        let state = post(&ledger, "p1").state;
        for v in &state.up_vote {
            assert!(!state.down_vote.contains(v), "{v} in both lists after {action}");
        }
        assert_eq!(state.score, state.up_vote.len() as i64 - state.down_vote.len() as i64);
    }
}

#[tokio::test]
async fn vote_on_missing_item_or_voter() {
    let (gateway, _ledger) = forum().await;
    assert!(matches!(
        gateway.up_vote("p404", "u1").await,
        Err(ForumError::NotFound { kind: EntityKind::Post, .. })
    ));
    gateway.create_post("p1", T0, "co1", "t", "c", "u1").await.unwrap();
    assert!(matches!(
        gateway.down_vote("p1", "nobody").await,
        Err(ForumError::NotFound { kind: EntityKind::User, .. })
    ));
}
