use cf_contract::{FeedItem, POSTS_PER_PAGE};
use cf_core::error::{EntityKind, ForumError};
use integration_tests::{at, community, forum, overwrite};

#[tokio::test]
async fn user_feed_pagination_boundaries() {
    let (gateway, _ledger) = forum().await;
    let total = 45;
    for i in 0..total {
        gateway
            .create_post(&format!("p{i:03}"), &at(i), "co1", "t", "c", "u1")
            .await
            .unwrap();
    }

    let total = total as usize;
    for page in 0..4 {
        let feed = gateway.get_user_feed("u2", page).await.unwrap();
        let expected = if page * POSTS_PER_PAGE >= total {
            0
        } else {
            POSTS_PER_PAGE.min(total - page * POSTS_PER_PAGE)
        };
        assert_eq!(feed.len(), expected, "page {page}");
    }

    let first = gateway.get_user_feed("u2", 0).await.unwrap();
    assert_eq!(first[0].post.id, "p044");
    assert!(first.windows(2).all(|w| w[0].post.created_at >= w[1].post.created_at));
}

#[tokio::test]
async fn hidden_posts_drop_out_of_every_feed() {
    let (gateway, _ledger) = forum().await;
    gateway.create_post("p1", &at(1), "co1", "t", "c", "u2").await.unwrap();
    gateway.create_post("p2", &at(2), "co1", "t", "c", "u2").await.unwrap();
    gateway.delete_post("p2", "u2").await.unwrap();

    let feed = gateway.get_user_feed("u1", 0).await.unwrap();
    assert_eq!(feed.len(), 1);
    let community = gateway.get_community_posts("co1", 0, "u1").await.unwrap();
    assert_eq!(community.len(), 1);
    let profile = gateway.get_user_profile_posts("u2", 0, "u1").await.unwrap();
    assert_eq!(profile.len(), 1);
    assert_eq!(profile[0].post.id, "p1");
}

#[tokio::test]
async fn appealed_pages_count_visible_items() {
    let (gateway, _ledger) = forum().await;
    for i in 0..25 {
        let id = format!("p{i:02}");
        gateway.create_post(&id, &at(i), "co1", "t", "c", "u2").await.unwrap();
        gateway.appeal_post(&id, "u2").await.unwrap();
    }
    for i in 0..10 {
        gateway.delete_post(&format!("p{i:02}"), "u2").await.unwrap();
    }

    let first = gateway.get_community_appealed("co1", 0, "u1").await.unwrap();
    let second = gateway.get_community_appealed("co1", 1, "u1").await.unwrap();
    assert_eq!(first.len(), 15);
    assert!(second.is_empty());
    assert!(matches!(&first[0], FeedItem::Post(v) if v.post.id == "p24" && v.flags.is_appealed));
}

#[tokio::test]
async fn joined_communities_appear_in_user_view() {
    let (gateway, _ledger) = forum().await;
    gateway.create_community("co2", &at(1), "go", "", "u3").await.unwrap();
    gateway.join_community("co2", "u2").await.unwrap();

    let view = gateway.get_user("u2", "u1").await.unwrap();
    let names: Vec<&str> = view.community_names.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["rust", "go"]);
    assert!(!view.is_self);

    let listed = gateway.list_communities().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(gateway.get_community_name("co2").await.unwrap(), "go");
}

#[tokio::test]
async fn dangling_post_ids_fail_the_feed_together() {
    let (gateway, ledger) = forum().await;
    gateway.create_post("p1", &at(1), "co1", "t", "c", "u2").await.unwrap();
    let mut co1 = community(&ledger, "co1");
    co1.posts.extend(["p404".to_string(), "p405".to_string()]);
    overwrite(&ledger, "co1", &co1).await;

    for result in [
        gateway.get_user_feed("u1", 0).await,
        gateway.get_community_posts("co1", 0, "u1").await,
    ] {
        match result {
            Err(ForumError::Aggregate(failures)) => {
                assert_eq!(failures.len(), 2);
                assert!(failures
                    .iter()
                    .all(|f| matches!(f, ForumError::NotFound { kind: EntityKind::Post, .. })));
            }
            other => panic!("expected aggregated failures, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn hidden_posts_are_skipped_without_error() {
    let (gateway, ledger) = forum().await;
    gateway.create_post("p1", &at(1), "co1", "t", "c", "u2").await.unwrap();
    gateway.create_post("p2", &at(2), "co1", "t", "c", "u2").await.unwrap();
    gateway.delete_post("p1", "u2").await.unwrap();
    // Self-deletion leaves the ID listed on the community.
    assert_eq!(community(&ledger, "co1").posts.len(), 2);

    let feed = gateway.get_community_posts("co1", 0, "u1").await.unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].post.id, "p2");
    let feed = gateway.get_user_feed("u1", 0).await.unwrap();
    assert_eq!(feed.len(), 1);
}
