//! # Feed Assembly
//!
//! Paginated, viewer-projected lists. Every feed follows the same shape:
//! hydrate a source ID list concurrently, drop hidden items, order, slice one
//! page, then project only the page. Read failures in the fan-out are
//! reported together rather than skipped.

use std::cmp::Ordering;

use cf_core::error::Result;
use cf_core::ids::ItemRef;
use cf_core::models::{Comment, Item, Post};
use cf_core::traits::StateStub;

use crate::fanout::gather;
use crate::projection::{project_comment, project_post, CommentView, FeedItem, PostView};
use crate::store::Store;
use crate::SmartContract;

pub const POSTS_PER_PAGE: usize = 20;
pub const COMMENTS_PER_PAGE: usize = 20;

/// `items[page*size .. min((page+1)*size, len)]`, empty past the end.
pub fn paginate<T>(mut items: Vec<T>, page: usize, size: usize) -> Vec<T> {
    let start = page.saturating_mul(size);
    if start >= items.len() {
        return Vec::new();
    }
    let end = start.saturating_add(size).min(items.len());
    items.truncate(end);
    items.split_off(start)
}

/// Newest first; equal timestamps fall back to ID order so pages are stable.
fn newest_first(a: &Post, b: &Post) -> Ordering {
    b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id))
}

fn newest_first_comment(a: &Comment, b: &Comment) -> Ordering {
    b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id))
}

async fn hydrate_posts<'a>(store: Store<'a>, ids: impl Iterator<Item = &'a String>) -> Result<Vec<Post>> {
    let posts = gather(ids.map(|id| store.post(id))).await?;
    Ok(posts.into_iter().filter(|p| !p.state.hidden).collect())
}

async fn hydrate_comments<'a>(store: Store<'a>, ids: impl Iterator<Item = &'a String>) -> Result<Vec<Comment>> {
    let comments = gather(ids.map(|id| store.comment(id))).await?;
    Ok(comments.into_iter().filter(|c| !c.state.hidden).collect())
}

async fn project_posts(store: Store<'_>, posts: Vec<Post>, viewer: &str) -> Result<Vec<PostView>> {
    gather(posts.into_iter().map(|post| project_post(store, post, viewer))).await
}

async fn project_comments(store: Store<'_>, comments: Vec<Comment>, viewer: &str) -> Result<Vec<CommentView>> {
    gather(comments.into_iter().map(|comment| project_comment(store, comment, viewer))).await
}

impl SmartContract {
    /// Visible posts from every community the user has joined, newest first.
    pub async fn get_user_feed(&self, stub: &dyn StateStub, user_id: &str, page: usize) -> Result<Vec<PostView>> {
        let store = Store::new(stub);
        let user = store.user(user_id).await?;
        let communities = gather(user.communities.iter().map(|id| store.community(id))).await?;

        let mut feed = hydrate_posts(store, communities.iter().flat_map(|c| c.posts.iter())).await?;
        feed.sort_by(newest_first);
        let page_items = paginate(feed, page, POSTS_PER_PAGE);
        log::debug!("user feed for {} page {}: {} post(s)", user_id, page, page_items.len());
        project_posts(store, page_items, user_id).await
    }

    /// Visible direct children of a post or comment. Later replies come first
    /// among equal timestamps.
    pub async fn get_comment_feed(
        &self,
        stub: &dyn StateStub,
        parent_id: &str,
        page: usize,
        viewer: &str,
    ) -> Result<Vec<CommentView>> {
        let store = Store::new(stub);
        let parent = store.item(&ItemRef::parse(parent_id)?).await?;

        let mut comments = hydrate_comments(store, parent.children().iter().rev()).await?;
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        project_comments(store, paginate(comments, page, COMMENTS_PER_PAGE), viewer).await
    }

    pub async fn get_user_profile_posts(
        &self,
        stub: &dyn StateStub,
        user_id: &str,
        page: usize,
        viewer: &str,
    ) -> Result<Vec<PostView>> {
        let store = Store::new(stub);
        let user = store.user(user_id).await?;
        let mut posts = hydrate_posts(store, user.posts.iter().rev()).await?;
        posts.sort_by(newest_first);
        project_posts(store, paginate(posts, page, POSTS_PER_PAGE), viewer).await
    }

    pub async fn get_user_profile_comments(
        &self,
        stub: &dyn StateStub,
        user_id: &str,
        page: usize,
        viewer: &str,
    ) -> Result<Vec<CommentView>> {
        let store = Store::new(stub);
        let user = store.user(user_id).await?;
        let mut comments = hydrate_comments(store, user.comments.iter().rev()).await?;
        comments.sort_by(newest_first_comment);
        project_comments(store, paginate(comments, page, COMMENTS_PER_PAGE), viewer).await
    }

    pub async fn get_community_posts(
        &self,
        stub: &dyn StateStub,
        community_id: &str,
        page: usize,
        viewer: &str,
    ) -> Result<Vec<PostView>> {
        let store = Store::new(stub);
        let community = store.community(community_id).await?;
        let mut posts = hydrate_posts(store, community.posts.iter().rev()).await?;
        posts.sort_by(newest_first);
        project_posts(store, paginate(posts, page, POSTS_PER_PAGE), viewer).await
    }

    /// Visible posts and comments awaiting review, most recent appeal first.
    /// Page bounds are computed over the visible entries only.
    pub async fn get_community_appealed(
        &self,
        stub: &dyn StateStub,
        community_id: &str,
        page: usize,
        viewer: &str,
    ) -> Result<Vec<FeedItem>> {
        let store = Store::new(stub);
        let community = store.community(community_id).await?;

        let refs = community
            .appealed
            .iter()
            .rev()
            .map(|id| ItemRef::parse(id))
            .collect::<Result<Vec<_>>>()?;
        let items = gather(refs.iter().map(|item| store.item(item))).await?;
        let visible: Vec<Item> = items.into_iter().filter(|i| !i.state().hidden).collect();

        gather(paginate(visible, page, POSTS_PER_PAGE).into_iter().map(|item| async move {
            match item {
                Item::Post(post) => project_post(store, post, viewer).await.map(FeedItem::Post),
                Item::Comment(comment) => project_comment(store, comment, viewer).await.map(FeedItem::Comment),
            }
        }))
        .await
    }

    /// The comment subset of [`get_community_appealed`](Self::get_community_appealed).
    pub async fn get_community_appealed_comments(
        &self,
        stub: &dyn StateStub,
        community_id: &str,
        page: usize,
        viewer: &str,
    ) -> Result<Vec<CommentView>> {
        let store = Store::new(stub);
        let community = store.community(community_id).await?;
        let ids = community
            .appealed
            .iter()
            .rev()
            .filter(|id| matches!(ItemRef::parse(id), Ok(ItemRef::Comment(_))));
        let comments = hydrate_comments(store, ids).await?;
        project_comments(store, paginate(comments, page, COMMENTS_PER_PAGE), viewer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{at, seeded};

    #[test]
    fn test_paginate_bounds() {
        let items: Vec<u32> = (0..45).collect();
        assert_eq!(paginate(items.clone(), 0, 20), (0..20).collect::<Vec<_>>());
        assert_eq!(paginate(items.clone(), 2, 20), (40..45).collect::<Vec<_>>());
        assert!(paginate(items.clone(), 3, 20).is_empty());
        assert!(paginate(Vec::<u32>::new(), 0, 20).is_empty());
        assert!(paginate(items, usize::MAX, 20).is_empty());
    }

    #[tokio::test]
    async fn test_user_feed_merges_joined_communities() {
        let (contract, txn) = seeded().await;
        let stub = txn.stub();
        contract.create_community(stub, "co2", &at(0), "go", "", "u2").await.unwrap();
        contract.create_post(stub, "p1", &at(1), "co1", "a", "", "u1").await.unwrap();
        contract.create_post(stub, "p2", &at(3), "co2", "b", "", "u2").await.unwrap();
        contract.create_post(stub, "p3", &at(2), "co1", "c", "", "u2").await.unwrap();
        contract.delete_post(stub, "p3", "u2").await.unwrap();

        let feed = contract.get_user_feed(stub, "u2", 0).await.unwrap();
        let ids: Vec<&str> = feed.iter().map(|v| v.post.id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p1"]);
        assert_eq!(feed[0].community_name, "go");

        assert!(contract.get_user_feed(stub, "u2", 1).await.unwrap().is_empty());
        // u3 joined nothing.
        assert!(contract.get_user_feed(stub, "u3", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_equal_timestamps_order_by_id() {
        let (contract, txn) = seeded().await;
        let stub = txn.stub();
        for id in ["p3", "p1", "p2"] {
            contract.create_post(stub, id, &at(5), "co1", "t", "", "u1").await.unwrap();
        }
        let posts = contract.get_community_posts(stub, "co1", 0, "u1").await.unwrap();
        let ids: Vec<&str> = posts.iter().map(|v| v.post.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);
    }

    #[tokio::test]
    async fn test_comment_feed_reverse_insertion_on_ties() {
        let (contract, txn) = seeded().await;
        let stub = txn.stub();
        contract.create_post(stub, "p1", &at(0), "co1", "t", "", "u1").await.unwrap();
        contract.create_comment(stub, "c1", &at(1), "p1", "a", "u2").await.unwrap();
        contract.create_comment(stub, "c2", &at(1), "p1", "b", "u3").await.unwrap();
        contract.create_comment(stub, "c3", &at(4), "p1", "c", "u1").await.unwrap();
        contract.create_comment(stub, "c4", &at(9), "c1", "nested", "u1").await.unwrap();

        let feed = contract.get_comment_feed(stub, "p1", 0, "u2").await.unwrap();
        let ids: Vec<&str> = feed.iter().map(|v| v.comment.id.as_str()).collect();
        assert_eq!(ids, vec!["c3", "c2", "c1"]);

        let replies = contract.get_comment_feed(stub, "c1", 0, "u2").await.unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].comment.id, "c4");
    }

    #[tokio::test]
    async fn test_profile_lists() {
        let (contract, txn) = seeded().await;
        let stub = txn.stub();
        contract.create_post(stub, "p1", &at(1), "co1", "t", "", "u2").await.unwrap();
        contract.create_post(stub, "p2", &at(2), "co1", "t", "", "u2").await.unwrap();
        contract.create_comment(stub, "c1", &at(3), "p1", "x", "u2").await.unwrap();
        contract.delete_post(stub, "p1", "u2").await.unwrap();

        let posts = contract.get_user_profile_posts(stub, "u2", 0, "u1").await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].post.id, "p2");

        let comments = contract.get_user_profile_comments(stub, "u2", 0, "u1").await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].comment.id, "c1");
    }

    #[tokio::test]
    async fn test_appealed_mixes_posts_and_comments() {
        let (contract, txn) = seeded().await;
        let stub = txn.stub();
        contract.create_post(stub, "p1", &at(1), "co1", "t", "", "u2").await.unwrap();
        contract.create_post(stub, "p2", &at(2), "co1", "t", "", "u2").await.unwrap();
        contract.create_comment(stub, "c1", &at(3), "p1", "x", "u2").await.unwrap();
        contract.appeal_post(stub, "c1", "u2").await.unwrap();
        contract.appeal_post(stub, "p2", "u2").await.unwrap();
        contract.appeal_post(stub, "p1", "u2").await.unwrap();
        contract.delete_post(stub, "p2", "u2").await.unwrap();

        let appealed = contract.get_community_appealed(stub, "co1", 0, "u1").await.unwrap();
        assert_eq!(appealed.len(), 2);
        assert!(matches!(&appealed[0], FeedItem::Post(v) if v.post.id == "p1"));
        assert!(matches!(&appealed[1], FeedItem::Comment(v) if v.comment.id == "c1"));
        assert!(contract.get_community_appealed(stub, "co1", 1, "u1").await.unwrap().is_empty());

        let comments = contract.get_community_appealed_comments(stub, "co1", 0, "u1").await.unwrap();
        assert_eq!(comments.len(), 1);
        assert!(comments[0].flags.is_appealed);
    }
}
