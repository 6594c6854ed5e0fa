//! # View Projection
//!
//! Read-only decoration of stored records for one viewer: has-voted flags by
//! set membership against the viewer's ID, plus display names pulled from the
//! referenced author and community. A dangling back-reference is a
//! `NotFound`, never a silently blank field.

use cf_core::error::{EntityKind, ForumError, Result};
use cf_core::models::{Comment, Community, CommunityName, ItemState, Post, User};
use cf_core::traits::StateStub;
use serde::Serialize;

use crate::store::Store;
use crate::SmartContract;

fn contains(list: &[String], id: &str) -> bool {
    list.iter().any(|entry| entry == id)
}

/// Viewer-relative flags common to posts and comments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerFlags {
    pub has_upvoted: bool,
    pub has_downvoted: bool,
    pub has_hide_voted: bool,
    pub has_show_voted: bool,
    pub is_appealed: bool,
}

impl ViewerFlags {
    fn new(item_id: &str, state: &ItemState, community: &Community, viewer: &str) -> Self {
        Self {
            has_upvoted: contains(&state.up_vote, viewer),
            has_downvoted: contains(&state.down_vote, viewer),
            has_hide_voted: contains(&state.hide_vote, viewer),
            has_show_voted: contains(&state.show_vote, viewer),
            is_appealed: contains(&community.appealed, item_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub author_name: String,
    pub community_name: String,
    #[serde(flatten)]
    pub flags: ViewerFlags,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author_name: String,
    pub community_name: String,
    #[serde(flatten)]
    pub flags: ViewerFlags,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityView {
    #[serde(flatten)]
    pub community: Community,
    pub creator_name: String,
    pub has_joined: bool,
    pub is_moderator: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[serde(flatten)]
    pub user: User,
    /// Joined communities with their display names, in join order.
    pub community_names: Vec<CommunityName>,
    pub is_self: bool,
}

/// One entry of the appealed-items list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FeedItem {
    Post(PostView),
    Comment(CommentView),
}

pub(crate) async fn project_post(store: Store<'_>, post: Post, viewer: &str) -> Result<PostView> {
    let author = store.user(&post.author).await?;
    let community = store.community(&post.community).await?;
    let flags = ViewerFlags::new(&post.id, &post.state, &community, viewer);
    Ok(PostView {
        post,
        author_name: author.username,
        community_name: community.name,
        flags,
    })
}

pub(crate) async fn project_comment(store: Store<'_>, comment: Comment, viewer: &str) -> Result<CommentView> {
    let author = store.user(&comment.author).await?;
    let community = store.community(&comment.community).await?;
    let flags = ViewerFlags::new(&comment.id, &comment.state, &community, viewer);
    Ok(CommentView {
        comment,
        author_name: author.username,
        community_name: community.name,
        flags,
    })
}

pub(crate) async fn project_community(store: Store<'_>, community: Community, viewer: &str) -> Result<CommunityView> {
    let creator = store.user(&community.creator).await?;
    Ok(CommunityView {
        has_joined: contains(&community.users, viewer),
        is_moderator: contains(&community.moderators, viewer),
        creator_name: creator.username,
        community,
    })
}

pub(crate) async fn project_user(store: Store<'_>, user: User, viewer: &str) -> Result<UserView> {
    let index = store.metadata().await?;
    let community_names = user
        .communities
        .iter()
        .map(|id| {
            index
                .lookup(id)
                .map(|name| CommunityName { id: id.clone(), name: name.to_string() })
                .ok_or_else(|| ForumError::not_found(EntityKind::Community, id.as_str()))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(UserView {
        is_self: user.id == viewer,
        community_names,
        user,
    })
}

impl SmartContract {
    pub async fn get_user(&self, stub: &dyn StateStub, user_id: &str, viewer: &str) -> Result<UserView> {
        let store = Store::new(stub);
        let user = store.user(user_id).await?;
        project_user(store, user, viewer).await
    }

    pub async fn get_community(&self, stub: &dyn StateStub, community_id: &str, viewer: &str) -> Result<CommunityView> {
        let store = Store::new(stub);
        let community = store.community(community_id).await?;
        project_community(store, community, viewer).await
    }

    pub async fn get_post(&self, stub: &dyn StateStub, post_id: &str, viewer: &str) -> Result<PostView> {
        let store = Store::new(stub);
        let post = store.post(post_id).await?;
        project_post(store, post, viewer).await
    }

    pub async fn get_comment(&self, stub: &dyn StateStub, comment_id: &str, viewer: &str) -> Result<CommentView> {
        let store = Store::new(stub);
        let comment = store.comment(comment_id).await?;
        project_comment(store, comment, viewer).await
    }
}
