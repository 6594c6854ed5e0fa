//! Post and comment creation.

use cf_core::error::{EntityKind, ForumError, Result};
use cf_core::ids::{ensure_prefix, parse_timestamp, ItemRef};
use cf_core::models::{insert_unique, Comment, ItemState, Post};
use cf_core::traits::StateStub;

use crate::store::Store;
use crate::SmartContract;

impl SmartContract {
    /// Creates a post and links it into `Community.posts` and `User.posts`.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_post(
        &self,
        stub: &dyn StateStub,
        id: &str,
        created_at: &str,
        community_id: &str,
        title: &str,
        content: &str,
        author: &str,
    ) -> Result<Post> {
        ensure_prefix(EntityKind::Post, id)?;
        let created_at = parse_timestamp(created_at)?;
        let store = Store::new(stub);

        let mut community = store.community(community_id).await?;
        if store.exists(id).await? {
            return Err(ForumError::already_exists(EntityKind::Post, id));
        }
        let mut user = store.user(author).await?;

        let post = Post {
            id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            author: author.to_string(),
            created_at,
            comments: Vec::new(),
            community: community_id.to_string(),
            state: ItemState::default(),
        };
        insert_unique(&mut community.posts, id);
        insert_unique(&mut user.posts, id);

        store.create_post(&post).await?;
        store.put_community(&community).await?;
        store.put_user(&user).await?;
        log::info!("user {} posted {} in {}", author, id, community_id);
        Ok(post)
    }

    /// Creates a comment under a post or another comment. The community is
    /// inherited from the parent.
    pub async fn create_comment(
        &self,
        stub: &dyn StateStub,
        id: &str,
        created_at: &str,
        parent_id: &str,
        content: &str,
        author: &str,
    ) -> Result<Comment> {
        ensure_prefix(EntityKind::Comment, id)?;
        let created_at = parse_timestamp(created_at)?;
        let parent_ref = ItemRef::parse(parent_id)?;
        let store = Store::new(stub);

        if store.exists(id).await? {
            return Err(ForumError::already_exists(EntityKind::Comment, id));
        }
        let mut parent = store.item(&parent_ref).await?;
        let mut user = store.user(author).await?;

        let comment = Comment {
            id: id.to_string(),
            content: content.to_string(),
            author: author.to_string(),
            created_at,
            parent: parent_id.to_string(),
            replies: Vec::new(),
            community: parent.community().to_string(),
            state: ItemState::default(),
        };
        insert_unique(parent.children_mut(), id);
        insert_unique(&mut user.comments, id);

        store.create_comment(&comment).await?;
        store.put_item(&parent).await?;
        store.put_user(&user).await?;
        log::info!("user {} commented {} on {}", author, id, parent_id);
        Ok(comment)
    }
}
