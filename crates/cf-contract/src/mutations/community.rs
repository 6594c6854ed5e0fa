//! Users, communities, membership and the community-name index.

use cf_core::error::{EntityKind, ForumError, Result};
use cf_core::ids::{ensure_prefix, parse_timestamp};
use cf_core::models::{insert_unique, remove_id, Community, CommunityName, User};
use cf_core::traits::StateStub;

use crate::store::Store;
use crate::SmartContract;

impl SmartContract {
    /// Writes a zero-reputation user with empty reference lists.
    pub async fn create_user(
        &self,
        stub: &dyn StateStub,
        user_id: &str,
        username: &str,
        email: &str,
    ) -> Result<User> {
        ensure_prefix(EntityKind::User, user_id)?;
        let store = Store::new(stub);
        let user = User::new(user_id, username, email);
        store.create_user(&user).await?;
        log::info!("created user {}", user_id);
        Ok(user)
    }

    /// The creator becomes the sole member and sole moderator, and the name is
    /// appended to the community-name index.
    pub async fn create_community(
        &self,
        stub: &dyn StateStub,
        id: &str,
        created_at: &str,
        name: &str,
        description: &str,
        creator: &str,
    ) -> Result<Community> {
        ensure_prefix(EntityKind::Community, id)?;
        let created_at = parse_timestamp(created_at)?;
        let store = Store::new(stub);

        if store.exists(id).await? {
            return Err(ForumError::already_exists(EntityKind::Community, id));
        }
        let mut user = store.user(creator).await?;
        let mut index = store.metadata().await?;

        let community = Community {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            creator: creator.to_string(),
            created_at,
            moderators: vec![creator.to_string()],
            users: vec![creator.to_string()],
            posts: Vec::new(),
            appealed: Vec::new(),
        };
        insert_unique(&mut user.communities, id);
        if index.lookup(id).is_none() {
            index.name.push(CommunityName { id: id.to_string(), name: name.to_string() });
        }

        store.create_community(&community).await?;
        store.put_user(&user).await?;
        store.put_metadata(&index).await?;
        log::info!("user {} created community {} ({})", creator, id, name);
        Ok(community)
    }

    /// Adds the user to `Community.users` and the community to
    /// `User.communities`. Returns `false` when already a member.
    pub async fn join_community(
        &self,
        stub: &dyn StateStub,
        community_id: &str,
        user_id: &str,
    ) -> Result<bool> {
        let store = Store::new(stub);
        let mut community = store.community(community_id).await?;
        let mut user = store.user(user_id).await?;

        let joined = insert_unique(&mut community.users, user_id);
        let linked = insert_unique(&mut user.communities, community_id);
        if joined {
            store.put_community(&community).await?;
        }
        if linked {
            store.put_user(&user).await?;
        }
        if joined || linked {
            log::info!("user {} joined community {}", user_id, community_id);
        } else {
            log::debug!("user {} already in community {}", user_id, community_id);
        }
        Ok(joined || linked)
    }

    /// Mirror of [`join_community`](Self::join_community). Removing a
    /// non-member is a no-op that returns `false`.
    pub async fn unjoin_community(
        &self,
        stub: &dyn StateStub,
        community_id: &str,
        user_id: &str,
    ) -> Result<bool> {
        let store = Store::new(stub);
        let mut community = store.community(community_id).await?;
        let mut user = store.user(user_id).await?;

        let left = remove_id(&mut community.users, user_id);
        let unlinked = remove_id(&mut user.communities, community_id);
        if left {
            store.put_community(&community).await?;
        }
        if unlinked {
            store.put_user(&user).await?;
        }
        if left || unlinked {
            log::info!("user {} left community {}", user_id, community_id);
        }
        Ok(left || unlinked)
    }

    /// Display name through the index, without loading the community record.
    pub async fn get_community_name(&self, stub: &dyn StateStub, community_id: &str) -> Result<String> {
        let index = Store::new(stub).metadata().await?;
        index
            .lookup(community_id)
            .map(str::to_string)
            .ok_or_else(|| ForumError::not_found(EntityKind::Community, community_id))
    }

    pub async fn list_communities(&self, stub: &dyn StateStub) -> Result<Vec<CommunityName>> {
        Ok(Store::new(stub).metadata().await?.name)
    }
}
