//! Self-deletion, appeals, and quorum moderation by community moderators.

use cf_core::error::{ForumError, Result};
use cf_core::ids::ItemRef;
use cf_core::models::{insert_unique, remove_id, Community, Item};
use cf_core::traits::StateStub;
use serde::Serialize;

use crate::store::Store;
use crate::SmartContract;

/// Marks an item whose appeal was already dismissed by a show quorum.
pub const SHOW_RESOLVED: i64 = -1;

/// Outcome of one hide/show vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationTally {
    pub votes: i64,
    pub quorum: i64,
    /// The tally stands at or above quorum after this vote. Cleanup runs
    /// every time, so it also holds for late votes and already-hidden items.
    pub resolved: bool,
}

/// Half the moderators, rounded up, evaluated against the list as it is now.
fn quorum(community: &Community) -> i64 {
    (community.moderators.len() as i64 + 1) / 2
}

fn ensure_moderator(community: &Community, user_id: &str) -> Result<()> {
    if community.moderators.iter().any(|m| m == user_id) {
        Ok(())
    } else {
        log::warn!("moderation by non-moderator {} in {}", user_id, community.id);
        Err(ForumError::Forbidden(format!(
            "{} is not a moderator of {}",
            user_id, community.id
        )))
    }
}

fn ensure_member(community: &Community, user_id: &str) -> Result<()> {
    if community.users.iter().any(|u| u == user_id) {
        Ok(())
    } else {
        log::warn!("appeal by non-member {} in {}", user_id, community.id);
        Err(ForumError::Forbidden(format!(
            "{} is not a member of {}",
            user_id, community.id
        )))
    }
}

impl SmartContract {
    /// Author-only soft delete. Returns `false` when already hidden.
    pub async fn delete_post(&self, stub: &dyn StateStub, item_id: &str, user_id: &str) -> Result<bool> {
        let store = Store::new(stub);
        let mut item = store.item(&ItemRef::parse(item_id)?).await?;
        if item.author() != user_id {
            log::warn!("{} tried to delete {} owned by {}", user_id, item_id, item.author());
            return Err(ForumError::Forbidden(format!("{} is not the author of {}", user_id, item_id)));
        }
        if item.state().hidden {
            return Ok(false);
        }
        item.state_mut().hidden = true;
        store.put_item(&item).await?;
        log::info!("user {} deleted {}", user_id, item_id);
        Ok(true)
    }

    /// Puts the item on its community's review list. Members only.
    pub async fn appeal_post(&self, stub: &dyn StateStub, item_id: &str, user_id: &str) -> Result<bool> {
        let (store, item, mut community) = self.appeal_context(stub, item_id, user_id).await?;
        let added = insert_unique(&mut community.appealed, item.id());
        if added {
            store.put_community(&community).await?;
            log::info!("user {} appealed {} in {}", user_id, item_id, community.id);
        }
        Ok(added)
    }

    pub async fn un_appeal_post(&self, stub: &dyn StateStub, item_id: &str, user_id: &str) -> Result<bool> {
        let (store, item, mut community) = self.appeal_context(stub, item_id, user_id).await?;
        let removed = remove_id(&mut community.appealed, item.id());
        if removed {
            store.put_community(&community).await?;
            log::info!("user {} withdrew appeal of {} in {}", user_id, item_id, community.id);
        }
        Ok(removed)
    }

    async fn appeal_context<'a>(
        &self,
        stub: &'a dyn StateStub,
        item_id: &str,
        user_id: &str,
    ) -> Result<(Store<'a>, Item, Community)> {
        let store = Store::new(stub);
        let item = store.item(&ItemRef::parse(item_id)?).await?;
        store.user(user_id).await?;
        let community = store.community(item.community()).await?;
        ensure_member(&community, user_id)?;
        Ok((store, item, community))
    }

    /// One moderator's vote to hide an item. At or above quorum the item is
    /// hidden, dropped from the appeal list and detached from its parent's
    /// list, whether or not its author had already deleted it.
    pub async fn hide_post_moderator(
        &self,
        stub: &dyn StateStub,
        item_id: &str,
        user_id: &str,
    ) -> Result<ModerationTally> {
        let item_ref = ItemRef::parse(item_id)?;
        let store = Store::new(stub);
        let mut item = store.item(&item_ref).await?;
        let mut community = store.community(item.community()).await?;
        ensure_moderator(&community, user_id)?;

        let state = item.state_mut();
        if !insert_unique(&mut state.hide_vote, user_id) {
            return Err(ForumError::AlreadyVoted { item: item_id.to_string(), user: user_id.to_string() });
        }
        state.hide_count += 1;
        let quorum = quorum(&community);
        let votes = state.hide_count;
        let resolved = votes >= quorum;

        if resolved {
            state.hidden = true;
            remove_id(&mut community.appealed, item_id);
            match &item {
                Item::Post(_) => {
                    remove_id(&mut community.posts, item_id);
                }
                Item::Comment(comment) => {
                    let mut parent = store.item(&ItemRef::parse(&comment.parent)?).await?;
                    if remove_id(parent.children_mut(), item_id) {
                        store.put_item(&parent).await?;
                    }
                }
            }
            store.put_community(&community).await?;
            log::info!("{} hidden by moderator quorum in {} ({}/{})", item_id, community.id, votes, quorum);
        } else {
            log::debug!("hide vote by {} on {} ({}/{})", user_id, item_id, votes, quorum);
        }
        store.put_item(&item).await?;
        Ok(ModerationTally { votes, quorum, resolved })
    }

    /// One moderator's vote to dismiss an appeal. On quorum the item leaves
    /// the appeal list; a hidden item stays hidden.
    pub async fn show_post_moderator(
        &self,
        stub: &dyn StateStub,
        item_id: &str,
        user_id: &str,
    ) -> Result<ModerationTally> {
        let item_ref = ItemRef::parse(item_id)?;
        let store = Store::new(stub);
        let mut item = store.item(&item_ref).await?;
        let mut community = store.community(item.community()).await?;
        ensure_moderator(&community, user_id)?;

        let state = item.state_mut();
        if !insert_unique(&mut state.show_vote, user_id) {
            return Err(ForumError::AlreadyVoted { item: item_id.to_string(), user: user_id.to_string() });
        }
        let quorum = quorum(&community);
        let mut resolved = false;
        if state.show_count != SHOW_RESOLVED {
            state.show_count += 1;
            if state.show_count >= quorum {
                state.show_count = SHOW_RESOLVED;
                resolved = true;
            }
        }
        let votes = state.show_vote.len() as i64;

        if resolved {
            remove_id(&mut community.appealed, item_id);
            store.put_community(&community).await?;
            log::info!("appeal of {} dismissed by moderator quorum in {}", item_id, community.id);
        }
        store.put_item(&item).await?;
        Ok(ModerationTally { votes, quorum, resolved })
    }
}
