//! Up/down votes on posts and comments, and the author reputation that
//! follows them.

use cf_core::error::{EntityKind, ForumError, Result};
use cf_core::ids::ItemRef;
use cf_core::models::{insert_unique, remove_id, ItemState};
use cf_core::traits::StateStub;

use crate::store::Store;
use crate::SmartContract;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    fn sign(self) -> i64 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
        }
    }

    fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    fn voters(self, state: &mut ItemState) -> &mut Vec<String> {
        match self {
            Direction::Up => &mut state.up_vote,
            Direction::Down => &mut state.down_vote,
        }
    }
}

/// Records `user_id`'s vote in `direction`, moving it off the opposite list
/// if present. Returns the score delta; zero means nothing changed.
fn cast(state: &mut ItemState, direction: Direction, user_id: &str) -> i64 {
    if direction.voters(state).iter().any(|v| v == user_id) {
        return 0;
    }
    let mut steps = 1;
    if remove_id(direction.opposite().voters(state), user_id) {
        steps += 1;
    }
    insert_unique(direction.voters(state), user_id);
    steps * direction.sign()
}

fn retract(state: &mut ItemState, direction: Direction, user_id: &str) -> i64 {
    if remove_id(direction.voters(state), user_id) {
        -direction.sign()
    } else {
        0
    }
}

impl SmartContract {
    pub async fn up_vote(&self, stub: &dyn StateStub, item_id: &str, user_id: &str) -> Result<bool> {
        self.apply_vote(stub, item_id, user_id, |s| cast(s, Direction::Up, user_id)).await
    }

    pub async fn down_vote(&self, stub: &dyn StateStub, item_id: &str, user_id: &str) -> Result<bool> {
        self.apply_vote(stub, item_id, user_id, |s| cast(s, Direction::Down, user_id)).await
    }

    pub async fn undo_up_vote(&self, stub: &dyn StateStub, item_id: &str, user_id: &str) -> Result<bool> {
        self.apply_vote(stub, item_id, user_id, |s| retract(s, Direction::Up, user_id)).await
    }

    pub async fn undo_down_vote(&self, stub: &dyn StateStub, item_id: &str, user_id: &str) -> Result<bool> {
        self.apply_vote(stub, item_id, user_id, |s| retract(s, Direction::Down, user_id)).await
    }

    /// Shared read-modify-write for the four vote operations. The author's
    /// reputation moves with the score unless the author voted on their own
    /// item.
    async fn apply_vote<F>(&self, stub: &dyn StateStub, item_id: &str, user_id: &str, change: F) -> Result<bool>
    where
        F: FnOnce(&mut ItemState) -> i64,
    {
        let item_ref = ItemRef::parse(item_id)?;
        let store = Store::new(stub);
        let mut item = store.item(&item_ref).await?;
        store.user(user_id).await?;

        let delta = change(item.state_mut());
        if delta == 0 {
            log::debug!("vote by {} on {} changed nothing", user_id, item_id);
            return Ok(false);
        }
        item.state_mut().score += delta;

        if item.author() != user_id {
            let mut author = store
                .get_user(item.author())
                .await?
                .ok_or_else(|| ForumError::not_found(EntityKind::User, item.author()))?;
            author.reputation += delta;
            store.put_user(&author).await?;
        }
        store.put_item(&item).await?;
        log::info!("vote by {} on {}: score {:+}", user_id, item_id, delta);
        Ok(true)
    }
}
