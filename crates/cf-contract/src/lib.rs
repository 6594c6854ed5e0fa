//! # cf-contract
//!
//! The forum chaincode. Every public operation on [`SmartContract`] runs
//! against one ledger transaction's [`StateStub`](cf_core::traits::StateStub):
//! it reads the records it needs, checks the forum invariants, and writes back
//! whole records. Atomicity comes from the transaction; [`Gateway`] owns the
//! begin/commit/rollback around each call.

mod fanout;

pub mod feed;
pub mod gateway;
pub mod mutations;
pub mod projection;
pub mod store;

pub use feed::{paginate, COMMENTS_PER_PAGE, POSTS_PER_PAGE};
pub use gateway::Gateway;
pub use mutations::election::{moderator_seats, MAX_MODERATORS};
pub use mutations::moderation::{ModerationTally, SHOW_RESOLVED};
pub use projection::{CommentView, CommunityView, FeedItem, PostView, UserView, ViewerFlags};
pub use store::Store;

/// The contract itself carries no state; everything lives on the ledger.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmartContract;

impl SmartContract {
    pub fn new() -> Self {
        Self
    }
}
