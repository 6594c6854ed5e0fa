//! # Transaction Gateway
//!
//! Runs each contract operation inside its own ledger transaction, the way a
//! client gateway drives chaincode: `submit` commits only on success,
//! `evaluate` always discards. Callers never see a stub.

use std::sync::Arc;

use cf_core::error::{ForumError, Result};
use cf_core::models::{Comment, Community, CommunityName, Post, User};
use cf_core::traits::{Ledger, LedgerTxn};

use crate::mutations::moderation::ModerationTally;
use crate::projection::{CommentView, CommunityView, FeedItem, PostView, UserView};
use crate::SmartContract;

/// Opens a transaction, runs `$body` against its stub, and commits on `Ok`.
macro_rules! submit {
    ($self:ident, $op:literal, |$stub:ident| $body:expr) => {{
        let txn = $self.begin().await?;
        let $stub = txn.stub();
        let outcome = $body.await;
        $self.finish($op, txn, outcome).await
    }};
}

/// Opens a transaction, runs `$body`, and drops the transaction.
macro_rules! evaluate {
    ($self:ident, |$stub:ident| $body:expr) => {{
        let txn = $self.begin().await?;
        let $stub = txn.stub();
        let outcome = $body.await;
        drop(txn);
        outcome
    }};
}

#[derive(Clone)]
pub struct Gateway {
    ledger: Arc<dyn Ledger>,
    contract: SmartContract,
}

impl Gateway {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger, contract: SmartContract::new() }
    }

    async fn begin(&self) -> Result<Box<dyn LedgerTxn>> {
        self.ledger.begin().await.map_err(ForumError::Unavailable)
    }

    async fn finish<T>(&self, op: &str, txn: Box<dyn LedgerTxn>, outcome: Result<T>) -> Result<T> {
        match outcome {
            Ok(value) => {
                txn.commit().await.map_err(|err| {
                    log::warn!("{} failed to commit: {}", op, err);
                    ForumError::Commit(err)
                })?;
                Ok(value)
            }
            Err(err) => {
                log::warn!("{} rolled back: {}", op, err);
                drop(txn);
                Err(err)
            }
        }
    }

    // Mutations

    pub async fn create_user(&self, user_id: &str, username: &str, email: &str) -> Result<User> {
        submit!(self, "CreateUser", |stub| self.contract.create_user(stub, user_id, username, email))
    }

    pub async fn create_community(
        &self,
        id: &str,
        created_at: &str,
        name: &str,
        description: &str,
        creator: &str,
    ) -> Result<Community> {
        submit!(self, "CreateCommunity", |stub| self
            .contract
            .create_community(stub, id, created_at, name, description, creator))
    }

    pub async fn join_community(&self, community_id: &str, user_id: &str) -> Result<bool> {
        submit!(self, "JoinCommunity", |stub| self.contract.join_community(stub, community_id, user_id))
    }

    pub async fn unjoin_community(&self, community_id: &str, user_id: &str) -> Result<bool> {
        submit!(self, "UnJoinCommunity", |stub| self.contract.unjoin_community(stub, community_id, user_id))
    }

    pub async fn create_post(
        &self,
        id: &str,
        created_at: &str,
        community_id: &str,
        title: &str,
        content: &str,
        author: &str,
    ) -> Result<Post> {
        submit!(self, "CreatePost", |stub| self
            .contract
            .create_post(stub, id, created_at, community_id, title, content, author))
    }

    pub async fn create_comment(
        &self,
        id: &str,
        created_at: &str,
        parent_id: &str,
        content: &str,
        author: &str,
    ) -> Result<Comment> {
        submit!(self, "CreateComment", |stub| self
            .contract
            .create_comment(stub, id, created_at, parent_id, content, author))
    }

    pub async fn up_vote(&self, item_id: &str, user_id: &str) -> Result<bool> {
        submit!(self, "UpVote", |stub| self.contract.up_vote(stub, item_id, user_id))
    }

    pub async fn down_vote(&self, item_id: &str, user_id: &str) -> Result<bool> {
        submit!(self, "DownVote", |stub| self.contract.down_vote(stub, item_id, user_id))
    }

    pub async fn undo_up_vote(&self, item_id: &str, user_id: &str) -> Result<bool> {
        submit!(self, "UndoUpVote", |stub| self.contract.undo_up_vote(stub, item_id, user_id))
    }

    pub async fn undo_down_vote(&self, item_id: &str, user_id: &str) -> Result<bool> {
        submit!(self, "UndoDownVote", |stub| self.contract.undo_down_vote(stub, item_id, user_id))
    }

    pub async fn delete_post(&self, item_id: &str, user_id: &str) -> Result<bool> {
        submit!(self, "DeletePost", |stub| self.contract.delete_post(stub, item_id, user_id))
    }

    pub async fn appeal_post(&self, item_id: &str, user_id: &str) -> Result<bool> {
        submit!(self, "AppealPost", |stub| self.contract.appeal_post(stub, item_id, user_id))
    }

    pub async fn un_appeal_post(&self, item_id: &str, user_id: &str) -> Result<bool> {
        submit!(self, "UnAppealPost", |stub| self.contract.un_appeal_post(stub, item_id, user_id))
    }

    pub async fn hide_post_moderator(&self, item_id: &str, user_id: &str) -> Result<ModerationTally> {
        submit!(self, "HidePostModerator", |stub| self.contract.hide_post_moderator(stub, item_id, user_id))
    }

    pub async fn show_post_moderator(&self, item_id: &str, user_id: &str) -> Result<ModerationTally> {
        submit!(self, "ShowPostModerator", |stub| self.contract.show_post_moderator(stub, item_id, user_id))
    }

    pub async fn select_moderator(&self, community_id: &str) -> Result<Vec<String>> {
        submit!(self, "SelectModerator", |stub| self.contract.select_moderator(stub, community_id))
    }

    // Reads

    pub async fn get_user(&self, user_id: &str, viewer: &str) -> Result<UserView> {
        evaluate!(self, |stub| self.contract.get_user(stub, user_id, viewer))
    }

    pub async fn get_community(&self, community_id: &str, viewer: &str) -> Result<CommunityView> {
        evaluate!(self, |stub| self.contract.get_community(stub, community_id, viewer))
    }

    pub async fn get_post(&self, post_id: &str, viewer: &str) -> Result<PostView> {
        evaluate!(self, |stub| self.contract.get_post(stub, post_id, viewer))
    }

    pub async fn get_comment(&self, comment_id: &str, viewer: &str) -> Result<CommentView> {
        evaluate!(self, |stub| self.contract.get_comment(stub, comment_id, viewer))
    }

    pub async fn get_community_name(&self, community_id: &str) -> Result<String> {
        evaluate!(self, |stub| self.contract.get_community_name(stub, community_id))
    }

    pub async fn list_communities(&self) -> Result<Vec<CommunityName>> {
        evaluate!(self, |stub| self.contract.list_communities(stub))
    }

    pub async fn get_user_feed(&self, user_id: &str, page: usize) -> Result<Vec<PostView>> {
        evaluate!(self, |stub| self.contract.get_user_feed(stub, user_id, page))
    }

    pub async fn get_comment_feed(&self, parent_id: &str, page: usize, viewer: &str) -> Result<Vec<CommentView>> {
        evaluate!(self, |stub| self.contract.get_comment_feed(stub, parent_id, page, viewer))
    }

    pub async fn get_user_profile_posts(&self, user_id: &str, page: usize, viewer: &str) -> Result<Vec<PostView>> {
        evaluate!(self, |stub| self.contract.get_user_profile_posts(stub, user_id, page, viewer))
    }

    pub async fn get_user_profile_comments(
        &self,
        user_id: &str,
        page: usize,
        viewer: &str,
    ) -> Result<Vec<CommentView>> {
        evaluate!(self, |stub| self.contract.get_user_profile_comments(stub, user_id, page, viewer))
    }

    pub async fn get_community_posts(&self, community_id: &str, page: usize, viewer: &str) -> Result<Vec<PostView>> {
        evaluate!(self, |stub| self.contract.get_community_posts(stub, community_id, page, viewer))
    }

    pub async fn get_community_appealed(
        &self,
        community_id: &str,
        page: usize,
        viewer: &str,
    ) -> Result<Vec<FeedItem>> {
        evaluate!(self, |stub| self.contract.get_community_appealed(stub, community_id, page, viewer))
    }

    pub async fn get_community_appealed_comments(
        &self,
        community_id: &str,
        page: usize,
        viewer: &str,
    ) -> Result<Vec<CommentView>> {
        evaluate!(self, |stub| self
            .contract
            .get_community_appealed_comments(stub, community_id, page, viewer))
    }
}
