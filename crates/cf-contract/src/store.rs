//! # Entity Store Accessors
//!
//! Typed get/create/put over the raw key-value stub. Every write is a
//! full-record overwrite; callers read, modify and write back the whole record
//! inside the same transaction.

use cf_core::error::{EntityKind, ForumError, Result};
use cf_core::ids::ItemRef;
use cf_core::models::{Comment, Community, Item, MetaData, Post, User, METADATA_KEY};
use cf_core::traits::StateStub;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A typed view over one transaction's stub. `Copy`, so concurrent reads can
/// each hold their own handle.
#[derive(Clone, Copy)]
pub struct Store<'a> {
    stub: &'a dyn StateStub,
}

impl<'a> Store<'a> {
    pub fn new(stub: &'a dyn StateStub) -> Self {
        Self { stub }
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let raw = self
            .stub
            .get_state(key)
            .await
            .map_err(|source| ForumError::Read { key: key.to_string(), source })?;

        match raw {
            None => Ok(None),
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|source| ForumError::Codec { key: key.to_string(), source }),
        }
    }

    async fn write<T: Serialize>(&self, key: &str, record: &T) -> Result<()> {
        let bytes = serde_json::to_vec(record)
            .map_err(|source| ForumError::Codec { key: key.to_string(), source })?;
        self.stub
            .put_state(key, bytes)
            .await
            .map_err(|source| ForumError::Write { key: key.to_string(), source })
    }

    /// Whether any record (of any kind) occupies `key`.
    pub async fn exists(&self, key: &str) -> Result<bool> {
        self.stub
            .get_state(key)
            .await
            .map(|raw| raw.is_some())
            .map_err(|source| ForumError::Read { key: key.to_string(), source })
    }

    async fn ensure_vacant(&self, kind: EntityKind, key: &str) -> Result<()> {
        if self.exists(key).await? {
            return Err(ForumError::already_exists(kind, key));
        }
        Ok(())
    }

    // User

    pub async fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.read(id).await
    }

    pub async fn user(&self, id: &str) -> Result<User> {
        self.get_user(id)
            .await?
            .ok_or_else(|| ForumError::not_found(EntityKind::User, id))
    }

    pub async fn put_user(&self, user: &User) -> Result<()> {
        self.write(&user.id, user).await
    }

    pub async fn create_user(&self, user: &User) -> Result<()> {
        self.ensure_vacant(EntityKind::User, &user.id).await?;
        self.put_user(user).await
    }

    // Community

    pub async fn get_community(&self, id: &str) -> Result<Option<Community>> {
        self.read(id).await
    }

    pub async fn community(&self, id: &str) -> Result<Community> {
        self.get_community(id)
            .await?
            .ok_or_else(|| ForumError::not_found(EntityKind::Community, id))
    }

    pub async fn put_community(&self, community: &Community) -> Result<()> {
        self.write(&community.id, community).await
    }

    pub async fn create_community(&self, community: &Community) -> Result<()> {
        self.ensure_vacant(EntityKind::Community, &community.id).await?;
        self.put_community(community).await
    }

    // Post

    pub async fn get_post(&self, id: &str) -> Result<Option<Post>> {
        self.read(id).await
    }

    pub async fn post(&self, id: &str) -> Result<Post> {
        self.get_post(id)
            .await?
            .ok_or_else(|| ForumError::not_found(EntityKind::Post, id))
    }

    pub async fn put_post(&self, post: &Post) -> Result<()> {
        self.write(&post.id, post).await
    }

    pub async fn create_post(&self, post: &Post) -> Result<()> {
        self.ensure_vacant(EntityKind::Post, &post.id).await?;
        self.put_post(post).await
    }

    // Comment

    pub async fn get_comment(&self, id: &str) -> Result<Option<Comment>> {
        self.read(id).await
    }

    pub async fn comment(&self, id: &str) -> Result<Comment> {
        self.get_comment(id)
            .await?
            .ok_or_else(|| ForumError::not_found(EntityKind::Comment, id))
    }

    pub async fn put_comment(&self, comment: &Comment) -> Result<()> {
        self.write(&comment.id, comment).await
    }

    pub async fn create_comment(&self, comment: &Comment) -> Result<()> {
        self.ensure_vacant(EntityKind::Comment, &comment.id).await?;
        self.put_comment(comment).await
    }

    // Post or Comment, resolved by reference

    pub async fn item(&self, item: &ItemRef) -> Result<Item> {
        match item {
            ItemRef::Post(id) => self.post(id).await.map(Item::Post),
            ItemRef::Comment(id) => self.comment(id).await.map(Item::Comment),
        }
    }

    pub async fn put_item(&self, item: &Item) -> Result<()> {
        match item {
            Item::Post(p) => self.put_post(p).await,
            Item::Comment(c) => self.put_comment(c).await,
        }
    }

    // MetaData

    /// The community-name index; empty until the first community exists.
    pub async fn metadata(&self) -> Result<MetaData> {
        Ok(self.read(METADATA_KEY).await?.unwrap_or_default())
    }

    pub async fn put_metadata(&self, metadata: &MetaData) -> Result<()> {
        self.write(METADATA_KEY, metadata).await
    }
}
