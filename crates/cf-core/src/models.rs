//! # Domain Models
//!
//! These structs are the records stored on the ledger, one JSON document per
//! key. Field names follow the camelCase wire shape; the aliases accept
//! records written by earlier revisions of the contract, which used the Go
//! field names verbatim for untagged fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key of the singleton community-name index.
pub const METADATA_KEY: &str = "md";

/// A registered forum member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub communities: Vec<String>,
    #[serde(default)]
    pub posts: Vec<String>,
    #[serde(default)]
    pub comments: Vec<String>,
    #[serde(default, alias = "Reputation")]
    pub reputation: i64,
}

impl User {
    pub fn new(id: impl Into<String>, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            email: email.into(),
            communities: Vec::new(),
            posts: Vec::new(),
            comments: Vec::new(),
            reputation: 0,
        }
    }
}

/// A community (the REST surface calls it a "channel").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    pub id: String,
    pub name: String,
    pub description: String,
    pub creator: String,
    #[serde(with = "crate::ids::ledger_time")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub moderators: Vec<String>,
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub posts: Vec<String>,
    /// Post/Comment IDs waiting for moderator review.
    #[serde(default, alias = "Appealed")]
    pub appealed: Vec<String>,
}

/// Voting and moderation state shared by posts and comments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemState {
    #[serde(default)]
    pub score: i64,
    #[serde(default, alias = "Hidden")]
    pub hidden: bool,
    #[serde(default, alias = "HideCount")]
    pub hide_count: i64,
    #[serde(default, alias = "ShowCount")]
    pub show_count: i64,
    #[serde(default, alias = "UpVote")]
    pub up_vote: Vec<String>,
    #[serde(default, alias = "DownVote")]
    pub down_vote: Vec<String>,
    #[serde(default, alias = "HideVote")]
    pub hide_vote: Vec<String>,
    #[serde(default, alias = "ShowVote")]
    pub show_vote: Vec<String>,
}

/// A top-level post inside a community. IDs start with `p`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    #[serde(with = "crate::ids::ledger_time")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub comments: Vec<String>,
    #[serde(alias = "Community")]
    pub community: String,
    #[serde(flatten)]
    pub state: ItemState,
}

/// A reply to a post or to another comment. IDs start with `c`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub author: String,
    #[serde(with = "crate::ids::ledger_time")]
    pub created_at: DateTime<Utc>,
    /// Post or Comment ID, distinguished by prefix.
    #[serde(alias = "Parent")]
    pub parent: String,
    #[serde(default)]
    pub replies: Vec<String>,
    #[serde(alias = "Community")]
    pub community: String,
    #[serde(flatten)]
    pub state: ItemState,
}

/// One entry of the community-name index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityName {
    pub id: String,
    pub name: String,
}

/// The singleton index stored under [`METADATA_KEY`]. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaData {
    pub id: String,
    #[serde(default)]
    pub name: Vec<CommunityName>,
}

impl Default for MetaData {
    fn default() -> Self {
        Self {
            id: METADATA_KEY.to_string(),
            name: Vec::new(),
        }
    }
}

impl MetaData {
    pub fn lookup(&self, community_id: &str) -> Option<&str> {
        self.name
            .iter()
            .find(|entry| entry.id == community_id)
            .map(|entry| entry.name.as_str())
    }
}

/// A post or a comment loaded from the ledger, for operations that treat both
/// the same way (voting, moderation, appeals).
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Post(Post),
    Comment(Comment),
}

impl Item {
    pub fn id(&self) -> &str {
        match self {
            Item::Post(p) => &p.id,
            Item::Comment(c) => &c.id,
        }
    }

    pub fn author(&self) -> &str {
        match self {
            Item::Post(p) => &p.author,
            Item::Comment(c) => &c.author,
        }
    }

    pub fn community(&self) -> &str {
        match self {
            Item::Post(p) => &p.community,
            Item::Comment(c) => &c.community,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Item::Post(p) => p.created_at,
            Item::Comment(c) => c.created_at,
        }
    }

    pub fn state(&self) -> &ItemState {
        match self {
            Item::Post(p) => &p.state,
            Item::Comment(c) => &c.state,
        }
    }

    pub fn state_mut(&mut self) -> &mut ItemState {
        match self {
            Item::Post(p) => &mut p.state,
            Item::Comment(c) => &mut c.state,
        }
    }

    /// Immediate children: `comments` of a post, `replies` of a comment.
    pub fn children(&self) -> &[String] {
        match self {
            Item::Post(p) => &p.comments,
            Item::Comment(c) => &c.replies,
        }
    }

    pub fn children_mut(&mut self) -> &mut Vec<String> {
        match self {
            Item::Post(p) => &mut p.comments,
            Item::Comment(c) => &mut c.replies,
        }
    }
}

/// Appends `id` unless already present. Returns whether the list changed.
pub fn insert_unique(list: &mut Vec<String>, id: &str) -> bool {
    if list.iter().any(|x| x == id) {
        return false;
    }
    list.push(id.to_string());
    true
}

/// Removes every occurrence of `id`. Returns whether the list changed.
pub fn remove_id(list: &mut Vec<String>, id: &str) -> bool {
    let before = list.len();
    list.retain(|x| x != id);
    list.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_serializes_flat_camel_case() {
        let post = Post {
            id: "p1".into(),
            title: "Hello".into(),
            content: "Hello Rust!".into(),
            author: "u1".into(),
            created_at: "2024-01-02T03:04:05.000Z".parse().unwrap(),
            comments: vec![],
            community: "co1".into(),
            state: ItemState {
                score: 3,
                up_vote: vec!["u2".into()],
                ..Default::default()
            },
        };
        let value = serde_json::to_value(&post).unwrap();
        assert_eq!(value["createdAt"], json!("2024-01-02T03:04:05.000Z"));
        assert_eq!(value["score"], json!(3));
        assert_eq!(value["upVote"], json!(["u2"]));
        assert_eq!(value["hideCount"], json!(0));
        assert!(value.get("state").is_none());
    }

    #[test]
    fn test_reads_earlier_revision_records() {
        let raw = json!({
            "id": "p9",
            "title": "old",
            "content": "x",
            "author": "u1",
            "score": -2,
            "createdAt": "2024-01-02T03:04:05Z",
            "comments": ["c1"],
            "Hidden": true,
            "Community": "co1",
            "HideCount": 2
        });
        let post: Post = serde_json::from_value(raw).unwrap();
        assert!(post.state.hidden);
        assert_eq!(post.state.hide_count, 2);
        assert_eq!(post.state.score, -2);
        assert_eq!(post.community, "co1");
        assert!(post.state.show_vote.is_empty());
        let rewritten = serde_json::to_value(&post).unwrap();
        assert_eq!(rewritten["createdAt"], json!("2024-01-02T03:04:05.000Z"));

        let user: User = serde_json::from_value(json!({
            "id": "u1", "username": "a", "email": "a@x", "communities": [], "posts": [], "Reputation": 7
        }))
        .unwrap();
        assert_eq!(user.reputation, 7);
        assert!(user.comments.is_empty());
    }

    #[test]
    fn test_unique_list_helpers() {
        let mut list = vec!["a".to_string()];
        assert!(!insert_unique(&mut list, "a"));
        assert!(insert_unique(&mut list, "b"));
        assert!(remove_id(&mut list, "a"));
        assert!(!remove_id(&mut list, "a"));
        assert_eq!(list, vec!["b".to_string()]);
    }

    #[test]
    fn test_metadata_lookup() {
        let mut md = MetaData::default();
        md.name.push(CommunityName { id: "co1".into(), name: "Rust".into() });
        assert_eq!(md.lookup("co1"), Some("Rust"));
        assert_eq!(md.lookup("co2"), None);
        assert_eq!(md.id, METADATA_KEY);
    }
}
