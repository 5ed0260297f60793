pub mod config;
pub mod entities;
pub mod error;

pub use config::AgoraConfig;
pub use entities::{
    Comment, Feed, Interaction, NewComment, NewFeed, NewPersona, NewPost, Persona, Post, Subject,
    User,
};
pub use error::{FeedError, Result};

use async_trait::async_trait;
use uuid::Uuid;

/// Produces free text for a prompt. No structural guarantee on the output:
/// it may be malformed, fenced, or ignore the requested format entirely.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Typed accessors over the persisted entities.
///
/// Reads return `Ok(None)` when the row does not exist. Writes return
/// `Ok(None)` when the store reported that no row was created or updated —
/// callers treat that as a persistence failure where a row was required.
/// `Err` is reserved for transport-level store errors.
#[async_trait]
pub trait Store: Send + Sync {
    async fn subject(&self, id: Uuid) -> anyhow::Result<Option<Subject>>;
    async fn feed(&self, id: Uuid) -> anyhow::Result<Option<Feed>>;
    async fn post(&self, id: Uuid) -> anyhow::Result<Option<Post>>;
    async fn comment(&self, id: Uuid) -> anyhow::Result<Option<Comment>>;
    /// A comment that exists but has `is_visible = false` is `Ok(None)`.
    async fn visible_comment(&self, id: Uuid) -> anyhow::Result<Option<Comment>>;
    async fn user(&self, id: Uuid) -> anyhow::Result<Option<User>>;

    async fn personas_for_subject(&self, subject_id: Uuid) -> anyhow::Result<Vec<Persona>>;
    async fn persona_by_name(
        &self,
        subject_id: Uuid,
        name: &str,
    ) -> anyhow::Result<Option<Persona>>;

    /// Most recent interactions for a user, newest first, at most `limit`.
    async fn recent_interactions(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> anyhow::Result<Vec<Interaction>>;

    async fn insert_feed(&self, feed: NewFeed) -> anyhow::Result<Option<Feed>>;
    async fn insert_post(&self, post: NewPost) -> anyhow::Result<Option<Post>>;
    async fn insert_comment(&self, comment: NewComment) -> anyhow::Result<Option<Comment>>;
    async fn insert_persona(&self, persona: NewPersona) -> anyhow::Result<Option<Persona>>;
    async fn insert_user(&self, user: User) -> anyhow::Result<Option<User>>;

    async fn set_comment_visibility(
        &self,
        id: Uuid,
        visible: bool,
    ) -> anyhow::Result<Option<Comment>>;
}
