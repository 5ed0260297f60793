//! In-memory `Store` implementation.
//!
//! The production relational store lives behind the `Store` trait as an
//! external collaborator; this implementation backs local runs and the
//! integration test suite. Each request path takes the table lock once per
//! operation — concurrent requests interleave exactly as they would against
//! a shared remote store, with no cross-request mutual exclusion.

use agora_core::{
    Comment, Feed, Interaction, NewComment, NewFeed, NewPersona, NewPost, Persona, Post, Store,
    Subject, User,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    subjects: HashMap<Uuid, Subject>,
    feeds: HashMap<Uuid, Feed>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
    personas: HashMap<Uuid, Persona>,
    users: HashMap<Uuid, User>,
    interactions: Vec<Interaction>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Seeding helpers (not part of the Store contract)
    // ------------------------------------------------------------------

    pub async fn add_subject(&self, name: &str, general_prompt: &str) -> Subject {
        let subject = Subject {
            id: Uuid::new_v4(),
            name: name.to_string(),
            general_prompt: general_prompt.to_string(),
        };
        self.tables
            .write()
            .await
            .subjects
            .insert(subject.id, subject.clone());
        subject
    }

    pub async fn add_feed(&self, subject_id: Uuid, title: &str, global_prompt: &str) -> Feed {
        let feed = Feed {
            id: Uuid::new_v4(),
            subject_id,
            title: title.to_string(),
            global_prompt: global_prompt.to_string(),
        };
        self.tables.write().await.feeds.insert(feed.id, feed.clone());
        feed
    }

    pub async fn add_persona(&self, subject_id: Uuid, name: &str, prompt: &str) -> Persona {
        let persona = Persona {
            id: Uuid::new_v4(),
            subject_id,
            name: name.to_string(),
            prompt: prompt.to_string(),
            is_real_person: true,
        };
        self.tables
            .write()
            .await
            .personas
            .insert(persona.id, persona.clone());
        persona
    }

    pub async fn add_user(&self, id: Uuid, name: &str, username: &str, role: &str) -> User {
        let user = User {
            id,
            name: name.to_string(),
            username: username.to_string(),
            role: role.to_string(),
        };
        self.tables.write().await.users.insert(user.id, user.clone());
        user
    }

    pub async fn record_interaction(
        &self,
        user_id: Uuid,
        message: &str,
        reply: &str,
        timestamp: DateTime<Utc>,
    ) {
        self.tables.write().await.interactions.push(Interaction {
            user_id,
            message: message.to_string(),
            reply: reply.to_string(),
            timestamp,
        });
    }

    // ------------------------------------------------------------------
    // Inspection helpers for tests
    // ------------------------------------------------------------------

    pub async fn post_count(&self) -> usize {
        self.tables.read().await.posts.len()
    }

    pub async fn comment_count(&self) -> usize {
        self.tables.read().await.comments.len()
    }

    pub async fn persona_count(&self) -> usize {
        self.tables.read().await.personas.len()
    }

    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    pub async fn posts_for_feed(&self, feed_id: Uuid) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .tables
            .read()
            .await
            .posts
            .values()
            .filter(|p| p.feed_id == feed_id)
            .cloned()
            .collect();
        posts.sort_by_key(|p| p.created_at);
        posts
    }

    pub async fn comments_for_post(&self, post_id: Uuid) -> Vec<Comment> {
        let mut comments: Vec<Comment> = self
            .tables
            .read()
            .await
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);
        comments
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn subject(&self, id: Uuid) -> Result<Option<Subject>> {
        Ok(self.tables.read().await.subjects.get(&id).cloned())
    }

    async fn feed(&self, id: Uuid) -> Result<Option<Feed>> {
        Ok(self.tables.read().await.feeds.get(&id).cloned())
    }

    async fn post(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn comment(&self, id: Uuid) -> Result<Option<Comment>> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn visible_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        Ok(self
            .tables
            .read()
            .await
            .comments
            .get(&id)
            .filter(|c| c.is_visible)
            .cloned())
    }

    async fn user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn personas_for_subject(&self, subject_id: Uuid) -> Result<Vec<Persona>> {
        let mut personas: Vec<Persona> = self
            .tables
            .read()
            .await
            .personas
            .values()
            .filter(|p| p.subject_id == subject_id)
            .cloned()
            .collect();
        // Stable order so rotation and responder picks are deterministic.
        personas.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(personas)
    }

    async fn persona_by_name(&self, subject_id: Uuid, name: &str) -> Result<Option<Persona>> {
        Ok(self
            .tables
            .read()
            .await
            .personas
            .values()
            .find(|p| p.subject_id == subject_id && p.name == name)
            .cloned())
    }

    async fn recent_interactions(&self, user_id: Uuid, limit: usize) -> Result<Vec<Interaction>> {
        let mut hits: Vec<Interaction> = self
            .tables
            .read()
            .await
            .interactions
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn insert_feed(&self, feed: NewFeed) -> Result<Option<Feed>> {
        let row = Feed {
            id: Uuid::new_v4(),
            subject_id: feed.subject_id,
            title: feed.title,
            global_prompt: feed.global_prompt,
        };
        self.tables.write().await.feeds.insert(row.id, row.clone());
        Ok(Some(row))
    }

    async fn insert_post(&self, post: NewPost) -> Result<Option<Post>> {
        let row = Post {
            id: Uuid::new_v4(),
            feed_id: post.feed_id,
            author_id: post.author_id,
            content: post.content,
            created_at: Utc::now(),
            is_visible: true,
        };
        self.tables.write().await.posts.insert(row.id, row.clone());
        Ok(Some(row))
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<Option<Comment>> {
        let row = Comment {
            id: Uuid::new_v4(),
            post_id: comment.post_id,
            parent_comment_id: comment.parent_comment_id,
            author_id: comment.author_id,
            content: comment.content,
            created_at: Utc::now(),
            is_visible: true,
        };
        self.tables
            .write()
            .await
            .comments
            .insert(row.id, row.clone());
        Ok(Some(row))
    }

    async fn insert_persona(&self, persona: NewPersona) -> Result<Option<Persona>> {
        let row = Persona {
            id: Uuid::new_v4(),
            subject_id: persona.subject_id,
            name: persona.name,
            prompt: persona.prompt,
            is_real_person: true,
        };
        self.tables
            .write()
            .await
            .personas
            .insert(row.id, row.clone());
        Ok(Some(row))
    }

    async fn insert_user(&self, user: User) -> Result<Option<User>> {
        self.tables.write().await.users.insert(user.id, user.clone());
        Ok(Some(user))
    }

    async fn set_comment_visibility(&self, id: Uuid, visible: bool) -> Result<Option<Comment>> {
        let mut tables = self.tables.write().await;
        match tables.comments.get_mut(&id) {
            Some(comment) => {
                comment.is_visible = visible;
                Ok(Some(comment.clone()))
            }
            None => Ok(None),
        }
    }
}
