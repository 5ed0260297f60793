//! Persisted record shapes. Field names are the external contract shared
//! with the relational store and must stay stable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A course-level topic area. Created once by an admin action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: Uuid,
    pub name: String,
    pub general_prompt: String,
}

/// A discussion feed under a subject. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub title: String,
    pub global_prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub feed_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub is_visible: bool,
}

/// A comment on a post. `parent_comment_id` forms a reply tree; the tree is
/// never traversed in bulk — lineage is followed one parent link at a time.
///
/// `is_visible` is the only mutable field: flipped false when the moderation
/// gate rejects the comment, never flipped back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub parent_comment_id: Option<Uuid>,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub is_visible: bool,
}

/// A named historical or literary identity authorized to author content.
/// Name is unique within a subject; creation goes through upsert-by-name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub name: String,
    /// Behavioral background injected into generation prompts.
    pub prompt: String,
    /// Policy: personas represent real people, never invented figures.
    pub is_real_person: bool,
}

/// A platform identity. Every persona that authors content gets a User row
/// with the same id before its first post or comment is inserted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub role: String,
}

/// One direct question/answer exchange. Append-only; read here only as
/// conversational context, bounded to the most recent few per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub user_id: Uuid,
    pub message: String,
    pub reply: String,
    pub timestamp: DateTime<Utc>,
}

// Insert shapes: the store assigns id / created_at / visibility defaults.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFeed {
    pub subject_id: Uuid,
    pub title: String,
    pub global_prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
    pub feed_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub post_id: Uuid,
    pub parent_comment_id: Option<Uuid>,
    pub author_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPersona {
    pub subject_id: Uuid,
    pub name: String,
    pub prompt: String,
}
