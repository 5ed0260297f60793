//! Conversational context assembly for reply generation.
//!
//! Resolves the thread lineage one link at a time — comment, post, feed,
//! subject — and figures out the target author the reply must not reuse.
//! Any broken link is a not-found failure naming the entity, never a
//! generation failure.

use agora_core::{Comment, Feed, FeedError, Post, Result, Store, Subject};
use std::sync::Arc;
use uuid::Uuid;

/// Everything a reply prompt needs about one triggering comment.
#[derive(Debug, Clone)]
pub struct ReplyContext {
    pub comment: Comment,
    pub post: Post,
    pub feed: Feed,
    pub subject: Subject,
    /// Author of the parent comment if there is one, else the post author.
    /// The responding persona must differ from this id.
    pub target_author_id: Uuid,
    /// Display name of the comment's author, for the history section.
    pub commenter_name: String,
    /// Recent question/answer exchanges, rendered as alternating Q/A lines.
    pub history: String,
}

pub struct ContextAssembler {
    store: Arc<dyn Store>,
    history_limit: usize,
}

impl ContextAssembler {
    pub fn new(store: Arc<dyn Store>, history_limit: usize) -> Self {
        Self {
            store,
            history_limit,
        }
    }

    pub async fn assemble(&self, comment_id: Uuid) -> Result<ReplyContext> {
        // An invisible comment is treated as not found: suppressed content
        // never re-enters the pipeline.
        let comment = self
            .store
            .visible_comment(comment_id)
            .await?
            .ok_or_else(|| FeedError::not_found("comment", comment_id))?;

        let post = self
            .store
            .post(comment.post_id)
            .await?
            .filter(|p| p.is_visible)
            .ok_or_else(|| FeedError::not_found("post", comment.post_id))?;

        let feed = self
            .store
            .feed(post.feed_id)
            .await?
            .ok_or_else(|| FeedError::not_found("feed", post.feed_id))?;

        let subject = self
            .store
            .subject(feed.subject_id)
            .await?
            .ok_or_else(|| FeedError::not_found("subject", feed.subject_id))?;

        let target_author_id = match comment.parent_comment_id {
            Some(parent_id) => {
                self.store
                    .comment(parent_id)
                    .await?
                    .ok_or_else(|| FeedError::not_found("parent comment", parent_id))?
                    .author_id
            }
            None => post.author_id,
        };

        let commenter_name = match self.store.user(comment.author_id).await? {
            Some(user) => user.name,
            None => "a participant".to_string(),
        };

        let history = self.render_history(comment.author_id).await?;

        Ok(ReplyContext {
            comment,
            post,
            feed,
            subject,
            target_author_id,
            commenter_name,
            history,
        })
    }

    async fn render_history(&self, user_id: Uuid) -> Result<String> {
        let interactions = self
            .store
            .recent_interactions(user_id, self.history_limit)
            .await?;
        Ok(interactions
            .iter()
            .map(|i| format!("Q: {}\nA: {}", i.message, i.reply))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::{NewComment, NewPost};
    use agora_store::MemoryStore;
    use chrono::{Duration, Utc};

    struct Fixture {
        store: Arc<MemoryStore>,
        post: Post,
        author: agora_core::Persona,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let subject = store.add_subject("History", "19th century Europe").await;
        let feed = store.add_feed(subject.id, "Revolutions of 1848", "").await;
        let author = store.add_persona(subject.id, "Metternich", "Chancellor").await;
        let post = store
            .insert_post(NewPost {
                feed_id: feed.id,
                author_id: author.id,
                content: "Order must prevail.".into(),
            })
            .await
            .unwrap()
            .unwrap();
        Fixture {
            store,
            post,
            author,
        }
    }

    async fn add_comment(fx: &Fixture, author_id: Uuid, parent: Option<Uuid>) -> Comment {
        fx.store
            .insert_comment(NewComment {
                post_id: fx.post.id,
                parent_comment_id: parent,
                author_id,
                content: "Why though?".into(),
            })
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_target_author_is_post_author_without_parent() {
        let fx = fixture().await;
        let student = Uuid::new_v4();
        let comment = add_comment(&fx, student, None).await;

        let assembler = ContextAssembler::new(fx.store.clone(), 3);
        let ctx = assembler.assemble(comment.id).await.unwrap();

        assert_eq!(ctx.target_author_id, fx.author.id);
        assert_eq!(ctx.subject.name, "History");
        assert_eq!(ctx.commenter_name, "a participant");
        assert!(ctx.history.is_empty());
    }

    #[tokio::test]
    async fn test_target_author_is_parent_comment_author() {
        let fx = fixture().await;
        let first_author = Uuid::new_v4();
        let parent = add_comment(&fx, first_author, None).await;
        let reply = add_comment(&fx, Uuid::new_v4(), Some(parent.id)).await;

        let assembler = ContextAssembler::new(fx.store.clone(), 3);
        let ctx = assembler.assemble(reply.id).await.unwrap();

        assert_eq!(ctx.target_author_id, first_author);
    }

    #[tokio::test]
    async fn test_invisible_comment_is_not_found() {
        let fx = fixture().await;
        let comment = add_comment(&fx, Uuid::new_v4(), None).await;
        fx.store
            .set_comment_visibility(comment.id, false)
            .await
            .unwrap();

        let assembler = ContextAssembler::new(fx.store.clone(), 3);
        let err = assembler.assemble(comment.id).await.unwrap_err();
        assert!(matches!(err, FeedError::NotFound { entity: "comment", .. }));
    }

    #[tokio::test]
    async fn test_history_renders_newest_first_bounded_to_limit() {
        let fx = fixture().await;
        let student = Uuid::new_v4();
        fx.store.add_user(student, "Dana", "dana", "student").await;
        let base = Utc::now();
        for i in 0..4 {
            fx.store
                .record_interaction(
                    student,
                    &format!("question {}", i),
                    &format!("answer {}", i),
                    base + Duration::seconds(i),
                )
                .await;
        }
        let comment = add_comment(&fx, student, None).await;

        let assembler = ContextAssembler::new(fx.store.clone(), 3);
        let ctx = assembler.assemble(comment.id).await.unwrap();

        assert_eq!(ctx.commenter_name, "Dana");
        assert!(ctx.history.starts_with("Q: question 3\nA: answer 3"));
        assert!(ctx.history.contains("question 1"));
        assert!(!ctx.history.contains("question 0"));
    }

    #[tokio::test]
    async fn test_missing_parent_is_not_found() {
        let fx = fixture().await;
        let ghost_parent = Uuid::new_v4();
        let comment = add_comment(&fx, Uuid::new_v4(), Some(ghost_parent)).await;

        let assembler = ContextAssembler::new(fx.store.clone(), 3);
        let err = assembler.assemble(comment.id).await.unwrap_err();
        assert!(
            matches!(err, FeedError::NotFound { entity: "parent comment", id } if id == ghost_parent)
        );
    }
}
