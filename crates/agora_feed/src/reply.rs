//! The moderation-gated reply pipeline.
//!
//! A new comment enters here: context assembly first, then the moderation
//! gate. Rejection ends the request by hiding the comment; acceptance picks
//! a non-self persona, generates a reply in its voice, and persists it as a
//! child comment.

use crate::context::{ContextAssembler, ReplyContext};
use crate::moderation::ModerationGate;
use crate::{prompts, selector};
use agora_core::config::FeedConfig;
use agora_core::{Comment, FeedError, NewComment, Result, Store, TextGenerator};
use std::sync::Arc;
use uuid::Uuid;

/// How a moderated comment left the pipeline.
#[derive(Debug, Clone)]
pub enum ReplyOutcome {
    /// The gate rejected the comment; it has been hidden and no reply was
    /// generated.
    Suppressed,
    /// The gate accepted the comment and this reply was inserted.
    Replied(Comment),
}

pub struct ReplyPipeline {
    store: Arc<dyn Store>,
    generator: Arc<dyn TextGenerator>,
    assembler: ContextAssembler,
    gate: ModerationGate,
}

impl ReplyPipeline {
    pub fn new(
        store: Arc<dyn Store>,
        generator: Arc<dyn TextGenerator>,
        config: &FeedConfig,
    ) -> Self {
        Self {
            assembler: ContextAssembler::new(store.clone(), config.history_limit),
            gate: ModerationGate::new(generator.clone()),
            store,
            generator,
        }
    }

    /// Moderate the comment and, if it passes, answer it in persona voice.
    pub async fn respond(&self, comment_id: Uuid) -> Result<ReplyOutcome> {
        let ctx = self.assembler.assemble(comment_id).await?;

        let accepted = self
            .gate
            .evaluate(
                Some(&ctx.comment.content),
                &ctx.post.content,
                &ctx.feed.title,
                &ctx.subject.name,
            )
            .await?;

        if !accepted {
            tracing::info!("comment {} rejected by moderation, hiding", comment_id);
            self.store
                .set_comment_visibility(comment_id, false)
                .await?
                .ok_or(FeedError::Persistence { entity: "comment" })?;
            return Ok(ReplyOutcome::Suppressed);
        }

        let pool = self.store.personas_for_subject(ctx.subject.id).await?;
        if pool.is_empty() {
            return Err(FeedError::not_found("personas for subject", ctx.subject.id));
        }
        let responder = selector::pick_responder(&pool, ctx.target_author_id)?;

        let reply = self.generate_reply(&ctx, responder).await?;
        let comment = self
            .store
            .insert_comment(NewComment {
                post_id: ctx.post.id,
                parent_comment_id: Some(comment_id),
                author_id: responder.id,
                content: reply,
            })
            .await?
            .ok_or(FeedError::Persistence { entity: "comment" })?;

        Ok(ReplyOutcome::Replied(comment))
    }

    async fn generate_reply(
        &self,
        ctx: &ReplyContext,
        responder: &agora_core::Persona,
    ) -> Result<String> {
        let prompt = prompts::reply_prompt(
            &selector::display_name(responder),
            &ctx.subject.name,
            &ctx.subject.general_prompt,
            &responder.prompt,
            &ctx.commenter_name,
            &ctx.history,
            &ctx.comment.content,
        );
        let text = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|e| FeedError::upstream("reply generation", e))?;
        Ok(text.trim().to_string())
    }
}
