//! Feed population: the multi-phase batch orchestrator.
//!
//! Two entry points share the same post/comment phases. `populate` fills an
//! existing feed; `seed` first persists a persona roster and creates the
//! feed row, then fills it. Phases run strictly in order — posts, then
//! comments under each post — and a failed insert aborts the request with
//! whatever was already created left in place (no rollback).

use crate::extraction::PersonaSketch;
use crate::language::{detect_locale, Locale};
use crate::personas::PersonaDirectory;
use crate::{prompts, selector};
use agora_core::config::FeedConfig;
use agora_core::{
    Feed, FeedError, NewComment, NewFeed, NewPost, Persona, Post, Result, Store, Subject,
    TextGenerator,
};
use std::sync::Arc;
use uuid::Uuid;

/// Which prompt family the phases render.
#[derive(Clone, Copy)]
enum PromptStyle {
    /// Filling an existing feed: casual voice, emojis allowed.
    Population,
    /// Seeding a new feed from a roster: strict historical voice.
    Seed,
}

#[derive(Debug, Clone)]
pub struct PopulationReport {
    pub feed_id: Uuid,
    pub posts_created: usize,
    pub comments_created: usize,
    pub topic: String,
}

pub struct FeedPopulator {
    store: Arc<dyn Store>,
    generator: Arc<dyn TextGenerator>,
    directory: PersonaDirectory,
    min_persona_pool: usize,
}

impl FeedPopulator {
    pub fn new(
        store: Arc<dyn Store>,
        generator: Arc<dyn TextGenerator>,
        config: &FeedConfig,
    ) -> Self {
        Self {
            directory: PersonaDirectory::new(store.clone()),
            store,
            generator,
            min_persona_pool: config.min_persona_pool,
        }
    }

    /// Fill an existing feed with `num_posts` posts and
    /// `num_comments_per_post` comments under each, rotating the subject's
    /// persona pool.
    pub async fn populate(
        &self,
        feed_id: Uuid,
        topic: &str,
        num_posts: usize,
        num_comments_per_post: usize,
    ) -> Result<PopulationReport> {
        let feed = self
            .store
            .feed(feed_id)
            .await?
            .ok_or_else(|| FeedError::not_found("feed", feed_id))?;
        let subject = self
            .store
            .subject(feed.subject_id)
            .await?
            .ok_or_else(|| FeedError::not_found("subject", feed.subject_id))?;

        let pool = self.store.personas_for_subject(subject.id).await?;
        self.check_pool(&pool)?;

        let locale = detect_locale(topic);
        let posts = self
            .posts_phase(&feed, &subject, &pool, topic, locale, PromptStyle::Population, num_posts)
            .await?;
        let comments_created = self
            .comments_phase(
                &feed,
                &subject,
                &pool,
                &posts,
                topic,
                locale,
                PromptStyle::Population,
                num_comments_per_post,
            )
            .await?;

        tracing::info!(
            "populated feed {}: {} posts, {} comments",
            feed.id,
            posts.len(),
            comments_created
        );
        Ok(PopulationReport {
            feed_id: feed.id,
            posts_created: posts.len(),
            comments_created,
            topic: topic.to_string(),
        })
    }

    /// Create a feed for a subject from a persona roster, then fill it.
    ///
    /// The roster is upserted by (subject, name) and every member gets its
    /// User row before authoring anything.
    pub async fn seed(
        &self,
        subject_id: Uuid,
        topic: &str,
        global_prompt: &str,
        roster: &[PersonaSketch],
        num_posts: usize,
        num_comments_per_post: usize,
    ) -> Result<PopulationReport> {
        let subject = self
            .store
            .subject(subject_id)
            .await?
            .ok_or_else(|| FeedError::not_found("subject", subject_id))?;

        if roster.len() < self.min_persona_pool {
            return Err(FeedError::Precondition(format!(
                "feed seeding needs at least {} personas, roster has {}",
                self.min_persona_pool,
                roster.len()
            )));
        }

        let pool = self.directory.upsert_all(subject_id, roster).await?;
        for persona in &pool {
            self.directory.ensure_user(persona).await?;
        }

        let feed = self
            .store
            .insert_feed(NewFeed {
                subject_id,
                title: topic.to_string(),
                global_prompt: global_prompt.to_string(),
            })
            .await?
            .ok_or(FeedError::Persistence { entity: "feed" })?;

        let locale = detect_locale(topic);
        let posts = self
            .posts_phase(&feed, &subject, &pool, topic, locale, PromptStyle::Seed, num_posts)
            .await?;
        let comments_created = self
            .comments_phase(
                &feed,
                &subject,
                &pool,
                &posts,
                topic,
                locale,
                PromptStyle::Seed,
                num_comments_per_post,
            )
            .await?;

        tracing::info!(
            "seeded feed {} for subject {}: {} posts, {} comments",
            feed.id,
            subject_id,
            posts.len(),
            comments_created
        );
        Ok(PopulationReport {
            feed_id: feed.id,
            posts_created: posts.len(),
            comments_created,
            topic: topic.to_string(),
        })
    }

    fn check_pool(&self, pool: &[Persona]) -> Result<()> {
        if pool.len() < self.min_persona_pool {
            return Err(FeedError::Precondition(format!(
                "feed population needs a pool of at least {} personas, found {}",
                self.min_persona_pool,
                pool.len()
            )));
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn posts_phase(
        &self,
        feed: &Feed,
        subject: &Subject,
        pool: &[Persona],
        topic: &str,
        locale: Locale,
        style: PromptStyle,
        num_posts: usize,
    ) -> Result<Vec<Post>> {
        let mut posts = Vec::with_capacity(num_posts);
        for i in 0..num_posts {
            let persona = selector::rotate(pool, i);
            let name = selector::display_name(persona);
            let prompt = match style {
                PromptStyle::Population => prompts::population_post_prompt(
                    &feed.global_prompt,
                    &name,
                    topic,
                    &subject.general_prompt,
                    &persona.prompt,
                    locale,
                ),
                PromptStyle::Seed => prompts::seed_post_prompt(
                    &feed.global_prompt,
                    &name,
                    topic,
                    &subject.general_prompt,
                    &persona.prompt,
                    locale,
                ),
            };
            let content = self
                .generator
                .generate(&prompt)
                .await
                .map_err(|e| FeedError::upstream("post generation", e))?;

            // Referential precondition: the author's User row must exist
            // before the post insert.
            self.directory.ensure_user(persona).await?;
            let post = self
                .store
                .insert_post(NewPost {
                    feed_id: feed.id,
                    author_id: persona.id,
                    content: content.trim().to_string(),
                })
                .await?
                .ok_or(FeedError::Persistence { entity: "post" })?;
            posts.push(post);
        }
        Ok(posts)
    }

    #[allow(clippy::too_many_arguments)]
    async fn comments_phase(
        &self,
        feed: &Feed,
        subject: &Subject,
        pool: &[Persona],
        posts: &[Post],
        topic: &str,
        locale: Locale,
        style: PromptStyle,
        num_comments_per_post: usize,
    ) -> Result<usize> {
        let mut comments_created = 0;
        for post in posts {
            let eligible = selector::eligible_commenters(pool, post.author_id);
            if eligible.is_empty() {
                return Err(FeedError::Precondition(format!(
                    "no persona other than the author of post {} is available to comment",
                    post.id
                )));
            }
            let post_author = pool
                .iter()
                .find(|p| p.id == post.author_id)
                .map(selector::display_name)
                .unwrap_or_else(|| post.author_id.to_string());

            for j in 0..num_comments_per_post {
                let persona = selector::rotate(&eligible, j);
                let name = selector::display_name(persona);
                let prompt = match style {
                    PromptStyle::Population => prompts::population_comment_prompt(
                        &feed.global_prompt,
                        &name,
                        topic,
                        &subject.general_prompt,
                        &persona.prompt,
                        &post_author,
                        &post.content,
                        locale,
                    ),
                    PromptStyle::Seed => prompts::seed_comment_prompt(
                        &feed.global_prompt,
                        &name,
                        topic,
                        &subject.general_prompt,
                        &persona.prompt,
                        &post_author,
                        &post.content,
                        locale,
                    ),
                };
                let content = self
                    .generator
                    .generate(&prompt)
                    .await
                    .map_err(|e| FeedError::upstream("comment generation", e))?;

                self.directory.ensure_user(persona).await?;
                self.store
                    .insert_comment(NewComment {
                        post_id: post.id,
                        parent_comment_id: None,
                        author_id: persona.id,
                        content: content.trim().to_string(),
                    })
                    .await?
                    .ok_or(FeedError::Persistence { entity: "comment" })?;
                comments_created += 1;
            }
        }
        Ok(comments_created)
    }
}
