//! Rule-based content moderation via a single classifier call.
//!
//! The verdict is the generated text compared literally against "true";
//! anything else — including malformed output — is a reject. Fail closed.
//! A transport failure on the call is not a verdict and propagates as an
//! upstream error instead.

use agora_core::{FeedError, Result, TextGenerator};
use std::sync::Arc;

pub struct ModerationGate {
    generator: Arc<dyn TextGenerator>,
}

impl ModerationGate {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Classify candidate content as acceptable (`true`) or not.
    ///
    /// `comment` is absent when a top-level post itself is being screened.
    /// One generation call, no retry.
    pub async fn evaluate(
        &self,
        comment: Option<&str>,
        post: &str,
        feed_title: &str,
        subject: &str,
    ) -> Result<bool> {
        let prompt = build_prompt(comment, post, feed_title, subject);
        let reply = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|e| FeedError::upstream("moderation", e))?;

        let verdict = reply.trim().eq_ignore_ascii_case("true");
        if !verdict {
            tracing::debug!(
                "moderation rejected content, raw verdict: {:?}",
                reply.trim().chars().take(40).collect::<String>()
            );
        }
        Ok(verdict)
    }
}

fn build_prompt(comment: Option<&str>, post: &str, feed_title: &str, subject: &str) -> String {
    let mut prompt = String::from("I have this ");
    if let Some(comment) = comment {
        prompt.push_str(&format!("comment: '{}', under the ", comment));
    }
    prompt.push_str(&format!(
        "post:'{}', which is on the feed: '{}', on the subject of: '{}'. Using ONLY THE WORDS(!!!) True or False please determine whether this comment is considered appropriate in an educational and respectful discussion. \n",
        post, feed_title, subject
    ));
    prompt.push_str("When judging please do so by the following STRICT criteria:\n");
    prompt.push_str("1. The comment is too short to make sense, or just doesn't make sense in general\n");
    prompt.push_str("2. The comment is / mostly consists of repeated characters\n");
    prompt.push_str("3. The comment **CONTAINS ANY PROFANITY, HATE SPEECH, OR OFFENSIVE LANGUAGE WHATSOEVER. This is ABSOLUTELY UNACCEPTABLE in an educational environment.**\n\n");
    prompt.push_str("4. The comment is irrelevant to the subject at hand.\n");
    prompt.push_str("5. The comment uses only Emojis of any kind\n");
    prompt.push_str("6. The comment is an exact copy of the post\n");
    prompt.push_str("Examples:\n");
    prompt.push_str("Comment: 'Hello', Post: 'General', Feed: 'Welcome', Subject: 'Introduction' -> True\n");
    prompt.push_str("Comment: 'asdfasdf', Post: 'Tech', Feed: 'Coding', Subject: 'Debugging' -> False\n");
    prompt.push_str("Comment: 'fuck you', Post: 'Sports', Feed: 'Discussion', Subject: 'Game Recap' -> False\n");
    prompt.push_str("Comment: 'This is great!', Post: 'Art', Feed: 'Critique', Subject: 'Painting' -> True\n");
    prompt.push_str("Comment: 'can I get a high five?', Post:'I am Leonardo Da Vinci, AMA', Feed: 'Famous Artists', Subject: 'History' -> False");
    prompt.push_str("\nBased on the criteria and examples, should the answer be True or False?");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::{FailingGenerator, ScriptedGenerator};

    #[test]
    fn test_prompt_mentions_comment_only_when_present() {
        let with = build_prompt(Some("nice post"), "p", "f", "s");
        assert!(with.starts_with("I have this comment: 'nice post', under the post:'p'"));

        let without = build_prompt(None, "p", "f", "s");
        assert!(without.starts_with("I have this post:'p'"));
    }

    #[test]
    fn test_prompt_carries_all_six_criteria() {
        let prompt = build_prompt(Some("c"), "p", "f", "s");
        for n in 1..=6 {
            assert!(prompt.contains(&format!("{}. ", n)), "criterion {} missing", n);
        }
        assert!(prompt.contains("-> True"));
        assert!(prompt.contains("-> False"));
    }

    #[tokio::test]
    async fn test_literal_true_accepts() {
        let gate = ModerationGate::new(Arc::new(ScriptedGenerator::always("  True \n")));
        assert!(gate.evaluate(Some("hello"), "p", "f", "s").await.unwrap());
    }

    #[tokio::test]
    async fn test_anything_else_rejects() {
        for reply in ["False", "probably true", "Yes", "", "```true```"] {
            let gate = ModerationGate::new(Arc::new(ScriptedGenerator::always(reply)));
            assert!(
                !gate.evaluate(Some("hello"), "p", "f", "s").await.unwrap(),
                "reply {:?} should reject",
                reply
            );
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_upstream_not_verdict() {
        let gate = ModerationGate::new(Arc::new(FailingGenerator::new("service down")));
        let err = gate.evaluate(Some("hello"), "p", "f", "s").await.unwrap_err();
        assert!(matches!(err, FeedError::Upstream { stage: "moderation", .. }));
    }
}
