//! Caller-visible failure taxonomy for the pipeline.
//!
//! Four categories, surfaced with enough context (entity, id, stage) for the
//! caller to retry or escalate. Nothing here is retried automatically; the
//! only retry loop in the system is the bounded one inside extraction.

use thiserror::Error;
use uuid::Uuid;

pub type Result<T, E = FeedError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum FeedError {
    /// A required linked entity is missing or invisible.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    /// The request cannot proceed as stated (pool too small, no eligible
    /// non-self persona).
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// The generation service failed or returned output that no parse
    /// layer could use. Distinct from a fail-closed moderation verdict,
    /// which is a successful call with a non-matching reply.
    #[error("generation failed during {stage}")]
    Upstream {
        stage: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// The store reported no row where a created or updated row was
    /// required. Aborts the remaining steps of a multi-step request;
    /// already-inserted rows are left in place.
    #[error("store created no {entity} row")]
    Persistence { entity: &'static str },

    /// Transport-level store error.
    #[error("store error")]
    Store(#[from] anyhow::Error),
}

impl FeedError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn upstream(stage: &'static str, source: anyhow::Error) -> Self {
        Self::Upstream { stage, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_entity_and_id() {
        let id = Uuid::new_v4();
        let err = FeedError::not_found("comment", id);
        let msg = err.to_string();
        assert!(msg.contains("comment"));
        assert!(msg.contains(&id.to_string()));
    }

    #[test]
    fn test_upstream_keeps_source() {
        let err = FeedError::upstream("moderation", anyhow::anyhow!("timeout"));
        assert!(err.to_string().contains("moderation"));
        let source = std::error::Error::source(&err).expect("source");
        assert!(source.to_string().contains("timeout"));
    }
}
