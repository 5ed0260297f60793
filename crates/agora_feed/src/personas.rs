//! Persona persistence: upsert-by-name and lazy user creation.
//!
//! Persona names are unique per subject, so saving a sketch that already
//! exists returns the existing row instead of duplicating it. Before a
//! persona first authors content it needs a User row with the same id —
//! the referential precondition for post and comment inserts.

use crate::extraction::PersonaSketch;
use crate::selector;
use agora_core::{FeedError, NewPersona, Persona, Result, Store, User};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub struct PersonaDirectory {
    store: Arc<dyn Store>,
}

impl PersonaDirectory {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Upsert a persona by (subject_id, name). Re-running with an existing
    /// pair returns the stored row and creates nothing.
    ///
    /// Concurrent requests can race this check-then-insert; the store's
    /// uniqueness constraint is the backstop, not this method.
    pub async fn upsert(&self, subject_id: Uuid, sketch: &PersonaSketch) -> Result<Persona> {
        if let Some(existing) = self.store.persona_by_name(subject_id, &sketch.name).await? {
            return Ok(existing);
        }
        self.store
            .insert_persona(NewPersona {
                subject_id,
                name: sketch.name.clone(),
                prompt: sketch.description.clone(),
            })
            .await?
            .ok_or(FeedError::Persistence { entity: "persona" })
    }

    /// Upsert a whole roster, preserving order.
    pub async fn upsert_all(
        &self,
        subject_id: Uuid,
        sketches: &[PersonaSketch],
    ) -> Result<Vec<Persona>> {
        let mut personas = Vec::with_capacity(sketches.len());
        for sketch in sketches {
            personas.push(self.upsert(subject_id, sketch).await?);
        }
        Ok(personas)
    }

    /// Create the persona's User row if it does not exist yet. Must run
    /// before the persona's first post or comment insert.
    pub async fn ensure_user(&self, persona: &Persona) -> Result<()> {
        if self.store.user(persona.id).await?.is_some() {
            return Ok(());
        }

        let name = selector::display_name(persona);
        // Timestamp suffix keeps usernames unique across same-named
        // personas on different subjects.
        let username = format!(
            "{}_{}",
            name.to_lowercase().replace(' ', "_"),
            Utc::now().timestamp()
        );
        let created = self
            .store
            .insert_user(User {
                id: persona.id,
                name,
                username,
                role: "student".to_string(),
            })
            .await?;
        if created.is_none() {
            return Err(FeedError::Persistence { entity: "user" });
        }
        tracing::debug!("created user row for persona {}", persona.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_store::MemoryStore;

    fn sketch(name: &str, description: &str) -> PersonaSketch {
        PersonaSketch {
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_per_subject_and_name() {
        let store = Arc::new(MemoryStore::new());
        let subject = store.add_subject("History", "").await;
        let directory = PersonaDirectory::new(store.clone());

        let first = directory
            .upsert(subject.id, &sketch("Ada Lovelace", "Mathematician"))
            .await
            .unwrap();
        let second = directory
            .upsert(subject.id, &sketch("Ada Lovelace", "Different background"))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.persona_count().await, 1);
        // The existing row wins; the new background is not applied.
        assert_eq!(second.prompt, "Mathematician");
    }

    #[tokio::test]
    async fn test_same_name_on_other_subject_is_a_new_persona() {
        let store = Arc::new(MemoryStore::new());
        let history = store.add_subject("History", "").await;
        let literature = store.add_subject("Literature", "").await;
        let directory = PersonaDirectory::new(store.clone());

        let a = directory
            .upsert(history.id, &sketch("Goethe", "Statesman"))
            .await
            .unwrap();
        let b = directory
            .upsert(literature.id, &sketch("Goethe", "Poet"))
            .await
            .unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(store.persona_count().await, 2);
    }

    #[tokio::test]
    async fn test_ensure_user_creates_once() {
        let store = Arc::new(MemoryStore::new());
        let subject = store.add_subject("History", "").await;
        let persona = store.add_persona(subject.id, "Ada Lovelace", "bg").await;
        let directory = PersonaDirectory::new(store.clone());

        directory.ensure_user(&persona).await.unwrap();
        directory.ensure_user(&persona).await.unwrap();

        assert_eq!(store.user_count().await, 1);
        let user = store.user(persona.id).await.unwrap().unwrap();
        assert_eq!(user.id, persona.id);
        assert_eq!(user.name, "Ada Lovelace");
        assert!(user.username.starts_with("ada_lovelace_"));
        assert_eq!(user.role, "student");
    }
}
