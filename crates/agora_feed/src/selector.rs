//! Persona selection: single-response picks and batch round-robin rotation.
//!
//! Both modes are deterministic over pool order — no randomness, so a given
//! pool and index always produce the same author.

use agora_core::{FeedError, Persona, Result};
use uuid::Uuid;

/// First pool member whose id differs from the forbidden author, preserving
/// pool order. Used for single-reply generation: the responder must never be
/// the author being responded to.
pub fn pick_responder(pool: &[Persona], forbidden_author: Uuid) -> Result<&Persona> {
    pool.iter()
        .find(|p| p.id != forbidden_author)
        .ok_or_else(|| {
            FeedError::Precondition(format!(
                "no suitable persona to respond: pool of {} contains only author {}",
                pool.len(),
                forbidden_author
            ))
        })
}

/// Batch rotation: `pool[index % len]`. Panics on an empty pool, so callers
/// check their preconditions first.
pub fn rotate(pool: &[Persona], index: usize) -> &Persona {
    &pool[index % pool.len()]
}

/// Pool filtered for the comments phase: everyone except the post's author.
pub fn eligible_commenters(pool: &[Persona], post_author: Uuid) -> Vec<Persona> {
    pool.iter()
        .filter(|p| p.id != post_author)
        .cloned()
        .collect()
}

/// Display name, with a synthesized placeholder for personas whose name is
/// blank (can happen for rows referenced before their listing was filled in).
pub fn display_name(persona: &Persona) -> String {
    if persona.name.trim().is_empty() {
        format!("Persona_{}", persona.id)
    } else {
        persona.name.clone()
    }
}
