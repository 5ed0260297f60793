//! The generation-and-moderation pipeline for persona-attributed feeds.
//!
//! Components take their collaborators (`Store`, `TextGenerator`) as
//! injected `Arc<dyn …>` handles, so every piece is testable against the
//! in-memory store and a scripted generator.

pub mod context;
pub mod extraction;
pub mod language;
pub mod moderation;
pub mod personas;
pub mod populate;
pub mod prompts;
pub mod providers;
pub mod reply;
pub mod selector;

pub use context::{ContextAssembler, ReplyContext};
pub use extraction::{parse_persona_list, PersonaExtractor, PersonaSketch};
pub use language::{detect_locale, Locale};
pub use moderation::ModerationGate;
pub use personas::PersonaDirectory;
pub use populate::{FeedPopulator, PopulationReport};
pub use reply::{ReplyOutcome, ReplyPipeline};
