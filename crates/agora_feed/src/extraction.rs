//! Structured extraction: turning a freeform persona listing into typed
//! name/description records.
//!
//! The parse is layered, most-structured first: fence stripping, a YAML
//! document parse with wrapper-key unwrapping, direct field matching, then
//! a line-splitting heuristic. Later layers are deliberately more permissive
//! and only run when the earlier ones fail. The generate+parse cycle retries
//! under a hard attempt ceiling and returns the final attempt's yield —
//! callers must tolerate getting fewer records than they asked for.

use crate::language::detect_locale;
use crate::prompts;
use agora_core::{FeedError, Result, TextGenerator};
use std::sync::Arc;

/// One extracted persona record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaSketch {
    pub name: String,
    pub description: String,
}

/// Mapping keys a model tends to wrap the list in despite instructions.
const WRAPPER_KEYS: [&str; 4] = ["personas", "דמויות", "characters", "list"];

/// Parse a freeform generation into persona records. Never fails; an
/// unusable input yields an empty list.
pub fn parse_persona_list(raw: &str) -> Vec<PersonaSketch> {
    let stripped = strip_fences(raw.trim());
    let filtered = skip_leading_prose(&stripped);

    let mut sketches = Vec::new();
    match serde_yaml::from_str::<serde_yaml::Value>(&filtered) {
        Ok(value) => match unwrap_sequence(value) {
            Some(items) => {
                for item in items {
                    if let Some(sketch) = sketch_from_mapping(&item) {
                        sketches.push(sketch);
                    }
                }
            }
            None => split_lines(&filtered, &mut sketches),
        },
        Err(e) => {
            tracing::debug!("structured parse failed, using line heuristic: {}", e);
            split_lines(&filtered, &mut sketches);
        }
    }

    sketches.retain(|s| !s.name.is_empty() && !s.description.is_empty());
    sketches
}

/// Remove leading/trailing fenced-code markers.
fn strip_fences(text: &str) -> String {
    let mut result = text.trim();
    if let Some(rest) = result.strip_prefix("```yaml") {
        result = rest.trim_start();
    }
    if let Some(rest) = result.strip_prefix("```") {
        result = rest.trim_start();
    }
    if let Some(rest) = result.strip_suffix("```") {
        result = rest.trim_end();
    }
    result.to_string()
}

/// Drop any prose before the first line that starts a YAML sequence or
/// mapping. If no such line exists the text is kept whole.
fn skip_leading_prose(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines
        .iter()
        .position(|line| {
            let t = line.trim_start();
            t.starts_with('-') || t.starts_with('{')
        })
        .unwrap_or(0);
    lines[start..].join("\n")
}

/// A parsed document is usable when it is a sequence, or a mapping wrapping
/// a sequence under one of the known keys.
fn unwrap_sequence(value: serde_yaml::Value) -> Option<Vec<serde_yaml::Value>> {
    if value.is_sequence() {
        return value.as_sequence().cloned();
    }
    if value.is_mapping() {
        return WRAPPER_KEYS
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_sequence()).cloned());
    }
    None
}

/// Accept a mapping exposing a name and a background field. The listing
/// prompt asks for 'prompt'; 'description' is accepted as an alias.
fn sketch_from_mapping(item: &serde_yaml::Value) -> Option<PersonaSketch> {
    if !item.is_mapping() {
        return None;
    }
    let get = |key: &str| item.get(key).and_then(serde_yaml::Value::as_str);
    let name = get("name")?;
    let description = get("prompt").or_else(|| get("description"))?;
    Some(PersonaSketch {
        name: name.trim().to_string(),
        description: description.trim().to_string(),
    })
}

/// Last-resort heuristic: one record per non-blank line, split on the first
/// colon, else the first dash; a line with neither becomes a name-only
/// record (dropped later by the empty-description filter).
fn split_lines(text: &str, sketches: &mut Vec<PersonaSketch>) {
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (name, description) = if let Some((name, rest)) = line.split_once(':') {
            (name, rest)
        } else if let Some((name, rest)) = line.split_once('-') {
            (name, rest)
        } else {
            (line, "")
        };
        sketches.push(PersonaSketch {
            name: name.trim().to_string(),
            description: description.trim().to_string(),
        });
    }
}

/// Drives the bounded generate+parse cycle for persona listings.
pub struct PersonaExtractor {
    generator: Arc<dyn TextGenerator>,
    max_attempts: usize,
}

impl PersonaExtractor {
    pub fn new(generator: Arc<dyn TextGenerator>, max_attempts: usize) -> Self {
        Self {
            generator,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Generate up to `count` persona records for a topic.
    ///
    /// Each attempt issues a fresh generation call and re-parses from
    /// scratch. Stops early once the yield reaches `count`; after the last
    /// attempt the final yield is returned as-is, short or not. A transport
    /// failure propagates immediately — only under-yield is retried.
    pub async fn generate(&self, topic: &str, count: usize) -> Result<Vec<PersonaSketch>> {
        let locale = detect_locale(topic);
        let prompt = prompts::persona_listing_prompt(count, topic, locale);

        let mut sketches = Vec::new();
        for attempt in 1..=self.max_attempts {
            let raw = self
                .generator
                .generate(&prompt)
                .await
                .map_err(|e| FeedError::upstream("persona listing", e))?;
            sketches = parse_persona_list(&raw);
            if sketches.len() >= count {
                break;
            }
            tracing::warn!(
                "persona listing attempt {}/{} yielded {} of {} requested",
                attempt,
                self.max_attempts,
                sketches.len(),
                count
            );
        }
        Ok(sketches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::{FailingGenerator, ScriptedGenerator};

    const CLEAN_LIST: &str = "\
- name: Ada Lovelace
  prompt: Wrote the first published algorithm for the Analytical Engine.
- name: Charles Babbage
  prompt: Designed the Analytical Engine.
- name: Mary Somerville
  prompt: Tutored Lovelace in mathematics.";

    #[test]
    fn test_parse_clean_yaml_list() {
        let sketches = parse_persona_list(CLEAN_LIST);
        assert_eq!(sketches.len(), 3);
        assert_eq!(sketches[0].name, "Ada Lovelace");
        assert!(sketches[1].description.contains("Analytical Engine"));
    }

    #[test]
    fn test_parse_fenced_variant_yields_same_records() {
        let fenced = format!(
            "Here are the figures you asked for:\n```yaml\n{}\n```",
            CLEAN_LIST
        );
        assert_eq!(parse_persona_list(&fenced), parse_persona_list(CLEAN_LIST));
    }

    #[test]
    fn test_parse_wrapper_key_unwrapped() {
        let wrapped = "personas:\n  - name: Ada Lovelace\n    prompt: Mathematician.\n  - name: Charles Babbage\n    prompt: Engineer.";
        let sketches = parse_persona_list(wrapped);
        assert_eq!(sketches.len(), 2);
        assert_eq!(sketches[1].name, "Charles Babbage");
    }

    #[test]
    fn test_parse_description_alias_accepted() {
        let listing = "- name: Ada Lovelace\n  description: Mathematician.";
        let sketches = parse_persona_list(listing);
        assert_eq!(sketches.len(), 1);
        assert_eq!(sketches[0].description, "Mathematician.");
    }

    #[test]
    fn test_line_heuristic_on_plain_text() {
        let text = "Ada Lovelace: first programmer\nCharles Babbage - engine designer\nnobody";
        let sketches = parse_persona_list(text);
        // "nobody" has no separator, so its empty description drops it.
        assert_eq!(sketches.len(), 2);
        assert_eq!(sketches[0].name, "Ada Lovelace");
        assert_eq!(sketches[0].description, "first programmer");
        assert_eq!(sketches[1].name, "Charles Babbage");
        assert_eq!(sketches[1].description, "engine designer");
    }

    #[test]
    fn test_empty_fields_always_dropped() {
        let listing = "- name: ''\n  prompt: Orphaned background.\n- name: Kept\n  prompt: Valid.";
        let sketches = parse_persona_list(listing);
        assert_eq!(sketches.len(), 1);
        assert_eq!(sketches[0].name, "Kept");
        assert!(sketches
            .iter()
            .all(|s| !s.name.is_empty() && !s.description.is_empty()));
    }

    #[test]
    fn test_garbage_yields_nothing() {
        assert!(parse_persona_list("").is_empty());
        assert!(parse_persona_list("I cannot help with that request").is_empty());
    }

    #[tokio::test]
    async fn test_extractor_retries_until_yield_sufficient() {
        let gen = Arc::new(ScriptedGenerator::new(vec![
            "- name: Ada Lovelace\n  prompt: Mathematician.",
            CLEAN_LIST,
        ]));
        let extractor = PersonaExtractor::new(gen.clone(), 3);
        let sketches = extractor.generate("computing", 3).await.unwrap();
        assert_eq!(sketches.len(), 3);
        assert_eq!(gen.calls(), 2);
    }

    #[tokio::test]
    async fn test_extractor_returns_final_short_yield_after_ceiling() {
        let gen = Arc::new(ScriptedGenerator::always(
            "- name: Ada Lovelace\n  prompt: Mathematician.",
        ));
        let extractor = PersonaExtractor::new(gen.clone(), 3);
        let sketches = extractor.generate("computing", 5).await.unwrap();
        assert_eq!(sketches.len(), 1);
        assert_eq!(gen.calls(), 3);
    }

    #[tokio::test]
    async fn test_extractor_propagates_transport_failure() {
        let extractor = PersonaExtractor::new(Arc::new(FailingGenerator::new("down")), 3);
        let err = extractor.generate("computing", 5).await.unwrap_err();
        assert!(matches!(err, FeedError::Upstream { stage: "persona listing", .. }));
    }
}
