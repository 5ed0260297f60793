//! Mock generators — deterministic responses for testing without API keys.

use agora_core::TextGenerator;
use anyhow::Result;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// Returns a queue of pre-scripted responses, one per call. When the queue
/// is exhausted, returns the fallback text.
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<String>>,
    fallback: String,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(String::from).collect()),
            fallback: String::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// A generator that answers every call with the same text.
    pub fn always(text: &str) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback: text.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Scripted responses first, then `fallback` for every later call.
    pub fn with_fallback(responses: Vec<&str>, fallback: &str) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(String::from).collect()),
            fallback: fallback.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut queue = self.responses.lock().await;
        Ok(queue.pop_front().unwrap_or_else(|| self.fallback.clone()))
    }
}

/// Fails every call with the configured message.
pub struct FailingGenerator {
    message: String,
}

impl FailingGenerator {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        anyhow::bail!("{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_pops_in_order_then_falls_back() {
        let gen = ScriptedGenerator::with_fallback(vec!["one", "two"], "done");
        assert_eq!(gen.generate("p").await.unwrap(), "one");
        assert_eq!(gen.generate("p").await.unwrap(), "two");
        assert_eq!(gen.generate("p").await.unwrap(), "done");
        assert_eq!(gen.generate("p").await.unwrap(), "done");
        assert_eq!(gen.calls(), 4);
    }

    #[tokio::test]
    async fn test_failing_generator_errors() {
        let gen = FailingGenerator::new("boom");
        let err = gen.generate("p").await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }
}
