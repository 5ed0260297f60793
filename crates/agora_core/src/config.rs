use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AgoraConfig {
    pub llm: LlmConfig,
    pub feed: FeedConfig,
}

impl AgoraConfig {
    /// Load config from a TOML file, falling back to defaults for missing
    /// fields. After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: AgoraConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if file doesn't exist, return defaults with
    /// env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("LLM_BASE_URL") {
            self.llm.base_url = Some(v);
        }
        if let Ok(v) = std::env::var("LLM_MAX_TOKENS") {
            if let Ok(n) = v.parse() {
                self.llm.max_tokens = n;
            }
        }
        if let Ok(v) = std::env::var("LLM_TEMPERATURE") {
            if let Ok(n) = v.parse() {
                self.llm.temperature = n;
            }
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            base_url: None,
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Posts created per feed-population request.
    pub num_initial_posts: usize,
    /// Comments created under each post.
    pub num_comments_per_post: usize,
    /// Smallest persona pool a feed may be populated from.
    pub min_persona_pool: usize,
    /// How many recent interactions are rendered into a reply prompt.
    pub history_limit: usize,
    /// Hard ceiling on generate+parse cycles during persona extraction.
    pub extraction_max_attempts: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            num_initial_posts: 8,
            num_comments_per_post: 8,
            min_persona_pool: 3,
            history_limit: 3,
            extraction_max_attempts: 3,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = AgoraConfig::default();
        assert_eq!(cfg.llm.model, "gemini-1.5-flash");
        assert_eq!(cfg.feed.num_initial_posts, 8);
        assert_eq!(cfg.feed.min_persona_pool, 3);
        assert_eq!(cfg.feed.extraction_max_attempts, 3);
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml_str = r#"
[llm]
model = "gemini-2.0-flash"
"#;
        let cfg: AgoraConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.llm.model, "gemini-2.0-flash");
        // Defaults for unspecified fields
        assert_eq!(cfg.llm.max_tokens, 1024);
        assert_eq!(cfg.feed.num_comments_per_post, 8);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[llm]
model = "gemini-1.5-pro"
base_url = "https://generativelanguage.googleapis.com/v1beta"
max_tokens = 2048
temperature = 0.9

[feed]
num_initial_posts = 5
num_comments_per_post = 2
min_persona_pool = 4
history_limit = 5
extraction_max_attempts = 2
"#;
        let cfg: AgoraConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.llm.model, "gemini-1.5-pro");
        assert_eq!(cfg.llm.max_tokens, 2048);
        assert_eq!(cfg.feed.num_initial_posts, 5);
        assert_eq!(cfg.feed.num_comments_per_post, 2);
        assert_eq!(cfg.feed.min_persona_pool, 4);
        assert_eq!(cfg.feed.history_limit, 5);
        assert_eq!(cfg.feed.extraction_max_attempts, 2);
    }

    #[test]
    fn test_env_overrides_and_defaults() {
        std::env::set_var("LLM_MODEL", "gemini-exp");
        std::env::set_var("LLM_MAX_TOKENS", "512");

        let mut cfg = AgoraConfig::default();
        cfg.apply_env_overrides();

        assert_eq!(cfg.llm.model, "gemini-exp");
        assert_eq!(cfg.llm.max_tokens, 512);

        std::env::remove_var("LLM_MODEL");
        std::env::remove_var("LLM_MAX_TOKENS");

        // Nonexistent path returns defaults (no env interference)
        let cfg = AgoraConfig::load_or_default("/nonexistent/path.toml");
        assert_eq!(cfg.feed.history_limit, 3);
    }
}
