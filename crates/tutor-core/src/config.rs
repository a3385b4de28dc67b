use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, TutorError};

/// Top-level configuration for the tutoring engine.
///
/// Loaded from a TOML file; every section falls back to defaults carrying
/// the tuned constants. Thresholds are configuration, not contracts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TutorConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl TutorConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TutorConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file does not
    /// exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| TutorError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// Session orchestration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Whether the engine accepts messages at all.
    pub enabled: bool,
    /// Maximum message length in characters.
    pub max_message_length: usize,
    /// Minutes of inactivity before a session expires.
    pub session_timeout_minutes: u32,
    /// Deadline for a single generation call, in seconds.
    pub generation_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_message_length: 2000,
            session_timeout_minutes: 30,
            generation_timeout_secs: 30,
        }
    }
}

/// Conversational memory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Number of most recent turns forwarded on continuation.
    pub window: usize,
    /// Estimated-token threshold above which summarization is recommended.
    pub summarize_threshold_tokens: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            window: 3,
            summarize_threshold_tokens: 2000,
        }
    }
}

/// Partitioned retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Expected dimensionality of query embeddings.
    pub embedding_dimensions: usize,
    /// Minimum similarity score for overview-partition matches.
    pub overview_threshold: f32,
    /// Result cap for the overview partition.
    pub overview_limit: usize,
    /// Minimum similarity score for knowledge-base matches.
    pub knowledge_base_threshold: f32,
    /// Result cap for the knowledge-base partition.
    pub knowledge_base_limit: usize,
    /// Overview score above which the overview result wins outright.
    pub strong_overview_score: f32,
    /// How many knowledge-base results survive arbitration.
    pub knowledge_base_top: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            embedding_dimensions: 1024,
            overview_threshold: 0.70,
            overview_limit: 2,
            knowledge_base_threshold: 0.55,
            knowledge_base_limit: 5,
            strong_overview_score: 0.80,
            knowledge_base_top: 3,
        }
    }
}
