//! Layered configuration.
//!
//! The configuration system supports:
//! - Bundled defaults (include_str! from storyboard.toml)
//! - User overrides (~/.config/storyboard/storyboard.toml, then ./storyboard.toml)
//! - Automatic merging with user values taking precedence

use crate::AspectRatio;
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use storyboard_error::{ConfigError, StoryboardError, StoryboardResult};
use tracing::{debug, instrument};

/// Retry and prompt-sanitising settings for the generation pipeline.
///
/// # Example
///
/// ```toml
/// [generation]
/// max_attempts = 3
/// retry_delay_ms = 5000
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Total attempts per scene (first call plus retries)
    pub max_attempts: usize,
    /// Fixed pause between attempts, in milliseconds
    pub retry_delay_ms: u64,
    /// Aspect ratio used when the session does not choose one
    pub default_aspect_ratio: AspectRatio,
    /// Minimum length of a quoted span treated as dialogue
    pub dialogue_min_chars: usize,
    /// Text substituted for stripped dialogue
    pub dialogue_placeholder: String,
}

impl GenerationConfig {
    /// Pause between attempts.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_ms: 5000,
            default_aspect_ratio: AspectRatio::Widescreen,
            dialogue_min_chars: 15,
            dialogue_placeholder: "(character is speaking)".to_string(),
        }
    }
}

/// Vocabulary of the semi-structured script format.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Words that open a scene header ("Scene 3:")
    pub scene_markers: Vec<String>,
    /// Every label that terminates a preceding field
    pub field_labels: Vec<String>,
    /// Label introducing the generation prompt
    pub prompt_label: String,
    /// Label introducing the character name
    pub character_label: String,
    /// Character value meaning "no character"
    pub none_sentinel: String,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            scene_markers: vec!["Scene".to_string(), "Cảnh".to_string()],
            field_labels: [
                "Character",
                "Prompt",
                "Setting",
                "Action",
                "Dialogue",
                "Camera",
                "Sound",
                "Duration",
                "Notes",
            ]
            .iter()
            .map(|label| label.to_string())
            .collect(),
            prompt_label: "Prompt".to_string(),
            character_label: "Character".to_string(),
            none_sentinel: "None".to_string(),
        }
    }
}

/// Connection settings for the Gemini image model.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Model identifier
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// REST endpoint root
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash-image".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

/// Top-level storyboard configuration.
///
/// # Example
///
/// ```no_run
/// use storyboard_core::StoryboardConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = StoryboardConfig::load()?;
/// println!("Attempts per scene: {}", config.generation.max_attempts);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct StoryboardConfig {
    /// Pipeline settings
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Script grammar
    #[serde(default)]
    pub script: ScriptConfig,
    /// Image model settings
    #[serde(default)]
    pub gemini: GeminiConfig,
}

impl StoryboardConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> StoryboardResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                StoryboardError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                StoryboardError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Load configuration with precedence: user override > bundled default.
    ///
    /// Configuration sources in order of precedence (later sources override earlier):
    /// 1. Bundled defaults (storyboard.toml shipped with the library)
    /// 2. User config in home directory (~/.config/storyboard/storyboard.toml)
    /// 3. User config in current directory (./storyboard.toml)
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> StoryboardResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../../../storyboard.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/storyboard/storyboard.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("storyboard").required(false));

        builder
            .build()
            .map_err(|e| {
                StoryboardError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                StoryboardError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }
}
