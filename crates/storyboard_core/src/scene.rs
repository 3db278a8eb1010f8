//! Parsed scene records.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// One scene unit parsed from a storyboard script.
///
/// Scenes are immutable once parsed. Their order in a parse is the order the
/// blocks appeared in the source text.
///
/// # Examples
///
/// ```
/// use storyboard_core::Scene;
///
/// let scene = Scene::new(1, "Scene 1", "A dog runs.", Some("Anna".to_string()), "Scene 1: ...");
/// assert_eq!(*scene.sequence_number(), 1);
/// assert_eq!(scene.character_name(), Some("Anna"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct Scene {
    /// Number following the scene marker in the header
    sequence_number: u32,
    /// Display label, e.g. "Scene 3"
    label: String,
    /// Generation instruction for this scene
    prompt_text: String,
    /// Character name; `None` when absent or given as the "none" sentinel
    #[getter(skip)]
    character_name: Option<String>,
    /// Full original text block, header included
    raw_block: String,
}

impl Scene {
    /// Create a new scene.
    pub fn new(
        sequence_number: u32,
        label: impl Into<String>,
        prompt_text: impl Into<String>,
        character_name: Option<String>,
        raw_block: impl Into<String>,
    ) -> Self {
        Self {
            sequence_number,
            label: label.into(),
            prompt_text: prompt_text.into(),
            character_name,
            raw_block: raw_block.into(),
        }
    }

    /// Character name used for reference lookup, if any.
    pub fn character_name(&self) -> Option<&str> {
        self.character_name.as_deref()
    }
}
