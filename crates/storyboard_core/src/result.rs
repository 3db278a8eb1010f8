//! Per-scene generation outcomes.

use crate::{CharacterId, ImageData, ResultId, Scene};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Lifecycle state of one generation result.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    /// Waiting for (or undergoing) generation
    #[display("pending")]
    Pending,
    /// An image was produced
    #[display("succeeded")]
    Succeeded,
    /// All attempts failed
    #[display("failed")]
    Failed,
    /// The run was stopped before this scene completed
    #[display("cancelled")]
    Cancelled,
}

impl GenerationStatus {
    /// Whether the status is final for the current run.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GenerationStatus::Pending)
    }
}

/// The generation outcome for one scene instance.
///
/// Text fields are copied from the [`Scene`] at creation and are editable
/// afterwards. The payload is present only while the status is
/// [`GenerationStatus::Succeeded`].
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct GenerationResult {
    /// Identity, independent of the scene number
    id: ResultId,
    /// Scene number copied from the parse
    sequence_number: u32,
    /// Display label, e.g. "Scene 2"
    scene_label: String,
    /// Prompt shown to the user (dialogue intact)
    prompt_text: String,
    /// Script block shown to the user
    scene_script_text: String,
    /// Current lifecycle state
    status: GenerationStatus,
    #[getter(skip)]
    payload: Option<Arc<ImageData>>,
    #[getter(skip)]
    character_ref_id: Option<CharacterId>,
    #[getter(skip)]
    last_error: Option<String>,
}

impl GenerationResult {
    /// Create a pending result for a scene.
    pub fn from_scene(scene: &Scene, character_ref_id: Option<CharacterId>) -> Self {
        Self {
            id: ResultId::new(),
            sequence_number: *scene.sequence_number(),
            scene_label: scene.label().clone(),
            prompt_text: scene.prompt_text().clone(),
            scene_script_text: scene.raw_block().clone(),
            status: GenerationStatus::Pending,
            payload: None,
            character_ref_id,
            last_error: None,
        }
    }

    /// Generated image, if the result succeeded.
    pub fn payload(&self) -> Option<&Arc<ImageData>> {
        self.payload.as_ref()
    }

    /// Weak reference into the character registry.
    pub fn character_ref_id(&self) -> Option<CharacterId> {
        self.character_ref_id
    }

    /// Message of the last failed attempt, if the result failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Reset to pending, dropping any payload.
    pub fn mark_pending(&mut self) {
        self.status = GenerationStatus::Pending;
        self.payload = None;
        self.last_error = None;
    }

    /// Record a generated image.
    pub fn mark_succeeded(&mut self, payload: Arc<ImageData>) {
        self.status = GenerationStatus::Succeeded;
        self.payload = Some(payload);
        self.last_error = None;
    }

    /// Record exhausted attempts.
    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.status = GenerationStatus::Failed;
        self.payload = None;
        self.last_error = Some(message.into());
    }

    /// Record that the run stopped before this scene completed.
    pub fn mark_cancelled(&mut self) {
        self.status = GenerationStatus::Cancelled;
        self.payload = None;
        self.last_error = None;
    }

    /// Replace the displayed prompt.
    pub fn set_prompt_text(&mut self, prompt_text: impl Into<String>) {
        self.prompt_text = prompt_text.into();
    }

    /// Replace the displayed script block.
    pub fn set_scene_script_text(&mut self, scene_script_text: impl Into<String>) {
        self.scene_script_text = scene_script_text.into();
    }

    /// Point the result at a different character, or none.
    pub fn set_character_ref_id(&mut self, character_ref_id: Option<CharacterId>) {
        self.character_ref_id = character_ref_id;
    }

    /// Copy every field under a fresh identifier ("save as new").
    pub fn duplicate(&self) -> Self {
        Self {
            id: ResultId::new(),
            ..self.clone()
        }
    }
}
