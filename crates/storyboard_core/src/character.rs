//! Character reference images and the per-session registry.

use crate::{CharacterId, ImageData};
use derive_getters::Getters;
use std::path::Path;
use std::sync::Arc;
use storyboard_error::{ConfigError, IoError, StoryboardResult};
use tracing::{debug, instrument};

/// A user-supplied image pinned to a named character.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct CharacterReference {
    /// Stable identifier for the session
    id: CharacterId,
    /// User-editable label matched against scene character names
    name: String,
    /// Reference image
    image: Arc<ImageData>,
}

impl CharacterReference {
    /// Create a reference with a fresh identifier.
    pub fn new(name: impl Into<String>, image: ImageData) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            image: Arc::new(image),
        }
    }

    /// Load a reference image from disk.
    ///
    /// The MIME type is inferred from the file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its extension is not a
    /// supported image format.
    #[instrument(skip(name, path), fields(path = %path.as_ref().display()))]
    pub fn from_file(name: impl Into<String>, path: impl AsRef<Path>) -> StoryboardResult<Self> {
        let path = path.as_ref();
        let mime_type = mime_for_path(path)?;
        let bytes = std::fs::read(path)
            .map_err(|e| IoError::new(e.to_string(), path.display().to_string()))?;
        debug!(mime_type, size = bytes.len(), "Loaded character reference image");
        Ok(Self::new(name, ImageData::new(mime_type, bytes)))
    }
}

fn mime_for_path(path: &Path) -> Result<&'static str, ConfigError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "webp" => Ok("image/webp"),
        "gif" => Ok("image/gif"),
        _ => Err(ConfigError::new(format!(
            "Unsupported reference image format: {}",
            path.display()
        ))),
    }
}

/// Ordered collection of character references.
///
/// Order is insertion order and decides which entry wins when several names
/// match the same scene.
#[derive(Debug, Clone, Default)]
pub struct CharacterRegistry {
    entries: Vec<CharacterReference>,
}

impl CharacterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reference, returning its identifier.
    pub fn add(&mut self, reference: CharacterReference) -> CharacterId {
        let id = *reference.id();
        debug!(%id, name = %reference.name(), "Registering character");
        self.entries.push(reference);
        id
    }

    /// Look up a reference by identifier.
    pub fn get(&self, id: CharacterId) -> Option<&CharacterReference> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Change a reference's name. Returns false if the id is unknown.
    pub fn rename(&mut self, id: CharacterId, name: impl Into<String>) -> bool {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Swap the image of an existing reference. Returns false if the id is unknown.
    pub fn replace_image(&mut self, id: CharacterId, image: ImageData) -> bool {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.image = Arc::new(image);
                true
            }
            None => false,
        }
    }

    /// Remove a reference. Results pointing at it simply stop resolving.
    pub fn remove(&mut self, id: CharacterId) -> Option<CharacterReference> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index))
    }

    /// References in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &CharacterReference> {
        self.entries.iter()
    }

    /// Number of references.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
