//! Request types for image generation.

use derive_builder::Builder;
use derive_getters::Getters;
use derive_setters::Setters;
use std::sync::Arc;
use storyboard_core::{AspectRatio, CharacterReference, ImageData};

/// A character reference image together with the name it was pinned to.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct CharacterImage {
    /// Character name, used in the instruction text
    name: String,
    /// Reference image
    image: Arc<ImageData>,
}

impl CharacterImage {
    /// Create a character image.
    pub fn new(name: impl Into<String>, image: Arc<ImageData>) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }
}

impl From<&CharacterReference> for CharacterImage {
    fn from(reference: &CharacterReference) -> Self {
        Self::new(reference.name().clone(), Arc::clone(reference.image()))
    }
}

/// Everything an image model needs to render one storyboard frame.
///
/// The character reference and the continuity reference are independent;
/// either, both, or neither may be present.
///
/// # Examples
///
/// ```
/// use storyboard_core::AspectRatio;
/// use storyboard_interface::ImageRequest;
///
/// let request = ImageRequest::builder()
///     .prompt("A dog runs.")
///     .story_context("A day at the park")
///     .aspect_ratio(AspectRatio::Square)
///     .build()
///     .unwrap();
///
/// assert_eq!(request.prompt(), "A dog runs.");
/// assert!(request.previous_image().is_none());
/// assert!(!request.variant());
/// ```
#[derive(Debug, Clone, PartialEq, Getters, Setters, Builder)]
#[builder(setter(into))]
#[setters(prefix = "with_")]
pub struct ImageRequest {
    /// Scene prompt, already stripped of dialogue
    prompt: String,
    /// Free-text story background
    #[builder(default)]
    story_context: String,
    /// Free-text visual style
    #[builder(default)]
    style: String,
    /// Output frame shape
    #[builder(default)]
    aspect_ratio: AspectRatio,
    /// Reference image pinned to the scene's character
    #[builder(default)]
    #[getter(skip)]
    character: Option<CharacterImage>,
    /// Previous scene's successful output
    #[builder(default)]
    #[getter(skip)]
    previous_image: Option<Arc<ImageData>>,
    /// Set on "regenerate all" runs to relax continuation instructions
    #[builder(default)]
    #[getter(skip)]
    variant: bool,
}

impl ImageRequest {
    /// Create a request without reference images.
    pub fn new(
        prompt: impl Into<String>,
        story_context: impl Into<String>,
        style: impl Into<String>,
        aspect_ratio: AspectRatio,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            story_context: story_context.into(),
            style: style.into(),
            aspect_ratio,
            character: None,
            previous_image: None,
            variant: false,
        }
    }

    /// Create a new builder.
    pub fn builder() -> ImageRequestBuilder {
        ImageRequestBuilder::default()
    }

    /// Character reference, if any.
    pub fn character(&self) -> Option<&CharacterImage> {
        self.character.as_ref()
    }

    /// Continuity reference, if any.
    pub fn previous_image(&self) -> Option<&Arc<ImageData>> {
        self.previous_image.as_ref()
    }

    /// Whether this request belongs to a "regenerate all" run.
    pub fn variant(&self) -> bool {
        self.variant
    }
}
