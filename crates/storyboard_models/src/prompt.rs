//! Prompt templating for storyboard frames.

use storyboard_interface::ImageRequest;

/// Turns an [`ImageRequest`] into the instruction text sent to an image model.
///
/// Reference images are described in the order providers attach them:
/// character reference first, continuity reference second.
///
/// # Examples
///
/// ```
/// use storyboard_core::AspectRatio;
/// use storyboard_interface::ImageRequest;
/// use storyboard_models::PromptTemplate;
///
/// let request = ImageRequest::new("A dog runs.", "A day at the park", "", AspectRatio::Square);
/// let text = PromptTemplate::default().render(&request);
///
/// assert!(text.contains("Scene: A dog runs."));
/// assert!(text.contains("Story context: A day at the park"));
/// assert!(!text.contains("Visual style"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    preamble: String,
    closing: String,
}

impl PromptTemplate {
    /// Create a template with custom opening and closing instructions.
    pub fn new(preamble: impl Into<String>, closing: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
            closing: closing.into(),
        }
    }

    /// Render the full instruction text.
    pub fn render(&self, req: &ImageRequest) -> String {
        let mut lines = vec![self.preamble.clone()];

        if !req.story_context().trim().is_empty() {
            lines.push(format!("Story context: {}", req.story_context().trim()));
        }
        if !req.style().trim().is_empty() {
            lines.push(format!("Visual style: {}", req.style().trim()));
        }
        lines.push(format!("Scene: {}", req.prompt().trim()));

        let mut ordinal = ["first", "second"].into_iter();
        if let Some(character) = req.character() {
            lines.push(format!(
                "The {} reference image shows the character \"{}\". Keep their face, hair, and costume consistent with it.",
                ordinal.next().unwrap_or("next"),
                character.name()
            ));
        }
        if req.previous_image().is_some() {
            lines.push(format!(
                "The {} reference image is the previous storyboard frame. Match its lighting, palette, and art style.",
                ordinal.next().unwrap_or("next")
            ));
            if !req.variant() {
                lines.push(
                    "Continue the action from that frame so the two read as consecutive shots."
                        .to_string(),
                );
            }
        }

        lines.push(format!("Aspect ratio: {}.", req.aspect_ratio()));
        lines.push(self.closing.clone());
        lines.join("\n")
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(
            "Create a single storyboard frame.",
            "Do not render any text, captions, speech bubbles, or lettering in the image.",
        )
    }
}
