//! Conversions between storyboard requests and Gemini wire types.

use super::dto::{GeminiImageRequest, GeminiImageResponse, Part};
use crate::PromptTemplate;
use storyboard_core::ImageData;
use storyboard_error::{GenerationError, GenerationErrorKind};
use storyboard_interface::ImageRequest;

/// Finish reasons that mean the model refused to draw.
const BLOCKING_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "PROHIBITED_CONTENT",
    "BLOCKLIST",
    "SPII",
    "IMAGE_SAFETY",
    "IMAGE_PROHIBITED_CONTENT",
];

/// Build the wire request. Reference images precede the instruction text,
/// character first.
pub(crate) fn to_gemini_request(req: &ImageRequest, template: &PromptTemplate) -> GeminiImageRequest {
    let mut parts = Vec::with_capacity(3);
    if let Some(character) = req.character() {
        parts.push(Part::from_inline(
            character.image().mime_type().clone(),
            character.image().to_base64(),
        ));
    }
    if let Some(previous) = req.previous_image() {
        parts.push(Part::from_inline(previous.mime_type().clone(), previous.to_base64()));
    }
    parts.push(Part::from_text(template.render(req)));

    GeminiImageRequest::new(parts, req.aspect_ratio().as_str())
}

/// Pull the first inline image out of a response.
pub(crate) fn from_gemini_response(
    response: &GeminiImageResponse,
) -> Result<ImageData, GenerationError> {
    if let Some(reason) = response
        .prompt_feedback()
        .as_ref()
        .and_then(|feedback| feedback.block_reason().clone())
    {
        return Err(GenerationError::new(GenerationErrorKind::Blocked(reason)));
    }

    let inline = response
        .candidates()
        .iter()
        .filter_map(|candidate| candidate.content().as_ref())
        .flat_map(|content| content.parts())
        .find_map(|part| part.inline_data().as_ref());

    if let Some(inline) = inline {
        return ImageData::from_base64(inline.mime_type().clone(), inline.data())
            .map_err(|e| GenerationError::new(GenerationErrorKind::Base64Decode(e.to_string())));
    }

    let blocked = response
        .candidates()
        .iter()
        .filter_map(|candidate| candidate.finish_reason().as_deref())
        .find(|reason| BLOCKING_FINISH_REASONS.contains(reason));

    match blocked {
        Some(reason) => Err(GenerationError::new(GenerationErrorKind::Blocked(
            reason.to_string(),
        ))),
        None => Err(GenerationError::new(GenerationErrorKind::NoImage)),
    }
}
