//! Gemini image model integration over the REST `generateContent` endpoint.

mod client;
mod conversion;
mod dto;

pub use client::GeminiImageClient;
pub use dto::{
    Candidate, Content, GeminiImageRequest, GeminiImageResponse, ImageConfig,
    ImageGenerationConfig, InlineData, Part, PromptFeedback,
};
