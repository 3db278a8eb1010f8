//! Trait definitions for image generation backends.

use crate::ImageRequest;
use async_trait::async_trait;
use std::sync::Arc;
use storyboard_core::ImageData;
use storyboard_error::GenerationError;

/// Core trait that all image generation backends must implement.
///
/// Implementations must be safe to call again with an identical request;
/// the pipeline retries failed calls verbatim.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Render one frame.
    ///
    /// # Errors
    ///
    /// Any transport failure, API rejection, or response without an image.
    async fn generate(&self, req: &ImageRequest) -> Result<ImageData, GenerationError>;

    /// Provider name (e.g., "gemini").
    fn provider_name(&self) -> &'static str;

    /// Model identifier.
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<T: ImageGenerator + ?Sized> ImageGenerator for Arc<T> {
    async fn generate(&self, req: &ImageRequest) -> Result<ImageData, GenerationError> {
        (**self).generate(req).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
