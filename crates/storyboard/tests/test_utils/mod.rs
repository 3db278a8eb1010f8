//! Test utilities for session tests.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use storyboard::{GenerationError, GenerationErrorKind, ImageData, ImageGenerator, ImageRequest};

/// One observed `generate` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub character: Option<String>,
    pub previous: Option<Arc<ImageData>>,
    pub variant: bool,
}

/// Image generator that succeeds unless the prompt was marked as failing.
#[derive(Default)]
pub struct MockImageGenerator {
    failing: HashSet<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockImageGenerator {
    /// Create a mock that always succeeds.
    pub fn new_success() -> Self {
        Self::default()
    }

    /// Make every call for `prompt` fail.
    #[allow(dead_code)]
    pub fn failing_on(mut self, prompt: impl Into<String>) -> Self {
        self.failing.insert(prompt.into());
        self
    }

    /// Every call, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

/// The image a successful call returns for `prompt`.
pub fn image_for(prompt: &str) -> ImageData {
    ImageData::new("image/png", prompt.as_bytes().to_vec())
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate(&self, req: &ImageRequest) -> Result<ImageData, GenerationError> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: req.prompt().clone(),
            character: req.character().map(|c| c.name().clone()),
            previous: req.previous_image().cloned(),
            variant: req.variant(),
        });
        if self.failing.contains(req.prompt()) {
            Err(GenerationError::new(GenerationErrorKind::NoImage))
        } else {
            Ok(image_for(req.prompt()))
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-image"
    }
}
