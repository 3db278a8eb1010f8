//! Mock image generator for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use storyboard_core::ImageData;
use storyboard_error::{GenerationError, GenerationErrorKind};
use storyboard_interface::{ImageGenerator, ImageRequest};
use tokio::time::Instant;

/// Behavior for requests whose prompt matches a key.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Fail this many times, then succeed
    FailThenSucceed(usize),
    /// Never succeed
    AlwaysFail,
}

/// One observed `generate` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub character: Option<String>,
    pub previous: Option<Arc<ImageData>>,
    pub variant: bool,
    pub at: Instant,
}

/// The image a successful call returns for `prompt`.
///
/// Bytes are the prompt text, so tests can tell which scene produced an
/// image that shows up as a continuity reference.
pub fn image_for(prompt: &str) -> ImageData {
    ImageData::new("image/png", prompt.as_bytes().to_vec())
}

/// Scripted image generator.
///
/// Prompts without a configured behavior always succeed.
pub struct MockImageGenerator {
    behaviors: HashMap<String, MockBehavior>,
    latency: Duration,
    failures: Mutex<HashMap<String, usize>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockImageGenerator {
    /// Create a mock that always succeeds.
    pub fn new_success() -> Self {
        Self {
            behaviors: HashMap::new(),
            latency: Duration::ZERO,
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Configure the behavior for one prompt.
    pub fn with_behavior(mut self, prompt: impl Into<String>, behavior: MockBehavior) -> Self {
        self.behaviors.insert(prompt.into(), behavior);
        self
    }

    /// Make every call take `latency` before it answers.
    #[allow(dead_code)]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Get the number of times generate() was called.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Every call, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls made for one prompt.
    #[allow(dead_code)]
    pub fn calls_for(&self, prompt: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.prompt == prompt)
            .collect()
    }

    fn next_response(&self, prompt: &str) -> Result<ImageData, GenerationError> {
        let mut failures = self.failures.lock().unwrap();
        let failed_so_far = failures.entry(prompt.to_string()).or_insert(0);

        let fail = match self.behaviors.get(prompt) {
            Some(MockBehavior::AlwaysFail) => true,
            Some(MockBehavior::FailThenSucceed(count)) => *failed_so_far < *count,
            None => false,
        };

        if fail {
            *failed_so_far += 1;
            Err(GenerationError::new(GenerationErrorKind::Http {
                status_code: 503,
                message: "Model is overloaded".to_string(),
            }))
        } else {
            Ok(image_for(prompt))
        }
    }
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate(&self, req: &ImageRequest) -> Result<ImageData, GenerationError> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: req.prompt().clone(),
            character: req.character().map(|c| c.name().clone()),
            previous: req.previous_image().cloned(),
            variant: req.variant(),
            at: Instant::now(),
        });
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.next_response(req.prompt())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-image"
    }
}
