//! Gemini image generation client.

use super::conversion::{from_gemini_response, to_gemini_request};
use super::dto::GeminiImageResponse;
use crate::PromptTemplate;
use async_trait::async_trait;
use reqwest::Client;
use storyboard_core::{GeminiConfig, ImageData};
use storyboard_error::{GenerationError, GenerationErrorKind};
use storyboard_interface::{ImageGenerator, ImageRequest};
use tracing::{debug, instrument};

/// Client for Gemini image models (`generateContent` with image output).
///
/// One call produces one image; retries are the caller's business.
#[derive(Clone)]
pub struct GeminiImageClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    template: PromptTemplate,
}

impl std::fmt::Debug for GeminiImageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiImageClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiImageClient {
    /// Creates a client from default settings, reading `GEMINI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationErrorKind::MissingApiKey`] if the variable is unset or empty.
    pub fn new() -> Result<Self, GenerationError> {
        Self::from_config(&GeminiConfig::default())
    }

    /// Creates a client from configuration, reading the key from the
    /// environment variable the config names.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationErrorKind::MissingApiKey`] if the variable is unset or empty.
    #[instrument(skip_all, fields(model = %config.model))]
    pub fn from_config(config: &GeminiConfig) -> Result<Self, GenerationError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                GenerationError::new(GenerationErrorKind::MissingApiKey(
                    config.api_key_env.clone(),
                ))
            })?;

        Ok(Self::with_api_key(api_key, config.model.clone())
            .with_base_url(config.base_url.clone()))
    }

    /// Creates a client with an explicit API key.
    pub fn with_api_key(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: GeminiConfig::default().base_url,
            template: PromptTemplate::default(),
        }
    }

    /// Point the client at another endpoint root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the instruction template.
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl ImageGenerator for GeminiImageClient {
    #[instrument(
        skip(self, req),
        fields(
            model = %self.model,
            has_character = req.character().is_some(),
            has_previous = req.previous_image().is_some()
        )
    )]
    async fn generate(&self, req: &ImageRequest) -> Result<ImageData, GenerationError> {
        let body = to_gemini_request(req, &self.template);

        let url = self.endpoint();
        debug!(url = %url, "Sending Gemini image request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::new(GenerationErrorKind::Request(e.to_string())))?;

        if !response.status().is_success() {
            let status_code = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::new(GenerationErrorKind::Http {
                status_code,
                message,
            }));
        }

        let gemini_response: GeminiImageResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::new(GenerationErrorKind::ResponseParse(e.to_string())))?;

        let image = from_gemini_response(&gemini_response)?;
        debug!(bytes = image.len(), mime_type = %image.mime_type(), "Received image");
        Ok(image)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
