//! Image model integrations for the storyboard library.
//!
//! Each provider lives behind its own feature flag and implements
//! [`ImageGenerator`](storyboard_interface::ImageGenerator).
//!
//! # Available Providers
//!
//! - **Gemini** (Google) - Enable with `gemini` feature (on by default)
//!
//! # Example
//!
//! ```no_run
//! use storyboard_core::AspectRatio;
//! use storyboard_interface::{ImageGenerator, ImageRequest};
//! use storyboard_models::GeminiImageClient;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiImageClient::new()?;
//! let request = ImageRequest::new("A dog runs.", "", "watercolor", AspectRatio::Widescreen);
//! let image = client.generate(&request).await?;
//! println!("{} bytes of {}", image.len(), image.mime_type());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod prompt;

pub use prompt::PromptTemplate;

#[cfg(feature = "gemini")]
mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::{
    Candidate, Content, GeminiImageClient, GeminiImageRequest, GeminiImageResponse,
    ImageConfig, ImageGenerationConfig, InlineData, Part, PromptFeedback,
};
