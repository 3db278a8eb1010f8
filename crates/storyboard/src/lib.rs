//! Storyboard - scene-chained image generation
//!
//! A user pastes a multi-scene script plus story context and style text;
//! the library parses the script into scenes, pins character reference
//! images to them, and generates one image per scene in order, feeding each
//! frame to the next call so the storyboard stays visually continuous.
//!
//! # Quick Start
//!
//! ```no_run
//! use storyboard::{GeminiImageClient, StoryboardSession};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = StoryboardSession::new(GeminiImageClient::new()?);
//! session.set_script("Scene 1: Opening\nCharacter: None\nPrompt (English): A dog runs.");
//! session.set_style("soft watercolor");
//!
//! let summary = session.generate_all().await?;
//! println!("{} frames generated", summary.succeeded());
//! # Ok(())
//! # }
//! ```
//!
//! # Cargo Features
//!
//! - `gemini` - Google Gemini image models (on by default)
//! - `api` - Gate for tests that call real APIs
//!
//! # Architecture
//!
//! - `storyboard_error` - Error types
//! - `storyboard_core` - Scenes, characters, results, configuration
//! - `storyboard_interface` - `ImageGenerator` trait and request types
//! - `storyboard_script` - Script parsing, dialogue stripping, character matching
//! - `storyboard_models` - Image model clients
//! - `storyboard_pipeline` - Result store and sequential controller
//!
//! This crate re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod observability;
mod session;

pub use observability::{ObservabilityConfig, init_observability};
pub use session::StoryboardSession;

// Re-export core crates (always available)
pub use storyboard_core::*;
pub use storyboard_error::*;
pub use storyboard_interface::*;
pub use storyboard_pipeline::*;
pub use storyboard_script::*;

// Re-export providers (feature-gated)
#[cfg(feature = "gemini")]
pub use storyboard_models::{GeminiImageClient, PromptTemplate};

pub use tokio_util::sync::CancellationToken;
