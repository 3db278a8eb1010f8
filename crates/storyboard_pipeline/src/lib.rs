//! Scene-chaining generation pipeline for the storyboard library.
//!
//! The [`SequentialController`] walks scenes strictly in order, feeding each
//! scene's successful image to the next call as its continuity reference.
//! Every status change is published to a [`ResultStore`], whose snapshots
//! are immutable so observers can render them while the run continues.
//!
//! # Example
//!
//! ```no_run
//! use storyboard_core::{AspectRatio, CharacterRegistry};
//! use storyboard_interface::ImageGenerator;
//! use storyboard_pipeline::{GenerationContext, ResultStore, SequentialController};
//! use storyboard_script::parse_script;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run(generator: impl ImageGenerator) -> storyboard_error::StoryboardResult<()> {
//! let controller = SequentialController::new(generator, ResultStore::new());
//! let scenes = parse_script("Scene 1:\nPrompt: A dog runs.");
//! let context = GenerationContext::new("A day at the park", "watercolor", AspectRatio::Square);
//!
//! let summary = controller
//!     .generate_all(&scenes, &CharacterRegistry::new(), &context, &CancellationToken::new())
//!     .await?;
//! println!("{} succeeded", summary.succeeded());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod controller;
mod retry;
mod store;

pub use controller::{GenerationContext, RunSummary, SequentialController, continuity_for};
pub use retry::{AttemptOutcome, RetryPolicy};
pub use store::{ResultStore, Snapshot};
