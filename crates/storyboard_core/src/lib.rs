//! Core data types for the storyboard generation library.
//!
//! This crate provides the data model shared by every other crate in the
//! workspace: parsed scenes, character references, per-scene generation
//! results, image payloads, and the layered configuration.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod character;
mod config;
mod ids;
mod image;
mod result;
mod scene;

pub use character::{CharacterReference, CharacterRegistry};
pub use config::{GeminiConfig, GenerationConfig, ScriptConfig, StoryboardConfig};
pub use ids::{CharacterId, ResultId};
pub use image::{AspectRatio, ImageData};
pub use result::{GenerationResult, GenerationStatus};
pub use scene::Scene;
