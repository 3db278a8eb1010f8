//! Image generation driver trait for the storyboard library.
//!
//! The pipeline never talks to an image model directly. It builds an
//! [`ImageRequest`] and hands it to an [`ImageGenerator`]; concrete providers
//! live in `storyboard_models`, test doubles live next to the tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod request;
mod traits;

pub use request::{CharacterImage, ImageRequest, ImageRequestBuilder};
pub use traits::ImageGenerator;
