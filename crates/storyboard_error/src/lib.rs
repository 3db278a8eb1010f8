//! Error types for the storyboard generation library.
//!
//! This crate provides the foundation error types used throughout the storyboard workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use storyboard_error::{ScriptError, ScriptErrorKind, StoryboardResult};
//!
//! fn parse_nothing() -> StoryboardResult<()> {
//!     Err(ScriptError::new(ScriptErrorKind::NoValidScenes))?
//! }
//!
//! assert!(parse_nothing().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod generation;
mod io;
mod script;
mod store;

pub use config::ConfigError;
pub use error::{StoryboardError, StoryboardErrorKind, StoryboardResult};
pub use generation::{GenerationError, GenerationErrorKind};
pub use io::IoError;
pub use script::{ScriptError, ScriptErrorKind};
pub use store::{StoreError, StoreErrorKind};
