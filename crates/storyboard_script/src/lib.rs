//! Script parsing and character resolution for the storyboard library.
//!
//! A storyboard script is semi-structured text: blocks that open with a
//! "Scene N:" header and carry labelled fields such as `Character:` and
//! `Prompt (English):`. This crate turns that text into ordered [`Scene`]
//! records, matches scenes against the character registry, and performs the
//! pure text transforms applied before prompts leave the process.
//!
//! # Example
//!
//! ```
//! use storyboard_script::parse_script;
//!
//! let scenes = parse_script(
//!     "Scene 1: Opening\nCharacter: Anna\nPrompt (English): A dog runs.\n\n\
//!      Scene 2: Later\nCharacter: None\nPrompt (English): A cat sleeps.",
//! );
//!
//! assert_eq!(scenes.len(), 2);
//! assert_eq!(scenes[0].prompt_text(), "A dog runs.");
//! assert_eq!(scenes[1].character_name(), None);
//! ```
//!
//! [`Scene`]: storyboard_core::Scene

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod dialogue;
mod parser;
mod resolver;

pub use dialogue::{DialogueFilter, strip_dialogue};
pub use parser::{ScriptParser, parse_script};
pub use resolver::resolve_character;
