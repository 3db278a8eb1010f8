//! Test utilities for pipeline tests.
//!
//! This module provides a scripted image generator and script helpers.

use storyboard_core::{CharacterReference, CharacterRegistry, ImageData};

pub mod mock_generator;

#[allow(unused_imports)]
pub use mock_generator::{MockBehavior, MockImageGenerator, RecordedCall, image_for};

/// Two-scene script used by the scenario tests.
#[allow(dead_code)]
pub const ANNA_SCRIPT: &str = "Scene 1: Morning\n\
Character: Anna\n\
Prompt (English): A dog runs.\n\
\n\
Scene 2: Afternoon\n\
Character: None\n\
Prompt (English): A cat sleeps.\n";

/// Build a script of `count` scenes whose prompts are "Prompt 1", "Prompt 2", ...
#[allow(dead_code)]
pub fn numbered_script(count: u32) -> String {
    (1..=count)
        .map(|n| format!("Scene {n}:\nCharacter: None\nPrompt: Prompt {n}\n"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Registry holding a single character.
#[allow(dead_code)]
pub fn registry_with(name: &str) -> CharacterRegistry {
    let mut registry = CharacterRegistry::new();
    registry.add(CharacterReference::new(
        name,
        ImageData::new("image/png", format!("face of {name}").into_bytes()),
    ));
    registry
}
