//! Character reference resolution.

use storyboard_core::{CharacterReference, CharacterRegistry, Scene};
use tracing::debug;

/// Find the registry entry pinned to a scene's character.
///
/// An entry matches when the scene's character name contains the entry's
/// name, ignoring case, so "John" matches "John Smith". The first match in
/// registry order wins. Entries with a blank name never match.
///
/// # Examples
///
/// ```
/// use storyboard_core::{CharacterReference, CharacterRegistry, ImageData, Scene};
/// use storyboard_script::resolve_character;
///
/// let mut registry = CharacterRegistry::new();
/// registry.add(CharacterReference::new("John", ImageData::new("image/png", vec![0])));
///
/// let scene = Scene::new(1, "Scene 1", "A man waves.", Some("JOHN SMITH".to_string()), "");
/// assert_eq!(resolve_character(&scene, &registry).unwrap().name(), "John");
/// ```
pub fn resolve_character<'a>(
    scene: &Scene,
    registry: &'a CharacterRegistry,
) -> Option<&'a CharacterReference> {
    let wanted = scene.character_name()?.to_lowercase();

    let found = registry.iter().find(|entry| {
        let name = entry.name().trim().to_lowercase();
        !name.is_empty() && wanted.contains(&name)
    });

    debug!(
        scene = %scene.label(),
        character = %wanted,
        matched = found.map(|entry| entry.name().as_str()),
        "Resolved character reference"
    );
    found
}
