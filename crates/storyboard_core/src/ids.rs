//! Session-stable identifiers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of one generation result.
///
/// Independent of the scene's sequence number so that a scene can be
/// represented by several results (for example after "save as new").
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    derive_more::Display,
)]
pub struct ResultId(Uuid);

impl ResultId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ResultId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identity of a character reference in the registry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    derive_more::Display,
)]
pub struct CharacterId(Uuid);

impl CharacterId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}
