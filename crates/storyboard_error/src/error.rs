//! Top-level error wrapper types.

use crate::{ConfigError, GenerationError, IoError, ScriptError, StoreError};

/// Every error condition the storyboard workspace can surface.
///
/// # Examples
///
/// ```
/// use storyboard_error::{StoryboardError, ConfigError};
///
/// let err: StoryboardError = ConfigError::new("bad value").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum StoryboardErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// File access error
    #[from(IoError)]
    Io(IoError),
    /// Script error
    #[from(ScriptError)]
    Script(ScriptError),
    /// Image generation error
    #[from(GenerationError)]
    Generation(GenerationError),
    /// Result store error
    #[from(StoreError)]
    Store(StoreError),
}

/// Storyboard error with kind discrimination.
///
/// # Examples
///
/// ```
/// use storyboard_error::{StoryboardErrorKind, StoryboardResult, ScriptError, ScriptErrorKind};
///
/// fn might_fail() -> StoryboardResult<()> {
///     Err(ScriptError::new(ScriptErrorKind::NoValidScenes))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(matches!(err.kind(), StoryboardErrorKind::Script(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Storyboard Error: {}", _0)]
pub struct StoryboardError(Box<StoryboardErrorKind>);

impl StoryboardError {
    /// Create a new error from a kind.
    pub fn new(kind: StoryboardErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StoryboardErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to StoryboardErrorKind
impl<T> From<T> for StoryboardError
where
    T: Into<StoryboardErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for storyboard operations.
pub type StoryboardResult<T> = std::result::Result<T, StoryboardError>;
