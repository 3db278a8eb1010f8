//! Script validation error types.

/// Specific error conditions for script handling.
///
/// Malformed scene blocks are never errors; they are dropped by the parser.
/// Only a script that yields nothing at all is reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ScriptErrorKind {
    /// The script contained no block with both a scene header and a prompt
    #[display("No valid prompts found in script")]
    NoValidScenes,
    /// A configured marker or label produced an unusable pattern
    #[display("Invalid script grammar: {}", _0)]
    InvalidGrammar(String),
}

/// Error type for script operations.
///
/// # Examples
///
/// ```
/// use storyboard_error::{ScriptError, ScriptErrorKind};
///
/// let err = ScriptError::new(ScriptErrorKind::NoValidScenes);
/// assert!(format!("{}", err).contains("No valid prompts"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Script Error: {} at line {} in {}", kind, line, file)]
pub struct ScriptError {
    /// The specific error condition
    pub kind: ScriptErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ScriptError {
    /// Create a new ScriptError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ScriptErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
