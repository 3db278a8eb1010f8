//! Result store error types.

/// Kinds of result store errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StoreErrorKind {
    /// No result with the given identifier exists
    #[display("Unknown result: {}", _0)]
    UnknownResult(String),
    /// The store holds no results to regenerate
    #[display("No results to regenerate")]
    NoResults,
    /// A replacement prompt was blank
    #[display("Prompt must not be empty")]
    EmptyPrompt,
    /// A generation run is already active
    #[display("A generation run is already in progress")]
    RunInProgress,
}

/// Result store error with location tracking.
///
/// # Examples
///
/// ```
/// use storyboard_error::{StoreError, StoreErrorKind};
///
/// let err = StoreError::new(StoreErrorKind::UnknownResult("abc".to_string()));
/// assert!(format!("{}", err).contains("abc"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Store Error: {} at line {} in {}", kind, line, file)]
pub struct StoreError {
    /// The kind of error that occurred
    pub kind: StoreErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StoreError {
    /// Create a new store error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoreErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
