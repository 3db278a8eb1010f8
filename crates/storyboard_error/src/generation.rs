//! Image generation error types.

/// Conditions under which an image generation call fails.
///
/// The sequential controller treats every kind identically: the attempt
/// failed and may be retried. The distinction exists for logs and for
/// provider implementations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum GenerationErrorKind {
    /// API key not found in environment
    #[display("{} environment variable not set", _0)]
    MissingApiKey(String),
    /// Request could not be sent or the connection dropped
    #[display("Image API request failed: {}", _0)]
    Request(String),
    /// HTTP error with status code and message
    #[display("HTTP {} error: {}", status_code, message)]
    Http {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },
    /// Response body could not be decoded
    #[display("Failed to parse image API response: {}", _0)]
    ResponseParse(String),
    /// The model refused the prompt (content policy)
    #[display("Prompt was blocked: {}", _0)]
    Blocked(String),
    /// The response contained no image payload
    #[display("Response contained no image")]
    NoImage,
    /// Base64 decoding of the returned image failed
    #[display("Base64 decode error: {}", _0)]
    Base64Decode(String),
}

impl GenerationErrorKind {
    /// Whether the failure looks transient (rate limit, overload, network).
    ///
    /// Informational only.
    pub fn is_transient(&self) -> bool {
        match self {
            GenerationErrorKind::Http { status_code, .. } => {
                matches!(*status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            GenerationErrorKind::Request(_) => true,
            _ => false,
        }
    }
}

/// Image generation error with source location tracking.
///
/// # Examples
///
/// ```
/// use storyboard_error::{GenerationError, GenerationErrorKind};
///
/// let err = GenerationError::new(GenerationErrorKind::NoImage);
/// assert!(format!("{}", err).contains("no image"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} at line {} in {}", kind, line, file)]
pub struct GenerationError {
    /// The kind of error that occurred
    pub kind: GenerationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new GenerationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GenerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
