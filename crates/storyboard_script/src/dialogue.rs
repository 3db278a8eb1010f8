//! Removal of spoken dialogue from prompts.
//!
//! Image models tend to paint quoted text into the frame as lettering. Long
//! quoted spans are therefore replaced with a short placeholder before a
//! prompt is sent. The displayed prompt is never modified.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;
use storyboard_core::GenerationConfig;
use storyboard_error::{ScriptError, ScriptErrorKind};

static DEFAULT_FILTER: LazyLock<DialogueFilter> = LazyLock::new(|| {
    let config = GenerationConfig::default();
    DialogueFilter::new(config.dialogue_min_chars, config.dialogue_placeholder)
        .expect("Valid default dialogue pattern")
});

/// Strip dialogue with the default threshold and placeholder.
///
/// # Examples
///
/// ```
/// use storyboard_script::strip_dialogue;
///
/// let prompt = r#"Anna shouts "Get away from the edge right now!" at Bob."#;
/// assert_eq!(strip_dialogue(prompt), "Anna shouts (character is speaking) at Bob.");
///
/// // Short quotes are kept.
/// assert_eq!(strip_dialogue(r#"A sign reads "EXIT"."#), r#"A sign reads "EXIT"."#);
/// ```
pub fn strip_dialogue(text: &str) -> String {
    DEFAULT_FILTER.strip(text).into_owned()
}

/// Replaces quoted spans of at least a minimum length with a placeholder.
///
/// Straight and typographic double or single quotes are recognized. Double
/// quotes open a span anywhere. A single quote only opens a span when it
/// does not follow a letter or digit, and a single quote followed by a
/// letter or digit is read as an apostrophe, so contractions never close one.
#[derive(Debug, Clone)]
pub struct DialogueFilter {
    pattern: Regex,
    min_chars: usize,
    placeholder: String,
}

impl DialogueFilter {
    /// Build a filter for spans of at least `min_chars` characters.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern fails to compile.
    pub fn new(min_chars: usize, placeholder: impl Into<String>) -> Result<Self, ScriptError> {
        let pattern = Regex::new(concat!(
            r#"(?P<double>"[^"]*"|“[^”]*”)"#,
            r#"|(?P<lead>^|[^\p{L}\p{N}])"#,
            r#"(?P<single>'(?:[^'\n]|'[\p{L}\p{N}])*'|‘(?:[^’\n]|’[\p{L}\p{N}])*’)"#,
        ))
        .map_err(|e| ScriptError::new(ScriptErrorKind::InvalidGrammar(e.to_string())))?;

        Ok(Self {
            pattern,
            min_chars,
            placeholder: placeholder.into(),
        })
    }

    /// Build a filter from pipeline configuration.
    pub fn from_config(config: &GenerationConfig) -> Result<Self, ScriptError> {
        Self::new(config.dialogue_min_chars, config.dialogue_placeholder.clone())
    }

    /// Return `text` with every long quoted span replaced.
    pub fn strip<'a>(&self, text: &'a str) -> Cow<'a, str> {
        self.pattern.replace_all(text, |caps: &Captures<'_>| {
            let lead = caps.name("lead").map_or("", |m| m.as_str());
            let Some(span) = caps.name("double").or_else(|| caps.name("single")) else {
                return caps[0].to_string();
            };
            // Quote marks are one char each.
            if span.as_str().chars().count().saturating_sub(2) < self.min_chars {
                return caps[0].to_string();
            }
            format!("{}{}", lead, self.placeholder)
        })
    }
}

impl Default for DialogueFilter {
    fn default() -> Self {
        DEFAULT_FILTER.clone()
    }
}
