//! Scene block parsing.

use regex::{Captures, Regex};
use std::sync::LazyLock;
use storyboard_core::{Scene, ScriptConfig};
use storyboard_error::{ScriptError, ScriptErrorKind};
use tracing::{debug, instrument, trace};

static DEFAULT_PARSER: LazyLock<ScriptParser> = LazyLock::new(|| {
    ScriptParser::new(&ScriptConfig::default()).expect("Valid default script grammar")
});

/// Parse a script with the default grammar.
///
/// See [`ScriptParser::parse`].
pub fn parse_script(raw: &str) -> Vec<Scene> {
    DEFAULT_PARSER.parse(raw)
}

/// A labelled field located inside a scene block.
#[derive(Debug)]
struct Field {
    /// Lower-cased label
    label: String,
    /// Offset where the label (including decoration) begins
    start: usize,
    /// Offset where the field value begins
    value_start: usize,
}

/// Converts script text into ordered [`Scene`] records.
///
/// Parsing is pure: the same text always yields the same scenes, so the
/// parser can be re-run at any time to re-derive scene identity.
#[derive(Debug, Clone)]
pub struct ScriptParser {
    markers: Vec<String>,
    header: Regex,
    field: Regex,
    prompt_label: String,
    character_label: String,
    none_sentinel: String,
}

impl ScriptParser {
    /// Compile a parser for the given grammar.
    ///
    /// # Errors
    ///
    /// Returns an error if no scene marker is configured or the labels do not
    /// include the prompt label.
    pub fn new(config: &ScriptConfig) -> Result<Self, ScriptError> {
        if config.scene_markers.is_empty() {
            return Err(ScriptError::new(ScriptErrorKind::InvalidGrammar(
                "at least one scene marker is required".to_string(),
            )));
        }

        let mut labels = config.field_labels.clone();
        for required in [&config.prompt_label, &config.character_label] {
            if !labels.iter().any(|l| l.to_lowercase() == required.to_lowercase()) {
                labels.push(required.clone());
            }
        }
        // Longest first so alternation never stops at a shorter prefix.
        labels.sort_by_key(|label| std::cmp::Reverse(label.chars().count()));

        let markers = alternation(&config.scene_markers);
        let header = Regex::new(&format!(
            r"(?mi)^[ \t#>*_-]*(?P<marker>{markers})[ \t]+(?P<number>\d+)[ \t]*[*_]*[ \t]*[:：]"
        ))
        .map_err(|e| ScriptError::new(ScriptErrorKind::InvalidGrammar(e.to_string())))?;

        let field = Regex::new(&format!(
            r"(?i)(?:^|[^\p{{L}}\p{{N}}*_])(?P<deco>[*_]*)(?P<label>{})[ \t]*(?:\([^)\n]*\))?[ \t]*[*_]*[ \t]*[:：][ \t]*[*_]*",
            alternation(&labels)
        ))
        .map_err(|e| ScriptError::new(ScriptErrorKind::InvalidGrammar(e.to_string())))?;

        Ok(Self {
            markers: config.scene_markers.clone(),
            header,
            field,
            prompt_label: config.prompt_label.to_lowercase(),
            character_label: config.character_label.to_lowercase(),
            none_sentinel: config.none_sentinel.to_lowercase(),
        })
    }

    /// Split `raw` into scene blocks and extract one [`Scene`] per valid block.
    ///
    /// Blocks run from one header to the next header or end of text. A block
    /// without a usable scene number or with an empty prompt is dropped.
    /// Scenes are returned in textual order; numbers are not re-sorted and
    /// duplicates are kept.
    #[instrument(skip(self, raw), fields(raw_len = raw.len()))]
    pub fn parse(&self, raw: &str) -> Vec<Scene> {
        let headers: Vec<Captures<'_>> = self.header.captures_iter(raw).collect();
        let mut scenes = Vec::with_capacity(headers.len());

        for (index, header) in headers.iter().enumerate() {
            let start = header.get(0).map_or(0, |m| m.start());
            let end = headers
                .get(index + 1)
                .and_then(|next| next.get(0))
                .map_or(raw.len(), |m| m.start());
            let block = &raw[start..end];

            match self.parse_block(header, block) {
                Some(scene) => scenes.push(scene),
                None => trace!(block_index = index, "Dropping malformed scene block"),
            }
        }

        debug!(scene_count = scenes.len(), "Parsed script");
        scenes
    }

    /// Replace the prompt field of a scene block, keeping every other line.
    ///
    /// If the block has no prompt field, one is appended.
    pub fn rewrite_prompt(&self, block: &str, new_prompt: &str) -> String {
        let fields = self.fields(block);
        let Some((position, prompt)) = fields
            .iter()
            .enumerate()
            .find(|(_, field)| field.label == self.prompt_label)
        else {
            let label = capitalize(&self.prompt_label);
            return format!("{}\n{}: {}", block.trim_end(), label, new_prompt);
        };

        let end = fields.get(position + 1).map_or(block.len(), |next| next.start);
        let original = &block[prompt.value_start..end];
        let trailing = &original[original.trim_end().len()..];

        format!(
            "{}{}{}{}",
            &block[..prompt.value_start],
            new_prompt.trim(),
            trailing,
            &block[end..]
        )
    }

    fn parse_block(&self, header: &Captures<'_>, block: &str) -> Option<Scene> {
        let number: u32 = header.name("number")?.as_str().parse().ok()?;
        if number == 0 {
            return None;
        }
        let marker = self.canonical_marker(header.name("marker")?.as_str());

        let fields = self.fields(block);

        let prompt = fields
            .iter()
            .enumerate()
            .find(|(_, field)| field.label == self.prompt_label)
            .map(|(position, field)| {
                let end = fields.get(position + 1).map_or(block.len(), |next| next.start);
                clean(&block[field.value_start..end])
            })
            .filter(|prompt| !prompt.is_empty())?;

        let character = fields
            .iter()
            .enumerate()
            .find(|(_, field)| field.label == self.character_label)
            .map(|(position, field)| {
                let next_field = fields.get(position + 1).map_or(block.len(), |next| next.start);
                let line_end = block[field.value_start..]
                    .find('\n')
                    .map_or(block.len(), |offset| field.value_start + offset);
                clean(&block[field.value_start..next_field.min(line_end)])
            })
            .filter(|name| !name.is_empty() && name.to_lowercase() != self.none_sentinel);

        Some(Scene::new(
            number,
            format!("{} {}", marker, number),
            prompt,
            character,
            block.trim(),
        ))
    }

    fn fields(&self, block: &str) -> Vec<Field> {
        self.field
            .captures_iter(block)
            .filter_map(|caps| {
                let deco = caps.name("deco")?;
                let label = caps.name("label")?;
                let whole = caps.get(0)?;
                Some(Field {
                    label: label.as_str().to_lowercase(),
                    start: deco.start(),
                    value_start: whole.end(),
                })
            })
            .collect()
    }

    fn canonical_marker(&self, written: &str) -> String {
        let written_lower = written.to_lowercase();
        self.markers
            .iter()
            .find(|marker| marker.to_lowercase() == written_lower)
            .cloned()
            .unwrap_or_else(|| written.to_string())
    }
}

impl Default for ScriptParser {
    fn default() -> Self {
        DEFAULT_PARSER.clone()
    }
}

fn alternation(words: &[String]) -> String {
    words
        .iter()
        .map(|word| regex::escape(word.trim()))
        .collect::<Vec<_>>()
        .join("|")
}

fn clean(value: &str) -> String {
    value
        .trim_matches(|c: char| c.is_whitespace() || c == '*' || c == '_')
        .to_string()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
