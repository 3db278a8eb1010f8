//! Copy-on-write result store.

use std::sync::Arc;
use storyboard_core::{GenerationResult, ResultId};
use storyboard_error::{StoreError, StoreErrorKind};
use storyboard_script::ScriptParser;
use tokio::sync::watch;
use tracing::debug;

/// Immutable view of the store at one point in time.
pub type Snapshot = Arc<Vec<GenerationResult>>;

/// Ordered collection of per-scene generation results.
///
/// Every write publishes a fresh [`Snapshot`]; snapshots already handed out
/// are never mutated. Clones share the same underlying channel, so the
/// controller and a display layer can each hold a handle.
///
/// # Examples
///
/// ```
/// use storyboard_core::{GenerationResult, Scene};
/// use storyboard_pipeline::ResultStore;
///
/// let store = ResultStore::new();
/// let scene = Scene::new(1, "Scene 1", "A dog runs.", None, "Scene 1:\nPrompt: A dog runs.");
/// store.replace_all(vec![GenerationResult::from_scene(&scene, None)]);
///
/// let before = store.snapshot();
/// let id = *before[0].id();
/// store.update(id, |result| result.mark_failed("boom")).unwrap();
///
/// assert!(before[0].last_error().is_none());
/// assert_eq!(store.get(id).unwrap().last_error(), Some("boom"));
/// ```
#[derive(Debug, Clone)]
pub struct ResultStore {
    sender: Arc<watch::Sender<Snapshot>>,
}

impl ResultStore {
    /// Create an empty store.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Current contents.
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.sender.borrow())
    }

    /// Receive every subsequent publish.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.sender.subscribe()
    }

    /// Copy of one result.
    pub fn get(&self, id: ResultId) -> Option<GenerationResult> {
        self.sender.borrow().iter().find(|r| *r.id() == id).cloned()
    }

    /// Number of results.
    pub fn len(&self) -> usize {
        self.sender.borrow().len()
    }

    /// Whether the store holds no results.
    pub fn is_empty(&self) -> bool {
        self.sender.borrow().is_empty()
    }

    /// Replace the whole collection in one publish.
    pub fn replace_all(&self, results: Vec<GenerationResult>) {
        debug!(count = results.len(), "Replacing result store contents");
        self.sender.send_replace(Arc::new(results));
    }

    /// Apply `f` to a copy of one result and publish the new collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreErrorKind::UnknownResult`] if no result has this id.
    pub fn update<F>(&self, id: ResultId, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut GenerationResult),
    {
        let updated = self.sender.send_if_modified(|current| {
            let Some(position) = current.iter().position(|r| *r.id() == id) else {
                return false;
            };
            let mut next = current.as_ref().clone();
            f(&mut next[position]);
            *current = Arc::new(next);
            true
        });

        if updated {
            Ok(())
        } else {
            Err(unknown(id))
        }
    }

    /// Copy a result under a new id, inserted right after the source.
    ///
    /// # Errors
    ///
    /// Returns [`StoreErrorKind::UnknownResult`] if no result has this id.
    pub fn duplicate(&self, id: ResultId) -> Result<ResultId, StoreError> {
        let mut new_id = None;
        self.sender.send_if_modified(|current| {
            let Some(position) = current.iter().position(|r| *r.id() == id) else {
                return false;
            };
            let copy = current[position].duplicate();
            new_id = Some(*copy.id());
            let mut next = current.as_ref().clone();
            next.insert(position + 1, copy);
            *current = Arc::new(next);
            true
        });

        new_id.ok_or_else(|| unknown(id))
    }

    /// Delete a result.
    ///
    /// # Errors
    ///
    /// Returns [`StoreErrorKind::UnknownResult`] if no result has this id.
    pub fn remove(&self, id: ResultId) -> Result<GenerationResult, StoreError> {
        let mut removed = None;
        self.sender.send_if_modified(|current| {
            let Some(position) = current.iter().position(|r| *r.id() == id) else {
                return false;
            };
            let mut next = current.as_ref().clone();
            removed = Some(next.remove(position));
            *current = Arc::new(next);
            true
        });

        removed.ok_or_else(|| unknown(id))
    }

    /// Change a result's prompt without regenerating it.
    ///
    /// The prompt field inside the stored script block is rewritten too, so
    /// the displayed script stays consistent with the prompt.
    ///
    /// # Errors
    ///
    /// Returns [`StoreErrorKind::EmptyPrompt`] if `prompt` is blank, or
    /// [`StoreErrorKind::UnknownResult`] if no result has this id.
    pub fn edit_prompt(
        &self,
        id: ResultId,
        prompt: &str,
        parser: &ScriptParser,
    ) -> Result<(), StoreError> {
        let prompt = non_blank(prompt)?;
        self.update(id, |result| {
            let script = parser.rewrite_prompt(result.scene_script_text(), prompt);
            result.set_prompt_text(prompt);
            result.set_scene_script_text(script);
        })
    }
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Trimmed `prompt`, rejecting blank text.
///
/// # Errors
///
/// Returns [`StoreErrorKind::EmptyPrompt`] if nothing is left after trimming.
#[track_caller]
pub(crate) fn non_blank(prompt: &str) -> Result<&str, StoreError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        Err(StoreError::new(StoreErrorKind::EmptyPrompt))
    } else {
        Ok(prompt)
    }
}

#[track_caller]
fn unknown(id: ResultId) -> StoreError {
    StoreError::new(StoreErrorKind::UnknownResult(id.to_string()))
}
