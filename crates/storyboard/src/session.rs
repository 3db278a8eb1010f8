//! Interactive storyboard session.

use std::path::Path;
use std::sync::{Mutex, PoisonError};
use storyboard_core::{
    AspectRatio, CharacterId, CharacterReference, CharacterRegistry, GenerationResult, ImageData,
    ResultId, Scene, StoryboardConfig,
};
use storyboard_error::{
    ScriptError, ScriptErrorKind, StoreError, StoreErrorKind, StoryboardResult,
};
use storyboard_interface::ImageGenerator;
use storyboard_pipeline::{
    GenerationContext, ResultStore, RunSummary, SequentialController, Snapshot,
};
use tokio::sync::{MutexGuard, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Everything a front-end holds for one storyboard: the script, free-text
/// settings, character references, and the generated results.
///
/// State lives in memory only. Generation methods take `&self`, so a UI can
/// call [`cancel`](Self::cancel) from another task while a run is awaited.
/// Only one run is active at a time; starting another while one is in
/// flight fails with [`StoreErrorKind::RunInProgress`].
pub struct StoryboardSession<G: ImageGenerator> {
    controller: SequentialController<G>,
    script: String,
    story_context: String,
    style: String,
    aspect_ratio: AspectRatio,
    registry: CharacterRegistry,
    cancel: Mutex<CancellationToken>,
    running: tokio::sync::Mutex<()>,
}

impl<G: ImageGenerator> StoryboardSession<G> {
    /// Create a session with default settings.
    pub fn new(generator: G) -> Self {
        Self::with_controller(SequentialController::new(generator, ResultStore::new()))
    }

    /// Create a session from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured grammar or dialogue filter does not compile.
    pub fn from_config(generator: G, config: &StoryboardConfig) -> StoryboardResult<Self> {
        let controller = SequentialController::from_config(generator, ResultStore::new(), config)?;
        let mut session = Self::with_controller(controller);
        session.aspect_ratio = config.generation.default_aspect_ratio;
        Ok(session)
    }

    /// Create a session around an existing controller.
    pub fn with_controller(controller: SequentialController<G>) -> Self {
        Self {
            controller,
            script: String::new(),
            story_context: String::new(),
            style: String::new(),
            aspect_ratio: AspectRatio::default(),
            registry: CharacterRegistry::new(),
            cancel: Mutex::new(CancellationToken::new()),
            running: tokio::sync::Mutex::new(()),
        }
    }

    /// Current script text.
    pub fn script(&self) -> &str {
        &self.script
    }

    /// Replace the script text. Existing results are untouched.
    pub fn set_script(&mut self, script: impl Into<String>) {
        self.script = script.into();
    }

    /// Current story context.
    pub fn story_context(&self) -> &str {
        &self.story_context
    }

    /// Replace the story context sent with every scene.
    pub fn set_story_context(&mut self, story_context: impl Into<String>) {
        self.story_context = story_context.into();
    }

    /// Current style text.
    pub fn style(&self) -> &str {
        &self.style
    }

    /// Replace the style text sent with every scene.
    pub fn set_style(&mut self, style: impl Into<String>) {
        self.style = style.into();
    }

    /// Current aspect ratio.
    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    /// Choose the output frame shape.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: AspectRatio) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Scenes parsed from the current script.
    pub fn scenes(&self) -> Vec<Scene> {
        self.controller.parser().parse(&self.script)
    }

    /// Character references, in matching order.
    pub fn characters(&self) -> &CharacterRegistry {
        &self.registry
    }

    /// Register a character reference image.
    pub fn add_character(&mut self, name: impl Into<String>, image: ImageData) -> CharacterId {
        self.registry.add(CharacterReference::new(name, image))
    }

    /// Register a character reference image read from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a supported image.
    pub fn add_character_from_file(
        &mut self,
        name: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> StoryboardResult<CharacterId> {
        let reference = CharacterReference::from_file(name, path)?;
        Ok(self.registry.add(reference))
    }

    /// Rename a character. Returns `false` if the id is unknown.
    pub fn rename_character(&mut self, id: CharacterId, name: impl Into<String>) -> bool {
        self.registry.rename(id, name)
    }

    /// Swap a character's reference image. Returns `false` if the id is unknown.
    pub fn replace_character_image(&mut self, id: CharacterId, image: ImageData) -> bool {
        self.registry.replace_image(id, image)
    }

    /// Remove a character. Results that pointed at it simply lose the reference.
    pub fn remove_character(&mut self, id: CharacterId) -> Option<CharacterReference> {
        self.registry.remove(id)
    }

    /// Current results.
    pub fn results(&self) -> Snapshot {
        self.controller.store().snapshot()
    }

    /// One result by id.
    pub fn result(&self, id: ResultId) -> Option<GenerationResult> {
        self.controller.store().get(id)
    }

    /// Receive a snapshot after every store change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.controller.store().subscribe()
    }

    /// Parse the script and generate every scene, replacing existing results.
    ///
    /// # Errors
    ///
    /// Returns [`StoreErrorKind::RunInProgress`] if another run is active, or
    /// [`ScriptErrorKind::NoValidScenes`] before any state changes if the
    /// script yields no scenes.
    #[instrument(skip_all)]
    pub async fn generate_all(&self) -> StoryboardResult<RunSummary> {
        let (_running, cancel) = self.begin_run()?;
        let scenes = self.scenes();
        if scenes.is_empty() {
            info!("No valid prompts found in script");
            return Err(ScriptError::new(ScriptErrorKind::NoValidScenes).into());
        }

        self.controller
            .generate_all(&scenes, &self.registry, &self.context(), &cancel)
            .await
    }

    /// Regenerate every existing result in place.
    ///
    /// # Errors
    ///
    /// Returns an error if another run is active or there are no results yet.
    #[instrument(skip_all)]
    pub async fn regenerate_all(&self) -> StoryboardResult<RunSummary> {
        let (_running, cancel) = self.begin_run()?;
        self.controller
            .regenerate_all(&self.registry, &self.context(), &cancel)
            .await
    }

    /// Regenerate one result, optionally with a new prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if another run is active, `id` is unknown, or the
    /// override is blank.
    #[instrument(skip_all, fields(%id))]
    pub async fn regenerate_one(
        &self,
        id: ResultId,
        prompt_override: Option<&str>,
    ) -> StoryboardResult<RunSummary> {
        let (_running, cancel) = self.begin_run()?;
        self.controller
            .regenerate_one(
                id,
                prompt_override,
                &self.script,
                &self.registry,
                &self.context(),
                &cancel,
            )
            .await
    }

    /// Whether a run is in flight.
    pub fn is_running(&self) -> bool {
        self.running.try_lock().is_err()
    }

    /// Ask the current run to stop at its next check.
    pub fn cancel(&self) {
        debug!("Cancellation requested");
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }

    /// Copy a result under a new id ("save as new").
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is unknown.
    pub fn duplicate_result(&self, id: ResultId) -> Result<ResultId, StoreError> {
        self.controller.store().duplicate(id)
    }

    /// Edit a result's prompt without regenerating.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is unknown or `prompt` is blank.
    pub fn edit_prompt(&self, id: ResultId, prompt: &str) -> Result<(), StoreError> {
        self.controller
            .store()
            .edit_prompt(id, prompt, self.controller.parser())
    }

    /// Delete a result.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is unknown.
    pub fn remove_result(&self, id: ResultId) -> Result<GenerationResult, StoreError> {
        self.controller.store().remove(id)
    }

    fn context(&self) -> GenerationContext {
        GenerationContext::new(
            self.story_context.clone(),
            self.style.clone(),
            self.aspect_ratio,
        )
    }

    /// Claim the run slot and install the token [`cancel`](Self::cancel) reaches.
    ///
    /// The token is only swapped once the slot is held, so a rejected start
    /// never detaches the active run from `cancel`.
    fn begin_run(&self) -> StoryboardResult<(MutexGuard<'_, ()>, CancellationToken)> {
        let guard = self.running.try_lock().map_err(|_| {
            debug!("Run requested while another is active");
            StoreError::new(StoreErrorKind::RunInProgress)
        })?;
        let token = CancellationToken::new();
        *self.cancel.lock().unwrap_or_else(PoisonError::into_inner) = token.clone();
        Ok((guard, token))
    }
}
