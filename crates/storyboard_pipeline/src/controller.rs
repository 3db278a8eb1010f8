//! Sequential scene-chaining controller.
//!
//! Scenes are generated strictly one after another. Each call receives the
//! previous scene's successful image as its continuity reference; a failed
//! scene breaks the chain, so the scene after it starts without one.

use crate::retry::{AttemptOutcome, RetryPolicy};
use crate::store::{ResultStore, non_blank};
use derive_getters::Getters;
use std::sync::Arc;
use storyboard_core::{
    AspectRatio, CharacterRegistry, GenerationResult, GenerationStatus, ImageData, ResultId,
    Scene, StoryboardConfig,
};
use storyboard_error::{
    ScriptError, ScriptErrorKind, StoreError, StoreErrorKind, StoryboardResult,
};
use storyboard_interface::{CharacterImage, ImageGenerator, ImageRequest};
use storyboard_script::{DialogueFilter, ScriptParser, resolve_character};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Free-text and geometry settings shared by every call in a run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Getters)]
pub struct GenerationContext {
    /// Story background sent with every scene
    story_context: String,
    /// Visual style sent with every scene
    style: String,
    /// Output frame shape
    aspect_ratio: AspectRatio,
}

impl GenerationContext {
    /// Create a context.
    pub fn new(
        story_context: impl Into<String>,
        style: impl Into<String>,
        aspect_ratio: AspectRatio,
    ) -> Self {
        Self {
            story_context: story_context.into(),
            style: style.into(),
            aspect_ratio,
        }
    }
}

/// Terminal status counts of one controller procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Getters)]
pub struct RunSummary {
    /// Scenes that produced an image
    succeeded: usize,
    /// Scenes that exhausted their attempts
    failed: usize,
    /// Scenes stopped by cancellation
    cancelled: usize,
}

impl RunSummary {
    /// Number of scenes the procedure touched.
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.cancelled
    }

    /// Whether the run was stopped by cancellation.
    pub fn was_cancelled(&self) -> bool {
        self.cancelled > 0
    }
}

/// One scene's worth of work inside a chained run.
#[derive(Debug)]
struct Job {
    id: ResultId,
    prompt: String,
    character: Option<CharacterImage>,
}

/// Orchestrates ordered, reference-carrying calls to an [`ImageGenerator`].
///
/// The controller is the only writer of its [`ResultStore`]. Procedures are
/// sequential by construction: no two generator calls are ever in flight at
/// once.
pub struct SequentialController<G: ImageGenerator> {
    generator: G,
    store: ResultStore,
    retry: RetryPolicy,
    dialogue: DialogueFilter,
    parser: ScriptParser,
}

impl<G: ImageGenerator> SequentialController<G> {
    /// Create a controller with the default retry policy and script grammar.
    pub fn new(generator: G, store: ResultStore) -> Self {
        Self {
            generator,
            store,
            retry: RetryPolicy::default(),
            dialogue: DialogueFilter::default(),
            parser: ScriptParser::default(),
        }
    }

    /// Create a controller from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured script grammar or dialogue filter
    /// does not compile.
    pub fn from_config(
        generator: G,
        store: ResultStore,
        config: &StoryboardConfig,
    ) -> StoryboardResult<Self> {
        Ok(Self {
            generator,
            store,
            retry: RetryPolicy::from_config(&config.generation),
            dialogue: DialogueFilter::from_config(&config.generation)?,
            parser: ScriptParser::new(&config.script)?,
        })
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The store this controller writes to.
    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// The underlying generator.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// The script grammar used to re-derive scenes.
    pub fn parser(&self) -> &ScriptParser {
        &self.parser
    }

    /// Generate every scene from scratch.
    ///
    /// The store is replaced by one pending result per scene, in order, before
    /// the first call is made.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptErrorKind::NoValidScenes`] without touching the store
    /// if `scenes` is empty. Per-scene failures are never returned; they end
    /// up as `failed` results.
    #[instrument(
        skip_all,
        fields(scenes = scenes.len(), model = self.generator.model_name())
    )]
    pub async fn generate_all(
        &self,
        scenes: &[Scene],
        registry: &CharacterRegistry,
        context: &GenerationContext,
        cancel: &CancellationToken,
    ) -> StoryboardResult<RunSummary> {
        if scenes.is_empty() {
            return Err(ScriptError::new(ScriptErrorKind::NoValidScenes).into());
        }

        let mut results = Vec::with_capacity(scenes.len());
        let mut jobs = Vec::with_capacity(scenes.len());
        for scene in scenes {
            let character = resolve_character(scene, registry);
            let result = GenerationResult::from_scene(scene, character.map(|c| *c.id()));
            jobs.push(Job {
                id: *result.id(),
                prompt: scene.prompt_text().clone(),
                character: character.map(CharacterImage::from),
            });
            results.push(result);
        }
        self.store.replace_all(results);

        info!("Starting storyboard generation");
        let chain = vec![None; jobs.len()];
        let summary = self.run_chain(&jobs, chain, context, cancel, false).await;
        info!(?summary, "Storyboard generation finished");
        Ok(summary)
    }

    /// Regenerate every existing result in place.
    ///
    /// The chain is seeded from results that already succeeded, then every
    /// result is reset to pending. Calls carry the variant flag.
    ///
    /// # Errors
    ///
    /// Returns [`StoreErrorKind::NoResults`] if the store is empty.
    #[instrument(
        skip_all,
        fields(results = self.store.len(), model = self.generator.model_name())
    )]
    pub async fn regenerate_all(
        &self,
        registry: &CharacterRegistry,
        context: &GenerationContext,
        cancel: &CancellationToken,
    ) -> StoryboardResult<RunSummary> {
        let snapshot = self.store.snapshot();
        if snapshot.is_empty() {
            return Err(StoreError::new(StoreErrorKind::NoResults).into());
        }

        let chain: Vec<Option<Arc<ImageData>>> =
            snapshot.iter().map(|r| r.payload().cloned()).collect();
        let jobs: Vec<Job> = snapshot
            .iter()
            .map(|result| Job {
                id: *result.id(),
                prompt: result.prompt_text().clone(),
                character: character_for(result, registry),
            })
            .collect();

        self.store.replace_all(
            snapshot
                .iter()
                .cloned()
                .map(|mut result| {
                    result.mark_pending();
                    result
                })
                .collect(),
        );

        info!("Starting storyboard regeneration");
        let summary = self.run_chain(&jobs, chain, context, cancel, true).await;
        info!(?summary, "Storyboard regeneration finished");
        Ok(summary)
    }

    /// Regenerate a single result.
    ///
    /// Continuity is recomputed from `script` and the current store contents
    /// (see [`continuity_for`]). On success with a `prompt_override`, the
    /// result's prompt and the prompt field of its script block are updated.
    ///
    /// # Errors
    ///
    /// Returns [`StoreErrorKind::EmptyPrompt`] if `prompt_override` is blank
    /// and [`StoreErrorKind::UnknownResult`] if `id` is not in the store. In
    /// both cases the store is left untouched.
    #[instrument(skip_all, fields(%id))]
    pub async fn regenerate_one(
        &self,
        id: ResultId,
        prompt_override: Option<&str>,
        script: &str,
        registry: &CharacterRegistry,
        context: &GenerationContext,
        cancel: &CancellationToken,
    ) -> StoryboardResult<RunSummary> {
        let prompt_override = prompt_override.map(non_blank).transpose()?;
        let target = self
            .store
            .get(id)
            .ok_or_else(|| StoreError::new(StoreErrorKind::UnknownResult(id.to_string())))?;
        self.store.update(id, GenerationResult::mark_pending)?;

        let scenes = self.parser.parse(script);
        let previous = continuity_for(&scenes, *target.sequence_number(), &self.store.snapshot());
        debug!(
            label = %target.scene_label(),
            has_previous = previous.is_some(),
            "Regenerating scene"
        );

        let prompt = prompt_override.unwrap_or_else(|| target.prompt_text().as_str());
        let character = character_for(&target, registry);

        let mut summary = RunSummary::default();
        match self.attempt(prompt, character, previous, context, cancel, false).await {
            AttemptOutcome::Succeeded(image) => {
                let rewritten = prompt_override.map(|text| {
                    (text.to_string(), self.parser.rewrite_prompt(target.scene_script_text(), text))
                });
                self.store.update(id, |result| {
                    result.mark_succeeded(Arc::new(image));
                    if let Some((prompt, script)) = rewritten {
                        result.set_prompt_text(prompt);
                        result.set_scene_script_text(script);
                    }
                })?;
                summary.succeeded += 1;
            }
            AttemptOutcome::Failed(e) => {
                self.store.update(id, |result| result.mark_failed(e.to_string()))?;
                summary.failed += 1;
            }
            AttemptOutcome::Cancelled => {
                self.store.update(id, GenerationResult::mark_cancelled)?;
                summary.cancelled += 1;
            }
        }
        Ok(summary)
    }

    async fn run_chain(
        &self,
        jobs: &[Job],
        mut chain: Vec<Option<Arc<ImageData>>>,
        context: &GenerationContext,
        cancel: &CancellationToken,
        variant: bool,
    ) -> RunSummary {
        let mut summary = RunSummary::default();

        for (index, job) in jobs.iter().enumerate() {
            if cancel.is_cancelled() {
                summary.cancelled += self.cancel_remaining(&jobs[index..]);
                break;
            }

            let previous = index
                .checked_sub(1)
                .and_then(|prior| chain.get(prior).cloned().flatten());
            debug!(
                index,
                has_character = job.character.is_some(),
                has_previous = previous.is_some(),
                "Generating scene"
            );

            let outcome = self
                .attempt(&job.prompt, job.character.clone(), previous, context, cancel, variant)
                .await;

            let applied = match outcome {
                AttemptOutcome::Succeeded(image) => {
                    let image = Arc::new(image);
                    chain[index] = Some(Arc::clone(&image));
                    summary.succeeded += 1;
                    self.store.update(job.id, |r| r.mark_succeeded(image))
                }
                AttemptOutcome::Failed(e) => {
                    chain[index] = None;
                    summary.failed += 1;
                    self.store.update(job.id, |r| r.mark_failed(e.to_string()))
                }
                AttemptOutcome::Cancelled => {
                    summary.cancelled += self.cancel_remaining(&jobs[index..]);
                    break;
                }
            };
            if let Err(e) = applied {
                debug!(error = %e, "Result removed during run; outcome dropped");
            }
        }

        summary
    }

    async fn attempt(
        &self,
        prompt: &str,
        character: Option<CharacterImage>,
        previous: Option<Arc<ImageData>>,
        context: &GenerationContext,
        cancel: &CancellationToken,
        variant: bool,
    ) -> AttemptOutcome<ImageData> {
        let request = ImageRequest::new(
            self.dialogue.strip(prompt),
            context.story_context().as_str(),
            context.style().as_str(),
            *context.aspect_ratio(),
        )
        .with_character(character)
        .with_previous_image(previous)
        .with_variant(variant);

        let generator = &self.generator;
        let request = &request;
        self.retry
            .run(cancel, |attempt| async move {
                debug!(attempt, provider = generator.provider_name(), "Calling image generator");
                generator.generate(request).await
            })
            .await
    }

    fn cancel_remaining(&self, jobs: &[Job]) -> usize {
        let mut count = 0;
        for job in jobs {
            if self.store.update(job.id, GenerationResult::mark_cancelled).is_ok() {
                count += 1;
            }
        }
        info!(count, "Run cancelled");
        count
    }
}

/// Continuity image for regenerating the scene numbered `target_sequence`.
///
/// The preceding scene is the parsed scene with the greatest sequence number
/// strictly below the target's (first in textual order on ties). The image
/// is the payload of the most recent succeeded result carrying that scene's
/// label.
pub fn continuity_for(
    scenes: &[Scene],
    target_sequence: u32,
    results: &[GenerationResult],
) -> Option<Arc<ImageData>> {
    let preceding = scenes
        .iter()
        .filter(|scene| *scene.sequence_number() < target_sequence)
        .fold(None::<&Scene>, |best, scene| match best {
            Some(best) if best.sequence_number() >= scene.sequence_number() => Some(best),
            _ => Some(scene),
        })?;

    results
        .iter()
        .rev()
        .filter(|result| *result.status() == GenerationStatus::Succeeded)
        .find(|result| result.scene_label() == preceding.label())
        .and_then(|result| result.payload().cloned())
}

fn character_for(result: &GenerationResult, registry: &CharacterRegistry) -> Option<CharacterImage> {
    result
        .character_ref_id()
        .and_then(|id| registry.get(id))
        .map(CharacterImage::from)
}
