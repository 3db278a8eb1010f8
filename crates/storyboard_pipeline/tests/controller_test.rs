//! Sequential controller tests.
//!
//! Time-dependent tests run on a paused clock, so the retry delay
//! auto-advances and elapsed time can be asserted exactly.

mod test_utils;

use std::sync::Arc;
use std::time::Duration;
use storyboard_core::{AspectRatio, CharacterRegistry, GenerationStatus};
use storyboard_error::{ScriptErrorKind, StoreErrorKind, StoryboardErrorKind};
use storyboard_pipeline::{GenerationContext, ResultStore, SequentialController};
use storyboard_script::parse_script;
use test_utils::{
    ANNA_SCRIPT, MockBehavior, MockImageGenerator, image_for, numbered_script, registry_with,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn controller(mock: &Arc<MockImageGenerator>) -> SequentialController<Arc<MockImageGenerator>> {
    SequentialController::new(Arc::clone(mock), ResultStore::new())
}

fn context() -> GenerationContext {
    GenerationContext::new("A quiet town", "ink wash", AspectRatio::Widescreen)
}

fn statuses(controller: &SequentialController<Arc<MockImageGenerator>>) -> Vec<GenerationStatus> {
    controller
        .store()
        .snapshot()
        .iter()
        .map(|r| *r.status())
        .collect()
}

#[tokio::test]
async fn test_chain_passes_each_output_to_the_next_scene() -> anyhow::Result<()> {
    let mock = Arc::new(MockImageGenerator::new_success());
    let controller = controller(&mock);
    let scenes = parse_script(&numbered_script(3));

    let summary = controller
        .generate_all(&scenes, &CharacterRegistry::new(), &context(), &CancellationToken::new())
        .await?;

    assert_eq!(*summary.succeeded(), 3);
    let calls = mock.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[0].previous.is_none());
    assert_eq!(calls[1].previous.as_deref(), Some(&image_for("Prompt 1")));
    assert_eq!(calls[2].previous.as_deref(), Some(&image_for("Prompt 2")));
    assert!(calls.iter().all(|call| !call.variant));

    let snapshot = controller.store().snapshot();
    assert_eq!(snapshot[2].payload().map(|p| p.as_ref()), Some(&image_for("Prompt 3")));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_failed_scene_breaks_the_chain() -> anyhow::Result<()> {
    let mock = Arc::new(
        MockImageGenerator::new_success().with_behavior("Prompt 2", MockBehavior::AlwaysFail),
    );
    let controller = controller(&mock);
    let scenes = parse_script(&numbered_script(3));

    let summary = controller
        .generate_all(&scenes, &CharacterRegistry::new(), &context(), &CancellationToken::new())
        .await?;

    assert_eq!((*summary.succeeded(), *summary.failed()), (2, 1));
    assert_eq!(mock.calls_for("Prompt 2").len(), 3);

    let third = mock.calls_for("Prompt 3");
    assert_eq!(third.len(), 1);
    assert!(third[0].previous.is_none());

    assert_eq!(
        statuses(&controller),
        vec![
            GenerationStatus::Succeeded,
            GenerationStatus::Failed,
            GenerationStatus::Succeeded
        ]
    );
    let failed = &controller.store().snapshot()[1];
    assert!(failed.payload().is_none());
    assert!(failed.last_error().is_some_and(|e| e.contains("503")));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_retry_wait() -> anyhow::Result<()> {
    let mock = Arc::new(
        MockImageGenerator::new_success().with_behavior("Prompt 2", MockBehavior::AlwaysFail),
    );
    let controller = controller(&mock);
    let scenes = parse_script(&numbered_script(4));
    let cancel = CancellationToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(2)).await;
        canceller.cancel();
    });

    let summary = controller
        .generate_all(&scenes, &CharacterRegistry::new(), &context(), &cancel)
        .await?;

    assert_eq!((*summary.succeeded(), *summary.cancelled()), (1, 3));
    assert!(summary.was_cancelled());
    assert_eq!(mock.calls_for("Prompt 2").len(), 1);
    assert!(mock.calls_for("Prompt 3").is_empty());
    assert!(mock.calls_for("Prompt 4").is_empty());
    assert_eq!(
        statuses(&controller),
        vec![
            GenerationStatus::Succeeded,
            GenerationStatus::Cancelled,
            GenerationStatus::Cancelled,
            GenerationStatus::Cancelled
        ]
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_success_landing_after_cancel_is_discarded() -> anyhow::Result<()> {
    let mock = Arc::new(MockImageGenerator::new_success().with_latency(Duration::from_secs(2)));
    let controller = controller(&mock);
    let scenes = parse_script(&numbered_script(3));
    let cancel = CancellationToken::new();

    // Scene 2's call is in flight from t=2s to t=4s.
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        canceller.cancel();
    });

    let summary = controller
        .generate_all(&scenes, &CharacterRegistry::new(), &context(), &cancel)
        .await?;

    assert_eq!(
        (*summary.succeeded(), *summary.failed(), *summary.cancelled()),
        (1, 0, 2)
    );
    assert_eq!(mock.call_count(), 2);
    assert!(mock.calls_for("Prompt 3").is_empty());
    assert_eq!(
        statuses(&controller),
        vec![
            GenerationStatus::Succeeded,
            GenerationStatus::Cancelled,
            GenerationStatus::Cancelled
        ]
    );
    let snapshot = controller.store().snapshot();
    assert!(snapshot[1].payload().is_none());
    assert!(snapshot[1].last_error().is_none());
    Ok(())
}

#[tokio::test]
async fn test_cancel_before_start_makes_no_calls() -> anyhow::Result<()> {
    let mock = Arc::new(MockImageGenerator::new_success());
    let controller = controller(&mock);
    let scenes = parse_script(&numbered_script(2));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let summary = controller
        .generate_all(&scenes, &CharacterRegistry::new(), &context(), &cancel)
        .await?;

    assert_eq!(*summary.cancelled(), 2);
    assert_eq!(mock.call_count(), 0);
    assert!(
        statuses(&controller)
            .iter()
            .all(|s| *s == GenerationStatus::Cancelled)
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_two_failures_then_success_uses_whole_budget() -> anyhow::Result<()> {
    let mock = Arc::new(
        MockImageGenerator::new_success()
            .with_behavior("Prompt 1", MockBehavior::FailThenSucceed(2)),
    );
    let controller = controller(&mock);
    let scenes = parse_script(&numbered_script(1));
    let start = Instant::now();

    let summary = controller
        .generate_all(&scenes, &CharacterRegistry::new(), &context(), &CancellationToken::new())
        .await?;

    assert_eq!(*summary.succeeded(), 1);
    assert_eq!(start.elapsed(), Duration::from_secs(10));

    let calls = mock.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[1].at - calls[0].at, Duration::from_secs(5));
    assert_eq!(calls[2].at - calls[1].at, Duration::from_secs(5));
    assert_eq!(statuses(&controller), vec![GenerationStatus::Succeeded]);
    Ok(())
}

#[tokio::test]
async fn test_anna_scenario_with_registered_character() -> anyhow::Result<()> {
    let mock = Arc::new(MockImageGenerator::new_success());
    let controller = controller(&mock);
    let registry = registry_with("Anna");
    let scenes = parse_script(ANNA_SCRIPT);

    controller
        .generate_all(&scenes, &registry, &context(), &CancellationToken::new())
        .await?;

    let calls = mock.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].prompt, "A dog runs.");
    assert_eq!(calls[0].character.as_deref(), Some("Anna"));
    assert!(calls[0].previous.is_none());
    assert_eq!(calls[1].prompt, "A cat sleeps.");
    assert!(calls[1].character.is_none());
    assert_eq!(calls[1].previous.as_deref(), Some(&image_for("A dog runs.")));

    let snapshot = controller.store().snapshot();
    assert_eq!(snapshot[0].scene_label(), "Scene 1");
    assert_eq!(snapshot[1].scene_label(), "Scene 2");
    assert!(snapshot[0].character_ref_id().is_some());
    assert!(snapshot[1].character_ref_id().is_none());
    assert_eq!(
        statuses(&controller),
        vec![GenerationStatus::Succeeded, GenerationStatus::Succeeded]
    );
    Ok(())
}

#[tokio::test]
async fn test_anna_scenario_without_registry_match() -> anyhow::Result<()> {
    let mock = Arc::new(MockImageGenerator::new_success());
    let controller = controller(&mock);
    let scenes = parse_script(ANNA_SCRIPT);

    controller
        .generate_all(&scenes, &registry_with("Bruno"), &context(), &CancellationToken::new())
        .await?;

    let calls = mock.calls();
    assert!(calls.iter().all(|call| call.character.is_none()));
    assert_eq!(calls[1].previous.as_deref(), Some(&image_for("A dog runs.")));
    Ok(())
}

#[tokio::test]
async fn test_empty_scene_list_is_rejected_before_mutation() -> anyhow::Result<()> {
    let mock = Arc::new(MockImageGenerator::new_success());
    let controller = controller(&mock);
    controller
        .generate_all(
            &parse_script(&numbered_script(1)),
            &CharacterRegistry::new(),
            &context(),
            &CancellationToken::new(),
        )
        .await?;
    let before = controller.store().snapshot();

    let err = controller
        .generate_all(&[], &CharacterRegistry::new(), &context(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err.kind(),
        StoryboardErrorKind::Script(e) if e.kind == ScriptErrorKind::NoValidScenes
    ));
    assert!(Arc::ptr_eq(&before, &controller.store().snapshot()));
    assert_eq!(mock.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_dialogue_is_stripped_only_from_the_sent_prompt() -> anyhow::Result<()> {
    let mock = Arc::new(MockImageGenerator::new_success());
    let controller = controller(&mock);
    let scenes = parse_script(
        "Scene 1:\nPrompt: Anna shouts \"Let's go to the park today!\" and waves.",
    );

    controller
        .generate_all(&scenes, &CharacterRegistry::new(), &context(), &CancellationToken::new())
        .await?;

    let sent = &mock.calls()[0].prompt;
    assert!(sent.contains("(character is speaking)"));
    assert!(!sent.contains("park"));

    let stored = controller.store().snapshot();
    assert!(stored[0].prompt_text().contains("Let's go to the park today!"));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_regenerate_all_keeps_identity_and_sets_variant() -> anyhow::Result<()> {
    let mock = Arc::new(
        MockImageGenerator::new_success()
            .with_behavior("Prompt 2", MockBehavior::FailThenSucceed(3)),
    );
    let controller = controller(&mock);
    let scenes = parse_script(&numbered_script(3));
    controller
        .generate_all(&scenes, &CharacterRegistry::new(), &context(), &CancellationToken::new())
        .await?;
    let ids: Vec<_> = controller.store().snapshot().iter().map(|r| *r.id()).collect();
    let first_run_calls = mock.call_count();

    let summary = controller
        .regenerate_all(&CharacterRegistry::new(), &context(), &CancellationToken::new())
        .await?;

    assert_eq!(*summary.succeeded(), 3);
    let snapshot = controller.store().snapshot();
    assert_eq!(snapshot.iter().map(|r| *r.id()).collect::<Vec<_>>(), ids);

    let calls = &mock.calls()[first_run_calls..];
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|call| call.variant));
    assert_eq!(calls[1].previous.as_deref(), Some(&image_for("Prompt 1")));
    assert_eq!(calls[2].previous.as_deref(), Some(&image_for("Prompt 2")));
    Ok(())
}

#[tokio::test]
async fn test_regenerate_all_on_empty_store() {
    let mock = Arc::new(MockImageGenerator::new_success());
    let controller = controller(&mock);

    let err = controller
        .regenerate_all(&CharacterRegistry::new(), &context(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err.kind(),
        StoryboardErrorKind::Store(e) if e.kind == StoreErrorKind::NoResults
    ));
}

#[tokio::test(start_paused = true)]
async fn test_regenerate_one_recomputes_continuity() -> anyhow::Result<()> {
    let mock = Arc::new(
        MockImageGenerator::new_success()
            .with_behavior("Prompt 2", MockBehavior::FailThenSucceed(3)),
    );
    let controller = controller(&mock);
    let script = numbered_script(3);
    controller
        .generate_all(
            &parse_script(&script),
            &CharacterRegistry::new(),
            &context(),
            &CancellationToken::new(),
        )
        .await?;
    let second = *controller.store().snapshot()[1].id();

    let summary = controller
        .regenerate_one(
            second,
            None,
            &script,
            &CharacterRegistry::new(),
            &context(),
            &CancellationToken::new(),
        )
        .await?;

    assert_eq!(*summary.succeeded(), 1);
    let call = mock.calls().pop().unwrap();
    assert_eq!(call.prompt, "Prompt 2");
    assert!(!call.variant);
    assert_eq!(call.previous.as_deref(), Some(&image_for("Prompt 1")));

    let result = controller.store().get(second).unwrap();
    assert_eq!(*result.status(), GenerationStatus::Succeeded);
    assert_eq!(result.prompt_text(), "Prompt 2");
    Ok(())
}

#[tokio::test]
async fn test_regenerate_one_with_prompt_override() -> anyhow::Result<()> {
    let mock = Arc::new(MockImageGenerator::new_success());
    let controller = controller(&mock);
    let script = numbered_script(3);
    controller
        .generate_all(
            &parse_script(&script),
            &CharacterRegistry::new(),
            &context(),
            &CancellationToken::new(),
        )
        .await?;
    let third = *controller.store().snapshot()[2].id();

    controller
        .regenerate_one(
            third,
            Some("A lighthouse at dusk."),
            &script,
            &CharacterRegistry::new(),
            &context(),
            &CancellationToken::new(),
        )
        .await?;

    let call = mock.calls().pop().unwrap();
    assert_eq!(call.prompt, "A lighthouse at dusk.");
    assert_eq!(call.previous.as_deref(), Some(&image_for("Prompt 2")));

    let result = controller.store().get(third).unwrap();
    assert_eq!(result.prompt_text(), "A lighthouse at dusk.");
    assert_eq!(
        result.scene_script_text(),
        "Scene 3:\nCharacter: None\nPrompt: A lighthouse at dusk."
    );
    assert_eq!(result.payload().map(|p| p.as_ref()), Some(&image_for("A lighthouse at dusk.")));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_regenerate_one_cancelled_mid_call() -> anyhow::Result<()> {
    let mock = Arc::new(MockImageGenerator::new_success().with_latency(Duration::from_secs(2)));
    let controller = controller(&mock);
    let script = numbered_script(2);
    controller
        .generate_all(
            &parse_script(&script),
            &CharacterRegistry::new(),
            &context(),
            &CancellationToken::new(),
        )
        .await?;
    let second = *controller.store().snapshot()[1].id();
    let cancel = CancellationToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.cancel();
    });

    let summary = controller
        .regenerate_one(
            second,
            Some("A lighthouse at dusk."),
            &script,
            &CharacterRegistry::new(),
            &context(),
            &cancel,
        )
        .await?;

    assert_eq!(
        (*summary.succeeded(), *summary.failed(), *summary.cancelled()),
        (0, 0, 1)
    );
    assert_eq!(mock.call_count(), 3);

    let result = controller.store().get(second).unwrap();
    assert_eq!(*result.status(), GenerationStatus::Cancelled);
    assert!(result.payload().is_none());
    assert!(result.last_error().is_none());
    assert_eq!(result.prompt_text(), "Prompt 2");
    assert_eq!(
        *controller.store().snapshot()[0].status(),
        GenerationStatus::Succeeded
    );
    Ok(())
}

#[tokio::test]
async fn test_regenerate_one_rejects_blank_override() -> anyhow::Result<()> {
    let mock = Arc::new(MockImageGenerator::new_success());
    let controller = controller(&mock);
    let script = numbered_script(1);
    controller
        .generate_all(
            &parse_script(&script),
            &CharacterRegistry::new(),
            &context(),
            &CancellationToken::new(),
        )
        .await?;
    let before = controller.store().snapshot();
    let first = *before[0].id();

    let err = controller
        .regenerate_one(
            first,
            Some("   "),
            &script,
            &CharacterRegistry::new(),
            &context(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err.kind(),
        StoryboardErrorKind::Store(e) if e.kind == StoreErrorKind::EmptyPrompt
    ));
    assert_eq!(mock.call_count(), 1);
    assert!(Arc::ptr_eq(&before, &controller.store().snapshot()));
    Ok(())
}

#[tokio::test]
async fn test_regenerate_one_trims_override() -> anyhow::Result<()> {
    let mock = Arc::new(MockImageGenerator::new_success());
    let controller = controller(&mock);
    let script = numbered_script(1);
    controller
        .generate_all(
            &parse_script(&script),
            &CharacterRegistry::new(),
            &context(),
            &CancellationToken::new(),
        )
        .await?;
    let first = *controller.store().snapshot()[0].id();

    controller
        .regenerate_one(
            first,
            Some("  A harbor at dawn.  "),
            &script,
            &CharacterRegistry::new(),
            &context(),
            &CancellationToken::new(),
        )
        .await?;

    assert_eq!(mock.calls().pop().unwrap().prompt, "A harbor at dawn.");
    let result = controller.store().get(first).unwrap();
    assert_eq!(result.prompt_text(), "A harbor at dawn.");
    assert_eq!(
        result.scene_script_text(),
        "Scene 1:\nCharacter: None\nPrompt: A harbor at dawn."
    );
    Ok(())
}

#[tokio::test]
async fn test_regenerate_one_without_preceding_success() -> anyhow::Result<()> {
    let mock = Arc::new(MockImageGenerator::new_success());
    let controller = controller(&mock);
    let script = numbered_script(2);
    controller
        .generate_all(
            &parse_script(&script),
            &CharacterRegistry::new(),
            &context(),
            &CancellationToken::new(),
        )
        .await?;
    let first = *controller.store().snapshot()[0].id();
    let second = *controller.store().snapshot()[1].id();
    controller.store().remove(first)?;

    controller
        .regenerate_one(
            second,
            None,
            &script,
            &CharacterRegistry::new(),
            &context(),
            &CancellationToken::new(),
        )
        .await?;

    assert!(mock.calls().pop().unwrap().previous.is_none());
    Ok(())
}

#[tokio::test]
async fn test_regenerate_one_unknown_id() {
    let mock = Arc::new(MockImageGenerator::new_success());
    let controller = controller(&mock);

    let err = controller
        .regenerate_one(
            storyboard_core::ResultId::new(),
            None,
            "",
            &CharacterRegistry::new(),
            &context(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), StoryboardErrorKind::Store(_)));
    assert_eq!(mock.call_count(), 0);
}
