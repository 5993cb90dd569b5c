//! Playback timing tests
//!
//! All tests run on tokio's paused clock, so timer deadlines are exact. Checks
//! are placed a few milliseconds after the deadline they observe.

use std::time::Duration;

use letters_animation::{
    compose_frame, segment, AnimatedText, AnimationError, AnimationState, CharacterGeometry,
    Easing, Fade, PresetKind, TextAnimationConfig, TransformOrigin,
};
use tokio::time::{sleep_until, Instant};

fn config(animation_ms: u64, stagger_ms: u64) -> TextAnimationConfig {
    TextAnimationConfig::default()
        .with_animation_duration(Duration::from_millis(animation_ms))
        .with_intermediate_duration(Duration::from_millis(stagger_ms))
}

fn geometry(count: usize) -> Vec<CharacterGeometry> {
    (0..count)
        .map(|i| CharacterGeometry::new(TransformOrigin::new(i as f32 / count as f32, 0.5), 24.0))
        .collect()
}

/// Attached and laid out, Scenario A timing: 50 ms stagger, 200 ms enter
fn scenario_state(count: usize) -> AnimationState {
    let state = AnimationState::new();
    assert!(state.attach(count, config(200, 50)));
    state.report_layout(&geometry(count)).unwrap();
    state
}

async fn at(origin: Instant, ms: u64) {
    sleep_until(origin + Duration::from_millis(ms)).await;
}

fn visible(state: &AnimationState) -> Vec<bool> {
    state.visibilities().unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_staggered_reveal_and_settle() {
    let state = scenario_state(5);
    let t0 = Instant::now();
    state.start().unwrap();
    assert!(state.is_playing());
    assert!(state.is_ongoing());

    at(t0, 10).await;
    assert_eq!(visible(&state), vec![false; 5]);

    at(t0, 60).await;
    assert_eq!(visible(&state), vec![true, false, false, false, false]);
    assert_eq!(state.current_index(), None);

    at(t0, 110).await;
    assert_eq!(visible(&state), vec![true, true, false, false, false]);

    at(t0, 260).await;
    assert_eq!(visible(&state), vec![true, true, true, true, true]);
    assert_eq!(state.current_index(), Some(0));

    // character 0 leaves the animated path after the settle delay
    at(t0, 360).await;
    assert!(!state.visibility(0).unwrap());
    assert_eq!(state.current_index(), Some(2));

    at(t0, 460).await;
    assert_eq!(state.current_index(), Some(4));
    assert!(!state.is_stopped());

    at(t0, 560).await;
    assert!(state.is_stopped());
    assert!(state.is_paused());
    assert_eq!(state.current_index(), Some(4));
    assert_eq!(visible(&state), vec![false; 5]);
}

#[tokio::test(start_paused = true)]
async fn test_pause_freezes_sequencing() {
    let state = scenario_state(5);
    let t0 = Instant::now();
    state.start().unwrap();

    at(t0, 120).await;
    state.pause();
    let frozen = state.snapshot().unwrap();
    assert_eq!(frozen.visibility, vec![true, true, false, false, false]);
    assert_eq!(frozen.current_index, None);
    assert!(frozen.status.paused);
    assert!(frozen.status.ongoing);

    at(t0, 2_000).await;
    assert_eq!(state.snapshot().unwrap(), frozen);
}

#[tokio::test(start_paused = true)]
async fn test_resume_continues_after_watermark() {
    let state = scenario_state(5);
    let t0 = Instant::now();
    state.start().unwrap();

    at(t0, 320).await;
    state.pause();
    assert_eq!(state.current_index(), Some(1));

    at(t0, 400).await;
    state.resume().unwrap();
    assert!(state.is_playing());
    // settled characters drop out of the animated path
    assert!(!state.visibility(0).unwrap());
    assert!(!state.visibility(1).unwrap());

    // a restart would have revealed character 0 again at 450
    at(t0, 460).await;
    assert!(!state.visibility(0).unwrap());
    assert!(state.visibility(2).unwrap());
    assert_eq!(state.current_index(), Some(1));

    at(t0, 660).await;
    assert_eq!(state.current_index(), Some(2));

    at(t0, 900).await;
    assert!(state.is_stopped());
    assert_eq!(state.current_index(), Some(4));
    assert_eq!(visible(&state), vec![false; 5]);
}

#[tokio::test(start_paused = true)]
async fn test_resume_keeps_entered_glyphs_shown() {
    let characters = segment("Hello");
    let state = AnimationState::new();
    assert!(state.attach(5, config(200, 50).with_easing(Easing::Linear)));
    state.report_layout(&geometry(5)).unwrap();
    let opacity = |index: usize| {
        compose_frame(&state, &Fade, &characters, Instant::now())
            .unwrap()
            .characters[index]
            .visual
            .opacity
    };

    let t0 = Instant::now();
    state.start().unwrap();

    at(t0, 120).await;
    state.pause();
    at(t0, 400).await;
    assert_eq!(opacity(0), 1.0);
    assert_eq!(opacity(1), 1.0);

    state.resume().unwrap();
    // the loop passes over characters 0 and 1 again at 450 and 500
    at(t0, 455).await;
    assert_eq!(opacity(0), 1.0);
    at(t0, 505).await;
    assert_eq!(opacity(0), 1.0);
    assert_eq!(opacity(1), 1.0);
    assert!(opacity(2) < 1.0);

    state.wait_until_stopped().await;
    assert_eq!(state.current_index(), Some(4));
}

#[tokio::test(start_paused = true)]
async fn test_resume_with_every_character_settled_finishes() {
    let state = scenario_state(5);
    let t0 = Instant::now();
    state.start().unwrap();

    // last character settled at 450, leaves the animated path at 550
    at(t0, 510).await;
    state.pause();
    assert_eq!(state.current_index(), Some(4));
    assert!(state.visibility(4).unwrap());
    assert!(!state.is_stopped());

    state.resume().unwrap();
    assert!(state.is_stopped());
    assert!(state.is_paused());
    assert_eq!(state.current_index(), Some(4));
    assert_eq!(visible(&state), vec![false; 5]);

    let finished = state.snapshot().unwrap();
    at(t0, 1_000).await;
    assert_eq!(state.snapshot().unwrap(), finished);
}

#[tokio::test(start_paused = true)]
async fn test_empty_text_completes_immediately() {
    let state = scenario_state(0);
    state.start().unwrap();
    assert!(state.is_stopped());
    assert!(state.is_paused());
    assert_eq!(state.current_index(), None);
    assert_eq!(state.character_count().unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stop_mid_run_is_final() {
    let state = scenario_state(5);
    let t0 = Instant::now();
    state.start().unwrap();

    at(t0, 310).await;
    assert_eq!(state.current_index(), Some(1));
    state.stop();

    let stopped = state.snapshot().unwrap();
    assert_eq!(stopped.visibility, vec![false; 5]);
    assert_eq!(stopped.current_index, None);
    assert!(stopped.status.stopped);
    assert!(stopped.status.paused);

    at(t0, 3_000).await;
    assert_eq!(state.snapshot().unwrap(), stopped);
}

#[tokio::test(start_paused = true)]
async fn test_nothing_reveals_before_layout() {
    let state = AnimationState::new();
    state.attach(3, config(200, 50));
    let t0 = Instant::now();
    state.start().unwrap();
    assert!(state.is_ongoing());

    at(t0, 1_000).await;
    assert_eq!(visible(&state), vec![false; 3]);
    assert_eq!(state.current_index(), None);

    state.report_layout(&geometry(3)).unwrap();
    at(t0, 1_060).await;
    assert_eq!(visible(&state), vec![true, false, false]);
}

#[tokio::test(start_paused = true)]
async fn test_watermark_is_monotonic_while_running() {
    let state = scenario_state(8);
    let t0 = Instant::now();
    state.start().unwrap();

    let mut last: Option<usize> = None;
    let mut step = 0;
    while !state.is_stopped() {
        step += 5;
        at(t0, step).await;
        let current = state.current_index();
        assert!(current >= last, "watermark went back from {last:?} to {current:?}");
        last = current;
    }
    assert_eq!(last, Some(7));
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_idempotent() {
    let state = scenario_state(4);
    let t0 = Instant::now();
    state.start().unwrap();
    at(t0, 280).await;

    state.stop();
    let once = state.snapshot().unwrap();
    state.stop();
    assert_eq!(state.snapshot().unwrap(), once);
}

#[tokio::test(start_paused = true)]
async fn test_pause_when_paused_changes_nothing() {
    let state = scenario_state(4);
    let t0 = Instant::now();
    state.start().unwrap();
    at(t0, 170).await;

    state.pause();
    let once = state.snapshot().unwrap();
    state.pause();
    assert_eq!(state.snapshot().unwrap(), once);
}

#[tokio::test(start_paused = true)]
async fn test_start_while_running_restarts() {
    let state = scenario_state(5);
    let t0 = Instant::now();
    state.start().unwrap();

    at(t0, 310).await;
    assert_eq!(state.current_index(), Some(1));
    state.start().unwrap();
    assert_eq!(state.current_index(), None);
    assert_eq!(visible(&state), vec![false; 5]);
    assert!(state.is_ongoing());

    at(t0, 365).await;
    assert_eq!(visible(&state), vec![true, false, false, false, false]);
    // nothing from the first run settles into the second
    at(t0, 555).await;
    assert_eq!(state.current_index(), None);
    at(t0, 565).await;
    assert_eq!(state.current_index(), Some(0));
}

#[tokio::test(start_paused = true)]
async fn test_resume_without_start_is_noop() {
    let state = scenario_state(3);
    state.resume().unwrap();
    assert!(state.is_stopped());
    assert!(state.is_paused());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(visible(&state), vec![false; 3]);
}

#[tokio::test(start_paused = true)]
async fn test_resume_after_completion_is_noop() {
    let state = scenario_state(2);
    state.start().unwrap();
    state.wait_until_stopped().await;

    state.resume().unwrap();
    assert!(state.is_stopped());
    assert_eq!(state.current_index(), Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_status_channels_track_playback() {
    let state = scenario_state(2);
    let mut paused = state.subscribe_paused();
    let mut stopped = state.subscribe_stopped();
    let revision = state.subscribe_revision();
    assert!(*paused.borrow_and_update());
    assert!(*stopped.borrow_and_update());

    state.start().unwrap();
    assert!(paused.has_changed().unwrap());
    assert!(!*paused.borrow_and_update());
    assert!(!*stopped.borrow_and_update());

    stopped.wait_for(|s| *s).await.unwrap();
    assert!(*state.subscribe_paused().borrow());
    assert!(revision.has_changed().unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_dropping_last_handle_cancels_playback() {
    let state = scenario_state(5);
    let mut revision = state.subscribe_revision();
    state.start().unwrap();
    tokio::time::sleep(Duration::from_millis(120)).await;
    revision.borrow_and_update();

    drop(state);
    // tasks hold no strong reference, so the channel closes with the state
    assert!(revision.changed().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_widget_teardown_stops_hoisted_state() {
    let state = AnimationState::new();
    let t0 = Instant::now();
    let text = AnimatedText::with_config(
        "teardown",
        PresetKind::Fade,
        config(200, 50),
        Some(state.clone()),
    );
    state.report_layout(&geometry(8)).unwrap();
    text.mount().unwrap();

    at(t0, 320).await;
    assert!(state.current_index().is_some());
    drop(text);

    let after = state.snapshot().unwrap();
    assert!(after.status.stopped);
    assert_eq!(after.current_index, None);
    at(t0, 5_000).await;
    assert_eq!(state.snapshot().unwrap(), after);
}

#[test]
fn test_operations_fail_fast_when_unattached() {
    let state = AnimationState::new();
    assert_eq!(state.visibility(0), Err(AnimationError::NotAttached));
    assert_eq!(state.character_count(), Err(AnimationError::NotAttached));
    assert_eq!(
        state.report_layout(&geometry(1)),
        Err(AnimationError::NotAttached)
    );
    // stop and pause are safe at any time
    state.stop();
    state.pause();
    assert!(state.is_stopped());
}

#[tokio::test]
async fn test_start_requires_attachment() {
    let state = AnimationState::new();
    assert_eq!(state.start(), Err(AnimationError::NotAttached));
}

#[test]
fn test_start_requires_runtime() {
    let state = scenario_state(2);
    assert_eq!(state.start(), Err(AnimationError::NoRuntime));
    assert!(state.is_stopped());
}

#[test]
fn test_attach_is_one_shot() {
    let state = AnimationState::new();
    assert!(state.attach(3, config(200, 50)));
    assert!(!state.attach(7, config(999, 1)));
    assert_eq!(state.character_count().unwrap(), 3);
    assert_eq!(state.config().unwrap().animation_duration_ms, 200);
    assert_eq!(visible(&state), vec![false; 3]);
    assert_eq!(state.transform_origin(2).unwrap(), TransformOrigin::CENTER);
    assert_eq!(state.line_height(2).unwrap(), 0.0);
    assert_eq!(
        state.line_height(3),
        Err(AnimationError::IndexOutOfRange { index: 3, len: 3 })
    );
}

#[test]
fn test_layout_report_is_validated_and_one_shot() {
    let state = AnimationState::new();
    state.attach(2, config(200, 50));
    assert_eq!(
        state.report_layout(&geometry(3)),
        Err(AnimationError::GeometryMismatch {
            expected: 2,
            actual: 3
        })
    );
    assert!(!state.is_layout_ready());

    state.report_layout(&geometry(2)).unwrap();
    assert!(state.is_layout_ready());
    assert_eq!(state.line_height(1).unwrap(), 24.0);

    let other = vec![CharacterGeometry::new(TransformOrigin::new(0.0, 0.0), 99.0); 2];
    state.report_layout(&other).unwrap();
    assert_eq!(state.line_height(1).unwrap(), 24.0);
}
