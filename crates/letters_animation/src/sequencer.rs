//! Staggered reveal loop
//!
//! One stagger task walks the characters in order; each reveal spawns a
//! settle task that advances the watermark once the enter transition has run
//! and then drops the character from the animated path. Settle tasks overlap
//! each other and the stagger loop whenever the stagger is shorter than the
//! enter transition.
//!
//! Settle order equals reveal order only because the enter duration is fixed
//! for a run. The run finishes when the loop has revealed the last character
//! and no settle task is left, which for a fixed duration is the moment the
//! last character settles.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

use crate::latch::LayoutWaiter;
use crate::state::{Core, SettleTaskId, Shared, SETTLE_DELAY};

/// Spawn the stagger loop for `from..` under the current generation
pub(crate) fn launch(shared: &Arc<Shared>, core: &mut Core, handle: &Handle, from: usize) {
    let generation = core.generation;
    let waiter = shared.layout.waiter();
    let weak = Arc::downgrade(shared);
    core.sequence_complete = false;
    core.sequencer = Some(handle.spawn(run(weak, waiter, generation, from)));
}

/// Lock the state and apply `f`, unless the state is gone or the generation
/// has moved on since the task was launched.
fn with_current<R>(
    weak: &Weak<Shared>,
    generation: u64,
    f: impl FnOnce(&Shared, &mut Core) -> R,
) -> Option<R> {
    let shared = weak.upgrade()?;
    let mut core = shared.lock();
    if core.generation != generation {
        return None;
    }
    Some(f(&shared, &mut core))
}

async fn run(weak: Weak<Shared>, layout: LayoutWaiter, generation: u64, from: usize) {
    if !layout.wait().await {
        return;
    }

    let timing = with_current(&weak, generation, |_, core| {
        core.attached().ok().map(|a| {
            (
                a.len(),
                a.config.intermediate_duration(),
                a.config.animation_duration(),
            )
        })
    });
    let Some(Some((count, stagger, duration))) = timing else {
        return;
    };

    for index in from..count {
        sleep(stagger).await;
        let revealed = with_current(&weak, generation, |shared, core| {
            reveal(&weak, core, generation, index, count, duration);
            shared.publish(core);
        });
        if revealed.is_none() {
            return;
        }
    }
}

fn reveal(
    weak: &Weak<Shared>,
    core: &mut Core,
    generation: u64,
    index: usize,
    count: usize,
    duration: Duration,
) {
    let Ok(attached) = core.attached_mut() else {
        return;
    };
    attached.reveal(index, Instant::now());
    trace!(index, "character revealed");

    let weak = weak.clone();
    core.settle_tasks
        .insert_with_key(|key| tokio::spawn(settle(weak, generation, index, key, duration)));

    if index + 1 == count {
        core.sequence_complete = true;
        core.sequencer = None;
    }
}

async fn settle(
    weak: Weak<Shared>,
    generation: u64,
    index: usize,
    key: SettleTaskId,
    duration: Duration,
) {
    sleep(duration).await;
    let advanced = with_current(&weak, generation, |shared, core| {
        core.advance_watermark(index);
        trace!(index, "character settled");
        shared.publish(core);
    });
    if advanced.is_none() {
        return;
    }

    sleep(SETTLE_DELAY).await;
    with_current(&weak, generation, |shared, core| {
        core.settle_tasks.remove(key);
        if let Ok(attached) = core.attached_mut() {
            attached.conceal(index);
        }
        if core.sequence_complete && core.settle_tasks.is_empty() {
            core.finish();
            debug!("animation finished");
        }
        shared.publish(core);
    });
}
