//! Animated text state
//!
//! [`AnimationState`] is the observable controller a host widget drives. It
//! owns the per-character arrays (visibility, transform origin, line height),
//! the watermark of fully settled characters, and the playback controls.
//!
//! # Status flags
//!
//! `paused` and `stopped` are independent flags, published through watch
//! channels for status displays:
//!
//! | situation | paused | stopped |
//! |---|---|---|
//! | idle, never started | true | true |
//! | playing | false | false |
//! | paused mid-run | true | false |
//! | finished or stopped | true | true |
//!
//! # Cancellation
//!
//! Every task the state schedules (the stagger loop and one settle task per
//! revealing character) is tagged with the generation it was launched in.
//! `pause`, `stop` and teardown bump the generation under the same lock the
//! tasks mutate through, so a task that wakes after cancellation finds a stale
//! generation and leaves the state untouched.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use slotmap::{new_key_type, SlotMap};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::TextAnimationConfig;
use crate::error::{AnimationError, Result};
use crate::latch::LayoutLatch;
use crate::layout::{CharacterGeometry, TransformOrigin};
use crate::sequencer;

/// Pause between a character finishing its enter transition and leaving the
/// animated path, so the settled glyph is painted before the animated one goes.
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

new_key_type! {
    /// Handle to an outstanding settle task
    pub(crate) struct SettleTaskId;
}

/// Snapshot of the four observable flags
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackStatus {
    pub playing: bool,
    pub paused: bool,
    pub ongoing: bool,
    pub stopped: bool,
}

impl PlaybackStatus {
    fn new(paused: bool, stopped: bool) -> Self {
        Self {
            playing: !paused,
            paused,
            ongoing: !stopped,
            stopped,
        }
    }

    /// Rows of the status table, in display order
    pub fn rows(&self) -> [(&'static str, bool); 4] {
        [
            ("PLAYING", self.playing),
            ("ONGOING", self.ongoing),
            ("PAUSED", self.paused),
            ("STOPPED", self.stopped),
        ]
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in self.rows() {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{}={}", name, if value { "TRUE" } else { "FALSE" })?;
        }
        Ok(())
    }
}

/// Per-character arrays and configuration of an attached state
pub(crate) struct Attached {
    pub(crate) visibility: Vec<bool>,
    /// When each currently revealing character started its enter transition
    pub(crate) revealed_at: Vec<Option<Instant>>,
    pub(crate) transform_origin: Vec<TransformOrigin>,
    pub(crate) line_height: Vec<f32>,
    pub(crate) config: TextAnimationConfig,
}

impl Attached {
    fn new(character_count: usize, config: TextAnimationConfig) -> Self {
        Self {
            visibility: vec![false; character_count],
            revealed_at: vec![None; character_count],
            transform_origin: vec![TransformOrigin::CENTER; character_count],
            line_height: vec![0.0; character_count],
            config,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.visibility.len()
    }

    /// Start the enter transition of `index`. A character that is already
    /// visible keeps its original start time.
    pub(crate) fn reveal(&mut self, index: usize, at: Instant) {
        if !self.visibility[index] {
            self.revealed_at[index] = Some(at);
        }
        self.visibility[index] = true;
    }

    pub(crate) fn conceal(&mut self, index: usize) {
        self.visibility[index] = false;
        self.revealed_at[index] = None;
    }

    fn conceal_all(&mut self) {
        self.visibility.iter_mut().for_each(|v| *v = false);
        self.revealed_at.iter_mut().for_each(|t| *t = None);
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.len() {
            Ok(())
        } else {
            Err(AnimationError::IndexOutOfRange {
                index,
                len: self.len(),
            })
        }
    }
}

pub(crate) enum Binding {
    Unattached,
    Attached(Attached),
}

/// Mutable state guarded by the controller lock
pub(crate) struct Core {
    pub(crate) binding: Binding,
    pub(crate) current_index: Option<usize>,
    pub(crate) paused: bool,
    pub(crate) stopped: bool,
    /// Bumped on every cancellation; tasks from older generations are inert
    pub(crate) generation: u64,
    /// The stagger loop has revealed the last character of this run
    pub(crate) sequence_complete: bool,
    pub(crate) sequencer: Option<JoinHandle<()>>,
    pub(crate) settle_tasks: SlotMap<SettleTaskId, JoinHandle<()>>,
}

impl Core {
    fn new() -> Self {
        Self {
            binding: Binding::Unattached,
            current_index: None,
            paused: true,
            stopped: true,
            generation: 0,
            sequence_complete: false,
            sequencer: None,
            settle_tasks: SlotMap::with_key(),
        }
    }

    pub(crate) fn attached(&self) -> Result<&Attached> {
        match &self.binding {
            Binding::Attached(attached) => Ok(attached),
            Binding::Unattached => Err(AnimationError::NotAttached),
        }
    }

    pub(crate) fn attached_mut(&mut self) -> Result<&mut Attached> {
        match &mut self.binding {
            Binding::Attached(attached) => Ok(attached),
            Binding::Unattached => Err(AnimationError::NotAttached),
        }
    }

    /// Abort every outstanding task and invalidate any that already woke up
    fn cancel_tasks(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.sequence_complete = false;
        if let Some(sequencer) = self.sequencer.take() {
            sequencer.abort();
        }
        for (_, task) in self.settle_tasks.drain() {
            task.abort();
        }
    }

    /// The watermark moves forward only
    pub(crate) fn advance_watermark(&mut self, index: usize) {
        self.current_index = Some(self.current_index.map_or(index, |c| c.max(index)));
    }

    /// Natural end of a run
    pub(crate) fn finish(&mut self) {
        self.cancel_tasks();
        self.paused = true;
        self.stopped = true;
    }
}

pub(crate) struct Shared {
    core: Mutex<Core>,
    pub(crate) layout: LayoutLatch,
    paused: watch::Sender<bool>,
    stopped: watch::Sender<bool>,
    revision: watch::Sender<u64>,
}

impl Shared {
    pub(crate) fn lock(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mirror the flags into the watch channels and bump the revision
    pub(crate) fn publish(&self, core: &Core) {
        let paused = core.paused;
        let stopped = core.stopped;
        self.paused.send_if_modified(|v| replace_if_changed(v, paused));
        self.stopped.send_if_modified(|v| replace_if_changed(v, stopped));
        self.revision.send_modify(|r| *r = r.wrapping_add(1));
    }
}

fn replace_if_changed(slot: &mut bool, value: bool) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let core = self.core.get_mut().unwrap_or_else(PoisonError::into_inner);
        core.cancel_tasks();
    }
}

/// Everything a renderer needs for one frame, read under a single lock
#[derive(Clone, Debug, PartialEq)]
pub struct StateSnapshot {
    pub visibility: Vec<bool>,
    pub revealed_at: Vec<Option<Instant>>,
    pub transform_origin: Vec<TransformOrigin>,
    pub line_height: Vec<f32>,
    pub current_index: Option<usize>,
    pub status: PlaybackStatus,
    pub layout_ready: bool,
}

/// Observable controller for one animated text.
///
/// Cloning yields another handle to the same state, so a host can hoist it
/// out of the widget that renders it. Playback tasks hold only weak
/// references: once the last handle is dropped, every outstanding task is
/// cancelled.
#[derive(Clone)]
pub struct AnimationState {
    shared: Arc<Shared>,
}

impl AnimationState {
    pub fn new() -> Self {
        let (paused, _) = watch::channel(true);
        let (stopped, _) = watch::channel(true);
        let (revision, _) = watch::channel(0);
        Self {
            shared: Arc::new(Shared {
                core: Mutex::new(Core::new()),
                layout: LayoutLatch::new(),
                paused,
                stopped,
                revision,
            }),
        }
    }

    // ========================================================================
    // Binding
    // ========================================================================

    /// Bind per-character arrays and capture configuration.
    ///
    /// One-shot: returns `false` and changes nothing if already attached.
    pub fn attach(&self, character_count: usize, config: TextAnimationConfig) -> bool {
        let mut core = self.shared.lock();
        if let Binding::Attached(existing) = &core.binding {
            if existing.len() != character_count {
                warn!(
                    attached = existing.len(),
                    requested = character_count,
                    "animation state already attached to a different text; ignoring"
                );
            }
            return false;
        }
        core.binding = Binding::Attached(Attached::new(character_count, config));
        debug!(characters = character_count, "animation state attached");
        self.shared.publish(&core);
        true
    }

    pub fn is_attached(&self) -> bool {
        matches!(self.shared.lock().binding, Binding::Attached(_))
    }

    /// Deliver the probe's per-character geometry and open the layout latch.
    ///
    /// Layout is assumed stable for the bound text: later reports are ignored.
    pub fn report_layout(&self, geometry: &[CharacterGeometry]) -> Result<()> {
        let mut core = self.shared.lock();
        if self.shared.layout.is_signaled() {
            warn!("layout already reported; ignoring repeated probe");
            return Ok(());
        }
        let attached = core.attached_mut()?;
        if geometry.len() != attached.len() {
            return Err(AnimationError::GeometryMismatch {
                expected: attached.len(),
                actual: geometry.len(),
            });
        }
        for (i, g) in geometry.iter().enumerate() {
            attached.transform_origin[i] = g.origin;
            attached.line_height[i] = g.line_height;
        }
        self.shared.layout.signal();
        debug!(characters = geometry.len(), "layout reported");
        self.shared.publish(&core);
        Ok(())
    }

    pub fn is_layout_ready(&self) -> bool {
        self.shared.layout.is_signaled()
    }

    /// Resolves once the layout probe has reported
    pub async fn wait_for_layout(&self) {
        self.shared.layout.waiter().wait().await;
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Restart from scratch: reset everything, then reveal characters in order
    /// once layout is ready.
    pub fn start(&self) -> Result<()> {
        let handle = runtime()?;
        let mut core = self.shared.lock();
        let count = core.attached()?.len();

        self.reset(&mut core);
        if count == 0 {
            debug!("nothing to animate");
            self.shared.publish(&core);
            return Ok(());
        }

        core.paused = false;
        core.stopped = false;
        sequencer::launch(&self.shared, &mut core, &handle, 0);
        debug!(characters = count, "animation started");
        self.shared.publish(&core);
        Ok(())
    }

    /// Cancel everything and return to the idle state
    pub fn stop(&self) {
        let mut core = self.shared.lock();
        self.reset(&mut core);
        debug!("animation stopped");
        self.shared.publish(&core);
    }

    /// Freeze the run where it is. No-op when already paused.
    pub fn pause(&self) {
        let mut core = self.shared.lock();
        if core.paused {
            return;
        }
        core.cancel_tasks();
        core.paused = true;
        debug!(current = ?core.current_index, "animation paused");
        self.shared.publish(&core);
    }

    /// Continue a paused run with the character after the watermark.
    ///
    /// No-op unless the run is paused and not stopped.
    pub fn resume(&self) -> Result<()> {
        let mut core = self.shared.lock();
        if !core.paused || core.stopped {
            return Ok(());
        }
        let handle = runtime()?;
        let from = core.current_index.map_or(0, |c| c + 1);

        // Characters at or below the watermark already settled; their settle
        // tasks were cancelled before they could leave the animated path.
        if let Some(current) = core.current_index {
            let attached = core.attached_mut()?;
            for index in 0..=current.min(attached.len().saturating_sub(1)) {
                attached.conceal(index);
            }
        }

        let count = core.attached()?.len();
        if from >= count {
            core.finish();
            debug!("resumed with every character settled");
        } else {
            core.paused = false;
            sequencer::launch(&self.shared, &mut core, &handle, from);
            debug!(from, "animation resumed");
        }
        self.shared.publish(&core);
        Ok(())
    }

    fn reset(&self, core: &mut Core) {
        core.cancel_tasks();
        core.paused = true;
        core.current_index = None;
        if let Ok(attached) = core.attached_mut() {
            attached.conceal_all();
        }
        core.stopped = true;
    }

    // ========================================================================
    // Observation
    // ========================================================================

    pub fn status(&self) -> PlaybackStatus {
        let core = self.shared.lock();
        PlaybackStatus::new(core.paused, core.stopped)
    }

    pub fn is_playing(&self) -> bool {
        !self.shared.lock().paused
    }

    pub fn is_paused(&self) -> bool {
        self.shared.lock().paused
    }

    pub fn is_ongoing(&self) -> bool {
        !self.shared.lock().stopped
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.lock().stopped
    }

    /// Highest fully settled character, `None` before the first settle
    pub fn current_index(&self) -> Option<usize> {
        self.shared.lock().current_index
    }

    pub fn character_count(&self) -> Result<usize> {
        Ok(self.shared.lock().attached()?.len())
    }

    pub fn visibility(&self, index: usize) -> Result<bool> {
        let core = self.shared.lock();
        let attached = core.attached()?;
        attached.check_index(index)?;
        Ok(attached.visibility[index])
    }

    pub fn visibilities(&self) -> Result<Vec<bool>> {
        Ok(self.shared.lock().attached()?.visibility.clone())
    }

    pub fn transform_origin(&self, index: usize) -> Result<TransformOrigin> {
        let core = self.shared.lock();
        let attached = core.attached()?;
        attached.check_index(index)?;
        Ok(attached.transform_origin[index])
    }

    pub fn line_height(&self, index: usize) -> Result<f32> {
        let core = self.shared.lock();
        let attached = core.attached()?;
        attached.check_index(index)?;
        Ok(attached.line_height[index])
    }

    pub fn config(&self) -> Result<TextAnimationConfig> {
        Ok(self.shared.lock().attached()?.config.clone())
    }

    pub fn snapshot(&self) -> Result<StateSnapshot> {
        let core = self.shared.lock();
        let attached = core.attached()?;
        Ok(StateSnapshot {
            visibility: attached.visibility.clone(),
            revealed_at: attached.revealed_at.clone(),
            transform_origin: attached.transform_origin.clone(),
            line_height: attached.line_height.clone(),
            current_index: core.current_index,
            status: PlaybackStatus::new(core.paused, core.stopped),
            layout_ready: self.shared.layout.is_signaled(),
        })
    }

    pub fn subscribe_paused(&self) -> watch::Receiver<bool> {
        self.shared.paused.subscribe()
    }

    pub fn subscribe_stopped(&self) -> watch::Receiver<bool> {
        self.shared.stopped.subscribe()
    }

    /// Changes on every observable mutation; renderers repaint on change
    pub fn subscribe_revision(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    /// Resolves once the state is stopped, by completion or by `stop()`
    pub async fn wait_until_stopped(&self) {
        let mut rx = self.subscribe_stopped();
        let _ = rx.wait_for(|stopped| *stopped).await;
    }

    #[cfg(test)]
    pub(crate) fn pending_tasks(&self) -> usize {
        let core = self.shared.lock();
        core.settle_tasks.len() + usize::from(core.sequencer.is_some())
    }
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AnimationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.shared.lock();
        let count = core.attached().map(Attached::len).ok();
        f.debug_struct("AnimationState")
            .field("characters", &count)
            .field("current_index", &core.current_index)
            .field("paused", &core.paused)
            .field("stopped", &core.stopped)
            .field("layout_ready", &self.shared.layout.is_signaled())
            .finish()
    }
}

fn runtime() -> Result<Handle> {
    Handle::try_current().map_err(|_| AnimationError::NoRuntime)
}
