//! Scripted playback of one animated text

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use letters_animation::{
    AnimatedText, Frame, LayoutProbe, PresetKind, TextAnimationConfig, SETTLE_DELAY,
};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::render::render_frame;

/// Control calls issued at fixed offsets from the start of playback
#[derive(Clone, Copy, Debug, Default)]
pub struct Script {
    /// Time between showing the text and mounting it
    pub start_delay: Duration,
    pub pause_at: Option<Duration>,
    /// Measured from the pause
    pub resume_after: Option<Duration>,
    pub stop_at: Option<Duration>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    Mount,
    Pause,
    Resume,
    Stop,
}

impl Script {
    fn timeline(&self) -> Vec<(Duration, Action)> {
        let mut events = vec![(self.start_delay, Action::Mount)];
        if let Some(at) = self.pause_at {
            events.push((at, Action::Pause));
            if let Some(after) = self.resume_after {
                events.push((at.saturating_add(after), Action::Resume));
            }
        }
        if let Some(at) = self.stop_at {
            events.push((at, Action::Stop));
        }
        // Stable, so same-time events keep the order above
        events.sort_by_key(|(at, _)| *at);
        events
    }

    /// Latest time playback can still change on its own
    fn horizon(&self, count: usize, config: &TextAnimationConfig) -> Duration {
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        let held = self.resume_after.unwrap_or_default();
        [
            config.animation_duration(),
            SETTLE_DELAY,
            held,
            Duration::from_secs(1),
        ]
        .into_iter()
        .fold(
            self.start_delay
                .saturating_add(config.intermediate_duration().saturating_mul(count)),
            Duration::saturating_add,
        )
    }
}

/// Upper bound on the tick rate; keeps the tick period at one millisecond or more
pub const MAX_FPS: u32 = 1000;

/// Frame rate and output target for a playback
pub struct Player<'a, W: Write> {
    probe: &'a dyn LayoutProbe,
    fps: u32,
    out: W,
}

impl<'a, W: Write> Player<'a, W> {
    pub fn new(probe: &'a dyn LayoutProbe, fps: u32, out: W) -> Self {
        Self {
            probe,
            fps: fps.clamp(1, MAX_FPS),
            out,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Play `text` with a preset, printing every frame that differs from the
    /// previous one. Returns the last composed frame.
    pub async fn play(
        &mut self,
        text: &str,
        kind: PresetKind,
        config: TextAnimationConfig,
        script: Script,
    ) -> Result<Frame> {
        let line_height = config.style.resolved_line_height();
        let animated = AnimatedText::with_config(text, kind, config, None);
        animated
            .on_layout(self.probe)
            .context("Failed to report text layout")?;

        let count = animated.characters().len();
        let horizon = script.horizon(count, animated.config());
        let mut pending = script.timeline().into_iter().peekable();
        let mut mounted = false;

        info!(preset = %kind, characters = count, "playing");

        let origin = Instant::now();
        let mut ticker = interval(Duration::from_secs(1) / self.fps);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last = String::new();

        loop {
            let now = ticker.tick().await;
            let elapsed = now.saturating_duration_since(origin);

            while let Some((_, action)) = pending.next_if(|(at, _)| *at <= elapsed) {
                debug!(?action, elapsed_ms = elapsed.as_millis() as u64, "script");
                let state = animated.state();
                match action {
                    Action::Mount => {
                        animated.mount()?;
                        mounted = true;
                    }
                    Action::Pause => state.pause(),
                    Action::Resume => state.resume()?,
                    Action::Stop => state.stop(),
                }
            }

            let frame = animated.frame(now)?;
            let rendered = render_frame(&frame, line_height, elapsed);
            let body = rendered.split_once(']').map_or("", |(_, rest)| rest);
            if body != last {
                self.out.write_all(rendered.as_bytes())?;
                last = body.to_string();
            }

            let status = frame.status;
            let idle = status.stopped || status.paused;
            if mounted && idle && pending.peek().is_none() {
                return Ok(frame);
            }
            if elapsed > horizon {
                debug!("playback horizon reached");
                return Ok(frame);
            }
        }
    }
}
