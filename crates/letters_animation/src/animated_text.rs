//! Hosting component
//!
//! [`AnimatedText`] plays the role of the widget that owns an animated string:
//! it segments the text, attaches the state, runs the invisible probe pass,
//! starts playback on mount, and composes frames for painting. Dropping it
//! tears playback down.

use tokio::time::Instant;
use tracing::debug;

use crate::config::TextAnimationConfig;
use crate::error::Result;
use crate::frame::{compose_frame, Frame};
use crate::layout::{character_geometry, segment, LayoutProbe};
use crate::presets::{CharacterPreset, PresetKind};
use crate::state::AnimationState;

pub struct AnimatedText {
    text: String,
    characters: Vec<String>,
    preset: Box<dyn CharacterPreset>,
    config: TextAnimationConfig,
    state: AnimationState,
}

impl AnimatedText {
    /// Animated text with its own state and the preset's default configuration
    pub fn new(text: impl Into<String>, kind: PresetKind) -> Self {
        Self::with_config(text, kind, kind.default_config(), None)
    }

    /// Animated text with an explicit configuration and, optionally, a hoisted
    /// state shared with the caller.
    ///
    /// A hoisted state that is already attached keeps its original binding.
    pub fn with_config(
        text: impl Into<String>,
        kind: PresetKind,
        config: TextAnimationConfig,
        state: Option<AnimationState>,
    ) -> Self {
        Self::with_preset(text, kind.build(), config, state)
    }

    pub fn with_preset(
        text: impl Into<String>,
        preset: Box<dyn CharacterPreset>,
        config: TextAnimationConfig,
        state: Option<AnimationState>,
    ) -> Self {
        let text = text.into();
        let characters = segment(&text);
        let config = preset.prepare(config);
        let state = state.unwrap_or_default();
        state.attach(characters.len(), config.clone());
        Self {
            text,
            characters,
            preset,
            config,
            state,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn characters(&self) -> &[String] {
        &self.characters
    }

    pub fn preset(&self) -> &dyn CharacterPreset {
        self.preset.as_ref()
    }

    pub fn config(&self) -> &TextAnimationConfig {
        &self.config
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    /// Probe pass: measure the text transparently and report its geometry.
    ///
    /// Only the first call reaches the state; layout is stable per text.
    pub fn on_layout(&self, probe: &dyn LayoutProbe) -> Result<()> {
        if self.state.is_layout_ready() {
            return Ok(());
        }
        let style = self.config.style.transparent();
        let layout = probe.measure(&self.characters, &style);
        let geometry = character_geometry(&layout, self.preset.origin_anchor());
        self.state.report_layout(&geometry)
    }

    /// First time the text becomes visible
    pub fn mount(&self) -> Result<()> {
        if self.config.animate_on_mount {
            debug!(preset = %self.preset.kind(), "starting on mount");
            self.state.start()?;
        }
        Ok(())
    }

    pub fn frame(&self, now: Instant) -> Result<Frame> {
        compose_frame(&self.state, self.preset.as_ref(), &self.characters, now)
    }
}

impl Drop for AnimatedText {
    fn drop(&mut self) {
        self.state.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{GlyphBox, TextLayoutSnapshot};
    use crate::TextStyle;
    use std::sync::Mutex;

    /// Fixed-advance probe that records the style it was asked to measure with
    struct RecordingProbe {
        seen: Mutex<Vec<TextStyle>>,
    }

    impl LayoutProbe for RecordingProbe {
        fn measure(&self, characters: &[String], style: &TextStyle) -> TextLayoutSnapshot {
            self.seen.lock().unwrap().push(style.clone());
            TextLayoutSnapshot {
                width: 10.0 * characters.len() as f32,
                height: 20.0,
                line_heights: vec![20.0],
                glyphs: (0..characters.len())
                    .map(|i| GlyphBox {
                        left: 10.0 * i as f32,
                        width: 10.0,
                        line: 0,
                    })
                    .collect(),
            }
        }
    }

    #[test]
    fn test_probe_pass_is_transparent_and_one_shot() {
        let text = AnimatedText::new("hey", PresetKind::Fade);
        let probe = RecordingProbe {
            seen: Mutex::new(Vec::new()),
        };
        text.on_layout(&probe).unwrap();
        text.on_layout(&probe).unwrap();

        let seen = probe.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].is_transparent());
        assert!(text.state().is_layout_ready());
        assert_eq!(text.state().line_height(2).unwrap(), 20.0);
    }

    #[test]
    fn test_hoisted_state_keeps_first_binding() {
        let state = AnimationState::new();
        let first = AnimatedText::with_config(
            "abc",
            PresetKind::ScaleIn,
            TextAnimationConfig::default(),
            Some(state.clone()),
        );
        let second = AnimatedText::with_config(
            "abcdef",
            PresetKind::ScaleIn,
            TextAnimationConfig::default(),
            Some(state.clone()),
        );
        assert_eq!(first.characters().len(), 3);
        assert_eq!(second.characters().len(), 6);
        assert_eq!(state.character_count().unwrap(), 3);
    }

    #[test]
    fn test_jump_config_is_normalized() {
        let text = AnimatedText::with_config(
            "up",
            PresetKind::Jump,
            TextAnimationConfig::default(),
            None,
        );
        assert_eq!(text.config().animation_duration_ms, 2000);
        assert_eq!(text.state().config().unwrap().animation_duration_ms, 2000);
    }

    #[test]
    fn test_mount_without_autoplay_stays_idle() {
        let config = PresetKind::Fade.default_config().with_animate_on_mount(false);
        let text = AnimatedText::with_config("idle", PresetKind::Fade, config, None);
        // No runtime is needed when nothing is started
        text.mount().unwrap();
        assert!(text.state().is_stopped());
    }
}
