//! Frame composition
//!
//! Each character is painted through one of three paths:
//!
//! - **Hidden**: above the watermark and not revealing, nothing is painted
//! - **Revealing**: visibility is set, the preset animates the enter transition
//! - **Settled**: at or below the watermark, painted in its final style

use std::time::Duration;

use tokio::time::Instant;

use crate::config::TextAnimationConfig;
use crate::error::Result;
use crate::presets::{CharacterContext, CharacterPreset, GlyphVisual};
use crate::state::{AnimationState, PlaybackStatus, StateSnapshot};

/// Which rendering path a character takes this frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharacterPhase {
    Hidden,
    Revealing { elapsed: Duration },
    Settled,
}

/// One character of a composed frame
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedCharacter {
    pub index: usize,
    pub text: String,
    pub phase: CharacterPhase,
    pub visual: GlyphVisual,
}

/// Everything painted for a text at one instant
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub characters: Vec<RenderedCharacter>,
    pub current_index: Option<usize>,
    pub status: PlaybackStatus,
}

impl Frame {
    pub fn settled_count(&self) -> usize {
        self.count(|phase| matches!(phase, CharacterPhase::Settled))
    }

    pub fn revealing_count(&self) -> usize {
        self.count(|phase| matches!(phase, CharacterPhase::Revealing { .. }))
    }

    fn count(&self, pred: impl Fn(&CharacterPhase) -> bool) -> usize {
        self.characters.iter().filter(|c| pred(&c.phase)).count()
    }
}

/// Compose a frame of `characters` from the current state of `state`
pub fn compose_frame(
    state: &AnimationState,
    preset: &dyn CharacterPreset,
    characters: &[String],
    now: Instant,
) -> Result<Frame> {
    let snapshot = state.snapshot()?;
    let config = state.config()?;
    Ok(compose_snapshot(&snapshot, &config, preset, characters, now))
}

/// Compose a frame from an already captured snapshot
pub fn compose_snapshot(
    snapshot: &StateSnapshot,
    config: &TextAnimationConfig,
    preset: &dyn CharacterPreset,
    characters: &[String],
    now: Instant,
) -> Frame {
    let rendered = snapshot
        .visibility
        .iter()
        .enumerate()
        .map(|(index, &visible)| {
            let origin = snapshot.transform_origin[index];
            let phase = phase_of(snapshot, index, visible, now);
            let visual = match phase {
                CharacterPhase::Hidden => GlyphVisual::hidden(origin),
                CharacterPhase::Settled => GlyphVisual::settled(origin),
                CharacterPhase::Revealing { elapsed } => preset.enter(&CharacterContext {
                    index,
                    origin,
                    line_height: snapshot.line_height[index],
                    elapsed,
                    config,
                }),
            };
            RenderedCharacter {
                index,
                text: characters.get(index).cloned().unwrap_or_default(),
                phase,
                visual,
            }
        })
        .collect();

    Frame {
        characters: rendered,
        current_index: snapshot.current_index,
        status: snapshot.status,
    }
}

fn phase_of(snapshot: &StateSnapshot, index: usize, visible: bool, now: Instant) -> CharacterPhase {
    if visible {
        let elapsed = snapshot.revealed_at[index]
            .map(|at| now.saturating_duration_since(at))
            .unwrap_or_default();
        CharacterPhase::Revealing { elapsed }
    } else if snapshot.current_index.is_some_and(|current| index <= current) {
        CharacterPhase::Settled
    } else {
        CharacterPhase::Hidden
    }
}
