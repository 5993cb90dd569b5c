//! Moving letters
//!
//! Staggered per-character reveal animations for plain text.
//!
//! # Features
//!
//! - **AnimationState**: observable controller with start/stop/pause/resume
//! - **Sequencer**: reveals characters in order with a fixed stagger, settles
//!   each one after its enter transition
//! - **Layout probe contract**: per-character transform origins and line
//!   heights from a host's text measurement
//! - **Presets**: fade, scale-in, scale-out, jump and rotate
//!
//! # Example
//!
//! ```no_run
//! use letters_animation::{AnimatedText, PresetKind};
//! # async fn run(probe: &dyn letters_animation::LayoutProbe) -> letters_animation::Result<()> {
//! let text = AnimatedText::new("Hello", PresetKind::ScaleIn);
//! text.on_layout(probe)?;
//! text.mount()?;
//! text.state().wait_until_stopped().await;
//! # Ok(())
//! # }
//! ```

pub mod animated_text;
pub mod config;
pub mod easing;
pub mod error;
pub mod frame;
pub mod latch;
pub mod layout;
pub mod presets;
mod sequencer;
pub mod spring;
pub mod state;

pub use animated_text::AnimatedText;
pub use config::{TextAnimationConfig, TextStyle};
pub use easing::Easing;
pub use error::{AnimationError, Result};
pub use frame::{compose_frame, CharacterPhase, Frame, RenderedCharacter};
pub use latch::{LayoutLatch, LayoutWaiter};
pub use layout::{
    character_geometry, segment, CharacterGeometry, GlyphBox, LayoutProbe, OriginAnchor,
    TextLayoutSnapshot, TransformOrigin,
};
pub use presets::{
    CharacterContext, CharacterPreset, Fade, GlyphVisual, Jump, PresetKind, Rotate, ScaleIn,
    ScaleOut,
};
pub use spring::{Spring, SpringConfig, SpringParams};
pub use state::{AnimationState, PlaybackStatus, StateSnapshot, SETTLE_DELAY};
