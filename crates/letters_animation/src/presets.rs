//! Per-character animation presets
//!
//! A preset decides how one revealing character looks at a given point of
//! its enter transition. Presets only read state; sequencing belongs to
//! [`AnimationState`](crate::AnimationState).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::config::TextAnimationConfig;
use crate::easing::Easing;
use crate::error::AnimationError;
use crate::layout::{OriginAnchor, TransformOrigin};
use crate::spring::{Spring, SpringParams};

/// Resolved transform of one glyph for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphVisual {
    pub opacity: f32,
    /// Uniform scale around `origin`
    pub scale: f32,
    /// Vertical offset in layout units, positive is down
    pub translate_y: f32,
    /// Clockwise rotation in degrees around `origin`
    pub rotation: f32,
    pub origin: TransformOrigin,
    /// Clip the glyph to the text bounds
    pub clip: bool,
}

impl GlyphVisual {
    /// Final, untransformed glyph
    pub fn settled(origin: TransformOrigin) -> Self {
        Self {
            opacity: 1.0,
            scale: 1.0,
            translate_y: 0.0,
            rotation: 0.0,
            origin,
            clip: false,
        }
    }

    /// Glyph that must not be painted
    pub fn hidden(origin: TransformOrigin) -> Self {
        Self {
            opacity: 0.0,
            ..Self::settled(origin)
        }
    }
}

/// Inputs a preset sees for one revealing character
#[derive(Clone, Copy, Debug)]
pub struct CharacterContext<'a> {
    pub index: usize,
    pub origin: TransformOrigin,
    pub line_height: f32,
    /// Time since the character's reveal started
    pub elapsed: Duration,
    pub config: &'a TextAnimationConfig,
}

impl CharacterContext<'_> {
    /// Eased progress of the enter transition
    pub fn progress(&self) -> f32 {
        self.config
            .easing
            .sample(self.elapsed, self.config.animation_duration())
    }
}

/// Rendering strategy shared by every preset
pub trait CharacterPreset: Send + Sync {
    fn kind(&self) -> PresetKind;

    /// Anchor the layout probe should compute transform origins for
    fn origin_anchor(&self) -> OriginAnchor {
        OriginAnchor::Center
    }

    fn default_config(&self) -> TextAnimationConfig {
        TextAnimationConfig::default()
    }

    /// Adjust a caller's configuration before it is attached
    fn prepare(&self, config: TextAnimationConfig) -> TextAnimationConfig {
        config
    }

    /// Visual of a character in the middle of its enter transition
    fn enter(&self, ctx: &CharacterContext<'_>) -> GlyphVisual;
}

// ============================================================================
// Fade
// ============================================================================

/// Opacity follows the easing curve
#[derive(Clone, Copy, Debug, Default)]
pub struct Fade;

impl CharacterPreset for Fade {
    fn kind(&self) -> PresetKind {
        PresetKind::Fade
    }

    fn enter(&self, ctx: &CharacterContext<'_>) -> GlyphVisual {
        GlyphVisual {
            opacity: ctx.progress(),
            ..GlyphVisual::settled(ctx.origin)
        }
    }
}

// ============================================================================
// Scale
// ============================================================================

/// Grows from nothing around the glyph center while fading in
#[derive(Clone, Copy, Debug, Default)]
pub struct ScaleIn;

impl CharacterPreset for ScaleIn {
    fn kind(&self) -> PresetKind {
        PresetKind::ScaleIn
    }

    fn enter(&self, ctx: &CharacterContext<'_>) -> GlyphVisual {
        let p = ctx.progress();
        GlyphVisual {
            opacity: p,
            scale: p,
            ..GlyphVisual::settled(ctx.origin)
        }
    }
}

/// Initial scale of the scale-out preset
const SCALE_OUT_FROM: f32 = 2.0;

/// Shrinks from twice its size into place while fading in
#[derive(Clone, Copy, Debug, Default)]
pub struct ScaleOut;

impl CharacterPreset for ScaleOut {
    fn kind(&self) -> PresetKind {
        PresetKind::ScaleOut
    }

    fn enter(&self, ctx: &CharacterContext<'_>) -> GlyphVisual {
        let p = ctx.progress();
        GlyphVisual {
            opacity: p,
            scale: SCALE_OUT_FROM + (1.0 - SCALE_OUT_FROM) * p,
            ..GlyphVisual::settled(ctx.origin)
        }
    }
}

// ============================================================================
// Jump
// ============================================================================

/// The jump preset always springs for this long
const JUMP_DURATION: Duration = Duration::from_millis(2000);
const JUMP_STAGGER: Duration = Duration::from_millis(80);

/// Slides up from half a line below, on a spring, clipped to the text box
#[derive(Clone, Copy, Debug, Default)]
pub struct Jump;

impl CharacterPreset for Jump {
    fn kind(&self) -> PresetKind {
        PresetKind::Jump
    }

    fn default_config(&self) -> TextAnimationConfig {
        TextAnimationConfig::default()
            .with_animation_duration(JUMP_DURATION)
            .with_intermediate_duration(JUMP_STAGGER)
            .with_spring(SpringParams::default())
    }

    fn prepare(&self, config: TextAnimationConfig) -> TextAnimationConfig {
        let spring = config.spring.unwrap_or_default();
        config
            .with_animation_duration(JUMP_DURATION)
            .with_spring(spring)
    }

    fn enter(&self, ctx: &CharacterContext<'_>) -> GlyphVisual {
        let spring = ctx.config.spring.unwrap_or_default().config();
        let from = 0.5 * ctx.line_height;
        GlyphVisual {
            translate_y: Spring::sample(spring, from, 0.0, ctx.elapsed),
            clip: true,
            ..GlyphVisual::settled(ctx.origin)
        }
    }
}

// ============================================================================
// Rotate
// ============================================================================

const ROTATE_FROM_DEGREES: f32 = 45.0;

/// Tips upright from 45 degrees around the bottom-left of its line
#[derive(Clone, Copy, Debug, Default)]
pub struct Rotate;

impl CharacterPreset for Rotate {
    fn kind(&self) -> PresetKind {
        PresetKind::Rotate
    }

    fn origin_anchor(&self) -> OriginAnchor {
        OriginAnchor::LineBottomStart
    }

    fn default_config(&self) -> TextAnimationConfig {
        TextAnimationConfig::default()
            .with_easing(Easing::EaseOut)
            .with_animation_duration(Duration::from_millis(300))
    }

    fn enter(&self, ctx: &CharacterContext<'_>) -> GlyphVisual {
        let p = ctx.progress();
        GlyphVisual {
            opacity: p,
            rotation: ROTATE_FROM_DEGREES * (1.0 - p),
            ..GlyphVisual::settled(ctx.origin)
        }
    }
}

// ============================================================================
// Kinds
// ============================================================================

/// The built-in presets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PresetKind {
    Fade,
    ScaleIn,
    ScaleOut,
    Jump,
    Rotate,
}

impl PresetKind {
    pub const ALL: [PresetKind; 5] = [
        PresetKind::ScaleIn,
        PresetKind::ScaleOut,
        PresetKind::Fade,
        PresetKind::Jump,
        PresetKind::Rotate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PresetKind::Fade => "fade",
            PresetKind::ScaleIn => "scale-in",
            PresetKind::ScaleOut => "scale-out",
            PresetKind::Jump => "jump",
            PresetKind::Rotate => "rotate",
        }
    }

    pub fn build(&self) -> Box<dyn CharacterPreset> {
        match self {
            PresetKind::Fade => Box::new(Fade),
            PresetKind::ScaleIn => Box::new(ScaleIn),
            PresetKind::ScaleOut => Box::new(ScaleOut),
            PresetKind::Jump => Box::new(Jump),
            PresetKind::Rotate => Box::new(Rotate),
        }
    }

    pub fn default_config(&self) -> TextAnimationConfig {
        self.build().default_config()
    }
}

impl fmt::Display for PresetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PresetKind {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        PresetKind::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| AnimationError::UnknownPreset(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(config: &TextAnimationConfig, elapsed_ms: u64) -> CharacterContext<'_> {
        CharacterContext {
            index: 0,
            origin: TransformOrigin::new(0.25, 0.5),
            line_height: 40.0,
            elapsed: Duration::from_millis(elapsed_ms),
            config,
        }
    }

    #[test]
    fn test_fade_follows_easing() {
        let config = TextAnimationConfig::default().with_easing(Easing::Linear);
        assert_eq!(Fade.enter(&ctx(&config, 0)).opacity, 0.0);
        assert!((Fade.enter(&ctx(&config, 100)).opacity - 0.5).abs() < 1e-6);
        assert_eq!(Fade.enter(&ctx(&config, 400)).opacity, 1.0);
    }

    #[test]
    fn test_scale_presets_converge_to_identity() {
        let config = ScaleIn.default_config();
        let start = ScaleIn.enter(&ctx(&config, 0));
        assert_eq!(start.scale, 0.0);
        assert_eq!(start.origin, TransformOrigin::new(0.25, 0.5));
        assert_eq!(ScaleIn.enter(&ctx(&config, 200)).scale, 1.0);

        let start = ScaleOut.enter(&ctx(&config, 0));
        assert_eq!(start.scale, SCALE_OUT_FROM);
        assert_eq!(start.opacity, 0.0);
        let end = ScaleOut.enter(&ctx(&config, 200));
        assert_eq!(end.scale, 1.0);
        assert_eq!(end.opacity, 1.0);
    }

    #[test]
    fn test_jump_springs_from_half_a_line() {
        let config = Jump.prepare(TextAnimationConfig::default());
        assert_eq!(config.animation_duration(), JUMP_DURATION);
        assert!(config.spring.is_some());

        let start = Jump.enter(&ctx(&config, 0));
        assert_eq!(start.translate_y, 20.0);
        assert_eq!(start.opacity, 1.0);
        assert!(start.clip);

        let end = Jump.enter(&ctx(&config, 2000));
        assert_eq!(end.translate_y, 0.0);
    }

    #[test]
    fn test_jump_keeps_caller_spring() {
        let custom = SpringParams::new(0.2, 1500.0);
        let config = Jump.prepare(TextAnimationConfig::default().with_spring(custom));
        assert_eq!(config.spring, Some(custom));
    }

    #[test]
    fn test_rotate_uses_line_bottom_anchor() {
        assert_eq!(Rotate.origin_anchor(), OriginAnchor::LineBottomStart);
        let config = Rotate.default_config();
        assert_eq!(config.easing, Easing::EaseOut);
        assert_eq!(Rotate.enter(&ctx(&config, 0)).rotation, ROTATE_FROM_DEGREES);
        assert_eq!(Rotate.enter(&ctx(&config, 300)).rotation, 0.0);
    }

    #[test]
    fn test_preset_defaults() {
        let fade = PresetKind::Fade.default_config();
        assert_eq!(fade.easing, Easing::EaseInOut);
        assert_eq!(fade.animation_duration_ms, 200);
        assert_eq!(fade.intermediate_duration_ms, 50);

        let jump = PresetKind::Jump.default_config();
        assert_eq!(jump.intermediate_duration_ms, 80);
        assert_eq!(jump.animation_duration_ms, 2000);
    }

    #[test]
    fn test_kind_parsing() {
        for kind in PresetKind::ALL {
            assert_eq!(kind.name().parse::<PresetKind>(), Ok(kind));
            assert_eq!(kind.build().kind(), kind);
        }
        assert_eq!("Scale_In".parse::<PresetKind>(), Ok(PresetKind::ScaleIn));
        assert_eq!(
            "wobble".parse::<PresetKind>(),
            Err(AnimationError::UnknownPreset("wobble".to_string()))
        );
    }
}
