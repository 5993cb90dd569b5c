//! Animated text configuration
//!
//! Captured by [`AnimationState::attach`](crate::AnimationState::attach) and
//! immutable for the lifetime of that attachment.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::spring::SpringParams;

/// Visual style of the animated glyphs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// Absolute line height; `font_size * 1.2` when unset
    #[serde(default)]
    pub line_height: Option<f32>,
    #[serde(default)]
    pub letter_spacing: f32,
    /// RGBA, 8 bits per channel
    #[serde(default = "default_color")]
    pub color: [u8; 4],
}

fn default_font_size() -> f32 {
    16.0
}

fn default_color() -> [u8; 4] {
    [0xFF, 0xFF, 0xFF, 0xFF]
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: default_font_size(),
            line_height: None,
            letter_spacing: 0.0,
            color: default_color(),
        }
    }
}

impl TextStyle {
    pub fn resolved_line_height(&self) -> f32 {
        self.line_height.unwrap_or(self.font_size * 1.2)
    }

    /// Same style with a fully transparent color, used for the probe pass
    pub fn transparent(&self) -> Self {
        let [r, g, b, _] = self.color;
        Self {
            color: [r, g, b, 0],
            ..self.clone()
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.color[3] == 0
    }
}

/// Sequencing and rendering configuration for one animated text
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextAnimationConfig {
    #[serde(default)]
    pub style: TextStyle,
    #[serde(default)]
    pub easing: Easing,
    /// Time for one character's enter transition
    #[serde(default = "default_animation_ms")]
    pub animation_duration_ms: u64,
    /// Stagger between successive characters' reveal start
    #[serde(default = "default_intermediate_ms")]
    pub intermediate_duration_ms: u64,
    /// Start playback as soon as the host mounts the text
    #[serde(default = "default_true")]
    pub animate_on_mount: bool,
    /// Spring curve, only read by the jump preset
    #[serde(default)]
    pub spring: Option<SpringParams>,
}

fn default_animation_ms() -> u64 {
    200
}

fn default_intermediate_ms() -> u64 {
    50
}

fn default_true() -> bool {
    true
}

impl Default for TextAnimationConfig {
    fn default() -> Self {
        Self {
            style: TextStyle::default(),
            easing: Easing::default(),
            animation_duration_ms: default_animation_ms(),
            intermediate_duration_ms: default_intermediate_ms(),
            animate_on_mount: true,
            spring: None,
        }
    }
}

impl TextAnimationConfig {
    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }

    pub fn intermediate_duration(&self) -> Duration {
        Duration::from_millis(self.intermediate_duration_ms)
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_intermediate_duration(mut self, duration: Duration) -> Self {
        self.intermediate_duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_animate_on_mount(mut self, animate: bool) -> Self {
        self.animate_on_mount = animate;
        self
    }

    pub fn with_spring(mut self, spring: SpringParams) -> Self {
        self.spring = Some(spring);
        self
    }
}
