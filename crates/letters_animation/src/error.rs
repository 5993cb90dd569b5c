//! Animation error types

use thiserror::Error;

/// Errors raised by the animated text controller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnimationError {
    /// The state has not been bound to a text yet
    #[error("Animation state is not attached to a text")]
    NotAttached,

    /// The layout probe reported the wrong number of characters
    #[error("Layout probe reported {actual} characters, expected {expected}")]
    GeometryMismatch { expected: usize, actual: usize },

    /// A per-character accessor was given an invalid index
    #[error("Character index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Playback was requested outside of a tokio runtime
    #[error("No async runtime available to schedule playback")]
    NoRuntime,

    /// Preset name could not be parsed
    #[error("Unknown animation preset: {0}")]
    UnknownPreset(String),

    /// Easing name could not be parsed
    #[error("Unknown easing curve: {0}")]
    UnknownEasing(String),
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
