//! Layout probe contract
//!
//! The core never shapes text itself. A host render surface measures the
//! bound string once, in its real style but fully transparent, and hands the
//! result back as a [`TextLayoutSnapshot`]. [`character_geometry`] turns that
//! snapshot into the per-character anchors the presets transform around.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::config::TextStyle;

/// Anchor point of a geometric transform, as a fraction of a box
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformOrigin {
    pub pivot_x: f32,
    pub pivot_y: f32,
}

impl TransformOrigin {
    pub const CENTER: TransformOrigin = TransformOrigin {
        pivot_x: 0.5,
        pivot_y: 0.5,
    };

    /// Create an origin, clamping both fractions into 0.0..=1.0
    pub fn new(pivot_x: f32, pivot_y: f32) -> Self {
        Self {
            pivot_x: clamp_fraction(pivot_x),
            pivot_y: clamp_fraction(pivot_y),
        }
    }
}

impl Default for TransformOrigin {
    fn default() -> Self {
        Self::CENTER
    }
}

/// Geometry reported for one character by the layout probe
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CharacterGeometry {
    pub origin: TransformOrigin,
    /// Height of the line the character sits on, in layout units
    pub line_height: f32,
}

impl CharacterGeometry {
    pub fn new(origin: TransformOrigin, line_height: f32) -> Self {
        Self {
            origin,
            line_height: line_height.max(0.0),
        }
    }
}

/// Where inside its line box a character pivots
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OriginAnchor {
    /// Horizontal center of the glyph, vertical center of its line
    #[default]
    Center,
    /// Left edge of the glyph, bottom of its line
    LineBottomStart,
}

/// Bounding box of one character inside a measured paragraph
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlyphBox {
    pub left: f32,
    pub width: f32,
    /// Zero-based line index
    pub line: usize,
}

/// Result of measuring a text with a host's text layout engine
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextLayoutSnapshot {
    pub width: f32,
    pub height: f32,
    /// Height of each line, top to bottom
    pub line_heights: Vec<f32>,
    /// One box per character, in text order
    pub glyphs: Vec<GlyphBox>,
}

impl TextLayoutSnapshot {
    /// Height of a line, zero when the index is past the last line
    pub fn line_height(&self, line: usize) -> f32 {
        self.line_heights.get(line).copied().unwrap_or(0.0)
    }

    /// Sum of the heights of lines `0..line`
    fn height_above(&self, line: usize) -> f32 {
        self.line_heights.iter().take(line).sum()
    }
}

/// Host capability that measures text for the probe pass
pub trait LayoutProbe {
    /// Lay out `characters` (already segmented) in `style`
    fn measure(&self, characters: &[String], style: &TextStyle) -> TextLayoutSnapshot;
}

/// Split text into user-perceived characters
pub fn segment(text: &str) -> Vec<String> {
    text.graphemes(true).map(str::to_owned).collect()
}

/// Per-character transform origins and line heights for a measured text
pub fn character_geometry(
    layout: &TextLayoutSnapshot,
    anchor: OriginAnchor,
) -> Vec<CharacterGeometry> {
    layout
        .glyphs
        .iter()
        .map(|glyph| {
            let line_height = layout.line_height(glyph.line);
            let above = layout.height_above(glyph.line);
            let (x, y) = match anchor {
                OriginAnchor::Center => (glyph.left + glyph.width / 2.0, above + line_height / 2.0),
                OriginAnchor::LineBottomStart => (glyph.left, above + line_height),
            };
            let origin = TransformOrigin::new(
                fraction(x, layout.width),
                fraction(y, layout.height),
            );
            CharacterGeometry::new(origin, line_height)
        })
        .collect()
}

fn fraction(value: f32, extent: f32) -> f32 {
    if extent > 0.0 && extent.is_finite() {
        value / extent
    } else {
        0.5
    }
}

fn clamp_fraction(value: f32) -> f32 {
    if value.is_nan() {
        0.5
    } else {
        value.clamp(0.0, 1.0)
    }
}
