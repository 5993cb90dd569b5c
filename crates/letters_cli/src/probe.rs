//! Fixed-advance text measurement for terminal playback

use letters_animation::{GlyphBox, LayoutProbe, TextLayoutSnapshot, TextStyle};

/// Approximate advance of one character as a fraction of the font size
const ADVANCE_RATIO: f32 = 0.55;

/// Measures text as if every character had the same advance
///
/// Lines break on `\n` and, when `max_width` is set, before a character that
/// would overflow the line.
#[derive(Clone, Copy, Debug, Default)]
pub struct MonospaceProbe {
    pub max_width: Option<f32>,
}

impl MonospaceProbe {
    pub fn new(max_width: Option<f32>) -> Self {
        Self { max_width }
    }

    fn advance(style: &TextStyle) -> f32 {
        style.font_size * ADVANCE_RATIO
    }
}

impl LayoutProbe for MonospaceProbe {
    fn measure(&self, characters: &[String], style: &TextStyle) -> TextLayoutSnapshot {
        let advance = Self::advance(style);
        let line_height = style.resolved_line_height();

        let mut glyphs = Vec::with_capacity(characters.len());
        let mut line = 0;
        let mut x = 0.0_f32;
        let mut width = 0.0_f32;

        for character in characters {
            if is_line_break(character) {
                glyphs.push(GlyphBox {
                    left: x,
                    width: 0.0,
                    line,
                });
                line += 1;
                x = 0.0;
                continue;
            }

            if let Some(max) = self.max_width {
                if x > 0.0 && x + advance > max {
                    line += 1;
                    x = 0.0;
                }
            }

            glyphs.push(GlyphBox {
                left: x,
                width: advance,
                line,
            });
            width = width.max(x + advance);
            x += advance + style.letter_spacing;
        }

        let line_heights = vec![line_height; line + 1];
        TextLayoutSnapshot {
            width,
            height: line_height * line_heights.len() as f32,
            line_heights,
            glyphs,
        }
    }
}

fn is_line_break(character: &str) -> bool {
    matches!(character, "\n" | "\r\n")
}
