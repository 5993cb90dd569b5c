//! Plain-text rendering of composed frames

use std::fmt::Write as _;
use std::time::Duration;

use letters_animation::{CharacterPhase, Frame, GlyphVisual, RenderedCharacter};

/// Drawn in place of a character that is on screen but still far from settled
const IN_FLIGHT: char = '.';

/// Whether a revealing glyph is close enough to its final pose to draw as-is
fn is_legible(visual: &GlyphVisual, line_height: f32) -> bool {
    visual.opacity >= 0.5
        && (visual.scale - 1.0).abs() <= 0.35
        && visual.rotation.abs() <= 20.0
        && visual.translate_y.abs() <= line_height * 0.25
}

fn draw(out: &mut String, character: &RenderedCharacter, line_height: f32) {
    if character.text == "\n" || character.text == "\r\n" {
        out.push('\n');
        return;
    }
    match character.phase {
        CharacterPhase::Hidden => out.extend(character.text.chars().map(|_| ' ')),
        CharacterPhase::Settled => out.push_str(&character.text),
        CharacterPhase::Revealing { .. } if character.visual.opacity <= 0.0 => {
            out.extend(character.text.chars().map(|_| ' '))
        }
        CharacterPhase::Revealing { .. } if is_legible(&character.visual, line_height) => {
            out.push_str(&character.text)
        }
        CharacterPhase::Revealing { .. } => out.push(IN_FLIGHT),
    }
}

/// Text body of a frame, one output line per text line
pub fn render_text(frame: &Frame, line_height: f32) -> String {
    let mut out = String::new();
    for character in &frame.characters {
        draw(&mut out, character, line_height);
    }
    out
}

/// Timestamped frame with its status table
pub fn render_frame(frame: &Frame, line_height: f32, elapsed: Duration) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{:>6}ms] {}", elapsed.as_millis(), frame.status);
    for line in render_text(frame, line_height).lines() {
        let _ = writeln!(out, "           |{}|", line);
    }
    out
}
