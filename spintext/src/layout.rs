// Copyright 2025 the Spintext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placing glyphs along lines of text.

use kurbo::BezPath;
use log::debug;

use crate::outline::interpret;
use crate::{Font, Result};

/// Lay out `text` at `size` (in output units per em) and draw every glyph.
///
/// Characters are visited by Unicode scalar value. Every character other than `'\n'` produces
/// exactly one path, in order, positioned at the current pen. `'\n'` moves the pen back to the
/// start of the line and one [line height](Font::line_height) down.
///
/// Characters missing from the font are drawn with the `'?'` glyph. If that is missing as
/// well, this fails with [`Error::UnknownGlyph`](crate::Error::UnknownGlyph).
pub fn layout(text: &str, size: f64, font: &Font) -> Result<Vec<BezPath>> {
    let mut run = TextRun::new(font, size);
    let mut paths = Vec::with_capacity(text.len());
    for character in text.chars() {
        if character == '\n' {
            run.new_line();
            continue;
        }
        let glyph = font.glyph_or_fallback(character)?;
        let (path, advance) = interpret(glyph, run.scale, run.pen_x, run.pen_y);
        run.pen_x += advance;
        paths.push(path);
    }
    debug!(
        "Laid out {} glyphs of {:?} at size {size}",
        paths.len(),
        font.family_name()
    );
    Ok(paths)
}

/// Pen state for a single call to [`layout`].
struct TextRun {
    scale: f64,
    line_height: f64,
    pen_x: f64,
    pen_y: f64,
}

impl TextRun {
    fn new(font: &Font, size: f64) -> Self {
        Self {
            scale: font.scale(size),
            line_height: font.line_height(size),
            pen_x: 0.0,
            pen_y: 0.0,
        }
    }

    fn new_line(&mut self) {
        self.pen_x = 0.0;
        self.pen_y -= self.line_height;
    }
}
