// Copyright 2025 the Spintext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decoding typeface outline command strings into paths.
//!
//! An outline is a whitespace separated list of tokens. Each command is a single letter opcode
//! followed by a fixed number of coordinates, all in font design units:
//!
//! | Opcode | Operands                  | Meaning                                  |
//! |--------|---------------------------|------------------------------------------|
//! | `m`    | `x y`                     | Start a new contour at `(x, y)`.         |
//! | `l`    | `x y`                     | Straight line to `(x, y)`.               |
//! | `q`    | `x y cx cy`               | Quadratic curve to `(x, y)`.             |
//! | `b`    | `x y c1x c1y c2x c2y`     | Cubic curve to `(x, y)`.                 |
//!
//! Note that the end point is stored *before* the control points.
//! Unknown opcodes are skipped, but a coordinate in opcode position means an operand count
//! is off and the outline is rejected.
//! Every outline has to start with `m`.

use std::iter::Enumerate;
use std::str::SplitWhitespace;

use kurbo::{BezPath, Point};
use log::trace;

use crate::{Error, Result};

/// A single outline command, in font design units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OutlineCommand {
    /// Start a new contour.
    MoveTo(Point),
    /// Straight line from the current point.
    LineTo(Point),
    /// Quadratic Bézier curve from the current point.
    QuadTo {
        /// The control point.
        ctrl: Point,
        /// The new current point.
        end: Point,
    },
    /// Cubic Bézier curve from the current point.
    CurveTo {
        /// The first control point.
        ctrl1: Point,
        /// The second control point.
        ctrl2: Point,
        /// The new current point.
        end: Point,
    },
}

/// A decoded glyph outline.
///
/// Outlines are decoded once, when the font is loaded, so drawing a glyph never has to touch the
/// command string again.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Outline {
    commands: Vec<OutlineCommand>,
}

impl Outline {
    /// Decode an outline command string.
    ///
    /// `character` is only used to report errors.
    pub fn parse(character: char, source: &str) -> Result<Self> {
        let mut tokens = Tokens {
            character,
            inner: source.split_whitespace().enumerate(),
            position: 0,
        };
        let mut commands = Vec::new();
        while let Some((position, opcode)) = tokens.inner.next() {
            tokens.position = position + 1;
            if commands.is_empty() && matches!(opcode, "l" | "q" | "b") {
                return Err(tokens.malformed(
                    position,
                    format!("{opcode:?} before the first \"m\""),
                ));
            }
            let command = match opcode {
                "m" => OutlineCommand::MoveTo(tokens.point()?),
                "l" => OutlineCommand::LineTo(tokens.point()?),
                "q" => {
                    let end = tokens.point()?;
                    let ctrl = tokens.point()?;
                    OutlineCommand::QuadTo { ctrl, end }
                }
                "b" => {
                    let end = tokens.point()?;
                    let ctrl1 = tokens.point()?;
                    let ctrl2 = tokens.point()?;
                    OutlineCommand::CurveTo { ctrl1, ctrl2, end }
                }
                other if other.parse::<f64>().is_ok() => {
                    return Err(tokens.malformed(
                        position,
                        format!("expected an opcode, found the stray coordinate {other:?}"),
                    ));
                }
                other => {
                    trace!("Skipping unknown opcode {other:?} in glyph {character:?}");
                    continue;
                }
            };
            commands.push(command);
        }
        Ok(Self { commands })
    }

    /// The decoded commands, in drawing order.
    pub fn commands(&self) -> &[OutlineCommand] {
        &self.commands
    }

    /// Whether the outline draws nothing, as for the space character.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

struct Tokens<'a> {
    character: char,
    inner: Enumerate<SplitWhitespace<'a>>,
    /// Index of the next token, for error reporting.
    position: usize,
}

impl Tokens<'_> {
    fn point(&mut self) -> Result<Point> {
        let x = self.coordinate()?;
        let y = self.coordinate()?;
        Ok(Point::new(x, y))
    }

    fn coordinate(&mut self) -> Result<f64> {
        let Some((position, token)) = self.inner.next() else {
            return Err(self.malformed(
                self.position,
                "expected a coordinate, found the end of the outline".into(),
            ));
        };
        self.position = position + 1;
        match token.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            Ok(_) => Err(self.malformed(position, format!("coordinate {token:?} is not finite"))),
            Err(_) => Err(self.malformed(
                position,
                format!("expected a coordinate, found {token:?}"),
            )),
        }
    }

    fn malformed(&self, position: usize, reason: String) -> Error {
        Error::MalformedOutline {
            character: self.character,
            position,
            reason,
        }
    }
}

/// A glyph as stored in a [`Font`](crate::Font).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Glyph {
    /// Horizontal pen advance, in font design units.
    pub advance: f64,
    /// The glyph's outline, in font design units.
    pub outline: Outline,
}

/// Draw `glyph` into a new path, scaled by `scale` and then moved by `(offset_x, offset_y)`.
///
/// Returns the path together with the glyph's advance multiplied by `scale`, which is how far
/// the pen should move before drawing the next glyph.
/// Glyphs without an outline produce an empty path.
pub fn interpret(glyph: &Glyph, scale: f64, offset_x: f64, offset_y: f64) -> (BezPath, f64) {
    let place = |p: Point| Point::new(p.x * scale + offset_x, p.y * scale + offset_y);
    let mut path = BezPath::new();
    for command in glyph.outline.commands() {
        match *command {
            OutlineCommand::MoveTo(p) => path.move_to(place(p)),
            OutlineCommand::LineTo(p) => path.line_to(place(p)),
            OutlineCommand::QuadTo { ctrl, end } => path.quad_to(place(ctrl), place(end)),
            OutlineCommand::CurveTo { ctrl1, ctrl2, end } => {
                path.curve_to(place(ctrl1), place(ctrl2), place(end));
            }
        }
    }
    (path, glyph.advance * scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::PathEl;

    #[test]
    fn parses_every_opcode() {
        let outline = Outline::parse('x', "m 0 0 l 10 0 q 20 10 15 0 b 0 20 20 15 5 25").unwrap();
        assert_eq!(
            outline.commands(),
            &[
                OutlineCommand::MoveTo(Point::new(0., 0.)),
                OutlineCommand::LineTo(Point::new(10., 0.)),
                OutlineCommand::QuadTo {
                    ctrl: Point::new(15., 0.),
                    end: Point::new(20., 10.),
                },
                OutlineCommand::CurveTo {
                    ctrl1: Point::new(20., 15.),
                    ctrl2: Point::new(5., 25.),
                    end: Point::new(0., 20.),
                },
            ]
        );
    }

    #[test]
    fn skips_unknown_opcodes() {
        let outline = Outline::parse('x', "z m 1 2 Z l 3 4").unwrap();
        assert_eq!(outline.commands().len(), 2);
    }

    #[test]
    fn tolerates_repeated_whitespace() {
        let a = Outline::parse('x', "m 1 2  l 3\t4\n").unwrap();
        let b = Outline::parse('x', "m 1 2 l 3 4").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_outline() {
        assert!(Outline::parse('x', "").unwrap().is_empty());
        assert!(Outline::parse('x', "   ").unwrap().is_empty());
    }

    #[test]
    fn missing_operand_is_malformed() {
        let err = Outline::parse('k', "m 1 2 l 3").unwrap_err();
        match err {
            Error::MalformedOutline {
                character,
                position,
                ..
            } => {
                assert_eq!(character, 'k');
                assert_eq!(position, 5);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn non_numeric_operand_is_malformed() {
        let err = Outline::parse('k', "m 1 two").unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedOutline { position: 2, .. }
        ));
    }

    #[test]
    fn drawing_before_move_is_malformed() {
        let err = Outline::parse('k', "z l 1 2").unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedOutline { position: 1, .. }
        ));
    }

    #[test]
    fn trailing_coordinate_is_malformed() {
        let err = Outline::parse('k', "m 0 0 l 10 0 l 10 10 7").unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedOutline { position: 9, .. }
        ));
    }

    #[test]
    fn extra_coordinates_are_malformed() {
        let err = Outline::parse('k', "m 0 0 l 10 0 3 4 l 10 10").unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedOutline { position: 6, .. }
        ));
    }

    #[test]
    fn non_finite_operand_is_malformed() {
        assert!(Outline::parse('k', "m 1 NaN").is_err());
        assert!(Outline::parse('k', "m inf 1").is_err());
    }

    #[test]
    fn interpret_scales_then_offsets() {
        let glyph = Glyph {
            advance: 500.,
            outline: Outline::parse('x', "m 100 200 q 300 400 500 600").unwrap(),
        };
        let (path, advance) = interpret(&glyph, 0.5, 10., -20.);
        assert_eq!(advance, 250.);
        assert_eq!(
            path.elements(),
            &[
                PathEl::MoveTo(Point::new(60., 80.)),
                PathEl::QuadTo(Point::new(260., 280.), Point::new(160., 180.)),
            ]
        );
    }
}
