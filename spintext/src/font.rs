// Copyright 2025 the Spintext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typeface tables.
//!
//! Fonts are loaded from the typeface JSON format, as produced by the `facetype.js` converter.
//! Only the fields used for drawing are read:
//!
//! ```json
//! {
//!   "glyphs": { "A": { "ha": 1294, "o": "m 0 0 l 500 1456 ..." }, ... },
//!   "familyName": "Droid Sans",
//!   "resolution": 1000,
//!   "boundingBox": { "yMin": -555, "xMin": -111, "yMax": 2163, "xMax": 2049 },
//!   "underlineThickness": 102
//! }
//! ```

use std::collections::HashMap;

use log::{debug, warn};
use serde::Deserialize;

use crate::outline::{Glyph, Outline};
use crate::{layout, resolve, Error, Result, Shape};

/// The glyph drawn in place of characters which the font doesn't contain.
pub const FALLBACK_CHAR: char = '?';

/// A typeface table, exactly as stored in JSON.
///
/// Use [`Font::new`] to validate it and decode the glyph outlines.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontData {
    /// Glyphs, keyed by the character they draw.
    pub glyphs: HashMap<String, GlyphData>,
    /// Font design units per em.
    pub resolution: f64,
    /// Extent of all glyphs, in font design units.
    pub bounding_box: BoundingBox,
    /// Thickness of the underline, in font design units. Contributes to the line height.
    #[serde(default)]
    pub underline_thickness: f64,
    /// Name of the font family, used in diagnostics.
    #[serde(default)]
    pub family_name: String,
}

/// An axis aligned box in font design units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

/// A glyph, exactly as stored in JSON.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GlyphData {
    /// Horizontal advance, in font design units.
    #[serde(rename = "ha", default)]
    pub advance: f64,
    /// Outline command string. Absent for glyphs which draw nothing.
    #[serde(rename = "o", default)]
    pub outline: Option<String>,
}

/// A font ready for drawing.
///
/// Fonts are immutable once loaded, so a single font can be shared between threads
/// (for example behind an `Arc`) and used to generate text concurrently.
#[derive(Clone, Debug)]
pub struct Font {
    family_name: String,
    resolution: f64,
    bounding_box: BoundingBox,
    underline_thickness: f64,
    glyphs: HashMap<char, Glyph>,
}

impl Font {
    /// Load a font from typeface JSON.
    pub fn from_json(source: impl AsRef<[u8]>) -> Result<Self> {
        let data: FontData = serde_json::from_slice(source.as_ref())?;
        Self::new(data)
    }

    /// Validate a typeface table and decode all of its glyph outlines.
    ///
    /// Fails with [`Error::MalformedOutline`] if any outline can't be decoded, so that drawing
    /// text with the resulting font can only fail because of missing glyphs.
    pub fn new(data: FontData) -> Result<Self> {
        if !data.resolution.is_finite() {
            return Err(Error::InvalidResolution(data.resolution));
        }
        let mut glyphs = HashMap::with_capacity(data.glyphs.len());
        for (key, glyph) in data.glyphs {
            let mut chars = key.chars();
            let (Some(character), None) = (chars.next(), chars.next()) else {
                warn!(
                    "Ignoring glyph {key:?} in font family {:?}, glyph keys must be a single character",
                    data.family_name
                );
                continue;
            };
            let outline = match &glyph.outline {
                Some(source) => Outline::parse(character, source)?,
                None => Outline::default(),
            };
            glyphs.insert(
                character,
                Glyph {
                    advance: glyph.advance,
                    outline,
                },
            );
        }
        if !glyphs.contains_key(&FALLBACK_CHAR) {
            debug!(
                "Font family {:?} has no {FALLBACK_CHAR:?} glyph, missing characters will be errors",
                data.family_name
            );
        }
        Ok(Self {
            family_name: data.family_name,
            resolution: data.resolution,
            bounding_box: data.bounding_box,
            underline_thickness: data.underline_thickness,
            glyphs,
        })
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Font design units per em.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    pub fn underline_thickness(&self) -> f64 {
        self.underline_thickness
    }

    /// The factor converting font design units to output units for text of the given size.
    pub fn scale(&self, size: f64) -> f64 {
        size / self.resolution
    }

    /// Distance between consecutive baselines for text of the given size.
    ///
    /// This is the height of the font's bounding box plus the underline thickness.
    pub fn line_height(&self, size: f64) -> f64 {
        let bbox = &self.bounding_box;
        (bbox.y_max - bbox.y_min + self.underline_thickness) * self.scale(size)
    }

    /// The glyph for `character`, without any fallback.
    pub fn glyph(&self, character: char) -> Option<&Glyph> {
        self.glyphs.get(&character)
    }

    pub fn has_glyph(&self, character: char) -> bool {
        self.glyphs.contains_key(&character)
    }

    /// Number of glyphs in the font.
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// The glyph for `character`, or the [`FALLBACK_CHAR`] glyph if the font doesn't have one.
    pub fn glyph_or_fallback(&self, character: char) -> Result<&Glyph> {
        if let Some(glyph) = self.glyphs.get(&character) {
            return Ok(glyph);
        }
        match self.glyphs.get(&FALLBACK_CHAR) {
            Some(glyph) => {
                warn!(
                    "Character {character:?} does not exist in font family {:?}, drawing {FALLBACK_CHAR:?} instead",
                    self.family_name
                );
                Ok(glyph)
            }
            None => Err(Error::UnknownGlyph {
                character,
                family: self.family_name.clone(),
            }),
        }
    }

    /// Lay out `text` at `size` and resolve every glyph into fillable shapes.
    ///
    /// [`DEFAULT_SIZE`](crate::DEFAULT_SIZE) is the conventional size when the caller has no
    /// preference.
    pub fn generate_shapes(&self, text: &str, size: f64) -> Result<Vec<Shape>> {
        let paths = layout(text, size, self)?;
        Ok(resolve(&paths))
    }
}
