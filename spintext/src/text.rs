// Copyright 2025 the Spintext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use log::warn;
use serde::Deserialize;

use crate::{ExtrudeGeometry, ExtrudeOptions, Font, GeometryKind, Mesh, Result};

/// The text size used when the caller doesn't pick one, in output units per em.
pub const DEFAULT_SIZE: f64 = 100.0;

/// Parameters for [`TextGeometry`].
///
/// Everything except the font can be loaded from JSON, with missing fields taking their
/// default values.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TextOptions {
    /// The font to draw with. Without a font, the default extrusion is built instead.
    #[serde(skip)]
    pub font: Option<Arc<Font>>,
    /// Size of the text, in output units per em.
    pub size: f64,
    /// Extrusion depth. Takes precedence over both `height` and `extrude.depth`.
    pub depth: Option<f64>,
    /// Former name of `depth`, used only when `depth` is not set.
    pub height: Option<f64>,
    /// Every other extrusion parameter.
    pub extrude: ExtrudeOptions,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            font: None,
            size: DEFAULT_SIZE,
            depth: None,
            height: None,
            extrude: ExtrudeOptions::default(),
        }
    }
}

impl TextOptions {
    /// The extrusion parameters, with the depth resolved.
    pub fn extrude_options(&self) -> ExtrudeOptions {
        ExtrudeOptions {
            depth: self.depth.or(self.height).unwrap_or(self.extrude.depth),
            ..self.extrude.clone()
        }
    }
}

/// Builder of extruded text.
#[derive(Debug)]
pub struct TextGeometry;

impl TextGeometry {
    /// Lay out `text`, resolve its glyphs into shapes and extrude them.
    ///
    /// Fails only when a character is missing from the font and the font has no `'?'` glyph.
    /// Text which draws nothing (such as an empty string) produces the same default solid as
    /// [`ExtrudeGeometry::new`] does for an empty list of shapes.
    pub fn new(text: &str, options: &TextOptions) -> Result<Mesh> {
        let extrude = options.extrude_options();
        let mut mesh = match &options.font {
            Some(font) => {
                let shapes = font.generate_shapes(text, options.size)?;
                ExtrudeGeometry::new(&shapes, &extrude)
            }
            None => {
                warn!("No font given for text {text:?}, building the default extrusion instead");
                ExtrudeGeometry::new(&[], &ExtrudeOptions::default())
            }
        };
        mesh.kind = GeometryKind::Text;
        Ok(mesh)
    }
}
