// Copyright 2025 the Spintext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spintext turns text into extruded 3D meshes, using fonts stored in the typeface JSON format.
//!
//! A typeface table stores every glyph as a compact outline command string (`m`, `l`, `q`, `b`
//! followed by coordinates in font design units) and a horizontal advance.
//! Spintext decodes those outlines into [`kurbo`] paths, lays the glyphs out into a run of text,
//! resolves every glyph path into fillable [`Shape`]s with holes, and finally extrudes the shapes
//! into a closed [`Mesh`] with optional bevelled edges.
//!
//! ## Getting started
//!
//! ```ignore
//! let font = Arc::new(spintext::Font::from_json(&std::fs::read("droid_sans.typeface.json")?)?);
//! let mesh = spintext::TextGeometry::new(
//!     "spin",
//!     &spintext::TextOptions {
//!         font: Some(font),
//!         size: 70.0,
//!         depth: Some(20.0),
//!         extrude: spintext::ExtrudeOptions {
//!             bevel_enabled: true,
//!             bevel_thickness: 2.0,
//!             bevel_size: 1.5,
//!             ..Default::default()
//!         },
//!         ..Default::default()
//!     },
//! )?;
//! // Upload `mesh.vertices()` and `mesh.indices` to your renderer of choice.
//! ```
//!
//! The mesh is produced in font space: x grows along the baseline, y grows upwards and the
//! extrusion runs along +z. Nothing is re-centred; use [`Mesh::center`] if you need that.
//!
//! ## Pipeline
//!
//! - [`outline`]: decoding glyph outline commands into paths.
//! - [`layout`]: placing glyphs along lines of text.
//! - [`shape`]: splitting glyph paths into outer contours and holes.
//! - [`extrude`]: building the solid, including bevels and cap triangulation.

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![forbid(unsafe_code)]
#![expect(
    clippy::cast_possible_truncation,
    reason = "Mesh buffers are f32 and u32; the geometry is computed in f64 and narrowed at the end."
)]

pub mod extrude;
pub mod font;
pub mod layout;
pub mod mesh;
pub mod outline;
pub mod shape;
mod text;

/// 2D geometry, with a focus on curves.
pub use kurbo;
/// Vector math for the 3D output.
pub use glam;

pub use extrude::{ExtrudeGeometry, ExtrudeOptions};
pub use font::{BoundingBox, Font, FontData, GlyphData, FALLBACK_CHAR};
pub use layout::layout;
pub use mesh::{Aabb, GeometryKind, Group, Mesh, Vertex};
pub use outline::{interpret, Glyph, Outline, OutlineCommand};
pub use shape::{resolve, Shape, ShapePoints};
pub use text::{TextGeometry, TextOptions, DEFAULT_SIZE};

use thiserror::Error;

/// Errors that can occur while loading fonts or generating text geometry.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The requested character is not in the font, and neither is the `'?'` fallback glyph.
    #[error("character {character:?} does not exist in font family {family:?}")]
    UnknownGlyph {
        /// The character which could not be drawn.
        character: char,
        /// The family name of the font which was searched.
        family: String,
    },
    /// A glyph's outline command string could not be decoded.
    #[error("malformed outline for glyph {character:?} at token {position}: {reason}")]
    MalformedOutline {
        /// The glyph whose outline is broken.
        character: char,
        /// Index of the offending token in the whitespace separated command string.
        position: usize,
        /// What was wrong with the token.
        reason: String,
    },
    /// The font's `resolution` is not a finite number.
    #[error("font resolution must be finite, got {0}")]
    InvalidResolution(f64),
    /// The font table is not valid typeface JSON.
    #[error("couldn't parse typeface table")]
    Json(#[from] serde_json::Error),
}

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;
