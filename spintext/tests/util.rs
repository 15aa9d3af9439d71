// Copyright 2025 the Spintext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Utility functions shared across different tests.

use std::sync::{Arc, LazyLock};

use spintext::kurbo::{BezPath, PathEl, Point};
use spintext::{Font, Mesh, TextOptions};

static TEST_FONT: LazyLock<Arc<Font>> = LazyLock::new(|| {
    Arc::new(Font::from_json(include_str!("assets/test_font.json")).unwrap())
});

pub(crate) fn test_font() -> Arc<Font> {
    TEST_FONT.clone()
}

pub(crate) fn text_options() -> TextOptions {
    TextOptions {
        font: Some(test_font()),
        ..Default::default()
    }
}

/// Every point of a path, control points included, in order.
pub(crate) fn points(path: &BezPath) -> Vec<Point> {
    path.elements()
        .iter()
        .flat_map(|el| match *el {
            PathEl::MoveTo(p) | PathEl::LineTo(p) => vec![p],
            PathEl::QuadTo(p1, p2) => vec![p1, p2],
            PathEl::CurveTo(p1, p2, p3) => vec![p1, p2, p3],
            PathEl::ClosePath => vec![],
        })
        .collect()
}

pub(crate) fn z_range(mesh: &Mesh) -> (f32, f32) {
    let bbox = mesh.bounding_box().unwrap();
    (bbox.min.z, bbox.max.z)
}

/// Check the structural invariants every mesh has to uphold.
pub(crate) fn check_mesh(mesh: &Mesh) {
    assert_eq!(mesh.normals.len(), mesh.positions.len());
    assert_eq!(mesh.uvs.len(), mesh.positions.len());
    assert_eq!(mesh.indices.len() % 3, 0);
    assert!(mesh
        .indices
        .iter()
        .all(|&i| (i as usize) < mesh.vertex_count()));
    assert!(mesh
        .positions
        .iter()
        .flatten()
        .all(|c| c.is_finite()));
    let covered: usize = mesh.groups.iter().map(|g| g.count).sum();
    assert_eq!(covered, mesh.indices.len());
    let mut next = 0;
    for group in &mesh.groups {
        assert_eq!(group.start, next);
        next += group.count;
    }
}
