// Copyright 2025 the Spintext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Triangle meshes produced by extrusion.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// What produced a [`Mesh`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    /// An extrusion of arbitrary shapes.
    #[default]
    Extrude,
    /// An extrusion of laid out text.
    Text,
}

/// A range of indices drawn with a single material.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Group {
    /// First index of the range.
    pub start: usize,
    /// Number of indices in the range. Always a multiple of 3.
    pub count: usize,
    /// 0 for the front and back caps, 1 for the side walls.
    pub material_index: u32,
}

/// An axis aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// An interleaved vertex, laid out for direct upload to the GPU.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// An indexed triangle mesh.
///
/// `positions`, `normals` and `uvs` always have the same length. Triangles are wound
/// counter-clockwise when seen from outside the solid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub groups: Vec<Group>,
    pub kind: GeometryKind,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_capacity: usize, index_capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_capacity),
            normals: Vec::with_capacity(vertex_capacity),
            uvs: Vec::with_capacity(vertex_capacity),
            indices: Vec::with_capacity(index_capacity),
            groups: Vec::new(),
            kind: GeometryKind::default(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append a vertex, returning its index.
    pub(crate) fn push_vertex(&mut self, position: Vec3, normal: Vec3, uv: Vec2) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position.to_array());
        self.normals.push(normal.to_array());
        self.uvs.push(uv.to_array());
        index
    }

    /// Record every index added since `start` as a group.
    pub(crate) fn close_group(&mut self, start: usize, material_index: u32) {
        let count = self.indices.len() - start;
        if count > 0 {
            self.groups.push(Group {
                start,
                count,
                material_index,
            });
        }
    }

    /// The smallest box containing every vertex, or `None` for a mesh without vertices.
    pub fn bounding_box(&self) -> Option<Aabb> {
        let (first, rest) = self.positions.split_first()?;
        let first = Vec3::from_array(*first);
        let (min, max) = rest.iter().fold((first, first), |(min, max), &p| {
            let p = Vec3::from_array(p);
            (min.min(p), max.max(p))
        });
        Some(Aabb { min, max })
    }

    /// Move every vertex by `offset`.
    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            *p = (Vec3::from_array(*p) + offset).to_array();
        }
    }

    /// Move the mesh so that the centre of its bounding box is at the origin.
    pub fn center(&mut self) {
        if let Some(bbox) = self.bounding_box() {
            self.translate(-bbox.center());
        }
    }

    /// The vertex attributes, interleaved.
    pub fn vertices(&self) -> Vec<Vertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((&position, &normal), &uv)| Vertex {
                position,
                normal,
                uv,
            })
            .collect()
    }

    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
