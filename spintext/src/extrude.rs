// Copyright 2025 the Spintext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Extruding 2D shapes into closed solids, with optional bevelled edges.
//!
//! The solid is built out of layers, each a copy of every contour of a shape at a fixed `z`.
//! Without a bevel there are two layers, at `0` and `depth`. With a bevel, `bevel_segments`
//! further layers are added on each side, following a quarter circle from the bevel's outer
//! edge (at `-bevel_thickness` and `depth + bevel_thickness`) to the body of the solid.
//! The caps are triangulated on the outermost layers and the side walls are quads between
//! consecutive layers.

use std::f64::consts::FRAC_PI_2;

use glam::{DVec2, DVec3, Vec3};
use kurbo::{Point, Vec2};
use log::{debug, warn};
use serde::Deserialize;

use crate::shape::{is_clockwise, ShapePoints};
use crate::{GeometryKind, Mesh, Shape};

/// Parameters of an extrusion.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExtrudeOptions {
    /// Distance between the front and back of the body of the solid.
    pub depth: f64,
    /// Whether to bevel the edges of the caps. When disabled, the other bevel parameters are
    /// ignored.
    pub bevel_enabled: bool,
    /// How far the bevel extends in front of and behind the body.
    pub bevel_thickness: f64,
    /// How far the bevel extends outwards from the shape's outline.
    pub bevel_size: f64,
    /// Outline offset at which the bevel starts.
    pub bevel_offset: f64,
    /// Number of straight segments each curve of the outline is split into.
    pub curve_segments: usize,
    /// Number of layers in each bevel.
    pub bevel_segments: usize,
}

impl Default for ExtrudeOptions {
    fn default() -> Self {
        Self {
            depth: 50.0,
            bevel_enabled: false,
            bevel_thickness: 10.0,
            bevel_size: 8.0,
            bevel_offset: 0.0,
            curve_segments: 12,
            bevel_segments: 5,
        }
    }
}

/// Builder of extruded solids.
#[derive(Debug)]
pub struct ExtrudeGeometry;

impl ExtrudeGeometry {
    /// Extrude every shape along +z.
    ///
    /// Each shape becomes an independent closed solid. The index buffer contains all caps
    /// (material 0) followed by all side walls (material 1).
    ///
    /// Without any shapes this builds a unit cube centred on the z axis, spanning `[0, 1]` in z.
    pub fn new(shapes: &[Shape], options: &ExtrudeOptions) -> Mesh {
        if shapes.is_empty() {
            return unit_cube();
        }
        let bevel = Bevel::new(options);
        let solids: Vec<_> = shapes
            .iter()
            .filter_map(|shape| Solid::new(shape.extract_points(options.curve_segments)))
            .collect();
        let mesh = build(&solids, options.depth, &bevel);
        debug!(
            "Extruded {} shapes into {} triangles",
            solids.len(),
            mesh.triangle_count()
        );
        mesh
    }
}

fn unit_cube() -> Mesh {
    let square = ShapePoints {
        contour: vec![
            Point::new(0.5, 0.5),
            Point::new(-0.5, 0.5),
            Point::new(-0.5, -0.5),
            Point::new(0.5, -0.5),
        ],
        holes: Vec::new(),
    };
    let solids: Vec<_> = Solid::new(square).into_iter().collect();
    build(&solids, 1.0, &Bevel::default())
}

/// Bevel parameters, all zero when the bevel is disabled.
#[derive(Clone, Copy, Debug, Default)]
struct Bevel {
    thickness: f64,
    size: f64,
    offset: f64,
    segments: usize,
}

impl Bevel {
    fn new(options: &ExtrudeOptions) -> Self {
        if !options.bevel_enabled {
            return Self::default();
        }
        Self {
            thickness: options.bevel_thickness,
            size: options.bevel_size,
            offset: options.bevel_offset,
            segments: options.bevel_segments.max(1),
        }
    }

    /// The `z` and outwards offset of the layer `ring` steps away from the outer edge.
    fn ring(&self, ring: usize) -> (f64, f64) {
        let t = ring as f64 / self.segments as f64;
        let angle = t * FRAC_PI_2;
        (
            self.thickness * angle.cos(),
            self.size * angle.sin() + self.offset,
        )
    }
}

/// A contour together with the direction each of its points moves in when bevelled.
struct Ring {
    points: Vec<Point>,
    movements: Vec<Vec2>,
}

impl Ring {
    fn new(points: Vec<Point>) -> Self {
        let len = points.len();
        let movements = (0..len)
            .map(|i| bevel_vec(points[i], points[(i + len - 1) % len], points[(i + 1) % len]))
            .collect();
        Self { points, movements }
    }

    fn layer(&self, offset: f64) -> impl Iterator<Item = Point> + '_ {
        self.points
            .iter()
            .zip(&self.movements)
            .map(move |(&p, &m)| p + m * offset)
    }
}

/// A single shape prepared for extrusion.
struct Solid {
    /// The outer contour, clockwise, followed by the holes, counter-clockwise.
    rings: Vec<Ring>,
    /// Cap triangles, indexing into the concatenation of all rings.
    faces: Vec<[usize; 3]>,
}

impl Solid {
    fn new(mut points: ShapePoints) -> Option<Self> {
        if points.contour.len() < 3 {
            debug!(
                "Skipping shape with a degenerate outline of {} points",
                points.contour.len()
            );
            return None;
        }
        if !all_finite(&points.contour) {
            warn!("Skipping shape with non-finite coordinates");
            return None;
        }
        points.holes.retain(|hole| {
            let finite = all_finite(hole);
            if !finite {
                warn!("Dropping hole with non-finite coordinates");
            }
            finite && hole.len() >= 3
        });
        if !is_clockwise(&points.contour) {
            points.contour.reverse();
        }
        for hole in &mut points.holes {
            if is_clockwise(hole) {
                hole.reverse();
            }
        }
        let faces = triangulate(&points);
        let rings = std::iter::once(points.contour)
            .chain(points.holes)
            .map(Ring::new)
            .collect();
        Some(Self { rings, faces })
    }

    fn vertex_count(&self) -> usize {
        self.rings.iter().map(|r| r.points.len()).sum()
    }
}

fn all_finite(points: &[Point]) -> bool {
    points.iter().all(|p| p.is_finite())
}

/// Triangulate the caps with earcut.
///
/// Faces are wound counter-clockwise, so that they face +z.
fn triangulate(points: &ShapePoints) -> Vec<[usize; 3]> {
    let rings: Vec<&Vec<Point>> = std::iter::once(&points.contour).chain(&points.holes).collect();
    let mut coords = Vec::with_capacity(2 * rings.iter().map(|r| r.len()).sum::<usize>());
    let mut hole_starts = Vec::with_capacity(points.holes.len());
    for (index, ring) in rings.iter().enumerate() {
        if index > 0 {
            hole_starts.push(coords.len() / 2);
        }
        coords.extend(ring.iter().flat_map(|p| [p.x, p.y]));
    }
    let indices = match earcutr::earcut(&coords, &hole_starts, 2) {
        Ok(indices) => indices,
        Err(err) => {
            warn!("Failed to triangulate the caps of a shape, leaving them open: {err:?}");
            return Vec::new();
        }
    };
    let point = |i: usize| Point::new(coords[2 * i], coords[2 * i + 1]);
    indices
        .chunks_exact(3)
        .map(|tri| {
            let (a, b, c) = (point(tri[0]), point(tri[1]), point(tri[2]));
            if (b - a).cross(c - a) < 0.0 {
                [tri[0], tri[2], tri[1]]
            } else {
                [tri[0], tri[1], tri[2]]
            }
        })
        .collect()
}

/// The direction in which `point` moves when its contour is grown, scaled so that edges move
/// outwards by one unit.
///
/// Sharp corners are mitered, with the miter length clamped to √2.
fn bevel_vec(point: Point, prev: Point, next: Point) -> Vec2 {
    let v_prev = point - prev;
    let v_next = next - point;
    let prev_len_sq = v_prev.hypot2();
    let collinear = v_prev.cross(v_next);

    let (trans, shrink_by) = if collinear.abs() > f64::EPSILON {
        // Intersect the two edges, each shifted outwards by one unit.
        let prev_len = prev_len_sq.sqrt();
        let next_len = v_next.hypot();
        let prev_shift = prev + Vec2::new(-v_prev.y, v_prev.x) / prev_len;
        let next_shift = next + Vec2::new(-v_next.y, v_next.x) / next_len;
        let sf = (next_shift - prev_shift).cross(v_next) / collinear;
        let trans = prev_shift + v_prev * sf - point;
        let trans_len_sq = trans.hypot2();
        if trans_len_sq <= 2.0 {
            return trans;
        }
        (trans, (trans_len_sq / 2.0).sqrt())
    } else {
        let same_direction = if v_prev.x > f64::EPSILON {
            v_next.x > f64::EPSILON
        } else if v_prev.x < -f64::EPSILON {
            v_next.x < -f64::EPSILON
        } else {
            sign(v_prev.y) == sign(v_next.y)
        };
        if same_direction {
            (Vec2::new(-v_prev.y, v_prev.x), prev_len_sq.sqrt())
        } else {
            // The contour folds back on itself.
            (v_prev, (prev_len_sq / 2.0).sqrt())
        }
    };
    if shrink_by > 0.0 {
        trans / shrink_by
    } else {
        Vec2::ZERO
    }
}

fn sign(value: f64) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

/// Compute the `z` and outwards offset of every layer, from the front of the solid to the back.
fn layers(depth: f64, bevel: &Bevel) -> Vec<(f64, f64)> {
    let mut layers = Vec::with_capacity(2 * bevel.segments + 2);
    for b in 0..bevel.segments {
        let (z, offset) = bevel.ring(b);
        layers.push((-z, offset));
    }
    let body_offset = bevel.size + bevel.offset;
    layers.push((0.0, body_offset));
    layers.push((depth, body_offset));
    for b in (0..bevel.segments).rev() {
        let (z, offset) = bevel.ring(b);
        layers.push((depth + z, offset));
    }
    layers
}

fn build(solids: &[Solid], depth: f64, bevel: &Bevel) -> Mesh {
    let layers = layers(depth, bevel);
    let (front, back) = (layers[0], layers[layers.len() - 1]);

    let caps: usize = solids.iter().map(|s| s.faces.len()).sum();
    let walls: usize = solids.iter().map(Solid::vertex_count).sum::<usize>() * (layers.len() - 1);
    let vertex_count: usize = solids.iter().map(Solid::vertex_count).sum::<usize>() * 2;
    let mut mesh = Mesh::with_capacity(vertex_count + walls * 4, caps * 6 + walls * 6);

    for solid in solids {
        add_cap(&mut mesh, solid, front, false);
        add_cap(&mut mesh, solid, back, true);
    }
    mesh.close_group(0, 0);

    let start = mesh.indices.len();
    for solid in solids {
        for ring in &solid.rings {
            add_side_walls(&mut mesh, ring, &layers);
        }
    }
    mesh.close_group(start, 1);
    mesh.kind = GeometryKind::Extrude;
    mesh
}

fn add_cap(mesh: &mut Mesh, solid: &Solid, (z, offset): (f64, f64), facing_back: bool) {
    let normal = if facing_back { Vec3::Z } else { Vec3::NEG_Z };
    let base = mesh.positions.len() as u32;
    for ring in &solid.rings {
        for p in ring.layer(offset) {
            let position = DVec3::new(p.x, p.y, z);
            mesh.push_vertex(position.as_vec3(), normal, position.truncate().as_vec2());
        }
    }
    for &[a, b, c] in &solid.faces {
        let [a, b, c] = [a, b, c].map(|i| base + i as u32);
        if facing_back {
            mesh.indices.extend([a, b, c]);
        } else {
            mesh.indices.extend([c, b, a]);
        }
    }
}

/// Add one quad per edge of `ring` between every pair of consecutive layers.
fn add_side_walls(mesh: &mut Mesh, ring: &Ring, layers: &[(f64, f64)]) {
    let len = ring.points.len();
    let corner = |i: usize, (z, offset): (f64, f64)| {
        let p = ring.points[i] + ring.movements[i] * offset;
        DVec3::new(p.x, p.y, z)
    };
    for i in (0..len).rev() {
        let j = i;
        let k = if i == 0 { len - 1 } else { i - 1 };
        for pair in layers.windows(2) {
            let a = corner(j, pair[0]);
            let b = corner(k, pair[0]);
            let c = corner(k, pair[1]);
            let d = corner(j, pair[1]);
            let normal = (c - a).cross(d - b).normalize_or_zero().as_vec3();
            // Project onto whichever vertical plane the wall is closest to facing.
            let along_x = (a.y - b.y).abs() < (a.x - b.x).abs();
            let uv = |p: DVec3| {
                let u = if along_x { p.x } else { p.y };
                DVec2::new(u, 1.0 - p.z).as_vec2()
            };
            let [a, b, c, d] = [a, b, c, d].map(|p| mesh.push_vertex(p.as_vec3(), normal, uv(p)));
            mesh.indices.extend([a, b, d, b, c, d]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::BezPath;

    fn square(size: f64) -> Shape {
        let mut path = BezPath::new();
        path.move_to((0., 0.));
        path.line_to((0., size));
        path.line_to((size, size));
        path.line_to((size, 0.));
        path.line_to((0., 0.));
        Shape::new(path)
    }

    fn z_range(mesh: &Mesh) -> (f32, f32) {
        let bbox = mesh.bounding_box().unwrap();
        (bbox.min.z, bbox.max.z)
    }

    #[test]
    fn bevel_vec_of_right_angle_is_clamped_miter() {
        // Clockwise square corner at the origin, moving outwards to (-1, -1).
        let v = bevel_vec(
            Point::new(0., 0.),
            Point::new(1., 0.),
            Point::new(0., 1.),
        );
        assert!((v.x + 1.).abs() < 1e-12);
        assert!((v.y + 1.).abs() < 1e-12);
    }

    #[test]
    fn bevel_vec_of_straight_line_is_unit_normal() {
        let v = bevel_vec(
            Point::new(1., 0.),
            Point::new(0., 0.),
            Point::new(2., 0.),
        );
        assert_eq!(v, Vec2::new(0., 1.));
    }

    #[test]
    fn sharp_corners_are_clamped() {
        let v = bevel_vec(
            Point::new(0., 0.),
            Point::new(-10., 1.),
            Point::new(-10., -1.),
        );
        assert!(v.hypot() <= 2f64.sqrt() + 1e-12);
    }

    #[test]
    fn plain_extrusion() {
        let options = ExtrudeOptions {
            depth: 3.,
            ..Default::default()
        };
        let mesh = ExtrudeGeometry::new(&[square(2.)], &options);
        // Two caps of two triangles each, four walls of two triangles each.
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.groups.len(), 2);
        assert_eq!(mesh.groups[0].count, 12);
        assert_eq!(mesh.groups[1].start, 12);
        assert_eq!(mesh.groups[1].count, 24);
        assert_eq!(z_range(&mesh), (0., 3.));
        assert_eq!(mesh.kind, GeometryKind::Extrude);
    }

    #[test]
    fn bevel_values_are_ignored_when_disabled() {
        let options = ExtrudeOptions {
            depth: 7.,
            bevel_thickness: 100.,
            bevel_size: 100.,
            bevel_segments: 9,
            ..Default::default()
        };
        let mesh = ExtrudeGeometry::new(&[square(2.)], &options);
        assert_eq!(z_range(&mesh), (0., 7.));
        let bbox = mesh.bounding_box().unwrap();
        assert_eq!((bbox.min.x, bbox.max.x), (0., 2.));
    }

    #[test]
    fn bevel_grows_the_solid() {
        let options = ExtrudeOptions {
            depth: 4.,
            bevel_enabled: true,
            bevel_thickness: 1.,
            bevel_size: 0.5,
            bevel_segments: 3,
            ..Default::default()
        };
        let mesh = ExtrudeGeometry::new(&[square(10.)], &options);
        assert_eq!(z_range(&mesh), (-1., 5.));
        let bbox = mesh.bounding_box().unwrap();
        assert!((bbox.min.x + 0.5).abs() < 1e-5);
        assert!((bbox.max.x - 10.5).abs() < 1e-5);
        // 3 + 3 bevel layers and 1 body layer between 8 rings, 4 edges each.
        assert_eq!(mesh.groups[1].count, 7 * 4 * 6);
    }

    #[test]
    fn side_walls_face_outwards() {
        let mesh = ExtrudeGeometry::new(&[square(2.)], &ExtrudeOptions::default());
        let sides = mesh.groups[1];
        for tri in mesh.indices[sides.start..sides.start + sides.count].chunks_exact(3) {
            let p = mesh.positions[tri[0] as usize];
            let n = mesh.normals[tri[0] as usize];
            // The outward direction from the centre of the square.
            let out = [p[0] - 1., p[1] - 1.];
            assert!(n[0] * out[0] + n[1] * out[1] > 0.);
            assert_eq!(n[2], 0.);
        }
    }

    #[test]
    fn caps_face_outwards() {
        let mesh = ExtrudeGeometry::new(&[square(2.)], &ExtrudeOptions::default());
        let caps = mesh.groups[0];
        for tri in mesh.indices[caps.start..caps.start + caps.count].chunks_exact(3) {
            let [a, b, c] = [0, 1, 2].map(|i| mesh.positions[tri[i] as usize]);
            let z = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
            if a[2] == 0. {
                assert!(z < 0.);
            } else {
                assert!(z > 0.);
            }
        }
    }

    #[test]
    fn holes_are_left_open() {
        let mut outer = square(10.);
        let mut hole = BezPath::new();
        hole.move_to((3., 3.));
        hole.line_to((7., 3.));
        hole.line_to((7., 7.));
        hole.line_to((3., 7.));
        hole.line_to((3., 3.));
        outer.holes.push(hole);
        let mesh = ExtrudeGeometry::new(&[outer], &ExtrudeOptions::default());
        // A square annulus needs 8 triangles per cap.
        assert_eq!(mesh.groups[0].count, 2 * 8 * 3);
        assert_eq!(mesh.groups[1].count, 8 * 6);
        let centre_covered = mesh.indices[..mesh.groups[0].count]
            .chunks_exact(3)
            .any(|tri| {
                let [a, b, c] = [0, 1, 2].map(|i| mesh.positions[tri[i] as usize]);
                let cx = (a[0] + b[0] + c[0]) / 3.;
                let cy = (a[1] + b[1] + c[1]) / 3.;
                (3. ..7.).contains(&cx) && (3. ..7.).contains(&cy)
            });
        assert!(!centre_covered);
    }

    #[test]
    fn uvs_follow_positions() {
        let mesh = ExtrudeGeometry::new(&[square(2.)], &ExtrudeOptions::default());
        let caps = mesh.groups[0];
        for &i in &mesh.indices[caps.start..caps.start + caps.count] {
            let p = mesh.positions[i as usize];
            assert_eq!(mesh.uvs[i as usize], [p[0], p[1]]);
        }
        assert_eq!(mesh.uvs.len(), mesh.positions.len());
        assert_eq!(mesh.normals.len(), mesh.positions.len());
    }

    #[test]
    fn no_shapes_is_a_unit_cube() {
        let mesh = ExtrudeGeometry::new(&[], &ExtrudeOptions::default());
        let bbox = mesh.bounding_box().unwrap();
        assert_eq!(bbox.min, Vec3::new(-0.5, -0.5, 0.));
        assert_eq!(bbox.max, Vec3::new(0.5, 0.5, 1.));
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn degenerate_shapes_are_skipped() {
        let mut line = BezPath::new();
        line.move_to((0., 0.));
        line.line_to((1., 1.));
        let mesh = ExtrudeGeometry::new(&[Shape::new(line)], &ExtrudeOptions::default());
        assert!(mesh.is_empty());
    }

    #[test]
    fn non_finite_shapes_are_skipped() {
        let mut nan = BezPath::new();
        nan.move_to((f64::NAN, 0.));
        nan.line_to((f64::NAN, 1.));
        nan.line_to((1., f64::INFINITY));
        nan.line_to((f64::NAN, 0.));
        let mesh = ExtrudeGeometry::new(&[Shape::new(nan), square(2.)], &ExtrudeOptions::default());
        // Only the square survives.
        assert_eq!(mesh.triangle_count(), 12);
        assert!(mesh.positions.iter().flatten().all(|c| c.is_finite()));
    }

    #[test]
    fn non_finite_holes_are_dropped() {
        let mut outer = square(10.);
        let mut hole = BezPath::new();
        hole.move_to((3., 3.));
        hole.line_to((f64::NAN, 3.));
        hole.line_to((7., 7.));
        hole.line_to((3., 3.));
        outer.holes.push(hole);
        let mesh = ExtrudeGeometry::new(&[outer], &ExtrudeOptions::default());
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn bevel_offset_moves_caps_and_body() {
        let options = ExtrudeOptions {
            depth: 4.,
            bevel_enabled: true,
            bevel_thickness: 1.,
            bevel_size: 2.,
            bevel_offset: 3.,
            bevel_segments: 2,
            ..Default::default()
        };
        let mesh = ExtrudeGeometry::new(&[square(10.)], &options);
        // The body grows by size + offset.
        let bbox = mesh.bounding_box().unwrap();
        assert_eq!(bbox.min, Vec3::new(-5., -5., -1.));
        assert_eq!(bbox.max, Vec3::new(15., 15., 5.));
        // The caps only grow by the offset.
        let caps = mesh.groups[0];
        for &i in &mesh.indices[caps.start..caps.start + caps.count] {
            let [x, y, z] = mesh.positions[i as usize];
            assert!(z == -1. || z == 5.);
            assert!(x == -3. || x == 13.);
            assert!(y == -3. || y == 13.);
        }
    }

    #[test]
    fn options_from_json() {
        let options: ExtrudeOptions =
            serde_json::from_str(r#"{ "depth": 2, "bevel_enabled": true }"#).unwrap();
        assert_eq!(options.depth, 2.);
        assert!(options.bevel_enabled);
        assert_eq!(options.curve_segments, 12);
    }
}
