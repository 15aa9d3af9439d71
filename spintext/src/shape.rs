// Copyright 2025 the Spintext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Splitting glyph paths into fillable shapes.
//!
//! Glyph outlines use the TrueType convention: with y pointing up, filled contours run
//! clockwise and the counters cut out of them (the inside of an "O") run counter-clockwise.
//! The orientation of every contour is measured from its geometry, never trusted from metadata.

use kurbo::{BezPath, CubicBez, ParamCurve, PathEl, Point, QuadBez};

/// Number of segments per curve used when measuring the orientation of a contour.
const ORIENTATION_DIVISIONS: usize = 12;

/// A fillable region: one outer contour and the holes cut out of it.
///
/// Each contour is a single subpath, implicitly closed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Shape {
    pub outline: BezPath,
    pub holes: Vec<BezPath>,
}

/// The contours of a [`Shape`] flattened into polygons.
///
/// Polygons are implicitly closed: the last point is never equal to the first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapePoints {
    pub contour: Vec<Point>,
    pub holes: Vec<Vec<Point>>,
}

impl Shape {
    /// A shape without holes.
    pub fn new(outline: BezPath) -> Self {
        Self {
            outline,
            holes: Vec::new(),
        }
    }

    /// Number of contours, counting the outer contour and every hole.
    pub fn contour_count(&self) -> usize {
        1 + self.holes.len()
    }

    /// Flatten the shape, splitting every curve into `divisions` straight segments.
    pub fn extract_points(&self, divisions: usize) -> ShapePoints {
        let ring = |path: &BezPath| {
            let mut points = sample_points(path, divisions);
            if points.len() > 1 && points.first() == points.last() {
                points.pop();
            }
            points
        };
        ShapePoints {
            contour: ring(&self.outline),
            holes: self.holes.iter().map(ring).collect(),
        }
    }
}

/// Resolve every path into shapes.
///
/// Paths are resolved independently of each other, so that overlapping glyphs never cut holes
/// into one another. A path with a single contour always becomes a single shape.
pub fn resolve(paths: &[BezPath]) -> Vec<Shape> {
    let mut shapes = Vec::with_capacity(paths.len());
    for path in paths {
        resolve_path(path, &mut shapes);
    }
    shapes
}

struct Contour {
    path: BezPath,
    points: Vec<Point>,
}

impl Contour {
    /// The point used to decide which solid a hole belongs to.
    fn first_point(&self) -> Point {
        self.points.first().copied().unwrap_or(Point::ZERO)
    }
}

struct Group {
    solid: Contour,
    holes: Vec<Contour>,
}

fn resolve_path(path: &BezPath, shapes: &mut Vec<Shape>) {
    let mut subpaths = split_subpaths(path);
    if subpaths.len() <= 1 {
        shapes.extend(subpaths.pop().map(Shape::new));
        return;
    }

    let contours = subpaths.into_iter().map(|path| {
        let points = sample_points(&path, ORIENTATION_DIVISIONS);
        Contour { path, points }
    });
    let mut groups: Vec<Group> = Vec::new();
    // Holes that appear before their solid, when the path starts with a hole.
    let mut pending: Vec<Contour> = Vec::new();
    // Decided by the orientation of the first contour.
    let mut starts_with_hole = None;
    for contour in contours {
        let solid = is_clockwise(&contour.points);
        let holes_first = *starts_with_hole.get_or_insert(!solid);
        if solid {
            let holes = if holes_first {
                std::mem::take(&mut pending)
            } else {
                Vec::new()
            };
            groups.push(Group {
                solid: contour,
                holes,
            });
        } else if let (false, Some(group)) = (holes_first, groups.last_mut()) {
            group.holes.push(contour);
        } else {
            pending.push(contour);
        }
    }

    if groups.is_empty() {
        // Nothing is filled, so there's nothing to cut holes into.
        shapes.extend(pending.into_iter().map(|c| Shape::new(c.path)));
        return;
    }

    if groups.len() > 1 {
        reassign_holes(&mut groups);
    }
    for orphan in pending {
        let point = orphan.first_point();
        let index = groups
            .iter()
            .position(|g| point_in_polygon(point, &g.solid.points))
            .unwrap_or(groups.len() - 1);
        groups[index].holes.push(orphan);
    }

    shapes.extend(groups.into_iter().map(|group| Shape {
        outline: group.solid.path,
        holes: group.holes.into_iter().map(|h| h.path).collect(),
    }));
}

/// Move holes into the solid which contains them, unless some hole is inside several solids.
fn reassign_holes(groups: &mut [Group]) {
    let mut targets = Vec::with_capacity(groups.len());
    let mut to_change = 0;
    let mut ambiguous = false;
    for (index, group) in groups.iter().enumerate() {
        let mut group_targets = Vec::with_capacity(group.holes.len());
        for hole in &group.holes {
            let point = hole.first_point();
            let mut target = None;
            for (other_index, other) in groups.iter().enumerate() {
                if point_in_polygon(point, &other.solid.points) {
                    if index != other_index {
                        to_change += 1;
                    }
                    if target.is_none() {
                        target = Some(other_index);
                    } else {
                        ambiguous = true;
                    }
                }
            }
            group_targets.push(target.unwrap_or(index));
        }
        targets.push(group_targets);
    }
    if to_change == 0 || ambiguous {
        return;
    }
    let mut moved = Vec::new();
    for (group, group_targets) in groups.iter_mut().zip(targets) {
        moved.extend(group.holes.drain(..).zip(group_targets));
    }
    for (hole, target) in moved {
        groups[target].holes.push(hole);
    }
}

/// Split a path into its subpaths, dropping those which don't draw anything.
fn split_subpaths(path: &BezPath) -> Vec<BezPath> {
    let mut subpaths = Vec::new();
    let mut current = BezPath::new();
    for el in path.elements() {
        if let PathEl::MoveTo(_) = el {
            if current.elements().len() > 1 {
                subpaths.push(std::mem::take(&mut current));
            } else {
                current = BezPath::new();
            }
        }
        current.push(*el);
    }
    if current.elements().len() > 1 {
        subpaths.push(current);
    }
    subpaths
}

/// Flatten a single subpath into points.
///
/// Lines contribute their end points and curves `divisions + 1` evenly spaced samples.
/// Consecutive duplicate points are dropped.
pub(crate) fn sample_points(path: &BezPath, divisions: usize) -> Vec<Point> {
    let divisions = divisions.max(1);
    let mut points = Vec::new();
    let mut start = Point::ZERO;
    let mut current = Point::ZERO;
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                start = p;
                current = p;
            }
            PathEl::LineTo(p) => {
                push_point(&mut points, current);
                push_point(&mut points, p);
                current = p;
            }
            PathEl::QuadTo(p1, p2) => {
                let quad = QuadBez::new(current, p1, p2);
                for i in 0..=divisions {
                    push_point(&mut points, quad.eval(i as f64 / divisions as f64));
                }
                current = p2;
            }
            PathEl::CurveTo(p1, p2, p3) => {
                let cubic = CubicBez::new(current, p1, p2, p3);
                for i in 0..=divisions {
                    push_point(&mut points, cubic.eval(i as f64 / divisions as f64));
                }
                current = p3;
            }
            PathEl::ClosePath => {
                if current != start {
                    push_point(&mut points, current);
                    push_point(&mut points, start);
                }
                current = start;
            }
        }
    }
    points
}

fn push_point(points: &mut Vec<Point>, p: Point) {
    if points.last() != Some(&p) {
        points.push(p);
    }
}

/// Signed area of a polygon, positive when it runs counter-clockwise with y up.
pub(crate) fn signed_area(points: &[Point]) -> f64 {
    let Some(&last) = points.last() else {
        return 0.0;
    };
    let mut area = 0.0;
    let mut p = last;
    for &q in points {
        area += p.x * q.y - q.x * p.y;
        p = q;
    }
    area * 0.5
}

/// Whether a polygon runs clockwise with y up, which marks a filled contour.
pub(crate) fn is_clockwise(points: &[Point]) -> bool {
    signed_area(points) < 0.0
}

/// Even-odd point in polygon test. Points on the boundary count as inside.
pub(crate) fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    let Some(&last) = polygon.last() else {
        return false;
    };
    let mut inside = false;
    let mut prev = last;
    for &next in polygon {
        let (mut low, mut high) = (prev, next);
        prev = next;
        let mut dx = high.x - low.x;
        let mut dy = high.y - low.y;
        if dy.abs() > f64::EPSILON {
            // Not parallel to the x axis.
            if dy < 0.0 {
                std::mem::swap(&mut low, &mut high);
                dx = -dx;
                dy = -dy;
            }
            if point.y < low.y || point.y > high.y {
                continue;
            }
            if point.y == low.y {
                if point.x == low.x {
                    return true;
                }
                // Otherwise the crossing is counted by the neighbouring edge.
            } else {
                let perp = dy * (point.x - low.x) - dx * (point.y - low.y);
                if perp == 0.0 {
                    return true;
                }
                if perp < 0.0 {
                    continue;
                }
                inside = !inside;
            }
        } else {
            // Parallel to the x axis, only matters when the point lies on it.
            if point.y != low.y {
                continue;
            }
            if (high.x <= point.x && point.x <= low.x) || (low.x <= point.x && point.x <= high.x) {
                return true;
            }
        }
    }
    inside
}
