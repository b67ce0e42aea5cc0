// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! World-space bounds and point hit-testing for the 2D tree.
//!
//! Both entry points recompute the ancestor chain on demand via
//! [`recalculate_world_transform`](NodeStore::recalculate_world_transform),
//! so they are correct even between mutations and evaluation. Hit-testing
//! inverse-maps the query point into local coordinates, which keeps rotation
//! and non-uniform scale exact instead of approximating with a world-space
//! bounding box.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Rect};

use super::id::NodeId;
use super::node::{Node2d, Shape2d};
use super::store::NodeStore;
use super::transform::Transform2d;

impl NodeStore<Transform2d, Node2d> {
    /// Returns the world-space axis-aligned bounding box of a node.
    ///
    /// Containers and groups return the union of their children's bounds
    /// (a zero-area rect at the node's world position when empty). Text has
    /// no intrinsic extent and also yields a zero-area rect.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn world_bounds(&self, id: NodeId) -> Rect {
        let world = self.recalculate_world_transform(id);
        match self.kind(id) {
            Node2d::Container | Node2d::Group => {
                let mut bounds: Option<Rect> = None;
                for child in self.children(id) {
                    let child_bounds = self.world_bounds(child);
                    bounds = Some(match bounds {
                        Some(acc) => acc.union(child_bounds),
                        None => child_bounds,
                    });
                }
                bounds.unwrap_or_else(|| zero_rect_at(world.position))
            }
            Node2d::Sprite { size, .. } => {
                let local = Rect::new(
                    -size.width / 2.0,
                    -size.height / 2.0,
                    size.width / 2.0,
                    size.height / 2.0,
                );
                map_bounds(&world, local)
            }
            Node2d::Primitive { shape, .. } => map_bounds(&world, shape_bounds(shape)),
            Node2d::Text { .. } => zero_rect_at(world.position),
        }
    }

    /// Returns whether a world-space point hits the node.
    ///
    /// Containers and groups delegate to their children. Lines and text have
    /// no interior and never hit. Visibility is not considered; callers gate
    /// on it separately.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn hit_test(&self, id: NodeId, point: Point) -> bool {
        match self.kind(id) {
            Node2d::Container | Node2d::Group => {
                let mut kids = self.children(id);
                kids.any(|child| self.hit_test(child, point))
            }
            Node2d::Sprite { size, .. } => {
                let world = self.recalculate_world_transform(id);
                match unmap_point(&world, point) {
                    Some(local) => {
                        local.x.abs() <= size.width / 2.0 && local.y.abs() <= size.height / 2.0
                    }
                    None => false,
                }
            }
            Node2d::Primitive { shape, .. } => {
                let world = self.recalculate_world_transform(id);
                match unmap_point(&world, point) {
                    Some(local) => shape_contains(shape, local),
                    None => false,
                }
            }
            Node2d::Text { .. } => false,
        }
    }
}

/// Maps a local point to world space: scale, then rotate, then translate.
fn map_point(world: &Transform2d, local: Point) -> Point {
    let x = local.x * world.scale_x / 100.0;
    let y = local.y * world.scale_y / 100.0;
    let radians = world.rotation.to_radians();
    let (sin, cos) = (radians.sin(), radians.cos());
    Point::new(
        world.position.x + x * cos - y * sin,
        world.position.y + x * sin + y * cos,
    )
}

/// Inverse-maps a world point into local space. Returns `None` when the
/// transform is degenerate (zero scale).
fn unmap_point(world: &Transform2d, point: Point) -> Option<Point> {
    let sx = world.scale_x / 100.0;
    let sy = world.scale_y / 100.0;
    if sx == 0.0 || sy == 0.0 {
        return None;
    }
    let dx = point.x - world.position.x;
    let dy = point.y - world.position.y;
    let radians = (-world.rotation).to_radians();
    let (sin, cos) = (radians.sin(), radians.cos());
    let x = dx * cos - dy * sin;
    let y = dx * sin + dy * cos;
    Some(Point::new(x / sx, y / sy))
}

/// Maps a local-space rect to its world-space bounding box via its corners.
fn map_bounds(world: &Transform2d, local: Rect) -> Rect {
    let corners = [
        map_point(world, Point::new(local.x0, local.y0)),
        map_point(world, Point::new(local.x1, local.y0)),
        map_point(world, Point::new(local.x1, local.y1)),
        map_point(world, Point::new(local.x0, local.y1)),
    ];
    let mut bounds = zero_rect_at(corners[0]);
    for corner in &corners[1..] {
        bounds = bounds.union_pt(*corner);
    }
    bounds
}

fn zero_rect_at(point: Point) -> Rect {
    Rect::new(point.x, point.y, point.x, point.y)
}

fn shape_bounds(shape: &Shape2d) -> Rect {
    match shape {
        Shape2d::Line(line) => Rect::from_points(line.p0, line.p1),
        Shape2d::Rect(rect) => *rect,
        Shape2d::Circle(circle) => Rect::new(
            circle.center.x - circle.radius,
            circle.center.y - circle.radius,
            circle.center.x + circle.radius,
            circle.center.y + circle.radius,
        ),
        Shape2d::Polygon(points) => {
            let mut bounds = points.first().map_or(Rect::ZERO, |p| zero_rect_at(*p));
            for point in points.iter().skip(1) {
                bounds = bounds.union_pt(*point);
            }
            bounds
        }
    }
}

fn shape_contains(shape: &Shape2d, point: Point) -> bool {
    match shape {
        // A line segment has no interior.
        Shape2d::Line(_) => false,
        Shape2d::Rect(rect) => rect.contains(point),
        Shape2d::Circle(circle) => {
            let dx = point.x - circle.center.x;
            let dy = point.y - circle.center.y;
            dx * dx + dy * dy <= circle.radius * circle.radius
        }
        Shape2d::Polygon(points) => polygon_contains(points, point),
    }
}

/// Even-odd ray crossing test.
fn polygon_contains(points: &[Point], point: Point) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (pi, pj) = (points[i], points[j]);
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_crossing = pj.x + (point.y - pj.y) * (pi.x - pj.x) / (pi.y - pj.y);
            if point.x < x_crossing {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
