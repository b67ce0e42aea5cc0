// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Local and composed node transforms.
//!
//! Transforms are plain display properties rather than matrices: composition
//! along the ancestor chain adds positions and rotations, multiplies scale
//! and alpha percentages, and ANDs visibility. A node's *world* transform is
//! the composition of every transform from the root down to the node, in that
//! order.

use kurbo::Point;

/// Composition contract shared by [`Transform2d`] and [`Transform3d`].
///
/// [`NodeStore`](super::NodeStore) is generic over this trait so that the 2D
/// and 3D trees share one storage and evaluation implementation.
pub trait LocalTransform: Copy + PartialEq + core::fmt::Debug {
    /// The identity transform: visible, untranslated, unrotated, unscaled,
    /// fully opaque.
    const IDENTITY: Self;

    /// Composes `child` under `parent`'s already-composed transform.
    #[must_use]
    fn combined(parent: &Self, child: &Self) -> Self;

    /// Whether this transform contributes visible output.
    fn is_visible(&self) -> bool;
}

/// Display properties of a 2D node.
///
/// Rotation is in degrees (clockwise, wrapped to `[0, 360)` by
/// [`set_rotation`](Self::set_rotation)). Scale and alpha are percentages
/// where `100.0` is the neutral value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform2d {
    /// Whether the node (and its subtree) is visible.
    pub visible: bool,
    /// Position relative to the parent.
    pub position: Point,
    /// Rotation in degrees, clockwise.
    pub rotation: f64,
    /// Horizontal scale percentage.
    pub scale_x: f64,
    /// Vertical scale percentage.
    pub scale_y: f64,
    /// Opacity percentage, `0.0` (transparent) to `100.0` (opaque).
    pub alpha: f64,
}

impl Transform2d {
    /// The identity transform: visible, untranslated, unrotated, unscaled,
    /// fully opaque.
    pub const IDENTITY: Self = Self {
        visible: true,
        position: Point::ZERO,
        rotation: 0.0,
        scale_x: 100.0,
        scale_y: 100.0,
        alpha: 100.0,
    };

    /// Creates a transform translated to `(x, y)`, otherwise identity.
    #[must_use]
    pub const fn from_position(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            ..Self::IDENTITY
        }
    }

    /// Sets the rotation, wrapping the angle into `[0, 360)`.
    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = wrap_degrees(degrees);
    }

    /// Adds to the current rotation, wrapping the result into `[0, 360)`.
    pub fn add_rotation(&mut self, degrees: f64) {
        self.rotation = wrap_degrees(self.rotation + degrees);
    }

    /// Sets the alpha percentage, clamped to `[0, 100]`.
    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha.clamp(0.0, 100.0);
    }

    /// Sets both scale percentages at once.
    pub fn set_scale(&mut self, scale_x: f64, scale_y: f64) {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
    }
}

impl Default for Transform2d {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl LocalTransform for Transform2d {
    const IDENTITY: Self = Self::IDENTITY;

    fn combined(parent: &Self, child: &Self) -> Self {
        Self {
            visible: parent.visible && child.visible,
            position: parent.position + child.position.to_vec2(),
            rotation: wrap_degrees(parent.rotation + child.rotation),
            scale_x: parent.scale_x * child.scale_x / 100.0,
            scale_y: parent.scale_y * child.scale_y / 100.0,
            alpha: parent.alpha * child.alpha / 100.0,
        }
    }

    fn is_visible(&self) -> bool {
        self.visible && self.alpha > 0.0
    }
}

/// Display properties of a 3D node.
///
/// Per-axis rotation is in degrees. Per-axis scale and alpha are percentages
/// where `100.0` is the neutral value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Whether the node (and its subtree) is visible.
    pub visible: bool,
    /// Position relative to the parent, as `[x, y, z]`.
    pub position: [f64; 3],
    /// Rotation in degrees around each axis, as `[x, y, z]`.
    pub rotation: [f64; 3],
    /// Scale percentage along each axis, as `[x, y, z]`.
    pub scale: [f64; 3],
    /// Opacity percentage, `0.0` (transparent) to `100.0` (opaque).
    pub alpha: f64,
}

impl Transform3d {
    /// The identity transform: visible, untranslated, unrotated, unscaled,
    /// fully opaque.
    pub const IDENTITY: Self = Self {
        visible: true,
        position: [0.0; 3],
        rotation: [0.0; 3],
        scale: [100.0; 3],
        alpha: 100.0,
    };

    /// Creates a transform translated to `(x, y, z)`, otherwise identity.
    #[must_use]
    pub const fn from_position(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: [x, y, z],
            ..Self::IDENTITY
        }
    }
}

impl Default for Transform3d {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl LocalTransform for Transform3d {
    const IDENTITY: Self = Self::IDENTITY;

    fn combined(parent: &Self, child: &Self) -> Self {
        let mut position = [0.0; 3];
        let mut rotation = [0.0; 3];
        let mut scale = [0.0; 3];
        for axis in 0..3 {
            position[axis] = parent.position[axis] + child.position[axis];
            rotation[axis] = wrap_degrees(parent.rotation[axis] + child.rotation[axis]);
            scale[axis] = parent.scale[axis] * child.scale[axis] / 100.0;
        }
        Self {
            visible: parent.visible && child.visible,
            position,
            rotation,
            scale,
            alpha: parent.alpha * child.alpha / 100.0,
        }
    }

    fn is_visible(&self) -> bool {
        self.visible && self.alpha > 0.0
    }
}

/// Wraps an angle in degrees into `[0, 360)`.
#[must_use]
pub fn wrap_degrees(degrees: f64) -> f64 {
    let wrapped = degrees % 360.0;
    if wrapped < 0.0 { wrapped + 360.0 } else { wrapped }
}
