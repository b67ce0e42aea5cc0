// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node kind payloads for the 2D and 3D trees.
//!
//! Kinds are closed enums: renderers match exhaustively, so adding a kind is
//! a deliberate API change rather than a silent extension point.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Circle, Line, Point, Rect, Size};

use super::id::{MeshId, SpriteId};

/// An opaque 24-bit RGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ColorRgb {
    /// Red component.
    pub r: u8,
    /// Green component.
    pub g: u8,
    /// Blue component.
    pub b: u8,
}

impl ColorRgb {
    /// Black.
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };
    /// White.
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Creates a color from its components.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Geometry payload of a 2D primitive node, in local coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape2d {
    /// A line segment.
    Line(Line),
    /// An axis-aligned rectangle.
    Rect(Rect),
    /// A circle.
    Circle(Circle),
    /// A closed polygon defined by its vertices.
    Polygon(Vec<Point>),
}

/// Kind payload of a node in the 2D tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Node2d {
    /// Groups children and contributes no visual output of its own.
    Container,
    /// A lightweight grouping node within a container.
    Group,
    /// Presents an externally managed image, centered on the node's position.
    Sprite {
        /// The image asset to present.
        image: SpriteId,
        /// Intrinsic size of the image, used for bounds and hit-testing.
        size: Size,
    },
    /// A vector shape filled with a solid color.
    Primitive {
        /// Geometry in local coordinates.
        shape: Shape2d,
        /// Fill color.
        color: ColorRgb,
    },
    /// A run of text anchored at the node's position.
    Text {
        /// The text content.
        content: String,
        /// Text color.
        color: ColorRgb,
    },
}

/// A light source in the 3D tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    /// Light color.
    pub color: ColorRgb,
    /// Relative intensity, `1.0` is nominal.
    pub intensity: f64,
}

/// Kind payload of a node in the 3D tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Node3d {
    /// Groups children and contributes no visual output of its own.
    Group,
    /// Presents an externally managed model.
    Mesh(MeshId),
    /// Illuminates the scene.
    Light(Light),
}
