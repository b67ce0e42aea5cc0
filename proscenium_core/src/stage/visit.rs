// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only stage traversal for renderers.
//!
//! A [`StageVisitor`] receives the stage contents in paint order: background
//! first, then the 2D tree, then the 3D tree, each depth-first with parents
//! before children. Drawing methods receive the node's composed world
//! transform; traversal skips effectively invisible subtrees.
//!
//! All methods have empty default bodies, so a visitor implements only what
//! it draws. The walk itself matches exhaustively on node kinds; adding a
//! kind is a compile-visible change here rather than a silent fallthrough.

use kurbo::Size;

use super::id::{MeshId, NodeId, SpriteId};
use super::node::{ColorRgb, Light, Shape2d};
use super::transform::{Transform2d, Transform3d};

/// Which subtrees a visitor wants to see.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VisitFilter {
    /// Visit every visible node.
    #[default]
    All,
    /// Visit only subtrees in which something changed during the most recent
    /// evaluation. The hint may over-report changes, never under-report, so
    /// retained-mode renderers can use it to limit repaints.
    ChangedSubtrees,
}

/// Receives stage contents in paint order.
///
/// Implemented by renderers and by test doubles that record what would be
/// drawn.
pub trait StageVisitor {
    /// Selects which subtrees to visit. Consulted once per
    /// [`Stage::visit`](super::Stage::visit) call.
    fn visit_filter(&self) -> VisitFilter {
        VisitFilter::All
    }

    /// The stage background color, delivered before any node.
    fn draw_background(&mut self, color: ColorRgb) {
        let _ = color;
    }

    /// Entering a 2D container or group node.
    fn enter_container(&mut self, node: NodeId) {
        let _ = node;
    }

    /// Leaving a 2D container or group node (after its children).
    fn exit_container(&mut self, node: NodeId) {
        let _ = node;
    }

    /// A sprite node, with its image reference and intrinsic size.
    fn draw_sprite(&mut self, node: NodeId, image: SpriteId, size: Size, world: &Transform2d) {
        let _ = (node, image, size, world);
    }

    /// A primitive node, with its geometry and fill color.
    fn draw_primitive(&mut self, node: NodeId, shape: &Shape2d, color: ColorRgb, world: &Transform2d) {
        let _ = (node, shape, color, world);
    }

    /// A text node.
    fn draw_text(&mut self, node: NodeId, content: &str, color: ColorRgb, world: &Transform2d) {
        let _ = (node, content, color, world);
    }

    /// Entering a 3D group node.
    fn enter_group_3d(&mut self, node: NodeId) {
        let _ = node;
    }

    /// Leaving a 3D group node (after its children).
    fn exit_group_3d(&mut self, node: NodeId) {
        let _ = node;
    }

    /// A mesh node.
    fn draw_mesh(&mut self, node: NodeId, mesh: MeshId, world: &Transform3d) {
        let _ = (node, mesh, world);
    }

    /// A light node.
    fn draw_light(&mut self, node: NodeId, light: &Light, world: &Transform3d) {
        let _ = (node, light, world);
    }
}
