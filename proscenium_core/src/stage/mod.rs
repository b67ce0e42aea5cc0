// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained 2D and 3D stage graphs.
//!
//! A *node* is an element in one of the stage's two trees. Each node has:
//!
//! - An identity ([`NodeId`]) — a generational handle that becomes stale when
//!   the node is destroyed, preventing use-after-free bugs at the API level.
//! - Topology — parent, first-child, and sibling links forming an ordered
//!   tree. A node has at most one parent; [`add_child`](NodeStore::add_child)
//!   re-parents an attached node instead of failing.
//! - A **kind** payload ([`Node2d`] or [`Node3d`]) describing what the node
//!   presents, as a closed enum that renderers match exhaustively.
//! - A **local transform** ([`Transform2d`] or [`Transform3d`]) set by the
//!   caller, and a **world transform** produced by
//!   [`evaluate`](NodeStore::evaluate): the composition of the ancestor
//!   chain (positions add, rotations add, scale/alpha multiply as
//!   percentages, visibility ANDs).
//!
//! Nodes are stored in struct-of-arrays layout with index-based handles for
//! cache-friendly traversal. The [`Stage`] facade bundles the two trees with
//! a background color and offers whole-stage traversal via [`StageVisitor`].
//!
//! # Dirty tracking
//!
//! Property mutations automatically mark the corresponding dirty channel
//! (see [`dirty`]). The channels map to property categories:
//!
//! - **TRANSFORM** — propagates to all descendants, since world transforms
//!   (including effective visibility and alpha) are inherited.
//! - **CONTENT** — local-only; only the modified node is marked.
//! - **TOPOLOGY** — structural changes (add/remove child, create/destroy
//!   node) that trigger a traversal-order rebuild.

pub mod dirty;
mod evaluate;
mod id;
mod node;
mod pick;
mod store;
mod transform;
mod traverse;
mod visit;

pub use evaluate::FrameChanges;
pub use id::{INVALID, MeshId, NodeId, SpriteId};
pub use node::{ColorRgb, Light, Node2d, Node3d, Shape2d};
pub use store::{ChangeBuffer, NodeStore, StageEvent};
pub use transform::{LocalTransform, Transform2d, Transform3d, wrap_degrees};
pub use traverse::Children;
pub use visit::{StageVisitor, VisitFilter};

/// The changes produced by evaluating both stage graphs.
#[derive(Clone, Debug, Default)]
pub struct StageChanges {
    /// Changes in the 2D tree.
    pub graph2d: FrameChanges,
    /// Changes in the 3D tree.
    pub graph3d: FrameChanges,
}

impl StageChanges {
    /// Clears both change sets.
    pub fn clear(&mut self) {
        self.graph2d.clear();
        self.graph3d.clear();
    }
}

/// Everything currently on display: a 2D tree, a 3D tree, and a background
/// color.
///
/// The stage is retained across frames. Scenes mutate it during their
/// updates; the manager evaluates it once per frame so world transforms and
/// change lists are consistent before rendering.
#[derive(Debug, Default)]
pub struct Stage {
    background: ColorRgb,
    graph2d: NodeStore<Transform2d, Node2d>,
    graph3d: NodeStore<Transform3d, Node3d>,
}

impl Stage {
    /// Creates an empty stage with a black background.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the background color.
    #[must_use]
    pub fn background(&self) -> ColorRgb {
        self.background
    }

    /// Sets the background color.
    pub fn set_background(&mut self, color: ColorRgb) {
        self.background = color;
    }

    /// Returns the 2D tree.
    #[must_use]
    pub fn graph2d(&self) -> &NodeStore<Transform2d, Node2d> {
        &self.graph2d
    }

    /// Returns the 2D tree mutably.
    pub fn graph2d_mut(&mut self) -> &mut NodeStore<Transform2d, Node2d> {
        &mut self.graph2d
    }

    /// Returns the 3D tree.
    #[must_use]
    pub fn graph3d(&self) -> &NodeStore<Transform3d, Node3d> {
        &self.graph3d
    }

    /// Returns the 3D tree mutably.
    pub fn graph3d_mut(&mut self) -> &mut NodeStore<Transform3d, Node3d> {
        &mut self.graph3d
    }

    /// Destroys every node in both trees, invalidating all outstanding
    /// handles. Subscribers stay registered.
    ///
    /// Called by the scene manager when the primary scene changes.
    pub fn clear(&mut self) {
        self.graph2d.clear();
        self.graph3d.clear();
    }

    /// Evaluates both trees, recomputing dirty world transforms and
    /// returning the combined change sets.
    pub fn evaluate(&mut self) -> StageChanges {
        let mut changes = StageChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided
    /// buffer to avoid allocation.
    pub fn evaluate_into(&mut self, changes: &mut StageChanges) {
        self.graph2d.evaluate_into(&mut changes.graph2d);
        self.graph3d.evaluate_into(&mut changes.graph3d);
    }

    /// Walks the stage in paint order: background, then the 2D tree, then
    /// the 3D tree, depth-first with parents before children.
    ///
    /// Effectively invisible subtrees are skipped, as are unchanged subtrees
    /// when the visitor asks for [`VisitFilter::ChangedSubtrees`]. World
    /// transforms passed to the visitor are the evaluation cache; call
    /// [`evaluate`](Self::evaluate) first.
    pub fn visit(&self, visitor: &mut dyn StageVisitor) {
        let filter = visitor.visit_filter();
        visitor.draw_background(self.background);
        for root in self.graph2d.roots() {
            self.visit_2d(visitor, filter, root);
        }
        for root in self.graph3d.roots() {
            self.visit_3d(visitor, filter, root);
        }
    }

    fn visit_2d(&self, visitor: &mut dyn StageVisitor, filter: VisitFilter, id: NodeId) {
        if filter == VisitFilter::ChangedSubtrees && !self.graph2d.subtree_changed(id) {
            return;
        }
        let world = self.graph2d.world_transform(id);
        if !world.is_visible() {
            return;
        }
        match self.graph2d.kind(id) {
            Node2d::Container | Node2d::Group => {
                visitor.enter_container(id);
                for child in self.graph2d.children(id) {
                    self.visit_2d(visitor, filter, child);
                }
                visitor.exit_container(id);
            }
            Node2d::Sprite { image, size } => {
                visitor.draw_sprite(id, *image, *size, &world);
            }
            Node2d::Primitive { shape, color } => {
                visitor.draw_primitive(id, shape, *color, &world);
            }
            Node2d::Text { content, color } => {
                visitor.draw_text(id, content, *color, &world);
            }
        }
    }

    fn visit_3d(&self, visitor: &mut dyn StageVisitor, filter: VisitFilter, id: NodeId) {
        if filter == VisitFilter::ChangedSubtrees && !self.graph3d.subtree_changed(id) {
            return;
        }
        let world = self.graph3d.world_transform(id);
        if !world.is_visible() {
            return;
        }
        match self.graph3d.kind(id) {
            Node3d::Group => {
                visitor.enter_group_3d(id);
                for child in self.graph3d.children(id) {
                    self.visit_3d(visitor, filter, child);
                }
                visitor.exit_group_3d(id);
            }
            Node3d::Mesh(mesh) => {
                visitor.draw_mesh(id, *mesh, &world);
            }
            Node3d::Light(light) => {
                visitor.draw_light(id, light, &world);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;

    use super::*;

    /// Records the order of visited nodes by label.
    #[derive(Default)]
    struct RecordingVisitor {
        log: Vec<String>,
        filter: VisitFilter,
    }

    impl StageVisitor for RecordingVisitor {
        fn visit_filter(&self) -> VisitFilter {
            self.filter
        }

        fn draw_background(&mut self, _color: ColorRgb) {
            self.log.push(String::from("background"));
        }

        fn enter_container(&mut self, node: NodeId) {
            self.log.push(alloc::format!("enter {}", node.index()));
        }

        fn exit_container(&mut self, node: NodeId) {
            self.log.push(alloc::format!("exit {}", node.index()));
        }

        fn draw_text(&mut self, _node: NodeId, content: &str, _color: ColorRgb, _world: &Transform2d) {
            self.log.push(alloc::format!("text {content}"));
        }

        fn draw_mesh(&mut self, node: NodeId, _mesh: MeshId, _world: &Transform3d) {
            self.log.push(alloc::format!("mesh {}", node.index()));
        }
    }

    fn text(content: &str) -> Node2d {
        Node2d::Text {
            content: String::from(content),
            color: ColorRgb::WHITE,
        }
    }

    #[test]
    fn visit_order_is_background_then_2d_then_3d() {
        let mut stage = Stage::new();
        let container = stage.graph2d_mut().create_node(Node2d::Container);
        let label = stage.graph2d_mut().create_node(text("hello"));
        stage.graph2d_mut().add_child(container, label);
        let mesh = stage.graph3d_mut().create_node(Node3d::Mesh(MeshId(1)));
        let _ = stage.evaluate();

        let mut visitor = RecordingVisitor::default();
        stage.visit(&mut visitor);

        assert_eq!(
            visitor.log,
            alloc::vec![
                String::from("background"),
                alloc::format!("enter {}", container.index()),
                String::from("text hello"),
                alloc::format!("exit {}", container.index()),
                alloc::format!("mesh {}", mesh.index()),
            ]
        );
    }

    #[test]
    fn invisible_subtrees_are_skipped() {
        let mut stage = Stage::new();
        let container = stage.graph2d_mut().create_node(Node2d::Container);
        let label = stage.graph2d_mut().create_node(text("hidden"));
        stage.graph2d_mut().add_child(container, label);
        stage
            .graph2d_mut()
            .update_transform(container, |t| t.visible = false);
        let _ = stage.evaluate();

        let mut visitor = RecordingVisitor::default();
        stage.visit(&mut visitor);

        assert_eq!(visitor.log, alloc::vec![String::from("background")]);
    }

    #[test]
    fn changed_subtree_filter_limits_traversal() {
        let mut stage = Stage::new();
        let quiet = stage.graph2d_mut().create_node(text("quiet"));
        let busy = stage.graph2d_mut().create_node(text("busy"));
        let _ = stage.evaluate();
        let _ = stage.evaluate();

        stage
            .graph2d_mut()
            .set_transform(busy, Transform2d::from_position(5.0, 5.0));
        let _ = stage.evaluate();

        let mut visitor = RecordingVisitor {
            filter: VisitFilter::ChangedSubtrees,
            ..RecordingVisitor::default()
        };
        stage.visit(&mut visitor);

        assert!(visitor.log.contains(&String::from("text busy")));
        assert!(!visitor.log.contains(&String::from("text quiet")));
        let _ = quiet;
    }

    #[test]
    fn clear_empties_both_trees() {
        let mut stage = Stage::new();
        let a = stage.graph2d_mut().create_node(text("a"));
        let b = stage.graph3d_mut().create_node(Node3d::Mesh(MeshId(0)));
        stage.clear();
        assert!(!stage.graph2d().is_alive(a));
        assert!(!stage.graph3d().is_alive(b));

        let changes = stage.evaluate();
        assert!(changes.graph2d.removed.contains(&a.index()));
        assert!(changes.graph3d.removed.contains(&b.index()));
    }
}
