// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame evaluation and change tracking.
//!
//! Evaluation follows a drain-recompute pattern for each dirty channel:
//!
//! 1. **TRANSFORM** — Drain dirty indices, recompute each node's world
//!    transform as `combined(parent_world, local)` in parent-before-child
//!    order, and record effective-visibility transitions.
//! 2. **CONTENT** — Drain dirty indices (no recomputation; renderers read
//!    the current kind payloads directly from the store).
//! 3. **TOPOLOGY** — Drain and discard (the traversal order was already
//!    rebuilt at the start of evaluation if needed).
//!
//! Finally the subtree-changed hints are refreshed: a node is flagged when
//! anything in its subtree appeared in this frame's changes, letting
//! visitors skip unchanged subtrees.
//!
//! [`FrameChanges`] uses raw slot indices (`u32`) rather than [`NodeId`]
//! handles so that renderers can index directly into the store's SoA arrays
//! via the `*_at()` accessors without paying for generation checks on every
//! access.
//!
//! [`NodeId`]: super::NodeId

use alloc::vec::Vec;

use super::dirty;
use super::id::INVALID;
use super::store::NodeStore;
use super::transform::LocalTransform;

/// The set of changes produced by a single [`NodeStore::evaluate`] call.
///
/// Each field contains the raw slot indices of nodes that changed in the
/// corresponding category. Renderers use these to apply incremental updates.
#[derive(Clone, Debug, Default)]
pub struct FrameChanges {
    /// Nodes whose world transform was recomputed.
    pub transforms: Vec<u32>,
    /// Nodes whose kind payload changed.
    pub content: Vec<u32>,
    /// Nodes that transitioned from effectively hidden to visible.
    pub shown: Vec<u32>,
    /// Nodes that transitioned from visible to effectively hidden.
    pub hidden: Vec<u32>,
    /// Nodes added since the last evaluate.
    pub added: Vec<u32>,
    /// Nodes removed since the last evaluate.
    pub removed: Vec<u32>,
    /// Whether the tree topology changed (traversal order was rebuilt).
    pub topology_changed: bool,
}

impl FrameChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.transforms.clear();
        self.content.clear();
        self.shown.clear();
        self.hidden.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }

    /// Returns whether no changes were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
            && self.content.is_empty()
            && self.shown.is_empty()
            && self.hidden.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && !self.topology_changed
    }
}

impl<T: LocalTransform, K> NodeStore<T, K> {
    /// Evaluates the node tree, recomputing dirty properties and returning
    /// the set of changes.
    ///
    /// This rebuilds the traversal order if topology changed, then drains
    /// each dirty channel and recomputes world transforms in
    /// parent-before-child order.
    pub fn evaluate(&mut self) -> FrameChanges {
        let mut changes = FrameChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer
    /// to avoid allocation.
    pub fn evaluate_into(&mut self, changes: &mut FrameChanges) {
        changes.clear();

        // Rebuild traversal order if needed.
        if self.traversal_dirty {
            self.rebuild_traversal_order();
            changes.topology_changed = true;
            self.traversal_dirty = false;
        }

        // Drain TRANSFORM channel — collect dirty indices, then recompute.
        let dirty_transforms: Vec<u32> = self
            .dirty
            .drain(dirty::TRANSFORM)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_transforms {
            let parent_idx = self.parent[idx as usize];
            let parent_world = if parent_idx != INVALID {
                self.world[parent_idx as usize]
            } else {
                T::IDENTITY
            };
            let new_world = T::combined(&parent_world, &self.local[idx as usize]);
            let was_visible = self.world[idx as usize].is_visible();
            let now_visible = new_world.is_visible();
            if was_visible != now_visible {
                if now_visible {
                    changes.shown.push(idx);
                } else {
                    changes.hidden.push(idx);
                }
            }
            self.world[idx as usize] = new_world;
        }
        changes.transforms = dirty_transforms;

        // Drain CONTENT channel — no recomputation, just collect.
        changes.content = self
            .dirty
            .drain(dirty::CONTENT)
            .deterministic()
            .run()
            .collect();

        // Drain TOPOLOGY channel (just consume, changes are structural).
        let _: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        // Move lifecycle lists.
        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);

        self.refresh_subtree_hints(changes);
    }

    /// Returns the current traversal order (depth-first pre-order).
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called at least
    /// once.
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    // -- Raw-index accessors for renderers --
    //
    // These accept raw slot indices (as found in `FrameChanges`) rather than
    // `NodeId` handles, skipping generation validation. Only use with indices
    // that came from `FrameChanges` or `traversal_order()`.

    /// Returns the computed world transform at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn world_transform_at(&self, idx: u32) -> T {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.world[idx as usize]
    }

    /// Returns the kind payload at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn kind_at(&self, idx: u32) -> &K {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        &self.kind[idx as usize]
    }

    /// Rebuilds the depth-first pre-order traversal of all live nodes.
    fn rebuild_traversal_order(&mut self) {
        self.traversal_order.clear();
        // Start from roots.
        for idx in 0..self.len {
            if self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx) {
                self.dfs_collect(idx);
            }
        }
    }

    /// Depth-first pre-order collection starting from `idx`.
    fn dfs_collect(&mut self, idx: u32) {
        self.traversal_order.push(idx);
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.dfs_collect(child);
            child = self.next_sibling[child as usize];
        }
    }

    /// Recomputes the per-node subtree-changed hints from this frame's
    /// changes: a changed node flags itself and every ancestor.
    ///
    /// Structural changes flag the whole tree, since a removed child's old
    /// ancestry can no longer be reached from the change lists. Hints may
    /// over-report, never under-report.
    fn refresh_subtree_hints(&mut self, changes: &FrameChanges) {
        if changes.topology_changed {
            for flag in &mut self.subtree_changed {
                *flag = true;
            }
            return;
        }
        for flag in &mut self.subtree_changed {
            *flag = false;
        }
        let listed = changes.transforms.iter().chain(&changes.content);
        for &idx in listed {
            let mut cur = idx;
            while cur != INVALID {
                if self.subtree_changed[cur as usize] {
                    // Ancestors above are already flagged.
                    break;
                }
                self.subtree_changed[cur as usize] = true;
                cur = self.parent[cur as usize];
            }
        }
    }
}
