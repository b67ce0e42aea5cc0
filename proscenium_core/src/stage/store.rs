// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and property
//! management.
//!
//! One generic store backs both the 2D and 3D trees: the transform type `T`
//! carries composition semantics and the kind type `K` carries per-node
//! payloads. Structural changes are reported three ways, serving different
//! consumers:
//!
//! - per-parent [`ChangeBuffer`]s with drain-once semantics, for systems that
//!   watch a specific node's children;
//! - [`StageEvent`] subscriber callbacks, fired synchronously at mutation
//!   time;
//! - the aggregated [`FrameChanges`](super::FrameChanges) produced by each
//!   [`evaluate`](NodeStore::evaluate) call.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::dirty;
use super::id::{INVALID, NodeId};
use super::transform::LocalTransform;
use super::traverse::Children;

/// A structural change to the node tree, delivered to subscribers at
/// mutation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageEvent {
    /// `child` became a child of `parent`.
    ChildAdded {
        /// The new parent.
        parent: NodeId,
        /// The attached child.
        child: NodeId,
    },
    /// `child` was removed from `parent`.
    ChildRemoved {
        /// The old parent.
        parent: NodeId,
        /// The detached child.
        child: NodeId,
    },
    /// The whole tree was cleared.
    Cleared,
}

/// A buffer of structural changes that is drained exactly once.
///
/// Each parent node carries two of these (added and removed children). The
/// first [`drain`](Self::drain) after a change returns the accumulated
/// entries and leaves the buffer empty, so one consumer observes each change
/// exactly once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChangeBuffer<T> {
    items: Vec<T>,
}

impl<T> ChangeBuffer<T> {
    pub(crate) const fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub(crate) fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }

    /// Takes all accumulated entries, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<T> {
        core::mem::take(&mut self.items)
    }

    /// Returns whether the buffer holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Struct-of-arrays storage for one node tree.
///
/// Nodes are addressed by [`NodeId`] handles. Internally, each node occupies
/// a slot in parallel arrays. Destroyed nodes are recycled via a free list,
/// and generation counters prevent stale handle access.
pub struct NodeStore<T, K> {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties (set by callers) --
    pub(crate) local: Vec<T>,
    pub(crate) kind: Vec<K>,

    // -- Computed properties (written by evaluate) --
    pub(crate) world: Vec<T>,
    pub(crate) subtree_changed: Vec<bool>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Traversal cache --
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
    pub(crate) added_children: Vec<ChangeBuffer<NodeId>>,
    pub(crate) removed_children: Vec<ChangeBuffer<NodeId>>,

    // -- Subscribers --
    observers: Vec<Box<dyn FnMut(&StageEvent)>>,
}

impl<T: fmt::Debug, K: fmt::Debug> fmt::Debug for NodeStore<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeStore")
            .field("len", &self.len)
            .field("free_list", &self.free_list)
            .field("parent", &self.parent)
            .field("local", &self.local)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<T: LocalTransform, K> Default for NodeStore<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: LocalTransform, K> NodeStore<T, K> {
    /// Creates an empty node store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            local: Vec::new(),
            kind: Vec::new(),
            world: Vec::new(),
            subtree_changed: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_dirty: true,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
            added_children: Vec::new(),
            removed_children: Vec::new(),
            observers: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a new node with the given kind and returns its handle.
    ///
    /// The node starts with an identity transform and no parent.
    pub fn create_node(&mut self, kind: K) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            self.generation[idx as usize] += 1;
            self.parent[idx as usize] = INVALID;
            self.first_child[idx as usize] = INVALID;
            self.next_sibling[idx as usize] = INVALID;
            self.prev_sibling[idx as usize] = INVALID;
            self.local[idx as usize] = T::IDENTITY;
            self.kind[idx as usize] = kind;
            self.world[idx as usize] = T::IDENTITY;
            self.subtree_changed[idx as usize] = false;
            self.added_children[idx as usize].clear();
            self.removed_children[idx as usize].clear();
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.local.push(T::IDENTITY);
            self.kind.push(kind);
            self.world.push(T::IDENTITY);
            self.subtree_changed.push(false);
            self.generation.push(0);
            self.added_children.push(ChangeBuffer::new());
            self.removed_children.push(ChangeBuffer::new());
            idx
        };

        self.traversal_dirty = true;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
        self.dirty.mark_with(idx, dirty::TRANSFORM, &EagerPolicy);

        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys a node, freeing its slot for reuse.
    ///
    /// If the node is attached, it is detached first (recorded in the
    /// parent's removed-children buffer like any other detach).
    ///
    /// # Panics
    ///
    /// Panics if the node has children (detach or destroy them first) or if
    /// the handle is stale.
    pub fn destroy_node(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy node with children"
        );

        self.detach_internal(idx);

        // Remove dirty tracking dependencies.
        self.dirty.remove_key(idx);

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;

        self.free_list.push(idx);
        self.traversal_dirty = true;
        self.pending_removed.push(idx);
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Topology API --

    /// Adds `child` as the last child of `parent`.
    ///
    /// If `child` is already attached somewhere, it is detached from its old
    /// parent first, so a node never has more than one parent. Both the
    /// detach and the attach are recorded in the respective parents' change
    /// buffers.
    ///
    /// Marks the `child` subtree's inherited channel so world transforms are
    /// recomputed under the new ancestry.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` is `parent` itself or
    /// one of its ancestors.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            !self.is_ancestor_or_self(c, p),
            "cannot attach a node under its own subtree"
        );

        self.detach_internal(c);

        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            // Walk to last child.
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }

        // Add dirty dependency edge: child depends on parent for TRANSFORM.
        let _ = self.dirty.add_dependency(c, p, dirty::TRANSFORM);

        self.dirty.mark_with(c, dirty::TRANSFORM, &EagerPolicy);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);

        self.added_children[p as usize].push(child);
        self.notify(&StageEvent::ChildAdded { parent, child });
    }

    /// Removes `child` from `parent` if it is currently a child of `parent`.
    ///
    /// Does nothing otherwise (including when `child` is attached elsewhere),
    /// so repeated removal is harmless. The `child` subtree stays alive and
    /// becomes a detached root.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        if self.parent[child.idx as usize] == parent.idx {
            self.detach_internal(child.idx);
        }
    }

    /// Detaches `child` from its parent, if it has one.
    ///
    /// Does nothing for roots, so repeated detachment is harmless. The
    /// `child` subtree stays alive and becomes a detached root.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn detach(&mut self, child: NodeId) {
        self.validate(child);
        self.detach_internal(child.idx);
    }

    /// Moves `child` (and its subtree) under `new_parent`, appended as the
    /// last child. Equivalent to [`add_child`](Self::add_child); provided for
    /// call sites where the move is the point.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if the move would create a cycle.
    pub fn reparent(&mut self, child: NodeId, new_parent: NodeId) {
        self.add_child(new_parent, child);
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        if p == INVALID {
            None
        } else {
            Some(NodeId {
                idx: p,
                generation: self.generation[p as usize],
            })
        }
    }

    /// Returns an iterator over the direct children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_, T, K> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the root nodes (those with no parent).
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        let mut roots = Vec::new();
        for idx in 0..self.len {
            if self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx) {
                roots.push(NodeId {
                    idx,
                    generation: self.generation[idx as usize],
                });
            }
        }
        roots
    }

    /// Returns the ancestor chain of a node, from its root down to (and
    /// including) the node itself.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn find_node_path(&self, id: NodeId) -> Vec<NodeId> {
        self.validate(id);
        let mut path = Vec::new();
        let mut idx = id.idx;
        loop {
            path.push(NodeId {
                idx,
                generation: self.generation[idx as usize],
            });
            idx = self.parent[idx as usize];
            if idx == INVALID {
                break;
            }
        }
        path.reverse();
        path
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns the local transform of a node.
    #[must_use]
    pub fn transform(&self, id: NodeId) -> T {
        self.validate(id);
        self.local[id.idx as usize]
    }

    /// Returns the kind payload of a node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &K {
        self.validate(id);
        &self.kind[id.idx as usize]
    }

    /// Returns the computed world transform of a node.
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called. For an
    /// always-fresh value, use
    /// [`recalculate_world_transform`](Self::recalculate_world_transform).
    #[must_use]
    pub fn world_transform(&self, id: NodeId) -> T {
        self.validate(id);
        self.world[id.idx as usize]
    }

    /// Recomputes and returns the world transform of a node from its current
    /// ancestor chain, ignoring the evaluation cache.
    ///
    /// Does not consume dirty state or update the cache; the next
    /// [`evaluate`](Self::evaluate) still reports the change.
    #[must_use]
    pub fn recalculate_world_transform(&self, id: NodeId) -> T {
        self.validate(id);
        let mut world = T::IDENTITY;
        let mut idx = id.idx;
        let mut chain = Vec::new();
        while idx != INVALID {
            chain.push(idx);
            idx = self.parent[idx as usize];
        }
        for &idx in chain.iter().rev() {
            world = T::combined(&world, &self.local[idx as usize]);
        }
        world
    }

    /// Returns whether anything in the subtree rooted at this node changed
    /// during the most recent [`evaluate`](Self::evaluate).
    ///
    /// This is an optimization hint for visitors; it may over-report after
    /// structural changes, never under-report.
    #[must_use]
    pub fn subtree_changed(&self, id: NodeId) -> bool {
        self.validate(id);
        self.subtree_changed[id.idx as usize]
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets the local transform of a node.
    ///
    /// Marks the TRANSFORM channel dirty with eager propagation to
    /// descendants.
    pub fn set_transform(&mut self, id: NodeId, transform: T) {
        self.validate(id);
        self.local[id.idx as usize] = transform;
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Mutates the local transform of a node in place.
    ///
    /// Marks the TRANSFORM channel dirty with eager propagation to
    /// descendants.
    pub fn update_transform(&mut self, id: NodeId, f: impl FnOnce(&mut T)) {
        self.validate(id);
        f(&mut self.local[id.idx as usize]);
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Replaces the kind payload of a node.
    ///
    /// Marks the CONTENT channel dirty.
    pub fn set_kind(&mut self, id: NodeId, kind: K) {
        self.validate(id);
        self.kind[id.idx as usize] = kind;
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    // -- Change observation --

    /// Drains the added-children buffer of a parent node.
    ///
    /// Entries accumulate across frames until drained; the drain returns them
    /// exactly once.
    pub fn drain_added_children(&mut self, parent: NodeId) -> Vec<NodeId> {
        self.validate(parent);
        self.added_children[parent.idx as usize].drain()
    }

    /// Drains the removed-children buffer of a parent node.
    ///
    /// Entries accumulate across frames until drained; the drain returns them
    /// exactly once.
    pub fn drain_removed_children(&mut self, parent: NodeId) -> Vec<NodeId> {
        self.validate(parent);
        self.removed_children[parent.idx as usize].drain()
    }

    /// Registers a callback invoked synchronously for every structural
    /// change.
    pub fn subscribe(&mut self, observer: impl FnMut(&StageEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    // -- Bulk teardown --

    /// Destroys every node, invalidating all outstanding handles.
    ///
    /// Subscribers stay registered and receive [`StageEvent::Cleared`]. All
    /// destroyed nodes appear in the next evaluation's `removed` list.
    pub fn clear(&mut self) {
        for idx in 0..self.len {
            if self.free_list.contains(&idx) {
                continue;
            }
            self.dirty.remove_key(idx);
            self.generation[idx as usize] += 1;
            self.parent[idx as usize] = INVALID;
            self.first_child[idx as usize] = INVALID;
            self.next_sibling[idx as usize] = INVALID;
            self.prev_sibling[idx as usize] = INVALID;
            self.added_children[idx as usize].clear();
            self.removed_children[idx as usize].clear();
            self.free_list.push(idx);
            self.pending_removed.push(idx);
        }
        self.pending_added.clear();
        self.traversal_dirty = true;
        self.notify(&StageEvent::Cleared);
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Returns whether `ancestor` is `idx` or one of its ancestors.
    fn is_ancestor_or_self(&self, ancestor: u32, idx: u32) -> bool {
        let mut cur = idx;
        while cur != INVALID {
            if cur == ancestor {
                return true;
            }
            cur = self.parent[cur as usize];
        }
        false
    }

    /// Detaches `idx` from its parent with full bookkeeping: change buffer,
    /// subscriber event, dependency edge, and dirty marks. No-op for roots.
    fn detach_internal(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        if p == INVALID {
            return;
        }

        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];
        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }
        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;

        self.dirty.remove_dependency(idx, p, dirty::TRANSFORM);
        self.dirty.mark_with(idx, dirty::TRANSFORM, &EagerPolicy);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);

        let parent = NodeId {
            idx: p,
            generation: self.generation[p as usize],
        };
        let child = NodeId {
            idx,
            generation: self.generation[idx as usize],
        };
        self.removed_children[p as usize].push(child);
        self.notify(&StageEvent::ChildRemoved { parent, child });
    }

    fn notify(&mut self, event: &StageEvent) {
        for observer in &mut self.observers {
            observer(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;

    use super::*;
    use crate::stage::Transform2d;

    type TestStore = NodeStore<Transform2d, ()>;

    #[test]
    fn create_and_destroy() {
        let mut store = TestStore::new();
        let id = store.create_node(());
        assert!(store.is_alive(id));
        store.destroy_node(id);
        assert!(!store.is_alive(id));
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut store = TestStore::new();
        let id1 = store.create_node(());
        store.destroy_node(id1);
        let id2 = store.create_node(());
        // id2 reuses the same slot but has a different generation.
        assert!(!store.is_alive(id1));
        assert!(store.is_alive(id2));
        assert_eq!(id1.idx, id2.idx);
        assert_ne!(id1.generation, id2.generation);
    }

    #[test]
    fn add_child_and_query() {
        let mut store = TestStore::new();
        let parent = store.create_node(());
        let child1 = store.create_node(());
        let child2 = store.create_node(());

        store.add_child(parent, child1);
        store.add_child(parent, child2);

        assert_eq!(store.parent(child1), Some(parent));
        assert_eq!(store.parent(child2), Some(parent));

        let kids: Vec<_> = store.children(parent).collect();
        assert_eq!(kids, vec![child1, child2]);
    }

    #[test]
    fn add_child_reparents_implicitly() {
        let mut store = TestStore::new();
        let a = store.create_node(());
        let b = store.create_node(());
        let child = store.create_node(());

        store.add_child(a, child);
        store.add_child(b, child);

        assert_eq!(store.parent(child), Some(b));
        assert!(store.children(a).next().is_none());

        // Both sides of the move are recorded.
        assert_eq!(store.drain_removed_children(a), vec![child]);
        assert_eq!(store.drain_added_children(b), vec![child]);
    }

    #[test]
    fn detach_is_idempotent() {
        let mut store = TestStore::new();
        let parent = store.create_node(());
        let child = store.create_node(());
        store.add_child(parent, child);

        store.detach(child);
        assert_eq!(store.parent(child), None);

        // Second detach is a no-op and records nothing.
        store.detach(child);
        assert_eq!(store.drain_removed_children(parent), vec![child]);
    }

    #[test]
    fn remove_child_of_other_parent_is_noop() {
        let mut store = TestStore::new();
        let a = store.create_node(());
        let b = store.create_node(());
        let child = store.create_node(());
        store.add_child(a, child);

        store.remove_child(b, child);
        assert_eq!(store.parent(child), Some(a));
    }

    #[test]
    fn change_buffers_drain_once() {
        let mut store = TestStore::new();
        let parent = store.create_node(());
        let child = store.create_node(());
        store.add_child(parent, child);

        assert_eq!(store.drain_added_children(parent), vec![child]);
        assert!(store.drain_added_children(parent).is_empty());
    }

    #[test]
    fn change_buffers_accumulate_until_drained() {
        let mut store = TestStore::new();
        let parent = store.create_node(());
        let a = store.create_node(());
        let b = store.create_node(());

        store.add_child(parent, a);
        store.add_child(parent, b);
        assert_eq!(store.drain_added_children(parent), vec![a, b]);
    }

    #[test]
    fn find_node_path_runs_root_to_node() {
        let mut store = TestStore::new();
        let root = store.create_node(());
        let mid = store.create_node(());
        let leaf = store.create_node(());
        store.add_child(root, mid);
        store.add_child(mid, leaf);

        assert_eq!(store.find_node_path(leaf), vec![root, mid, leaf]);
        assert_eq!(store.find_node_path(root), vec![root]);
    }

    #[test]
    fn subscribers_observe_structural_changes() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut store = TestStore::new();
        let sink = Rc::clone(&events);
        store.subscribe(move |event| sink.borrow_mut().push(*event));

        let parent = store.create_node(());
        let child = store.create_node(());
        store.add_child(parent, child);
        store.detach(child);

        let seen = events.borrow();
        assert_eq!(
            *seen,
            vec![
                StageEvent::ChildAdded { parent, child },
                StageEvent::ChildRemoved { parent, child },
            ]
        );
    }

    #[test]
    fn clear_invalidates_handles_and_notifies() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut store = TestStore::new();
        let sink = Rc::clone(&events);
        store.subscribe(move |event| sink.borrow_mut().push(*event));

        let id = store.create_node(());
        store.clear();

        assert!(!store.is_alive(id));
        assert_eq!(store.node_count(), 0);
        assert!(events.borrow().contains(&StageEvent::Cleared));

        // Slots are recycled with fresh generations.
        let reused = store.create_node(());
        assert!(store.is_alive(reused));
        assert!(!store.is_alive(id));
    }

    #[test]
    #[should_panic(expected = "cannot destroy node with children")]
    fn destroy_with_children_panics() {
        let mut store = TestStore::new();
        let parent = store.create_node(());
        let child = store.create_node(());
        store.add_child(parent, child);
        store.destroy_node(parent);
    }

    #[test]
    #[should_panic(expected = "cannot attach a node under its own subtree")]
    fn attach_cycle_panics() {
        let mut store = TestStore::new();
        let parent = store.create_node(());
        let child = store.create_node(());
        store.add_child(parent, child);
        store.add_child(child, parent);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_set_transform() {
        let mut store = TestStore::new();
        let id = store.create_node(());
        store.destroy_node(id);
        store.set_transform(id, Transform2d::IDENTITY);
    }

    #[test]
    fn recalculate_world_transform_is_never_stale() {
        let mut store = TestStore::new();
        let parent = store.create_node(());
        let child = store.create_node(());
        store.add_child(parent, child);

        store.set_transform(parent, Transform2d::from_position(10.0, 20.0));
        store.set_transform(child, Transform2d::from_position(30.0, 40.0));

        // No evaluate has run, but the recalculation reflects the mutations.
        let world = store.recalculate_world_transform(child);
        assert_eq!(world.position, kurbo::Point::new(40.0, 60.0));
    }
}
