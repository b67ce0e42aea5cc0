// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{INVALID, NodeId};
use super::store::NodeStore;

/// An iterator over the direct children of a node.
///
/// Created by [`NodeStore::children`].
#[derive(Debug)]
pub struct Children<'a, T, K> {
    store: &'a NodeStore<T, K>,
    current: u32,
}

impl<'a, T, K> Children<'a, T, K> {
    pub(crate) fn new(store: &'a NodeStore<T, K>, first: u32) -> Self {
        Self {
            store,
            current: first,
        }
    }
}

impl<T, K> Iterator for Children<'_, T, K> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.next_sibling[idx as usize];
        Some(NodeId {
            idx,
            generation: self.store.generation[idx as usize],
        })
    }
}
