// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node and content identity types.

use core::fmt;

/// Sentinel value indicating "no node" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a node in a [`NodeStore`](super::NodeStore).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a node is destroyed and the slot is reused. A handle
/// is only meaningful with the store that created it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    /// Slot index into the store's arrays.
    pub(crate) idx: u32,
    /// Generation counter, must match the store's generation for this slot.
    pub(crate) generation: u32,
}

impl NodeId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}@gen{})", self.idx, self.generation)
    }
}

/// An opaque reference to a 2D image asset.
///
/// Sprites are loaded and managed externally (e.g. by a renderer's texture
/// atlas). The stage graph passes the value through without interpreting it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteId(pub u32);

impl fmt::Debug for SpriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpriteId({})", self.0)
    }
}

/// An opaque reference to a 3D model asset.
///
/// Meshes are loaded and managed externally. The stage graph passes the value
/// through without interpreting it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub u32);

impl fmt::Debug for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MeshId({})", self.0)
    }
}
