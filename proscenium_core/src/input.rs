// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame input snapshot.
//!
//! The core never polls devices. Before each frame the host fills an
//! [`InputState`] from whatever input mechanism it has, and scenes query it
//! synchronously through the context during their updates. The snapshot is
//! plain data; there is no event queue and no drained-once semantics.

use alloc::vec::Vec;

use kurbo::Point;

/// One pointer (mouse cursor, touch, pen) as observed this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pointer {
    /// Position in stage coordinates.
    pub position: Point,
    /// Whether the pointer was released during this frame.
    pub released: bool,
}

/// Everything the host observed from input devices for the current frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputState {
    pointers: Vec<Pointer>,
}

impl InputState {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the pointer list for this frame.
    pub fn set_pointers(&mut self, pointers: Vec<Pointer>) {
        self.pointers = pointers;
    }

    /// Adds one pointer observation.
    pub fn push_pointer(&mut self, pointer: Pointer) {
        self.pointers.push(pointer);
    }

    /// Removes all observations.
    pub fn clear(&mut self) {
        self.pointers.clear();
    }

    /// Returns all pointers observed this frame.
    #[must_use]
    pub fn pointers(&self) -> &[Pointer] {
        &self.pointers
    }

    /// Returns the positions of pointers released this frame.
    pub fn release_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.pointers
            .iter()
            .filter(|p| p.released)
            .map(|p| p.position)
    }
}
