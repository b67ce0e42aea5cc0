// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The stage graph uses multi-channel dirty tracking (via [`understory_dirty`])
//! to efficiently propagate invalidation through the node tree. Each channel
//! represents an independent category of change.
//!
//! # Propagation semantics
//!
//! - **Propagating** — [`TRANSFORM`] uses
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) and has dependency edges
//!   from child to parent. Marking a parent dirty automatically marks all
//!   descendants, because world transforms (including effective visibility
//!   and alpha, which are part of the composed transform) are inherited
//!   properties.
//!
//! - **Local-only** — [`CONTENT`] is marked with the default policy. Only the
//!   explicitly marked node appears in the drain output, since node payloads
//!   (sprite reference, primitive shape, text) are per-node properties.
//!
//! - **Structural** — [`TOPOLOGY`] is marked on topology mutations
//!   (add/remove child, create/destroy node). It triggers a traversal-order
//!   rebuild during evaluation but does not propagate to descendants.
//!
//! # Consumption
//!
//! Callers never need to query dirty state directly. Each
//! [`NodeStore::evaluate`](super::NodeStore::evaluate) call drains all
//! channels and surfaces the results as [`FrameChanges`](super::FrameChanges),
//! which renderers consume to apply incremental updates.

use understory_dirty::Channel;

/// Local transform changed — requires world transform recomputation for
/// descendants. Visibility and alpha changes are routed through this channel
/// since they are composed alongside position, rotation, and scale.
pub const TRANSFORM: Channel = Channel::new(0);

/// Node payload changed — no propagation needed.
pub const CONTENT: Channel = Channel::new(1);

/// Tree topology changed — triggers traversal order rebuild.
pub const TOPOLOGY: Channel = Channel::new(2);
