// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame synchronization, scene lifecycle, and stage graph for interactive
//! applications.
//!
//! `proscenium_core` provides the foundational data structures for running
//! scene logic at a fixed framerate against a variable-rate host loop, and
//! for managing retained 2D/3D stage graphs with incremental change
//! tracking. It is `no_std` compatible (with `alloc`) and uses array-based
//! struct-of-arrays storage with index handles for cache-friendly traversal.
//!
//! # Architecture
//!
//! The crate is organized around a frame loop that turns host timer
//! callbacks into fixed-step scene updates and incremental stage changes:
//!
//! ```text
//!   Host (timer callback)
//!       │
//!       ▼
//!   FrameSync::request_frame() ──► 0..N fixed steps
//!                                        │
//!                 ┌──────────────────────┘
//!                 ▼
//!   SceneManager::update() ──► Scene callbacks ──► Stage mutations
//!                                                       │
//!                 ┌─────────────────────────────────────┘
//!                 ▼
//!   Stage::evaluate() ──► StageChanges ──► StageVisitor (renderer)
//! ```
//!
//! **[`frame_sync`]** — Decouples application framerate from host refresh
//! rate by accumulating elapsed wall time and emitting zero or more
//! fixed-duration steps per host callback.
//!
//! **[`scene`]** — The [`Scene`](scene::Scene) lifecycle contract
//! (`start`/`update`/`end`/`resize`) and the [`Timer`](scene::Timer)
//! utility.
//!
//! **[`context`]** — [`SceneManager`](context::SceneManager) owns the
//! primary scene, its sub-scenes, and global scenes, and drives their
//! lifecycles in a deterministic order. Scene callbacks receive a
//! [`SceneContext`](context::SceneContext) granting access to the stage,
//! input, canvas, and deferred scene operations.
//!
//! **[`stage`]** — Struct-of-arrays 2D and 3D node trees with generational
//! handles. Local transforms are set by scenes; world transforms are
//! computed by evaluation. Multi-channel dirty tracking via
//! `understory_dirty`: TRANSFORM propagates to descendants, CONTENT is
//! local-only, TOPOLOGY triggers a traversal rebuild.
//!
//! **[`effect`]** — Declarative sub-scenes built from closures: frame
//! handlers, click handlers, and completion conditions, with linked stage
//! nodes cleaned up automatically.
//!
//! **[`input`]** — Per-frame pointer snapshot queryable from scene
//! callbacks.
//!
//! **[`stats`]** — EMA-smoothed frame statistics backing the diagnostics
//! output.
//!
//! **[`time`]** — The [`TickSource`](time::TickSource) trait and scripted
//! clocks for tests and headless runs.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod context;
pub mod effect;
pub mod frame_sync;
pub mod input;
pub mod scene;
pub mod stage;
pub mod stats;
pub mod time;
