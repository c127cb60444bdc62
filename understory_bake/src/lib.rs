// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Bake: single-pass ownership and nesting over a hierarchy.
//!
//! Given a pre-order list of *nodes* (the elements of a hierarchy that own
//! things) and a list of *leaves* (behaviours attached to arbitrary
//! elements), a bake computes for every node:
//!
//! - the leaves it owns: those at or below it with no deeper node in between;
//! - the nodes directly nested beneath it, in walk order;
//! - whether either differs from what the host recorded last time.
//!
//! Positions are compared through [`understory_path`] paths, so the live tree
//! is walked once per node and never during the scan.
//!
//! ## API overview
//!
//! - [`Baker`]: runs bakes and reuses its buffers between them.
//! - [`BakeHost`]: what the baker needs from the host: structure (via
//!   [`understory_path::Hierarchy`]), leaf attachment, optional execution
//!   order, and "assign and report if changed" callbacks.
//! - [`OwnershipTable`]: a ready-made record store implementing the
//!   assignment callbacks.
//! - [`BakeOptions`] / [`BlockOrder`]: how the node order is trusted, checked,
//!   or repaired, and whether owned leaves follow execution order.
//! - [`BakeResult`]: counts and the overall changed flag.
//! - [`BakeError`] / [`StructuralViolation`]: why a bake was aborted.
//!
//! ## Guarantees
//!
//! - A leaf attached exactly at a node's position belongs to that node.
//! - No leaf is owned by two nodes.
//! - Results are computed in full before the host sees any of them; an error
//!   leaves the host untouched.
//! - The path cache and working buffers are cleared when a bake returns or
//!   unwinds. Nothing carries over between bakes except buffer capacity.
//!
//! ## Walk order
//!
//! The nested-node scan needs every node's descendants to directly follow
//! it, which any pre-order walk provides. [`BlockOrder::Verify`] (the default)
//! checks this and reports [`StructuralViolation::SplitBlock`] otherwise;
//! [`BlockOrder::Regroup`] sorts the nodes so any order is accepted.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. The `std` feature only forwards to
//! dependencies.
//!
//! ## Logging
//!
//! Bakes emit [`tracing`] events: a `debug` summary per bake, a `warn` when
//! leaves end up without an owner, an `error` when a bake fails, and `trace`
//! events per changed node. No subscriber is installed.

#![no_std]

extern crate alloc;

mod baker;
mod error;
mod host;
mod options;
mod table;

pub use baker::{BakeResult, Baker};
pub use error::{BakeError, StructuralViolation};
pub use host::BakeHost;
pub use options::{BakeOptions, BlockOrder};
pub use table::OwnershipTable;
