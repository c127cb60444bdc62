// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Path: materialized-path encoding of tree positions.
//!
//! A [`HierarchyPath`] records where a node sits in a tree as the sibling
//! indices from the root down to the node. Once computed, paths can be
//! compared, ordered, and tested for ancestry without walking the live tree
//! again.
//!
//! - [`HierarchyPath`]: a small `Copy` value with [`INLINE_DEPTH`] inline
//!   levels. Deeper paths continue in chained chunks.
//! - [`PathStore`]: the arena holding chained chunks, addressed by [`ChunkId`].
//! - [`PathIndex`]: memoizes one path per node and owns the store, so callers
//!   can compare deep paths without handling chunk storage themselves.
//! - [`Hierarchy`]: the two structural queries the index needs from a host
//!   tree (parent and sibling index).
//!
//! ## Ordering
//!
//! Paths order lexicographically by level with the first level most
//! significant, and a strict prefix sorts before its extensions. Sorting the
//! paths of a tree therefore yields its pre-order, and every subtree occupies
//! a contiguous run right after its root.
//!
//! ## Example
//!
//! ```rust
//! use understory_path::{HierarchyPath, PathStore};
//!
//! let mut store = PathStore::new();
//! let root = HierarchyPath::ROOT;
//! let a = HierarchyPath::new(&[1], &mut store).unwrap();
//! let b = HierarchyPath::new(&[1, 4], &mut store).unwrap();
//! let c = HierarchyPath::new(&[2], &mut store).unwrap();
//!
//! assert!(root.is_ancestor_of(&a, &store));
//! assert!(a.is_ancestor_of(&b, &store));
//! assert!(!a.is_ancestor_of(&c, &store));
//! assert!(a.compare(&b, &store).is_lt());
//! assert!(b.compare(&c, &store).is_lt());
//! ```
//!
//! ## Encoding limits
//!
//! Each level is stored as a [`SiblingIndex`] (`u16`). Building a path with a
//! larger sibling index fails with [`EncodingOverflow`].
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. The `std` feature only forwards to
//! dependencies.

#![no_std]

extern crate alloc;

mod error;
mod index;
mod path;

pub use error::EncodingOverflow;
pub use index::{Hierarchy, PathIndex};
pub use path::{
    ChunkId, HierarchyPath, INLINE_DEPTH, Levels, MAX_SIBLING_INDEX, PathDisplay, PathStore,
    SiblingIndex,
};
