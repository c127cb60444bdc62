// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bake errors.

use core::fmt;

use understory_path::EncodingOverflow;

/// Structural problem detected in the node list of a bake.
///
/// These point at the code that walked the hierarchy (a traversal-order bug
/// or a forest without a shared root), not at the data being baked.
/// Positions index the node list after `None` entries and repeats are
/// dropped, in the order the caller supplied it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StructuralViolation {
    /// A node's descendants do not form one contiguous run in the list.
    SplitBlock {
        /// Position of the node whose subtree is split.
        node: usize,
        /// Descendants of the node present in the list.
        expected: usize,
        /// Descendants found in the node's contiguous run.
        found: usize,
    },
    /// Two distinct nodes encode the same path.
    AliasedPath {
        /// Position of the earlier node.
        first: usize,
        /// Position of the later node.
        second: usize,
    },
}

impl fmt::Display for StructuralViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SplitBlock {
                node,
                expected,
                found,
            } => write!(
                f,
                "node at position {node} has {expected} descendants in the list but only {found} are contiguous with it"
            ),
            Self::AliasedPath { first, second } => write!(
                f,
                "nodes at positions {first} and {second} share a path; do they have a common root?"
            ),
        }
    }
}

/// Error returned by [`Baker::bake`](crate::Baker::bake).
///
/// Either variant aborts the bake before anything is written to the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BakeError {
    /// A sibling index did not fit the path encoding.
    EncodingOverflow(EncodingOverflow),
    /// The node list does not describe a well-formed traversal.
    StructuralInvariantViolation(StructuralViolation),
}

impl fmt::Display for BakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EncodingOverflow(err) => write!(f, "bake aborted: {err}"),
            Self::StructuralInvariantViolation(violation) => {
                write!(f, "bake aborted: {violation}")
            }
        }
    }
}

impl core::error::Error for BakeError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::EncodingOverflow(err) => Some(err),
            Self::StructuralInvariantViolation(_) => None,
        }
    }
}

impl From<EncodingOverflow> for BakeError {
    fn from(err: EncodingOverflow) -> Self {
        Self::EncodingOverflow(err)
    }
}

impl From<StructuralViolation> for BakeError {
    fn from(violation: StructuralViolation) -> Self {
        Self::StructuralInvariantViolation(violation)
    }
}
