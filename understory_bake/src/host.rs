// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The interface between the baker and the host data model.

use understory_path::Hierarchy;

/// Everything a [`Baker`](crate::Baker) needs from the host.
///
/// Structure comes from the [`Hierarchy`] supertrait. Node paths are built
/// from it, and a leaf's path is the path of the element it is attached to.
///
/// Results are written back through [`assign_leaves`](Self::assign_leaves)
/// and [`assign_nested`](Self::assign_nested), which report whether the
/// recorded value changed. [`OwnershipTable`](crate::OwnershipTable)
/// implements both with the usual equality rules and can back a host
/// directly.
pub trait BakeHost<N, L>: Hierarchy<N> {
    /// The element `leaf` is attached to.
    ///
    /// This may be any element of the hierarchy, not only a node in the bake.
    fn leaf_host(&self, leaf: L) -> N;

    /// Execution order of `leaf`, if it has one.
    ///
    /// Used to sort each node's owned leaves when
    /// [`BakeOptions::order_by_execution`](crate::BakeOptions::order_by_execution)
    /// is set. `None` sorts as `0`.
    fn execution_order(&self, leaf: L) -> Option<i32> {
        let _ = leaf;
        None
    }

    /// Records the leaves owned by `node`; returns `true` if they changed.
    fn assign_leaves(&mut self, node: N, leaves: &[L]) -> bool;

    /// Records the nodes directly nested in `node`, in walk order; returns
    /// `true` if they changed.
    fn assign_nested(&mut self, node: N, nested: &[N]) -> bool;
}
