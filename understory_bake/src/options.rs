// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bake configuration.

/// How the baker treats the order of the node list.
///
/// The nested-node scan expects every node's descendants to sit in one
/// contiguous run directly after it, which any pre-order walk provides.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum BlockOrder {
    /// Check the order and fail with
    /// [`BakeError::StructuralInvariantViolation`](crate::BakeError::StructuralInvariantViolation)
    /// if it does not hold.
    ///
    /// The check sorts a copy of the paths, so it costs `O(n log n)`
    /// comparisons on top of the scan.
    #[default]
    Verify,
    /// Panic in debug builds if the order does not hold; skip the check in
    /// release builds.
    DebugAssert,
    /// Sort the nodes by path before scanning, so any walk order is accepted.
    ///
    /// Distinct nodes that share a path are still rejected.
    Regroup,
}

/// Options for [`Baker`](crate::Baker).
///
/// ```
/// use understory_bake::{BakeOptions, BlockOrder};
///
/// let options = BakeOptions::new()
///     .with_block_order(BlockOrder::Regroup)
///     .with_execution_order(false);
/// assert_eq!(options.block_order, BlockOrder::Regroup);
/// assert!(!options.order_by_execution);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BakeOptions {
    /// See [`BlockOrder`].
    pub block_order: BlockOrder,
    /// Sort each node's owned leaves by
    /// [`BakeHost::execution_order`](crate::BakeHost::execution_order).
    ///
    /// Leaves without an execution order sort as `0`. The sort is stable, so
    /// equal orders keep their walk order.
    pub order_by_execution: bool,
}

impl Default for BakeOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl BakeOptions {
    /// Default options: verified block order, leaves sorted by execution order.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            block_order: BlockOrder::Verify,
            order_by_execution: true,
        }
    }

    /// Sets [`block_order`](Self::block_order).
    #[must_use]
    pub const fn with_block_order(mut self, block_order: BlockOrder) -> Self {
        self.block_order = block_order;
        self
    }

    /// Sets [`order_by_execution`](Self::order_by_execution).
    #[must_use]
    pub const fn with_execution_order(mut self, enabled: bool) -> Self {
        self.order_by_execution = enabled;
        self
    }
}
