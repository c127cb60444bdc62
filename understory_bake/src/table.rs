// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A ready-made store for bake results.

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;

/// Per-node record of owned leaves and nested nodes.
///
/// Implements the "assign and report if changed" half of
/// [`BakeHost`](crate::BakeHost):
///
/// - owned leaves compare as a multiset, so reordering alone is not a change
///   but a different number of repeats is;
/// - nested nodes compare as a sequence, since their order is meaningful
///   downstream.
///
/// A node that was never assigned reads as empty, so assigning empty results
/// to it is not a change either.
///
/// ```
/// use understory_bake::OwnershipTable;
///
/// let mut table = OwnershipTable::<u32, u32>::new();
/// assert!(table.assign_leaves(1, &[10, 11]));
/// assert!(!table.assign_leaves(1, &[11, 10]));
/// assert_eq!(table.leaves(1), &[10, 11]);
///
/// assert!(table.assign_nested(1, &[2, 3]));
/// assert!(table.assign_nested(1, &[3, 2]));
/// assert!(!table.assign_nested(4, &[]));
/// ```
#[derive(Clone, Debug)]
pub struct OwnershipTable<N, L> {
    records: HashMap<N, Record<N, L>>,
}

#[derive(Clone, Debug)]
struct Record<N, L> {
    leaves: Vec<L>,
    nested: Vec<N>,
}

impl<N, L> Record<N, L> {
    fn new() -> Self {
        Self {
            leaves: Vec::new(),
            nested: Vec::new(),
        }
    }
}

impl<N, L> Default for OwnershipTable<N, L>
where
    N: Copy + Eq + Hash,
    L: Copy + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N, L> OwnershipTable<N, L>
where
    N: Copy + Eq + Hash,
    L: Copy + Eq,
{
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    /// Replaces the leaves owned by `node` unless they hold the same members
    /// the same number of times.
    ///
    /// Returns `true` if the record changed.
    pub fn assign_leaves(&mut self, node: N, leaves: &[L]) -> bool {
        let record = self.records.entry(node).or_insert_with(Record::new);
        if same_members(&record.leaves, leaves) {
            return false;
        }
        record.leaves.clear();
        record.leaves.extend_from_slice(leaves);
        true
    }

    /// Replaces the nodes nested in `node` unless they are the same sequence.
    ///
    /// Returns `true` if the record changed.
    pub fn assign_nested(&mut self, node: N, nested: &[N]) -> bool {
        let record = self.records.entry(node).or_insert_with(Record::new);
        if record.nested == nested {
            return false;
        }
        record.nested.clear();
        record.nested.extend_from_slice(nested);
        true
    }

    /// Leaves recorded for `node`; empty if it has no record.
    #[must_use]
    pub fn leaves(&self, node: N) -> &[L] {
        self.records
            .get(&node)
            .map(|r| r.leaves.as_slice())
            .unwrap_or_default()
    }

    /// Nested nodes recorded for `node`; empty if it has no record.
    #[must_use]
    pub fn nested(&self, node: N) -> &[N] {
        self.records
            .get(&node)
            .map(|r| r.nested.as_slice())
            .unwrap_or_default()
    }

    /// Returns `true` if `node` has a record.
    #[must_use]
    pub fn contains(&self, node: N) -> bool {
        self.records.contains_key(&node)
    }

    /// Iterates the nodes that have a record, in arbitrary order.
    pub fn nodes(&self) -> impl Iterator<Item = N> + '_ {
        self.records.keys().copied()
    }

    /// Forgets `node`. Returns `true` if it had a record.
    pub fn remove(&mut self, node: N) -> bool {
        self.records.remove(&node).is_some()
    }

    /// Number of nodes with a record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no node has a record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Forgets every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

/// Multiset equality: every member appears the same number of times in both.
fn same_members<L: Eq>(old: &[L], new: &[L]) -> bool {
    let count = |list: &[L], l: &L| list.iter().filter(|x| *x == l).count();
    old.len() == new.len() && old.iter().all(|l| count(old, l) == count(new, l))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_compare_as_sets() {
        let mut table = OwnershipTable::<u8, u8>::new();
        assert!(!table.assign_leaves(0, &[]));
        assert!(table.contains(0));
        assert!(table.assign_leaves(0, &[1, 2, 3]));
        assert!(!table.assign_leaves(0, &[3, 1, 2]));
        assert_eq!(table.leaves(0), &[1, 2, 3]);
        assert!(table.assign_leaves(0, &[1, 2]));
        assert!(table.assign_leaves(0, &[1, 2, 2]));
        assert!(table.assign_leaves(0, &[1, 1, 2]));
        assert_eq!(table.leaves(0), &[1, 1, 2]);
        assert!(!table.assign_leaves(0, &[2, 1, 1]));
        assert!(table.assign_leaves(0, &[]));
        assert!(table.leaves(0).is_empty());
    }

    #[test]
    fn nested_compare_as_sequences() {
        let mut table = OwnershipTable::<u8, u8>::new();
        assert!(table.assign_nested(0, &[4, 5]));
        assert!(!table.assign_nested(0, &[4, 5]));
        assert!(table.assign_nested(0, &[5, 4]));
        assert_eq!(table.nested(0), &[5, 4]);
    }

    #[test]
    fn missing_records_read_empty() {
        let mut table = OwnershipTable::<u8, u8>::new();
        assert!(table.leaves(9).is_empty());
        assert!(table.nested(9).is_empty());
        assert!(!table.remove(9));

        table.assign_nested(9, &[1]);
        assert_eq!(table.len(), 1);
        assert!(table.remove(9));
        assert!(table.is_empty());
    }
}
