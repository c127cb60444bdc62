// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The ownership and nesting baker.

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashSet;
use understory_path::{HierarchyPath, PathIndex, PathStore};

use crate::error::{BakeError, StructuralViolation};
use crate::host::BakeHost;
use crate::options::{BakeOptions, BlockOrder};

/// Summary of one [`Baker::bake`] call.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BakeResult {
    /// `true` if any node's recorded outputs changed.
    pub changed: bool,
    /// Nodes processed, after dropping `None` entries and repeats.
    pub node_count: usize,
    /// Leaves processed, after dropping repeats.
    pub leaf_count: usize,
    /// Leaves with no node at or above their position.
    pub unclaimed_leaf_count: usize,
    /// Nodes whose recorded outputs changed.
    pub dirty_node_count: usize,
}

#[derive(Copy, Clone, Debug)]
struct Entry<N> {
    node: N,
    path: HierarchyPath,
    /// Position in the caller's list, after filtering.
    position: usize,
}

/// Working set of one bake. Kept between bakes for its capacity only.
#[derive(Debug)]
struct Scratch<N, L> {
    seen: HashSet<N>,
    seen_leaves: HashSet<L>,
    entries: Vec<Entry<N>>,
    /// Leaves not yet claimed, in walk order.
    pool: Vec<(L, HierarchyPath)>,
    /// `block_start[i]..i` holds the descendants of scan entry `i`.
    block_start: Vec<usize>,
    owned: Vec<L>,
    owned_end: Vec<usize>,
    nested: Vec<N>,
    nested_end: Vec<usize>,
    sorted: Vec<usize>,
}

impl<N, L> Scratch<N, L>
where
    N: Copy + Eq + Hash,
{
    fn new() -> Self {
        Self {
            seen: HashSet::new(),
            seen_leaves: HashSet::new(),
            entries: Vec::new(),
            pool: Vec::new(),
            block_start: Vec::new(),
            owned: Vec::new(),
            owned_end: Vec::new(),
            nested: Vec::new(),
            nested_end: Vec::new(),
            sorted: Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.seen.clear();
        self.seen_leaves.clear();
        self.entries.clear();
        self.pool.clear();
        self.block_start.clear();
        self.owned.clear();
        self.owned_end.clear();
        self.nested.clear();
        self.nested_end.clear();
        self.sorted.clear();
    }
}

/// Clears the path index and scratch buffers on every exit path, unwinding
/// included.
struct ResetOnDrop<'a, N, L>
where
    N: Copy + Eq + Hash,
{
    index: &'a mut PathIndex<N>,
    scratch: &'a mut Scratch<N, L>,
}

impl<N, L> Drop for ResetOnDrop<'_, N, L>
where
    N: Copy + Eq + Hash,
{
    fn drop(&mut self) {
        self.index.clear();
        self.scratch.reset();
    }
}

/// Assigns leaves to their nearest owning node and finds directly nested
/// nodes, in one pass over a pre-order node list.
///
/// For every node in a bake:
///
/// - its *owned leaves* are the leaves at or below its position that no
///   deeper node claims;
/// - its *nested nodes* are the nodes below it with no other node in between,
///   in walk order.
///
/// Results are computed in full before anything is written, then handed to
/// the host through [`BakeHost`]. An error leaves the host untouched.
///
/// A `Baker` keeps its buffers between bakes to reuse their capacity; no
/// results or paths survive a call. Bakes on one instance are serialized by
/// `&mut self`; use one `Baker` per thread for parallel work.
///
/// # Example
///
/// ```
/// use understory_bake::{BakeHost, Baker, OwnershipTable};
/// use understory_path::Hierarchy;
///
/// // Root 0 has children 1 and 2; 3 is a child of 1.
/// // Nodes 0 and 3 own leaves; leaf 100 sits on element 1, leaf 101 on 3.
/// struct Scene {
///     table: OwnershipTable<u32, u32>,
/// }
///
/// impl Hierarchy<u32> for Scene {
///     fn parent(&self, node: u32) -> Option<u32> {
///         [None, Some(0), Some(0), Some(1)][node as usize]
///     }
///     fn sibling_index(&self, node: u32) -> usize {
///         [0, 0, 1, 0][node as usize]
///     }
/// }
///
/// impl BakeHost<u32, u32> for Scene {
///     fn leaf_host(&self, leaf: u32) -> u32 {
///         if leaf == 100 { 1 } else { 3 }
///     }
///     fn assign_leaves(&mut self, node: u32, leaves: &[u32]) -> bool {
///         self.table.assign_leaves(node, leaves)
///     }
///     fn assign_nested(&mut self, node: u32, nested: &[u32]) -> bool {
///         self.table.assign_nested(node, nested)
///     }
/// }
///
/// let mut scene = Scene { table: OwnershipTable::new() };
/// let mut baker = Baker::new();
/// let result = baker.bake(&mut scene, [0, 3], [100, 101]).unwrap();
///
/// assert!(result.changed);
/// assert_eq!(scene.table.leaves(0), &[100]);
/// assert_eq!(scene.table.leaves(3), &[101]);
/// assert_eq!(scene.table.nested(0), &[3]);
///
/// // Nothing moved, so a second bake changes nothing.
/// assert!(!baker.bake(&mut scene, [0, 3], [100, 101]).unwrap().changed);
/// ```
#[derive(Debug)]
pub struct Baker<N, L>
where
    N: Copy + Eq + Hash,
{
    index: PathIndex<N>,
    options: BakeOptions,
    scratch: Scratch<N, L>,
}

impl<N, L> Default for Baker<N, L>
where
    N: Copy + Eq + Hash,
    L: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N, L> Baker<N, L>
where
    N: Copy + Eq + Hash,
    L: Copy + Eq + Hash,
{
    /// Creates a baker with default [`BakeOptions`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(BakeOptions::default())
    }

    /// Creates a baker with the given options.
    #[must_use]
    pub fn with_options(options: BakeOptions) -> Self {
        Self {
            index: PathIndex::new(),
            options,
            scratch: Scratch::new(),
        }
    }

    /// Returns the current options.
    #[must_use]
    pub fn options(&self) -> BakeOptions {
        self.options
    }

    /// Replaces the options used by future bakes.
    pub fn set_options(&mut self, options: BakeOptions) {
        self.options = options;
    }

    /// Runs one bake.
    ///
    /// `nodes` is a pre-order walk of the owning nodes; `None` entries and
    /// repeated nodes are skipped. `leaves` are the leaves to distribute, in
    /// walk order; repeated leaves are skipped. All nodes must share a root (see
    /// [`Hierarchy`](understory_path::Hierarchy)).
    ///
    /// For each node, [`BakeHost::assign_leaves`] and
    /// [`BakeHost::assign_nested`] are called once, after the whole bake has
    /// been computed. Nodes are committed in reverse scan order, which is walk
    /// order for [`BlockOrder::Verify`] and [`BlockOrder::DebugAssert`] and
    /// path order for [`BlockOrder::Regroup`].
    ///
    /// # Errors
    ///
    /// - [`BakeError::EncodingOverflow`] if a node or leaf host has a sibling
    ///   index too large to encode.
    /// - [`BakeError::StructuralInvariantViolation`] if the node list is not a
    ///   well-formed walk, as configured by [`BakeOptions::block_order`].
    ///
    /// Either way nothing is written to `host`.
    ///
    /// # Panics
    ///
    /// With [`BlockOrder::DebugAssert`], panics in debug builds where
    /// [`BlockOrder::Verify`] would return an error.
    pub fn bake<H, I>(
        &mut self,
        host: &mut H,
        nodes: I,
        leaves: impl IntoIterator<Item = L>,
    ) -> Result<BakeResult, BakeError>
    where
        H: BakeHost<N, L> + ?Sized,
        I: IntoIterator,
        I::Item: Into<Option<N>>,
    {
        let options = self.options;
        let mut guard = ResetOnDrop {
            index: &mut self.index,
            scratch: &mut self.scratch,
        };
        let result = run(guard.index, guard.scratch, options, host, nodes, leaves);
        if let Err(err) = &result {
            tracing::error!(%err, "bake failed");
        }
        result
    }
}

fn run<N, L, H, I>(
    index: &mut PathIndex<N>,
    scratch: &mut Scratch<N, L>,
    options: BakeOptions,
    host: &mut H,
    nodes: I,
    leaves: impl IntoIterator<Item = L>,
) -> Result<BakeResult, BakeError>
where
    N: Copy + Eq + Hash,
    L: Copy + Eq + Hash,
    H: BakeHost<N, L> + ?Sized,
    I: IntoIterator,
    I::Item: Into<Option<N>>,
{
    for node in nodes.into_iter().filter_map(Into::into) {
        if scratch.seen.insert(node) {
            let position = scratch.entries.len();
            let path = index.create(&*host, node)?;
            scratch.entries.push(Entry {
                node,
                path,
                position,
            });
        }
    }
    if scratch.entries.is_empty() {
        tracing::debug!("bake skipped: no nodes");
        return Ok(BakeResult::default());
    }

    for leaf in leaves {
        if scratch.seen_leaves.insert(leaf) {
            let path = index.create(&*host, host.leaf_host(leaf))?;
            scratch.pool.push((leaf, path));
        }
    }
    let leaf_count = scratch.pool.len();

    let store = index.store();
    match options.block_order {
        BlockOrder::Verify | BlockOrder::DebugAssert => scratch.entries.reverse(),
        BlockOrder::Regroup => {
            scratch
                .entries
                .sort_by(|a, b| b.path.compare(&a.path, store));
        }
    }

    scan(scratch, store, host, options);

    match options.block_order {
        BlockOrder::Verify => check_blocks(scratch, store)?,
        BlockOrder::DebugAssert => {
            if cfg!(debug_assertions)
                && let Err(violation) = check_blocks(scratch, store)
            {
                panic!("node list is not a pre-order walk: {violation}");
            }
        }
        BlockOrder::Regroup => check_aliasing(&scratch.entries, store)?,
    }

    let dirty_node_count = commit(scratch, host);
    let result = BakeResult {
        changed: dirty_node_count > 0,
        node_count: scratch.entries.len(),
        leaf_count,
        unclaimed_leaf_count: scratch.pool.len(),
        dirty_node_count,
    };

    if result.unclaimed_leaf_count > 0 {
        tracing::warn!(
            unclaimed = result.unclaimed_leaf_count,
            "leaves have no owning node"
        );
    }
    tracing::debug!(
        nodes = result.node_count,
        leaves = result.leaf_count,
        dirty = result.dirty_node_count,
        changed = result.changed,
        "bake finished"
    );
    Ok(result)
}

/// Computes owned leaves and nested nodes for every entry.
///
/// Entries must be ordered so that descendants come before their ancestors,
/// with each node's descendants directly before it.
fn scan<N, L, H>(
    scratch: &mut Scratch<N, L>,
    store: &PathStore,
    host: &H,
    options: BakeOptions,
) where
    N: Copy + Eq + Hash,
    L: Copy,
    H: BakeHost<N, L> + ?Sized,
{
    let Scratch {
        entries,
        pool,
        block_start,
        owned,
        owned_end,
        nested,
        nested_end,
        ..
    } = scratch;

    for (i, entry) in entries.iter().enumerate() {
        let start = owned.len();
        pool.retain(|(leaf, leaf_path)| {
            if entry.path.is_equal_or_ancestor_of(leaf_path, store) {
                owned.push(*leaf);
                false
            } else {
                true
            }
        });
        if options.order_by_execution {
            owned[start..].sort_by_key(|&leaf| host.execution_order(leaf).unwrap_or(0));
        }
        owned_end.push(owned.len());

        // Walking back from `i` visits the nested nodes in walk order; each
        // one's own block is skipped in a single step.
        let mut j = i;
        while j > 0 && entry.path.is_ancestor_of(&entries[j - 1].path, store) {
            nested.push(entries[j - 1].node);
            j = block_start[j - 1];
        }
        block_start.push(j);
        nested_end.push(nested.len());
    }
}

/// Checks that every entry's block holds all of its descendants and that no
/// two entries share a path.
///
/// Sorting by path lists each subtree as a contiguous run right after its
/// root, which gives the descendant counts to compare against.
fn check_blocks<N, L>(
    scratch: &mut Scratch<N, L>,
    store: &PathStore,
) -> Result<(), StructuralViolation>
where
    N: Copy + Eq + Hash,
{
    let entries = &scratch.entries;
    let sorted = &mut scratch.sorted;
    sorted.clear();
    sorted.extend(0..entries.len());
    sorted.sort_by(|&a, &b| entries[a].path.compare(&entries[b].path, store));

    for pair in sorted.windows(2) {
        let (a, b) = (&entries[pair[0]], &entries[pair[1]]);
        if a.path.equals(&b.path, store) {
            return Err(aliased(a.position, b.position));
        }
    }

    for (rank, &i) in sorted.iter().enumerate() {
        let path = &entries[i].path;
        let expected = sorted[rank + 1..]
            .partition_point(|&k| path.is_ancestor_of(&entries[k].path, store));
        let found = i - scratch.block_start[i];
        if expected != found {
            return Err(StructuralViolation::SplitBlock {
                node: entries[i].position,
                expected,
                found,
            });
        }
    }
    Ok(())
}

/// Entries are already sorted by path here, so equal paths are adjacent.
fn check_aliasing<N>(entries: &[Entry<N>], store: &PathStore) -> Result<(), StructuralViolation> {
    for pair in entries.windows(2) {
        if pair[0].path.equals(&pair[1].path, store) {
            return Err(aliased(pair[0].position, pair[1].position));
        }
    }
    Ok(())
}

fn aliased(a: usize, b: usize) -> StructuralViolation {
    StructuralViolation::AliasedPath {
        first: a.min(b),
        second: a.max(b),
    }
}

/// Hands every entry's results to the host. Returns the number of dirty nodes.
fn commit<N, L, H>(scratch: &Scratch<N, L>, host: &mut H) -> usize
where
    H: BakeHost<N, L> + ?Sized,
    N: Copy,
{
    let mut dirty = 0;
    for (i, entry) in scratch.entries.iter().enumerate().rev() {
        let owned_start = if i == 0 { 0 } else { scratch.owned_end[i - 1] };
        let nested_start = if i == 0 { 0 } else { scratch.nested_end[i - 1] };
        let leaves = &scratch.owned[owned_start..scratch.owned_end[i]];
        let nested = &scratch.nested[nested_start..scratch.nested_end[i]];

        // Both calls always run so each field is written.
        let leaves_changed = host.assign_leaves(entry.node, leaves);
        let nested_changed = host.assign_nested(entry.node, nested);
        if leaves_changed || nested_changed {
            tracing::trace!(position = entry.position, "node outputs changed");
            dirty += 1;
        }
    }
    dirty
}
