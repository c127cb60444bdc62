// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Memoizing path factory keyed by node.

use core::cmp::Ordering;
use core::hash::Hash;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::error::EncodingOverflow;
use crate::path::{HierarchyPath, INLINE_DEPTH, PathDisplay, PathStore};

/// Structural queries needed to build a node's path.
///
/// A node whose [`parent`](Self::parent) is `None` is the root and encodes as
/// [`HierarchyPath::ROOT`]; its own sibling index is never read. Nodes that
/// are compared with each other must share a root. Hosts with several
/// top-level elements should report a common virtual parent for them.
pub trait Hierarchy<N> {
    /// Returns the parent of `node`, or `None` for the root.
    fn parent(&self, node: N) -> Option<N>;

    /// Returns the position of `node` among its parent's children.
    fn sibling_index(&self, node: N) -> usize;
}

impl<N, H> Hierarchy<N> for &H
where
    H: Hierarchy<N> + ?Sized,
{
    #[inline]
    fn parent(&self, node: N) -> Option<N> {
        (**self).parent(node)
    }

    #[inline]
    fn sibling_index(&self, node: N) -> usize {
        (**self).sibling_index(node)
    }
}

/// Memoizing factory and comparator for [`HierarchyPath`] values.
///
/// The index owns the [`PathStore`] holding chained chunks, so its comparison
/// methods work across chunk boundaries without exposing the store.
///
/// Cached paths describe the tree as it was when they were created. Call
/// [`clear`](Self::clear) before reusing an index after the tree changes.
///
/// # Example
///
/// ```
/// use understory_path::{Hierarchy, PathIndex};
///
/// // 0 is the root; 1 and 2 are its children; 3 is a child of 2.
/// struct Parents;
///
/// impl Hierarchy<u32> for Parents {
///     fn parent(&self, node: u32) -> Option<u32> {
///         match node {
///             1 | 2 => Some(0),
///             3 => Some(2),
///             _ => None,
///         }
///     }
///
///     fn sibling_index(&self, node: u32) -> usize {
///         match node {
///             2 => 1,
///             _ => 0,
///         }
///     }
/// }
///
/// let mut index = PathIndex::new();
/// let two = index.create(&Parents, 2).unwrap();
/// let three = index.create(&Parents, 3).unwrap();
///
/// assert!(index.is_ancestor_of(&two, &three));
/// assert_eq!(index.display(&three).to_string(), "1/0");
/// assert_eq!(index.len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct PathIndex<N> {
    paths: HashMap<N, HierarchyPath>,
    store: PathStore,
}

impl<N> Default for PathIndex<N>
where
    N: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N> PathIndex<N>
where
    N: Copy + Eq + Hash,
{
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            paths: HashMap::new(),
            store: PathStore::new(),
        }
    }

    /// Creates an empty index with room for `capacity` nodes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            paths: HashMap::with_capacity(capacity),
            store: PathStore::new(),
        }
    }

    /// Returns the path of `node`, building and caching it on first request.
    ///
    /// A cached path is returned without consulting `hierarchy`. On
    /// [`EncodingOverflow`] nothing is cached and no chunk is stored.
    pub fn create<H>(&mut self, hierarchy: &H, node: N) -> Result<HierarchyPath, EncodingOverflow>
    where
        H: Hierarchy<N> + ?Sized,
    {
        if let Some(path) = self.paths.get(&node) {
            return Ok(*path);
        }

        // Innermost first.
        let mut levels: SmallVec<[usize; INLINE_DEPTH]> = SmallVec::new();
        let mut current = node;
        while let Some(parent) = hierarchy.parent(current) {
            levels.push(hierarchy.sibling_index(current));
            current = parent;
        }
        levels.reverse();

        let path = HierarchyPath::new(&levels, &mut self.store).inspect_err(|err| {
            tracing::debug!(
                level = err.level,
                sibling_index = err.sibling_index,
                "path encoding overflow"
            );
        })?;
        tracing::trace!(depth = path.depth(), "cached hierarchy path");
        self.paths.insert(node, path);
        Ok(path)
    }

    /// Returns the cached path of `node`, if any.
    #[must_use]
    pub fn get(&self, node: N) -> Option<&HierarchyPath> {
        self.paths.get(&node)
    }

    /// Returns `true` if `node` has a cached path.
    #[must_use]
    pub fn contains(&self, node: N) -> bool {
        self.paths.contains_key(&node)
    }

    /// Returns the number of cached paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns `true` if no paths are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Returns the number of chained chunks held for deep paths.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.store.len()
    }

    /// The chunk store backing this index's paths.
    #[must_use]
    pub fn store(&self) -> &PathStore {
        &self.store
    }

    /// Drops every cached path and chained chunk.
    ///
    /// Paths previously returned by this index must not be compared through
    /// it afterwards. Clearing an empty index is a no-op.
    pub fn clear(&mut self) {
        self.paths.clear();
        self.store.clear();
    }

    /// See [`HierarchyPath::equals`].
    #[must_use]
    pub fn equals(&self, a: &HierarchyPath, b: &HierarchyPath) -> bool {
        a.equals(b, &self.store)
    }

    /// See [`HierarchyPath::compare`].
    #[must_use]
    pub fn compare(&self, a: &HierarchyPath, b: &HierarchyPath) -> Ordering {
        a.compare(b, &self.store)
    }

    /// See [`HierarchyPath::is_ancestor_of`].
    #[must_use]
    pub fn is_ancestor_of(&self, a: &HierarchyPath, b: &HierarchyPath) -> bool {
        a.is_ancestor_of(b, &self.store)
    }

    /// See [`HierarchyPath::is_equal_or_ancestor_of`].
    #[must_use]
    pub fn is_equal_or_ancestor_of(&self, a: &HierarchyPath, b: &HierarchyPath) -> bool {
        a.is_equal_or_ancestor_of(b, &self.store)
    }

    /// See [`HierarchyPath::hash_code`].
    #[must_use]
    pub fn hash_code(&self, path: &HierarchyPath) -> u64 {
        path.hash_code(&self.store)
    }

    /// Sorts `paths` by [`compare`](Self::compare). The sort is stable.
    pub fn sort(&self, paths: &mut [HierarchyPath]) {
        paths.sort_by(|a, b| a.compare(b, &self.store));
    }

    /// See [`HierarchyPath::display`].
    pub fn display<'a>(&'a self, path: &'a HierarchyPath) -> PathDisplay<'a> {
        path.display(&self.store)
    }

    /// See [`HierarchyPath::dump`].
    pub fn dump<'a>(&'a self, path: &'a HierarchyPath) -> PathDisplay<'a> {
        path.dump(&self.store)
    }
}
