// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Materialized path values and their chained overflow storage.

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::iter::FusedIterator;

use smallvec::SmallVec;

use crate::error::EncodingOverflow;

/// Number of levels a [`HierarchyPath`] stores inline.
///
/// Deeper paths continue in chunks held by a [`PathStore`], each covering
/// another `INLINE_DEPTH` levels.
pub const INLINE_DEPTH: usize = 10;

/// Encoded width of a single level.
pub type SiblingIndex = u16;

/// Largest sibling index a path can encode.
pub const MAX_SIBLING_INDEX: usize = SiblingIndex::MAX as usize;

/// Handle of a chained chunk inside a [`PathStore`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ChunkId(usize);

impl ChunkId {
    /// Returns this id as an index into the owning store.
    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

/// Arena of chained path chunks.
///
/// A [`HierarchyPath`] deeper than [`INLINE_DEPTH`] refers to its tail by
/// [`ChunkId`]. The store must outlive every path built against it; clearing
/// it invalidates those paths.
#[derive(Clone, Debug, Default)]
pub struct PathStore {
    chunks: Vec<HierarchyPath>,
}

impl PathStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { chunks: Vec::new() }
    }

    /// Creates an empty store with room for `capacity` chunks.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            chunks: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of stored chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns `true` if no chunks are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Returns the chunk for `id`, if it is in range.
    #[must_use]
    pub fn get(&self, id: ChunkId) -> Option<&HierarchyPath> {
        self.chunks.get(id.as_usize())
    }

    /// Drops every chunk, keeping the allocation.
    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    fn push(&mut self, chunk: HierarchyPath) -> ChunkId {
        let id = ChunkId(self.chunks.len());
        self.chunks.push(chunk);
        id
    }
}

/// Position of a node in a tree, as the sibling indices from the root down.
///
/// The root itself is not encoded: it has depth 0 and an empty path, its
/// children have depth 1, and so on. The first [`INLINE_DEPTH`] levels live
/// inline; deeper levels continue in chunks stored in a [`PathStore`]. A chunk
/// is itself a `HierarchyPath` whose depth counts the levels remaining from
/// that chunk downward.
///
/// Paths are ordered lexicographically by level, first level most
/// significant, and a strict prefix sorts before its extensions. That is the
/// pre-order of a tree whose children are visited in sibling order.
///
/// Comparisons that may cross a chunk boundary need the store, which is why
/// this type does not implement `PartialEq`, `Ord`, or `Hash`. Use
/// [`equals`](Self::equals), [`compare`](Self::compare) and
/// [`hash_code`](Self::hash_code), or the same methods on
/// [`PathIndex`](crate::PathIndex).
///
/// ```
/// use understory_path::{HierarchyPath, PathStore};
///
/// let mut store = PathStore::new();
/// let parent = HierarchyPath::new(&[0, 2], &mut store).unwrap();
/// let child = HierarchyPath::new(&[0, 2, 1], &mut store).unwrap();
///
/// assert!(parent.is_ancestor_of(&child, &store));
/// assert!(parent.compare(&child, &store).is_lt());
/// assert_eq!(child.display(&store).to_string(), "0/2/1");
/// ```
#[derive(Copy, Clone, Debug)]
pub struct HierarchyPath {
    depth: usize,
    indices: [SiblingIndex; INLINE_DEPTH],
    next: Option<ChunkId>,
}

impl Default for HierarchyPath {
    fn default() -> Self {
        Self::ROOT
    }
}

impl HierarchyPath {
    /// The path of a root node.
    pub const ROOT: Self = Self {
        depth: 0,
        indices: [0; INLINE_DEPTH],
        next: None,
    };

    /// Builds a path from root-first sibling indices.
    ///
    /// Every level is range-checked before anything is written to `store`,
    /// so an [`EncodingOverflow`] leaves the store untouched.
    pub fn new(levels: &[usize], store: &mut PathStore) -> Result<Self, EncodingOverflow> {
        let mut encoded: SmallVec<[SiblingIndex; 32]> = SmallVec::with_capacity(levels.len());
        for (level, &sibling_index) in levels.iter().enumerate() {
            let index = SiblingIndex::try_from(sibling_index).map_err(|_| EncodingOverflow {
                level,
                sibling_index,
            })?;
            encoded.push(index);
        }

        // Tail first, so every chunk can point at its successor.
        let depth = encoded.len();
        let mut head = Self::ROOT;
        let mut next = None;
        for (i, chunk) in encoded.chunks(INLINE_DEPTH).enumerate().rev() {
            let path = Self::from_chunk(chunk, depth - i * INLINE_DEPTH, next);
            if i == 0 {
                head = path;
            } else {
                next = Some(store.push(path));
            }
        }
        Ok(head)
    }

    fn from_chunk(chunk: &[SiblingIndex], depth: usize, next: Option<ChunkId>) -> Self {
        let mut indices = [0; INLINE_DEPTH];
        indices[..chunk.len()].copy_from_slice(chunk);
        Self {
            depth,
            indices,
            next,
        }
    }

    /// Number of levels below the root.
    #[inline]
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Returns `true` for the root path.
    #[inline]
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.depth == 0
    }

    /// The inline levels, at most [`INLINE_DEPTH`] of them.
    #[inline]
    #[must_use]
    pub fn inline(&self) -> &[SiblingIndex] {
        &self.indices[..self.depth.min(INLINE_DEPTH)]
    }

    /// The chunk holding the levels after the inline ones, if any.
    #[inline]
    #[must_use]
    pub const fn next(&self) -> Option<ChunkId> {
        self.next
    }

    /// Iterates every level root-first, following chained chunks in `store`.
    pub fn levels<'a>(&'a self, store: &'a PathStore) -> Levels<'a> {
        Levels {
            store,
            chunk: self,
            pos: 0,
            remaining: self.depth,
        }
    }

    /// Returns `true` if both paths name the same position.
    #[must_use]
    pub fn equals(&self, other: &Self, store: &PathStore) -> bool {
        if self.depth != other.depth || self.inline() != other.inline() {
            return false;
        }
        self.next.is_none() || self.levels(store).eq(other.levels(store))
    }

    /// Orders paths lexicographically by level; a strict prefix sorts first.
    #[must_use]
    pub fn compare(&self, other: &Self, store: &PathStore) -> Ordering {
        if self.next.is_none() && other.next.is_none() {
            return self.inline().cmp(other.inline());
        }
        self.levels(store).cmp(other.levels(store))
    }

    /// Returns `true` if `self` is a proper ancestor of `other`.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self, store: &PathStore) -> bool {
        self.depth < other.depth && self.is_prefix_of(other, store)
    }

    /// Returns `true` if `self` equals `other` or is one of its ancestors.
    #[must_use]
    pub fn is_equal_or_ancestor_of(&self, other: &Self, store: &PathStore) -> bool {
        self.depth <= other.depth && self.is_prefix_of(other, store)
    }

    // Callers guarantee `self.depth <= other.depth`.
    fn is_prefix_of(&self, other: &Self, store: &PathStore) -> bool {
        if self.next.is_none() {
            return other.inline().starts_with(self.inline());
        }
        self.levels(store)
            .zip(other.levels(store))
            .all(|(a, b)| a == b)
    }

    /// Polynomial rolling hash over every level and the depth.
    ///
    /// Equal paths hash identically no matter which chunks hold their tails.
    #[must_use]
    pub fn hash_code(&self, store: &PathStore) -> u64 {
        let mut hash: u64 = 17;
        for level in self.levels(store) {
            hash = hash.wrapping_mul(31).wrapping_add(u64::from(level) + 1);
        }
        let depth = u64::try_from(self.depth).unwrap_or(u64::MAX);
        hash.wrapping_mul(31).wrapping_add(depth)
    }

    /// Renders the inline levels, `/`-joined, with a `.../[n]` marker for the
    /// `n` levels that live in chained chunks.
    ///
    /// The root renders as `/`. This is for logs, not a serialization format.
    pub fn display<'a>(&'a self, store: &'a PathStore) -> PathDisplay<'a> {
        PathDisplay {
            path: self,
            store,
            full: false,
        }
    }

    /// Renders every level, chained chunks included.
    pub fn dump<'a>(&'a self, store: &'a PathStore) -> PathDisplay<'a> {
        PathDisplay {
            path: self,
            store,
            full: true,
        }
    }
}

/// Iterator over the levels of a [`HierarchyPath`].
///
/// Created by [`HierarchyPath::levels`]. Stops early if a chunk is missing
/// from the store.
#[derive(Clone, Debug)]
pub struct Levels<'a> {
    store: &'a PathStore,
    chunk: &'a HierarchyPath,
    pos: usize,
    remaining: usize,
}

impl Iterator for Levels<'_> {
    type Item = SiblingIndex;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        if self.pos == INLINE_DEPTH {
            let Some(chunk) = self.chunk.next.and_then(|id| self.store.get(id)) else {
                self.remaining = 0;
                return None;
            };
            self.chunk = chunk;
            self.pos = 0;
        }
        let level = self.chunk.indices[self.pos];
        self.pos += 1;
        self.remaining -= 1;
        Some(level)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl FusedIterator for Levels<'_> {}

/// [`Display`](fmt::Display) adapter returned by [`HierarchyPath::display`]
/// and [`HierarchyPath::dump`].
#[derive(Clone, Debug)]
pub struct PathDisplay<'a> {
    path: &'a HierarchyPath,
    store: &'a PathStore,
    full: bool,
}

impl fmt::Display for PathDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            return f.write_str("/");
        }
        let shown = if self.full {
            self.path.depth
        } else {
            self.path.depth.min(INLINE_DEPTH)
        };
        for (i, level) in self.path.levels(self.store).take(shown).enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{level}")?;
        }
        if !self.full && self.path.depth > INLINE_DEPTH {
            write!(f, "/.../[{}]", self.path.depth - INLINE_DEPTH)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::string::ToString;
    use std::vec::Vec;

    use super::*;

    fn path(levels: &[usize], store: &mut PathStore) -> HierarchyPath {
        HierarchyPath::new(levels, store).unwrap()
    }

    #[test]
    fn root_is_empty_and_unchained() {
        let mut store = PathStore::new();
        let root = path(&[], &mut store);
        assert!(root.is_root());
        assert!(root.inline().is_empty());
        assert_eq!(root.next(), None);
        assert!(store.is_empty());
        assert!(root.equals(&HierarchyPath::ROOT, &store));
    }

    #[test]
    fn exactly_inline_depth_has_no_chain() {
        let mut store = PathStore::new();
        let levels: Vec<usize> = (0..INLINE_DEPTH).collect();
        let p = path(&levels, &mut store);
        assert_eq!(p.depth(), INLINE_DEPTH);
        assert_eq!(p.next(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn one_past_inline_depth_chains_a_single_level() {
        let mut store = PathStore::new();
        let levels: Vec<usize> = (0..=INLINE_DEPTH).collect();
        let p = path(&levels, &mut store);
        assert_eq!(store.len(), 1);
        let tail = store.get(p.next().unwrap()).unwrap();
        assert_eq!(tail.depth(), 1);
        assert_eq!(tail.inline(), &[10]);
        assert_eq!(tail.next(), None);
    }

    #[test]
    fn overflow_leaves_store_untouched() {
        let mut store = PathStore::new();
        let mut levels: Vec<usize> = (0..25).collect();
        levels[22] = MAX_SIBLING_INDEX + 1;
        let err = HierarchyPath::new(&levels, &mut store).unwrap_err();
        assert_eq!(err.level, 22);
        assert_eq!(err.sibling_index, 65_536);
        assert!(store.is_empty());

        levels[22] = MAX_SIBLING_INDEX;
        assert!(HierarchyPath::new(&levels, &mut store).is_ok());
    }

    #[test]
    fn prefix_sorts_before_extension() {
        let mut store = PathStore::new();
        let a = path(&[1], &mut store);
        let b = path(&[1, 0], &mut store);
        let c = path(&[2], &mut store);
        assert_eq!(a.compare(&b, &store), Ordering::Less);
        assert_eq!(b.compare(&c, &store), Ordering::Less);
        assert_eq!(c.compare(&a, &store), Ordering::Greater);
        assert_eq!(a.compare(&a, &store), Ordering::Equal);
    }

    #[test]
    fn ancestor_predicates() {
        let mut store = PathStore::new();
        let a = path(&[3, 1], &mut store);
        let b = path(&[3, 1, 4], &mut store);
        let c = path(&[3, 2, 4], &mut store);

        assert!(a.is_ancestor_of(&b, &store));
        assert!(!b.is_ancestor_of(&a, &store));
        assert!(!a.is_ancestor_of(&a, &store));
        assert!(a.is_equal_or_ancestor_of(&a, &store));
        assert!(!a.is_ancestor_of(&c, &store));
        assert!(HierarchyPath::ROOT.is_ancestor_of(&a, &store));
    }

    #[test]
    fn chained_comparisons_cross_chunk_boundaries() {
        let mut store = PathStore::new();
        let mut levels: Vec<usize> = (0..23).collect();
        let deep = path(&levels, &mut store);
        levels[22] = 30;
        let sibling = path(&levels, &mut store);
        let ancestor = path(&levels[..21], &mut store);

        assert!(!deep.equals(&sibling, &store));
        assert_eq!(deep.compare(&sibling, &store), Ordering::Less);
        assert!(ancestor.is_ancestor_of(&deep, &store));
        assert!(ancestor.is_ancestor_of(&sibling, &store));
        assert!(!deep.is_ancestor_of(&sibling, &store));
    }

    #[test]
    fn equal_chains_in_different_chunks_match() {
        let mut store = PathStore::new();
        let levels: Vec<usize> = (0..15).collect();
        let a = path(&levels, &mut store);
        let b = path(&levels, &mut store);
        assert_ne!(a.next(), b.next());
        assert!(a.equals(&b, &store));
        assert_eq!(a.compare(&b, &store), Ordering::Equal);
        assert_eq!(a.hash_code(&store), b.hash_code(&store));
    }

    #[test]
    fn display_collapses_chained_levels() {
        let mut store = PathStore::new();
        assert_eq!(HierarchyPath::ROOT.display(&store).to_string(), "/");

        let shallow = path(&[0, 12, 3], &mut store);
        assert_eq!(shallow.display(&store).to_string(), "0/12/3");
        assert_eq!(shallow.dump(&store).to_string(), "0/12/3");

        let levels: Vec<usize> = (0..13).collect();
        let deep = path(&levels, &mut store);
        assert_eq!(
            deep.display(&store).to_string(),
            "0/1/2/3/4/5/6/7/8/9/.../[3]"
        );
        assert_eq!(
            deep.dump(&store).to_string(),
            "0/1/2/3/4/5/6/7/8/9/10/11/12"
        );
    }

    #[test]
    fn levels_stop_at_missing_chunk() {
        let mut store = PathStore::new();
        let levels: Vec<usize> = (0..12).collect();
        let p = path(&levels, &mut store);
        store.clear();
        assert_eq!(p.levels(&store).count(), INLINE_DEPTH);
    }
}
