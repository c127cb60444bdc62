// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for path construction.

use core::fmt;

use crate::path::SiblingIndex;

/// Error returned when a sibling index does not fit the path encoding.
///
/// Every level of a [`HierarchyPath`](crate::HierarchyPath) is stored as a
/// [`SiblingIndex`]. Construction fails before anything is allocated, so a
/// failed [`PathIndex::create`](crate::PathIndex::create) leaves the index
/// exactly as it was.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EncodingOverflow {
    /// Level (0 is the first level below the root) holding the bad index.
    pub level: usize,
    /// The sibling index that did not fit.
    pub sibling_index: usize,
}

impl fmt::Display for EncodingOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sibling index {} at level {} exceeds the {}-bit path encoding",
            self.sibling_index,
            self.level,
            SiblingIndex::BITS
        )
    }
}

impl core::error::Error for EncodingOverflow {}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::string::ToString;

    use super::*;

    #[test]
    fn display_names_level_and_width() {
        let err = EncodingOverflow {
            level: 3,
            sibling_index: 65_536,
        };
        assert_eq!(
            err.to_string(),
            "sibling index 65536 at level 3 exceeds the 16-bit path encoding"
        );
    }
}
