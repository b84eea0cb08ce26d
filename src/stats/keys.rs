//! Typed group keys for multi-dimensional aggregation.
//!
//! A cell's identity is a tuple of these keys, depth bin first. Using
//! tagged variants instead of stringly-typed predicates keeps the key
//! space enumerable and hashable.

use serde::Serialize;

/// One component of a cell's group-key tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    /// Bin index into the depth grid
    Depth(usize),

    /// Bin index into one of the secondary covariate axes
    Covariate {
        /// Position of the axis in the grouping's covariate list
        axis: usize,
        /// Bin index within that axis
        bin: usize,
    },
}

impl GroupKey {
    /// The bin index, regardless of key type
    pub fn bin(&self) -> usize {
        match self {
            GroupKey::Depth(bin) => *bin,
            GroupKey::Covariate { bin, .. } => *bin,
        }
    }
}
