//! Collection aliases used throughout the crate.
//!
//! Hash-based collections use `rustc_hash` for fast non-cryptographic hashing;
//! short per-simplex buffers use `smallvec` so that the common case (at most
//! four vertices) never touches the heap.

pub(crate) mod spatial_hash_grid;

use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Optimized `HashMap` for internal lookups (point → index, facet dedup).
///
/// ⚠️ **Not DoS-resistant**: use only with trusted, internal keys.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::core::collections::FastHashMap;
///
/// let mut map: FastHashMap<u64, usize> = FastHashMap::default();
/// map.insert(123, 456);
/// assert_eq!(map.get(&123), Some(&456));
/// ```
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Re-export the Entry enum for `FastHashMap`.
pub use std::collections::hash_map::Entry;

/// Optimized `HashSet` for internal membership tests.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::core::collections::FastHashSet;
///
/// let mut set: FastHashSet<[usize; 3]> = FastHashSet::default();
/// assert!(set.insert([0, 1, 2]));
/// assert!(!set.insert([0, 1, 2]));
/// ```
pub type FastHashSet<T> = FxHashSet<T>;

/// Small-optimized Vec that stays on the stack for up to `N` items.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::core::collections::SmallBuffer;
///
/// let mut slots: SmallBuffer<usize, 4> = SmallBuffer::new();
/// slots.extend([3, 1, 2]);
/// assert!(!slots.spilled());
/// ```
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

/// Inline capacity for the vertex slots of a 3D cell.
pub const MAX_CELL_VERTICES: usize = 4;

/// Creates a `FastHashMap` with pre-allocated capacity.
#[inline]
#[must_use]
pub fn fast_hash_map_with_capacity<K, V>(capacity: usize) -> FastHashMap<K, V> {
    FastHashMap::with_capacity_and_hasher(capacity, FxBuildHasher)
}
