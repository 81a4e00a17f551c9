//! High-performance collection types for triangulation internals.
//!
//! Every map or set keyed on triangulation-internal data (vertex indices,
//! coordinate keys, constraint pairs) uses the fast non-cryptographic hasher;
//! none of those keys are attacker-controlled. Small per-operation buffers
//! (one-ring walks, cavity loops) use stack-allocated vectors with heap
//! fallback.

use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Optimized `HashMap` for performance-critical internal mappings.
/// Uses `rustc_hash::FxHasher`; not DoS-resistant, internal keys only.
///
/// # Examples
///
/// ```rust
/// use ruppert::core::collections::FastHashMap;
///
/// let mut map: FastHashMap<u64, usize> = FastHashMap::default();
/// map.insert(123, 456);
/// ```
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Optimized `HashSet` for membership testing on internal keys.
pub type FastHashSet<T> = FxHashSet<T>;

/// Build hasher instantiating the fast hasher, for capacity helpers.
pub type FastBuildHasher = FxBuildHasher;

/// Small-optimized Vec that stays on the stack up to `N` elements.
///
/// # Size guidelines
///
/// - **N=8**: typical one-ring degrees
/// - **N=16**: cavity boundary loops and tunnel buffers
///
/// # Examples
///
/// ```rust
/// use ruppert::core::collections::SmallBuffer;
///
/// let mut buffer: SmallBuffer<i32, 8> = SmallBuffer::new();
/// buffer.push(42);
/// assert_eq!(buffer.len(), 1);
/// ```
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

/// Creates a [`FastHashMap`] with the given capacity pre-allocated.
#[must_use]
pub fn fast_hash_map_with_capacity<K, V>(capacity: usize) -> FastHashMap<K, V> {
    FastHashMap::with_capacity_and_hasher(capacity, FastBuildHasher::default())
}

/// Creates a [`FastHashSet`] with the given capacity pre-allocated.
#[must_use]
pub fn fast_hash_set_with_capacity<T>(capacity: usize) -> FastHashSet<T> {
    FastHashSet::with_capacity_and_hasher(capacity, FastBuildHasher::default())
}
