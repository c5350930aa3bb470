//! Value capabilities: how the table compares and hashes what it stores.

use core::cmp::Ordering;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// Comparator and hash for one value shape.
///
/// Only `compare(..) == Ordering::Equal` decides identity; the ordering
/// itself is never used. `hash` must be deterministic for equal values.
pub trait ValueOps<T: ?Sized> {
    fn compare(&self, a: &T, b: &T) -> Ordering;
    fn hash(&self, value: &T) -> u64;

    #[inline]
    fn matches(&self, a: &T, b: &T) -> bool {
        self.compare(a, b) == Ordering::Equal
    }
}

/// `Ord` for comparison, a `BuildHasher` for hashing.
#[derive(Clone, Debug, Default)]
pub struct DefaultOps<S = DefaultHashBuilder> {
    hasher: S,
}

impl DefaultOps {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S> DefaultOps<S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self { hasher }
    }
}

impl<T, S> ValueOps<T> for DefaultOps<S>
where
    T: ?Sized + Ord + Hash,
    S: BuildHasher,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }

    #[inline]
    fn hash(&self, value: &T) -> u64 {
        self.hasher.hash_one(value)
    }
}

/// Capabilities given as a pair of closures, for values that carry their
/// own notion of identity (a precomputed hash, a key field, ...).
#[derive(Clone)]
pub struct FnOps<C, H> {
    compare: C,
    hash: H,
}

impl<C, H> FnOps<C, H> {
    pub fn new(compare: C, hash: H) -> Self {
        Self { compare, hash }
    }
}

impl<C, H> fmt::Debug for FnOps<C, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnOps")
    }
}

impl<T, C, H> ValueOps<T> for FnOps<C, H>
where
    T: ?Sized,
    C: Fn(&T, &T) -> Ordering,
    H: Fn(&T) -> u64,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.compare)(a, b)
    }

    #[inline]
    fn hash(&self, value: &T) -> u64 {
        (self.hash)(value)
    }
}
