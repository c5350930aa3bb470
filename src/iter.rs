//! Traversal: a borrowing iterator, and a delete-safe one that snapshots
//! each bucket before yielding from it.

use crate::bucket::Bucket;
use crate::hooks::Hooks;
use crate::ops::ValueOps;
use crate::prime_hash_map::PrimeHashMap;
use crate::raw_table::RawTable;
use core::iter::FusedIterator;

/// Iterator over stored values in top-level order, then bucket order.
pub struct Iter<'a, T> {
    buckets: core::slice::Iter<'a, Bucket<T>>,
    current: core::slice::Iter<'a, T>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(table: &'a RawTable<T>) -> Self {
        Self {
            buckets: table.buckets().iter(),
            current: <&[T]>::default().iter(),
            remaining: table.len(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(v) = self.current.next() {
                self.remaining -= 1;
                return Some(v);
            }
            self.current = self.buckets.next()?.entries().iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Delete-safe traversal returned by [`PrimeHashMap::iter_safe`].
///
/// Yields owned copies. A bucket is copied into a reused heap buffer when
/// the pass reaches it, so removals through [`SafeIter::remove`] never
/// disturb what is being yielded. A value removed from a bucket the pass
/// has not reached yet is still yielded when that bucket comes up: a pass
/// over a table of `n` values yields exactly `n` values.
pub struct SafeIter<'a, T, O, A: Hooks> {
    map: &'a mut PrimeHashMap<T, O, A>,
    next_bucket: usize,
    // Current bucket, reversed so `pop` yields in bucket order.
    snapshot: Vec<T>,
    // Removed ahead of the pass, keyed by top-level index.
    deferred: Vec<(usize, T)>,
}

impl<T, O, A> PrimeHashMap<T, O, A>
where
    T: Clone,
    O: ValueOps<T>,
    A: Hooks,
{
    /// Starts a delete-safe pass. Only lookups and removals are reachable
    /// while it lives, so the top-level array cannot be regrown under it.
    pub fn iter_safe(&mut self) -> SafeIter<'_, T, O, A> {
        SafeIter {
            map: self,
            next_bucket: 0,
            snapshot: Vec::new(),
            deferred: Vec::new(),
        }
    }
}

impl<'a, T, O, A> SafeIter<'a, T, O, A>
where
    T: Clone,
    O: ValueOps<T>,
    A: Hooks,
{
    /// Removes a value from the live table; see [`PrimeHashMap::remove`].
    pub fn remove(&mut self, value: &T) -> Option<T> {
        let removed = self.map.remove(value)?;
        if let Some(index) = self.map.bucket_index(&removed) {
            if index >= self.next_bucket {
                self.deferred.push((index, removed.clone()));
            }
        }
        Some(removed)
    }

    /// Whether the live table still holds a value equal to `value`.
    pub fn contains(&self, value: &T) -> bool {
        self.map.contains(value)
    }

    /// Values currently in the live table.
    pub fn table_len(&self) -> usize {
        self.map.len()
    }

    fn load(&mut self, index: usize) {
        self.snapshot.clear();
        let mut i = 0;
        while i < self.deferred.len() {
            if self.deferred[i].0 == index {
                let (_, v) = self.deferred.swap_remove(i);
                self.snapshot.push(v);
            } else {
                i += 1;
            }
        }
        let live = self.map.table.buckets()[index].entries();
        self.snapshot.extend(live.iter().rev().cloned());
    }
}

impl<'a, T, O, A> Iterator for SafeIter<'a, T, O, A>
where
    T: Clone,
    O: ValueOps<T>,
    A: Hooks,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            if let Some(v) = self.snapshot.pop() {
                return Some(v);
            }
            let index = self.next_bucket;
            if index >= self.map.table.buckets().len() {
                return None;
            }
            self.next_bucket += 1;
            self.load(index);
        }
    }
}

impl<T, O, A> FusedIterator for SafeIter<'_, T, O, A>
where
    T: Clone,
    O: ValueOps<T>,
    A: Hooks,
{
}
