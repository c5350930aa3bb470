//! RawTable: structural layer holding the top-level bucket array.
//!
//! Capabilities (`ops`) and memory hooks are passed in per call so the
//! owning map can keep them in separate fields from its guard.

use crate::bucket::Bucket;
use crate::error::GrowError;
use crate::hooks::Hooks;
use crate::ops::ValueOps;
use crate::primes::{self, Growth, PRIMES};

/// Location of a stored value: top-level index, then slot in the bucket.
pub(crate) type Slot = (usize, usize);

#[derive(Debug)]
pub(crate) struct RawTable<T> {
    size: usize,
    capacity_index: u8,
    buckets: Option<Vec<Bucket<T>>>,
}

impl<T> RawTable<T> {
    pub(crate) const fn new() -> Self {
        Self {
            size: 0,
            capacity_index: 0,
            buckets: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.size
    }

    pub(crate) fn capacity(&self) -> usize {
        match self.buckets {
            Some(_) => PRIMES[self.capacity_index as usize],
            None => 0,
        }
    }

    pub(crate) fn buckets(&self) -> &[Bucket<T>] {
        self.buckets.as_deref().unwrap_or(&[])
    }

    /// Value at a slot returned by `locate`.
    pub(crate) fn slot_mut(&mut self, (index, slot): Slot) -> &mut T {
        let buckets = self.buckets.as_deref_mut().unwrap_or_default();
        &mut buckets[index].entries_mut()[slot]
    }

    pub(crate) fn get_mut<O>(&mut self, ops: &O, value: &T) -> Option<&mut T>
    where
        O: ValueOps<T>,
    {
        let at = self.locate(ops, value)?;
        Some(self.slot_mut(at))
    }

    /// Top-level index `value` maps to, if there is an array.
    pub(crate) fn index_of<O>(&self, ops: &O, value: &T) -> Option<usize>
    where
        O: ValueOps<T>,
    {
        let capacity = self.capacity();
        if capacity == 0 {
            return None;
        }
        Some((ops.hash(value) % capacity as u64) as usize)
    }

    pub(crate) fn locate<O>(&self, ops: &O, value: &T) -> Option<Slot>
    where
        O: ValueOps<T>,
    {
        let index = self.index_of(ops, value)?;
        let slot = self.buckets()[index].position(ops, value)?;
        Some((index, slot))
    }

    pub(crate) fn get<O>(&self, ops: &O, value: &T) -> Option<&T>
    where
        O: ValueOps<T>,
    {
        let (index, slot) = self.locate(ops, value)?;
        self.buckets()[index].entries().get(slot)
    }

    /// Grows the top-level array so it has at least `capacity` buckets,
    /// redistributing every stored value.
    ///
    /// A bucket that cannot grow during redistribution loses the value
    /// being placed; the rest of the pass continues and the loss is
    /// reported as `GrowError::Rehash`. The table is then left holding
    /// only what was placed.
    pub(crate) fn ensure_size<O, A>(
        &mut self,
        ops: &O,
        hooks: &A,
        capacity: usize,
    ) -> Result<(), GrowError>
    where
        O: ValueOps<T>,
        A: Hooks,
    {
        let index = match primes::next(capacity, self.buckets.is_some(), self.capacity_index) {
            Growth::NotNeeded => return Ok(()),
            Growth::Exhausted => return Err(GrowError::Exhausted { requested: capacity }),
            Growth::Grow(index) => index,
        };
        let new_capacity = PRIMES[index as usize];
        let mut fresh: Vec<Bucket<T>> = hooks.allocate(new_capacity)?;
        fresh.extend((0..new_capacity).map(|_| Bucket::new()));

        let old = self.buckets.replace(fresh);
        self.capacity_index = index;

        let mut lost = 0;
        if let Some(mut old) = old {
            for bucket in old.iter_mut() {
                for value in bucket.drain() {
                    if self.place(ops, hooks, value).is_err() {
                        lost += 1;
                    }
                }
                bucket.release(hooks);
            }
            hooks.release(old);
        }
        self.size -= lost;
        self.debug_check();
        if lost > 0 {
            return Err(GrowError::Rehash { lost });
        }
        Ok(())
    }

    /// Appends `value` to its bucket without looking for duplicates and
    /// without touching `size`. Lends the values the bucket already held
    /// and the stored one.
    pub(crate) fn place<O, A>(
        &mut self,
        ops: &O,
        hooks: &A,
        value: T,
    ) -> Result<(&mut [T], &mut T), (T, GrowError)>
    where
        O: ValueOps<T>,
        A: Hooks,
    {
        let bucket = match (self.index_of(ops, &value), self.buckets.as_mut()) {
            (Some(index), Some(buckets)) => buckets.get_mut(index),
            _ => None,
        };
        match bucket {
            Some(bucket) => bucket.push(hooks, value),
            None => Err((value, GrowError::Exhausted { requested: 0 })),
        }
    }

    /// `place`, counting the value into `size`.
    pub(crate) fn insert<O, A>(
        &mut self,
        ops: &O,
        hooks: &A,
        value: T,
    ) -> Result<(&mut [T], &mut T), (T, GrowError)>
    where
        O: ValueOps<T>,
        A: Hooks,
    {
        let bucket = match (self.index_of(ops, &value), self.buckets.as_mut()) {
            (Some(index), Some(buckets)) => buckets.get_mut(index),
            _ => None,
        };
        let Some(bucket) = bucket else {
            return Err((value, GrowError::Exhausted { requested: 0 }));
        };
        let placed = bucket.push(hooks, value)?;
        self.size += 1;
        Ok(placed)
    }

    pub(crate) fn remove<O>(&mut self, ops: &O, value: &T) -> Option<T>
    where
        O: ValueOps<T>,
    {
        let (index, slot) = self.locate(ops, value)?;
        let removed = self.buckets.as_mut()?.get_mut(index)?.remove(slot)?;
        self.size -= 1;
        Some(removed)
    }

    /// Releases every bucket array, then the top-level array, and resets
    /// to the empty state.
    pub(crate) fn destroy<A: Hooks>(&mut self, hooks: &A) {
        if let Some(mut buckets) = self.buckets.take() {
            for bucket in buckets.iter_mut() {
                bucket.release(hooks);
            }
            hooks.release(buckets);
        }
        self.size = 0;
        self.capacity_index = 0;
    }

    #[inline]
    fn debug_check(&self) {
        debug_assert_eq!(
            self.buckets().iter().map(Bucket::len).sum::<usize>(),
            self.size,
            "bucket sizes out of step with table size"
        );
        debug_assert!(self.capacity() == 0 || primes::is_prime_capacity(self.capacity()));
        debug_assert!(self
            .buckets()
            .iter()
            .all(|b| b.capacity() == 0 || primes::is_prime_capacity(b.capacity())));
    }
}
