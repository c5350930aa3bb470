//! Collision bucket: a growable array of values sharing a top-level slot.

use crate::error::GrowError;
use crate::hooks::Hooks;
use crate::ops::ValueOps;
use crate::primes::{self, Growth, PRIMES};

/// Values that hashed to one top-level index.
///
/// Grows along the same prime ladder as the table, independently of it.
/// A bucket that never received a value has no array at all.
#[derive(Debug)]
pub(crate) struct Bucket<T> {
    capacity_index: u8,
    entries: Option<Vec<T>>,
}

impl<T> Bucket<T> {
    pub(crate) const fn new() -> Self {
        Self {
            capacity_index: 0,
            entries: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, Vec::len)
    }

    /// Rung-sized capacity, or 0 without an array.
    pub(crate) fn capacity(&self) -> usize {
        match self.entries {
            Some(_) => PRIMES[self.capacity_index as usize],
            None => 0,
        }
    }

    pub(crate) fn entries(&self) -> &[T] {
        self.entries.as_deref().unwrap_or(&[])
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [T] {
        self.entries.as_deref_mut().unwrap_or_default()
    }

    pub(crate) fn position<O>(&self, ops: &O, value: &T) -> Option<usize>
    where
        O: ValueOps<T>,
    {
        self.entries().iter().position(|e| ops.matches(e, value))
    }

    /// Appends `value`, growing the array first when it is full. Lends the
    /// values that were already there along with the new one; on failure
    /// the value comes back.
    pub(crate) fn push<A>(
        &mut self,
        hooks: &A,
        value: T,
    ) -> Result<(&mut [T], &mut T), (T, GrowError)>
    where
        A: Hooks,
    {
        let len = self.len();
        match primes::next(len + 1, self.entries.is_some(), self.capacity_index) {
            Growth::NotNeeded => {}
            Growth::Exhausted => {
                return Err((value, GrowError::Exhausted { requested: len + 1 }));
            }
            Growth::Grow(index) => {
                let capacity = PRIMES[index as usize];
                let grown = match self.entries.as_mut() {
                    Some(entries) => hooks.resize(entries, capacity),
                    None => hooks.allocate(capacity).map(|e| self.entries = Some(e)),
                };
                if let Err(e) = grown {
                    return Err((value, e.into()));
                }
                self.capacity_index = index;
            }
        }
        let Some(entries) = self.entries.as_mut() else {
            return Err((value, GrowError::Exhausted { requested: len + 1 }));
        };
        entries.push(value);
        let (earlier, new) = entries.split_at_mut(len);
        Ok((earlier, &mut new[0]))
    }

    /// Takes the value at `slot` out, shifting later values left.
    ///
    /// Only this bucket's length changes; keeping the table's count in step
    /// is up to the caller.
    pub(crate) fn remove(&mut self, slot: usize) -> Option<T> {
        let entries = self.entries.as_mut()?;
        if slot < entries.len() {
            Some(entries.remove(slot))
        } else {
            None
        }
    }

    /// Hands the array (and anything still in it) back to `hooks`.
    pub(crate) fn release<A: Hooks>(&mut self, hooks: &A) {
        if let Some(entries) = self.entries.take() {
            hooks.release(entries);
        }
        self.capacity_index = 0;
    }

    /// Moves the values out, keeping the now-empty array in place.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.entries.iter_mut().flat_map(|e| e.drain(..))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{CountingHooks, Global};
    use crate::ops::DefaultOps;

    #[test]
    fn empty_bucket_has_no_array() {
        let b: Bucket<u32> = Bucket::new();
        assert_eq!(b.len(), 0);
        assert_eq!(b.capacity(), 0);
        assert!(b.entries().is_empty());
    }

    #[test]
    fn push_climbs_the_prime_ladder() {
        let mut b = Bucket::new();
        let mut seen = Vec::new();
        for v in 0..14u32 {
            let (earlier, stored) = b.push(&Global, v).unwrap();
            assert_eq!((earlier.len(), *stored), (v as usize, v));
            seen.push(b.capacity());
        }
        assert_eq!(&seen[..1], &[1]);
        assert_eq!(&seen[1..3], &[3, 3]);
        assert_eq!(&seen[3..7], &[7, 7, 7, 7]);
        assert_eq!(seen[7], 13);
        assert_eq!(seen[13], 31);
        assert!(seen.iter().all(|&c| primes::is_prime_capacity(c)));
    }

    #[test]
    fn first_push_allocates_then_resizes() {
        let hooks = CountingHooks::new();
        let mut b = Bucket::new();
        for v in 0..4u32 {
            b.push(&hooks, v).unwrap();
        }
        let s = hooks.stats();
        assert_eq!(s.allocations, 1);
        assert_eq!(s.resizes, 2); // 1 -> 3 -> 7
        b.release(&hooks);
        assert_eq!(hooks.stats().outstanding(), 0);
        assert_eq!(b.capacity(), 0);
    }

    #[test]
    fn failed_growth_returns_the_value() {
        let hooks = CountingHooks::new();
        let mut b = Bucket::new();
        b.push(&hooks, 1u32).unwrap();
        hooks.fail_after(0);
        let (v, e) = b.push(&hooks, 2u32).unwrap_err();
        assert_eq!(v, 2);
        assert!(matches!(e, GrowError::Alloc(_)));
        assert_eq!(b.entries(), &[1]);
        assert_eq!(b.capacity(), 1);
        b.release(&hooks);
    }

    #[test]
    fn remove_compacts_and_keeps_the_array() {
        let mut b = Bucket::new();
        for v in [10u32, 20, 30, 40] {
            b.push(&Global, v).unwrap();
        }
        let ops = DefaultOps::new();
        let slot = b.position(&ops, &20).unwrap();
        assert_eq!(b.remove(slot), Some(20));
        assert_eq!(b.entries(), &[10, 30, 40]);
        assert_eq!(b.capacity(), 7);
        assert_eq!(b.remove(7), None);
        assert_eq!(b.position(&ops, &20), None);
    }

    #[test]
    fn drain_empties_without_releasing() {
        let mut b = Bucket::new();
        b.push(&Global, "a").unwrap();
        b.push(&Global, "b").unwrap();
        let out: Vec<_> = b.drain().collect();
        assert_eq!(out, ["a", "b"]);
        assert_eq!(b.len(), 0);
        assert_eq!(b.capacity(), 3);
    }
}
