//! PrimeHashMap: public table with duplicate-resolution policies and a
//! debug reentrancy guard around every operation that calls user code.

use crate::error::{GrowError, PutError};
use crate::hooks::{Global, Hooks};
use crate::iter::Iter;
use crate::ops::{DefaultOps, ValueOps};
use crate::raw_table::RawTable;
use crate::reentrancy::DebugReentrancy;
use core::fmt;
use core::hash::Hash;
use core::mem;

/// What `put` does when an equal value is already stored.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Resolution {
    /// Leave the table alone and hand back the stored value.
    #[default]
    Find,
    /// Overwrite the stored value; the previous one is dropped.
    Replace,
    /// Store the new value and hand the previous one back.
    Swap,
    /// Store the new value next to the existing one (multiset).
    Stack,
}

/// Discriminant of a successful [`PutOutcome`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PutKind {
    Put,
    Found,
    Replaced,
    Swapped,
    Stacked,
}

/// Successful result of [`PrimeHashMap::put`]. Every variant lends the
/// value now living in the table.
#[derive(Debug)]
pub enum PutOutcome<'a, T> {
    /// No equal value existed; the new one was inserted.
    Put(&'a mut T),
    /// An equal value existed and was kept; the caller's value comes back.
    Found { stored: &'a mut T, rejected: T },
    /// An equal value was overwritten in place.
    Replaced(&'a mut T),
    /// An equal value was exchanged for the caller's.
    Swapped { stored: &'a mut T, previous: T },
    /// The caller's value was added alongside an equal one, which is
    /// lent back as `existing`.
    Stacked { stored: &'a mut T, existing: &'a T },
}

impl<'a, T> PutOutcome<'a, T> {
    pub fn kind(&self) -> PutKind {
        match self {
            PutOutcome::Put(_) => PutKind::Put,
            PutOutcome::Found { .. } => PutKind::Found,
            PutOutcome::Replaced(_) => PutKind::Replaced,
            PutOutcome::Swapped { .. } => PutKind::Swapped,
            PutOutcome::Stacked { .. } => PutKind::Stacked,
        }
    }

    pub fn into_stored(self) -> &'a mut T {
        match self {
            PutOutcome::Put(stored)
            | PutOutcome::Found { stored, .. }
            | PutOutcome::Replaced(stored)
            | PutOutcome::Swapped { stored, .. }
            | PutOutcome::Stacked { stored, .. } => stored,
        }
    }
}

/// Two-level hash table: a prime-sized array of buckets, each a small
/// growable array of values.
///
/// `O` supplies comparison and hashing for `T`; `A` supplies memory for
/// the top-level array and every bucket. Dropping the table releases every
/// array through `A`.
pub struct PrimeHashMap<T, O = DefaultOps, A: Hooks = Global> {
    pub(crate) table: RawTable<T>,
    pub(crate) ops: O,
    hooks: A,
    reentrancy: DebugReentrancy,
}

impl<T> PrimeHashMap<T>
where
    T: Ord + Hash,
{
    pub fn new() -> Self {
        Self::with_ops(DefaultOps::new())
    }

    /// Empty table pre-grown to hold `capacity` values without regrowing
    /// the top-level array.
    pub fn with_capacity(capacity: usize) -> Result<Self, GrowError> {
        Self::with_parts(capacity, DefaultOps::new(), Global)
    }
}

impl<T> Default for PrimeHashMap<T>
where
    T: Ord + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, O> PrimeHashMap<T, O>
where
    O: ValueOps<T>,
{
    pub fn with_ops(ops: O) -> Self {
        Self {
            table: RawTable::new(),
            ops,
            hooks: Global,
            reentrancy: DebugReentrancy::new(),
        }
    }
}

impl<T, O, A> PrimeHashMap<T, O, A>
where
    O: ValueOps<T>,
    A: Hooks,
{
    /// Creates an empty table and grows it to `capacity`. Fails only if
    /// that first growth fails.
    pub fn with_parts(capacity: usize, ops: O, hooks: A) -> Result<Self, GrowError> {
        let mut map = Self {
            table: RawTable::new(),
            ops,
            hooks,
            reentrancy: DebugReentrancy::new(),
        };
        map.ensure_size(capacity)?;
        Ok(map)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Number of top-level buckets; 0 before the first growth.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn ops(&self) -> &O {
        &self.ops
    }

    pub fn hooks(&self) -> &A {
        &self.hooks
    }

    /// Releases every array and returns to the empty state. Stored values
    /// are dropped with their arrays.
    pub fn destroy(&mut self) {
        self.table.destroy(&self.hooks);
    }

    /// Makes room for `capacity` values, rehashing if the top-level array
    /// has to grow.
    ///
    /// If a bucket cannot grow while values are being redistributed, the
    /// value being moved is dropped and the pass carries on; the result is
    /// `Err(GrowError::Rehash { lost })` and [`len`](Self::len) counts only
    /// what survived.
    pub fn ensure_size(&mut self, capacity: usize) -> Result<(), GrowError> {
        let _g = self.reentrancy.enter("ensure_size");
        self.table.ensure_size(&self.ops, &self.hooks, capacity)
    }

    pub fn find(&self, value: &T) -> Option<&T> {
        let _g = self.reentrancy.enter("find");
        self.table.get(&self.ops, value)
    }

    /// Mutable access to the stored value equal to `value`. Changing what
    /// the comparator or hash look at leaves the value in the wrong bucket.
    pub fn find_mut(&mut self, value: &T) -> Option<&mut T> {
        let _g = self.reentrancy.enter("find_mut");
        self.table.get_mut(&self.ops, value)
    }

    pub fn contains(&self, value: &T) -> bool {
        let _g = self.reentrancy.enter("contains");
        self.table.locate(&self.ops, value).is_some()
    }

    /// Inserts `value`, consulting `resolution` when an equal value is
    /// already stored.
    ///
    /// `Find`, `Replace` and `Swap` never change [`len`](Self::len) when a
    /// match exists. `Put` (no match) and `Stack` grow the table to
    /// `len + 1` first, then append to the target bucket; a stacked put
    /// also lends the equal value that was already stored. Any growth
    /// failure comes back as `Err` with the caller's value.
    pub fn put(
        &mut self,
        value: T,
        resolution: Resolution,
    ) -> Result<PutOutcome<'_, T>, PutError<T>> {
        let _g = self.reentrancy.enter("put");
        if let Some(at) = self.table.locate(&self.ops, &value) {
            match resolution {
                Resolution::Find => {
                    let stored = self.table.slot_mut(at);
                    return Ok(PutOutcome::Found {
                        stored,
                        rejected: value,
                    });
                }
                Resolution::Replace => {
                    let stored = self.table.slot_mut(at);
                    *stored = value;
                    return Ok(PutOutcome::Replaced(stored));
                }
                Resolution::Swap => {
                    let stored = self.table.slot_mut(at);
                    let previous = mem::replace(stored, value);
                    return Ok(PutOutcome::Swapped { stored, previous });
                }
                Resolution::Stack => {}
            }
        }

        let wanted = self.table.len() + 1;
        if let Err(error) = self.table.ensure_size(&self.ops, &self.hooks, wanted) {
            return Err(PutError { value, error });
        }
        let (earlier, stored) = self
            .table
            .insert(&self.ops, &self.hooks, value)
            .map_err(|(value, error)| PutError { value, error })?;
        if resolution == Resolution::Stack {
            // The first equal value in the bucket is the one `Find` reports.
            let ops = &self.ops;
            if let Some(existing) = earlier.iter().find(|e| ops.matches(e, &*stored)) {
                return Ok(PutOutcome::Stacked { stored, existing });
            }
        }
        Ok(PutOutcome::Put(stored))
    }

    /// Takes out the first stored value equal to `value`, shifting the
    /// rest of its bucket left.
    pub fn remove(&mut self, value: &T) -> Option<T> {
        let _g = self.reentrancy.enter("remove");
        self.table.remove(&self.ops, value)
    }

    /// Every stored value, bucket by bucket. The borrow keeps the table
    /// from being modified while the iterator lives.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.table)
    }

    pub(crate) fn bucket_index(&self, value: &T) -> Option<usize> {
        let _g = self.reentrancy.enter("bucket_index");
        self.table.index_of(&self.ops, value)
    }
}

impl<T, O, A: Hooks> Drop for PrimeHashMap<T, O, A> {
    fn drop(&mut self) {
        self.table.destroy(&self.hooks);
    }
}

impl<'a, T, O, A> IntoIterator for &'a PrimeHashMap<T, O, A>
where
    O: ValueOps<T>,
    A: Hooks,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, O, A> fmt::Debug for PrimeHashMap<T, O, A>
where
    T: fmt::Debug,
    A: Hooks,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(Iter::new(&self.table)).finish()
    }
}
