//! Allocation hooks.
//!
//! Every array the table owns (the top-level bucket array and each
//! bucket's value array) is obtained, grown and released through a
//! [`Hooks`] implementation, so the memory source can be swapped without
//! touching the table logic. Releasing an array drops whatever it still
//! holds; the table itself never inspects values.

use crate::error::AllocError;
use core::cell::Cell;
use std::rc::Rc;

pub trait Hooks {
    /// Returns an empty array able to hold at least `capacity` values.
    fn allocate<T>(&self, capacity: usize) -> Result<Vec<T>, AllocError>;

    /// Grows `entries` in place so it can hold at least `capacity` values.
    fn resize<T>(&self, entries: &mut Vec<T>, capacity: usize) -> Result<(), AllocError>;

    /// Gives an array back.
    fn release<T>(&self, entries: Vec<T>);
}

/// System allocator, used fallibly.
#[derive(Copy, Clone, Debug, Default)]
pub struct Global;

impl Hooks for Global {
    fn allocate<T>(&self, capacity: usize) -> Result<Vec<T>, AllocError> {
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(capacity)
            .map_err(|_| AllocError { capacity })?;
        Ok(entries)
    }

    fn resize<T>(&self, entries: &mut Vec<T>, capacity: usize) -> Result<(), AllocError> {
        let additional = capacity.saturating_sub(entries.len());
        entries
            .try_reserve_exact(additional)
            .map_err(|_| AllocError { capacity })
    }

    fn release<T>(&self, entries: Vec<T>) {
        drop(entries);
    }
}

/// Snapshot of the calls a [`CountingHooks`] has seen.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct AllocStats {
    pub allocations: usize,
    pub resizes: usize,
    pub releases: usize,
}

impl AllocStats {
    /// Arrays handed out and not yet released.
    pub fn outstanding(&self) -> usize {
        self.allocations - self.releases
    }
}

#[derive(Debug, Default)]
struct Shared {
    allocations: Cell<usize>,
    resizes: Cell<usize>,
    releases: Cell<usize>,
    // Remaining successful allocate/resize calls; `None` means unlimited.
    budget: Cell<Option<usize>>,
}

/// Hook wrapper that counts calls and can be told to start failing.
///
/// Clones share their counters, so a test can keep one clone while the
/// table owns another.
#[derive(Clone, Debug, Default)]
pub struct CountingHooks<A = Global> {
    inner: A,
    shared: Rc<Shared>,
}

impl CountingHooks {
    pub fn new() -> Self {
        Self::wrap(Global)
    }
}

impl<A: Hooks> CountingHooks<A> {
    pub fn wrap(inner: A) -> Self {
        Self {
            inner,
            shared: Rc::new(Shared::default()),
        }
    }

    pub fn stats(&self) -> AllocStats {
        AllocStats {
            allocations: self.shared.allocations.get(),
            resizes: self.shared.resizes.get(),
            releases: self.shared.releases.get(),
        }
    }

    /// Lets `n` more allocate/resize calls succeed, then fails every one.
    pub fn fail_after(&self, n: usize) {
        self.shared.budget.set(Some(n));
    }

    /// Removes any failure budget.
    pub fn unlimited(&self) {
        self.shared.budget.set(None);
    }

    fn spend(&self, capacity: usize) -> Result<(), AllocError> {
        match self.shared.budget.get() {
            Some(0) => Err(AllocError { capacity }),
            Some(n) => {
                self.shared.budget.set(Some(n - 1));
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl<A: Hooks> Hooks for CountingHooks<A> {
    fn allocate<T>(&self, capacity: usize) -> Result<Vec<T>, AllocError> {
        self.spend(capacity)?;
        let entries = self.inner.allocate(capacity)?;
        bump(&self.shared.allocations);
        Ok(entries)
    }

    fn resize<T>(&self, entries: &mut Vec<T>, capacity: usize) -> Result<(), AllocError> {
        self.spend(capacity)?;
        self.inner.resize(entries, capacity)?;
        bump(&self.shared.resizes);
        Ok(())
    }

    fn release<T>(&self, entries: Vec<T>) {
        bump(&self.shared.releases);
        self.inner.release(entries);
    }
}

fn bump(c: &Cell<usize>) {
    c.set(c.get() + 1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_reserves_requested_capacity() {
        let mut v: Vec<u32> = Global.allocate(13).unwrap();
        assert!(v.capacity() >= 13);
        v.extend([1, 2, 3]);
        Global.resize(&mut v, 31).unwrap();
        assert!(v.capacity() >= 31);
        assert_eq!(v, [1, 2, 3]);
        Global.release(v);
    }

    #[test]
    fn counting_hooks_share_counters_between_clones() {
        let hooks = CountingHooks::new();
        let observer = hooks.clone();
        let mut v: Vec<u8> = hooks.allocate(3).unwrap();
        hooks.resize(&mut v, 7).unwrap();
        hooks.release(v);
        assert_eq!(
            observer.stats(),
            AllocStats {
                allocations: 1,
                resizes: 1,
                releases: 1
            }
        );
        assert_eq!(observer.stats().outstanding(), 0);
    }

    #[test]
    fn failure_budget_is_spent_then_refuses() {
        let hooks = CountingHooks::new();
        hooks.fail_after(1);
        let v: Vec<u8> = hooks.allocate(1).unwrap();
        assert_eq!(
            hooks.allocate::<u8>(3).unwrap_err(),
            AllocError { capacity: 3 }
        );
        // Failed calls are not counted as allocations.
        assert_eq!(hooks.stats().allocations, 1);
        hooks.unlimited();
        assert!(hooks.allocate::<u8>(3).is_ok());
        hooks.release(v);
    }
}
