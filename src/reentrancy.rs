//! Debug-only reentrancy guard.
//!
//! The comparator and hash are user code and run while the table may be
//! half-way through a growth or a bucket compaction. In debug builds each
//! public operation records its name on entry; a nested entry panics and
//! names both operations. Release builds compile this to nothing.

use core::cell::Cell;
use core::marker::PhantomData;

#[derive(Debug)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
    // Single-threaded by construction.
    _nosend: PhantomData<*mut ()>,
}

impl DebugReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
            _nosend: PhantomData,
        }
    }

    /// Marks `op` as running until the returned guard drops.
    #[inline]
    pub(crate) fn enter(&self, op: &'static str) -> ReentrancyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(outer) = self.active.get() {
                panic!("reentrancy detected: `{op}` called from inside `{outer}`");
            }
            self.active.set(Some(op));
            return ReentrancyGuard { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            return ReentrancyGuard { _z: PhantomData };
        }
    }
}

pub(crate) struct ReentrancyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.owner.active.get().is_some());
            self.owner.active.set(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DebugReentrancy;

    #[test]
    fn sequential_entries_are_fine() {
        let r = DebugReentrancy::new();
        drop(r.enter("find"));
        drop(r.enter("put"));
    }

    #[cfg(debug_assertions)]
    #[test]
    fn nested_entry_panics_naming_both_operations() {
        let r = DebugReentrancy::new();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _outer = r.enter("put");
            let _inner = r.enter("find");
        }));
        let msg = res.unwrap_err();
        let msg = msg.downcast_ref::<String>().expect("formatted panic message");
        assert!(msg.contains("`find` called from inside `put`"), "{msg}");
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn nested_entry_is_a_noop_in_release() {
        let r = DebugReentrancy::new();
        let _outer = r.enter("put");
        let _inner = r.enter("find");
    }
}
