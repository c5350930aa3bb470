//! prime-hashmap: a generic two-level hash table whose top-level array
//! and per-slot buckets both grow along a fixed ladder of primes.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one table engine specialised at compile time for any value
//!   shape, with comparison, hashing and memory all supplied by the
//!   instantiation rather than baked in.
//! - Layers:
//!   - `primes`: the shared, immutable capacity ladder and the single
//!     "which rung next?" decision used by both levels.
//!   - `Bucket<T>`: a growable array of values that collided on one
//!     top-level index; compacts on removal.
//!   - `RawTable<T>`: the top-level bucket array plus size bookkeeping,
//!     growth and rehash. Takes capabilities per call.
//!   - `PrimeHashMap<T, O, A>`: public API. Owns the capabilities, applies
//!     the duplicate-resolution policy on `put`, and guards every entry
//!     point with a debug-only reentrancy check.
//!
//! Capabilities
//! - `O: ValueOps<T>`: `compare` (only equality matters) and `hash`.
//!   `DefaultOps` uses `Ord` and hashbrown's default `BuildHasher`;
//!   `FnOps` wraps a pair of closures.
//! - `A: Hooks`: `allocate`/`resize`/`release` for every array the table
//!   owns. `Global` is the fallible system allocator; `CountingHooks`
//!   counts calls and can inject failures.
//!
//! Growth
//! - The top-level array is indexed by `hash % capacity` and grows when
//!   `len + 1` exceeds its capacity; every value is then re-placed.
//! - Buckets grow on append along the same ladder. Buckets are expected
//!   to stay near one value, so the ladder starts at 1.
//! - Capacities never shrink. `destroy` is the only way back to zero.
//!
//! Duplicates
//! - `Resolution::{Find, Replace, Swap, Stack}` picks what `put` does when
//!   an equal value exists. `Stack` stores duplicates side by side; they
//!   come back out one `remove` at a time.
//!
//! Failure
//! - Growth fails when the ladder runs out or a hook refuses. Failures are
//!   returned, never retried. A bucket failing to grow *during a rehash*
//!   loses the value being moved: the table keeps what it placed and
//!   reports `GrowError::Rehash { lost }`.
//!
//! Notes and non-goals
//! - Single-threaded: `!Send`/`!Sync` via the guard's marker.
//! - No shrinking, persistence or serialization.
//! - Values are owned: releasing an array drops what is left in it.

mod bucket;
mod error;
pub mod hooks;
mod iter;
pub mod ops;
mod prime_hash_map;
mod prime_hash_map_proptest;
pub mod primes;
mod raw_table;
mod reentrancy;

// Public surface
pub use error::{AllocError, GrowError, PutError};
pub use hooks::{AllocStats, CountingHooks, Global, Hooks};
pub use iter::{Iter, SafeIter};
pub use ops::{DefaultOps, FnOps, ValueOps};
pub use prime_hash_map::{PrimeHashMap, PutKind, PutOutcome, Resolution};
