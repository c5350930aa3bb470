//! Prime ladder shared by the top-level array and every bucket.

/// Ascending capacities, <http://oeis.org/A014234> with the leading 2
/// replaced by 1 since a bucket should mostly hold a single value.
pub const PRIMES: [usize; 31] = [
    1, 3, 7, 13, 31, 61, 127, 251, 509, 1021, 2039, 4093, 8191, 16381, 32749, 65521, 131071,
    262139, 524287, 1048573, 2097143, 4194301, 8388593, 16777213, 33554393, 67108859, 134217689,
    268435399, 536870909, 1073741789, 2147483647,
];

/// Outcome of asking the ladder for room for `capacity` values.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Growth {
    NotNeeded,
    Grow(u8),
    Exhausted,
}

/// Picks the smallest rung `>= capacity`.
///
/// `allocated` says whether `current` refers to live storage; without it
/// any non-zero request grows, even onto the same rung.
pub(crate) fn next(capacity: usize, allocated: bool, current: u8) -> Growth {
    if capacity == 0 || (allocated && PRIMES[current as usize] >= capacity) {
        return Growth::NotNeeded;
    }
    match PRIMES.iter().position(|&p| p >= capacity) {
        Some(i) => Growth::Grow(i as u8),
        None => Growth::Exhausted,
    }
}

pub fn is_prime_capacity(capacity: usize) -> bool {
    PRIMES.binary_search(&capacity).is_ok()
}
