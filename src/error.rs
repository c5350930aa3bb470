//! Error types surfaced by growth and insertion.

/// An allocation hook could not provide room for `capacity` slots.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("failed to allocate {capacity} slots")]
pub struct AllocError {
    pub capacity: usize,
}

/// Why the top-level array or a bucket could not grow.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum GrowError {
    /// No rung of the prime ladder is large enough.
    #[error("requested capacity {requested} is beyond the largest supported prime")]
    Exhausted { requested: usize },

    /// The allocation hook refused the request.
    #[error(transparent)]
    Alloc(#[from] AllocError),

    /// The top-level array grew but some buckets failed to grow while
    /// values were being redistributed. Those values were dropped and the
    /// table keeps only what was placed.
    #[error("rehash lost {lost} values after a bucket failed to grow")]
    Rehash { lost: usize },
}

/// A failed `put`. The caller's value is handed back untouched.
#[derive(Debug, thiserror::Error)]
#[error("put failed: {error}")]
pub struct PutError<T> {
    pub value: T,
    #[source]
    pub error: GrowError,
}

impl<T> PutError<T> {
    pub fn into_value(self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_error_converts_and_displays() {
        let e: GrowError = AllocError { capacity: 7 }.into();
        assert_eq!(e, GrowError::Alloc(AllocError { capacity: 7 }));
        assert_eq!(e.to_string(), "failed to allocate 7 slots");
    }

    #[test]
    fn put_error_returns_value_and_chains_source() {
        use std::error::Error;
        let e = PutError {
            value: "v".to_string(),
            error: GrowError::Exhausted { requested: 9 },
        };
        assert_eq!(
            e.to_string(),
            "put failed: requested capacity 9 is beyond the largest supported prime"
        );
        assert_eq!(
            e.source().map(ToString::to_string),
            Some(e.error.to_string())
        );
        assert_eq!(e.into_value(), "v");
    }
}
