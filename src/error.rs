use thiserror::Error;

/// Error types for `CapVec` operations
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum CapVecError {
    /// Requested capacity or size exceeds what the allocator can represent
    #[error("Length error: requested {requested} slots, but the allocator supports at most {max}")]
    LengthError {
        /// Number of slots requested
        requested: usize,
        /// Maximum number of slots the allocator can hand out
        max: usize,
    },
    /// Bounds-checked access past the live elements
    #[error("Out of range: index {index} >= size {size}")]
    OutOfRange {
        /// Index that was accessed
        index: usize,
        /// Number of live elements at the time of access
        size: usize,
    },
    /// The allocator could not provide the requested memory
    #[error("Allocation failed: could not obtain {requested} slots")]
    AllocationFailed {
        /// Number of slots requested
        requested: usize,
    },
}
