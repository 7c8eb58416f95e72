//! Core error types.
//!
//! Only recoverable conditions are modeled here. Contract violations
//! (role-transition guards, a system reading a component the entity is
//! guaranteed to have) are bugs, and the kernel panics on them with a
//! diagnostic instead of returning a value callers would be tempted to
//! ignore.

use thiserror::Error;

/// Errors the simulation kernel reports to its immediate caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A fixed-capacity pool has no free slot left.
    ///
    /// Callers reject the request (deny a join, skip a spawn); the pool
    /// itself never grows.
    #[error("{pool} pool exhausted: all {capacity} slots in use")]
    PoolExhausted {
        /// Which pool refused the allocation.
        pool: &'static str,
        /// The pool's fixed capacity.
        capacity: usize,
    },

    /// A handle references a slot that is free, recycled, or from another
    /// pool.
    ///
    /// Treated as a no-op by mutating operations; lookups return `None`
    /// instead of this error.
    #[error("stale {pool} handle: slot {index} generation {generation}")]
    InvalidHandle {
        /// Which pool rejected the handle.
        pool: &'static str,
        /// Slot index carried by the handle.
        index: u32,
        /// Generation carried by the handle.
        generation: u32,
    },
}

/// Result alias for kernel operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::PoolExhausted {
            pool: "entity",
            capacity: 2,
        };
        assert_eq!(err.to_string(), "entity pool exhausted: all 2 slots in use");

        let err = CoreError::InvalidHandle {
            pool: "actor",
            index: 3,
            generation: 7,
        };
        assert_eq!(err.to_string(), "stale actor handle: slot 3 generation 7");
    }
}
