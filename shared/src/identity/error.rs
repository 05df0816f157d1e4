use thiserror::Error;

use super::observable_id::ObservableId;

/// Errors that can occur while allocating or releasing observable identities
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Every identity in `[0, capacity)` is live. This is a configuration
    /// error and is not retried.
    #[error("Observable capacity of {capacity} exceeded")]
    CapacityExceeded { capacity: usize },

    /// Attempted to free an identity which is not currently allocated
    #[error("Observable identity {id} is not live")]
    NotLive { id: ObservableId },

    /// Identity lies outside of the allocator's range
    #[error("Observable identity {id} is outside of the range [0, {capacity})")]
    OutOfRange { id: ObservableId, capacity: usize },
}
