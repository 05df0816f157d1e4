use thiserror::Error;

use sightline_shared::IdentityError;

/// Errors surfaced by the interest server. None of these cross a tick
/// boundary; they are logged and reported through `ErrorEvent`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterestError {
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Entity is already registered as an observer
    #[error("Observer {entity} is already attached")]
    ObserverAlreadyAttached { entity: String },

    /// Entity is already registered as an observable
    #[error("Observable {entity} is already attached")]
    ObservableAlreadyAttached { entity: String },

    #[error("Observer {entity} is not attached")]
    ObserverNotFound { entity: String },

    #[error("Observable {entity} is not attached")]
    ObservableNotFound { entity: String },
}
