//! Lifecycle error definitions.

use thiserror::Error;

use crate::engine::EngineError;
use crate::lifecycle::state::LifecycleState;

/// Errors raised while driving the host lifecycle.
///
/// None of these escape [`ServiceHost::execute`](crate::lifecycle::ServiceHost::execute);
/// they are logged and turned into state transitions.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A transition the state machine does not allow.
    #[error("Invalid lifecycle transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: LifecycleState,
        to: LifecycleState,
    },

    /// The engine rejected the application identity.
    #[error("Application ID illegal")]
    IllegalApplicationId,

    /// The engine reported a failure without raising a fault.
    #[error("Engine start reported failure")]
    EngineRefused,

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Result type for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;
