//! Host lifecycle state machine.
//!
//! # State Transitions
//! ```text
//! Created → Initializing → EngineStarting → Running → Stopping → Stopped
//!
//! Created | Initializing | EngineStarting | Running → Failed
//! Failed → Stopping
//! Created | Initializing | EngineStarting → Stopping   (stop requested early)
//! ```
//!
//! Transitions are monotonic. `Failed` only blocks further start attempts; the
//! machine still proceeds through `Stopping` to `Stopped`.

use std::sync::Mutex;

use crate::lifecycle::error::{LifecycleError, LifecycleResult};
use crate::observability::metrics;

/// Lifecycle state of the host.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Created = 0,
    Initializing = 1,
    EngineStarting = 2,
    Running = 3,
    Stopping = 4,
    Stopped = 5,
    Failed = 6,
}

impl LifecycleState {
    /// Whether `self → to` is an allowed transition.
    pub fn can_transition_to(self, to: LifecycleState) -> bool {
        use LifecycleState::*;

        matches!(
            (self, to),
            (Created, Initializing)
                | (Initializing, EngineStarting)
                | (EngineStarting, Running)
                | (Running, Stopping)
                | (Stopping, Stopped)
                | (Created | Initializing | EngineStarting | Running, Failed)
                | (Failed, Stopping)
                | (Created | Initializing | EngineStarting, Stopping)
        )
    }
}

#[derive(Debug)]
struct Inner {
    current: LifecycleState,
    history: Vec<LifecycleState>,
}

/// Shared, validated holder of the current state.
#[derive(Debug)]
pub struct StateCell {
    inner: Mutex<Inner>,
}

impl StateCell {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                current: LifecycleState::Created,
                history: vec![LifecycleState::Created],
            }),
        }
    }

    pub fn current(&self) -> LifecycleState {
        self.inner.lock().expect("state mutex poisoned").current
    }

    /// Every state entered so far, starting with `Created`.
    pub fn history(&self) -> Vec<LifecycleState> {
        self.inner.lock().expect("state mutex poisoned").history.clone()
    }

    /// Move to `to`, returning the previous state.
    pub fn transition(&self, to: LifecycleState) -> LifecycleResult<LifecycleState> {
        let mut inner = self.inner.lock().expect("state mutex poisoned");
        let from = inner.current;
        if !from.can_transition_to(to) {
            return Err(LifecycleError::InvalidTransition { from, to });
        }
        inner.current = to;
        inner.history.push(to);
        drop(inner);

        tracing::debug!(from = ?from, to = ?to, "Lifecycle transition");
        metrics::record_state(to);
        Ok(from)
    }

    pub fn has_visited(&self, state: LifecycleState) -> bool {
        self.inner
            .lock()
            .expect("state mutex poisoned")
            .history
            .contains(&state)
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use LifecycleState::*;

    #[test]
    fn test_happy_path() {
        let cell = StateCell::new();
        for to in [Initializing, EngineStarting, Running, Stopping, Stopped] {
            cell.transition(to).unwrap();
        }
        assert_eq!(cell.current(), Stopped);
        assert_eq!(
            cell.history(),
            vec![Created, Initializing, EngineStarting, Running, Stopping, Stopped]
        );
    }

    #[test]
    fn test_failed_reachable_and_leads_to_stopping() {
        for from in [Created, Initializing, EngineStarting, Running] {
            assert!(from.can_transition_to(Failed), "{from:?} → Failed");
        }
        assert!(Failed.can_transition_to(Stopping));
        assert!(!Failed.can_transition_to(Running));
        assert!(!Failed.can_transition_to(EngineStarting));
        assert!(!Stopping.can_transition_to(Failed));
        assert!(!Stopped.can_transition_to(Failed));
    }

    #[test]
    fn test_no_backwards_moves() {
        assert!(!Running.can_transition_to(Initializing));
        assert!(!Stopped.can_transition_to(Stopping));
        assert!(!Stopping.can_transition_to(Running));
        assert!(!Created.can_transition_to(Running));
    }

    #[test]
    fn test_rejected_transition_keeps_state() {
        let cell = StateCell::new();
        cell.transition(Stopping).unwrap();
        let err = cell.transition(Initializing).unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::InvalidTransition { from: Stopping, to: Initializing }
        ));
        assert_eq!(cell.current(), Stopping);
        assert!(!cell.has_visited(Initializing));
    }
}
