//! Interactive-console probing for the run loop.
//!
//! The run loop asks its probe on every tick whether interactive polling is
//! valid. A probe reporting [`ProbeError::InputRedirected`] switches the host
//! to blocking on the engine's master switch instead of ticking.

use std::io::IsTerminal;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// Standard input is not a terminal, so interactive polling is invalid.
    #[error("standard input is redirected")]
    InputRedirected,
}

/// Check run before each tick of the run loop.
pub trait ConsoleProbe: Send + Sync {
    fn check(&self) -> Result<(), ProbeError>;
}

/// Probe for detached hosts: polling is always valid.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedConsole;

impl ConsoleProbe for DetachedConsole {
    fn check(&self) -> Result<(), ProbeError> {
        Ok(())
    }
}

/// Probe for interactive hosts: fails when stdin is not a terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConsole;

impl ConsoleProbe for StdinConsole {
    fn check(&self) -> Result<(), ProbeError> {
        if std::io::stdin().is_terminal() {
            Ok(())
        } else {
            Err(ProbeError::InputRedirected)
        }
    }
}
