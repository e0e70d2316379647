//! Error types for the administrative surface
//!
//! Geometric "not found" is never an error here — hit tests and lookups
//! return `Option`/`Resolution` and callers drop the event. These errors
//! cover the administrative setters, where an invalid argument must come
//! back as a documented code instead of a panic.

use thiserror::Error;

use crate::types::{DisplayId, Pid, WindowId};

/// Errors returned by the administrative surface.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetingError {
    /// Negative or otherwise malformed window id passed to a setter.
    #[error("invalid window id: {0}")]
    InvalidWindowId(WindowId),

    /// Negative pid passed to a setter.
    #[error("invalid pid: {0}")]
    InvalidPid(Pid),

    /// Negative device id passed to a display-bind call.
    #[error("invalid device id: {0}")]
    InvalidDeviceId(i32),

    /// Display named in a bind/shift call does not exist.
    #[error("no such display: {0}")]
    NoSuchDisplay(DisplayId),

    /// Window named in a shift call does not exist in the snapshot.
    #[error("no such window: {0}")]
    NoSuchWindow(WindowId),

    /// Shift target refuses input (untouchable or transparent at the
    /// current point).
    #[error("window {0} cannot accept shifted input")]
    WindowRefusesInput(WindowId),

    /// Shift requested with no pointer stream in flight.
    #[error("no pointer event in flight")]
    NoEventInFlight,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_stable() {
        assert_eq!(
            TargetingError::InvalidWindowId(-2).to_string(),
            "invalid window id: -2"
        );
        assert_eq!(
            TargetingError::WindowRefusesInput(4).to_string(),
            "window 4 cannot accept shifted input"
        );
    }
}
