//! Error types emitted by the state interface

use std::fmt::{self, Display};

use crate::applicator::error::StateApplicatorError;

/// The error type emitted by the state interface
#[derive(Clone, Debug)]
pub enum StateError {
    /// An error applying a state transition
    Applicator(StateApplicatorError),
    /// The requester is not permitted to read the resource
    Unauthorized(String),
    /// A referenced entity does not exist
    NotFound(String),
    /// The state lock was poisoned by a panicked writer
    Lock(String),
}

impl Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::Applicator(e) => write!(f, "applicator error: {e}"),
            StateError::Unauthorized(msg) => write!(f, "unauthorized: {msg}"),
            StateError::NotFound(msg) => write!(f, "not found: {msg}"),
            StateError::Lock(msg) => write!(f, "lock error: {msg}"),
        }
    }
}

impl std::error::Error for StateError {}

impl From<StateApplicatorError> for StateError {
    fn from(value: StateApplicatorError) -> Self {
        StateError::Applicator(value)
    }
}
