//! The ledger state machine: storage tables, the serial applicator that
//! executes state transitions, the access-control gate, and the read
//! interface
//!
//! The host is assumed to deliver an already-ordered, already-authenticated
//! stream of transitions; the state machine applies each to completion
//! before the next begins

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod access;
pub mod applicator;
pub mod interface;
pub mod state_transition;
pub mod storage;

pub use interface::State;
pub use state_transition::StateTransition;

#[cfg(any(test, feature = "mocks"))]
pub use applicator::test_helpers;
