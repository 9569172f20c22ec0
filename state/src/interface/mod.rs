//! The `State` handle: the shared interface through which hosts apply
//! transitions and read ledger data
//!
//! Writes funnel through a single lock so transitions execute serially;
//! reads consult the access gate before any handle leaves the state layer

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use common::types::Principal;

use crate::access::{can_read, Resource};
use crate::applicator::{
    return_type::ApplicatorReturnType, StateApplicator, StateApplicatorConfig,
};
use crate::state_transition::StateTransition;

pub mod error;
pub mod expenses;
pub mod membership;
pub mod settlement;

pub use error::StateError;

/// A shorthand for the result type returned by interface methods
pub(crate) type Result<T> = std::result::Result<T, StateError>;

/// Error message emitted when the gate rejects a read
const ERR_ACCESS_DENIED: &str = "requester may not read this resource";

/// A handle on the ledger state
///
/// Cheaply cloneable; all clones share the underlying applicator
#[derive(Clone)]
pub struct State {
    /// The serial applicator behind a reader-writer lock
    applicator: Arc<RwLock<StateApplicator>>,
}

impl State {
    /// Create a new state handle over empty tables
    pub fn new(config: StateApplicatorConfig) -> Self {
        Self { applicator: Arc::new(RwLock::new(StateApplicator::new(config))) }
    }

    /// Apply a state transition, blocking until it completes
    pub fn apply(&self, transition: StateTransition) -> Result<ApplicatorReturnType> {
        let mut applicator = self.write()?;
        applicator.handle_state_transition(transition).map_err(StateError::from)
    }

    /// The current administrative principal
    pub fn get_admin(&self) -> Result<Principal> {
        Ok(self.read()?.admin())
    }

    // -----------
    // | Helpers |
    // -----------

    /// Acquire a read lock on the applicator
    pub(crate) fn read(&self) -> Result<RwLockReadGuard<'_, StateApplicator>> {
        self.applicator.read().map_err(|e| StateError::Lock(e.to_string()))
    }

    /// Acquire a write lock on the applicator
    pub(crate) fn write(&self) -> Result<RwLockWriteGuard<'_, StateApplicator>> {
        self.applicator.write().map_err(|e| StateError::Lock(e.to_string()))
    }

    /// Run `requester` through the gate for `resource`
    pub(crate) fn check_access(
        applicator: &StateApplicator,
        requester: Principal,
        resource: Resource,
    ) -> Result<()> {
        if !can_read(applicator.tables(), applicator.admin(), requester, resource) {
            return Err(StateError::Unauthorized(ERR_ACCESS_DENIED.to_string()));
        }

        Ok(())
    }
}

/// Test helpers for a mock state handle
#[cfg(any(test, feature = "mocks"))]
pub mod test_helpers {
    use common::bus_message::{new_ledger_event_queue, LedgerEventReceiver};
    use common::types::{mocks::random_principal, Principal};
    use opaque_types::mocks::{MockAssetVault, MockOpaqueEngine};

    use super::State;
    use crate::applicator::StateApplicatorConfig;

    /// A mock state handle along with handles to its collaborators
    pub struct MockState {
        /// The state handle under test
        pub state: State,
        /// The admin principal configured on the state
        pub admin: Principal,
        /// A handle on the mock engine shared with the state
        pub engine: MockOpaqueEngine,
        /// A handle on the mock vault shared with the state
        pub vault: MockAssetVault,
        /// The receiving end of the event queue
        pub events: LedgerEventReceiver,
    }

    /// Create a mock `State` wired to a cleartext engine and vault
    pub fn mock_state() -> MockState {
        let engine = MockOpaqueEngine::new();
        let vault = MockAssetVault::new(engine.clone());
        let admin = random_principal();
        let (event_queue, events) = new_ledger_event_queue();

        let config = StateApplicatorConfig {
            admin,
            engine: Box::new(engine.clone()),
            vault: Box::new(vault.clone()),
            event_queue,
        };

        MockState { state: State::new(config), admin, engine, vault, events }
    }
}
