//! The state applicator executes transitions that the host has already
//! ordered and authenticated, mutating the ledger tables and emitting
//! metadata-only events
//!
//! Operations run strictly serially: each transition is applied to
//! completion before the next begins, which is what makes the multi-step
//! settlement algorithm atomic

use common::bus_message::{LedgerBusMessage, LedgerEvent, LedgerEventQueue};
use common::types::Principal;
use opaque_types::{AssetVault, OpaqueEngine};
use tracing::instrument;

use crate::{state_transition::StateTransition, storage::LedgerTables};

use self::{error::StateApplicatorError, return_type::ApplicatorReturnType};

pub mod error;
pub mod expenses;
pub mod membership;
pub mod return_type;
pub mod settlement;

/// A type alias for the result type given by the applicator
pub(crate) type Result<T> = std::result::Result<T, StateApplicatorError>;

/// Error message emitted when a caller is not the admin principal
const ERR_NOT_ADMIN: &str = "caller is not the administrative principal";

// --------------
// | Applicator |
// --------------

/// The config for the state applicator
pub struct StateApplicatorConfig {
    /// The administrative principal gating group and expense mutations
    ///
    /// Replaceable through the `RotateAdmin` transition
    pub admin: Principal,
    /// The opaque arithmetic engine
    pub engine: Box<dyn OpaqueEngine + Send + Sync>,
    /// The asset vault moving value in and out of platform custody
    pub vault: Box<dyn AssetVault + Send + Sync>,
    /// The queue metadata events are published to
    pub event_queue: LedgerEventQueue,
}

/// The applicator applies state transitions to the ledger tables
///
/// If we view the host as a serial dispatcher over an ordered operation log,
/// the `StateApplicator` is the executor that runs each operation after its
/// order has been fixed
pub struct StateApplicator {
    /// The config for the applicator
    pub(crate) config: StateApplicatorConfig,
    /// The ledger tables
    pub(crate) tables: LedgerTables,
}

impl StateApplicator {
    /// Create a new state applicator with empty tables
    pub fn new(mut config: StateApplicatorConfig) -> Self {
        let opaque_zero = config.engine.zero();
        Self { config, tables: LedgerTables::new(opaque_zero) }
    }

    /// Handle a state transition
    #[instrument(skip_all, fields(transition = ?std::mem::discriminant(&transition)))]
    pub fn handle_state_transition(
        &mut self,
        transition: StateTransition,
    ) -> Result<ApplicatorReturnType> {
        match transition {
            StateTransition::CreateGroup { caller, name, members } => {
                self.create_group(caller, name, &members)
            },
            StateTransition::AddMember { caller, group_id, member } => {
                self.add_member(caller, group_id, member)
            },
            StateTransition::RemoveMember { caller, group_id, member } => {
                self.remove_member(caller, group_id, member)
            },
            StateTransition::AddExpense { caller, group_id, payer, members, shares, description } => {
                self.add_expense(caller, group_id, payer, &members, &shares, description)
            },
            StateTransition::Deposit { account, amount } => self.deposit(account, amount),
            StateTransition::Withdraw { account, amount } => self.withdraw(account, amount),
            StateTransition::WithdrawAll { account } => self.withdraw_all(account),
            StateTransition::TransferInGroup { group_id, from, to, amount } => {
                self.transfer_in_group(group_id, from, to, amount)
            },
            StateTransition::RotateAdmin { caller, new_admin } => {
                self.rotate_admin(caller, new_admin)
            },
        }
    }

    /// Get a reference to the ledger tables
    pub fn tables(&self) -> &LedgerTables {
        &self.tables
    }

    /// The current administrative principal
    pub fn admin(&self) -> Principal {
        self.config.admin
    }

    // -----------
    // | Helpers |
    // -----------

    /// Require that the caller is the administrative principal
    pub(crate) fn check_admin(&self, caller: Principal) -> Result<()> {
        if caller != self.config.admin {
            return Err(StateApplicatorError::Unauthorized(ERR_NOT_ADMIN.to_string()));
        }

        Ok(())
    }

    /// Split mutable borrows of the tables and the engine
    pub(crate) fn tables_and_engine(
        &mut self,
    ) -> (&mut LedgerTables, &mut (dyn OpaqueEngine + Send + Sync)) {
        (&mut self.tables, self.config.engine.as_mut())
    }

    /// Publish a metadata-only event describing a completed mutation
    ///
    /// A dropped receiver never fails a committed mutation
    pub(crate) fn publish(&self, message: LedgerBusMessage) {
        let _ = self.config.event_queue.send(LedgerEvent::new(message));
    }

    /// Rotate the administrative principal; admin-only
    fn rotate_admin(&mut self, caller: Principal, new_admin: Principal) -> Result<ApplicatorReturnType> {
        self.check_admin(caller)?;
        self.config.admin = new_admin;

        self.publish(LedgerBusMessage::AdminRotated {
            timestamp: common::get_current_time_millis(),
        });
        Ok(ApplicatorReturnType::None)
    }
}

/// Test helpers for a mock state applicator
#[cfg(any(test, feature = "mocks"))]
pub mod test_helpers {
    use common::bus_message::{new_ledger_event_queue, LedgerEventReceiver};
    use common::types::{mocks::random_principal, Principal};
    use opaque_types::mocks::{MockAssetVault, MockOpaqueEngine};

    use super::{StateApplicator, StateApplicatorConfig};

    /// A mock applicator along with handles to its collaborators
    pub struct MockLedger {
        /// The applicator under test
        pub applicator: StateApplicator,
        /// The admin principal configured on the applicator
        pub admin: Principal,
        /// A handle on the mock engine shared with the applicator
        pub engine: MockOpaqueEngine,
        /// A handle on the mock vault shared with the applicator
        pub vault: MockAssetVault,
        /// The receiving end of the event queue
        pub events: LedgerEventReceiver,
    }

    /// Create a mock `StateApplicator` wired to a cleartext engine and vault
    pub fn mock_applicator() -> MockLedger {
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

        MockLedger { applicator: StateApplicator::new(config), admin, engine, vault, events }
    }
}
