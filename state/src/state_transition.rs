//! State transition types for the ledger state machine

use common::types::{GroupId, Principal};
use opaque_types::OpaqueAmount;
use serde::{Deserialize, Serialize};

/// The `StateTransition` type encapsulates all mutating operations the
/// ledger supports, allowing the host to order and dispatch them generically
///
/// Transport and authentication are host concerns, so every transition
/// carries the acting principal explicitly. Group and expense mutations are
/// gated on the configured administrative principal; account operations act
/// for the principal they name
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum StateTransition {
    // --- Groups & Membership --- //
    /// Create a group with an initial member batch
    CreateGroup {
        /// The submitting principal
        caller: Principal,
        /// The human-readable group name
        name: String,
        /// The initial member batch
        members: Vec<Principal>,
    },
    /// Add a member to a group
    AddMember {
        /// The submitting principal
        caller: Principal,
        /// The group to add to
        group_id: GroupId,
        /// The principal to add
        member: Principal,
    },
    /// Remove a member from a group; historical debts are untouched
    RemoveMember {
        /// The submitting principal
        caller: Principal,
        /// The group to remove from
        group_id: GroupId,
        /// The principal to remove
        member: Principal,
    },

    // --- Expenses --- //
    /// Record an expense against a group, splitting it into per-member
    /// opaque shares and folding each non-payer share into the debt table
    AddExpense {
        /// The submitting principal
        caller: Principal,
        /// The group to record against
        group_id: GroupId,
        /// The principal that paid the expense
        payer: Principal,
        /// The members participating in the expense, including the payer
        members: Vec<Principal>,
        /// The opaque share of each member, index-aligned with `members`
        shares: Vec<OpaqueAmount>,
        /// A free-form description
        description: String,
    },

    // --- Funds --- //
    /// Deposit external funds into the account's platform balance
    Deposit {
        /// The depositing principal
        account: Principal,
        /// The opaque amount to move into platform custody
        amount: OpaqueAmount,
    },
    /// Withdraw funds from the account's platform balance
    Withdraw {
        /// The withdrawing principal
        account: Principal,
        /// The opaque amount to move out of platform custody
        amount: OpaqueAmount,
    },
    /// Withdraw the account's entire platform balance
    WithdrawAll {
        /// The withdrawing principal
        account: Principal,
    },
    /// Transfer funds to another member of the group, settling any debt the
    /// sender owes the recipient in that group before crediting the rest
    TransferInGroup {
        /// The group the transfer is scoped to
        group_id: GroupId,
        /// The sending principal
        from: Principal,
        /// The receiving principal
        to: Principal,
        /// The opaque amount to transfer
        amount: OpaqueAmount,
    },

    // --- Administration --- //
    /// Rotate the administrative principal
    RotateAdmin {
        /// The current administrative principal
        caller: Principal,
        /// The principal to hand the capability to
        new_admin: Principal,
    },
}
