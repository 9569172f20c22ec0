//! Accessors for the opaque ledger cells: balances, debts, and membership
//! tokens
//!
//! Every accessor defaults a never-written cell to the canonical opaque
//! zero; the tables never inspect a cleartext

use common::types::{GroupId, Principal};
use opaque_types::OpaqueAmount;

use super::LedgerTables;

impl LedgerTables {
    // ------------
    // | Balances |
    // ------------

    /// The platform balance of a principal, opaque zero if never set
    pub fn balance(&self, principal: Principal) -> OpaqueAmount {
        self.balances.get(&principal).copied().unwrap_or(self.opaque_zero())
    }

    /// Overwrite the platform balance of a principal
    pub fn set_balance(&mut self, principal: Principal, amount: OpaqueAmount) {
        self.balances.insert(principal, amount);
    }

    // ---------
    // | Debts |
    // ---------

    /// The amount `debtor` owes `creditor` in `group_id`, opaque zero if
    /// never set
    ///
    /// Debt cells are directional; the reverse cell is looked up separately
    pub fn debt(
        &self,
        group_id: GroupId,
        debtor: Principal,
        creditor: Principal,
    ) -> OpaqueAmount {
        self.debts.get(&(group_id, debtor, creditor)).copied().unwrap_or(self.opaque_zero())
    }

    /// Overwrite a directional debt cell
    pub fn set_debt(
        &mut self,
        group_id: GroupId,
        debtor: Principal,
        creditor: Principal,
        amount: OpaqueAmount,
    ) {
        self.debts.insert((group_id, debtor, creditor), amount);
    }

    // ---------------------
    // | Membership Tokens |
    // ---------------------

    /// The membership token of a (group, member) pair, if one was minted
    pub fn membership_token(
        &self,
        group_id: GroupId,
        member: Principal,
    ) -> Option<OpaqueAmount> {
        self.membership_tokens.get(&(group_id, member)).copied()
    }

    /// Overwrite the membership token of a (group, member) pair
    pub fn set_membership_token(
        &mut self,
        group_id: GroupId,
        member: Principal,
        token: OpaqueAmount,
    ) {
        self.membership_tokens.insert((group_id, member), token);
    }
}
