//! State interface methods for expense queries

use common::types::{Expense, ExpenseId, GroupId, Principal};
use opaque_types::OpaqueAmount;

use crate::access::Resource;

use super::{Result, State};

impl State {
    /// Get an expense's metadata
    ///
    /// Ungated: expense metadata carries no amounts
    pub fn get_expense(&self, expense_id: ExpenseId) -> Result<Option<Expense>> {
        Ok(self.read()?.tables().get_expense(expense_id).cloned())
    }

    /// Get the expense ids recorded against a group, in recording order
    pub fn get_group_expenses(&self, group_id: GroupId) -> Result<Vec<ExpenseId>> {
        Ok(self.read()?.tables().expenses_of(group_id))
    }

    /// Get a member's opaque share of an expense; gated to the member, the
    /// expense's payer, and the admin
    ///
    /// `None` indicates the member did not participate in the expense
    pub fn get_expense_share(
        &self,
        requester: Principal,
        expense_id: ExpenseId,
        member: Principal,
    ) -> Result<Option<OpaqueAmount>> {
        let applicator = self.read()?;
        Self::check_access(&applicator, requester, Resource::ExpenseShare {
            expense_id,
            member,
        })?;

        Ok(applicator.tables().expense_share(expense_id, member))
    }
}
