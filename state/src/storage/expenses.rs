//! Accessors for expense records and per-member opaque shares

use common::types::{Expense, ExpenseId, GroupId, Principal};
use opaque_types::OpaqueAmount;

use super::LedgerTables;

impl LedgerTables {
    /// Allocate the next expense id
    pub fn next_expense_id(&mut self) -> ExpenseId {
        let id = self.next_expense_id;
        self.next_expense_id += 1;

        id
    }

    /// Store an expense record and append it to its group's expense list
    pub fn insert_expense(&mut self, expense: Expense) {
        self.group_expenses.entry(expense.group_id).or_default().push(expense.id);
        self.expenses.insert(expense.id, expense);
    }

    /// Get an expense record by id
    pub fn get_expense(&self, expense_id: ExpenseId) -> Option<&Expense> {
        self.expenses.get(&expense_id)
    }

    /// The expenses recorded against a group, in recording order
    pub fn expenses_of(&self, group_id: GroupId) -> Vec<ExpenseId> {
        self.group_expenses.get(&group_id).cloned().unwrap_or_default()
    }

    /// Store the opaque share of a member in an expense
    pub fn set_expense_share(
        &mut self,
        expense_id: ExpenseId,
        member: Principal,
        share: OpaqueAmount,
    ) {
        self.expense_shares.insert((expense_id, member), share);
    }

    /// The opaque share of a member in an expense, if recorded
    pub fn expense_share(
        &self,
        expense_id: ExpenseId,
        member: Principal,
    ) -> Option<OpaqueAmount> {
        self.expense_shares.get(&(expense_id, member)).copied()
    }
}
