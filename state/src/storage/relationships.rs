//! The relationship index: per-group creditor and debtor lists with an edge
//! set guarding against double appends
//!
//! The index is a liveness hint, not a source of truth for amounts: an edge
//! persists after later settlement reduces its debt to zero (pruning would
//! require a cleartext zero check the core cannot perform). Callers must
//! always re-fetch the opaque debt cell

use common::types::{GroupId, Principal};
use itertools::Itertools;

use super::LedgerTables;

impl LedgerTables {
    /// Record a directional debt edge if it has not been recorded before
    ///
    /// Appends `creditor` to the debtor's creditor list and `debtor` to the
    /// creditor's debtor list, exactly once per ordered pair. Idempotent by
    /// construction: a second call for the same pair is a no-op
    pub fn record_edge_if_new(
        &mut self,
        group_id: GroupId,
        debtor: Principal,
        creditor: Principal,
    ) {
        if !self.debt_edges.insert((group_id, debtor, creditor)) {
            return;
        }

        self.group_creditors.entry((group_id, debtor)).or_default().insert_if_absent(creditor, ());
        self.group_debtors.entry((group_id, creditor)).or_default().insert_if_absent(debtor, ());
    }

    /// Whether a directional edge has ever been recorded
    pub fn has_edge(&self, group_id: GroupId, debtor: Principal, creditor: Principal) -> bool {
        self.debt_edges.contains(&(group_id, debtor, creditor))
    }

    /// Whether two principals share a recorded edge in any group, in either
    /// direction
    pub fn shares_edge(&self, a: Principal, b: Principal) -> bool {
        self.debt_edges
            .iter()
            .any(|&(_, debtor, creditor)| (debtor, creditor) == (a, b) || (debtor, creditor) == (b, a))
    }

    /// The creditors `debtor` has ever owed in `group_id`
    pub fn creditors_of(&self, group_id: GroupId, debtor: Principal) -> Vec<Principal> {
        self.group_creditors
            .get(&(group_id, debtor))
            .map(|list| list.keys().copied().collect())
            .unwrap_or_default()
    }

    /// The debtors that have ever owed `creditor` in `group_id`
    pub fn debtors_of(&self, group_id: GroupId, creditor: Principal) -> Vec<Principal> {
        self.group_debtors
            .get(&(group_id, creditor))
            .map(|list| list.keys().copied().collect())
            .unwrap_or_default()
    }

    /// The groups in which `principal` has any recorded edge, in either
    /// direction
    ///
    /// A pure filter over the principal's group list combined with index
    /// lookups; no opaque values are touched
    pub fn groups_with_edges(&self, principal: Principal) -> Vec<GroupId> {
        self.groups_of(principal)
            .into_iter()
            .filter(|&g| {
                !self.creditors_of(g, principal).is_empty()
                    || !self.debtors_of(g, principal).is_empty()
            })
            .collect_vec()
    }

    /// All creditors of `principal` across its groups, grouped by group
    pub fn all_creditors_of(&self, principal: Principal) -> Vec<(GroupId, Vec<Principal>)> {
        self.groups_of(principal)
            .into_iter()
            .map(|g| (g, self.creditors_of(g, principal)))
            .filter(|(_, creditors)| !creditors.is_empty())
            .collect_vec()
    }

    /// All debtors of `principal` across its groups, grouped by group
    pub fn all_debtors_of(&self, principal: Principal) -> Vec<(GroupId, Vec<Principal>)> {
        self.groups_of(principal)
            .into_iter()
            .map(|g| (g, self.debtors_of(g, principal)))
            .filter(|(_, debtors)| !debtors.is_empty())
            .collect_vec()
    }
}
