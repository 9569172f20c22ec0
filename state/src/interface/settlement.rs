//! State interface methods for balance, debt, and relationship queries
//!
//! The relationship indices answer "who might I owe" without touching any
//! amount: an index entry is a liveness hint recording that a debt cell was
//! written at least once, and persists after the debt settles to zero

use common::types::{GroupId, Principal};
use opaque_types::OpaqueAmount;

use crate::access::Resource;

use super::{Result, State};

impl State {
    /// Get a principal's opaque platform balance; gated to the principal,
    /// anyone sharing a recorded debt edge with them, and the admin
    ///
    /// An account with no deposit history reads as the canonical opaque zero
    pub fn get_balance(&self, requester: Principal, of: Principal) -> Result<OpaqueAmount> {
        let applicator = self.read()?;
        Self::check_access(&applicator, requester, Resource::Balance { of })?;

        Ok(applicator.tables().balance(of))
    }

    /// Get the opaque debt `debtor` owes `creditor` within a group; gated to
    /// the two parties and the admin
    ///
    /// A never-written cell reads as the canonical opaque zero
    pub fn get_debt(
        &self,
        requester: Principal,
        group_id: GroupId,
        debtor: Principal,
        creditor: Principal,
    ) -> Result<OpaqueAmount> {
        let applicator = self.read()?;
        Self::check_access(&applicator, requester, Resource::Debt {
            group_id,
            debtor,
            creditor,
        })?;

        Ok(applicator.tables().debt(group_id, debtor, creditor))
    }

    /// Get the principals `of` has ever owed within a group; gated to the
    /// principal, fellow group members, and the admin
    pub fn get_creditors(
        &self,
        requester: Principal,
        group_id: GroupId,
        of: Principal,
    ) -> Result<Vec<Principal>> {
        let applicator = self.read()?;
        Self::check_access(&applicator, requester, Resource::GroupRelationships {
            group_id,
            of,
        })?;

        Ok(applicator.tables().creditors_of(group_id, of))
    }

    /// Get the principals that have ever owed `of` within a group; gated as
    /// [`get_creditors`](Self::get_creditors)
    pub fn get_debtors(
        &self,
        requester: Principal,
        group_id: GroupId,
        of: Principal,
    ) -> Result<Vec<Principal>> {
        let applicator = self.read()?;
        Self::check_access(&applicator, requester, Resource::GroupRelationships {
            group_id,
            of,
        })?;

        Ok(applicator.tables().debtors_of(group_id, of))
    }

    /// Get `of`'s creditors across every group; gated to the principal and
    /// the admin
    pub fn get_all_creditors(
        &self,
        requester: Principal,
        of: Principal,
    ) -> Result<Vec<(GroupId, Vec<Principal>)>> {
        let applicator = self.read()?;
        Self::check_access(&applicator, requester, Resource::CrossGroupRelationships { of })?;

        Ok(applicator.tables().all_creditors_of(of))
    }

    /// Get `of`'s debtors across every group; gated as
    /// [`get_all_creditors`](Self::get_all_creditors)
    pub fn get_all_debtors(
        &self,
        requester: Principal,
        of: Principal,
    ) -> Result<Vec<(GroupId, Vec<Principal>)>> {
        let applicator = self.read()?;
        Self::check_access(&applicator, requester, Resource::CrossGroupRelationships { of })?;

        Ok(applicator.tables().all_debtors_of(of))
    }

    /// Get the groups in which `of` has ever carried a debt edge, in either
    /// direction; gated as a cross-group aggregate
    pub fn get_groups_with_debts(
        &self,
        requester: Principal,
        of: Principal,
    ) -> Result<Vec<GroupId>> {
        let applicator = self.read()?;
        Self::check_access(&applicator, requester, Resource::CrossGroupRelationships { of })?;

        Ok(applicator.tables().groups_with_edges(of))
    }
}
