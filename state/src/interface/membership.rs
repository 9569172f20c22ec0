//! State interface methods for group and membership queries

use common::types::{Group, GroupId, Principal};
use opaque_types::OpaqueAmount;

use crate::access::Resource;

use super::{Result, State, StateError};

/// Error message emitted when a queried group does not exist
const ERR_GROUP_NOT_FOUND: &str = "group not found";

impl State {
    /// Get a group's metadata
    ///
    /// Ungated: group metadata carries no amounts
    pub fn get_group(&self, group_id: GroupId) -> Result<Option<Group>> {
        Ok(self.read()?.tables().get_group(group_id).cloned())
    }

    /// Get the groups a principal is a member of
    pub fn get_user_groups(&self, principal: Principal) -> Result<Vec<GroupId>> {
        Ok(self.read()?.tables().groups_of(principal))
    }

    /// Get the member list of a group; gated to current members
    pub fn get_group_members(
        &self,
        requester: Principal,
        group_id: GroupId,
    ) -> Result<Vec<Principal>> {
        let applicator = self.read()?;
        Self::check_access(&applicator, requester, Resource::GroupMembers { group_id })?;
        if applicator.tables().get_group(group_id).is_none() {
            return Err(StateError::NotFound(ERR_GROUP_NOT_FOUND.to_string()));
        }

        Ok(applicator.tables().members_of(group_id))
    }

    /// Get a member's opaque membership token in a group; gated to current
    /// members
    ///
    /// `None` indicates the principal was never a member of the group. A
    /// removed member's token remains present, reset to an opaque zero
    pub fn get_membership_token(
        &self,
        requester: Principal,
        group_id: GroupId,
        member: Principal,
    ) -> Result<Option<OpaqueAmount>> {
        let applicator = self.read()?;
        Self::check_access(&applicator, requester, Resource::MembershipToken {
            group_id,
            member,
        })?;

        Ok(applicator.tables().membership_token(group_id, member))
    }
}
