//! Applicator methods for groups and membership, separated out for
//! discoverability

use common::bus_message::LedgerBusMessage;
use common::get_current_time_millis;
use common::types::{Group, GroupId, Principal};
use itertools::Itertools;

use super::{error::StateApplicatorError, return_type::ApplicatorReturnType, Result, StateApplicator};

/// Error message emitted when a group does not exist or is inactive
const ERR_GROUP_NOT_FOUND: &str = "group not found or inactive";
/// Error message emitted when a principal is already a group member
const ERR_ALREADY_MEMBER: &str = "principal is already a member of the group";
/// Error message emitted when a principal is not a group member
const ERR_NOT_MEMBER: &str = "principal is not a member of the group";
/// Error message emitted when an initial member batch contains duplicates
const ERR_DUPLICATE_MEMBERS: &str = "initial member batch contains duplicates";

impl StateApplicator {
    // -------------
    // | Interface |
    // -------------

    /// Create a group and add its initial member batch
    ///
    /// Admin-only. The batch is validated for duplicates up front so the
    /// per-member adds below cannot fail partway through
    pub fn create_group(
        &mut self,
        caller: Principal,
        name: String,
        members: &[Principal],
    ) -> Result<ApplicatorReturnType> {
        self.check_admin(caller)?;
        if !members.iter().all_unique() {
            return Err(StateApplicatorError::AlreadyMember(ERR_DUPLICATE_MEMBERS.to_string()));
        }

        let id = self.tables.next_group_id();
        let group = Group {
            id,
            name,
            creator: caller,
            created_at: get_current_time_millis(),
            active: true,
        };
        self.tables.insert_group(group);

        for member in members.iter().copied() {
            self.add_member_inner(id, member)?;
        }

        self.publish(LedgerBusMessage::GroupCreated {
            group_id: id,
            creator: caller,
            timestamp: get_current_time_millis(),
        });
        Ok(ApplicatorReturnType::GroupCreated(id))
    }

    /// Add a member to a group
    ///
    /// Admin-only. Mints a fresh membership token for the member and grants
    /// every current member read access to every other member's token
    pub fn add_member(
        &mut self,
        caller: Principal,
        group_id: GroupId,
        member: Principal,
    ) -> Result<ApplicatorReturnType> {
        self.check_admin(caller)?;
        if self.tables.get_active_group(group_id).is_none() {
            return Err(StateApplicatorError::NotFound(ERR_GROUP_NOT_FOUND.to_string()));
        }

        self.add_member_inner(group_id, member)?;

        self.publish(LedgerBusMessage::MemberAdded {
            group_id,
            member,
            timestamp: get_current_time_millis(),
        });
        Ok(ApplicatorReturnType::None)
    }

    /// Remove a member from a group
    ///
    /// Admin-only. Swap-removes the member from both directional lists and
    /// resets their membership token to opaque zero. Historical debts and
    /// relationship-index edges are untouched
    pub fn remove_member(
        &mut self,
        caller: Principal,
        group_id: GroupId,
        member: Principal,
    ) -> Result<ApplicatorReturnType> {
        self.check_admin(caller)?;
        if self.tables.get_group(group_id).is_none() {
            return Err(StateApplicatorError::NotFound(ERR_GROUP_NOT_FOUND.to_string()));
        }
        if !self.tables.remove_member_entry(group_id, member) {
            return Err(StateApplicatorError::NotMember(ERR_NOT_MEMBER.to_string()));
        }

        // Reset the token; the old handle is never handed out again
        let admin = self.config.admin;
        let (tables, engine) = self.tables_and_engine();
        let reset = engine.zero();
        engine.authorize(reset, admin)?;
        tables.set_membership_token(group_id, member, reset);

        self.publish(LedgerBusMessage::MemberRemoved {
            group_id,
            member,
            timestamp: get_current_time_millis(),
        });
        Ok(ApplicatorReturnType::None)
    }

    // -----------
    // | Helpers |
    // -----------

    /// Record the membership edge and mint the member's token, with the
    /// symmetric token-read grants
    ///
    /// Assumes the group has already been validated; fails only on a
    /// duplicate add, before any mutation
    fn add_member_inner(&mut self, group_id: GroupId, member: Principal) -> Result<()> {
        if !self.tables.add_member_entry(group_id, member) {
            return Err(StateApplicatorError::AlreadyMember(ERR_ALREADY_MEMBER.to_string()));
        }

        let admin = self.config.admin;
        let (tables, engine) = self.tables_and_engine();

        // Mint the new member's token, readable by the member and admin
        let token = engine.zero();
        engine.authorize(token, member)?;
        engine.authorize(token, admin)?;

        // Symmetric grants: every existing member may read the new token,
        // and the new member may read every existing token
        for existing in tables.members_of(group_id).into_iter().filter(|&m| m != member) {
            engine.authorize(token, existing)?;
            if let Some(existing_token) = tables.membership_token(group_id, existing) {
                engine.authorize(existing_token, member)?;
            }
        }

        tables.set_membership_token(group_id, member, token);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use common::types::mocks::random_principal;
    use opaque_types::OpaqueEngine;

    use crate::applicator::error::StateApplicatorError;
    use crate::applicator::test_helpers::mock_applicator;

    /// Tests group creation with an initial member batch
    #[test]
    fn test_create_group() {
        let mut mock = mock_applicator();
        let (a, b) = (random_principal(), random_principal());

        let id = mock
            .applicator
            .create_group(mock.admin, "trip".to_string(), &[a, b])
            .unwrap()
            .group_id();
        assert_eq!(id, 1);

        let tables = mock.applicator.tables();
        let group = tables.get_group(id).unwrap();
        assert!(group.active);
        assert_eq!(group.creator, mock.admin);

        // Membership is symmetric
        for member in [a, b] {
            assert!(tables.is_member(id, member));
            assert_eq!(tables.groups_of(member), vec![id]);
        }
    }

    /// Tests that a non-admin caller cannot create a group
    #[test]
    fn test_create_group_unauthorized() {
        let mut mock = mock_applicator();
        let intruder = random_principal();

        let res = mock.applicator.create_group(intruder, "nope".to_string(), &[]);
        assert!(matches!(res, Err(StateApplicatorError::Unauthorized(_))));
        assert!(mock.applicator.tables().get_group(1).is_none());
    }

    /// Tests that a duplicate initial batch is rejected before any mutation
    #[test]
    fn test_create_group_duplicate_batch() {
        let mut mock = mock_applicator();
        let a = random_principal();

        let res = mock.applicator.create_group(mock.admin, "dupes".to_string(), &[a, a]);
        assert!(matches!(res, Err(StateApplicatorError::AlreadyMember(_))));
        assert!(mock.applicator.tables().get_group(1).is_none());
    }

    /// Tests duplicate member adds and adds to missing groups
    #[test]
    fn test_add_member_errors() {
        let mut mock = mock_applicator();
        let a = random_principal();
        let id =
            mock.applicator.create_group(mock.admin, "g".to_string(), &[a]).unwrap().group_id();

        let res = mock.applicator.add_member(mock.admin, id, a);
        assert!(matches!(res, Err(StateApplicatorError::AlreadyMember(_))));

        let res = mock.applicator.add_member(mock.admin, id + 1, a);
        assert!(matches!(res, Err(StateApplicatorError::NotFound(_))));
    }

    /// Tests that every current member may read a new member's token
    #[test]
    fn test_token_grants_on_add() {
        let mut mock = mock_applicator();
        let (a, b, c) = (random_principal(), random_principal(), random_principal());
        let id = mock
            .applicator
            .create_group(mock.admin, "g".to_string(), &[a, b])
            .unwrap()
            .group_id();

        mock.applicator.add_member(mock.admin, id, c).unwrap();

        let token_c = mock.applicator.tables().membership_token(id, c).unwrap();
        for reader in [a, b, c, mock.admin] {
            assert!(mock.engine.is_authorized(token_c, reader).unwrap());
        }

        // The new member may read the existing members' tokens too
        let token_a = mock.applicator.tables().membership_token(id, a).unwrap();
        assert!(mock.engine.is_authorized(token_a, c).unwrap());
    }

    /// Tests removal then re-add: the token is re-minted and readable by all
    /// current members
    #[test]
    fn test_remove_then_readd_resets_token() {
        let mut mock = mock_applicator();
        let (a, b, c) = (random_principal(), random_principal(), random_principal());
        let id = mock
            .applicator
            .create_group(mock.admin, "g".to_string(), &[a, b, c])
            .unwrap()
            .group_id();

        let old_token = mock.applicator.tables().membership_token(id, c).unwrap();
        mock.applicator.remove_member(mock.admin, id, c).unwrap();
        assert!(!mock.applicator.tables().is_member(id, c));

        mock.applicator.add_member(mock.admin, id, c).unwrap();
        let new_token = mock.applicator.tables().membership_token(id, c).unwrap();

        assert_ne!(old_token, new_token);
        for reader in [a, b, c] {
            assert!(mock.engine.is_authorized(new_token, reader).unwrap());
        }
    }

    /// Tests that removing a non-member fails
    #[test]
    fn test_remove_non_member() {
        let mut mock = mock_applicator();
        let a = random_principal();
        let id =
            mock.applicator.create_group(mock.admin, "g".to_string(), &[a]).unwrap().group_id();

        let res = mock.applicator.remove_member(mock.admin, id, random_principal());
        assert!(matches!(res, Err(StateApplicatorError::NotMember(_))));
    }
}
