//! Applicator methods for recording expenses and folding shares into the
//! debt table

use common::bus_message::LedgerBusMessage;
use common::get_current_time_millis;
use common::types::{Expense, GroupId, Principal};
use opaque_types::OpaqueAmount;

use super::{error::StateApplicatorError, return_type::ApplicatorReturnType, Result, StateApplicator};

/// Error message emitted when a group does not exist or is inactive
const ERR_GROUP_NOT_FOUND: &str = "group not found or inactive";
/// Error message emitted when the payer is not a group member
const ERR_PAYER_NOT_MEMBER: &str = "payer is not a member of the group";
/// Error message emitted when a listed participant is not a group member
const ERR_PARTICIPANT_NOT_MEMBER: &str = "expense participant is not a member of the group";
/// Error message emitted when the member and share arrays disagree
const ERR_SHARE_MISMATCH: &str = "members and shares must be non-empty and of equal length";

impl StateApplicator {
    /// Record an expense against a group
    ///
    /// Admin-submitted. Each `(member, share)` pair is stored as an opaque
    /// expense share readable by the member, the payer, and admin; every
    /// non-payer share is folded into `debt[group][member][payer]` and the
    /// relationship edge recorded. The payer's own share is stored for
    /// historical display but never becomes self-debt
    ///
    /// All preconditions are checked before the first write; the mutation
    /// phase is a sequence of pure additions with no failure condition
    pub fn add_expense(
        &mut self,
        caller: Principal,
        group_id: GroupId,
        payer: Principal,
        members: &[Principal],
        shares: &[OpaqueAmount],
        description: String,
    ) -> Result<ApplicatorReturnType> {
        // Preconditions
        self.check_admin(caller)?;
        if self.tables.get_active_group(group_id).is_none() {
            return Err(StateApplicatorError::NotFound(ERR_GROUP_NOT_FOUND.to_string()));
        }
        if members.is_empty() || members.len() != shares.len() {
            return Err(StateApplicatorError::InvalidInput(ERR_SHARE_MISMATCH.to_string()));
        }
        if !self.tables.is_member(group_id, payer) {
            return Err(StateApplicatorError::NotMember(ERR_PAYER_NOT_MEMBER.to_string()));
        }
        for member in members {
            if !self.tables.is_member(group_id, *member) {
                return Err(StateApplicatorError::NotMember(
                    ERR_PARTICIPANT_NOT_MEMBER.to_string(),
                ));
            }
        }

        // Validate every share handle against the engine up front; an
        // unknown handle would otherwise fail the mutation loop mid-write
        for share in shares {
            self.config.engine.is_authorized(*share, payer)?;
        }

        // Record the expense
        let expense_id = self.tables.next_expense_id();
        self.tables.insert_expense(Expense {
            id: expense_id,
            group_id,
            payer,
            description,
            created_at: get_current_time_millis(),
        });

        // Record shares and fold non-payer shares into the debt table
        let admin = self.config.admin;
        let (tables, engine) = self.tables_and_engine();
        for (member, share) in members.iter().copied().zip(shares.iter().copied()) {
            tables.set_expense_share(expense_id, member, share);
            for reader in [member, payer, admin] {
                engine.authorize(share, reader)?;
            }

            // Paying for oneself creates no self-debt
            if member == payer {
                continue;
            }

            let debt = tables.debt(group_id, member, payer);
            let new_debt = engine.add(debt, share)?;
            for reader in [member, payer, admin] {
                engine.authorize(new_debt, reader)?;
            }
            tables.set_debt(group_id, member, payer, new_debt);
            tables.record_edge_if_new(group_id, member, payer);
        }

        self.publish(LedgerBusMessage::ExpenseAdded {
            group_id,
            expense_id,
            payer,
            timestamp: get_current_time_millis(),
        });
        Ok(ApplicatorReturnType::ExpenseAdded(expense_id))
    }
}

#[cfg(test)]
mod test {
    use common::types::mocks::random_principal;
    use common::types::Principal;
    use opaque_types::OpaqueEngine;

    use crate::applicator::error::StateApplicatorError;
    use crate::applicator::test_helpers::{mock_applicator, MockLedger};

    /// Create a group of three members and return (mock, group id, members)
    fn group_of_three() -> (MockLedger, u64, [Principal; 3]) {
        let mut mock = mock_applicator();
        let members = [random_principal(), random_principal(), random_principal()];
        let id = mock
            .applicator
            .create_group(mock.admin, "trip".to_string(), &members)
            .unwrap()
            .group_id();

        (mock, id, members)
    }

    /// Tests the expense fan-out of the even-split scenario: each non-payer
    /// share becomes a debt toward the payer, the payer's own share does not
    #[test]
    fn test_expense_fan_out() {
        let (mut mock, group, [a, b, c]) = group_of_three();

        let shares = [100u64, 100, 100]
            .map(|v| mock.engine.encrypt(v, mock.admin));
        let expense_id = mock
            .applicator
            .add_expense(mock.admin, group, a, &[a, b, c], &shares, "hotel".to_string())
            .unwrap()
            .expense_id();

        let tables = mock.applicator.tables();
        for debtor in [b, c] {
            let debt = tables.debt(group, debtor, a);
            assert_eq!(mock.engine.cleartext(debt).unwrap(), 100);
            assert!(tables.has_edge(group, debtor, a));
        }

        // The payer's own share is recorded but creates no self-debt
        assert!(tables.expense_share(expense_id, a).is_some());
        let self_debt = tables.debt(group, a, a);
        assert_eq!(mock.engine.cleartext(self_debt).unwrap(), 0);
        assert!(!tables.has_edge(group, a, a));
    }

    /// Tests that repeated expenses accumulate debt but index an edge once
    #[test]
    fn test_repeat_expenses_accumulate() {
        let (mut mock, group, [a, b, _c]) = group_of_three();

        for _ in 0..2 {
            let shares = [40u64, 60].map(|v| mock.engine.encrypt(v, mock.admin));
            mock.applicator
                .add_expense(mock.admin, group, a, &[a, b], &shares, "taxi".to_string())
                .unwrap();
        }

        let tables = mock.applicator.tables();
        let debt = tables.debt(group, b, a);
        assert_eq!(mock.engine.cleartext(debt).unwrap(), 120);
        assert_eq!(tables.creditors_of(group, b), vec![a]);
        assert_eq!(tables.debtors_of(group, a), vec![b]);
    }

    /// Tests that the debt cell is readable by exactly its parties and admin
    #[test]
    fn test_debt_cell_authorization() {
        let (mut mock, group, [a, b, c]) = group_of_three();

        let shares = [50u64, 50].map(|v| mock.engine.encrypt(v, mock.admin));
        mock.applicator
            .add_expense(mock.admin, group, a, &[a, b], &shares, "gas".to_string())
            .unwrap();

        let debt = mock.applicator.tables().debt(group, b, a);
        for reader in [a, b, mock.admin] {
            assert!(mock.engine.is_authorized(debt, reader).unwrap());
        }
        assert!(!mock.engine.is_authorized(debt, c).unwrap());
    }

    /// Tests that a share handle the engine never issued fails the
    /// operation before any record is written
    #[test]
    fn test_unknown_share_handle_no_mutation() {
        let (mut mock, group, [a, b, _c]) = group_of_three();

        let good = mock.engine.encrypt(10, mock.admin);
        let bogus = opaque_types::OpaqueAmount::from_raw(999_999);
        let res = mock.applicator.add_expense(
            mock.admin,
            group,
            a,
            &[a, b],
            &[good, bogus],
            "bad".to_string(),
        );
        assert!(matches!(res, Err(StateApplicatorError::Engine(_))));

        let tables = mock.applicator.tables();
        assert!(tables.get_expense(1).is_none());
        assert!(tables.expenses_of(group).is_empty());
        assert!(tables.expense_share(1, a).is_none());
    }

    /// Tests each precondition failure leaves the tables untouched
    #[test]
    fn test_precondition_failures() {
        let (mut mock, group, [a, b, _c]) = group_of_three();
        let outsider = random_principal();

        let share = mock.engine.encrypt(10, mock.admin);

        // Mismatched arrays
        let res = mock.applicator.add_expense(
            mock.admin,
            group,
            a,
            &[a, b],
            &[share],
            "bad".to_string(),
        );
        assert!(matches!(res, Err(StateApplicatorError::InvalidInput(_))));

        // Non-member payer
        let res = mock.applicator.add_expense(
            mock.admin,
            group,
            outsider,
            &[outsider],
            &[share],
            "bad".to_string(),
        );
        assert!(matches!(res, Err(StateApplicatorError::NotMember(_))));

        // Non-member participant
        let res = mock.applicator.add_expense(
            mock.admin,
            group,
            a,
            &[outsider],
            &[share],
            "bad".to_string(),
        );
        assert!(matches!(res, Err(StateApplicatorError::NotMember(_))));

        // Missing group
        let res = mock.applicator.add_expense(
            mock.admin,
            group + 1,
            a,
            &[a],
            &[share],
            "bad".to_string(),
        );
        assert!(matches!(res, Err(StateApplicatorError::NotFound(_))));

        // Non-admin caller
        let res =
            mock.applicator.add_expense(a, group, a, &[a], &[share], "bad".to_string());
        assert!(matches!(res, Err(StateApplicatorError::Unauthorized(_))));

        // No expense was recorded by any failed call
        assert!(mock.applicator.tables().get_expense(1).is_none());
        assert!(mock.applicator.tables().expenses_of(group).is_empty());
    }
}
