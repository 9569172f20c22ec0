//! The access-control gate: a pure predicate deciding which principals may
//! receive which opaque handles
//!
//! Every gated query consults [`can_read`] before returning data. The gate
//! complements the engine-level ACLs: the gate decides whether a handle is
//! handed out at all, the engine decides who can ever learn its cleartext

use common::types::{ExpenseId, GroupId, Principal};

use crate::storage::LedgerTables;

/// A readable resource of the ledger, keyed as in the storage tables
#[derive(Clone, Copy, Debug)]
pub enum Resource {
    /// The platform balance of a principal
    Balance {
        /// The balance's owner
        of: Principal,
    },
    /// A directional group-scoped debt cell
    Debt {
        /// The group the debt is scoped to
        group_id: GroupId,
        /// The owing principal
        debtor: Principal,
        /// The owed principal
        creditor: Principal,
    },
    /// The member list of a group
    GroupMembers {
        /// The group
        group_id: GroupId,
    },
    /// The creditor or debtor list of a principal within one group
    GroupRelationships {
        /// The group the lists are scoped to
        group_id: GroupId,
        /// The principal the lists belong to
        of: Principal,
    },
    /// The cross-group creditor/debtor aggregate of a principal
    CrossGroupRelationships {
        /// The principal the aggregate belongs to
        of: Principal,
    },
    /// The membership token of a member in a group
    MembershipToken {
        /// The group the token is scoped to
        group_id: GroupId,
        /// The token's member
        member: Principal,
    },
    /// The opaque share of a member in an expense
    ExpenseShare {
        /// The expense
        expense_id: ExpenseId,
        /// The member whose share is requested
        member: Principal,
    },
}

/// Whether `requester` may read `resource`
///
/// The admin principal may read everything; the remaining rules implement
/// the per-resource reader table
pub fn can_read(
    tables: &LedgerTables,
    admin: Principal,
    requester: Principal,
    resource: Resource,
) -> bool {
    if requester == admin {
        return true;
    }

    match resource {
        // The owner, or anyone sharing a recorded debt edge with the owner
        // in any group, in either direction
        Resource::Balance { of } => requester == of || tables.shares_edge(requester, of),

        // Only the two parties to the debt
        Resource::Debt { debtor, creditor, .. } => requester == debtor || requester == creditor,

        // Any current member of the group
        Resource::GroupMembers { group_id } => tables.is_member(group_id, requester),

        // Membership alone suffices, broader than the balance rule
        Resource::GroupRelationships { group_id, of } => {
            requester == of || tables.is_member(group_id, requester)
        },

        // Only the principal itself (and admin, above)
        Resource::CrossGroupRelationships { of } => requester == of,

        // Any current member of the group
        Resource::MembershipToken { group_id, .. } => tables.is_member(group_id, requester),

        // The member, or the expense's payer
        Resource::ExpenseShare { expense_id, member } => {
            requester == member
                || tables.get_expense(expense_id).map(|e| e.payer == requester).unwrap_or(false)
        },
    }
}

#[cfg(test)]
mod test {
    use common::types::{mocks::random_principal, Expense, Principal};
    use opaque_types::OpaqueAmount;

    use super::{can_read, Resource};
    use crate::storage::LedgerTables;

    /// A fixture holding the tables and the principals used across rows
    struct GateFixture {
        /// The populated tables
        tables: LedgerTables,
        /// The admin principal
        admin: Principal,
        /// A group member that owes `creditor` in group 1
        debtor: Principal,
        /// A group member owed by `debtor` in group 1
        creditor: Principal,
        /// A member of group 1 with no recorded edges
        bystander: Principal,
        /// A principal outside every group
        outsider: Principal,
    }

    /// Build tables with one group of three members and one recorded edge
    fn fixture() -> GateFixture {
        let mut tables = LedgerTables::new(OpaqueAmount::from_raw(0));
        let admin = random_principal();
        let debtor = random_principal();
        let creditor = random_principal();
        let bystander = random_principal();
        let outsider = random_principal();

        for member in [debtor, creditor, bystander] {
            tables.add_member_entry(1, member);
        }
        tables.record_edge_if_new(1, debtor, creditor);
        tables.insert_expense(Expense {
            id: 1,
            group_id: 1,
            payer: creditor,
            description: "dinner".to_string(),
            created_at: 0,
        });

        GateFixture { tables, admin, debtor, creditor, bystander, outsider }
    }

    /// Balance row: owner, admin, and edge-sharers may read; others may not
    #[test]
    fn test_balance_rule() {
        let f = fixture();
        let resource = Resource::Balance { of: f.debtor };

        assert!(can_read(&f.tables, f.admin, f.debtor, resource));
        assert!(can_read(&f.tables, f.admin, f.admin, resource));
        // Edge sharers in either direction
        assert!(can_read(&f.tables, f.admin, f.creditor, resource));
        assert!(can_read(&f.tables, f.admin, f.debtor, Resource::Balance { of: f.creditor }));
        // Membership alone is not enough for a balance
        assert!(!can_read(&f.tables, f.admin, f.bystander, resource));
        assert!(!can_read(&f.tables, f.admin, f.outsider, resource));
    }

    /// Debt row: only the two parties and admin
    #[test]
    fn test_debt_rule() {
        let f = fixture();
        let resource = Resource::Debt { group_id: 1, debtor: f.debtor, creditor: f.creditor };

        for allowed in [f.debtor, f.creditor, f.admin] {
            assert!(can_read(&f.tables, f.admin, allowed, resource));
        }
        for denied in [f.bystander, f.outsider] {
            assert!(!can_read(&f.tables, f.admin, denied, resource));
        }
    }

    /// Member list row: any current member and admin
    #[test]
    fn test_group_members_rule() {
        let f = fixture();
        let resource = Resource::GroupMembers { group_id: 1 };

        for allowed in [f.debtor, f.creditor, f.bystander, f.admin] {
            assert!(can_read(&f.tables, f.admin, allowed, resource));
        }
        assert!(!can_read(&f.tables, f.admin, f.outsider, resource));
    }

    /// Group relationship lists: the subject, any member of the group, admin
    #[test]
    fn test_group_relationships_rule() {
        let f = fixture();
        let resource = Resource::GroupRelationships { group_id: 1, of: f.debtor };

        for allowed in [f.debtor, f.bystander, f.admin] {
            assert!(can_read(&f.tables, f.admin, allowed, resource));
        }
        assert!(!can_read(&f.tables, f.admin, f.outsider, resource));
    }

    /// Cross-group aggregates: the subject and admin only
    #[test]
    fn test_cross_group_rule() {
        let f = fixture();
        let resource = Resource::CrossGroupRelationships { of: f.debtor };

        assert!(can_read(&f.tables, f.admin, f.debtor, resource));
        assert!(can_read(&f.tables, f.admin, f.admin, resource));
        // Even a co-member of every shared group is denied
        assert!(!can_read(&f.tables, f.admin, f.creditor, resource));
        assert!(!can_read(&f.tables, f.admin, f.bystander, resource));
    }

    /// Membership tokens: any current member of the group and admin
    #[test]
    fn test_membership_token_rule() {
        let f = fixture();
        let resource = Resource::MembershipToken { group_id: 1, member: f.debtor };

        for allowed in [f.debtor, f.creditor, f.bystander, f.admin] {
            assert!(can_read(&f.tables, f.admin, allowed, resource));
        }
        assert!(!can_read(&f.tables, f.admin, f.outsider, resource));
    }

    /// Expense shares: the member, the payer, and admin
    #[test]
    fn test_expense_share_rule() {
        let f = fixture();
        let resource = Resource::ExpenseShare { expense_id: 1, member: f.debtor };

        // Payer is `creditor` in the fixture
        for allowed in [f.debtor, f.creditor, f.admin] {
            assert!(can_read(&f.tables, f.admin, allowed, resource));
        }
        for denied in [f.bystander, f.outsider] {
            assert!(!can_read(&f.tables, f.admin, denied, resource));
        }
    }
}
