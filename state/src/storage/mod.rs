//! The storage layer: the ledger's tables and their typed accessors
//!
//! The tables enforce no business rules beyond defaulting opaque cells to
//! zero on first read; all mutation policy lives in the applicator. The
//! serial-execution host owns durability, so the tables are in-memory

pub mod expenses;
pub mod ledger;
pub mod relationships;

use common::{
    keyed_list::KeyedList,
    types::{Expense, ExpenseId, Group, GroupId, Principal},
};
use fxhash::{FxHashMap, FxHashSet};
use opaque_types::OpaqueAmount;

/// The first id allocated for groups and expenses
const INITIAL_ID: u64 = 1;

/// The full table set backing the ledger
///
/// Membership lists use swap-remove keyed lists, so member order is not
/// stable across removals
#[derive(Debug)]
pub struct LedgerTables {
    // --- Groups & Membership --- //
    /// Group records by id
    pub(crate) groups: FxHashMap<GroupId, Group>,
    /// The next group id to allocate
    next_group_id: GroupId,
    /// The members of each group
    pub(crate) group_members: FxHashMap<GroupId, KeyedList<Principal, ()>>,
    /// The groups each principal belongs to; kept symmetric with
    /// `group_members` on every add and remove
    pub(crate) user_groups: FxHashMap<Principal, KeyedList<GroupId, ()>>,
    /// The opaque membership token of each (group, member) pair
    pub(crate) membership_tokens: FxHashMap<(GroupId, Principal), OpaqueAmount>,

    // --- Expenses --- //
    /// Expense records by id
    pub(crate) expenses: FxHashMap<ExpenseId, Expense>,
    /// The next expense id to allocate
    next_expense_id: ExpenseId,
    /// The expenses recorded against each group, in recording order
    pub(crate) group_expenses: FxHashMap<GroupId, Vec<ExpenseId>>,
    /// The opaque share of each (expense, member) pair
    pub(crate) expense_shares: FxHashMap<(ExpenseId, Principal), OpaqueAmount>,

    // --- Ledger Cells --- //
    /// Platform balances by principal
    pub(crate) balances: FxHashMap<Principal, OpaqueAmount>,
    /// Directional group-scoped debts: (group, debtor, creditor) -> amount.
    /// The reverse cell is independent; debts are never netted
    pub(crate) debts: FxHashMap<(GroupId, Principal, Principal), OpaqueAmount>,

    // --- Relationship Index --- //
    /// Per (group, debtor): the creditors they owe
    pub(crate) group_creditors: FxHashMap<(GroupId, Principal), KeyedList<Principal, ()>>,
    /// Per (group, creditor): the debtors that owe them
    pub(crate) group_debtors: FxHashMap<(GroupId, Principal), KeyedList<Principal, ()>>,
    /// The set of recorded (group, debtor, creditor) edges, guarding the
    /// directional lists against double appends
    pub(crate) debt_edges: FxHashSet<(GroupId, Principal, Principal)>,

    /// The canonical opaque zero returned for never-written cells
    opaque_zero: OpaqueAmount,
}

impl LedgerTables {
    /// Create an empty table set
    ///
    /// `opaque_zero` is an engine-minted zero used as the default for cells
    /// that have never been written
    pub fn new(opaque_zero: OpaqueAmount) -> Self {
        Self {
            groups: FxHashMap::default(),
            next_group_id: INITIAL_ID,
            group_members: FxHashMap::default(),
            user_groups: FxHashMap::default(),
            membership_tokens: FxHashMap::default(),
            expenses: FxHashMap::default(),
            next_expense_id: INITIAL_ID,
            group_expenses: FxHashMap::default(),
            expense_shares: FxHashMap::default(),
            balances: FxHashMap::default(),
            debts: FxHashMap::default(),
            group_creditors: FxHashMap::default(),
            group_debtors: FxHashMap::default(),
            debt_edges: FxHashSet::default(),
            opaque_zero,
        }
    }

    /// The canonical opaque zero handle
    pub fn opaque_zero(&self) -> OpaqueAmount {
        self.opaque_zero
    }

    // -------------------
    // | Groups |
    // -------------------

    /// Allocate the next group id
    pub fn next_group_id(&mut self) -> GroupId {
        let id = self.next_group_id;
        self.next_group_id += 1;

        id
    }

    /// Store a group record
    pub fn insert_group(&mut self, group: Group) {
        self.groups.insert(group.id, group);
    }

    /// Get a group record by id
    pub fn get_group(&self, group_id: GroupId) -> Option<&Group> {
        self.groups.get(&group_id)
    }

    /// Get a group that exists and is active
    pub fn get_active_group(&self, group_id: GroupId) -> Option<&Group> {
        self.groups.get(&group_id).filter(|g| g.active)
    }

    // -------------------
    // | Membership |
    // -------------------

    /// Whether `principal` is currently a member of `group_id`
    pub fn is_member(&self, group_id: GroupId, principal: Principal) -> bool {
        self.group_members
            .get(&group_id)
            .map(|members| members.contains_key(&principal))
            .unwrap_or(false)
    }

    /// Record a membership edge symmetrically in both directional lists
    ///
    /// Returns whether the edge was created, i.e. false for a duplicate add
    pub fn add_member_entry(&mut self, group_id: GroupId, member: Principal) -> bool {
        let inserted =
            self.group_members.entry(group_id).or_default().insert_if_absent(member, ());
        if inserted {
            self.user_groups.entry(member).or_default().insert_if_absent(group_id, ());
        }

        inserted
    }

    /// Remove a membership edge from both directional lists (swap-remove,
    /// order not preserved)
    ///
    /// Returns whether the edge existed
    pub fn remove_member_entry(&mut self, group_id: GroupId, member: Principal) -> bool {
        let removed = self
            .group_members
            .get_mut(&group_id)
            .and_then(|members| members.swap_remove(&member))
            .is_some();
        if removed {
            if let Some(groups) = self.user_groups.get_mut(&member) {
                groups.swap_remove(&group_id);
            }
        }

        removed
    }

    /// The current members of a group, in storage order
    pub fn members_of(&self, group_id: GroupId) -> Vec<Principal> {
        self.group_members
            .get(&group_id)
            .map(|members| members.keys().copied().collect())
            .unwrap_or_default()
    }

    /// The groups a principal currently belongs to, in storage order
    pub fn groups_of(&self, principal: Principal) -> Vec<GroupId> {
        self.user_groups
            .get(&principal)
            .map(|groups| groups.keys().copied().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod test {
    use common::types::{mocks::random_principal, Group};
    use opaque_types::OpaqueAmount;

    use super::LedgerTables;

    /// Build an empty table set with a dummy zero handle
    fn mock_tables() -> LedgerTables {
        LedgerTables::new(OpaqueAmount::from_raw(0))
    }

    /// Tests group id allocation is monotonic from one
    #[test]
    fn test_group_id_allocation() {
        let mut tables = mock_tables();
        assert_eq!(tables.next_group_id(), 1);
        assert_eq!(tables.next_group_id(), 2);
    }

    /// Tests the symmetric maintenance of the membership lists
    #[test]
    fn test_membership_symmetry() {
        let mut tables = mock_tables();
        let (a, b) = (random_principal(), random_principal());

        tables.insert_group(Group {
            id: 1,
            name: "trip".to_string(),
            creator: a,
            created_at: 0,
            active: true,
        });

        assert!(tables.add_member_entry(1, a));
        assert!(tables.add_member_entry(1, b));
        // Duplicate add is refused
        assert!(!tables.add_member_entry(1, a));

        for member in [a, b] {
            assert!(tables.is_member(1, member));
            assert!(tables.groups_of(member).contains(&1));
        }

        // Removal clears both directions
        assert!(tables.remove_member_entry(1, a));
        assert!(!tables.is_member(1, a));
        assert!(tables.groups_of(a).is_empty());
        assert!(tables.is_member(1, b));

        // Removing again is a no-op
        assert!(!tables.remove_member_entry(1, a));
    }

    /// Tests that an inactive group is not returned by the active lookup
    #[test]
    fn test_active_group_lookup() {
        let mut tables = mock_tables();
        tables.insert_group(Group {
            id: 7,
            name: "stale".to_string(),
            creator: random_principal(),
            created_at: 0,
            active: false,
        });

        assert!(tables.get_group(7).is_some());
        assert!(tables.get_active_group(7).is_none());
    }
}
