//! The return type of the applicator, carrying allocated ids back to the
//! host

use common::types::{ExpenseId, GroupId};
use serde::{Deserialize, Serialize};

/// The values a successfully applied transition may return
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicatorReturnType {
    /// A group was created with the given id
    GroupCreated(GroupId),
    /// An expense was recorded with the given id
    ExpenseAdded(ExpenseId),
    /// No return value
    None,
}

impl ApplicatorReturnType {
    /// Unwrap a `GroupCreated` return, panicking on other variants
    ///
    /// Test convenience only
    #[cfg(any(test, feature = "mocks"))]
    pub fn group_id(self) -> GroupId {
        match self {
            Self::GroupCreated(id) => id,
            other => panic!("expected GroupCreated, got {other:?}"),
        }
    }

    /// Unwrap an `ExpenseAdded` return, panicking on other variants
    ///
    /// Test convenience only
    #[cfg(any(test, feature = "mocks"))]
    pub fn expense_id(self) -> ExpenseId {
        match self {
            Self::ExpenseAdded(id) => id,
            other => panic!("expected ExpenseAdded, got {other:?}"),
        }
    }
}
