//! Defines the domain types shared by the ledger crates

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// The byte length of a principal identifier
pub const PRINCIPAL_BYTE_LENGTH: usize = 32;

/// A type alias for group identifiers, allocated from a monotonic counter
pub type GroupId = u64;
/// A type alias for expense identifiers, allocated from a monotonic counter
pub type ExpenseId = u64;
/// A type alias for unix timestamps in milliseconds
pub type Timestamp = u64;

/// An opaque account identifier for a party known to the ledger
///
/// Principals are established by the authenticating host; the ledger core
/// treats them as uninterpreted 32-byte values
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Principal(pub [u8; PRINCIPAL_BYTE_LENGTH]);

impl Principal {
    /// The all-zeroes principal, used as the null-recipient sentinel
    pub const ZERO: Principal = Principal([0u8; PRINCIPAL_BYTE_LENGTH]);

    /// Construct a principal from its raw bytes
    pub fn new(bytes: [u8; PRINCIPAL_BYTE_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Whether this is the null principal
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// A group of principals that share expenses with one another
///
/// Immutable after creation except for its membership; `active` never
/// reverts to `false`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// The group's identifier
    pub id: GroupId,
    /// The human-readable group name
    pub name: String,
    /// The principal that created the group
    pub creator: Principal,
    /// The time at which the group was created
    pub created_at: Timestamp,
    /// Whether the group is active
    pub active: bool,
}

/// An expense recorded against a group
///
/// The share amounts are stored separately as opaque values; the expense
/// record itself carries only public metadata
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// The expense's identifier
    pub id: ExpenseId,
    /// The group the expense was recorded against
    pub group_id: GroupId,
    /// The principal that paid the expense
    pub payer: Principal,
    /// A free-form description of the expense
    pub description: String,
    /// The time at which the expense was recorded
    pub created_at: Timestamp,
}

/// Mock constructors for the types in this module
#[cfg(feature = "mocks")]
pub mod mocks {
    use rand::{thread_rng, RngCore};

    use super::{Principal, PRINCIPAL_BYTE_LENGTH};

    /// Create a random principal
    pub fn random_principal() -> Principal {
        let mut rng = thread_rng();
        let mut bytes = [0u8; PRINCIPAL_BYTE_LENGTH];
        rng.fill_bytes(&mut bytes);

        Principal::new(bytes)
    }
}
