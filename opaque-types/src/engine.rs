//! The opaque arithmetic engine trait and the handle type it issues

use std::fmt::{self, Display};

use common::types::Principal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A handle referring to a secret `u64` held by the opaque engine
///
/// Handles are engine-issued and cheap to copy; the ledger core never sees
/// the cleartext behind one. Handle equality means "same engine cell", so a
/// re-minted value (e.g. a reset membership token) compares unequal to its
/// predecessor even when both conceal the same cleartext
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpaqueAmount(u64);

impl OpaqueAmount {
    /// Construct a handle from its raw engine-issued id
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// The raw engine-issued id of the handle
    pub fn to_raw(self) -> u64 {
        self.0
    }
}

impl Display for OpaqueAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "opaque({})", self.0)
    }
}

/// The error type emitted by an opaque engine
#[derive(Clone, Debug, Error)]
pub enum OpaqueError {
    /// A handle was presented that the engine did not issue
    #[error("unknown opaque handle: {0}")]
    UnknownHandle(OpaqueAmount),
    /// The requester is not authorized to learn the cleartext of a value
    #[error("requester is not authorized for this value")]
    NotAuthorized,
}

/// The arithmetic engine over opaque amounts
///
/// Every operation is total over any pair of engine-issued handles,
/// regardless of who may read them. The contract the ledger core relies on:
///
/// - `sub` saturates at zero; together with the `min`-then-`sub` settlement
///   algebra this keeps every debt cell conceptually non-negative without a
///   cleartext comparison
/// - `authorize` extends a value's access-control list without revealing
///   anything to the caller
/// - results of `add` / `sub` / `min` carry an empty access-control list;
///   the caller re-authorizes readers explicitly after every mutation
pub trait OpaqueEngine {
    /// Mint a fresh opaque zero
    fn zero(&mut self) -> OpaqueAmount;

    /// Add two opaque amounts, minting a new handle for the sum
    fn add(&mut self, a: OpaqueAmount, b: OpaqueAmount) -> Result<OpaqueAmount, OpaqueError>;

    /// Subtract `b` from `a`, saturating at zero, minting a new handle
    fn sub(&mut self, a: OpaqueAmount, b: OpaqueAmount) -> Result<OpaqueAmount, OpaqueError>;

    /// The minimum of two opaque amounts, minted as a new handle
    fn min(&mut self, a: OpaqueAmount, b: OpaqueAmount) -> Result<OpaqueAmount, OpaqueError>;

    /// Grant `principal` the right to ever learn the cleartext of `value`
    fn authorize(&mut self, value: OpaqueAmount, principal: Principal)
        -> Result<(), OpaqueError>;

    /// Whether `principal` is on the access-control list of `value`
    fn is_authorized(&self, value: OpaqueAmount, principal: Principal)
        -> Result<bool, OpaqueError>;
}
