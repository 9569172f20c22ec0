//! Error types emitted by the state applicator

use std::{error::Error, fmt::Display};

use opaque_types::{OpaqueError, VaultError};

/// The error type emitted by the state applicator
///
/// Every error is raised before the first table write of its operation, so
/// a failed transition leaves the tables exactly as they were
#[derive(Clone, Debug)]
pub enum StateApplicatorError {
    /// A referenced group or expense does not exist (or is inactive)
    NotFound(String),
    /// A principal is not in the required group
    NotMember(String),
    /// A duplicate membership add
    AlreadyMember(String),
    /// The caller lacks the capability for this operation
    Unauthorized(String),
    /// Malformed input: null recipient, self-transfer, mismatched arrays
    InvalidInput(String),
    /// An error from the opaque arithmetic engine
    Engine(OpaqueError),
    /// An error from the asset vault
    Vault(VaultError),
}

impl Display for StateApplicatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for StateApplicatorError {}

impl From<OpaqueError> for StateApplicatorError {
    fn from(value: OpaqueError) -> Self {
        Self::Engine(value)
    }
}

impl From<VaultError> for StateApplicatorError {
    fn from(value: VaultError) -> Self {
        Self::Vault(value)
    }
}
