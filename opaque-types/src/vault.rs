//! The asset vault trait: custody transfers against the external
//! confidential asset ledger

use common::types::Principal;
use thiserror::Error;

use crate::engine::OpaqueAmount;

/// The error type emitted by an asset vault
#[derive(Clone, Debug, Error)]
pub enum VaultError {
    /// The vault's custody balance cannot cover a withdrawal
    ///
    /// This is where insufficient funds surface: the ledger core cannot
    /// inspect opaque balances, so the solvency check is deferred to the
    /// asset-transfer boundary
    #[error("insufficient funds for withdrawal")]
    InsufficientFunds,
    /// An error from the underlying opaque engine
    #[error("engine error: {0}")]
    Engine(String),
}

/// Moves value between external principal holdings and platform custody
///
/// Both operations succeed or fail atomically; a failed transfer moves
/// nothing
pub trait AssetVault {
    /// Move `amount` opaque units from `from`'s external holding into
    /// platform custody
    ///
    /// Returns the amount actually transferred, which may be less than
    /// requested under the external ledger's partial-transfer semantics.
    /// Callers must credit the returned amount, never the requested one
    fn deposit(&mut self, from: Principal, amount: OpaqueAmount)
        -> Result<OpaqueAmount, VaultError>;

    /// Move `amount` opaque units from platform custody to `to`'s external
    /// holding
    fn withdraw(&mut self, to: Principal, amount: OpaqueAmount) -> Result<(), VaultError>;
}
