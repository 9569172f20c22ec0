//! Cleartext mock implementations of the opaque engine and asset vault
//!
//! The mock engine holds each value as a plain `u64` behind an engine-issued
//! handle, with a per-handle access-control list. Tests mint inputs with
//! [`MockOpaqueEngine::encrypt`] and inspect results with
//! [`MockOpaqueEngine::reveal`], which enforces the ACL the same way a real
//! backend's decryption gate would

use std::sync::{Arc, RwLock};

use common::types::Principal;
use fxhash::FxHashMap;
use std::collections::HashSet;

use crate::{
    engine::{OpaqueAmount, OpaqueEngine, OpaqueError},
    vault::{AssetVault, VaultError},
};

// ---------------
// | Mock Engine |
// ---------------

/// A cleartext cell held by the mock engine
#[derive(Clone, Debug)]
struct MockCell {
    /// The concealed value
    value: u64,
    /// The principals permitted to learn the value
    acl: HashSet<Principal>,
}

/// The interior state of the mock engine
#[derive(Default, Debug)]
struct MockEngineState {
    /// The cells issued by the engine, keyed by raw handle id
    cells: FxHashMap<u64, MockCell>,
    /// The next raw handle id to issue
    next_handle: u64,
}

impl MockEngineState {
    /// Mint a new cell with the given value and ACL
    fn mint(&mut self, value: u64, acl: HashSet<Principal>) -> OpaqueAmount {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.cells.insert(handle, MockCell { value, acl });

        OpaqueAmount::from_raw(handle)
    }

    /// Read the cell behind a handle
    fn cell(&self, handle: OpaqueAmount) -> Result<&MockCell, OpaqueError> {
        self.cells.get(&handle.to_raw()).ok_or(OpaqueError::UnknownHandle(handle))
    }
}

/// A cleartext mock of the opaque arithmetic engine
///
/// Cheaply clonable; clones share the same cell table, which lets the mock
/// vault resolve handles minted through the same engine
#[derive(Clone, Default, Debug)]
pub struct MockOpaqueEngine {
    /// The shared cell table
    state: Arc<RwLock<MockEngineState>>,
}

impl MockOpaqueEngine {
    /// Constructor
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a handle concealing `value`, readable by `owner`
    pub fn encrypt(&mut self, value: u64, owner: Principal) -> OpaqueAmount {
        let mut state = self.state.write().unwrap();
        state.mint(value, HashSet::from([owner]))
    }

    /// Learn the cleartext behind `value`, enforcing the ACL
    pub fn reveal(&self, value: OpaqueAmount, requester: Principal) -> Result<u64, OpaqueError> {
        let state = self.state.read().unwrap();
        let cell = state.cell(value)?;
        if !cell.acl.contains(&requester) {
            return Err(OpaqueError::NotAuthorized);
        }

        Ok(cell.value)
    }

    /// Read a cleartext without an ACL check
    ///
    /// Trusted-collaborator access for the mock vault and for test
    /// assertions that are not themselves about authorization
    pub fn cleartext(&self, value: OpaqueAmount) -> Result<u64, OpaqueError> {
        let state = self.state.read().unwrap();
        Ok(state.cell(value)?.value)
    }

    /// Apply a binary cleartext operation, minting a fresh cell with an
    /// empty ACL for the result
    fn binary_op(
        &mut self,
        a: OpaqueAmount,
        b: OpaqueAmount,
        op: impl Fn(u64, u64) -> u64,
    ) -> Result<OpaqueAmount, OpaqueError> {
        let mut state = self.state.write().unwrap();
        let lhs = state.cell(a)?.value;
        let rhs = state.cell(b)?.value;

        Ok(state.mint(op(lhs, rhs), HashSet::new()))
    }
}

impl OpaqueEngine for MockOpaqueEngine {
    fn zero(&mut self) -> OpaqueAmount {
        let mut state = self.state.write().unwrap();
        state.mint(0, HashSet::new())
    }

    fn add(&mut self, a: OpaqueAmount, b: OpaqueAmount) -> Result<OpaqueAmount, OpaqueError> {
        self.binary_op(a, b, |x, y| x.saturating_add(y))
    }

    fn sub(&mut self, a: OpaqueAmount, b: OpaqueAmount) -> Result<OpaqueAmount, OpaqueError> {
        // Saturating, per the trait contract
        self.binary_op(a, b, |x, y| x.saturating_sub(y))
    }

    fn min(&mut self, a: OpaqueAmount, b: OpaqueAmount) -> Result<OpaqueAmount, OpaqueError> {
        self.binary_op(a, b, std::cmp::min)
    }

    fn authorize(
        &mut self,
        value: OpaqueAmount,
        principal: Principal,
    ) -> Result<(), OpaqueError> {
        let mut state = self.state.write().unwrap();
        let handle = value.to_raw();
        let cell =
            state.cells.get_mut(&handle).ok_or(OpaqueError::UnknownHandle(value))?;
        cell.acl.insert(principal);

        Ok(())
    }

    fn is_authorized(
        &self,
        value: OpaqueAmount,
        principal: Principal,
    ) -> Result<bool, OpaqueError> {
        let state = self.state.read().unwrap();
        Ok(state.cell(value)?.acl.contains(&principal))
    }
}

// --------------
// | Mock Vault |
// --------------

/// The interior state of the mock vault
#[derive(Default, Debug)]
struct MockVaultState {
    /// External holdings per principal
    external: FxHashMap<Principal, u64>,
    /// The platform's custody total
    custody: u64,
}

/// A cleartext mock of the external confidential asset ledger
///
/// Tracks per-principal external holdings and a single platform custody
/// total. Deposits transfer up to the holder's available funds (exercising
/// the partial-transfer contract); withdrawals fail if custody cannot cover
/// them. Cheaply clonable: clones share the same holdings
#[derive(Clone, Debug)]
pub struct MockAssetVault {
    /// The engine used to resolve and mint amount handles
    engine: MockOpaqueEngine,
    /// The shared holdings table
    state: Arc<RwLock<MockVaultState>>,
}

impl MockAssetVault {
    /// Create a vault sharing cells with the given engine
    pub fn new(engine: MockOpaqueEngine) -> Self {
        Self { engine, state: Arc::new(RwLock::new(MockVaultState::default())) }
    }

    /// Credit a principal's external holding (test setup)
    pub fn fund(&mut self, principal: Principal, amount: u64) {
        let mut state = self.state.write().unwrap();
        *state.external.entry(principal).or_default() += amount;
    }

    /// The external holding of a principal
    pub fn external_balance(&self, principal: Principal) -> u64 {
        let state = self.state.read().unwrap();
        state.external.get(&principal).copied().unwrap_or_default()
    }

    /// The platform custody total
    pub fn custody(&self) -> u64 {
        self.state.read().unwrap().custody
    }
}

impl AssetVault for MockAssetVault {
    fn deposit(
        &mut self,
        from: Principal,
        amount: OpaqueAmount,
    ) -> Result<OpaqueAmount, VaultError> {
        let requested =
            self.engine.cleartext(amount).map_err(common::err_str!(VaultError::Engine))?;

        // Partial-transfer semantics: move at most the available holding
        let mut state = self.state.write().unwrap();
        let available = state.external.entry(from).or_default();
        let moved = std::cmp::min(requested, *available);
        *available -= moved;
        state.custody += moved;

        let mut engine_state = self.engine.state.write().unwrap();
        Ok(engine_state.mint(moved, HashSet::from([from])))
    }

    fn withdraw(&mut self, to: Principal, amount: OpaqueAmount) -> Result<(), VaultError> {
        let requested =
            self.engine.cleartext(amount).map_err(common::err_str!(VaultError::Engine))?;

        let mut state = self.state.write().unwrap();
        if state.custody < requested {
            return Err(VaultError::InsufficientFunds);
        }

        state.custody -= requested;
        *state.external.entry(to).or_default() += requested;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use common::types::mocks::random_principal;

    use super::{MockAssetVault, MockOpaqueEngine};
    use crate::engine::{OpaqueEngine, OpaqueError};
    use crate::vault::{AssetVault, VaultError};

    /// Tests the saturating subtraction contract
    #[test]
    fn test_sub_saturates() {
        let mut engine = MockOpaqueEngine::new();
        let owner = random_principal();

        let small = engine.encrypt(10, owner);
        let large = engine.encrypt(25, owner);
        let diff = engine.sub(small, large).unwrap();

        assert_eq!(engine.cleartext(diff).unwrap(), 0);
    }

    /// Tests that operation results carry an empty ACL until authorized
    #[test]
    fn test_results_require_reauthorization() {
        let mut engine = MockOpaqueEngine::new();
        let owner = random_principal();

        let a = engine.encrypt(3, owner);
        let b = engine.encrypt(4, owner);
        let sum = engine.add(a, b).unwrap();

        assert!(matches!(engine.reveal(sum, owner), Err(OpaqueError::NotAuthorized)));

        engine.authorize(sum, owner).unwrap();
        assert_eq!(engine.reveal(sum, owner).unwrap(), 7);
    }

    /// Tests authorization does not leak the value to the authorizer
    #[test]
    fn test_authorize_additional_reader() {
        let mut engine = MockOpaqueEngine::new();
        let (owner, reader, stranger) =
            (random_principal(), random_principal(), random_principal());

        let value = engine.encrypt(99, owner);
        engine.authorize(value, reader).unwrap();

        assert_eq!(engine.reveal(value, reader).unwrap(), 99);
        assert!(engine.reveal(value, stranger).is_err());
        assert!(engine.is_authorized(value, owner).unwrap());
    }

    /// Tests the partial-transfer semantics of deposits
    #[test]
    fn test_partial_deposit() {
        let mut engine = MockOpaqueEngine::new();
        let mut vault = MockAssetVault::new(engine.clone());
        let account = random_principal();
        vault.fund(account, 60);

        let requested = engine.encrypt(100, account);
        let moved = vault.deposit(account, requested).unwrap();

        assert_eq!(engine.cleartext(moved).unwrap(), 60);
        assert_eq!(vault.external_balance(account), 0);
        assert_eq!(vault.custody(), 60);
    }

    /// Tests that withdrawals past custody fail atomically
    #[test]
    fn test_withdraw_insufficient_custody() {
        let mut engine = MockOpaqueEngine::new();
        let mut vault = MockAssetVault::new(engine.clone());
        let account = random_principal();
        vault.fund(account, 50);

        let deposit = engine.encrypt(50, account);
        vault.deposit(account, deposit).unwrap();

        let over = engine.encrypt(80, account);
        let res = vault.withdraw(account, over);
        assert!(matches!(res, Err(VaultError::InsufficientFunds)));

        // Nothing moved
        assert_eq!(vault.custody(), 50);
        assert_eq!(vault.external_balance(account), 0);
    }
}
