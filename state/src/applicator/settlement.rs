//! Applicator methods for deposits, withdrawals, and the auto-settling
//! in-group transfer
//!
//! The settlement path never branches on a secret: "settle up to what is
//! owed" is expressed as `settle = min(amount, debt)` followed by two
//! saturating subtractions, all in the opaque algebra

use common::bus_message::LedgerBusMessage;
use common::get_current_time_millis;
use common::types::{GroupId, Principal};
use opaque_types::OpaqueAmount;
use tracing::info;

use super::{error::StateApplicatorError, return_type::ApplicatorReturnType, Result, StateApplicator};

/// Error message emitted when a group does not exist or is inactive
const ERR_GROUP_NOT_FOUND: &str = "group not found or inactive";
/// Error message emitted when a transfer party is not a group member
const ERR_NOT_MEMBER: &str = "transfer party is not a member of the group";
/// Error message emitted on a self- or null-recipient transfer
const ERR_BAD_RECIPIENT: &str = "transfer recipient must be a distinct, non-null member";
/// Error message emitted when an account has no authorization over its own
/// balance
const ERR_BALANCE_NOT_AUTHORIZED: &str = "account is not authorized over its own balance";

impl StateApplicator {
    // -------------
    // | Interface |
    // -------------

    /// Deposit external funds into the account's platform balance
    ///
    /// The vault transfer runs first; the balance is credited with the
    /// amount the vault actually moved, which may be less than requested
    /// under partial-transfer semantics
    pub fn deposit(
        &mut self,
        account: Principal,
        amount: OpaqueAmount,
    ) -> Result<ApplicatorReturnType> {
        let moved = self.config.vault.deposit(account, amount)?;

        let admin = self.config.admin;
        let (tables, engine) = self.tables_and_engine();
        let balance = tables.balance(account);
        let new_balance = engine.add(balance, moved)?;
        engine.authorize(new_balance, account)?;
        engine.authorize(new_balance, admin)?;
        tables.set_balance(account, new_balance);

        info!("deposit completed for {account}");
        self.publish(LedgerBusMessage::DepositCompleted {
            account,
            timestamp: get_current_time_millis(),
        });
        Ok(ApplicatorReturnType::None)
    }

    /// Withdraw funds from the account's platform balance
    ///
    /// The new balance is computed before the vault push and only written
    /// back after the push succeeds, so a vault failure leaves the tables
    /// untouched. Insufficient funds surface at the vault boundary; the
    /// opaque subtraction itself saturates at zero
    pub fn withdraw(
        &mut self,
        account: Principal,
        amount: OpaqueAmount,
    ) -> Result<ApplicatorReturnType> {
        let balance = self.tables.balance(account);
        self.check_balance_authorization(account, balance)?;

        let new_balance = self.config.engine.sub(balance, amount)?;
        self.config.vault.withdraw(account, amount)?;

        let admin = self.config.admin;
        let (tables, engine) = self.tables_and_engine();
        engine.authorize(new_balance, account)?;
        engine.authorize(new_balance, admin)?;
        tables.set_balance(account, new_balance);

        info!("withdrawal completed for {account}");
        self.publish(LedgerBusMessage::WithdrawalCompleted {
            account,
            timestamp: get_current_time_millis(),
        });
        Ok(ApplicatorReturnType::None)
    }

    /// Withdraw the account's entire platform balance
    ///
    /// Reads the balance, pushes it out through the vault, then replaces the
    /// cell with a fresh opaque zero. Serial execution makes the
    /// read-zero-withdraw sequence atomic from the caller's perspective
    pub fn withdraw_all(&mut self, account: Principal) -> Result<ApplicatorReturnType> {
        let balance = self.tables.balance(account);
        self.check_balance_authorization(account, balance)?;

        self.config.vault.withdraw(account, balance)?;

        let admin = self.config.admin;
        let (tables, engine) = self.tables_and_engine();
        let zeroed = engine.zero();
        engine.authorize(zeroed, account)?;
        engine.authorize(zeroed, admin)?;
        tables.set_balance(account, zeroed);

        info!("withdrawal completed for {account}");
        self.publish(LedgerBusMessage::WithdrawalCompleted {
            account,
            timestamp: get_current_time_millis(),
        });
        Ok(ApplicatorReturnType::None)
    }

    /// Transfer funds to another member of the group, deducting any debt the
    /// sender owes the recipient in that group before crediting the rest
    ///
    /// With `settle = min(amount, debt)`:
    /// - the debt cell becomes `debt - settle`
    /// - the remainder `amount - settle` moves between balances
    ///
    /// Only the directional debt `from -> to` is considered; a reverse debt
    /// is never netted. The debt settlement and the balance movement apply
    /// as one unit: every precondition is checked before the first write
    pub fn transfer_in_group(
        &mut self,
        group_id: GroupId,
        from: Principal,
        to: Principal,
        amount: OpaqueAmount,
    ) -> Result<ApplicatorReturnType> {
        // Preconditions
        if self.tables.get_active_group(group_id).is_none() {
            return Err(StateApplicatorError::NotFound(ERR_GROUP_NOT_FOUND.to_string()));
        }
        if to == from || to.is_zero() {
            return Err(StateApplicatorError::InvalidInput(ERR_BAD_RECIPIENT.to_string()));
        }
        for party in [from, to] {
            if !self.tables.is_member(group_id, party) {
                return Err(StateApplicatorError::NotMember(ERR_NOT_MEMBER.to_string()));
            }
        }

        let admin = self.config.admin;
        let (tables, engine) = self.tables_and_engine();

        // Clamped settlement in the opaque algebra
        let debt = tables.debt(group_id, from, to);
        let settle = engine.min(amount, debt)?;
        let new_debt = engine.sub(debt, settle)?;
        let remainder = engine.sub(amount, settle)?;

        let new_from_balance = engine.sub(tables.balance(from), remainder)?;
        let new_to_balance = engine.add(tables.balance(to), remainder)?;

        // Commit and re-authorize every touched cell for its readers
        for reader in [from, to, admin] {
            engine.authorize(new_debt, reader)?;
        }
        tables.set_debt(group_id, from, to, new_debt);

        engine.authorize(new_from_balance, from)?;
        engine.authorize(new_from_balance, admin)?;
        tables.set_balance(from, new_from_balance);

        engine.authorize(new_to_balance, to)?;
        engine.authorize(new_to_balance, admin)?;
        tables.set_balance(to, new_to_balance);

        info!("transfer completed in group {group_id}");
        self.publish(LedgerBusMessage::TransferCompleted {
            group_id,
            from,
            to,
            timestamp: get_current_time_millis(),
        });
        Ok(ApplicatorReturnType::None)
    }

    // -----------
    // | Helpers |
    // -----------

    /// Require that the account holds authorization over its own balance
    ///
    /// Guards withdrawal paths against first-touch states in which no
    /// deposit ever granted the account access to its balance cell
    fn check_balance_authorization(
        &self,
        account: Principal,
        balance: OpaqueAmount,
    ) -> Result<()> {
        if !self.config.engine.is_authorized(balance, account)? {
            return Err(StateApplicatorError::Unauthorized(
                ERR_BALANCE_NOT_AUTHORIZED.to_string(),
            ));
        }

        Ok(())
    }
}
