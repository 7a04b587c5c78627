//! # Token Ledger
//!
//! Per-chain fungible token balances with ERC-20 style allowances.
//!
//! Every chain in a deployment owns exactly one ledger; tokens are keyed by
//! their contract address on that chain. The ledger is the sole place where
//! value is created (`mint`) or destroyed (`burn`), which is what lets tests
//! assert conservation across the two rails.

use crate::entities::{short_hex, Address, Domain, TokenId, U256};
use crate::errors::LedgerError;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

#[derive(Default)]
struct LedgerState {
    balances: HashMap<(TokenId, Address), U256>,
    allowances: HashMap<(TokenId, Address, Address), U256>,
    supply: HashMap<TokenId, U256>,
}

/// In-memory token ledger for one chain.
pub struct InMemoryTokenLedger {
    domain: Domain,
    state: RwLock<LedgerState>,
}

impl InMemoryTokenLedger {
    /// Create an empty ledger for `domain`.
    #[must_use]
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            state: RwLock::new(LedgerState::default()),
        }
    }

    /// Domain this ledger belongs to.
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Balance of `holder` in `token`.
    pub fn balance_of(&self, token: TokenId, holder: Address) -> U256 {
        self.state
            .read()
            .balances
            .get(&(token, holder))
            .copied()
            .unwrap_or_default()
    }

    /// Total minted minus burned for `token`.
    pub fn total_supply(&self, token: TokenId) -> U256 {
        self.state
            .read()
            .supply
            .get(&token)
            .copied()
            .unwrap_or_default()
    }

    /// Allowance `owner` granted `spender` over `token`.
    pub fn allowance(&self, token: TokenId, owner: Address, spender: Address) -> U256 {
        self.state
            .read()
            .allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    /// Create `amount` of `token` in `to`'s balance.
    pub fn mint(&self, token: TokenId, to: Address, amount: U256) -> Result<(), LedgerError> {
        let mut state = self.state.write();
        let supply = state.supply.entry(token).or_default();
        *supply = supply
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow(token))?;
        *state.balances.entry((token, to)).or_default() += amount;
        debug!(
            domain = self.domain,
            token = %short_hex(&token),
            to = %short_hex(&to),
            %amount,
            "[ledger] mint"
        );
        Ok(())
    }

    /// Destroy `amount` of `token` from `from`'s balance.
    pub fn burn(&self, token: TokenId, from: Address, amount: U256) -> Result<(), LedgerError> {
        let mut state = self.state.write();
        Self::debit(&mut state, token, from, amount)?;
        if let Some(supply) = state.supply.get_mut(&token) {
            *supply = supply.saturating_sub(amount);
        }
        debug!(
            domain = self.domain,
            token = %short_hex(&token),
            from = %short_hex(&from),
            %amount,
            "[ledger] burn"
        );
        Ok(())
    }

    /// Move `amount` of `token` from `from` to `to`.
    pub fn transfer(
        &self,
        token: TokenId,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.write();
        Self::debit(&mut state, token, from, amount)?;
        *state.balances.entry((token, to)).or_default() += amount;
        Ok(())
    }

    /// Set `spender`'s allowance over `owner`'s `token` to `amount`.
    pub fn approve(&self, token: TokenId, owner: Address, spender: Address, amount: U256) {
        self.state
            .write()
            .allowances
            .insert((token, owner, spender), amount);
    }

    /// Move `amount` of `owner`'s `token` to `to`, spending `spender`'s allowance.
    ///
    /// Balance is checked before allowance so callers see the more actionable
    /// error first. Nothing changes on failure.
    pub fn transfer_from(
        &self,
        token: TokenId,
        spender: Address,
        owner: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.write();

        let available = state
            .balances
            .get(&(token, owner))
            .copied()
            .unwrap_or_default();
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                token,
                holder: owner,
                available,
                required: amount,
            });
        }

        let allowance = state
            .allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default();
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner,
                spender,
                available: allowance,
                required: amount,
            });
        }

        state
            .allowances
            .insert((token, owner, spender), allowance - amount);
        Self::debit(&mut state, token, owner, amount)?;
        *state.balances.entry((token, to)).or_default() += amount;
        Ok(())
    }

    fn debit(
        state: &mut LedgerState,
        token: TokenId,
        holder: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let balance = state.balances.entry((token, holder)).or_default();
        if *balance < amount {
            return Err(LedgerError::InsufficientBalance {
                token,
                holder,
                available: *balance,
                required: amount,
            });
        }
        *balance -= amount;
        Ok(())
    }
}
