//! # Error Types
//!
//! Errors shared across crates.

use crate::entities::{Address, TokenId, U256};
use thiserror::Error;

/// Errors raised by the per-chain token ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Holder's balance is below the requested amount.
    #[error("Insufficient balance: holder {holder:?} has {available} of token {token:?}, needs {required}")]
    InsufficientBalance {
        /// Token being moved.
        token: TokenId,
        /// Account being debited.
        holder: Address,
        /// Current balance.
        available: U256,
        /// Requested amount.
        required: U256,
    },

    /// Spender's allowance over the owner's funds is below the requested amount.
    #[error("Insufficient allowance: spender {spender:?} may move {available} from {owner:?}, needs {required}")]
    InsufficientAllowance {
        /// Account whose funds are being moved.
        owner: Address,
        /// Account moving the funds.
        spender: Address,
        /// Current allowance.
        available: U256,
        /// Requested amount.
        required: U256,
    },

    /// Minting would overflow the 256-bit supply.
    #[error("Supply overflow for token {0:?}")]
    SupplyOverflow(TokenId),
}
