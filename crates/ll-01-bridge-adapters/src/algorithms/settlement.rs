//! # Settlement Ledger
//!
//! Per-adapter record of what has been settled and claimed.
//!
//! Each key moves `Unknown → Settled → Claimed` at most once. The caller
//! holds one lock around the ledger, which is what makes duplicate vendor
//! callbacks and racing claims safe.

use crate::domain::{BridgeAdapterError, CorrelationKey, SettlementRecord, SettlementState};
use shared_types::U256;
use std::collections::HashMap;

/// Settlement records keyed by correlation key.
#[derive(Debug, Default)]
pub struct SettlementLedger {
    records: HashMap<CorrelationKey, SettlementRecord>,
}

impl SettlementLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` against `key`.
    ///
    /// # Errors
    ///
    /// `DuplicateSettlement` if `key` was settled before; nothing is credited.
    pub fn settle(&mut self, key: CorrelationKey, amount: U256) -> Result<(), BridgeAdapterError> {
        if let Some(record) = self.records.get_mut(&key) {
            return record.transition_to(SettlementState::Settled);
        }
        self.records.insert(key, SettlementRecord::settled(key, amount));
        Ok(())
    }

    /// Amount claimable under `key`, without changing state.
    ///
    /// # Errors
    ///
    /// - `NotSettled` if nothing was credited yet
    /// - `AlreadyClaimed` if the key was claimed
    pub fn claimable(&self, key: &CorrelationKey) -> Result<U256, BridgeAdapterError> {
        match self.records.get(key) {
            None => Err(BridgeAdapterError::NotSettled(*key)),
            Some(r) if r.state == SettlementState::Claimed => {
                Err(BridgeAdapterError::AlreadyClaimed(*key))
            }
            Some(r) => Ok(r.amount),
        }
    }

    /// Retire `key` after its funds left the adapter.
    pub fn mark_claimed(&mut self, key: &CorrelationKey) -> Result<U256, BridgeAdapterError> {
        let record = self
            .records
            .get_mut(key)
            .ok_or(BridgeAdapterError::NotSettled(*key))?;
        record.transition_to(SettlementState::Claimed)?;
        Ok(record.amount)
    }

    /// Current state of `key`.
    pub fn state(&self, key: &CorrelationKey) -> SettlementState {
        self.records
            .get(key)
            .map(|r| r.state)
            .unwrap_or_default()
    }

    /// Record for `key`, if any.
    pub fn record(&self, key: &CorrelationKey) -> Option<&SettlementRecord> {
        self.records.get(key)
    }

    /// Settled but unclaimed records.
    pub fn pending(&self) -> Vec<SettlementRecord> {
        self.records
            .values()
            .filter(|r| r.state == SettlementState::Settled)
            .cloned()
            .collect()
    }

    /// Sum of settled but unclaimed amounts.
    pub fn reserved(&self) -> U256 {
        self.records
            .values()
            .filter(|r| r.state == SettlementState::Settled)
            .fold(U256::zero(), |acc, r| acc.saturating_add(r.amount))
    }

    /// Number of records in any state.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no settlement was ever recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::H256;

    fn key(n: u8) -> CorrelationKey {
        CorrelationKey(H256::repeat_byte(n))
    }

    #[test]
    fn test_settle_then_claim() {
        let mut ledger = SettlementLedger::new();
        ledger.settle(key(1), U256::from(1000)).unwrap();
        assert_eq!(ledger.state(&key(1)), SettlementState::Settled);
        assert_eq!(ledger.claimable(&key(1)), Ok(U256::from(1000)));
        assert_eq!(ledger.mark_claimed(&key(1)), Ok(U256::from(1000)));
        assert_eq!(ledger.state(&key(1)), SettlementState::Claimed);
    }

    #[test]
    fn test_duplicate_settlement_credits_nothing() {
        let mut ledger = SettlementLedger::new();
        ledger.settle(key(1), U256::from(10)).unwrap();
        assert_eq!(
            ledger.settle(key(1), U256::from(99)),
            Err(BridgeAdapterError::DuplicateSettlement(key(1)))
        );
        assert_eq!(ledger.claimable(&key(1)), Ok(U256::from(10)));
    }

    #[test]
    fn test_settle_after_claim_is_duplicate() {
        let mut ledger = SettlementLedger::new();
        ledger.settle(key(1), U256::from(10)).unwrap();
        ledger.mark_claimed(&key(1)).unwrap();
        assert_eq!(
            ledger.settle(key(1), U256::from(10)),
            Err(BridgeAdapterError::DuplicateSettlement(key(1)))
        );
    }

    #[test]
    fn test_claim_errors() {
        let mut ledger = SettlementLedger::new();
        assert_eq!(
            ledger.claimable(&key(2)),
            Err(BridgeAdapterError::NotSettled(key(2)))
        );
        assert_eq!(
            ledger.mark_claimed(&key(2)),
            Err(BridgeAdapterError::NotSettled(key(2)))
        );

        ledger.settle(key(2), U256::from(1)).unwrap();
        ledger.mark_claimed(&key(2)).unwrap();
        assert_eq!(
            ledger.claimable(&key(2)),
            Err(BridgeAdapterError::AlreadyClaimed(key(2)))
        );
        assert_eq!(
            ledger.mark_claimed(&key(2)),
            Err(BridgeAdapterError::AlreadyClaimed(key(2)))
        );
    }

    #[test]
    fn test_reserved_tracks_unclaimed_only() {
        let mut ledger = SettlementLedger::new();
        ledger.settle(key(1), U256::from(30)).unwrap();
        ledger.settle(key(2), U256::from(70)).unwrap();
        assert_eq!(ledger.reserved(), U256::from(100));
        assert_eq!(ledger.pending().len(), 2);

        ledger.mark_claimed(&key(1)).unwrap();
        assert_eq!(ledger.reserved(), U256::from(70));
        assert_eq!(ledger.pending().len(), 1);
        assert_eq!(ledger.len(), 2);
    }
}
