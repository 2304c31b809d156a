use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use crate::models::{DirectTransaction, RawSwapEvent};

/// Identity of one processed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKey {
    Log { tx_hash: B256, log_index: u64 },
    /// Swap log from a source that reports no log index
    Block { tx_hash: B256, block_number: u64 },
    /// Plain value transfer
    Transaction { tx_hash: B256, block_number: u64 },
}

impl EventKey {
    /// Key for a swap log.
    pub fn new(tx_hash: B256, log_index: Option<u64>, block_number: u64) -> Self {
        match log_index {
            Some(log_index) => EventKey::Log { tx_hash, log_index },
            None => EventKey::Block { tx_hash, block_number },
        }
    }
}

/// Anything the ledger can track.
pub trait LedgerEntry {
    fn event_key(&self) -> EventKey;
}

impl LedgerEntry for RawSwapEvent {
    fn event_key(&self) -> EventKey {
        EventKey::new(self.tx_hash(), self.log_index(), self.block_number())
    }
}

impl LedgerEntry for DirectTransaction {
    fn event_key(&self) -> EventKey {
        EventKey::Transaction {
            tx_hash: self.tx_hash,
            block_number: self.block_number,
        }
    }
}

/// Result of merging one batch into the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerDelta<T> {
    /// Entries never seen before, in input order
    pub new_entries: Vec<T>,
    /// Entries dropped as already recorded or repeated within the batch
    pub already_seen: usize,
}

/// Per-address record of processed events across analysis runs.
///
/// Keys are only ever added. The ledger is serializable so a sink can
/// persist it between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenEventLedger {
    #[serde(default)]
    seen: BTreeMap<Address, BTreeSet<EventKey>>,
}

impl SeenEventLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_seen(&self, address: Address, key: &EventKey) -> bool {
        self.seen.get(&address).is_some_and(|keys| keys.contains(key))
    }

    /// Whether any swap log of `tx_hash` has been recorded for `address`.
    pub fn has_swap_tx(&self, address: Address, tx_hash: B256) -> bool {
        let Some(keys) = self.seen.get(&address) else {
            return false;
        };
        let logs = EventKey::Log { tx_hash, log_index: 0 }..=EventKey::Log {
            tx_hash,
            log_index: u64::MAX,
        };
        let blocks = EventKey::Block { tx_hash, block_number: 0 }..=EventKey::Block {
            tx_hash,
            block_number: u64::MAX,
        };
        keys.range(logs).next().is_some() || keys.range(blocks).next().is_some()
    }

    /// Number of keys recorded for `address`.
    pub fn len_for(&self, address: Address) -> usize {
        self.seen.get(&address).map_or(0, BTreeSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.seen.values().all(BTreeSet::is_empty)
    }

    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.seen.keys()
    }

    /// Filter `batch` down to unseen entries and record them.
    ///
    /// Merging the same batch again yields an empty delta.
    pub fn merge_batch<T: LedgerEntry>(&mut self, address: Address, batch: Vec<T>) -> LedgerDelta<T> {
        let keys = self.seen.entry(address).or_default();
        let batch_len = batch.len();

        let new_entries: Vec<T> = batch
            .into_iter()
            .filter(|entry| keys.insert(entry.event_key()))
            .collect();
        let already_seen = batch_len - new_entries.len();

        info!(
            address = %address,
            new_events = new_entries.len(),
            already_seen,
            total_recorded = keys.len(),
            "📒 Merged batch into event ledger"
        );

        LedgerDelta {
            new_entries,
            already_seen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;

    fn tx(hash_byte: u8, block_number: u64) -> DirectTransaction {
        DirectTransaction {
            tx_hash: B256::with_last_byte(hash_byte),
            block_number,
            timestamp: 0,
            from: Address::ZERO,
            to: None,
            value: U256::ZERO,
            is_error: false,
        }
    }

    #[test]
    fn test_key_falls_back_to_block_number() {
        let hash = B256::with_last_byte(1);
        assert_eq!(EventKey::new(hash, Some(3), 10), EventKey::Log { tx_hash: hash, log_index: 3 });
        assert_eq!(EventKey::new(hash, None, 10), EventKey::Block { tx_hash: hash, block_number: 10 });
    }

    #[test]
    fn test_swap_and_transfer_keys_do_not_collide() {
        let pool = Address::with_last_byte(7);
        let mut ledger = SeenEventLedger::new();
        let swap = RawSwapEvent::V2(crate::models::V2Swap {
            sender: Address::ZERO,
            amount0_in: U256::ZERO,
            amount1_in: U256::from(1u8),
            amount0_out: U256::from(1u8),
            amount1_out: U256::ZERO,
            to: Address::ZERO,
            block_number: 10,
            tx_hash: B256::with_last_byte(1),
            timestamp: 0,
            log_index: None,
        });

        assert_ne!(swap.event_key(), tx(1, 10).event_key());
        assert_eq!(ledger.merge_batch(pool, vec![swap]).new_entries.len(), 1);

        let delta = ledger.merge_batch(pool, vec![tx(1, 10)]);
        assert_eq!(delta.new_entries.len(), 1);
        assert_eq!(delta.already_seen, 0);
    }

    #[test]
    fn test_has_swap_tx_ignores_transfers() {
        let pool = Address::with_last_byte(7);
        let mut ledger = SeenEventLedger::new();
        let hash = B256::with_last_byte(3);
        ledger.merge_batch(pool, vec![tx(2, 10)]);
        assert!(!ledger.has_swap_tx(pool, B256::with_last_byte(2)));

        struct Logged(EventKey);
        impl LedgerEntry for Logged {
            fn event_key(&self) -> EventKey {
                self.0
            }
        }
        ledger.merge_batch(pool, vec![Logged(EventKey::new(hash, Some(5), 11))]);
        assert!(ledger.has_swap_tx(pool, hash));
        assert!(!ledger.has_swap_tx(Address::with_last_byte(8), hash));
        assert!(!ledger.has_swap_tx(pool, B256::with_last_byte(4)));
    }

    #[test]
    fn test_second_merge_is_empty() {
        let pool = Address::with_last_byte(7);
        let mut ledger = SeenEventLedger::new();

        let first = ledger.merge_batch(pool, vec![tx(1, 10), tx(2, 11)]);
        assert_eq!(first.new_entries.len(), 2);
        assert_eq!(first.already_seen, 0);

        let second = ledger.merge_batch(pool, vec![tx(1, 10), tx(2, 11)]);
        assert!(second.new_entries.is_empty());
        assert_eq!(second.already_seen, 2);
        assert_eq!(ledger.len_for(pool), 2);
    }

    #[test]
    fn test_dedups_within_batch() {
        let pool = Address::with_last_byte(7);
        let mut ledger = SeenEventLedger::new();
        let delta = ledger.merge_batch(pool, vec![tx(1, 10), tx(1, 10), tx(3, 12)]);

        assert_eq!(delta.new_entries.len(), 2);
        assert_eq!(delta.already_seen, 1);
    }

    #[test]
    fn test_addresses_are_independent() {
        let mut ledger = SeenEventLedger::new();
        ledger.merge_batch(Address::with_last_byte(1), vec![tx(1, 10)]);
        let delta = ledger.merge_batch(Address::with_last_byte(2), vec![tx(1, 10)]);

        assert_eq!(delta.new_entries.len(), 1);
        assert!(ledger.is_seen(Address::with_last_byte(1), &tx(1, 10).event_key()));
    }

    #[test]
    fn test_ledger_survives_json_round_trip() {
        let pool = Address::with_last_byte(9);
        let mut ledger = SeenEventLedger::new();
        ledger.merge_batch(pool, vec![tx(1, 10), tx(2, 11)]);

        let json = serde_json::to_string(&ledger).unwrap();
        let mut restored: SeenEventLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, ledger);
        assert!(restored.merge_batch(pool, vec![tx(2, 11)]).new_entries.is_empty());
    }
}
