//! Lock-less evaluation cache (§4.8): memoizes static-evaluator leaf
//! scores keyed by a position hash. Same Hyatt-XOR discipline as
//! [`super::transposition`], with a much smaller payload (just a score,
//! an exactness flag, and a generation), so the static evaluator can
//! probe it on every leaf without a lock.
//!
//! A caller with a narrower key (e.g. `Position::pawn_key` for a
//! pawn-structure-only subcache) can index an independent
//! `EvaluationTable` the same way; the table itself doesn't care what
//! the key means.

use std::sync::atomic::{AtomicU64, Ordering};

const ORDERING: Ordering = Ordering::Relaxed;

const SCORE_SHIFT: u32 = 0;
const EXACT_SHIFT: u32 = 16;
const GENERATION_SHIFT: u32 = 17;

const SCORE_MASK: u64 = 0xFFFF;
const GENERATION_MASK: u64 = 0xFF;

/// A decoded evaluation-cache entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ETEntry {
    pub score: i16,
    pub is_exact: bool,
    pub generation: u8,
}

fn pack(entry: ETEntry) -> u64 {
    (((entry.score as u16) as u64) << SCORE_SHIFT)
        | ((entry.is_exact as u64) << EXACT_SHIFT)
        | ((entry.generation as u64) << GENERATION_SHIFT)
}

fn unpack(data: u64) -> ETEntry {
    let score = (((data >> SCORE_SHIFT) & SCORE_MASK) as u16) as i16;
    let is_exact = (data >> EXACT_SHIFT) & 1 != 0;
    let generation = ((data >> GENERATION_SHIFT) & GENERATION_MASK) as u8;
    ETEntry { score, is_exact, generation }
}

struct Slot {
    data: AtomicU64,
    key_xor_data: AtomicU64,
}

/// Lock-less cache mapping position hashes to evaluator scores. Replaces
/// unconditionally on store, same as the transposition table (§9's Open
/// Question notes the source landed on always-replace here too).
pub struct EvaluationTable {
    slots: Vec<Slot>,
    mask: u64,
}

impl EvaluationTable {
    pub fn with_capacity(capacity: usize) -> EvaluationTable {
        let capacity = capacity.max(1).next_power_of_two();
        let slots = (0..capacity).map(|_| Slot { data: AtomicU64::new(0), key_xor_data: AtomicU64::new(0) }).collect();
        EvaluationTable { slots, mask: (capacity - 1) as u64 }
    }

    fn index(&self, key: u64) -> usize {
        (key & self.mask) as usize
    }

    pub fn probe(&self, key: u64) -> Option<ETEntry> {
        let slot = &self.slots[self.index(key)];
        let data = slot.data.load(ORDERING);
        if data == 0 {
            return None;
        }
        let key_xor_data = slot.key_xor_data.load(ORDERING);
        if key_xor_data ^ data != key {
            return None;
        }
        Some(unpack(data))
    }

    pub fn store(&self, key: u64, score: i16, is_exact: bool, generation: u8) {
        let data = pack(ETEntry { score, is_exact, generation });
        let slot = &self.slots[self.index(key)];
        slot.data.store(data, ORDERING);
        slot.key_xor_data.store(key ^ data, ORDERING);
    }

    pub fn clear(&self) {
        for slot in &self.slots {
            slot.data.store(0, ORDERING);
            slot.key_xor_data.store(0, ORDERING);
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_on_empty_table() {
        let et = EvaluationTable::with_capacity(256);
        assert!(et.probe(99).is_none());
    }

    #[test]
    fn store_then_probe_round_trips() {
        let et = EvaluationTable::with_capacity(256);
        et.store(555, -64, true, 3);
        let e = et.probe(555).unwrap();
        assert_eq!(e.score, -64);
        assert!(e.is_exact);
        assert_eq!(e.generation, 3);
    }

    #[test]
    fn colliding_key_is_a_miss() {
        let et = EvaluationTable::with_capacity(4);
        et.store(0, 1, false, 0);
        assert!(et.probe(4).is_none());
    }
}
