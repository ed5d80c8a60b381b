//! Lock-less transposition table (§4.7), shared without locks by every
//! search worker.
//!
//! Each slot packs an entry's payload into one 64-bit `data` word and
//! stores a second word, `key ^ data` (Hyatt's XOR self-validation
//! trick), instead of the raw key. A probe recomputes `key_xor_data ^
//! data` and accepts the slot only if that equals the probe key; a torn
//! write from a concurrent writer changes `data` without changing
//! `key_xor_data` to match (or vice versa), so the XOR check fails and
//! the probe is treated as a miss (§5, §8 property 6). No atomic wider
//! than 64 bits and no lock is needed.

use crate::core::piece_move::Move;

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

const ORDERING: Ordering = Ordering::Relaxed;

/// The kind of bound a stored score represents, relative to the search
/// window it was found in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Bound {
    Exact = 0,
    FailHigh = 1,
    FailLow = 2,
}

impl Bound {
    fn from_ord(ord: u64) -> Bound {
        match ord {
            0 => Bound::Exact,
            1 => Bound::FailHigh,
            _ => Bound::FailLow,
        }
    }
}

/// A decoded transposition-table entry, as handed back by
/// [`TranspositionTable::probe`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TTEntry {
    pub depth: u8,
    pub bound: Bound,
    pub score: i16,
    pub best_move: Move,
    pub generation: u8,
}

const MOVE_SHIFT: u32 = 0;
const SCORE_SHIFT: u32 = 32;
const DEPTH_SHIFT: u32 = 48;
const BOUND_SHIFT: u32 = 56;
const GENERATION_SHIFT: u32 = 58;

const MOVE_MASK: u64 = 0xFFFF_FFFF;
const SCORE_MASK: u64 = 0xFFFF;
const DEPTH_MASK: u64 = 0xFF;
const BOUND_MASK: u64 = 0b11;
const GENERATION_MASK: u64 = 0b11_1111;

fn pack(entry: TTEntry) -> u64 {
    let move_bits = entry.best_move.to_u32() as u64;
    let score_bits = (entry.score as u16) as u64;
    (move_bits << MOVE_SHIFT)
        | (score_bits << SCORE_SHIFT)
        | ((entry.depth as u64) << DEPTH_SHIFT)
        | ((entry.bound as u64) << BOUND_SHIFT)
        | ((entry.generation as u64 & GENERATION_MASK) << GENERATION_SHIFT)
}

fn unpack(data: u64) -> TTEntry {
    let move_bits = ((data >> MOVE_SHIFT) & MOVE_MASK) as u32;
    let score = (((data >> SCORE_SHIFT) & SCORE_MASK) as u16) as i16;
    let depth = ((data >> DEPTH_SHIFT) & DEPTH_MASK) as u8;
    let bound = Bound::from_ord((data >> BOUND_SHIFT) & BOUND_MASK);
    let generation = ((data >> GENERATION_SHIFT) & GENERATION_MASK) as u8;
    TTEntry { depth, bound, score, best_move: Move::from_u32(move_bits), generation }
}

struct Slot {
    data: AtomicU64,
    key_xor_data: AtomicU64,
}

impl Slot {
    fn empty() -> Slot {
        Slot { data: AtomicU64::new(0), key_xor_data: AtomicU64::new(0) }
    }
}

/// Lock-less hash table mapping Zobrist keys to search results, shared by
/// reference across every search worker. Replacement is always-replace
/// on generation tie or newer generation (§4.7: simpler than
/// depth-preferred and empirically better under Lazy-SMP parallelism).
pub struct TranspositionTable {
    slots: Vec<Slot>,
    mask: u64,
    generation: AtomicU32,
}

impl TranspositionTable {
    /// `capacity` is rounded up to the next power of two.
    pub fn with_capacity(capacity: usize) -> TranspositionTable {
        let capacity = capacity.max(1).next_power_of_two();
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, Slot::empty);
        TranspositionTable { slots, mask: (capacity - 1) as u64, generation: AtomicU32::new(0) }
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        (key & self.mask) as usize
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Starts a new search generation; subsequent [`store`](Self::store)
    /// calls age out entries from older generations implicitly.
    pub fn new_search(&self) {
        self.generation.fetch_add(1, ORDERING);
    }

    fn generation(&self) -> u8 {
        (self.generation.load(ORDERING) & GENERATION_MASK as u32) as u8
    }

    /// Looks up `key`. Returns `None` on a genuine miss *or* a detected
    /// torn read — the two are indistinguishable by design (§7).
    pub fn probe(&self, key: u64) -> Option<TTEntry> {
        let slot = &self.slots[self.index(key)];
        let data = slot.data.load(ORDERING);
        if data == 0 {
            // A never-written (or just-cleared) slot reads as a miss
            // unconditionally, rather than XOR-validating a value that
            // would spuriously "match" key == 0.
            return None;
        }
        let key_xor_data = slot.key_xor_data.load(ORDERING);
        if key_xor_data ^ data != key {
            return None;
        }
        Some(unpack(data))
    }

    /// Writes an entry for `key`, always replacing whatever was there.
    pub fn store(&self, key: u64, depth: u8, bound: Bound, score: i16, best_move: Move) {
        let entry = TTEntry { depth, bound, score, best_move, generation: self.generation() };
        let data = pack(entry);
        let slot = &self.slots[self.index(key)];
        slot.data.store(data, ORDERING);
        slot.key_xor_data.store(key ^ data, ORDERING);
    }

    pub fn clear(&self) {
        for slot in &self.slots {
            slot.data.store(0, ORDERING);
            slot.key_xor_data.store(0, ORDERING);
        }
        self.generation.store(0, ORDERING);
    }

    pub fn resize(&mut self, capacity: usize) {
        *self = TranspositionTable::with_capacity(capacity);
    }

    /// Fraction of slots that hold a non-empty entry, estimated by
    /// sampling every `stride`th slot rather than the whole table.
    pub fn load_factor(&self, stride: usize) -> f64 {
        let stride = stride.max(1);
        let mut sampled = 0usize;
        let mut occupied = 0usize;
        let mut i = 0;
        while i < self.slots.len() {
            sampled += 1;
            if self.slots[i].data.load(ORDERING) != 0 {
                occupied += 1;
            }
            i += stride;
        }
        if sampled == 0 {
            0.0
        } else {
            occupied as f64 / sampled as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::piece::PieceType;
    use crate::core::piece_move::MoveType;
    use crate::core::sq::SQ;

    fn mv() -> Move {
        Move::new(SQ::E2, SQ::E4, PieceType::Pawn, PieceType::None, MoveType::Normal)
    }

    #[test]
    fn miss_on_empty_table() {
        let tt = TranspositionTable::with_capacity(1024);
        assert!(tt.probe(0x1234_5678).is_none());
    }

    #[test]
    fn store_then_probe_round_trips() {
        let tt = TranspositionTable::with_capacity(1024);
        let key = 0xDEAD_BEEF_0000_0001;
        tt.store(key, 12, Bound::Exact, -37, mv());
        let e = tt.probe(key).expect("just-stored entry should be found");
        assert_eq!(e.depth, 12);
        assert_eq!(e.bound, Bound::Exact);
        assert_eq!(e.score, -37);
        assert_eq!(e.best_move, mv());
    }

    #[test]
    fn different_key_mapping_to_same_slot_is_a_miss() {
        let tt = TranspositionTable::with_capacity(2);
        let key_a = 0u64;
        let key_b = 2u64; // same low bit as key_a under mask 1
        tt.store(key_a, 4, Bound::Exact, 10, mv());
        assert!(tt.probe(key_b).is_none());
    }

    #[test]
    fn always_replaces_prior_entry() {
        let tt = TranspositionTable::with_capacity(1024);
        let key = 42;
        tt.store(key, 3, Bound::FailLow, 1, Move::NULL);
        tt.store(key, 1, Bound::FailHigh, -99, mv());
        let e = tt.probe(key).unwrap();
        assert_eq!(e.depth, 1);
        assert_eq!(e.score, -99);
    }

    #[test]
    fn clear_empties_every_slot() {
        let tt = TranspositionTable::with_capacity(64);
        tt.store(7, 5, Bound::Exact, 100, mv());
        tt.clear();
        assert!(tt.probe(7).is_none());
    }

    #[test]
    fn simulated_torn_write_is_reported_as_a_miss() {
        let tt = TranspositionTable::with_capacity(8);
        let key = 3;
        tt.store(key, 5, Bound::Exact, 50, mv());
        // Simulate a concurrent writer overwriting only `data`.
        let idx = tt.index(key);
        tt.slots[idx].data.store(0xFFFF_FFFF_FFFF_FFFF, ORDERING);
        assert!(tt.probe(key).is_none());
    }
}
