//! Per-ply killer table (§4.9): two recently-seen cutoff moves per search
//! ply, consulted before the history heuristic during move ordering.
//!
//! Unlike the transposition table, history counters, and evaluation
//! cache, this table is *not* shared: each search worker's stack owns one
//! (§5, "accessed by a single thread's search stack; cross-thread access
//! is undefined"), so it needs no atomics or locking at all — a plain
//! `Vec` indexed by ply is the whole implementation.

use crate::core::piece_move::Move;

/// The two most recent cutoff moves at a single ply, most-recent first.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct KillerSlot {
    move1: Move,
    move2: Move,
}

impl KillerSlot {
    pub fn moves(self) -> (Move, Move) {
        (self.move1, self.move2)
    }

    /// Records a cutoff move. A repeat of `move1` is a no-op; otherwise
    /// `move1` demotes to `move2` and `mv` becomes the new `move1`.
    pub fn add(&mut self, mv: Move) {
        if mv == self.move1 {
            return;
        }
        self.move2 = self.move1;
        self.move1 = mv;
    }

    pub fn contains(self, mv: Move) -> bool {
        !mv.is_null() && (mv == self.move1 || mv == self.move2)
    }
}

/// Single search worker's killer moves, one [`KillerSlot`] per ply up to
/// `max_depth`.
pub struct KillerTable {
    plies: Vec<KillerSlot>,
}

impl KillerTable {
    pub fn new(max_depth: usize) -> KillerTable {
        KillerTable { plies: vec![KillerSlot::default(); max_depth] }
    }

    pub fn add(&mut self, ply: usize, mv: Move) {
        self.plies[ply].add(mv);
    }

    pub fn get(&self, ply: usize) -> (Move, Move) {
        self.plies[ply].moves()
    }

    pub fn clear(&mut self) {
        for slot in self.plies.iter_mut() {
            *slot = KillerSlot::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::piece::PieceType;
    use crate::core::piece_move::MoveType;
    use crate::core::sq::SQ;

    fn mv(from: SQ, to: SQ) -> Move {
        Move::new(from, to, PieceType::Knight, PieceType::None, MoveType::Normal)
    }

    #[test]
    fn second_killer_shifts_in_behind_first() {
        let mut t = KillerTable::new(4);
        let a = mv(SQ::B1, SQ::C3);
        let b = mv(SQ::G1, SQ::F3);
        t.add(2, a);
        t.add(2, b);
        assert_eq!(t.get(2), (b, a));
    }

    #[test]
    fn repeating_the_top_killer_is_a_no_op() {
        let mut t = KillerTable::new(4);
        let a = mv(SQ::B1, SQ::C3);
        let b = mv(SQ::G1, SQ::F3);
        t.add(0, a);
        t.add(0, b);
        t.add(0, b);
        assert_eq!(t.get(0), (b, a));
    }

    #[test]
    fn plies_are_independent() {
        let mut t = KillerTable::new(4);
        t.add(0, mv(SQ::B1, SQ::C3));
        assert_eq!(t.get(1), (Move::NULL, Move::NULL));
    }
}
