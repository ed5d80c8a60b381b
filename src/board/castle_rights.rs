//! Castling-rights bookkeeping.
//!
//! Internally rights are kept as a 4-bit [`bitflags`] set (one bit per
//! king/queen-side right per player), the same combined representation
//! the Zobrist castling table is indexed by. [`Position`](super::Position)
//! exposes the data model's per-side 2-bit `NONE/SHORT/LONG/ALL` codes on
//! top of this via [`Castling::side_code`].

use crate::core::masks::*;
use crate::core::piece::{CastleType, Player};
use crate::core::sq::SQ;

use bitflags::bitflags;
use std::fmt;

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
    pub struct Castling: u8 {
        const WHITE_K = C_WHITE_K_MASK;
        const WHITE_Q = C_WHITE_Q_MASK;
        const BLACK_K = C_BLACK_K_MASK;
        const BLACK_Q = C_BLACK_Q_MASK;
        const WHITE_ALL = Self::WHITE_K.bits() | Self::WHITE_Q.bits();
        const BLACK_ALL = Self::BLACK_K.bits() | Self::BLACK_Q.bits();
    }
}

/// The per-side 2-bit code from the data model: `NONE=0, SHORT=1, LONG=2, ALL=3`.
pub const SIDE_NONE: u8 = 0;
pub const SIDE_SHORT: u8 = 1;
pub const SIDE_LONG: u8 = 2;
pub const SIDE_ALL: u8 = 3;

impl Default for Castling {
    #[inline]
    fn default() -> Castling {
        Castling::empty()
    }
}

impl Castling {
    #[inline]
    pub fn can_castle(self, player: Player, side: CastleType) -> bool {
        match (player, side) {
            (Player::White, CastleType::KingSide) => self.contains(Castling::WHITE_K),
            (Player::White, CastleType::QueenSide) => self.contains(Castling::WHITE_Q),
            (Player::Black, CastleType::KingSide) => self.contains(Castling::BLACK_K),
            (Player::Black, CastleType::QueenSide) => self.contains(Castling::BLACK_Q),
        }
    }

    /// This player's rights as the data model's 2-bit `NONE/SHORT/LONG/ALL` code.
    #[inline]
    pub fn side_code(self, player: Player) -> u8 {
        let (k, q) = match player {
            Player::White => (Castling::WHITE_K, Castling::WHITE_Q),
            Player::Black => (Castling::BLACK_K, Castling::BLACK_Q),
        };
        (self.contains(k) as u8) | ((self.contains(q) as u8) << 1)
    }

    /// Clears whichever rights `from`/`to` touch (a king or rook leaving
    /// its home square permanently forfeits the matching right), returning
    /// the subset of rights actually cleared.
    #[inline]
    pub fn strip_moved(&mut self, from: SQ, to: SQ) -> Castling {
        let mask = from.castle_rights_mask() | to.castle_rights_mask();
        let cleared = Castling::from_bits_truncate(self.bits() & mask);
        self.remove(Castling::from_bits_truncate(mask));
        cleared
    }

    pub fn add_fen_char(&mut self, c: char) -> Result<(), char> {
        let bit = match c {
            'K' => Castling::WHITE_K,
            'Q' => Castling::WHITE_Q,
            'k' => Castling::BLACK_K,
            'q' => Castling::BLACK_Q,
            '-' => return Ok(()),
            other => return Err(other),
        };
        self.insert(bit);
        Ok(())
    }

    pub fn fen_string(self) -> String {
        if self.is_empty() {
            return "-".to_string();
        }
        let mut s = String::new();
        if self.contains(Castling::WHITE_K) {
            s.push('K');
        }
        if self.contains(Castling::WHITE_Q) {
            s.push('Q');
        }
        if self.contains(Castling::BLACK_K) {
            s.push('k');
        }
        if self.contains(Castling::BLACK_Q) {
            s.push('q');
        }
        s
    }
}

impl fmt::Display for Castling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fen_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_moved_clears_only_touched_rights() {
        let mut c = Castling::all();
        let cleared = c.strip_moved(SQ::A1, SQ::A1);
        assert_eq!(cleared, Castling::WHITE_Q);
        assert!(!c.contains(Castling::WHITE_Q));
        assert!(c.contains(Castling::WHITE_K));
    }

    #[test]
    fn king_move_clears_both_sides() {
        let mut c = Castling::all();
        c.strip_moved(SQ::E1, SQ::E1);
        assert_eq!(c.side_code(Player::White), SIDE_NONE);
        assert_eq!(c.side_code(Player::Black), SIDE_ALL);
    }

    #[test]
    fn fen_round_trip() {
        let mut c = Castling::empty();
        for ch in "KQkq".chars() {
            c.add_fen_char(ch).unwrap();
        }
        assert_eq!(c, Castling::all());
        assert_eq!(c.fen_string(), "KQkq");
        assert_eq!(Castling::empty().fen_string(), "-");
    }
}
