//! A single square of the chessboard.
//!
//! Internally a `SQ` is just a `u8`. Bit `i` of a [`BitBoard`](super::bitboard::BitBoard)
//! and square `i` name the same location: `file = i & 7`, `rank = i >> 3`,
//! LSB = A1.
//!
//! ```md,ignore
//! 8 | 56 57 58 59 60 61 62 63
//! 7 | 48 49 50 51 52 53 54 55
//! 6 | 40 41 42 43 44 45 46 47
//! 5 | 32 33 34 35 36 37 38 39
//! 4 | 24 25 26 27 28 29 30 31
//! 3 | 16 17 18 19 20 21 22 23
//! 2 | 8  9  10 11 12 13 14 15
//! 1 | 0  1  2  3  4  5  6  7
//!   -------------------------
//!      a  b  c  d  e  f  g  h
//! ```

use super::bitboard::BitBoard;
use super::masks::*;
use super::piece::{File, Rank};

use std::fmt;

/// A square of the chessboard, `0..=63` (A1..H8, rank-major). `SQ::NONE`
/// (`64`) stands in for the lack of a legal square, e.g. no en-passant
/// target.
#[derive(Copy, Clone, Default, Hash, PartialEq, Eq, PartialOrd, Debug)]
#[repr(transparent)]
pub struct SQ(pub u8);

impl_bit_ops!(SQ, u8);

const fn sq_of(file: u8, rank: u8) -> SQ {
    SQ(rank * 8 + file)
}

impl SQ {
    /// Sentinel for "no square available" — a lazy `Option<SQ>::None`.
    pub const NONE: SQ = SQ(64);

    #[inline(always)]
    pub const fn is_okay(self) -> bool {
        self.0 < 64
    }

    /// Chebyshev (king-move) distance between two squares.
    #[inline]
    pub fn distance(self, other: SQ) -> u8 {
        let df = diff(self.file_idx(), other.file_idx());
        let dr = diff(self.rank_idx(), other.rank_idx());
        df.max(dr)
    }

    #[inline(always)]
    pub fn to_bb(self) -> BitBoard {
        debug_assert!(self.is_okay());
        BitBoard(1u64 << self.0)
    }

    #[inline(always)]
    pub fn rank(self) -> Rank {
        Rank::from_ord(self.rank_idx())
    }

    #[inline(always)]
    pub const fn rank_idx(self) -> u8 {
        self.0 >> 3
    }

    #[inline(always)]
    pub fn rank_bb(self) -> BitBoard {
        BitBoard(rank_bb(self.rank_idx()))
    }

    #[inline(always)]
    pub fn file(self) -> File {
        File::from_ord(self.file_idx())
    }

    #[inline(always)]
    pub const fn file_idx(self) -> u8 {
        self.0 & 7
    }

    #[inline(always)]
    pub fn file_bb(self) -> BitBoard {
        BitBoard(file_bb(self.file_idx()))
    }

    /// Castling-rights bit cleared when a piece moves from or to this
    /// square (a king's or rook's home square); `0` elsewhere.
    #[inline]
    pub fn castle_rights_mask(self) -> u8 {
        match self.0 {
            ROOK_WHITE_KSIDE_START => C_WHITE_K_MASK,
            ROOK_WHITE_QSIDE_START => C_WHITE_Q_MASK,
            ROOK_BLACK_KSIDE_START => C_BLACK_K_MASK,
            ROOK_BLACK_QSIDE_START => C_BLACK_Q_MASK,
            WHITE_KING_START => C_WHITE_K_MASK | C_WHITE_Q_MASK,
            BLACK_KING_START => C_BLACK_K_MASK | C_BLACK_Q_MASK,
            _ => 0,
        }
    }

    #[inline(always)]
    pub const fn make(file: File, rank: Rank) -> SQ {
        sq_of(file as u8, rank as u8)
    }

    /// Mirrors the square's rank: `A1 -> A8`.
    #[inline(always)]
    pub fn flip_rank(self) -> SQ {
        SQ(self.0 ^ 0b111000)
    }

    #[inline(always)]
    pub fn on_dark_square(self) -> bool {
        (self.to_bb() & BitBoard(DARK_SQUARES)).is_not_empty()
    }

    /// Parses an algebraic square name such as `"e4"`.
    pub fn from_algebraic(s: &str) -> Option<SQ> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = bytes[0];
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return None;
        }
        Some(sq_of(file - b'a', rank - b'1'))
    }
}

#[rustfmt::skip]
impl SQ {
    pub const A1: SQ = sq_of(0, 0); pub const B1: SQ = sq_of(1, 0); pub const C1: SQ = sq_of(2, 0); pub const D1: SQ = sq_of(3, 0);
    pub const E1: SQ = sq_of(4, 0); pub const F1: SQ = sq_of(5, 0); pub const G1: SQ = sq_of(6, 0); pub const H1: SQ = sq_of(7, 0);
    pub const A2: SQ = sq_of(0, 1); pub const B2: SQ = sq_of(1, 1); pub const C2: SQ = sq_of(2, 1); pub const D2: SQ = sq_of(3, 1);
    pub const E2: SQ = sq_of(4, 1); pub const F2: SQ = sq_of(5, 1); pub const G2: SQ = sq_of(6, 1); pub const H2: SQ = sq_of(7, 1);
    pub const A3: SQ = sq_of(0, 2); pub const B3: SQ = sq_of(1, 2); pub const C3: SQ = sq_of(2, 2); pub const D3: SQ = sq_of(3, 2);
    pub const E3: SQ = sq_of(4, 2); pub const F3: SQ = sq_of(5, 2); pub const G3: SQ = sq_of(6, 2); pub const H3: SQ = sq_of(7, 2);
    pub const A4: SQ = sq_of(0, 3); pub const B4: SQ = sq_of(1, 3); pub const C4: SQ = sq_of(2, 3); pub const D4: SQ = sq_of(3, 3);
    pub const E4: SQ = sq_of(4, 3); pub const F4: SQ = sq_of(5, 3); pub const G4: SQ = sq_of(6, 3); pub const H4: SQ = sq_of(7, 3);
    pub const A5: SQ = sq_of(0, 4); pub const B5: SQ = sq_of(1, 4); pub const C5: SQ = sq_of(2, 4); pub const D5: SQ = sq_of(3, 4);
    pub const E5: SQ = sq_of(4, 4); pub const F5: SQ = sq_of(5, 4); pub const G5: SQ = sq_of(6, 4); pub const H5: SQ = sq_of(7, 4);
    pub const A6: SQ = sq_of(0, 5); pub const B6: SQ = sq_of(1, 5); pub const C6: SQ = sq_of(2, 5); pub const D6: SQ = sq_of(3, 5);
    pub const E6: SQ = sq_of(4, 5); pub const F6: SQ = sq_of(5, 5); pub const G6: SQ = sq_of(6, 5); pub const H6: SQ = sq_of(7, 5);
    pub const A7: SQ = sq_of(0, 6); pub const B7: SQ = sq_of(1, 6); pub const C7: SQ = sq_of(2, 6); pub const D7: SQ = sq_of(3, 6);
    pub const E7: SQ = sq_of(4, 6); pub const F7: SQ = sq_of(5, 6); pub const G7: SQ = sq_of(6, 6); pub const H7: SQ = sq_of(7, 6);
    pub const A8: SQ = sq_of(0, 7); pub const B8: SQ = sq_of(1, 7); pub const C8: SQ = sq_of(2, 7); pub const D8: SQ = sq_of(3, 7);
    pub const E8: SQ = sq_of(4, 7); pub const F8: SQ = sq_of(5, 7); pub const G8: SQ = sq_of(6, 7); pub const H8: SQ = sq_of(7, 7);
}

impl fmt::Display for SQ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_okay() {
            return write!(f, "-");
        }
        write!(f, "{}{}", FILE_DISPLAYS[self.file_idx() as usize], RANK_DISPLAYS[self.rank_idx() as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_file_roundtrip() {
        for i in 0..64u8 {
            let sq = SQ(i);
            assert_eq!(SQ::make(sq.file(), sq.rank()), sq);
        }
    }

    #[test]
    fn algebraic_roundtrip() {
        assert_eq!(SQ::from_algebraic("e4"), Some(SQ::E4));
        assert_eq!(format!("{}", SQ::E4), "e4");
        assert_eq!(SQ::from_algebraic("i9"), None);
    }

    #[test]
    fn distance_is_chebyshev() {
        assert_eq!(SQ::A1.distance(SQ::A1), 0);
        assert_eq!(SQ::A1.distance(SQ::B2), 1);
        assert_eq!(SQ::A1.distance(SQ::B3), 2);
    }

    #[test]
    fn none_is_not_okay() {
        assert!(!SQ::NONE.is_okay());
        assert!(SQ::H8.is_okay());
    }
}
