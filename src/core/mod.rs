//! Bitboard primitives, square/piece encodings, magic-bitboard sliding
//! attacks, Zobrist keys, and the packed move record — the data types the
//! rest of the crate is built from.

#[macro_use]
mod macros;

pub mod bit_twiddles;
pub mod bitboard;
pub mod magic;
pub mod masks;
pub mod piece;
pub mod piece_move;
pub mod sq;
pub mod zobrist;
