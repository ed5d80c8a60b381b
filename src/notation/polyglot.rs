//! Polyglot opening-book wire format: a sequence of 16-byte big-endian
//! entries (`key: u64, move: u16, weight: u16, learn: u32`) sorted
//! ascending by `key`, looked up by the Polyglot-compatible hash from
//! [`crate::core::zobrist`].
//!
//! See that module's notes on [`crate::core::zobrist`]'s `POLYGLOT_SEED`:
//! this reader implements the real Polyglot entry layout and move
//! encoding, but this crate's own key table is not the official published
//! one, so it will not find hits in a genuine third-party `.bin` book.

use crate::board::Position;
use crate::core::piece::PieceType;
use crate::core::piece_move::Move;
use crate::core::sq::SQ;
use crate::error::ChessError;

const ENTRY_LEN: usize = 16;

/// One raw entry from a Polyglot book file.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BookEntry {
    pub key: u64,
    pub raw_move: u16,
    pub weight: u16,
    pub learn: u32,
}

/// Parses a whole book file's bytes into entries, preserving file order
/// (callers relying on [`find_entries`] need the file already sorted by
/// key, as the Polyglot format requires).
pub fn read_entries(data: &[u8]) -> Result<Vec<BookEntry>, ChessError> {
    if !data.len().is_multiple_of(ENTRY_LEN) {
        return Err(ChessError::IllegalArgument(format!(
            "opening book length {} is not a multiple of {ENTRY_LEN}",
            data.len()
        )));
    }
    Ok(data
        .chunks_exact(ENTRY_LEN)
        .map(|chunk| BookEntry {
            key: u64::from_be_bytes(chunk[0..8].try_into().unwrap()),
            raw_move: u16::from_be_bytes(chunk[8..10].try_into().unwrap()),
            weight: u16::from_be_bytes(chunk[10..12].try_into().unwrap()),
            learn: u32::from_be_bytes(chunk[12..16].try_into().unwrap()),
        })
        .collect())
}

/// The contiguous run of entries matching `key`, via binary search.
/// Requires `entries` sorted ascending by key.
pub fn find_entries(entries: &[BookEntry], key: u64) -> &[BookEntry] {
    let start = entries.partition_point(|e| e.key < key);
    let len = entries[start..].partition_point(|e| e.key == key);
    &entries[start..start + len]
}

/// The maximum-weight entry, ties broken by the smaller raw move code so
/// that selection is deterministic given a fixed entry set.
pub fn best_entry(entries: &[BookEntry]) -> Option<&BookEntry> {
    entries.iter().max_by_key(|e| (e.weight, std::cmp::Reverse(e.raw_move)))
}

/// Decodes a raw Polyglot move code into `(from, to, promotion)`. Bit
/// layout, low to high: `to_file(3) to_rank(3) from_file(3) from_rank(3)
/// promotion(3)`.
pub fn decode_move(raw: u16) -> (SQ, SQ, Option<PieceType>) {
    let to_file = raw & 0b111;
    let to_rank = (raw >> 3) & 0b111;
    let from_file = (raw >> 6) & 0b111;
    let from_rank = (raw >> 9) & 0b111;
    let promotion_bits = (raw >> 12) & 0b111;

    let from = SQ((from_rank * 8 + from_file) as u8);
    let to = SQ((to_rank * 8 + to_file) as u8);
    let promotion = match promotion_bits {
        1 => Some(PieceType::Knight),
        2 => Some(PieceType::Bishop),
        3 => Some(PieceType::Rook),
        4 => Some(PieceType::Queen),
        _ => None,
    };
    (from, to, promotion)
}

/// Resolves a raw Polyglot move code against the actual legal moves of
/// `pos`, translating Polyglot's "king captures its own rook" castling
/// encoding (`e1h1`, `e1a1`, `e8h8`, `e8a8`) into this crate's normal king
/// destination squares first.
pub fn resolve_move(pos: &Position, raw: u16) -> Option<Move> {
    let (from, to, promotion) = decode_move(raw);
    let to = if pos.piece_at(from).piece_type() == PieceType::King {
        match (from, to) {
            (SQ::E1, SQ::H1) => SQ::G1,
            (SQ::E1, SQ::A1) => SQ::C1,
            (SQ::E8, SQ::H8) => SQ::G8,
            (SQ::E8, SQ::A8) => SQ::C8,
            _ => to,
        }
    } else {
        to
    };

    pos.generate_moves().into_iter().find(|m| {
        m.from() == from
            && m.to() == to
            && match promotion {
                Some(p) => m.move_type().is_promotion() && m.move_type().promotion_piece() == p,
                None => !m.move_type().is_promotion(),
            }
    })
}

/// Looks up `pos` in a parsed book and resolves the deterministically
/// best move, if any entries match its Polyglot key.
pub fn lookup_best(pos: &Position, entries: &[BookEntry]) -> Option<Move> {
    let matches = find_entries(entries, pos.polyglot_key());
    let entry = best_entry(matches)?;
    resolve_move(pos, entry.raw_move)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_bytes(e: &BookEntry) -> [u8; 16] {
        let mut buf = [0u8; 16];
        buf[0..8].copy_from_slice(&e.key.to_be_bytes());
        buf[8..10].copy_from_slice(&e.raw_move.to_be_bytes());
        buf[10..12].copy_from_slice(&e.weight.to_be_bytes());
        buf[12..16].copy_from_slice(&e.learn.to_be_bytes());
        buf
    }

    #[test]
    fn read_entries_round_trips() {
        let original = BookEntry { key: 0x1234_5678_9abc_def0, raw_move: 0x0ce4, weight: 10, learn: 0 };
        let bytes = entry_bytes(&original);
        let parsed = read_entries(&bytes).unwrap();
        assert_eq!(parsed, vec![original]);
    }

    #[test]
    fn rejects_truncated_data() {
        assert!(read_entries(&[0u8; 15]).is_err());
    }

    #[test]
    fn decode_move_matches_e2e4() {
        let raw = ((SQ::E2.rank_idx() as u16) << 9)
            | ((SQ::E2.file_idx() as u16) << 6)
            | ((SQ::E4.rank_idx() as u16) << 3)
            | (SQ::E4.file_idx() as u16);
        let (from, to, promo) = decode_move(raw);
        assert_eq!(from, SQ::E2);
        assert_eq!(to, SQ::E4);
        assert_eq!(promo, None);
    }

    #[test]
    fn best_entry_picks_max_weight_then_smallest_move_code() {
        let entries = vec![
            BookEntry { key: 1, raw_move: 5, weight: 10, learn: 0 },
            BookEntry { key: 1, raw_move: 2, weight: 20, learn: 0 },
            BookEntry { key: 1, raw_move: 3, weight: 20, learn: 0 },
        ];
        let best = best_entry(&entries).unwrap();
        assert_eq!(best.weight, 20);
        assert_eq!(best.raw_move, 2);
    }

    #[test]
    fn lookup_best_resolves_against_a_live_position() {
        let pos = Position::start_pos();
        let (from, to, _) = (SQ::E2, SQ::E4, None::<PieceType>);
        let raw_move = ((from.rank_idx() as u16) << 9)
            | ((from.file_idx() as u16) << 6)
            | ((to.rank_idx() as u16) << 3)
            | (to.file_idx() as u16);
        let entries = vec![BookEntry { key: pos.polyglot_key(), raw_move, weight: 1, learn: 0 }];
        let m = lookup_best(&pos, &entries).expect("entry for the starting position should resolve");
        assert_eq!(m.from(), SQ::E2);
        assert_eq!(m.to(), SQ::E4);
    }

    #[test]
    fn resolve_move_translates_castling_encoding() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let raw_move: u16 = (4 << 6) | 7; // e1 -> h1
        let m = resolve_move(&pos, raw_move).expect("king-side castling should resolve");
        assert_eq!(m.move_type(), crate::core::piece_move::MoveType::ShortCastling);
    }
}
