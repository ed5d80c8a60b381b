//! FEN (Forsyth-Edwards Notation) parsing and formatting.
//!
//! Grammar: `<ranks> <side> <castling> <en-passant> <halfmove> <fullmove>`,
//! ranks from 8 down to 1 separated by `/`, each rank a mix of piece
//! letters and digit run-lengths summing to exactly 8 files.

use super::castle_rights::Castling;
use super::Position;
use crate::core::masks::NO_EP_FILE;
use crate::core::piece::{Piece, PieceType, Player};
use crate::core::sq::SQ;
use crate::core::zobrist;
use crate::error::ChessError;

fn fen_err(msg: impl Into<String>) -> ChessError {
    ChessError::Fen(msg.into())
}

/// Parses a FEN string into a [`Position`], validating grammar and basic
/// position legality (exactly one king per side, no pawns on the back
/// ranks, a sane checker count).
pub fn parse(fen: &str) -> Result<Position, ChessError> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(fen_err(format!("expected at least 4 fields, got {}", fields.len())));
    }

    let mut pos = Position::blank();
    parse_board(fields[0], &mut pos)?;

    pos.side_to_move = match fields[1] {
        "w" => Player::White,
        "b" => Player::Black,
        other => return Err(fen_err(format!("bad side to move: {other:?}"))),
    };

    let mut castling = Castling::empty();
    if fields[2] != "-" {
        for c in fields[2].chars() {
            castling.add_fen_char(c).map_err(|c| fen_err(format!("bad castling char: {c:?}")))?;
        }
    }
    pos.castling = castling;

    pos.ep_file = if fields[3] == "-" {
        NO_EP_FILE
    } else {
        let sq = SQ::from_algebraic(fields[3]).ok_or_else(|| fen_err(format!("bad en-passant square: {:?}", fields[3])))?;
        let expected_rank = if pos.side_to_move == Player::White { 5 } else { 2 };
        if sq.rank_idx() != expected_rank {
            return Err(fen_err(format!("en-passant square {sq} is not on the expected rank")));
        }
        sq.file_idx()
    };

    pos.fifty_move_clock = match fields.get(4) {
        Some(s) => s.parse().map_err(|_| fen_err(format!("bad halfmove clock: {s:?}")))?,
        None => 0,
    };
    pos.full_move_number = match fields.get(5) {
        Some(s) => {
            let n: u32 = s.parse().map_err(|_| fen_err(format!("bad fullmove number: {s:?}")))?;
            if n == 0 {
                return Err(fen_err("fullmove number must be at least 1"));
            }
            n
        }
        None => 1,
    };

    validate(&pos)?;

    pos.key = compute_key(&pos);
    pos.pawn_key = compute_pawn_key(&pos);
    pos.checkers = pos.compute_checkers();
    pos.repetition_list.push(pos.key);
    Ok(pos)
}

fn parse_board(board: &str, pos: &mut Position) -> Result<(), ChessError> {
    let ranks: Vec<&str> = board.split('/').collect();
    if ranks.len() != 8 {
        return Err(fen_err(format!("expected 8 ranks, got {}", ranks.len())));
    }
    for (rank_from_top, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_from_top as u8;
        let mut file = 0u8;
        for c in rank_str.chars() {
            if let Some(digit) = c.to_digit(10) {
                if !(1..=8).contains(&digit) {
                    return Err(fen_err(format!("bad empty-square run length: {c:?}")));
                }
                file += digit as u8;
            } else {
                let piece = Piece::from_fen_char(c).ok_or_else(|| fen_err(format!("bad piece char: {c:?}")))?;
                if file >= 8 {
                    return Err(fen_err(format!("rank {rank_str:?} has more than 8 files")));
                }
                pos.put_piece(SQ(rank * 8 + file), piece);
                file += 1;
            }
        }
        if file != 8 {
            return Err(fen_err(format!("rank {rank_str:?} does not sum to 8 files")));
        }
    }
    Ok(())
}

fn validate(pos: &Position) -> Result<(), ChessError> {
    for player in [Player::White, Player::Black] {
        let kings = pos.piece_bb_of(player, PieceType::King).count_bits();
        if kings != 1 {
            return Err(fen_err(format!("{player} has {kings} kings, expected exactly 1")));
        }
    }
    let back_ranks = crate::core::masks::RANK_1 | crate::core::masks::RANK_8;
    let pawns = (pos.piece_bb_of(Player::White, PieceType::Pawn) | pos.piece_bb_of(Player::Black, PieceType::Pawn)).0;
    if pawns & back_ranks != 0 {
        return Err(fen_err("a pawn cannot sit on the first or eighth rank"));
    }
    let not_to_move = pos.king_sq(pos.side_to_move.other());
    if pos.attacked_by(not_to_move, pos.side_to_move) {
        return Err(fen_err("the side not to move is in check"));
    }
    Ok(())
}

fn compute_key(pos: &Position) -> u64 {
    let mut key = 0u64;
    for sq in pos.occupied().iter() {
        key ^= zobrist::piece_square(pos.piece_at(sq), sq);
    }
    key ^= zobrist::castling(pos.castling.bits());
    if pos.ep_capturable() {
        key ^= zobrist::en_passant_file(pos.ep_file);
    }
    if pos.side_to_move == Player::White {
        key ^= zobrist::side_to_move();
    }
    key
}

fn compute_pawn_key(pos: &Position) -> u64 {
    let mut key = 0u64;
    for player in [Player::White, Player::Black] {
        for pt in [PieceType::Pawn, PieceType::King] {
            for sq in pos.piece_bb_of(player, pt).iter() {
                key ^= zobrist::piece_square(Piece::make(player, pt), sq);
            }
        }
    }
    key
}

/// Serializes `pos` to canonical FEN.
pub fn format(pos: &Position) -> String {
    let mut board = String::new();
    for rank in (0..8u8).rev() {
        let mut empty_run = 0u8;
        for file in 0..8u8 {
            let piece = pos.piece_at(SQ(rank * 8 + file));
            if piece == Piece::None {
                empty_run += 1;
            } else {
                if empty_run > 0 {
                    board.push_str(&empty_run.to_string());
                    empty_run = 0;
                }
                board.push(piece.display_letter());
            }
        }
        if empty_run > 0 {
            board.push_str(&empty_run.to_string());
        }
        if rank != 0 {
            board.push('/');
        }
    }

    let side = if pos.side_to_move == Player::White { "w" } else { "b" };
    let ep = match pos.ep_square() {
        Some(sq) => sq.to_string(),
        None => "-".to_string(),
    };

    format!(
        "{board} {side} {} {ep} {} {}",
        pos.castling.fen_string(),
        pos.fifty_move_clock,
        pos.full_move_number
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::STARTING_FEN;

    #[test]
    fn starting_fen_round_trips() {
        let pos = parse(STARTING_FEN).unwrap();
        assert_eq!(format(&pos), STARTING_FEN);
    }

    #[test]
    fn kiwipete_round_trips() {
        let kiwipete = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let pos = parse(kiwipete).unwrap();
        assert_eq!(format(&pos), kiwipete);
    }

    #[test]
    fn rejects_missing_king() {
        assert!(parse("8/8/8/8/8/8/8/8 w - - 0 1").is_err());
    }

    #[test]
    fn rejects_pawn_on_back_rank() {
        assert!(parse("4k3/8/8/8/8/8/8/P3K3 w - - 0 1").is_err());
    }

    #[test]
    fn rejects_bad_rank_length() {
        assert!(parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPP/RNBQKBNR w KQkq - 0 1").is_err());
    }

    #[test]
    fn en_passant_square_is_set() {
        let pos = parse("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3").unwrap();
        assert_eq!(pos.ep_file(), Some(3));
    }
}
