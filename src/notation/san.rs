//! Standard algebraic notation, with disambiguation that prefers the
//! source file, falls back to the source rank, and only spells out both
//! when neither alone is unique — the conventional SAN priority.

use crate::board::Position;
use crate::core::masks::{FILE_DISPLAYS, RANK_DISPLAYS};
use crate::core::piece::PieceType;
use crate::core::piece_move::{Move, MoveType};
use crate::core::sq::SQ;
use crate::error::ChessError;

fn file_char(sq: SQ) -> char {
    FILE_DISPLAYS[sq.file_idx() as usize]
}

fn rank_char(sq: SQ) -> char {
    RANK_DISPLAYS[sq.rank_idx() as usize]
}

/// Formats `m`, legal in `pos`, as SAN text including a `+`/`#` suffix.
pub fn format(pos: &Position, m: Move) -> String {
    let mut s = match m.move_type() {
        MoveType::ShortCastling => "O-O".to_string(),
        MoveType::LongCastling => "O-O-O".to_string(),
        _ => {
            let mut body = String::new();
            if m.piece() == PieceType::Pawn {
                if m.is_capture() {
                    body.push(file_char(m.from()));
                }
            } else {
                body.push(m.piece().display_letter());
                body.push_str(&disambiguation(pos, m));
            }
            if m.is_capture() {
                body.push('x');
            }
            body.push_str(&m.to().to_string());
            if m.move_type().is_promotion() {
                body.push('=');
                body.push(m.move_type().promotion_piece().display_letter());
            }
            body
        }
    };
    s.push_str(&check_suffix(pos, m));
    s
}

fn disambiguation(pos: &Position, m: Move) -> String {
    let others: Vec<Move> = pos
        .generate_moves()
        .into_iter()
        .filter(|&o| o.from() != m.from() && o.piece() == m.piece() && o.to() == m.to())
        .collect();
    if others.is_empty() {
        return String::new();
    }
    let same_file = others.iter().any(|o| o.from().file_idx() == m.from().file_idx());
    let same_rank = others.iter().any(|o| o.from().rank_idx() == m.from().rank_idx());
    if !same_file {
        file_char(m.from()).to_string()
    } else if !same_rank {
        rank_char(m.from()).to_string()
    } else {
        format!("{}{}", file_char(m.from()), rank_char(m.from()))
    }
}

fn check_suffix(pos: &Position, m: Move) -> String {
    let mut after = pos.clone();
    after.make_move(m);
    if !after.in_check() {
        return String::new();
    }
    if after.generate_moves().is_empty() {
        "#".to_string()
    } else {
        "+".to_string()
    }
}

/// Parses `input` against `pos`'s legal moves. Trailing `+`/`#` markers
/// are accepted but not required; disambiguation characters, if present,
/// are enforced against the source square.
pub fn parse(pos: &Position, input: &str) -> Result<Move, ChessError> {
    let trimmed = input.trim();
    let core = trimmed.trim_end_matches(['+', '#']);

    if core == "O-O" {
        return pos
            .generate_moves()
            .into_iter()
            .find(|m| m.move_type() == MoveType::ShortCastling)
            .ok_or_else(|| ChessError::San(format!("{input:?}: king-side castling is not legal here")));
    }
    if core == "O-O-O" {
        return pos
            .generate_moves()
            .into_iter()
            .find(|m| m.move_type() == MoveType::LongCastling)
            .ok_or_else(|| ChessError::San(format!("{input:?}: queen-side castling is not legal here")));
    }

    let (body, promotion) = match core.split_once('=') {
        Some((b, p)) => {
            let c = p
                .chars()
                .next()
                .ok_or_else(|| ChessError::San(format!("missing promotion letter in {input:?}")))?;
            (b, Some(c.to_ascii_uppercase()))
        }
        None => (core, None),
    };

    let chars: Vec<char> = body.chars().collect();
    if chars.len() < 2 {
        return Err(ChessError::San(format!("{input:?} is too short to be a move")));
    }

    let (piece_type, rest_start) = if chars[0].is_ascii_uppercase() {
        (
            PieceType::from_letter(chars[0]).ok_or_else(|| ChessError::San(format!("bad piece letter in {input:?}")))?,
            1,
        )
    } else {
        (PieceType::Pawn, 0)
    };

    if chars.len() < rest_start + 2 {
        return Err(ChessError::San(format!("{input:?} is missing a destination square")));
    }
    let dest: String = chars[chars.len() - 2..].iter().collect();
    let to = SQ::from_algebraic(&dest).ok_or_else(|| ChessError::San(format!("bad destination square in {input:?}")))?;

    let disambiguators: Vec<char> =
        chars[rest_start..chars.len() - 2].iter().copied().filter(|&c| c != 'x').collect();

    let candidates: Vec<Move> = pos
        .generate_moves()
        .into_iter()
        .filter(|m| {
            m.piece() == piece_type
                && m.to() == to
                && match promotion {
                    Some(p) => m.move_type().is_promotion() && m.move_type().promotion_piece().display_letter() == p,
                    None => !m.move_type().is_promotion(),
                }
                && disambiguators.iter().all(|&c| {
                    if c.is_ascii_digit() {
                        m.from().rank_idx() == (c as u8 - b'1')
                    } else {
                        m.from().file_idx() == (c as u8 - b'a')
                    }
                })
        })
        .collect();

    match candidates.len() {
        1 => Ok(candidates[0]),
        0 => Err(ChessError::San(format!("{input:?} is not a legal move in this position"))),
        _ => Err(ChessError::San(format!("{input:?} is ambiguous in this position"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_a_pawn_push_and_capture() {
        let pos = Position::start_pos();
        let m = parse(&pos, "e4").unwrap();
        assert_eq!(format(&pos, m), "e4");
    }

    #[test]
    fn disambiguates_by_file_when_ranks_differ() {
        let pos = Position::from_fen("4k3/8/8/8/8/4K3/8/R6R w - - 0 1").unwrap();
        let m = parse(&pos, "Rad1").unwrap();
        assert_eq!(format(&pos, m), "Rad1");
        let m2 = parse(&pos, "Rhd1").unwrap();
        assert_eq!(format(&pos, m2), "Rhd1");
    }

    #[test]
    fn disambiguates_by_rank_when_files_match() {
        let pos = Position::from_fen("4k3/R7/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let m = parse(&pos, "R1a4").unwrap();
        assert_eq!(format(&pos, m), "R1a4");
        let m2 = parse(&pos, "R7a4").unwrap();
        assert_eq!(format(&pos, m2), "R7a4");
    }

    #[test]
    fn castling_round_trips() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let m = parse(&pos, "O-O").unwrap();
        assert_eq!(format(&pos, m), "O-O");
    }

    #[test]
    fn check_and_mate_suffixes() {
        let pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let m = parse(&pos, "Ra8").unwrap();
        assert_eq!(format(&pos, m), "Ra8#");
    }

    #[test]
    fn rejects_illegal_san() {
        let pos = Position::start_pos();
        assert!(parse(&pos, "Qh5").is_err());
    }
}
