//! Pure algebraic coordinate notation: `<from><to>[promotion]`, e.g.
//! `"e2e4"` or `"e7e8q"`. Unlike SAN, this format names squares directly
//! and carries no disambiguation or check/mate markers.

use crate::board::Position;
use crate::core::piece_move::Move;
use crate::core::sq::SQ;
use crate::error::ChessError;

/// Parses `s` against `pos`'s legal moves, returning the matching [`Move`].
pub fn parse(pos: &Position, s: &str) -> Result<Move, ChessError> {
    let s = s.trim();
    if s.len() != 4 && s.len() != 5 {
        return Err(ChessError::Pacn(format!("expected 4 or 5 characters, got {s:?}")));
    }
    let from = SQ::from_algebraic(&s[0..2]).ok_or_else(|| ChessError::Pacn(format!("bad source square in {s:?}")))?;
    let to = SQ::from_algebraic(&s[2..4]).ok_or_else(|| ChessError::Pacn(format!("bad destination square in {s:?}")))?;
    let promotion = if s.len() == 5 {
        Some(s.as_bytes()[4].to_ascii_lowercase())
    } else {
        None
    };

    pos.generate_moves()
        .into_iter()
        .find(|m| {
            m.from() == from
                && m.to() == to
                && match promotion {
                    Some(c) => {
                        m.move_type().is_promotion()
                            && m.move_type().promotion_piece().display_letter().to_ascii_lowercase() == c as char
                    }
                    None => !m.move_type().is_promotion(),
                }
        })
        .ok_or_else(|| ChessError::Pacn(format!("{s:?} is not a legal move in this position")))
}

/// Formats `m` as PACN text.
pub fn format(m: Move) -> String {
    let mut s = m.to_uci_squares();
    if m.move_type().is_promotion() {
        s.push(m.move_type().promotion_piece().display_letter().to_ascii_lowercase());
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_simple_push() {
        let pos = Position::start_pos();
        let m = parse(&pos, "e2e4").unwrap();
        assert_eq!(format(m), "e2e4");
    }

    #[test]
    fn parses_a_promotion() {
        let pos = Position::from_fen("8/4P1k1/8/8/8/8/6K1/8 w - - 0 1").unwrap();
        let m = parse(&pos, "e7e8q").unwrap();
        assert_eq!(format(m), "e7e8q");
    }

    #[test]
    fn rejects_illegal_move() {
        let pos = Position::start_pos();
        assert!(parse(&pos, "e2e5").is_err());
    }

    #[test]
    fn rejects_malformed_text() {
        let pos = Position::start_pos();
        assert!(parse(&pos, "e2").is_err());
    }
}
