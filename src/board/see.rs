//! Static exchange evaluation: the material result of a sequence of
//! captures on one square, assuming both sides always recapture with
//! their least valuable attacker.
//!
//! Classic "swap list" algorithm (chess programming wiki): simulate the
//! capture sequence one recapture at a time, recomputing attackers to the
//! target square from scratch after each removal so that x-ray attackers
//! behind a just-used slider are automatically picked up, then fold the
//! per-ply gains back through a negamax minimax to the final value.

use super::Position;
use crate::core::masks::{NORTH, SOUTH};
use crate::core::piece::{PieceType, Player};
use crate::core::piece_move::Move;
use crate::core::sq::SQ;

const VALUES: [i32; 7] = [
    0,     // None
    20000, // King
    900,   // Queen
    500,   // Rook
    330,   // Bishop
    320,   // Knight
    100,   // Pawn
];

#[inline]
fn piece_value(pt: PieceType) -> i32 {
    VALUES[pt as usize]
}

/// Material gain (positive favors the side making `m`) from playing out
/// the full capture sequence on `m.to()`. `m` need not be a capture;
/// non-captures evaluate to 0.
pub fn static_exchange_eval(pos: &Position, m: Move) -> i32 {
    if !m.is_capture() {
        return 0;
    }
    let to = m.to();
    let from = m.from();
    let us = pos.side_to_move();

    let mut occ = pos.occupied() & !from.to_bb();
    if m.is_en_passant() {
        let captured_sq = SQ((to.0 as i8 + if us == Player::White { SOUTH } else { NORTH }) as u8);
        occ &= !captured_sq.to_bb();
    }

    let mut gain = vec![piece_value(m.captured())];
    let mut attacker_value = piece_value(m.piece());
    let mut side = us.other();

    loop {
        let attackers = pos.attackers_to(to, occ) & occ & pos.occupied_by(side);
        if attackers.is_empty() {
            break;
        }
        let (attacker_sq, attacker_pt) = least_valuable_attacker(pos, attackers);

        gain.push(attacker_value - gain.last().copied().unwrap());
        occ &= !attacker_sq.to_bb();
        attacker_value = piece_value(attacker_pt);
        side = side.other();

        // A king can never capture into an attacked square, so once one
        // has been "used" as the notional attacker the exchange is over.
        if attacker_pt == PieceType::King {
            break;
        }
    }

    for i in (1..gain.len()).rev() {
        gain[i - 1] = -(-gain[i - 1]).max(gain[i]);
    }
    gain[0]
}

fn least_valuable_attacker(pos: &Position, attackers: crate::core::bitboard::BitBoard) -> (SQ, PieceType) {
    attackers
        .iter()
        .map(|sq| (sq, pos.piece_at(sq).piece_type()))
        .min_by_key(|&(_, pt)| piece_value(pt))
        .expect("attackers is non-empty")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::piece_move::MoveType;

    #[test]
    fn winning_pawn_takes_undefended_knight() {
        let pos = Position::from_fen("4k3/8/8/3n4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let m = Move::new(SQ::E4, SQ::D5, PieceType::Pawn, PieceType::Knight, MoveType::Normal);
        assert_eq!(static_exchange_eval(&pos, m), piece_value(PieceType::Knight));
    }

    #[test]
    fn losing_exchange_is_negative() {
        // Bishop takes a pawn that's defended by another pawn: a straight
        // minor-piece-for-pawn loss once the recapture lands.
        let pos = Position::from_fen("4k3/8/4p3/3p4/2B5/8/8/4K3 w - - 0 1").unwrap();
        let m = Move::new(SQ::C4, SQ::D5, PieceType::Bishop, PieceType::Pawn, MoveType::Normal);
        let see = static_exchange_eval(&pos, m);
        assert!(see < 0, "bishop takes a pawn defended by a pawn should lose material, got {see}");
    }

    #[test]
    fn non_capture_is_zero() {
        let pos = Position::start_pos();
        let m = Move::new(SQ::E2, SQ::E4, PieceType::Pawn, PieceType::None, MoveType::Normal);
        assert_eq!(static_exchange_eval(&pos, m), 0);
    }
}
