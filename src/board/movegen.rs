//! Legal move generation: pseudo-legal attacks staged by target bitboard,
//! filtered down to strictly legal moves via pin detection and (for
//! positions in check) a check-evasion target mask.
//!
//! Unlike a generate-then-filter-by-replaying-every-move approach, pins
//! are computed once per call and pushes/captures are masked against the
//! pinned piece's own king-to-pinner ray directly; the one move kind that
//! still gets a full make/verify treatment is en passant, whose
//! discovered-check edge case (two pawns abreast, pinned to the king
//! along the capturing rank) is easier to get right by simulation than
//! by another special-cased ray check.

use super::Position;
use crate::core::bitboard::{self, BitBoard};
use crate::core::magic;
use crate::core::masks::{NORTH, SOUTH};
use crate::core::piece::{CastleType, Piece, PieceType, Player};
use crate::core::piece_move::{Move, MoveType};
use crate::core::sq::SQ;

const PROMOTIONS: [MoveType; 4] = [
    MoveType::PromotionToQueen,
    MoveType::PromotionToRook,
    MoveType::PromotionToBishop,
    MoveType::PromotionToKnight,
];

pub(crate) fn generate_legal(pos: &Position) -> Vec<Move> {
    let mut moves = Vec::with_capacity(48);
    let us = pos.side_to_move();
    let them = us.other();
    let own = pos.occupied_by(us);
    let occ = pos.occupied();
    let king_sq = pos.king_sq(us);
    let checkers = pos.checkers();
    let num_checkers = checkers.count_bits();

    generate_king_moves(pos, them, own, occ, king_sq, &mut moves);

    if num_checkers >= 2 {
        return moves;
    }

    let (pin_ray, pinned) = compute_pins(pos, us, them, king_sq, occ, own);

    let target = if num_checkers == 1 {
        let checker_sq = checkers.lsb();
        let mut t = checkers;
        if is_slider(pos.piece_at(checker_sq)) {
            t |= between(king_sq, checker_sq);
        }
        t
    } else {
        !own
    };

    generate_pawn_moves(pos, us, them, occ, pos.occupied_by(them), target, &pin_ray, pinned, king_sq, &mut moves);
    for &pt in &[PieceType::Knight, PieceType::Bishop, PieceType::Rook, PieceType::Queen] {
        generate_piece_moves(pos, us, occ, own, target, &pin_ray, pinned, pt, &mut moves);
    }

    if num_checkers == 0 {
        generate_castling(pos, us, occ, &mut moves);
    }

    moves
}

fn is_slider(piece: Piece) -> bool {
    matches!(piece.piece_type(), PieceType::Rook | PieceType::Bishop | PieceType::Queen)
}

/// Squares strictly between `a` and `b`, empty unless they share a rank,
/// file, or diagonal.
///
/// Only the ray kind that actually connects `a` and `b` is considered:
/// intersecting full rook attacks from both ends also works when the two
/// squares aren't rook-aligned at all, since each end's unconstrained
/// attack can happen to cross the other's by coincidence elsewhere on the
/// board (e.g. f8 and h6 both "see" f6 and h8 by rook lines that have
/// nothing to do with the diagonal between them).
fn between(a: SQ, b: SQ) -> BitBoard {
    let occ_b = b.to_bb().0;
    let occ_a = a.to_bb().0;
    if a.rank_idx() == b.rank_idx() || a.file_idx() == b.file_idx() {
        BitBoard(magic::rook_attacks(occ_b, a)) & BitBoard(magic::rook_attacks(occ_a, b))
    } else if (a.file_idx() as i8 - b.file_idx() as i8).abs() == (a.rank_idx() as i8 - b.rank_idx() as i8).abs() {
        BitBoard(magic::bishop_attacks(occ_b, a)) & BitBoard(magic::bishop_attacks(occ_a, b))
    } else {
        BitBoard::EMPTY
    }
}

fn compute_pins(
    pos: &Position,
    _us: Player,
    them: Player,
    king_sq: SQ,
    occ: BitBoard,
    own: BitBoard,
) -> ([BitBoard; 64], BitBoard) {
    let mut pin_ray = [BitBoard::ALL; 64];
    let mut pinned = BitBoard::EMPTY;

    let rook_queen = pos.piece_bb_of(them, PieceType::Rook) | pos.piece_bb_of(them, PieceType::Queen);
    let bishop_queen = pos.piece_bb_of(them, PieceType::Bishop) | pos.piece_bb_of(them, PieceType::Queen);

    let snipers = (BitBoard(magic::rook_attacks(0, king_sq)) & rook_queen)
        | (BitBoard(magic::bishop_attacks(0, king_sq)) & bishop_queen);

    for sniper_sq in snipers.iter() {
        let between_bb = between(king_sq, sniper_sq);
        let blockers = between_bb & occ;
        if blockers.count_bits() == 1 && (blockers & own).is_not_empty() {
            let pinned_sq = blockers.lsb();
            pinned |= blockers;
            pin_ray[pinned_sq.0 as usize] = between_bb | sniper_sq.to_bb();
        }
    }

    (pin_ray, pinned)
}

fn generate_king_moves(
    pos: &Position,
    them: Player,
    own: BitBoard,
    occ: BitBoard,
    king_sq: SQ,
    moves: &mut Vec<Move>,
) {
    let occ_without_king = occ & !king_sq.to_bb();
    let destinations = bitboard::king_attacks(king_sq) & !own;
    for to in destinations.iter() {
        if (pos.attackers_to(to, occ_without_king) & pos.occupied_by(them)).is_not_empty() {
            continue;
        }
        let captured = pos.piece_at(to).piece_type();
        moves.push(Move::new(king_sq, to, PieceType::King, captured, MoveType::Normal));
    }
}

fn generate_piece_moves(
    pos: &Position,
    us: Player,
    occ: BitBoard,
    own: BitBoard,
    target: BitBoard,
    pin_ray: &[BitBoard; 64],
    pinned: BitBoard,
    piece_type: PieceType,
    moves: &mut Vec<Move>,
) {
    for from in pos.piece_bb_of(us, piece_type).iter() {
        let mut attacks = match piece_type {
            PieceType::Knight => bitboard::knight_attacks(from),
            PieceType::Bishop => BitBoard(magic::bishop_attacks(occ.0, from)),
            PieceType::Rook => BitBoard(magic::rook_attacks(occ.0, from)),
            PieceType::Queen => BitBoard(magic::queen_attacks(occ.0, from)),
            _ => unreachable!("pawns and kings are generated separately"),
        };
        attacks &= !own;
        attacks &= target;
        if (pinned & from.to_bb()).is_not_empty() {
            attacks &= pin_ray[from.0 as usize];
        }
        for to in attacks.iter() {
            let captured = pos.piece_at(to).piece_type();
            moves.push(Move::new(from, to, piece_type, captured, MoveType::Normal));
        }
    }
}

fn promotion_rank(player: Player) -> u8 {
    match player {
        Player::White => 7,
        Player::Black => 0,
    }
}

fn home_rank(player: Player) -> u8 {
    match player {
        Player::White => 1,
        Player::Black => 6,
    }
}

#[allow(clippy::too_many_arguments)]
fn add_pawn_move(
    from: SQ,
    to: SQ,
    captured: PieceType,
    us: Player,
    target: BitBoard,
    pin_ray: &[BitBoard; 64],
    pinned: BitBoard,
    moves: &mut Vec<Move>,
) {
    if (target & to.to_bb()).is_empty() {
        return;
    }
    if (pinned & from.to_bb()).is_not_empty() && (pin_ray[from.0 as usize] & to.to_bb()).is_empty() {
        return;
    }
    if to.rank_idx() == promotion_rank(us) {
        for &promo in &PROMOTIONS {
            moves.push(Move::new(from, to, PieceType::Pawn, captured, promo));
        }
    } else {
        moves.push(Move::new(from, to, PieceType::Pawn, captured, MoveType::Normal));
    }
}

#[allow(clippy::too_many_arguments)]
fn generate_pawn_moves(
    pos: &Position,
    us: Player,
    them: Player,
    occ: BitBoard,
    enemy: BitBoard,
    target: BitBoard,
    pin_ray: &[BitBoard; 64],
    pinned: BitBoard,
    king_sq: SQ,
    moves: &mut Vec<Move>,
) {
    let push_dir = us.pawn_push_dir();

    for from in pos.piece_bb_of(us, PieceType::Pawn).iter() {
        let to1 = SQ((from.0 as i8 + push_dir) as u8);
        if (occ & to1.to_bb()).is_empty() {
            add_pawn_move(from, to1, PieceType::None, us, target, pin_ray, pinned, moves);
            if from.rank_idx() == home_rank(us) {
                let to2 = SQ((from.0 as i8 + 2 * push_dir) as u8);
                if (occ & to2.to_bb()).is_empty() {
                    add_pawn_move(from, to2, PieceType::None, us, target, pin_ray, pinned, moves);
                }
            }
        }

        for to in bitboard::pawn_attacks(us, from).iter() {
            if (enemy & to.to_bb()).is_not_empty() {
                let captured = pos.piece_at(to).piece_type();
                add_pawn_move(from, to, captured, us, target, pin_ray, pinned, moves);
            } else if pos.ep_square() == Some(to) {
                try_add_en_passant(pos, us, them, from, to, occ, king_sq, moves);
            }
        }
    }
}

fn try_add_en_passant(
    pos: &Position,
    us: Player,
    them: Player,
    from: SQ,
    to: SQ,
    occ: BitBoard,
    king_sq: SQ,
    moves: &mut Vec<Move>,
) {
    let captured_sq = SQ((to.0 as i8 + if us == Player::White { SOUTH } else { NORTH }) as u8);
    let mut occ2 = occ & !from.to_bb() & !captured_sq.to_bb();
    occ2 |= to.to_bb();
    if (pos.attackers_to(king_sq, occ2) & pos.occupied_by(them)).is_empty() {
        moves.push(Move::new(from, to, PieceType::Pawn, PieceType::Pawn, MoveType::EnPassant));
    }
}

fn castling_geometry(us: Player, side: CastleType) -> (SQ, SQ, SQ, [SQ; 3]) {
    use crate::core::sq::SQ as S;
    match (us, side) {
        (Player::White, CastleType::KingSide) => (S::E1, S::G1, S::H1, [S::E1, S::F1, S::G1]),
        (Player::White, CastleType::QueenSide) => (S::E1, S::C1, S::A1, [S::E1, S::D1, S::C1]),
        (Player::Black, CastleType::KingSide) => (S::E8, S::G8, S::H8, [S::E8, S::F8, S::G8]),
        (Player::Black, CastleType::QueenSide) => (S::E8, S::C8, S::A8, [S::E8, S::D8, S::C8]),
    }
}

fn generate_castling(pos: &Position, us: Player, occ: BitBoard, moves: &mut Vec<Move>) {
    for side in [CastleType::KingSide, CastleType::QueenSide] {
        if !pos.can_castle(us, side) {
            continue;
        }
        let (king_from, king_to, rook_from, transit) = castling_geometry(us, side);
        if (between(king_from, rook_from) & occ).is_not_empty() {
            continue;
        }
        if transit.iter().any(|&sq| pos.attacked_by(sq, us.other())) {
            continue;
        }
        let move_type = if side == CastleType::KingSide { MoveType::ShortCastling } else { MoveType::LongCastling };
        moves.push(Move::new(king_from, king_to, PieceType::King, PieceType::None, move_type));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Position;

    #[test]
    fn start_pos_move_count() {
        assert_eq!(generate_legal(&Position::start_pos()).len(), 20);
    }

    #[test]
    fn pinned_bishop_cannot_leave_the_pin_line() {
        let pos = Position::from_fen("4k3/8/8/8/8/4b3/8/4K2R w K - 0 1").unwrap();
        let rook_moves: Vec<Move> =
            generate_legal(&pos).into_iter().filter(|m| m.piece() == PieceType::Rook).collect();
        assert!(!rook_moves.is_empty());
    }

    #[test]
    fn double_check_only_allows_king_moves() {
        // White king on e1 checked by both a knight on d3 and a bishop on a5.
        let pos = Position::from_fen("7k/8/8/b7/8/3n4/8/4K3 w - - 0 1").unwrap();
        let moves = generate_legal(&pos);
        assert!(moves.iter().all(|m| m.piece() == PieceType::King));
    }

    #[test]
    fn en_passant_discovered_check_is_excluded() {
        // White king on e5, black rook on a5; a white pawn on d5 and black
        // pawn having just played ...c7-c5 sit abreast on the 5th rank.
        // Capturing en passant would slide the rook's attack straight
        // through to the king, so it must not be generated.
        let pos = Position::from_fen("7k/8/8/K1Pp3r/8/8/8/8 w - d6 0 1").unwrap();
        let moves = generate_legal(&pos);
        assert!(!moves.iter().any(|m| m.move_type() == MoveType::EnPassant));
    }

    #[test]
    fn castling_blocked_through_attacked_square() {
        let pos = Position::from_fen("4k3/8/8/8/8/5r2/8/4K2R w K - 0 1").unwrap();
        let moves = generate_legal(&pos);
        assert!(!moves.iter().any(|m| m.move_type() == MoveType::ShortCastling));
    }
}
