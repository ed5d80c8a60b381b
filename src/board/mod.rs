//! [`Position`]: the bitboard board state, with incremental make/unmake,
//! Zobrist hash maintenance, legal move generation, and FEN round-tripping.

pub mod castle_rights;
pub mod fen;
pub mod movegen;
pub mod perft;
pub mod see;

use crate::core::bitboard::{self, BitBoard};
use crate::core::magic;
use crate::core::masks::*;
use crate::core::piece::{CastleType, Piece, PieceType, Player};
use crate::core::piece_move::{Move, MoveType};
use crate::core::sq::SQ;
use crate::core::zobrist;
use crate::error::ChessError;

use self::castle_rights::Castling;

use std::fmt;

/// Snapshot of everything a `make` needs to undo, plus the move applied
/// and what it captured. Pushed onto [`Position`]'s undo stack.
#[derive(Clone)]
struct UndoRecord {
    mv: Move,
    castling: Castling,
    ep_file: u8,
    fifty_move_clock: u16,
    checkers: BitBoard,
    key: u64,
    pawn_key: u64,
    /// `Some(previous list)` if this move was irreversible and so cleared
    /// the repetition list; restored verbatim on unmake. `None` if the
    /// move was reversible, in which case unmake just pops the one key
    /// this move pushed.
    replaced_repetition: Option<Vec<u64>>,
}

/// A chess position: bitboards, derived aggregates, a square-indexed
/// piece lookup, game-state flags, and the undo/repetition history
/// needed to make and unmake moves.
#[derive(Clone)]
pub struct Position {
    piece_bb: [BitBoard; PIECE_CNT],
    squares: [Piece; SQ_CNT],
    white_occupied: BitBoard,
    black_occupied: BitBoard,
    all_occupied: BitBoard,
    side_to_move: Player,
    castling: Castling,
    ep_file: u8,
    fifty_move_clock: u16,
    half_move_index: u32,
    full_move_number: u32,
    key: u64,
    pawn_key: u64,
    checkers: BitBoard,
    undo_stack: Vec<UndoRecord>,
    repetition_list: Vec<u64>,
}

impl Position {
    /// An empty board: no pieces, White to move, no castling rights.
    pub fn blank() -> Position {
        Position {
            piece_bb: [BitBoard::EMPTY; PIECE_CNT],
            squares: [Piece::None; SQ_CNT],
            white_occupied: BitBoard::EMPTY,
            black_occupied: BitBoard::EMPTY,
            all_occupied: BitBoard::EMPTY,
            side_to_move: Player::White,
            castling: Castling::empty(),
            ep_file: NO_EP_FILE,
            fifty_move_clock: 0,
            half_move_index: 0,
            full_move_number: 1,
            key: 0,
            pawn_key: 0,
            checkers: BitBoard::EMPTY,
            undo_stack: Vec::new(),
            repetition_list: Vec::new(),
        }
    }

    /// The standard chess starting position.
    pub fn start_pos() -> Position {
        fen::parse(STARTING_FEN).expect("starting FEN is well-formed")
    }

    /// Parses a FEN string into a `Position`.
    pub fn from_fen(fen: &str) -> Result<Position, ChessError> {
        fen::parse(fen)
    }

    /// Serializes to canonical FEN.
    pub fn to_fen(&self) -> String {
        fen::format(self)
    }

    // --- accessors -----------------------------------------------------

    #[inline]
    pub fn side_to_move(&self) -> Player {
        self.side_to_move
    }

    #[inline]
    pub fn piece_at(&self, sq: SQ) -> Piece {
        self.squares[sq.0 as usize]
    }

    #[inline]
    pub fn piece_bb(&self, piece: Piece) -> BitBoard {
        self.piece_bb[piece as usize]
    }

    #[inline]
    pub fn piece_bb_of(&self, player: Player, piece_type: PieceType) -> BitBoard {
        self.piece_bb(Piece::make(player, piece_type))
    }

    #[inline]
    pub fn occupied(&self) -> BitBoard {
        self.all_occupied
    }

    #[inline]
    pub fn occupied_by(&self, player: Player) -> BitBoard {
        match player {
            Player::White => self.white_occupied,
            Player::Black => self.black_occupied,
        }
    }

    #[inline]
    pub fn king_sq(&self, player: Player) -> SQ {
        self.piece_bb_of(player, PieceType::King).to_sq()
    }

    #[inline]
    pub fn checkers(&self) -> BitBoard {
        self.checkers
    }

    #[inline]
    pub fn in_check(&self) -> bool {
        self.checkers.is_not_empty()
    }

    #[inline]
    pub fn key(&self) -> u64 {
        self.key
    }

    #[inline]
    pub fn pawn_key(&self) -> u64 {
        self.pawn_key
    }

    #[inline]
    pub fn fifty_move_clock(&self) -> u16 {
        self.fifty_move_clock
    }

    #[inline]
    pub fn half_move_index(&self) -> u32 {
        self.half_move_index
    }

    #[inline]
    pub fn full_move_number(&self) -> u32 {
        self.full_move_number
    }

    #[inline]
    pub fn castling_rights(&self) -> Castling {
        self.castling
    }

    #[inline]
    pub fn can_castle(&self, player: Player, side: CastleType) -> bool {
        self.castling.can_castle(player, side)
    }

    /// `Some(file)` if the last move was a double pawn push, else `None`.
    #[inline]
    pub fn ep_file(&self) -> Option<u8> {
        if self.ep_file == NO_EP_FILE {
            None
        } else {
            Some(self.ep_file)
        }
    }

    /// The square a capturing pawn would land on to take en passant.
    #[inline]
    pub fn ep_square(&self) -> Option<SQ> {
        self.ep_file().map(|file| match self.side_to_move {
            Player::White => SQ(file + 5 * 8),
            Player::Black => SQ(file + 2 * 8),
        })
    }

    /// Polyglot-compatible hash of this position (see [`crate::core::zobrist`]).
    pub fn polyglot_key(&self) -> u64 {
        let mut key = 0u64;
        for sq in self.all_occupied.iter() {
            key ^= zobrist::polyglot_piece_square(self.piece_at(sq), sq);
        }
        if self.castling.contains(Castling::WHITE_K) {
            key ^= zobrist::polyglot_castle(0);
        }
        if self.castling.contains(Castling::WHITE_Q) {
            key ^= zobrist::polyglot_castle(1);
        }
        if self.castling.contains(Castling::BLACK_K) {
            key ^= zobrist::polyglot_castle(2);
        }
        if self.castling.contains(Castling::BLACK_Q) {
            key ^= zobrist::polyglot_castle(3);
        }
        if let Some(file) = self.ep_file() {
            if self.ep_capturable() {
                key ^= zobrist::polyglot_en_passant_file(file);
            }
        }
        if self.side_to_move == Player::White {
            key ^= zobrist::polyglot_turn();
        }
        key
    }

    /// Whether an enemy pawn exists that could actually capture on the
    /// en-passant file next ply (see §4.3's hashing rule).
    fn ep_capturable(&self) -> bool {
        self.ep_hashed(self.ep_file, self.side_to_move) != 0
    }

    /// Zobrist contribution of `file` for `capturing_side`'s hash, or 0 if
    /// `file` is [`NO_EP_FILE`] or no pawn of `capturing_side` could
    /// actually capture there. Takes the capturing side explicitly (rather
    /// than reading `self.side_to_move`) so callers mid-`make_move` can
    /// evaluate the pre-move file against the mover and the post-move file
    /// against the opponent, instead of always checking against whichever
    /// side `self.side_to_move` happens to hold at the time.
    fn ep_hashed(&self, file: u8, capturing_side: Player) -> u64 {
        if file == NO_EP_FILE {
            return 0;
        }
        let target = match capturing_side {
            Player::White => SQ(file + 5 * 8),
            Player::Black => SQ(file + 2 * 8),
        };
        let capturable = bitboard::pawn_attacks(capturing_side, target)
            .iter()
            .any(|sq| self.piece_at(sq) == Piece::make(capturing_side, PieceType::Pawn));
        if capturable {
            zobrist::en_passant_file(file)
        } else {
            0
        }
    }

    // --- board mutation primitives --------------------------------------

    fn put_piece(&mut self, sq: SQ, piece: Piece) {
        debug_assert_eq!(self.squares[sq.0 as usize], Piece::None);
        self.squares[sq.0 as usize] = piece;
        self.piece_bb[piece as usize] |= sq.to_bb();
        match piece.player() {
            Player::White => self.white_occupied |= sq.to_bb(),
            Player::Black => self.black_occupied |= sq.to_bb(),
        }
        self.all_occupied |= sq.to_bb();
    }

    fn remove_piece(&mut self, sq: SQ) -> Piece {
        let piece = self.squares[sq.0 as usize];
        debug_assert_ne!(piece, Piece::None);
        self.squares[sq.0 as usize] = Piece::None;
        self.piece_bb[piece as usize] &= !sq.to_bb();
        match piece.player() {
            Player::White => self.white_occupied &= !sq.to_bb(),
            Player::Black => self.black_occupied &= !sq.to_bb(),
        }
        self.all_occupied &= !sq.to_bb();
        piece
    }

    fn move_piece(&mut self, from: SQ, to: SQ) {
        let piece = self.remove_piece(from);
        self.put_piece(to, piece);
    }

    fn key_for_castling(&self) -> u64 {
        let combined = self.castling.bits();
        zobrist::castling(combined)
    }

    // --- attack queries --------------------------------------------------

    /// All pieces (either color) attacking `sq` given `occ` as the board's
    /// occupancy (callers may pass a modified occupancy for X-ray queries).
    pub fn attackers_to(&self, sq: SQ, occ: BitBoard) -> BitBoard {
        let rooks_queens =
            self.piece_bb_of(Player::White, PieceType::Rook) | self.piece_bb_of(Player::Black, PieceType::Rook)
                | self.piece_bb_of(Player::White, PieceType::Queen)
                | self.piece_bb_of(Player::Black, PieceType::Queen);
        let bishops_queens =
            self.piece_bb_of(Player::White, PieceType::Bishop) | self.piece_bb_of(Player::Black, PieceType::Bishop)
                | self.piece_bb_of(Player::White, PieceType::Queen)
                | self.piece_bb_of(Player::Black, PieceType::Queen);

        (bitboard::pawn_attacks(Player::White, sq) & self.piece_bb_of(Player::Black, PieceType::Pawn))
            | (bitboard::pawn_attacks(Player::Black, sq) & self.piece_bb_of(Player::White, PieceType::Pawn))
            | (bitboard::knight_attacks(sq)
                & (self.piece_bb_of(Player::White, PieceType::Knight) | self.piece_bb_of(Player::Black, PieceType::Knight)))
            | (bitboard::king_attacks(sq)
                & (self.piece_bb_of(Player::White, PieceType::King) | self.piece_bb_of(Player::Black, PieceType::King)))
            | (BitBoard(magic::rook_attacks(occ.0, sq)) & rooks_queens)
            | (BitBoard(magic::bishop_attacks(occ.0, sq)) & bishops_queens)
    }

    #[inline]
    pub fn attacked_by(&self, sq: SQ, by: Player) -> bool {
        (self.attackers_to(sq, self.all_occupied) & self.occupied_by(by)).is_not_empty()
    }

    fn compute_checkers(&self) -> BitBoard {
        let ksq = self.king_sq(self.side_to_move);
        self.attackers_to(ksq, self.all_occupied) & self.occupied_by(self.side_to_move.other())
    }

    // --- make / unmake ----------------------------------------------------

    /// Applies `m`, pushing an undo record. `m` must be legal in the
    /// current position.
    pub fn make_move(&mut self, m: Move) {
        let us = self.side_to_move;
        let them = us.other();
        let from = m.from();
        let to = m.to();
        let moved_piece = Piece::make(us, m.piece());

        // Captured before any piece is moved: whether `us` could actually
        // have captured on the current en-passant file. `us`'s own pawn
        // may be exactly the one moving this ply (if `m` is itself the en
        // passant capture), so this must read the pre-move board.
        let old_ep_key = self.ep_hashed(self.ep_file, us);

        let is_pawn_move = m.piece() == PieceType::Pawn;
        let is_capture = m.is_capture();
        let clears_rights =
            (self.castling.bits() & (from.castle_rights_mask() | to.castle_rights_mask())) != 0;

        let record = UndoRecord {
            mv: m,
            castling: self.castling,
            ep_file: self.ep_file,
            fifty_move_clock: self.fifty_move_clock,
            checkers: self.checkers,
            key: self.key,
            pawn_key: self.pawn_key,
            replaced_repetition: None,
        };
        let irreversible = is_pawn_move || is_capture || m.is_castle() || clears_rights;
        let record = UndoRecord {
            replaced_repetition: if irreversible { Some(self.repetition_list.clone()) } else { None },
            ..record
        };
        self.undo_stack.push(record);

        // remove captured piece (for en passant it's not on `to`)
        if is_capture {
            let cap_sq = if m.is_en_passant() {
                SQ(to.0.wrapping_add(if us == Player::White { SOUTH as u8 } else { NORTH as u8 }))
            } else {
                to
            };
            let captured = self.remove_piece(cap_sq);
            self.key ^= zobrist::piece_square(captured, cap_sq);
            if captured.piece_type() == PieceType::Pawn || captured.piece_type() == PieceType::King {
                self.pawn_key ^= zobrist::piece_square(captured, cap_sq);
            }
        }

        // move the piece (promotions replace it on `to` right after)
        self.key ^= zobrist::piece_square(moved_piece, from);
        self.move_piece(from, to);
        if is_pawn_move || m.piece() == PieceType::King {
            self.pawn_key ^= zobrist::piece_square(moved_piece, from);
        }

        if m.move_type().is_promotion() {
            self.remove_piece(to);
            let promoted = Piece::make(us, m.move_type().promotion_piece());
            self.put_piece(to, promoted);
            self.key ^= zobrist::piece_square(promoted, to);
        } else {
            self.key ^= zobrist::piece_square(moved_piece, to);
            if is_pawn_move || m.piece() == PieceType::King {
                self.pawn_key ^= zobrist::piece_square(moved_piece, to);
            }
        }

        if m.is_castle() {
            let (rook_from, rook_to) = castle_rook_squares(us, m.move_type());
            let rook = Piece::make(us, PieceType::Rook);
            self.key ^= zobrist::piece_square(rook, rook_from);
            self.move_piece(rook_from, rook_to);
            self.key ^= zobrist::piece_square(rook, rook_to);
        }

        // castling rights
        self.key ^= self.key_for_castling();
        self.castling.strip_moved(from, to);
        self.key ^= self.key_for_castling();

        // en passant file: hash each side's opportunity only when a pawn
        // could actually use it (§4.3), not merely whenever a file is set.
        self.key ^= old_ep_key;
        self.ep_file = if is_pawn_move && to.0.abs_diff(from.0) == 16 { to.file_idx() } else { NO_EP_FILE };
        self.key ^= self.ep_hashed(self.ep_file, them);

        self.fifty_move_clock = if is_pawn_move || is_capture { 0 } else { self.fifty_move_clock + 1 };

        self.key ^= zobrist::side_to_move();
        self.side_to_move = them;
        if them == Player::White {
            self.full_move_number += 1;
        }
        self.half_move_index += 1;

        self.checkers = self.compute_checkers();

        if irreversible {
            self.repetition_list.clear();
        }
        self.repetition_list.push(self.key);
    }

    /// Reverses the most recent [`make_move`](Self::make_move) call.
    pub fn unmake_move(&mut self) {
        let record = self.undo_stack.pop().expect("unmake_move called with empty undo stack");
        let m = record.mv;
        let them = self.side_to_move;
        let us = them.other();

        match record.replaced_repetition {
            Some(prev) => self.repetition_list = prev,
            None => {
                self.repetition_list.pop();
            }
        }

        self.half_move_index -= 1;
        if them == Player::White {
            self.full_move_number -= 1;
        }
        self.side_to_move = us;

        let from = m.from();
        let to = m.to();

        if m.is_castle() {
            let (rook_from, rook_to) = castle_rook_squares(us, m.move_type());
            self.move_piece(rook_to, rook_from);
        }

        if m.move_type().is_promotion() {
            self.remove_piece(to);
            self.put_piece(from, Piece::make(us, PieceType::Pawn));
        } else {
            self.move_piece(to, from);
        }

        if m.is_capture() {
            let cap_sq = if m.is_en_passant() {
                SQ(to.0.wrapping_add(if us == Player::White { SOUTH as u8 } else { NORTH as u8 }))
            } else {
                to
            };
            self.put_piece(cap_sq, Piece::make(them, m.captured()));
        }

        self.castling = record.castling;
        self.ep_file = record.ep_file;
        self.fifty_move_clock = record.fifty_move_clock;
        self.checkers = record.checkers;
        self.key = record.key;
        self.pawn_key = record.pawn_key;
    }

    // --- move generation / checks -----------------------------------------

    /// All strictly legal moves for the side to move.
    pub fn generate_moves(&self) -> Vec<Move> {
        movegen::generate_legal(self)
    }

    /// Whether making `m` (without mutating `self`) would put the opponent
    /// in check.
    pub fn gives_check(&self, m: Move) -> bool {
        let mut clone = self.clone();
        clone.make_move(m);
        clone.in_check()
    }

    /// Static exchange evaluation for a capturing move to `m.to()`. See
    /// [`see`] for the algorithm.
    pub fn see(&self, m: Move) -> i32 {
        see::static_exchange_eval(self, m)
    }

    // --- draw detection -----------------------------------------------------

    /// Fifty-move rule: true once the clock reaches 100 half-moves.
    pub fn is_fifty_move_draw(&self) -> bool {
        self.fifty_move_clock >= 100
    }

    /// Threefold repetition within the current irreversible-move window.
    pub fn is_repetition_draw(&self) -> bool {
        let current = self.key;
        self.repetition_list.iter().filter(|&&k| k == current).count() >= 3
    }

    pub fn is_draw(&self) -> bool {
        self.is_fifty_move_draw() || self.is_repetition_draw()
    }
}

fn castle_rook_squares(player: Player, move_type: MoveType) -> (SQ, SQ) {
    match (player, move_type) {
        (Player::White, MoveType::ShortCastling) => (SQ(ROOK_WHITE_KSIDE_START), SQ::F1),
        (Player::White, MoveType::LongCastling) => (SQ(ROOK_WHITE_QSIDE_START), SQ::D1),
        (Player::Black, MoveType::ShortCastling) => (SQ(ROOK_BLACK_KSIDE_START), SQ::F8),
        (Player::Black, MoveType::LongCastling) => (SQ(ROOK_BLACK_QSIDE_START), SQ::D8),
        _ => unreachable!("castle_rook_squares called on a non-castling move"),
    }
}

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8u8).rev() {
            for file in 0..8u8 {
                write!(f, "{} ", self.piece_at(SQ(rank * 8 + file)).display_letter())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({})", self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_pos_has_twenty_moves() {
        let pos = Position::start_pos();
        assert_eq!(pos.generate_moves().len(), 20);
    }

    #[test]
    fn make_unmake_is_identity() {
        let mut pos = Position::start_pos();
        let moves = pos.generate_moves();
        for m in moves {
            let before_fen = pos.to_fen();
            let before_key = pos.key();
            pos.make_move(m);
            pos.unmake_move();
            assert_eq!(pos.to_fen(), before_fen);
            assert_eq!(pos.key(), before_key);
        }
    }

    #[test]
    fn occupancy_invariant_holds() {
        let pos = Position::start_pos();
        let total: u32 = crate::core::piece::ALL_PIECE_TYPES
            .iter()
            .map(|&pt| {
                pos.piece_bb_of(Player::White, pt).count_bits() + pos.piece_bb_of(Player::Black, pt).count_bits()
            })
            .sum();
        assert_eq!(total, pos.occupied().count_bits());
        let non_null_squares = (0..64).filter(|&i| pos.piece_at(SQ(i)) != Piece::None).count();
        assert_eq!(non_null_squares as u32, total);
    }

    #[test]
    fn castling_move_updates_rook_and_rights() {
        let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let m = pos
            .generate_moves()
            .into_iter()
            .find(|m| m.move_type() == MoveType::ShortCastling)
            .expect("short castling should be legal");
        pos.make_move(m);
        assert_eq!(pos.piece_at(SQ::F1), Piece::WhiteRook);
        assert_eq!(pos.piece_at(SQ::G1), Piece::WhiteKing);
        assert!(!pos.can_castle(Player::White, CastleType::KingSide));
        assert!(!pos.can_castle(Player::White, CastleType::QueenSide));
        pos.unmake_move();
        assert_eq!(pos.to_fen(), "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    }
}
