//! FEN round-trip integration tests (testable property alongside perft
//! and make/unmake): parsing a canonical FEN and re-formatting it must
//! reproduce the original string, and playing out moves then formatting
//! the resulting position must reparse to the same hash.

use corvid::Position;

const FENS: &[&str] = &[
    corvid::board::STARTING_FEN,
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3",
    "4k3/8/8/8/8/8/8/4K2R w K - 0 1",
];

#[test]
fn canonical_fens_round_trip_through_parse_and_format() {
    for fen in FENS {
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(&pos.to_fen(), fen);
    }
}

#[test]
fn formatting_after_play_reparses_to_the_same_hash() {
    let mut pos = Position::start_pos();
    let m = pos.generate_moves()[0];
    pos.make_move(m);
    let replayed = Position::from_fen(&pos.to_fen()).unwrap();
    assert_eq!(replayed.key(), pos.key());
    assert_eq!(replayed.pawn_key(), pos.pawn_key());
    assert_eq!(replayed.to_fen(), pos.to_fen());
}
