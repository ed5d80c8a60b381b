//! Perft integration tests at the depths named by the concrete scenarios:
//! starting position to depth 5, Kiwipete to depth 4. Both run in well
//! under a second in a debug build, so they live in the default `cargo
//! test` run rather than behind an `--ignored`/release-only gate.

use corvid::board::perft::perft;
use corvid::Position;

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

#[test]
fn starting_position_perft_depth_5() {
    let mut pos = Position::start_pos();
    assert_eq!(perft(&mut pos, 5), 4_865_609);
}

#[test]
fn kiwipete_perft_depth_4() {
    let mut pos = Position::from_fen(KIWIPETE).unwrap();
    assert_eq!(perft(&mut pos, 4), 4_085_603);
}
