//! Real multi-threaded race against the transposition table (testable
//! property 6): two workers storing distinct entries under keys that
//! collide on the same slot, raced against reader threads probing that
//! slot throughout. Every probe that returns `Some` must match one of
//! the two writers' entries in full; a torn mix of both is never
//! acceptable.

use corvid::tables::transposition::{Bound, TTEntry, TranspositionTable};
use corvid::{Move, MoveType, PieceType, SQ};
use std::sync::Arc;
use std::thread;

const ITERATIONS: u32 = 20_000;

fn entry_a() -> TTEntry {
    TTEntry {
        depth: 12,
        bound: Bound::Exact,
        score: 321,
        best_move: Move::new(SQ(12), SQ(28), PieceType::Pawn, PieceType::None, MoveType::Normal),
        generation: 0,
    }
}

fn entry_b() -> TTEntry {
    TTEntry {
        depth: 7,
        bound: Bound::FailHigh,
        score: -654,
        best_move: Move::new(SQ(6), SQ(21), PieceType::Knight, PieceType::Rook, MoveType::Normal),
        generation: 0,
    }
}

#[test]
fn racing_writers_never_produce_a_torn_entry() {
    // A single-slot table forces every key to collide, regardless of
    // value, so the two writers below are guaranteed to contend for the
    // same slot on every iteration.
    let table = Arc::new(TranspositionTable::with_capacity(1));
    let key_a: u64 = 0x1111_2222_3333_4444;
    let key_b: u64 = 0x5555_6666_7777_8888;

    let a = entry_a();
    let b = entry_b();

    let writer_a = {
        let table = Arc::clone(&table);
        thread::spawn(move || {
            for _ in 0..ITERATIONS {
                table.store(key_a, a.depth, a.bound, a.score, a.best_move);
            }
        })
    };

    let writer_b = {
        let table = Arc::clone(&table);
        thread::spawn(move || {
            for _ in 0..ITERATIONS {
                table.store(key_b, b.depth, b.bound, b.score, b.best_move);
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|i| {
            let table = Arc::clone(&table);
            let probe_key = if i % 2 == 0 { key_a } else { key_b };
            let expected = if i % 2 == 0 { a } else { b };
            thread::spawn(move || {
                let mut observed_hit = false;
                for _ in 0..ITERATIONS {
                    if let Some(found) = table.probe(probe_key) {
                        // A hit under `probe_key` must be exactly the entry
                        // that key's writer stores -- any other value is a
                        // torn read slipping past the XOR check.
                        assert_eq!(found, expected, "torn/foreign entry observed for a key-matched probe");
                        observed_hit = true;
                    }
                }
                observed_hit
            })
        })
        .collect();

    writer_a.join().unwrap();
    writer_b.join().unwrap();
    let any_hit = readers.into_iter().any(|r| r.join().unwrap());
    assert!(any_hit, "race produced no hits at all; widen the iteration count");
}
