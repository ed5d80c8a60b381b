//! Plain magic bitboards for rook and bishop sliding attacks.
//!
//! For each square and slider kind we hold a `(mask, magic, shift)` triple plus an
//! offset into a shared attack table: `index = ((occupancy & mask) * magic) >>
//! shift`, `attacks = TABLE[offset + index]`. The table for a square has `1 <<
//! (64 - shift)` reachable slots, though not all indices the multiplication can
//! produce are populated; magic search (below) guarantees no two *reachable*
//! occupancies collide on a differing result.
//!
//! Magics are found by random trial per square (Stockfish's classic
//! approach): repeatedly guess a sparse random multiplier and verify it
//! produces a perfect hash over every occupancy subset of the square's
//! mask, by ripple-carrying through all `2^popcount(mask)` subsets.

use super::bit_twiddles::popcount64;
use super::masks::*;
use super::sq::SQ;
use crate::error::ChessError;
use std::fmt::Write as _;

/// Random-number seeds per rank, tuned (by the chess-programming
/// community) to make rook/bishop magic search converge quickly.
const SEEDS: [[u64; 8]; 2] = [
    [8977, 44_560, 54_343, 38_998, 5731, 95_205, 104_912, 17_020],
    [728, 10_316, 55_013, 32_803, 12_281, 15_100, 16_645, 255],
];

const ROOK_DELTAS: [i8; 4] = [NORTH, EAST, SOUTH, WEST];
const BISHOP_DELTAS: [i8; 4] = [NORTH_EAST, NORTH_WEST, SOUTH_EAST, SOUTH_WEST];

/// A tiny xorshift64* generator, seeded deterministically per square/rank
/// so magic search is reproducible across runs and platforms.
struct Prng {
    state: u64,
}

impl Prng {
    fn new(seed: u64) -> Prng {
        Prng { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        self.state.wrapping_mul(2_685_821_657_736_338_717)
    }

    /// A random value with roughly 8 bits set, which empirically makes
    /// good magic-multiplier candidates.
    fn sparse_rand(&mut self) -> u64 {
        self.next_u64() & self.next_u64() & self.next_u64()
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct SMagic {
    mask: u64,
    magic: u64,
    shift: u32,
    offset: usize,
}

/// A fully-built magic attack table for one slider kind (rook or bishop).
pub struct MagicTable {
    entries: [SMagic; 64],
    attacks: Vec<u64>,
}

impl MagicTable {
    #[inline(always)]
    pub fn attacks(&self, sq: SQ, occupied: u64) -> u64 {
        let e = &self.entries[sq.0 as usize];
        let idx = ((occupied & e.mask).wrapping_mul(e.magic)) >> e.shift;
        self.attacks[e.offset + idx as usize]
    }

    #[inline(always)]
    pub fn mask(&self, sq: SQ) -> u64 {
        self.entries[sq.0 as usize].mask
    }

    /// Serializes this table's `(mask-derived) magic, shift` pairs, one
    /// per square, for the persistence format in `§6`. `prefix` is `"R"`
    /// or `"B"`.
    fn serialize(&self, prefix: &str, out: &mut String) {
        for (i, e) in self.entries.iter().enumerate() {
            writeln!(out, "{prefix}{i}={}-{}", e.magic as i64, e.shift).unwrap();
        }
    }

    fn build(deltas: &[i8; 4], rank_seed_idx: usize, loaded: Option<&[(i64, u8); 64]>) -> MagicTable {
        let mut entries = [SMagic::default(); 64];
        let mut attacks: Vec<u64> = Vec::new();

        for s in 0..64u8 {
            let sq = SQ(s);
            let edges = ((RANK_1 | RANK_8) & !rank_bb(sq.rank_idx()))
                | ((FILE_A | FILE_H) & !file_bb(sq.file_idx()));
            let mask = sliding_attack(deltas, s, 0) & !edges;
            let shift = 64 - popcount64(mask);

            let (occupancy, reference, size) = enumerate_subsets(deltas, s, mask);

            let magic = if let Some(table) = loaded {
                table[s as usize].0 as u64
            } else {
                search_magic(&occupancy, &reference, size, mask, shift, SEEDS[rank_seed_idx][sq.rank_idx() as usize])
            };

            let offset = attacks.len();
            let table_len = 1usize << (64 - shift);
            attacks.resize(offset + table_len, 0);
            for i in 0..size {
                let idx = ((occupancy[i] & mask).wrapping_mul(magic)) >> shift;
                attacks[offset + idx as usize] = reference[i];
            }

            entries[s as usize] = SMagic { mask, magic, shift, offset };
        }

        MagicTable { entries, attacks }
    }
}

/// Ripple-carries through every subset of `mask`, returning the occupancy
/// subsets alongside the slider's reference attack set for each.
fn enumerate_subsets(deltas: &[i8; 4], sq: u8, mask: u64) -> (Vec<u64>, Vec<u64>, usize) {
    let mut occupancy = Vec::new();
    let mut reference = Vec::new();
    let mut b: u64 = 0;
    loop {
        occupancy.push(b);
        reference.push(sliding_attack(deltas, sq, b));
        b = b.wrapping_sub(mask) & mask;
        if b == 0 {
            break;
        }
    }
    let size = occupancy.len();
    (occupancy, reference, size)
}

fn search_magic(occupancy: &[u64], reference: &[u64], size: usize, mask: u64, shift: u32, seed: u64) -> u64 {
    let mut rng = Prng::new(seed);
    let table_len = 1usize << (64 - shift);
    let mut age = vec![0i32; table_len];
    let mut seen = vec![0u64; table_len];
    let mut current = 0i32;

    loop {
        let magic = loop {
            let candidate = rng.sparse_rand();
            if popcount64(candidate.wrapping_mul(mask) >> 56) >= 6 {
                break candidate;
            }
        };
        current += 1;
        let mut i = 0;
        while i < size {
            let idx = ((occupancy[i] & mask).wrapping_mul(magic) >> shift) as usize;
            if age[idx] < current {
                age[idx] = current;
                seen[idx] = reference[i];
            } else if seen[idx] != reference[i] {
                break;
            }
            i += 1;
        }
        if i >= size {
            return magic;
        }
    }
}

/// Sliding attacks from `sq` along `deltas`, stopping at (and including)
/// the first occupied square in each direction.
fn sliding_attack(deltas: &[i8; 4], sq: u8, occupied: u64) -> u64 {
    let mut attack = 0u64;
    for &delta in deltas {
        let mut s = sq as i16;
        loop {
            let prev = s;
            s += delta as i16;
            if !(0..64).contains(&s) || SQ(s as u8).distance(SQ(prev as u8)) != 1 {
                break;
            }
            attack |= 1u64 << s;
            if occupied & (1u64 << s) != 0 {
                break;
            }
        }
    }
    attack
}

static ROOK_MAGICS: std::sync::OnceLock<MagicTable> = std::sync::OnceLock::new();
static BISHOP_MAGICS: std::sync::OnceLock<MagicTable> = std::sync::OnceLock::new();

fn rook_table() -> &'static MagicTable {
    ROOK_MAGICS.get_or_init(|| {
        log::debug!("generating rook magic table by random trial");
        MagicTable::build(&ROOK_DELTAS, 1, None)
    })
}

fn bishop_table() -> &'static MagicTable {
    BISHOP_MAGICS.get_or_init(|| {
        log::debug!("generating bishop magic table by random trial");
        MagicTable::build(&BISHOP_DELTAS, 1, None)
    })
}

#[inline(always)]
pub fn rook_attacks(occupied: u64, sq: SQ) -> u64 {
    rook_table().attacks(sq, occupied)
}

#[inline(always)]
pub fn bishop_attacks(occupied: u64, sq: SQ) -> u64 {
    bishop_table().attacks(sq, occupied)
}

#[inline(always)]
pub fn queen_attacks(occupied: u64, sq: SQ) -> u64 {
    rook_attacks(occupied, sq) | bishop_attacks(occupied, sq)
}

/// Forces one-time generation (or file-backed load) of the magic tables
/// ahead of first use, so that cost lands predictably at startup instead
/// of on whichever thread first probes a sliding-piece attack.
pub fn init_magics() {
    rook_table();
    bishop_table();
    log::debug!("magic bitboard tables ready");
}

/// Loads rook and bishop magics from a persisted `R0..R63`/`B0..B63`
/// `magic-shift` file (§6), building the attack tables from the recorded
/// multipliers instead of searching for new ones. Must be called before
/// [`init_magics`] or any attack-generation call, since the tables are
/// built once and never rebuilt.
///
/// # Errors
/// Returns [`ChessError::MagicFile`] if `contents` is malformed, or does
/// not cover all 128 rook/bishop squares.
pub fn load_magics(contents: &str) -> Result<(), ChessError> {
    let parsed = parse_magics_file(contents)?;
    let mut rook = [(0i64, 0u8); 64];
    let mut bishop = [(0i64, 0u8); 64];
    let mut rook_seen = [false; 64];
    let mut bishop_seen = [false; 64];

    for (key, magic, shift) in parsed {
        let idx: usize = key[1..].parse().unwrap();
        if key.starts_with('R') {
            rook[idx] = (magic, shift);
            rook_seen[idx] = true;
        } else {
            bishop[idx] = (magic, shift);
            bishop_seen[idx] = true;
        }
    }
    if rook_seen.iter().any(|&s| !s) || bishop_seen.iter().any(|&s| !s) {
        return Err(ChessError::MagicFile("missing entries for some squares".to_string()));
    }

    let rook_table = MagicTable::build(&ROOK_DELTAS, 1, Some(&rook));
    let bishop_table = MagicTable::build(&BISHOP_DELTAS, 1, Some(&bishop));
    if ROOK_MAGICS.set(rook_table).is_err() || BISHOP_MAGICS.set(bishop_table).is_err() {
        log::warn!("magic tables already initialized; ignoring loaded file");
    }
    Ok(())
}

/// Serializes both magic tables to the `R0..R63`/`B0..B63` `magic-shift`
/// key/value text format from the external-interfaces section.
pub fn store_magics() -> String {
    let mut out = String::new();
    rook_table().serialize("R", &mut out);
    bishop_table().serialize("B", &mut out);
    out
}

/// Parses the persisted magics file format. Does not install the result
/// (there is no supported way to swap the process-wide lazily-built
/// tables after first use); this is provided so a `magic-shift` file can
/// be validated, and so a future regeneration tool can compare its own
/// search results against a known-good baseline.
pub fn parse_magics_file(contents: &str) -> Result<Vec<(String, i64, u8)>, ChessError> {
    let mut out = Vec::new();
    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (key, value) = line.split_once('=').ok_or_else(|| {
            ChessError::MagicFile(format!("line {}: missing '=': {line:?}", line_no + 1))
        })?;
        // rsplit, not split: the magic number itself may be negative (its
        // `i64` cast can carry a leading '-'), but the shift is always a
        // plain unsigned int, so the last '-' is the real separator.
        let (magic_str, shift_str) = value.rsplit_once('-').ok_or_else(|| {
            ChessError::MagicFile(format!("line {}: missing '-' in value: {line:?}", line_no + 1))
        })?;
        let magic: i64 = magic_str.parse().map_err(|_| {
            ChessError::MagicFile(format!("line {}: bad magic number: {magic_str:?}", line_no + 1))
        })?;
        let shift: u8 = shift_str.parse().map_err(|_| {
            ChessError::MagicFile(format!("line {}: bad shift: {shift_str:?}", line_no + 1))
        })?;
        let key = key.trim();
        if !((key.starts_with('R') || key.starts_with('B'))
            && key[1..].parse::<u8>().map(|n| n < 64).unwrap_or(false))
        {
            return Err(ChessError::MagicFile(format!("line {}: bad key: {key:?}", line_no + 1)));
        }
        out.push((key.to_string(), magic, shift));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rook_on_empty_board_covers_rank_and_file() {
        let attacks = rook_attacks(0, SQ::D4);
        assert_eq!(attacks.count_ones(), 14);
    }

    #[test]
    fn bishop_on_empty_board_covers_both_diagonals() {
        let attacks = bishop_attacks(0, SQ::D4);
        assert_eq!(attacks.count_ones(), 13);
    }

    #[test]
    fn rook_attack_stops_at_first_blocker() {
        let occ = SQ::D6.to_bb().0;
        let attacks = rook_attacks(occ, SQ::D4);
        assert!(attacks & SQ::D6.to_bb().0 != 0);
        assert!(attacks & SQ::D7.to_bb().0 == 0);
    }

    #[test]
    fn queen_is_union_of_rook_and_bishop() {
        let occ = SQ::D6.to_bb().0 | SQ::F6.to_bb().0;
        assert_eq!(
            queen_attacks(occ, SQ::D4),
            rook_attacks(occ, SQ::D4) | bishop_attacks(occ, SQ::D4)
        );
    }

    #[test]
    fn store_then_parse_round_trips() {
        let dumped = store_magics();
        let parsed = parse_magics_file(&dumped).unwrap();
        assert_eq!(parsed.len(), 128);
    }

    #[test]
    fn parse_rejects_malformed_lines() {
        assert!(parse_magics_file("R0=notanumber-12").is_err());
        assert!(parse_magics_file("R0 12-5").is_err());
        assert!(parse_magics_file("Z0=12-5").is_err());
    }
}
