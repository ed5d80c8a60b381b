//! Endgame-tablebase probing façade (§6): an abstract collaborator
//! contract this crate exposes but does not implement a binary format
//! for. Per the Non-goals, no tablebase *format* is parsed here; this
//! module only gives the search layer something to depend on and a
//! `NullTablebase` that always reports "not loaded" (§9's Design Notes:
//! "Model explicit `Option<Backend>` with a loaded/not-loaded state",
//! replacing a catch-all around a failed library load).

use crate::board::Position;

use std::sync::atomic::{AtomicU64, Ordering};

/// Win/draw/loss classification of a tablebase-resolved position, from
/// the side to move's perspective.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Wdl {
    Win,
    Draw,
    Loss,
}

/// A tablebase probe result: the WDL classification, plus distance-to-
/// mate in plies when the backend can supply it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ProbeResult {
    pub wdl: Wdl,
    pub dtm: Option<u16>,
}

/// Whether a probe may touch disk, or must answer from an in-memory
/// cache only.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProbeMode {
    /// Cache-only: never blocks on I/O.
    Soft,
    /// May read from disk if the position isn't cached.
    Hard,
}

/// Counters a tablebase backend exposes for diagnostics, incremented with
/// relaxed atomics (the same discipline as the history table, §5) since
/// several search workers probe concurrently.
#[derive(Default)]
pub struct ProbeStats {
    hard_probes: AtomicU64,
    soft_probes: AtomicU64,
    drive_hits: AtomicU64,
    cache_hits: AtomicU64,
}

impl ProbeStats {
    pub fn hard_probes(&self) -> u64 {
        self.hard_probes.load(Ordering::Relaxed)
    }
    pub fn soft_probes(&self) -> u64 {
        self.soft_probes.load(Ordering::Relaxed)
    }
    pub fn drive_hits(&self) -> u64 {
        self.drive_hits.load(Ordering::Relaxed)
    }
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    fn record(&self, mode: ProbeMode, hit_disk: bool, hit_cache: bool) {
        match mode {
            ProbeMode::Hard => self.hard_probes.fetch_add(1, Ordering::Relaxed),
            ProbeMode::Soft => self.soft_probes.fetch_add(1, Ordering::Relaxed),
        };
        if hit_disk {
            self.drive_hits.fetch_add(1, Ordering::Relaxed);
        }
        if hit_cache {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// The collaborator contract an endgame-tablebase backend must satisfy.
/// The search layer (out of scope here) holds a `Box<dyn TablebaseProbe>`
/// or similar and never needs to know whether one is actually loaded.
pub trait TablebaseProbe: Send + Sync {
    /// Probes `pos` for a WDL/DTM verdict, or `None` if unavailable
    /// (position not in any loaded table, or `mode` was `Soft` and the
    /// entry isn't cached). A miss here is a normal outcome, not an
    /// error (§7: "Transient probing failure").
    fn probe(&self, pos: &Position, mode: ProbeMode) -> Option<ProbeResult>;

    fn stats(&self) -> &ProbeStats;
}

/// The "not loaded" backend: every probe misses. This is the default
/// and only backend this crate ships; a real tablebase format is a
/// Non-goal (§1).
#[derive(Default)]
pub struct NullTablebase {
    stats: ProbeStats,
}

impl NullTablebase {
    pub fn new() -> NullTablebase {
        NullTablebase::default()
    }
}

impl TablebaseProbe for NullTablebase {
    fn probe(&self, _pos: &Position, mode: ProbeMode) -> Option<ProbeResult> {
        self.stats.record(mode, false, false);
        None
    }

    fn stats(&self) -> &ProbeStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_backend_always_misses_but_counts_the_probe() {
        let tb = NullTablebase::new();
        let pos = Position::start_pos();
        assert!(tb.probe(&pos, ProbeMode::Soft).is_none());
        assert!(tb.probe(&pos, ProbeMode::Hard).is_none());
        assert_eq!(tb.stats().soft_probes(), 1);
        assert_eq!(tb.stats().hard_probes(), 1);
        assert_eq!(tb.stats().drive_hits(), 0);
        assert_eq!(tb.stats().cache_hits(), 0);
    }
}
