//! The shared-memory heuristic state a parallel alpha-beta search reads
//! and writes across its workers (§2's "Heuristic tables", §4.7-§4.10,
//! §5). A `Position` is never shared between threads; these four tables
//! are the only state that is.

pub mod eval_cache;
pub mod history;
pub mod killer;
pub mod transposition;

pub use eval_cache::EvaluationTable;
pub use history::RelativeHistoryTable;
pub use killer::KillerTable;
pub use transposition::TranspositionTable;
