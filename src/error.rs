//! Typed error surface for the crate's parsers and configuration I/O.
//!
//! Internal invariants that cannot fail given an already-validated
//! [`crate::Position`] still use `assert!`/`debug_assert!`, matching the
//! rest of the crate; these variants are reserved for data arriving from
//! outside the crate (FEN/PACN/SAN text, magic-number files).

use thiserror::Error;

/// Errors surfaced by this crate's public parsing and I/O entry points.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// A FEN string violated its grammar or described an inconsistent
    /// position (e.g. two white kings, a pawn on the back rank).
    #[error("invalid FEN: {0}")]
    Fen(String),

    /// A pure algebraic coordinate notation (PACN) string was malformed,
    /// or did not name a move legal in the given position.
    #[error("invalid PACN move: {0}")]
    Pacn(String),

    /// A standard algebraic notation (SAN) string was malformed, or did
    /// not name a move legal in the given position.
    #[error("invalid SAN move: {0}")]
    San(String),

    /// An out-of-range index or argument outside the accepted vocabulary
    /// was supplied to a public API.
    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    /// The magic-number persistence file was present but malformed.
    #[error("malformed magics file: {0}")]
    MagicFile(String),
}

/// Convenience alias for this crate's fallible operations.
pub type Result<T> = std::result::Result<T, ChessError>;
