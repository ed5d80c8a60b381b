//! Move notations: pure algebraic coordinate notation (PACN), standard
//! algebraic notation (SAN), and the Polyglot opening-book wire format.

pub mod pacn;
pub mod polyglot;
pub mod san;
