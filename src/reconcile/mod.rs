//! Reconciliation of a tree with a table of per-taxon data.
//!
//! - [match_taxa] reports which taxa occur only in the tree or only in the
//!   table (plus duplicate and missing names in the table)
//! - [align] prunes the tree and filters and reorders the table, so that
//!   row `i` belongs to tip `i`
//! - [subset] filters an [AlignedPair] by row and re-aligns it
//!
//! A typical driver matches first, shows the report if it is not
//! [perfect](MatchReport::is_perfect), and aligns afterwards.

mod aligner;
mod matcher;

pub use self::aligner::{AlignedPair, align, subset};
pub use self::matcher::{DuplicateNameWarning, MatchReport, match_taxa};
