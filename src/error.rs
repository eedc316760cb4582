//! Error taxonomy for tree validation, taxon matching and alignment.
//!
//! Syntax problems found while reading a tree are reported as
//! [ParsingError] (with position and context); they are wrapped into
//! [ReconcileError::Parse] when they cross the reconciliation API. A tree that
//! parses but violates a structural invariant (e.g. duplicate tip names) is a
//! [ReconcileError::MalformedTree] instead.
//!
//! Duplicate names in a data table are *not* an error when matching; see
//! [DuplicateNameWarning](crate::reconcile::DuplicateNameWarning).

use crate::parser::ParsingError;
use crate::model::VertexIndex;
use thiserror::Error;

/// Errors raised by the tree model, the table layer and reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Structurally invalid tree (duplicate tips, cycle, disconnected vertex, ...).
    #[error("malformed tree: {0}")]
    MalformedTree(String),

    /// A distance-based query hit an edge without a branch length.
    #[error("missing branch length on vertex {vertex}{}", label_suffix(.label))]
    MissingBranchLength {
        /// Arena index of the vertex whose incoming edge has no length
        vertex: VertexIndex,
        /// Label of that vertex, if it has one
        label: Option<String>,
    },

    /// Operation needs a rooted tree, but the tree is unrooted.
    #[error("tree is unrooted, but operation requires a rooted tree")]
    Unrooted,

    /// Smoothing produced an edge with negative length.
    #[error("forcing ultrametric would give vertex {vertex} a negative branch length ({length})")]
    NegativeBranchLength {
        /// Arena index (in the input tree) of the offending vertex
        vertex: VertexIndex,
        /// The computed length
        length: f64,
    },

    /// Operation would leave fewer than two tips.
    #[error("operation would leave {remaining} tip(s), but a tree needs at least two")]
    TooFewTaxa {
        /// Number of tips that would remain
        remaining: usize,
    },

    /// The requested name-key column is not part of the table.
    #[error("column '{column}' not found (available: {})", .available.join(", "))]
    ColumnNotFound {
        /// Requested column
        column: String,
        /// Columns the table does have
        available: Vec<String>,
    },

    /// Column to be added already exists.
    #[error("column '{0}' already exists")]
    DuplicateColumn(String),

    /// Tree and table share no taxon.
    #[error("tree ({tree_tips} tips) and table ({data_names} names) share no taxon")]
    NoOverlap {
        /// Number of distinct tip names
        tree_tips: usize,
        /// Number of distinct names in the table
        data_names: usize,
    },

    /// Some shared taxa have more than one table row.
    #[error("ambiguous match: several rows for {}", .names.join(", "))]
    AmbiguousMatch {
        /// Shared taxa with more than one candidate row
        names: Vec<String>,
    },

    /// Tree text could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParsingError),

    /// Delimited table could not be read or written.
    #[error("table error: {0}")]
    Csv(#[from] csv::Error),

    /// Table content does not fit the table shape.
    #[error("invalid table: {0}")]
    Table(String),

    /// Plain I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn label_suffix(label: &Option<String>) -> String {
    match label {
        Some(label) => format!(" ('{label}')"),
        None => String::new(),
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ReconcileError>;
