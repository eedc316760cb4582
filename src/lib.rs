//! Phylomatch reconciles a phylogenetic tree with a table of per-taxon data.
//!
//! Comparative analyses need a tree and a data table that describe exactly
//! the same taxa, with data row `i` belonging to tip `i`. This crate reads
//! both, reports where they disagree and produces such an aligned pair.
//! Core functionality provided:
//! - Tree model: arena-based [Tree] with structural queries (tip names,
//!   binary, rooted, ultrametric) and transformations that return new trees
//!   (pruning, random polytomy resolution, forcing ultrametricity).
//! - Tree IO: Newick strings/files and Nexus files (TAXA and TREES blocks,
//!   TRANSLATE command), both for reading and writing.
//! - Table IO: delimited text (CSV/TSV) into a typed [DataTable], with the
//!   taxon name in a column or in the row names.
//! - Reconciliation: [match_taxa](reconcile::match_taxa) for the set
//!   differences, [align](reconcile::align) for the aligned pair and
//!   [subset](reconcile::subset) for filtering an aligned pair.
//!
//! Errors are [ReconcileError]s; syntax errors in tree files are kept apart
//! from structurally invalid trees. Nothing is mutated in place: each
//! operation takes its inputs by reference and returns new values.
//!
//! # Usage patterns
//! 1. Quick access with default settings: [read_newick_file],
//!    [read_nexus_file], [read_table_file] and the functions in
//!    [crate::newick] and [crate::nexus].
//! 2. Configure a [NewickParser](newick::NewickParser),
//!    [NexusParser](nexus::NexusParser) or [TableReader] yourself.
//!
//! ## Example
//! ```
//! use phylomatch::newick;
//! use phylomatch::reconcile::{align, match_taxa};
//! use phylomatch::table::{NameKey, TableReader};
//!
//! let tree = newick::read_str("((Kea:1,Kaka:1):2,(Kakapo:2,Takahe:2):1);")?;
//! let table = TableReader::new()
//!     .with_row_names("species")
//!     .read_str("species,mass\nKakapo,2.2\nKea,0.9\nKaka,0.5\nWeka,1.0\n")?;
//!
//! let report = match_taxa(&tree, &table, &NameKey::RowNames)?;
//! assert!(report.tree_not_data.contains("Takahe"));
//! assert!(report.data_not_tree.contains("Weka"));
//!
//! let aligned = align(&tree, &table, &NameKey::RowNames)?;
//! assert_eq!(aligned.names(), ["Kea", "Kaka", "Kakapo"]);
//! assert_eq!(
//!     aligned.trait_vector("mass")?,
//!     [Some(0.9), Some(0.5), Some(2.2)]
//! );
//! # Ok::<(), phylomatch::ReconcileError>(())
//! ```

pub mod error;
pub mod model;
pub mod newick;
pub mod nexus;
pub mod parser;
pub mod reconcile;
pub mod table;

pub use crate::error::{ReconcileError, Result};
pub use crate::model::Tree;
pub use crate::reconcile::{AlignedPair, DuplicateNameWarning, MatchReport};
pub use crate::table::{DataTable, NameKey, TableReader};

use std::path::Path;

/// Default relative tolerance for [Tree::is_ultrametric].
pub const DEFAULT_ULTRAMETRIC_TOLERANCE: f64 = 1e-6;

// ============================================================================
// Quick API
// ============================================================================
/// Reads and validates the first tree of a Newick file.
///
/// See [`newick::read_file`] for full documentation.
pub fn read_newick_file<P: AsRef<Path>>(path: P) -> Result<Tree> {
    newick::read_file(path)
}

/// Reads and validates the first tree of a Nexus file.
///
/// See [`nexus::read_file`] for full documentation.
pub fn read_nexus_file<P: AsRef<Path>>(path: P) -> Result<Tree> {
    nexus::read_file(path)
}

/// Reads a delimited table with default settings (delimiter from the file
/// extension, `""` and `NA` as missing, no row names).
///
/// See [`TableReader`] for configuration.
pub fn read_table_file<P: AsRef<Path>>(path: P) -> Result<DataTable> {
    TableReader::new().read_file(path)
}
