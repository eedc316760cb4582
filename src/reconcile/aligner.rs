//! Pruning and row alignment of a (tree, table) pair.

use crate::error::{ReconcileError, Result};
use crate::model::Tree;
use crate::reconcile::matcher::Comparison;
use crate::table::{DataTable, KeyHandle, NameKey, Row, Value};
use tracing::info;

// =#========================================================================#=
// ALIGNED PAIR
// =#========================================================================#=
/// A tree and a table over the same taxa, with row `i` of the table
/// belonging to tip `i` of the tree.
///
/// Only [align] and [subset] create aligned pairs, so the correspondence
/// holds for every value of this type.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    tree: Tree,
    table: DataTable,
    key: NameKey,
    // Resolved against `table`; row selection keeps it valid
    handle: KeyHandle,
}

// ============================================================================
// Getters / Accessors, etc. (pub)
// ============================================================================
impl AlignedPair {
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn table(&self) -> &DataTable {
        &self.table
    }

    /// The name key the pair was aligned by.
    pub fn key(&self) -> &NameKey {
        &self.key
    }

    /// The name key resolved against [AlignedPair::table].
    pub fn handle(&self) -> KeyHandle {
        self.handle
    }

    /// Number of shared taxa (tips of the tree, rows of the table).
    pub fn num_taxa(&self) -> usize {
        self.table.num_rows()
    }

    /// Taxon names in tip order.
    pub fn names(&self) -> Vec<&str> {
        self.tree.tip_labels()
    }

    /// Splits the pair into its tree and table.
    pub fn into_parts(self) -> (Tree, DataTable) {
        (self.tree, self.table)
    }

    /// Adds the aligned names as a leading text column `column`.
    ///
    /// Useful when the names are the table's row names and a consumer
    /// needs them as an ordinary field.
    ///
    /// # Errors
    /// [ReconcileError::DuplicateColumn] if the table already has `column`.
    pub fn with_name_column(&self, column: &str) -> Result<AlignedPair> {
        let names = self
            .tree
            .tip_labels()
            .into_iter()
            .map(Value::from)
            .collect();
        Ok(AlignedPair {
            tree: self.tree.clone(),
            table: self.table.with_column(column, names)?,
            key: self.key.clone(),
            handle: self.handle.shifted(1),
        })
    }

    /// Values of a numeric column in tip order; missing and non-numeric
    /// cells are `None`.
    ///
    /// # Errors
    /// [ReconcileError::ColumnNotFound] if there is no such column.
    pub fn trait_vector(&self, column: &str) -> Result<Vec<Option<f64>>> {
        Ok(self
            .table
            .column(column)?
            .into_iter()
            .map(Value::as_number)
            .collect())
    }
}

// =#========================================================================#=
// ALIGN & SUBSET
// =#========================================================================#=
/// Restricts `tree` and `table` to their shared taxa and orders the table
/// rows by the tips of the pruned tree.
///
/// Tips without a row are pruned (see [Tree::prune]); rows without a tip,
/// and rows without a name, are dropped. Neither input is changed.
///
/// # Errors
/// * [ReconcileError::ColumnNotFound] if `key` does not resolve
/// * [ReconcileError::MalformedTree] if the tree has duplicate tips
/// * [ReconcileError::NoOverlap] if tree and table share no taxon
/// * [ReconcileError::AmbiguousMatch] if a shared taxon has several rows
/// * [ReconcileError::TooFewTaxa] if only one taxon is shared
///
/// # Example
/// ```
/// use phylomatch::newick;
/// use phylomatch::reconcile::align;
/// use phylomatch::table::{NameKey, TableReader};
///
/// let tree = newick::read_str("((A:1,B:1):1,(C:1,D:1):1);").unwrap();
/// let table = TableReader::new()
///     .read_str("species,mass\nE,4\nC,3\nB,2\nA,1\n")
///     .unwrap();
///
/// let aligned = align(&tree, &table, &NameKey::column("species")).unwrap();
/// assert_eq!(aligned.names(), ["A", "B", "C"]);
/// assert_eq!(aligned.trait_vector("mass").unwrap(), [Some(1.0), Some(2.0), Some(3.0)]);
/// ```
pub fn align(tree: &Tree, table: &DataTable, key: &NameKey) -> Result<AlignedPair> {
    let handle = table.resolve_key(key)?;
    align_by(tree, table, key, handle)
}

/// [align] with `key` already resolved to `handle` for `table`.
fn align_by(
    tree: &Tree,
    table: &DataTable,
    key: &NameKey,
    handle: KeyHandle,
) -> Result<AlignedPair> {
    let comparison = Comparison::new(tree, table, handle)?;

    let shared = comparison.shared();
    if shared.is_empty() {
        return Err(ReconcileError::NoOverlap {
            tree_tips: comparison.tips.len(),
            data_names: comparison.rows_by_name.len(),
        });
    }

    let ambiguous: Vec<String> = shared
        .iter()
        .filter(|name| comparison.rows_by_name[**name].len() > 1)
        .map(|name| name.to_string())
        .collect();
    if !ambiguous.is_empty() {
        return Err(ReconcileError::AmbiguousMatch { names: ambiguous });
    }

    // Rebuilt even if no tip is dropped
    let pruned = tree.keep_only(&shared)?;

    let order: Vec<usize> = pruned
        .tip_labels()
        .into_iter()
        .filter_map(|tip| comparison.rows_by_name.get(tip).map(|rows| rows[0]))
        .collect();
    let aligned_table = table.select_rows(&order);

    info!(
        taxa = order.len(),
        tips_dropped = tree.num_leaves() - pruned.num_leaves(),
        rows_dropped = table.num_rows() - aligned_table.num_rows(),
        "aligned tree and table"
    );

    Ok(AlignedPair {
        tree: pruned,
        table: aligned_table,
        key: key.clone(),
        handle,
    })
}

/// Keeps the rows of `pair` that satisfy `predicate` and prunes the tree
/// to the remaining taxa.
///
/// # Errors
/// * [ReconcileError::NoOverlap] if no row satisfies the predicate
/// * [ReconcileError::TooFewTaxa] if only one row does
///
/// # Example
/// ```
/// use phylomatch::newick;
/// use phylomatch::reconcile::{align, subset};
/// use phylomatch::table::{NameKey, TableReader};
///
/// let tree = newick::read_str("((A:1,B:1):1,(C:1,D:1):1);").unwrap();
/// let table = TableReader::new()
///     .read_str("species,mass\nA,1\nB,NA\nC,3\nD,4\n")
///     .unwrap();
///
/// let aligned = align(&tree, &table, &NameKey::column("species")).unwrap();
/// let complete = subset(&aligned, |row| !row.is_missing("mass")).unwrap();
/// assert_eq!(complete.names(), ["A", "C", "D"]);
/// ```
pub fn subset<F>(pair: &AlignedPair, predicate: F) -> Result<AlignedPair>
where
    F: Fn(&Row<'_>) -> bool,
{
    let filtered = pair.table.filter_rows(predicate);
    align_by(&pair.tree, &filtered, &pair.key, pair.handle)
}
