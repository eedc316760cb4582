//! Set-difference reconciliation between tree tips and table names.

use crate::error::Result;
use crate::model::Tree;
use crate::table::{DataTable, KeyHandle, NameKey};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, warn};

// =#========================================================================#=
// MATCH REPORT
// =#========================================================================#=
/// A name that occurs in more than one table row.
///
/// Not an error: matching collapses duplicates under set semantics. Aligning
/// fails instead if the name is also a tip (see
/// [AmbiguousMatch](crate::ReconcileError::AmbiguousMatch)).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateNameWarning {
    /// The duplicated name
    pub name: String,
    /// Rows holding it, in table order
    pub rows: Vec<usize>,
}

impl fmt::Display for DuplicateNameWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "name '{}' occurs in {} rows {:?}", self.name, self.rows.len(), self.rows)
    }
}

/// Result of reconciling the tips of a tree with the names of a table.
///
/// The sets are sorted for stable output, but callers should treat them as
/// unordered.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MatchReport {
    /// Tip names without a table row
    pub tree_not_data: BTreeSet<String>,
    /// Table names without a tip
    pub data_not_tree: BTreeSet<String>,
    /// Names occurring in more than one row
    pub duplicates: Vec<DuplicateNameWarning>,
    /// Rows whose name is missing
    pub unnamed_rows: Vec<usize>,
}

impl MatchReport {
    /// Whether tree and table name exactly the same taxa, each row once.
    pub fn is_perfect(&self) -> bool {
        self.tree_not_data.is_empty()
            && self.data_not_tree.is_empty()
            && self.duplicates.is_empty()
            && self.unnamed_rows.is_empty()
    }

    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }
}

// ============================================================================
// Matching (pub)
// ============================================================================
/// Computes which taxa occur only in the tree and which only in the table.
///
/// With `T` the tip names and `D` the distinct names under `key`, the
/// report holds `T - D` and `D - T`. Names occurring in several rows are
/// reported as [DuplicateNameWarning]s and logged.
///
/// # Errors
/// * [ColumnNotFound](crate::ReconcileError::ColumnNotFound) if `key` does not resolve
/// * [MalformedTree](crate::ReconcileError::MalformedTree) if the tree has duplicate tips
///
/// # Example
/// ```
/// use phylomatch::newick;
/// use phylomatch::reconcile::match_taxa;
/// use phylomatch::table::{NameKey, TableReader};
/// use std::collections::BTreeSet;
///
/// let tree = newick::read_str("((A,B),(C,D));").unwrap();
/// let table = TableReader::new()
///     .read_str("species,mass\nA,1\nB,2\nC,3\nE,4\n")
///     .unwrap();
///
/// let report = match_taxa(&tree, &table, &NameKey::column("species")).unwrap();
/// assert_eq!(report.tree_not_data, BTreeSet::from(["D".to_string()]));
/// assert_eq!(report.data_not_tree, BTreeSet::from(["E".to_string()]));
/// ```
pub fn match_taxa(tree: &Tree, table: &DataTable, key: &NameKey) -> Result<MatchReport> {
    let handle = table.resolve_key(key)?;
    let comparison = Comparison::new(tree, table, handle)?;
    let report = comparison.report();

    for duplicate in &report.duplicates {
        warn!(name = %duplicate.name, rows = ?duplicate.rows, "duplicate name in table");
    }
    if !report.unnamed_rows.is_empty() {
        warn!(rows = ?report.unnamed_rows, "table rows without a name");
    }
    debug!(
        tree_not_data = report.tree_not_data.len(),
        data_not_tree = report.data_not_tree.len(),
        "matched taxa"
    );

    Ok(report)
}

// =#========================================================================#=
// COMPARISON (crate)
// =#========================================================================#=
/// Tip names of a tree next to the row index of a table's names.
pub(crate) struct Comparison {
    pub(crate) tips: BTreeSet<String>,
    pub(crate) rows_by_name: BTreeMap<String, Vec<usize>>,
    pub(crate) unnamed_rows: Vec<usize>,
}

impl Comparison {
    pub(crate) fn new(tree: &Tree, table: &DataTable, key: KeyHandle) -> Result<Self> {
        let tips = tree.tip_names()?;

        let mut rows_by_name: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut unnamed_rows = Vec::new();
        for (index, name) in table.names(key).into_iter().enumerate() {
            match name {
                Some(name) => rows_by_name.entry(name).or_default().push(index),
                None => unnamed_rows.push(index),
            }
        }

        Ok(Self {
            tips,
            rows_by_name,
            unnamed_rows,
        })
    }

    /// Names that are both tips and in the table.
    pub(crate) fn shared(&self) -> BTreeSet<&str> {
        self.rows_by_name
            .keys()
            .filter(|name| self.tips.contains(*name))
            .map(String::as_str)
            .collect()
    }

    pub(crate) fn report(&self) -> MatchReport {
        MatchReport {
            tree_not_data: self
                .tips
                .iter()
                .filter(|tip| !self.rows_by_name.contains_key(*tip))
                .cloned()
                .collect(),
            data_not_tree: self
                .rows_by_name
                .keys()
                .filter(|name| !self.tips.contains(*name))
                .cloned()
                .collect(),
            duplicates: self
                .rows_by_name
                .iter()
                .filter(|(_, rows)| rows.len() > 1)
                .map(|(name, rows)| DuplicateNameWarning {
                    name: name.clone(),
                    rows: rows.clone(),
                })
                .collect(),
            unnamed_rows: self.unnamed_rows.clone(),
        }
    }
}
