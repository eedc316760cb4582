//! Newick format writing.

use crate::model::{BranchLength, RootMarker, Tree, Vertex, VertexIndex};
use crate::newick::defs::{ROOTED_MARKER, UNROOTED_MARKER};
use crate::parser::utils::escape_label;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Extra buffer in Newick string length/capacity estimate
const BUFFER_CHARS: usize = 10;

/// Style for serializing tree to Newick format,
/// controlling how leaf labels are represented in the output string.
#[derive(Debug, Clone, Copy)]
pub enum NewickStyle<'a> {
    /// Use full (escaped) leaf labels
    Label,
    /// Use 1-based indices (as in Nexus files with a TRANSLATE command);
    /// labels missing from the map are written in full
    OneIndexed(&'a HashMap<String, usize>),
}

/// Writes given list of trees in Newick format, one tree per line.
///
/// # Errors
/// Returns an I/O error if writing fails.
pub fn write_newick<W: Write>(writer: W, trees: &[Tree]) -> io::Result<()> {
    let mut writer = BufWriter::new(writer);
    for tree in trees {
        writer.write_all(to_newick(tree).as_bytes())?;
        writer.write_all(b"\n")?;
    }

    writer.flush()
}

/// Writes given list of trees to the file at `path` in Newick format, one tree per line.
///
/// # Errors
/// Returns an I/O error if the file cannot be created or writing fails.
pub fn write_newick_file<P: AsRef<Path>>(path: P, trees: &[Tree]) -> io::Result<()> {
    write_newick(File::create(path)?, trees)
}

/// Returns the Newick representation of this tree with closing semicolon.
///
/// Labels are quoted where necessary, internal labels and a root edge are
/// written if present, and a rooting marker is written in front if the tree
/// carries one. Branch lengths use the shortest representation that reads
/// back to the same `f64`.
///
/// # Example
/// ```
/// use phylomatch::model::{BranchLength, Tree};
/// use phylomatch::newick::to_newick;
///
/// let mut tree = Tree::new(3);
/// let a = tree.add_leaf(Some(BranchLength::new(1.0)), "Little Spotted Kiwi");
/// let b = tree.add_leaf(Some(BranchLength::new(2.5)), "Tokoeka");
/// let c = tree.add_leaf(None, "Rowi");
/// tree.add_root(vec![a, b, c], None);
///
/// assert_eq!(to_newick(&tree), "('Little Spotted Kiwi':1,Tokoeka:2.5,Rowi);");
/// ```
pub fn to_newick(tree: &Tree) -> String {
    to_newick_with_style(tree, &NewickStyle::Label)
}

/// Returns the Newick representation of this tree with closing semicolon,
/// writing leaf labels in the given [NewickStyle].
pub fn to_newick_with_style(tree: &Tree, style: &NewickStyle) -> String {
    // Helper for adding branch lengths
    fn build_newick_branch_length(newick: &mut String, branch_length: Option<BranchLength>) {
        if let Some(branch_length) = branch_length {
            newick.push(':');
            newick.push_str(&branch_length.to_string());
        }
    }

    // Recursive helper for building the Newick string
    fn build_newick(tree: &Tree, newick: &mut String, index: VertexIndex, style: &NewickStyle) {
        let vertex = &tree[index];

        match vertex {
            Vertex::Leaf { label, .. } => match style {
                NewickStyle::Label => newick.push_str(&escape_label(label)),
                NewickStyle::OneIndexed(ids) => match ids.get(label) {
                    Some(id) => newick.push_str(&id.to_string()),
                    None => newick.push_str(&escape_label(label)),
                },
            },
            _ => {
                newick.push('(');
                for (i, &child) in vertex.children().unwrap_or_default().iter().enumerate() {
                    if i > 0 {
                        newick.push(',');
                    }
                    build_newick(tree, newick, child, style);
                }
                newick.push(')');

                if let Some(label) = vertex.label() {
                    newick.push_str(&escape_label(label));
                }
            }
        }

        build_newick_branch_length(newick, vertex.branch_length());
    }

    let mut newick = String::with_capacity(estimate_newick_len(tree));

    match tree.root_marker() {
        Some(RootMarker::Rooted) => newick.push_str(&format!("[{ROOTED_MARKER}] ")),
        Some(RootMarker::Unrooted) => newick.push_str(&format!("[{UNROOTED_MARKER}] ")),
        None => {}
    }

    if tree.is_root_set() {
        build_newick(tree, &mut newick, tree.root_index(), style);
    }
    newick.push(';');

    newick
}

/// Estimates the length of a Newick string for a given tree, used to
/// pre-allocate string capacity.
pub(crate) fn estimate_newick_len(tree: &Tree) -> usize {
    // Each internal node: "(,)" ~= 3 chars
    const INTERNAL_NODE_CHARS: usize = 3;
    // Branch lengths: ~20 chars each (e.g., ":0.009529961339106089")
    const BRANCH_LENGTH_CHARS: usize = 20;

    let structure_capacity = (tree.num_internal() + 1) * INTERNAL_NODE_CHARS;

    let label_capacity: usize = tree
        .vertices()
        .iter()
        .filter_map(|v| v.label())
        .map(|l| l.len() + 2)
        .sum();

    let branch_capacity = if tree.has_any_branch_length() {
        tree.num_vertices() * BRANCH_LENGTH_CHARS
    } else {
        0
    };

    structure_capacity + label_capacity + branch_capacity + BUFFER_CHARS
}
