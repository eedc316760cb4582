//! Vertex and branch length types for phylogenetic tree representation.

use crate::model::tree::VertexIndex;
use std::fmt;
use std::ops::Deref;

/// During construction, Internal and Leaf vertex might not have parent set yet.
const NO_PARENT_SET: VertexIndex = usize::MAX;

// =#========================================================================#=
// VERTEX
// =#========================================================================#=
/// Represents a vertex (node) in a phylogenetic tree.
///
/// A vertex can be either:
/// - **Root**: No parent, ordered children, optional label and optional root edge
/// - **Internal**: Has parent and ordered children, optional label, might have branch_length
/// - **Leaf**: Has no children, has label and might have branch_length
///
/// # Invariants
/// - `index` is index in arena
/// - `branch_length` is non-negative (enforced by [BranchLength]); might not be set
/// - Internal vertices and Leaf have `parent` as [VertexIndex] of parent in arena;
///   `NO_PARENT_SET = usize::MAX` only during construction
/// - Children are kept in the order in which they appear in Newick text;
///   more than two children represent a polytomy
#[derive(PartialEq, Debug, Clone)]
pub enum Vertex {
    /// Root vertex of the tree (has no parent)
    Root {
        /// Index of this vertex in the tree arena
        index: VertexIndex,
        /// Indices of the child vertices, in order
        children: Vec<VertexIndex>,
        /// Length of a root edge, if the tree carries one
        branch_length: Option<BranchLength>,
        /// Optional root label
        label: Option<String>,
    },
    /// Internal vertex (has parent and children)
    Internal {
        /// Index of this vertex in the tree arena
        index: VertexIndex,
        /// Index of the parent vertex
        parent: VertexIndex,
        /// Indices of the child vertices, in order
        children: Vec<VertexIndex>,
        /// Distance to parent node (optional, non-negative if present)
        branch_length: Option<BranchLength>,
        /// Optional clade label, e.g. a name or support value
        label: Option<String>,
    },
    /// Leaf vertex (tip; has parent and label, no children)
    Leaf {
        /// Index of this vertex in the tree arena
        index: VertexIndex,
        /// Index of the parent vertex
        parent: VertexIndex,
        /// Distance to parent node (optional, non-negative if present)
        branch_length: Option<BranchLength>,
        /// Taxon name
        label: String,
    },
}

impl Vertex {
    /// Creates a new root vertex.
    ///
    /// # Arguments
    /// * `index` - The unique index of this vertex in the tree (arena)
    /// * `children` - Child indices, in order
    /// * `branch_length` - Optional root edge
    pub fn new_root(
        index: VertexIndex,
        children: Vec<VertexIndex>,
        branch_length: Option<BranchLength>,
    ) -> Self {
        Vertex::Root {
            index,
            children,
            branch_length,
            label: None,
        }
    }

    /// Creates a new internal (non-leaf, non-root) vertex.
    ///
    /// # Arguments
    /// * `index` - The unique index of this vertex in the tree (arena)
    /// * `children` - Child indices, in order
    /// * `branch_length` - Distance to parent node (non-negative)
    pub fn new_internal(
        index: VertexIndex,
        children: Vec<VertexIndex>,
        branch_length: Option<BranchLength>,
    ) -> Self {
        Vertex::Internal {
            index,
            parent: NO_PARENT_SET,
            children,
            branch_length,
            label: None,
        }
    }

    /// Creates a new leaf vertex.
    ///
    /// # Arguments
    /// * `index` - The unique index of this vertex in the tree (arena)
    /// * `branch_length` - Distance to parent node (non-negative)
    /// * `label` - Taxon name of this leaf
    pub fn new_leaf(index: VertexIndex, branch_length: Option<BranchLength>, label: String) -> Self {
        Vertex::Leaf {
            index,
            parent: NO_PARENT_SET,
            branch_length,
            label,
        }
    }

    /// Returns the index of this vertex.
    pub fn index(&self) -> VertexIndex {
        match self {
            Vertex::Root { index, .. } => *index,
            Vertex::Internal { index, .. } => *index,
            Vertex::Leaf { index, .. } => *index,
        }
    }

    /// Returns whether this vertex has a [BranchLength].
    pub fn has_branch_length(&self) -> bool {
        self.branch_length().is_some()
    }

    /// Returns the length of the incoming edge (the root edge for the root), if set.
    pub fn branch_length(&self) -> Option<BranchLength> {
        match self {
            Vertex::Root { branch_length, .. } => *branch_length,
            Vertex::Internal { branch_length, .. } => *branch_length,
            Vertex::Leaf { branch_length, .. } => *branch_length,
        }
    }

    /// Replaces the length of the incoming edge.
    pub(crate) fn set_branch_length(&mut self, length: Option<BranchLength>) {
        match self {
            Vertex::Root { branch_length, .. } => *branch_length = length,
            Vertex::Internal { branch_length, .. } => *branch_length = length,
            Vertex::Leaf { branch_length, .. } => *branch_length = length,
        }
    }

    /// Returns the label of this vertex; always `Some` for leaves.
    pub fn label(&self) -> Option<&str> {
        match self {
            Vertex::Root { label, .. } | Vertex::Internal { label, .. } => label.as_deref(),
            Vertex::Leaf { label, .. } => Some(label),
        }
    }

    /// Sets the label of this vertex. For leaves, `None` is ignored,
    /// as a tip always carries a name.
    pub fn set_label(&mut self, new_label: Option<String>) {
        match self {
            Vertex::Root { label, .. } | Vertex::Internal { label, .. } => *label = new_label,
            Vertex::Leaf { label, .. } => {
                if let Some(new_label) = new_label {
                    *label = new_label;
                }
            }
        }
    }

    /// Returns `true` if this vertex is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Vertex::Leaf { .. })
    }

    /// Returns `true` if this vertex is an internal vertex.
    pub fn is_internal(&self) -> bool {
        matches!(self, Vertex::Internal { .. })
    }

    /// Returns `true` if this vertex is a root.
    pub fn is_root(&self) -> bool {
        matches!(self, Vertex::Root { .. })
    }

    /// Returns the children if this is the root or an internal vertex, else `None`.
    pub fn children(&self) -> Option<&[VertexIndex]> {
        match self {
            Vertex::Root { children, .. } => Some(children),
            Vertex::Internal { children, .. } => Some(children),
            Vertex::Leaf { .. } => None,
        }
    }

    /// Returns the number of children (0 for leaves).
    pub fn degree(&self) -> usize {
        self.children().map_or(0, |c| c.len())
    }

    /// Replaces the children of the root or an internal vertex.
    ///
    /// Does not update the parents of the children; see
    /// [Tree::replace_children](crate::model::Tree::replace_children).
    pub(crate) fn set_children(&mut self, new_children: Vec<VertexIndex>) {
        match self {
            Vertex::Root { children, .. } | Vertex::Internal { children, .. } => {
                *children = new_children
            }
            Vertex::Leaf { .. } => {}
        }
    }

    /// Sets new parent for non-root vertex; has no effect on the root.
    pub fn set_parent(&mut self, parent: VertexIndex) {
        match self {
            Vertex::Root { .. } => {}
            Vertex::Internal { parent: p, .. } => *p = parent,
            Vertex::Leaf { parent: p, .. } => *p = parent,
        }
    }

    /// Returns the index of parent if this a non-root vertex, else `None`.
    ///
    /// Note that parent might not be set yet during construction.
    pub fn parent_index(&self) -> Option<VertexIndex> {
        match self {
            Vertex::Internal { parent, .. } | Vertex::Leaf { parent, .. } => {
                if *parent == NO_PARENT_SET {
                    None
                } else {
                    Some(*parent)
                }
            }
            Vertex::Root { .. } => None,
        }
    }

    /// Returns `true` if this vertex has a parent set.
    pub fn has_parent(&self) -> bool {
        self.parent_index().is_some()
    }
}

// =#========================================================================#=
// BRANCH LENGTH
// =#========================================================================#=
/// Branch length in a phylogenetic tree, enforced non-negative.
///
/// Represents the evolutionary distance between a vertex and its parent.
/// The value is guaranteed to be non-negative and finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct BranchLength(f64);

impl BranchLength {
    /// Creates a new branch length.
    ///
    /// # Arguments
    /// * `length` - The branch length value (must be non-negative)
    ///
    /// # Panics
    /// Panics if `length` is negative or not finite.
    /// Use [BranchLength::try_new] for values from untrusted input.
    pub fn new(length: f64) -> Self {
        assert!(length >= 0.0, "Branch length must be non-negative, got {}", length);
        assert!(length.is_finite(), "Branch length must be finite, got {}", length);
        BranchLength(length)
    }

    /// Creates a new branch length, or `None` if `length` is negative or not finite.
    ///
    /// ```
    /// use phylomatch::model::BranchLength;
    ///
    /// assert_eq!(BranchLength::try_new(0.5).map(|b| *b), Some(0.5));
    /// assert!(BranchLength::try_new(-0.1).is_none());
    /// assert!(BranchLength::try_new(f64::NAN).is_none());
    /// ```
    pub fn try_new(length: f64) -> Option<Self> {
        (length >= 0.0 && length.is_finite()).then_some(BranchLength(length))
    }

    /// Zero-length branch.
    pub const ZERO: BranchLength = BranchLength(0.0);
}

impl Deref for BranchLength {
    type Target = f64;
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl fmt::Display for BranchLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
