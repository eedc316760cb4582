//! Provides the tree representation.
//!
//! Provides core data structures for representing phylogenetic trees:
//! * [Tree] - Main tree structure using the arena pattern
//!   for efficient memory layout
//! * [VertexIndex] as type used to index vertices in tree
//! * [RootMarker] for explicit `[&R]` / `[&U]` annotations
//! * [PreOrderIter] and [PostOrderIter] for traversals

use crate::error::{ReconcileError, Result};
use crate::model::vertex::{BranchLength, Vertex};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Index of a vertex in a tree (arena).
pub type VertexIndex = usize;

/// *During construction only*, index for unset root.
const NO_ROOT_SET_INDEX: VertexIndex = usize::MAX;

/// Explicit rooting annotation as found in front of a Newick string,
/// `[&R]` for rooted and `[&U]` for unrooted trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootMarker {
    /// `[&R]`
    Rooted,
    /// `[&U]`
    Unrooted,
}

// =$========================================================================$=
// TREE
// =$========================================================================$=
/// A phylogenetic tree represented using the arena pattern on [Vertex].
///
/// Vertices are stored in a contiguous vector and referenced by
/// [VertexIndex]. Aim is to avoid referencing troubles as well as to provide
/// efficient memory layout and cache locality for traversal operations.
///
/// # Structure
/// - All vertices (root, internal, and leaves) are stored in the arena.
/// - Index of root is maintained.
/// - No assumption on order of indices is maintained.
///   (e.g. leaves must not be first `n` indices)
/// - Children are ordered; the *tip order* of the tree is the order in which
///   a left-to-right pre-order traversal meets the leaves, which is the order
///   of the tips in the Newick string.
/// - Branch lengths are optional, but if provided must be non-negative.
///
/// # Construction
/// To construct a tree, specify its size based on the number of leaves,
/// then add vertices one by one, bottom-up.
/// Test validity with [Tree::validate()].
///
/// ```
/// use phylomatch::model::{BranchLength, Tree};
///
/// let mut tree = Tree::new(3);
/// let a = tree.add_leaf(Some(BranchLength::new(1.0)), "Kea");
/// let b = tree.add_leaf(Some(BranchLength::new(1.0)), "Kaka");
/// let c = tree.add_leaf(Some(BranchLength::new(2.0)), "Kakapo");
/// let ab = tree.add_internal_vertex(vec![a, b], Some(BranchLength::new(1.0)));
/// tree.add_root(vec![ab, c], None);
///
/// assert!(tree.validate().is_ok());
/// assert_eq!(tree.tip_labels(), vec!["Kea", "Kaka", "Kakapo"]);
/// assert!(tree.is_binary());
/// assert!(tree.is_rooted());
/// assert!(tree.is_ultrametric(1e-6).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    /// Vertices of this tree (arena pattern)
    vertices: Vec<Vertex>,

    /// Index of the root of this tree
    root_index: VertexIndex,

    /// Name of tree; optional, e.g. when parsed from Nexus file
    name: Option<String>,

    /// Explicit rooting annotation, if the source carried one
    root_marker: Option<RootMarker>,
}

// ============================================================================
// New, Getters / Accessors, etc. (pub)
// ============================================================================
impl Tree {
    /// Creates a new tree with capacity for a binary tree with `num_leaves` leaves.
    ///
    /// # Arguments
    /// `num_leaves` - expected number of leaves, used to preallocate the arena
    pub fn new(num_leaves: usize) -> Self {
        let capacity = 2 * num_leaves.max(1) - 1;
        Tree {
            vertices: Vec::with_capacity(capacity),
            root_index: NO_ROOT_SET_INDEX,
            name: None,
            root_marker: None,
        }
    }

    /// Attaches a name to this tree.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attaches an explicit rooting annotation to this tree.
    pub fn with_root_marker(mut self, marker: RootMarker) -> Self {
        self.root_marker = Some(marker);
        self
    }

    /// Adds a root to the tree, assigning a unique index, which gets returned.
    ///
    /// # Arguments
    /// * `children` - Child indices, in order
    /// * `branch_length` - Optional length of a root edge (non-negative)
    ///
    /// # Returns
    /// The index of the newly created root vertex.
    pub fn add_root(
        &mut self,
        children: Vec<VertexIndex>,
        branch_length: Option<BranchLength>,
    ) -> VertexIndex {
        let index = self.vertices.len();
        for &child in &children {
            self[child].set_parent(index);
        }
        self.vertices
            .push(Vertex::new_root(index, children, branch_length));

        self.root_index = index;
        index
    }

    /// Adds an internal vertex to the tree, assigning a unique index, which gets returned.
    ///
    /// # Arguments
    /// * `children` - Child indices, in order
    /// * `branch_length` - Length of incoming branch, i.e. distance to parent (non-negative)
    ///
    /// # Returns
    /// The index of the newly created internal vertex.
    pub fn add_internal_vertex(
        &mut self,
        children: Vec<VertexIndex>,
        branch_length: Option<BranchLength>,
    ) -> VertexIndex {
        let index = self.vertices.len();
        for &child in &children {
            self[child].set_parent(index);
        }
        self.vertices
            .push(Vertex::new_internal(index, children, branch_length));

        index
    }

    /// Adds a leaf to the tree, assigning a unique index, which gets returned.
    ///
    /// # Arguments
    /// * `branch_length` - Length of incoming branch, i.e. distance to parent (non-negative)
    /// * `label` - Taxon name of this leaf
    ///
    /// # Returns
    /// The index of the newly created leaf vertex.
    pub fn add_leaf(
        &mut self,
        branch_length: Option<BranchLength>,
        label: impl Into<String>,
    ) -> VertexIndex {
        let index = self.vertices.len();
        self.vertices
            .push(Vertex::new_leaf(index, branch_length, label.into()));
        index
    }

    /// Replaces the children of the vertex at `index` and points the new
    /// children back to it.
    pub(crate) fn replace_children(&mut self, index: VertexIndex, children: Vec<VertexIndex>) {
        for &child in &children {
            self[child].set_parent(index);
        }
        self[index].set_children(children);
    }

    /// Returns reference to name of this tree, or `None` if not set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set a name for this tree.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Returns the explicit rooting annotation, if any.
    pub fn root_marker(&self) -> Option<RootMarker> {
        self.root_marker
    }

    /// Sets or clears the explicit rooting annotation.
    pub fn set_root_marker(&mut self, marker: Option<RootMarker>) {
        self.root_marker = marker;
    }

    /// Returns whether root of tree has been set.
    pub fn is_root_set(&self) -> bool {
        self.root_index != NO_ROOT_SET_INDEX
    }

    /// Returns a reference to the root vertex.
    ///
    /// # Panics
    /// Panics if the root hasn't been set and thus tree hasn't been fully constructed yet.
    pub fn root(&self) -> &Vertex {
        &self[self.root_index]
    }

    /// Returns the index of the root.
    pub fn root_index(&self) -> VertexIndex {
        self.root_index
    }

    /// Returns a reference to the vertex at the given index.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn vertex(&self, index: VertexIndex) -> &Vertex {
        &self[index]
    }

    /// Returns a mutable reference to the vertex at the given index.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn vertex_mut(&mut self, index: VertexIndex) -> &mut Vertex {
        &mut self.vertices[index]
    }

    /// Returns all vertices in arena order.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Returns the number of leaves in this tree.
    pub fn num_leaves(&self) -> usize {
        self.vertices.iter().filter(|&v| v.is_leaf()).count()
    }

    /// Returns the number of internal vertices in this tree (root excluded).
    pub fn num_internal(&self) -> usize {
        self.vertices.iter().filter(|&v| v.is_internal()).count()
    }

    /// Returns the number of vertices in this tree.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Checks if all non-root vertices have branch lengths set.
    pub fn vertices_have_branch_lengths(&self) -> bool {
        self.vertices
            .iter()
            .all(|v| v.is_root() || v.has_branch_length())
    }

    /// Returns whether any non-root vertex carries a branch length.
    pub fn has_any_branch_length(&self) -> bool {
        self.vertices
            .iter()
            .any(|v| !v.is_root() && v.has_branch_length())
    }

    /// Returns the sum of all branch lengths in the tree; unset branch
    /// lengths and the root edge count as zero.
    pub fn total_branch_length(&self) -> f64 {
        self.vertices
            .iter()
            .filter(|v| !v.is_root())
            .filter_map(|v| v.branch_length())
            .map(|bl| *bl)
            .sum::<f64>()
    }
}

// ============================================================================
// Tips and structural queries (pub)
// ============================================================================
impl Tree {
    /// Returns the arena indices of the leaves in tip order.
    pub fn tip_indices(&self) -> Vec<VertexIndex> {
        self.pre_order_iter()
            .filter(|v| v.is_leaf())
            .map(|v| v.index())
            .collect()
    }

    /// Returns the labels of the leaves in tip order.
    pub fn tip_labels(&self) -> Vec<&str> {
        self.pre_order_iter()
            .filter_map(|v| match v {
                Vertex::Leaf { label, .. } => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Returns the label of the `i`-th tip in tip order, or `None` if there
    /// are fewer than `i + 1` tips.
    pub fn tip_label(&self, i: usize) -> Option<&str> {
        self.pre_order_iter()
            .filter(|v| v.is_leaf())
            .nth(i)
            .and_then(|v| v.label())
    }

    /// Returns the set of tip names.
    ///
    /// # Errors
    /// [ReconcileError::MalformedTree] if two tips share a name.
    pub fn tip_names(&self) -> Result<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        for label in self.tip_labels() {
            if !names.insert(label.to_string()) {
                return Err(ReconcileError::MalformedTree(format!(
                    "duplicate tip name '{label}'"
                )));
            }
        }
        Ok(names)
    }

    /// Returns `true` iff the root and every internal vertex has exactly two children.
    pub fn is_binary(&self) -> bool {
        self.vertices
            .iter()
            .filter(|v| !v.is_leaf())
            .all(|v| v.degree() == 2)
    }

    /// Returns whether this tree is rooted.
    ///
    /// An explicit [RootMarker] decides if present. Otherwise the tree counts
    /// as rooted iff its root has exactly two children; a root with three or
    /// more children is the usual encoding of an unrooted topology.
    pub fn is_rooted(&self) -> bool {
        match self.root_marker {
            Some(RootMarker::Rooted) => true,
            Some(RootMarker::Unrooted) => false,
            None => self.is_root_set() && self.root().degree() == 2,
        }
    }

    /// Returns an error naming the first non-root vertex without branch length.
    pub fn require_branch_lengths(&self) -> Result<()> {
        match self
            .pre_order_iter()
            .find(|v| !v.is_root() && !v.has_branch_length())
        {
            Some(v) => Err(ReconcileError::MissingBranchLength {
                vertex: v.index(),
                label: v.label().map(str::to_string),
            }),
            None => Ok(()),
        }
    }

    /// Returns the distance from the root to every vertex, indexed by [VertexIndex].
    /// The root edge is ignored.
    ///
    /// # Errors
    /// [ReconcileError::MissingBranchLength] if some non-root edge has no length.
    pub fn vertex_depths(&self) -> Result<Vec<f64>> {
        self.require_branch_lengths()?;

        let mut depths = vec![0.0; self.num_vertices()];
        for vertex in self.pre_order_iter() {
            if let Some(parent) = vertex.parent_index() {
                let length = vertex.branch_length().map_or(0.0, |bl| *bl);
                depths[vertex.index()] = depths[parent] + length;
            }
        }

        Ok(depths)
    }

    /// Returns `(tip label, root-to-tip distance)` for each tip, in tip order.
    ///
    /// # Errors
    /// [ReconcileError::MissingBranchLength] if some non-root edge has no length.
    pub fn root_to_tip_distances(&self) -> Result<Vec<(&str, f64)>> {
        let depths = self.vertex_depths()?;
        Ok(self
            .pre_order_iter()
            .filter_map(|v| match v {
                Vertex::Leaf { label, index, .. } => Some((label.as_str(), depths[*index])),
                _ => None,
            })
            .collect())
    }

    /// Returns the height of this tree, the largest root-to-tip distance.
    ///
    /// # Errors
    /// [ReconcileError::MissingBranchLength] if some non-root edge has no length.
    pub fn height(&self) -> Result<f64> {
        Ok(self
            .root_to_tip_distances()?
            .into_iter()
            .map(|(_, d)| d)
            .fold(0.0, f64::max))
    }

    /// Checks if the tree is ultrametric (all leaves equidistant from root).
    ///
    /// # Returns
    /// `true` iff `max - min <= tolerance * max` over all root-to-tip distances.
    ///
    /// # Errors
    /// [ReconcileError::MissingBranchLength] if some non-root edge has no length.
    pub fn is_ultrametric(&self, tolerance: f64) -> Result<bool> {
        let distances = self.root_to_tip_distances()?;
        if distances.is_empty() {
            return Ok(true);
        }

        let (min, max) = distances
            .iter()
            .fold((f64::INFINITY, 0.0_f64), |(min, max), &(_, d)| {
                (min.min(d), max.max(d))
            });

        Ok(max - min <= tolerance * max)
    }
}

// ============================================================================
// Validation (pub)
// ============================================================================
impl Tree {
    /// Validates the tree structure and all index references.
    ///
    /// Checks:
    /// - Root index is valid and points to the only Root vertex
    /// - All vertex indices match their position in the arena
    /// - All child indices are valid and point back to correct parent
    /// - Root and internal vertices have at least two children
    /// - Every vertex is reachable from the root exactly once (no cycle, nothing disconnected)
    /// - Tip labels are non-empty and unique
    ///
    /// # Errors
    /// [ReconcileError::MalformedTree] describing the first violation found.
    pub fn validate(&self) -> Result<()> {
        let malformed = |msg: String| Err(ReconcileError::MalformedTree(msg));

        if !self.is_root_set() || self.root_index >= self.vertices.len() {
            return malformed("no root set".to_string());
        }
        if !self.vertices[self.root_index].is_root() {
            return malformed(format!("vertex {} is not a root", self.root_index));
        }

        for (index, vertex) in self.vertices.iter().enumerate() {
            if vertex.index() != index {
                return malformed(format!(
                    "vertex at position {index} claims index {}",
                    vertex.index()
                ));
            }

            if vertex.is_root() && index != self.root_index {
                return malformed(format!("second root at vertex {index}"));
            }

            if let Some(children) = vertex.children() {
                if children.len() < 2 {
                    return malformed(format!(
                        "vertex {index} has {} child(ren), at least 2 required",
                        children.len()
                    ));
                }
                for &child in children {
                    if child >= self.vertices.len() {
                        return malformed(format!("vertex {index} has unknown child {child}"));
                    }
                    if self.vertices[child].parent_index() != Some(index) {
                        return malformed(format!(
                            "child {child} of vertex {index} does not point back to it"
                        ));
                    }
                }
            }

            if !vertex.is_root() && !vertex.has_parent() {
                return malformed(format!("vertex {index} has no parent"));
            }

            if vertex.label().is_some_and(str::is_empty) && vertex.is_leaf() {
                return malformed(format!("tip at vertex {index} has an empty name"));
            }
        }

        // Reachability; a revisit means a cycle
        let mut visited = vec![false; self.vertices.len()];
        let mut stack = vec![self.root_index];
        let mut reached = 0;
        while let Some(index) = stack.pop() {
            if visited[index] {
                return malformed(format!("cycle through vertex {index}"));
            }
            visited[index] = true;
            reached += 1;
            if let Some(children) = self.vertices[index].children() {
                stack.extend_from_slice(children);
            }
        }
        if reached != self.vertices.len() {
            let detached = visited.iter().position(|v| !v).unwrap_or_default();
            return malformed(format!("vertex {detached} is not connected to the root"));
        }

        self.tip_names().map(|_| ())
    }

    /// Returns `true` if [Tree::validate()] passes.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl std::ops::Index<VertexIndex> for Tree {
    type Output = Vertex;

    fn index(&self, index: VertexIndex) -> &Self::Output {
        &self.vertices[index]
    }
}

impl std::ops::IndexMut<VertexIndex> for Tree {
    fn index_mut(&mut self, index: VertexIndex) -> &mut Self::Output {
        &mut self.vertices[index]
    }
}

// ============================================================================
// Printing
// ============================================================================
/// Visual representation of the tree.
///
/// # Example Output
/// ```text
/// Tree with 3 leaves (5 vertices total):
///   [4] Root
///     ├─ [3] Internal (branch: 0.300)
///     │   ├─ [0] Leaf "A" (branch: 0.100)
///     │   └─ [1] Leaf "B" (branch: 0.200)
///     └─ [2] Leaf "C" (branch: 0.400)
/// ```
impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Tree with {} leaves ({} vertices total):",
            self.num_leaves(),
            self.vertices.len()
        )?;

        if self.is_root_set() {
            self.fmt_vertex(f, self.root_index, "", true)
        } else {
            writeln!(f, "(No root set)")
        }
    }
}

impl Tree {
    /// Helper function to recursively print a vertex and its children.
    fn fmt_vertex(
        &self,
        f: &mut fmt::Formatter<'_>,
        idx: VertexIndex,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let vertex = &self.vertices[idx];

        let connector = if prefix.is_empty() {
            "  "
        } else if is_last {
            "└─ "
        } else {
            "├─ "
        };

        let branch_str = match vertex.branch_length() {
            Some(bl) => format!(" (branch: {:.3})", *bl),
            None if vertex.is_root() => String::new(),
            None => " (no branch)".to_string(),
        };

        let kind = match vertex {
            Vertex::Root { .. } => "Root".to_string(),
            Vertex::Internal { label: Some(l), .. } => format!("Internal \"{l}\""),
            Vertex::Internal { .. } => "Internal".to_string(),
            Vertex::Leaf { label, .. } => format!("Leaf \"{label}\""),
        };

        writeln!(f, "{prefix}{connector}[{idx}] {kind}{branch_str}")?;

        if let Some(children) = vertex.children() {
            let new_prefix = if prefix.is_empty() {
                "    ".to_string()
            } else {
                format!("{}{}  ", prefix, if is_last { " " } else { "│" })
            };

            for (i, &child) in children.iter().enumerate() {
                self.fmt_vertex(f, child, &new_prefix, i + 1 == children.len())?;
            }
        }

        Ok(())
    }
}

// =$========================================================================$=
// ITERATORS
// =$========================================================================$=
impl Tree {
    /// Returns an iterator over the tree in post-order (children before parents).
    ///
    /// Post-order traversal visits each vertex's children before visiting the vertex itself.
    /// This is useful for computing heights, aggregating data from leaves upward, etc.
    ///
    /// # Example
    /// ```
    /// use phylomatch::model::{BranchLength, Tree};
    ///
    /// let mut tree = Tree::new(2);
    /// let a = tree.add_leaf(Some(BranchLength::new(1.0)), "A");
    /// let b = tree.add_leaf(Some(BranchLength::new(1.0)), "B");
    /// let root = tree.add_root(vec![a, b], None);
    ///
    /// let indices: Vec<_> = tree.post_order_iter().map(|v| v.index()).collect();
    /// assert_eq!(indices, vec![a, b, root]);
    /// ```
    pub fn post_order_iter(&self) -> PostOrderIter<'_> {
        PostOrderIter::new(self)
    }

    /// Returns an iterator over the tree in pre-order (parents before children).
    ///
    /// Pre-order traversal visits each vertex before visiting its children.
    /// This is useful for propagating data from root to leaves.
    ///
    /// # Example
    /// ```
    /// use phylomatch::model::{BranchLength, Tree};
    ///
    /// let mut tree = Tree::new(2);
    /// let a = tree.add_leaf(Some(BranchLength::new(1.0)), "A");
    /// let b = tree.add_leaf(Some(BranchLength::new(1.0)), "B");
    /// let root = tree.add_root(vec![a, b], None);
    ///
    /// let indices: Vec<_> = tree.pre_order_iter().map(|v| v.index()).collect();
    /// assert_eq!(indices, vec![root, a, b]);
    /// ```
    pub fn pre_order_iter(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self)
    }
}

/// Iterator for post-order traversal (children before parents).
///
/// This iterator uses a stack-based approach to traverse the tree without recursion.
/// Each vertex is visited after all its descendants have been visited.
pub struct PostOrderIter<'a> {
    tree: &'a Tree,
    stack: Vec<(VertexIndex, bool)>, // (index, children_visited)
}

impl<'a> PostOrderIter<'a> {
    fn new(tree: &'a Tree) -> Self {
        let mut stack = Vec::new();
        if tree.is_root_set() {
            stack.push((tree.root_index, false));
        }
        PostOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = &'a Vertex;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, children_visited)) = self.stack.pop() {
            let vertex = &self.tree[index];

            if children_visited || vertex.is_leaf() {
                return Some(vertex);
            }

            self.stack.push((index, true));

            // Push children in reverse, so the first child is processed first
            if let Some(children) = vertex.children() {
                self.stack
                    .extend(children.iter().rev().map(|&c| (c, false)));
            }
        }
        None
    }
}

/// Iterator for pre-order traversal (parents before children).
///
/// This iterator uses a stack-based approach to traverse the tree without recursion.
/// Each vertex is visited before any of its descendants.
pub struct PreOrderIter<'a> {
    tree: &'a Tree,
    stack: Vec<VertexIndex>,
}

impl<'a> PreOrderIter<'a> {
    fn new(tree: &'a Tree) -> Self {
        let mut stack = Vec::new();
        if tree.is_root_set() {
            stack.push(tree.root_index);
        }
        PreOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a Vertex;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let vertex = &self.tree[index];

        if let Some(children) = vertex.children() {
            self.stack.extend(children.iter().rev());
        }

        Some(vertex)
    }
}

/// Collects a set of names from anything yielding string-likes; used by the
/// pruning entry points to accept slices, sets and iterators alike.
pub(crate) fn name_set<I, S>(names: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names.into_iter().map(|s| s.as_ref().to_string()).collect()
}
