//! Pruning of tips from a [Tree].
//!
//! Pruning never changes the receiver; it rebuilds the kept part of the tree
//! into a fresh arena. Internal vertices left with a single kept child are
//! collapsed and their edge length is merged into the edge below. If only
//! one child of the root keeps tips, the most recent common ancestor of the
//! kept tips becomes the new root. The
//! rebuilt arena is laid out canonically (post-order of the kept tree), so
//! pruning an already pruned tree by nothing gives back an equal tree.

use crate::error::{ReconcileError, Result};
use crate::model::tree::{Tree, VertexIndex, name_set};
use crate::model::vertex::{BranchLength, Vertex};
use tracing::debug;

impl Tree {
    /// Returns a new tree without the tips named in `names`.
    ///
    /// Names that are not tips of this tree are ignored.
    ///
    /// # Errors
    /// * [ReconcileError::TooFewTaxa] if fewer than two tips would remain
    /// * [ReconcileError::MalformedTree] if the tree has no root
    ///
    /// # Example
    /// ```
    /// use phylomatch::newick;
    ///
    /// let tree = newick::parse_str("((Kea:1,Kaka:1):1,(Kakapo:1.5,Takahe:1.5):0.5);").unwrap();
    /// let pruned = tree.prune(["Kakapo"]).unwrap();
    ///
    /// assert_eq!(pruned.tip_labels(), vec!["Kea", "Kaka", "Takahe"]);
    /// assert_eq!(newick::to_newick(&pruned), "((Kea:1,Kaka:1):1,Takahe:2);");
    /// ```
    pub fn prune<I, S>(&self, names: I) -> Result<Tree>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let dropped = name_set(names);
        self.rebuild_keeping(|label| !dropped.contains(label))
    }

    /// Returns a new tree restricted to the tips named in `names`.
    ///
    /// # Errors
    /// * [ReconcileError::TooFewTaxa] if fewer than two of `names` are tips of this tree
    /// * [ReconcileError::MalformedTree] if the tree has no root
    pub fn keep_only<I, S>(&self, names: I) -> Result<Tree>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let kept = name_set(names);
        self.rebuild_keeping(|label| kept.contains(label))
    }

    fn rebuild_keeping(&self, keep: impl Fn(&str) -> bool) -> Result<Tree> {
        if !self.is_root_set() {
            return Err(ReconcileError::MalformedTree("no root set".to_string()));
        }

        // Number of kept tips below each vertex
        let mut kept_below = vec![0usize; self.num_vertices()];
        for vertex in self.post_order_iter() {
            kept_below[vertex.index()] = match vertex {
                Vertex::Leaf { label, .. } => usize::from(keep(label)),
                _ => vertex
                    .children()
                    .unwrap_or_default()
                    .iter()
                    .map(|&c| kept_below[c])
                    .sum(),
            };
        }

        let remaining = kept_below[self.root_index()];
        if remaining < 2 {
            return Err(ReconcileError::TooFewTaxa { remaining });
        }

        // Descend from the root while only one child holds kept tips; the
        // vertex reached becomes the root and keeps its clade label, while
        // the root edge is taken from the old root
        let mut top = self.root_index();
        let top_children = loop {
            let kept = self.kept_children(top, &kept_below);
            if kept.len() == 1 {
                top = kept[0];
            } else {
                break kept;
            }
        };

        let mut pruned = Tree::new(remaining);
        let children = top_children
            .into_iter()
            .map(|c| self.copy_kept(c, &kept_below, self[c].branch_length(), &mut pruned))
            .collect();
        let root = pruned.add_root(children, self.root().branch_length());
        pruned[root].set_label(self[top].label().map(str::to_string));

        if let Some(name) = self.name() {
            pruned.set_name(name);
        }
        pruned.set_root_marker(self.root_marker());

        debug!(
            kept = remaining,
            dropped = self.num_leaves() - remaining,
            "pruned tree"
        );
        Ok(pruned)
    }

    fn kept_children(&self, index: VertexIndex, kept_below: &[usize]) -> Vec<VertexIndex> {
        self[index]
            .children()
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(|&c| kept_below[c] > 0)
            .collect()
    }

    /// Copies the kept part of the subtree at `old` into `pruned`, with
    /// `length` as the length of its incoming edge.
    fn copy_kept(
        &self,
        old: VertexIndex,
        kept_below: &[usize],
        length: Option<BranchLength>,
        pruned: &mut Tree,
    ) -> VertexIndex {
        let mut current = old;
        let mut length = length;
        loop {
            if let Vertex::Leaf { label, .. } = &self[current] {
                return pruned.add_leaf(length, label.clone());
            }

            let kept = self.kept_children(current, kept_below);
            if let [only] = kept[..] {
                current = only;
                length = merge_lengths(length, self[only].branch_length());
                continue;
            }

            let children = kept
                .into_iter()
                .map(|c| self.copy_kept(c, kept_below, self[c].branch_length(), pruned))
                .collect();
            let index = pruned.add_internal_vertex(children, length);
            pruned[index].set_label(self[current].label().map(str::to_string));
            return index;
        }
    }
}

/// Length of the edge replacing two consecutive edges.
fn merge_lengths(upper: Option<BranchLength>, lower: Option<BranchLength>) -> Option<BranchLength> {
    match (upper, lower) {
        (Some(a), Some(b)) => BranchLength::try_new(*a + *b),
        (Some(a), None) => Some(a),
        (None, b) => b,
    }
}
