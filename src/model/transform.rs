//! Tree transformations returning new trees: random resolution of
//! polytomies and forcing an ultrametric shape.

use crate::error::{ReconcileError, Result};
use crate::model::tree::{Tree, VertexIndex};
use crate::model::vertex::BranchLength;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Computed lengths this far below zero are rounding noise and become zero.
const NEGATIVE_LENGTH_SLACK: f64 = 1e-9;

impl Tree {
    /// Returns a binary tree in which every polytomy has been resolved into a
    /// random sequence of bifurcations.
    ///
    /// The children of a vertex with `k > 2` children are joined pairwise in
    /// random order through `k - 2` new internal vertices. New edges have
    /// length zero, or no length if the tree carries no branch lengths at all,
    /// so root-to-tip distances are unchanged. The same `seed` always gives the
    /// same tree. A root with three or more children is resolved as well.
    ///
    /// # Example
    /// ```
    /// use phylomatch::newick;
    ///
    /// let tree = newick::parse_str("(Kea:1,Kaka:1,Kakapo:1);").unwrap();
    /// assert!(!tree.is_binary());
    ///
    /// let resolved = tree.resolve_polytomies(7);
    /// assert!(resolved.is_binary());
    /// assert_eq!(resolved.tip_names().unwrap(), tree.tip_names().unwrap());
    /// assert_eq!(resolved, tree.resolve_polytomies(7));
    /// ```
    pub fn resolve_polytomies(&self, seed: u64) -> Tree {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut resolved = self.clone();

        let new_length = self.has_any_branch_length().then_some(BranchLength::ZERO);
        let polytomies: Vec<VertexIndex> = self
            .pre_order_iter()
            .filter(|v| v.degree() > 2)
            .map(|v| v.index())
            .collect();

        for &index in &polytomies {
            let mut pool: Vec<VertexIndex> = resolved[index].children().unwrap_or_default().to_vec();
            while pool.len() > 2 {
                let first = pool.swap_remove(rng.gen_range(0..pool.len()));
                let second = pool.swap_remove(rng.gen_range(0..pool.len()));
                let joined = resolved.add_internal_vertex(vec![first, second], new_length);
                pool.push(joined);
            }
            resolved.replace_children(index, pool);
        }

        debug!(polytomies = polytomies.len(), seed, "resolved polytomies");
        resolved
    }

    /// Returns a copy of this tree with all tips at the same distance from the root.
    ///
    /// The height of every internal vertex is set to the mean distance from it
    /// to its descendant tips; tips get height zero. Each edge then spans the
    /// height difference of its endpoints. Topology, labels and the root edge
    /// are kept, and an ultrametric tree comes back with the same
    /// root-to-tip distances.
    ///
    /// This is a smoothing step for trees that are ultrametric up to rounding.
    /// Trees with tips at genuinely different depths (e.g. fossil taxa) can
    /// require negative edges, which is reported as an error.
    ///
    /// Heights are averaged over whole clades rather than correcting each tip
    /// along its own root path. A deviating tip therefore also moves edges of
    /// tips that were already at the target depth: `((A:1,B:1):1,C:5);`
    /// becomes `((A:1,B:1):2,C:3);`, where the stem of A and B is stretched
    /// to meet the shortened C.
    ///
    /// # Errors
    /// * [ReconcileError::Unrooted] if the tree is not rooted
    /// * [ReconcileError::MissingBranchLength] if some non-root edge has no length
    /// * [ReconcileError::NegativeBranchLength] if an edge would become negative
    pub fn force_ultrametric(&self) -> Result<Tree> {
        if !self.is_rooted() {
            return Err(ReconcileError::Unrooted);
        }
        self.require_branch_lengths()?;

        // Per vertex: number of descendant tips and sum of distances to them
        let mut tips_below = vec![0usize; self.num_vertices()];
        let mut distance_sum = vec![0.0; self.num_vertices()];
        for vertex in self.post_order_iter() {
            let index = vertex.index();
            match vertex.children() {
                None => tips_below[index] = 1,
                Some(children) => {
                    for &child in children {
                        let length = self[child].branch_length().map_or(0.0, |bl| *bl);
                        tips_below[index] += tips_below[child];
                        distance_sum[index] +=
                            distance_sum[child] + tips_below[child] as f64 * length;
                    }
                }
            }
        }

        let heights: Vec<f64> = distance_sum
            .iter()
            .zip(&tips_below)
            .map(|(&sum, &count)| if count == 0 { 0.0 } else { sum / count as f64 })
            .collect();

        let mut smoothed = self.clone();
        for vertex in self.pre_order_iter() {
            let Some(parent) = vertex.parent_index() else {
                continue;
            };

            let mut length = heights[parent] - heights[vertex.index()];
            if length < 0.0 && length >= -NEGATIVE_LENGTH_SLACK {
                length = 0.0;
            }
            let length = BranchLength::try_new(length).ok_or(
                ReconcileError::NegativeBranchLength {
                    vertex: vertex.index(),
                    length,
                },
            )?;
            smoothed[vertex.index()].set_branch_length(Some(length));
        }

        debug!(height = heights[self.root_index()], "forced tree ultrametric");
        Ok(smoothed)
    }
}
