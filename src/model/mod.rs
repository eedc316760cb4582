//! Data model for phylogenetic trees.
//!
//! # Tree representation
//! Trees are represented by [Tree], which uses the arena pattern to store
//! [Vertex] nodes. Each vertex is either a `Root`, `Internal`, or `Leaf`,
//! referenced by [VertexIndex]. Root and internal vertices have at least two
//! children; more than two children form a polytomy. Trees thus have
//! at least two leaves.
//!
//! # Operations
//! Every operation leaves its receiver untouched:
//! * structural queries on [Tree] (tip set and order, binary, rooted, ultrametric)
//! * [Tree::prune] and [Tree::keep_only] return a pruned copy
//! * [Tree::resolve_polytomies] and [Tree::force_ultrametric] return a transformed copy

pub mod label_resolver;
pub mod prune;
pub mod transform;
pub mod tree;
pub mod vertex;

pub use label_resolver::LabelResolver;
pub use tree::{PostOrderIter, PreOrderIter, RootMarker, Tree, VertexIndex};
pub use vertex::{BranchLength, Vertex};
