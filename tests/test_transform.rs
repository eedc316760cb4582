use phylomatch::ReconcileError;
use phylomatch::model::{RootMarker, Tree};
use phylomatch::newick::{parse_str, to_newick};

const TOLERANCE: f64 = 1e-9;

// ============= Pruning =============
#[test]
fn test_prune_nothing_keeps_tips() {
    let tree = parse_str("((Kea:1,Kaka:1):1,(Kakapo:1.5,Takahe:1.5):0.5);").unwrap();
    let pruned = tree.prune(Vec::<String>::new()).unwrap();

    assert_eq!(pruned.tip_names().unwrap(), tree.tip_names().unwrap());
    assert_eq!(to_newick(&pruned), to_newick(&tree));
}

#[test]
fn test_prune_merges_edges() {
    let tree = parse_str("((Kea:1,Kaka:1):1,(Kakapo:1.5,Takahe:1.5):0.5);").unwrap();
    let pruned = tree.prune(["Takahe"]).unwrap();

    assert_eq!(to_newick(&pruned), "((Kea:1,Kaka:1):1,Kakapo:2);");
    assert!(pruned.is_valid());
    assert!(pruned.is_ultrametric(TOLERANCE).unwrap());
    // Original is untouched
    assert_eq!(tree.num_leaves(), 4);
}

#[test]
fn test_prune_descends_root_chain() {
    let tree = parse_str("((A:1,B:1):2,(C:1,D:1):2);").unwrap();
    let pruned = tree.prune(["C", "D"]).unwrap();

    assert_eq!(to_newick(&pruned), "(A:1,B:1);");
    assert!(pruned.is_rooted());
}

#[test]
fn test_prune_polytomy_keeps_remaining_children() {
    let tree = parse_str("((A:1,B:1,C:1):1,D:2);").unwrap();
    let pruned = tree.prune(["B"]).unwrap();

    assert_eq!(to_newick(&pruned), "((A:1,C:1):1,D:2);");
}

#[test]
fn test_prune_ignores_unknown_names() {
    let tree = parse_str("((A,B),C);").unwrap();
    let pruned = tree.prune(["Moa", "B"]).unwrap();
    assert_eq!(pruned.tip_labels(), vec!["A", "C"]);
}

#[test]
fn test_prune_keeps_labels_name_and_marker() {
    let tree = parse_str("[&R] (((A,B)ab,C)abc,D)root;")
        .unwrap()
        .with_name("labelled");
    let pruned = tree.prune(["C"]).unwrap();

    assert_eq!(to_newick(&pruned), "[&R] ((A,B)ab,D)root;");
    assert_eq!(pruned.name(), Some("labelled"));
    assert_eq!(pruned.root_marker(), Some(RootMarker::Rooted));
}

#[test]
fn test_prune_to_single_tip_fails() {
    let tree = parse_str("((A,B),C);").unwrap();
    assert!(matches!(
        tree.prune(["A", "B"]),
        Err(ReconcileError::TooFewTaxa { remaining: 1 })
    ));
    assert!(matches!(
        tree.keep_only(Vec::<&str>::new()),
        Err(ReconcileError::TooFewTaxa { remaining: 0 })
    ));
}

#[test]
fn test_keep_only() {
    let tree = parse_str("((A:1,B:1):1,(C:1,D:1):1);").unwrap();
    let kept = tree.keep_only(["D", "A", "B"]).unwrap();

    assert_eq!(kept.tip_labels(), vec!["A", "B", "D"]);
    assert_eq!(to_newick(&kept), "((A:1,B:1):1,D:2);");
}

// ============= Polytomy Resolution =============
#[test]
fn test_resolve_polytomy_of_degree_three() {
    let tree = parse_str("((A:1,B:1,C:1):1,D:2);").unwrap();
    assert!(!tree.is_binary());

    let resolved = tree.resolve_polytomies(42);
    assert!(resolved.is_binary());
    assert!(resolved.is_valid());
    assert_eq!(resolved.tip_names().unwrap(), tree.tip_names().unwrap());
    assert_eq!(resolved.num_vertices(), 2 * 4 - 1);
}

#[test]
fn test_resolve_keeps_distances() {
    let tree = parse_str("(Emu:1,Cassowary:1,Ostrich:1,Rhea:1,Tinamou:1,Kiwi:2);").unwrap();
    let resolved = tree.resolve_polytomies(7);

    assert!(resolved.is_binary());
    let mut distances: Vec<(String, f64)> = resolved
        .root_to_tip_distances()
        .unwrap()
        .into_iter()
        .map(|(tip, d)| (tip.to_string(), d))
        .collect();
    distances.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(
        distances,
        vec![
            ("Cassowary".to_string(), 1.0),
            ("Emu".to_string(), 1.0),
            ("Kiwi".to_string(), 2.0),
            ("Ostrich".to_string(), 1.0),
            ("Rhea".to_string(), 1.0),
            ("Tinamou".to_string(), 1.0),
        ]
    );
}

#[test]
fn test_resolve_is_reproducible() {
    let tree = parse_str("(A,B,C,D,E,F,G,H);").unwrap();
    assert_eq!(tree.resolve_polytomies(3), tree.resolve_polytomies(3));
    assert!(!tree.resolve_polytomies(3).has_any_branch_length());
}

#[test]
fn test_resolve_binary_tree_is_unchanged() {
    let tree = parse_str("((A:1,B:1):1,C:2);").unwrap();
    assert_eq!(tree.resolve_polytomies(99), tree);
}

// ============= Force Ultrametric =============
#[test]
fn test_force_ultrametric() {
    let tree = parse_str("((A:1,B:2):1,C:2.5);").unwrap();
    assert!(!tree.is_ultrametric(TOLERANCE).unwrap());

    let forced = tree.force_ultrametric().unwrap();
    assert!(forced.is_ultrametric(TOLERANCE).unwrap());
    assert_eq!(to_newick(&forced), "((A:1.5,B:1.5):1,C:2.5);");
}

#[test]
fn test_force_ultrametric_averages_over_clades() {
    // C alone is off, yet the stem of the A,B cherry moves too
    let tree = parse_str("((A:1,B:1):1,C:5);").unwrap();
    let forced = tree.force_ultrametric().unwrap();

    assert_eq!(to_newick(&forced), "((A:1,B:1):2,C:3);");
    assert!(forced.is_ultrametric(TOLERANCE).unwrap());
}

#[test]
fn test_force_ultrametric_keeps_ultrametric_tree() {
    let tree = parse_str("[&R] ((Kea:1,Kaka:1):2,Kakapo:3)Psittaciformes:0.5;").unwrap();
    let forced = tree.force_ultrametric().unwrap();

    assert_eq!(forced, tree);
}

#[test]
fn test_force_ultrametric_negative_edge() {
    let tree = parse_str("((A:0.1,B:10):0.1,C:0.1);").unwrap();
    assert!(matches!(
        tree.force_ultrametric(),
        Err(ReconcileError::NegativeBranchLength { .. })
    ));
}

#[test]
fn test_force_ultrametric_needs_root() {
    let tree = parse_str("(A:1,B:1,C:2);").unwrap();
    assert!(matches!(
        tree.force_ultrametric(),
        Err(ReconcileError::Unrooted)
    ));
}

#[test]
fn test_force_ultrametric_needs_branch_lengths() {
    let tree = parse_str("((A:1,B):1,C:2);").unwrap();
    assert!(matches!(
        tree.force_ultrametric(),
        Err(ReconcileError::MissingBranchLength { .. })
    ));
}

#[test]
fn test_prune_descends_to_labelled_clade() {
    let tree = parse_str("[&R] ((A:1,B:1)ab:2,(C:1,D:1)cd:2)root:0.5;").unwrap();
    let pruned = tree.prune(["C", "D"]).unwrap();

    assert_eq!(to_newick(&pruned), "[&R] (A:1,B:1)ab:0.5;");
    assert_eq!(pruned.root().label(), Some("ab"));
}

#[test]
fn test_prune_without_root_is_malformed() {
    let mut tree = Tree::new(2);
    tree.add_leaf(None, "A");
    tree.add_leaf(None, "B");

    assert!(matches!(
        tree.prune(Vec::<String>::new()),
        Err(ReconcileError::MalformedTree(_))
    ));
    assert!(matches!(
        tree.keep_only(["A", "B"]),
        Err(ReconcileError::MalformedTree(_))
    ));
}
