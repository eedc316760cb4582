use phylomatch::model::{BranchLength, Vertex};

// ============= Branch Length Tests =============
#[test]
fn test_branch_lengths() {
    let test_length = 1.234;
    let vertex = Vertex::new_internal(5, vec![1, 2], Some(BranchLength::new(test_length)));
    assert_eq!(*vertex.branch_length().unwrap(), test_length);
}

#[test]
#[should_panic]
fn test_negative_branch_length() {
    let _ = BranchLength::new(-1.0);
}

#[test]
fn test_try_new_rejects_invalid_lengths() {
    assert!(BranchLength::try_new(-0.5).is_none());
    assert!(BranchLength::try_new(f64::INFINITY).is_none());
    assert_eq!(BranchLength::try_new(0.0), Some(BranchLength::ZERO));
}

// ============= Vertex Variant Consistency Tests =============
#[test]
fn test_is_x() {
    let leaf = Vertex::new_leaf(0, Some(BranchLength::new(0.5)), "Kea".to_string());
    assert!(leaf.is_leaf());

    let vertex = Vertex::new_internal(0, vec![1, 2], Some(BranchLength::new(0.5)));
    assert!(vertex.is_internal());

    let root = Vertex::new_root(2, vec![0, 1], None);
    assert!(root.is_root());
}

#[test]
fn test_labels() {
    let mut internal = Vertex::new_internal(0, vec![1, 2], Some(BranchLength::new(0.5)));
    assert_eq!(internal.label(), None);
    internal.set_label(Some("Nestor".to_string()));
    assert_eq!(internal.label(), Some("Nestor"));

    // A tip keeps its name
    let mut leaf = Vertex::new_leaf(0, None, "Kea".to_string());
    leaf.set_label(None);
    assert_eq!(leaf.label(), Some("Kea"));
}

#[test]
fn test_root_edge() {
    let root = Vertex::new_root(0, vec![12, 34], Some(BranchLength::new(0.6)));
    assert_eq!(root.label(), None);
    assert_eq!(*root.branch_length().unwrap(), 0.6);
}

#[test]
fn test_parent_unset() {
    let vertex = Vertex::new_internal(0, vec![1, 2], Some(BranchLength::new(0.5)));
    assert_eq!(vertex.parent_index(), None);
    assert!(!vertex.has_parent());

    let leaf = Vertex::new_leaf(0, Some(BranchLength::new(0.5)), "Kaka".to_string());
    assert_eq!(leaf.parent_index(), None);
    assert!(!leaf.has_parent());

    let mut root = Vertex::new_root(2, vec![42, 42], None);
    root.set_parent(7);
    assert_eq!(root.parent_index(), None);
}

#[test]
fn test_children_and_degree() {
    let leaf = Vertex::new_leaf(0, Some(BranchLength::new(0.5)), "Kakapo".to_string());
    assert_eq!(leaf.children(), None);
    assert_eq!(leaf.degree(), 0);

    let polytomy = Vertex::new_internal(3, vec![0, 1, 2], None);
    assert_eq!(polytomy.children(), Some(&[0, 1, 2][..]));
    assert_eq!(polytomy.degree(), 3);
}
