use phylomatch::ReconcileError;
use phylomatch::model::RootMarker;
use phylomatch::newick::{
    NewickParser, parse_file, parse_str, read_file, read_str, to_newick, write_newick_file,
};
use phylomatch::parser::ParsingErrorType;
use phylomatch::parser::byte_parser::ByteParser;
use std::path::Path;

// --- TESTS NEWICK STRING PARSING ---
#[test]
fn test_basic_tree() {
    let newick = "((A:1.0,B:2.0):3.0,C:4.0):0.5;";
    let mut parser = ByteParser::for_str(newick);
    let tree = NewickParser::new()
        .with_num_leaves(3)
        .parse_str(&mut parser)
        .unwrap();

    // Test counts
    assert_eq!(tree.num_leaves(), 3);
    assert_eq!(tree.num_internal(), 1);
    assert_eq!(tree.num_vertices(), 5);

    // Test relationships
    // - Root has children (internal, C)
    let root = tree.root();
    let root_index = root.index();
    let &[root_left, root_right] = root.children().unwrap() else {
        panic!("root should have two children");
    };

    // - Internal vertex has children (A, B)
    let internal = tree.vertex(root_left);
    assert!(internal.is_internal());
    let &[internal_left, internal_right] = internal.children().unwrap() else {
        panic!("internal vertex should have two children");
    };

    // - Three leaves
    let leaf_a = tree.vertex(internal_left);
    let leaf_b = tree.vertex(internal_right);
    let leaf_c = tree.vertex(root_right);
    assert_eq!(leaf_a.label(), Some("A"));
    assert_eq!(leaf_b.label(), Some("B"));
    assert_eq!(leaf_c.label(), Some("C"));

    // - Parent relationships
    assert_eq!(internal.parent_index(), Some(root_index));
    assert_eq!(leaf_a.parent_index(), Some(root_left));
    assert_eq!(leaf_b.parent_index(), Some(root_left));
    assert_eq!(leaf_c.parent_index(), Some(root_index));

    // - Root edge
    assert_eq!(*root.branch_length().unwrap(), 0.5);
}

#[test]
fn test_tip_order_is_left_to_right() {
    let tree = parse_str("((Weka,(Takahe,Pukeko)),Kea);").unwrap();
    assert_eq!(tree.tip_labels(), vec!["Weka", "Takahe", "Pukeko", "Kea"]);
    assert_eq!(tree.tip_label(2), Some("Pukeko"));
    assert_eq!(tree.tip_label(4), None);
}

#[test]
fn test_polytomy() {
    let tree = parse_str("((A:1,B:1,C:1):1,D:2);").unwrap();
    assert_eq!(tree.num_leaves(), 4);
    assert!(!tree.is_binary());
    assert!(tree.is_valid());
}

#[test]
fn test_tree_with_quoted_labels() {
    let newick = "(('Taxon one':1.5,'Second''s taxon':2.5):3.0,'3rd Taxon':4.0):0.0;";
    let tree = parse_str(newick).unwrap();

    assert_eq!(tree.num_leaves(), 3);
    assert_eq!(
        tree.tip_labels(),
        vec!["Taxon one", "Second's taxon", "3rd Taxon"]
    );
}

#[test]
fn test_underscores_are_kept() {
    let tree = parse_str("(Apteryx_mantelli,Apteryx_owenii);").unwrap();
    assert_eq!(tree.tip_labels(), vec!["Apteryx_mantelli", "Apteryx_owenii"]);
}

#[test]
fn test_internal_labels() {
    let tree = parse_str("((Kea,Kaka)Nestor:1,Kakapo)Psittaciformes;").unwrap();
    assert_eq!(tree.root().label(), Some("Psittaciformes"));

    let nestor = tree.vertex(tree.root().children().unwrap()[0]);
    assert_eq!(nestor.label(), Some("Nestor"));
    assert_eq!(*nestor.branch_length().unwrap(), 1.0);
}

#[test]
fn test_root_markers() {
    let rooted = parse_str("[&R] ((A,B),C);").unwrap();
    assert_eq!(rooted.root_marker(), Some(RootMarker::Rooted));

    let unrooted = parse_str("[&U] ((A,B),C);").unwrap();
    assert_eq!(unrooted.root_marker(), Some(RootMarker::Unrooted));
    assert!(!unrooted.is_rooted());

    let plain = parse_str("((A,B),C);").unwrap();
    assert_eq!(plain.root_marker(), None);
}

#[test]
fn test_tree_with_scientific_notation() {
    let newick = "((A:1e-5,B:2.5E+3):1.0e2,C:3.14E-10):0.0;";
    let tree = parse_str(newick).unwrap();

    assert_eq!(tree.num_leaves(), 3);
    let distances = tree.root_to_tip_distances().unwrap();
    assert_eq!(distances[1], ("B", 2600.0));
}

#[test]
fn test_optional_branch_length() {
    let tree = parse_str("((A:1.0,B),C:4.0);").unwrap();
    assert!(!tree.vertices_have_branch_lengths());
    assert!(tree.has_any_branch_length());
}

#[test]
fn test_newick_with_comment_1() {
    let newick_with_comment = "[A tree of] (([Shags!]A[Great Commentoran]:0.33,B[Pied Commentoran]:0.33):1.87,C:[King Commentoran]2.2):0.0;";
    let tree = parse_str(newick_with_comment);

    if tree.is_err() {
        eprintln!(
            "Error parsing tree with comments: {:?}",
            tree.as_ref().err()
        );
    }

    assert_eq!(tree.unwrap().tip_labels(), vec!["A", "B", "C"]);
}

#[test]
fn test_newick_with_comment_2() {
    let newick_with_comment = "[A tree of] ([Shags!] C:[King Commentoran] 2.2, (A[Great Commentoran]:0.33, B[Pied Commentoran]:0.33):1.87):0.0[The end.];";
    let tree = parse_str(newick_with_comment);

    if tree.is_err() {
        eprintln!(
            "Error parsing tree with comments: {:?}",
            tree.as_ref().err()
        );
    }

    assert!(tree.is_ok());
}

// --- TESTS DEALING WITH CORRUPT NEWICK STRINGS ---

#[test]
fn test_missing_semicolon() {
    let result = parse_str("((A:1.0,B:2.0):3.0,C:4.0):0.5");
    assert!(result.is_err());
}

#[test]
fn test_missing_comma() {
    let result = parse_str("((A:1.0 B:2.0):3.0,C:4.0):0.5;");
    assert!(result.is_err());
}

#[test]
fn test_unmatched_parentheses() {
    let result = parse_str("((A:1.0,B:2.0:3.0,C:4.0):0.5;");
    assert!(result.is_err());
}

#[test]
fn test_invalid_branch_length() {
    let err = parse_str("((A:1.0,B:abc):3.0,C:4.0):0.5;").unwrap_err();
    assert!(matches!(err.kind(), ParsingErrorType::InvalidNewickString(_)));
}

#[test]
fn test_negative_branch_length() {
    let err = parse_str("((A:1.0,B:-2.0):3.0,C:4.0);").unwrap_err();
    assert!(matches!(err.kind(), ParsingErrorType::InvalidNewickString(_)));
}

#[test]
fn test_single_tip_is_rejected() {
    assert!(parse_str("A;").is_err());
}

#[test]
fn test_unclosed_quote() {
    let err = parse_str("('Kea,Kaka);").unwrap_err();
    assert_eq!(err.kind(), &ParsingErrorType::UnclosedQuote);
}

#[test]
fn test_invalid_utf8_label_is_rejected() {
    // Latin-1 "Kéa" in an unquoted label
    let mut parser = ByteParser::for_bytes(b"(K\xe9a,Kaka);");
    let err = NewickParser::new().parse_str(&mut parser).unwrap_err();
    assert_eq!(
        err.kind(),
        &ParsingErrorType::InvalidUtf8Label("K".to_string())
    );

    let mut parser = ByteParser::for_bytes(b"('Kaka','Ke\xffa');");
    let err = NewickParser::new().parse_str(&mut parser).unwrap_err();
    assert_eq!(
        err.kind(),
        &ParsingErrorType::InvalidUtf8Label("Ke".to_string())
    );
}

#[test]
fn test_syntax_error_differs_from_invalid_tree() {
    assert!(matches!(
        read_str("((Kea,Kaka),Kea);"),
        Err(ReconcileError::MalformedTree(_))
    ));
    assert!(matches!(
        read_str("((Kea,Kaka),Kea;"),
        Err(ReconcileError::Parse(_))
    ));
}

// --- TESTS PARSING WHOLE FILE ---
#[test]
fn test_parsing_newick_file() {
    let path = Path::new("tests")
        .join("fixtures")
        .join("ratites_t3_n6.nwk");
    let trees = parse_file(path).unwrap();

    assert_eq!(trees.len(), 3);
    for tree in &trees {
        assert_eq!(tree.num_leaves(), 6);
        assert!(tree.is_valid());
    }

    assert!(trees[0].is_binary());
    assert!(!trees[1].is_binary());
    assert_eq!(trees[2].root_marker(), Some(RootMarker::Unrooted));
}

#[test]
fn test_read_file_takes_first_tree() {
    let path = Path::new("tests")
        .join("fixtures")
        .join("ratites_t3_n6.nwk");
    let tree = read_file(path).unwrap();

    assert!(tree.is_binary());
    assert!(tree.is_ultrametric(1e-9).unwrap());
    assert_eq!(tree.height().unwrap(), 70.0);
}

#[test]
fn test_iterator_yields_all_trees() {
    let input = "(A,B); [&R] ((A,B),C);\n(A,B,C,D);";
    let trees: Vec<_> = NewickParser::new()
        .into_iter(ByteParser::for_str(input))
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(trees.len(), 3);
    assert_eq!(trees[1].root_marker(), Some(RootMarker::Rooted));
    assert_eq!(trees[2].num_leaves(), 4);
}

// --- TESTS WRITING ---
#[test]
fn test_write_and_reparse() {
    let newick = "[&R] ((Kea:1,'Red-crowned parakeet':1.25)Psittacidae:0.5,'Wilson''s Storm-petrel':2):0.1;";
    let tree = parse_str(newick).unwrap();

    assert_eq!(to_newick(&tree), newick);
    assert_eq!(parse_str(to_newick(&tree)).unwrap(), tree);
}

#[test]
fn test_write_newick_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ratites.nwk");

    let trees = parse_file(Path::new("tests").join("fixtures").join("ratites_t3_n6.nwk")).unwrap();
    write_newick_file(&path, &trees).unwrap();

    let reread = parse_file(&path).unwrap();
    assert_eq!(reread, trees);
}
