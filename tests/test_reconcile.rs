use phylomatch::newick;
use phylomatch::reconcile::{align, match_taxa, subset};
use phylomatch::table::{DataTable, NameKey, TableReader, Value};
use phylomatch::{ReconcileError, Tree};
use std::collections::BTreeSet;
use std::path::Path;

fn names(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn species_table(rows: &[(&str, f64)]) -> DataTable {
    DataTable::from_rows(
        vec!["species".into(), "mass".into()],
        rows.iter()
            .map(|&(name, mass)| vec![Value::from(name), Value::Number(mass)])
            .collect(),
    )
    .unwrap()
}

fn abcd_tree() -> Tree {
    newick::read_str("((A:1,B:1):1,(C:1.5,D:1.5):0.5);").unwrap()
}

fn species() -> NameKey {
    NameKey::column("species")
}

// ============= Matching =============
#[test]
fn test_match_symmetric_difference() {
    let table = species_table(&[("A", 1.0), ("B", 2.0), ("C", 3.0), ("E", 5.0)]);
    let report = match_taxa(&abcd_tree(), &table, &species()).unwrap();

    assert_eq!(report.tree_not_data, names(&["D"]));
    assert_eq!(report.data_not_tree, names(&["E"]));
    assert!(report.duplicates.is_empty());
    assert!(!report.is_perfect());
}

#[test]
fn test_match_perfect() {
    let table = species_table(&[("D", 4.0), ("C", 3.0), ("B", 2.0), ("A", 1.0)]);
    let report = match_taxa(&abcd_tree(), &table, &species()).unwrap();
    assert!(report.is_perfect());
}

#[test]
fn test_match_empty_table() {
    let table = species_table(&[]);
    let report = match_taxa(&abcd_tree(), &table, &species()).unwrap();

    assert_eq!(report.tree_not_data, names(&["A", "B", "C", "D"]));
    assert!(report.data_not_tree.is_empty());
}

#[test]
fn test_match_reports_duplicates() {
    let table = species_table(&[("A", 1.0), ("B", 2.0), ("A", 1.5), ("C", 3.0), ("D", 4.0)]);
    let report = match_taxa(&abcd_tree(), &table, &species()).unwrap();

    // Duplicates collapse under set semantics
    assert!(report.tree_not_data.is_empty());
    assert!(report.data_not_tree.is_empty());
    assert!(report.has_duplicates());
    assert_eq!(report.duplicates[0].name, "A");
    assert_eq!(report.duplicates[0].rows, vec![0, 2]);
}

#[test]
fn test_match_reports_unnamed_rows() {
    let table = TableReader::new()
        .read_str("species,mass\nA,1\n,2\nB,3\n")
        .unwrap();
    let report = match_taxa(&abcd_tree(), &table, &species()).unwrap();
    assert_eq!(report.unnamed_rows, vec![1]);
}

#[test]
fn test_match_unknown_column() {
    let table = species_table(&[("A", 1.0)]);
    let result = match_taxa(&abcd_tree(), &table, &NameKey::column("taxon"));
    assert!(matches!(result, Err(ReconcileError::ColumnNotFound { .. })));
}

#[test]
fn test_match_tree_with_duplicate_tips() {
    let tree = newick::parse_str("((A,B),A);").unwrap();
    let table = species_table(&[("A", 1.0)]);
    let result = match_taxa(&tree, &table, &species());
    assert!(matches!(result, Err(ReconcileError::MalformedTree(_))));
}

#[test]
fn test_match_report_as_json() {
    let table = species_table(&[("A", 1.0), ("B", 2.0), ("C", 3.0), ("E", 5.0)]);
    let report = match_taxa(&abcd_tree(), &table, &species()).unwrap();

    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["tree_not_data"], serde_json::json!(["D"]));
    assert_eq!(json["data_not_tree"], serde_json::json!(["E"]));
    assert_eq!(json["duplicates"], serde_json::json!([]));
}

// ============= Aligning =============
#[test]
fn test_align_scenario() {
    let table = species_table(&[("E", 5.0), ("C", 3.0), ("A", 1.0), ("B", 2.0)]);
    let aligned = align(&abcd_tree(), &table, &species()).unwrap();

    assert_eq!(aligned.tree().tip_names().unwrap(), names(&["A", "B", "C"]));
    assert_eq!(aligned.num_taxa(), 3);
    assert_eq!(aligned.names(), ["A", "B", "C"]);
    assert_eq!(
        aligned.trait_vector("mass").unwrap(),
        [Some(1.0), Some(2.0), Some(3.0)]
    );
    assert_eq!(newick::to_newick(aligned.tree()), "((A:1,B:1):1,C:2);");
}

#[test]
fn test_align_row_order_matches_tip_order() {
    let tree = newick::read_str("((Kakapo,(Kea,Kaka)),(Takahe,Weka));").unwrap();
    let table = species_table(&[
        ("Weka", 1.0),
        ("Kea", 0.9),
        ("Kakapo", 2.2),
        ("Moa", 200.0),
        ("Kaka", 0.5),
    ]);
    let aligned = align(&tree, &table, &species()).unwrap();

    let key = aligned.table().resolve_key(&species()).unwrap();
    for i in 0..aligned.num_taxa() {
        assert_eq!(
            aligned.table().name_of(key, i).as_deref(),
            aligned.tree().tip_label(i)
        );
    }
}

#[test]
fn test_align_ambiguous() {
    let table = species_table(&[("A", 1.0), ("B", 2.0), ("A", 1.5), ("C", 3.0)]);
    match align(&abcd_tree(), &table, &species()) {
        Err(ReconcileError::AmbiguousMatch { names }) => assert_eq!(names, vec!["A"]),
        other => panic!("expected AmbiguousMatch, got {:?}", other),
    }
}

#[test]
fn test_align_duplicates_outside_tree_are_dropped() {
    let table = species_table(&[("A", 1.0), ("B", 2.0), ("Moa", 1.5), ("Moa", 3.0)]);
    let aligned = align(&abcd_tree(), &table, &species()).unwrap();
    assert_eq!(aligned.names(), ["A", "B"]);
}

#[test]
fn test_align_no_overlap() {
    let tree = newick::read_str("(A,B);").unwrap();
    let table = species_table(&[("C", 3.0), ("D", 4.0)]);

    match align(&tree, &table, &species()) {
        Err(ReconcileError::NoOverlap {
            tree_tips,
            data_names,
        }) => {
            assert_eq!(tree_tips, 2);
            assert_eq!(data_names, 2);
        }
        other => panic!("expected NoOverlap, got {:?}", other),
    }
}

#[test]
fn test_align_single_shared_taxon() {
    let table = species_table(&[("A", 1.0), ("E", 5.0)]);
    assert!(matches!(
        align(&abcd_tree(), &table, &species()),
        Err(ReconcileError::TooFewTaxa { remaining: 1 })
    ));
}

#[test]
fn test_align_leaves_inputs_untouched() {
    let tree = abcd_tree();
    let table = species_table(&[("C", 3.0), ("A", 1.0)]);
    let (tree_before, table_before) = (tree.clone(), table.clone());

    align(&tree, &table, &species()).unwrap();
    assert_eq!(tree, tree_before);
    assert_eq!(table, table_before);
}

#[test]
fn test_align_is_idempotent() {
    let table = species_table(&[("E", 5.0), ("C", 3.0), ("A", 1.0), ("B", 2.0)]);
    let once = align(&abcd_tree(), &table, &species()).unwrap();
    let twice = align(once.tree(), once.table(), &species()).unwrap();
    assert_eq!(twice, once);
}

#[test]
fn test_align_by_row_names_and_name_column() {
    let tree = newick::read_file(Path::new("tests").join("fixtures").join("ratites_t3_n6.nwk"))
        .unwrap();
    let table = TableReader::new()
        .with_row_names("species")
        .read_str("species,mass\nKiwi,2.5\nEmu,40\nMoa,230\nOstrich,110\n")
        .unwrap();

    let aligned = align(&tree, &table, &NameKey::RowNames).unwrap();
    assert_eq!(aligned.names(), ["Emu", "Ostrich", "Kiwi"]);

    let with_names = aligned.with_name_column("species").unwrap();
    assert_eq!(with_names.table().columns(), ["species", "mass"]);
    assert_eq!(
        with_names.table().row(1).unwrap().text("species"),
        Some("Ostrich")
    );
    assert!(matches!(
        with_names.with_name_column("mass"),
        Err(ReconcileError::DuplicateColumn(_))
    ));
}

#[test]
fn test_trait_vector_unknown_column() {
    let table = species_table(&[("A", 1.0), ("B", 2.0)]);
    let aligned = align(&abcd_tree(), &table, &species()).unwrap();
    assert!(matches!(
        aligned.trait_vector("wingspan"),
        Err(ReconcileError::ColumnNotFound { .. })
    ));
}

// ============= Subsetting =============
#[test]
fn test_subset_prunes_tree() {
    let table = TableReader::new()
        .read_str("species,mass,family\nA,1,x\nB,NA,x\nC,3,y\nD,4,y\n")
        .unwrap();
    let aligned = align(&abcd_tree(), &table, &species()).unwrap();

    let family_y = subset(&aligned, |row| row.text("family") == Some("y")).unwrap();
    assert_eq!(family_y.names(), ["C", "D"]);
    assert_eq!(newick::to_newick(family_y.tree()), "(C:1.5,D:1.5);");

    let complete = subset(&aligned, |row| !row.is_missing("mass")).unwrap();
    assert_eq!(complete.names(), ["A", "C", "D"]);
    assert_eq!(
        complete.trait_vector("mass").unwrap(),
        [Some(1.0), Some(3.0), Some(4.0)]
    );
}

#[test]
fn test_subset_after_name_column_keeps_key() {
    let table = TableReader::new()
        .read_str("mass,species\n1,A\n2,B\n3,C\n")
        .unwrap();
    let aligned = align(&abcd_tree(), &table, &species()).unwrap();

    // The leading column moves "species" from index 1 to 2
    let with_names = aligned.with_name_column("taxon").unwrap();
    assert_eq!(with_names.table().columns(), ["taxon", "mass", "species"]);
    assert_eq!(
        with_names.handle(),
        with_names.table().resolve_key(&species()).unwrap()
    );

    let without_b = subset(&with_names, |row| row.text("species") != Some("B")).unwrap();
    assert_eq!(without_b.names(), ["A", "C"]);
    assert_eq!(without_b.handle(), with_names.handle());
    assert_eq!(
        without_b.table().names(without_b.handle()),
        [Some("A".to_string()), Some("C".to_string())]
    );
}

#[test]
fn test_subset_to_nothing() {
    let table = species_table(&[("A", 1.0), ("B", 2.0), ("C", 3.0)]);
    let aligned = align(&abcd_tree(), &table, &species()).unwrap();

    assert!(matches!(
        subset(&aligned, |_| false),
        Err(ReconcileError::NoOverlap { .. })
    ));
}
