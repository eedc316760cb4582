use phylomatch::ReconcileError;
use phylomatch::table::{DataTable, NameKey, TableReader, TableWriter, Value};
use std::io::Write;
use std::path::Path;

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new("tests").join("fixtures").join(name)
}

// --- TESTS READING ---
#[test]
fn test_read_csv_fixture() {
    let table = TableReader::new().read_file(fixture("parrots.csv")).unwrap();

    assert_eq!(table.columns(), ["species", "mass_kg", "diet", "island"]);
    assert_eq!(table.num_rows(), 5);
    assert!(!table.has_row_names());

    let kea = table.row(0).unwrap();
    assert_eq!(kea.text("species"), Some("Kea"));
    assert_eq!(kea.number("mass_kg"), Some(0.9));
    assert_eq!(kea.text("diet"), Some("omnivore"));

    // Empty cell and NA are missing, numeric columns stay numeric
    assert!(table.row(1).unwrap().is_missing("island"));
    assert!(table.row(3).unwrap().is_missing("mass_kg"));
    assert_eq!(table.row(4).unwrap().number("mass_kg"), Some(2.7));
}

#[test]
fn test_read_tsv_by_extension() {
    let table = TableReader::new().read_file(fixture("parrots.tsv")).unwrap();

    assert_eq!(table.columns(), ["species", "mass_kg", "clutch"]);
    assert_eq!(table.row(2).unwrap().number("clutch"), Some(2.0));
}

#[test]
fn test_row_names() {
    let table = TableReader::new()
        .with_row_names("species")
        .read_file(fixture("parrots.csv"))
        .unwrap();

    assert_eq!(table.columns(), ["mass_kg", "diet", "island"]);
    assert!(table.has_row_names());
    assert_eq!(table.row(2).unwrap().row_name(), Some("Kakapo"));

    let key = table.resolve_key(&NameKey::RowNames).unwrap();
    assert_eq!(table.name_of(key, 4).as_deref(), Some("Takahe"));
}

#[test]
fn test_unknown_row_name_column() {
    let result = TableReader::new()
        .with_row_names("taxon")
        .read_file(fixture("parrots.csv"));

    match result {
        Err(ReconcileError::ColumnNotFound { column, available }) => {
            assert_eq!(column, "taxon");
            assert_eq!(available.len(), 4);
        }
        other => panic!("expected ColumnNotFound, got {:?}", other),
    }
}

#[test]
fn test_text_column_keeps_numeric_names() {
    let content = "id,mass\n001,0.9\n002,0.5\n";

    let inferred = TableReader::new().read_str(content).unwrap();
    assert_eq!(inferred.row(0).unwrap().get("id"), Some(&Value::Number(1.0)));

    let forced = TableReader::new()
        .with_text_column("id")
        .read_str(content)
        .unwrap();
    assert_eq!(forced.row(0).unwrap().text("id"), Some("001"));
}

#[test]
fn test_custom_missing_tokens_and_delimiter() {
    let table = TableReader::new()
        .with_delimiter(b';')
        .with_missing_tokens(["?", "-"])
        .read_str("species;mass\nKea;?\nKaka;-\nKakapo;2.2\n")
        .unwrap();

    assert!(table.row(0).unwrap().is_missing("mass"));
    assert!(table.row(1).unwrap().is_missing("mass"));
    assert_eq!(table.row(2).unwrap().number("mass"), Some(2.2));
}

#[test]
fn test_nan_is_missing() {
    let table = TableReader::new()
        .read_str("species,mass\nKea,NaN\nKaka,0.5\n")
        .unwrap();
    assert!(table.row(0).unwrap().is_missing("mass"));
}

#[test]
fn test_ragged_rows_are_an_error() {
    let result = TableReader::new().read_str("species,mass\nKea,0.9,extra\n");
    assert!(matches!(result, Err(ReconcileError::Csv(_))));
}

#[test]
fn test_read_from_temp_file() {
    let mut file = tempfile::NamedTempFile::with_suffix(".csv").unwrap();
    writeln!(file, "species,\"common name\"").unwrap();
    writeln!(file, "Strigops habroptilus,\"Kakapo, owl parrot\"").unwrap();
    writeln!(file, "Nestor notabilis,Kea").unwrap();

    let table = TableReader::new().read_file(file.path()).unwrap();
    assert_eq!(table.num_rows(), 2);
    assert_eq!(
        table.row(0).unwrap().text("common name"),
        Some("Kakapo, owl parrot")
    );
}

// --- TESTS TABLE OPERATIONS ---
fn small_table() -> DataTable {
    DataTable::from_rows(
        vec!["species".into(), "mass".into()],
        vec![
            vec!["Kea".into(), Value::Number(0.9)],
            vec!["Kaka".into(), Value::Missing],
            vec!["Kakapo".into(), Value::Number(2.2)],
        ],
    )
    .unwrap()
}

#[test]
fn test_push_row_checks_width() {
    let mut table = small_table();
    assert!(matches!(
        table.push_row(vec!["Takahe".into()]),
        Err(ReconcileError::Table(_))
    ));
    assert!(matches!(
        table.push_named_row(Some("Takahe".into()), vec!["Takahe".into(), Value::Missing]),
        Err(ReconcileError::Table(_))
    ));
}

#[test]
fn test_resolve_key() {
    let table = small_table();
    assert!(table.resolve_key(&NameKey::column("species")).is_ok());
    assert!(matches!(
        table.resolve_key(&NameKey::column("taxon")),
        Err(ReconcileError::ColumnNotFound { .. })
    ));
    assert!(matches!(
        table.resolve_key(&NameKey::RowNames),
        Err(ReconcileError::ColumnNotFound { .. })
    ));
}

#[test]
fn test_select_and_filter_rows() {
    let table = small_table();
    let key = table.resolve_key(&"species".into()).unwrap();

    let selected = table.select_rows(&[2, 0]);
    assert_eq!(
        selected.names(key),
        vec![Some("Kakapo".to_string()), Some("Kea".to_string())]
    );

    let complete = table.filter_rows(|row| !row.is_missing("mass"));
    assert_eq!(complete.num_rows(), 2);
    assert_eq!(complete.column("mass").unwrap(), [&Value::Number(0.9), &Value::Number(2.2)]);
}

#[test]
fn test_with_column() {
    let table = small_table();
    let extended = table
        .with_column("clutch", vec![Value::Number(3.0), Value::Number(4.0), Value::Missing])
        .unwrap();

    assert_eq!(extended.columns(), ["clutch", "species", "mass"]);
    assert_eq!(extended.row(1).unwrap().number("clutch"), Some(4.0));
    // Receiver is unchanged
    assert_eq!(table.num_columns(), 2);

    assert!(matches!(
        table.with_column("mass", vec![Value::Missing; 3]),
        Err(ReconcileError::DuplicateColumn(_))
    ));
    assert!(matches!(
        table.with_column("clutch", vec![Value::Missing]),
        Err(ReconcileError::Table(_))
    ));
}

// --- TESTS WRITING ---
#[test]
fn test_write_csv() {
    let text = TableWriter::new().to_string(&small_table()).unwrap();
    assert_eq!(text, "species,mass\nKea,0.9\nKaka,NA\nKakapo,2.2\n");
}

#[test]
fn test_write_quotes_delimiters() {
    let table = DataTable::from_rows(
        vec!["species".into(), "common name".into()],
        vec![vec!["Strigops habroptilus".into(), "Kakapo, owl parrot".into()]],
    )
    .unwrap();

    let text = TableWriter::new().to_string(&table).unwrap();
    assert_eq!(
        text,
        "species,common name\nStrigops habroptilus,\"Kakapo, owl parrot\"\n"
    );
}

#[test]
fn test_write_read_round_trip_with_row_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("parrots.tsv");

    let original = TableReader::new()
        .with_row_names("species")
        .read_file(fixture("parrots.csv"))
        .unwrap();
    TableWriter::new().write_file(&path, &original).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("\tmass_kg\tdiet\tisland\n"));

    let reread = TableReader::new().with_row_names("").read_file(&path).unwrap();
    assert_eq!(reread, original);
}

#[test]
fn test_round_trip_keeps_mixed_column_types() {
    let table = DataTable::from_rows(
        vec!["id".into(), "note".into(), "mass".into()],
        vec![
            vec!["001".into(), "".into(), Value::Number(0.9)],
            vec!["002".into(), Value::Missing, Value::Missing],
            vec!["010".into(), "NA-free".into(), Value::Number(1e-3)],
        ],
    )
    .unwrap();

    let text = TableWriter::new().to_string(&table).unwrap();
    let back = TableReader::new()
        .with_column_types_from(&table)
        .with_missing_tokens(["NA"])
        .read_str(&text)
        .unwrap();
    assert_eq!(back, table);

    // Inferred types turn number-like text into numbers and "" into missing
    let inferred = TableReader::new().read_str(&text).unwrap();
    assert_eq!(inferred.row(0).unwrap().get("id"), Some(&Value::Number(1.0)));
    assert!(inferred.row(0).unwrap().is_missing("note"));
}

#[test]
fn test_write_rejects_text_equal_to_missing_token() {
    let table = DataTable::from_rows(
        vec!["id".into(), "note".into()],
        vec![vec!["001".into(), "NA".into()]],
    )
    .unwrap();
    assert!(matches!(
        TableWriter::new().to_string(&table),
        Err(ReconcileError::Table(_))
    ));

    // Fine with another token
    let text = TableWriter::new()
        .with_missing_token("?")
        .to_string(&table)
        .unwrap();
    let back = TableReader::new()
        .with_column_types_from(&table)
        .with_missing_tokens(["?"])
        .read_str(&text)
        .unwrap();
    assert_eq!(back, table);

    let mut named = DataTable::with_row_names(vec!["mass".into()]);
    named
        .push_named_row(Some("NA".into()), vec![Value::Number(1.0)])
        .unwrap();
    assert!(matches!(
        TableWriter::new().to_string(&named),
        Err(ReconcileError::Table(_))
    ));
}

#[test]
fn test_round_trip_trims_surrounding_whitespace() {
    let table = DataTable::from_rows(
        vec!["species".into()],
        vec![vec![" Kea ".into()], vec!["Kaka".into()]],
    )
    .unwrap();

    let text = TableWriter::new().to_string(&table).unwrap();
    let back = TableReader::new()
        .with_column_types_from(&table)
        .read_str(&text)
        .unwrap();
    assert_eq!(back.row(0).unwrap().text("species"), Some("Kea"));
}
