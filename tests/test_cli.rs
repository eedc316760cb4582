use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn run_phylomatch(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_phylomatch"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn write_inputs(dir: &Path, newick: &str, csv: &str) -> (String, String) {
    let tree = dir.join("tree.nwk");
    let table = dir.join("table.csv");
    fs::write(&tree, newick).unwrap();
    fs::write(&table, csv).unwrap();
    (
        tree.to_string_lossy().into_owned(),
        table.to_string_lossy().into_owned(),
    )
}

#[test]
fn test_disjoint_inputs_fail_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let (tree, table) = write_inputs(
        dir.path(),
        "(Kea:1,Kaka:1);",
        "species,mass\nMoa,230\nWeka,1\n",
    );
    let out_table = dir.path().join("aligned.csv");

    let output = run_phylomatch(&[
        "--tree",
        &tree,
        "--table",
        &table,
        "--key",
        "species",
        "--out-table",
        &out_table.to_string_lossy(),
    ]);

    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("in tree, not in table (2):"));
    assert!(stdout.contains("in table, not in tree (2):"));
    for name in ["Kea", "Kaka", "Moa", "Weka"] {
        assert!(stdout.contains(&format!("  {name}\n")), "{name} missing from {stdout}");
    }
    assert!(!out_table.exists());
}

#[test]
fn test_aligned_table_follows_tip_order() {
    let dir = tempfile::tempdir().unwrap();
    let (tree, table) = write_inputs(
        dir.path(),
        "((Kea:1,Kaka:1):1,(Kakapo:1.5,Takahe:1.5):0.5);",
        "species,mass\nTakahe,2.7\nKaka,0.5\nMoa,230\nKea,0.9\n",
    );
    let out_table = dir.path().join("aligned.csv");
    let out_tree = dir.path().join("aligned.nwk");

    let output = run_phylomatch(&[
        "--tree",
        &tree,
        "--table",
        &table,
        "--key",
        "species",
        "--out-table",
        &out_table.to_string_lossy(),
        "--out-tree",
        &out_tree.to_string_lossy(),
    ]);

    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout).unwrap().contains("aligned 3 taxa"));
    assert_eq!(
        fs::read_to_string(&out_table).unwrap(),
        "species,mass\nKea,0.9\nKaka,0.5\nTakahe,2.7\n"
    );
    assert_eq!(
        fs::read_to_string(&out_tree).unwrap().trim(),
        "((Kea:1,Kaka:1):1,Takahe:2);"
    );
}

#[test]
fn test_json_mode_keeps_stdout_valid_json() {
    let dir = tempfile::tempdir().unwrap();
    let (tree, table) = write_inputs(
        dir.path(),
        "((Kea:1,Kaka:1):1,Kakapo:2);",
        "species,mass\nKakapo,2.2\nKea,0.9\nMoa,230\n",
    );

    let output = run_phylomatch(&[
        "--tree", &tree, "--table", &table, "--key", "species", "--json",
    ]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["tree_not_data"], serde_json::json!(["Kaka"]));
    assert_eq!(report["data_not_tree"], serde_json::json!(["Moa"]));
    assert!(String::from_utf8(output.stderr).unwrap().contains("aligned 2 taxa"));
}

#[test]
fn test_json_mode_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    let (tree, table) =
        write_inputs(dir.path(), "(Kea:1,Kaka:1);", "species,mass\nMoa,230\n");

    let output = run_phylomatch(&[
        "--tree", &tree, "--table", &table, "--key", "species", "--json",
    ]);
    assert!(!output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["tree_not_data"], serde_json::json!(["Kaka", "Kea"]));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("in table, not in tree (1):"));
}
