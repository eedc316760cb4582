use anyhow::Context;
use clap::Parser;
use phylomatch::reconcile::{align, match_taxa};
use phylomatch::table::{NameKey, TableReader, TableWriter};
use phylomatch::{DEFAULT_ULTRAMETRIC_TOLERANCE, MatchReport, Tree, newick, nexus};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Reconcile a phylogenetic tree with a table of per-taxon data.
///
/// Reports taxa found only in the tree or only in the table, then prunes the
/// tree and reorders the table so that row i belongs to tip i.
#[derive(Parser, Debug)]
#[command(name = "phylomatch", version)]
struct Cli {
    /// Tree file (Newick, or Nexus with --nexus or a .nex/.nexus extension)
    #[arg(long)]
    tree: PathBuf,

    /// Data table (CSV, or TSV for .tsv/.tab/.txt)
    #[arg(long)]
    table: PathBuf,

    /// Column holding the taxon names
    #[arg(long)]
    key: String,

    /// Use the key column as row names instead of an ordinary column
    #[arg(long)]
    row_names: bool,

    /// Read the tree file as Nexus
    #[arg(long)]
    nexus: bool,

    /// Resolve polytomies randomly with this seed before aligning
    #[arg(long, value_name = "SEED")]
    resolve_seed: Option<u64>,

    /// Add the aligned names as an extra column to the output table
    #[arg(long, value_name = "COLUMN")]
    name_column: Option<String>,

    /// Write the pruned tree here (Nexus for .nex/.nexus, else Newick)
    #[arg(long)]
    out_tree: Option<PathBuf>,

    /// Write the aligned table here
    #[arg(long)]
    out_table: Option<PathBuf>,

    /// Print the match report as JSON
    #[arg(long)]
    json: bool,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    run(&cli)
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut tree = read_tree(&cli.tree, cli.nexus)
        .with_context(|| format!("failed to read tree {}", cli.tree.display()))?;
    info!(tips = tree.num_leaves(), binary = tree.is_binary(), rooted = tree.is_rooted(), "read tree");

    if let Some(seed) = cli.resolve_seed {
        tree = tree.resolve_polytomies(seed);
    }

    let (reader, key) = if cli.row_names {
        (TableReader::new().with_row_names(&cli.key), NameKey::RowNames)
    } else {
        (TableReader::new().with_text_column(&cli.key), NameKey::column(&cli.key))
    };
    let table = reader
        .read_file(&cli.table)
        .with_context(|| format!("failed to read table {}", cli.table.display()))?;

    // With --json, stdout carries the JSON report only
    let mut text_out: Box<dyn Write> = if cli.json {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };

    let report = match_taxa(&tree, &table, &key)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    print_report(&mut text_out, &report)?;

    let mut aligned = align(&tree, &table, &key).context("tree and table cannot be aligned")?;

    if let Some(column) = &cli.name_column {
        aligned = aligned.with_name_column(column)?;
    }

    match aligned.tree().is_ultrametric(DEFAULT_ULTRAMETRIC_TOLERANCE) {
        Ok(ultrametric) => info!(ultrametric, "checked aligned tree"),
        Err(e) => warn!("cannot check ultrametricity: {e}"),
    }

    if let Some(path) = &cli.out_tree {
        write_tree(path, aligned.tree())
            .with_context(|| format!("failed to write tree {}", path.display()))?;
    }
    if let Some(path) = &cli.out_table {
        TableWriter::new()
            .write_file(path, aligned.table())
            .with_context(|| format!("failed to write table {}", path.display()))?;
    }

    writeln!(text_out, "aligned {} taxa", aligned.num_taxa())?;
    Ok(())
}

fn read_tree(path: &Path, nexus: bool) -> phylomatch::Result<Tree> {
    if nexus || is_nexus_path(path) {
        nexus::read_file(path)
    } else {
        newick::read_file(path)
    }
}

fn write_tree(path: &Path, tree: &Tree) -> std::io::Result<()> {
    let trees = std::slice::from_ref(tree);
    if is_nexus_path(path) {
        nexus::write_nexus_file(path, trees)
    } else {
        newick::write_newick_file(path, trees)
    }
}

fn is_nexus_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("nex") || ext.eq_ignore_ascii_case("nexus"))
}

/// Prints both difference sets in full, so names can be fixed at the source.
fn print_report(out: &mut dyn Write, report: &MatchReport) -> io::Result<()> {
    if report.is_perfect() {
        return writeln!(out, "tree and table match");
    }
    writeln!(out, "in tree, not in table ({}):", report.tree_not_data.len())?;
    for name in &report.tree_not_data {
        writeln!(out, "  {name}")?;
    }
    writeln!(out, "in table, not in tree ({}):", report.data_not_tree.len())?;
    for name in &report.data_not_tree {
        writeln!(out, "  {name}")?;
    }
    for duplicate in &report.duplicates {
        writeln!(out, "duplicate: {duplicate}")?;
    }
    if !report.unnamed_rows.is_empty() {
        writeln!(out, "rows without name: {:?}", report.unnamed_rows)?;
    }
    Ok(())
}
