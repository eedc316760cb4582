//! NEXUS format parser and writer for phylogenetic trees.
//!
//! This module provides:
//! - [NexusParser] - for reading NEXUS files
//! - [NexusWriter] - for writing NEXUS files
//!
//! # Quick API
//! For simple use cases with default settings:
//! - [`parse_file`] - parses a file, returns its [NexusContent] (syntax only)
//! - [`read_file`] - reads and validates the first tree of a file
//! - [`write_nexus_file`] - writes trees to a file
//!
//! # Format
//! A NEXUS file typically contains:
//! - A TAXA block defining the species/labels
//! - A TREES block containing one or more phylogenetic trees
//! - Optional TRANSLATE commands mapping short keys to full taxon labels
//!
//! ## Assumptions
//! * A `TREES` block is present; a `TAXA` block is optional and, if
//!   present, precedes the `TREES` block
//! * Other blocks (e.g. `DATA`) are skipped
//! * A `TRANSLATE` command, if present, precedes any `TREE` command, with following details:
//!   - Command is a comma separated list of pairs of "id/short label":
//!         `TRANSLATE [<key1=short1/id1> <label1>, ...];`
//!   - `<label>` must match a label provided in the `TAXA` block, if there is one
//!   - A label with a space in it must be enclosed in single quotes and ...
//!   - A label with an apostrophe in it must be enclosed in single quotes
//!     and the apostrophe must be escaped with an apostrophe/single quote:
//!     e.g. `Wilson's Storm-petrel` becomes `'Wilson''s Storm-petrel'`
//! * One tree command has format `tree <name> = [&R] <Newick string>;`

mod defs;
mod parser;
mod writer;

pub use self::parser::{NexusContent, NexusParser};
pub use self::writer::NexusWriter;

use crate::error::{ReconcileError, Result};
use crate::model::Tree;
use crate::parser::ParsingError;
use std::fs::File;
use std::io;
use std::path::Path;

// ============================================================================
// QUICK API (public)
// ============================================================================
/// Parses a Nexus file eagerly and returns all trees and taxa.
///
/// This is a convenience function to parse a file in Nexus format containing
/// at least a TREES block, with optional TAXA block and TRANSLATE command.
///
/// # Errors
/// Returns an error if the file cannot be opened or parsed.
pub fn parse_file<P: AsRef<Path>>(path: P) -> std::result::Result<NexusContent, ParsingError> {
    NexusParser::for_file(path)?.parse()
}

/// Reads and validates the first tree of a Nexus file.
///
/// # Errors
/// * [ReconcileError::Parse] if the file cannot be read or has malformed syntax
/// * [ReconcileError::MalformedTree] if the TREES block is empty or the tree is invalid
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Tree> {
    let path = path.as_ref();
    let tree = parse_file(path)?.trees.into_iter().next().ok_or_else(|| {
        ReconcileError::MalformedTree(format!("no tree found in {}", path.display()))
    })?;
    tree.validate()?;
    Ok(tree)
}

/// Writes the trees to the file at `path` in Nexus format.
///
/// # Errors
/// Returns an I/O error if the file cannot be created or writing fails.
pub fn write_nexus_file<P: AsRef<Path>>(path: P, trees: &[Tree]) -> io::Result<()> {
    NexusWriter::new(File::create(path)?).write_nexus(trees)
}
