//! Newick format parser and writer for phylogenetic trees.
//!
//! This module provides [NewickParser] to parse Newick format strings
//! into [Tree]s, and functions to write trees back. The parser may be
//! used directly to parse Newick strings or when parsing a Nexus file.
//!
//! # Quick API
//! For simple use cases with default settings:
//! * [`parse_str`] / [`parse_file`] - syntax only, return [ParsingError]s
//! * [`read_str`] / [`read_file`] - parse and [validate](Tree::validate) a
//!   single tree, so that a structurally invalid tree (e.g. duplicate tip
//!   names) surfaces as [ReconcileError::MalformedTree], distinct from a
//!   syntax error ([ReconcileError::Parse])
//! * [`to_newick`] / [`write_newick_file`] - writing
//!
//! # Full API
//! For more control, configure a [NewickParser] and
//! provide data via a [ByteParser]:
//! * [`NewickParser::parse_str`] - parse a single tree
//! * [`NewickParser::parse_all`] - parse all trees until EOF
//! * [`NewickParser::into_iter`] - obtain an iterator over trees
//!
//! # Format
//! The Newick format has the following simple grammar:
//! * `tree ::= [marker] internal_vertex ';'`
//! * `vertex ::= leaf | internal_vertex`
//! * `internal_vertex ::= '(' vertex (',' vertex)* ')' [label] [branch_length]`
//! * `leaf ::= label [branch_length]`
//! * `branch_length ::= ':' number`
//! * `marker ::= '[&R]' | '[&U]'`
//!
//! Furthermore:
//! * Whitespace can occur between elements,
//!   just not within an unquoted label or a branch_length
//! * Labels containing whitespace or punctuation are enclosed in single
//!   quotes, with `''` standing for a quote within the label
//! * Unquoted labels are taken verbatim, so underscores stay underscores
//! * Comments are square brackets and can occur anywhere where whitespace is allowed
//! * Trees have at least two leaves

mod defs;
pub mod parser;
pub mod writer;

pub use parser::{NewickIterator, NewickParser};
pub use writer::{NewickStyle, to_newick, to_newick_with_style, write_newick, write_newick_file};

use crate::error::{ReconcileError, Result};
use crate::model::Tree;
use crate::parser::ParsingError;
use crate::parser::byte_parser::ByteParser;
use std::path::Path;
use tracing::debug;

// ============================================================================
// QUICK PARSING API (pub)
// ============================================================================
/// Parses a Newick file eagerly and returns all trees.
///
/// This is a convenience function to parse a file containing
/// semicolon-separated list of Newick strings,
/// using default settings and thus not requiring configuration of a parser.
///
/// # Arguments
/// * `path` - Path to the file (accepting `&str`, `String`, `Path`, or `PathBuf`)
///   with semicolon-separated list of Newick strings
///
/// # Returns
/// * `Vec<Tree>` - All parsed trees
/// * [ParsingError] - If file reading fails or Newick format is invalid
///
/// # Example
/// ```no_run
/// use phylomatch::newick::parse_file;
///
/// let trees = parse_file("anseriformes.nwk")?;
/// println!("Parsed {} trees", trees.len());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> std::result::Result<Vec<Tree>, ParsingError> {
    let byte_parser = ByteParser::for_file(path)?;

    let trees = NewickParser::new().parse_all(byte_parser)?;
    debug!(trees = trees.len(), "parsed newick file");
    Ok(trees)
}

/// Parses a single Newick string to obtain a [Tree].
///
/// This is a convenience function for quick parsing of a single Newick string
/// using default settings and thus not requiring configuration of a parser.
/// The tree is not [validated](Tree::validate); see [read_str].
///
/// # Example
/// ```
/// use phylomatch::newick::parse_str;
///
/// let tree = parse_str("(Fratercula_cirrhata,(Fratercula_arctica,Fratercula_corniculata));")?;
/// assert_eq!(tree.tip_label(0), Some("Fratercula_cirrhata"));
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_str<S: AsRef<str>>(newick: S) -> std::result::Result<Tree, ParsingError> {
    let mut byte_parser = ByteParser::for_str(newick.as_ref());
    NewickParser::new().parse_str(&mut byte_parser)
}

/// Parses and validates a single Newick string.
///
/// # Errors
/// * [ReconcileError::Parse] on malformed syntax
/// * [ReconcileError::MalformedTree] on a syntactically fine but invalid tree,
///   e.g. one with duplicate tip names
///
/// # Example
/// ```
/// use phylomatch::{ReconcileError, newick::read_str};
///
/// assert!(read_str("(Moa,Kiwi);").is_ok());
/// assert!(matches!(read_str("(Moa,Kiwi"), Err(ReconcileError::Parse(_))));
/// assert!(matches!(read_str("(Moa,Moa);"), Err(ReconcileError::MalformedTree(_))));
/// ```
pub fn read_str<S: AsRef<str>>(newick: S) -> Result<Tree> {
    let tree = parse_str(newick)?;
    tree.validate()?;
    Ok(tree)
}

/// Reads and validates the first tree of a Newick file.
///
/// # Errors
/// * [ReconcileError::Parse] if the file cannot be read or has malformed syntax
/// * [ReconcileError::MalformedTree] if the file holds no tree or the tree is invalid
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Tree> {
    let path = path.as_ref();
    let tree = parse_file(path)?.into_iter().next().ok_or_else(|| {
        ReconcileError::MalformedTree(format!("no tree found in {}", path.display()))
    })?;
    tree.validate()?;
    Ok(tree)
}
