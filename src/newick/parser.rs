//! Structs and logic to parse Newick strings.
//!
//! This module provides the [NewickParser] struct, which offers methods
//! to parse files or single strings, as well as lazy parsing via a
//! [NewickIterator].

use crate::model::{BranchLength, LabelResolver, RootMarker, Tree, VertexIndex};
use crate::newick::defs::{
    DEFAULT_NUM_LEAVES_GUESS, NEWICK_LABEL_DELIMITERS, ROOTED_MARKER, UNROOTED_MARKER,
};
use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::ByteSource;
use crate::parser::parsing_error::ParsingError;

// =#========================================================================#=
// NEWICK PARSER
// =#========================================================================$=
/// Parser (configuration) for single/multiple Newick format
/// phylogenetic trees.
///
/// Uses a [LabelResolver] to map leaf labels to taxon names, e.g. as
/// necessary when parsing a Nexus file with a `TRANSLATE` command.
///
/// # Configuration
/// * [`with_num_leaves(num_leaves)`](Self::with_num_leaves)
///     - Can be configured with number of leaves in trees to parse,
///       otherwise it is inferred from the first parsed tree and then stored.
///
/// # Parsing
/// * [`parse_str`](Self::parse_str) - Parse single tree
/// * [`parse_all`](Self::parse_all) - Parse all trees eagerly
/// * [`into_iter`](Self::into_iter) - Parse trees lazily
///
/// # Example
/// ```
/// use phylomatch::newick::NewickParser;
/// use phylomatch::parser::ByteParser;
///
/// let input = "[&R] ((A_meleagrides:1.0,A_vulturinum:1.0):0.5,(N_meleagris:1.0,G_plumifera:1.0):0.5);";
/// let mut byte_parser = ByteParser::for_str(input);
/// let mut newick_parser = NewickParser::new();
///
/// let tree = newick_parser.parse_str(&mut byte_parser).unwrap();
/// assert_eq!(tree.num_leaves(), 4);
/// assert!(tree.is_rooted());
/// ```
#[derive(Debug, Clone)]
pub struct NewickParser {
    know_num_leaves: bool,
    num_leaves: usize,
    resolver: LabelResolver,
}

// ============================================================================
// Construction & Configuration (pub)
// ============================================================================
impl NewickParser {
    /// Creates a new [NewickParser] with default settings:
    /// - Number of leaves is unknown (will be counted during parsing)
    /// - Verbatim label resolution
    pub fn new() -> Self {
        Self {
            know_num_leaves: false,
            num_leaves: DEFAULT_NUM_LEAVES_GUESS,
            resolver: LabelResolver::VerbatimLabels,
        }
    }

    /// Sets the expected number of leaves in each parsed tree.
    ///
    /// This allows pre-allocation of data structures for better performance.
    /// If not set, the parser will count leaves during parsing.
    pub fn with_num_leaves(mut self, num_leaves: usize) -> Self {
        self.num_leaves = num_leaves;
        self.know_num_leaves = true;
        self
    }

    /// Replaces the resolver with a custom one.
    ///
    /// Used by the [NEXUS parser](crate::nexus) to provide resolvers
    /// configured from TAXA and TRANSLATE information.
    pub fn with_resolver(mut self, resolver: LabelResolver) -> Self {
        self.resolver = resolver;
        self
    }
}

impl Default for NewickParser {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// API Parsing (pub)
// ============================================================================
impl NewickParser {
    /// Consumes the parser and returns an iterator over trees from the byte source.
    ///
    /// # Arguments
    /// * `byte_parser` - A byte parser with underlying source containing only
    ///   Newick strings, except for whitespace and `[...]` comments.
    pub fn into_iter<B: ByteSource>(self, byte_parser: ByteParser<B>) -> NewickIterator<B> {
        NewickIterator {
            byte_parser,
            parser: self,
            done: false,
        }
    }

    /// Parses all Newick trees from the byte source until EOF.
    ///
    /// # Arguments
    /// * `byte_parser` - A byte parser with underlying source containing only
    ///   Newick strings, except for whitespace and `[...]` comments.
    ///
    /// # Returns
    /// * `Ok(Vec<Tree>)` - All parsed trees
    /// * `Err(ParsingError)` - If any tree fails to parse
    pub fn parse_all<B: ByteSource>(
        &mut self,
        mut byte_parser: ByteParser<B>,
    ) -> Result<Vec<Tree>, ParsingError> {
        let mut trees = Vec::new();
        loop {
            skip_whitespace_and_plain_comments(&mut byte_parser)?;
            if byte_parser.is_eof() {
                break;
            }
            trees.push(self.parse_str(&mut byte_parser)?);
        }
        Ok(trees)
    }

    /// Parses a single Newick tree from the given [ByteParser].
    ///
    /// # Arguments
    /// * `parser` - The byte parser positioned at the start of a Newick tree string,
    ///   possibly preceded by whitespace, comments and a `[&R]`/`[&U]` marker
    ///
    /// # Returns
    /// * `Ok(Tree)` - The parsed phylogenetic tree
    /// * `Err(ParsingError)` - If the Newick format is invalid
    pub fn parse_str<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
    ) -> Result<Tree, ParsingError> {
        self.parse_str_and_name(parser, None)
    }

    /// Parses a single Newick tree from the given [ByteParser]
    /// and gives it the provided name.
    pub(crate) fn parse_str_and_name<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
        tree_name: Option<String>,
    ) -> Result<Tree, ParsingError> {
        let mut tree = Tree::new(self.num_leaves);

        if let Some(name) = tree_name {
            tree.set_name(name);
        }

        // If number of leaves not know yet, reset it to 0,
        // so actual count can now be tracked
        if !self.know_num_leaves {
            self.num_leaves = 0;
        }

        let marker = self.parse_root_marker(parser)?;
        tree.set_root_marker(marker);

        self.parse_root(parser, &mut tree)?;

        // Having parsed a full tree,
        // the number of leaves in a tree is now known
        self.know_num_leaves = true;

        Ok(tree)
    }
}

// ============================================================================
// Parsing
// ============================================================================
impl NewickParser {
    /// Consumes leading whitespace and comments, returning the rooting
    /// marker if one of the comments is `[&R]` or `[&U]`.
    fn parse_root_marker<B: ByteSource>(
        &self,
        parser: &mut ByteParser<B>,
    ) -> Result<Option<RootMarker>, ParsingError> {
        let mut marker = None;
        parser.skip_whitespace();
        while let Some(comment) = parser.parse_comment()? {
            let comment = comment.trim();
            if comment.eq_ignore_ascii_case(ROOTED_MARKER) {
                marker = Some(RootMarker::Rooted);
            } else if comment.eq_ignore_ascii_case(UNROOTED_MARKER) {
                marker = Some(RootMarker::Unrooted);
            }
            parser.skip_whitespace();
        }
        Ok(marker)
    }

    /// Parses root of tree and adds it to tree:
    /// - `(child, ...)[label][:branch_length];`
    /// - Calls `parse_children` to parse the list of children
    ///
    /// Equivalent to `parse_internal_vertex` but takes care of root specialities.
    fn parse_root<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
        tree: &mut Tree,
    ) -> Result<(), ParsingError> {
        parser.skip_comment_and_whitespace()?;
        if !parser.peek_is(b'(') {
            return Err(ParsingError::invalid_newick_string(
                parser,
                "Expected '(' at start of tree; a tree needs at least two tips".to_string(),
            ));
        }

        let children = self.parse_children(parser, tree)?;
        let label = self.parse_internal_label(parser)?;

        // Root may have an optional branch length (might be None)
        let branch_length = self.parse_branch_length(parser)?;

        // Consume the terminating semicolon
        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b';') {
            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected ';' at end of tree but found {:?}", next_char),
            ));
        }

        let root_index = tree.add_root(children, branch_length);
        tree[root_index].set_label(label);

        Ok(())
    }

    /// Parses a vertex (either internal vertex or leaf) and returns its index:
    /// - Skips leading comments and whitespace
    /// - Dispatches to `parse_internal_vertex` if starts with `(`, otherwise `parse_leaf`
    fn parse_vertex<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
        tree: &mut Tree,
    ) -> Result<VertexIndex, ParsingError> {
        parser.skip_comment_and_whitespace()?;
        if parser.peek_is(b'(') {
            self.parse_internal_vertex(parser, tree)
        } else {
            self.parse_leaf(parser, tree)
        }
    }

    /// Parses internal vertex, adds it to tree, and returns its index:
    /// - `(child, ...)[label][:branch_length]`
    fn parse_internal_vertex<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
        tree: &mut Tree,
    ) -> Result<VertexIndex, ParsingError> {
        let children = self.parse_children(parser, tree)?;
        let label = self.parse_internal_label(parser)?;
        let branch_length = self.parse_branch_length(parser)?;

        let index = tree.add_internal_vertex(children, branch_length);
        tree[index].set_label(label);

        Ok(index)
    }

    /// Parses the children list `(child, child, ...)` and returns their indices:
    /// - Expects parser at opening `(`
    ///   (caller should skip leading comments/whitespace)
    fn parse_children<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
        tree: &mut Tree,
    ) -> Result<Vec<VertexIndex>, ParsingError> {
        // Parse: "(first"
        if !parser.consume_if(b'(') {
            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected '(' before children but found {:?}", next_char),
            ));
        }
        let mut children = vec![self.parse_vertex(parser, tree)?];

        // Parse: ",next" until ")"
        loop {
            parser.skip_comment_and_whitespace()?;
            if parser.consume_if(b',') {
                children.push(self.parse_vertex(parser, tree)?);
            } else if parser.consume_if(b')') {
                break;
            } else if parser.is_eof() {
                return Err(ParsingError::unexpected_eof(parser));
            } else {
                let next_char = parser.peek().map(char::from);
                return Err(ParsingError::invalid_newick_string(
                    parser,
                    format!("Expected ',' or ')' after child but found {:?}", next_char),
                ));
            }
        }

        Ok(children)
    }

    /// Parses leaf vertex and adds it to tree:
    /// - `label[:branch_length]`
    /// - Expects parser at start of label
    ///   (caller should skip leading comments/whitespace)
    fn parse_leaf<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
        tree: &mut Tree,
    ) -> Result<VertexIndex, ParsingError> {
        let label = parser.parse_label(NEWICK_LABEL_DELIMITERS)?;
        if label.is_empty() {
            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected leaf label but found {:?}", next_char),
            ));
        }

        let name = self
            .resolver
            .resolve_label(&label)
            .map_err(|e| ParsingError::unresolved_label(parser, e.to_string()))?;
        let branch_length = self.parse_branch_length(parser)?;
        if !self.know_num_leaves {
            self.num_leaves += 1;
        }

        Ok(tree.add_leaf(branch_length, name))
    }

    /// Parses the optional label following the `)` of an internal vertex or the root.
    fn parse_internal_label<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
    ) -> Result<Option<String>, ParsingError> {
        let label = parser.parse_label(NEWICK_LABEL_DELIMITERS)?;
        Ok((!label.is_empty()).then_some(label))
    }

    /// Parses optional branch length `[:number]`:
    /// - Skips comments/whitespace before and after `:`
    /// - Supports scientific notation (e.g., `1.5e-10`)
    ///
    /// # Returns
    /// - `Ok(Some(branch_length))` if found a branch length and was able to parse it
    /// - `Ok(None)` if no branch length found
    /// - [ParsingError] if it couldn't parse branch length value or it is negative
    fn parse_branch_length<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
    ) -> Result<Option<BranchLength>, ParsingError> {
        // Parse: Whitespace/Comments : Whitespace/Comments
        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b':') {
            return Ok(None);
        }
        parser.skip_comment_and_whitespace()?;

        // Find end of branch length substring
        let mut branch_length_str = String::new();
        while let Some(b) = parser.peek() {
            // Valid characters for a float: digits, '.', '-', '+', 'e', 'E'
            if b.is_ascii_digit() || b == b'.' || b == b'-' || b == b'+' || b == b'e' || b == b'E' {
                branch_length_str.push(b as char);
                parser.next_byte();
            } else {
                break; // Hit a delimiter like ',', ')', ';', or whitespace
            }
        }

        let value: f64 = branch_length_str.parse().map_err(|_| {
            ParsingError::invalid_newick_string(
                parser,
                format!("Invalid branch length: {:?}", branch_length_str),
            )
        })?;

        match BranchLength::try_new(value) {
            Some(branch_length) => Ok(Some(branch_length)),
            None => Err(ParsingError::invalid_newick_string(
                parser,
                format!("Branch length must be non-negative and finite, got {}", value),
            )),
        }
    }
}

/// Skips whitespace and comments other than rooting markers, which belong to
/// the next tree.
fn skip_whitespace_and_plain_comments<B: ByteSource>(
    parser: &mut ByteParser<B>,
) -> Result<(), ParsingError> {
    loop {
        parser.skip_whitespace();
        if parser.peek_is_sequence(b"[&") {
            return Ok(());
        }
        if !parser.skip_comment()? {
            return Ok(());
        }
    }
}

// =#========================================================================#=
// NEWICK ITERATOR (lazy parser)
// =#========================================================================$=
/// Iterator to parse Newick trees.
///
/// Created by [NewickParser::into_iter()].
/// Yields `Result<Tree, ParsingError>` for each tree.
pub struct NewickIterator<B: ByteSource> {
    parser: NewickParser,
    byte_parser: ByteParser<B>,
    done: bool,
}

impl<B: ByteSource> NewickIterator<B> {
    /// Consumes the iterator and returns the underlying [NewickParser].
    pub fn into_parser(self) -> NewickParser {
        self.parser
    }
}

impl<B: ByteSource> Iterator for NewickIterator<B> {
    type Item = Result<Tree, ParsingError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        // Prepare: skip whitespace and check EOF
        if let Err(e) = skip_whitespace_and_plain_comments(&mut self.byte_parser) {
            self.done = true;
            return Some(Err(e));
        }
        if self.byte_parser.is_eof() {
            self.done = true;
            return None;
        }

        let result = self.parser.parse_str(&mut self.byte_parser);
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}
