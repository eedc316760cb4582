//! Structs and logic to parse Nexus files.
//!
//! This module provides the [NexusParser], which reads the TAXA and TREES
//! blocks of a NEXUS file and skips all other blocks.

use crate::model::{LabelResolver, Tree};
use crate::newick::NewickParser;
use crate::nexus::defs::*;
use crate::parser::byte_parser::{ByteParser, ConsumeMode::Inclusive};
use crate::parser::byte_source::{ByteSource, InMemoryByteSource};
use crate::parser::parsing_error::ParsingError;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

// =#========================================================================#=
// NEXUS CONTENT
// =#========================================================================€=
/// Trees and taxa read from a NEXUS file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NexusContent {
    /// Taxon labels of the TAXA block, in order; empty if there was none
    pub taxa: Vec<String>,
    /// Trees of all TREES blocks, in order, with labels resolved
    pub trees: Vec<Tree>,
}

// =#========================================================================#=
// NEXUS PARSER
// =#========================================================================$=
/// Parser for NEXUS files with a TREES block.
///
/// # Example
/// ```
/// use phylomatch::nexus::NexusParser;
///
/// let input = "#NEXUS
/// BEGIN TAXA;
///     DIMENSIONS NTAX=3;
///     TAXLABELS Kea Kaka Kakapo;
/// END;
/// BEGIN TREES;
///     TRANSLATE 1 Kea, 2 Kaka, 3 Kakapo;
///     TREE parrots = [&R] ((1:1,2:1):1,3:2);
/// END;";
///
/// let content = NexusParser::for_str(input).parse().unwrap();
/// assert_eq!(content.taxa, vec!["Kea", "Kaka", "Kakapo"]);
/// assert_eq!(content.trees[0].name(), Some("parrots"));
/// assert_eq!(content.trees[0].tip_labels(), vec!["Kea", "Kaka", "Kakapo"]);
/// ```
pub struct NexusParser<B: ByteSource = InMemoryByteSource> {
    byte_parser: ByteParser<B>,
    content: NexusContent,
}

// ============================================================================
// Construction (pub)
// ============================================================================
impl NexusParser<InMemoryByteSource> {
    /// Creates a parser over the full content of the file at `path`.
    pub fn for_file<P: AsRef<Path>>(path: P) -> Result<Self, ParsingError> {
        Ok(Self::new(ByteParser::for_file(path)?))
    }

    /// Creates a parser over the given string.
    pub fn for_str(input: &str) -> Self {
        Self::new(ByteParser::for_str(input))
    }
}

impl<B: ByteSource> NexusParser<B> {
    /// Creates a parser reading from the given [ByteParser].
    pub fn new(byte_parser: ByteParser<B>) -> Self {
        Self {
            byte_parser,
            content: NexusContent::default(),
        }
    }

    /// Parses the whole input.
    ///
    /// # Errors
    /// Returns a [ParsingError] if the header is missing, a TAXA or TREES block
    /// is malformed, a label cannot be resolved, or there is no TREES block.
    pub fn parse(mut self) -> Result<NexusContent, ParsingError> {
        self.parse_nexus_header()?;

        let mut found_trees_block = false;
        loop {
            self.byte_parser.skip_comment_and_whitespace()?;
            if self.byte_parser.is_eof() {
                break;
            }

            match self.detect_next_block()? {
                NexusBlock::Taxa => self.parse_taxa_block()?,
                NexusBlock::Trees => {
                    self.parse_trees_block()?;
                    found_trees_block = true;
                }
                block => {
                    debug!(?block, "skipping nexus block");
                    self.skip_to_block_end()?;
                }
            }
        }

        if !found_trees_block {
            return Err(ParsingError::invalid_trees_block(
                &self.byte_parser,
                "No TREES block found".to_string(),
            ));
        }

        debug!(
            taxa = self.content.taxa.len(),
            trees = self.content.trees.len(),
            "parsed nexus file"
        );
        Ok(self.content)
    }
}

// ============================================================================
// Blocks (private)
// ============================================================================
impl<B: ByteSource> NexusParser<B> {
    /// Parse header `#NEXUS` at start of file or return
    /// [ParsingErrorType::MissingNexusHeader](crate::parser::ParsingErrorType::MissingNexusHeader) otherwise.
    fn parse_nexus_header(&mut self) -> Result<(), ParsingError> {
        self.byte_parser.skip_comment_and_whitespace()?;

        if !self.byte_parser.consume_if_sequence(NEXUS_HEADER) {
            return Err(ParsingError::missing_nexus_header(&self.byte_parser));
        }

        Ok(())
    }

    /// Detect the next Nexus block, which must start with `BEGIN <BlockType>;` (case-insensitive),
    /// and return its BlockType, or a ParsingError if something wrong.
    fn detect_next_block(&mut self) -> Result<NexusBlock, ParsingError> {
        let parser = &mut self.byte_parser;

        if !parser.consume_if_sequence(BLOCK_BEGIN) {
            return Err(ParsingError::invalid_formatting(parser));
        }
        parser.skip_comment_and_whitespace()?;

        let block_name = parser.parse_unquoted_label(NEXUS_LABEL_DELIMITERS)?;
        if block_name.is_empty() {
            return Err(ParsingError::invalid_block_name(parser));
        }

        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b';') {
            return Err(ParsingError::invalid_block_name(parser));
        }

        Ok(NexusBlock::from_name(&block_name))
    }

    /// Skip block, continuing until encountered `END;`.
    fn skip_to_block_end(&mut self) -> Result<(), ParsingError> {
        if !self.byte_parser.consume_until_sequence(BLOCK_END, Inclusive) {
            return Err(ParsingError::unexpected_eof(&self.byte_parser));
        }

        Ok(())
    }

    /// Consumes `END;` (or `ENDBLOCK;`) if next, returning whether it did.
    fn consume_block_end(&mut self) -> bool {
        self.byte_parser.consume_if_sequence(BLOCK_END)
            || self.byte_parser.consume_if_sequence(BLOCK_END_ALT)
    }

    /// Skips an unknown command, up to and including its `;`.
    fn skip_command(&mut self) -> Result<(), ParsingError> {
        if !self.byte_parser.consume_until(b';', Inclusive) {
            return Err(ParsingError::unexpected_eof(&self.byte_parser));
        }
        Ok(())
    }

    /// Parse TAXA block extracting number of taxa from `DIMENSIONS NTAX` command
    /// and taxon list from `TAXLABELS` command, ignoring any other command and comments.
    ///
    /// # Errors
    /// [ParsingErrorType::InvalidTaxaBlock](crate::parser::ParsingErrorType::InvalidTaxaBlock)
    /// if a command is malformed, or the number of labels does not match `NTAX`.
    fn parse_taxa_block(&mut self) -> Result<(), ParsingError> {
        let mut num_taxa = None;
        let mut taxa = Vec::new();

        loop {
            self.byte_parser.skip_comment_and_whitespace()?;
            if self.byte_parser.is_eof() {
                return Err(ParsingError::unexpected_eof(&self.byte_parser));
            }

            if self.consume_block_end() {
                break;
            } else if self.byte_parser.consume_if_sequence(DIMENSIONS) {
                num_taxa = Some(self.parse_taxa_block_ntax()?);
            } else if self.byte_parser.consume_if_sequence(TAXLABELS) {
                taxa = self.parse_taxa_block_labels()?;
            } else {
                self.skip_command()?;
            }
        }

        if num_taxa.is_some_and(|n| n != taxa.len()) {
            return Err(ParsingError::invalid_taxa_block(
                &self.byte_parser,
                format!(
                    "Number of parsed labels ({}) did not match ntax value ({}).",
                    taxa.len(),
                    num_taxa.unwrap_or_default()
                ),
            ));
        }

        self.content.taxa = taxa;
        Ok(())
    }

    /// Helper method to parse TAXA block, responsible for parsing the rest of
    /// the `DIMENSIONS NTAX=n;` command and returning `n`.
    fn parse_taxa_block_ntax(&mut self) -> Result<usize, ParsingError> {
        let parser = &mut self.byte_parser;

        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if_sequence(NTAX) {
            return Err(ParsingError::invalid_taxa_block(
                parser,
                String::from("Expected 'NTAX' in TAXA block."),
            ));
        }

        parser.skip_whitespace();
        if !parser.consume_if(b'=') {
            return Err(ParsingError::invalid_taxa_block(
                parser,
                String::from("Expected '=' in TAXA block."),
            ));
        }

        parser.skip_whitespace();
        let ntax_str = parser.parse_unquoted_label(NEXUS_LABEL_DELIMITERS)?;
        let ntax: usize = ntax_str.parse().map_err(|_| {
            ParsingError::invalid_taxa_block(
                parser,
                format!("Cannot parse `ntax` value: {}", ntax_str),
            )
        })?;

        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b';') {
            return Err(ParsingError::invalid_taxa_block(
                parser,
                String::from("Expected ';' after ntax value."),
            ));
        }

        Ok(ntax)
    }

    /// Helper method to parse TAXA block, responsible for parsing the list of
    /// labels after `TAXLABELS` up to and including the closing `;`.
    fn parse_taxa_block_labels(&mut self) -> Result<Vec<String>, ParsingError> {
        let parser = &mut self.byte_parser;
        let mut labels = Vec::new();
        loop {
            parser.skip_comment_and_whitespace()?;

            // Stop once encountering semicolon (end of labels command)
            if parser.consume_if(b';') {
                break;
            }
            if parser.is_eof() {
                return Err(ParsingError::unexpected_eof(parser));
            }

            let label = parser.parse_label(NEXUS_LABEL_DELIMITERS)?;
            if label.is_empty() {
                return Err(ParsingError::invalid_taxa_block(
                    parser,
                    String::from("Unexpected ',' in TAXLABELS."),
                ));
            }
            labels.push(label);
        }

        Ok(labels)
    }

    /// Parse TREES block, resolving leaf labels based on the `TRANSLATE`
    /// command and TAXA block, if present.
    ///
    /// # Assumptions
    /// * A `TRANSLATE` command, if present, precedes any `TREE` command
    /// * One tree command has format `tree [*] <name> = [&R|&U] <Newick string>;`
    fn parse_trees_block(&mut self) -> Result<(), ParsingError> {
        let mut translation = HashMap::new();
        let mut newick_parser: Option<NewickParser> = None;

        loop {
            self.byte_parser.skip_comment_and_whitespace()?;
            if self.byte_parser.is_eof() {
                return Err(ParsingError::unexpected_eof(&self.byte_parser));
            }

            if self.consume_block_end() {
                break;
            } else if self.byte_parser.consume_if_sequence(TRANSLATE) {
                if newick_parser.is_some() {
                    return Err(ParsingError::invalid_translate_command(
                        &self.byte_parser,
                        "TRANSLATE must precede all TREE commands".to_string(),
                    ));
                }
                translation = self.parse_trees_block_translate()?;
            } else if self.byte_parser.consume_if_sequence(TREE) {
                let newick_parser =
                    newick_parser.get_or_insert_with(|| self.create_newick_parser(&translation));
                let tree = self.parse_trees_block_tree(newick_parser)?;
                self.content.trees.push(tree);
            } else {
                self.skip_command()?;
            }
        }

        Ok(())
    }

    /// Picks the label resolver for the trees of this block.
    fn create_newick_parser(&self, translation: &HashMap<String, String>) -> NewickParser {
        let taxa = &self.content.taxa;
        let mut parser = NewickParser::new();
        if !taxa.is_empty() {
            parser = parser.with_num_leaves(taxa.len());
        }
        if !taxa.is_empty() || !translation.is_empty() {
            parser = parser.with_resolver(LabelResolver::new_nexus_labels_resolver(
                translation.clone(),
                taxa.clone(),
            ));
        }
        parser
    }

    /// Helper method to parse TREES block, responsible for parsing the pairs
    /// `key label, ...;` of the `TRANSLATE` command.
    fn parse_trees_block_translate(&mut self) -> Result<HashMap<String, String>, ParsingError> {
        let taxa = &self.content.taxa;
        let parser = &mut self.byte_parser;

        let mut map = HashMap::with_capacity(taxa.len());
        loop {
            let key = parser.parse_label(NEXUS_LABEL_DELIMITERS)?;
            let label = parser.parse_label(NEXUS_LABEL_DELIMITERS)?;
            if key.is_empty() || label.is_empty() {
                return Err(ParsingError::invalid_translate_command(
                    parser,
                    "Expected pair of key and label".to_string(),
                ));
            }

            if !taxa.is_empty() && !taxa.contains(&label) {
                return Err(ParsingError::invalid_translate_command(
                    parser,
                    format!("Label '{}' is not listed in TAXA block", label),
                ));
            }
            map.insert(key, label);

            // Continue if next is a comma, but stop if semicolon
            parser.skip_comment_and_whitespace()?;
            if parser.consume_if(b',') {
                continue;
            }
            if parser.consume_if(b';') {
                break;
            }

            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_translate_command(
                parser,
                format!("Unexpected char {:?} in TRANSLATE.", next_char),
            ));
        }

        Ok(map)
    }

    /// Helper method to parse TREES block, responsible for parsing one `TREE`
    /// command after the keyword.
    fn parse_trees_block_tree(
        &mut self,
        newick_parser: &mut NewickParser,
    ) -> Result<Tree, ParsingError> {
        let parser = &mut self.byte_parser;

        // Optional default-tree marker
        parser.skip_comment_and_whitespace()?;
        parser.consume_if(b'*');

        let name = parser.parse_label(TREE_NAME_DELIMITERS)?;
        if name.is_empty() {
            return Err(ParsingError::invalid_trees_block(
                parser,
                String::from("Expected tree name after 'tree'."),
            ));
        }

        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b'=') {
            return Err(ParsingError::invalid_trees_block(
                parser,
                String::from("Expected '=' after tree name."),
            ));
        }

        // A `[&R]`/`[&U]` marker may follow and is read by the Newick parser
        newick_parser.parse_str_and_name(parser, Some(name))
    }
}
