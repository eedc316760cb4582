//! Error types for the Newick and NEXUS parsers.
//!
//! This module provides [ParsingError] and [ParsingErrorType] for representing
//! and reporting syntax errors found while reading tree files. Structural
//! problems of a syntactically valid tree are reported separately as
//! [ReconcileError::MalformedTree](crate::ReconcileError::MalformedTree).

use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::ByteSource;
use std::fmt;
use thiserror::Error;

/// Default length of context provided by error from parser
const DEFAULT_CONTEXT_LENGTH: usize = 50;

// =#========================================================================#=
// PARSING ERROR TYPE
// =#========================================================================€=
/// Error types that can occur during NEXUS and Newick parsing.
#[derive(PartialEq, Debug, Clone, Error)]
pub enum ParsingErrorType {
    #[error("IO error - {0}")]
    IoError(String),
    #[error("Unexpected end of file")]
    UnexpectedEOF,
    #[error("File does not start with #NEXUS header")]
    MissingNexusHeader,
    #[error("Invalid block name")]
    InvalidBlockName,
    #[error("Invalid TAXA block format - {0}")]
    InvalidTaxaBlock(String),
    #[error("Invalid TREES block format - {0}")]
    InvalidTreesBlock(String),
    #[error("Invalid TRANSLATE command - {0}")]
    InvalidTranslateCommand(String),
    #[error("Unclosed comment")]
    UnclosedComment,
    #[error("Unclosed quoted label")]
    UnclosedQuote,
    #[error("Invalid newick string: {0}")]
    InvalidNewickString(String),
    #[error("Invalid formatting")]
    InvalidFormatting,
    #[error("Could not resolve label - {0}")]
    UnresolvedLabel(String),
    #[error("Label is not valid UTF-8 after '{0}'")]
    InvalidUtf8Label(String),
}

// =#========================================================================#=
// PARSING ERROR
// =#========================================================================$=
/// Parsing error with contextual information (position and surrounding bytes).
#[derive(Debug, Clone, PartialEq)]
pub struct ParsingError {
    kind: ParsingErrorType,
    position: usize,
    context: String,
}

impl ParsingError {
    /// Create a ParsingError from an error type and parser state
    pub fn from_parser<S: ByteSource>(kind: ParsingErrorType, parser: &ByteParser<S>) -> Self {
        Self {
            kind,
            position: parser.position(),
            context: parser.get_context_as_string(DEFAULT_CONTEXT_LENGTH),
        }
    }

    /// Convenience constructor for UnexpectedEOF
    pub fn unexpected_eof<S: ByteSource>(parser: &ByteParser<S>) -> Self {
        Self::from_parser(ParsingErrorType::UnexpectedEOF, parser)
    }

    /// Convenience constructor for MissingNexusHeader
    pub fn missing_nexus_header<S: ByteSource>(parser: &ByteParser<S>) -> Self {
        Self::from_parser(ParsingErrorType::MissingNexusHeader, parser)
    }

    /// Convenience constructor for InvalidBlockName
    pub fn invalid_block_name<S: ByteSource>(parser: &ByteParser<S>) -> Self {
        Self::from_parser(ParsingErrorType::InvalidBlockName, parser)
    }

    /// Convenience constructor for InvalidTaxaBlock
    pub fn invalid_taxa_block<S: ByteSource>(parser: &ByteParser<S>, msg: String) -> Self {
        Self::from_parser(ParsingErrorType::InvalidTaxaBlock(msg), parser)
    }

    /// Convenience constructor for InvalidTreesBlock
    pub fn invalid_trees_block<S: ByteSource>(parser: &ByteParser<S>, msg: String) -> Self {
        Self::from_parser(ParsingErrorType::InvalidTreesBlock(msg), parser)
    }

    /// Convenience constructor for InvalidTranslateCommand
    pub fn invalid_translate_command<S: ByteSource>(parser: &ByteParser<S>, msg: String) -> Self {
        Self::from_parser(ParsingErrorType::InvalidTranslateCommand(msg), parser)
    }

    /// Convenience constructor for UnclosedComment
    pub fn unclosed_comment<S: ByteSource>(parser: &ByteParser<S>) -> Self {
        Self::from_parser(ParsingErrorType::UnclosedComment, parser)
    }

    /// Convenience constructor for UnclosedQuote
    pub fn unclosed_quote<S: ByteSource>(parser: &ByteParser<S>) -> Self {
        Self::from_parser(ParsingErrorType::UnclosedQuote, parser)
    }

    /// Convenience constructor for InvalidNewickString
    pub fn invalid_newick_string<S: ByteSource>(parser: &ByteParser<S>, msg: String) -> Self {
        Self::from_parser(ParsingErrorType::InvalidNewickString(msg), parser)
    }

    /// Convenience constructor for InvalidFormatting
    pub fn invalid_formatting<S: ByteSource>(parser: &ByteParser<S>) -> Self {
        Self::from_parser(ParsingErrorType::InvalidFormatting, parser)
    }

    /// Convenience constructor for UnresolvedLabel
    pub fn unresolved_label<S: ByteSource>(parser: &ByteParser<S>, msg: String) -> Self {
        Self::from_parser(ParsingErrorType::UnresolvedLabel(msg), parser)
    }

    /// Convenience constructor for InvalidUtf8Label, given the valid start of the label
    pub fn invalid_utf8_label<S: ByteSource>(parser: &ByteParser<S>, prefix: String) -> Self {
        Self::from_parser(ParsingErrorType::InvalidUtf8Label(prefix), parser)
    }

    /// Get the error kind
    pub fn kind(&self) -> &ParsingErrorType {
        &self.kind
    }

    /// Get the position where the error occurred
    pub fn position(&self) -> usize {
        self.position
    }
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at position {}", self.kind, self.position)?;

        if !self.context.is_empty() {
            write!(f, "\n  Context (next {} bytes): {}", self.context.len(), self.context)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParsingError {}

impl From<std::io::Error> for ParsingError {
    fn from(err: std::io::Error) -> Self {
        ParsingError {
            kind: ParsingErrorType::IoError(err.to_string()),
            position: 0,
            context: String::new(),
        }
    }
}
