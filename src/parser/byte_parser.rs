//! Low-level byte-by-byte parser for ASCII-structured text.
//!
//! This module provides [ByteParser] for parsing text-based tree formats with
//! support for peeking, consuming, pattern matching, and quote-aware label
//! parsing. Used as the foundation for both the NEXUS and Newick parsers.

use crate::parser::byte_parser::ConsumeMode::Inclusive;
use crate::parser::byte_source::{ByteSource, InMemoryByteSource};
use crate::parser::parsing_error::ParsingError;
use std::path::Path;

// =#========================================================================#=
// BYTE PARSER
// =#========================================================================#=
/// A byte-by-byte parser with support for peeking, consuming, and pattern matching.
///
/// Structural characters are ASCII; labels may contain arbitrary UTF-8,
/// which is decoded once a label is complete.
///
/// # Features
/// - Case-insensitive matching for ASCII keywords
/// - Whitespace and `[...]` comment skipping
/// - Comment capture, e.g. for `[&R]` rooting markers
/// - Quote-aware label parsing (single quotes with `''` escaping)
/// - Context extraction for error reporting
///
/// # Example
/// ```
/// use phylomatch::parser::ByteParser;
///
/// let mut parser = ByteParser::for_str("BEGIN TREES;\n  TREE t1 = (A:1.0,B:1.0);");
///
/// parser.skip_whitespace();
/// assert!(parser.peek_is_word("BEGIN"));
/// parser.consume_if_word("begin");
/// parser.skip_whitespace();
/// assert!(parser.peek_is_word("TREES"));
/// ```
pub struct ByteParser<S: ByteSource = InMemoryByteSource> {
    source: S,
}

impl ByteParser<InMemoryByteSource> {
    /// Creates a new `ByteParser` from a byte slice by copying it into a Vec.
    pub fn for_bytes(input: &[u8]) -> Self {
        Self::new(InMemoryByteSource::from_vec(input.to_vec()))
    }

    /// Creates a new `ByteParser` from a string by copying it into a Vec.
    pub fn for_str(input: &str) -> Self {
        Self::new(InMemoryByteSource::from_vec(input.as_bytes().to_vec()))
    }

    /// Creates a new `ByteParser` over the full content of the file at `path`.
    pub fn for_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Ok(Self::new(InMemoryByteSource::from_file(path)?))
    }
}

impl<S: ByteSource> ByteParser<S> {
    /// Creates a new `ByteParser` from a byte source.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Peeks at the current byte without consuming it; `None` at EOF.
    #[inline(always)]
    pub fn peek(&self) -> Option<u8> {
        self.source.peek()
    }

    /// Gets the current byte and advances the position; `None` at EOF.
    #[inline(always)]
    pub fn next_byte(&mut self) -> Option<u8> {
        self.source.next_byte()
    }

    /// Skips (consumes) all consecutive whitespace characters.
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b == b' ' || b == b'\t' || b == b'\n' || b == b'\r' {
                self.next_byte();
            } else {
                break;
            }
        }
    }

    /// Skips (consumes) a `[...]` comment if present.
    ///
    /// # Returns
    /// * `Ok(true)` - A comment was found and consumed
    /// * `Ok(false)` - No comment at current position
    /// * `Err(ParsingError)` - Comment was opened but never closed
    pub fn skip_comment(&mut self) -> Result<bool, ParsingError> {
        if self.consume_if(b'[') {
            if !self.consume_until(b']', Inclusive) {
                return Err(ParsingError::unclosed_comment(self));
            }
            return Ok(true);
        }

        Ok(false)
    }

    /// Consumes a `[...]` comment and returns its content (without brackets),
    /// or `None` if the parser is not positioned at a comment.
    pub fn parse_comment(&mut self) -> Result<Option<String>, ParsingError> {
        if !self.consume_if(b'[') {
            return Ok(None);
        }

        let mut content = Vec::new();
        loop {
            match self.next_byte() {
                Some(b']') => break,
                Some(b) => content.push(b),
                None => return Err(ParsingError::unclosed_comment(self)),
            }
        }

        Ok(Some(String::from_utf8_lossy(&content).into_owned()))
    }

    /// Skips (consumes) all consecutive whitespace and comments.
    pub fn skip_comment_and_whitespace(&mut self) -> Result<(), ParsingError> {
        self.skip_whitespace();

        while self.skip_comment()? {
            self.skip_whitespace();
        }

        Ok(())
    }

    /// Checks if the current byte matches `ch` (case-insensitive for ASCII).
    pub fn peek_is(&self, ch: u8) -> bool {
        self.peek()
            .is_some_and(|b| b.eq_ignore_ascii_case(&ch))
    }

    /// Checks if the following bytes match the given word (case-insensitive),
    /// without consuming them.
    pub fn peek_is_word(&self, word: &str) -> bool {
        self.peek_is_sequence(word.as_bytes())
    }

    /// Checks if the following bytes match the given byte sequence (case-insensitive),
    /// without consuming them.
    #[inline]
    pub fn peek_is_sequence(&self, sequence: &[u8]) -> bool {
        let context = self.source.peek_slice(sequence.len());

        context.len() == sequence.len() && context.eq_ignore_ascii_case(sequence)
    }

    /// Consumes the current byte if it matches `ch` (case-insensitive).
    pub fn consume_if(&mut self, ch: u8) -> bool {
        if self.peek_is(ch) {
            self.next_byte();
            true
        } else {
            false
        }
    }

    /// Consumes the next bytes if they match the given word (case-insensitive).
    pub fn consume_if_word(&mut self, word: &str) -> bool {
        self.consume_if_sequence(word.as_bytes())
    }

    /// Consumes the next bytes if they match the given byte sequence (case-insensitive).
    pub fn consume_if_sequence(&mut self, sequence: &[u8]) -> bool {
        if !self.peek_is_sequence(sequence) {
            return false;
        }

        for _ in 0..sequence.len() {
            self.next_byte();
        }

        true
    }

    /// Consumes bytes until the target byte is found.
    ///
    /// # Returns
    /// `true` if the target was found, `false` if EOF was reached first
    pub fn consume_until(&mut self, target: u8, mode: ConsumeMode) -> bool {
        while let Some(b) = self.peek() {
            if b == target {
                if mode == ConsumeMode::Inclusive {
                    self.next_byte();
                }
                return true;
            }
            self.next_byte();
        }
        false
    }

    /// Consumes bytes until the next bytes match the given byte sequence (case-insensitive).
    ///
    /// # Returns
    /// `true` if the sequence was found, `false` if EOF was reached first
    pub fn consume_until_sequence(&mut self, sequence: &[u8], mode: ConsumeMode) -> bool {
        loop {
            if self.is_eof() {
                return false;
            }

            if self.peek_is_sequence(sequence) {
                if mode == ConsumeMode::Inclusive {
                    for _ in 0..sequence.len() {
                        self.next_byte();
                    }
                }
                return true;
            }

            self.next_byte();
        }
    }

    /// Returns whether the end of data (EOF) has been reached.
    pub fn is_eof(&self) -> bool {
        self.source.is_eof()
    }

    /// Returns the current byte offset in the input.
    pub fn position(&self) -> usize {
        self.source.position()
    }

    /// Sets the position in the byte stream.
    pub fn set_position(&mut self, pos: usize) {
        self.source.set_position(pos);
    }

    /// Returns a string from up to `k` bytes from the current position for error context.
    ///
    /// Invalid UTF-8 sequences are replaced with the Unicode replacement character.
    pub fn get_context_as_string(&self, k: usize) -> String {
        String::from_utf8_lossy(self.source.peek_slice(k)).into_owned()
    }

    /// Parses a label (quoted or unquoted) with the given delimiter set.
    ///
    /// Leading whitespace and comments are skipped. Returns an empty string if
    /// the parser is positioned at a delimiter.
    pub fn parse_label(&mut self, delimiters: &[u8]) -> Result<String, ParsingError> {
        self.skip_comment_and_whitespace()?;

        if self.peek() == Some(b'\'') {
            self.parse_quoted_label()
        } else {
            self.parse_unquoted_label(delimiters)
        }
    }

    /// Parses a label enclosed in single quotes.
    ///
    /// Assumes the opening quote has not been consumed yet. Single quotes within
    /// the label are escaped by doubling them (e.g., `'Wilson''s'` becomes `Wilson's`).
    ///
    /// # Errors
    /// Returns [UnclosedQuote](crate::parser::ParsingErrorType::UnclosedQuote)
    /// if EOF is reached before the closing quote, and
    /// [InvalidUtf8Label](crate::parser::ParsingErrorType::InvalidUtf8Label)
    /// if the label is not valid UTF-8.
    pub fn parse_quoted_label(&mut self) -> Result<String, ParsingError> {
        self.next_byte(); // consume opening '

        let mut label = Vec::new();
        loop {
            match self.next_byte() {
                Some(b'\'') => {
                    if self.peek() == Some(b'\'') {
                        label.push(b'\'');
                        self.next_byte();
                    } else {
                        break;
                    }
                }
                Some(b) => label.push(b),
                None => return Err(ParsingError::unclosed_quote(self)),
            }
        }

        self.label_from_bytes(label)
    }

    /// Parses an unquoted label until any of the given delimiters (or EOF) is encountered.
    ///
    /// # Errors
    /// Returns [InvalidUtf8Label](crate::parser::ParsingErrorType::InvalidUtf8Label)
    /// if the label is not valid UTF-8.
    pub fn parse_unquoted_label(&mut self, delimiters: &[u8]) -> Result<String, ParsingError> {
        let mut label = Vec::new();

        while let Some(b) = self.peek() {
            if delimiters.contains(&b) {
                break;
            }
            label.push(b);
            self.next_byte();
        }

        self.label_from_bytes(label)
    }

    /// Labels must match table names byte for byte, so bytes are never replaced.
    fn label_from_bytes(&self, label: Vec<u8>) -> Result<String, ParsingError> {
        String::from_utf8(label).map_err(|e| {
            let valid = e.utf8_error().valid_up_to();
            let prefix = String::from_utf8_lossy(&e.as_bytes()[..valid]).into_owned();
            ParsingError::invalid_utf8_label(self, prefix)
        })
    }
}

/// Specifies whether to consume or leave the target when using `consume_until` methods.
///
/// # Examples
/// ```
/// use phylomatch::parser::byte_parser::{ByteParser, ConsumeMode};
///
/// let mut parser = ByteParser::for_str("TREE t1=((A:0.5,B:0.5):0.3,C:0.8);");
///
/// // Inclusive: consume up to and including '=', e.g. to start of Newick string
/// parser.consume_until(b'=', ConsumeMode::Inclusive);
/// assert_eq!(parser.peek(), Some(b'('));
///
/// let mut parser = ByteParser::for_str("('Wilson''s_Storm-petrel')");
///
/// // Exclusive: stop in front of the target
/// parser.consume_until(b'\'', ConsumeMode::Exclusive);
/// assert_eq!(parser.peek(), Some(b'\''));
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ConsumeMode {
    /// Consume the target byte/sequence along with everything before it.
    Inclusive,

    /// Stop before the target byte/sequence without consuming it.
    Exclusive,
}
