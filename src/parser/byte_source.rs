//! Byte source abstractions for parsing.
//!
//! This module provides the [ByteSource] trait and the in-memory
//! implementation used by [ByteParser](crate::parser::ByteParser).

use std::fs::File;
use std::io::Read;
use std::path::Path;

// =#========================================================================#=
// BYTE SOURCE (Trait)
// =#========================================================================T=
/// Interface for sources of bytes consumed by the parsers.
///
/// Tree files handled by this crate are single trees or small sets of trees,
/// so only an in-memory source is provided. The trait keeps the parser logic
/// independent of where the bytes live.
pub trait ByteSource {
    /// Peek at the current byte without consuming it; `None` at EOF.
    fn peek(&self) -> Option<u8>;

    /// Get the current byte and advance the position; `None` at EOF.
    fn next_byte(&mut self) -> Option<u8>;

    /// Returns a slice of up to `k` bytes from the current position without allocating.
    fn peek_slice(&self, k: usize) -> &[u8];

    /// Returns the current position in the byte stream.
    fn position(&self) -> usize;

    /// Sets the position in the byte stream.
    fn set_position(&mut self, pos: usize);

    /// Check if at end of data.
    fn is_eof(&self) -> bool;
}

// =#========================================================================#=
// IN MEMORY BYTE SOURCE
// =#========================================================================$=
/// An in-memory byte source that owns its data.
pub struct InMemoryByteSource {
    /// The owned byte data being parsed
    input: Vec<u8>,
    /// Current position in the byte slice
    pos: usize,
}

impl InMemoryByteSource {
    /// Creates a new in-memory byte source from a Vec of bytes.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self {
            input: bytes,
            pos: 0,
        }
    }

    /// Reads the whole file at `path` into memory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<InMemoryByteSource> {
        let mut contents = Vec::new();
        let mut file = File::open(path)?;
        file.read_to_end(&mut contents)?;
        Ok(Self::from_vec(contents))
    }
}

impl ByteSource for InMemoryByteSource {
    #[inline(always)]
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    #[inline(always)]
    fn next_byte(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    #[inline(always)]
    fn peek_slice(&self, k: usize) -> &[u8] {
        let start = self.pos.min(self.input.len());
        let end = (self.pos + k).min(self.input.len());
        &self.input[start..end]
    }

    #[inline]
    fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }
}
