//! Basic low-level byte parser functionality shared by the Newick and
//! NEXUS readers, along with syntax error reporting and label escaping.

pub mod byte_parser;
pub mod byte_source;
pub mod parsing_error;
pub mod utils;

pub use byte_parser::ByteParser;
pub use parsing_error::{ParsingError, ParsingErrorType};
