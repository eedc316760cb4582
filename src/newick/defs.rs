//! Constants and definitions for the Newick parser and writer.

/// Newick label delimiters: parentheses, brackets, comma, colon, semicolon, whitespace
pub(crate) const NEWICK_LABEL_DELIMITERS: &[u8] = b"([,:; \n\t\r)]";

/// Default guess for number of leaves, when unknown
pub(crate) const DEFAULT_NUM_LEAVES_GUESS: usize = 10;

/// Comment content marking a rooted tree
pub(crate) const ROOTED_MARKER: &str = "&R";

/// Comment content marking an unrooted tree
pub(crate) const UNROOTED_MARKER: &str = "&U";
