//! NEXUS format constants and definitions.
//!
//! Keywords for reading and writing NEXUS tree files, and the kinds of
//! blocks the reader distinguishes.

/// NEXUS label delimiters: comma, semicolon, whitespace
pub(crate) const NEXUS_LABEL_DELIMITERS: &[u8] = b" ,;\t\n\r";

/// Delimiters of a tree name in a `TREE` command
pub(crate) const TREE_NAME_DELIMITERS: &[u8] = b" =,;\t\n\r";

/// NEXUS file header "#NEXUS"
pub(crate) const NEXUS_HEADER: &[u8] = b"#NEXUS";

/// NEXUS block begin keyword "Begin"
pub(crate) const BLOCK_BEGIN: &[u8] = b"Begin";

/// NEXUS block end keyword "End;" (with semicolon)
pub(crate) const BLOCK_END: &[u8] = b"End;";

/// Alternative NEXUS block end keyword "EndBlock;" (with semicolon)
pub(crate) const BLOCK_END_ALT: &[u8] = b"EndBlock;";

// Taxa block keywords
/// TAXA block identifier "taxa;" (with semicolon)
pub(crate) const TAXA: &[u8] = b"taxa;";

/// TAXA block dimensions keyword "Dimensions"
pub(crate) const DIMENSIONS: &[u8] = b"Dimensions";

/// Number of taxa parameter "ntax"
pub(crate) const NTAX: &[u8] = b"ntax";

/// Tax labels command "Taxlabels"
pub(crate) const TAXLABELS: &[u8] = b"Taxlabels";

// Trees block keywords
/// TREES block identifier "trees;" (with semicolon)
pub(crate) const TREES: &[u8] = b"trees;";

/// TREES block translate command "Translate"
pub(crate) const TRANSLATE: &[u8] = b"Translate";

/// Individual tree declaration keyword "tree"
pub(crate) const TREE: &[u8] = b"tree";

/// Blocks the reader tells apart; everything else (DATA, CHARACTERS,
/// ASSUMPTIONS, ...) is skipped up to its `END;`.
#[derive(Debug, PartialEq, Clone)]
pub(crate) enum NexusBlock {
    Taxa,
    Trees,
    Skipped(String),
}

impl NexusBlock {
    pub(crate) fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("taxa") {
            NexusBlock::Taxa
        } else if name.eq_ignore_ascii_case("trees") {
            NexusBlock::Trees
        } else {
            NexusBlock::Skipped(name.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_names_ignore_case() {
        assert_eq!(NexusBlock::from_name("TREES"), NexusBlock::Trees);
        assert_eq!(NexusBlock::from_name("Taxa"), NexusBlock::Taxa);
        assert_eq!(
            NexusBlock::from_name("data"),
            NexusBlock::Skipped("data".to_string())
        );
    }
}
