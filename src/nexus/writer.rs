//! NEXUS format file writer.

use crate::model::Tree;
use crate::newick::writer::{NewickStyle, to_newick_with_style};
use crate::nexus::defs::{
    BLOCK_BEGIN, BLOCK_END, DIMENSIONS, NEXUS_HEADER, NTAX, TAXA, TAXLABELS, TRANSLATE, TREE,
    TREES,
};
use crate::parser::utils::escape_label;
use std::collections::HashMap;
use std::io;
use std::io::{BufWriter, Write};

// =#========================================================================#=
// NEXUS WRITER
// =#========================================================================#=
/// Writer for phylogenetic trees in NEXUS format.
///
/// # Format Structure
/// The writer produces a NEXUS file with the following structure:
/// - `#NEXUS` header
/// - `TAXA` block with dimensions and tax labels (all tips of all trees,
///   in order of first appearance)
/// - `TREES` block with TRANSLATE command (1-based integer keys) and tree definitions
///
/// # Example
/// ```
/// use phylomatch::newick;
/// use phylomatch::nexus::{NexusParser, NexusWriter};
///
/// let tree = newick::parse_str("[&R] ((Kea:1,Kaka:1):1,Kakapo:2);").unwrap();
///
/// let mut buffer = Vec::new();
/// NexusWriter::new(&mut buffer).write_nexus(&[tree.clone()]).unwrap();
/// let text = String::from_utf8(buffer).unwrap();
///
/// let content = NexusParser::for_str(&text).parse().unwrap();
/// assert_eq!(content.trees[0].tip_labels(), tree.tip_labels());
/// ```
pub struct NexusWriter<W: Write> {
    bw: BufWriter<W>,
}

// ============================================================================
// API (public)
// ============================================================================
impl<W: Write> NexusWriter<W> {
    /// Creates a new NEXUS writer for the given sink.
    pub fn new(writer: W) -> NexusWriter<W> {
        NexusWriter {
            bw: BufWriter::new(writer),
        }
    }

    /// Writes a complete NEXUS file with trees and their label mapping
    /// using integer keys (1-indexed) in TRANSLATE command.
    ///
    /// # Errors
    /// Returns an I/O error if writing fails
    pub fn write_nexus(&mut self, trees: &[Tree]) -> io::Result<()> {
        let taxa = collect_taxa(trees);
        let ids: HashMap<String, usize> = taxa
            .iter()
            .enumerate()
            .map(|(i, label)| (label.to_string(), i + 1))
            .collect();

        self.header()?
            .taxa_block(&taxa)?
            .trees_block(trees, &taxa, &ids)?;
        self.bw.flush()
    }
}

/// Tip labels of all trees, each once, in order of first appearance.
fn collect_taxa(trees: &[Tree]) -> Vec<&str> {
    let mut seen = std::collections::HashSet::new();
    trees
        .iter()
        .flat_map(|t| t.tip_labels())
        .filter(|label| seen.insert(*label))
        .collect()
}

// ============================================================================
// Nexus Block & Command Writing (private)
// ============================================================================
impl<W: Write> NexusWriter<W> {
    /// Writes the NEXUS file header ("#NEXUS"), returning itself for chaining.
    fn header(&mut self) -> io::Result<&mut Self> {
        self.write_all(NEXUS_HEADER)?.newline()?;
        Ok(self)
    }

    /// Writes the TAXA block with dimensions and taxon labels, returning itself for chaining.
    fn taxa_block(&mut self, taxa: &[&str]) -> io::Result<&mut Self> {
        // "Begin TAXA;"
        self.write_all(BLOCK_BEGIN)?
            .space()?
            .write_all(TAXA)?
            .newline()?;

        // "\tDimensions ntax=n;"
        self.tab()?
            .write_all(DIMENSIONS)?
            .space()?
            .write_all(NTAX)?
            .equals()?
            .write_all(taxa.len().to_string().as_bytes())?
            .semicolon_ln()?;

        // "\tTaxlabels [label ...];"
        self.tab()?.write_all(TAXLABELS)?;
        for label in taxa {
            self.space()?.write_all(escape_label(label).as_bytes())?;
        }
        self.semicolon_ln()?;

        // "End;"
        self.write_all(BLOCK_END)?.newline()?;

        Ok(self)
    }

    /// Writes the TREES block with TRANSLATE command and tree list, returning itself for chaining.
    fn trees_block(
        &mut self,
        trees: &[Tree],
        taxa: &[&str],
        ids: &HashMap<String, usize>,
    ) -> io::Result<&mut Self> {
        // "Begin TREES;"
        self.write_all(BLOCK_BEGIN)?
            .space()?
            .write_all(TREES)?
            .newline()?;

        self.translate_cmd(taxa)?.trees_cmd_list(trees, ids)?;

        // "End;"
        self.write_all(BLOCK_END)?.newline()?;

        Ok(self)
    }

    /// Writes the TRANSLATE command mapping indices to labels, returning itself for chaining.
    fn translate_cmd(&mut self, taxa: &[&str]) -> io::Result<&mut Self> {
        if taxa.is_empty() {
            return Ok(self);
        }

        // "\tTRANSLATE\n\t\t<id> <label>,\n ... ;"
        self.tab()?.write_all(TRANSLATE)?.newline()?;

        for (i, label) in taxa.iter().enumerate() {
            self.tab()?
                .tab()?
                .write_all((i + 1).to_string().as_bytes())?
                .space()?
                .write_all(escape_label(label).as_bytes())?;

            // No comma after last pair
            if i + 1 < taxa.len() {
                self.comma()?;
            }
            self.newline()?;
        }
        self.tab()?.semicolon_ln()?;

        Ok(self)
    }

    /// Writes the list of TREE commands in Newick format, returning itself for chaining.
    fn trees_cmd_list(
        &mut self,
        trees: &[Tree],
        ids: &HashMap<String, usize>,
    ) -> io::Result<&mut Self> {
        let style = NewickStyle::OneIndexed(ids);

        // "\tTREE <name> = <Newick;>"
        for (i, tree) in trees.iter().enumerate() {
            let name = tree
                .name()
                .map(escape_label)
                .unwrap_or_else(|| format!("tree_{}", i));

            self.tab()?
                .write_all(TREE)?
                .space()?
                .write_all(name.as_bytes())?
                .space()?
                .equals()?
                .space()?
                .write_all(to_newick_with_style(tree, &style).as_bytes())?
                .newline()?;
        }

        Ok(self)
    }
}

// ============================================================================
// Little Helpers (private)
// ============================================================================
impl<W: Write> NexusWriter<W> {
    /// Appends a byte slice to the [BufWriter], returning itself for chaining.
    fn write_all(&mut self, buf: &[u8]) -> io::Result<&mut Self> {
        self.bw.write_all(buf)?;
        Ok(self)
    }

    /// Appends a space character (' ') to the [BufWriter], returning itself for chaining.
    fn space(&mut self) -> io::Result<&mut Self> {
        self.write_all(b" ")
    }

    /// Appends a tab character ('\t') to the [BufWriter], returning itself for chaining.
    fn tab(&mut self) -> io::Result<&mut Self> {
        self.write_all(b"\t")
    }

    /// Appends a newline character ('\n') to the [BufWriter], returning itself for chaining.
    fn newline(&mut self) -> io::Result<&mut Self> {
        self.write_all(b"\n")
    }

    /// Appends a semicolon followed by a newline (';\n') to the [BufWriter], returning itself for chaining.
    fn semicolon_ln(&mut self) -> io::Result<&mut Self> {
        self.write_all(b";\n")
    }

    /// Appends a comma (',') to the [BufWriter], returning itself for chaining.
    fn comma(&mut self) -> io::Result<&mut Self> {
        self.write_all(b",")
    }

    /// Appends an equals sign ('=') to the [BufWriter], returning itself for chaining.
    fn equals(&mut self) -> io::Result<&mut Self> {
        self.write_all(b"=")
    }
}
