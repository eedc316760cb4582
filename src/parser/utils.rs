//! Label escaping for the Newick and NEXUS writers.
//!
//! The readers keep unquoted labels verbatim (underscores stay underscores)
//! and strip quotes from quoted ones, so the writer only quotes a label when
//! it has to. Writing and reading a label thus gives back the same string.

/// Characters that end an unquoted label in Newick or NEXUS text.
const SPECIAL_CHARS: &[char] = &[' ', ',', ';', '\t', '\n', '\r', '(', ')', ':', '[', ']', '\'', '='];

/// Checks whether a label must be single-quoted to survive a write/read cycle.
///
/// # Examples
/// ```
/// # use phylomatch::parser::utils::needs_quoting;
/// assert!(!needs_quoting("Pukeko"));
/// assert!(!needs_quoting("Australasian_Swamphen"));
/// assert!(needs_quoting("Australasian Swamphen"));
/// assert!(needs_quoting("Pu[ke]ko"));
/// assert!(needs_quoting("Baillon's Crake"));
/// assert!(needs_quoting(""));
/// ```
pub fn needs_quoting(label: &str) -> bool {
    label.is_empty() || label.contains(SPECIAL_CHARS)
}

/// Escapes a label for use in Newick and NEXUS text.
///
/// Labels containing whitespace or punctuation used by the formats are
/// wrapped in single quotes, with internal single quotes doubled.
/// Other labels are returned unchanged.
///
/// # Examples
/// ```
/// # use phylomatch::parser::utils::escape_label;
/// assert_eq!(escape_label("Pukeko"), "Pukeko");
/// assert_eq!(escape_label("Pu[ke]ko"), "'Pu[ke]ko'");
/// assert_eq!(escape_label("Australasian Swamphen"), "'Australasian Swamphen'");
/// assert_eq!(escape_label("Australasian_Swamphen"), "Australasian_Swamphen");
/// assert_eq!(escape_label("Baillon's Crake"), "'Baillon''s Crake'");
/// ```
pub fn escape_label(label: &str) -> String {
    if needs_quoting(label) {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.to_string()
    }
}
