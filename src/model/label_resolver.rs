//! Label resolution for Newick strings, in particular those embedded in a
//! NEXUS file with a `TRANSLATE` command.

use std::collections::HashMap;
use thiserror::Error;

/// Error returned when a label in a Newick string cannot be mapped to a taxon.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("label '{0}' matches neither a TRANSLATE key, a taxon index, nor a taxon")]
pub struct UnresolvedLabelError(pub String);

// =#========================================================================#=
// LABEL RESOLVER
// =#========================================================================€=
/// Resolves the labels of leaves in Newick strings into taxon names.
///
/// - [`VerbatimLabels`](Self::VerbatimLabels) - raw Newick files or NEXUS without TAXA/TRANSLATE
/// - [`NexusLabels`](Self::NexusLabels) - NEXUS with a TAXA block and/or a TRANSLATE command
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LabelResolver {
    /// Labels are taxon names as is.
    #[default]
    VerbatimLabels,

    /// Resolves labels using NEXUS TAXA and TRANSLATE information.
    ///
    /// Following the NEXUS conventions, tries to resolve in order:
    /// 1. Key provided by TRANSLATE map
    ///    (e.g. "terny" -> "White-fronted tern")
    /// 2. Integer as 1-based index of label in TAXA block
    ///    (e.g. 12 -> "White-fronted tern")
    /// 3. Verbatim label match
    ///    ("White-fronted tern" -> "White-fronted tern")
    NexusLabels {
        /// TRANSLATE key -> taxon name
        translation: HashMap<String, String>,
        /// Taxon names in TAXA block order; empty if there was no TAXA block
        taxa: Vec<String>,
    },
}

impl LabelResolver {
    /// Creates a [`NexusLabels`](Self::NexusLabels) resolver.
    pub(crate) fn new_nexus_labels_resolver(
        translation: HashMap<String, String>,
        taxa: Vec<String>,
    ) -> Self {
        LabelResolver::NexusLabels { translation, taxa }
    }

    /// Resolves a label as found in a Newick string into a taxon name.
    ///
    /// # Example
    /// ```
    /// use phylomatch::model::LabelResolver;
    ///
    /// assert_eq!(LabelResolver::VerbatimLabels.resolve_label("Weka").unwrap(), "Weka");
    /// ```
    pub fn resolve_label(&self, label: &str) -> Result<String, UnresolvedLabelError> {
        match self {
            LabelResolver::VerbatimLabels => Ok(label.to_string()),
            LabelResolver::NexusLabels { translation, taxa } => {
                if let Some(name) = translation.get(label) {
                    return Ok(name.clone());
                }

                let by_index = label
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| i.checked_sub(1))
                    .and_then(|i| taxa.get(i));
                if let Some(name) = by_index {
                    return Ok(name.clone());
                }

                if taxa.is_empty() || taxa.iter().any(|t| t == label) {
                    Ok(label.to_string())
                } else {
                    Err(UnresolvedLabelError(label.to_string()))
                }
            }
        }
    }
}
