use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Code;

/// Maps the textual label tokens found in the input to class codes.
///
/// Deployments disagree on the granularity of the walking classes, some share
/// a code between `casualWalk` and `fastWalk`, some don't, so the table is
/// always supplied from configuration. Several tokens may map to one code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelVocabulary {
    entries: BTreeMap<String, Code>,
}

impl LabelVocabulary {
    /// Creates a new `LabelVocabulary`.
    ///
    /// # Arguments
    /// * `entries` - The `(token, code)` pairs of the table.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Code)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(token, code)| (token.into(), code))
                .collect(),
        }
    }

    /// Resolves a token into its code.
    pub fn code(&self, token: &str) -> Option<Code> {
        self.entries.get(token).copied()
    }

    /// Returns the first token (in lexicographic order) mapping to `code`.
    pub fn token(&self, code: Code) -> Option<&str> {
        self.entries
            .iter()
            .find(|&(_, &c)| c == code)
            .map(|(token, _)| token.as_str())
    }

    /// The amount of classes the codes span, that is the highest code plus one.
    pub fn classes(&self) -> usize {
        self.entries
            .values()
            .max()
            .map_or(0, |&max| max as usize + 1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LabelVocabulary {
    fn default() -> Self {
        Self::new([
            ("noMove", 0),
            ("slowWalk", 1),
            ("casualWalk", 2),
            ("fastWalk", 3),
        ])
    }
}
