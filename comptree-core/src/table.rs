//! The flattened pattern table shared by the validator, emitter and simulator.

use comptree_parser::{KeyPath, TokenKey};
use itertools::Itertools;

/// Where the candidates for a matched pattern come from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Source {
    /// A fixed word list.
    Literal(Vec<String>),
    /// A shell command run at completion time.
    Dynamic(String),
}

/// One row of the flattened table: the tokens that must precede the cursor,
/// and what to offer when they do.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FlatEntry {
    /// Token-keys from the root to the leaf. The first names the program.
    pub pattern: Vec<TokenKey>,
    /// The leaf's candidate source.
    pub source: Source,
    /// The raw keys leading to the leaf, for diagnostics.
    pub origin: KeyPath,
}

impl FlatEntry {
    /// Renders the pattern as space-separated token-keys.
    pub fn pattern_string(&self) -> String {
        self.pattern.iter().join(" ")
    }

    /// The program token, if the pattern names one.
    pub fn program(&self) -> Option<&TokenKey> {
        self.pattern.first()
    }

    /// The token-keys that must match completed words (everything after the
    /// program).
    pub fn arguments(&self) -> &[TokenKey] {
        self.pattern.get(1..).unwrap_or_default()
    }
}

/// A branch that had no children. Nothing can be completed below it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeadEnd {
    /// Token-keys leading to the empty branch.
    pub pattern: Vec<TokenKey>,
    /// The raw keys leading to the empty branch.
    pub origin: KeyPath,
}

/// The flattened rule tree, in match order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FlatTable {
    pub(crate) entries: Vec<FlatEntry>,
    pub(crate) dead_ends: Vec<DeadEnd>,
    pub(crate) programs: Vec<String>,
}

impl FlatTable {
    /// Entries ordered by pattern length, then by traversal order.
    pub fn entries(&self) -> &[FlatEntry] {
        &self.entries
    }

    /// Empty branches encountered while flattening.
    pub fn dead_ends(&self) -> &[DeadEnd] {
        &self.dead_ends
    }

    /// Program names the generated script registers itself for.
    pub fn programs(&self) -> &[String] {
        &self.programs
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
