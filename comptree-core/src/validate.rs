//! Structural checks over a flattened table.

use comptree_parser::{KeyPath, TokenKey};
use indexmap::IndexMap;
use itertools::Itertools;

use crate::table::{FlatTable, Source};
use crate::trace_categories;

/// Kind of problem found in a table.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum DiagnosticKind {
    /// A word list with no words.
    EmptyCandidates,
    /// Two or more leaves flatten to the same pattern; only the first can ever
    /// match.
    DuplicatePattern,
    /// A dynamic source with no command in it.
    MalformedDynamicSource,
    /// A mapping with no keys; nothing can be completed below it.
    EmptyBranch,
}

/// An advisory finding. Diagnostics never block script emission.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    /// What kind of problem this is.
    pub kind: DiagnosticKind,
    /// Human-readable description.
    pub message: String,
    /// The affected pattern.
    pub pattern: Vec<TokenKey>,
    /// Where in the configuration the affected leaves were written.
    pub locations: Vec<KeyPath>,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]: {}", self.kind, self.pattern.iter().join(" "), self.message)
    }
}

/// Checks a table for problems. Returns every problem found; an empty result
/// means the table is valid.
///
/// # Arguments
///
/// * `table` - The flattened table to check.
pub fn validate(table: &FlatTable) -> Vec<Diagnostic> {
    let mut diagnostics = vec![];

    check_sources(table, &mut diagnostics);
    check_duplicates(table, &mut diagnostics);
    check_dead_ends(table, &mut diagnostics);

    for diagnostic in &diagnostics {
        tracing::debug!(target: trace_categories::VALIDATE, "{diagnostic}");
    }

    diagnostics
}

fn check_sources(table: &FlatTable, diagnostics: &mut Vec<Diagnostic>) {
    for entry in table.entries() {
        match &entry.source {
            Source::Literal(words) if words.is_empty() => diagnostics.push(Diagnostic {
                kind: DiagnosticKind::EmptyCandidates,
                message: std::format!("'{}' offers no candidates", entry.origin),
                pattern: entry.pattern.clone(),
                locations: vec![entry.origin.clone()],
            }),
            Source::Dynamic(command) if command.trim().is_empty() => {
                diagnostics.push(Diagnostic {
                    kind: DiagnosticKind::MalformedDynamicSource,
                    message: std::format!("'{}' has an empty command", entry.origin),
                    pattern: entry.pattern.clone(),
                    locations: vec![entry.origin.clone()],
                });
            }
            Source::Literal(_) | Source::Dynamic(_) => (),
        }
    }
}

fn check_duplicates(table: &FlatTable, diagnostics: &mut Vec<Diagnostic>) {
    // Literal and wildcard token-keys are distinct identities here: `a` and
    // `*` never collide, even though `*` would also match `a`.
    let mut by_pattern: IndexMap<&[TokenKey], Vec<&KeyPath>> = IndexMap::new();
    for entry in table.entries() {
        by_pattern
            .entry(entry.pattern.as_slice())
            .or_default()
            .push(&entry.origin);
    }

    for (pattern, origins) in by_pattern {
        if origins.len() < 2 {
            continue;
        }

        diagnostics.push(Diagnostic {
            kind: DiagnosticKind::DuplicatePattern,
            message: std::format!(
                "defined {} times: {}; only the first is used",
                origins.len(),
                origins.iter().map(|o| std::format!("'{o}'")).join(", ")
            ),
            pattern: pattern.to_vec(),
            locations: origins.into_iter().cloned().collect(),
        });
    }
}

fn check_dead_ends(table: &FlatTable, diagnostics: &mut Vec<Diagnostic>) {
    for dead_end in table.dead_ends() {
        diagnostics.push(Diagnostic {
            kind: DiagnosticKind::EmptyBranch,
            message: std::format!("'{}' has no entries", dead_end.origin),
            pattern: dead_end.pattern.clone(),
            locations: vec![dead_end.origin.clone()],
        });
    }
}
