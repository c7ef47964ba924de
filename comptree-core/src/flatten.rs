//! Flattens a rule tree into the ordered pattern table the emitter compiles.

use comptree_parser::{ConfigDocument, KeyPath, RuleNode, TokenKey};

use crate::table::{DeadEnd, FlatEntry, FlatTable, Source};
use crate::trace_categories;

/// Flattens the document's rule tree into a table with one entry per leaf.
///
/// Entries are ordered by ascending pattern length. Among entries of equal
/// length, traversal order is kept, except that wherever two patterns share a
/// prefix and then diverge, the one continuing with a literal comes before the
/// one continuing with the wildcard. Overlapping patterns are never merged.
///
/// # Arguments
///
/// * `doc` - The parsed configuration.
pub fn flatten(doc: &ConfigDocument) -> FlatTable {
    let mut collector = Collector::default();
    let mut pattern = vec![];

    for (key, node) in doc.roots() {
        pattern.extend(key.tokens().iter().cloned());
        collector.visit(node, &mut pattern, &KeyPath::default().join(key.raw()));
        pattern.clear();
    }

    let entries = order(collector.entries);

    for (index, entry) in entries.iter().enumerate() {
        tracing::debug!(
            target: trace_categories::FLATTEN,
            "entry {index}: [{}] <- {}",
            entry.pattern_string(),
            entry.origin
        );
    }

    FlatTable {
        entries,
        dead_ends: collector.dead_ends,
        programs: doc.programs().into_iter().map(str::to_owned).collect(),
    }
}

#[derive(Default)]
struct Collector {
    entries: Vec<FlatEntry>,
    dead_ends: Vec<DeadEnd>,
}

impl Collector {
    fn visit(&mut self, node: &RuleNode, pattern: &mut Vec<TokenKey>, origin: &KeyPath) {
        match node {
            RuleNode::Literal(words) => self.entries.push(FlatEntry {
                pattern: pattern.clone(),
                source: Source::Literal(words.clone()),
                origin: origin.clone(),
            }),
            RuleNode::Dynamic(command) => self.entries.push(FlatEntry {
                pattern: pattern.clone(),
                source: Source::Dynamic(command.clone()),
                origin: origin.clone(),
            }),
            RuleNode::Branch(children) if children.is_empty() => {
                self.dead_ends.push(DeadEnd {
                    pattern: pattern.clone(),
                    origin: origin.clone(),
                });
            }
            RuleNode::Branch(children) => {
                let literal_first = children
                    .iter()
                    .filter(|(key, _)| !key.starts_with_wildcard())
                    .chain(children.iter().filter(|(key, _)| key.starts_with_wildcard()));

                for (key, child) in literal_first {
                    let depth = pattern.len();
                    pattern.extend(key.tokens().iter().cloned());
                    self.visit(child, pattern, &origin.join(key.raw()));
                    pattern.truncate(depth);
                }
            }
        }
    }
}

/// Orders collected leaves for first-match lookup.
///
/// Each entry is placed ahead of the first same-length entry it must precede
/// (see [`must_precede`]) and after everything else, then the whole sequence is
/// stably sorted by length. The precedence relation is transitive, so this keeps
/// traversal order for every pair of patterns that cannot both match.
fn order(entries: Vec<FlatEntry>) -> Vec<FlatEntry> {
    let mut ordered: Vec<FlatEntry> = Vec::with_capacity(entries.len());

    for entry in entries {
        let position = ordered
            .iter()
            .position(|placed| {
                placed.pattern.len() == entry.pattern.len()
                    && must_precede(&entry.pattern, &placed.pattern)
            })
            .unwrap_or(ordered.len());
        ordered.insert(position, entry);
    }

    ordered.sort_by_key(|entry| entry.pattern.len());
    ordered
}

/// True if `first` and `second` agree up to a position where `first` has a
/// literal and `second` has the wildcard.
fn must_precede(first: &[TokenKey], second: &[TokenKey]) -> bool {
    first
        .iter()
        .zip(second)
        .find(|(a, b)| a != b)
        .is_some_and(|pair| matches!(pair, (TokenKey::Literal(_), TokenKey::Wildcard)))
}

#[cfg(test)]
#[allow(clippy::panic_in_result_fn)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    fn patterns(table: &FlatTable) -> Vec<String> {
        table.entries().iter().map(FlatEntry::pattern_string).collect()
    }

    #[test]
    fn one_entry_per_leaf() -> Result<()> {
        let doc = comptree_parser::parse(
            r#"
mygit:
  status: [--help]
  commit:
    --message: []
    "*": [--amend]
  checkout: "git branch"
  empty: {}
"#,
        )?;

        let table = flatten(&doc);
        assert_eq!(table.len(), doc.root.leaf_count());
        assert_eq!(
            patterns(&table),
            [
                "mygit status",
                "mygit checkout",
                "mygit commit --message",
                "mygit commit *"
            ]
        );
        assert_eq!(table.dead_ends().len(), 1);
        assert_eq!(table.dead_ends()[0].origin.0, ["mygit", "empty"]);
        assert_eq!(table.programs(), ["mygit"]);
        Ok(())
    }

    #[test]
    fn wildcard_after_literals_regardless_of_document_order() -> Result<()> {
        let doc = comptree_parser::parse(
            r#"
tool:
  "*": [--force]
  push: [origin]
  pull: [upstream]
"#,
        )?;

        assert_eq!(
            patterns(&flatten(&doc)),
            ["tool push", "tool pull", "tool *"]
        );
        Ok(())
    }

    #[test]
    fn shorter_patterns_first() -> Result<()> {
        let doc = comptree_parser::parse(
            r"
tool:
  remote:
    add: [--fetch]
  version: []
tool2: [x]
",
        )?;

        assert_eq!(
            patterns(&flatten(&doc)),
            ["tool2", "tool version", "tool remote add"]
        );
        Ok(())
    }

    #[test]
    fn multi_word_keys_share_prefix_ordering() -> Result<()> {
        // `tool a *` is written first, but `tool a b` must still be tried first.
        let doc = comptree_parser::parse(
            r#"
"tool a *": [star]
tool:
  a:
    b: [bee]
"#,
        )?;

        assert_eq!(patterns(&flatten(&doc)), ["tool a b", "tool a *"]);
        Ok(())
    }

    #[test]
    fn unrelated_patterns_keep_traversal_order() -> Result<()> {
        let doc = comptree_parser::parse(
            r"
a:
  x: [1]
b:
  y: [2]
a z: [3]
",
        )?;

        assert_eq!(patterns(&flatten(&doc)), ["a x", "b y", "a z"]);
        Ok(())
    }

    #[test]
    fn wildcard_root_yields_to_named_program() -> Result<()> {
        let doc = comptree_parser::parse(
            r#"
"* go": [anything]
other: [o]
tool:
  go: [fast]
"#,
        )?;

        assert_eq!(patterns(&flatten(&doc)), ["other", "tool go", "* go"]);
        Ok(())
    }

    #[test]
    fn precedence_needs_shared_prefix() {
        let literal = |w: &str| TokenKey::Literal(w.into());
        let ab = [literal("a"), literal("b")];

        assert!(must_precede(&ab, &[literal("a"), TokenKey::Wildcard]));
        assert!(must_precede(&ab, &[TokenKey::Wildcard, literal("c")]));
        assert!(!must_precede(&ab, &[literal("c"), TokenKey::Wildcard]));
        assert!(!must_precede(&[TokenKey::Wildcard], &[literal("a")]));
        assert!(!must_precede(&[literal("a")], &[literal("a")]));
    }

    #[test]
    fn overlapping_keys_are_not_merged() -> Result<()> {
        let doc = comptree_parser::parse(
            r"
tool:
  push: [origin]
tool push: [upstream]
",
        )?;

        let table = flatten(&doc);
        assert_eq!(patterns(&table), ["tool push", "tool push"]);
        assert_eq!(table.entries()[0].origin.0, ["tool", "push"]);
        assert_eq!(table.entries()[1].origin.0, ["tool push"]);
        Ok(())
    }

    #[test]
    fn empty_document() -> Result<()> {
        let table = flatten(&comptree_parser::parse("")?);
        assert!(table.is_empty());
        assert!(table.dead_ends().is_empty());
        Ok(())
    }
}
