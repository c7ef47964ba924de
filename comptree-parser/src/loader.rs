//! Turns YAML text into a [`ConfigDocument`].

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};

use crate::error::ParseError;
use crate::tree::{ConfigDocument, KeyPath, RuleKey, RuleNode};

/// The reserved top-level key holding compiler options.
pub const OPTIONS_KEY: &str = "comptree_options";

/// Parses configuration text into a document.
///
/// # Arguments
///
/// * `text` - The YAML source.
pub fn parse(text: &str) -> Result<ConfigDocument, ParseError> {
    let value: Value = serde_yaml::from_str(text)?;

    let mut mapping = match value {
        // An empty document is an empty tree.
        Value::Null => return Ok(ConfigDocument::default()),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(ParseError::NotAMapping {
                found: describe(&other),
            });
        }
    };

    let options = match mapping.shift_remove(OPTIONS_KEY) {
        Some(value) => parse_options(value)?,
        None => IndexMap::new(),
    };

    let root = parse_branch(mapping, &KeyPath::default())?;

    tracing::debug!(
        target: "load",
        "loaded {} root key(s), {} leaf node(s), {} option(s)",
        match &root {
            RuleNode::Branch(children) => children.len(),
            RuleNode::Literal(_) | RuleNode::Dynamic(_) => 0,
        },
        root.leaf_count(),
        options.len()
    );

    Ok(ConfigDocument { root, options })
}

/// Reads all of the given reader and parses it as configuration text.
///
/// # Arguments
///
/// * `reader` - Source of the YAML text.
pub fn read(mut reader: impl std::io::Read) -> Result<ConfigDocument, ParseError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse(&text)
}

fn parse_options(value: Value) -> Result<IndexMap<String, String>, ParseError> {
    let Value::Mapping(mapping) = value else {
        return Err(ParseError::MalformedOptions {
            reason: std::format!("expected a mapping, found {}", describe(&value)),
        });
    };

    let mut options = IndexMap::new();
    for (key, value) in mapping {
        let Value::String(key) = key else {
            return Err(ParseError::MalformedOptions {
                reason: std::format!("option names must be strings, found {}", describe(&key)),
            });
        };

        let Some(value) = scalar_to_string(&value) else {
            return Err(ParseError::MalformedOptions {
                reason: std::format!(
                    "option '{key}' must have a string value, found {}",
                    describe(&value)
                ),
            });
        };

        options.insert(key, value);
    }

    Ok(options)
}

fn parse_node(value: Value, path: &KeyPath) -> Result<RuleNode, ParseError> {
    match value {
        Value::Sequence(items) => parse_word_list(items, path),
        Value::String(source) => Ok(RuleNode::Dynamic(source)),
        Value::Mapping(mapping) => parse_branch(mapping, path),
        // A bare key (`status:`) is an empty word list.
        Value::Null => Ok(RuleNode::Literal(vec![])),
        other => Err(ParseError::UnsupportedValue {
            path: path.clone(),
            found: describe(&other).to_owned(),
        }),
    }
}

fn parse_branch(mapping: Mapping, path: &KeyPath) -> Result<RuleNode, ParseError> {
    let mut children = IndexMap::new();

    for (key, value) in mapping {
        let raw = match key {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => {
                return Err(ParseError::InvalidKey {
                    path: path.clone(),
                    reason: std::format!("keys must be words, found {}", describe(&other)),
                });
            }
        };

        let Some(rule_key) = RuleKey::parse(&raw) else {
            return Err(ParseError::InvalidKey {
                path: path.clone(),
                reason: String::from("keys must contain at least one word"),
            });
        };

        let child = parse_node(value, &path.join(&raw))?;
        children.insert(rule_key, child);
    }

    Ok(RuleNode::Branch(children))
}

fn parse_word_list(items: Vec<Value>, path: &KeyPath) -> Result<RuleNode, ParseError> {
    let mut words = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        match item {
            Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                if let Some(word) = scalar_to_string(item) {
                    words.push(word);
                }
            }
            other => {
                return Err(ParseError::UnsupportedValue {
                    path: path.clone(),
                    found: std::format!("{} as list item {index}", describe(other)),
                });
            }
        }
    }

    Ok(RuleNode::Literal(words))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

const fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
#[allow(clippy::panic_in_result_fn)]
mod tests {
    use super::*;
    use crate::tree::TokenKey;
    use anyhow::Result;
    use pretty_assertions::{assert_eq, assert_matches};

    fn child<'a>(node: &'a RuleNode, key: &str) -> &'a RuleNode {
        match node {
            RuleNode::Branch(children) => {
                let key = RuleKey::parse(key).unwrap();
                children.get(&key).unwrap()
            }
            other => panic!("expected a branch, found {other:?}"),
        }
    }

    #[test]
    fn parse_literal_list() -> Result<()> {
        let doc = parse("cli: [--help, --version]")?;
        assert_eq!(
            child(&doc.root, "cli"),
            &RuleNode::Literal(vec!["--help".into(), "--version".into()])
        );
        assert!(doc.options.is_empty());
        Ok(())
    }

    #[test]
    fn parse_nested_tree() -> Result<()> {
        let text = r#"
mygit:
  status: [--help, --verbose]
  commit:
    --message: []
    "*": [--amend]
  checkout: "git branch --format='%(refname:short)'"
"#;
        let doc = parse(text)?;
        let mygit = child(&doc.root, "mygit");

        assert_eq!(
            child(mygit, "status"),
            &RuleNode::Literal(vec!["--help".into(), "--verbose".into()])
        );
        assert_eq!(
            child(mygit, "checkout"),
            &RuleNode::Dynamic("git branch --format='%(refname:short)'".into())
        );
        assert_eq!(
            child(child(mygit, "commit"), "*"),
            &RuleNode::Literal(vec!["--amend".into()])
        );
        assert_eq!(doc.root.leaf_count(), 4);
        Ok(())
    }

    #[test]
    fn scalar_words_become_strings() -> Result<()> {
        let doc = parse("mytool:\n  --color: [true, false]\n  --level: [1, 2.5]\n  true: [yes]\n")?;
        let mytool = child(&doc.root, "mytool");

        assert_eq!(
            child(mytool, "--color"),
            &RuleNode::Literal(vec!["true".into(), "false".into()])
        );
        assert_eq!(
            child(mytool, "--level"),
            &RuleNode::Literal(vec!["1".into(), "2.5".into()])
        );
        assert_eq!(child(mytool, "true"), &RuleNode::Literal(vec!["yes".into()]));
        Ok(())
    }

    #[test]
    fn nested_list_items_are_rejected() {
        assert_matches!(
            parse("mytool: [[a, b]]\n"),
            Err(ParseError::UnsupportedValue { .. })
        );
    }

    #[test]
    fn keys_keep_document_order() -> Result<()> {
        let doc = parse("tool:\n  zeta: [z]\n  alpha: [a]\n  mid: [m]\n")?;
        let RuleNode::Branch(children) = child(&doc.root, "tool") else {
            panic!("expected branch");
        };

        let keys: Vec<_> = children.keys().map(RuleKey::raw).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
        Ok(())
    }

    #[test]
    fn options_are_extracted() -> Result<()> {
        let text = r"
comptree_options:
  complete_options: -o nosort
mygit: [status]
";
        let doc = parse(text)?;
        assert_eq!(doc.options.get("complete_options").unwrap(), "-o nosort");
        assert_eq!(doc.programs(), ["mygit"]);
        assert_eq!(doc.roots().count(), 1);
        Ok(())
    }

    #[test]
    fn malformed_options() {
        assert_matches!(
            parse("comptree_options: [a, b]\nx: [y]"),
            Err(ParseError::MalformedOptions { .. })
        );
        assert_matches!(
            parse("comptree_options:\n  nested:\n    a: b\n"),
            Err(ParseError::MalformedOptions { .. })
        );
    }

    #[test]
    fn invalid_yaml() {
        assert_matches!(
            parse("not: a: yaml"),
            Err(ParseError::InvalidSyntax { .. })
        );
    }

    #[test]
    fn top_level_must_be_mapping() {
        assert_matches!(
            parse("- a\n- b\n"),
            Err(ParseError::NotAMapping { found: "a list" })
        );
    }

    #[test]
    fn unsupported_leaf_reports_path() {
        let err = parse("tool:\n  retries: 3\n").unwrap_err();
        let ParseError::UnsupportedValue { path, .. } = &err else {
            panic!("unexpected error: {err:?}");
        };

        assert_eq!(path.0, ["tool", "retries"]);
        assert!(err.to_string().contains("tool > retries"));
    }

    #[test]
    fn nested_list_item_is_rejected() {
        assert_matches!(
            parse("tool: [a, [b]]"),
            Err(ParseError::UnsupportedValue { .. })
        );
    }

    #[test]
    fn bare_key_is_empty_list() -> Result<()> {
        let doc = parse("tool:\n  status:\n")?;
        assert_eq!(
            child(child(&doc.root, "tool"), "status"),
            &RuleNode::Literal(vec![])
        );
        Ok(())
    }

    #[test]
    fn wildcard_and_multi_word_keys() -> Result<()> {
        let doc = parse("tool:\n  '*': [x]\n\"tool push\": [origin]\n")?;
        let RuleNode::Branch(roots) = &doc.root else {
            panic!("expected branch");
        };

        let keys: Vec<_> = roots.keys().collect();
        assert_eq!(keys.len(), 2);
        assert_eq!(
            keys[1].tokens(),
            &[
                TokenKey::Literal("tool".into()),
                TokenKey::Literal("push".into())
            ]
        );
        assert_eq!(
            child(child(&doc.root, "tool"), "*"),
            &RuleNode::Literal(vec!["x".into()])
        );
        Ok(())
    }

    #[test]
    fn empty_document_is_empty_tree() -> Result<()> {
        let doc = parse("")?;
        assert_eq!(doc.root.leaf_count(), 0);
        assert!(doc.programs().is_empty());
        Ok(())
    }

    #[test]
    fn read_from_reader() -> Result<()> {
        let doc = read("cli: [--help]".as_bytes())?;
        assert_eq!(doc.programs(), ["cli"]);
        Ok(())
    }
}
