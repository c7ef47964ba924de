//! In-memory model of a completion rule tree.

use indexmap::IndexMap;
use std::fmt::Display;

/// The token-key that matches any single token.
pub const WILDCARD: &str = "*";

/// One position in a pattern: either an exact word or the wildcard.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum TokenKey {
    /// Matches a token equal to the given word.
    Literal(String),
    /// Matches any single token.
    Wildcard,
}

impl TokenKey {
    /// Interprets a single word from a configuration key.
    ///
    /// # Arguments
    ///
    /// * `word` - The word; [`WILDCARD`] yields [`TokenKey::Wildcard`].
    pub fn new(word: &str) -> Self {
        if word == WILDCARD {
            Self::Wildcard
        } else {
            Self::Literal(word.to_owned())
        }
    }

    /// Returns whether this is the wildcard.
    pub const fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }

    /// Returns whether the given token satisfies this key.
    pub fn matches(&self, token: &str) -> bool {
        match self {
            Self::Literal(word) => word == token,
            Self::Wildcard => true,
        }
    }
}

impl Display for TokenKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(word) => write!(f, "{word}"),
            Self::Wildcard => write!(f, "{WILDCARD}"),
        }
    }
}

/// A mapping key as written in the configuration. Keys may hold several
/// whitespace-separated words (e.g. `git remote`), each of which becomes its own
/// [`TokenKey`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RuleKey {
    raw: String,
    tokens: Vec<TokenKey>,
}

impl RuleKey {
    /// Splits a raw key into token-keys. Returns `None` for keys with no words.
    pub fn parse(raw: &str) -> Option<Self> {
        let tokens: Vec<_> = raw.split_whitespace().map(TokenKey::new).collect();
        if tokens.is_empty() {
            return None;
        }

        Some(Self {
            raw: raw.to_owned(),
            tokens,
        })
    }

    /// The key exactly as it appeared in the source.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The token-keys this key contributes to a pattern.
    pub fn tokens(&self) -> &[TokenKey] {
        &self.tokens
    }

    /// Returns whether the first token of this key is the wildcard.
    pub fn starts_with_wildcard(&self) -> bool {
        self.tokens.first().is_some_and(TokenKey::is_wildcard)
    }
}

impl Display for RuleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// A node in the rule tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RuleNode {
    /// A fixed, ordered set of candidates.
    Literal(Vec<String>),
    /// A shell command whose output (split on whitespace) is the candidate set.
    /// Only ever evaluated at completion time.
    Dynamic(String),
    /// The next token selects a child.
    Branch(IndexMap<RuleKey, RuleNode>),
}

impl RuleNode {
    /// Returns the number of `Literal` and `Dynamic` nodes in this subtree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Literal(_) | Self::Dynamic(_) => 1,
            Self::Branch(children) => children.values().map(Self::leaf_count).sum(),
        }
    }
}

impl Default for RuleNode {
    fn default() -> Self {
        Self::Branch(IndexMap::new())
    }
}

/// The sequence of raw keys leading from the root to a node. Used when
/// reporting problems back to the author of a configuration.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct KeyPath(pub Vec<String>);

impl KeyPath {
    /// Returns a new path extended by one key.
    #[must_use]
    pub fn join(&self, key: &str) -> Self {
        let mut keys = self.0.clone();
        keys.push(key.to_owned());
        Self(keys)
    }
}

impl Display for KeyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", self.0.join(" > "))
        }
    }
}

/// A parsed configuration: the rule tree plus compiler-directed options.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConfigDocument {
    /// The root of the tree; always a [`RuleNode::Branch`].
    pub root: RuleNode,
    /// Settings forwarded to the script emitter, in source order.
    pub options: IndexMap<String, String>,
}

impl ConfigDocument {
    /// Returns the root-level children of the tree.
    pub fn roots(&self) -> impl Iterator<Item = (&RuleKey, &RuleNode)> {
        let children = match &self.root {
            RuleNode::Branch(children) => Some(children),
            RuleNode::Literal(_) | RuleNode::Dynamic(_) => None,
        };

        children.into_iter().flat_map(|c| c.iter())
    }

    /// Returns the distinct program names named by literal root keys, in order.
    pub fn programs(&self) -> Vec<&str> {
        let mut programs: Vec<&str> = vec![];
        for (key, _) in self.roots() {
            if let Some(TokenKey::Literal(program)) = key.tokens().first() {
                if !programs.contains(&program.as_str()) {
                    programs.push(program);
                }
            }
        }
        programs
    }
}
