use crate::tree::KeyPath;

/// A position within the configuration text.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SourcePosition {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
}

impl std::fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Represents an error that occurred while loading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The text is not valid YAML.
    #[error("invalid configuration syntax: {message}")]
    InvalidSyntax {
        /// Description from the YAML parser.
        message: String,
        /// Optionally provides the position of the error.
        position: Option<SourcePosition>,
    },

    /// The document is valid YAML but its top level is not a mapping.
    #[error("configuration must be a mapping at the top level; found {found}")]
    NotAMapping {
        /// The kind of value found instead.
        found: &'static str,
    },

    /// A mapping key could not be used as a token-key.
    #[error("invalid key under '{path}': {reason}")]
    InvalidKey {
        /// Path to the mapping containing the key.
        path: KeyPath,
        /// Why the key was rejected.
        reason: String,
    },

    /// A value has a shape that is not a list of strings, a string, or a mapping.
    #[error(
        "unsupported value at '{path}': expected a list of words, a command string, or a mapping; found {found}"
    )]
    UnsupportedValue {
        /// Path to the offending value.
        path: KeyPath,
        /// Description of what was found.
        found: String,
    },

    /// The reserved options key is present but is not a flat mapping of strings.
    #[error("malformed 'comptree_options': {reason}")]
    MalformedOptions {
        /// Why the options were rejected.
        reason: String,
    },

    /// The configuration text could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_yaml::Error> for ParseError {
    fn from(err: serde_yaml::Error) -> Self {
        let position = err.location().map(|loc| SourcePosition {
            line: loc.line(),
            column: loc.column(),
        });

        Self::InvalidSyntax {
            message: err.to_string(),
            position,
        }
    }
}
