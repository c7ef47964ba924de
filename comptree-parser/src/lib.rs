//! Implements the rule-tree model and the loader for comptree configuration files.
//!
//! A configuration is a YAML mapping whose top-level keys name programs and whose
//! values describe, level by level, which tokens may follow which. The loader turns
//! that text into a [`ConfigDocument`]; nothing in this crate touches the filesystem
//! or runs processes.

pub mod tree;

mod error;
mod loader;

pub use error::{ParseError, SourcePosition};
pub use loader::{OPTIONS_KEY, parse, read};
pub use tree::{ConfigDocument, KeyPath, RuleKey, RuleNode, TokenKey, WILDCARD};
