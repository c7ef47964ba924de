//! Core of the comptree completion-rule compiler.
//!
//! The pipeline is: [`comptree_parser::parse`] produces a rule tree, [`flatten()`]
//! turns it into an ordered [`FlatTable`], and the table feeds both [`validate()`]
//! (advisory diagnostics) and [`emit()`] (the bash script). [`compile()`] runs all of
//! it in one call.

pub mod actions;
pub mod emit;
pub mod simulate;
pub mod trace_categories;
pub mod validate;

mod compiler;
mod error;
mod escape;
mod flatten;
mod table;

pub use compiler::{Compilation, CompileOptions, compile, compile_document};
pub use emit::{DEFAULT_WRAPPER_NAME, default_function_name, emit, unwrap, wrap};
pub use error::Error;
pub use flatten::flatten;
pub use table::{DeadEnd, FlatEntry, FlatTable, Source};
pub use validate::{Diagnostic, DiagnosticKind, validate};

pub use comptree_parser::{ConfigDocument, KeyPath, ParseError, RuleKey, RuleNode, TokenKey};
