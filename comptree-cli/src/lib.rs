//! Command-line interface for comptree, a compiler from YAML completion rules to
//! standalone bash completion scripts.

pub mod args;
mod commands;
pub mod config;
pub mod entry;
mod error;
mod error_formatter;
pub mod events;
pub mod installer;
mod productinfo;

pub use error::Error;
