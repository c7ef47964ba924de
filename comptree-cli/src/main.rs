//! Implements the `comptree` executable.

/// Main entry point for `comptree`.
fn main() {
    comptree_cli::entry::run();
}
