/// Monolithic error type for the compiler.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The configuration could not be loaded.
    #[error(transparent)]
    Parse(#[from] comptree_parser::ParseError),
}
