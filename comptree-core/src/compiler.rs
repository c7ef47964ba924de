//! One-call compilation from configuration text to script.

use comptree_parser::ConfigDocument;

use crate::emit::{default_function_name, emit, wrap};
use crate::error::Error;
use crate::flatten::flatten;
use crate::table::FlatTable;
use crate::trace_categories;
use crate::validate::{Diagnostic, validate};

/// Options controlling how a configuration is compiled.
#[derive(Clone, Debug, Default, bon::Builder)]
pub struct CompileOptions {
    /// Name of the completion function; derived from the first program when
    /// not given.
    #[builder(into)]
    pub function_name: Option<String>,
    /// When set, the script is wrapped in a function of this name that prints
    /// it instead of defining it.
    #[builder(into)]
    pub wrap: Option<String>,
}

/// Everything produced by a single compilation.
#[derive(Clone, Debug)]
pub struct Compilation {
    /// The generated script (wrapped, if requested).
    pub script: String,
    /// Advisory findings; they never prevent a script from being produced.
    pub diagnostics: Vec<Diagnostic>,
    /// The table the script was generated from.
    pub table: FlatTable,
}

impl Compilation {
    /// Returns whether no diagnostics were reported.
    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Compiles configuration text into a completion script.
///
/// Parse failures abort compilation. Validation problems do not; they are
/// returned alongside the script.
///
/// # Arguments
///
/// * `text` - The YAML configuration.
/// * `options` - Compilation options.
pub fn compile(text: &str, options: &CompileOptions) -> Result<Compilation, Error> {
    let doc = comptree_parser::parse(text).inspect_err(|err| {
        tracing::debug!(target: trace_categories::LOAD, "failed to load configuration: {err}");
    })?;

    Ok(compile_document(&doc, options))
}

/// Compiles an already-loaded document.
///
/// # Arguments
///
/// * `doc` - The loaded configuration.
/// * `options` - Compilation options.
pub fn compile_document(doc: &ConfigDocument, options: &CompileOptions) -> Compilation {
    let table = flatten(doc);
    let diagnostics = validate(&table);

    let function_name = options
        .function_name
        .clone()
        .unwrap_or_else(|| default_function_name(&table));

    let mut script = emit(&table, &doc.options, &function_name);
    if let Some(wrapper_name) = &options.wrap {
        script = wrap(&script, wrapper_name);
    }

    Compilation {
        script,
        diagnostics,
        table,
    }
}
