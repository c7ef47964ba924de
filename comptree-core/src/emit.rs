//! Compiles a flattened table into a standalone bash completion script.
//!
//! The generated function reads the completed words (`COMP_WORDS[1]` up to, but
//! not including, the word under the cursor) and walks an `if`/`elif` chain
//! built from the table, in table order. The first entry whose pattern has
//! exactly as many argument tokens as there are completed words, and whose
//! literal tokens equal the corresponding words, supplies the candidates. The
//! candidates are then filtered by the word under the cursor as a prefix.

use comptree_parser::TokenKey;
use indexmap::IndexMap;
use itertools::Itertools;

use crate::actions::{self, CompleteAction};
use crate::escape::{ansi_c_quote, ansi_c_unquote, force_quote, quote_if_needed};
use crate::table::{FlatEntry, FlatTable, Source};
use crate::trace_categories;

/// Name of the option whose value is inserted verbatim into the `complete`
/// registration line (e.g. `-o nosort`).
pub const COMPLETE_OPTIONS: &str = "complete_options";

/// Function name used by [`wrap`] callers when none is given.
pub const DEFAULT_WRAPPER_NAME: &str = "send_completions";

/// Returns the completion function name derived from the table's first
/// program (`_<program>_completions`).
pub fn default_function_name(table: &FlatTable) -> String {
    let program = table.programs().first().map_or("comptree", String::as_str);

    let sanitized: String = program
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    std::format!("_{sanitized}_completions")
}

/// Generates the completion script for a table.
///
/// # Arguments
///
/// * `table` - The flattened table, in match order.
/// * `options` - Compiler options; `complete_options` is forwarded verbatim
///   into the registration line.
/// * `function_name` - Name of the generated completion function.
pub fn emit(table: &FlatTable, options: &IndexMap<String, String>, function_name: &str) -> String {
    for key in options.keys().filter(|key| *key != COMPLETE_OPTIONS) {
        tracing::warn!(target: trace_categories::EMIT, "ignoring unknown option '{key}'");
    }

    let features = Features::of(table);
    let mut w = ScriptWriter::default();

    let title = std::format!("# {} completion", display_programs(table));
    w.line(0, std::format!("{title:<60}-*- shell-script -*-"));
    w.blank();
    w.line(0, "# This bash completion script was generated by comptree.");
    w.line(0, "# Modifying it manually is not recommended.");
    w.blank();

    w.line(0, std::format!("{function_name}() {{"));
    emit_prologue(&mut w, &features);

    let mut keyword = "if";
    for entry in table.entries() {
        w.line(1, std::format!("{keyword} {}; then", condition(entry)));
        emit_source(&mut w, entry);
        keyword = "elif";
    }
    if !table.is_empty() {
        w.line(1, "fi");
        w.blank();
    }

    emit_epilogue(&mut w, &features);
    emit_registration(&mut w, table, options, function_name);

    w.blank();
    w.line(0, "# ex: filetype=sh");

    let script = w.finish();

    tracing::debug!(
        target: trace_categories::EMIT,
        "emitted {function_name} with {} branch(es), {} byte(s)",
        table.len(),
        script.len()
    );

    script
}

/// Re-emits `script` as the body of a function that prints it line by line.
/// Sourcing the result and calling `wrapper_name` prints `script` unchanged.
///
/// # Arguments
///
/// * `script` - The script to embed; expected to end with a newline.
/// * `wrapper_name` - Name of the printing function.
pub fn wrap(script: &str, wrapper_name: &str) -> String {
    let body = script.strip_suffix('\n').unwrap_or(script);

    let mut w = ScriptWriter::default();
    w.line(0, std::format!("{wrapper_name}() {{"));
    for line in body.split('\n') {
        w.line(1, std::format!("{WRAPPED_LINE_PREFIX}{}", ansi_c_quote(line)));
    }
    w.line(0, "}");

    w.finish()
}

/// Prints its argument verbatim; unlike `echo`, a line such as `-n` is not
/// taken as an option.
const WRAPPED_LINE_PREFIX: &str = r"printf '%s\n' ";

/// Extracts the script embedded by [`wrap`]. Returns `None` if `wrapped` was
/// not produced by [`wrap`]. The result always ends with a newline.
pub fn unwrap(wrapped: &str) -> Option<String> {
    let mut lines = wrapped.lines();

    lines.next()?.strip_suffix("() {")?;

    let mut script = String::new();
    for line in lines {
        if line == "}" {
            return Some(script);
        }

        let quoted = line.strip_prefix("  ")?.strip_prefix(WRAPPED_LINE_PREFIX)?;
        script.push_str(&ansi_c_unquote(quoted)?);
        script.push('\n');
    }

    None
}

/// What the shared parts of the function need to declare.
struct Features {
    program_check: bool,
    dynamic: bool,
    actions: bool,
}

impl Features {
    fn of(table: &FlatTable) -> Self {
        let entries = table.entries();
        Self {
            program_check: entries
                .iter()
                .any(|e| matches!(e.program(), Some(TokenKey::Literal(_)))),
            dynamic: entries
                .iter()
                .any(|e| matches!(e.source, Source::Dynamic(_))),
            actions: entries.iter().any(|e| match &e.source {
                Source::Literal(words) => !actions::partition(words).1.is_empty(),
                Source::Dynamic(_) => false,
            }),
        }
    }
}

fn emit_prologue(w: &mut ScriptWriter, features: &Features) {
    w.line(1, "local cur=${COMP_WORDS[COMP_CWORD]}");
    if features.program_check {
        w.line(1, "local program=${1##*/}");
    }
    w.line(1, "local -a words=()");
    w.line(1, "local -a candidates=()");
    if features.actions {
        w.line(1, "local -a actions=()");
    }
    w.line(1, r"local IFS=$' \t\n'");

    let mut scratch = vec!["word"];
    if features.dynamic {
        scratch.insert(0, "output");
    }
    if features.actions {
        scratch.push("action");
    }
    w.line(1, std::format!("local {}", scratch.join(" ")));
    w.blank();

    w.line(1, "COMPREPLY=()");
    w.line(1, "if ((COMP_CWORD > 1)); then");
    w.line(2, r#"words=("${COMP_WORDS[@]:1:COMP_CWORD-1}")"#);
    w.line(1, "fi");
    w.blank();
}

fn condition(entry: &FlatEntry) -> String {
    let args = entry.arguments();
    let count = std::format!("((${{#words[@]}} == {}))", args.len());

    let mut tests = vec![];
    if let Some(TokenKey::Literal(program)) = entry.program() {
        tests.push(std::format!("$program == {}", force_quote(program)));
    }
    for (index, token) in args.iter().enumerate() {
        if let TokenKey::Literal(word) = token {
            tests.push(std::format!("${{words[{index}]}} == {}", force_quote(word)));
        }
    }

    if tests.is_empty() {
        count
    } else {
        std::format!("{count} && [[ {} ]]", tests.join(" && "))
    }
}

fn emit_source(w: &mut ScriptWriter, entry: &FlatEntry) {
    match &entry.source {
        Source::Literal(words) => {
            let (plain, actions) = actions::partition(words);
            w.line(
                2,
                std::format!("candidates=({})", plain.iter().map(|s| quote_if_needed(s)).join(" ")),
            );
            if !actions.is_empty() {
                w.line(
                    2,
                    std::format!("actions=({})", actions.iter().map(CompleteAction::to_string).join(" ")),
                );
            }
        }
        Source::Dynamic(command) if command.trim().is_empty() => {
            w.line(2, "# empty command; offers no candidates");
            w.line(2, "candidates=()");
        }
        Source::Dynamic(command) => {
            w.line(2, "if output=$(");
            w.line(3, "{");
            // Continuation lines are kept as written; they may sit inside a
            // quoted string or end a here-document.
            let mut lines = command.trim_end().lines();
            if let Some(first) = lines.next() {
                w.line(4, first);
            }
            for line in lines {
                w.line(0, line);
            }
            w.line(3, "} 2>/dev/null");
            w.line(2, "); then");
            w.line(3, r#"read -r -d '' -a candidates <<<"$output""#);
            w.line(2, "fi");
        }
    }
}

fn emit_epilogue(w: &mut ScriptWriter, features: &Features) {
    w.line(1, r#"for word in "${candidates[@]}"; do"#);
    w.line(2, r#"if [[ $word == "$cur"* ]]; then"#);
    w.line(3, r#"COMPREPLY+=("$word")"#);
    w.line(2, "fi");
    w.line(1, "done");

    if features.actions {
        w.blank();
        w.line(1, r#"for action in "${actions[@]}"; do"#);
        w.line(2, "while IFS= read -r word; do");
        w.line(3, r#"COMPREPLY+=("$word")"#);
        w.line(2, r#"done < <(compgen -A "$action" -- "$cur")"#);
        w.line(1, "done");
    }
}

fn emit_registration(
    w: &mut ScriptWriter,
    table: &FlatTable,
    options: &IndexMap<String, String>,
    function_name: &str,
) {
    if table.programs().is_empty() {
        w.line(0, "}");
        return;
    }

    let mut parts = vec![String::from("complete")];
    if let Some(complete_options) = options.get(COMPLETE_OPTIONS) {
        let complete_options = complete_options.trim();
        if !complete_options.is_empty() {
            parts.push(complete_options.to_owned());
        }
    }
    parts.push(String::from("-F"));
    parts.push(function_name.to_owned());
    parts.extend(table.programs().iter().map(|p| quote_if_needed(p).into_owned()));

    w.line(0, "} &&");
    w.line(1, parts.join(" "));
}

fn display_programs(table: &FlatTable) -> String {
    if table.programs().is_empty() {
        String::from("comptree")
    } else {
        table.programs().join(", ")
    }
}

/// Accumulates script lines with two-space indentation.
#[derive(Default)]
struct ScriptWriter {
    lines: Vec<String>,
}

impl ScriptWriter {
    fn line(&mut self, depth: usize, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.blank();
        } else {
            self.lines.push(std::format!("{}{text}", "  ".repeat(depth)));
        }
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    fn finish(self) -> String {
        let mut script = self.lines.join("\n");
        script.push('\n');
        script
    }
}

#[cfg(test)]
#[allow(clippy::panic_in_result_fn)]
mod tests {
    use super::*;
    use crate::flatten;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    fn emit_text(text: &str) -> Result<String> {
        let doc = comptree_parser::parse(text)?;
        let table = flatten(&doc);
        Ok(emit(&table, &doc.options, &default_function_name(&table)))
    }

    #[test]
    fn full_script_shape() -> Result<()> {
        let script = emit_text(
            r#"
comptree_options:
  complete_options: -o nosort
mytool:
  push: [origin, upstream]
  "*": [--force]
"#,
        )?;

        let expected = r#"# mytool completion                                         -*- shell-script -*-

# This bash completion script was generated by comptree.
# Modifying it manually is not recommended.

_mytool_completions() {
  local cur=${COMP_WORDS[COMP_CWORD]}
  local program=${1##*/}
  local -a words=()
  local -a candidates=()
  local IFS=$' \t\n'
  local word

  COMPREPLY=()
  if ((COMP_CWORD > 1)); then
    words=("${COMP_WORDS[@]:1:COMP_CWORD-1}")
  fi

  if ((${#words[@]} == 1)) && [[ $program == 'mytool' && ${words[0]} == 'push' ]]; then
    candidates=(origin upstream)
  elif ((${#words[@]} == 1)) && [[ $program == 'mytool' ]]; then
    candidates=(--force)
  fi

  for word in "${candidates[@]}"; do
    if [[ $word == "$cur"* ]]; then
      COMPREPLY+=("$word")
    fi
  done
} &&
  complete -o nosort -F _mytool_completions mytool

# ex: filetype=sh
"#;
        assert_eq!(script, expected);
        Ok(())
    }

    #[test]
    fn dynamic_source_is_embedded_verbatim() -> Result<()> {
        let script = emit_text("mygit:\n  checkout: git branch --format='%(refname:short)'\n")?;

        assert!(script.contains("  local output word\n"));
        assert!(script.contains(
            "    if output=$(\n      {\n        git branch --format='%(refname:short)'\n      } 2>/dev/null\n    ); then\n"
        ));
        assert!(script.contains(r#"read -r -d '' -a candidates <<<"$output""#));
        Ok(())
    }

    #[test]
    fn multi_line_command_keeps_its_layout() -> Result<()> {
        let script = emit_text("mytool:\n  list: |\n    cat <<EOF\n    one\n      two\n    EOF\n")?;

        assert!(script.contains(
            "    if output=$(\n      {\n        cat <<EOF\none\n  two\nEOF\n      } 2>/dev/null\n"
        ));
        Ok(())
    }

    #[test]
    fn blank_dynamic_source_still_emits() -> Result<()> {
        let script = emit_text("mytool:\n  log: '  '\n")?;
        assert!(script.contains("# empty command; offers no candidates\n    candidates=()\n"));
        assert!(!script.contains("output=$("));
        Ok(())
    }

    #[test]
    fn actions_use_compgen() -> Result<()> {
        let script = emit_text("mytool:\n  open: [--readonly, <file>, <directory>]\n")?;
        assert!(script.contains("    candidates=(--readonly)\n    actions=(file directory)\n"));
        assert!(script.contains(r#"done < <(compgen -A "$action" -- "$cur")"#));
        assert!(script.contains("  local word action\n"));
        Ok(())
    }

    #[test]
    fn words_are_quoted() -> Result<()> {
        let script = emit_text("mytool:\n  \"it's\": ['a b', '*.txt', plain]\n")?;
        assert!(script.contains(r"${words[0]} == 'it'\''s'"));
        assert!(script.contains("candidates=('a b' '*.txt' plain)"));
        Ok(())
    }

    #[test]
    fn wildcard_root_skips_program_check() -> Result<()> {
        let script = emit_text("'*': [--help]\n")?;
        assert!(script.contains("  if ((${#words[@]} == 0)); then\n"));
        assert!(!script.contains("local program"));
        assert!(!script.contains("complete -F"));
        assert!(script.contains("_comptree_completions() {"));
        Ok(())
    }

    #[test]
    fn several_programs_are_registered() -> Result<()> {
        let script = emit_text("foo: [a]\nbar: [b]\n")?;
        assert!(script.contains("complete -F _foo_completions foo bar\n"));
        assert!(script.starts_with("# foo, bar completion"));
        Ok(())
    }

    #[test]
    fn default_function_name_is_sanitized() -> Result<()> {
        let doc = comptree_parser::parse("my.tool: [x]\n")?;
        assert_eq!(default_function_name(&flatten(&doc)), "_my_tool_completions");
        Ok(())
    }

    #[test]
    fn wrap_round_trips() -> Result<()> {
        let script = emit_text("mytool:\n  \"it's\": ['back\\slash']\n")?;
        let wrapped = wrap(&script, "give_comps");

        assert!(wrapped.starts_with("give_comps() {\n  printf '%s\\n' $'# mytool completion"));
        assert!(wrapped.ends_with("  printf '%s\\n' $'# ex: filetype=sh'\n}\n"));
        assert_eq!(unwrap(&wrapped).as_deref(), Some(script.as_str()));
        Ok(())
    }

    #[test]
    fn wrapped_lines_are_not_options() {
        let script = "a\n-n\n-e\n\nb\n";
        let wrapped = wrap(script, "f");

        assert_eq!(
            wrapped,
            "f() {\n  printf '%s\\n' $'a'\n  printf '%s\\n' $'-n'\n  printf '%s\\n' $'-e'\n  printf '%s\\n' $''\n  printf '%s\\n' $'b'\n}\n"
        );
        assert_eq!(unwrap(&wrapped).as_deref(), Some(script));
    }

    #[test]
    fn unwrap_rejects_other_text() {
        assert_eq!(unwrap("echo hi\n"), None);
        assert_eq!(unwrap("f() {\n  printf '%s\\n' $'unterminated'\n"), None);
        assert_eq!(unwrap("f() {\n  echo $'old style'\n}\n"), None);
    }
}
