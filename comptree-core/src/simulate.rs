//! Evaluates a flattened table the way the generated script would, without
//! involving bash's completion machinery.

use std::process::{Command, Stdio};

use crate::actions;
use crate::table::{FlatEntry, FlatTable, Source};
use crate::trace_categories;

/// Runs dynamic sources.
pub trait SourceRunner {
    /// Runs `source` and returns its standard output, or `None` if it could
    /// not be run or exited unsuccessfully.
    fn run(&self, source: &str) -> Option<String>;
}

impl<F> SourceRunner for F
where
    F: Fn(&str) -> Option<String>,
{
    fn run(&self, source: &str) -> Option<String> {
        self(source)
    }
}

/// Runs dynamic sources through `sh -c`.
#[derive(Clone, Debug, Default)]
pub struct ShellRunner;

impl SourceRunner for ShellRunner {
    fn run(&self, source: &str) -> Option<String> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(source)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .inspect_err(|err| {
                tracing::debug!(target: trace_categories::SIMULATE, "failed to run source: {err}");
            })
            .ok()?;

        if !output.status.success() {
            tracing::debug!(
                target: trace_categories::SIMULATE,
                "source exited with {}",
                output.status
            );
            return None;
        }

        Some(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// A completion request: the command line up to the cursor.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Request {
    /// The command being completed; only its basename is compared.
    pub program: String,
    /// Completed words after the program.
    pub words: Vec<String>,
    /// The partial word under the cursor.
    pub cur: String,
}

impl Request {
    /// Splits a command line on whitespace. A trailing space means the cursor
    /// sits on a new, empty word. Returns `None` if the line is blank or the
    /// cursor is still on the program name.
    pub fn from_line(line: &str) -> Option<Self> {
        let mut tokens: Vec<String> = line.split_whitespace().map(String::from).collect();
        if tokens.is_empty() {
            return None;
        }

        let cur = if line.ends_with(char::is_whitespace) {
            String::new()
        } else {
            tokens.pop()?
        };

        if tokens.is_empty() {
            return None;
        }

        let program = tokens.remove(0);
        Some(Self {
            program,
            words: tokens,
            cur,
        })
    }
}

/// Returns the first entry that applies to `program` with `words` completed.
pub fn find_match<'a, S: AsRef<str>>(
    table: &'a FlatTable,
    program: &str,
    words: &[S],
) -> Option<&'a FlatEntry> {
    let program = basename(program);

    table.entries().iter().find(|entry| {
        let program_matches = entry.program().is_none_or(|token| token.matches(program));
        let args = entry.arguments();

        program_matches
            && args.len() == words.len()
            && args
                .iter()
                .zip(words)
                .all(|(token, word)| token.matches(word.as_ref()))
    })
}

/// Computes the candidates the generated script would offer.
///
/// Action candidates such as `<file>` are skipped, since they depend on the
/// state of the interactive shell.
///
/// # Arguments
///
/// * `table` - The flattened table.
/// * `request` - The command line being completed.
/// * `runner` - Runs dynamic sources.
pub fn complete(table: &FlatTable, request: &Request, runner: &impl SourceRunner) -> Vec<String> {
    let Some(entry) = find_match(table, &request.program, &request.words) else {
        tracing::debug!(target: trace_categories::SIMULATE, "no entry matches");
        return vec![];
    };

    tracing::debug!(
        target: trace_categories::SIMULATE,
        "matched [{}] from '{}'",
        entry.pattern_string(),
        entry.origin
    );

    let candidates: Vec<String> = match &entry.source {
        Source::Literal(words) => {
            let (plain, skipped) = actions::partition(words);
            if !skipped.is_empty() {
                tracing::debug!(target: trace_categories::SIMULATE, "skipping actions: {skipped:?}");
            }
            plain.into_iter().map(String::from).collect()
        }
        Source::Dynamic(command) if command.trim().is_empty() => vec![],
        Source::Dynamic(command) => runner
            .run(command)
            .map(|output| output.split_whitespace().map(String::from).collect())
            .unwrap_or_default(),
    };

    candidates
        .into_iter()
        .filter(|candidate| candidate.starts_with(request.cur.as_str()))
        .collect()
}

fn basename(program: &str) -> &str {
    program.rsplit('/').next().unwrap_or(program)
}

#[cfg(test)]
#[allow(clippy::panic_in_result_fn)]
mod tests {
    use super::*;
    use crate::flatten;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    const CONFIG: &str = r#"
mytool:
  push: [origin, upstream]
  "*": [--force]
  log: echo a b c
  status: []
"#;

    fn table() -> Result<FlatTable> {
        Ok(flatten(&comptree_parser::parse(CONFIG)?))
    }

    fn stub(source: &str) -> Option<String> {
        (source == "echo a b c").then(|| String::from("a\nb\nbc\n"))
    }

    fn request(line: &str) -> Request {
        Request::from_line(line).unwrap_or_default()
    }

    #[test]
    fn literal_match_is_prefix_filtered() -> Result<()> {
        let table = table()?;
        assert_eq!(complete(&table, &request("mytool push o"), &stub), ["origin"]);
        assert_eq!(
            complete(&table, &request("mytool push "), &stub),
            ["origin", "upstream"]
        );
        Ok(())
    }

    #[test]
    fn unmatched_literal_falls_back_to_wildcard() -> Result<()> {
        let table = table()?;
        assert_eq!(complete(&table, &request("mytool deploy "), &stub), ["--force"]);
        assert_eq!(complete(&table, &request("mytool deploy -"), &stub), ["--force"]);
        assert!(complete(&table, &request("mytool deploy x"), &stub).is_empty());
        Ok(())
    }

    #[test]
    fn empty_candidates_offer_nothing() -> Result<()> {
        let table = table()?;
        assert!(complete(&table, &request("mytool status "), &stub).is_empty());
        Ok(())
    }

    #[test]
    fn dynamic_source_goes_through_runner() -> Result<()> {
        let table = table()?;
        assert_eq!(complete(&table, &request("mytool log b"), &stub), ["b", "bc"]);

        let failing = |_: &str| -> Option<String> { None };
        assert!(complete(&table, &request("mytool log "), &failing).is_empty());
        Ok(())
    }

    #[test]
    fn program_is_compared_by_basename() -> Result<()> {
        let table = table()?;
        assert!(find_match(&table, "/usr/local/bin/mytool", &["push"]).is_some());
        assert!(find_match(&table, "othertool", &["push"]).is_none());
        Ok(())
    }

    #[test]
    fn word_count_must_match_exactly() -> Result<()> {
        let table = table()?;
        assert!(find_match(&table, "mytool", &["push", "origin"]).is_none());
        assert!(find_match::<&str>(&table, "mytool", &[]).is_none());
        Ok(())
    }

    #[test]
    fn actions_are_skipped() -> Result<()> {
        let table = flatten(&comptree_parser::parse("mytool: [--all, <file>]\n")?);
        assert_eq!(complete(&table, &request("mytool "), &stub), ["--all"]);
        Ok(())
    }

    #[test]
    fn request_from_line() {
        assert_eq!(
            Request::from_line("mytool push o"),
            Some(Request {
                program: String::from("mytool"),
                words: vec![String::from("push")],
                cur: String::from("o"),
            })
        );
        assert_eq!(
            Request::from_line("mytool  push "),
            Some(Request {
                program: String::from("mytool"),
                words: vec![String::from("push")],
                cur: String::new(),
            })
        );
        assert_eq!(Request::from_line("mytool"), None);
        assert_eq!(Request::from_line("   "), None);
    }

    #[test]
    fn shell_runner_reports_failure() {
        assert_eq!(ShellRunner.run("echo one two").as_deref(), Some("one two\n"));
        assert_eq!(ShellRunner.run("exit 3"), None);
    }
}
