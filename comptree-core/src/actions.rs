//! Candidate words that stand for bash's built-in completion actions.
//!
//! A literal candidate written as `<file>` (or any other action name below in
//! angle brackets) is not offered as-is; the generated script asks
//! `compgen -A <action>` for it instead.

use std::str::FromStr;

/// A `compgen -A` action.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, strum_macros::EnumString, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum CompleteAction {
    /// Names of aliases.
    Alias,
    /// Names of array variables.
    ArrayVar,
    /// Readline key binding names.
    Binding,
    /// Names of shell builtins.
    Builtin,
    /// Command names.
    Command,
    /// Directory names.
    Directory,
    /// Names of disabled builtins.
    Disabled,
    /// Names of enabled builtins.
    Enabled,
    /// Names of exported variables.
    Export,
    /// File names.
    File,
    /// Names of shell functions.
    Function,
    /// Group names.
    Group,
    /// Help topics.
    HelpTopic,
    /// Hostnames.
    HostName,
    /// Job names.
    Job,
    /// Shell reserved words.
    Keyword,
    /// Names of running jobs.
    Running,
    /// Service names.
    Service,
    /// Valid arguments for `set -o`.
    SetOpt,
    /// Shell option names accepted by `shopt`.
    ShOpt,
    /// Signal names.
    Signal,
    /// Names of stopped jobs.
    Stopped,
    /// User names.
    User,
    /// Names of shell variables.
    Variable,
}

/// One literal candidate, classified.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Candidate<'a> {
    /// Offered verbatim.
    Word(&'a str),
    /// Expanded by `compgen -A` at completion time.
    Action(CompleteAction),
}

impl<'a> Candidate<'a> {
    /// Classifies a literal candidate word.
    pub fn classify(word: &'a str) -> Self {
        word.strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
            .and_then(|name| CompleteAction::from_str(name).ok())
            .map_or(Self::Word(word), Self::Action)
    }
}

/// Splits a literal word list into plain words and actions, preserving order
/// within each group.
pub fn partition(words: &[String]) -> (Vec<&str>, Vec<CompleteAction>) {
    let mut plain = vec![];
    let mut actions = vec![];

    for word in words {
        match Candidate::classify(word) {
            Candidate::Word(word) => plain.push(word),
            Candidate::Action(action) => {
                if !actions.contains(&action) {
                    actions.push(action);
                }
            }
        }
    }

    (plain, actions)
}
