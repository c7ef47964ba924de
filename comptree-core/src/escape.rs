//! Shell quoting for words and lines embedded in generated scripts.

use std::borrow::Cow;

/// Single-quotes `s` for bash unless it is a plain word.
pub(crate) fn quote_if_needed(s: &str) -> Cow<'_, str> {
    if s.is_empty() || s.chars().any(needs_escaping) || s.starts_with(['~', '#']) {
        force_quote(s).into()
    } else {
        s.into()
    }
}

/// Single-quotes `s` for bash. Embedded single quotes become `'\''`.
pub(crate) fn force_quote(s: &str) -> String {
    let mut output = String::with_capacity(s.len() + 2);
    output.push('\'');
    for c in s.chars() {
        if c == '\'' {
            output.push_str(r"'\''");
        } else {
            output.push(c);
        }
    }
    output.push('\'');
    output
}

/// Renders `s` as an ANSI-C quoted string (`$'...'`) that expands back to
/// exactly `s`.
pub(crate) fn ansi_c_quote(s: &str) -> String {
    let mut output = String::with_capacity(s.len() + 3);
    output.push_str("$'");
    for c in s.chars() {
        match c {
            '\\' => output.push_str(r"\\"),
            '\'' => output.push_str(r"\'"),
            c => output.push(c),
        }
    }
    output.push('\'');
    output
}

/// Reverses [`ansi_c_quote`]. Returns `None` if `s` is not in that form.
pub(crate) fn ansi_c_unquote(s: &str) -> Option<String> {
    let body = s.strip_prefix("$'")?.strip_suffix('\'')?;

    let mut output = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next()? {
                c @ ('\\' | '\'') => output.push(c),
                _ => return None,
            }
        } else {
            output.push(c);
        }
    }

    Some(output)
}

fn needs_escaping(c: char) -> bool {
    matches!(
        c,
        '(' | ')'
            | '['
            | ']'
            | '{'
            | '}'
            | '$'
            | '*'
            | '?'
            | '|'
            | '&'
            | ';'
            | '<'
            | '>'
            | '`'
            | '\\'
            | '"'
            | '\''
            | '!'
            | '^'
            | ','
            | ' '
            | '\t'
            | '\n'
    )
}
