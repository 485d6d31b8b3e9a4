//! Legacy `%token%` rewriting.
//!
//! Older templates address helpers with percent-delimited tokens instead of
//! Handlebars mustaches. This module rewrites them into native syntax before
//! anything is compiled:
//!
//! | Legacy | Native |
//! |---|---|
//! | `%year%` | `{{year}}` |
//! | `%currency:19.99%` | `{{currency "19.99"}}` |
//! | `%formatDate:2024-01-02:x%` | `{{formatDate "2024-01-02:x"}}` |
//!
//! The rewrite is purely textual. Whether `year` is a registered helper, a data
//! field or nothing at all is decided later by the render engine. Only the first
//! `:` separates the helper from its argument, and the argument is emitted as a
//! JSON string literal so quotes and backslashes inside it survive.
//!
//! Whitespace around the helper name and the argument of `%name:arg%` is
//! ignored. A bare `%name%` must not be padded: `% year %` reads the same as
//! the prose in `50% off %`, so it stays literal.
//!
//! A `%...%` span whose body is not a helper-like identifier (for example
//! `50% off and 20%`) is left as literal text, and scanning resumes at its
//! closing `%` so that `50% off %year%` still rewrites `%year%`.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Identifier accepted as the helper or path part of a legacy token.
static TOKEN_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_@][A-Za-z0-9_.\-/]*$").expect("token identifier pattern is valid")
});

const DELIMITER: char = '%';
const ARGUMENT_SEPARATOR: char = ':';

/// Rewrite every legacy token in `text` into native mustache syntax.
///
/// Text without well-formed tokens is returned unchanged, and applying the
/// transform to its own output is a no-op.
pub fn transform(text: &str) -> Cow<'_, str> {
    if !text.contains(DELIMITER) {
        return Cow::Borrowed(text);
    }

    let mut output = String::with_capacity(text.len() + 16);
    let mut rewritten = 0usize;
    let mut cursor = 0usize;

    while let Some(open_offset) = text[cursor..].find(DELIMITER) {
        let open = cursor + open_offset;
        let Some(close_offset) = text[open + 1..].find(DELIMITER) else {
            break;
        };
        let close = open + 1 + close_offset;
        let body = &text[open + 1..close];

        match rewrite_token(body) {
            Some(native) => {
                output.push_str(&text[cursor..open]);
                output.push_str(&native);
                cursor = close + 1;
                rewritten += 1;
            }
            None => {
                // The closing delimiter may open the next token.
                output.push_str(&text[cursor..close]);
                cursor = close;
            }
        }
    }

    if rewritten == 0 {
        return Cow::Borrowed(text);
    }

    output.push_str(&text[cursor..]);
    tracing::trace!("Rewrote {} legacy token(s)", rewritten);
    Cow::Owned(output)
}

/// Native syntax for one token body, or `None` if the body is not a token.
fn rewrite_token(body: &str) -> Option<String> {
    match body.split_once(ARGUMENT_SEPARATOR) {
        Some((name, argument)) => {
            let name = name.trim();
            if !TOKEN_IDENTIFIER.is_match(name) {
                return None;
            }
            let literal = serde_json::to_string(argument.trim()).ok()?;
            Some(format!("{{{{{name} {literal}}}}}"))
        }
        None => TOKEN_IDENTIFIER.is_match(body).then(|| format!("{{{{{body}}}}}")),
    }
}

/// Whether `text` needs to go through the engine at all.
///
/// True when the text contains a mustache opener or at least one legacy token
/// that [`transform`] would rewrite.
pub fn contains_template_syntax(text: &str) -> bool {
    if text.contains("{{") {
        return true;
    }
    matches!(transform(text), Cow::Owned(_))
}
