//! Tokenizer for command lines.
//!
//! At each position, after skipping whitespace, the tokenizer tries an
//! unquoted run first and a double-quoted run second. Anything else (an
//! unterminated quote, a trailing backslash or one before a newline, empty
//! quotes) makes the whole line malformed; partial token lists are never
//! returned.
use crate::error::{ErrorKind, ShellError, ShellResult};

pub fn shell_split(line: &str) -> ShellResult<Vec<String>> {
    let mut tokens = Vec::with_capacity(5);
    let mut pos = 0;
    loop {
        let rest = &line[pos..];
        let trimmed = rest.trim_start_matches(is_space);
        if trimmed.is_empty() {
            break;
        }
        let start = pos + (rest.len() - trimmed.len());
        let Some((span, consumed)) = match_unquoted(trimmed).or_else(|| match_quoted(trimmed))
        else {
            return Err(malformed(trimmed, start));
        };
        tokens.push(unescape(span));
        pos = start + consumed;
    }
    Ok(tokens)
}

fn is_space(ch: char) -> bool {
    ch.is_ascii_whitespace()
}

/// Longest run of escaped pairs and characters other than whitespace, `"`
/// and `\`. Returns the run and its length in bytes.
fn match_unquoted(input: &str) -> Option<(&str, usize)> {
    let mut chars = input.char_indices();
    let mut end = 0;
    while let Some((idx, ch)) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some((next_idx, next)) if next != '\n' => end = next_idx + next.len_utf8(),
                _ => break,
            }
            continue;
        }
        if is_space(ch) || ch == '"' {
            break;
        }
        end = idx + ch.len_utf8();
    }
    if end == 0 {
        return None;
    }
    Some((&input[..end], end))
}

/// Non-empty double-quoted run. Returns the text between the quotes and the
/// length in bytes including both quotes.
fn match_quoted(input: &str) -> Option<(&str, usize)> {
    let body = input.strip_prefix('"')?;
    let mut chars = body.char_indices();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\\' => {
                chars.next().filter(|(_, next)| *next != '\n')?;
            }
            '"' if idx == 0 => return None,
            '"' => return Some((&body[..idx], idx + 2)),
            _ => {}
        }
    }
    None
}

/// Trim surrounding whitespace, then drop escape markers (`\X` becomes `X`).
/// A backslash left dangling by the trim is dropped as well.
fn unescape(span: &str) -> String {
    let trimmed = span.trim_matches(is_space);
    let mut out = String::with_capacity(trimmed.len());
    let mut chars = trimmed.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
            continue;
        }
        out.push(ch);
    }
    out
}

fn malformed(rest: &str, position: usize) -> ShellError {
    let hint = if rest.starts_with("\"\"") {
        "Empty quotes do not form a parameter"
    } else if rest.starts_with('"') {
        "Missing closing quote"
    } else {
        "Backslash must be followed by a character other than a newline"
    };
    ShellError::new(ErrorKind::Parse, "malformed line")
        .with_context(hint)
        .with_position(position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_basic() {
        let tokens = shell_split("echo a b c").unwrap();
        assert_eq!(tokens, vec!["echo", "a", "b", "c"]);
    }

    #[test]
    fn excessive_spacing_quoting_and_escaping() {
        let line = "    echo      \"longer parameter 1\"\t\tsmall\\ param2          \"another long \\\"weird\\\" parameter\"    ";
        let tokens = shell_split(line).unwrap();
        assert_eq!(
            tokens,
            vec![
                "echo",
                "longer parameter 1",
                "small param2",
                "another long \"weird\" parameter",
            ]
        );
    }

    #[test]
    fn empty_and_blank_lines_have_no_tokens() {
        assert!(shell_split("").unwrap().is_empty());
        assert!(shell_split(" \t \n ").unwrap().is_empty());
    }

    #[test]
    fn quote_starts_a_new_token() {
        let tokens = shell_split("abc\"def ghi\"jkl").unwrap();
        assert_eq!(tokens, vec!["abc", "def ghi", "jkl"]);
    }

    #[test]
    fn escaped_backslash_and_quote_outside_quotes() {
        let tokens = shell_split(r#"a\\b \"x\""#).unwrap();
        assert_eq!(tokens, vec![r"a\b", "\"x\""]);
    }

    #[test]
    fn spans_are_trimmed_before_escapes_are_removed() {
        let tokens = shell_split(r#""  padded  " tail\ "#).unwrap();
        assert_eq!(tokens, vec!["padded", "tail"]);

        let tokens = shell_split(r#""\ edge\ " mid\ dle"#).unwrap();
        assert_eq!(tokens, vec![" edge", "mid dle"]);
    }

    #[test]
    fn backslash_newline_is_malformed() {
        let err = shell_split("a\\\nb").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert_eq!(err.position, Some(1));

        let err = shell_split("x \"a\\\nb\"").unwrap_err();
        assert_eq!(err.position, Some(2));
        assert_eq!(err.context.as_deref(), Some("Missing closing quote"));
    }

    #[test]
    fn unicode_is_kept_intact() {
        let tokens = shell_split("grüße \"naïve café\" ✓\\ ok").unwrap();
        assert_eq!(tokens, vec!["grüße", "naïve café", "✓ ok"]);
    }

    #[test]
    fn error_cases() {
        let err = shell_split("echo \"unterminated").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert_eq!(err.message, "malformed line");
        assert_eq!(err.position, Some(5));
        assert_eq!(err.context.as_deref(), Some("Missing closing quote"));

        let err = shell_split("echo trailing\\").unwrap_err();
        assert_eq!(err.position, Some(13));
        assert_eq!(
            err.context.as_deref(),
            Some("Backslash must be followed by a character other than a newline")
        );

        let err = shell_split("echo \"\" x").unwrap_err();
        assert_eq!(
            err.context.as_deref(),
            Some("Empty quotes do not form a parameter")
        );

        assert!(shell_split("echo \"dangling \\\"").is_err());
    }
}
