//! Shell-style word splitting.
//!
//! Only three characters are special: ASCII whitespace separates words, a
//! double quote groups a word, and a backslash makes the next character
//! literal both inside and outside quotes.
mod tokenizer;

pub use tokenizer::shell_split;

/// Escape `input` so that `shell_split` reads it back as a single word.
///
/// Words are trimmed before escapes are removed, so trailing whitespace does
/// not survive the trip, and a newline cannot be escaped at all.
pub fn shell_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch.is_ascii_whitespace() || ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
