//! Private variable sets for contexts.
//!
//! An `Environment` behaves like a shell's variable table: unbound names read
//! as the empty string and `$NAME` / `${NAME}` references are substituted in a
//! single left-to-right pass. Substituted text is never rescanned, so a value
//! containing `$OTHER` stays literal.
use std::collections::hash_map::{self, HashMap};
use std::env;
use std::sync::OnceLock;

use log::debug;

use crate::utils::{is_var_char, is_var_start};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        let vars: HashMap<String, String> = env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        debug!("environment event=snapshot count={}", vars.len());
        Self { vars }
    }

    /// Value bound to `key`, or `""` when unbound.
    pub fn get(&self, key: &str) -> &str {
        self.vars.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn unset(&mut self, key: &str) -> Option<String> {
        self.vars.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, String> {
        self.vars.iter()
    }

    /// Copy every variable of `other` into `self`, overwriting on collision.
    pub fn add(&mut self, other: &Environment) {
        for (key, value) in &other.vars {
            self.vars.insert(key.clone(), value.clone());
        }
    }

    /// Replace `$NAME` and `${NAME}` with bound values.
    ///
    /// A `$` that does not start a valid reference is copied through.
    pub fn expand(&self, line: &str) -> String {
        let mut out = String::with_capacity(line.len());
        let mut rest = line;
        while let Some(idx) = rest.find('$') {
            out.push_str(&rest[..idx]);
            let after = &rest[idx + 1..];
            match parse_reference(after) {
                Some((name, consumed)) => {
                    out.push_str(self.get(name));
                    rest = &after[consumed..];
                }
                None => {
                    out.push('$');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// One `KEY=VALUE` entry per variable, in no particular order.
    pub fn to_array(&self) -> Vec<String> {
        self.vars
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect()
    }
}

/// Parse the reference following a `$`. Returns the variable name and the
/// number of bytes it occupies (braces included).
fn parse_reference(input: &str) -> Option<(&str, usize)> {
    if let Some(inner) = input.strip_prefix('{') {
        let len = identifier_len(inner);
        if len > 0 && inner[len..].starts_with('}') {
            return Some((&inner[..len], len + 2));
        }
        return None;
    }
    let len = identifier_len(input);
    if len == 0 {
        return None;
    }
    Some((&input[..len], len))
}

fn identifier_len(input: &str) -> usize {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) if is_var_start(first) => 1 + chars.take_while(|ch| is_var_char(*ch)).count(),
        _ => 0,
    }
}

/// Process environment captured on first use and shared afterwards.
pub fn default_environment() -> &'static Environment {
    static DEFAULT: OnceLock<Environment> = OnceLock::new();
    DEFAULT.get_or_init(Environment::from_process)
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Environment {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<'a> IntoIterator for &'a Environment {
    type Item = (&'a String, &'a String);
    type IntoIter = hash_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.iter()
    }
}
