// src/expand/expansions.rs

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::expand::{Expander, ExpansionError};

/// Matches a complete `${...}` placeholder. The body is validated separately
/// so that a bad name is reported as malformed instead of left in place.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^{}]*)\}").expect("placeholder regex is valid"));

static NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("name regex is valid"));

/// Named values substituted into `${name}` placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansions {
    values: BTreeMap<String, String>,
}

impl Expansions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`, replacing any previous binding.
    pub fn put(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder-style [`put`](Self::put).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.put(name, value);
        self
    }

    /// Merge `other` into `self`; bindings in `other` win.
    pub fn update(&mut self, other: &Expansions) {
        for (k, v) in other.values.iter() {
            self.values.insert(k.clone(), v.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Expand every placeholder in `text`.
    pub fn expand_str(&self, text: &str) -> Result<String, ExpansionError> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            check_literal(text, last, whole.start())?;
            out.push_str(&text[last..whole.start()]);

            let body = &caps[1];
            let (name, fallback) = match body.split_once('|') {
                Some((name, fallback)) => (name, Some(fallback)),
                None => (body, None),
            };

            if !NAME.is_match(name) {
                return Err(ExpansionError::Malformed {
                    text: text.to_string(),
                    offset: whole.start(),
                });
            }

            match (self.get(name), fallback) {
                (Some(value), _) => out.push_str(value),
                (None, Some(fallback)) => {
                    trace!(name, fallback, "expansion unbound; using fallback");
                    out.push_str(fallback);
                }
                (None, None) => {
                    return Err(ExpansionError::Unresolved {
                        name: name.to_string(),
                    });
                }
            }

            last = whole.end();
        }

        check_literal(text, last, text.len())?;
        out.push_str(&text[last..]);
        Ok(out)
    }
}

/// Literal text between placeholders must not open another one.
fn check_literal(text: &str, start: usize, end: usize) -> Result<(), ExpansionError> {
    match text[start..end].find("${") {
        Some(pos) => Err(ExpansionError::Malformed {
            text: text.to_string(),
            offset: start + pos,
        }),
        None => Ok(()),
    }
}

impl Expander for Expansions {
    fn expand(&self, text: &str) -> Result<String, ExpansionError> {
        self.expand_str(text)
    }
}

impl<K, V> FromIterator<(K, V)> for Expansions
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut expansions = Expansions::new();
        for (k, v) in iter {
            expansions.put(k, v);
        }
        expansions
    }
}

impl From<BTreeMap<String, String>> for Expansions {
    fn from(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }
}
