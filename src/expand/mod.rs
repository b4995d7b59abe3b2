// src/expand/mod.rs

//! Placeholder expansion for command configuration.
//!
//! The executor only ever talks to the [`Expander`] trait; it does not know
//! the placeholder grammar. [`Expansions`] is the implementation used by the
//! `localcmd` binary and by most tests:
//!
//! - `${name}` is replaced with the value bound to `name`.
//! - `${name|fallback}` uses `fallback` when `name` is unbound.
//!
//! Any closure `Fn(&str) -> Result<String, ExpansionError>` is also an
//! expander, which keeps ad-hoc substitutions (and failure injection in
//! tests) cheap to write.

pub mod expansions;

use thiserror::Error;

pub use expansions::Expansions;

/// Failure reported by an expander.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpansionError {
    #[error("unresolved placeholder '${{{name}}}'")]
    Unresolved { name: String },

    #[error("malformed placeholder at byte {offset} in '{text}'")]
    Malformed { text: String, offset: usize },
}

/// Capability that resolves placeholders in a configuration string.
pub trait Expander: Send + Sync {
    fn expand(&self, text: &str) -> Result<String, ExpansionError>;
}

impl<F> Expander for F
where
    F: Fn(&str) -> Result<String, ExpansionError> + Send + Sync,
{
    fn expand(&self, text: &str) -> Result<String, ExpansionError> {
        self(text)
    }
}
