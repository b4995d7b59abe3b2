// src/config/mod.rs

//! Configuration for a local command.
//!
//! Responsibilities:
//! - Define the executor configuration and the TOML job-file model (`model.rs`).
//! - Load a job file from disk (`loader.rs`).
//! - Validate basic invariants like a non-empty command (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{CommandConfig, DEFAULT_SHELL, JobFile, RawJobFile};
pub use validate::validate_command;
