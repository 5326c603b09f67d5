// src/config/mod.rs

//! Configuration loading and validation for watchloop.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate cross-references and option sanity (`validate.rs`).
//!
//! Turning targets into watchable patterns is the target resolver's job
//! (`watch::targets`), not this module's.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{
    ConfigFile, FilePatterns, OptionsSection, RawConfigFile, TargetConfig, TaskConfig,
};
