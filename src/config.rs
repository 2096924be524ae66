//! Configuration loader and schema types.
//!
//! This module exposes the configuration schema that tunes the energy
//! driver, platter motion, progress timer and intake, plus helpers to load
//! configuration from disk.

mod load;
mod schema;

pub use load::default_log_dir;
pub use schema::*;
